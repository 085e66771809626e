use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use next_target_select::{
    ChordBindings, ControlChannel, DesktopInput, DesktopSize, HotkeyPause, InputSymbol,
    KeyBindingStore, Overlay, OverlayConfig, RecordingPointer, SnapshotScene, SystemPointer,
};
use std::path::PathBuf;
use strum::IntoEnumIterator;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nts", version, about = "Click the nearest target box on a key chord")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the overlay against a scene snapshot file
    Run {
        /// Snapshot file written by the host exporter
        #[arg(long)]
        scene: PathBuf,

        /// Log clicks instead of moving the real cursor
        #[arg(long)]
        dry_run: bool,

        /// Desktop size used for dry runs, as WIDTHxHEIGHT
        #[arg(long, default_value = "1920x1080", value_parser = parse_desktop_size)]
        desktop: DesktopSize,
    },

    /// Show the keyboard and joystick chords, creating default files if needed
    Bindings,

    /// Persist a chord for one control channel
    Bind {
        /// keyboard or joystick
        #[arg(value_parser = ControlChannel::from_name)]
        channel: ControlChannel,

        /// Symbol names, held keys first and the trigger key last
        #[arg(required = true, num_args = 1..)]
        symbols: Vec<String>,
    },

    /// Write a configuration file with default values
    InitConfig {
        #[arg(default_value = "nts.json")]
        path: PathBuf,
    },
}

fn parse_desktop_size(value: &str) -> std::result::Result<DesktopSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width.trim().parse::<u32>().map_err(|e| format!("invalid width: {}", e))?;
    let height = height.trim().parse::<u32>().map_err(|e| format!("invalid height: {}", e))?;
    Ok(DesktopSize::new(width, height))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<OverlayConfig> {
    let config = match path {
        Some(path) => {
            let path = path.to_string_lossy();
            OverlayConfig::from_file(&path)?
        }
        None => OverlayConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(cli.verbose || config.verbose);

    match cli.command {
        Command::Run {
            scene,
            dry_run,
            desktop,
        } => run(config, scene, dry_run, desktop).await,
        Command::Bindings => show_bindings(&config),
        Command::Bind { channel, symbols } => bind(&config, channel, &symbols),
        Command::InitConfig { path } => {
            OverlayConfig::default().save_to_file(&path.to_string_lossy())?;
            println!("{} {}", "Wrote default config to".green(), path.display());
            Ok(())
        }
    }
}

async fn run(config: OverlayConfig, scene_path: PathBuf, dry_run: bool, desktop: DesktopSize) -> Result<()> {
    let store = KeyBindingStore::open(config.bindings_dir()?)?;
    let bindings = ChordBindings::load(&store);

    println!("{}", "Next Target Select".bold().cyan());
    println!("  keyboard: {}", bindings.keyboard.to_string().yellow());
    println!("  joystick: {}", bindings.joystick.to_string().yellow());

    let scene = Arc::new(
        SnapshotScene::open(&scene_path)
            .with_context(|| format!("failed to open scene snapshot {}", scene_path.display()))?,
    );

    // Keep the snapshot fresh at the selection cadence.
    let feed = {
        let scene = scene.clone();
        let period = config.selection_interval;
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                ticks.tick().await;
                if let Err(e) = scene.refresh() {
                    warn!("Failed to refresh scene snapshot: {}", e);
                }
            }
        })
    };

    let mut hotkey = None;
    let manual_pause = match &config.pause_hotkey {
        Some(combo) => {
            let mut pause = HotkeyPause::new()?;
            pause.register(combo)?;
            let flag = pause.flag();
            pause.start_listener();
            hotkey = Some(pause);
            println!("  pause:    {}", combo.yellow());
            flag
        }
        None => Arc::new(AtomicBool::new(false)),
    };
    let pause = (scene.clone(), manual_pause);

    let mut input = DesktopInput::new()?;
    let overlay = Overlay::new(scene, config, bindings);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    if dry_run {
        info!("Dry run: clicks are recorded, not sent");
        let pointer = RecordingPointer::new(desktop);
        overlay.run(&pointer, &mut input, &pause, shutdown).await;
        println!("{} {}", "Recorded clicks:".green(), pointer.clicks().len());
    } else {
        overlay.run(SystemPointer::new()?, &mut input, &pause, shutdown).await;
    }

    feed.abort();
    drop(hotkey);
    Ok(())
}

fn show_bindings(config: &OverlayConfig) -> Result<()> {
    let store = KeyBindingStore::open(config.bindings_dir()?)?;
    let bindings = ChordBindings::load(&store);

    println!("{} {}", "Bindings in".bold(), store.dir().display());
    for channel in ControlChannel::iter() {
        println!(
            "  {:<9} {}",
            format!("{}:", channel),
            bindings.chord(channel).to_string().yellow()
        );
    }
    Ok(())
}

fn bind(config: &OverlayConfig, channel: ControlChannel, names: &[String]) -> Result<()> {
    let symbols = names
        .iter()
        .map(|name| InputSymbol::from_name(name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let store = KeyBindingStore::open(config.bindings_dir()?)?;
    store.save(channel, &symbols)?;

    println!(
        "{} {} {}",
        "Saved".green(),
        channel,
        store.path_for(channel).display()
    );
    Ok(())
}
