//! Key binding persistence.
//!
//! Each control channel stores its chord as a plain text file with one symbol
//! name per line. Loading is all-or-nothing: a single unparsable line discards
//! the whole file. `None` entries are dropped on load but written verbatim on
//! save.

use crate::chord::{ControlChannel, KeyChord};
use crate::error::{OverlayError, Result};
use crate::input::InputState;
use crate::symbol::InputSymbol;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Reads and writes binding files inside one directory.
#[derive(Debug, Clone)]
pub struct KeyBindingStore {
    dir: PathBuf,
}

impl KeyBindingStore {
    /// Use `dir` for binding files, creating it if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, channel: ControlChannel) -> PathBuf {
        self.dir.join(channel.file_name())
    }

    /// Load the chord for `channel`, falling back to (and persisting) the
    /// channel's default when the file is missing or corrupt.
    pub fn load_or_default(&self, channel: ControlChannel) -> KeyChord {
        let path = self.path_for(channel);
        match load(&path) {
            Ok(symbols) => {
                info!("Loaded {} binding from {}", channel, path.display());
                KeyChord::new(symbols)
            }
            Err(e) => {
                match &e {
                    OverlayError::BindingMissing { .. } => warn!(
                        "Binding file for {} does not exist, creating it with default values",
                        channel
                    ),
                    _ => error!("Error loading binding file for {}: {}", channel, e),
                }

                let chord = channel.default_chord();
                if let Err(e) = save(&path, chord.symbols()) {
                    error!("Failed to persist default {} binding: {}", channel, e);
                }
                chord
            }
        }
    }

    pub fn save(&self, channel: ControlChannel, symbols: &[InputSymbol]) -> Result<()> {
        save(&self.path_for(channel), symbols)
    }
}

/// Parse a binding file into its symbols.
///
/// Fails with [`OverlayError::BindingMissing`] when the file does not exist and
/// with [`OverlayError::PersistenceCorrupt`] when any line is not a symbol name.
pub fn load(path: &Path) -> Result<Vec<InputSymbol>> {
    if !path.exists() {
        return Err(OverlayError::binding_missing(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)?;
    let contents = contents.strip_prefix('\u{FEFF}').unwrap_or(&contents);
    let mut symbols = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let symbol = InputSymbol::from_name(line).map_err(|e| {
            OverlayError::persistence_corrupt(path.display().to_string(), index + 1, e.to_string())
        })?;
        if !symbol.is_none() {
            symbols.push(symbol);
        }
    }
    Ok(symbols)
}

/// Write `symbols` one canonical name per line. An empty sequence is rejected
/// and the file is left untouched.
pub fn save(path: &Path, symbols: &[InputSymbol]) -> Result<()> {
    if symbols.is_empty() {
        error!("Refusing to save an empty key chord to {}", path.display());
        return Err(OverlayError::invalid_configuration(
            "key chord must contain at least one symbol",
        ));
    }

    let mut contents = String::new();
    for symbol in symbols {
        contents.push_str(symbol.name());
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

/// The chords of both control channels, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordBindings {
    pub keyboard: KeyChord,
    pub joystick: KeyChord,
}

impl ChordBindings {
    pub fn load(store: &KeyBindingStore) -> Self {
        Self {
            keyboard: store.load_or_default(ControlChannel::Keyboard),
            joystick: store.load_or_default(ControlChannel::Joystick),
        }
    }

    pub fn chord(&self, channel: ControlChannel) -> &KeyChord {
        match channel {
            ControlChannel::Keyboard => &self.keyboard,
            ControlChannel::Joystick => &self.joystick,
        }
    }

    /// True when either channel's chord fires this frame.
    pub fn triggered(&self, input: &impl InputState) -> bool {
        self.joystick.is_satisfied(input) || self.keyboard.is_satisfied(input)
    }
}

impl Default for ChordBindings {
    fn default() -> Self {
        Self {
            keyboard: ControlChannel::Keyboard.default_chord(),
            joystick: ControlChannel::Joystick.default_chord(),
        }
    }
}
