//! Pause state: clicks are suppressed while the host is paused.
//!
//! The host reports its own pause flag through [`PauseState`]; the user can
//! additionally toggle a manual pause with a global hotkey via
//! [`HotkeyPause`].

use anyhow::Result;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub trait PauseState {
    fn is_paused(&self) -> bool;
}

impl PauseState for bool {
    fn is_paused(&self) -> bool {
        *self
    }
}

impl PauseState for AtomicBool {
    fn is_paused(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: PauseState + ?Sized> PauseState for Arc<T> {
    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
}

impl<T: PauseState + ?Sized> PauseState for &T {
    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }
}

/// Paused when either side is paused.
impl<A: PauseState, B: PauseState> PauseState for (A, B) {
    fn is_paused(&self) -> bool {
        self.0.is_paused() || self.1.is_paused()
    }
}

/// A global hotkey that toggles a manual pause flag.
///
/// Dropping it stops the listener started by [`HotkeyPause::start_listener`].
pub struct HotkeyPause {
    manager: GlobalHotKeyManager,
    is_paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl HotkeyPause {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("Failed to create GlobalHotKeyManager: {}", e))?;

        Ok(Self {
            manager,
            is_paused: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn register(&mut self, hotkey_str: &str) -> Result<()> {
        let hotkey = parse_hotkey(hotkey_str)?;

        self.manager
            .register(hotkey)
            .map_err(|e| anyhow::anyhow!("Failed to register hotkey '{}': {}", hotkey_str, e))?;

        info!("Pause hotkey '{}' registered", hotkey_str);
        Ok(())
    }

    /// Shared flag, readable without holding on to the manager.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.is_paused.clone()
    }

    /// Flip the pause flag. Returns the new state.
    pub fn toggle(&self) -> bool {
        toggle_flag(&self.is_paused)
    }

    /// Poll hotkey events on a blocking task until this value is dropped.
    pub fn start_listener(&self) -> JoinHandle<()> {
        let receiver = GlobalHotKeyEvent::receiver();
        let is_paused = self.is_paused.clone();
        let stop = self.stop.clone();

        tokio::task::spawn_blocking(move || {
            listen(|| receiver.try_recv().ok().map(|e| e.state), &is_paused, &stop)
        })
    }
}

impl Drop for HotkeyPause {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

fn toggle_flag(flag: &AtomicBool) -> bool {
    let new_state = !flag.fetch_xor(true, Ordering::SeqCst);
    if new_state {
        info!("Overlay paused (press hotkey again to resume)");
    } else {
        info!("Overlay resumed");
    }
    new_state
}

/// Toggle `is_paused` on every key press until `stop` is set. Events queued
/// before `stop` was set are still handled.
fn listen(
    mut next_event: impl FnMut() -> Option<HotKeyState>,
    is_paused: &AtomicBool,
    stop: &AtomicBool,
) {
    loop {
        let stopping = stop.load(Ordering::SeqCst);
        while let Some(state) = next_event() {
            if state == HotKeyState::Pressed {
                toggle_flag(is_paused);
            }
        }
        if stopping {
            debug!("Pause hotkey listener stopped");
            return;
        }

        // Small sleep to prevent busy waiting
        std::thread::sleep(Duration::from_millis(10));
    }
}

impl PauseState for HotkeyPause {
    fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Relaxed)
    }
}

fn parse_hotkey(hotkey_str: &str) -> Result<global_hotkey::hotkey::HotKey> {
    use global_hotkey::hotkey::{HotKey, Modifiers};

    let binding = hotkey_str.to_lowercase();
    let parts: Vec<&str> = binding.split('+').map(|s| s.trim()).collect();

    let mut modifiers = Modifiers::empty();
    let mut key_code = None;

    for part in &parts {
        match *part {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "super" => modifiers |= Modifiers::SUPER,
            "" => return Err(anyhow::anyhow!("Empty key in hotkey: '{}'", hotkey_str)),
            key => {
                if key_code.is_some() {
                    return Err(anyhow::anyhow!(
                        "Multiple keys specified in hotkey: {}",
                        hotkey_str
                    ));
                }
                key_code = Some(parse_key_code(key)?);
            }
        }
    }

    let code =
        key_code.ok_or_else(|| anyhow::anyhow!("No key specified in hotkey: {}", hotkey_str))?;

    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_key_code(key: &str) -> Result<global_hotkey::hotkey::Code> {
    use global_hotkey::hotkey::Code;

    const LETTERS: [Code; 26] = [
        Code::KeyA, Code::KeyB, Code::KeyC, Code::KeyD, Code::KeyE, Code::KeyF, Code::KeyG,
        Code::KeyH, Code::KeyI, Code::KeyJ, Code::KeyK, Code::KeyL, Code::KeyM, Code::KeyN,
        Code::KeyO, Code::KeyP, Code::KeyQ, Code::KeyR, Code::KeyS, Code::KeyT, Code::KeyU,
        Code::KeyV, Code::KeyW, Code::KeyX, Code::KeyY, Code::KeyZ,
    ];
    const DIGITS: [Code; 10] = [
        Code::Digit0, Code::Digit1, Code::Digit2, Code::Digit3, Code::Digit4,
        Code::Digit5, Code::Digit6, Code::Digit7, Code::Digit8, Code::Digit9,
    ];
    const FUNCTION: [Code; 12] = [
        Code::F1, Code::F2, Code::F3, Code::F4, Code::F5, Code::F6,
        Code::F7, Code::F8, Code::F9, Code::F10, Code::F11, Code::F12,
    ];

    if let [c] = key.as_bytes() {
        match c {
            b'a'..=b'z' => return Ok(LETTERS[(c - b'a') as usize]),
            b'0'..=b'9' => return Ok(DIGITS[(c - b'0') as usize]),
            _ => {}
        }
    }
    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(FUNCTION[n - 1]);
        }
    }

    let code = match key {
        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "insert" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "pause" => Code::Pause,

        "up" | "arrowup" => Code::ArrowUp,
        "down" | "arrowdown" => Code::ArrowDown,
        "left" | "arrowleft" => Code::ArrowLeft,
        "right" | "arrowright" => Code::ArrowRight,

        _ => return Err(anyhow::anyhow!("Unsupported key: {}", key)),
    };

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use global_hotkey::hotkey::{Code, HotKey, Modifiers};

    #[test]
    fn test_parse_hotkey() {
        let hotkey = parse_hotkey("ctrl+alt+p").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyP)
        );

        let hotkey = parse_hotkey("Shift + F9").unwrap();
        assert_eq!(hotkey, HotKey::new(Some(Modifiers::SHIFT), Code::F9));
    }

    #[test]
    fn test_parse_hotkey_errors() {
        assert!(parse_hotkey("").is_err());
        assert!(parse_hotkey("ctrl+alt").is_err());
        assert!(parse_hotkey("a+b").is_err());
        assert!(parse_hotkey("ctrl+f13").is_err());
        assert!(parse_hotkey("ctrl++p").is_err());
    }

    #[test]
    fn test_pause_state_impls() {
        assert!(true.is_paused());
        assert!(!false.is_paused());

        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.is_paused());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.is_paused());

        assert!((false, &flag).is_paused());
        assert!(!(false, false).is_paused());
    }

    #[test]
    fn test_toggle_flag_flips() {
        let flag = AtomicBool::new(false);
        assert!(toggle_flag(&flag));
        assert!(flag.is_paused());
        assert!(!toggle_flag(&flag));
        assert!(!flag.is_paused());
    }

    #[tokio::test]
    async fn test_listener_toggles_on_press_and_stops() {
        let (tx, rx) = std::sync::mpsc::channel();
        let is_paused = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let is_paused = is_paused.clone();
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || listen(|| rx.try_recv().ok(), &is_paused, &stop))
        };

        tx.send(HotKeyState::Pressed).unwrap();
        tx.send(HotKeyState::Released).unwrap();
        stop.store(true, Ordering::SeqCst);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("listener did not stop")
            .unwrap();
        assert!(is_paused.is_paused());
    }

    #[test]
    fn test_runtime_drop_completes_once_listener_stopped() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let is_paused = Arc::new(AtomicBool::new(false));

        {
            let stop = stop.clone();
            runtime.spawn_blocking(move || listen(|| None, &is_paused, &stop));
        }

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            stop.store(true, Ordering::SeqCst);
            drop(runtime);
            done_tx.send(()).unwrap();
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
