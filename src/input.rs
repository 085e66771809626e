//! Per-frame input state.
//!
//! The chord matcher only needs two questions answered per symbol: is it held
//! right now, and did it go down this frame. [`InputSnapshot`] answers them
//! from explicit sets (hosts and tests), [`DesktopInput`] polls the OS.

use crate::error::Result;
use crate::symbol::InputSymbol;
use std::collections::HashSet;

/// Queryable input state for the current frame.
pub trait InputState {
    fn is_held(&self, symbol: InputSymbol) -> bool;

    /// True only on the frame the symbol transitioned from released to held.
    fn was_just_pressed(&self, symbol: InputSymbol) -> bool;
}

/// An input source that must be sampled once at the start of every frame.
pub trait FrameInput: InputState {
    fn begin_frame(&mut self);
}

/// Input state built from explicit held / pressed sets.
///
/// `press` marks a symbol both held and just-pressed; `begin_frame` clears the
/// just-pressed set while keeping held symbols down.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    held: HashSet<InputSymbol>,
    pressed: HashSet<InputSymbol>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&mut self, symbol: InputSymbol) -> &mut Self {
        self.held.insert(symbol);
        self
    }

    pub fn press(&mut self, symbol: InputSymbol) -> &mut Self {
        self.held.insert(symbol);
        self.pressed.insert(symbol);
        self
    }

    pub fn release(&mut self, symbol: InputSymbol) -> &mut Self {
        self.held.remove(&symbol);
        self.pressed.remove(&symbol);
        self
    }
}

impl InputState for InputSnapshot {
    fn is_held(&self, symbol: InputSymbol) -> bool {
        self.held.contains(&symbol)
    }

    fn was_just_pressed(&self, symbol: InputSymbol) -> bool {
        self.pressed.contains(&symbol)
    }
}

impl FrameInput for InputSnapshot {
    fn begin_frame(&mut self) {
        self.pressed.clear();
    }
}

/// Polls the global keyboard and mouse state of the desktop session.
///
/// Just-pressed is derived by comparing against the previous frame's sample.
/// Joystick buttons are never reported as held by this backend.
pub struct DesktopInput {
    previous: HashSet<InputSymbol>,
    current: HashSet<InputSymbol>,
}

impl DesktopInput {
    #[cfg(windows)]
    pub fn new() -> Result<Self> {
        Ok(Self {
            previous: HashSet::new(),
            current: HashSet::new(),
        })
    }

    #[cfg(not(windows))]
    pub fn new() -> Result<Self> {
        Err(crate::error::OverlayError::unsupported_platform(
            "desktop key-state polling is only implemented for Windows",
        ))
    }

    #[cfg(windows)]
    fn sample(&mut self) {
        use strum::IntoEnumIterator;
        use winapi::um::winuser::GetAsyncKeyState;

        self.current.clear();
        for symbol in InputSymbol::iter() {
            if let Some(vk) = virtual_key(symbol) {
                // High bit set means the key is down right now.
                let state = unsafe { GetAsyncKeyState(vk) };
                if (state as u16) & 0x8000 != 0 {
                    self.current.insert(symbol);
                }
            }
        }
    }

    #[cfg(not(windows))]
    fn sample(&mut self) {
        self.current.clear();
    }
}

impl InputState for DesktopInput {
    fn is_held(&self, symbol: InputSymbol) -> bool {
        self.current.contains(&symbol)
    }

    fn was_just_pressed(&self, symbol: InputSymbol) -> bool {
        self.current.contains(&symbol) && !self.previous.contains(&symbol)
    }
}

impl FrameInput for DesktopInput {
    fn begin_frame(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        self.sample();
    }
}

#[cfg(windows)]
fn virtual_key(symbol: InputSymbol) -> Option<i32> {
    use winapi::um::winuser::*;
    use InputSymbol as S;

    let name = symbol.name();
    // Single letters map straight onto their ASCII virtual-key codes.
    if name.len() == 1 {
        return Some(name.as_bytes()[0] as i32);
    }
    if let Some(digit) = name.strip_prefix("Alpha") {
        return digit.parse::<i32>().ok().map(|d| 0x30 + d);
    }
    if let Some(digit) = name.strip_prefix("Keypad").and_then(|d| d.parse::<i32>().ok()) {
        return Some(VK_NUMPAD0 + digit);
    }
    if let Some(n) = name
        .strip_prefix('F')
        .and_then(|n| n.parse::<i32>().ok())
    {
        return Some(VK_F1 + n - 1);
    }

    let vk = match symbol {
        S::Backspace => VK_BACK,
        S::Tab => VK_TAB,
        S::Clear => VK_CLEAR,
        S::Return | S::KeypadEnter => VK_RETURN,
        S::Pause => VK_PAUSE,
        S::Escape => VK_ESCAPE,
        S::Space => VK_SPACE,
        S::KeypadPeriod => VK_DECIMAL,
        S::KeypadDivide => VK_DIVIDE,
        S::KeypadMultiply => VK_MULTIPLY,
        S::KeypadMinus => VK_SUBTRACT,
        S::KeypadPlus => VK_ADD,
        S::UpArrow => VK_UP,
        S::DownArrow => VK_DOWN,
        S::RightArrow => VK_RIGHT,
        S::LeftArrow => VK_LEFT,
        S::Insert => VK_INSERT,
        S::Home => VK_HOME,
        S::End => VK_END,
        S::PageUp => VK_PRIOR,
        S::PageDown => VK_NEXT,
        S::Delete => VK_DELETE,
        S::Numlock => VK_NUMLOCK,
        S::CapsLock => VK_CAPITAL,
        S::ScrollLock => VK_SCROLL,
        S::RightShift => VK_RSHIFT,
        S::LeftShift => VK_LSHIFT,
        S::RightControl => VK_RCONTROL,
        S::LeftControl => VK_LCONTROL,
        S::RightAlt => VK_RMENU,
        S::LeftAlt => VK_LMENU,
        S::Mouse0 => VK_LBUTTON,
        S::Mouse1 => VK_RBUTTON,
        S::Mouse2 => VK_MBUTTON,
        S::Mouse3 => VK_XBUTTON1,
        S::Mouse4 => VK_XBUTTON2,
        _ => return None,
    };
    Some(vk)
}
