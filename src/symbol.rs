//! Input symbols: physical keys and buttons named the way the host engine
//! names its key codes.

use crate::error::{OverlayError, Result};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantArray};

/// Identifier for a physical keyboard key, mouse button or joystick button.
///
/// [`InputSymbol::None`] marks an unused chord slot and is always satisfied.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    VariantArray,
)]
#[strum(ascii_case_insensitive)]
pub enum InputSymbol {
    #[default]
    None,
    Backspace,
    Tab,
    Clear,
    Return,
    Pause,
    Escape,
    Space,
    Alpha0,
    Alpha1,
    Alpha2,
    Alpha3,
    Alpha4,
    Alpha5,
    Alpha6,
    Alpha7,
    Alpha8,
    Alpha9,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadPeriod,
    KeypadDivide,
    KeypadMultiply,
    KeypadMinus,
    KeypadPlus,
    KeypadEnter,
    UpArrow,
    DownArrow,
    RightArrow,
    LeftArrow,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    Numlock,
    CapsLock,
    ScrollLock,
    RightShift,
    LeftShift,
    RightControl,
    LeftControl,
    RightAlt,
    LeftAlt,
    Mouse0,
    Mouse1,
    Mouse2,
    Mouse3,
    Mouse4,
    JoystickButton0,
    JoystickButton1,
    JoystickButton2,
    JoystickButton3,
    JoystickButton4,
    JoystickButton5,
    JoystickButton6,
    JoystickButton7,
    JoystickButton8,
    JoystickButton9,
    JoystickButton10,
    JoystickButton11,
    JoystickButton12,
    JoystickButton13,
    JoystickButton14,
    JoystickButton15,
    JoystickButton16,
    JoystickButton17,
    JoystickButton18,
    JoystickButton19,
}

impl InputSymbol {
    /// Canonical name, as written to binding files.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Case-insensitive lookup by canonical name; surrounding whitespace is
    /// ignored. Numeric key codes are not accepted.
    pub fn from_name(name: &str) -> Result<Self> {
        name.trim()
            .parse()
            .map_err(|_| OverlayError::UnknownSymbol(name.to_string()))
    }

    pub fn is_none(self) -> bool {
        self == InputSymbol::None
    }

    pub fn is_joystick_button(self) -> bool {
        self.name().starts_with("JoystickButton")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(InputSymbol::from_name("leftshift").unwrap(), InputSymbol::LeftShift);
        assert_eq!(InputSymbol::from_name("LEFTSHIFT").unwrap(), InputSymbol::LeftShift);
        assert_eq!(InputSymbol::from_name(" f ").unwrap(), InputSymbol::F);
        assert_eq!(
            "joystickbutton12".parse::<InputSymbol>().unwrap(),
            InputSymbol::JoystickButton12
        );
        assert_eq!("none".parse::<InputSymbol>().unwrap(), InputSymbol::None);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(InputSymbol::from_name("").is_err());
        assert!(InputSymbol::from_name("Shift").is_err());
        assert!(InputSymbol::from_name("ctrl+f").is_err());

        let err = InputSymbol::from_name("NotAKey").unwrap_err();
        assert!(matches!(err, OverlayError::UnknownSymbol(ref s) if s == "NotAKey"));
    }

    #[test]
    fn test_numeric_key_codes_are_rejected() {
        assert!(InputSymbol::from_name("102").is_err());
        assert!(InputSymbol::from_name("0").is_err());
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(InputSymbol::LeftControl.to_string(), "LeftControl");
        assert_eq!(InputSymbol::Alpha1.name(), "Alpha1");
        assert!(InputSymbol::JoystickButton3.is_joystick_button());
        assert!(!InputSymbol::Mouse0.is_joystick_button());
        assert!(InputSymbol::default().is_none());
    }

    #[test]
    fn test_every_name_parses_back() {
        for symbol in InputSymbol::iter() {
            assert_eq!(InputSymbol::from_name(symbol.name()).unwrap(), symbol);
            assert_eq!(symbol.to_string(), symbol.name());
        }
        assert_eq!(InputSymbol::VARIANTS.len(), InputSymbol::iter().count());
    }
}
