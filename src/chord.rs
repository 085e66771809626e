//! Key chords: "hold all but the last, press the last".

use crate::error::OverlayError;
use crate::input::InputState;
use crate::symbol::InputSymbol;
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// The two input devices that each own one chord and one binding file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ControlChannel {
    #[strum(to_string = "keyboard", serialize = "key", serialize = "kb")]
    Keyboard,
    #[strum(to_string = "joystick", serialize = "joy", serialize = "gamepad")]
    Joystick,
}

impl ControlChannel {
    pub fn from_name(name: &str) -> Result<Self, OverlayError> {
        name.trim()
            .parse()
            .map_err(|_| OverlayError::UnknownChannel(name.to_string()))
    }

    /// Binding file name for this channel.
    pub fn file_name(self) -> &'static str {
        match self {
            ControlChannel::Keyboard => "NTKEY.TXT",
            ControlChannel::Joystick => "NTJOY.TXT",
        }
    }

    /// Compiled-in chord used when the binding file is missing or corrupt.
    pub fn default_chord(self) -> KeyChord {
        match self {
            ControlChannel::Keyboard => KeyChord::new(vec![InputSymbol::LeftShift, InputSymbol::F]),
            ControlChannel::Joystick => KeyChord::new(vec![
                InputSymbol::JoystickButton4,
                InputSymbol::JoystickButton0,
            ]),
        }
    }
}

/// An ordered sequence of input symbols evaluated as a chord.
///
/// A chord loaded from disk can be empty once `None` entries are dropped; an
/// empty chord, like an all-`None` one, is satisfied on every frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    symbols: Vec<InputSymbol>,
}

impl KeyChord {
    pub fn new(symbols: Vec<InputSymbol>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[InputSymbol] {
        &self.symbols
    }

    /// True when every symbol but the last is held and the last went down this
    /// frame. `None` slots are skipped in either position.
    pub fn is_satisfied(&self, input: &impl InputState) -> bool {
        let Some((last, held)) = self.symbols.split_last() else {
            return true;
        };

        for symbol in held {
            if !symbol.is_none() && !input.is_held(*symbol) {
                return false;
            }
        }

        last.is_none() || input.was_just_pressed(*last)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.symbols.iter().map(|s| s.name()).collect();
        f.write_str(&names.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FrameInput, InputSnapshot};
    use strum::IntoEnumIterator;

    fn shift_f() -> KeyChord {
        KeyChord::new(vec![InputSymbol::LeftShift, InputSymbol::F])
    }

    #[test]
    fn test_held_then_pressed_satisfies() {
        let mut input = InputSnapshot::new();
        input.hold(InputSymbol::LeftShift).press(InputSymbol::F);
        assert!(shift_f().is_satisfied(&input));
    }

    #[test]
    fn test_last_key_is_edge_triggered() {
        let mut input = InputSnapshot::new();
        input.hold(InputSymbol::LeftShift).press(InputSymbol::F);
        input.begin_frame();
        // F is still down but was pressed on the previous frame.
        assert!(input.is_held(InputSymbol::F));
        assert!(!shift_f().is_satisfied(&input));
    }

    #[test]
    fn test_modifier_must_be_held() {
        let mut input = InputSnapshot::new();
        input.press(InputSymbol::F);
        assert!(!shift_f().is_satisfied(&input));
    }

    #[test]
    fn test_order_matters() {
        let mut input = InputSnapshot::new();
        input.hold(InputSymbol::F).press(InputSymbol::LeftShift);
        assert!(!shift_f().is_satisfied(&input));
    }

    #[test]
    fn test_none_slots_are_skipped() {
        let chord = KeyChord::new(vec![InputSymbol::None, InputSymbol::F]);
        let mut input = InputSnapshot::new();
        input.press(InputSymbol::F);
        assert!(chord.is_satisfied(&input));

        let chord = KeyChord::new(vec![InputSymbol::LeftShift, InputSymbol::None]);
        let mut input = InputSnapshot::new();
        input.hold(InputSymbol::LeftShift);
        assert!(chord.is_satisfied(&input));
    }

    #[test]
    fn test_all_none_chord_is_always_satisfied() {
        let chord = KeyChord::new(vec![InputSymbol::None]);
        assert!(chord.is_satisfied(&InputSnapshot::new()));

        let chord = KeyChord::new(vec![InputSymbol::None, InputSymbol::None]);
        assert!(chord.is_satisfied(&InputSnapshot::new()));

        assert!(KeyChord::default().is_satisfied(&InputSnapshot::new()));
    }

    #[test]
    fn test_single_key_chord() {
        let chord = KeyChord::new(vec![InputSymbol::JoystickButton0]);
        let mut input = InputSnapshot::new();
        assert!(!chord.is_satisfied(&input));
        input.press(InputSymbol::JoystickButton0);
        assert!(chord.is_satisfied(&input));
    }

    #[test]
    fn test_channel_parsing_and_files() {
        assert_eq!(ControlChannel::from_name("Keyboard").unwrap(), ControlChannel::Keyboard);
        assert_eq!(ControlChannel::from_name(" KB ").unwrap(), ControlChannel::Keyboard);
        assert_eq!(ControlChannel::from_name("joy").unwrap(), ControlChannel::Joystick);
        assert_eq!(ControlChannel::from_name("GamePad").unwrap(), ControlChannel::Joystick);
        assert!(matches!(
            ControlChannel::from_name("mouse"),
            Err(OverlayError::UnknownChannel(_))
        ));
        assert_eq!(ControlChannel::Joystick.to_string(), "joystick");
        assert_eq!(ControlChannel::iter().count(), 2);
        assert_eq!(ControlChannel::Keyboard.file_name(), "NTKEY.TXT");
        assert_eq!(ControlChannel::Joystick.file_name(), "NTJOY.TXT");
    }

    #[test]
    fn test_chord_display() {
        assert_eq!(shift_f().to_string(), "LeftShift + F");
    }
}
