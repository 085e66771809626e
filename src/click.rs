//! Synthetic mouse clicks at desktop coordinates.

use crate::error::{OverlayError, Result};
use crate::projector::DesktopSize;
use bitflags::bitflags;
use glam::IVec2;
use tracing::debug;

bitflags! {
    /// Mouse event flags, bit-compatible with the Win32 `MOUSEEVENTF_*` values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MouseEventFlags: u32 {
        const MOVE        = 0x0001;
        const LEFT_DOWN   = 0x0002;
        const LEFT_UP     = 0x0004;
        const RIGHT_DOWN  = 0x0008;
        const RIGHT_UP    = 0x0010;
        const MIDDLE_DOWN = 0x0020;
        const MIDDLE_UP   = 0x0040;
        const ABSOLUTE    = 0x8000;
    }
}

/// The OS cursor and mouse button interface.
pub trait Pointer {
    fn set_cursor_position(&self, position: IVec2) -> Result<()>;

    fn cursor_position(&self) -> Result<IVec2>;

    /// Synthesize a mouse event at `position`.
    fn mouse_event(&self, flags: MouseEventFlags, position: IVec2) -> Result<()>;

    fn desktop_size(&self) -> Result<DesktopSize>;
}

impl<P: Pointer + ?Sized> Pointer for &P {
    fn set_cursor_position(&self, position: IVec2) -> Result<()> {
        (**self).set_cursor_position(position)
    }

    fn cursor_position(&self) -> Result<IVec2> {
        (**self).cursor_position()
    }

    fn mouse_event(&self, flags: MouseEventFlags, position: IVec2) -> Result<()> {
        (**self).mouse_event(flags, position)
    }

    fn desktop_size(&self) -> Result<DesktopSize> {
        (**self).desktop_size()
    }
}

/// Moves the cursor and clicks the left button.
pub struct ClickSimulator<P> {
    pointer: P,
}

impl<P: Pointer> ClickSimulator<P> {
    pub fn new(pointer: P) -> Self {
        Self { pointer }
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    /// Move the cursor to `target` and click where the cursor ends up.
    ///
    /// The button event uses the position read back after the move, so
    /// concurrent cursor movement from another source wins. OS failures are
    /// logged and otherwise ignored.
    pub fn click(&self, target: IVec2) {
        if let Err(e) = self.pointer.set_cursor_position(target) {
            debug!("Failed to move cursor to {}: {}", target, e);
        }

        let position = self.pointer.cursor_position().unwrap_or_else(|e| {
            debug!("Failed to read cursor position: {}", e);
            IVec2::ZERO
        });

        let flags = MouseEventFlags::LEFT_DOWN | MouseEventFlags::LEFT_UP;
        if let Err(e) = self.pointer.mouse_event(flags, position) {
            debug!("Failed to send click at {}: {}", position, e);
        }
    }
}

/// The desktop session's real pointer.
#[derive(Debug, Clone, Copy)]
pub struct SystemPointer {
    _private: (),
}

impl SystemPointer {
    #[cfg(windows)]
    pub fn new() -> Result<Self> {
        Ok(Self { _private: () })
    }

    #[cfg(not(windows))]
    pub fn new() -> Result<Self> {
        Err(OverlayError::unsupported_platform(
            "synthetic mouse input is only implemented for Windows",
        ))
    }
}

#[cfg(windows)]
impl Pointer for SystemPointer {
    fn set_cursor_position(&self, position: IVec2) -> Result<()> {
        use winapi::um::winuser::SetCursorPos;

        let ok = unsafe { SetCursorPos(position.x, position.y) };
        if ok == 0 {
            return Err(OverlayError::pointer("SetCursorPos failed"));
        }
        Ok(())
    }

    fn cursor_position(&self) -> Result<IVec2> {
        use winapi::shared::windef::POINT;
        use winapi::um::winuser::GetCursorPos;

        let mut point = POINT { x: 0, y: 0 };
        let ok = unsafe { GetCursorPos(&mut point) };
        if ok == 0 {
            return Err(OverlayError::pointer("GetCursorPos failed"));
        }
        Ok(IVec2::new(point.x, point.y))
    }

    fn mouse_event(&self, flags: MouseEventFlags, position: IVec2) -> Result<()> {
        use winapi::um::winuser::mouse_event;

        // mouse_event reports no failure.
        unsafe { mouse_event(flags.bits(), position.x as u32, position.y as u32, 0, 0) };
        Ok(())
    }

    fn desktop_size(&self) -> Result<DesktopSize> {
        use winapi::um::winuser::{GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN};

        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width <= 0 || height <= 0 {
            return Err(OverlayError::pointer("GetSystemMetrics returned no screen size"));
        }
        Ok(DesktopSize::new(width as u32, height as u32))
    }
}

#[cfg(not(windows))]
impl Pointer for SystemPointer {
    fn set_cursor_position(&self, _position: IVec2) -> Result<()> {
        Err(OverlayError::unsupported_platform("SetCursorPos"))
    }

    fn cursor_position(&self) -> Result<IVec2> {
        Err(OverlayError::unsupported_platform("GetCursorPos"))
    }

    fn mouse_event(&self, _flags: MouseEventFlags, _position: IVec2) -> Result<()> {
        Err(OverlayError::unsupported_platform("mouse_event"))
    }

    fn desktop_size(&self) -> Result<DesktopSize> {
        Err(OverlayError::unsupported_platform("GetSystemMetrics"))
    }
}

/// Pointer that records calls instead of touching the OS.
#[derive(Debug, Default)]
pub struct RecordingPointer {
    desktop: Option<DesktopSize>,
    cursor: std::cell::Cell<IVec2>,
    /// Offset applied to every cursor read, simulating concurrent movement.
    drift: IVec2,
    events: std::cell::RefCell<Vec<(MouseEventFlags, IVec2)>>,
}

impl RecordingPointer {
    pub fn new(desktop: DesktopSize) -> Self {
        Self {
            desktop: Some(desktop),
            ..Self::default()
        }
    }

    pub fn with_drift(mut self, drift: IVec2) -> Self {
        self.drift = drift;
        self
    }

    pub fn events(&self) -> Vec<(MouseEventFlags, IVec2)> {
        self.events.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<IVec2> {
        self.events
            .borrow()
            .iter()
            .filter(|(flags, _)| flags.contains(MouseEventFlags::LEFT_DOWN | MouseEventFlags::LEFT_UP))
            .map(|(_, position)| *position)
            .collect()
    }
}

impl Pointer for RecordingPointer {
    fn set_cursor_position(&self, position: IVec2) -> Result<()> {
        self.cursor.set(position);
        Ok(())
    }

    fn cursor_position(&self) -> Result<IVec2> {
        Ok(self.cursor.get() + self.drift)
    }

    fn mouse_event(&self, flags: MouseEventFlags, position: IVec2) -> Result<()> {
        self.events.borrow_mut().push((flags, position));
        Ok(())
    }

    fn desktop_size(&self) -> Result<DesktopSize> {
        self.desktop
            .ok_or_else(|| OverlayError::pointer("no desktop size recorded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_moves_then_clicks_once() {
        let pointer = RecordingPointer::new(DesktopSize::new(1920, 1080));
        let clicker = ClickSimulator::new(&pointer);

        clicker.click(IVec2::new(300, 200));

        assert_eq!(pointer.cursor_position().unwrap(), IVec2::new(300, 200));
        assert_eq!(
            pointer.events(),
            vec![(
                MouseEventFlags::LEFT_DOWN | MouseEventFlags::LEFT_UP,
                IVec2::new(300, 200)
            )]
        );
    }

    #[test]
    fn test_click_uses_cursor_read_back_after_move() {
        let pointer = RecordingPointer::new(DesktopSize::new(1920, 1080)).with_drift(IVec2::new(5, -3));
        let clicker = ClickSimulator::new(&pointer);

        clicker.click(IVec2::new(100, 100));
        assert_eq!(pointer.clicks(), vec![IVec2::new(105, 97)]);
    }

    #[test]
    fn test_flags_match_win32_values() {
        let flags = MouseEventFlags::LEFT_DOWN | MouseEventFlags::LEFT_UP;
        assert_eq!(flags.bits(), 0x0006);
        assert!(flags.contains(MouseEventFlags::LEFT_UP));
        assert!(!flags.contains(MouseEventFlags::RIGHT_DOWN));
        assert_eq!(MouseEventFlags::from_bits(0x0006), Some(flags));
        assert_eq!(MouseEventFlags::from_bits(0x0100), None);
    }

    #[test]
    #[cfg(not(windows))]
    fn test_system_pointer_unsupported() {
        assert!(SystemPointer::new().is_err());
    }
}
