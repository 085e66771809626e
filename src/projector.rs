//! World point to desktop pixel conversion.
//!
//! Cameras render with a bottom-left origin in their own pixel space; OS cursor
//! coordinates are top-left origin in desktop pixels. Nothing is clamped: a
//! point off screen yields coordinates off the desktop.

use crate::scene::CameraView;
use glam::{IVec2, Vec2, Vec3};

/// Desktop resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopSize {
    pub width: u32,
    pub height: u32,
}

impl DesktopSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Project `world` through `camera` into desktop pixel coordinates.
pub fn project(world: Vec3, camera: &CameraView, desktop: DesktopSize) -> IVec2 {
    let viewport = camera.world_to_screen(world);
    viewport_to_desktop(
        viewport.truncate(),
        Vec2::new(camera.pixel_width as f32, camera.pixel_height as f32),
        desktop,
    )
}

/// Rescale a camera-pixel point to the desktop and flip the vertical axis.
///
/// Rounds half to even, like the host engine's integer rounding.
pub fn viewport_to_desktop(viewport: Vec2, camera_pixels: Vec2, desktop: DesktopSize) -> IVec2 {
    let width = desktop.width as f32;
    let height = desktop.height as f32;

    let x = viewport.x / camera_pixels.x * width;
    let y = height - (viewport.y / camera_pixels.y * height);

    IVec2::new(x.round_ties_even() as i32, y.round_ties_even() as i32)
}
