//! # Next Target Select
//!
//! An input-automation overlay that keeps track of the target box nearest to
//! the centre of a host application's targeting HUD and, when a configurable
//! key chord is pressed, clicks it with a synthetic OS mouse click.
//!
//! ## Features
//!
//! - Chords of the form "hold all but the last key, press the last one"
//! - Separate keyboard and joystick chords, persisted as plain text files
//! - Late discovery of the target marker type, tolerant of load order
//! - Nearest-target selection on a fixed scan cadence
//! - World to desktop pixel projection with resolution rescaling
//! - Optional global hotkey for pausing the overlay
//!
//! ## Example
//!
//! ```no_run
//! use next_target_select::{
//!     ChordBindings, KeyBindingStore, Overlay, OverlayConfig, SnapshotScene, SystemPointer,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = OverlayConfig::default();
//! let store = KeyBindingStore::open(config.bindings_dir()?)?;
//! let bindings = ChordBindings::load(&store);
//!
//! let scene = Arc::new(SnapshotScene::open("scene.json")?);
//! let overlay = Overlay::new(scene, config, bindings);
//! let (_handler, _tasks) = overlay.start(SystemPointer::new()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Key binding files
//!
//! One symbol name per line, matched case-insensitively:
//!
//! ```text
//! LeftShift
//! F
//! ```

pub mod bindings;
pub mod chord;
pub mod click;
pub mod config;
pub mod error;
pub mod input;
pub mod overlay;
pub mod pause;
pub mod projector;
pub mod registry;
pub mod scene;
pub mod selector;
pub mod snapshot;
pub mod symbol;

pub use bindings::{ChordBindings, KeyBindingStore};
pub use chord::{ControlChannel, KeyChord};
pub use click::{ClickSimulator, MouseEventFlags, Pointer, RecordingPointer, SystemPointer};
pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use input::{DesktopInput, FrameInput, InputSnapshot, InputState};
pub use overlay::{CameraHandle, CameraResolver, FrameHandler, Overlay, OverlayTasks, TargetScanner};
pub use pause::{HotkeyPause, PauseState};
pub use projector::DesktopSize;
pub use registry::{MarkerType, TargetRegistry};
pub use scene::{CameraView, MemoryScene, ObjectId, Scene};
pub use selector::{NearestTargetSelector, TargetEntity};
pub use snapshot::{SceneSnapshot, SnapshotScene};
pub use symbol::InputSymbol;
