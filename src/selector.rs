//! Nearest target selection.

use crate::registry::MarkerType;
use crate::scene::{ObjectId, Scene};
use glam::Vec3;

/// A target box the overlay can click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEntity {
    pub id: ObjectId,
    pub local_position: Vec3,
}

impl TargetEntity {
    /// Distance from the container's local origin.
    pub fn distance(&self) -> f32 {
        self.local_position.length()
    }
}

/// Tracks the target closest to the origin of the targets container.
#[derive(Debug, Clone, Default)]
pub struct NearestTargetSelector {
    selection: Option<TargetEntity>,
}

impl NearestTargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<TargetEntity> {
        self.selection
    }

    /// Re-select among the direct children of `parent` that carry `marker`.
    ///
    /// Ties go to the first child in hierarchy order. When no child is
    /// eligible the previous selection is kept as-is, even if that object no
    /// longer exists.
    pub fn select_nearest(
        &mut self,
        scene: &impl Scene,
        parent: ObjectId,
        marker: MarkerType,
    ) -> Option<TargetEntity> {
        let mut nearest_distance = f32::MAX;

        for child in scene.children(parent) {
            if !marker.is_attached_to(scene, child) {
                continue;
            }
            let Some(local_position) = scene.local_position(child) else {
                continue;
            };

            let distance = local_position.length();
            if distance < nearest_distance {
                self.selection = Some(TargetEntity {
                    id: child,
                    local_position,
                });
                nearest_distance = distance;
            }
        }

        self.selection
    }
}
