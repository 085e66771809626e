//! Discovery of the target marker type.
//!
//! The marker component is defined by a separately loaded part of the host,
//! so its type is only known once some live component of that type exists.
//! The registry latches the first match and never looks again.

use crate::scene::{ObjectId, Scene, TypeToken};
use tracing::{debug, info};

/// Runtime type name of the component that marks target boxes.
pub const DEFAULT_MARKER_NAME: &str = "TargetBoxScriptFlat";

/// Opaque handle for the discovered marker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerType(TypeToken);

impl MarkerType {
    pub fn token(self) -> TypeToken {
        self.0
    }

    /// True when `object` carries a component of this type.
    pub fn is_attached_to(self, scene: &impl Scene, object: ObjectId) -> bool {
        scene.component_tokens(object).contains(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TargetRegistry {
    marker_name: String,
    marker: Option<MarkerType>,
}

impl TargetRegistry {
    pub fn new(marker_name: impl Into<String>) -> Self {
        Self {
            marker_name: marker_name.into(),
            marker: None,
        }
    }

    pub fn marker_name(&self) -> &str {
        &self.marker_name
    }

    pub fn marker(&self) -> Option<MarkerType> {
        self.marker
    }

    /// Scan the live components for the marker type unless it is already
    /// latched. Returns the latched marker, if any.
    pub fn discover(&mut self, scene: &impl Scene) -> Option<MarkerType> {
        if self.marker.is_some() {
            return self.marker;
        }

        let found = scene
            .live_component_types()
            .into_iter()
            .find(|t| t.name == self.marker_name);

        match found {
            Some(component_type) => {
                info!("Found {} type", self.marker_name);
                self.marker = Some(MarkerType(component_type.token));
            }
            None => debug!("{} type not loaded yet", self.marker_name),
        }
        self.marker
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;

    #[test]
    fn test_undiscovered_until_marker_appears() {
        let mut scene = MemoryScene::new();
        let root = scene.spawn("Targets", None);
        scene.add_component(root, "RectTransform");

        let mut registry = TargetRegistry::default();
        assert!(registry.discover(&scene).is_none());

        let target = scene.spawn("Box", Some(root));
        scene.add_component(target, DEFAULT_MARKER_NAME);
        let marker = registry.discover(&scene).unwrap();
        assert!(marker.is_attached_to(&scene, target));
        assert!(!marker.is_attached_to(&scene, root));
    }

    #[test]
    fn test_latch_survives_marker_disappearing() {
        let mut scene = MemoryScene::new();
        let target = scene.spawn("Box", None);
        scene.add_component(target, DEFAULT_MARKER_NAME);

        let mut registry = TargetRegistry::default();
        let marker = registry.discover(&scene).unwrap();

        scene.despawn(target);
        assert_eq!(registry.discover(&scene), Some(marker));
        assert_eq!(registry.marker(), Some(marker));
    }

    #[test]
    fn test_name_match_is_exact() {
        let mut scene = MemoryScene::new();
        let target = scene.spawn("Box", None);
        scene.add_component(target, "TargetBoxScript");
        scene.add_component(target, "targetboxscriptflat");

        let mut registry = TargetRegistry::default();
        assert!(registry.discover(&scene).is_none());
    }
}
