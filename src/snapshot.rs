//! Scene snapshots exported by the host as JSON.
//!
//! An exporter running inside the host writes the relevant part of its
//! hierarchy to a file; [`SnapshotScene`] re-reads that file on demand and
//! serves it through the [`Scene`] trait.
//!
//! ```json
//! {
//!   "paused": false,
//!   "objects": [
//!     { "id": 1, "name": "Targeting" },
//!     { "id": 2, "name": "Hud", "parent": 1 },
//!     { "id": 3, "name": "Targets", "parent": 2 },
//!     { "id": 4, "name": "Box", "parent": 3,
//!       "local_position": [0.5, 0.0, 0.0],
//!       "components": ["RectTransform", "TargetBoxScriptFlat"] }
//!   ]
//! }
//! ```

use crate::error::{OverlayError, Result};
use crate::pause::PauseState;
use crate::scene::{CameraView, ComponentType, MemoryScene, ObjectId, Scene, TypeToken};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub paused: bool,

    #[serde(default)]
    pub objects: Vec<SnapshotObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotObject {
    pub id: ObjectId,
    pub name: String,

    #[serde(default)]
    pub parent: Option<ObjectId>,

    #[serde(default)]
    pub local_position: Vec3,

    /// Overrides the position accumulated from the parent chain.
    #[serde(default)]
    pub world_position: Option<Vec3>,

    /// Runtime type names of attached components.
    #[serde(default)]
    pub components: Vec<String>,

    #[serde(default)]
    pub camera: Option<CameraView>,
}

impl SceneSnapshot {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| OverlayError::config_load(path.display().to_string(), e.to_string()))?;
        let snapshot = serde_json::from_str(&content)?;
        Ok(snapshot)
    }

    /// Replace the contents of `scene` with this snapshot. Objects must be
    /// listed after their parent; an unknown parent makes the object a root.
    pub fn apply(&self, scene: &mut MemoryScene) {
        scene.clear();
        scene.set_paused(self.paused);
        for object in &self.objects {
            scene.insert(object.id, object.name.clone(), object.parent);
            scene.set_local_position(object.id, object.local_position);
            if let Some(world) = object.world_position {
                scene.set_world_position(object.id, world);
            }
            for component in &object.components {
                scene.add_component(object.id, component);
            }
            if let Some(camera) = object.camera {
                scene.attach_camera(object.id, camera);
            }
        }
    }
}

/// A [`Scene`] backed by a snapshot file.
pub struct SnapshotScene {
    path: PathBuf,
    scene: RwLock<MemoryScene>,
}

impl SnapshotScene {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let snapshot_scene = Self {
            path: path.into(),
            scene: RwLock::new(MemoryScene::new()),
        };
        snapshot_scene.refresh()?;
        Ok(snapshot_scene)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the snapshot file. On failure the previous contents stay.
    pub fn refresh(&self) -> Result<()> {
        let snapshot = SceneSnapshot::from_file(&self.path)?;
        let mut scene = self.scene.write().unwrap_or_else(|e| e.into_inner());
        snapshot.apply(&mut scene);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryScene> {
        self.scene.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scene for SnapshotScene {
    fn find_by_path(&self, path: &str) -> Option<ObjectId> {
        self.read().find_by_path(path)
    }

    fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.read().children(parent)
    }

    fn live_component_types(&self) -> Vec<ComponentType> {
        self.read().live_component_types()
    }

    fn component_tokens(&self, object: ObjectId) -> Vec<TypeToken> {
        self.read().component_tokens(object)
    }

    fn local_position(&self, object: ObjectId) -> Option<Vec3> {
        self.read().local_position(object)
    }

    fn world_position(&self, object: ObjectId) -> Option<Vec3> {
        self.read().world_position(object)
    }

    fn camera(&self, object: ObjectId) -> Option<CameraView> {
        self.read().camera(object)
    }
}

impl PauseState for SnapshotScene {
    fn is_paused(&self) -> bool {
        self.read().is_paused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"
    {
        "paused": false,
        "objects": [
            { "id": 10, "name": "Targeting" },
            { "id": 11, "name": "Hud", "parent": 10 },
            { "id": 12, "name": "Targets", "parent": 11 },
            {
                "id": 40, "name": "Box", "parent": 12,
                "local_position": [0.5, 0.0, 0.0],
                "components": ["RectTransform", "TargetBoxScriptFlat"]
            },
            { "id": 1, "name": "UI Root" },
            {
                "id": 2, "name": "Camera", "parent": 1,
                "camera": {
                    "view_projection": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1],
                    "pixel_width": 1920,
                    "pixel_height": 1080
                }
            }
        ]
    }
    "#;

    #[test]
    fn test_snapshot_applies_hierarchy() {
        let snapshot: SceneSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let mut scene = MemoryScene::new();
        snapshot.apply(&mut scene);

        let targets = scene.find_by_path("Targeting/Hud/Targets").unwrap();
        assert_eq!(targets, ObjectId(12));
        assert_eq!(scene.children(targets), vec![ObjectId(40)]);
        assert_eq!(scene.local_position(ObjectId(40)), Some(Vec3::new(0.5, 0.0, 0.0)));
        assert_eq!(scene.component_tokens(ObjectId(40)).len(), 2);

        let camera = scene.find_by_path("/UI Root/Camera").unwrap();
        let view = scene.camera(camera).unwrap();
        assert_eq!((view.pixel_width, view.pixel_height), (1920, 1080));
    }

    #[test]
    fn test_tokens_stable_across_reloads() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scene.json");
        fs::write(&path, SNAPSHOT)?;

        let scene = SnapshotScene::open(&path)?;
        let before = scene.component_tokens(ObjectId(40));

        fs::write(
            &path,
            r#"{ "paused": true, "objects": [
                { "id": 7, "name": "Other", "components": ["TargetBoxScriptFlat"] }
            ] }"#,
        )?;
        scene.refresh()?;

        assert!(scene.is_paused());
        assert!(scene.component_tokens(ObjectId(40)).is_empty());
        assert_eq!(scene.component_tokens(ObjectId(7))[0], before[1]);
        Ok(())
    }

    #[test]
    fn test_failed_refresh_keeps_previous_scene() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scene.json");
        fs::write(&path, SNAPSHOT)?;

        let scene = SnapshotScene::open(&path)?;
        fs::write(&path, "{ not json")?;
        assert!(scene.refresh().is_err());
        assert_eq!(scene.find_by_path("Targeting/Hud/Targets"), Some(ObjectId(12)));
        Ok(())
    }
}
