//! The scene the overlay reads from.
//!
//! The host engine owns every object; the overlay only queries identities,
//! positions, component types and camera views, and never mutates anything.
//! [`MemoryScene`] is a plain in-memory implementation used by the snapshot
//! adapter and by tests.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque identity of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Opaque handle for a component type. Two components share a token exactly
/// when they are of the same runtime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken(pub u32);

/// A component type as seen during discovery: token plus runtime type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    pub token: TypeToken,
    pub name: String,
}

/// Projection state of a camera, as needed to map world points to its
/// render target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    /// Column-major projection * view matrix.
    pub view_projection: Mat4,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl CameraView {
    pub fn new(view_projection: Mat4, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            view_projection,
            pixel_width,
            pixel_height,
        }
    }

    /// Orthographic camera whose world units are render-target pixels, with
    /// the origin at the bottom-left corner.
    pub fn pixel_aligned(pixel_width: u32, pixel_height: u32) -> Self {
        let projection = Mat4::orthographic_rh(
            0.0,
            pixel_width as f32,
            0.0,
            pixel_height as f32,
            -1000.0,
            1000.0,
        );
        Self::new(projection, pixel_width, pixel_height)
    }

    /// Map a world point into render-target pixels (bottom-left origin).
    /// The z component carries normalized depth.
    pub fn world_to_screen(&self, world: Vec3) -> Vec3 {
        let ndc = self.view_projection.project_point3(world);
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.pixel_width as f32,
            (ndc.y + 1.0) * 0.5 * self.pixel_height as f32,
            ndc.z,
        )
    }
}

/// Read-only query interface onto the host scene.
pub trait Scene: Send + Sync {
    /// Resolve a `/`-separated object path. A leading `/` anchors the path at
    /// a root object.
    fn find_by_path(&self, path: &str) -> Option<ObjectId>;

    /// Direct children of `parent`, in hierarchy order.
    fn children(&self, parent: ObjectId) -> Vec<ObjectId>;

    /// Types of every live component in the scene.
    fn live_component_types(&self) -> Vec<ComponentType>;

    /// Type tokens of the components attached to `object`.
    fn component_tokens(&self, object: ObjectId) -> Vec<TypeToken>;

    fn local_position(&self, object: ObjectId) -> Option<Vec3>;

    fn world_position(&self, object: ObjectId) -> Option<Vec3>;

    /// The camera attached to `object`, if any.
    fn camera(&self, object: ObjectId) -> Option<CameraView>;
}

#[derive(Debug, Clone)]
struct SceneObject {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    local_position: Vec3,
    world_position: Option<Vec3>,
    components: Vec<TypeToken>,
    camera: Option<CameraView>,
}

/// In-memory scene hierarchy.
///
/// World positions default to the sum of local positions up the parent chain
/// unless set explicitly. Component type names are interned into tokens that
/// stay stable for the lifetime of the scene, including across [`clear`].
///
/// [`clear`]: MemoryScene::clear
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: HashMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    types: Vec<String>,
    next_id: u64,
    paused: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every object, keeping interned type tokens.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.roots.clear();
        self.next_id = 0;
        self.paused = false;
    }

    pub fn spawn(&mut self, name: impl Into<String>, parent: Option<ObjectId>) -> ObjectId {
        while self.objects.contains_key(&ObjectId(self.next_id)) {
            self.next_id += 1;
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.insert(id, name, parent);
        id
    }

    /// Insert an object under a caller-chosen id, replacing any object that
    /// already had it. A parent that does not exist makes the object a root.
    pub fn insert(&mut self, id: ObjectId, name: impl Into<String>, parent: Option<ObjectId>) {
        if self.objects.contains_key(&id) {
            self.despawn(id);
        }
        let parent = parent.filter(|p| self.objects.contains_key(p));
        match parent {
            Some(p) => {
                if let Some(parent_object) = self.objects.get_mut(&p) {
                    parent_object.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.objects.insert(
            id,
            SceneObject {
                name: name.into(),
                parent,
                children: Vec::new(),
                local_position: Vec3::ZERO,
                world_position: None,
                components: Vec::new(),
                camera: None,
            },
        );
    }

    /// Destroy an object and its whole subtree.
    pub fn despawn(&mut self, id: ObjectId) {
        let Some(object) = self.objects.remove(&id) else {
            return;
        };
        match object.parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        for child in object.children {
            self.despawn_detached(child);
        }
    }

    fn despawn_detached(&mut self, id: ObjectId) {
        if let Some(object) = self.objects.remove(&id) {
            for child in object.children {
                self.despawn_detached(child);
            }
        }
    }

    pub fn set_local_position(&mut self, id: ObjectId, position: Vec3) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.local_position = position;
        }
    }

    pub fn set_world_position(&mut self, id: ObjectId, position: Vec3) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.world_position = Some(position);
        }
    }

    /// Attach a component of the named type, interning the name.
    pub fn add_component(&mut self, id: ObjectId, type_name: &str) {
        let token = self.intern(type_name);
        if let Some(object) = self.objects.get_mut(&id) {
            object.components.push(token);
        }
    }

    pub fn attach_camera(&mut self, id: ObjectId, camera: CameraView) {
        if let Some(object) = self.objects.get_mut(&id) {
            object.camera = Some(camera);
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn intern(&mut self, type_name: &str) -> TypeToken {
        if let Some(index) = self.types.iter().position(|t| t == type_name) {
            return TypeToken(index as u32);
        }
        self.types.push(type_name.to_string());
        TypeToken((self.types.len() - 1) as u32)
    }

    /// Every object in depth-first hierarchy order.
    fn walk(&self) -> Vec<ObjectId> {
        let mut order = Vec::with_capacity(self.objects.len());
        let mut stack: Vec<ObjectId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(object) = self.objects.get(&id) {
                stack.extend(object.children.iter().rev().copied());
            }
        }
        order
    }

    fn descend(&self, from: ObjectId, segments: &[&str]) -> Option<ObjectId> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(from);
        };
        let object = self.objects.get(&from)?;
        object
            .children
            .iter()
            .filter(|c| self.objects.get(*c).is_some_and(|o| o.name == *first))
            .find_map(|c| self.descend(*c, rest))
    }
}

impl Scene for MemoryScene {
    fn find_by_path(&self, path: &str) -> Option<ObjectId> {
        let anchored = path.starts_with('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (first, rest) = segments.split_first()?;

        let candidates = if anchored {
            self.roots.clone()
        } else {
            self.walk()
        };
        candidates
            .into_iter()
            .filter(|id| self.objects.get(id).is_some_and(|o| o.name == *first))
            .find_map(|id| self.descend(id, rest))
    }

    fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.objects
            .get(&parent)
            .map(|o| o.children.clone())
            .unwrap_or_default()
    }

    fn live_component_types(&self) -> Vec<ComponentType> {
        self.walk()
            .into_iter()
            .filter_map(|id| self.objects.get(&id))
            .flat_map(|o| o.components.iter().copied())
            .map(|token| ComponentType {
                token,
                name: self.types[token.0 as usize].clone(),
            })
            .collect()
    }

    fn component_tokens(&self, object: ObjectId) -> Vec<TypeToken> {
        self.objects
            .get(&object)
            .map(|o| o.components.clone())
            .unwrap_or_default()
    }

    fn local_position(&self, object: ObjectId) -> Option<Vec3> {
        self.objects.get(&object).map(|o| o.local_position)
    }

    fn world_position(&self, object: ObjectId) -> Option<Vec3> {
        let o = self.objects.get(&object)?;
        if let Some(world) = o.world_position {
            return Some(world);
        }
        let parent_world = match o.parent {
            Some(p) => self.world_position(p).unwrap_or(Vec3::ZERO),
            None => Vec3::ZERO,
        };
        Some(parent_world + o.local_position)
    }

    fn camera(&self, object: ObjectId) -> Option<CameraView> {
        self.objects.get(&object).and_then(|o| o.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hud() -> (MemoryScene, ObjectId) {
        let mut scene = MemoryScene::new();
        let root = scene.spawn("Targeting", None);
        let hud = scene.spawn("Hud", Some(root));
        let targets = scene.spawn("Targets", Some(hud));
        (scene, targets)
    }

    #[test]
    fn test_find_by_path() {
        let (scene, targets) = hud();
        assert_eq!(scene.find_by_path("Targeting/Hud/Targets"), Some(targets));
        assert_eq!(scene.find_by_path("/Targeting/Hud/Targets"), Some(targets));
        assert_eq!(scene.find_by_path("Hud/Targets"), Some(targets));
        assert_eq!(scene.find_by_path("/Hud/Targets"), None);
        assert_eq!(scene.find_by_path("Targeting/Targets"), None);
        assert_eq!(scene.find_by_path(""), None);
    }

    #[test]
    fn test_find_by_path_backtracks_over_same_named_siblings() {
        let mut scene = MemoryScene::new();
        let root = scene.spawn("UI Root", None);
        let _empty = scene.spawn("Panel", Some(root));
        let panel = scene.spawn("Panel", Some(root));
        let camera = scene.spawn("Camera", Some(panel));
        assert_eq!(scene.find_by_path("/UI Root/Panel/Camera"), Some(camera));
    }

    #[test]
    fn test_children_in_order() {
        let (mut scene, targets) = hud();
        let a = scene.spawn("A", Some(targets));
        let b = scene.spawn("B", Some(targets));
        assert_eq!(scene.children(targets), vec![a, b]);
        scene.despawn(a);
        assert_eq!(scene.children(targets), vec![b]);
        assert!(scene.local_position(a).is_none());
    }

    #[test]
    fn test_type_tokens_are_shared_per_name() {
        let (mut scene, targets) = hud();
        let a = scene.spawn("A", Some(targets));
        let b = scene.spawn("B", Some(targets));
        scene.add_component(a, "TargetBoxScriptFlat");
        scene.add_component(b, "TargetBoxScriptFlat");
        scene.add_component(b, "RectTransform");

        assert_eq!(scene.component_tokens(a)[0], scene.component_tokens(b)[0]);
        assert_ne!(scene.component_tokens(b)[0], scene.component_tokens(b)[1]);

        let names: Vec<String> = scene.live_component_types().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["TargetBoxScriptFlat", "TargetBoxScriptFlat", "RectTransform"]);
    }

    #[test]
    fn test_world_position_accumulates_locals() {
        let (mut scene, targets) = hud();
        scene.set_local_position(targets, Vec3::new(10.0, 0.0, 0.0));
        let a = scene.spawn("A", Some(targets));
        scene.set_local_position(a, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.world_position(a), Some(Vec3::new(11.0, 2.0, 0.0)));

        scene.set_world_position(a, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(scene.world_position(a), Some(Vec3::new(5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_pixel_aligned_camera_maps_world_to_pixels() {
        let camera = CameraView::pixel_aligned(1920, 1080);
        let screen = camera.world_to_screen(Vec3::new(960.0, 540.0, 0.0));
        assert!((screen.x - 960.0).abs() < 1e-3);
        assert!((screen.y - 540.0).abs() < 1e-3);
    }
}
