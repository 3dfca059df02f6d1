//! Scene records: poses, attribute sets, object records, and the scene document.
//!
//! Field names on the wire are fixed by the document schema (`P`, `R`, `S`, `N`, `I`,
//! `ObjectList`, ...); Rust-side names describe what the fields hold.
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Serde shape for [`Vec3`] as an `{ "x", "y", "z" }` object.
#[derive(Serialize, Deserialize)]
#[serde(remote = "Vec3")]
pub(crate) struct Vec3Def {
    x: f32,
    y: f32,
    z: f32,
}

/// Position, Euler rotation in degrees, and scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(rename = "P", with = "Vec3Def")]
    pub position: Vec3,
    #[serde(rename = "R", with = "Vec3Def")]
    pub rotation: Vec3,
    #[serde(rename = "S", with = "Vec3Def")]
    pub scale: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Descriptive flags and metadata attached to a record.
///
/// Shared between records as an immutable `Arc`; never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AttributeSet {
    pub is_static: bool,
    pub can_collide: bool,
    pub is_visible: bool,
    pub display_name: String,
    /// Empty means no custom texture.
    pub custom_texture: String,
    pub custom_model: bool,
    pub custom_weight: f32,
}

impl AttributeSet {
    /// Static, collidable, visible attributes with the given display name.
    pub fn solid(display_name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            can_collide: true,
            is_visible: true,
            display_name: display_name.into(),
            ..Default::default()
        }
    }
}

/// One entry in the document: a pose, a type identifier, and shared attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(rename = "N")]
    pub name: String,
    #[serde(rename = "I")]
    pub info: Arc<AttributeSet>,
}

impl ObjectRecord {
    pub fn new(pose: Pose, name: impl Into<String>, info: Arc<AttributeSet>) -> Self {
        Self {
            pose,
            name: name.into(),
            info,
        }
    }

    /// An unnamed reference record with default attributes.
    pub fn reference(pose: Pose) -> Self {
        Self::new(pose, "", Arc::new(AttributeSet::default()))
    }
}

/// Poses for the camera and spawn reference records.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePoses {
    pub camera: Pose,
    pub spawn: Pose,
}

impl Default for ReferencePoses {
    fn default() -> Self {
        Self {
            camera: Pose::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO),
            spawn: Pose::new(Vec3::new(0.0, 2000.0, 0.0), Vec3::ZERO, Vec3::ONE),
        }
    }
}

/// Root aggregate written to disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Placements in generation order.
    #[serde(rename = "ObjectList")]
    pub objects: Vec<ObjectRecord>,
    #[serde(rename = "CameraInfo")]
    pub camera: ObjectRecord,
    #[serde(rename = "SpawnpointInfo")]
    pub spawnpoint: ObjectRecord,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "PrettyPrint")]
    pub pretty_print: bool,
    #[serde(rename = "Version")]
    pub version: String,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new("tree test", "1.3")
    }
}

impl SceneDocument {
    /// An empty document with default reference records.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let reference = ReferencePoses::default();
        Self {
            objects: Vec::new(),
            camera: ObjectRecord::reference(reference.camera),
            spawnpoint: ObjectRecord::reference(reference.spawn),
            name: name.into(),
            pretty_print: false,
            version: version.into(),
        }
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    /// Appends a placement at the end of the sequence.
    pub fn push(&mut self, record: ObjectRecord) {
        self.objects.push(record);
    }

    /// Sets the single camera and spawn records with empty names and default attributes.
    pub fn finalize(&mut self, poses: ReferencePoses) {
        self.camera = ObjectRecord::reference(poses.camera);
        self.spawnpoint = ObjectRecord::reference(poses.spawn);
    }

    /// Sets the camera and spawn records verbatim, for callers that need names or attributes.
    pub fn finalize_with(&mut self, camera: ObjectRecord, spawnpoint: ObjectRecord) {
        self.camera = camera;
        self.spawnpoint = spawnpoint;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
