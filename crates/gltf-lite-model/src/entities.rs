// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity records of the document graph
//!
//! Entities reference each other only by id string, never by direct
//! ownership; resolution is an explicit store lookup that can fail. `extras`
//! is carried as raw JSON text so the model crate stays JSON-library
//! agnostic.

use std::collections::BTreeMap;

use crate::{
    AccessorKind, AlphaMode, BufferViewTarget, ComponentType, Entity, ExtensionSet, GltfError,
    InterpolationKind, MagFilter, MeshMode, MinFilter, Result, TargetPath, WrapMode,
};

macro_rules! impl_entity {
    ($($ty:ident),* $(,)?) => {
        $(impl Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        })*
    };
}

impl_entity!(
    Accessor, Animation, Buffer, BufferView, Camera, Image, Material, Mesh, Node, Sampler, Scene,
    Skin, Texture,
);

/// Document metadata (`asset` in JSON); not an entity-store member
#[derive(Clone, PartialEq, Debug)]
pub struct Asset {
    /// Format version, "2.0" for every document this crate produces
    pub version: String,
    /// Minimum version a loader must support to open the document
    pub min_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
            extensions: ExtensionSet::new(),
            extras: None,
        }
    }
}

/// Named byte blob: external file, inline data-URI, or the GLB binary chunk
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Buffer {
    pub id: String,
    pub name: Option<String>,
    /// External or data-URI location; `None` for generated and GLB buffers
    pub uri: Option<String>,
    pub byte_length: u64,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Contiguous byte range within one buffer
#[derive(Clone, PartialEq, Debug, Default)]
pub struct BufferView {
    pub id: String,
    pub name: Option<String>,
    pub buffer_id: String,
    pub byte_offset: u64,
    pub byte_length: u64,
    pub byte_stride: Option<u64>,
    pub target: Option<BufferViewTarget>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Typed-array view into a buffer view
#[derive(Clone, PartialEq, Debug)]
pub struct Accessor {
    pub id: String,
    pub name: Option<String>,
    pub buffer_view_id: Option<String>,
    /// Offset within the buffer view, a multiple of the component size
    pub byte_offset: u64,
    pub component_type: ComponentType,
    pub kind: AccessorKind,
    pub normalized: bool,
    /// Number of elements (not components)
    pub count: u64,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Default for Accessor {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            buffer_view_id: None,
            byte_offset: 0,
            component_type: ComponentType::Float,
            kind: AccessorKind::Scalar,
            normalized: false,
            count: 0,
            min: Vec::new(),
            max: Vec::new(),
            extensions: ExtensionSet::new(),
            extras: None,
        }
    }
}

impl Accessor {
    /// Total byte length of the described typed array
    ///
    /// `count` comes straight off the wire, so a product that does not fit
    /// u64 is a format violation, not a panic.
    pub fn byte_length(&self) -> Result<u64> {
        let element_size = (self.kind.components() * self.component_type.size()) as u64;
        self.count.checked_mul(element_size).ok_or_else(|| {
            GltfError::format(format!("Accessor '{}' byte length overflows", self.id))
        })
    }
}

/// Scene graph node
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Node {
    pub id: String,
    pub name: Option<String>,
    pub children: Vec<String>,
    pub mesh_id: Option<String>,
    pub skin_id: Option<String>,
    pub camera_id: Option<String>,
    /// Column-major 4x4 transform; mutually exclusive with TRS
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub weights: Vec<f32>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Node {
    /// A node may carry a matrix or a TRS decomposition, never both
    pub fn has_valid_transform(&self) -> bool {
        self.matrix.is_none()
            || (self.translation.is_none() && self.rotation.is_none() && self.scale.is_none())
    }
}

/// One drawable part of a mesh
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MeshPrimitive {
    /// Attribute semantic ("POSITION", "NORMAL", ...) -> accessor id
    pub attributes: BTreeMap<String, String>,
    pub indices_id: Option<String>,
    pub material_id: Option<String>,
    pub mode: MeshMode,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Mesh {
    pub id: String,
    pub name: Option<String>,
    pub primitives: Vec<MeshPrimitive>,
    pub weights: Vec<f32>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Reference from a material to a texture (`textureInfo` in JSON)
#[derive(Clone, PartialEq, Debug)]
pub struct TextureRef {
    pub texture_id: String,
    pub texcoord: u32,
}

impl TextureRef {
    pub fn new(texture_id: impl Into<String>) -> Self {
        Self {
            texture_id: texture_id.into(),
            texcoord: 0,
        }
    }
}

/// Metallic-roughness PBR material
#[derive(Clone, PartialEq, Debug)]
pub struct Material {
    pub id: String,
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureRef>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureRef>,
    pub normal_texture: Option<TextureRef>,
    pub occlusion_texture: Option<TextureRef>,
    pub emissive_texture: Option<TextureRef>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            extensions: ExtensionSet::new(),
            extras: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Texture {
    pub id: String,
    pub name: Option<String>,
    pub sampler_id: Option<String>,
    pub image_id: Option<String>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Image payload: external uri, data-URI, or bytes inside a buffer view
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Image {
    pub id: String,
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view_id: Option<String>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Sampler {
    pub id: String,
    pub name: Option<String>,
    pub mag_filter: Option<MagFilter>,
    pub min_filter: Option<MinFilter>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Perspective or orthographic projection parameters
#[derive(Clone, PartialEq, Debug)]
pub enum CameraProjection {
    Perspective {
        aspect_ratio: Option<f32>,
        yfov: f32,
        znear: f32,
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Camera {
    pub id: String,
    pub name: Option<String>,
    pub projection: CameraProjection,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            projection: CameraProjection::Perspective {
                aspect_ratio: None,
                yfov: 1.0,
                znear: 0.01,
                zfar: None,
            },
            extensions: ExtensionSet::new(),
            extras: None,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Skin {
    pub id: String,
    pub name: Option<String>,
    pub inverse_bind_matrices_id: Option<String>,
    pub skeleton_id: Option<String>,
    pub joint_ids: Vec<String>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

/// Binds one animation sampler to one node property
#[derive(Clone, PartialEq, Debug)]
pub struct AnimationChannel {
    /// Index into the owning animation's `samplers`
    pub sampler_index: usize,
    pub target_node_id: Option<String>,
    pub target_path: TargetPath,
}

/// Keyframe input/output accessor pair
#[derive(Clone, PartialEq, Debug)]
pub struct AnimationSampler {
    pub input_id: String,
    pub output_id: String,
    pub interpolation: InterpolationKind,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Animation {
    pub id: String,
    pub name: Option<String>,
    pub channels: Vec<AnimationChannel>,
    pub samplers: Vec<AnimationSampler>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct Scene {
    pub id: String,
    pub name: Option<String>,
    pub node_ids: Vec<String>,
    pub extensions: ExtensionSet,
    pub extras: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_byte_length() {
        let accessor = Accessor {
            component_type: ComponentType::UnsignedShort,
            kind: AccessorKind::Vec3,
            count: 7,
            ..Default::default()
        };
        assert_eq!(accessor.byte_length().unwrap(), 7 * 3 * 2);
    }

    #[test]
    fn test_accessor_byte_length_overflow_is_format_error() {
        let accessor = Accessor {
            component_type: ComponentType::UnsignedShort,
            kind: AccessorKind::Vec3,
            count: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            accessor.byte_length(),
            Err(GltfError::Format(_))
        ));
    }

    #[test]
    fn test_node_transform_exclusivity() {
        let mut node = Node::default();
        assert!(node.has_valid_transform());

        node.translation = Some([1.0, 0.0, 0.0]);
        assert!(node.has_valid_transform());

        node.matrix = Some([0.0; 16]);
        assert!(!node.has_valid_transform());

        node.translation = None;
        assert!(node.has_valid_transform());
    }
}
