// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire-level enumerations shared across the document graph
//!
//! Numeric values follow the glTF 2.0 specification (originally GL constants).

use serde::{Deserialize, Serialize};

use crate::{GltfError, Result};

/// Component type of an accessor element
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    /// Size of one component in bytes
    pub fn size(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    /// glTF wire value (GL constant)
    pub fn value(self) -> u32 {
        match self {
            ComponentType::Byte => 5120,
            ComponentType::UnsignedByte => 5121,
            ComponentType::Short => 5122,
            ComponentType::UnsignedShort => 5123,
            ComponentType::UnsignedInt => 5125,
            ComponentType::Float => 5126,
        }
    }

    /// Parse a glTF wire value
    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            5120 => Ok(ComponentType::Byte),
            5121 => Ok(ComponentType::UnsignedByte),
            5122 => Ok(ComponentType::Short),
            5123 => Ok(ComponentType::UnsignedShort),
            5125 => Ok(ComponentType::UnsignedInt),
            5126 => Ok(ComponentType::Float),
            other => Err(GltfError::format(format!(
                "Unknown accessor componentType {other}"
            ))),
        }
    }
}

/// Element type of an accessor (scalar, vector or matrix)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AccessorKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorKind {
    /// Number of components per element
    pub fn components(self) -> usize {
        match self {
            AccessorKind::Scalar => 1,
            AccessorKind::Vec2 => 2,
            AccessorKind::Vec3 => 3,
            AccessorKind::Vec4 | AccessorKind::Mat2 => 4,
            AccessorKind::Mat3 => 9,
            AccessorKind::Mat4 => 16,
        }
    }

    /// glTF wire name ("SCALAR", "VEC3", ...)
    pub fn name(self) -> &'static str {
        match self {
            AccessorKind::Scalar => "SCALAR",
            AccessorKind::Vec2 => "VEC2",
            AccessorKind::Vec3 => "VEC3",
            AccessorKind::Vec4 => "VEC4",
            AccessorKind::Mat2 => "MAT2",
            AccessorKind::Mat3 => "MAT3",
            AccessorKind::Mat4 => "MAT4",
        }
    }

    /// Parse a glTF wire name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SCALAR" => Ok(AccessorKind::Scalar),
            "VEC2" => Ok(AccessorKind::Vec2),
            "VEC3" => Ok(AccessorKind::Vec3),
            "VEC4" => Ok(AccessorKind::Vec4),
            "MAT2" => Ok(AccessorKind::Mat2),
            "MAT3" => Ok(AccessorKind::Mat3),
            "MAT4" => Ok(AccessorKind::Mat4),
            other => Err(GltfError::format(format!("Unknown accessor type '{other}'"))),
        }
    }
}

/// Usage hint for a buffer view (index vs vertex data)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BufferViewTarget {
    /// Vertex attribute data (34962)
    ArrayBuffer,
    /// Index data (34963)
    ElementArrayBuffer,
}

impl BufferViewTarget {
    pub fn value(self) -> u32 {
        match self {
            BufferViewTarget::ArrayBuffer => 34962,
            BufferViewTarget::ElementArrayBuffer => 34963,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            34962 => Ok(BufferViewTarget::ArrayBuffer),
            34963 => Ok(BufferViewTarget::ElementArrayBuffer),
            other => Err(GltfError::format(format!(
                "Unknown bufferView target {other}"
            ))),
        }
    }
}

/// Primitive topology of a mesh primitive
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum MeshMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl MeshMode {
    pub fn value(self) -> u32 {
        self as u32
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            0 => Ok(MeshMode::Points),
            1 => Ok(MeshMode::Lines),
            2 => Ok(MeshMode::LineLoop),
            3 => Ok(MeshMode::LineStrip),
            4 => Ok(MeshMode::Triangles),
            5 => Ok(MeshMode::TriangleStrip),
            6 => Ok(MeshMode::TriangleFan),
            other => Err(GltfError::format(format!("Unknown primitive mode {other}"))),
        }
    }
}

/// Alpha rendering mode of a material
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn name(self) -> &'static str {
        match self {
            AlphaMode::Opaque => "OPAQUE",
            AlphaMode::Mask => "MASK",
            AlphaMode::Blend => "BLEND",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "OPAQUE" => Ok(AlphaMode::Opaque),
            "MASK" => Ok(AlphaMode::Mask),
            "BLEND" => Ok(AlphaMode::Blend),
            other => Err(GltfError::format(format!("Unknown alphaMode '{other}'"))),
        }
    }
}

/// Animation sampler interpolation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum InterpolationKind {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl InterpolationKind {
    pub fn name(self) -> &'static str {
        match self {
            InterpolationKind::Linear => "LINEAR",
            InterpolationKind::Step => "STEP",
            InterpolationKind::CubicSpline => "CUBICSPLINE",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "LINEAR" => Ok(InterpolationKind::Linear),
            "STEP" => Ok(InterpolationKind::Step),
            "CUBICSPLINE" => Ok(InterpolationKind::CubicSpline),
            other => Err(GltfError::format(format!(
                "Unknown interpolation '{other}'"
            ))),
        }
    }
}

/// Animated node property targeted by an animation channel
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    pub fn name(self) -> &'static str {
        match self {
            TargetPath::Translation => "translation",
            TargetPath::Rotation => "rotation",
            TargetPath::Scale => "scale",
            TargetPath::Weights => "weights",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "translation" => Ok(TargetPath::Translation),
            "rotation" => Ok(TargetPath::Rotation),
            "scale" => Ok(TargetPath::Scale),
            "weights" => Ok(TargetPath::Weights),
            other => Err(GltfError::format(format!("Unknown target path '{other}'"))),
        }
    }
}

/// Texture coordinate wrapping mode
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl WrapMode {
    pub fn value(self) -> u32 {
        match self {
            WrapMode::ClampToEdge => 33071,
            WrapMode::MirroredRepeat => 33648,
            WrapMode::Repeat => 10497,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            33071 => Ok(WrapMode::ClampToEdge),
            33648 => Ok(WrapMode::MirroredRepeat),
            10497 => Ok(WrapMode::Repeat),
            other => Err(GltfError::format(format!("Unknown wrap mode {other}"))),
        }
    }
}

/// Texture magnification filter
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MagFilter {
    Nearest,
    Linear,
}

impl MagFilter {
    pub fn value(self) -> u32 {
        match self {
            MagFilter::Nearest => 9728,
            MagFilter::Linear => 9729,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            9728 => Ok(MagFilter::Nearest),
            9729 => Ok(MagFilter::Linear),
            other => Err(GltfError::format(format!("Unknown magFilter {other}"))),
        }
    }
}

/// Texture minification filter
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    pub fn value(self) -> u32 {
        match self {
            MinFilter::Nearest => 9728,
            MinFilter::Linear => 9729,
            MinFilter::NearestMipmapNearest => 9984,
            MinFilter::LinearMipmapNearest => 9985,
            MinFilter::NearestMipmapLinear => 9986,
            MinFilter::LinearMipmapLinear => 9987,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            9728 => Ok(MinFilter::Nearest),
            9729 => Ok(MinFilter::Linear),
            9984 => Ok(MinFilter::NearestMipmapNearest),
            9985 => Ok(MinFilter::LinearMipmapNearest),
            9986 => Ok(MinFilter::NearestMipmapLinear),
            9987 => Ok(MinFilter::LinearMipmapLinear),
            other => Err(GltfError::format(format!("Unknown minFilter {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_sizes() {
        assert_eq!(ComponentType::Byte.size(), 1);
        assert_eq!(ComponentType::UnsignedShort.size(), 2);
        assert_eq!(ComponentType::Float.size(), 4);
    }

    #[test]
    fn test_wire_values_round_trip() {
        for ct in [
            ComponentType::Byte,
            ComponentType::UnsignedByte,
            ComponentType::Short,
            ComponentType::UnsignedShort,
            ComponentType::UnsignedInt,
            ComponentType::Float,
        ] {
            assert_eq!(ComponentType::from_value(ct.value()).unwrap(), ct);
        }
        assert!(ComponentType::from_value(5124).is_err());
    }

    #[test]
    fn test_accessor_kind_components() {
        assert_eq!(AccessorKind::Scalar.components(), 1);
        assert_eq!(AccessorKind::Vec3.components(), 3);
        assert_eq!(AccessorKind::Mat4.components(), 16);
        assert_eq!(AccessorKind::from_name("VEC3").unwrap(), AccessorKind::Vec3);
        assert!(AccessorKind::from_name("VEC5").is_err());
    }
}
