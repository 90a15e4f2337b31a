// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF 2.0 JSON text -> Document
//!
//! Array elements are assigned their position as id, so index references in
//! the JSON become id references in the graph. References are not resolved
//! eagerly; a dangling index surfaces as `NotFound` on first lookup.

use gltf_lite_model::{
    is_min_version_satisfied, Accessor, AccessorKind, AlphaMode, Animation, AnimationChannel,
    AnimationSampler, AppendPolicy, Asset, Buffer, BufferView, BufferViewTarget, Camera,
    CameraProjection, ComponentType, Document, Entity, EntityStore, ExtensionPair, ExtensionSet,
    GltfError, Image, InterpolationKind, MagFilter, Material, Mesh, MeshMode, MeshPrimitive,
    MinFilter, Node, Result, Sampler, Scene, Skin, TargetPath, Texture, TextureRef, Version,
    WrapMode, KNOWN_VERSIONS,
};
use serde_json::{Map, Value};

use crate::registry::{ExtensionDeserializer, PropertyKind};
use crate::schema::{SchemaFlags, SchemaValidator};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Deserialization settings
#[derive(Default)]
pub struct DeserializeOptions<'a> {
    /// Tolerate a leading UTF-8 byte order mark; rejected by default
    pub ignore_byte_order_mark: bool,
    /// Handlers turning named extension JSON into typed extensions;
    /// unregistered names land in the raw extension map
    pub registry: Option<&'a ExtensionDeserializer>,
    /// Structural validator invoked on the parsed JSON before decoding
    pub validator: Option<&'a dyn SchemaValidator>,
    pub schema_flags: SchemaFlags,
}

/// Deserialize with default options
pub fn deserialize(text: &str) -> Result<Document> {
    deserialize_with(text, &DeserializeOptions::default())
}

/// Deserialize glTF JSON text into a document
pub fn deserialize_with(text: &str, options: &DeserializeOptions<'_>) -> Result<Document> {
    let text = match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(stripped) if options.ignore_byte_order_mark => stripped,
        Some(_) => {
            return Err(GltfError::format(
                "Document begins with a byte order mark",
            ))
        }
        None => text,
    };

    let json: Value = serde_json::from_str(text)
        .map_err(|e| GltfError::format(format!("Invalid JSON: {e}")))?;
    if let Some(validator) = options.validator {
        validator.validate(&json, options.schema_flags)?;
    }

    let reader = Reader {
        registry: options.registry,
    };
    reader.document(&json)
}

struct Reader<'a> {
    registry: Option<&'a ExtensionDeserializer>,
}

fn as_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| GltfError::format(format!("Expected '{what}' to be an object")))
}

fn str_field<'v>(obj: &'v Map<String, Value>, key: &str) -> Result<Option<&'v str>> {
    match obj.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be a string"))),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    Ok(str_field(obj, key)?.map(str::to_string))
}

fn u64_field(obj: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            GltfError::format(format!("Property '{key}' must be a non-negative integer"))
        }),
    }
}

fn req_u64(obj: &Map<String, Value>, key: &str) -> Result<u64> {
    u64_field(obj, key)?
        .ok_or_else(|| GltfError::format(format!("Missing required property '{key}'")))
}

fn f32_field(obj: &Map<String, Value>, key: &str) -> Result<Option<f32>> {
    match obj.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(|v| Some(v as f32))
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be a number"))),
    }
}

fn req_f32(obj: &Map<String, Value>, key: &str) -> Result<f32> {
    f32_field(obj, key)?
        .ok_or_else(|| GltfError::format(format!("Missing required property '{key}'")))
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Result<bool> {
    match obj.get(key) {
        None => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be a boolean"))),
    }
}

fn f32_vec(obj: &Map<String, Value>, key: &str) -> Result<Vec<f32>> {
    match obj.get(key) {
        None => Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|v| {
                        v.as_f64().map(|v| v as f32).ok_or_else(|| {
                            GltfError::format(format!("Property '{key}' must hold numbers"))
                        })
                    })
                    .collect()
            })
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be an array")))?,
    }
}

fn f32_fixed<const N: usize>(obj: &Map<String, Value>, key: &str) -> Result<Option<[f32; N]>> {
    let values = f32_vec(obj, key)?;
    if values.is_empty() && !obj.contains_key(key) {
        return Ok(None);
    }
    let array: [f32; N] = values.try_into().map_err(|v: Vec<f32>| {
        GltfError::format(format!(
            "Property '{key}' must hold exactly {N} numbers, found {}",
            v.len()
        ))
    })?;
    Ok(Some(array))
}

/// Reference indices become id strings; resolution stays lazy.
fn index_field(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    Ok(u64_field(obj, key)?.map(|i| i.to_string()))
}

fn req_index(obj: &Map<String, Value>, key: &str) -> Result<String> {
    Ok(req_u64(obj, key)?.to_string())
}

fn index_vec(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match obj.get(key) {
        None => Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|v| {
                        v.as_u64().map(|i| i.to_string()).ok_or_else(|| {
                            GltfError::format(format!("Property '{key}' must hold indices"))
                        })
                    })
                    .collect()
            })
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be an array")))?,
    }
}

impl<'a> Reader<'a> {
    fn document(&self, json: &Value) -> Result<Document> {
        let root = as_object(json, "document")?;
        let mut doc = Document::new();

        let asset = root
            .get("asset")
            .ok_or_else(|| GltfError::format("Missing required property 'asset'"))?;
        doc.asset = self.asset(asset)?;

        self.store(root, "accessors", &mut doc.accessors, |r, o| r.accessor(o))?;
        self.store(root, "animations", &mut doc.animations, |r, o| {
            r.animation(o)
        })?;
        self.store(root, "buffers", &mut doc.buffers, |r, o| r.buffer(o))?;
        self.store(root, "bufferViews", &mut doc.buffer_views, |r, o| {
            r.buffer_view(o)
        })?;
        self.store(root, "cameras", &mut doc.cameras, |r, o| r.camera(o))?;
        self.store(root, "images", &mut doc.images, |r, o| r.image(o))?;
        self.store(root, "materials", &mut doc.materials, |r, o| r.material(o))?;
        self.store(root, "meshes", &mut doc.meshes, |r, o| r.mesh(o))?;
        self.store(root, "nodes", &mut doc.nodes, |r, o| r.node(o))?;
        self.store(root, "samplers", &mut doc.samplers, |r, o| r.sampler(o))?;
        self.store(root, "scenes", &mut doc.scenes, |r, o| r.scene(o))?;
        self.store(root, "skins", &mut doc.skins, |r, o| r.skin(o))?;
        self.store(root, "textures", &mut doc.textures, |r, o| r.texture(o))?;

        if let Some(id) = index_field(root, "scene")? {
            doc.set_default_scene_id(id);
        }
        for name in self.string_set(root, "extensionsUsed")? {
            doc.extensions_used.insert(name);
        }
        for name in self.string_set(root, "extensionsRequired")? {
            doc.extensions_required.insert(name);
        }
        let (extensions, extras) = self.common(root, PropertyKind::Document)?;
        doc.extensions = extensions;
        doc.extras = extras;

        Ok(doc)
    }

    fn store<E: Entity>(
        &self,
        root: &Map<String, Value>,
        key: &str,
        store: &mut EntityStore<E>,
        from_json: impl Fn(&Self, &Map<String, Value>) -> Result<E>,
    ) -> Result<()> {
        let Some(value) = root.get(key) else {
            return Ok(());
        };
        let items = value
            .as_array()
            .ok_or_else(|| GltfError::format(format!("Property '{key}' must be an array")))?;
        for (position, item) in items.iter().enumerate() {
            let obj = as_object(item, key)?;
            let mut entity = from_json(self, obj)?;
            entity.set_id(position.to_string());
            store.append(entity, AppendPolicy::ThrowOnEmpty)?;
        }
        Ok(())
    }

    fn string_set(&self, obj: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
        match obj.get(key) {
            None => Ok(Vec::new()),
            Some(value) => value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .map(|v| {
                            v.as_str().map(str::to_string).ok_or_else(|| {
                                GltfError::format(format!("Property '{key}' must hold strings"))
                            })
                        })
                        .collect()
                })
                .ok_or_else(|| GltfError::format(format!("Property '{key}' must be an array")))?,
        }
    }

    fn common(
        &self,
        obj: &Map<String, Value>,
        kind: PropertyKind,
    ) -> Result<(ExtensionSet, Option<String>)> {
        let mut set = ExtensionSet::new();
        if let Some(value) = obj.get("extensions") {
            let extensions = as_object(value, "extensions")?;
            for (name, ext_value) in extensions {
                match self.registry {
                    Some(registry) if registry.has_handler(name, kind) => {
                        set.attach_box(registry.deserialize(name, kind, ext_value)?);
                    }
                    _ => set.attach_raw(ExtensionPair {
                        name: name.clone(),
                        json: ext_value.to_string(),
                    }),
                }
            }
        }
        let extras = obj.get("extras").map(Value::to_string);
        Ok((set, extras))
    }

    fn asset(&self, value: &Value) -> Result<Asset> {
        let obj = as_object(value, "asset")?;
        let version = str_field(obj, "version")?
            .ok_or_else(|| GltfError::format("Missing required property 'asset.version'"))?
            .to_string();
        let parsed: Version = version.parse()?;
        if parsed.major != 2 {
            return Err(GltfError::format(format!(
                "Unsupported document version '{version}'"
            )));
        }
        let min_version = string_field(obj, "minVersion")?;
        if !is_min_version_satisfied(min_version.as_deref(), KNOWN_VERSIONS)? {
            return Err(GltfError::format(format!(
                "Document requires minimum version '{}'",
                min_version.unwrap_or_default()
            )));
        }

        let (extensions, extras) = self.common(obj, PropertyKind::Asset)?;
        Ok(Asset {
            version,
            min_version,
            generator: string_field(obj, "generator")?,
            copyright: string_field(obj, "copyright")?,
            extensions,
            extras,
        })
    }

    fn buffer(&self, obj: &Map<String, Value>) -> Result<Buffer> {
        let (extensions, extras) = self.common(obj, PropertyKind::Buffer)?;
        Ok(Buffer {
            id: String::new(),
            name: string_field(obj, "name")?,
            uri: string_field(obj, "uri")?,
            byte_length: req_u64(obj, "byteLength")?,
            extensions,
            extras,
        })
    }

    fn buffer_view(&self, obj: &Map<String, Value>) -> Result<BufferView> {
        let target = match u64_field(obj, "target")? {
            Some(value) => Some(BufferViewTarget::from_value(value as u32)?),
            None => None,
        };
        let (extensions, extras) = self.common(obj, PropertyKind::BufferView)?;
        Ok(BufferView {
            id: String::new(),
            name: string_field(obj, "name")?,
            buffer_id: req_index(obj, "buffer")?,
            byte_offset: u64_field(obj, "byteOffset")?.unwrap_or(0),
            byte_length: req_u64(obj, "byteLength")?,
            byte_stride: u64_field(obj, "byteStride")?,
            target,
            extensions,
            extras,
        })
    }

    fn accessor(&self, obj: &Map<String, Value>) -> Result<Accessor> {
        let component_type = ComponentType::from_value(req_u64(obj, "componentType")? as u32)?;
        let kind = AccessorKind::from_name(
            str_field(obj, "type")?
                .ok_or_else(|| GltfError::format("Missing required property 'type'"))?,
        )?;
        let (extensions, extras) = self.common(obj, PropertyKind::Accessor)?;
        Ok(Accessor {
            id: String::new(),
            name: string_field(obj, "name")?,
            buffer_view_id: index_field(obj, "bufferView")?,
            byte_offset: u64_field(obj, "byteOffset")?.unwrap_or(0),
            component_type,
            kind,
            normalized: bool_field(obj, "normalized")?,
            count: req_u64(obj, "count")?,
            min: f32_vec(obj, "min")?,
            max: f32_vec(obj, "max")?,
            extensions,
            extras,
        })
    }

    fn node(&self, obj: &Map<String, Value>) -> Result<Node> {
        let (extensions, extras) = self.common(obj, PropertyKind::Node)?;
        let node = Node {
            id: String::new(),
            name: string_field(obj, "name")?,
            children: index_vec(obj, "children")?,
            mesh_id: index_field(obj, "mesh")?,
            skin_id: index_field(obj, "skin")?,
            camera_id: index_field(obj, "camera")?,
            matrix: f32_fixed::<16>(obj, "matrix")?,
            translation: f32_fixed::<3>(obj, "translation")?,
            rotation: f32_fixed::<4>(obj, "rotation")?,
            scale: f32_fixed::<3>(obj, "scale")?,
            weights: f32_vec(obj, "weights")?,
            extensions,
            extras,
        };
        if !node.has_valid_transform() {
            return Err(GltfError::format(
                "Node carries both a matrix and TRS properties",
            ));
        }
        Ok(node)
    }

    fn primitive(&self, value: &Value) -> Result<MeshPrimitive> {
        let obj = as_object(value, "primitives")?;
        let mut attributes = std::collections::BTreeMap::new();
        if let Some(attrs) = obj.get("attributes") {
            for (semantic, index) in as_object(attrs, "attributes")? {
                let index = index.as_u64().ok_or_else(|| {
                    GltfError::format(format!("Attribute '{semantic}' must be an index"))
                })?;
                attributes.insert(semantic.clone(), index.to_string());
            }
        }
        let mode = match u64_field(obj, "mode")? {
            Some(value) => MeshMode::from_value(value as u32)?,
            None => MeshMode::Triangles,
        };
        let (extensions, extras) = self.common(obj, PropertyKind::MeshPrimitive)?;
        Ok(MeshPrimitive {
            attributes,
            indices_id: index_field(obj, "indices")?,
            material_id: index_field(obj, "material")?,
            mode,
            extensions,
            extras,
        })
    }

    fn mesh(&self, obj: &Map<String, Value>) -> Result<Mesh> {
        let primitives = obj
            .get("primitives")
            .and_then(Value::as_array)
            .ok_or_else(|| GltfError::format("Mesh must carry a 'primitives' array"))?
            .iter()
            .map(|p| self.primitive(p))
            .collect::<Result<Vec<_>>>()?;
        let (extensions, extras) = self.common(obj, PropertyKind::Mesh)?;
        Ok(Mesh {
            id: String::new(),
            name: string_field(obj, "name")?,
            primitives,
            weights: f32_vec(obj, "weights")?,
            extensions,
            extras,
        })
    }

    fn texture_ref(&self, value: &Value) -> Result<TextureRef> {
        let obj = as_object(value, "textureInfo")?;
        Ok(TextureRef {
            texture_id: req_index(obj, "index")?,
            texcoord: u64_field(obj, "texCoord")?.unwrap_or(0) as u32,
        })
    }

    fn opt_texture_ref(
        &self,
        obj: &Map<String, Value>,
        key: &str,
    ) -> Result<Option<TextureRef>> {
        obj.get(key).map(|v| self.texture_ref(v)).transpose()
    }

    fn material(&self, obj: &Map<String, Value>) -> Result<Material> {
        let mut material = Material {
            name: string_field(obj, "name")?,
            ..Default::default()
        };

        if let Some(pbr) = obj.get("pbrMetallicRoughness") {
            let pbr = as_object(pbr, "pbrMetallicRoughness")?;
            if let Some(factor) = f32_fixed::<4>(pbr, "baseColorFactor")? {
                material.base_color_factor = factor;
            }
            material.base_color_texture = self.opt_texture_ref(pbr, "baseColorTexture")?;
            material.metallic_factor = f32_field(pbr, "metallicFactor")?.unwrap_or(1.0);
            material.roughness_factor = f32_field(pbr, "roughnessFactor")?.unwrap_or(1.0);
            material.metallic_roughness_texture =
                self.opt_texture_ref(pbr, "metallicRoughnessTexture")?;
        }
        material.normal_texture = self.opt_texture_ref(obj, "normalTexture")?;
        material.occlusion_texture = self.opt_texture_ref(obj, "occlusionTexture")?;
        material.emissive_texture = self.opt_texture_ref(obj, "emissiveTexture")?;
        if let Some(factor) = f32_fixed::<3>(obj, "emissiveFactor")? {
            material.emissive_factor = factor;
        }
        if let Some(mode) = str_field(obj, "alphaMode")? {
            material.alpha_mode = AlphaMode::from_name(mode)?;
        }
        material.alpha_cutoff = f32_field(obj, "alphaCutoff")?.unwrap_or(0.5);
        material.double_sided = bool_field(obj, "doubleSided")?;

        let (extensions, extras) = self.common(obj, PropertyKind::Material)?;
        material.extensions = extensions;
        material.extras = extras;
        Ok(material)
    }

    fn texture(&self, obj: &Map<String, Value>) -> Result<Texture> {
        let (extensions, extras) = self.common(obj, PropertyKind::Texture)?;
        Ok(Texture {
            id: String::new(),
            name: string_field(obj, "name")?,
            sampler_id: index_field(obj, "sampler")?,
            image_id: index_field(obj, "source")?,
            extensions,
            extras,
        })
    }

    fn image(&self, obj: &Map<String, Value>) -> Result<Image> {
        let (extensions, extras) = self.common(obj, PropertyKind::Image)?;
        Ok(Image {
            id: String::new(),
            name: string_field(obj, "name")?,
            uri: string_field(obj, "uri")?,
            mime_type: string_field(obj, "mimeType")?,
            buffer_view_id: index_field(obj, "bufferView")?,
            extensions,
            extras,
        })
    }

    fn sampler(&self, obj: &Map<String, Value>) -> Result<Sampler> {
        let mag_filter = match u64_field(obj, "magFilter")? {
            Some(value) => Some(MagFilter::from_value(value as u32)?),
            None => None,
        };
        let min_filter = match u64_field(obj, "minFilter")? {
            Some(value) => Some(MinFilter::from_value(value as u32)?),
            None => None,
        };
        let wrap_s = match u64_field(obj, "wrapS")? {
            Some(value) => WrapMode::from_value(value as u32)?,
            None => WrapMode::Repeat,
        };
        let wrap_t = match u64_field(obj, "wrapT")? {
            Some(value) => WrapMode::from_value(value as u32)?,
            None => WrapMode::Repeat,
        };
        let (extensions, extras) = self.common(obj, PropertyKind::Sampler)?;
        Ok(Sampler {
            id: String::new(),
            name: string_field(obj, "name")?,
            mag_filter,
            min_filter,
            wrap_s,
            wrap_t,
            extensions,
            extras,
        })
    }

    fn camera(&self, obj: &Map<String, Value>) -> Result<Camera> {
        let kind = str_field(obj, "type")?
            .ok_or_else(|| GltfError::format("Camera must carry a 'type'"))?;
        let projection = match kind {
            "perspective" => {
                let proj = as_object(
                    obj.get("perspective")
                        .ok_or_else(|| GltfError::format("Missing 'perspective' projection"))?,
                    "perspective",
                )?;
                CameraProjection::Perspective {
                    aspect_ratio: f32_field(proj, "aspectRatio")?,
                    yfov: req_f32(proj, "yfov")?,
                    znear: req_f32(proj, "znear")?,
                    zfar: f32_field(proj, "zfar")?,
                }
            }
            "orthographic" => {
                let proj = as_object(
                    obj.get("orthographic")
                        .ok_or_else(|| GltfError::format("Missing 'orthographic' projection"))?,
                    "orthographic",
                )?;
                CameraProjection::Orthographic {
                    xmag: req_f32(proj, "xmag")?,
                    ymag: req_f32(proj, "ymag")?,
                    znear: req_f32(proj, "znear")?,
                    zfar: req_f32(proj, "zfar")?,
                }
            }
            other => {
                return Err(GltfError::format(format!("Unknown camera type '{other}'")));
            }
        };
        let (extensions, extras) = self.common(obj, PropertyKind::Camera)?;
        Ok(Camera {
            id: String::new(),
            name: string_field(obj, "name")?,
            projection,
            extensions,
            extras,
        })
    }

    fn skin(&self, obj: &Map<String, Value>) -> Result<Skin> {
        let (extensions, extras) = self.common(obj, PropertyKind::Skin)?;
        Ok(Skin {
            id: String::new(),
            name: string_field(obj, "name")?,
            inverse_bind_matrices_id: index_field(obj, "inverseBindMatrices")?,
            skeleton_id: index_field(obj, "skeleton")?,
            joint_ids: index_vec(obj, "joints")?,
            extensions,
            extras,
        })
    }

    fn animation(&self, obj: &Map<String, Value>) -> Result<Animation> {
        let channels = obj
            .get("channels")
            .and_then(Value::as_array)
            .ok_or_else(|| GltfError::format("Animation must carry a 'channels' array"))?
            .iter()
            .map(|value| {
                let channel = as_object(value, "channels")?;
                let target = as_object(
                    channel
                        .get("target")
                        .ok_or_else(|| GltfError::format("Channel must carry a 'target'"))?,
                    "target",
                )?;
                Ok(AnimationChannel {
                    sampler_index: req_u64(channel, "sampler")? as usize,
                    target_node_id: index_field(target, "node")?,
                    target_path: TargetPath::from_name(
                        str_field(target, "path")?
                            .ok_or_else(|| GltfError::format("Target must carry a 'path'"))?,
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let samplers = obj
            .get("samplers")
            .and_then(Value::as_array)
            .ok_or_else(|| GltfError::format("Animation must carry a 'samplers' array"))?
            .iter()
            .map(|value| {
                let sampler = as_object(value, "samplers")?;
                let interpolation = match str_field(sampler, "interpolation")? {
                    Some(name) => InterpolationKind::from_name(name)?,
                    None => InterpolationKind::Linear,
                };
                Ok(AnimationSampler {
                    input_id: req_index(sampler, "input")?,
                    output_id: req_index(sampler, "output")?,
                    interpolation,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (extensions, extras) = self.common(obj, PropertyKind::Animation)?;
        Ok(Animation {
            id: String::new(),
            name: string_field(obj, "name")?,
            channels,
            samplers,
            extensions,
            extras,
        })
    }

    fn scene(&self, obj: &Map<String, Value>) -> Result<Scene> {
        let (extensions, extras) = self.common(obj, PropertyKind::Scene)?;
        Ok(Scene {
            id: String::new(),
            name: string_field(obj, "name")?,
            node_ids: index_vec(obj, "nodes")?,
            extensions,
            extras,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::serialize;
    use serde_json::json;

    const MINIMAL: &str = r#"{"asset":{"version":"2.0"}}"#;

    #[test]
    fn test_minimal_document() {
        let doc = deserialize(MINIMAL).unwrap();
        assert_eq!(doc.asset.version, "2.0");
        assert!(doc.nodes.is_empty());
        assert!(doc.default_scene_id().is_none());
    }

    #[test]
    fn test_version_enforcement() {
        assert!(matches!(
            deserialize(r#"{"asset":{}}"#),
            Err(GltfError::Format(_))
        ));
        assert!(matches!(
            deserialize(r#"{"asset":{"version":"1.0"}}"#),
            Err(GltfError::Format(_))
        ));
        assert!(matches!(
            deserialize(r#"{"asset":{"version":"2.0.1"}}"#),
            Err(GltfError::Format(_))
        ));
        // A minimum version this implementation does not reach.
        assert!(matches!(
            deserialize(r#"{"asset":{"version":"2.0","minVersion":"2.1"}}"#),
            Err(GltfError::Format(_))
        ));
        assert!(deserialize(r#"{"asset":{"version":"2.0","minVersion":"2.0"}}"#).is_ok());
    }

    #[test]
    fn test_byte_order_mark_rejected_unless_requested() {
        let text = format!("\u{feff}{MINIMAL}");
        assert!(matches!(deserialize(&text), Err(GltfError::Format(_))));

        let doc = deserialize_with(
            &text,
            &DeserializeOptions {
                ignore_byte_order_mark: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(doc.asset.version, "2.0");
    }

    #[test]
    fn test_indices_become_ids() {
        let text = json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 12, "uri": "payload.bin"}],
            "bufferViews": [{"buffer": 0, "byteLength": 12}],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 1,
                "type": "VEC3"
            }],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "nodes": [{"mesh": 0}],
            "scenes": [{"nodes": [0]}],
            "scene": 0
        })
        .to_string();

        let doc = deserialize(&text).unwrap();
        let accessor = doc.accessors.get("0").unwrap();
        assert_eq!(accessor.buffer_view_id.as_deref(), Some("0"));
        assert_eq!(accessor.kind, AccessorKind::Vec3);
        assert_eq!(doc.buffer_views.get("0").unwrap().buffer_id, "0");
        assert_eq!(doc.nodes.get("0").unwrap().mesh_id.as_deref(), Some("0"));
        assert_eq!(doc.default_scene().unwrap().id, "0");
    }

    #[test]
    fn test_dangling_reference_fails_on_lookup() {
        let text = json!({
            "asset": {"version": "2.0"},
            "scene": 4
        })
        .to_string();

        let doc = deserialize(&text).unwrap();
        assert!(matches!(
            doc.default_scene(),
            Err(GltfError::NotFound { .. })
        ));
    }

    #[test]
    fn test_extension_dispatch() {
        #[derive(Clone, PartialEq, Debug)]
        struct Lod {
            ids: Vec<u64>,
        }

        let mut registry = ExtensionDeserializer::new();
        registry
            .add_handler("MSFT_lod", PropertyKind::Node, |value: &Value| {
                Ok(Lod {
                    ids: value["ids"]
                        .as_array()
                        .map(|a| a.iter().filter_map(Value::as_u64).collect())
                        .unwrap_or_default(),
                })
            })
            .unwrap();

        let text = json!({
            "asset": {"version": "2.0"},
            "nodes": [{
                "extensions": {
                    "MSFT_lod": {"ids": [1, 2]},
                    "VENDOR_other": {"flag": true}
                }
            }]
        })
        .to_string();

        let doc = deserialize_with(
            &text,
            &DeserializeOptions {
                registry: Some(&registry),
                ..Default::default()
            },
        )
        .unwrap();

        let node = doc.nodes.get("0").unwrap();
        assert_eq!(node.extensions.get::<Lod>().unwrap().ids, vec![1, 2]);
        // Unregistered names survive untouched in the raw map.
        assert!(node.extensions.raw().contains_key("VENDOR_other"));
    }

    #[test]
    fn test_validator_error_propagates() {
        struct Rejecting;

        impl SchemaValidator for Rejecting {
            fn validate(&self, _document: &Value, _disabled: SchemaFlags) -> Result<()> {
                Err(GltfError::Schema {
                    pointer: "/nodes/0".to_string(),
                    keyword: "required".to_string(),
                })
            }
        }

        let err = deserialize_with(
            MINIMAL,
            &DeserializeOptions {
                validator: Some(&Rejecting),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, GltfError::Schema { .. }));
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let mut doc = Document::new();
        doc.asset.generator = Some("gltf-lite".to_string());
        doc.buffers
            .append(
                Buffer {
                    uri: Some("payload.bin".to_string()),
                    byte_length: 44,
                    ..Default::default()
                },
                AppendPolicy::GenerateOnEmpty,
            )
            .unwrap();
        doc.buffer_views
            .append(
                BufferView {
                    buffer_id: "0".to_string(),
                    byte_offset: 8,
                    byte_length: 36,
                    target: Some(BufferViewTarget::ArrayBuffer),
                    ..Default::default()
                },
                AppendPolicy::GenerateOnEmpty,
            )
            .unwrap();
        doc.accessors
            .append(
                Accessor {
                    buffer_view_id: Some("0".to_string()),
                    component_type: ComponentType::Float,
                    kind: AccessorKind::Vec3,
                    count: 3,
                    min: vec![0.0, 0.0, 0.0],
                    max: vec![1.0, 1.0, 0.0],
                    ..Default::default()
                },
                AppendPolicy::GenerateOnEmpty,
            )
            .unwrap();
        doc.meshes
            .append(
                Mesh {
                    primitives: vec![MeshPrimitive {
                        attributes: [("POSITION".to_string(), "0".to_string())].into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                AppendPolicy::GenerateOnEmpty,
            )
            .unwrap();
        doc.nodes
            .append(
                Node {
                    mesh_id: Some("0".to_string()),
                    translation: Some([0.0, 1.0, 0.0]),
                    ..Default::default()
                },
                AppendPolicy::GenerateOnEmpty,
            )
            .unwrap();
        doc.set_default_scene(
            Scene {
                node_ids: vec!["0".to_string()],
                ..Default::default()
            },
            AppendPolicy::GenerateOnEmpty,
        )
        .unwrap();

        let text = serialize(&doc).unwrap();
        let restored = deserialize(&text).unwrap();
        assert_eq!(doc, restored);
    }
}
