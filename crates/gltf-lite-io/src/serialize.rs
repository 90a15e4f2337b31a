// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document -> glTF 2.0 JSON text
//!
//! Entity stores serialize as arrays; id references become array indices
//! (the element's position in its store). Defaults are omitted, matching
//! the format's schema defaults.

use gltf_lite_model::{
    Accessor, Animation, Asset, Buffer, BufferView, Camera, CameraProjection, Document, Entity,
    EntityStore, ExtensionSet, GltfError, Image, Material, Mesh, MeshPrimitive, MeshMode, Node,
    Result, Sampler, Scene, Skin, Texture, TextureRef, WrapMode,
};
use serde_json::{json, Map, Value};

use crate::registry::{ExtensionSerializer, PropertyKind};

/// Serialization settings
#[derive(Default)]
pub struct SerializeOptions<'a> {
    /// Pretty-print with two-space indentation
    pub pretty: bool,
    /// Handlers for typed extensions; raw extensions never need one
    pub registry: Option<&'a ExtensionSerializer>,
}

/// Serialize with default options
pub fn serialize(doc: &Document) -> Result<String> {
    serialize_with(doc, &SerializeOptions::default())
}

/// Serialize with pretty formatting
pub fn serialize_pretty(doc: &Document) -> Result<String> {
    serialize_with(
        doc,
        &SerializeOptions {
            pretty: true,
            ..Default::default()
        },
    )
}

/// Serialize a document to glTF JSON text
pub fn serialize_with(doc: &Document, options: &SerializeOptions<'_>) -> Result<String> {
    let writer = Writer {
        doc,
        registry: options.registry,
    };
    let root = writer.document()?;
    let text = if options.pretty {
        serde_json::to_string_pretty(&root)
    } else {
        serde_json::to_string(&root)
    };
    text.map_err(|e| GltfError::format(format!("JSON serialization failed: {e}")))
}

struct Writer<'a> {
    doc: &'a Document,
    registry: Option<&'a ExtensionSerializer>,
}

fn set(obj: &mut Map<String, Value>, key: &str, value: Value) {
    obj.insert(key.to_string(), value);
}

fn set_opt_str(obj: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        set(obj, key, json!(value));
    }
}

impl<'a> Writer<'a> {
    fn document(&self) -> Result<Value> {
        let doc = self.doc;
        let mut root = Map::new();

        set(&mut root, "asset", self.asset(&doc.asset)?);

        self.store(&mut root, "accessors", &doc.accessors, |w, a| w.accessor(a))?;
        self.store(&mut root, "animations", &doc.animations, |w, a| {
            w.animation(a)
        })?;
        self.store(&mut root, "buffers", &doc.buffers, |w, b| w.buffer(b))?;
        self.store(&mut root, "bufferViews", &doc.buffer_views, |w, v| {
            w.buffer_view(v)
        })?;
        self.store(&mut root, "cameras", &doc.cameras, |w, c| w.camera(c))?;
        self.store(&mut root, "images", &doc.images, |w, i| w.image(i))?;
        self.store(&mut root, "materials", &doc.materials, |w, m| w.material(m))?;
        self.store(&mut root, "meshes", &doc.meshes, |w, m| w.mesh(m))?;
        self.store(&mut root, "nodes", &doc.nodes, |w, n| w.node(n))?;
        self.store(&mut root, "samplers", &doc.samplers, |w, s| w.sampler(s))?;
        self.store(&mut root, "scenes", &doc.scenes, |w, s| w.scene(s))?;
        self.store(&mut root, "skins", &doc.skins, |w, s| w.skin(s))?;
        self.store(&mut root, "textures", &doc.textures, |w, t| w.texture(t))?;

        if let Some(id) = doc.default_scene_id() {
            set(&mut root, "scene", json!(doc.scenes.position_of(id)?));
        }
        if !doc.extensions_used.is_empty() {
            set(&mut root, "extensionsUsed", json!(doc.extensions_used));
        }
        if !doc.extensions_required.is_empty() {
            set(
                &mut root,
                "extensionsRequired",
                json!(doc.extensions_required),
            );
        }
        self.common(&mut root, &doc.extensions, &doc.extras, PropertyKind::Document)?;

        Ok(Value::Object(root))
    }

    fn store<E: Entity>(
        &self,
        root: &mut Map<String, Value>,
        key: &str,
        store: &EntityStore<E>,
        to_json: impl Fn(&Self, &E) -> Result<Value>,
    ) -> Result<()> {
        if store.is_empty() {
            return Ok(());
        }
        let items = store
            .iter()
            .map(|e| to_json(self, e))
            .collect::<Result<Vec<_>>>()?;
        set(root, key, Value::Array(items));
        Ok(())
    }

    /// Shared tail of every property: name is written by callers, extensions
    /// and extras here.
    fn common(
        &self,
        obj: &mut Map<String, Value>,
        extensions: &ExtensionSet,
        extras: &Option<String>,
        kind: PropertyKind,
    ) -> Result<()> {
        if !extensions.is_empty() {
            let mut ext_obj = Map::new();
            for (name, raw) in extensions.raw() {
                let value: Value = serde_json::from_str(raw).map_err(|e| {
                    GltfError::format(format!("Extension '{name}' holds invalid JSON: {e}"))
                })?;
                set(&mut ext_obj, name, value);
            }
            for ext in extensions.iter_typed() {
                let registry = self.registry.ok_or_else(|| {
                    GltfError::usage("Document carries typed extensions but no serializer registry")
                })?;
                let (name, value) = registry.serialize(ext, kind)?;
                set(&mut ext_obj, &name, value);
            }
            set(obj, "extensions", Value::Object(ext_obj));
        }
        if let Some(extras) = extras {
            let value: Value = serde_json::from_str(extras)
                .map_err(|e| GltfError::format(format!("Invalid extras JSON: {e}")))?;
            set(obj, "extras", value);
        }
        Ok(())
    }

    fn asset(&self, asset: &Asset) -> Result<Value> {
        let mut obj = Map::new();
        set(&mut obj, "version", json!(asset.version));
        set_opt_str(&mut obj, "minVersion", &asset.min_version);
        set_opt_str(&mut obj, "generator", &asset.generator);
        set_opt_str(&mut obj, "copyright", &asset.copyright);
        self.common(&mut obj, &asset.extensions, &asset.extras, PropertyKind::Asset)?;
        Ok(Value::Object(obj))
    }

    fn buffer(&self, buffer: &Buffer) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &buffer.name);
        // The GLB buffer serializes with no uri at all.
        if let Some(uri) = &buffer.uri {
            if !uri.is_empty() {
                set(&mut obj, "uri", json!(uri));
            }
        }
        set(&mut obj, "byteLength", json!(buffer.byte_length));
        self.common(&mut obj, &buffer.extensions, &buffer.extras, PropertyKind::Buffer)?;
        Ok(Value::Object(obj))
    }

    fn buffer_view(&self, view: &BufferView) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &view.name);
        set(&mut obj, "buffer", json!(self.doc.buffers.position_of(&view.buffer_id)?));
        if view.byte_offset != 0 {
            set(&mut obj, "byteOffset", json!(view.byte_offset));
        }
        set(&mut obj, "byteLength", json!(view.byte_length));
        if let Some(stride) = view.byte_stride {
            set(&mut obj, "byteStride", json!(stride));
        }
        if let Some(target) = view.target {
            set(&mut obj, "target", json!(target.value()));
        }
        self.common(&mut obj, &view.extensions, &view.extras, PropertyKind::BufferView)?;
        Ok(Value::Object(obj))
    }

    fn accessor(&self, accessor: &Accessor) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &accessor.name);
        if let Some(view_id) = &accessor.buffer_view_id {
            set(
                &mut obj,
                "bufferView",
                json!(self.doc.buffer_views.position_of(view_id)?),
            );
        }
        if accessor.byte_offset != 0 {
            set(&mut obj, "byteOffset", json!(accessor.byte_offset));
        }
        set(&mut obj, "componentType", json!(accessor.component_type.value()));
        if accessor.normalized {
            set(&mut obj, "normalized", json!(true));
        }
        set(&mut obj, "count", json!(accessor.count));
        set(&mut obj, "type", json!(accessor.kind.name()));
        if !accessor.min.is_empty() {
            set(&mut obj, "min", json!(accessor.min));
        }
        if !accessor.max.is_empty() {
            set(&mut obj, "max", json!(accessor.max));
        }
        self.common(&mut obj, &accessor.extensions, &accessor.extras, PropertyKind::Accessor)?;
        Ok(Value::Object(obj))
    }

    fn node(&self, node: &Node) -> Result<Value> {
        if !node.has_valid_transform() {
            return Err(GltfError::format(format!(
                "Node '{}' carries both a matrix and TRS properties",
                node.id
            )));
        }
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &node.name);
        if !node.children.is_empty() {
            let children = node
                .children
                .iter()
                .map(|id| self.doc.nodes.position_of(id).map(|p| json!(p)))
                .collect::<Result<Vec<_>>>()?;
            set(&mut obj, "children", Value::Array(children));
        }
        if let Some(mesh_id) = &node.mesh_id {
            set(&mut obj, "mesh", json!(self.doc.meshes.position_of(mesh_id)?));
        }
        if let Some(skin_id) = &node.skin_id {
            set(&mut obj, "skin", json!(self.doc.skins.position_of(skin_id)?));
        }
        if let Some(camera_id) = &node.camera_id {
            set(&mut obj, "camera", json!(self.doc.cameras.position_of(camera_id)?));
        }
        if let Some(matrix) = &node.matrix {
            set(&mut obj, "matrix", json!(matrix.to_vec()));
        }
        if let Some(translation) = &node.translation {
            set(&mut obj, "translation", json!(translation.to_vec()));
        }
        if let Some(rotation) = &node.rotation {
            set(&mut obj, "rotation", json!(rotation.to_vec()));
        }
        if let Some(scale) = &node.scale {
            set(&mut obj, "scale", json!(scale.to_vec()));
        }
        if !node.weights.is_empty() {
            set(&mut obj, "weights", json!(node.weights));
        }
        self.common(&mut obj, &node.extensions, &node.extras, PropertyKind::Node)?;
        Ok(Value::Object(obj))
    }

    fn mesh(&self, mesh: &Mesh) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &mesh.name);
        let primitives = mesh
            .primitives
            .iter()
            .map(|p| self.primitive(p))
            .collect::<Result<Vec<_>>>()?;
        set(&mut obj, "primitives", Value::Array(primitives));
        if !mesh.weights.is_empty() {
            set(&mut obj, "weights", json!(mesh.weights));
        }
        self.common(&mut obj, &mesh.extensions, &mesh.extras, PropertyKind::Mesh)?;
        Ok(Value::Object(obj))
    }

    fn primitive(&self, primitive: &MeshPrimitive) -> Result<Value> {
        let mut obj = Map::new();
        let mut attributes = Map::new();
        for (semantic, accessor_id) in &primitive.attributes {
            set(
                &mut attributes,
                semantic,
                json!(self.doc.accessors.position_of(accessor_id)?),
            );
        }
        set(&mut obj, "attributes", Value::Object(attributes));
        if let Some(indices_id) = &primitive.indices_id {
            set(&mut obj, "indices", json!(self.doc.accessors.position_of(indices_id)?));
        }
        if let Some(material_id) = &primitive.material_id {
            set(
                &mut obj,
                "material",
                json!(self.doc.materials.position_of(material_id)?),
            );
        }
        if primitive.mode != MeshMode::Triangles {
            set(&mut obj, "mode", json!(primitive.mode.value()));
        }
        self.common(
            &mut obj,
            &primitive.extensions,
            &primitive.extras,
            PropertyKind::MeshPrimitive,
        )?;
        Ok(Value::Object(obj))
    }

    fn texture_ref(&self, texture_ref: &TextureRef) -> Result<Value> {
        let mut obj = Map::new();
        set(
            &mut obj,
            "index",
            json!(self.doc.textures.position_of(&texture_ref.texture_id)?),
        );
        if texture_ref.texcoord != 0 {
            set(&mut obj, "texCoord", json!(texture_ref.texcoord));
        }
        Ok(Value::Object(obj))
    }

    fn material(&self, material: &Material) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &material.name);

        let mut pbr = Map::new();
        if material.base_color_factor != [1.0, 1.0, 1.0, 1.0] {
            set(&mut pbr, "baseColorFactor", json!(material.base_color_factor));
        }
        if let Some(texture_ref) = &material.base_color_texture {
            set(&mut pbr, "baseColorTexture", self.texture_ref(texture_ref)?);
        }
        if material.metallic_factor != 1.0 {
            set(&mut pbr, "metallicFactor", json!(material.metallic_factor));
        }
        if material.roughness_factor != 1.0 {
            set(&mut pbr, "roughnessFactor", json!(material.roughness_factor));
        }
        if let Some(texture_ref) = &material.metallic_roughness_texture {
            set(
                &mut pbr,
                "metallicRoughnessTexture",
                self.texture_ref(texture_ref)?,
            );
        }
        if !pbr.is_empty() {
            set(&mut obj, "pbrMetallicRoughness", Value::Object(pbr));
        }

        if let Some(texture_ref) = &material.normal_texture {
            set(&mut obj, "normalTexture", self.texture_ref(texture_ref)?);
        }
        if let Some(texture_ref) = &material.occlusion_texture {
            set(&mut obj, "occlusionTexture", self.texture_ref(texture_ref)?);
        }
        if let Some(texture_ref) = &material.emissive_texture {
            set(&mut obj, "emissiveTexture", self.texture_ref(texture_ref)?);
        }
        if material.emissive_factor != [0.0, 0.0, 0.0] {
            set(&mut obj, "emissiveFactor", json!(material.emissive_factor));
        }
        if material.alpha_mode != Default::default() {
            set(&mut obj, "alphaMode", json!(material.alpha_mode.name()));
        }
        if material.alpha_cutoff != 0.5 {
            set(&mut obj, "alphaCutoff", json!(material.alpha_cutoff));
        }
        if material.double_sided {
            set(&mut obj, "doubleSided", json!(true));
        }
        self.common(&mut obj, &material.extensions, &material.extras, PropertyKind::Material)?;
        Ok(Value::Object(obj))
    }

    fn texture(&self, texture: &Texture) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &texture.name);
        if let Some(sampler_id) = &texture.sampler_id {
            set(&mut obj, "sampler", json!(self.doc.samplers.position_of(sampler_id)?));
        }
        if let Some(image_id) = &texture.image_id {
            set(&mut obj, "source", json!(self.doc.images.position_of(image_id)?));
        }
        self.common(&mut obj, &texture.extensions, &texture.extras, PropertyKind::Texture)?;
        Ok(Value::Object(obj))
    }

    fn image(&self, image: &Image) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &image.name);
        set_opt_str(&mut obj, "uri", &image.uri);
        set_opt_str(&mut obj, "mimeType", &image.mime_type);
        if let Some(view_id) = &image.buffer_view_id {
            set(
                &mut obj,
                "bufferView",
                json!(self.doc.buffer_views.position_of(view_id)?),
            );
        }
        self.common(&mut obj, &image.extensions, &image.extras, PropertyKind::Image)?;
        Ok(Value::Object(obj))
    }

    fn sampler(&self, sampler: &Sampler) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &sampler.name);
        if let Some(filter) = sampler.mag_filter {
            set(&mut obj, "magFilter", json!(filter.value()));
        }
        if let Some(filter) = sampler.min_filter {
            set(&mut obj, "minFilter", json!(filter.value()));
        }
        if sampler.wrap_s != WrapMode::Repeat {
            set(&mut obj, "wrapS", json!(sampler.wrap_s.value()));
        }
        if sampler.wrap_t != WrapMode::Repeat {
            set(&mut obj, "wrapT", json!(sampler.wrap_t.value()));
        }
        self.common(&mut obj, &sampler.extensions, &sampler.extras, PropertyKind::Sampler)?;
        Ok(Value::Object(obj))
    }

    fn camera(&self, camera: &Camera) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &camera.name);
        match &camera.projection {
            CameraProjection::Perspective {
                aspect_ratio,
                yfov,
                znear,
                zfar,
            } => {
                set(&mut obj, "type", json!("perspective"));
                let mut proj = Map::new();
                if let Some(aspect_ratio) = aspect_ratio {
                    set(&mut proj, "aspectRatio", json!(aspect_ratio));
                }
                set(&mut proj, "yfov", json!(yfov));
                set(&mut proj, "znear", json!(znear));
                if let Some(zfar) = zfar {
                    set(&mut proj, "zfar", json!(zfar));
                }
                set(&mut obj, "perspective", Value::Object(proj));
            }
            CameraProjection::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => {
                set(&mut obj, "type", json!("orthographic"));
                let proj = json!({
                    "xmag": xmag,
                    "ymag": ymag,
                    "zfar": zfar,
                    "znear": znear,
                });
                set(&mut obj, "orthographic", proj);
            }
        }
        self.common(&mut obj, &camera.extensions, &camera.extras, PropertyKind::Camera)?;
        Ok(Value::Object(obj))
    }

    fn skin(&self, skin: &Skin) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &skin.name);
        if let Some(id) = &skin.inverse_bind_matrices_id {
            set(
                &mut obj,
                "inverseBindMatrices",
                json!(self.doc.accessors.position_of(id)?),
            );
        }
        if let Some(id) = &skin.skeleton_id {
            set(&mut obj, "skeleton", json!(self.doc.nodes.position_of(id)?));
        }
        if !skin.joint_ids.is_empty() {
            let joints = skin
                .joint_ids
                .iter()
                .map(|id| self.doc.nodes.position_of(id).map(|p| json!(p)))
                .collect::<Result<Vec<_>>>()?;
            set(&mut obj, "joints", Value::Array(joints));
        }
        self.common(&mut obj, &skin.extensions, &skin.extras, PropertyKind::Skin)?;
        Ok(Value::Object(obj))
    }

    fn animation(&self, animation: &Animation) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &animation.name);

        let channels = animation
            .channels
            .iter()
            .map(|channel| {
                let mut target = Map::new();
                if let Some(node_id) = &channel.target_node_id {
                    set(&mut target, "node", json!(self.doc.nodes.position_of(node_id)?));
                }
                set(&mut target, "path", json!(channel.target_path.name()));
                Ok(json!({
                    "sampler": channel.sampler_index,
                    "target": Value::Object(target),
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        set(&mut obj, "channels", Value::Array(channels));

        let samplers = animation
            .samplers
            .iter()
            .map(|sampler| {
                let mut entry = Map::new();
                set(
                    &mut entry,
                    "input",
                    json!(self.doc.accessors.position_of(&sampler.input_id)?),
                );
                if sampler.interpolation != Default::default() {
                    set(&mut entry, "interpolation", json!(sampler.interpolation.name()));
                }
                set(
                    &mut entry,
                    "output",
                    json!(self.doc.accessors.position_of(&sampler.output_id)?),
                );
                Ok(Value::Object(entry))
            })
            .collect::<Result<Vec<_>>>()?;
        set(&mut obj, "samplers", Value::Array(samplers));

        self.common(&mut obj, &animation.extensions, &animation.extras, PropertyKind::Animation)?;
        Ok(Value::Object(obj))
    }

    fn scene(&self, scene: &Scene) -> Result<Value> {
        let mut obj = Map::new();
        set_opt_str(&mut obj, "name", &scene.name);
        if !scene.node_ids.is_empty() {
            let nodes = scene
                .node_ids
                .iter()
                .map(|id| self.doc.nodes.position_of(id).map(|p| json!(p)))
                .collect::<Result<Vec<_>>>()?;
            set(&mut obj, "nodes", Value::Array(nodes));
        }
        self.common(&mut obj, &scene.extensions, &scene.extras, PropertyKind::Scene)?;
        Ok(Value::Object(obj))
    }
}
