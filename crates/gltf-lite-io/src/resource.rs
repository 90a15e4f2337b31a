// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary resource layer
//!
//! Writes and reads typed arrays into and out of buffer views and accessors
//! with offset, alignment and bounds validation. Stream acquisition is
//! delegated to a [`StreamCache`]; the GLB binary chunk and inline data-URIs
//! are resolved internally.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use gltf_lite_model::{Accessor, Buffer, BufferView, ComponentType, Document, GltfError, Result};
use rustc_hash::FxHashMap;

use crate::cache::StreamCache;
use crate::data_uri;
use crate::glb::{GlbReader, GLB_BUFFER_ID};

/// Writable, seekable stream
pub trait WriteSeek: Write + Seek {}
impl<T: Write + Seek> WriteSeek for T {}

/// Readable, seekable stream
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Scalar type usable as an accessor component
pub trait AccessorElement: bytemuck::Pod {
    const COMPONENT_TYPE: ComponentType;
}

impl AccessorElement for i8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Byte;
}
impl AccessorElement for u8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::UnsignedByte;
}
impl AccessorElement for i16 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Short;
}
impl AccessorElement for u16 {
    const COMPONENT_TYPE: ComponentType = ComponentType::UnsignedShort;
}
impl AccessorElement for u32 {
    const COMPONENT_TYPE: ComponentType = ComponentType::UnsignedInt;
}
impl AccessorElement for f32 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Float;
}

/// Fixed transforms between normalized integer components and floats
pub mod normalize {
    pub fn from_i8(v: i8) -> f32 {
        (f32::from(v) / 127.0).max(-1.0)
    }

    pub fn from_u8(v: u8) -> f32 {
        f32::from(v) / 255.0
    }

    pub fn from_i16(v: i16) -> f32 {
        (f32::from(v) / 32767.0).max(-1.0)
    }

    pub fn from_u16(v: u16) -> f32 {
        f32::from(v) / 65535.0
    }

    pub fn to_i8(v: f32) -> i8 {
        (v * 127.0).round() as i8
    }

    pub fn to_u8(v: f32) -> u8 {
        (v * 255.0).round() as u8
    }

    pub fn to_i16(v: f32) -> i16 {
        (v * 32767.0).round() as i16
    }

    pub fn to_u16(v: f32) -> u16 {
        (v * 65535.0).round() as u16
    }
}

/// Absolute stream offset of an accessor within its buffer
///
/// Offsets are wire-supplied, so an overflowing sum is a format violation.
fn absolute_offset(accessor: &Accessor, view: &BufferView) -> Result<u64> {
    view.byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| {
            GltfError::format(format!(
                "Accessor '{}' offset overflows within bufferView '{}'",
                accessor.id, view.id
            ))
        })
}

fn check_accessor_layout(accessor: &Accessor, view: &BufferView) -> Result<()> {
    let component_size = accessor.component_type.size() as u64;
    if accessor.byte_offset % component_size != 0
        || absolute_offset(accessor, view)? % component_size != 0
    {
        return Err(GltfError::format(format!(
            "Accessor '{}' offset is not a multiple of its component size",
            accessor.id
        )));
    }
    let end = accessor
        .byte_offset
        .checked_add(accessor.byte_length()?)
        .ok_or_else(|| {
            GltfError::format(format!("Accessor '{}' byte range overflows", accessor.id))
        })?;
    if end > view.byte_length {
        return Err(GltfError::format(format!(
            "Accessor '{}' byte range exceeds bufferView '{}'",
            accessor.id, view.id
        )));
    }
    Ok(())
}

/// Streams typed arrays into buffer views, tracking a write cursor per buffer
///
/// Writing strictly backward within a buffer is an error; writing forward
/// pads the gap with zero bytes. A failed write leaves the cursor in whatever
/// state the last successful sub-step produced, so callers must treat write
/// failures as fatal to this writer/document pairing.
pub struct ResourceWriter {
    cache: StreamCache<Box<dyn WriteSeek>>,
    /// In-memory stream backing the GLB binary chunk, when writing GLB
    glb: Option<Cursor<Vec<u8>>>,
    /// Buffer id -> end of the last written range
    offsets: FxHashMap<String, u64>,
    uri_prefix: String,
    resource_extension: String,
}

impl ResourceWriter {
    /// Writer for external resources only
    pub fn new(cache: StreamCache<Box<dyn WriteSeek>>) -> Self {
        Self {
            cache,
            glb: None,
            offsets: FxHashMap::default(),
            uri_prefix: String::new(),
            resource_extension: "bin".to_string(),
        }
    }

    /// Writer that additionally buffers the GLB binary chunk in memory
    pub fn new_glb(cache: StreamCache<Box<dyn WriteSeek>>) -> Self {
        Self {
            glb: Some(Cursor::new(Vec::new())),
            ..Self::new(cache)
        }
    }

    /// Prefix prepended to generated resource names
    pub fn with_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.uri_prefix = prefix.into();
        self
    }

    /// File extension of generated resource names (default "bin")
    pub fn with_resource_extension(mut self, extension: impl Into<String>) -> Self {
        self.resource_extension = extension.into();
        self
    }

    /// Resource uri a buffer serializes with
    ///
    /// The GLB sentinel buffer maps to the empty string so the JSON
    /// references no external file; explicit uris pass through; generated
    /// buffers get `<prefix><bufferId>.<extension>`.
    pub fn buffer_uri(&self, buffer: &Buffer) -> String {
        if buffer.id == GLB_BUFFER_ID {
            String::new()
        } else if let Some(uri) = &buffer.uri {
            uri.clone()
        } else {
            self.generated_name(&buffer.id)
        }
    }

    fn generated_name(&self, buffer_id: &str) -> String {
        format!(
            "{}{}.{}",
            self.uri_prefix, buffer_id, self.resource_extension
        )
    }

    /// Write raw bytes at a buffer view's offset within its buffer
    pub fn write_buffer_view(&mut self, view: &BufferView, data: &[u8]) -> Result<()> {
        if data.len() as u64 > view.byte_length {
            return Err(GltfError::format(format!(
                "Data exceeds bufferView '{}' byte length",
                view.id
            )));
        }
        self.write_at(&view.buffer_id, view.byte_offset, data)
    }

    /// Write an accessor's bytes at its offset within the given buffer view
    pub fn write_accessor(
        &mut self,
        accessor: &Accessor,
        view: &BufferView,
        data: &[u8],
    ) -> Result<()> {
        match &accessor.buffer_view_id {
            Some(id) if *id == view.id => {}
            _ => {
                return Err(GltfError::format(format!(
                    "Accessor '{}' does not belong to bufferView '{}'",
                    accessor.id, view.id
                )));
            }
        }
        check_accessor_layout(accessor, view)?;
        if data.len() as u64 != accessor.byte_length()? {
            return Err(GltfError::format(format!(
                "Data length does not match accessor '{}' byte length",
                accessor.id
            )));
        }
        self.write_at(&view.buffer_id, absolute_offset(accessor, view)?, data)
    }

    /// Write bytes to a named resource independent of any buffer view
    pub fn write_external(&mut self, uri: &str, data: &[u8]) -> Result<()> {
        let stream = self.cache.get(uri)?;
        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(data)?;
        Ok(())
    }

    /// Consume the writer and return the accumulated GLB binary chunk
    pub fn into_glb_payload(self) -> Option<Vec<u8>> {
        self.glb.map(Cursor::into_inner)
    }

    fn write_at(&mut self, buffer_id: &str, offset: u64, data: &[u8]) -> Result<()> {
        let cursor = self.offsets.get(buffer_id).copied().unwrap_or(0);
        if offset < cursor {
            return Err(GltfError::format(format!(
                "Backward write into buffer '{buffer_id}': offset {offset} is behind cursor {cursor}"
            )));
        }

        let stream = self.stream_for(buffer_id)?;
        stream.seek(SeekFrom::Start(cursor))?;
        if offset > cursor {
            // Zero-fill the gap up to the requested offset.
            let mut remaining = offset - cursor;
            let zeros = [0u8; 256];
            while remaining > 0 {
                let n = remaining.min(zeros.len() as u64) as usize;
                stream.write_all(&zeros[..n])?;
                remaining -= n as u64;
            }
        }
        stream.write_all(data)?;

        self.offsets
            .insert(buffer_id.to_string(), offset + data.len() as u64);
        Ok(())
    }

    fn stream_for(&mut self, buffer_id: &str) -> Result<&mut dyn WriteSeek> {
        if buffer_id == GLB_BUFFER_ID {
            return match self.glb.as_mut() {
                Some(stream) => Ok(stream),
                None => Err(GltfError::usage(
                    "Writer was not created for GLB output but the GLB buffer was written",
                )),
            };
        }
        let name = self.generated_name(buffer_id);
        Ok(self.cache.get(&name)?.as_mut())
    }
}

/// Source of the GLB binary chunk for a reader
type GlbSource = GlbReader<Box<dyn ReadSeek>>;

/// Reads typed arrays out of accessors, resolving buffers to their streams
pub struct ResourceReader {
    cache: StreamCache<Box<dyn ReadSeek>>,
    glb: Option<GlbSource>,
    uri_prefix: String,
    resource_extension: String,
}

impl ResourceReader {
    /// Reader for external and data-URI resources only
    pub fn new(cache: StreamCache<Box<dyn ReadSeek>>) -> Self {
        Self {
            cache,
            glb: None,
            uri_prefix: String::new(),
            resource_extension: "bin".to_string(),
        }
    }

    /// Reader that also resolves the GLB sentinel buffer to a decoded
    /// container's binary chunk
    pub fn with_glb(cache: StreamCache<Box<dyn ReadSeek>>, glb: GlbSource) -> Self {
        Self {
            glb: Some(glb),
            ..Self::new(cache)
        }
    }

    pub fn with_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.uri_prefix = prefix.into();
        self
    }

    /// File extension of generated resource names (default "bin"); must
    /// match the extension the resources were written with
    pub fn with_resource_extension(mut self, extension: impl Into<String>) -> Self {
        self.resource_extension = extension.into();
        self
    }

    /// Raw bytes of an accessor's typed array
    pub fn read_accessor_bytes(&mut self, doc: &Document, accessor: &Accessor) -> Result<Vec<u8>> {
        let view_id = accessor.buffer_view_id.as_deref().ok_or_else(|| {
            GltfError::format(format!("Accessor '{}' has no bufferView", accessor.id))
        })?;
        let view = doc.buffer_views.get(view_id)?;
        check_accessor_layout(accessor, view)?;

        let buffer = doc.buffers.get(&view.buffer_id)?;
        match view.byte_offset.checked_add(view.byte_length) {
            Some(end) if end <= buffer.byte_length => {}
            _ => {
                return Err(GltfError::format(format!(
                    "BufferView '{}' exceeds buffer '{}' byte length",
                    view.id, buffer.id
                )));
            }
        }

        let offset = absolute_offset(accessor, view)?;
        let len = accessor.byte_length()? as usize;

        if buffer.id == GLB_BUFFER_ID {
            let glb = self.glb.as_mut().ok_or_else(|| {
                GltfError::usage("Document references the GLB buffer but no container is open")
            })?;
            return glb.read_binary(offset, len);
        }

        if let Some(uri) = &buffer.uri {
            if data_uri::is_data_uri(uri) {
                let decoded = data_uri::decode_data_uri(uri)?;
                let end = (offset as usize).checked_add(len).unwrap_or(usize::MAX);
                if end > decoded.len() {
                    return Err(GltfError::format(format!(
                        "Read range exceeds inline payload of buffer '{}'",
                        buffer.id
                    )));
                }
                return Ok(decoded[offset as usize..end].to_vec());
            }
        }

        let name = match &buffer.uri {
            Some(uri) => uri.clone(),
            None => format!(
                "{}{}.{}",
                self.uri_prefix, buffer.id, self.resource_extension
            ),
        };
        let stream = self.cache.get(&name)?;
        stream.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; len];
        stream.read_exact(&mut data)?;
        Ok(data)
    }

    /// Typed read; the accessor's component type must match `T`
    pub fn read_typed<T: AccessorElement>(
        &mut self,
        doc: &Document,
        accessor: &Accessor,
    ) -> Result<Vec<T>> {
        if accessor.component_type != T::COMPONENT_TYPE {
            return Err(GltfError::format(format!(
                "Accessor '{}' holds {:?} components, not {:?}",
                accessor.id,
                accessor.component_type,
                T::COMPONENT_TYPE
            )));
        }
        let bytes = self.read_accessor_bytes(doc, accessor)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }

    /// Read components as floats
    ///
    /// Floats pass through unchanged; normalized integers upconvert by the
    /// fixed per-type transforms; non-normalized integers cast.
    pub fn read_float(&mut self, doc: &Document, accessor: &Accessor) -> Result<Vec<f32>> {
        let bytes = self.read_accessor_bytes(doc, accessor)?;
        let normalized = accessor.normalized;

        let floats = match accessor.component_type {
            ComponentType::Float => bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            ComponentType::Byte => bytes
                .iter()
                .map(|&b| {
                    let v = b as i8;
                    if normalized {
                        normalize::from_i8(v)
                    } else {
                        f32::from(v)
                    }
                })
                .collect(),
            ComponentType::UnsignedByte => bytes
                .iter()
                .map(|&v| {
                    if normalized {
                        normalize::from_u8(v)
                    } else {
                        f32::from(v)
                    }
                })
                .collect(),
            ComponentType::Short => bytes
                .chunks_exact(2)
                .map(|c| {
                    let v = i16::from_le_bytes([c[0], c[1]]);
                    if normalized {
                        normalize::from_i16(v)
                    } else {
                        f32::from(v)
                    }
                })
                .collect(),
            ComponentType::UnsignedShort => bytes
                .chunks_exact(2)
                .map(|c| {
                    let v = u16::from_le_bytes([c[0], c[1]]);
                    if normalized {
                        normalize::from_u16(v)
                    } else {
                        f32::from(v)
                    }
                })
                .collect(),
            ComponentType::UnsignedInt => bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f32)
                .collect(),
        };
        Ok(floats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf_lite_model::{AccessorKind, AppendPolicy};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    type SharedStores = Rc<RefCell<HashMap<String, Vec<u8>>>>;

    /// Writer cache backed by shared in-memory vectors, so tests can
    /// inspect bytes after the writer is dropped.
    fn memory_write_cache(stores: SharedStores) -> StreamCache<Box<dyn WriteSeek>> {
        StreamCache::new(move |name: &str| {
            let stores = Rc::clone(&stores);
            let name = name.to_string();
            Ok(Box::new(SharedCursor { stores, name, pos: 0 }) as Box<dyn WriteSeek>)
        })
    }

    struct SharedCursor {
        stores: SharedStores,
        name: String,
        pos: u64,
    }

    impl Write for SharedCursor {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let mut stores = self.stores.borrow_mut();
            let data = stores.entry(self.name.clone()).or_default();
            let end = self.pos as usize + buf.len();
            if data.len() < end {
                data.resize(end, 0);
            }
            data[self.pos as usize..end].copy_from_slice(buf);
            self.pos = end as u64;
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Seek for SharedCursor {
        fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
            match pos {
                SeekFrom::Start(p) => self.pos = p,
                SeekFrom::Current(d) => self.pos = (self.pos as i64 + d) as u64,
                SeekFrom::End(d) => {
                    let len = self
                        .stores
                        .borrow()
                        .get(&self.name)
                        .map_or(0, |v| v.len() as i64);
                    self.pos = (len + d) as u64;
                }
            }
            Ok(self.pos)
        }
    }

    fn view(id: &str, buffer_id: &str, offset: u64, length: u64) -> BufferView {
        BufferView {
            id: id.to_string(),
            buffer_id: buffer_id.to_string(),
            byte_offset: offset,
            byte_length: length,
            ..Default::default()
        }
    }

    fn accessor(id: &str, view_id: &str, offset: u64, count: u64) -> Accessor {
        Accessor {
            id: id.to_string(),
            buffer_view_id: Some(view_id.to_string()),
            byte_offset: offset,
            component_type: ComponentType::UnsignedShort,
            kind: AccessorKind::Scalar,
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_write_pads_forward_gap() {
        let stores: SharedStores = Rc::default();
        let mut writer = ResourceWriter::new(memory_write_cache(Rc::clone(&stores)));

        writer
            .write_buffer_view(&view("v0", "buf", 0, 2), &[1, 2])
            .unwrap();
        writer
            .write_buffer_view(&view("v1", "buf", 6, 2), &[3, 4])
            .unwrap();

        let stores = stores.borrow();
        assert_eq!(stores["buf.bin"], vec![1, 2, 0, 0, 0, 0, 3, 4]);
    }

    #[test]
    fn test_backward_write_rejected() {
        let stores: SharedStores = Rc::default();
        let mut writer = ResourceWriter::new(memory_write_cache(stores));

        writer
            .write_buffer_view(&view("v0", "buf", 4, 2), &[1, 2])
            .unwrap();
        let err = writer
            .write_buffer_view(&view("v1", "buf", 0, 2), &[3, 4])
            .unwrap_err();
        assert!(matches!(err, GltfError::Format(_)));
    }

    #[test]
    fn test_accessor_validation_on_write() {
        let stores: SharedStores = Rc::default();
        let mut writer = ResourceWriter::new(memory_write_cache(stores));
        let v = view("v0", "buf", 0, 8);

        // Wrong owning view.
        let a = accessor("a", "other", 0, 2);
        assert!(writer.write_accessor(&a, &v, &[0; 4]).is_err());

        // Misaligned offset for a 2-byte component.
        let a = accessor("a", "v0", 1, 2);
        assert!(writer.write_accessor(&a, &v, &[0; 4]).is_err());

        // Range exceeds the view.
        let a = accessor("a", "v0", 0, 5);
        assert!(writer.write_accessor(&a, &v, &[0; 10]).is_err());

        // Valid.
        let a = accessor("a", "v0", 2, 3);
        writer.write_accessor(&a, &v, &[9; 6]).unwrap();
    }

    #[test]
    fn test_glb_payload_round_trip() {
        let stores: SharedStores = Rc::default();
        let mut writer = ResourceWriter::new_glb(memory_write_cache(stores));

        writer
            .write_buffer_view(&view("v0", GLB_BUFFER_ID, 0, 4), &[1, 2, 3, 4])
            .unwrap();
        let payload = writer.into_glb_payload().unwrap();
        assert_eq!(payload, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_buffer_uri_resolution() {
        let stores: SharedStores = Rc::default();
        let writer =
            ResourceWriter::new(memory_write_cache(stores)).with_uri_prefix("model_");

        let glb = Buffer {
            id: GLB_BUFFER_ID.to_string(),
            ..Default::default()
        };
        assert_eq!(writer.buffer_uri(&glb), "");

        let explicit = Buffer {
            id: "0".to_string(),
            uri: Some("payload.bin".to_string()),
            ..Default::default()
        };
        assert_eq!(writer.buffer_uri(&explicit), "payload.bin");

        let generated = Buffer {
            id: "0".to_string(),
            ..Default::default()
        };
        assert_eq!(writer.buffer_uri(&generated), "model_0.bin");
    }

    fn doc_with_inline_buffer(data: &[u8], accessor: Accessor) -> Document {
        let mut doc = Document::new();
        doc.buffers
            .append(
                Buffer {
                    id: "b".to_string(),
                    uri: Some(data_uri::encode_data_uri("application/octet-stream", data)),
                    byte_length: data.len() as u64,
                    ..Default::default()
                },
                AppendPolicy::ThrowOnEmpty,
            )
            .unwrap();
        doc.buffer_views
            .append(view("v", "b", 0, data.len() as u64), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        doc.accessors
            .append(accessor, AppendPolicy::ThrowOnEmpty)
            .unwrap();
        doc
    }

    fn empty_read_cache() -> StreamCache<Box<dyn ReadSeek>> {
        StreamCache::new(|name: &str| {
            Err(GltfError::usage(format!("unexpected stream '{name}'")))
        })
    }

    #[test]
    fn test_read_typed_from_data_uri() {
        let values: [u16; 3] = [10, 20, 30];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let doc = doc_with_inline_buffer(bytes, accessor("a", "v", 0, 3));

        let mut reader = ResourceReader::new(empty_read_cache());
        let a = doc.accessors.get("a").unwrap();
        let read: Vec<u16> = reader.read_typed(&doc, a).unwrap();
        assert_eq!(read, values);

        // Component type mismatch.
        assert!(reader.read_typed::<f32>(&doc, a).is_err());
    }

    #[test]
    fn test_read_float_normalized_transforms() {
        let raw: [u8; 4] = [0, 127, 128, 255];
        let mut a = accessor("a", "v", 0, 4);
        a.component_type = ComponentType::UnsignedByte;
        a.normalized = true;
        let doc = doc_with_inline_buffer(&raw, a);

        let mut reader = ResourceReader::new(empty_read_cache());
        let floats = reader
            .read_float(&doc, doc.accessors.get("a").unwrap())
            .unwrap();
        assert_eq!(floats, vec![0.0, 127.0 / 255.0, 128.0 / 255.0, 1.0]);
    }

    #[test]
    fn test_read_float_signed_clamps() {
        assert_eq!(normalize::from_i8(-128), -1.0);
        assert_eq!(normalize::from_i8(127), 1.0);
        assert_eq!(normalize::from_i16(-32768), -1.0);
        // Inverse rounds to nearest after scaling.
        assert_eq!(normalize::to_u8(0.5), 128);
        assert_eq!(normalize::to_i16(1.0), 32767);
    }

    #[test]
    fn test_wire_overflow_is_format_error() {
        let uri = data_uri::encode_data_uri("application/octet-stream", &[0u8; 4]);

        // Element count at u64::MAX overflows the byte-length product.
        let text = serde_json::json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 4, "uri": uri}],
            "bufferViews": [{"buffer": 0, "byteLength": 4}],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5123,
                "count": u64::MAX,
                "type": "SCALAR"
            }]
        })
        .to_string();
        let doc = crate::deserialize::deserialize(&text).unwrap();
        let mut reader = ResourceReader::new(empty_read_cache());
        assert!(matches!(
            reader.read_accessor_bytes(&doc, doc.accessors.get("0").unwrap()),
            Err(GltfError::Format(_))
        ));

        // A view offset at u64::MAX overflows the buffer bound check.
        let text = serde_json::json!({
            "asset": {"version": "2.0"},
            "buffers": [{"byteLength": 4, "uri": uri}],
            "bufferViews": [{"buffer": 0, "byteOffset": u64::MAX, "byteLength": 2}],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5121,
                "count": 2,
                "type": "SCALAR"
            }]
        })
        .to_string();
        let doc = crate::deserialize::deserialize(&text).unwrap();
        assert!(matches!(
            reader.read_accessor_bytes(&doc, doc.accessors.get("0").unwrap()),
            Err(GltfError::Format(_))
        ));
    }

    #[test]
    fn test_reader_generated_name_uses_extension() {
        let values: [u16; 2] = [7, 9];
        let bytes: Vec<u8> = bytemuck::cast_slice(&values).to_vec();
        let cache: StreamCache<Box<dyn ReadSeek>> = StreamCache::new(move |name: &str| {
            if name == "mesh_0.dat" {
                Ok(Box::new(Cursor::new(bytes.clone())) as Box<dyn ReadSeek>)
            } else {
                Err(GltfError::usage(format!("unexpected stream '{name}'")))
            }
        });
        let mut reader = ResourceReader::new(cache)
            .with_uri_prefix("mesh_")
            .with_resource_extension("dat");

        let mut doc = Document::new();
        doc.buffers
            .append(
                Buffer {
                    id: "0".to_string(),
                    byte_length: 4,
                    ..Default::default()
                },
                AppendPolicy::ThrowOnEmpty,
            )
            .unwrap();
        doc.buffer_views
            .append(view("v", "0", 0, 4), AppendPolicy::ThrowOnEmpty)
            .unwrap();
        doc.accessors
            .append(accessor("a", "v", 0, 2), AppendPolicy::ThrowOnEmpty)
            .unwrap();

        let read: Vec<u16> = reader
            .read_typed(&doc, doc.accessors.get("a").unwrap())
            .unwrap();
        assert_eq!(read, values);
    }

    #[test]
    fn test_read_bounds_checked() {
        let bytes = [0u8; 4];
        // Accessor wants 3 u16 = 6 bytes from a 4-byte view.
        let doc = doc_with_inline_buffer(&bytes, accessor("a", "v", 0, 3));

        let mut reader = ResourceReader::new(empty_read_cache());
        assert!(reader
            .read_accessor_bytes(&doc, doc.accessors.get("a").unwrap())
            .is_err());
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_path_buf();

        let write_base = base.clone();
        let write_cache: StreamCache<Box<dyn WriteSeek>> = StreamCache::new(move |name: &str| {
            let file = std::fs::File::create(write_base.join(name))?;
            Ok(Box::new(file) as Box<dyn WriteSeek>)
        });
        let mut writer = ResourceWriter::new(write_cache);

        let values: [f32; 3] = [1.5, -2.5, 4.0];
        let v = view("v", "0", 0, 12);
        writer
            .write_buffer_view(&v, bytemuck::cast_slice(&values))
            .unwrap();
        drop(writer);

        let mut doc = Document::new();
        doc.buffers
            .append(
                Buffer {
                    id: "0".to_string(),
                    byte_length: 12,
                    ..Default::default()
                },
                AppendPolicy::ThrowOnEmpty,
            )
            .unwrap();
        doc.buffer_views.append(v, AppendPolicy::ThrowOnEmpty).unwrap();
        let mut a = accessor("a", "v", 0, 3);
        a.component_type = ComponentType::Float;
        doc.accessors.append(a, AppendPolicy::ThrowOnEmpty).unwrap();

        let read_cache: StreamCache<Box<dyn ReadSeek>> = StreamCache::new(move |name: &str| {
            let file = std::fs::File::open(base.join(name))?;
            Ok(Box::new(file) as Box<dyn ReadSeek>)
        });
        let mut reader = ResourceReader::new(read_cache);
        let read: Vec<f32> = reader
            .read_typed(&doc, doc.accessors.get("a").unwrap())
            .unwrap();
        assert_eq!(read, values);
    }
}
