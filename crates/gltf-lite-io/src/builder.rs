// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental buffer/buffer-view/accessor construction
//!
//! The builder keeps three transient entity stores and a "current" pointer
//! into each, so callers add data incrementally without re-specifying the
//! owning buffer or view. Payload bytes stream through the associated
//! [`ResourceWriter`] as records are appended. [`BufferBuilder::output`]
//! consumes the builder, so a flushed builder cannot be reused.

use gltf_lite_model::{
    Accessor, AccessorKind, AppendPolicy, Buffer, BufferView, BufferViewTarget, ComponentType,
    Document, Entity, EntityStore, GltfError, Result,
};

use crate::glb::GLB_BUFFER_ID;
use crate::resource::{AccessorElement, ResourceWriter};

fn align_to(value: u64, alignment: u64) -> u64 {
    (value + alignment - 1) / alignment * alignment
}

/// Element layout of an accessor to be built
#[derive(Clone, Debug)]
pub struct AccessorDesc {
    pub component_type: ComponentType,
    pub kind: AccessorKind,
    pub normalized: bool,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl AccessorDesc {
    pub fn new(component_type: ComponentType, kind: AccessorKind) -> Self {
        Self {
            component_type,
            kind,
            normalized: false,
            min: Vec::new(),
            max: Vec::new(),
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    pub fn with_min_max(mut self, min: Vec<f32>, max: Vec<f32>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Builds buffer/buffer-view/accessor triples while streaming their bytes
pub struct BufferBuilder {
    writer: ResourceWriter,
    buffers: EntityStore<Buffer>,
    views: EntityStore<BufferView>,
    accessors: EntityStore<Accessor>,
    current_buffer: Option<String>,
    current_view: Option<String>,
}

impl BufferBuilder {
    pub fn new(writer: ResourceWriter) -> Self {
        Self {
            writer,
            buffers: EntityStore::new("buffers"),
            views: EntityStore::new("bufferViews"),
            accessors: EntityStore::new("accessors"),
            current_buffer: None,
            current_view: None,
        }
    }

    /// The writer streaming this builder's payload bytes
    pub fn writer_mut(&mut self) -> &mut ResourceWriter {
        &mut self.writer
    }

    /// Start a new buffer with a generated id
    pub fn add_buffer(&mut self) -> Result<&Buffer> {
        self.add_buffer_with_id(String::new())
    }

    /// Start the reserved GLB binary-chunk buffer
    pub fn add_glb_buffer(&mut self) -> Result<&Buffer> {
        self.add_buffer_with_id(GLB_BUFFER_ID)
    }

    /// Start a new buffer with an explicit id
    pub fn add_buffer_with_id(&mut self, id: impl Into<String>) -> Result<&Buffer> {
        let mut buffer = Buffer {
            id: id.into(),
            ..Default::default()
        };
        let stored = self.buffers.append(buffer.clone(), AppendPolicy::GenerateOnEmpty)?;
        buffer.id = stored.id().to_string();

        // The GLB buffer serializes without a uri; generated buffers record
        // the resource name the writer will stream them to.
        if buffer.id != GLB_BUFFER_ID {
            buffer.uri = Some(self.writer.buffer_uri(&buffer));
        }
        let id = buffer.id.clone();
        self.buffers.replace(buffer)?;

        self.current_buffer = Some(id.clone());
        self.current_view = None;
        self.buffers.get(&id)
    }

    /// Start a new buffer view in the current buffer
    pub fn add_buffer_view(&mut self, target: Option<BufferViewTarget>) -> Result<&BufferView> {
        let buffer_id = self
            .current_buffer
            .clone()
            .ok_or_else(|| GltfError::usage("add_buffer_view called before add_buffer"))?;

        let buffer = self.buffers.get_mut(&buffer_id)?;
        let offset = align_to(buffer.byte_length, 4);
        buffer.byte_length = offset;

        let view = BufferView {
            buffer_id,
            byte_offset: offset,
            byte_length: 0,
            target,
            ..Default::default()
        };
        let stored = self.views.append(view, AppendPolicy::GenerateOnEmpty)?;
        self.current_view = Some(stored.id().to_string());
        Ok(stored)
    }

    /// Append an accessor over raw bytes to the current buffer view
    ///
    /// The accessor lands at the view's running byte length, aligned up to
    /// the component size; the writer zero-fills any alignment gap.
    pub fn add_accessor(&mut self, data: &[u8], desc: AccessorDesc) -> Result<&Accessor> {
        let view_id = self
            .current_view
            .clone()
            .ok_or_else(|| GltfError::usage("add_accessor called before add_buffer_view"))?;

        let element_size = (desc.component_type.size() * desc.kind.components()) as u64;
        if data.len() as u64 % element_size != 0 {
            return Err(GltfError::format(format!(
                "Data length {} is not a multiple of the {}-byte element size",
                data.len(),
                element_size
            )));
        }
        let count = data.len() as u64 / element_size;

        let view = self.views.get_mut(&view_id)?;
        let rel_offset = align_to(view.byte_length, desc.component_type.size() as u64);
        view.byte_length = rel_offset + data.len() as u64;
        let view_snapshot = view.clone();

        let buffer = self.buffers.get_mut(&view_snapshot.buffer_id)?;
        buffer.byte_length = view_snapshot.byte_offset + view_snapshot.byte_length;

        let accessor = Accessor {
            buffer_view_id: Some(view_id),
            byte_offset: rel_offset,
            component_type: desc.component_type,
            kind: desc.kind,
            normalized: desc.normalized,
            count,
            min: desc.min,
            max: desc.max,
            ..Default::default()
        };
        let stored = self
            .accessors
            .append(accessor, AppendPolicy::GenerateOnEmpty)?;
        let stored_id = stored.id().to_string();

        self.writer
            .write_accessor(self.accessors.get(&stored_id)?, &view_snapshot, data)?;
        self.accessors.get(&stored_id)
    }

    /// Append an accessor over a typed array
    ///
    /// The array's length must divide evenly by the element kind's component
    /// arity; a remainder is a format error, never a silent truncation.
    pub fn add_accessor_typed<T: AccessorElement>(
        &mut self,
        data: &[T],
        kind: AccessorKind,
        normalized: bool,
    ) -> Result<&Accessor> {
        if data.len() % kind.components() != 0 {
            return Err(GltfError::format(format!(
                "Array length {} is not divisible by the {} components of {:?}",
                data.len(),
                kind.components(),
                kind
            )));
        }
        let mut desc = AccessorDesc::new(T::COMPONENT_TYPE, kind);
        desc.normalized = normalized;
        self.add_accessor(bytemuck::cast_slice(data), desc)
    }

    /// Count of records staged in the transient stores
    pub fn staged(&self) -> (usize, usize, usize) {
        (self.buffers.len(), self.views.len(), self.accessors.len())
    }

    /// Move all staged records into the document, consuming the builder
    ///
    /// Returns the writer so the caller can flush a GLB payload.
    pub fn output(mut self, doc: &mut Document) -> Result<ResourceWriter> {
        log::debug!(
            "flushing builder: {} buffers, {} views, {} accessors",
            self.buffers.len(),
            self.views.len(),
            self.accessors.len()
        );
        for buffer in self.buffers.drain() {
            doc.buffers.append(buffer, AppendPolicy::GenerateOnEmpty)?;
        }
        for view in self.views.drain() {
            doc.buffer_views
                .append(view, AppendPolicy::GenerateOnEmpty)?;
        }
        for accessor in self.accessors.drain() {
            doc.accessors
                .append(accessor, AppendPolicy::GenerateOnEmpty)?;
        }
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StreamCache;
    use crate::resource::WriteSeek;
    use std::io::Cursor;

    fn memory_writer() -> ResourceWriter {
        let cache: StreamCache<Box<dyn WriteSeek>> = StreamCache::new(|_name: &str| {
            Ok(Box::new(Cursor::new(Vec::new())) as Box<dyn WriteSeek>)
        });
        ResourceWriter::new(cache)
    }

    fn glb_writer() -> ResourceWriter {
        let cache: StreamCache<Box<dyn WriteSeek>> = StreamCache::new(|name: &str| {
            Err(GltfError::usage(format!("unexpected stream '{name}'")))
        });
        ResourceWriter::new_glb(cache)
    }

    #[test]
    fn test_ordering_enforced() {
        let mut builder = BufferBuilder::new(memory_writer());
        assert!(builder
            .add_buffer_view(None)
            .is_err());
        builder.add_buffer().unwrap();
        assert!(builder
            .add_accessor_typed::<u16>(&[1, 2, 3], AccessorKind::Scalar, false)
            .is_err());
    }

    #[test]
    fn test_accessor_layout_and_alignment() {
        let mut builder = BufferBuilder::new(glb_writer());
        builder.add_glb_buffer().unwrap();
        builder
            .add_buffer_view(Some(BufferViewTarget::ElementArrayBuffer))
            .unwrap();

        // 3 u8 values, then f32 values: the second accessor must land on a
        // 4-byte boundary inside the view.
        builder
            .add_accessor_typed::<u8>(&[1, 2, 3], AccessorKind::Scalar, false)
            .unwrap();
        let acc = builder
            .add_accessor_typed::<f32>(&[1.0, 2.0, 3.0], AccessorKind::Vec3, false)
            .unwrap();
        assert_eq!(acc.byte_offset, 4);
        assert_eq!(acc.count, 1);

        let mut doc = Document::new();
        let writer = builder.output(&mut doc).unwrap();
        assert_eq!(doc.buffers.get(GLB_BUFFER_ID).unwrap().byte_length, 16);

        let payload = writer.into_glb_payload().unwrap();
        assert_eq!(payload.len(), 16);
        assert_eq!(&payload[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn test_divisibility_is_a_format_error() {
        let mut builder = BufferBuilder::new(glb_writer());
        builder.add_glb_buffer().unwrap();
        builder.add_buffer_view(None).unwrap();

        let err = builder
            .add_accessor_typed::<f32>(&[1.0, 2.0, 3.0, 4.0], AccessorKind::Vec3, false)
            .unwrap_err();
        assert!(matches!(err, GltfError::Format(_)));
    }

    #[test]
    fn test_output_moves_and_clears() {
        let mut builder = BufferBuilder::new(glb_writer());
        builder.add_glb_buffer().unwrap();
        builder.add_buffer_view(None).unwrap();
        builder
            .add_accessor_typed::<u16>(&[1, 2, 3], AccessorKind::Scalar, false)
            .unwrap();
        assert_eq!(builder.staged(), (1, 1, 1));

        let mut doc = Document::new();
        builder.output(&mut doc).unwrap();
        assert_eq!(doc.buffers.len(), 1);
        assert_eq!(doc.buffer_views.len(), 1);
        assert_eq!(doc.accessors.len(), 1);
        // The accessor still references its view after the move.
        let acc = doc.accessors.get_at(0).unwrap();
        let view_id = acc.buffer_view_id.clone().unwrap();
        assert!(doc.buffer_views.has(&view_id));
    }

    #[test]
    fn test_generated_buffer_records_uri() {
        let mut builder = BufferBuilder::new(memory_writer());
        let buffer = builder.add_buffer().unwrap();
        assert_eq!(buffer.uri.as_deref(), Some("0.bin"));
    }

    #[test]
    fn test_second_view_aligns_buffer() {
        let mut builder = BufferBuilder::new(glb_writer());
        builder.add_glb_buffer().unwrap();
        builder.add_buffer_view(None).unwrap();
        builder
            .add_accessor_typed::<u16>(&[1, 2, 3], AccessorKind::Scalar, false)
            .unwrap();

        let view = builder.add_buffer_view(None).unwrap();
        assert_eq!(view.byte_offset, 8);
    }
}
