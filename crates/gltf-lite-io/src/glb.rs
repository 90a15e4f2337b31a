// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GLB chunked binary container codec
//!
//! Layout: a 12-byte header (magic "glTF", version 2, total length), a JSON
//! chunk padded with trailing spaces to 4-byte alignment, then an optional
//! BIN chunk padded with zero bytes. All header fields are u32
//! little-endian.

use std::io::{Read, Seek, SeekFrom, Write};

use gltf_lite_model::{GltfError, Result};

/// "glTF" magic tag
pub const GLB_MAGIC: u32 = 0x4654_6C67;
/// Container version written and accepted
pub const GLB_VERSION: u32 = 2;
/// "JSON" chunk tag
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// "BIN\0" chunk tag
pub const CHUNK_BIN: u32 = 0x004E_4942;

/// Reserved id of the buffer stored in the BIN chunk; its resource uri is
/// the empty string so the serialized JSON references no external file
pub const GLB_BUFFER_ID: &str = "GLB";

const HEADER_LEN: u64 = 12;
const CHUNK_HEADER_LEN: u64 = 8;

fn padding_to_4(len: u64) -> usize {
    ((4 - len % 4) % 4) as usize
}

/// Total container length for a given JSON text and binary payload
pub fn glb_length(json_len: u64, bin_len: u64) -> u64 {
    let mut total = HEADER_LEN + CHUNK_HEADER_LEN + json_len + padding_to_4(json_len) as u64;
    if bin_len > 0 {
        total += CHUNK_HEADER_LEN + bin_len + padding_to_4(bin_len) as u64;
    }
    total
}

/// Write a document's serialized JSON and binary payload as one container
pub fn write_glb<W: Write>(out: &mut W, json: &str, bin: &[u8]) -> Result<()> {
    let json_bytes = json.as_bytes();
    let total = glb_length(json_bytes.len() as u64, bin.len() as u64);
    log::debug!(
        "writing glb: {} json bytes, {} bin bytes, {} total",
        json_bytes.len(),
        bin.len(),
        total
    );

    out.write_all(&GLB_MAGIC.to_le_bytes())?;
    out.write_all(&GLB_VERSION.to_le_bytes())?;
    out.write_all(&u32_len(total)?.to_le_bytes())?;

    let json_pad = padding_to_4(json_bytes.len() as u64);
    out.write_all(&u32_len((json_bytes.len() + json_pad) as u64)?.to_le_bytes())?;
    out.write_all(&CHUNK_JSON.to_le_bytes())?;
    out.write_all(json_bytes)?;
    // JSON chunks pad with spaces so the text stays parseable.
    out.write_all(&b"    "[..json_pad])?;

    if !bin.is_empty() {
        let bin_pad = padding_to_4(bin.len() as u64);
        out.write_all(&u32_len((bin.len() + bin_pad) as u64)?.to_le_bytes())?;
        out.write_all(&CHUNK_BIN.to_le_bytes())?;
        out.write_all(bin)?;
        out.write_all(&[0u8; 4][..bin_pad])?;
    }

    Ok(())
}

fn u32_len(len: u64) -> Result<u32> {
    u32::try_from(len).map_err(|_| GltfError::format("GLB chunk exceeds u32 length"))
}

fn read_u32<R: Read>(stream: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    stream.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Decoded container: JSON chunk as text, BIN chunk as a seekable range
///
/// The BIN chunk is not buffered; its absolute offset and length are
/// recorded so accessor reads can seek into the underlying stream later.
pub struct GlbReader<R: Read + Seek> {
    stream: R,
    json: String,
    bin_offset: u64,
    bin_length: u64,
}

impl<R: Read + Seek> GlbReader<R> {
    /// Validate headers and index the chunks of a container stream
    pub fn new(mut stream: R) -> Result<Self> {
        if read_u32(&mut stream)? != GLB_MAGIC {
            return Err(GltfError::format("Invalid GLB magic"));
        }
        let version = read_u32(&mut stream)?;
        if version != GLB_VERSION {
            return Err(GltfError::format(format!(
                "Unsupported GLB version {version}"
            )));
        }
        let total_length = u64::from(read_u32(&mut stream)?);

        let json_length = u64::from(read_u32(&mut stream)?);
        if read_u32(&mut stream)? != CHUNK_JSON {
            return Err(GltfError::format("First GLB chunk must be JSON"));
        }
        let mut json_bytes = vec![0u8; json_length as usize];
        stream.read_exact(&mut json_bytes)?;
        let json = String::from_utf8(json_bytes)
            .map_err(|_| GltfError::format("GLB JSON chunk is not valid UTF-8"))?;

        let mut bin_offset = 0;
        let mut bin_length = 0;
        let after_json = HEADER_LEN + CHUNK_HEADER_LEN + json_length;
        if after_json + CHUNK_HEADER_LEN <= total_length {
            let length = u64::from(read_u32(&mut stream)?);
            if read_u32(&mut stream)? != CHUNK_BIN {
                return Err(GltfError::format("Second GLB chunk must be BIN"));
            }
            bin_offset = after_json + CHUNK_HEADER_LEN;
            bin_length = length;
            if bin_offset + bin_length > total_length {
                return Err(GltfError::format("GLB BIN chunk exceeds container length"));
            }
        }

        log::debug!(
            "read glb: {json_length} json bytes, bin chunk {bin_length} bytes at {bin_offset}"
        );
        Ok(Self {
            stream,
            json,
            bin_offset,
            bin_length,
        })
    }

    /// JSON chunk text, including any trailing alignment spaces
    pub fn json(&self) -> &str {
        &self.json
    }

    /// Whether the container carries a BIN chunk
    pub fn has_binary(&self) -> bool {
        self.bin_length > 0
    }

    /// Length of the BIN chunk, including alignment padding
    pub fn binary_length(&self) -> u64 {
        self.bin_length
    }

    /// Read a byte range out of the BIN chunk
    pub fn read_binary(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        match offset.checked_add(len as u64) {
            Some(end) if end <= self.bin_length => {}
            _ => {
                return Err(GltfError::format(
                    "Read range exceeds GLB binary chunk length",
                ));
            }
        }
        self.stream.seek(SeekFrom::Start(self.bin_offset + offset))?;
        let mut data = vec![0u8; len];
        self.stream.read_exact(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_round_trip_unaligned_lengths() {
        // Neither length is a multiple of 4, so both chunks get padding.
        let json = r#"{"asset":{"version":"2.0"}}"#; // 27 bytes
        let bin: Vec<u8> = (0..9u8).collect();
        assert_ne!(json.len() % 4, 0);
        assert_ne!(bin.len() % 4, 0);

        let mut out = Vec::new();
        write_glb(&mut out, json, &bin).unwrap();
        assert_eq!(out.len() as u64, glb_length(json.len() as u64, bin.len() as u64));
        assert_eq!(out.len() % 4, 0);

        let mut reader = GlbReader::new(Cursor::new(out)).unwrap();
        assert_eq!(reader.json().trim_end_matches(' '), json);
        // Padding is trailing spaces only.
        assert_eq!(reader.json().len(), json.len() + 1);

        assert!(reader.has_binary());
        let payload = reader.read_binary(0, bin.len()).unwrap();
        assert_eq!(payload, bin);
        // The padded chunk ends with zero bytes.
        let padded = reader.binary_length();
        assert_eq!(padded, 12);
        let tail = reader.read_binary(bin.len() as u64, (padded as usize) - bin.len()).unwrap();
        assert!(tail.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_total_length_formula() {
        // 12 + (8 + padded json) + (8 + padded bin)
        assert_eq!(glb_length(27, 9), 12 + (8 + 28) + (8 + 12));
        assert_eq!(glb_length(28, 0), 12 + (8 + 28));
    }

    #[test]
    fn test_empty_payload_omits_bin_chunk() {
        let json = r#"{"asset":{"version":"2.0"}}"#;
        let mut out = Vec::new();
        write_glb(&mut out, json, &[]).unwrap();

        let reader = GlbReader::new(Cursor::new(out)).unwrap();
        assert!(!reader.has_binary());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = Vec::new();
        write_glb(&mut data, "{}", &[1, 2, 3]).unwrap();
        data[0] = b'X';
        assert!(GlbReader::new(Cursor::new(data)).is_err());
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut data = Vec::new();
        write_glb(&mut data, "{}", &[]).unwrap();
        data[4] = 1;
        assert!(GlbReader::new(Cursor::new(data)).is_err());
    }

    #[test]
    fn test_read_binary_bounds_checked() {
        let mut data = Vec::new();
        write_glb(&mut data, "{}", &[1, 2, 3, 4]).unwrap();
        let mut reader = GlbReader::new(Cursor::new(data)).unwrap();
        assert!(reader.read_binary(2, 4).is_err());
        // An offset near u64::MAX must fail the range check, not wrap.
        assert!(matches!(
            reader.read_binary(u64::MAX, 4),
            Err(GltfError::Format(_))
        ));
    }
}
