// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inline base64 data-URI payloads
//!
//! A buffer or image `uri` of the form `data:<mime>;base64,<payload>` is
//! decoded in place, never treated as an external reference.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gltf_lite_model::{GltfError, Result};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Check whether a uri uses the data scheme
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with(SCHEME)
}

/// Decode the payload of a base64 data-URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    if !is_data_uri(uri) {
        return Err(GltfError::format("Not a data uri"));
    }
    let marker = uri
        .find(BASE64_MARKER)
        .ok_or_else(|| GltfError::format("Data uri is not base64 encoded"))?;
    let payload = &uri[marker + BASE64_MARKER.len()..];

    STANDARD
        .decode(payload)
        .map_err(|e| GltfError::format(format!("Invalid base64 payload: {e}")))
}

/// Encode bytes as a base64 data-URI with the given mime type
pub fn encode_data_uri(mime_type: &str, data: &[u8]) -> String {
    format!("{SCHEME}{mime_type}{BASE64_MARKER}{}", STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = [0u8, 1, 2, 0xFF, 0x7F];
        let uri = encode_data_uri("application/octet-stream", &data);
        assert!(is_data_uri(&uri));
        assert_eq!(decode_data_uri(&uri).unwrap(), data);
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert!(!is_data_uri("buffer.bin"));
        assert!(decode_data_uri("buffer.bin").is_err());
    }

    #[test]
    fn test_rejects_missing_base64_marker() {
        assert!(decode_data_uri("data:text/plain,hello").is_err());
    }

    #[test]
    fn test_rejects_invalid_payload() {
        assert!(decode_data_uri("data:application/octet-stream;base64,@@@").is_err());
    }
}
