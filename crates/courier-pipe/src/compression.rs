//! Text payload compression: gzip, then base64 so the result stays text.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{SerializerError, SerializerResult};

/// Compresses text into base64-encoded gzip.
pub fn compress(text: &str) -> SerializerResult<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(|e| SerializerError::Compression(e.to_string()))?;
    let bytes = encoder
        .finish()
        .map_err(|e| SerializerError::Compression(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

/// Reverses [`compress`].
pub fn decompress(text: &str) -> SerializerResult<String> {
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| SerializerError::Compression(format!("invalid base64: {e}")))?;
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut out = String::new();
    decoder
        .read_to_string(&mut out)
        .map_err(|e| SerializerError::Compression(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_roundtrip() {
        let text = "hello ".repeat(200);
        let compressed = compress(&text).unwrap();
        assert!(compressed.len() < text.len());
        assert_eq!(decompress(&compressed).unwrap(), text);
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        assert!(matches!(decompress("!!!"), Err(SerializerError::Compression(_))));
        assert!(matches!(
            decompress("aGVsbG8="),
            Err(SerializerError::Compression(_))
        ));
    }
}
