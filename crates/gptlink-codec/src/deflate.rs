//! DEFLATE transport for unencrypted shares
//!
//! Output is always a zlib container. Input may be zlib (first byte `0x78`)
//! or raw deflate, since older producers emitted bare deflate streams.

use std::io::{Read, Write};

use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use gptlink_core::{LinkError, LinkResult};

/// First byte of every zlib stream with a 32K window (CMF = 0x78)
pub const ZLIB_HEADER_BYTE: u8 = 0x78;

/// Upper bound on inflated output, so a crafted link cannot exhaust memory
pub const MAX_DECOMPRESSED_SIZE: u64 = 8 * 1024 * 1024;

/// Compress `data` into a zlib container at `level` (0-9).
pub fn compress(data: &[u8], level: u32) -> LinkResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(level.min(9)),
    );
    encoder
        .write_all(data)
        .map_err(|e| LinkError::Compression(format!("zlib compress: {e}")))?;
    encoder
        .finish()
        .map_err(|e| LinkError::Compression(format!("zlib finish: {e}")))
}

/// Inflate zlib or raw-deflate `data`, sniffing the container by its first byte.
pub fn decompress(data: &[u8]) -> LinkResult<Vec<u8>> {
    match data.first() {
        None => Err(LinkError::Compression("empty compressed payload".into())),
        Some(&ZLIB_HEADER_BYTE) => read_bounded(ZlibDecoder::new(data), "zlib"),
        Some(_) => read_bounded(DeflateDecoder::new(data), "raw deflate"),
    }
}

fn read_bounded(reader: impl Read, kind: &str) -> LinkResult<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take(MAX_DECOMPRESSED_SIZE + 1)
        .read_to_end(&mut out)
        .map_err(|e| LinkError::Compression(format!("{kind} decompress: {e}")))?;
    if out.len() as u64 > MAX_DECOMPRESSED_SIZE {
        return Err(LinkError::Compression(format!(
            "decompressed payload exceeds {MAX_DECOMPRESSED_SIZE} bytes"
        )));
    }
    tracing::trace!(kind, inflated = out.len(), "decompressed share payload");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;

    fn raw_deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_zlib_roundtrip() {
        let data = br#"{"m":"gpt-4o-mini","s":"You are terse."}"#.repeat(20);

        let compressed = compress(&data, 6).unwrap();
        assert_eq!(compressed[0], ZLIB_HEADER_BYTE);
        assert!(compressed.len() < data.len());

        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_raw_deflate_fallback() {
        let data = b"raw deflate from an older producer".repeat(4);
        let compressed = raw_deflate(&data);
        assert_ne!(compressed[0], ZLIB_HEADER_BYTE);

        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_all_levels_roundtrip() {
        let data = b"level check ".repeat(32);
        for level in 0..=9 {
            let compressed = compress(&data, level).unwrap();
            assert_eq!(compressed[0], ZLIB_HEADER_BYTE, "level {level}");
            assert_eq!(decompress(&compressed).unwrap(), data, "level {level}");
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(decompress(&[]), Err(LinkError::Compression(_))));
    }

    #[test]
    fn test_corrupt_zlib_rejected() {
        let mut compressed = compress(b"some payload that is long enough", 6).unwrap();
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF; // adler32 checksum
        assert!(decompress(&compressed).is_err());
    }

    #[test]
    fn test_decompression_bomb_rejected() {
        let data = vec![0u8; MAX_DECOMPRESSED_SIZE as usize + 1];
        let compressed = compress(&data, 9).unwrap();
        assert!(matches!(decompress(&compressed), Err(LinkError::Compression(_))));
    }
}
