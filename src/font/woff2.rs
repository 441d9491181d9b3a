//! WOFF2 transport packaging for an already-assembled sfnt binary.
//!
//! Tables are kept untransformed (the transform version bits select the
//! null transform) and concatenated into a single Brotli stream.

use crate::core::errors::ForgeError;
use crate::font::writer::ByteWriter;
use std::io::Write;

const WOFF2_SIGNATURE: u32 = u32::from_be_bytes(*b"wOF2");
const HEADER_LEN: usize = 48;
// Directory entry flag: arbitrary tag follows the flags byte.
const FLAG_ARBITRARY_TAG: u8 = 0x3F;
const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

struct SfntTable<'a> {
    tag: [u8; 4],
    data: &'a [u8],
}

/// Compress an sfnt font into a WOFF2 file.
pub fn compress(sfnt: &[u8]) -> Result<Vec<u8>, ForgeError> {
    let tables = parse_sfnt(sfnt)?;
    let flavor = u32::from_be_bytes([sfnt[0], sfnt[1], sfnt[2], sfnt[3]]);

    let mut directory = ByteWriter::new();
    let mut uncompressed = Vec::new();
    for table in &tables {
        directory.u8(FLAG_ARBITRARY_TAG);
        directory.tag(table.tag);
        write_uint_base128(&mut directory, table.data.len() as u32);
        // Null transform for every table: no transformLength field.
        uncompressed.extend_from_slice(table.data);
    }

    let mut compressed = Vec::new();
    {
        let mut encoder = brotli::CompressorWriter::new(
            &mut compressed,
            BROTLI_BUFFER_SIZE,
            BROTLI_QUALITY,
            BROTLI_WINDOW,
        );
        encoder.write_all(&uncompressed)?;
        encoder.flush()?;
    }

    // Size the original font would occupy if reassembled, with padded
    // tables.
    let total_sfnt_size: u32 = 12
        + 16 * tables.len() as u32
        + tables
            .iter()
            .map(|t| (t.data.len() as u32).div_ceil(4) * 4)
            .sum::<u32>();
    let total_length = HEADER_LEN + directory.len() + compressed.len();

    let mut w = ByteWriter::new();
    w.u32(WOFF2_SIGNATURE);
    w.u32(flavor);
    w.u32(total_length as u32);
    w.u16(tables.len() as u16);
    w.u16(0); // reserved
    w.u32(total_sfnt_size);
    w.u32(compressed.len() as u32); // totalCompressedSize
    w.u16(1); // majorVersion
    w.u16(0); // minorVersion
    w.u32(0); // metaOffset
    w.u32(0); // metaLength
    w.u32(0); // metaOrigLength
    w.u32(0); // privOffset
    w.u32(0); // privLength
    debug_assert_eq!(w.len(), HEADER_LEN);
    w.extend(directory.bytes());
    w.extend(&compressed);
    Ok(w.into_bytes())
}

fn parse_sfnt(sfnt: &[u8]) -> Result<Vec<SfntTable<'_>>, ForgeError> {
    let malformed = |reason: &str| {
        ForgeError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("sfnt input: {reason}"),
        ))
    };
    if sfnt.len() < 12 {
        return Err(malformed("shorter than the offset table"));
    }
    let num_tables = u16::from_be_bytes([sfnt[4], sfnt[5]]) as usize;
    if sfnt.len() < 12 + 16 * num_tables {
        return Err(malformed("truncated table directory"));
    }
    let mut tables = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let at = 12 + 16 * i;
        let tag = [sfnt[at], sfnt[at + 1], sfnt[at + 2], sfnt[at + 3]];
        let offset =
            u32::from_be_bytes([sfnt[at + 8], sfnt[at + 9], sfnt[at + 10], sfnt[at + 11]]) as usize;
        let length =
            u32::from_be_bytes([sfnt[at + 12], sfnt[at + 13], sfnt[at + 14], sfnt[at + 15]])
                as usize;
        let data = sfnt
            .get(offset..offset + length)
            .ok_or_else(|| malformed("table extends past the end of the file"))?;
        tables.push(SfntTable { tag, data });
    }
    Ok(tables)
}

/// Variable-length unsigned integer: 7 bits per byte, most significant
/// first, high bit set on every byte but the last.
fn write_uint_base128(w: &mut ByteWriter, value: u32) {
    let mut started = false;
    for shift in [28u32, 21, 14, 7] {
        let byte = ((value >> shift) & 0x7F) as u8;
        if byte != 0 || started {
            w.u8(byte | 0x80);
            started = true;
        }
    }
    w.u8((value & 0x7F) as u8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tables::{build_maxp_charstring, SfntBuilder, FLAVOR_CFF};

    fn sample_sfnt() -> Vec<u8> {
        let mut sfnt = SfntBuilder::new(FLAVOR_CFF);
        sfnt.add(*b"maxp", build_maxp_charstring(3));
        sfnt.add(*b"CFF ", vec![1, 0, 4, 4, 0, 0]);
        sfnt.build()
    }

    #[test]
    fn header_carries_signature_flavor_and_sizes() {
        let woff2 = compress(&sample_sfnt()).unwrap();
        assert_eq!(&woff2[0..4], b"wOF2");
        assert_eq!(&woff2[4..8], b"OTTO");
        let total_length = u32::from_be_bytes([woff2[8], woff2[9], woff2[10], woff2[11]]);
        assert_eq!(total_length as usize, woff2.len());
        assert_eq!(&woff2[12..14], &2u16.to_be_bytes());
        // totalSfntSize: directory plus the two padded tables.
        let total_sfnt = u32::from_be_bytes([woff2[16], woff2[17], woff2[18], woff2[19]]);
        assert_eq!(total_sfnt, 12 + 32 + 8 + 8);
    }

    #[test]
    fn stream_decompresses_to_the_concatenated_tables() {
        let sfnt = sample_sfnt();
        let woff2 = compress(&sfnt).unwrap();
        // Directory: 2 entries of flag + tag + one-byte length.
        let dir_len = 2 * (1 + 4 + 1);
        let compressed = &woff2[HEADER_LEN + dir_len..];
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut std::io::Cursor::new(compressed), &mut decompressed)
            .unwrap();
        // Tables in directory order (sorted by tag, so CFF first),
        // unpadded.
        let expected_len = 6 + 6;
        assert_eq!(decompressed.len(), expected_len);
        assert_eq!(&decompressed[0..4], &[1, 0, 4, 4]);
    }

    #[test]
    fn base128_uses_the_minimal_byte_count() {
        let encode = |v: u32| {
            let mut w = ByteWriter::new();
            write_uint_base128(&mut w, v);
            w.into_bytes()
        };
        assert_eq!(encode(0), vec![0]);
        assert_eq!(encode(127), vec![127]);
        assert_eq!(encode(128), vec![0x81, 0x00]);
        assert_eq!(encode(16384), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode(u32::MAX), vec![0x8F, 0xFF, 0xFF, 0xFF, 0x7F]);
    }
}
