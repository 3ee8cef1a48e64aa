//! PNG chunk stream scanning and writing.
//!
//! Walks the `[length][type][data][CRC]` chunk layout of a PNG byte stream
//! without touching pixel data. CRCs are not validated when scanning; they
//! are computed when writing so generic PNG tools accept the output.

use crate::decode::StaxError;

/// The 8 canonical PNG signature bytes.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Private ancillary chunk type carrying the Stax payload. The lowercase
/// first letter marks it ancillary/private per the PNG convention, so
/// generic readers skip it.
pub const STAX_CHUNK_TYPE: [u8; 4] = *b"stAx";

pub(crate) const IEND_CHUNK_TYPE: [u8; 4] = *b"IEND";

/// Validate the PNG signature at the start of `data`.
pub fn check_signature(data: &[u8]) -> Result<(), StaxError> {
    if data.len() < PNG_SIGNATURE.len() {
        return Err(StaxError::TooShort);
    }
    if data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(StaxError::InvalidFormat);
    }
    Ok(())
}

/// Locate the `stAx` chunk and return its data segment (exactly the declared
/// length, CRC excluded).
///
/// Scanning stops at the first match. A buffer that ends exactly on a chunk
/// boundary without a match is [`StaxError::ChunkNotFound`]; a partial chunk
/// header, or a data segment running past the end, is [`StaxError::TooShort`].
pub fn find_stax(data: &[u8]) -> Result<&[u8], StaxError> {
    check_signature(data)?;
    let mut offset = PNG_SIGNATURE.len();
    while offset < data.len() {
        if data.len() < offset + 8 {
            return Err(StaxError::TooShort);
        }
        let length = read_be32(&data[offset..]) as usize;
        // data segment plus the 4-byte CRC must be in bounds
        let end = offset + 12 + length;
        if data.len() < end {
            return Err(StaxError::TooShort);
        }
        if data[offset + 4..offset + 8] == STAX_CHUNK_TYPE {
            return Ok(&data[offset + 8..offset + 8 + length]);
        }
        offset = end;
    }
    Err(StaxError::ChunkNotFound)
}

/// Append one `[length][type][data][CRC]` chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: [u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
}

fn read_be32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

// CRC-32 (ISO 3309, reflected polynomial 0xEDB88320) over type + data,
// as required for PNG chunks.

const CRC_TABLE: [u32; 256] = build_crc_table();

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut c = i;
        let mut j = 0;
        while j < 8 {
            if c & 1 != 0 {
                c = 0xEDB8_8320 ^ (c >> 1);
            } else {
                c >>= 1;
            }
            j += 1;
        }
        table[i as usize] = c;
        i += 1;
    }
    table
}

fn crc_update(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = CRC_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// CRC of one chunk: type bytes followed by data bytes.
pub(crate) fn chunk_crc(chunk_type: [u8; 4], data: &[u8]) -> u32 {
    crc_update(crc_update(0xFFFF_FFFF, &chunk_type), data) ^ 0xFFFF_FFFF
}
