//! Ledger record encoding.
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────────┐
//! │ "ECOL"   │ version │ postcard(RecycledItem)│
//! │ 4 bytes  │ 1 byte  │ variable              │
//! └──────────┴─────────┴──────────────────────┘
//! ```

use crate::impact::RecycledItem;
use thiserror::Error;

/// Magic bytes at the start of every record.
pub const RECORD_MAGIC: [u8; 4] = *b"ECOL";

/// Current record format version.
pub const RECORD_VERSION: u8 = 1;

const HEADER_LEN: usize = RECORD_MAGIC.len() + 1;

/// Record encoding failures.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("record is too short ({0} bytes)")]
    Truncated(usize),

    #[error("record has wrong magic bytes")]
    BadMagic,

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),

    #[error("record payload: {0}")]
    Payload(#[from] postcard::Error),
}

/// Encode a ledger record with header.
pub fn encode_record(item: &RecycledItem) -> Result<Vec<u8>, FormatError> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + item.item.len() + 16);
    bytes.extend_from_slice(&RECORD_MAGIC);
    bytes.push(RECORD_VERSION);
    let bytes = postcard::to_extend(item, bytes)?;
    Ok(bytes)
}

/// Decode a ledger record, checking the header.
pub fn decode_record(bytes: &[u8]) -> Result<RecycledItem, FormatError> {
    if bytes.len() < HEADER_LEN {
        return Err(FormatError::Truncated(bytes.len()));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[..RECORD_MAGIC.len()] != RECORD_MAGIC {
        return Err(FormatError::BadMagic);
    }
    let version = header[RECORD_MAGIC.len()];
    if version != RECORD_VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }
    Ok(postcard::from_bytes(payload)?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::Category;

    fn item() -> RecycledItem {
        RecycledItem::new(Category::CircuitBoards, "Old router board", 1_700_000_000)
    }

    #[test]
    fn encoded_record_starts_with_header() {
        let bytes = encode_record(&item()).unwrap();
        assert_eq!(&bytes[..4], b"ECOL");
        assert_eq!(bytes[4], RECORD_VERSION);
        assert_eq!(decode_record(&bytes).unwrap(), item());
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(decode_record(b"ECO"), Err(FormatError::Truncated(3))));
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = encode_record(&item()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode_record(&bytes), Err(FormatError::BadMagic)));
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = encode_record(&item()).unwrap();
        bytes[4] = RECORD_VERSION + 1;
        assert!(matches!(
            decode_record(&bytes),
            Err(FormatError::UnsupportedVersion(v)) if v == RECORD_VERSION + 1
        ));
    }

    #[test]
    fn rejects_corrupt_payload() {
        let bytes = [&RECORD_MAGIC[..], &[RECORD_VERSION], &[0xFF]].concat();
        assert!(matches!(decode_record(&bytes), Err(FormatError::Payload(_))));
    }
}
