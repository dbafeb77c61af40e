//! VMTI Local Set (MISB ST 0903) decoding.
//!
//! Introduced by tag 74 within the ST 0601 container. Target, algorithm and ontology series
//! are returned as raw bytes; the two IMAPB-mapped FOV fields are stubbed with a sentinel.

use super::local_set::{decode_local_set, decode_text_stripped, LocalSetDecode};
use super::uas::be_uint;
use super::MisbValue;

/// Decodes the value of an ST 0601 tag-74 item as a VMTI Local Set.
///
/// The result is an ordered [`MisbValue::Set`]: one decoded value per item in item order. The
/// nested checksum item is decoded but not revalidated.
pub fn decode(value: &[u8]) -> MisbValue {
    decode_local_set(value, VmtiDecoder.into())
}

#[derive(Default)]
pub(crate) struct VmtiDecoder;

impl LocalSetDecode for VmtiDecoder {
    fn decode_item(&self, tag: u8, value: &[u8]) -> MisbValue {
        match tag {
            1 | 4..=9 => MisbValue::Unsigned(be_uint(value)),
            2 => MisbValue::Float(be_uint(value) as f64 / 1000.0),
            3 | 10 => decode_text_stripped(value),
            11 | 12 => MisbValue::Label("IMAPB Required"),
            13 | 101..=103 => MisbValue::Bytes(value.to_vec()),
            _ => MisbValue::Text(format!("Unknown Key {}", tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tag: u8, value: &[u8]) -> MisbValue {
        VmtiDecoder.decode_item(tag, value)
    }

    #[test]
    fn counts_and_checksum() {
        assert_eq!(item(1, &[0x12, 0x34]), MisbValue::Unsigned(0x1234));
        assert_eq!(item(5, &[0x1C]), MisbValue::Unsigned(28));
        assert_eq!(item(8, &[0x07, 0x80]), MisbValue::Unsigned(1920));
        assert_eq!(item(9, &[0x04, 0x38]), MisbValue::Unsigned(1080));
    }

    #[test]
    fn timestamp_in_milliseconds() {
        assert_eq!(item(2, &[0x00, 0x00, 0x03, 0xE8]), MisbValue::Float(1.0));
    }

    #[test]
    fn names_strip_trailing_nuls() {
        assert_eq!(
            item(3, b"Tracker\x00"),
            MisbValue::Text("Tracker".to_owned())
        );
        assert_eq!(item(10, b"EO\x00\x00"), MisbValue::Text("EO".to_owned()));
    }

    #[test]
    fn stubbed_and_raw_fields() {
        assert_eq!(item(11, &[0x01, 0x02]), MisbValue::Label("IMAPB Required"));
        assert_eq!(item(12, &[0x01, 0x02]), MisbValue::Label("IMAPB Required"));
        assert_eq!(item(13, &[0xAA]), MisbValue::Bytes(vec![0xAA]));
        assert_eq!(item(101, &[0x01]), MisbValue::Bytes(vec![0x01]));
        assert_eq!(item(50, &[]), MisbValue::Text("Unknown Key 50".to_owned()));
    }

    #[test]
    fn decodes_item_sequence_in_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0x03, 0x04]);
        data.extend_from_slice(b"VMTI");
        data.extend_from_slice(&[0x05, 0x01, 0x02]);
        let decoded = decode(&data);
        assert_eq!(
            decoded,
            MisbValue::Set(vec![
                MisbValue::Text("VMTI".to_owned()),
                MisbValue::Unsigned(2),
            ])
        );
    }
}
