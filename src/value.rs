use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Ordered list of (flag name, state) pairs decoded from the tag-47 generic flag byte.
pub type FlagList = SmallVec<[(&'static str, bool); 6]>;

/// Opaque bytes rendered as lowercase hex, optionally behind a descriptive prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct HexBytes {
    /// Descriptive prefix, e.g. `"SAR Motion Imagery Metadata"`. `None` renders bare hex.
    pub prefix: Option<&'static str>,
    /// The raw value bytes.
    pub bytes: Vec<u8>,
}

impl Display for HexBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix {
            write!(f, "{}: ", prefix)?;
        }
        for byte in &self.bytes {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Decoded value of one KLV item.
///
/// Every known tag decodes to a fixed variant; unknown tags and per-field conversion failures
/// surface the raw bytes unmodified.
#[derive(Debug, Clone, PartialEq)]
pub enum MisbValue {
    /// Unsigned integer carrier: checksums, versions, counts.
    Unsigned(u64),
    /// Scaled floating-point quantity. NaN marks the per-tag error sentinel.
    Float(f64),
    /// Decoded UTF-8 string.
    Text(String),
    /// Enumeration name or sentinel string such as `"IMAPB"` or `"DEPRECATED"`.
    Label(&'static str),
    /// Generic flag data as an ordered name-to-state list.
    Flags(FlagList),
    /// Nested Local Set record, one decoded value per item in item order.
    Set(Vec<MisbValue>),
    /// Raw value bytes passed through unmodified.
    Bytes(Vec<u8>),
    /// Opaque bytes rendered as lowercase hex with a descriptive prefix.
    Hex(HexBytes),
}

impl Display for MisbValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MisbValue::Unsigned(value) => write!(f, "{}", value),
            MisbValue::Float(value) => write!(f, "{}", value),
            MisbValue::Text(value) => f.write_str(value),
            MisbValue::Label(value) => f.write_str(value),
            MisbValue::Flags(flags) => {
                f.write_str("{")?;
                for (index, (name, state)) in flags.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, state)?;
                }
                f.write_str("}")
            }
            MisbValue::Set(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            MisbValue::Bytes(bytes) => {
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            MisbValue::Hex(hex) => write!(f, "{}", hex),
        }
    }
}

/// Ordered mapping from human-readable field name to decoded value for one accepted packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPacket {
    /// 1-based packet number. Numbers of dropped packets are consumed, so gaps are possible.
    pub number: u32,
    fields: Vec<(String, MisbValue)>,
}

impl DecodedPacket {
    pub(crate) fn new(number: u32) -> Self {
        Self {
            number,
            fields: Vec::new(),
        }
    }

    /// Inserts `value` under `name`. A repeated name replaces the value in place, keeping the
    /// position of the first insertion.
    pub(crate) fn insert(&mut self, name: String, value: MisbValue) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&MisbValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Iterates fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &MisbValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields in this packet.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this packet decoded no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result tree of one decode pass: accepted packets in acceptance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedStream {
    /// Accepted packets. Packet numbers of dropped packets are consumed, so the sequence of
    /// numbers may contain gaps.
    pub packets: Vec<DecodedPacket>,
}

impl DecodedStream {
    /// Looks up a packet by its 1-based number.
    pub fn get(&self, number: u32) -> Option<&DecodedPacket> {
        self.packets.iter().find(|packet| packet.number == number)
    }
}
