//! Locates Universal-Label-keyed packets inside the metadata elementary stream, carves them
//! into tagged items and validates the ST 0601 running checksum.

use super::ber::{ber_length_lossy, read_ber_length};
use super::{uas, DecodedPacket, DecodedStream, Error, ErrorDetails, Result, SliceReader};
use log::{info, warn};
use smallvec::SmallVec;
use std::convert::TryFrom;

/// One (tag, value) item carved from a Local Set. The BER length is consumed during carving.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawItem<'a> {
    pub tag: u8,
    pub value: &'a [u8],
}

pub(crate) type ItemList<'a> = SmallVec<[RawItem<'a>; 16]>;

/// Computes the ST 0601 16-bit running sum over `data`.
///
/// Bytes at even offsets contribute to the high octet and bytes at odd offsets to the low
/// octet, wrapping modulo 2^16. A packet validates when the sum taken from the first byte of
/// its Universal Label up to (excluding) the two checksum bytes equals the tag-1 value.
pub fn running_checksum(data: &[u8]) -> u16 {
    let mut sum = 0_u16;
    for (index, &byte) in data.iter().enumerate() {
        sum = sum.wrapping_add(u16::from(byte) << (8 * ((index + 1) % 2)));
    }
    sum
}

/// Walks `reader` as a sequence of (tag, BER length, value) triples with strict bounds checks.
pub(crate) fn read_items<'a>(reader: &mut SliceReader<'a>) -> Result<ItemList<'a>> {
    let mut items = ItemList::new();
    while reader.remaining_len() > 0 {
        let tag = reader.read_u8()?;
        let (length, _) = read_ber_length(reader)?;
        if length > reader.remaining_len() as u64 {
            return Err(reader.make_error(ErrorDetails::InvalidFrame));
        }
        let value = reader.read(length as usize)?;
        items.push(RawItem { tag, value });
    }
    Ok(items)
}

/// Item walk used inside nested Local Sets. Over-long values clamp to the enclosing value and
/// a trailing tag without a length field is discarded.
pub(crate) fn read_items_lossy(data: &[u8]) -> ItemList<'_> {
    let mut items = ItemList::new();
    let mut i = 0;
    while i < data.len() {
        let tag = data[i];
        i += 1;
        let (length, length_size) = ber_length_lossy(&data[i..]);
        if length_size == 0 {
            break;
        }
        i += length_size;
        let end = (i as u64).saturating_add(length).min(data.len() as u64) as usize;
        items.push(RawItem {
            tag,
            value: &data[i..end],
        });
        i = end;
    }
    items
}

/// Frames and decodes every UAS Datalink packet found in a byte buffer.
///
/// The buffer is scanned for occurrences of the 16-byte Universal Label; every occurrence
/// except the last starts a packet, which is carved, checksum-validated and decoded
/// independently. The scan is byte-aligned and tolerates leading and interstitial noise.
/// Packets that fail framing or the checksum are dropped but still consume their packet
/// number, so the numbering of the result may contain gaps.
///
/// # Example
///
/// ```
/// use klv_io::{KlvParser, MisbValue, UAS_LDS_KEY};
///
/// let mut stream = Vec::new();
/// stream.extend_from_slice(&UAS_LDS_KEY);
/// stream.extend_from_slice(&[0x03, 65, 0x01, 0x06]);
/// // A packet is only carved once a following Universal Label confirms it.
/// stream.extend_from_slice(&UAS_LDS_KEY);
///
/// let result = KlvParser::new(&stream, &UAS_LDS_KEY).decode();
/// assert_eq!(result.packets.len(), 1);
/// assert_eq!(
///     result.packets[0].get("UAS Datalink LS Version Number"),
///     Some(&MisbValue::Float(6.0))
/// );
/// ```
#[derive(Debug)]
pub struct KlvParser<'a> {
    data: &'a [u8],
    key: &'a [u8],
}

impl<'a> KlvParser<'a> {
    /// Creates a parser over `data` keyed by the Universal Label `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty.
    pub fn new(data: &'a [u8], key: &'a [u8]) -> Self {
        assert!(!key.is_empty(), "Universal Label must be non-empty");
        Self { data, key }
    }

    /// Decodes the buffer into the result tree.
    ///
    /// Never fails: malformed or checksum-mismatched packets are logged and dropped, and the
    /// partial result is returned. Decoding the same buffer twice yields identical results.
    pub fn decode(&self) -> DecodedStream {
        let mut out = DecodedStream::default();
        let starts = self.scan();
        if starts.len() < 2 {
            return out;
        }
        for (index, &start) in starts[..starts.len() - 1].iter().enumerate() {
            let number = (index + 1) as u32;
            match self.carve(start) {
                Ok((packet, items)) => match verify_checksum(packet, &items) {
                    Ok(()) => out.packets.push(decode_packet(number, &items)),
                    Err(error) => info!(
                        "Dropping packet {} on checksum mismatch: {:?}",
                        number, error.details
                    ),
                },
                Err(error) => warn!(
                    "Dropping malformed packet {} at offset {}: {:?}",
                    number, start, error.details
                ),
            }
        }
        out
    }

    /// Records the offset of every Universal Label occurrence, skipping over the BER-declared
    /// payload of each match so a label embedded in packet data is not treated as a start.
    fn scan(&self) -> Vec<usize> {
        let key_length = self.key.len();
        let mut starts = Vec::new();
        let mut i = 0;
        while i + key_length <= self.data.len() {
            if self.data[i] != self.key[0] || self.data[i..i + key_length] != *self.key {
                i += 1;
                continue;
            }
            starts.push(i);
            i += key_length;
            let (length, length_size) = ber_length_lossy(&self.data[i..]);
            i = i
                .saturating_add(length_size)
                .saturating_add(usize::try_from(length).unwrap_or(usize::MAX));
        }
        starts
    }

    /// Carves the packet starting at `start` into its full byte span and item list.
    fn carve(&self, start: usize) -> Result<(&'a [u8], ItemList<'a>)> {
        let key_length = self.key.len();
        let mut reader = SliceReader::new(&self.data[start + key_length..]);
        let (length, length_size) = read_ber_length(&mut reader)?;
        if length > reader.remaining_len() as u64 {
            return Err(reader.make_error(ErrorDetails::InvalidFrame));
        }
        let mut value_reader = SliceReader::new(reader.read(length as usize)?);
        let items = read_items(&mut value_reader)?;
        let end = start + key_length + length_size + length as usize;
        Ok((&self.data[start..end], items))
    }
}

fn verify_checksum(packet: &[u8], items: &ItemList) -> Result<()> {
    /* Duplicate tags overwrite earlier values, so the last tag-1 item is the one validated */
    let expected = match items.iter().rev().find(|item| item.tag == 1) {
        Some(item) => uas::be_uint(item.value),
        None => return Ok(()),
    };
    let computed = running_checksum(&packet[..packet.len() - 2]);
    if expected == u64::from(computed) {
        Ok(())
    } else {
        Err(Error::new(
            packet.len() - 2,
            ErrorDetails::ChecksumMismatch { expected, computed },
        ))
    }
}

fn decode_packet(number: u32, items: &[RawItem]) -> DecodedPacket {
    let mut packet = DecodedPacket::new(number);
    for item in items {
        let name = match uas::key_name(item.tag) {
            Some(name) => name.to_owned(),
            None => format!("Unknown Key {}", item.tag),
        };
        packet.insert(name, uas::decode_item(item.tag, item.value));
    }
    packet
}
