//! BER length fields as used by MISB Local Sets.
//!
//! Short form (high bit clear) carries the length in one byte. Long form (high bit set) gives
//! the count of following big-endian length bytes in the low 7 bits; a count of zero is the
//! indefinite form, which this crate treats as length 0.

use super::{ErrorDetails, Result, SliceReader};
use smallvec::SmallVec;

/// Decodes a BER length field from `reader`.
///
/// Returns the length and the total number of bytes the field occupied. Long forms wider than
/// 8 bytes or truncated before `reader`'s end fail with [`ErrorDetails::InvalidFrame`] and
/// [`ErrorDetails::PacketOverrun`] respectively.
///
/// # Example
///
/// ```
/// use klv_io::{read_ber_length, SliceReader};
/// let mut reader = SliceReader::new(&[0x81, 0x80]);
/// assert_eq!(read_ber_length(&mut reader)?, (128, 2));
/// # Ok::<(), klv_io::Error>(())
/// ```
pub fn read_ber_length(reader: &mut SliceReader) -> Result<(u64, usize)> {
    let first = reader.read_u8()?;
    if first & 0x80 == 0 {
        return Ok((u64::from(first), 1));
    }
    let count = (first & 0x7F) as usize;
    if count > 8 {
        return Err(reader.make_error(ErrorDetails::InvalidFrame));
    }
    let mut length = 0_u64;
    for &byte in reader.read(count)? {
        length = (length << 8) | u64::from(byte);
    }
    Ok((length, 1 + count))
}

/// Length decode used by the Universal Label scan and the nested Local Set walks.
///
/// Truncated fields clamp to the available bytes instead of failing, and empty input decodes as
/// `(0, 0)`. Lengths beyond [`u64::MAX`] saturate, which still advances the scan past the end of
/// the buffer.
pub(crate) fn ber_length_lossy(data: &[u8]) -> (u64, usize) {
    let first = match data.first() {
        Some(&byte) => byte,
        None => return (0, 0),
    };
    if first & 0x80 == 0 {
        return (u64::from(first), 1);
    }
    let count = (first & 0x7F) as usize;
    let avail = count.min(data.len() - 1);
    let mut length = 0_u64;
    for &byte in &data[1..1 + avail] {
        length = length.saturating_mul(256) | u64::from(byte);
    }
    (length, 1 + avail)
}

/// Encodes `length` as a BER length field. Lengths below 128 use the short form.
pub fn encode_ber_length(length: u64) -> SmallVec<[u8; 9]> {
    let mut out = SmallVec::new();
    if length < 0x80 {
        out.push(length as u8);
    } else {
        let be = length.to_be_bytes();
        let skip = be.iter().take_while(|&&byte| byte == 0).count();
        out.push(0x80 | (8 - skip) as u8);
        out.extend_from_slice(&be[skip..]);
    }
    out
}
