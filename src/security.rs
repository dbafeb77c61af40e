//! Security Metadata Local Set (MISB ST 0102) decoding.
//!
//! Within an ST 0601 container the set is introduced by tag 48 and shares the outer BER/KLV
//! framing. The decoded record is an ordered list of values, one per item.

use super::local_set::{decode_local_set, decode_text_stripped, LocalSetDecode};
use super::uas::be_uint;
use super::MisbValue;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Decodes the value of an ST 0601 tag-48 item as a Security Local Set.
///
/// # Example
///
/// ```
/// use klv_io::{security, MisbValue};
///
/// let decoded = security::decode(&[0x01, 0x01, 0x02, 0x03, 0x02, 0x55, 0x53]);
/// assert_eq!(
///     decoded,
///     MisbValue::Set(vec![
///         MisbValue::Label("RESTRICTED"),
///         MisbValue::Text("US".to_owned()),
///     ])
/// );
/// ```
pub fn decode(value: &[u8]) -> MisbValue {
    decode_local_set(value, SecurityDecoder.into())
}

#[derive(Default)]
pub(crate) struct SecurityDecoder;

impl LocalSetDecode for SecurityDecoder {
    fn decode_item(&self, tag: u8, value: &[u8]) -> MisbValue {
        match tag {
            1 => decode_classification(value),
            2 => decode_country_coding_method(value),
            3..=11 | 13 | 14 | 23 | 24 => decode_text_stripped(value),
            12 => decode_object_country_coding_method(value),
            22 => MisbValue::Unsigned(be_uint(value)),
            _ => MisbValue::Text(format!("Unknown Key {}", tag)),
        }
    }
}

/// Security classification levels carried by tag 1.
#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
pub(crate) enum Classification {
    Unclassified = 1,
    Restricted = 2,
    Confidential = 3,
    Secret = 4,
    TopSecret = 5,
}

impl Classification {
    fn label(self) -> &'static str {
        match self {
            Classification::Unclassified => "UNCLASSIFIED",
            Classification::Restricted => "RESTRICTED",
            Classification::Confidential => "CONFIDENTIAL",
            Classification::Secret => "SECRET",
            Classification::TopSecret => "TOP SECRET",
        }
    }
}

fn decode_classification(value: &[u8]) -> MisbValue {
    match value.first() {
        Some(&byte) => MisbValue::Label(
            Classification::from_u8(byte)
                .map(Classification::label)
                .unwrap_or("UNKNOWN"),
        ),
        None => MisbValue::Bytes(Vec::new()),
    }
}

/// Country coding method for the classifying country and releasing instructions (tag 2).
#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
pub(crate) enum CountryCodingMethod {
    Iso3166TwoLetter = 1,
    Iso3166ThreeLetter = 2,
    Fips104TwoLetter = 3,
    Fips104FourLetter = 4,
    Iso3166Numeric = 5,
    Stanag1059TwoLetter = 6,
    Stanag1059ThreeLetter = 7,
    Fips104Mixed = 10,
    Iso3166Mixed = 11,
    Stanag1059Mixed = 12,
    GencTwoLetter = 13,
    GencThreeLetter = 14,
    GencNumeric = 15,
    GencMixed = 16,
}

impl CountryCodingMethod {
    fn label(self) -> &'static str {
        match self {
            CountryCodingMethod::Iso3166TwoLetter => "ISO-3166 Two Letter",
            CountryCodingMethod::Iso3166ThreeLetter => "ISO-3166 Three Letter",
            CountryCodingMethod::Fips104TwoLetter => "FIPS 10-4 Two Letter",
            CountryCodingMethod::Fips104FourLetter => "FIPS 10-4 Four Letter",
            CountryCodingMethod::Iso3166Numeric => "ISO-3166 Numeric",
            CountryCodingMethod::Stanag1059TwoLetter => "1059 Two Letter",
            CountryCodingMethod::Stanag1059ThreeLetter => "1059 Three Letter",
            CountryCodingMethod::Fips104Mixed => "FIPS 10-4 Mixed",
            CountryCodingMethod::Iso3166Mixed => "ISO-3166 Mixed",
            CountryCodingMethod::Stanag1059Mixed => "STANAG 1059 Mixed",
            CountryCodingMethod::GencTwoLetter => "GENC Two Letter",
            CountryCodingMethod::GencThreeLetter => "GENC Three Letter",
            CountryCodingMethod::GencNumeric => "GENC Numeric",
            CountryCodingMethod::GencMixed => "GENC Mixed",
        }
    }
}

fn decode_country_coding_method(value: &[u8]) -> MisbValue {
    match value.first() {
        Some(&byte) => MisbValue::Label(
            CountryCodingMethod::from_u8(byte)
                .map(CountryCodingMethod::label)
                .unwrap_or("UNKNOWN"),
        ),
        None => MisbValue::Bytes(Vec::new()),
    }
}

/// Country coding method for object country codes (tag 12). The numeric ids differ from the
/// tag-2 table.
#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
pub(crate) enum ObjectCountryCodingMethod {
    Iso3166TwoLetter = 1,
    Iso3166ThreeLetter = 2,
    Iso3166Numeric = 3,
    Fips104TwoLetter = 4,
    Fips104FourLetter = 5,
    Stanag1059TwoLetter = 6,
    Stanag1059ThreeLetter = 7,
    GencTwoLetter = 13,
    GencThreeLetter = 14,
    GencNumeric = 15,
    GencAdminSub = 16,
}

impl ObjectCountryCodingMethod {
    fn label(self) -> &'static str {
        match self {
            ObjectCountryCodingMethod::Iso3166TwoLetter => "ISO-3166 Two Letter",
            ObjectCountryCodingMethod::Iso3166ThreeLetter => "ISO-3166 Three Letter",
            ObjectCountryCodingMethod::Iso3166Numeric => "ISO-3166 Numeric",
            ObjectCountryCodingMethod::Fips104TwoLetter => "FIPS 10-4 Two Letter",
            ObjectCountryCodingMethod::Fips104FourLetter => "FIPS 10-4 Four Letter",
            ObjectCountryCodingMethod::Stanag1059TwoLetter => "1059 Two Letter",
            ObjectCountryCodingMethod::Stanag1059ThreeLetter => "1059 Three Letter",
            ObjectCountryCodingMethod::GencTwoLetter => "GENC Two Letter",
            ObjectCountryCodingMethod::GencThreeLetter => "GENC Three Letter",
            ObjectCountryCodingMethod::GencNumeric => "GENC Numeric",
            ObjectCountryCodingMethod::GencAdminSub => "GENC AdminSub",
        }
    }
}

fn decode_object_country_coding_method(value: &[u8]) -> MisbValue {
    match value.first() {
        Some(&byte) => MisbValue::Label(
            ObjectCountryCodingMethod::from_u8(byte)
                .map(ObjectCountryCodingMethod::label)
                .unwrap_or("UNKNOWN"),
        ),
        None => MisbValue::Bytes(Vec::new()),
    }
}
