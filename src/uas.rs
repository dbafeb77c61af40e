//! UAS Datalink Local Set (MISB ST 0601) tag decoding.
//!
//! Each short-form tag maps to a deterministic decoder; dispatch is a static match so a missing
//! tag is a compile-visible hole rather than a silent table gap. All multibyte integers are
//! big-endian and signed values use two's complement.

use super::{security, vmti, FlagList, HexBytes, MisbValue};
use modular_bitfield_msb::prelude::*;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Reads a big-endian unsigned integer of any width up to 8 bytes. Wider values keep the low
/// 64 bits.
pub(crate) fn be_uint(value: &[u8]) -> u64 {
    value
        .iter()
        .fold(0_u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

/// Reads a big-endian two's-complement integer of any width up to 8 bytes.
pub(crate) fn be_int(value: &[u8]) -> i64 {
    let mut acc = match value.first() {
        Some(&first) if first & 0x80 != 0 => -1_i64,
        Some(_) => 0,
        None => return 0,
    };
    for &byte in value {
        acc = (acc << 8) | i64::from(byte);
    }
    acc
}

fn uint_to_float(value: &[u8], domain: (f64, f64), range: (f64, f64)) -> f64 {
    (be_uint(value) as f64 - domain.0) * (range.1 - range.0) / (domain.1 - domain.0)
}

fn int_to_float(value: &[u8], domain: (f64, f64), range: (f64, f64)) -> f64 {
    (be_int(value) as f64 - domain.0) * (range.1 - range.0) / (domain.1 - domain.0)
}

/* Latitude-like tags read the raw value as unsigned */
fn decode_latitude(value: &[u8]) -> f64 {
    (be_uint(value) as f64 / 2_147_483_648.0) * 90.0
}

fn decode_longitude(value: &[u8]) -> f64 {
    (360.0 / 4_294_967_294.0) * be_int(value) as f64
}

fn decode_altitude(value: &[u8]) -> f64 {
    (19900.0 / 65535.0) * be_uint(value) as f64 - 900.0
}

/* The most negative two's-complement value marks "error/unknown" for angular fields */
fn signed_scaled_or_nan(value: &[u8], sentinel: i64, divisor: f64, scale: f64) -> f64 {
    let raw = be_int(value);
    if raw == sentinel {
        f64::NAN
    } else {
        (raw as f64 / divisor) * scale
    }
}

fn decode_utf8(value: &[u8]) -> MisbValue {
    match std::str::from_utf8(value) {
        Ok(text) => MisbValue::Text(text.to_owned()),
        Err(_) => MisbValue::Bytes(value.to_vec()),
    }
}

fn hex_value(prefix: Option<&'static str>, value: &[u8]) -> MisbValue {
    MisbValue::Hex(HexBytes {
        prefix,
        bytes: value.to_vec(),
    })
}

/// Generic flag data carried by tag 47, most significant bit first.
#[bitfield]
#[derive(Debug)]
pub(crate) struct GenericFlagData {
    pub laser_range: bool,
    pub auto_track: bool,
    pub ir_polarity_black: bool,
    pub icing_detected: bool,
    pub slant_range_measured: bool,
    pub image_invalid: bool,
    #[skip]
    reserved: B2,
}

fn decode_generic_flags(value: &[u8]) -> MisbValue {
    if value.len() != 1 {
        return MisbValue::Bytes(value.to_vec());
    }
    let flags = GenericFlagData::from_bytes([value[0]]);
    let mut list = FlagList::new();
    list.push(("Laser Range", flags.laser_range()));
    list.push(("Auto-Track", flags.auto_track()));
    list.push(("IR Polarity (1=black, 0=white)", flags.ir_polarity_black()));
    list.push(("Icing Detected", flags.icing_detected()));
    list.push(("Slant Range Measured", flags.slant_range_measured()));
    list.push(("Image Invalid", flags.image_invalid()));
    MisbValue::Flags(list)
}

/// Sensor field of view designations carried by tag 63.
#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
pub(crate) enum FieldOfViewName {
    Ultranarrow = 0,
    Narrow = 1,
    Medium = 2,
    Wide = 3,
    Ultrawide = 4,
    NarrowMedium = 5,
    TwoTimesUltranarrow = 6,
    FourTimesUltranarrow = 7,
    ContinuousZoom = 8,
}

impl FieldOfViewName {
    fn label(self) -> &'static str {
        match self {
            FieldOfViewName::Ultranarrow => "Ultranarrow",
            FieldOfViewName::Narrow => "Narrow",
            FieldOfViewName::Medium => "Medium",
            FieldOfViewName::Wide => "Wide",
            FieldOfViewName::Ultrawide => "Ultrawide",
            FieldOfViewName::NarrowMedium => "Narrow Medium",
            FieldOfViewName::TwoTimesUltranarrow => "2x Ultranarrow",
            FieldOfViewName::FourTimesUltranarrow => "4x Ultranarrow",
            FieldOfViewName::ContinuousZoom => "Continuous Zoom",
        }
    }
}

fn decode_fov_name(value: &[u8]) -> MisbValue {
    match value.first() {
        Some(&byte) => MisbValue::Label(
            FieldOfViewName::from_u8(byte)
                .map(FieldOfViewName::label)
                .unwrap_or("Unknown"),
        ),
        None => MisbValue::Bytes(Vec::new()),
    }
}

/// Platform operational mode carried by tag 77.
#[derive(Debug, Copy, Clone, PartialEq, FromPrimitive)]
pub(crate) enum OperationalMode {
    Other = 0,
    Operational = 1,
    Training = 2,
    Exercise = 3,
    Maintenance = 4,
    Test = 5,
}

impl OperationalMode {
    fn label(self) -> &'static str {
        match self {
            OperationalMode::Other => "Other",
            OperationalMode::Operational => "Operational",
            OperationalMode::Training => "Training",
            OperationalMode::Exercise => "Exercise",
            OperationalMode::Maintenance => "Maintenance",
            OperationalMode::Test => "Test",
        }
    }
}

fn decode_operational_mode(value: &[u8]) -> MisbValue {
    match value.first() {
        Some(&byte) => MisbValue::Label(
            OperationalMode::from_u8(byte)
                .map(OperationalMode::label)
                .unwrap_or("Unknown"),
        ),
        None => MisbValue::Bytes(Vec::new()),
    }
}

/// Descriptive name of a top-level ST 0601 tag, if known.
///
/// Tags absent from this table (including tag 96) surface as `"Unknown Key <t>"`.
pub fn key_name(tag: u8) -> Option<&'static str> {
    Some(match tag {
        1 => "Checksum",
        2 => "Precision Time Stamp",
        3 => "Mission ID",
        4 => "Platform Tail Number",
        5 => "Platform Heading Angle",
        6 => "Platform Pitch Angle",
        7 => "Platform Roll Angle",
        8 => "Platform True Airspeed",
        9 => "Platform Indicated Airspeed",
        10 => "Platform Designation",
        11 => "Image Source Sensor",
        12 => "Image Coordinate System",
        13 => "Sensor Latitude",
        14 => "Sensor Longitude",
        15 => "Sensor True Altitude",
        16 => "Sensor Horizontal Field of View",
        17 => "Sensor Vertical Field of View",
        18 => "Sensor Relative Azimuth Angle",
        19 => "Sensor Relative Elevation Angle",
        20 => "Sensor Relative Roll Angle",
        21 => "Slant Range",
        22 => "Target Width",
        23 => "Frame Center Latitude",
        24 => "Frame Center Longitude",
        25 => "Frame Center Elevation",
        26 => "Offset Corner Latitude Point 1",
        27 => "Offset Corner Longitude Point 1",
        28 => "Offset Corner Latitude Point 2",
        29 => "Offset Corner Longitude Point 2",
        30 => "Offset Corner Latitude Point 3",
        31 => "Offset Corner Longitude Point 3",
        32 => "Offset Corner Latitude Point 4",
        33 => "Offset Corner Longitude Point 4",
        34 => "Icing Detected",
        35 => "Wind Direction",
        36 => "Wind Speed",
        37 => "Static Pressure",
        38 => "Density Altitude",
        39 => "Outside Air Temperature",
        40 => "Target Location Latitude",
        41 => "Target Location Longitude",
        42 => "Target Location Elevation",
        43 => "Target Track Gate Width",
        44 => "Target Track Gate Height",
        45 => "Target Error Estimate CE90",
        46 => "Target Error Estimate LE90",
        47 => "Generic Flag Data",
        48 => "Security Local Set",
        49 => "Differential Pressure",
        50 => "Platform Angle of Attack",
        51 => "Platform Vertical Speed",
        52 => "Platform Sideslip Angle",
        53 => "Airfield Barometric Pressure",
        54 => "Airfield Elevation",
        55 => "Relative Humidity",
        56 => "Platform Ground Speed",
        57 => "Ground Range",
        58 => "Platform Fuel Remaining",
        59 => "Platform Call Sign",
        60 => "Weapon Load",
        61 => "Weapon Fired",
        62 => "Laser PRF Code",
        63 => "Sensor Field of View Name",
        64 => "Platform Magnetic Heading",
        65 => "UAS Datalink LS Version Number",
        66 => "Deprecated",
        67 => "Alternate Platform Latitude",
        68 => "Alternate Platform Longitude",
        69 => "Alternate Platform Altitude",
        70 => "Alternate Platform Name",
        71 => "Alternate Platform Heading",
        72 => "Event Start Time UTC",
        73 => "RVT Local Set Conversion",
        74 => "VMTI Local Set",
        75 => "Sensor Ellipsoid Height",
        76 => "Alternate Platform Ellipsoid Height",
        77 => "Operational Mode",
        78 => "Frame Center Height Above Ellipsoid",
        79 => "Sensor North Velocity",
        80 => "Sensor East Velocity",
        81 => "Image Horizon Pixel Pack",
        82 => "Offset Corner Latitude Point 1 (Full)",
        83 => "Offset Corner Longitude Point 1 (Full)",
        84 => "Offset Corner Latitude Point 2 (Full)",
        85 => "Offset Corner Longitude Point 2 (Full)",
        86 => "Offset Corner Latitude Point 3 (Full)",
        87 => "Offset Corner Longitude Point 3 (Full)",
        88 => "Offset Corner Latitude Point 4 (Full)",
        89 => "Offset Corner Longitude Point 4 (Full)",
        90 => "Platform Pitch Angle (Full)",
        91 => "Platform Roll Angle (Full)",
        92 => "Platform Angle of Attack (Full)",
        93 => "Platform Sideslip Angle (Full)",
        94 => "MIIS Core Identifier",
        95 => "SAR Motion Imagery Metadata",
        97 => "Reserved",
        98 => "Reserved",
        99 => "Reserved",
        100 => "Reserved",
        101 => "Reserved",
        102 => "Reserved",
        103 => "Density Altitude Extended",
        104 => "Sensor Ellipsoid Height Extended",
        105 => "Alternate Platform Ellipsoid Height Extended",
        _ => return None,
    })
}

/// Decodes the value of one top-level ST 0601 item into a typed [`MisbValue`].
///
/// Unknown tags and per-field conversion failures pass the raw bytes through unmodified.
///
/// # Example
///
/// ```
/// use klv_io::{uas, MisbValue};
///
/// assert_eq!(
///     uas::decode_item(13, &[0x40, 0x00, 0x00, 0x00]),
///     MisbValue::Float(45.0)
/// );
/// assert_eq!(uas::decode_item(66, &[]), MisbValue::Label("DEPRECATED"));
/// ```
pub fn decode_item(tag: u8, value: &[u8]) -> MisbValue {
    match tag {
        1 => MisbValue::Unsigned(be_uint(value)),
        2 | 72 => MisbValue::Float(be_uint(value) as f64 / 1000.0),
        3 | 4 | 10 | 11 | 12 | 59 | 70 => decode_utf8(value),
        5 | 35 | 64 | 71 => MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (0.0, 360.0))),
        6 => MisbValue::Float(signed_scaled_or_nan(value, -(1_i64 << 15), 32768.0, 20.0)),
        7 => MisbValue::Float(signed_scaled_or_nan(value, -(1_i64 << 15), 32768.0, 50.0)),
        8 | 9 | 56 => MisbValue::Float(uint_to_float(value, (0.0, 255.0), (0.0, 255.0))),
        13 | 23 | 40 => MisbValue::Float(decode_latitude(value)),
        14 | 24 | 41 => MisbValue::Float(decode_longitude(value)),
        15 | 25 | 42 | 75 => MisbValue::Float(decode_altitude(value)),
        16 | 17 => MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (0.0, 180.0))),
        18 => MisbValue::Float((360.0 / 4_294_967_295.0) * be_uint(value) as f64),
        19 => MisbValue::Float(signed_scaled_or_nan(
            value,
            -(1_i64 << 31),
            2_147_483_648.0,
            180.0,
        )),
        20 => MisbValue::Float(signed_scaled_or_nan(
            value,
            -(1_i64 << 31),
            2_147_483_648.0,
            360.0,
        )),
        21 | 57 => MisbValue::Float(uint_to_float(
            value,
            (0.0, 4_294_967_295.0),
            (0.0, 5_000_000.0),
        )),
        22 | 58 => MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (0.0, 10000.0))),
        26..=33 => MisbValue::Float((be_int(value) as f64 / 32768.0) * 0.075),
        34 => MisbValue::Float(uint_to_float(value, (0.0, 2.0), (0.0, 2.0))),
        36 | 55 => MisbValue::Float(uint_to_float(value, (0.0, 255.0), (0.0, 100.0))),
        37 | 49 | 53 => MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (0.0, 5000.0))),
        38 | 54 | 69 | 76 => {
            MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (-900.0, 19000.0)))
        }
        39 => MisbValue::Float(int_to_float(value, (-128.0, 127.0), (-128.0, 127.0))),
        43 | 44 => MisbValue::Float(uint_to_float(value, (0.0, 255.0), (0.0, 510.0))),
        45 => MisbValue::Float(uint_to_float(value, (0.0, 65535.0), (0.0, 4095.0))),
        46 => MisbValue::Float((4095.0 / 65535.0) * be_uint(value) as f64),
        47 => decode_generic_flags(value),
        48 => security::decode(value),
        50 | 52 => MisbValue::Float(int_to_float(value, (-32767.0, 32767.0), (-20.0, 20.0))),
        51 => MisbValue::Float(signed_scaled_or_nan(value, -(1_i64 << 15), 32768.0, 180.0)),
        60 | 61 => MisbValue::Bytes(value.to_vec()),
        62 => MisbValue::Float(uint_to_float(value, (0.0, 65536.0), (0.0, 65536.0))),
        63 => decode_fov_name(value),
        65 => MisbValue::Float(uint_to_float(value, (0.0, 256.0), (0.0, 256.0))),
        66 => MisbValue::Label("DEPRECATED"),
        67 => MisbValue::Float(int_to_float(
            value,
            (-2_147_483_647.0, 2_147_483_647.0),
            (-90.0, 90.0),
        )),
        68 => MisbValue::Float(int_to_float(
            value,
            (-2_147_483_647.0, 2_147_483_647.0),
            (-180.0, 180.0),
        )),
        73 => hex_value(Some("RVT Local Set"), value),
        74 => vmti::decode(value),
        77 => decode_operational_mode(value),
        78 => MisbValue::Float((be_uint(value) as f64 / 65535.0) * 19900.0 - 900.0),
        79 | 80 => MisbValue::Float(signed_scaled_or_nan(value, -(1_i64 << 15), 32768.0, 327.0)),
        81 => hex_value(Some("Image Horizon Pixel Pack"), value),
        82 | 84 | 86 | 88 | 92 | 93 => MisbValue::Float(int_to_float(
            value,
            (-2_147_483_647.0, 2_147_483_647.0),
            (-90.0, 90.0),
        )),
        83 | 85 | 87 | 89 => MisbValue::Float(int_to_float(
            value,
            (-2_147_483_647.0, 2_147_483_647.0),
            (-180.0, 180.0),
        )),
        90 | 91 => MisbValue::Float((180.0 / 4_294_967_294.0) * be_int(value) as f64),
        94 => hex_value(None, value),
        95 => hex_value(Some("SAR Motion Imagery Metadata"), value),
        96 | 103 | 104 | 105 => MisbValue::Label("IMAPB"),
        97..=102 => hex_value(Some("Reserved (raw)"), value),
        _ => MisbValue::Bytes(value.to_vec()),
    }
}
