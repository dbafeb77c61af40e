//! Library for extracting and decoding MISB ST 0601 KLV metadata from MPEG transport streams.
//!
//! # Usage
//! Simply add this crate as a dependency in your `Cargo.toml`.
//!
//! ```toml
//! [dependencies]
//! klv-io = "~0.1.0"
//! ```
//!
//! Decoding is a three-stage pipeline. [`TsDemuxer`] filters the transport stream down to the
//! elementary stream carrying KLV payloads, [`KlvParser`] frames Universal-Label-keyed packets
//! inside that stream and validates the ST 0601 running checksum, and the per-standard decoders
//! ([`uas`], [`security`], [`vmti`]) convert each tagged item to a typed [`MisbValue`].

#![allow(unused)]
#![allow(non_local_definitions)]
#![deny(missing_docs, unsafe_code, warnings)]

use log::warn;
use modular_bitfield_msb::prelude::*;
use std::io::{self, ErrorKind, Read};
use std::result;

mod slice_reader;
pub use slice_reader::SliceReader;

mod ber;
pub use ber::{encode_ber_length, read_ber_length};

mod value;
pub use value::{DecodedPacket, DecodedStream, FlagList, HexBytes, MisbValue};

mod framer;
pub use framer::{running_checksum, KlvParser};

mod local_set;

pub mod security;
pub mod uas;
pub mod vmti;

/// Errors that may be encountered while framing KLV packets.
///
/// Framing errors never escape [`KlvParser::decode`]; the offending packet is dropped and
/// scanning continues at the next Universal Label occurrence.
#[derive(Debug)]
pub enum ErrorDetails {
    /// Encountered when a [`SliceReader`] reads out of bounds.
    /// The [`usize`] parameter is the length of the offending read.
    PacketOverrun(usize),
    /// A BER length or item value overran its enclosing packet.
    InvalidFrame,
    /// Tag 1 was present and its value disagreed with the computed running sum.
    ChecksumMismatch {
        /// Checksum carried by the tag-1 item, read as a big-endian integer.
        expected: u64,
        /// 16-bit running sum computed over the packet.
        computed: u16,
    },
}

/// Error type encapsulating all possible framing errors.
#[derive(Debug)]
pub struct Error {
    /// Byte index within the packet that the error was encountered.
    pub location: usize,
    /// Information about the error.
    pub details: ErrorDetails,
}

impl Error {
    pub(crate) fn new(location: usize, details: ErrorDetails) -> Self {
        Self { location, details }
    }
}

/// [`std::result::Result`] alias that uses [`Error`].
pub type Result<T> = result::Result<T, Error>;

/// Fixed size of an MPEG-TS packet in bytes.
pub const TS_PACKET_SIZE: usize = 188;

/// Default PID of the elementary stream carrying UAS Datalink KLV payloads.
pub const DEFAULT_KLV_PID: u16 = 0x101;

/// The 16-byte UAS Local Data Set Universal Label that keys every top-level ST 0601 packet.
pub const UAS_LDS_KEY: [u8; 16] = [
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x0B, 0x01, 0x01, 0x0E, 0x01, 0x03, 0x01, 0x01, 0x00, 0x00,
    0x00,
];

/// TSC information used in a packet's payload.
#[repr(u8)]
#[derive(Debug, BitfieldSpecifier)]
#[bits = 2]
pub enum TransportScramblingControl {
    /// Not scrambled.
    NotScrambled,
    /// Do not use.
    Reserved,
    /// Scrambled with even key.
    ScrambledEvenKey,
    /// Scrambled with odd key.
    ScrambledOddKey,
}

/// Link-layer header found at the start of every 188-byte MPEG-TS packet.
#[bitfield]
#[derive(Debug)]
pub struct PacketHeader {
    pub sync_byte: B8,
    pub tei: bool,
    pub pusi: bool,
    pub priority: bool,
    pub pid: B13,
    pub tsc: TransportScramblingControl,
    pub has_adaptation_field: bool,
    pub has_payload: bool,
    pub continuity_counter: B4,
}

/// Demultiplexer that reconstructs the metadata elementary stream from an MPEG transport stream.
///
/// Concatenates the payload bytes of every packet on the configured PID, stripping adaptation
/// fields. PES header removal is left to downstream framing, which tolerates interstitial noise
/// because it searches for the Universal Label.
///
/// # Example
///
/// ```no_run
/// use klv_io::{KlvParser, TsDemuxer, UAS_LDS_KEY};
/// use std::fs::File;
///
/// let file = File::open("mission.ts").expect("Unable to open!");
/// let stream = TsDemuxer::default()
///     .extract(file)
///     .expect("IO Error!");
/// let result = KlvParser::new(&stream, &UAS_LDS_KEY).decode();
/// for packet in &result.packets {
///     println!("{:?}", packet);
/// }
/// ```
#[derive(Debug, Copy, Clone)]
pub struct TsDemuxer {
    pid: u16,
}

impl Default for TsDemuxer {
    fn default() -> Self {
        Self {
            pid: DEFAULT_KLV_PID,
        }
    }
}

impl TsDemuxer {
    /// Creates a demuxer targeting `pid` instead of [`DEFAULT_KLV_PID`].
    pub fn new(pid: u16) -> Self {
        Self { pid }
    }

    /// Reads 188-byte packets from `source` until it is exhausted and returns the concatenated
    /// payload of every packet on the target PID.
    ///
    /// A short read terminates extraction cleanly; packets without the 0x47 sync byte are
    /// skipped. The reader is owned for the duration of the call and released on all exit paths.
    pub fn extract<R: Read>(&self, mut source: R) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut packet = [0_u8; TS_PACKET_SIZE];
        while read_full(&mut source, &mut packet)? == TS_PACKET_SIZE {
            let header = PacketHeader::from_bytes([packet[0], packet[1], packet[2], packet[3]]);
            if header.sync_byte() != 0x47 {
                warn!("Discarding TS packet without sync byte");
                continue;
            }
            if header.pid() != self.pid {
                continue;
            }
            /* adaptation_field_control of 2 or 3 places an adaptation field before the payload */
            let payload_start = if header.has_adaptation_field() {
                5 + packet[4] as usize
            } else {
                4
            };
            if payload_start >= TS_PACKET_SIZE {
                /* Adaptation field fills the packet; no payload remains */
                continue;
            }
            out.extend_from_slice(&packet[payload_start..]);
        }
        Ok(out)
    }
}

fn read_full<R: Read>(source: &mut R, mut buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while !buf.is_empty() {
        match source.read(buf) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                let tmp = buf;
                buf = &mut tmp[n..];
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
