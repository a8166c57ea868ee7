use zerocopy::{little_endian, AsBytes, FromBytes, FromZeroes};

use crate::constants::{ECDSA_256_WITH_P256_CURVE, ECDSA_384_WITH_P384_CURVE};

use super::QuoteFormat;

/// Header of a version 4 quote, 48 bytes.
///
/// Read with zerocopy, which copies out of the buffer after checking its length,
/// so nothing is reinterpreted in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct QuoteHeaderV4 {
    /// Version of the quote data structure.
    /// [2 bytes]
    pub version: little_endian::U16,

    /// Type of attestation key used by the quoting enclave.
    /// 2 (ECDSA-256-with-P-256 curve)
    /// 3 (ECDSA-384-with-P-384 curve)
    /// [2 bytes]
    pub attestation_key_type: little_endian::U16,

    /// TEE for this Attestation
    /// 0x00000000: SGX
    /// 0x00000081: TDX
    /// [4 bytes]
    pub tee_type: little_endian::U32,

    /// Security Version of the Quoting Enclave
    /// [2 bytes]
    pub qe_svn: little_endian::U16,

    /// Security Version of the PCE - 0 (Only applicable for SGX Quotes)
    /// [2 bytes]
    pub pce_svn: little_endian::U16,

    /// Unique identifier of the QE Vendor.
    /// Value: 939A7233F79C4CA9940A0DB3957F0607 (Intel® SGX QE Vendor)
    /// [16 bytes]
    pub qe_vendor_id: [u8; 16],

    /// Custom user-defined data. For the Intel® SGX and TDX DCAP Quote Generation Libraries,
    /// the first 16 bytes contain a Platform Identifier that is used to link a PCK Certificate to an Enc(PPID).
    /// [20 bytes]
    pub user_data: [u8; 20],
}

/// The 16 byte header some quote producers emit in front of the TD report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct LegacyQuoteHeader {
    /// [2 bytes]
    pub version: little_endian::U16,
    /// [2 bytes]
    pub attestation_key_type: little_endian::U16,
    /// [4 bytes]
    pub reserved_1: little_endian::U32,
    /// [4 bytes]
    pub reserved_2: little_endian::U32,
    /// [2 bytes]
    pub tee_type: little_endian::U16,
    /// [2 bytes]
    pub reserved_3: little_endian::U16,
}

/// Header of a quote, tagged by the layout it was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteHeader {
    V4(QuoteHeaderV4),
    Legacy(LegacyQuoteHeader),
}

impl QuoteHeader {
    pub fn format(&self) -> QuoteFormat {
        match self {
            Self::V4(_) => QuoteFormat::V4,
            Self::Legacy(_) => QuoteFormat::Legacy,
        }
    }

    pub fn version(&self) -> u16 {
        match self {
            Self::V4(header) => header.version.get(),
            Self::Legacy(header) => header.version.get(),
        }
    }

    pub fn attestation_key_type(&self) -> u16 {
        match self {
            Self::V4(header) => header.attestation_key_type.get(),
            Self::Legacy(header) => header.attestation_key_type.get(),
        }
    }

    /// Informational only; observed values differ between platform generations.
    pub fn tee_type(&self) -> u32 {
        match self {
            Self::V4(header) => header.tee_type.get(),
            Self::Legacy(header) => header.tee_type.get() as u32,
        }
    }

    pub fn attestation_key_name(&self) -> Option<&'static str> {
        match self.attestation_key_type() {
            ECDSA_256_WITH_P256_CURVE => Some("ECDSA-256-with-P-256"),
            ECDSA_384_WITH_P384_CURVE => Some("ECDSA-384-with-P-384"),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::V4(header) => header.as_bytes(),
            Self::Legacy(header) => header.as_bytes(),
        }
    }
}
