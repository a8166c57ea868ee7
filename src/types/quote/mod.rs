mod header;

use std::fmt;

use log::debug;

pub use header::*;

use crate::constants::{
    HEADER_LEN, LEGACY_HEADER_LEN, LEGACY_MRTD_OFFSET, LEGACY_REPORT_DATA_OFFSET,
    LEGACY_RTMR_OFFSETS, QUOTE_V4, TD10_MRTD_OFFSET, TD10_REPORT_DATA_OFFSET, TD10_REPORT_LEN,
    TD10_RTMR_OFFSETS,
};
use crate::error::{QuoteError, Result};
use crate::types::report_data::ReportDataView;
use crate::types::Measurement;
use crate::utils::{self, read_field, write_field};

// high level tdx quote structure
// [48 - header] [584 - td report] [4 - quote signature length] [var - quote signature]
// Only the header and the td report are interpreted here.

/// Which on-wire layout a quote buffer is read with.
///
/// The layout is always declared by the caller. Two producers in the wild put
/// different headers in front of the TD report and nothing in the bytes
/// reliably tells them apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum QuoteFormat {
    /// 48 byte header followed by a TDX 1.0 quote body.
    #[default]
    V4,
    /// 16 byte header followed by the TD report.
    Legacy,
}

impl QuoteFormat {
    pub fn header_len(&self) -> usize {
        match self {
            Self::V4 => HEADER_LEN,
            Self::Legacy => LEGACY_HEADER_LEN,
        }
    }

    pub fn td_report_len(&self) -> usize {
        TD10_REPORT_LEN
    }

    /// Shortest buffer `decode` accepts.
    pub fn min_quote_len(&self) -> usize {
        self.header_len() + self.td_report_len()
    }

    /// Offsets below are relative to the start of the TD report region.
    pub fn mrtd_offset(&self) -> usize {
        match self {
            Self::V4 => TD10_MRTD_OFFSET,
            Self::Legacy => LEGACY_MRTD_OFFSET,
        }
    }

    pub fn rtmr_offsets(&self) -> [usize; 4] {
        match self {
            Self::V4 => TD10_RTMR_OFFSETS,
            Self::Legacy => LEGACY_RTMR_OFFSETS,
        }
    }

    pub fn report_data_offset(&self) -> usize {
        match self {
            Self::V4 => TD10_REPORT_DATA_OFFSET,
            Self::Legacy => LEGACY_REPORT_DATA_OFFSET,
        }
    }

    fn read_header(&self, bytes: &[u8]) -> Result<QuoteHeader> {
        let mut cursor = bytes;
        let header = match self {
            Self::V4 => utils::read_from_bytes::<QuoteHeaderV4>(&mut cursor).map(QuoteHeader::V4),
            Self::Legacy => {
                utils::read_from_bytes::<LegacyQuoteHeader>(&mut cursor).map(QuoteHeader::Legacy)
            }
        };

        header.ok_or(QuoteError::OffsetOutOfBounds {
            field: "header",
            offset: 0,
            len: self.header_len(),
            buffer_len: bytes.len(),
        })
    }
}

impl fmt::Display for QuoteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => f.write_str("v4"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// The fields of a TDX quote a policy engine cares about.
///
/// Built once per `decode` call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuote {
    pub header: QuoteHeader,

    /// (SHA384) Measurement of the initial contents of the TD.
    pub mrtd: Measurement,

    /// RTMR0..RTMR3, runtime measurement registers extended during boot.
    pub rtmrs: [Measurement; 4],

    /// The 64 bytes of REPORTDATA supplied when the report was generated.
    pub report_data: ReportDataView,
}

impl ParsedQuote {
    /// Validates the structure of `bytes` and extracts the measurement registers
    /// and report data using the offsets of `format`.
    pub fn decode(bytes: &[u8], format: QuoteFormat) -> Result<Self> {
        let min = format.min_quote_len();
        if bytes.len() < min {
            return Err(QuoteError::TooShort {
                len: bytes.len(),
                min,
            });
        }

        let header = format.read_header(bytes)?;
        debug!(
            "quote header: version={}, att_key_type={}, tee_type={:#x}",
            header.version(),
            header.attestation_key_type(),
            header.tee_type()
        );

        if header.version() != QUOTE_V4 {
            return Err(QuoteError::UnsupportedVersion {
                version: header.version(),
                tee_type: header.tee_type(),
            });
        }

        // The length check above already covers every field, but the reads stay
        // bounds checked in case the offsets and the header length disagree.
        let td_report = &bytes[format.header_len()..];

        let mrtd = Measurement(read_field(td_report, format.mrtd_offset(), "mrtd")?);

        let [rtmr0, rtmr1, rtmr2, rtmr3] = format.rtmr_offsets();
        let rtmrs = [
            Measurement(read_field(td_report, rtmr0, "rtmr0")?),
            Measurement(read_field(td_report, rtmr1, "rtmr1")?),
            Measurement(read_field(td_report, rtmr2, "rtmr2")?),
            Measurement(read_field(td_report, rtmr3, "rtmr3")?),
        ];

        let report_data = read_field(td_report, format.report_data_offset(), "report_data")?;

        Ok(ParsedQuote {
            header,
            mrtd,
            rtmrs,
            report_data: ReportDataView::classify(report_data),
        })
    }

    pub fn format(&self) -> QuoteFormat {
        self.header.format()
    }

    pub fn rtmr(&self, index: usize) -> Option<&Measurement> {
        self.rtmrs.get(index)
    }

    /// Writes the header and the extracted fields back into a zeroed
    /// header + TD report region at the same fixed offsets.
    ///
    /// Only the header and the MRTD, RTMR and report_data ranges are
    /// reproduced. Every other TD report byte (TEE_TCB_SVN, MRSEAM, TD
    /// attributes and so on) is zero in the output, and anything after the TD
    /// report is dropped.
    pub fn encode(&self) -> Vec<u8> {
        let format = self.format();
        let mut raw_bytes = vec![0u8; format.min_quote_len()];

        write_field(&mut raw_bytes, 0, self.header.as_bytes());

        let td_report = &mut raw_bytes[format.header_len()..];
        write_field(td_report, format.mrtd_offset(), self.mrtd.as_bytes());
        for (offset, rtmr) in format.rtmr_offsets().into_iter().zip(&self.rtmrs) {
            write_field(td_report, offset, rtmr.as_bytes());
        }
        write_field(td_report, format.report_data_offset(), self.report_data.raw());

        raw_bytes
    }
}

/// Decodes a quote buffer using the declared layout.
pub fn decode_quote(bytes: &[u8], format: QuoteFormat) -> Result<ParsedQuote> {
    ParsedQuote::decode(bytes, format)
}
