use std::fmt;

use crate::constants::REPORT_DATA_LEN;
use crate::error::{QuoteError, Result};

/// The 64 byte REPORTDATA payload handed to the TDX module.
///
/// The hardware echoes it back verbatim in the TD report, which is what binds a
/// quote to the request that produced it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReportData([u8; REPORT_DATA_LEN]);

impl ReportData {
    /// Left-justifies `user_data` and zero-pads it to 64 bytes, or falls back
    /// to the filler pattern when no user data is given.
    pub fn new(user_data: Option<&[u8]>) -> Result<Self> {
        match user_data {
            Some(data) => Self::from_user_data(data),
            None => Ok(Self::filler()),
        }
    }

    pub fn from_user_data(data: &[u8]) -> Result<Self> {
        if data.len() > REPORT_DATA_LEN {
            return Err(QuoteError::InvalidInput {
                len: data.len(),
                max: REPORT_DATA_LEN,
            });
        }

        let mut bytes = [0u8; REPORT_DATA_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Ok(ReportData(bytes))
    }

    /// Deterministic payload used when the caller supplies no nonce: byte `i` holds `i`.
    pub fn filler() -> Self {
        let mut bytes = [0u8; REPORT_DATA_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        ReportData(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_DATA_LEN] {
        &self.0
    }
}

impl fmt::Debug for ReportData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReportData({})", hex::encode_upper(self.0))
    }
}

/// Decode-side view of the report_data field of a quote.
///
/// The field is sometimes a human chosen nonce and sometimes opaque binary, so
/// both a text and a hex reading are kept.
#[derive(Clone, PartialEq, Eq)]
pub struct ReportDataView {
    raw: [u8; REPORT_DATA_LEN],
    scanned: usize,
    text: Option<String>,
}

impl ReportDataView {
    /// Scans up to the first zero byte (or all 64 bytes). The field reads as
    /// text when at least one byte was scanned and every scanned byte is
    /// printable ASCII or whitespace.
    pub fn classify(raw: [u8; REPORT_DATA_LEN]) -> Self {
        let scanned = raw.iter().position(|&b| b == 0).unwrap_or(REPORT_DATA_LEN);
        let prefix = &raw[..scanned];

        let text = if !prefix.is_empty() && prefix.iter().copied().all(is_text_byte) {
            Some(prefix.iter().map(|&b| b as char).collect())
        } else {
            None
        };

        ReportDataView { raw, scanned, text }
    }

    pub fn raw(&self) -> &[u8; REPORT_DATA_LEN] {
        &self.raw
    }

    /// Number of bytes before the terminator.
    pub fn scanned_len(&self) -> usize {
        self.scanned
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All 64 bytes as uppercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.raw)
    }

    /// The bytes before the terminator as uppercase hex.
    pub fn scanned_hex(&self) -> String {
        hex::encode_upper(&self.raw[..self.scanned])
    }

    /// The nonce as the caller most likely chose it: the text when the field
    /// is textual, otherwise the hex of the scanned bytes. `None` when the
    /// field starts with a terminator.
    pub fn nonce(&self) -> Option<String> {
        match &self.text {
            Some(text) => Some(text.clone()),
            None if self.scanned > 0 => Some(self.scanned_hex()),
            None => None,
        }
    }
}

impl fmt::Debug for ReportDataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDataView")
            .field("raw", &self.to_hex())
            .field("text", &self.text)
            .finish()
    }
}

// isprint() || isspace() in the C locale
fn is_text_byte(b: u8) -> bool {
    b.is_ascii_graphic() || b.is_ascii_whitespace() || b == 0x0b
}
