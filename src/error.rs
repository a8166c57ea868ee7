use std::io;

use thiserror::Error;

/// Every way generating or decoding a quote can fail.
///
/// All variants are terminal for the call that produced them.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Wrong execution context or missing privilege.
    #[error("{reason}: {source}")]
    Environment {
        reason: String,
        #[source]
        source: io::Error,
    },

    #[error("user data too long ({len} bytes, max {max})")]
    InvalidInput { len: usize, max: usize },

    #[error("failed to generate TDREPORT: {0}")]
    ReportGenerationFailed(#[source] io::Error),

    #[error("cannot connect to QGS (cid {cid}, port {port}): {source}")]
    ServiceUnavailable {
        cid: u32,
        port: u32,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write quote to {target}: {source}")]
    Output {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("quote too small ({len} bytes, need at least {min})")]
    TooShort { len: usize, min: usize },

    #[error("invalid quote: version={version}, tee_type={tee_type:#04x} (expected TDX v4)")]
    UnsupportedVersion { version: u16, tee_type: u32 },

    #[error("{field} at offset {offset} (+{len}) is outside the {buffer_len} byte quote")]
    OffsetOutOfBounds {
        field: &'static str,
        offset: usize,
        len: usize,
        buffer_len: usize,
    },

    #[error("failed to render quote: {0}")]
    Render(#[from] serde_json::Error),
}

impl QuoteError {
    pub(crate) fn transport(context: impl Into<String>, source: io::Error) -> Self {
        QuoteError::Transport {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
