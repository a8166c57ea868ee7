//! TDX quote generation.
//!
//! A quote is produced in two hops: the TDX module signs a local TDREPORT over
//! the caller's report data, then the host side Quote Generation Service (QGS)
//! turns that report into a remotely verifiable quote. Every step is a single
//! attempt; retrying is left to the caller.

mod sink;
mod tdx_guest;

use std::io;

use log::{debug, info, warn};

pub use sink::*;
pub use tdx_guest::*;

use crate::config::GeneratorConfig;
use crate::constants::TDX_REPORT_LEN;
use crate::error::{QuoteError, Result};
use crate::types::report_data::ReportData;
use crate::utils::grouped_hex;

/// A local attestation report as returned by the TDX module.
#[derive(Clone, PartialEq, Eq)]
pub struct TdReport(pub [u8; TDX_REPORT_LEN]);

impl TdReport {
    pub fn as_bytes(&self) -> &[u8; TDX_REPORT_LEN] {
        &self.0
    }
}

/// Handle on the TDX report interface. Released on drop.
pub trait ReportDevice {
    fn get_report(&mut self, report_data: &ReportData) -> io::Result<TdReport>;
}

/// Byte stream to the quoting service. Released on drop.
pub trait QuoteChannel {
    /// One send; returns how many bytes were accepted.
    fn send(&mut self, frame: &[u8]) -> io::Result<usize>;

    /// One receive into `buf`; returns how many bytes were read.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Everything the generator needs from the machine it runs on.
pub trait AttestationPlatform {
    type Device: ReportDevice;
    type Channel: QuoteChannel;

    /// Fails with `Environment` outside a TDX guest or without privilege.
    fn open_device(&self) -> Result<Self::Device>;

    /// Fails with `ServiceUnavailable` when the QGS cannot be reached.
    fn connect(&self) -> Result<Self::Channel>;
}

pub struct QuoteGenerator<P> {
    platform: P,
    receive_capacity: usize,
    min_plausible_quote_size: usize,
}

impl QuoteGenerator<TdxGuest> {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        QuoteGenerator::new(TdxGuest::new(config), config)
    }
}

impl<P: AttestationPlatform> QuoteGenerator<P> {
    pub fn new(platform: P, config: &GeneratorConfig) -> Self {
        QuoteGenerator {
            platform,
            receive_capacity: config.receive_capacity,
            min_plausible_quote_size: config.min_plausible_quote_size,
        }
    }

    /// Generates a quote binding `user_data` (at most 64 bytes) and returns the
    /// bytes exactly as the QGS sent them.
    pub fn get_quote(&self, user_data: Option<&[u8]>) -> Result<Vec<u8>> {
        let report_data = ReportData::new(user_data)?;
        if let Some(data) = user_data {
            info!("Including user data: {}", String::from_utf8_lossy(data));
        }

        // The device is closed before the QGS is contacted.
        let report = {
            let mut device = self.platform.open_device()?;
            info!("Generating TDREPORT...");
            device
                .get_report(&report_data)
                .map_err(QuoteError::ReportGenerationFailed)?
        };
        info!("TDREPORT generated successfully ({TDX_REPORT_LEN} bytes)");
        debug!(
            "TDREPORT (first 32 bytes):\n{}",
            grouped_hex(&report.as_bytes()[..32])
        );

        let mut channel = self.platform.connect()?;

        let frame = report.as_bytes();
        info!("Sending TDREPORT to QGS ({} bytes)...", frame.len());
        let sent = channel
            .send(frame)
            .map_err(|e| QuoteError::transport("failed to send TDREPORT", e))?;
        if sent != frame.len() {
            return Err(QuoteError::transport(
                "failed to send TDREPORT",
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("sent {sent} bytes, expected {}", frame.len()),
                ),
            ));
        }

        info!("Waiting for quote response...");
        let mut buffer = vec![0u8; self.receive_capacity];
        let received = channel
            .recv(&mut buffer)
            .map_err(|e| QuoteError::transport("failed to receive quote", e))?;
        if received == 0 {
            return Err(QuoteError::transport(
                "failed to receive quote",
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "QGS closed the connection without sending a quote",
                ),
            ));
        }
        buffer.truncate(received);
        info!("Received quote: {received} bytes");

        if received < self.min_plausible_quote_size {
            warn!("Quote seems too small ({received} bytes)");
            warn!("Response:\n{}", grouped_hex(&buffer[..received.min(64)]));
        } else {
            debug!("Quote (first 32 bytes):\n{}", grouped_hex(&buffer[..received.min(32)]));
        }

        Ok(buffer)
    }

    /// Generates a quote and writes it to `sink`. Nothing is written unless
    /// generation succeeded.
    pub fn generate(
        &self,
        user_data: Option<&[u8]>,
        sink: &QuoteSink,
        encoding: QuoteEncoding,
    ) -> Result<Vec<u8>> {
        let quote = self.get_quote(user_data)?;
        sink.write(&quote, encoding)?;
        Ok(quote)
    }
}
