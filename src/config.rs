use std::path::PathBuf;

use crate::constants::{
    DEFAULT_QUOTE_FILE, MIN_PLAUSIBLE_QUOTE_SIZE, QGS_VSOCK_PORT, QUOTE_BUFFER_SIZE,
    TDX_GUEST_DEVICE, VMADDR_CID_HOST,
};
use crate::render::RenderOptions;
use crate::types::quote::QuoteFormat;

/// Where the generator finds the TDX module and the quoting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub device_path: PathBuf,
    pub qgs_cid: u32,
    pub qgs_port: u32,
    /// Capacity of the single receive used to read the quote.
    pub receive_capacity: usize,
    /// Quotes below this size are logged as suspicious but still returned.
    pub min_plausible_quote_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            device_path: PathBuf::from(TDX_GUEST_DEVICE),
            qgs_cid: VMADDR_CID_HOST,
            qgs_port: QGS_VSOCK_PORT,
            receive_capacity: QUOTE_BUFFER_SIZE,
            min_plausible_quote_size: MIN_PLAUSIBLE_QUOTE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    pub input_path: PathBuf,
    pub format: QuoteFormat,
    pub render: RenderOptions,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            input_path: PathBuf::from(DEFAULT_QUOTE_FILE),
            format: QuoteFormat::default(),
            render: RenderOptions::default(),
        }
    }
}
