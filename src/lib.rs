pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod render;
pub mod types;
pub mod utils;

use log::info;

use config::{DecoderConfig, GeneratorConfig};
pub use error::{QuoteError, Result};
pub use generator::{QuoteEncoding, QuoteGenerator, QuoteSink};
pub use render::{render, RenderMode, RenderOptions};
pub use types::quote::{decode_quote, ParsedQuote, QuoteFormat};

/// Produces a quote on the local TDX guest and writes it to `sink`.
pub fn generate_quote(
    config: &GeneratorConfig,
    user_data: Option<&[u8]>,
    sink: &QuoteSink,
    encoding: QuoteEncoding,
) -> Result<Vec<u8>> {
    QuoteGenerator::from_config(config).generate(user_data, sink, encoding)
}

/// Decodes `bytes` with the configured layout and renders the result.
pub fn extract_quote(bytes: &[u8], config: &DecoderConfig) -> Result<String> {
    // 1. Validate the structure and pull the fixed-offset fields out.
    info!(
        "Decoding {} byte quote ({} layout)",
        bytes.len(),
        config.format
    );
    let quote = decode_quote(bytes, config.format)?;

    // 2. Present it; the rendering only ever sees the parsed quote.
    render(&quote, config.render)
}
