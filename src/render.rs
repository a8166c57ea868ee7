//! Presentation of a [`ParsedQuote`].
//!
//! Both modes are pure functions of the parsed quote; nothing here looks at raw bytes.

use serde::Serialize;

use crate::error::Result;
use crate::types::quote::ParsedQuote;
use crate::types::Measurement;
use crate::utils::grouped_hex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// `LABEL: HEX` lines
    #[default]
    Text,
    /// Pretty printed JSON object
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Text mode only: space every 4 bytes, line break every 16 bytes.
    pub grouped: bool,
}

pub fn render(quote: &ParsedQuote, options: RenderOptions) -> Result<String> {
    match options.mode {
        RenderMode::Text => Ok(render_text(quote, options.grouped)),
        RenderMode::Json => render_json(quote),
    }
}

pub fn render_text(quote: &ParsedQuote, grouped: bool) -> String {
    let hex = |bytes: &[u8]| {
        if grouped {
            format!("\n{}", grouped_hex(bytes))
        } else {
            format!(" {}", hex::encode_upper(bytes))
        }
    };

    let mut lines = vec![
        format!("VERSION: {}", quote.header.version()),
        format!("TEE_TYPE: {:#010x}", quote.header.tee_type()),
        format!("MRTD:{}", hex(quote.mrtd.as_bytes())),
    ];
    for (i, rtmr) in quote.rtmrs.iter().enumerate() {
        lines.push(format!("RTMR{i}:{}", hex(rtmr.as_bytes())));
    }
    lines.push(format!("REPORT_DATA:{}", hex(quote.report_data.raw())));
    if let Some(nonce) = quote.report_data.nonce() {
        lines.push(format!("NONCE: {nonce}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[derive(Serialize)]
struct RenderedQuote<'a> {
    version: u16,
    tee_type: String,
    #[serde(rename = "MRTD")]
    mrtd: &'a Measurement,
    #[serde(rename = "RTMRs")]
    rtmrs: RenderedRtmrs<'a>,
    report_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
}

#[derive(Serialize)]
struct RenderedRtmrs<'a> {
    #[serde(rename = "RTMR0")]
    rtmr0: &'a Measurement,
    #[serde(rename = "RTMR1")]
    rtmr1: &'a Measurement,
    #[serde(rename = "RTMR2")]
    rtmr2: &'a Measurement,
    #[serde(rename = "RTMR3")]
    rtmr3: &'a Measurement,
}

pub fn render_json(quote: &ParsedQuote) -> Result<String> {
    let [rtmr0, rtmr1, rtmr2, rtmr3] = &quote.rtmrs;
    let rendered = RenderedQuote {
        version: quote.header.version(),
        tee_type: format!("{:#010x}", quote.header.tee_type()),
        mrtd: &quote.mrtd,
        rtmrs: RenderedRtmrs {
            rtmr0,
            rtmr1,
            rtmr2,
            rtmr3,
        },
        report_data: quote.report_data.to_hex(),
        nonce: quote.report_data.nonce(),
    };

    let mut out = serde_json::to_string_pretty(&rendered)?;
    out.push('\n');
    Ok(out)
}
