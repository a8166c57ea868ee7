use tdx_quote::config::DecoderConfig;
use tdx_quote::{extract_quote, QuoteError, QuoteFormat, RenderMode, RenderOptions};

const V4_HEADER_LEN: usize = 48;
const V4_MRTD: usize = V4_HEADER_LEN + 136;
const V4_REPORT_DATA: usize = V4_HEADER_LEN + 520;

// version 4, ECDSA-256, TDX tee type
fn v4_quote(len: usize) -> Vec<u8> {
    let mut quote = vec![0u8; len];
    quote[0..2].copy_from_slice(&4u16.to_le_bytes());
    quote[2..4].copy_from_slice(&2u16.to_le_bytes());
    quote[4..8].copy_from_slice(&0x81u32.to_le_bytes());
    quote
}

fn json_config() -> DecoderConfig {
    DecoderConfig {
        render: RenderOptions {
            mode: RenderMode::Json,
            grouped: false,
        },
        ..DecoderConfig::default()
    }
}

#[test]
fn minimal_v4_quote_to_json() {
    let mut quote = v4_quote(632);
    quote[V4_MRTD..V4_MRTD + 48].fill(0xAA);
    quote[V4_REPORT_DATA..V4_REPORT_DATA + 10].copy_from_slice(b"test-nonce");

    let rendered = extract_quote(&quote, &json_config()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["version"], 4);
    assert_eq!(value["tee_type"], "0x00000081");
    assert_eq!(value["MRTD"], "AA".repeat(48));
    for i in 0..4 {
        assert_eq!(value["RTMRs"][format!("RTMR{i}")], "00".repeat(48));
    }
    assert_eq!(value["nonce"], "test-nonce");
    let report_data = value["report_data"].as_str().unwrap();
    assert_eq!(report_data.len(), 128);
    assert!(report_data.starts_with(&hex::encode_upper(b"test-nonce")));
}

#[test]
fn realistic_quote_with_signature_tail() {
    let mut quote = v4_quote(5006);
    quote[V4_REPORT_DATA..V4_REPORT_DATA + 64].fill(b'z');

    let rendered = extract_quote(&quote, &DecoderConfig::default()).unwrap();
    assert!(rendered.starts_with("VERSION: 4\n"));
    assert!(rendered.contains(&format!("NONCE: {}\n", "z".repeat(64))));
}

#[test]
fn ten_byte_file_is_too_short() {
    let err = extract_quote(&[0u8; 10], &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, QuoteError::TooShort { len: 10, min: 632 }));
}

#[test]
fn wrong_version_is_rejected() {
    let mut quote = v4_quote(632);
    quote[0..2].copy_from_slice(&3u16.to_le_bytes());

    let err = extract_quote(&quote, &json_config()).unwrap_err();
    assert!(matches!(
        err,
        QuoteError::UnsupportedVersion { version: 3, .. }
    ));
}

#[test]
fn legacy_layout_is_selected_explicitly() {
    let mut quote = vec![0u8; 600];
    quote[0..2].copy_from_slice(&4u16.to_le_bytes());
    quote[16 + 32..16 + 32 + 48].fill(0x5A);

    let config = DecoderConfig {
        format: QuoteFormat::Legacy,
        ..json_config()
    };
    let rendered = extract_quote(&quote, &config).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["MRTD"], "5A".repeat(48));
    assert!(value.get("nonce").is_none());

    // the same bytes are too short for the default layout
    let err = extract_quote(&quote, &json_config()).unwrap_err();
    assert!(matches!(err, QuoteError::TooShort { len: 600, .. }));
}

#[test]
fn rendering_is_idempotent() {
    let quote = v4_quote(1024);
    let config = DecoderConfig {
        render: RenderOptions {
            mode: RenderMode::Text,
            grouped: true,
        },
        ..DecoderConfig::default()
    };
    assert_eq!(
        extract_quote(&quote, &config).unwrap(),
        extract_quote(&quote, &config).unwrap()
    );
}
