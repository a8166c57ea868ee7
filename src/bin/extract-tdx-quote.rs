use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use tdx_quote::config::DecoderConfig;
use tdx_quote::constants::DEFAULT_QUOTE_FILE;
use tdx_quote::{extract_quote, QuoteFormat, RenderMode, RenderOptions};

/// Print the measurement registers and report data of a TDX quote.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Emit a JSON object instead of text lines
    #[arg(long)]
    json: bool,

    /// Header layout the quote was produced with
    #[arg(long, value_enum, default_value_t = QuoteFormat::V4)]
    format: QuoteFormat,

    /// Group hex output in 4 byte words, 16 bytes per line (text mode)
    #[arg(long)]
    grouped: bool,

    #[arg(short, long, env = "TDX_QUOTE_FILE", default_value = DEFAULT_QUOTE_FILE)]
    input: PathBuf,
}

impl Args {
    fn config(&self) -> DecoderConfig {
        DecoderConfig {
            input_path: self.input.clone(),
            format: self.format,
            render: RenderOptions {
                mode: if self.json {
                    RenderMode::Json
                } else {
                    RenderMode::Text
                },
                grouped: self.grouped,
            },
        }
    }
}

fn run(config: &DecoderConfig) -> anyhow::Result<()> {
    let bytes = std::fs::read(&config.input_path)
        .with_context(|| format!("cannot read {}", config.input_path.display()))?;
    info!(
        "Read {} bytes from {}",
        bytes.len(),
        config.input_path.display()
    );

    let rendered = extract_quote(&bytes, config)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(())
}

/// Bad arguments fail like everything else, with status 1. `--help` and
/// `--version` succeed.
fn usage_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let status = usage_status(&err);
            if status == 0 {
                print!("{err}");
            } else {
                eprint!("{err}");
            }
            return ExitCode::from(status);
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&args.config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
