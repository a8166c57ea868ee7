use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::error;

use tdx_quote::config::GeneratorConfig;
use tdx_quote::constants::{QGS_VSOCK_PORT, TDX_GUEST_DEVICE, VMADDR_CID_HOST};
use tdx_quote::{generate_quote, QuoteEncoding, QuoteSink};

/// Generate a TDX quote from inside a TD guest.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Nonce bound into the quote's report data (at most 64 bytes)
    #[arg(short = 'd', long, allow_hyphen_values = true)]
    user_data: Option<String>,

    /// Write the quote to this file instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = QuoteEncoding::Raw)]
    encoding: QuoteEncoding,

    #[arg(long, env = "TDX_GUEST_DEVICE", default_value = TDX_GUEST_DEVICE)]
    device: PathBuf,

    /// vsock CID of the Quote Generation Service
    #[arg(long, env = "TDX_QGS_CID", default_value_t = VMADDR_CID_HOST)]
    qgs_cid: u32,

    #[arg(long, env = "TDX_QGS_PORT", default_value_t = QGS_VSOCK_PORT)]
    qgs_port: u32,
}

impl Args {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            device_path: self.device.clone(),
            qgs_cid: self.qgs_cid,
            qgs_port: self.qgs_port,
            ..GeneratorConfig::default()
        }
    }

    fn sink(&self) -> QuoteSink {
        match &self.output {
            Some(path) => QuoteSink::File(path.clone()),
            None => QuoteSink::Stdout,
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let quote = generate_quote(
        &args.config(),
        args.user_data.as_deref().map(str::as_bytes),
        &args.sink(),
        args.encoding,
    )
    .context("quote generation failed")?;

    log::debug!("Generated {} byte quote", quote.len());
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

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("tdx-quote-generator").chain(args.iter().copied()))
    }

    #[test]
    fn nonce_may_start_with_a_hyphen() {
        let args = parse(&["--user-data", "-abc"]).unwrap();
        assert_eq!(args.user_data.as_deref(), Some("-abc"));

        let args = parse(&["-d", "-x", "-o", "quote.bin"]).unwrap();
        assert_eq!(args.user_data.as_deref(), Some("-x"));
        assert_eq!(args.sink(), QuoteSink::File(PathBuf::from("quote.bin")));
    }

    #[test]
    fn usage_errors_exit_with_status_one() {
        for args in [
            &["--bogus"][..],
            &["--encoding", "hex"][..],
            &["--qgs-port", "x"][..],
            &["-d"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(usage_status(&err), 1, "{args:?}");
        }
    }

    #[test]
    fn help_and_version_succeed() {
        assert_eq!(usage_status(&parse(&["--help"]).unwrap_err()), 0);
        assert_eq!(usage_status(&parse(&["--version"]).unwrap_err()), 0);
    }

    #[test]
    fn stdout_is_the_default_sink() {
        let args = parse(&["--encoding", "base64"]).unwrap();
        assert_eq!(args.sink(), QuoteSink::Stdout);
        assert_eq!(args.encoding, QuoteEncoding::Base64);
    }
}
