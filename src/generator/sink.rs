use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64ct::{Base64, Encoding};
use log::info;
use tempfile::NamedTempFile;

use crate::error::{QuoteError, Result};

/// How quote bytes are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum QuoteEncoding {
    /// The bytes exactly as received from the QGS
    #[default]
    Raw,
    /// Standard padded base64 followed by a newline
    Base64,
}

impl QuoteEncoding {
    pub fn encode<'a>(&self, quote: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Self::Raw => Cow::Borrowed(quote),
            Self::Base64 => {
                let mut encoded = Base64::encode_string(quote);
                encoded.push('\n');
                Cow::Owned(encoded.into_bytes())
            }
        }
    }
}

/// Destination of a generated quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteSink {
    Stdout,
    /// Replaced atomically: the quote is written to a temporary file in the
    /// same directory and renamed over the target once complete.
    File(PathBuf),
}

impl QuoteSink {
    pub fn write(&self, quote: &[u8], encoding: QuoteEncoding) -> Result<()> {
        let bytes = encoding.encode(quote);
        match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                write_all(&mut stdout, &bytes).map_err(|source| QuoteError::Output {
                    target: "stdout".into(),
                    source,
                })
            }
            Self::File(path) => {
                persist(path, &bytes).map_err(|source| QuoteError::Output {
                    target: path.display().to_string(),
                    source,
                })?;
                info!("Quote saved to {}", path.display());
                Ok(())
            }
        }
    }
}

fn write_all<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes)?;
    writer.flush()
}

fn persist(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    write_all(&mut file, bytes)?;
    #[cfg(unix)]
    file.as_file().set_permissions(target_permissions(path)?)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Mode of the file being replaced, or 0644 for a new one. The temporary file
/// starts out as 0600.
#[cfg(unix)]
fn target_permissions(path: &Path) -> io::Result<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    match std::fs::metadata(path) {
        Ok(metadata) => Ok(metadata.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(std::fs::Permissions::from_mode(0o644))
        }
        Err(e) => Err(e),
    }
}
