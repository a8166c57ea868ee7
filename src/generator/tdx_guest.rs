use std::fs::File;
use std::io;
use std::path::PathBuf;

use log::{debug, info};
#[cfg(target_os = "linux")]
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::config::GeneratorConfig;
use crate::constants::{REPORT_DATA_LEN, TDX_REPORT_LEN};
use crate::error::{QuoteError, Result};
use crate::types::report_data::ReportData;

use super::{AttestationPlatform, QuoteChannel, ReportDevice, TdReport};

/// `struct tdx_report_req` from linux/tdx-guest.h
#[cfg(target_os = "linux")]
#[derive(AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct TdxReportReq {
    /// User buffer with REPORTDATA to be included into TDREPORT.
    pub reportdata: [u8; REPORT_DATA_LEN],
    /// User buffer to store TDREPORT output from TDCALL[TDG.MR.REPORT].
    pub tdreport: [u8; TDX_REPORT_LEN],
}

// TDX_CMD_GET_REPORT0 = _IOWR('T', 1, struct tdx_report_req)
#[cfg(target_os = "linux")]
nix::ioctl_readwrite!(tdx_cmd_get_report0, b'T', 1, TdxReportReq);

/// The Linux TDX guest: `/dev/tdx_guest` for reports, AF_VSOCK to the host QGS.
#[derive(Debug, Clone)]
pub struct TdxGuest {
    device_path: PathBuf,
    qgs_cid: u32,
    qgs_port: u32,
}

impl TdxGuest {
    pub fn new(config: &GeneratorConfig) -> Self {
        TdxGuest {
            device_path: config.device_path.clone(),
            qgs_cid: config.qgs_cid,
            qgs_port: config.qgs_port,
        }
    }
}

/// Open handle on the TDX guest device.
#[derive(Debug)]
pub struct TdxGuestDevice(File);

impl ReportDevice for TdxGuestDevice {
    #[cfg(target_os = "linux")]
    fn get_report(&mut self, report_data: &ReportData) -> io::Result<TdReport> {
        use std::os::fd::AsRawFd;

        let mut req = TdxReportReq::new_zeroed();
        req.reportdata.copy_from_slice(report_data.as_bytes());

        // SAFETY: `req` is a live, correctly sized tdx_report_req for the whole call.
        unsafe { tdx_cmd_get_report0(self.0.as_raw_fd(), &mut req) }.map_err(io::Error::from)?;

        Ok(TdReport(req.tdreport))
    }

    #[cfg(not(target_os = "linux"))]
    fn get_report(&mut self, _report_data: &ReportData) -> io::Result<TdReport> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

/// Connected vsock stream to the QGS.
#[derive(Debug)]
pub struct VsockChannel(std::os::fd::OwnedFd);

#[cfg(target_os = "linux")]
impl QuoteChannel for VsockChannel {
    fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        use nix::sys::socket::{send, MsgFlags};
        use std::os::fd::AsRawFd;

        send(self.0.as_raw_fd(), frame, MsgFlags::empty()).map_err(io::Error::from)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use nix::sys::socket::{recv, MsgFlags};
        use std::os::fd::AsRawFd;

        recv(self.0.as_raw_fd(), buf, MsgFlags::empty()).map_err(io::Error::from)
    }
}

#[cfg(not(target_os = "linux"))]
impl QuoteChannel for VsockChannel {
    fn send(&mut self, _frame: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }

    fn recv(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

impl AttestationPlatform for TdxGuest {
    type Device = TdxGuestDevice;
    type Channel = VsockChannel;

    fn open_device(&self) -> Result<TdxGuestDevice> {
        let device = File::options()
            .read(true)
            .write(true)
            .open(&self.device_path)
            .map_err(|source| environment_error(&self.device_path, source))?;
        debug!("Opened {}", self.device_path.display());
        Ok(TdxGuestDevice(device))
    }

    #[cfg(target_os = "linux")]
    fn connect(&self) -> Result<VsockChannel> {
        use nix::sys::socket::{connect, socket, AddressFamily, SockFlag, SockType, VsockAddr};
        use std::os::fd::AsRawFd;

        let unavailable = |errno: nix::Error| QuoteError::ServiceUnavailable {
            cid: self.qgs_cid,
            port: self.qgs_port,
            source: io::Error::from(errno),
        };

        let fd = socket(
            AddressFamily::Vsock,
            SockType::Stream,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(unavailable)?;

        info!("Connecting to QGS (port {})...", self.qgs_port);
        connect(
            fd.as_raw_fd(),
            &VsockAddr::new(self.qgs_cid, self.qgs_port),
        )
        .map_err(unavailable)?;

        Ok(VsockChannel(fd))
    }

    #[cfg(not(target_os = "linux"))]
    fn connect(&self) -> Result<VsockChannel> {
        Err(QuoteError::ServiceUnavailable {
            cid: self.qgs_cid,
            port: self.qgs_port,
            source: io::Error::from(io::ErrorKind::Unsupported),
        })
    }
}

fn environment_error(path: &std::path::Path, source: io::Error) -> QuoteError {
    let reason = match source.kind() {
        io::ErrorKind::NotFound => format!(
            "cannot open {}: not running inside a TDX guest",
            path.display()
        ),
        io::ErrorKind::PermissionDenied => {
            format!("cannot open {}: insufficient privilege", path.display())
        }
        _ => format!("cannot open {}", path.display()),
    };
    QuoteError::Environment { reason, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn report_request_matches_kernel_layout() {
        assert_eq!(std::mem::size_of::<TdxReportReq>(), 64 + 1024);
    }

    #[test]
    fn missing_device_is_environment_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig {
            device_path: dir.path().join("tdx_guest"),
            ..GeneratorConfig::default()
        };

        let err = TdxGuest::new(&config).open_device().unwrap_err();
        match err {
            QuoteError::Environment { reason, source } => {
                assert!(reason.contains("not running inside a TDX guest"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn permission_denied_names_privilege() {
        let err = environment_error(
            std::path::Path::new("/dev/tdx_guest"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(
            err.to_string(),
            "cannot open /dev/tdx_guest: insufficient privilege: permission denied"
        );
    }
}
