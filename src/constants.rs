// https://github.com/intel/SGX-TDX-DCAP-QuoteVerificationLibrary/blob/16b7291a7a86e486fdfcf1dfb4be885c0cc00b4e/Src/AttestationLibrary/src/QuoteVerification/QuoteConstants.h
// https://github.com/torvalds/linux/blob/master/include/uapi/linux/tdx-guest.h

pub const QUOTE_V4: u16 = 4;

pub const TDX_TEE_TYPE: u32 = 0x00000081;

pub const ECDSA_256_WITH_P256_CURVE: u16 = 2;
pub const ECDSA_384_WITH_P384_CURVE: u16 = 3;

pub const HEADER_LEN: usize = 48;
pub const LEGACY_HEADER_LEN: usize = 16;

pub const TD10_REPORT_LEN: usize = 584;

pub const MEASUREMENT_LEN: usize = 48;
pub const REPORT_DATA_LEN: usize = 64;

// Offsets into the TD report region, Intel TDX 1.0 quote body.
pub const TD10_MRTD_OFFSET: usize = 136;
pub const TD10_RTMR_OFFSETS: [usize; 4] = [328, 376, 424, 472];
pub const TD10_REPORT_DATA_OFFSET: usize = 520;

// Offsets into the TD report region for quotes carrying the 16 byte header.
pub const LEGACY_MRTD_OFFSET: usize = 32;
pub const LEGACY_RTMR_OFFSETS: [usize; 4] = [136, 184, 232, 280];
pub const LEGACY_REPORT_DATA_OFFSET: usize = 328;

// Linux TDX guest driver
pub const TDX_GUEST_DEVICE: &str = "/dev/tdx_guest";
pub const TDX_REPORT_LEN: usize = 1024;

// Quote Generation Service on the host, reached over vsock
pub const VMADDR_CID_HOST: u32 = 2;
pub const QGS_VSOCK_PORT: u32 = 4050;
pub const QUOTE_BUFFER_SIZE: usize = 8192;
pub const MIN_PLAUSIBLE_QUOTE_SIZE: usize = 1000;

pub const DEFAULT_QUOTE_FILE: &str = "quote.bin";
