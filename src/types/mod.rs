use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::MEASUREMENT_LEN;

pub mod quote;
pub mod report_data;

/// A 48 byte measurement register value (MRTD or one of the RTMRs).
///
/// Opaque: compared byte for byte, never hashed or interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measurement(pub [u8; MEASUREMENT_LEN]);

impl Measurement {
    pub fn as_bytes(&self) -> &[u8; MEASUREMENT_LEN] {
        &self.0
    }

    /// Contiguous uppercase hex, 96 characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl From<[u8; MEASUREMENT_LEN]> for Measurement {
    fn from(value: [u8; MEASUREMENT_LEN]) -> Self {
        Measurement(value)
    }
}

impl fmt::Debug for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Measurement({})", self.to_hex())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
