use crate::error::{QuoteError, Result};

/// Removes `std::mem::size_of<T>()` bytes from the front of `bytes` and returns it as a `T`.
///
/// Returns `None` and leaves `bytes` unchanged if it isn't long enough.
pub fn read_from_bytes<T: zerocopy::FromBytes>(bytes: &mut &[u8]) -> Option<T> {
    let front = T::read_from_prefix(bytes)?;
    *bytes = &bytes[std::mem::size_of::<T>()..];
    Some(front)
}

/// Copies the `N` bytes starting at `offset` into an owned `[u8; N]`.
///
/// Fails with `OffsetOutOfBounds` unless `offset + N <= bytes.len()`.
pub fn read_field<const N: usize>(
    bytes: &[u8],
    offset: usize,
    field: &'static str,
) -> Result<[u8; N]> {
    let out_of_bounds = || QuoteError::OffsetOutOfBounds {
        field,
        offset,
        len: N,
        buffer_len: bytes.len(),
    };

    let end = offset.checked_add(N).ok_or_else(out_of_bounds)?;
    let slice = bytes.get(offset..end).ok_or_else(out_of_bounds)?;

    let mut res = [0u8; N];
    res.copy_from_slice(slice);
    Ok(res)
}

/// Copies `value` into `bytes` at `offset`.
///
/// Note: Caller must ensure the buffer is large enough
pub fn write_field(bytes: &mut [u8], offset: usize, value: &[u8]) {
    bytes[offset..offset + value.len()].copy_from_slice(value);
}

/// Uppercase hex, a space after every 4 bytes and a line break after every 16.
pub fn grouped_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2 + data.len() / 2);
    for (i, byte) in data.iter().enumerate() {
        out.push_str(&format!("{byte:02X}"));
        if i + 1 == data.len() {
            break;
        }
        if i % 16 == 15 {
            out.push('\n');
        } else if i % 4 == 3 {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_field_in_bounds() {
        let bytes = [1u8, 2, 3, 4, 5, 6];
        let field: [u8; 3] = read_field(&bytes, 2, "field").unwrap();
        assert_eq!(field, [3, 4, 5]);

        let tail: [u8; 2] = read_field(&bytes, 4, "tail").unwrap();
        assert_eq!(tail, [5, 6]);
    }

    #[test]
    fn read_field_past_end() {
        let bytes = [0u8; 10];
        let err = read_field::<4>(&bytes, 8, "rtmr0").unwrap_err();
        match err {
            QuoteError::OffsetOutOfBounds {
                field,
                offset,
                len,
                buffer_len,
            } => {
                assert_eq!(field, "rtmr0");
                assert_eq!(offset, 8);
                assert_eq!(len, 4);
                assert_eq!(buffer_len, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn read_field_offset_overflow() {
        let bytes = [0u8; 10];
        assert!(read_field::<4>(&bytes, usize::MAX - 1, "mrtd").is_err());
    }

    #[test]
    fn read_from_bytes_leaves_short_buffer_untouched() {
        let data = [1u8, 2, 3];
        let mut bytes = &data[..];
        assert!(read_from_bytes::<[u8; 4]>(&mut bytes).is_none());
        assert_eq!(bytes.len(), 3);

        let front = read_from_bytes::<[u8; 2]>(&mut bytes).unwrap();
        assert_eq!(front, [1, 2]);
        assert_eq!(bytes, &[3]);
    }

    #[test]
    fn grouped_hex_layout() {
        let data: Vec<u8> = (0u8..20).collect();
        assert_eq!(
            grouped_hex(&data),
            "00010203 04050607 08090A0B 0C0D0E0F\n10111213"
        );
        assert_eq!(grouped_hex(&[]), "");
        assert_eq!(grouped_hex(&[0xab; 4]), "ABABABAB");
    }
}
