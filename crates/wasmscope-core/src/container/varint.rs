//! Base-128 variable-length integers (LEB128).
//!
//! Each byte carries seven value bits, least-significant group first. The
//! high bit of a byte says whether another byte follows. Signed values are
//! sign-extended from bit 6 of the final byte.
//!
//! Both decoders take the width of the destination integer and refuse any
//! encoding that would place value bits at or beyond that width, so a
//! malformed module can never be silently truncated into a wrong length.

use super::cursor::ByteCursor;
use crate::error::{Result, WasmScopeError};

const CONTINUATION_BIT: u8 = 0x80;
const SIGN_BIT: u8 = 0x40;
const VALUE_BITS: u8 = 0x7f;

fn check_width(width: u32) -> Result<()>
{
    if (1..=64).contains(&width) {
        Ok(())
    } else {
        Err(WasmScopeError::InvalidVarintWidth(width))
    }
}

/// Decode an unsigned varint into an integer of `width` bits.
///
/// ## Errors
///
/// - `TruncatedInput` if the buffer ends before the terminating byte
/// - `VarintOverflow` if the value does not fit in `width` bits
/// - `InvalidVarintWidth` if `width` is not in `1..=64`
pub fn decode_uint(cursor: &mut ByteCursor<'_>, width: u32) -> Result<u64>
{
    check_width(width)?;
    let start = cursor.position();
    let overflow = || WasmScopeError::VarintOverflow { offset: start, width };

    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        if shift >= width {
            return Err(overflow());
        }
        let byte = cursor.read_u8()?;
        let chunk = u64::from(byte & VALUE_BITS);

        let room = width - shift;
        if room < 7 && chunk >> room != 0 {
            return Err(overflow());
        }
        result |= chunk << shift;
        shift += 7;

        if byte & CONTINUATION_BIT == 0 {
            return Ok(result);
        }
    }
}

/// Decode a signed varint into an integer of `width` bits.
///
/// ## Errors
///
/// Same as [`decode_uint`]. A value is out of range when it falls outside
/// `-(2^(width-1))..=2^(width-1)-1`.
pub fn decode_sint(cursor: &mut ByteCursor<'_>, width: u32) -> Result<i64>
{
    check_width(width)?;
    let start = cursor.position();
    let overflow = || WasmScopeError::VarintOverflow { offset: start, width };

    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        if shift >= width {
            return Err(overflow());
        }
        let byte = cursor.read_u8()?;
        let chunk = i64::from(byte & VALUE_BITS);

        // Only bit 63 is left; the other six bits must repeat it.
        if shift == 63 && chunk != 0 && chunk != i64::from(VALUE_BITS) {
            return Err(overflow());
        }
        result |= chunk << shift;
        shift += 7;

        if byte & CONTINUATION_BIT == 0 {
            if shift < 64 && byte & SIGN_BIT != 0 {
                result |= !0i64 << shift;
            }
            if width < 64 {
                let max = (1i64 << (width - 1)) - 1;
                let min = -(1i64 << (width - 1));
                if result < min || result > max {
                    return Err(overflow());
                }
            }
            return Ok(result);
        }
    }
}

/// Decode an unsigned 32-bit varint (section lengths, name lengths).
#[allow(clippy::cast_possible_truncation)]
pub fn decode_u32(cursor: &mut ByteCursor<'_>) -> Result<u32>
{
    decode_uint(cursor, 32).map(|value| value as u32)
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn encode_unsigned(mut value: u64) -> Vec<u8>
    {
        let mut out = Vec::new();
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    fn encode_signed(mut value: i64) -> Vec<u8>
    {
        let mut out = Vec::new();
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
            if done {
                out.push(byte);
                return out;
            }
            out.push(byte | 0x80);
        }
    }

    #[test]
    fn test_decode_uint_single_byte()
    {
        let mut cursor = ByteCursor::new(&[0x02]);
        assert_eq!(decode_uint(&mut cursor, 32).unwrap(), 2);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_decode_uint_multi_byte()
    {
        // 624485, the LEB128 example from the DWARF standard
        let mut cursor = ByteCursor::new(&[0xe5, 0x8e, 0x26, 0xaa]);
        assert_eq!(decode_uint(&mut cursor, 32).unwrap(), 624_485);
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_decode_uint_reencodes_to_same_bytes()
    {
        for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u64::from(u32::MAX), u64::MAX] {
            let bytes = encode_unsigned(value);
            let mut cursor = ByteCursor::new(&bytes);
            let decoded = decode_uint(&mut cursor, 64).unwrap();
            assert_eq!(encode_unsigned(decoded), bytes);
        }
    }

    #[test]
    fn test_decode_u32_max()
    {
        let mut cursor = ByteCursor::new(&[0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(decode_u32(&mut cursor).unwrap(), u32::MAX);
    }

    #[test]
    fn test_decode_uint_rejects_bits_past_width()
    {
        let mut cursor = ByteCursor::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]);
        assert!(matches!(
            decode_uint(&mut cursor, 32),
            Err(WasmScopeError::VarintOverflow { offset: 0, width: 32 })
        ));
    }

    #[test]
    fn test_decode_uint_rejects_too_many_bytes()
    {
        let mut cursor = ByteCursor::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]);
        assert!(matches!(decode_uint(&mut cursor, 32), Err(WasmScopeError::VarintOverflow { .. })));
    }

    #[test]
    fn test_decode_uint_truncated()
    {
        let mut cursor = ByteCursor::new(&[0x80, 0x80]);
        assert!(matches!(
            decode_uint(&mut cursor, 32),
            Err(WasmScopeError::TruncatedInput { offset: 2 })
        ));
    }

    #[test]
    fn test_decode_sint_minus_one()
    {
        let mut cursor = ByteCursor::new(&[0x7f]);
        assert_eq!(decode_sint(&mut cursor, 32).unwrap(), -1);
    }

    #[test]
    fn test_decode_sint_values()
    {
        for value in [0i64, 1, -1, 63, -64, 64, -65, -123_456, i64::from(i32::MIN), i64::from(i32::MAX)] {
            let bytes = encode_signed(value);
            let mut cursor = ByteCursor::new(&bytes);
            assert_eq!(decode_sint(&mut cursor, 32).unwrap(), value, "value {value}");
        }
    }

    #[test]
    fn test_decode_sint_64_bit_extremes()
    {
        for value in [i64::MIN, i64::MAX] {
            let bytes = encode_signed(value);
            assert_eq!(bytes.len(), 10);
            let mut cursor = ByteCursor::new(&bytes);
            assert_eq!(decode_sint(&mut cursor, 64).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_sint_out_of_range()
    {
        let bytes = encode_signed(i64::from(i32::MAX) + 1);
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(decode_sint(&mut cursor, 32), Err(WasmScopeError::VarintOverflow { .. })));
    }

    #[test]
    fn test_decode_sint_known_bytes()
    {
        let mut cursor = ByteCursor::new(&[0xc0, 0xbb, 0x78]);
        assert_eq!(decode_sint(&mut cursor, 32).unwrap(), -123_456);
    }

    #[test]
    fn test_invalid_width()
    {
        let mut cursor = ByteCursor::new(&[0x01]);
        assert!(matches!(decode_uint(&mut cursor, 0), Err(WasmScopeError::InvalidVarintWidth(0))));
        assert!(matches!(decode_sint(&mut cursor, 65), Err(WasmScopeError::InvalidVarintWidth(65))));
    }
}
