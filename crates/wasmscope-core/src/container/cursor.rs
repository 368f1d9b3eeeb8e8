//! Forward-only reader over a borrowed byte buffer.

use crate::error::{Result, WasmScopeError};

/// A read position over an immutable byte buffer.
///
/// The cursor only ever moves forward. Every read is bounds-checked and
/// fails with [`WasmScopeError::TruncatedInput`] instead of reading past the
/// end of the buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a>
{
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a>
{
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self
    {
        Self { data, position: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize
    {
        self.position
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize
    {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool
    {
        self.remaining() == 0
    }

    /// Consume one byte.
    ///
    /// ## Errors
    ///
    /// Returns `TruncatedInput` if the cursor is already at the end.
    pub fn read_u8(&mut self) -> Result<u8>
    {
        let byte = *self
            .data
            .get(self.position)
            .ok_or(WasmScopeError::TruncatedInput { offset: self.position })?;
        self.position += 1;
        Ok(byte)
    }

    /// Consume `len` bytes and return them as a slice of the underlying buffer.
    ///
    /// ## Errors
    ///
    /// Returns `TruncatedInput` if fewer than `len` bytes remain. The cursor
    /// does not move in that case.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]>
    {
        if len > self.remaining() {
            return Err(WasmScopeError::TruncatedInput { offset: self.position });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    /// Consume a fixed-size array (magic numbers, version fields).
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]>
    {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Jump forward to `position`.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `position` lies behind the cursor and
    /// `TruncatedInput` if it lies past the end of the buffer.
    pub fn advance_to(&mut self, position: usize) -> Result<()>
    {
        if position < self.position {
            return Err(WasmScopeError::InvalidArgument(format!(
                "cursor cannot rewind from {:#x} to {position:#x}",
                self.position
            )));
        }
        if position > self.data.len() {
            return Err(WasmScopeError::TruncatedInput { offset: self.data.len() });
        }
        self.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_read_u8_advances()
    {
        let mut cursor = ByteCursor::new(&[1, 2]);
        assert_eq!(cursor.read_u8().unwrap(), 1);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.read_u8().unwrap(), 2);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_read_u8_past_end()
    {
        let mut cursor = ByteCursor::new(&[]);
        assert!(matches!(cursor.read_u8(), Err(WasmScopeError::TruncatedInput { offset: 0 })));
    }

    #[test]
    fn test_read_bytes_does_not_move_on_failure()
    {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        assert_eq!(cursor.read_bytes(2).unwrap(), &[1, 2]);
        assert!(cursor.read_bytes(2).is_err());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_advance_to_rejects_rewind()
    {
        let mut cursor = ByteCursor::new(&[0; 8]);
        cursor.advance_to(4).unwrap();
        assert!(cursor.advance_to(2).is_err());
        assert!(cursor.advance_to(9).is_err());
        cursor.advance_to(8).unwrap();
        assert!(cursor.is_empty());
    }
}
