//! Shared little-endian cursor over a byte slice. Every asset loader in
//! this module is built on top of this one cursor type.

use crate::error::AssetFormatError;

pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], AssetFormatError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(AssetFormatError::UnexpectedEof { context })?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(AssetFormatError::UnexpectedEof { context })?;
        self.pos = end;
        Ok(slice)
    }

    /// Reads the leading endianness byte. Only `0` (little-endian, this
    /// host's order) is accepted; any other value is rejected outright
    /// rather than silently read as host order.
    pub fn read_endianness(&mut self) -> Result<(), AssetFormatError> {
        let b = self.read_u8("endianness byte")?;
        if b != 0 {
            return Err(AssetFormatError::UnsupportedEndianness(b));
        }
        Ok(())
    }

    /// Reads a NUL-terminated ASCII tag and checks it against `expected`.
    pub fn read_tag(&mut self, expected: &'static str) -> Result<(), AssetFormatError> {
        let mut found = Vec::with_capacity(expected.len() + 1);
        loop {
            let b = self.read_u8("tag")?;
            if b == 0 {
                break;
            }
            found.push(b);
            if found.len() > 256 {
                return Err(AssetFormatError::UnexpectedEof { context: "tag" });
            }
        }
        let found = String::from_utf8(found).map_err(|_| AssetFormatError::InvalidUtf8)?;
        if found != expected {
            return Err(AssetFormatError::BadTag { expected, found });
        }
        Ok(())
    }

    pub fn read_version(&mut self, kind: &'static str, expected: u32) -> Result<(), AssetFormatError> {
        let found = self.read_u32("version")?;
        if found != expected {
            return Err(AssetFormatError::UnsupportedVersion {
                kind,
                expected,
                found,
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, AssetFormatError> {
        Ok(self.take(1, context)?[0])
    }

    pub fn read_u16(&mut self, context: &'static str) -> Result<u16, AssetFormatError> {
        Ok(u16::from_le_bytes(self.take(2, context)?.try_into().unwrap()))
    }

    pub fn read_i16(&mut self, context: &'static str) -> Result<i16, AssetFormatError> {
        Ok(i16::from_le_bytes(self.take(2, context)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self, context: &'static str) -> Result<u32, AssetFormatError> {
        Ok(u32::from_le_bytes(self.take(4, context)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, AssetFormatError> {
        Ok(i32::from_le_bytes(self.take(4, context)?.try_into().unwrap()))
    }

    pub fn read_f32(&mut self, context: &'static str) -> Result<f32, AssetFormatError> {
        Ok(f32::from_le_bytes(self.take(4, context)?.try_into().unwrap()))
    }

    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], AssetFormatError> {
        self.take(n, context)
    }

    /// Reads a `u32`-length-prefixed UTF-8 string, with an upper bound on
    /// the claimed length to reject corrupt/adversarial counts up front.
    pub fn read_string(&mut self, context: &'static str, what: &'static str) -> Result<String, AssetFormatError> {
        let len = self.read_u32(context)?;
        check_count(what, len, 1 << 20)?;
        let bytes = self.take(len as usize, context)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AssetFormatError::InvalidUtf8)
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// Rejects counts that are absurdly large before they're used to size an
/// allocation.
pub fn check_count(what: &'static str, found: u32, max: u32) -> Result<(), AssetFormatError> {
    if found > max {
        Err(AssetFormatError::CountOverflow { what, found })
    } else {
        Ok(())
    }
}
