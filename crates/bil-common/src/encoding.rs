//! Band element encodings of headerless raster files.
//!
//! BIL files carry no self-describing header, so the width, signedness and
//! byte order of each band element are declared per layer. The declaration
//! uses the single-character pack codes loader configs have always been written
//! with (`s` for signed shorts, `C` for unsigned bytes, ...); long names are
//! accepted as well. Encodings without an explicit byte order are read
//! little-endian.

use std::fmt;
use std::str::FromStr;

use crate::error::BilError;

/// Element encoding of one band value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    SignedByte,
    UnsignedByte,
    SignedShort,
    UnsignedShort,
    UnsignedShortBE,
    UnsignedShortLE,
    SignedInt,
    UnsignedInt,
    SignedLong32,
    UnsignedLong32,
    UnsignedLong32BE,
    UnsignedLong32LE,
}

impl Encoding {
    pub const ALL: [Encoding; 12] = [
        Encoding::SignedByte,
        Encoding::UnsignedByte,
        Encoding::SignedShort,
        Encoding::UnsignedShort,
        Encoding::UnsignedShortBE,
        Encoding::UnsignedShortLE,
        Encoding::SignedInt,
        Encoding::UnsignedInt,
        Encoding::SignedLong32,
        Encoding::UnsignedLong32,
        Encoding::UnsignedLong32BE,
        Encoding::UnsignedLong32LE,
    ];

    /// Single-character pack code.
    pub fn code(&self) -> char {
        match self {
            Encoding::SignedByte => 'c',
            Encoding::UnsignedByte => 'C',
            Encoding::SignedShort => 's',
            Encoding::UnsignedShort => 'S',
            Encoding::UnsignedShortBE => 'n',
            Encoding::UnsignedShortLE => 'v',
            Encoding::SignedInt => 'i',
            Encoding::UnsignedInt => 'I',
            Encoding::SignedLong32 => 'l',
            Encoding::UnsignedLong32 => 'L',
            Encoding::UnsignedLong32BE => 'N',
            Encoding::UnsignedLong32LE => 'V',
        }
    }

    /// Long snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::SignedByte => "signed_byte",
            Encoding::UnsignedByte => "unsigned_byte",
            Encoding::SignedShort => "signed_short",
            Encoding::UnsignedShort => "unsigned_short",
            Encoding::UnsignedShortBE => "unsigned_short_be",
            Encoding::UnsignedShortLE => "unsigned_short_le",
            Encoding::SignedInt => "signed_int",
            Encoding::UnsignedInt => "unsigned_int",
            Encoding::SignedLong32 => "signed_long32",
            Encoding::UnsignedLong32 => "unsigned_long32",
            Encoding::UnsignedLong32BE => "unsigned_long32_be",
            Encoding::UnsignedLong32LE => "unsigned_long32_le",
        }
    }

    /// Width of one element in bytes.
    pub fn byte_width(&self) -> usize {
        match self {
            Encoding::SignedByte | Encoding::UnsignedByte => 1,
            Encoding::SignedShort
            | Encoding::UnsignedShort
            | Encoding::UnsignedShortBE
            | Encoding::UnsignedShortLE => 2,
            _ => 4,
        }
    }

    /// Inclusive range of representable values.
    pub fn range(&self) -> (i64, i64) {
        match self {
            Encoding::SignedByte => (i8::MIN as i64, i8::MAX as i64),
            Encoding::UnsignedByte => (0, u8::MAX as i64),
            Encoding::SignedShort => (i16::MIN as i64, i16::MAX as i64),
            Encoding::UnsignedShort | Encoding::UnsignedShortBE | Encoding::UnsignedShortLE => {
                (0, u16::MAX as i64)
            }
            Encoding::SignedInt | Encoding::SignedLong32 => (i32::MIN as i64, i32::MAX as i64),
            _ => (0, u32::MAX as i64),
        }
    }

    /// Decode one element. `bytes` must be exactly [`byte_width`](Self::byte_width) long.
    pub fn decode(&self, bytes: &[u8]) -> Option<i64> {
        let value = match self {
            Encoding::SignedByte => i8::from_le_bytes(bytes.try_into().ok()?) as i64,
            Encoding::UnsignedByte => u8::from_le_bytes(bytes.try_into().ok()?) as i64,
            Encoding::SignedShort => i16::from_le_bytes(bytes.try_into().ok()?) as i64,
            Encoding::UnsignedShort | Encoding::UnsignedShortLE => {
                u16::from_le_bytes(bytes.try_into().ok()?) as i64
            }
            Encoding::UnsignedShortBE => u16::from_be_bytes(bytes.try_into().ok()?) as i64,
            Encoding::SignedInt | Encoding::SignedLong32 => {
                i32::from_le_bytes(bytes.try_into().ok()?) as i64
            }
            Encoding::UnsignedInt | Encoding::UnsignedLong32 | Encoding::UnsignedLong32LE => {
                u32::from_le_bytes(bytes.try_into().ok()?) as i64
            }
            Encoding::UnsignedLong32BE => u32::from_be_bytes(bytes.try_into().ok()?) as i64,
        };
        Some(value)
    }

    /// Append the encoded form of `value` to `out`.
    ///
    /// Returns `false` (leaving `out` untouched) when the value does not fit.
    pub fn encode_into(&self, value: i64, out: &mut Vec<u8>) -> bool {
        let (min, max) = self.range();
        if value < min || value > max {
            return false;
        }
        match self {
            Encoding::SignedByte => out.extend_from_slice(&(value as i8).to_le_bytes()),
            Encoding::UnsignedByte => out.push(value as u8),
            Encoding::SignedShort => out.extend_from_slice(&(value as i16).to_le_bytes()),
            Encoding::UnsignedShort | Encoding::UnsignedShortLE => {
                out.extend_from_slice(&(value as u16).to_le_bytes())
            }
            Encoding::UnsignedShortBE => out.extend_from_slice(&(value as u16).to_be_bytes()),
            Encoding::SignedInt | Encoding::SignedLong32 => {
                out.extend_from_slice(&(value as i32).to_le_bytes())
            }
            Encoding::UnsignedInt | Encoding::UnsignedLong32 | Encoding::UnsignedLong32LE => {
                out.extend_from_slice(&(value as u32).to_le_bytes())
            }
            Encoding::UnsignedLong32BE => out.extend_from_slice(&(value as u32).to_be_bytes()),
        }
        true
    }
}

impl FromStr for Encoding {
    type Err = BilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(code), None) = (chars.next(), chars.next()) {
            return Encoding::ALL
                .iter()
                .copied()
                .find(|e| e.code() == code)
                .ok_or_else(|| BilError::UnsupportedEncoding(s.to_string()));
        }

        let name = s.to_lowercase();
        Encoding::ALL
            .iter()
            .copied()
            .find(|e| e.name() == name)
            .ok_or_else(|| BilError::UnsupportedEncoding(s.to_string()))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
