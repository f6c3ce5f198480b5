// host.rs - Host-side string values.
//
// A host vector is a slice of optional byte strings, each tagged with
// the encoding the host declared for it. `None` is NA.

use std::borrow::Cow;

use crate::context::Context;
use crate::error::StriError;

/// Declared encoding of a host string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeEncoding {
    Ascii,
    Utf8,
    Latin1,
    /// The context's native encoding.
    Native,
    /// Raw bytes; rejected by every text operation.
    Bytes,
}

/// One non-NA host string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeString {
    pub bytes: Vec<u8>,
    pub encoding: NativeEncoding,
}

impl NativeString {
    /// A UTF-8 string, tagged ASCII when it is pure ASCII.
    pub fn utf8(s: &str) -> Self {
        let encoding = if s.is_ascii() {
            NativeEncoding::Ascii
        } else {
            NativeEncoding::Utf8
        };
        NativeString {
            bytes: s.as_bytes().to_vec(),
            encoding,
        }
    }

    /// Raw bytes declared as UTF-8 (not validated until decoded).
    pub fn utf8_bytes(bytes: &[u8]) -> Self {
        NativeString {
            bytes: bytes.to_vec(),
            encoding: NativeEncoding::Utf8,
        }
    }

    pub fn latin1(bytes: &[u8]) -> Self {
        NativeString {
            bytes: bytes.to_vec(),
            encoding: NativeEncoding::Latin1,
        }
    }

    pub fn native(bytes: &[u8]) -> Self {
        NativeString {
            bytes: bytes.to_vec(),
            encoding: NativeEncoding::Native,
        }
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        NativeString {
            bytes: bytes.to_vec(),
            encoding: NativeEncoding::Bytes,
        }
    }

    /// The value as `&str` when it is tagged ASCII or UTF-8 and valid.
    pub fn as_str(&self) -> Option<&str> {
        match self.encoding {
            NativeEncoding::Ascii | NativeEncoding::Utf8 => std::str::from_utf8(&self.bytes).ok(),
            _ => None,
        }
    }
}

/// Build a UTF-8 host vector.
pub fn host_vec(values: &[Option<&str>]) -> Vec<Option<NativeString>> {
    values.iter().map(|v| v.map(NativeString::utf8)).collect()
}

/// Convert owned results back to a UTF-8 host vector.
pub fn to_host_vec(values: Vec<Option<String>>) -> Vec<Option<NativeString>> {
    values
        .into_iter()
        .map(|v| v.map(|s| NativeString::utf8(&s)))
        .collect()
}

/// Borrow a host vector as `&str` values; non-UTF-8 elements read as `None`.
pub fn host_strs(values: &[Option<NativeString>]) -> Vec<Option<&str>> {
    values.iter().map(|v| v.as_ref().and_then(NativeString::as_str)).collect()
}

/// Decode one host string to UTF-8, borrowing when no conversion is needed.
///
/// `index` is reported in [`StriError::InvalidEncoding`]. Byte order
/// marks are left in place; see [`String8::strip_bom`](crate::string8::String8::strip_bom).
pub(crate) fn decode<'a>(
    ctx: &Context,
    s: &'a NativeString,
    index: usize,
) -> Result<Cow<'a, str>, StriError> {
    match s.encoding {
        NativeEncoding::Ascii | NativeEncoding::Utf8 => decode_utf8(&s.bytes, index),
        NativeEncoding::Latin1 => Ok(match std::str::from_utf8(&s.bytes) {
            Ok(text) if s.bytes.is_ascii() => Cow::Borrowed(text),
            _ => Cow::Owned(s.bytes.iter().map(|&b| b as char).collect()),
        }),
        NativeEncoding::Native => {
            let enc = ctx.native_encoding();
            if enc == encoding_rs::UTF_8 {
                return decode_utf8(&s.bytes, index);
            }
            enc.decode_without_bom_handling_and_without_replacement(&s.bytes)
                .ok_or(StriError::InvalidEncoding {
                    index,
                    encoding: enc.name(),
                })
        }
        NativeEncoding::Bytes => Err(StriError::BytesEncoding),
    }
}

fn decode_utf8(bytes: &[u8], index: usize) -> Result<Cow<'_, str>, StriError> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| StriError::InvalidEncoding {
            index,
            encoding: "UTF-8",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_borrowed() {
        let ctx = Context::default();
        let s = NativeString::utf8("café");
        let out = decode(&ctx, &s, 0).unwrap();
        assert!(matches!(out, Cow::Borrowed("café")));
    }

    #[test]
    fn ascii_tag() {
        assert_eq!(NativeString::utf8("abc").encoding, NativeEncoding::Ascii);
        assert_eq!(NativeString::utf8("ąb").encoding, NativeEncoding::Utf8);
    }

    #[test]
    fn invalid_utf8_reports_index() {
        let ctx = Context::default();
        let s = NativeString::utf8_bytes(b"ab\xFF");
        assert_eq!(
            decode(&ctx, &s, 4),
            Err(StriError::InvalidEncoding {
                index: 4,
                encoding: "UTF-8"
            })
        );
    }

    #[test]
    fn latin1_maps_bytes() {
        let ctx = Context::default();
        let s = NativeString::latin1(b"caf\xE9");
        assert_eq!(decode(&ctx, &s, 0).unwrap(), "café");
    }

    #[test]
    fn native_uses_context_encoding() {
        let ctx = Context::builder().native_encoding("iso-8859-2").build().unwrap();
        let s = NativeString::native(b"\xB1");
        assert_eq!(decode(&ctx, &s, 0).unwrap(), "ą");
    }

    #[test]
    fn native_invalid_sequence() {
        let ctx = Context::builder().native_encoding("shift_jis").build().unwrap();
        let s = NativeString::native(b"\x82");
        assert!(matches!(
            decode(&ctx, &s, 1),
            Err(StriError::InvalidEncoding { index: 1, .. })
        ));
    }

    #[test]
    fn bytes_rejected() {
        let ctx = Context::default();
        let s = NativeString::bytes(b"abc");
        assert_eq!(decode(&ctx, &s, 0), Err(StriError::BytesEncoding));
    }

    #[test]
    fn as_str_only_for_utf8() {
        assert_eq!(NativeString::utf8("x").as_str(), Some("x"));
        assert_eq!(NativeString::latin1(b"x").as_str(), None);
    }
}
