// string8.rs - NA-aware UTF-8 string and a reusable output buffer.

use std::borrow::Cow;

/// One UTF-8 string that may borrow from the host vector or own its data.
///
/// `String8::na()` is the missing value; it is distinct from `""`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct String8<'a> {
    data: Option<Cow<'a, str>>,
}

impl<'a> String8<'a> {
    pub fn na() -> Self {
        String8 { data: None }
    }

    pub fn borrowed(s: &'a str) -> Self {
        String8 {
            data: Some(Cow::Borrowed(s)),
        }
    }

    pub fn owned(s: String) -> Self {
        String8 {
            data: Some(Cow::Owned(s)),
        }
    }

    pub(crate) fn from_cow(s: Cow<'a, str>) -> Self {
        String8 { data: Some(s) }
    }

    pub fn is_na(&self) -> bool {
        self.data.is_none()
    }

    /// Contents; `""` for NA.
    pub fn as_str(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }

    pub fn as_option(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Drop a leading UTF-8 byte order mark, if any.
    pub fn strip_bom(&mut self) {
        match &mut self.data {
            Some(Cow::Borrowed(s)) => {
                let text: &'a str = s;
                if let Some(rest) = text.strip_prefix('\u{FEFF}') {
                    *s = rest;
                }
            }
            Some(Cow::Owned(s)) => {
                if s.starts_with('\u{FEFF}') {
                    s.drain(..'\u{FEFF}'.len_utf8());
                }
            }
            None => {}
        }
    }

    /// Byte-compare `pattern` against the contents at byte offset `pos`.
    pub fn starts_with_at(&self, pos: usize, pattern: &str) -> bool {
        let bytes = self.as_str().as_bytes();
        bytes
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(pattern.as_bytes()))
    }

    /// Byte-compare `pattern` against the bytes ending at offset `pos`.
    pub fn ends_with_at(&self, pos: usize, pattern: &str) -> bool {
        let bytes = self.as_str().as_bytes();
        bytes
            .get(..pos)
            .is_some_and(|head| head.ends_with(pattern.as_bytes()))
    }

    /// Mutable access to the contents, copying borrowed data first.
    ///
    /// Returns `None` for NA.
    pub fn to_mut(&mut self) -> Option<&mut String> {
        self.data.as_mut().map(Cow::to_mut)
    }

    /// Replace every byte span in `occurrences` with `replacement`, in place.
    ///
    /// Spans must be sorted and non-overlapping. NA stays NA.
    pub fn replace_all_at_pos(&mut self, replacement: &str, occurrences: &[(usize, usize)]) {
        if occurrences.is_empty() || self.is_na() {
            return;
        }
        let mut buf = String8Buf::with_capacity(self.len());
        let replaced = buf.replace_all_at_pos(self.as_str(), replacement, occurrences);
        self.data = Some(Cow::Owned(replaced.to_string()));
    }
}

/// Growable scratch buffer reused across the elements of one call.
#[derive(Debug, Default)]
pub struct String8Buf {
    buf: String,
}

impl String8Buf {
    pub fn with_capacity(size: usize) -> Self {
        String8Buf {
            buf: String::with_capacity(size),
        }
    }

    /// Ensure room for `size` bytes without reallocating.
    pub fn resize(&mut self, size: usize) {
        if self.buf.capacity() < size {
            self.buf.reserve(size - self.buf.len());
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Write `src` with each span of `occurrences` replaced by `replacement`.
    ///
    /// Spans are byte ranges `[start, end)` into `src`, sorted and
    /// non-overlapping. The buffer is cleared first.
    pub fn replace_all_at_pos(
        &mut self,
        src: &str,
        replacement: &str,
        occurrences: &[(usize, usize)],
    ) -> &str {
        let removed: usize = occurrences.iter().map(|(s, e)| e - s).sum();
        let size = src.len() - removed + replacement.len() * occurrences.len();
        self.buf.clear();
        self.resize(size);
        let mut last = 0;
        for &(start, end) in occurrences {
            self.buf.push_str(&src[last..start]);
            self.buf.push_str(replacement);
            last = end;
        }
        self.buf.push_str(&src[last..]);
        &self.buf
    }
}
