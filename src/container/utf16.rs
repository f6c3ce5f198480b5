// utf16.rs - UTF-16 string container, for collation-based operations.

use crate::container::base::{ContainerBase, Vectorize};
use crate::container::utf8::decode_element;
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::index;

/// A vector of NA-aware UTF-16 strings with recycled access.
///
/// NA is stored as `None`, distinct from an empty string.
#[derive(Debug, Clone)]
pub struct Utf16Container {
    base: ContainerBase,
    strings: Vec<Option<Vec<u16>>>,
}

impl Utf16Container {
    pub fn new(
        ctx: &Context,
        values: &[Option<NativeString>],
        nrecycle: usize,
        shallow: bool,
    ) -> Result<Self, StriError> {
        let base = ContainerBase::new(values.len(), nrecycle, shallow);
        let mut strings = Vec::with_capacity(base.n());
        for (i, value) in values.iter().enumerate().take(base.n()) {
            let s = decode_element(ctx, value, i)?;
            strings.push(s.as_option().map(|s| s.encode_utf16().collect()));
        }
        for i in strings.len()..base.n() {
            let copy = strings[i % values.len()].clone();
            strings.push(copy);
        }
        Ok(Utf16Container { base, strings })
    }

    pub fn base(&self) -> &ContainerBase {
        &self.base
    }

    pub fn n(&self) -> usize {
        self.base.n()
    }

    pub fn nrecycle(&self) -> usize {
        self.base.nrecycle()
    }

    pub fn vectorize(&self) -> Vectorize {
        self.base.vectorize()
    }

    pub fn is_na(&self, i: usize) -> bool {
        if i >= self.base.nrecycle() {
            return true;
        }
        self.strings[i % self.base.n()].is_none()
    }

    /// Element `i`; fails for NA.
    pub fn get(&self, i: usize) -> Result<&[u16], StriError> {
        let slot = self.base.slot(i)?;
        match self.strings.get(slot) {
            Some(Some(s)) => Ok(s),
            _ => Err(StriError::Internal(format!("element {} is NA", i))),
        }
    }

    pub fn get_writable(&mut self, i: usize) -> Result<&mut Vec<u16>, StriError> {
        self.base.check_writable(i)?;
        self.strings[i]
            .as_mut()
            .ok_or_else(|| StriError::Internal(format!("element {} is NA", i)))
    }

    pub fn set(&mut self, i: usize, value: Vec<u16>) -> Result<(), StriError> {
        self.base.check_writable(i)?;
        self.strings[i] = Some(value);
        Ok(())
    }

    pub fn set_na(&mut self, i: usize) -> Result<(), StriError> {
        self.base.check_writable(i)?;
        self.strings[i] = None;
        Ok(())
    }

    /// Element `i` as a UTF-8 host string. Unpaired surrogates are
    /// replaced with U+FFFD.
    pub fn to_host(&self, i: usize) -> Option<NativeString> {
        if self.is_na(i) {
            return None;
        }
        let units = self.strings[i % self.base.n()].as_deref()?;
        Some(NativeString::utf8(&String::from_utf16_lossy(units)))
    }

    pub fn to_host_all(&self) -> Vec<Option<NativeString>> {
        self.vectorize().map(|i| self.to_host(i)).collect()
    }

    /// Translate sorted code unit offsets in element `i` to code point indices.
    pub fn utf16_to_utf32_index(
        &self,
        i: usize,
        i1: &mut [i32],
        i2: &mut [i32],
        adj1: i32,
        adj2: i32,
    ) -> Result<(), StriError> {
        index::utf16_to_utf32_index(self.get(i)?, i1, i2, adj1, adj2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::host_vec;

    #[test]
    fn converts_and_recycles() {
        let ctx = Context::default();
        let v = host_vec(&[Some("a😀"), None, Some("")]);
        let c = Utf16Container::new(&ctx, &v, 6, true).unwrap();
        assert_eq!(c.get(3).unwrap(), &[0x61, 0xD83D, 0xDE00]);
        assert!(c.is_na(4));
        assert!(!c.is_na(5));
        assert_eq!(c.get(5).unwrap(), &[] as &[u16]);
    }

    #[test]
    fn round_trips_to_host() {
        let ctx = Context::default();
        let v = host_vec(&[Some("żółw"), None]);
        let c = Utf16Container::new(&ctx, &v, 2, true).unwrap();
        assert_eq!(c.to_host_all(), host_vec(&[Some("żółw"), None]));
    }

    #[test]
    fn deep_set() {
        let ctx = Context::default();
        let v = host_vec(&[Some("ab")]);
        let mut c = Utf16Container::new(&ctx, &v, 2, false).unwrap();
        c.get_writable(0).unwrap().push(0x63);
        c.set_na(1).unwrap();
        assert_eq!(c.to_host_all(), host_vec(&[Some("abc"), None]));
        c.set(1, vec![0x7A]).unwrap();
        assert_eq!(c.to_host(1), Some(NativeString::utf8("z")));
    }

    #[test]
    fn offsets_to_code_points() {
        let ctx = Context::default();
        let v = host_vec(&[Some("😀x😀")]);
        let c = Utf16Container::new(&ctx, &v, 1, true).unwrap();
        let mut starts = [2];
        let mut ends = [5];
        c.utf16_to_utf32_index(0, &mut starts, &mut ends, 1, 0).unwrap();
        assert_eq!((starts[0], ends[0]), (2, 3));
    }
}
