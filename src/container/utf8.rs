// utf8.rs - UTF-8 string container.
//
// Converts a host vector once at construction. Shallow containers borrow
// from the host vector wherever no conversion was needed; deep containers
// hold one slot per recycled index and may be modified in place.

use crate::container::base::{ContainerBase, Vectorize};
use crate::context::Context;
use crate::error::StriError;
use crate::host::{decode, NativeEncoding, NativeString};
use crate::index;
use crate::string8::String8;

/// Decode one host element into a [`String8`], dropping a UTF-8 BOM.
pub(crate) fn decode_element<'a>(
    ctx: &Context,
    value: &'a Option<NativeString>,
    index: usize,
) -> Result<String8<'a>, StriError> {
    let Some(s) = value else {
        return Ok(String8::na());
    };
    let mut out = String8::from_cow(decode(ctx, s, index)?);
    if matches!(s.encoding, NativeEncoding::Utf8 | NativeEncoding::Native) {
        out.strip_bom();
    }
    Ok(out)
}

/// A vector of NA-aware UTF-8 strings with recycled access.
#[derive(Debug, Clone)]
pub struct Utf8Container<'a> {
    base: ContainerBase,
    strings: Vec<String8<'a>>,
}

impl<'a> Utf8Container<'a> {
    /// Convert `values` for access at `nrecycle` vectorized indices.
    ///
    /// With `shallow == false` every recycled index gets its own slot.
    pub fn new(
        ctx: &Context,
        values: &'a [Option<NativeString>],
        nrecycle: usize,
        shallow: bool,
    ) -> Result<Self, StriError> {
        let base = ContainerBase::new(values.len(), nrecycle, shallow);
        let mut strings = Vec::with_capacity(base.n());
        for (i, value) in values.iter().enumerate().take(base.n()) {
            strings.push(decode_element(ctx, value, i)?);
        }
        for i in strings.len()..base.n() {
            let copy = strings[i % values.len()].clone();
            strings.push(copy);
        }
        Ok(Utf8Container { base, strings })
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

    /// True if element `i` is NA. Out-of-range indices count as NA.
    pub fn is_na(&self, i: usize) -> bool {
        if i >= self.base.nrecycle() {
            return true;
        }
        self.strings[i % self.base.n()].is_na()
    }

    /// Element `i`; fails for NA.
    pub fn get(&self, i: usize) -> Result<&String8<'a>, StriError> {
        let slot = self.base.slot(i)?;
        match self.strings.get(slot) {
            Some(s) if !s.is_na() => Ok(s),
            _ => Err(StriError::Internal(format!("element {} is NA", i))),
        }
    }

    /// Mutable element `i` of a deep container; fails for NA.
    pub fn get_writable(&mut self, i: usize) -> Result<&mut String8<'a>, StriError> {
        self.base.check_writable(i)?;
        let s = &mut self.strings[i];
        if s.is_na() {
            return Err(StriError::Internal(format!("element {} is NA", i)));
        }
        Ok(s)
    }

    pub fn set(&mut self, i: usize, value: String) -> Result<(), StriError> {
        self.base.check_writable(i)?;
        self.strings[i] = String8::owned(value);
        Ok(())
    }

    pub fn set_na(&mut self, i: usize) -> Result<(), StriError> {
        self.base.check_writable(i)?;
        self.strings[i] = String8::na();
        Ok(())
    }

    /// Element `i` as a UTF-8 host string, `None` for NA.
    pub fn to_host(&self, i: usize) -> Option<NativeString> {
        if self.is_na(i) {
            return None;
        }
        Some(NativeString::utf8(self.strings[i % self.base.n()].as_str()))
    }

    /// All `nrecycle` elements as a host vector.
    pub fn to_host_all(&self) -> Vec<Option<NativeString>> {
        self.vectorize().map(|i| self.to_host(i)).collect()
    }

    /// Translate sorted byte offsets in element `i` to code point indices.
    ///
    /// See [`index::utf8_to_utf32_index`].
    pub fn utf8_to_utf32_index(
        &self,
        i: usize,
        i1: &mut [i32],
        i2: &mut [i32],
        adj1: i32,
        adj2: i32,
    ) -> Result<(), StriError> {
        index::utf8_to_utf32_index(self.get(i)?.as_str(), i1, i2, adj1, adj2)
    }
}
