// sub.rs - Substring extraction and replacement by code point index.
//
// Indices are 1-based; negative values count from the end (-1 is the
// last character). Both ends are inclusive.

use crate::container::{recycling_rule, IndexableUtf8Container, IntContainer, Utf8Container};
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::string8::String8Buf;

/// Second bound of a substring.
#[derive(Debug, Clone, Copy)]
pub enum SubRange<'r> {
    /// Inclusive end index.
    To(&'r [Option<i32>]),
    /// Number of characters from `from`.
    Length(&'r [Option<i32>]),
}

impl<'r> SubRange<'r> {
    fn values(&self) -> &'r [Option<i32>] {
        match *self {
            SubRange::To(v) | SubRange::Length(v) => v,
        }
    }
}

/// Resolved byte range of element `i`. The end may precede the start
/// for an inverted range; a non-positive length gives an empty range.
fn byte_range(
    subjects: &mut IndexableUtf8Container<'_>,
    i: usize,
    from: i32,
    bound: i32,
    is_length: bool,
) -> Result<(usize, usize), StriError> {
    let start = if from >= 0 {
        subjects.utf32_to_utf8_index_fwd(i, from - 1)?
    } else {
        subjects.utf32_to_utf8_index_back(i, from.saturating_neg())?
    };

    let mut to = bound;
    if is_length {
        if bound <= 0 {
            return Ok((start, start));
        }
        to = from.saturating_add(bound - 1);
        if from < 0 && to >= 0 {
            to = -1;
        }
    }
    let end = if to >= 0 {
        subjects.utf32_to_utf8_index_fwd(i, to)?
    } else {
        subjects.utf32_to_utf8_index_back(i, -(to + 1))?
    };
    Ok((start, end))
}

/// Substrings of `str` from `from` to the given bound.
///
/// An empty or inverted range gives `""`; any NA argument gives NA.
///
/// ```
/// use strivec::sub::{sub, SubRange};
/// use strivec::{host_strs, host_vec, Context};
///
/// let ctx = Context::default();
/// let s = host_vec(&[Some("żółwik")]);
/// let out = sub(&ctx, &s, &[Some(2)], SubRange::To(&[Some(-2)])).unwrap();
/// assert_eq!(host_strs(&out), vec![Some("ółwi")]);
/// ```
pub fn sub(
    ctx: &Context,
    str: &[Option<NativeString>],
    from: &[Option<i32>],
    range: SubRange<'_>,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), from.len(), range.values().len()]);
    let mut subjects = IndexableUtf8Container::new(ctx, str, n)?;
    let from = IntContainer::new(from, n);
    let bound = IntContainer::new(range.values(), n);
    let is_length = matches!(range, SubRange::Length(_));

    let mut ret = Vec::with_capacity(n);
    for i in subjects.vectorize() {
        let (Some(f), Some(b)) = (from.get(i), bound.get(i)) else {
            ret.push(None);
            continue;
        };
        if subjects.is_na(i) {
            ret.push(None);
            continue;
        }
        let (start, end) = byte_range(&mut subjects, i, f, b, is_length)?;
        let piece = if end > start {
            &subjects.get(i)?.as_str()[start..end]
        } else {
            ""
        };
        ret.push(Some(NativeString::utf8(piece)));
    }
    Ok(ret)
}

/// Replace the substring of each element with `value`.
///
/// An inverted range or a non-positive length inserts `value` at `from`.
pub fn sub_replace(
    ctx: &Context,
    str: &[Option<NativeString>],
    from: &[Option<i32>],
    range: SubRange<'_>,
    value: &[Option<NativeString>],
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(
        ctx,
        true,
        &[str.len(), from.len(), range.values().len(), value.len()],
    );
    let mut subjects = IndexableUtf8Container::new(ctx, str, n)?;
    let values = Utf8Container::new(ctx, value, n, true)?;
    let from = IntContainer::new(from, n);
    let bound = IntContainer::new(range.values(), n);
    let is_length = matches!(range, SubRange::Length(_));

    let mut buf = String8Buf::default();
    let mut ret = Vec::with_capacity(n);
    for i in subjects.vectorize() {
        let (Some(f), Some(b)) = (from.get(i), bound.get(i)) else {
            ret.push(None);
            continue;
        };
        if subjects.is_na(i) || values.is_na(i) {
            ret.push(None);
            continue;
        }
        let (start, end) = byte_range(&mut subjects, i, f, b, is_length)?;
        let src = subjects.get(i)?.as_str();
        let replaced = buf.replace_all_at_pos(src, values.get(i)?.as_str(), &[(start, end.max(start))]);
        ret.push(Some(NativeString::utf8(replaced)));
    }
    Ok(ret)
}
