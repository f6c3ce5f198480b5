// indexable.rs - UTF-8 container with cached code point to byte lookup.
//
// For the element last queried, the container remembers the last forward
// and backward results and, once a walk has touched an end, the number of
// code points. A query walks from whichever known position is nearest:
// the start, the end, or either cached result.

use std::ops::Deref;

use smallvec::{smallvec, SmallVec};

use crate::container::utf8::Utf8Container;
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::index::{utf8_back_n, utf8_fwd_n};

/// A known position: code points counted from one end, and its byte offset.
type Anchor = (usize, usize);

#[derive(Debug, Clone, Copy, Default)]
struct Offsets {
    slot: Option<usize>,
    /// Last forward result, counted from the start.
    fwd: Anchor,
    /// Last backward result, counted from the end.
    back: Anchor,
    /// Code points in the element.
    total: Option<usize>,
}

impl Offsets {
    fn attach(&mut self, slot: usize, len: usize) {
        if self.slot != Some(slot) {
            *self = Offsets {
                slot: Some(slot),
                fwd: (0, 0),
                back: (0, len),
                total: (len == 0).then_some(0),
            };
        }
    }

    /// Known positions counted from the start.
    fn anchors_from_start(&self, len: usize) -> SmallVec<[Anchor; 4]> {
        let mut anchors = smallvec![(0, 0), self.fwd];
        if let Some(total) = self.total {
            anchors.push((total, len));
            anchors.push((total - self.back.0, self.back.1));
        }
        anchors
    }

    /// Known positions counted from the end, used while the total is unknown.
    fn anchors_from_end(&self, len: usize) -> SmallVec<[Anchor; 4]> {
        smallvec![(0, len), self.back]
    }
}

fn nearest(anchors: &[Anchor], target: usize) -> Anchor {
    anchors
        .iter()
        .copied()
        .min_by_key(|&(cp, _)| cp.abs_diff(target))
        .unwrap_or_default()
}

/// Walk from `from` to code point `target`, both counted from the start.
fn walk_from_start(s: &[u8], from: Anchor, target: usize) -> Anchor {
    let (cp, byte) = from;
    if target >= cp {
        let (byte, walked) = utf8_fwd_n(s, byte, target - cp);
        (cp + walked, byte)
    } else {
        let (byte, walked) = utf8_back_n(s, byte, cp - target);
        (cp - walked, byte)
    }
}

/// Walk from `from` to code point `target`, both counted from the end.
fn walk_from_end(s: &[u8], from: Anchor, target: usize) -> Anchor {
    let (cp, byte) = from;
    if target >= cp {
        let (byte, walked) = utf8_back_n(s, byte, target - cp);
        (cp + walked, byte)
    } else {
        let (byte, walked) = utf8_fwd_n(s, byte, cp - target);
        (cp - walked, byte)
    }
}

/// Shallow [`Utf8Container`] with incremental offset translation.
///
/// ```
/// use strivec::container::IndexableUtf8Container;
/// use strivec::{host_vec, Context};
///
/// let ctx = Context::default();
/// let v = host_vec(&[Some("café")]);
/// let mut c = IndexableUtf8Container::new(&ctx, &v, 1).unwrap();
/// assert_eq!(c.utf32_to_utf8_index_fwd(0, 3).unwrap(), 3);
/// assert_eq!(c.utf32_to_utf8_index_back(0, 1).unwrap(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct IndexableUtf8Container<'a> {
    inner: Utf8Container<'a>,
    offsets: Offsets,
}

impl<'a> IndexableUtf8Container<'a> {
    pub fn new(
        ctx: &Context,
        values: &'a [Option<NativeString>],
        nrecycle: usize,
    ) -> Result<Self, StriError> {
        Ok(IndexableUtf8Container {
            inner: Utf8Container::new(ctx, values, nrecycle, true)?,
            offsets: Offsets::default(),
        })
    }

    /// Byte offset of code point `wh` (0-based, from the start) in element `i`.
    ///
    /// `wh <= 0` gives 0; positions past the end give the byte length.
    pub fn utf32_to_utf8_index_fwd(&mut self, i: usize, wh: i32) -> Result<usize, StriError> {
        if wh <= 0 {
            return Ok(0);
        }
        let slot = self.inner.base().slot(i)?;
        let s = self.inner.get(i)?.as_str().as_bytes();
        self.offsets.attach(slot, s.len());
        Ok(Self::seek_from_start(&mut self.offsets, s, wh as usize))
    }

    /// Byte offset of the start of the `wh`-th code point counted from
    /// the end of element `i` (1 is the last code point).
    ///
    /// `wh <= 0` gives the byte length; positions past the start give 0.
    pub fn utf32_to_utf8_index_back(&mut self, i: usize, wh: i32) -> Result<usize, StriError> {
        let slot = self.inner.base().slot(i)?;
        let s = self.inner.get(i)?.as_str().as_bytes();
        if wh <= 0 {
            return Ok(s.len());
        }
        let wh = wh as usize;
        self.offsets.attach(slot, s.len());

        if let Some(total) = self.offsets.total {
            let byte = Self::seek_from_start(&mut self.offsets, s, total.saturating_sub(wh));
            self.offsets.back = (wh.min(total), byte);
            return Ok(byte);
        }
        let anchor = nearest(&self.offsets.anchors_from_end(s.len()), wh);
        let (cp, byte) = walk_from_end(s, anchor, wh);
        self.offsets.back = (cp, byte);
        if byte == 0 {
            self.offsets.total = Some(cp);
        }
        Ok(byte)
    }

    fn seek_from_start(offsets: &mut Offsets, s: &[u8], wh: usize) -> usize {
        let anchor = nearest(&offsets.anchors_from_start(s.len()), wh);
        let (cp, byte) = walk_from_start(s, anchor, wh);
        offsets.fwd = (cp, byte);
        if byte == s.len() {
            offsets.total = Some(cp);
        }
        byte
    }
}

impl<'a> Deref for IndexableUtf8Container<'a> {
    type Target = Utf8Container<'a>;

    fn deref(&self) -> &Utf8Container<'a> {
        &self.inner
    }
}
