// bytesearch.rs - Fixed-pattern (byte) search container.
//
// Patterns are UTF-8, so a byte match of a valid UTF-8 needle always
// starts and ends on code point boundaries of the subject.

use memchr::memmem::{Finder, FinderRev};

use crate::cache::KeyedCache;
use crate::container::base::Vectorize;
use crate::container::utf8::Utf8Container;
use crate::context::{Context, Warning};
use crate::error::StriError;
use crate::host::NativeString;
use crate::index::utf8_fwd_1;

/// Substring searcher over one subject at a time.
#[derive(Debug, Clone)]
pub struct ByteSearcher {
    finder: Finder<'static>,
    finder_rev: FinderRev<'static>,
    overlap: bool,
    pos: usize,
    span: Option<(usize, usize)>,
}

impl ByteSearcher {
    fn new(pattern: &[u8], overlap: bool) -> Self {
        ByteSearcher {
            finder: Finder::new(pattern).into_owned(),
            finder_rev: FinderRev::new(pattern).into_owned(),
            overlap,
            pos: 0,
            span: None,
        }
    }

    fn set_pattern(&mut self, pattern: &[u8]) {
        self.finder = Finder::new(pattern).into_owned();
        self.finder_rev = FinderRev::new(pattern).into_owned();
    }

    /// Forget the previous subject.
    fn reset(&mut self) {
        self.pos = 0;
        self.span = None;
    }

    pub fn pattern(&self) -> &[u8] {
        self.finder.needle()
    }

    /// First occurrence in `text`; restarts the scan.
    pub fn find_first(&mut self, text: &[u8]) -> Option<(usize, usize)> {
        self.reset();
        self.find_next(text)
    }

    /// Next occurrence after the previous one.
    pub fn find_next(&mut self, text: &[u8]) -> Option<(usize, usize)> {
        let len = self.finder.needle().len();
        self.span = None;
        if len == 0 || self.pos > text.len() {
            return None;
        }
        let start = self.pos + self.finder.find(&text[self.pos..])?;
        self.pos = if self.overlap {
            utf8_fwd_1(text, start)
        } else {
            start + len
        };
        self.span = Some((start, start + len));
        self.span
    }

    /// Last occurrence in `text`.
    pub fn find_last(&mut self, text: &[u8]) -> Option<(usize, usize)> {
        let len = self.finder_rev.needle().len();
        self.pos = text.len() + 1;
        self.span = None;
        if len == 0 {
            return None;
        }
        let start = self.finder_rev.rfind(text)?;
        self.span = Some((start, start + len));
        self.span
    }

    pub fn matched_start(&self) -> Option<usize> {
        self.span.map(|(s, _)| s)
    }

    pub fn matched_length(&self) -> Option<usize> {
        self.span.map(|(s, e)| e - s)
    }
}

/// Fixed patterns for one vectorized operation.
#[derive(Debug)]
pub struct ByteSearchContainer<'a> {
    patterns: Utf8Container<'a>,
    overlap: bool,
    cache: KeyedCache<ByteSearcher>,
}

impl<'a> ByteSearchContainer<'a> {
    /// With `overlap`, occurrences may share bytes ("aa" is found twice
    /// in "aaa").
    pub fn new(
        ctx: &Context,
        values: &'a [Option<NativeString>],
        nrecycle: usize,
        overlap: bool,
    ) -> Result<Self, StriError> {
        let patterns = Utf8Container::new(ctx, values, nrecycle, true)?;
        for slot in 0..patterns.n() {
            if !patterns.is_na(slot) && patterns.get(slot)?.is_empty() {
                ctx.warn(Warning::EmptyPattern);
            }
        }
        Ok(ByteSearchContainer {
            patterns,
            overlap,
            cache: KeyedCache::new(),
        })
    }

    pub fn vectorize(&self) -> Vectorize {
        self.patterns.vectorize()
    }

    pub fn is_na_or_empty(&self, i: usize) -> bool {
        self.patterns.is_na(i) || self.patterns.get(i).map_or(true, |s| s.is_empty())
    }

    /// Text of pattern `i`.
    pub fn pattern(&self, i: usize) -> Result<&str, StriError> {
        Ok(self.patterns.get(i)?.as_str())
    }

    /// Searcher for pattern `i`, positioned before the start of a new subject.
    pub fn setup_matcher(&mut self, i: usize) -> Result<&mut ByteSearcher, StriError> {
        let slot = self.patterns.base().slot(i)?;
        let pattern = self.patterns.get(i)?.as_str().as_bytes();
        let overlap = self.overlap;
        self.cache.get_or_rebuild(
            slot,
            |previous| {
                Ok(match previous {
                    Some(mut searcher) => {
                        searcher.set_pattern(pattern);
                        searcher
                    }
                    None => ByteSearcher::new(pattern, overlap),
                })
            },
            |searcher| {
                searcher.reset();
                Ok(())
            },
        )
    }

    /// Number of searcher rebuilds so far.
    pub fn rebuilds(&self) -> usize {
        self.cache.rebuilds()
    }
}
