// usearch.rs - Collation-based string search.
//
// A match is the shortest run of whole code points starting at a code
// point boundary that the collator considers equal to the pattern. The
// collator is borrowed; the container never owns or closes it.

use std::cmp::Ordering;

use icu_collator::Collator;

use crate::cache::KeyedCache;
use crate::container::base::Vectorize;
use crate::container::utf16::Utf16Container;
use crate::context::{Context, Warning};
use crate::error::StriError;
use crate::host::NativeString;
use crate::index::{utf16_back_1, utf16_fwd_1};

/// Extra code units a match may span beyond four per pattern unit.
const WINDOW_SLACK: usize = 16;

fn is_combining_mark(u: u16) -> bool {
    matches!(
        u,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

/// Searcher for one pattern over UTF-16 subjects.
#[derive(Debug, Clone)]
pub struct CollatorSearch<'c> {
    collator: &'c Collator,
    pattern: Vec<u16>,
    pos: usize,
    span: Option<(usize, usize)>,
}

impl<'c> CollatorSearch<'c> {
    pub fn new(collator: &'c Collator, pattern: &[u16]) -> Self {
        CollatorSearch {
            collator,
            pattern: pattern.to_vec(),
            pos: 0,
            span: None,
        }
    }

    pub fn set_pattern(&mut self, pattern: &[u16]) {
        self.pattern.clear();
        self.pattern.extend_from_slice(pattern);
        self.reset();
    }

    pub fn pattern(&self) -> &[u16] {
        &self.pattern
    }

    /// Forget the previous subject.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.span = None;
    }

    /// End of the shortest match starting at `start`, if any.
    fn match_at(&self, text: &[u16], start: usize) -> Option<usize> {
        if start > 0 && is_combining_mark(text[start]) {
            return None;
        }
        let limit = text
            .len()
            .min(start + self.pattern.len() * 4 + WINDOW_SLACK);
        let mut end = utf16_fwd_1(text, start);
        while end <= limit {
            let boundary_ok = text.get(end).map_or(true, |&u| !is_combining_mark(u));
            if boundary_ok
                && self.collator.compare_utf16(&text[start..end], &self.pattern) == Ordering::Equal
            {
                return Some(end);
            }
            if end == text.len() {
                break;
            }
            end = utf16_fwd_1(text, end);
        }
        None
    }

    /// Next non-overlapping match, in code units.
    pub fn find_next(&mut self, text: &[u16]) -> Option<(usize, usize)> {
        self.span = None;
        if self.pattern.is_empty() {
            return None;
        }
        let mut start = self.pos;
        while start < text.len() {
            if let Some(end) = self.match_at(text, start) {
                self.pos = end;
                self.span = Some((start, end));
                return self.span;
            }
            start = utf16_fwd_1(text, start);
        }
        self.pos = text.len();
        None
    }

    /// First match; restarts the scan.
    pub fn find_first(&mut self, text: &[u16]) -> Option<(usize, usize)> {
        self.reset();
        self.find_next(text)
    }

    /// Last of the non-overlapping matches found scanning from the start.
    pub fn find_last(&mut self, text: &[u16]) -> Option<(usize, usize)> {
        self.reset();
        let mut last = None;
        while let Some(span) = self.find_next(text) {
            last = Some(span);
        }
        self.span = last;
        last
    }

    /// Whether a match starts at the first code unit of `text`.
    pub fn matches_prefix(&mut self, text: &[u16]) -> bool {
        self.span = None;
        if self.pattern.is_empty() {
            return false;
        }
        self.span = self.match_at(text, 0).map(|end| (0, end));
        self.span.is_some()
    }

    /// Whether a match ends at the last code unit of `text`.
    ///
    /// Candidate starts are tried from the end backward, so the shortest
    /// such match is recorded.
    pub fn matches_suffix(&mut self, text: &[u16]) -> bool {
        self.span = None;
        if self.pattern.is_empty() || text.is_empty() {
            return false;
        }
        let floor = text
            .len()
            .saturating_sub(self.pattern.len() * 4 + WINDOW_SLACK);
        let mut start = utf16_back_1(text, text.len());
        loop {
            let boundary_ok = start == 0 || !is_combining_mark(text[start]);
            if boundary_ok
                && self.collator.compare_utf16(&text[start..], &self.pattern) == Ordering::Equal
            {
                self.span = Some((start, text.len()));
                return true;
            }
            if start <= floor {
                return false;
            }
            start = utf16_back_1(text, start);
        }
    }

    pub fn matched_start(&self) -> Option<usize> {
        self.span.map(|(s, _)| s)
    }

    pub fn matched_length(&self) -> Option<usize> {
        self.span.map(|(s, e)| e - s)
    }
}

/// Patterns for one vectorized collation search, sharing a caller-owned
/// collator.
#[derive(Debug)]
pub struct CollatorSearchContainer<'c> {
    patterns: Utf16Container,
    collator: &'c Collator,
    cache: KeyedCache<CollatorSearch<'c>>,
}

impl<'c> CollatorSearchContainer<'c> {
    /// Warns once for every empty, non-NA pattern.
    pub fn new(
        ctx: &Context,
        values: &[Option<NativeString>],
        nrecycle: usize,
        collator: &'c Collator,
    ) -> Result<Self, StriError> {
        let patterns = Utf16Container::new(ctx, values, nrecycle, true)?;
        for slot in 0..patterns.n() {
            if !patterns.is_na(slot) && patterns.get(slot)?.is_empty() {
                ctx.warn(Warning::EmptyPattern);
            }
        }
        Ok(CollatorSearchContainer {
            patterns,
            collator,
            cache: KeyedCache::new(),
        })
    }

    pub fn collator(&self) -> &'c Collator {
        self.collator
    }

    pub fn vectorize(&self) -> Vectorize {
        self.patterns.vectorize()
    }

    pub fn is_na_or_empty(&self, i: usize) -> bool {
        self.patterns.is_na(i) || self.patterns.get(i).map_or(true, |s| s.is_empty())
    }

    /// Searcher for pattern `i`, reset for a new subject.
    ///
    /// The searcher object is kept across slots; only its pattern is
    /// replaced when the slot changes.
    pub fn get_matcher(&mut self, i: usize) -> Result<&mut CollatorSearch<'c>, StriError> {
        let slot = self.patterns.base().slot(i)?;
        let pattern = self.patterns.get(i)?;
        let collator = self.collator;
        self.cache.get_or_rebuild(
            slot,
            |previous| {
                log::trace!("collation searcher pattern set for slot {}", slot);
                Ok(match previous {
                    Some(mut search) => {
                        search.set_pattern(pattern);
                        search
                    }
                    None => CollatorSearch::new(collator, pattern),
                })
            },
            |search| {
                search.reset();
                Ok(())
            },
        )
    }

    /// Number of pattern changes so far.
    pub fn rebuilds(&self) -> usize {
        self.cache.rebuilds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collator::{open_collator, CollatorOptions};
    use crate::host::host_vec;

    fn u16s(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn all(search: &mut CollatorSearch<'_>, text: &[u16]) -> Vec<(usize, usize)> {
        search.reset();
        let mut out = Vec::new();
        while let Some(span) = search.find_next(text) {
            out.push(span);
        }
        out
    }

    #[test]
    fn tertiary_is_exact_on_plain_text() {
        let col = open_collator(&Context::default(), &CollatorOptions::default()).unwrap();
        let mut s = CollatorSearch::new(&col, &u16s("ab"));
        assert_eq!(all(&mut s, &u16s("xabyAbab")), vec![(1, 3), (6, 8)]);
    }

    #[test]
    fn primary_strength_matches_accents_and_case() {
        let col = open_collator(&Context::default(), &CollatorOptions::with_strength(1)).unwrap();
        let mut s = CollatorSearch::new(&col, &u16s("e"));
        assert_eq!(all(&mut s, &u16s("é E e")), vec![(0, 1), (2, 3), (4, 5)]);
    }

    #[test]
    fn match_does_not_split_a_combining_sequence() {
        let col = open_collator(&Context::default(), &CollatorOptions::with_strength(1)).unwrap();
        let mut s = CollatorSearch::new(&col, &u16s("a"));
        // "a" + U+0301 forms one unit of text.
        assert_eq!(all(&mut s, &u16s("a\u{301}b")), vec![(0, 2)]);
    }

    #[test]
    fn surrogate_pairs_are_whole() {
        let col = open_collator(&Context::default(), &CollatorOptions::default()).unwrap();
        let mut s = CollatorSearch::new(&col, &u16s("😀"));
        assert_eq!(all(&mut s, &u16s("a😀b😀")), vec![(1, 3), (4, 6)]);
        assert_eq!(s.find_last(&u16s("a😀b😀")), Some((4, 6)));
        assert_eq!(s.matched_length(), Some(2));
    }

    #[test]
    fn prefix_and_suffix_matches() {
        let col = open_collator(&Context::default(), &CollatorOptions::with_strength(1)).unwrap();
        let mut s = CollatorSearch::new(&col, &u16s("ab"));
        assert!(s.matches_prefix(&u16s("ÁBc")));
        assert_eq!(s.matched_length(), Some(2));
        assert!(!s.matches_prefix(&u16s("cab")));
        assert!(s.matches_suffix(&u16s("😀Ab")));
        assert_eq!(s.matched_start(), Some(2));
        assert!(!s.matches_suffix(&u16s("abc")));
        assert!(!s.matches_suffix(&[]));
    }

    #[test]
    fn empty_pattern_never_matches() {
        let col = open_collator(&Context::default(), &CollatorOptions::default()).unwrap();
        let mut s = CollatorSearch::new(&col, &[]);
        assert_eq!(s.find_first(&u16s("abc")), None);
    }

    #[test]
    fn searcher_reused_across_slots() {
        let ctx = Context::default();
        let col = open_collator(&ctx, &CollatorOptions::default()).unwrap();
        let pats = host_vec(&[Some("a"), Some("b")]);
        let mut c = CollatorSearchContainer::new(&ctx, &pats, 5, &col).unwrap();
        let text = u16s("ab");
        let mut spans = Vec::new();
        for i in c.vectorize() {
            spans.push(c.get_matcher(i).unwrap().find_next(&text));
        }
        assert_eq!(
            spans,
            vec![Some((0, 1)), Some((1, 2)), Some((0, 1)), Some((1, 2)), Some((0, 1))]
        );
        assert_eq!(c.rebuilds(), 5);

        let m = c.get_matcher(4).unwrap();
        assert_eq!(m.pattern(), &u16s("a")[..]);
        assert_eq!(m.matched_start(), None);
        assert_eq!(c.rebuilds(), 5);
    }

    #[test]
    fn empty_and_na_patterns() {
        let ctx = Context::default();
        let col = open_collator(&ctx, &CollatorOptions::default()).unwrap();
        let pats = host_vec(&[Some(""), None]);
        let c = CollatorSearchContainer::new(&ctx, &pats, 2, &col).unwrap();
        assert!(c.is_na_or_empty(0));
        assert!(c.is_na_or_empty(1));
        assert_eq!(ctx.take_warnings(), vec![Warning::EmptyPattern]);
    }
}
