// index.rs - Offset translation between UTF-8, UTF-16 and code points.
//
// Batch routines take ascending offset arrays and rewrite them in place
// during a single linear scan of the string. Sortedness is a
// precondition, checked with `contract!`.

use crate::contract::is_sorted;
use crate::error::StriError;

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Byte offset of the code point after the one starting at `i`.
///
/// Stops at `s.len()`.
#[inline]
pub fn utf8_fwd_1(s: &[u8], mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    i += 1;
    while i < s.len() && is_continuation(s[i]) {
        i += 1;
    }
    i
}

/// Byte offset of the code point before offset `i`.
///
/// Stops at 0.
#[inline]
pub fn utf8_back_1(s: &[u8], mut i: usize) -> usize {
    if i == 0 {
        return 0;
    }
    i -= 1;
    while i > 0 && is_continuation(s[i]) {
        i -= 1;
    }
    i
}

/// Advance `count` code points forward from byte offset `from`.
///
/// Returns the new byte offset and the number of code points actually
/// walked, which is smaller than `count` if the end was reached.
pub fn utf8_fwd_n(s: &[u8], from: usize, count: usize) -> (usize, usize) {
    let mut pos = from;
    let mut walked = 0;
    while walked < count && pos < s.len() {
        pos = utf8_fwd_1(s, pos);
        walked += 1;
    }
    (pos, walked)
}

/// Walk `count` code points backward from byte offset `from`.
pub fn utf8_back_n(s: &[u8], from: usize, count: usize) -> (usize, usize) {
    let mut pos = from;
    let mut walked = 0;
    while walked < count && pos > 0 {
        pos = utf8_back_1(s, pos);
        walked += 1;
    }
    (pos, walked)
}

/// Walks a string one unit at a time and rewrites offsets as it passes them.
struct BatchRewriter<'i> {
    idx: &'i mut [i32],
    next: usize,
    adj: i32,
}

impl<'i> BatchRewriter<'i> {
    fn new(idx: &'i mut [i32], adj: i32) -> Self {
        BatchRewriter { idx, next: 0, adj }
    }

    fn pending(&self) -> bool {
        self.next < self.idx.len()
    }

    /// Rewrite every remaining offset `<= pos` to `target`.
    fn rewrite_upto(&mut self, pos: usize, target: i32) {
        while self.next < self.idx.len() && self.idx[self.next] as i64 <= pos as i64 {
            self.idx[self.next] = target + self.adj;
            self.next += 1;
        }
    }
}

/// Convert ascending UTF-8 byte offsets to code point indices, in place.
///
/// Each entry of `i1` becomes its code point index plus `adj1`, each
/// entry of `i2` plus `adj2`. Typical use is `adj1 = 1, adj2 = 0`: match
/// starts become 1-based, match ends (exclusive byte offsets) become the
/// 1-based index of the last matched character.
///
/// ```
/// use strivec::index::utf8_to_utf32_index;
///
/// let mut starts = [1, 3, 6];
/// let mut ends = [2, 5, 9];
/// utf8_to_utf32_index("a1b22c333", &mut starts, &mut ends, 1, 0).unwrap();
/// assert_eq!(starts, [2, 4, 7]);
/// assert_eq!(ends, [2, 5, 9]);
/// ```
pub fn utf8_to_utf32_index(
    s: &str,
    i1: &mut [i32],
    i2: &mut [i32],
    adj1: i32,
    adj2: i32,
) -> Result<(), StriError> {
    contract!(
        is_sorted(i1) && is_sorted(i2),
        "UTF-8 offsets passed for translation are not sorted"
    );
    let bytes = s.as_bytes();
    let mut r1 = BatchRewriter::new(i1, adj1);
    let mut r2 = BatchRewriter::new(i2, adj2);
    let mut pos = 0;
    let mut cp = 0;
    while pos < bytes.len() && (r1.pending() || r2.pending()) {
        r1.rewrite_upto(pos, cp);
        r2.rewrite_upto(pos, cp);
        pos = utf8_fwd_1(bytes, pos);
        cp += 1;
    }
    r1.rewrite_upto(bytes.len(), cp);
    r2.rewrite_upto(bytes.len(), cp);
    contract!(
        !r1.pending() && !r2.pending(),
        "UTF-8 offset past the end of a string of {} bytes",
        bytes.len()
    );
    Ok(())
}

/// Convert ascending UTF-16 code unit offsets to code point indices, in place.
///
/// Same adjustment convention as [`utf8_to_utf32_index`].
pub fn utf16_to_utf32_index(
    s: &[u16],
    i1: &mut [i32],
    i2: &mut [i32],
    adj1: i32,
    adj2: i32,
) -> Result<(), StriError> {
    contract!(
        is_sorted(i1) && is_sorted(i2),
        "UTF-16 offsets passed for translation are not sorted"
    );
    let mut r1 = BatchRewriter::new(i1, adj1);
    let mut r2 = BatchRewriter::new(i2, adj2);
    let mut unit = 0;
    let mut cp = 0;
    while unit < s.len() && (r1.pending() || r2.pending()) {
        r1.rewrite_upto(unit, cp);
        r2.rewrite_upto(unit, cp);
        unit = utf16_fwd_1(s, unit);
        cp += 1;
    }
    r1.rewrite_upto(s.len(), cp);
    r2.rewrite_upto(s.len(), cp);
    contract!(
        !r1.pending() && !r2.pending(),
        "UTF-16 offset past the end of a string of {} units",
        s.len()
    );
    Ok(())
}

/// Code unit offset of the code point after the one starting at `i`.
#[inline]
pub fn utf16_fwd_1(s: &[u16], i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let lead = (0xD800..0xDC00).contains(&s[i]);
    if lead && i + 1 < s.len() && (0xDC00..0xE000).contains(&s[i + 1]) {
        i + 2
    } else {
        i + 1
    }
}

/// Code unit offset of the code point before offset `i`.
#[inline]
pub fn utf16_back_1(s: &[u16], i: usize) -> usize {
    if i == 0 {
        return 0;
    }
    let trail = (0xDC00..0xE000).contains(&s[i - 1]);
    if trail && i >= 2 && (0xD800..0xDC00).contains(&s[i - 2]) {
        i - 2
    } else {
        i - 1
    }
}

/// UTF-16 counterpart of [`utf8_fwd_n`].
pub fn utf16_fwd_n(s: &[u16], from: usize, count: usize) -> (usize, usize) {
    let mut pos = from;
    let mut walked = 0;
    while walked < count && pos < s.len() {
        pos = utf16_fwd_1(s, pos);
        walked += 1;
    }
    (pos, walked)
}

/// UTF-16 counterpart of [`utf8_back_n`].
pub fn utf16_back_n(s: &[u16], from: usize, count: usize) -> (usize, usize) {
    let mut pos = from;
    let mut walked = 0;
    while walked < count && pos > 0 {
        pos = utf16_back_1(s, pos);
        walked += 1;
    }
    (pos, walked)
}

/// Number of code points in a UTF-8 string.
pub fn count_code_points(s: &str) -> usize {
    s.as_bytes().iter().filter(|&&b| !is_continuation(b)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fwd_and_back_steps() {
        let s = "aé€😀".as_bytes();
        assert_eq!(utf8_fwd_1(s, 0), 1);
        assert_eq!(utf8_fwd_1(s, 1), 3);
        assert_eq!(utf8_fwd_1(s, 3), 6);
        assert_eq!(utf8_fwd_1(s, 6), 10);
        assert_eq!(utf8_fwd_1(s, 10), 10);
        assert_eq!(utf8_back_1(s, 10), 6);
        assert_eq!(utf8_back_1(s, 6), 3);
        assert_eq!(utf8_back_1(s, 1), 0);
        assert_eq!(utf8_back_1(s, 0), 0);
    }

    #[test]
    fn n_steps_stop_at_ends() {
        let s = "café".as_bytes();
        assert_eq!(utf8_fwd_n(s, 0, 3), (3, 3));
        assert_eq!(utf8_fwd_n(s, 0, 10), (5, 4));
        assert_eq!(utf8_back_n(s, 5, 1), (3, 1));
        assert_eq!(utf8_back_n(s, 5, 9), (0, 4));
    }

    #[test]
    fn utf8_to_utf32_digits() {
        let mut starts = [1, 3, 6];
        let mut ends = [2, 5, 9];
        utf8_to_utf32_index("a1b22c333", &mut starts, &mut ends, 1, 0).unwrap();
        assert_eq!(starts, [2, 4, 7]);
        assert_eq!(ends, [2, 5, 9]);
    }

    #[test]
    fn utf8_to_utf32_multibyte() {
        // "żółw": every char but the last is 2 bytes
        let mut starts = [0, 2, 6];
        let mut ends = [2, 7, 7];
        utf8_to_utf32_index("żółw", &mut starts, &mut ends, 1, 0).unwrap();
        assert_eq!(starts, [1, 2, 4]);
        assert_eq!(ends, [1, 4, 4]);
    }

    #[test]
    fn utf8_to_utf32_end_of_string() {
        let mut starts = [2];
        let mut ends = [5];
        utf8_to_utf32_index("ab€", &mut starts, &mut ends, 0, 0).unwrap();
        assert_eq!(starts, [2]);
        assert_eq!(ends, [3]);

        let mut starts = [0];
        let mut ends = [0];
        utf8_to_utf32_index("", &mut starts, &mut ends, 1, 1).unwrap();
        assert_eq!(starts, [1]);
        assert_eq!(ends, [1]);
    }

    #[test]
    fn utf8_to_utf32_duplicates() {
        let mut starts = [1, 1];
        let mut ends = [1, 3];
        utf8_to_utf32_index("xéy", &mut starts, &mut ends, 0, 0).unwrap();
        assert_eq!(starts, [1, 1]);
        assert_eq!(ends, [1, 2]);
    }

    #[test]
    fn unsorted_is_rejected_when_checked() {
        let mut starts = [3, 1];
        let mut ends = [4, 2];
        let res = utf8_to_utf32_index("abcd", &mut starts, &mut ends, 0, 0);
        if crate::contract::ENABLED {
            assert!(matches!(res, Err(StriError::Internal(_))));
        }
    }

    #[test]
    fn utf16_steps_keep_pairs_whole() {
        let s: Vec<u16> = "a😀b".encode_utf16().collect();
        assert_eq!(utf16_back_1(&s, 4), 3);
        assert_eq!(utf16_back_1(&s, 3), 1);
        assert_eq!(utf16_back_1(&s, 0), 0);
        assert_eq!(utf16_fwd_n(&s, 0, 2), (3, 2));
        assert_eq!(utf16_fwd_n(&s, 0, 9), (4, 3));
        assert_eq!(utf16_back_n(&s, 4, 2), (1, 2));
    }

    #[test]
    fn utf16_to_utf32() {
        let units: Vec<u16> = "a😀bc".encode_utf16().collect();
        let mut starts = [0, 1, 3];
        let mut ends = [1, 3, 5];
        utf16_to_utf32_index(&units, &mut starts, &mut ends, 1, 0).unwrap();
        assert_eq!(starts, [1, 2, 3]);
        assert_eq!(ends, [1, 2, 4]);
    }

    #[test]
    fn utf16_lone_surrogate_counts_as_one() {
        let units = [0x61, 0xD800, 0x62];
        assert_eq!(utf16_fwd_1(&units, 1), 2);
        let units = [0xD83D, 0xDE00];
        assert_eq!(utf16_fwd_1(&units, 0), 2);
    }

    #[test]
    fn code_points() {
        assert_eq!(count_code_points("café"), 4);
        assert_eq!(count_code_points(""), 0);
    }
}
