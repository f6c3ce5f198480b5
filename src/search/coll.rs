// search/coll.rs - Collation-aware search operations.
//
// Subjects and patterns are held as UTF-16. One collator is opened per
// call and shared by every pattern of the call.

use crate::collator::{open_collator, CollatorOptions};
use crate::container::{
    recycling_rule, CollatorSearch, CollatorSearchContainer, IntContainer, Utf16Container,
    Utf8Container,
};
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::index::{utf16_back_n, utf16_fwd_n};
use crate::search::{
    no_match, screen, split_empty_subject, split_fields, utf16_spans, Screen, SpanForm,
    SpanMatrix, SpanRow, StringList,
};

fn screen_at(subjects: &Utf16Container, patterns: &CollatorSearchContainer<'_>, i: usize) -> Screen {
    screen(
        subjects.is_na(i),
        subjects.get(i).map_or(true, |s| s.is_empty()),
        patterns.is_na_or_empty(i),
    )
}

fn all_spans(search: &mut CollatorSearch<'_>, text: &[u16]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    while let Some(span) = search.find_next(text) {
        spans.push(span);
    }
    spans
}

fn utf16_text(units: &[u16]) -> NativeString {
    NativeString::utf8(&String::from_utf16_lossy(units))
}

/// Whether each subject contains a canonically equivalent match.
pub fn detect(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => {
                let text = subjects.get(i)?;
                Some(patterns.get_matcher(i)?.find_first(text).is_some())
            }
        });
    }
    Ok(ret)
}

/// Number of non-overlapping matches in each subject.
pub fn count(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<i32>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(0),
            Screen::Search => {
                let found = all_spans(patterns.get_matcher(i)?, subjects.get(i)?).len();
                Some(i32::try_from(found).unwrap_or(i32::MAX))
            }
        });
    }
    Ok(ret)
}

/// Code point spans of all matches.
pub fn locate_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    form: SpanForm,
    opts: &CollatorOptions,
) -> Result<Vec<SpanMatrix>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => no_match(omit_no_match),
            Screen::Search => {
                let text = subjects.get(i)?;
                let spans = all_spans(patterns.get_matcher(i)?, text);
                if spans.is_empty() {
                    no_match(omit_no_match)
                } else {
                    utf16_spans(text, &spans, form)?
                }
            }
        });
    }
    Ok(ret)
}

fn locate_one(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    opts: &CollatorOptions,
    last: bool,
) -> Result<Vec<SpanRow>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        if screen_at(&subjects, &patterns, i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let text = subjects.get(i)?;
        let search = patterns.get_matcher(i)?;
        let span = if last {
            search.find_last(text)
        } else {
            search.find_first(text)
        };
        ret.push(match span {
            Some(span) => utf16_spans(text, &[span], form)?.pop().flatten(),
            None => None,
        });
    }
    Ok(ret)
}

/// Code point span of the first match, NA if none.
pub fn locate_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    opts: &CollatorOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, opts, false)
}

/// Code point span of the last match, NA if none.
pub fn locate_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    opts: &CollatorOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, opts, true)
}

/// Every match, as text.
pub fn extract_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    opts: &CollatorOptions,
) -> Result<StringList, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let none = |omit: bool| if omit { Vec::new() } else { vec![None] };
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => none(omit_no_match),
            Screen::Search => {
                let text = subjects.get(i)?;
                let found: Vec<_> = all_spans(patterns.get_matcher(i)?, text)
                    .into_iter()
                    .map(|(s, e)| Some(utf16_text(&text[s..e])))
                    .collect();
                if found.is_empty() {
                    none(omit_no_match)
                } else {
                    found
                }
            }
        });
    }
    Ok(ret)
}

fn extract_one(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &CollatorOptions,
    last: bool,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        if screen_at(&subjects, &patterns, i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let text = subjects.get(i)?;
        let search = patterns.get_matcher(i)?;
        let span = if last {
            search.find_last(text)
        } else {
            search.find_first(text)
        };
        ret.push(span.map(|(s, e)| utf16_text(&text[s..e])));
    }
    Ok(ret)
}

/// Text of the first match, NA if none.
pub fn extract_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<NativeString>>, StriError> {
    extract_one(ctx, str, pattern, opts, false)
}

/// Text of the last match, NA if none.
pub fn extract_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<NativeString>>, StriError> {
    extract_one(ctx, str, pattern, opts, true)
}

/// Replace every match with the corresponding replacement string.
///
/// An NA replacement gives NA.
pub fn replace_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    replacement: &[Option<NativeString>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), replacement.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let replacements = Utf8Container::new(ctx, replacement, n, true)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        match screen_at(&subjects, &patterns, i) {
            Screen::Na => {
                ret.push(None);
                continue;
            }
            Screen::EmptySubject => {
                ret.push(subjects.to_host(i));
                continue;
            }
            Screen::Search => {}
        }
        if replacements.is_na(i) {
            ret.push(None);
            continue;
        }
        let replacement: Vec<u16> = replacements.get(i)?.as_str().encode_utf16().collect();
        let text = subjects.get(i)?;
        let mut out = Vec::with_capacity(text.len());
        let mut last = 0;
        for (s, e) in all_spans(patterns.get_matcher(i)?, text) {
            out.extend_from_slice(&text[last..s]);
            out.extend_from_slice(&replacement);
            last = e;
        }
        out.extend_from_slice(&text[last..]);
        ret.push(Some(utf16_text(&out)));
    }
    Ok(ret)
}

/// Split each subject at matches.
///
/// `n_max` bounds the number of pieces (negative: unlimited, NA: NA
/// result). With `omit_empty`, empty pieces are dropped.
pub fn split(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    n_max: &[Option<i32>],
    omit_empty: bool,
    opts: &CollatorOptions,
) -> Result<StringList, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), n_max.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let n_max = IntContainer::new(n_max, n);
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        let Some(limit) = n_max.get(i) else {
            ret.push(vec![None]);
            continue;
        };
        match screen_at(&subjects, &patterns, i) {
            Screen::Na => {
                ret.push(vec![None]);
                continue;
            }
            Screen::EmptySubject => {
                ret.push(split_empty_subject(omit_empty, limit));
                continue;
            }
            Screen::Search => {}
        }
        if limit == 0 {
            ret.push(Vec::new());
            continue;
        }
        let limit = if limit < 0 { usize::MAX } else { limit as usize };

        let text = subjects.get(i)?;
        let search = patterns.get_matcher(i)?;
        let fields = split_fields(text.len(), limit, omit_empty, || Ok(search.find_next(text)))?;
        ret.push(
            fields
                .into_iter()
                .map(|(s, e)| Some(utf16_text(&text[s..e])))
                .collect(),
        );
    }
    Ok(ret)
}

/// Whether a match starts at code point `from` (1-based; negative counts
/// from the end) of each subject.
pub fn starts_with(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    from: &[Option<i32>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), from.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let from = IntContainer::new(from, n);
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => match from.get(i) {
                None => None,
                Some(from) => {
                    let text = subjects.get(i)?;
                    let (pos, _) = if from >= 0 {
                        utf16_fwd_n(text, 0, from.saturating_sub(1) as usize)
                    } else {
                        utf16_back_n(text, text.len(), from.unsigned_abs() as usize)
                    };
                    Some(pos < text.len() && patterns.get_matcher(i)?.matches_prefix(&text[pos..]))
                }
            },
        });
    }
    Ok(ret)
}

/// Whether a match ends at code point `to` (1-based, inclusive; negative
/// counts from the end) of each subject.
pub fn ends_with(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    to: &[Option<i32>],
    opts: &CollatorOptions,
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), to.len()]);
    let collator = open_collator(ctx, opts)?;
    let subjects = Utf16Container::new(ctx, str, n, true)?;
    let mut patterns = CollatorSearchContainer::new(ctx, pattern, n, &collator)?;
    let to = IntContainer::new(to, n);
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => match to.get(i) {
                None => None,
                Some(to) => {
                    let text = subjects.get(i)?;
                    let (pos, _) = if to >= 0 {
                        utf16_fwd_n(text, 0, to as usize)
                    } else {
                        utf16_back_n(text, text.len(), (-(to + 1)) as usize)
                    };
                    Some(pos > 0 && patterns.get_matcher(i)?.matches_suffix(&text[..pos]))
                }
            },
        });
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{host_strs, host_vec};

    #[test]
    fn strength_controls_matching() {
        let ctx = Context::default();
        let s = host_vec(&[Some("Résumé resume RESUME")]);
        let p = host_vec(&[Some("resume")]);
        let primary = CollatorOptions::with_strength(1);
        assert_eq!(count(&ctx, &s, &p, &primary).unwrap(), vec![Some(3)]);
        assert_eq!(
            count(&ctx, &s, &p, &CollatorOptions::default()).unwrap(),
            vec![Some(1)]
        );
        assert_eq!(
            locate_all(&ctx, &s, &p, false, SpanForm::InclusiveEnd, &primary).unwrap(),
            vec![vec![Some((1, 6)), Some((8, 13)), Some((15, 20))]]
        );
    }

    #[test]
    fn first_and_last_over_surrogates() {
        let ctx = Context::default();
        let s = host_vec(&[Some("😀ab😀ab"), Some("zz"), None]);
        let p = host_vec(&[Some("ab")]);
        let opts = CollatorOptions::default();
        assert_eq!(
            locate_first(&ctx, &s, &p, SpanForm::InclusiveEnd, &opts).unwrap(),
            vec![Some((2, 3)), None, None]
        );
        assert_eq!(
            locate_last(&ctx, &s, &p, SpanForm::InclusiveEnd, &opts).unwrap(),
            vec![Some((5, 6)), None, None]
        );
        assert_eq!(
            detect(&ctx, &s, &p, &opts).unwrap(),
            vec![Some(true), Some(false), None]
        );
    }

    #[test]
    fn no_match_rows() {
        let ctx = Context::default();
        let s = host_vec(&[Some("abc"), Some("")]);
        let p = host_vec(&[Some("x")]);
        let opts = CollatorOptions::default();
        assert_eq!(
            locate_all(&ctx, &s, &p, true, SpanForm::InclusiveEnd, &opts).unwrap(),
            vec![vec![], vec![]]
        );
    }

    #[test]
    fn extract_and_replace_equivalents() {
        let ctx = Context::default();
        let s = host_vec(&[Some("Straße STRASSE"), Some("x"), None]);
        let p = host_vec(&[Some("strasse")]);
        let primary = CollatorOptions::with_strength(1);
        assert_eq!(
            host_strs(&extract_first(&ctx, &s, &p, &primary).unwrap()),
            vec![Some("Straße"), None, None]
        );
        assert_eq!(
            host_strs(&extract_last(&ctx, &s, &p, &primary).unwrap()),
            vec![Some("STRASSE"), None, None]
        );
        let r = host_vec(&[Some("road")]);
        assert_eq!(
            host_strs(&replace_all(&ctx, &s, &p, &r, &primary).unwrap()),
            vec![Some("road road"), Some("x"), None]
        );
        let all = extract_all(&ctx, &s, &p, true, &primary).unwrap();
        assert_eq!(all[0].len(), 2);
        assert!(all[1].is_empty());
    }

    #[test]
    fn split_on_case_insensitive_separator() {
        let ctx = Context::default();
        let s = host_vec(&[Some("aXbxc"), Some("")]);
        let p = host_vec(&[Some("x")]);
        let secondary = CollatorOptions::with_strength(2);
        let out = split(&ctx, &s, &p, &[Some(-1)], false, &secondary).unwrap();
        assert_eq!(host_strs(&out[0]), vec![Some("a"), Some("b"), Some("c")]);
        assert_eq!(host_strs(&out[1]), vec![Some("")]);
        let out = split(&ctx, &s, &p, &[Some(2)], true, &secondary).unwrap();
        assert_eq!(host_strs(&out[0]), vec![Some("a"), Some("bxc")]);
    }

    #[test]
    fn starts_and_ends_at_positions() {
        let ctx = Context::default();
        let s = host_vec(&[Some("😀Résumé"), Some(""), None]);
        let p = host_vec(&[Some("resume")]);
        let primary = CollatorOptions::with_strength(1);
        assert_eq!(
            starts_with(&ctx, &s, &p, &[Some(2)], &primary).unwrap(),
            vec![Some(true), Some(false), None]
        );
        assert_eq!(
            starts_with(&ctx, &s, &p, &[Some(-6)], &primary).unwrap()[0],
            Some(true)
        );
        assert_eq!(
            starts_with(&ctx, &s, &p, &[Some(1)], &primary).unwrap()[0],
            Some(false)
        );
        assert_eq!(
            starts_with(&ctx, &s, &p, &[Some(9)], &primary).unwrap()[0],
            Some(false)
        );
        assert_eq!(
            ends_with(&ctx, &s, &p, &[Some(-1)], &primary).unwrap(),
            vec![Some(true), Some(false), None]
        );
        assert_eq!(
            ends_with(&ctx, &s, &p, &[Some(7)], &primary).unwrap()[0],
            Some(true)
        );
        assert_eq!(
            ends_with(&ctx, &s, &p, &[Some(-2)], &primary).unwrap()[0],
            Some(false)
        );
        assert_eq!(
            ends_with(&ctx, &s, &p, &[None], &CollatorOptions::default()).unwrap()[0],
            None
        );
    }
}
