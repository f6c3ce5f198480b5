// search/fixed.rs - Fixed-pattern (byte) search operations.

use crate::container::{
    recycling_rule, ByteSearchContainer, ByteSearcher, IndexableUtf8Container, IntContainer,
    Utf8Container,
};
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::search::{
    no_match, screen, split_empty_subject, split_fields, utf8_spans, Screen, SpanForm,
    SpanMatrix, SpanRow, StringList,
};

fn all_spans(searcher: &mut ByteSearcher, text: &[u8]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut found = searcher.find_first(text);
    while let Some(span) = found {
        spans.push(span);
        found = searcher.find_next(text);
    }
    spans
}

fn screen_at(subjects: &Utf8Container<'_>, patterns: &ByteSearchContainer<'_>, i: usize) -> Screen {
    screen(
        subjects.is_na(i),
        subjects.get(i).map_or(true, |s| s.is_empty()),
        patterns.is_na_or_empty(i),
    )
}

/// Whether each subject contains the pattern.
pub fn detect(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => {
                let text = subjects.get(i)?.as_str().as_bytes();
                Some(patterns.setup_matcher(i)?.find_first(text).is_some())
            }
        });
    }
    Ok(ret)
}

/// Number of occurrences; with `overlap`, occurrences may share bytes.
pub fn count(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    overlap: bool,
) -> Result<Vec<Option<i32>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, overlap)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(0),
            Screen::Search => {
                let text = subjects.get(i)?.as_str().as_bytes();
                let found = all_spans(patterns.setup_matcher(i)?, text).len();
                Some(i32::try_from(found).unwrap_or(i32::MAX))
            }
        });
    }
    Ok(ret)
}

/// Code point spans of all occurrences.
pub fn locate_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    overlap: bool,
    form: SpanForm,
) -> Result<Vec<SpanMatrix>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, overlap)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => no_match(omit_no_match),
            Screen::Search => {
                let text = subjects.get(i)?.as_str();
                let spans = all_spans(patterns.setup_matcher(i)?, text.as_bytes());
                if spans.is_empty() {
                    no_match(omit_no_match)
                } else {
                    utf8_spans(text, &spans, form)?
                }
            }
        });
    }
    Ok(ret)
}

/// Replace every occurrence, editing a deep copy of `str` in place.
pub fn replace_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    replacement: &[Option<NativeString>],
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), replacement.len()]);
    let mut subjects = Utf8Container::new(ctx, str, n, false)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let replacements = Utf8Container::new(ctx, replacement, n, true)?;
    for i in patterns.vectorize() {
        match screen_at(&subjects, &patterns, i) {
            Screen::Na => {
                subjects.set_na(i)?;
                continue;
            }
            Screen::EmptySubject => continue,
            Screen::Search => {}
        }
        let spans = all_spans(
            patterns.setup_matcher(i)?,
            subjects.get(i)?.as_str().as_bytes(),
        );
        if replacements.is_na(i) {
            subjects.set_na(i)?;
            continue;
        }
        let replacement = replacements.get(i)?.as_str();
        subjects
            .get_writable(i)?
            .replace_all_at_pos(replacement, &spans);
    }
    Ok(subjects.to_host_all())
}

fn locate_one(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    last: bool,
) -> Result<Vec<SpanRow>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        if screen_at(&subjects, &patterns, i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let text = subjects.get(i)?.as_str();
        let searcher = patterns.setup_matcher(i)?;
        let span = if last {
            searcher.find_last(text.as_bytes())
        } else {
            searcher.find_first(text.as_bytes())
        };
        ret.push(match span {
            Some(span) => utf8_spans(text, &[span], form)?.pop().flatten(),
            None => None,
        });
    }
    Ok(ret)
}

/// Code point span of the first occurrence, NA if none.
pub fn locate_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, false)
}

/// Code point span of the last occurrence, NA if none.
pub fn locate_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, true)
}

/// Every occurrence, as text.
pub fn extract_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    overlap: bool,
) -> Result<StringList, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, overlap)?;
    let none = |omit: bool| if omit { Vec::new() } else { vec![None] };
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => none(omit_no_match),
            Screen::Search => {
                let text = subjects.get(i)?.as_str();
                let found: Vec<_> = all_spans(patterns.setup_matcher(i)?, text.as_bytes())
                    .into_iter()
                    .map(|(s, e)| Some(NativeString::utf8(&text[s..e])))
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
    last: bool,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        if screen_at(&subjects, &patterns, i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let text = subjects.get(i)?.as_str();
        let searcher = patterns.setup_matcher(i)?;
        let span = if last {
            searcher.find_last(text.as_bytes())
        } else {
            searcher.find_first(text.as_bytes())
        };
        ret.push(span.map(|(s, e)| NativeString::utf8(&text[s..e])));
    }
    Ok(ret)
}

/// Text of the first occurrence, NA if none.
pub fn extract_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
) -> Result<Vec<Option<NativeString>>, StriError> {
    extract_one(ctx, str, pattern, false)
}

/// Text of the last occurrence, NA if none.
pub fn extract_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
) -> Result<Vec<Option<NativeString>>, StriError> {
    extract_one(ctx, str, pattern, true)
}

/// Split each subject at the occurrences of its pattern.
///
/// At most `n_max` pieces are produced (negative is unlimited, NA gives
/// NA). With `omit_empty`, empty pieces are dropped.
pub fn split(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    n_max: &[Option<i32>],
    omit_empty: bool,
) -> Result<StringList, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), n_max.len()]);
    let subjects = Utf8Container::new(ctx, str, n, true)?;
    let mut patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
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

        let text = subjects.get(i)?.as_str();
        let searcher = patterns.setup_matcher(i)?;
        let mut first = true;
        let fields = split_fields(text.len(), limit, omit_empty, || {
            Ok(if std::mem::take(&mut first) {
                searcher.find_first(text.as_bytes())
            } else {
                searcher.find_next(text.as_bytes())
            })
        })?;
        ret.push(
            fields
                .into_iter()
                .map(|(s, e)| Some(NativeString::utf8(&text[s..e])))
                .collect(),
        );
    }
    Ok(ret)
}

/// Whether the pattern occurs at code point `from` (1-based; negative
/// counts from the end) of each subject. Bytes are compared exactly.
pub fn starts_with(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    from: &[Option<i32>],
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), from.len()]);
    let mut subjects = IndexableUtf8Container::new(ctx, str, n)?;
    let patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let from = IntContainer::new(from, n);
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => match from.get(i) {
                None => None,
                Some(from) => {
                    let pos = if from >= 0 {
                        subjects.utf32_to_utf8_index_fwd(i, from - 1)?
                    } else {
                        subjects.utf32_to_utf8_index_back(i, from.saturating_neg())?
                    };
                    Some(subjects.get(i)?.starts_with_at(pos, patterns.pattern(i)?))
                }
            },
        });
    }
    Ok(ret)
}

/// Whether the pattern ends at code point `to` (1-based, inclusive;
/// negative counts from the end) of each subject.
pub fn ends_with(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    to: &[Option<i32>],
) -> Result<Vec<Option<bool>>, StriError> {
    let n = recycling_rule(ctx, true, &[str.len(), pattern.len(), to.len()]);
    let mut subjects = IndexableUtf8Container::new(ctx, str, n)?;
    let patterns = ByteSearchContainer::new(ctx, pattern, n, false)?;
    let to = IntContainer::new(to, n);
    let mut ret = Vec::with_capacity(n);
    for i in patterns.vectorize() {
        ret.push(match screen_at(&subjects, &patterns, i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => match to.get(i) {
                None => None,
                Some(to) => {
                    let pos = if to >= 0 {
                        subjects.utf32_to_utf8_index_fwd(i, to)?
                    } else {
                        subjects.utf32_to_utf8_index_back(i, -(to + 1))?
                    };
                    Some(subjects.get(i)?.ends_with_at(pos, patterns.pattern(i)?))
                }
            },
        });
    }
    Ok(ret)
}
