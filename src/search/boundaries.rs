// search/boundaries.rs - Text boundary operations.
//
// One break iterator serves the whole call; it is attached to each
// subject in turn.

use crate::brkiter::{BrkIterOptions, RuleBasedBreakIterator};
use crate::container::{recycling_rule, IndexableUtf8Container, IntContainer};
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;
use crate::search::{no_match, utf8_spans, SpanForm, SpanMatrix, SpanRow, StringList};

fn segments(it: &mut RuleBasedBreakIterator, limit: usize) -> Result<Vec<(usize, usize)>, StriError> {
    it.first()?;
    let mut spans = Vec::new();
    while spans.len() < limit {
        match it.next()? {
            Some(span) => spans.push(span),
            None => break,
        }
    }
    Ok(spans)
}

/// Number of text segments between non-skipped boundaries.
pub fn count(
    ctx: &Context,
    str: &[Option<NativeString>],
    opts: &BrkIterOptions,
) -> Result<Vec<Option<i32>>, StriError> {
    let subjects = IndexableUtf8Container::new(ctx, str, str.len())?;
    let mut it = RuleBasedBreakIterator::new(ctx, opts.clone())?;
    let mut ret = Vec::with_capacity(str.len());
    for i in subjects.vectorize() {
        if subjects.is_na(i) {
            ret.push(None);
            continue;
        }
        it.setup_matcher(subjects.get(i)?.as_str());
        it.first()?;
        let mut found = 0;
        while it.next_boundary()?.is_some() {
            found += 1;
        }
        ret.push(Some(found));
    }
    Ok(ret)
}

/// Code point spans of all segments.
pub fn locate_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    omit_no_match: bool,
    form: SpanForm,
    opts: &BrkIterOptions,
) -> Result<Vec<SpanMatrix>, StriError> {
    let subjects = IndexableUtf8Container::new(ctx, str, str.len())?;
    let mut it = RuleBasedBreakIterator::new(ctx, opts.clone())?;
    let mut ret = Vec::with_capacity(str.len());
    for i in subjects.vectorize() {
        if subjects.is_na(i) {
            ret.push(vec![None]);
            continue;
        }
        let text = subjects.get(i)?.as_str();
        it.setup_matcher(text);
        let spans = segments(&mut it, usize::MAX)?;
        ret.push(if spans.is_empty() {
            no_match(omit_no_match)
        } else {
            utf8_spans(text, &spans, form)?
        });
    }
    Ok(ret)
}

fn locate_one(
    ctx: &Context,
    str: &[Option<NativeString>],
    form: SpanForm,
    opts: &BrkIterOptions,
    last: bool,
) -> Result<Vec<SpanRow>, StriError> {
    let subjects = IndexableUtf8Container::new(ctx, str, str.len())?;
    let mut it = RuleBasedBreakIterator::new(ctx, opts.clone())?;
    let mut ret = Vec::with_capacity(str.len());
    for i in subjects.vectorize() {
        if subjects.is_na(i) || subjects.get(i)?.is_empty() {
            ret.push(None);
            continue;
        }
        let text = subjects.get(i)?.as_str();
        it.setup_matcher(text);
        let span = if last {
            it.last()?;
            it.previous()?
        } else {
            it.first()?;
            it.next()?
        };
        ret.push(match span {
            Some(span) => utf8_spans(text, &[span], form)?.pop().flatten(),
            None => None,
        });
    }
    Ok(ret)
}

/// Code point span of the first segment.
pub fn locate_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    form: SpanForm,
    opts: &BrkIterOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, form, opts, false)
}

/// Code point span of the last segment.
pub fn locate_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    form: SpanForm,
    opts: &BrkIterOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, form, opts, true)
}

/// Split each subject into at most `n` segments.
///
/// A negative `n` is unlimited. Unless `tokens_only`, the last piece of a
/// limited split runs to the end of the subject.
pub fn split(
    ctx: &Context,
    str: &[Option<NativeString>],
    n: &[Option<i32>],
    tokens_only: bool,
    opts: &BrkIterOptions,
) -> Result<StringList, StriError> {
    let len = recycling_rule(ctx, true, &[str.len(), n.len()]);
    let subjects = IndexableUtf8Container::new(ctx, str, len)?;
    let n = IntContainer::new(n, len);
    let mut it = RuleBasedBreakIterator::new(ctx, opts.clone())?;
    let mut ret = Vec::with_capacity(len);
    for i in subjects.vectorize() {
        let Some(limit) = n.get(i) else {
            ret.push(vec![None]);
            continue;
        };
        if subjects.is_na(i) {
            ret.push(vec![None]);
            continue;
        }
        let limit = match limit {
            0 => {
                ret.push(Vec::new());
                continue;
            }
            l if l < 0 => usize::MAX,
            l => l as usize,
        };
        let text = subjects.get(i)?.as_str();
        it.setup_matcher(text);
        let mut spans = segments(&mut it, limit)?;
        if spans.len() == limit && !tokens_only {
            if let Some(last) = spans.last_mut() {
                last.1 = text.len();
            }
        }
        ret.push(
            spans
                .into_iter()
                .map(|(s, e)| Some(NativeString::utf8(&text[s..e])))
                .collect(),
        );
    }
    Ok(ret)
}
