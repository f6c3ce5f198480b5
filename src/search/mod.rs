// search/mod.rs - Vectorized search operations.
//
// Each operation recycles its arguments, walks the vectorized index range
// in ascending order, and reports positions as 1-based code point indices.
//
// Missing values and empty patterns short-circuit before any engine is
// touched: an NA subject or pattern gives NA, an empty pattern gives NA
// (its warning is raised once, when the pattern container is built), and
// an empty subject gives the operation's "no match" value.

pub mod boundaries;
pub mod coll;
pub mod fixed;
pub mod regex;

use crate::error::StriError;
use crate::host::NativeString;
use crate::index;

/// How the second coordinate of a located span is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpanForm {
    /// Index of the last character of the span.
    #[default]
    InclusiveEnd,
    /// Index of the first character after the span.
    ExclusiveEnd,
    /// Number of characters in the span.
    Length,
}

/// One located span; `None` is a row of missing values.
pub type SpanRow = Option<(i32, i32)>;

/// All spans found in one subject.
pub type SpanMatrix = Vec<SpanRow>;

/// Per-element list of strings; an NA element is `vec![None]`.
pub type StringList = Vec<Vec<Option<NativeString>>>;

/// How a single vectorized element should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Na,
    EmptySubject,
    Search,
}

pub(crate) fn screen(subject_na: bool, subject_empty: bool, pattern_na_or_empty: bool) -> Screen {
    if subject_na || pattern_na_or_empty {
        Screen::Na
    } else if subject_empty {
        Screen::EmptySubject
    } else {
        Screen::Search
    }
}

/// Result for an element with nothing found.
pub(crate) fn no_match(omit_no_match: bool) -> SpanMatrix {
    if omit_no_match {
        Vec::new()
    } else {
        vec![None]
    }
}

/// Pieces of an empty subject under a split.
pub(crate) fn split_empty_subject(omit_empty: bool, n_max: i32) -> Vec<Option<NativeString>> {
    if omit_empty || n_max == 0 {
        Vec::new()
    } else {
        vec![Some(NativeString::utf8(""))]
    }
}

/// Field spans between successive matches yielded by `next_match`.
///
/// At most `limit` fields are produced, the last one running to `len`.
/// With `omit_empty`, empty fields are dropped.
pub(crate) fn split_fields(
    len: usize,
    limit: usize,
    omit_empty: bool,
    mut next_match: impl FnMut() -> Result<Option<(usize, usize)>, StriError>,
) -> Result<Vec<(usize, usize)>, StriError> {
    let mut fields = vec![(0usize, 0usize)];
    while fields.len() < limit {
        let Some((s, e)) = next_match()? else { break };
        let cur = fields.len() - 1;
        if omit_empty && fields[cur].0 == s {
            fields[cur].0 = e;
        } else {
            fields[cur].1 = s;
            fields.push((e, e));
        }
    }
    if let Some(field) = fields.last_mut() {
        field.1 = len;
    }
    if omit_empty && fields.last().is_some_and(|f| f.0 == f.1) {
        fields.pop();
    }
    Ok(fields)
}

fn to_i32(v: usize) -> Result<i32, StriError> {
    i32::try_from(v).map_err(|_| StriError::Internal(format!("offset {} exceeds i32", v)))
}

fn split_spans(spans: &[(usize, usize)]) -> Result<(Vec<i32>, Vec<i32>), StriError> {
    let mut starts = Vec::with_capacity(spans.len());
    let mut ends = Vec::with_capacity(spans.len());
    for &(s, e) in spans {
        starts.push(to_i32(s)?);
        ends.push(to_i32(e)?);
    }
    Ok((starts, ends))
}

fn adjustments(form: SpanForm) -> (i32, i32) {
    match form {
        SpanForm::ExclusiveEnd => (1, 1),
        SpanForm::InclusiveEnd | SpanForm::Length => (1, 0),
    }
}

fn join_spans(starts: Vec<i32>, ends: Vec<i32>, form: SpanForm) -> SpanMatrix {
    starts
        .into_iter()
        .zip(ends)
        .map(|(s, e)| match form {
            SpanForm::Length => Some((s, e - s + 1)),
            _ => Some((s, e)),
        })
        .collect()
}

/// Translate sorted byte spans of `s` to code point spans.
pub(crate) fn utf8_spans(
    s: &str,
    spans: &[(usize, usize)],
    form: SpanForm,
) -> Result<SpanMatrix, StriError> {
    let (mut starts, mut ends) = split_spans(spans)?;
    let (adj1, adj2) = adjustments(form);
    index::utf8_to_utf32_index(s, &mut starts, &mut ends, adj1, adj2)?;
    Ok(join_spans(starts, ends, form))
}

/// Translate sorted code unit spans of `s` to code point spans.
pub(crate) fn utf16_spans(
    s: &[u16],
    spans: &[(usize, usize)],
    form: SpanForm,
) -> Result<SpanMatrix, StriError> {
    let (mut starts, mut ends) = split_spans(spans)?;
    let (adj1, adj2) = adjustments(form);
    index::utf16_to_utf32_index(s, &mut starts, &mut ends, adj1, adj2)?;
    Ok(join_spans(starts, ends, form))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_forms() {
        let spans = [(1, 3), (4, 8)];
        let s = "aéb😀c";
        assert_eq!(
            utf8_spans(s, &spans, SpanForm::InclusiveEnd).unwrap(),
            vec![Some((2, 2)), Some((4, 4))]
        );
        assert_eq!(
            utf8_spans(s, &spans, SpanForm::ExclusiveEnd).unwrap(),
            vec![Some((2, 3)), Some((4, 5))]
        );
        assert_eq!(
            utf8_spans(s, &spans, SpanForm::Length).unwrap(),
            vec![Some((2, 1)), Some((4, 1))]
        );
    }

    #[test]
    fn utf16_span_translation() {
        let s: Vec<u16> = "a😀b".encode_utf16().collect();
        assert_eq!(
            utf16_spans(&s, &[(1, 3), (3, 4)], SpanForm::InclusiveEnd).unwrap(),
            vec![Some((2, 2)), Some((3, 3))]
        );
    }

    #[test]
    fn screening() {
        assert_eq!(screen(true, false, false), Screen::Na);
        assert_eq!(screen(false, true, true), Screen::Na);
        assert_eq!(screen(false, true, false), Screen::EmptySubject);
        assert_eq!(screen(false, false, false), Screen::Search);
        assert_eq!(no_match(true), vec![]);
        assert_eq!(no_match(false), vec![None]);
    }

    #[test]
    fn fields_between_matches() {
        let mut hits = vec![(1, 2), (2, 3), (5, 6)].into_iter();
        let fields = split_fields(7, usize::MAX, false, || Ok(hits.next())).unwrap();
        assert_eq!(fields, vec![(0, 1), (2, 2), (3, 5), (6, 7)]);

        let mut hits = vec![(0, 1), (1, 2), (5, 7)].into_iter();
        let fields = split_fields(7, usize::MAX, true, || Ok(hits.next())).unwrap();
        assert_eq!(fields, vec![(2, 5)]);

        let mut hits = vec![(1, 2), (3, 4)].into_iter();
        assert_eq!(split_fields(6, 2, false, || Ok(hits.next())).unwrap(), vec![(0, 1), (2, 6)]);
        assert_eq!(split_empty_subject(false, -1).len(), 1);
        assert!(split_empty_subject(false, 0).is_empty());
    }
}
