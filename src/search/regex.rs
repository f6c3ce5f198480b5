// search/regex.rs - Regex search operations.

use crate::container::{recycling_rule, IntContainer, RegexMatcher, RegexPatternContainer, Utf8Container};
use crate::context::Context;
use crate::error::{StatusCode, StriError};
use crate::host::NativeString;
use crate::options::RegexOptions;
use crate::search::{
    no_match, screen, split_empty_subject, split_fields, utf8_spans, Screen, SpanForm, SpanMatrix,
    SpanRow, StringList,
};

/// Subjects and patterns recycled to a common length.
struct Prepared<'a> {
    n: usize,
    subjects: Utf8Container<'a>,
    patterns: RegexPatternContainer<'a>,
}

impl<'a> Prepared<'a> {
    fn new(
        ctx: &Context,
        str: &'a [Option<NativeString>],
        pattern: &'a [Option<NativeString>],
        extra: &[usize],
        opts: &RegexOptions,
    ) -> Result<Self, StriError> {
        let mut lengths = vec![str.len(), pattern.len()];
        lengths.extend_from_slice(extra);
        let n = recycling_rule(ctx, true, &lengths);
        Ok(Prepared {
            n,
            subjects: Utf8Container::new(ctx, str, n, true)?,
            patterns: RegexPatternContainer::new(ctx, pattern, n, *opts)?,
        })
    }

    fn screen(&self, i: usize) -> Screen {
        screen(
            self.subjects.is_na(i),
            self.subjects.get(i).map_or(true, |s| s.is_empty()),
            self.patterns.is_na_or_empty(i),
        )
    }

    /// Subject `i` and its matcher, reset to the subject's start.
    fn matcher(&mut self, i: usize) -> Result<(&str, &mut RegexMatcher), StriError> {
        let subject = self.subjects.get(i)?.as_str();
        let m = self.patterns.get_matcher(i)?;
        m.reset();
        Ok((subject, m))
    }
}

/// All non-overlapping match spans in `text`, in bytes.
fn all_spans(m: &mut RegexMatcher, text: &str) -> Result<Vec<(usize, usize)>, StriError> {
    let mut spans = Vec::new();
    while m.find(text)? {
        if let Some(span) = m.span() {
            spans.push(span);
        }
    }
    Ok(spans)
}

/// Whether each subject contains a match.
pub fn detect(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &RegexOptions,
) -> Result<Vec<Option<bool>>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        ret.push(match p.screen(i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(false),
            Screen::Search => {
                let (text, m) = p.matcher(i)?;
                Some(m.find(text)?)
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
    opts: &RegexOptions,
) -> Result<Vec<Option<i32>>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        ret.push(match p.screen(i) {
            Screen::Na => None,
            Screen::EmptySubject => Some(0),
            Screen::Search => {
                let (text, m) = p.matcher(i)?;
                let mut found = 0;
                while m.find(text)? {
                    found += 1;
                }
                Some(found)
            }
        });
    }
    Ok(ret)
}

/// Code point spans of all matches.
///
/// A subject with no match gives one NA row, or no rows with
/// `omit_no_match`. An NA subject or pattern always gives one NA row.
pub fn locate_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    form: SpanForm,
    opts: &RegexOptions,
) -> Result<Vec<SpanMatrix>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        ret.push(match p.screen(i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => no_match(omit_no_match),
            Screen::Search => {
                let (text, m) = p.matcher(i)?;
                let spans = all_spans(m, text)?;
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

fn locate_one(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    opts: &RegexOptions,
    last: bool,
) -> Result<Vec<SpanRow>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        if p.screen(i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let (text, m) = p.matcher(i)?;
        let span = if last {
            m.find_last(text)?
        } else if m.find(text)? {
            m.span()
        } else {
            None
        };
        ret.push(match span {
            Some(span) => utf8_spans(text, &[span], form)?.pop().flatten(),
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
    opts: &RegexOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, opts, false)
}

/// Code point span of the last match, NA if none.
pub fn locate_last(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    form: SpanForm,
    opts: &RegexOptions,
) -> Result<Vec<SpanRow>, StriError> {
    locate_one(ctx, str, pattern, form, opts, true)
}

/// Text of every match. No match gives `[NA]`, or `[]` with `omit_no_match`.
pub fn extract_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    omit_no_match: bool,
    opts: &RegexOptions,
) -> Result<StringList, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let none = |omit: bool| if omit { Vec::new() } else { vec![None] };
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        ret.push(match p.screen(i) {
            Screen::Na => vec![None],
            Screen::EmptySubject => none(omit_no_match),
            Screen::Search => {
                let (text, m) = p.matcher(i)?;
                let found: Vec<_> = all_spans(m, text)?
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

/// Text of the first match, NA if none.
pub fn extract_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &RegexOptions,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        if p.screen(i) != Screen::Search {
            ret.push(None);
            continue;
        }
        let (text, m) = p.matcher(i)?;
        ret.push(if m.find(text)? {
            m.span().map(|(s, e)| NativeString::utf8(&text[s..e]))
        } else {
            None
        });
    }
    Ok(ret)
}

/// Append `template` to `out`, substituting `$n`, `${name}` and `\x`.
///
/// The first digit after `$` always belongs to the group number; further
/// digits are taken while the number stays a valid group.
fn expand_replacement(
    out: &mut String,
    template: &str,
    text: &str,
    m: &RegexMatcher,
    names: &[String],
) -> Result<(), StriError> {
    let bad = |msg: &str| {
        StriError::status(StatusCode::IllegalArgument, msg).with_context(template)
    };
    let push_group = |out: &mut String, k: usize| -> Result<(), StriError> {
        if k > m.group_count() {
            return Err(bad("capture group index out of bounds"));
        }
        if let Some((s, e)) = m.group(k) {
            out.push_str(&text[s..e]);
        }
        Ok(())
    };

    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' => match chars.peek().copied() {
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => return Err(bad("unterminated capture group name")),
                        }
                    }
                    let k = match name.parse::<usize>() {
                        Ok(k) => k,
                        Err(_) => names
                            .iter()
                            .position(|g| *g == name)
                            .map(|p| p + 1)
                            .ok_or_else(|| bad("unknown capture group name"))?,
                    };
                    push_group(out, k)?;
                }
                Some(d) if d.is_ascii_digit() => {
                    chars.next();
                    let mut k = d as usize - '0' as usize;
                    while let Some(next) = chars.peek().and_then(|c| c.to_digit(10)) {
                        let wider = k * 10 + next as usize;
                        if wider > m.group_count() {
                            break;
                        }
                        k = wider;
                        chars.next();
                    }
                    push_group(out, k)?;
                }
                _ => return Err(bad("`$` not followed by a capture group reference")),
            },
            _ => out.push(c),
        }
    }
    Ok(())
}

/// Replace every match, expanding group references in the replacement.
pub fn replace_all(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    replacement: &[Option<NativeString>],
    opts: &RegexOptions,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[replacement.len()], opts)?;
    let replacements = Utf8Container::new(ctx, replacement, p.n, true)?;
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        match p.screen(i) {
            Screen::Na => {
                ret.push(None);
                continue;
            }
            Screen::EmptySubject => {
                ret.push(p.subjects.to_host(i));
                continue;
            }
            Screen::Search => {}
        }
        if replacements.is_na(i) {
            ret.push(None);
            continue;
        }
        let template = replacements.get(i)?.as_str();
        let names = if template.contains("${") {
            p.patterns.capture_group_names(i)?.to_vec()
        } else {
            Vec::new()
        };
        let (text, m) = p.matcher(i)?;
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        while m.find(text)? {
            let Some((s, e)) = m.span() else { break };
            out.push_str(&text[last..s]);
            expand_replacement(&mut out, template, text, m, &names)?;
            last = e;
        }
        out.push_str(&text[last..]);
        ret.push(Some(NativeString::utf8(&out)));
    }
    Ok(ret)
}

/// Split each subject at matches.
///
/// `n_max` bounds the number of pieces (negative: unlimited, `0`: none,
/// NA: NA result). With `omit_empty`, empty pieces are dropped.
pub fn split(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    n_max: &[Option<i32>],
    omit_empty: bool,
    opts: &RegexOptions,
) -> Result<StringList, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[n_max.len()], opts)?;
    let n_max = IntContainer::new(n_max, p.n);
    let mut ret = Vec::with_capacity(p.n);
    for i in p.patterns.vectorize() {
        let Some(limit) = n_max.get(i) else {
            ret.push(vec![None]);
            continue;
        };
        match p.screen(i) {
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

        let (text, m) = p.matcher(i)?;
        let fields = split_fields(text.len(), limit, omit_empty, || {
            Ok(if m.find(text)? { m.span() } else { None })
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

/// Whole match and capture groups of the first match in each subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTable {
    /// Column names: `""` for the whole match, then group names
    /// (`""` for unnamed groups) of the widest pattern.
    pub names: Vec<String>,
    /// One row per subject, padded with NA to the widest pattern.
    pub rows: Vec<Vec<Option<NativeString>>>,
}

/// First match plus its capture groups; unmatched groups are NA.
pub fn match_first(
    ctx: &Context,
    str: &[Option<NativeString>],
    pattern: &[Option<NativeString>],
    opts: &RegexOptions,
) -> Result<MatchTable, StriError> {
    let mut p = Prepared::new(ctx, str, pattern, &[], opts)?;
    let mut rows = Vec::with_capacity(p.n);
    let mut names = vec![String::new()];
    for i in p.patterns.vectorize() {
        let sc = p.screen(i);
        if sc == Screen::Na && p.patterns.is_na_or_empty(i) {
            rows.push(vec![None]);
            continue;
        }
        let groups = p.patterns.get_matcher(i)?.group_count();
        if groups + 1 > names.len() {
            names = std::iter::once(String::new())
                .chain(p.patterns.capture_group_names(i)?.iter().cloned())
                .collect();
            names.resize(groups + 1, String::new());
        }
        if sc != Screen::Search {
            rows.push(vec![None; groups + 1]);
            continue;
        }
        let (text, m) = p.matcher(i)?;
        rows.push(if m.find(text)? {
            m.groups()
                .into_iter()
                .map(|g| g.map(|(s, e)| NativeString::utf8(&text[s..e])))
                .collect()
        } else {
            vec![None; groups + 1]
        });
    }
    for row in &mut rows {
        row.resize(names.len(), None);
    }
    Ok(MatchTable { names, rows })
}
