// regex.rs - Regex pattern container.
//
// Patterns are compiled at most once per physical slot and memoized for
// the lifetime of the container. The stateful matcher (search position,
// capture slots) lives in a single-slot keyed cache and is rebuilt only
// when the slot changes; callers reset it for every new subject.
//
// A pattern runs on the `regex` automaton when it can. Look-around and
// backreferences fall up to the `fancy_regex` backtracking engine.

use std::borrow::Cow;

use regex::{CaptureLocations, Regex, RegexBuilder};
use smallvec::SmallVec;

use crate::cache::KeyedCache;
use crate::container::base::Vectorize;
use crate::container::utf8::Utf8Container;
use crate::context::{Context, Warning};
use crate::error::{StatusCode, StriError};
use crate::host::NativeString;
use crate::options::{RegexFlags, RegexOptions};

/// Byte spans of capture groups; index 0 is the whole match.
pub type GroupSpans = SmallVec<[Option<(usize, usize)>; 8]>;

/// Letters with a meaning after a backslash.
const KNOWN_ESCAPES: &str = "aAbBcdDeEfGhHknNpPQrRsStuUvVwWxXzZ";

// === CompiledRegex ===

/// A compiled pattern on whichever engine accepted it.
#[derive(Debug, Clone)]
pub enum CompiledRegex {
    Automaton(Regex),
    Backtracking(fancy_regex::Regex),
}

impl CompiledRegex {
    /// Source handed to the engine.
    pub fn as_str(&self) -> &str {
        match self {
            CompiledRegex::Automaton(re) => re.as_str(),
            CompiledRegex::Backtracking(re) => re.as_str(),
        }
    }

    pub fn is_backtracking(&self) -> bool {
        matches!(self, CompiledRegex::Backtracking(_))
    }

    /// Number of groups, counting the whole match.
    fn captures_len(&self) -> usize {
        match self {
            CompiledRegex::Automaton(re) => re.captures_len(),
            CompiledRegex::Backtracking(re) => re.captures_len(),
        }
    }

    /// Names of groups `1..`, `""` for unnamed ones.
    pub fn capture_names(&self) -> Vec<String> {
        let name = |n: Option<&str>| n.unwrap_or("").to_string();
        match self {
            CompiledRegex::Automaton(re) => re.capture_names().skip(1).map(name).collect(),
            CompiledRegex::Backtracking(re) => re.capture_names().skip(1).map(name).collect(),
        }
    }
}

// === RegexMatcher ===

/// A compiled pattern plus iteration state over one subject.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: CompiledRegex,
    locs: Option<CaptureLocations>,
    groups: GroupSpans,
    pos: usize,
    last_was_empty: bool,
    span: Option<(usize, usize)>,
}

impl RegexMatcher {
    fn new(regex: CompiledRegex) -> Self {
        let locs = match &regex {
            CompiledRegex::Automaton(re) => Some(re.capture_locations()),
            CompiledRegex::Backtracking(_) => None,
        };
        RegexMatcher {
            regex,
            locs,
            groups: GroupSpans::new(),
            pos: 0,
            last_was_empty: false,
            span: None,
        }
    }

    pub fn regex(&self) -> &CompiledRegex {
        &self.regex
    }

    /// Forget the previous subject and search from its start.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.last_was_empty = false;
        self.span = None;
        self.groups.clear();
    }

    /// Fill `groups` with the first match at or after `pos`.
    fn search_at(&mut self, text: &str) -> Result<bool, StriError> {
        self.groups.clear();
        match (&self.regex, self.locs.as_mut()) {
            (CompiledRegex::Automaton(re), Some(locs)) => {
                if re.captures_read_at(locs, text, self.pos).is_none() {
                    return Ok(false);
                }
                self.groups.extend((0..locs.len()).map(|k| locs.get(k)));
            }
            (CompiledRegex::Backtracking(re), _) => {
                let Some(caps) = re.captures_from_pos(text, self.pos)? else {
                    return Ok(false);
                };
                self.groups
                    .extend((0..caps.len()).map(|k| caps.get(k).map(|m| (m.start(), m.end()))));
            }
            (CompiledRegex::Automaton(_), None) => {
                return Err(StriError::Internal("automaton matcher without capture slots".into()))
            }
        }
        Ok(true)
    }

    /// Advance to the next non-overlapping match in `text`.
    ///
    /// `text` must be the same subject on every call between resets.
    pub fn find(&mut self, text: &str) -> Result<bool, StriError> {
        loop {
            if self.pos > text.len() || !self.search_at(text)? {
                self.pos = text.len() + 1;
                self.span = None;
                return Ok(false);
            }
            let Some(Some((start, end))) = self.groups.first().copied() else {
                return Err(StriError::Internal("match without a whole-match span".into()));
            };

            if start == end {
                if self.last_was_empty {
                    // Empty match right after an empty match: step over one char.
                    if self.pos >= text.len() {
                        self.pos = text.len() + 1;
                        self.span = None;
                        return Ok(false);
                    }
                    self.pos += text[self.pos..].chars().next().map_or(1, char::len_utf8);
                    self.last_was_empty = false;
                    continue;
                }
                self.last_was_empty = true;
            } else {
                self.last_was_empty = false;
            }

            self.pos = end;
            self.span = Some((start, end));
            return Ok(true);
        }
    }

    /// Byte span of the current match.
    pub fn span(&self) -> Option<(usize, usize)> {
        self.span
    }

    /// Number of capture groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }

    /// Byte span of group `k` in the current match; `None` if it did not
    /// participate.
    pub fn group(&self, k: usize) -> Option<(usize, usize)> {
        self.span?;
        self.groups.get(k).copied().flatten()
    }

    /// Spans of all groups of the current match.
    pub fn groups(&self) -> GroupSpans {
        (0..=self.group_count()).map(|k| self.group(k)).collect()
    }

    /// Span of the last match in `text`. Resets the matcher first.
    pub fn find_last(&mut self, text: &str) -> Result<Option<(usize, usize)>, StriError> {
        self.reset();
        let mut last = None;
        let mut last_groups = GroupSpans::new();
        while self.find(text)? {
            last = self.span;
            last_groups.clone_from(&self.groups);
        }
        self.groups = last_groups;
        self.span = last;
        Ok(last)
    }
}

// === RegexPatternContainer ===

/// Patterns for one vectorized regex operation.
///
/// ```
/// use strivec::container::RegexPatternContainer;
/// use strivec::{host_vec, Context, RegexOptions};
///
/// let ctx = Context::default();
/// let pats = host_vec(&[Some("a+"), Some("b+")]);
/// let mut c = RegexPatternContainer::new(&ctx, &pats, 4, RegexOptions::default()).unwrap();
/// for i in c.vectorize() {
///     let m = c.get_matcher(i).unwrap();
///     m.reset();
/// }
/// assert_eq!(c.compilations(), 2);
/// ```
#[derive(Debug)]
pub struct RegexPatternContainer<'a> {
    patterns: Utf8Container<'a>,
    opts: RegexOptions,
    compiled: Vec<Option<CompiledRegex>>,
    compilations: usize,
    matcher: KeyedCache<RegexMatcher>,
    names: KeyedCache<Vec<String>>,
}

impl<'a> RegexPatternContainer<'a> {
    /// Warns once for every empty, non-NA pattern.
    pub fn new(
        ctx: &Context,
        values: &'a [Option<NativeString>],
        nrecycle: usize,
        opts: RegexOptions,
    ) -> Result<Self, StriError> {
        let patterns = Utf8Container::new(ctx, values, nrecycle, true)?;
        for slot in 0..patterns.n() {
            if !patterns.is_na(slot) && patterns.get(slot)?.is_empty() {
                ctx.warn(Warning::EmptyPattern);
            }
        }
        if opts.flags.contains(RegexFlags::UWORD) {
            ctx.warn(Warning::UnsupportedOption {
                name: "uword".to_string(),
            });
        }
        if opts.time_limit > 0 {
            log::debug!("regex time_limit={} is recorded but not enforced", opts.time_limit);
        }
        Ok(RegexPatternContainer {
            compiled: vec![None; patterns.n()],
            patterns,
            opts,
            compilations: 0,
            matcher: KeyedCache::new(),
            names: KeyedCache::new(),
        })
    }

    pub fn patterns(&self) -> &Utf8Container<'a> {
        &self.patterns
    }

    pub fn n(&self) -> usize {
        self.patterns.n()
    }

    pub fn vectorize(&self) -> Vectorize {
        self.patterns.vectorize()
    }

    pub fn is_na(&self, i: usize) -> bool {
        self.patterns.is_na(i)
    }

    /// True if pattern `i` is NA or empty.
    pub fn is_na_or_empty(&self, i: usize) -> bool {
        self.patterns.is_na(i) || self.patterns.get(i).map_or(true, |s| s.is_empty())
    }

    /// Number of pattern compilations so far.
    pub fn compilations(&self) -> usize {
        self.compilations
    }

    /// Compiled pattern `i`, built on first use of its slot.
    fn compiled(&mut self, i: usize) -> Result<(usize, CompiledRegex), StriError> {
        let slot = self.patterns.base().slot(i)?;
        if let Some(re) = &self.compiled[slot] {
            return Ok((slot, re.clone()));
        }
        let re = compile(self.patterns.get(i)?.as_str(), &self.opts)?;
        self.compilations += 1;
        self.compiled[slot] = Some(re.clone());
        Ok((slot, re))
    }

    /// Matcher for pattern `i`, compiled on first use of its slot.
    ///
    /// A matcher from the previous call is returned unchanged when `i`
    /// maps to the same slot; call [`RegexMatcher::reset`] before
    /// searching a new subject.
    pub fn get_matcher(&mut self, i: usize) -> Result<&mut RegexMatcher, StriError> {
        let (slot, regex) = self.compiled(i)?;
        self.matcher.get_or_rebuild(
            slot,
            |_| {
                log::trace!("regex matcher rebuilt for pattern slot {}", slot);
                Ok(RegexMatcher::new(regex))
            },
            |_| Ok(()),
        )
    }

    /// Capture group names of pattern `i`, `""` for unnamed groups.
    pub fn capture_group_names(&mut self, i: usize) -> Result<&[String], StriError> {
        let (slot, regex) = self.compiled(i)?;
        let names = self
            .names
            .get_or_rebuild(slot, |_| Ok::<_, StriError>(regex.capture_names()), |_| Ok(()))?;
        Ok(names.as_slice())
    }
}

/// Compile one pattern with container-wide options.
pub fn compile(pattern: &str, opts: &RegexOptions) -> Result<CompiledRegex, StriError> {
    let flags = opts.flags;
    let source = if flags.contains(RegexFlags::LITERAL) {
        Cow::Owned(regex::escape(pattern))
    } else {
        resolve_escapes(pattern, flags.contains(RegexFlags::ERROR_ON_UNKNOWN_ESCAPES))?
    };
    log::debug!("compiling regex `{}` with {:?}", pattern, flags);
    let built = RegexBuilder::new(&source)
        .case_insensitive(flags.contains(RegexFlags::CASE_INSENSITIVE))
        .ignore_whitespace(flags.contains(RegexFlags::COMMENTS))
        .dot_matches_new_line(flags.contains(RegexFlags::DOTALL))
        .multi_line(flags.contains(RegexFlags::MULTILINE))
        .crlf(!flags.contains(RegexFlags::UNIX_LINES))
        .build();
    match built {
        Ok(re) => Ok(CompiledRegex::Automaton(re)),
        Err(err @ regex::Error::Syntax(_)) => match compile_backtracking(&source, opts) {
            Ok(re) => {
                log::debug!("regex `{}` needs backtracking", pattern);
                Ok(CompiledRegex::Backtracking(re))
            }
            Err(_) => Err(StriError::from(err).with_context(pattern)),
        },
        Err(err) => Err(StriError::from(err).with_context(pattern)),
    }
}

/// Flags travel inline. Each KiB of `stack_limit` allows 1024
/// backtracking steps.
fn compile_backtracking(
    source: &str,
    opts: &RegexOptions,
) -> Result<fancy_regex::Regex, fancy_regex::Error> {
    let inline: String = [
        (RegexFlags::CASE_INSENSITIVE, 'i'),
        (RegexFlags::MULTILINE, 'm'),
        (RegexFlags::DOTALL, 's'),
        (RegexFlags::COMMENTS, 'x'),
    ]
    .into_iter()
    .filter(|(flag, _)| opts.flags.contains(*flag))
    .map(|(_, c)| c)
    .collect();
    let source = if inline.is_empty() {
        source.to_string()
    } else {
        format!("(?{}){}", inline, source)
    };
    let mut builder = fancy_regex::RegexBuilder::new(&source);
    if opts.stack_limit > 0 {
        builder.backtrack_limit(opts.stack_limit as usize * 1024);
    }
    builder.build()
}

/// Turn `\` + letter escapes with no meaning into the bare letter, or
/// reject them when `strict`. `\e` becomes `\x1B`.
pub fn resolve_escapes(pattern: &str, strict: bool) -> Result<Cow<'_, str>, StriError> {
    if !pattern.contains('\\') {
        return Ok(Cow::Borrowed(pattern));
    }
    let mut out = String::with_capacity(pattern.len());
    let mut changed = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(e) if e.is_ascii_alphabetic() && !KNOWN_ESCAPES.contains(e) => {
                if strict {
                    return Err(StriError::status(
                        StatusCode::RegexBadEscapeSequence,
                        format!("unrecognized escape sequence `\\{}`", e),
                    )
                    .with_context(pattern));
                }
                out.push(e);
                changed = true;
            }
            Some('e') => {
                out.push_str("\\x1B");
                changed = true;
            }
            Some(e) => {
                out.push('\\');
                out.push(e);
            }
            None => out.push('\\'),
        }
    }
    Ok(if changed { Cow::Owned(out) } else { Cow::Borrowed(pattern) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::host_vec;

    fn container<'a>(ctx: &Context, v: &'a [Option<NativeString>], nrecycle: usize) -> RegexPatternContainer<'a> {
        RegexPatternContainer::new(ctx, v, nrecycle, RegexOptions::default()).unwrap()
    }

    #[test]
    fn scenario_two_patterns_four_subjects() {
        let ctx = Context::default();
        let pats = host_vec(&[Some("a+"), Some("b+")]);
        let mut c = container(&ctx, &pats, 4);
        let mut seen = Vec::new();
        for i in c.vectorize() {
            let m = c.get_matcher(i).unwrap();
            seen.push(m.regex().as_str().to_string());
        }
        assert_eq!(seen, vec!["a+", "b+", "a+", "b+"]);
        assert_eq!(c.compilations(), 2);
    }

    #[test]
    fn two_passes_compile_once_per_slot() {
        let ctx = Context::default();
        let pats = host_vec(&[Some("x"), Some("y"), Some("z")]);
        let mut c = container(&ctx, &pats, 3);
        for _ in 0..2 {
            for i in 0..3 {
                c.get_matcher(i).unwrap();
            }
        }
        assert_eq!(c.compilations(), 3);
    }

    #[test]
    fn repeated_index_keeps_matcher_state() {
        let ctx = Context::default();
        let pats = host_vec(&[Some(r"\d")]);
        let mut c = container(&ctx, &pats, 1);
        let m = c.get_matcher(0).unwrap();
        m.reset();
        assert!(m.find("1 2").unwrap());
        let m = c.get_matcher(0).unwrap();
        assert!(m.find("1 2").unwrap());
        assert_eq!(m.span(), Some((2, 3)));
        assert!(!m.find("1 2").unwrap());
    }

    #[test]
    fn compile_error_carries_pattern() {
        let ctx = Context::default();
        let pats = host_vec(&[Some("ok"), Some("(unclosed")]);
        let mut c = container(&ctx, &pats, 2);
        assert!(c.get_matcher(0).is_ok());
        let err = c.get_matcher(1).unwrap_err();
        match err {
            StriError::Status { code, context, .. } => {
                assert_eq!(code, crate::error::StatusCode::RegexRuleSyntax);
                assert_eq!(context.as_deref(), Some("(unclosed"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn empty_patterns_warn_at_construction() {
        let ctx = Context::default();
        let pats = host_vec(&[Some(""), None, Some("a")]);
        let c = container(&ctx, &pats, 3);
        assert_eq!(ctx.take_warnings(), vec![Warning::EmptyPattern]);
        assert!(c.is_na_or_empty(0));
        assert!(c.is_na_or_empty(1));
        assert!(!c.is_na_or_empty(2));
    }

    fn matches(pattern: &str, flags: RegexFlags, text: &str) -> bool {
        let mut m = RegexMatcher::new(compile(pattern, &RegexOptions::new(flags)).unwrap());
        m.find(text).unwrap()
    }

    #[test]
    fn flags_are_applied() {
        let ci_literal = RegexFlags::CASE_INSENSITIVE | RegexFlags::LITERAL;
        assert!(matches("A.B", ci_literal, "xa.by"));
        assert!(!matches("A.B", ci_literal, "axb"));
        assert!(matches("^b", RegexFlags::MULTILINE, "a\nb"));
        assert!(matches("a.b", RegexFlags::DOTALL, "a\nb"));
        assert!(matches("a b # comment", RegexFlags::COMMENTS, "ab"));
    }

    #[test]
    fn flags_reach_the_backtracking_engine() {
        assert!(matches("(?<=A)B", RegexFlags::CASE_INSENSITIVE, "ab"));
        assert!(matches("(?<=a).b", RegexFlags::DOTALL, "a\nb"));
        assert!(!matches("(?<=a).b", RegexFlags::empty(), "a\nb"));
    }

    #[test]
    fn stack_limit_bounds_backtracking_only() {
        let opts = RegexOptions {
            stack_limit: 1,
            ..Default::default()
        };
        assert!(!compile(r"\w{1000}", &opts).unwrap().is_backtracking());

        let re = compile("(?i)(a|b|ab)*(?=c)", &opts).unwrap();
        assert!(re.is_backtracking());
        let mut m = RegexMatcher::new(re);
        let err = m.find(&"ab".repeat(30)).unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::RegexStackOverflow));
    }

    #[test]
    fn empty_matches_advance() {
        let re = compile("a*", &RegexOptions::default()).unwrap();
        let mut m = RegexMatcher::new(re);
        let mut spans = Vec::new();
        while m.find("baaa").unwrap() {
            spans.push(m.span().unwrap());
        }
        assert_eq!(spans, vec![(0, 0), (1, 4), (4, 4)]);
    }

    #[test]
    fn find_last_and_groups() {
        let re = compile(r"(\d)(x)?", &RegexOptions::default()).unwrap();
        let mut m = RegexMatcher::new(re);
        assert_eq!(m.find_last("1x 2 3x").unwrap(), Some((5, 7)));
        assert_eq!(m.group(1), Some((5, 6)));
        assert_eq!(m.group(2), Some((6, 7)));
        assert_eq!(m.group_count(), 2);
        m.reset();
        assert!(m.find("2").unwrap());
        assert_eq!(m.groups().as_slice(), &[Some((0, 1)), Some((0, 1)), None]);
    }

    #[test]
    fn group_names_come_from_the_engine() {
        let names = |p: &str, flags: RegexFlags| compile(p, &RegexOptions::new(flags)).unwrap().capture_names();
        assert_eq!(
            names(r"(?<year>\d{4})-(\d\d)(?:x)(?P<day>\d\d)", RegexFlags::empty()),
            vec!["year", "", "day"]
        );
        assert_eq!(names(r"[]a(](?<x>b)(c)", RegexFlags::empty()), vec!["x", ""]);
        assert_eq!(names("a # note (\n(?<x>b)", RegexFlags::COMMENTS), vec!["x"]);
        assert_eq!(names(r"(?<=a)(?<v>b)\k<v>", RegexFlags::empty()), vec!["v"]);
        assert!(names("(a)(b)", RegexFlags::LITERAL).is_empty());
    }

    #[test]
    fn look_around_and_backreferences_use_backtracking() {
        let re = compile(r"(?<=a)b", &RegexOptions::default()).unwrap();
        assert!(re.is_backtracking());
        let mut m = RegexMatcher::new(re);
        assert!(m.find("cbab").unwrap());
        assert_eq!(m.span(), Some((3, 4)));

        let mut m = RegexMatcher::new(compile(r"(\w)\1", &RegexOptions::default()).unwrap());
        assert_eq!(m.find_last("aab ccd").unwrap(), Some((4, 6)));
        assert_eq!(m.group(1), Some((4, 5)));
    }

    #[test]
    fn unknown_escapes_are_literal_by_default() {
        assert_eq!(resolve_escapes(r"\q\d\\y", false).unwrap(), r"q\d\\y");
        assert!(matches!(resolve_escapes(r"\d+", false).unwrap(), Cow::Borrowed(_)));
        assert_eq!(resolve_escapes(r"a\e", false).unwrap(), r"a\x1B");

        let mut m = RegexMatcher::new(compile(r"\q", &RegexOptions::default()).unwrap());
        assert!(m.find("aqa").unwrap());

        let strict = RegexOptions::new(RegexFlags::ERROR_ON_UNKNOWN_ESCAPES);
        let err = compile(r"x\q", &strict).unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::RegexBadEscapeSequence));
        assert!(compile(r"\d\w", &strict).is_ok());
    }

    #[test]
    fn capture_names_are_cached_per_slot() {
        let ctx = Context::default();
        let pats = host_vec(&[Some("(?<k>a)(b)")]);
        let mut c = container(&ctx, &pats, 3);
        assert_eq!(c.capture_group_names(0).unwrap(), &["k".to_string(), String::new()]);
        assert_eq!(c.capture_group_names(2).unwrap().len(), 2);
        assert_eq!(c.names.rebuilds(), 1);
    }
}
