// brkiter.rs - Break iterator options and the boundary walker.
//
// Boundaries of the attached text are computed once per subject by an
// `icu_segmenter` segmenter, each tagged with a rule status in the
// ranges used by ICU's `UBRK_*` tags. `next`/`previous` then walk that
// table, skipping boundaries whose status falls in the configured skip
// ranges.

use std::fmt;
use std::str::FromStr;

use icu_locid::Locale;
use icu_segmenter::{
    GraphemeClusterSegmenter, LineBreakOptions, LineSegmenter, SentenceSegmenter, WordSegmenter,
    WordType,
};
use smallvec::SmallVec;

use crate::context::Context;
use crate::error::StriError;
use crate::options::{OptionBag, OptionValue};

/// Rule status values and range limits.
pub mod status {
    pub const WORD_NONE: i32 = 0;
    pub const WORD_NONE_LIMIT: i32 = 100;
    pub const WORD_NUMBER: i32 = 100;
    pub const WORD_NUMBER_LIMIT: i32 = 200;
    pub const WORD_LETTER: i32 = 200;
    pub const WORD_LETTER_LIMIT: i32 = 300;
    pub const WORD_KANA: i32 = 300;
    pub const WORD_KANA_LIMIT: i32 = 400;
    pub const WORD_IDEO: i32 = 400;
    pub const WORD_IDEO_LIMIT: i32 = 500;

    pub const LINE_SOFT: i32 = 0;
    pub const LINE_SOFT_LIMIT: i32 = 100;
    pub const LINE_HARD: i32 = 100;
    pub const LINE_HARD_LIMIT: i32 = 200;

    pub const SENTENCE_TERM: i32 = 0;
    pub const SENTENCE_TERM_LIMIT: i32 = 100;
    pub const SENTENCE_SEP: i32 = 100;
    pub const SENTENCE_SEP_LIMIT: i32 = 200;
}

/// Kind of text boundary to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakIterKind {
    Character,
    LineBreak,
    Sentence,
    Word,
}

impl BreakIterKind {
    const NAMES: [(&'static str, BreakIterKind); 4] = [
        ("character", BreakIterKind::Character),
        ("line_break", BreakIterKind::LineBreak),
        ("sentence", BreakIterKind::Sentence),
        ("word", BreakIterKind::Word),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BreakIterKind::Character => "character",
            BreakIterKind::LineBreak => "line_break",
            BreakIterKind::Sentence => "sentence",
            BreakIterKind::Word => "word",
        }
    }
}

impl FromStr for BreakIterKind {
    type Err = StriError;

    /// Accepts a full name or an unambiguous prefix (`"line"`, `"char"`).
    fn from_str(s: &str) -> Result<Self, StriError> {
        let mut found = None;
        for (name, kind) in Self::NAMES {
            if name == s {
                return Ok(kind);
            }
            if !s.is_empty() && name.starts_with(s) {
                if found.is_some() {
                    return Err(StriError::argument("type", format!("ambiguous value `{}`", s)));
                }
                found = Some(kind);
            }
        }
        found.ok_or_else(|| StriError::argument("type", format!("incorrect value `{}`", s)))
    }
}

impl fmt::Display for BreakIterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule-status ranges `[lo, hi)` whose boundaries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipRules {
    ranges: SmallVec<[i32; 10]>,
}

impl SkipRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_range(&mut self, lo: i32, hi: i32) {
        self.ranges.push(lo);
        self.ranges.push(hi);
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// True if `status` lies in one of the ranges.
    pub fn contains(&self, status: i32) -> bool {
        self.ranges
            .chunks_exact(2)
            .any(|r| status >= r[0] && status < r[1])
    }

    /// Flat `lo, hi, lo, hi, ...` list; always even length.
    pub fn as_slice(&self) -> &[i32] {
        &self.ranges
    }
}

/// Break iterator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrkIterOptions {
    pub kind: BreakIterKind,
    /// `None` selects the context locale.
    pub locale: Option<String>,
    pub skip: SkipRules,
}

impl BrkIterOptions {
    pub fn new(kind: BreakIterKind) -> Self {
        BrkIterOptions {
            kind,
            locale: None,
            skip: SkipRules::new(),
        }
    }

    /// Parse `type`, `locale` and the `skip_*` toggles; other names are
    /// ignored. `default_kind` applies when `type` is absent.
    pub fn from_bag(bag: &OptionBag, default_kind: BreakIterKind) -> Result<Self, StriError> {
        let mut opts = BrkIterOptions::new(default_kind);
        for (name, value) in bag.iter() {
            let range = match name {
                "type" => {
                    opts.kind = value.as_str(name)?.parse()?;
                    continue;
                }
                "locale" => {
                    opts.locale = match value {
                        OptionValue::Null => None,
                        v => Some(v.as_str(name)?.to_string()),
                    };
                    continue;
                }
                "skip_word_none" => (status::WORD_NONE, status::WORD_NONE_LIMIT),
                "skip_word_number" => (status::WORD_NUMBER, status::WORD_NUMBER_LIMIT),
                "skip_word_letter" => (status::WORD_LETTER, status::WORD_LETTER_LIMIT),
                "skip_word_kana" => (status::WORD_KANA, status::WORD_KANA_LIMIT),
                "skip_word_ideo" => (status::WORD_IDEO, status::WORD_IDEO_LIMIT),
                "skip_line_soft" => (status::LINE_SOFT, status::LINE_SOFT_LIMIT),
                "skip_line_hard" => (status::LINE_HARD, status::LINE_HARD_LIMIT),
                "skip_sentence_term" => (status::SENTENCE_TERM, status::SENTENCE_TERM_LIMIT),
                "skip_sentence_sep" => (status::SENTENCE_SEP, status::SENTENCE_SEP_LIMIT),
                _ => continue,
            };
            if value.as_bool(name)? {
                opts.skip.push_range(range.0, range.1);
            }
        }
        Ok(opts)
    }

    /// Shorthand for word boundaries between words only.
    pub fn words_only() -> Self {
        let mut opts = BrkIterOptions::new(BreakIterKind::Word);
        opts.skip.push_range(status::WORD_NONE, status::WORD_NONE_LIMIT);
        opts
    }
}

#[derive(Debug)]
enum Segmenter {
    Character(GraphemeClusterSegmenter),
    Line(LineSegmenter),
    Sentence(SentenceSegmenter),
    Word(WordSegmenter),
}

impl Segmenter {
    fn open(kind: BreakIterKind, locale: &Locale) -> Self {
        log::debug!("opening {} segmenter for locale {}", kind, locale);
        match kind {
            BreakIterKind::Character => Segmenter::Character(GraphemeClusterSegmenter::new()),
            BreakIterKind::LineBreak => {
                let mut options = LineBreakOptions::default();
                let lang = locale.id.language.as_str();
                options.ja_zh = lang == "ja" || lang == "zh";
                Segmenter::Line(LineSegmenter::new_auto_with_options(options))
            }
            BreakIterKind::Sentence => Segmenter::Sentence(SentenceSegmenter::new()),
            BreakIterKind::Word => Segmenter::Word(WordSegmenter::new_auto()),
        }
    }

    /// All boundaries of `text` with their rule status, starting at 0.
    fn boundaries(&self, text: &str, out: &mut Vec<(usize, i32)>) {
        out.clear();
        match self {
            Segmenter::Character(seg) => out.extend(seg.segment_str(text).map(|b| (b, 0))),
            Segmenter::Line(seg) => {
                out.extend(seg.segment_str(text).map(|b| (b, line_status(text, b))));
            }
            Segmenter::Sentence(seg) => {
                let mut prev = 0;
                for b in seg.segment_str(text) {
                    out.push((b, sentence_status(&text[prev..b])));
                    prev = b;
                }
            }
            Segmenter::Word(seg) => {
                let mut it = seg.segment_str(text);
                let mut prev = 0;
                while let Some(b) = it.next() {
                    out.push((b, word_status(it.word_type(), &text[prev..b])));
                    prev = b;
                }
            }
        }
        if out.first().map(|&(b, _)| b) != Some(0) {
            out.insert(0, (0, 0));
        }
        out[0].1 = 0;
        out.dedup_by_key(|&mut (b, _)| b);
    }
}

fn is_kana(c: char) -> bool {
    matches!(c as u32, 0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F)
}

fn is_ideographic(c: char) -> bool {
    matches!(
        c as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x3134F
    )
}

fn word_status(word_type: WordType, segment: &str) -> i32 {
    match word_type {
        WordType::Number => status::WORD_NUMBER,
        WordType::Letter => match segment.chars().next() {
            Some(c) if is_kana(c) => status::WORD_KANA,
            Some(c) if is_ideographic(c) => status::WORD_IDEO,
            _ => status::WORD_LETTER,
        },
        _ => status::WORD_NONE,
    }
}

fn line_status(text: &str, boundary: usize) -> i32 {
    match text[..boundary].chars().next_back() {
        Some('\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}') => {
            status::LINE_HARD
        }
        _ => status::LINE_SOFT,
    }
}

fn sentence_status(segment: &str) -> i32 {
    let core = segment.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '"' | '\'' | ')' | ']' | '}' | '’' | '”' | '»' | '」' | '』')
    });
    match core.chars().next_back() {
        Some(
            '.' | '!' | '?' | '。' | '！' | '？' | '｡' | '…' | '‼' | '⁇' | '⁈' | '⁉' | '؟' | '।'
            | '॥',
        ) => status::SENTENCE_TERM,
        _ => status::SENTENCE_SEP,
    }
}

/// Iterator state over the attached text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    /// No text attached yet.
    Unopened,
    /// Positioned at the first or last boundary.
    Ready,
    /// Moved by `next` or `previous`.
    Positioned,
    /// Walked off either end.
    Done,
}

/// Boundary walker with skip-rule filtering.
///
/// The segmenter is opened on the first [`setup_matcher`](Self::setup_matcher)
/// and reused for every later subject.
///
/// ```
/// use strivec::brkiter::{BrkIterOptions, RuleBasedBreakIterator};
/// use strivec::Context;
///
/// let ctx = Context::default();
/// let mut it = RuleBasedBreakIterator::new(&ctx, BrkIterOptions::words_only()).unwrap();
/// it.setup_matcher("hello world");
/// it.first().unwrap();
/// assert_eq!(it.next().unwrap(), Some((0, 5)));
/// assert_eq!(it.next().unwrap(), Some((6, 11)));
/// assert_eq!(it.next().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct RuleBasedBreakIterator {
    opts: BrkIterOptions,
    locale: Locale,
    segmenter: Option<Segmenter>,
    boundaries: Vec<(usize, i32)>,
    cursor: usize,
    state: IterState,
}

impl RuleBasedBreakIterator {
    /// Resolves the locale immediately; the segmenter opens lazily.
    pub fn new(ctx: &Context, opts: BrkIterOptions) -> Result<Self, StriError> {
        let locale = ctx.resolve_locale(opts.locale.as_deref())?;
        Ok(RuleBasedBreakIterator {
            opts,
            locale,
            segmenter: None,
            boundaries: Vec::new(),
            cursor: 0,
            state: IterState::Unopened,
        })
    }

    pub fn options(&self) -> &BrkIterOptions {
        &self.opts
    }

    pub fn state(&self) -> IterState {
        self.state
    }

    /// Attach a new subject and move to its first boundary.
    pub fn setup_matcher(&mut self, text: &str) {
        let kind = self.opts.kind;
        let locale = &self.locale;
        let segmenter = self
            .segmenter
            .get_or_insert_with(|| Segmenter::open(kind, locale));
        segmenter.boundaries(text, &mut self.boundaries);
        self.cursor = 0;
        self.state = IterState::Ready;
    }

    /// Every boundary of the attached text with its rule status, unfiltered.
    pub fn raw_boundaries(&self) -> &[(usize, i32)] {
        &self.boundaries
    }

    /// Move to the start of the text; returns 0.
    pub fn first(&mut self) -> Result<usize, StriError> {
        contract!(
            self.state != IterState::Unopened,
            "break iterator used before a subject was attached"
        );
        self.cursor = 0;
        self.state = IterState::Ready;
        Ok(0)
    }

    /// Move to the end of the text; returns its byte length.
    pub fn last(&mut self) -> Result<usize, StriError> {
        self.first()?;
        self.cursor = self.boundaries.len().saturating_sub(1);
        Ok(self.boundaries.get(self.cursor).map_or(0, |&(b, _)| b))
    }

    /// Advance to the next boundary that is not skipped.
    pub fn next_boundary(&mut self) -> Result<Option<usize>, StriError> {
        Ok(self.next()?.map(|(_, end)| end))
    }

    /// Advance past the next non-skipped boundary, returning the span
    /// from the last boundary passed (skipped or not) to it.
    pub fn next(&mut self) -> Result<Option<(usize, usize)>, StriError> {
        contract!(
            self.state != IterState::Unopened,
            "break iterator used before a subject was attached"
        );
        let Some(&(mut last, _)) = self.boundaries.get(self.cursor) else {
            self.state = IterState::Done;
            return Ok(None);
        };
        while self.cursor + 1 < self.boundaries.len() {
            self.cursor += 1;
            let (pos, status) = self.boundaries[self.cursor];
            if !self.opts.skip.contains(status) {
                self.state = IterState::Positioned;
                return Ok(Some((last, pos)));
            }
            last = pos;
        }
        self.state = IterState::Done;
        Ok(None)
    }

    /// Step back from the current boundary. The span ends at the first
    /// non-skipped boundary at or before the cursor and starts at the
    /// boundary before it.
    pub fn previous(&mut self) -> Result<Option<(usize, usize)>, StriError> {
        contract!(
            self.state != IterState::Unopened,
            "break iterator used before a subject was attached"
        );
        while let Some(&(pos, status)) = self.boundaries.get(self.cursor) {
            if self.cursor == 0 {
                break;
            }
            self.cursor -= 1;
            if !self.opts.skip.contains(status) {
                self.state = IterState::Positioned;
                return Ok(Some((self.boundaries[self.cursor].0, pos)));
            }
        }
        self.state = IterState::Done;
        Ok(None)
    }
}
