// options.rs - Option bags and regex matcher options.
//
// An option bag is the host's loosely typed `list(name = value, ...)`.
// Typed option structs parse themselves from a bag, warning about names
// they do not recognize.

use bitflags::bitflags;

use crate::context::{Context, Warning};
use crate::error::StriError;

/// One option value as supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v as i64)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Str(v.to_string())
    }
}

impl OptionValue {
    pub(crate) fn as_bool(&self, name: &str) -> Result<bool, StriError> {
        match self {
            OptionValue::Bool(b) => Ok(*b),
            OptionValue::Int(v) => Ok(*v != 0),
            _ => Err(StriError::argument(name, "expected a logical value")),
        }
    }

    pub(crate) fn as_int(&self, name: &str) -> Result<i64, StriError> {
        match self {
            OptionValue::Int(v) => Ok(*v),
            OptionValue::Bool(b) => Ok(*b as i64),
            _ => Err(StriError::argument(name, "expected an integer value")),
        }
    }

    pub(crate) fn as_str(&self, name: &str) -> Result<&str, StriError> {
        match self {
            OptionValue::Str(s) => Ok(s),
            _ => Err(StriError::argument(name, "expected a string value")),
        }
    }
}

/// Ordered name/value pairs. Later entries override earlier ones.
///
/// ```
/// use strivec::OptionBag;
///
/// let bag = OptionBag::new()
///     .with("case_insensitive", true)
///     .with("stack_limit", 64);
/// assert_eq!(bag.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionBag {
    entries: Vec<(String, OptionValue)>,
}

impl OptionBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.entries.push((name.to_string(), value.into()));
        self
    }

    pub fn push(&mut self, name: &str, value: OptionValue) {
        self.entries.push((name.to_string(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// === Regex options ===

bitflags! {
    /// Matcher flags for regex patterns.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RegexFlags: u32 {
        const CASE_INSENSITIVE = 1 << 0;
        /// Allow whitespace and `#` comments in the pattern.
        const COMMENTS = 1 << 1;
        /// `.` matches line terminators.
        const DOTALL = 1 << 2;
        /// Treat the pattern as a literal string.
        const LITERAL = 1 << 3;
        /// `^` and `$` match at line boundaries.
        const MULTILINE = 1 << 4;
        /// Only `\n` is a line terminator.
        const UNIX_LINES = 1 << 5;
        /// Unicode word boundaries for `\b`.
        const UWORD = 1 << 6;
        /// Reject `\q`-style escapes of letters with no meaning instead
        /// of matching the letter itself.
        const ERROR_ON_UNKNOWN_ESCAPES = 1 << 7;
    }
}

/// Flags plus engine limits, shared by every pattern of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexOptions {
    pub flags: RegexFlags,
    /// Backtracking budget in kilobytes for patterns that need
    /// backtracking (look-around, backreferences); 0 is the engine default.
    pub stack_limit: u32,
    /// Recorded only; neither engine enforces a time budget.
    pub time_limit: u32,
}

impl RegexOptions {
    pub fn new(flags: RegexFlags) -> Self {
        RegexOptions {
            flags,
            ..Default::default()
        }
    }

    /// Parse `case_insensitive`, `comments`, `dotall`, `literal`,
    /// `multiline`, `unix_lines`, `uword`, `error_on_unknown_escapes`,
    /// `stack_limit` and `time_limit`.
    pub fn from_bag(ctx: &Context, bag: &OptionBag) -> Result<Self, StriError> {
        let mut opts = RegexOptions::default();
        for (name, value) in bag.iter() {
            let flag = match name {
                "case_insensitive" => RegexFlags::CASE_INSENSITIVE,
                "comments" => RegexFlags::COMMENTS,
                "dotall" => RegexFlags::DOTALL,
                "literal" => RegexFlags::LITERAL,
                "multiline" => RegexFlags::MULTILINE,
                "unix_lines" => RegexFlags::UNIX_LINES,
                "uword" => RegexFlags::UWORD,
                "error_on_unknown_escapes" => RegexFlags::ERROR_ON_UNKNOWN_ESCAPES,
                "stack_limit" => {
                    opts.stack_limit = non_negative(name, value.as_int(name)?)?;
                    continue;
                }
                "time_limit" => {
                    opts.time_limit = non_negative(name, value.as_int(name)?)?;
                    continue;
                }
                _ => {
                    ctx.warn(Warning::UnknownOption {
                        kind: "regex",
                        name: name.to_string(),
                    });
                    continue;
                }
            };
            opts.flags.set(flag, value.as_bool(name)?);
        }
        Ok(opts)
    }
}

fn non_negative(name: &str, v: i64) -> Result<u32, StriError> {
    u32::try_from(v).map_err(|_| StriError::argument(name, "expected a non-negative value"))
}
