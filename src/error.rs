// error.rs - Error types for strivec.
//
// Engine failures keep a stable ICU-style status name so callers can
// match on them the same way regardless of which backend raised them.

use std::fmt;

/// Engine status attached to a [`StriError::Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Pattern syntax error.
    RegexRuleSyntax,
    /// Compiled pattern exceeds the configured size limit.
    RegexPatternTooBig,
    /// Unrecognized backslash escape under `error_on_unknown_escapes`.
    RegexBadEscapeSequence,
    /// Backtracking ran out of its configured budget.
    RegexStackOverflow,
    /// Locale data could not be loaded.
    MissingResource,
    /// An argument was rejected by the engine.
    IllegalArgument,
    /// Engine-side invariant failure.
    InternalProgram,
}

impl StatusCode {
    /// Stable name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StatusCode::RegexRuleSyntax => "U_REGEX_RULE_SYNTAX",
            StatusCode::RegexPatternTooBig => "U_REGEX_PATTERN_TOO_BIG",
            StatusCode::RegexBadEscapeSequence => "U_REGEX_BAD_ESCAPE_SEQUENCE",
            StatusCode::RegexStackOverflow => "U_REGEX_STACK_OVERFLOW",
            StatusCode::MissingResource => "U_MISSING_RESOURCE_ERROR",
            StatusCode::IllegalArgument => "U_ILLEGAL_ARGUMENT_ERROR",
            StatusCode::InternalProgram => "U_INTERNAL_PROGRAM_ERROR",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StriError {
    /// Element `index` is not valid in its declared encoding.
    InvalidEncoding { index: usize, encoding: &'static str },
    /// A string marked as raw bytes was passed to a text operation.
    BytesEncoding,
    /// A caller-supplied argument is malformed.
    Argument { name: String, message: String },
    /// Failure reported by a Unicode engine.
    Status {
        code: StatusCode,
        message: String,
        /// Pattern or string that triggered the failure, when known.
        context: Option<String>,
    },
    /// Violated internal invariant.
    Internal(String),
}

impl StriError {
    pub(crate) fn argument(name: &str, message: impl Into<String>) -> Self {
        StriError::Argument {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn status(code: StatusCode, message: impl Into<String>) -> Self {
        StriError::Status {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach the offending pattern or string to a status error.
    pub fn with_context(self, text: &str) -> Self {
        match self {
            StriError::Status { code, message, .. } => StriError::Status {
                code,
                message,
                context: Some(text.to_string()),
            },
            other => other,
        }
    }

    /// Engine status code, if this is a status error.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            StriError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for StriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StriError::InvalidEncoding { index, encoding } => write!(
                f,
                "invalid {} byte sequence detected at element {}",
                encoding,
                index + 1
            ),
            StriError::BytesEncoding => {
                write!(f, "bytes encoding is not supported by this function")
            }
            StriError::Argument { name, message } => {
                write!(f, "incorrect argument `{}`: {}", name, message)
            }
            StriError::Status {
                code,
                message,
                context,
            } => {
                write!(f, "{} ({})", message, code)?;
                if let Some(text) = context {
                    write!(f, " in `{}`", text)?;
                }
                Ok(())
            }
            StriError::Internal(detail) if detail.is_empty() => write!(f, "internal error"),
            StriError::Internal(detail) => write!(f, "internal error: {}", detail),
        }
    }
}

impl std::error::Error for StriError {}

impl From<regex::Error> for StriError {
    fn from(err: regex::Error) -> Self {
        match err {
            regex::Error::CompiledTooBig(limit) => StriError::status(
                StatusCode::RegexPatternTooBig,
                format!("compiled pattern exceeds the size limit of {} bytes", limit),
            ),
            regex::Error::Syntax(message) => {
                StriError::status(StatusCode::RegexRuleSyntax, message)
            }
            other => StriError::status(StatusCode::IllegalArgument, other.to_string()),
        }
    }
}

impl From<fancy_regex::Error> for StriError {
    fn from(err: fancy_regex::Error) -> Self {
        match err {
            fancy_regex::Error::RuntimeError(_) => {
                StriError::status(StatusCode::RegexStackOverflow, err.to_string())
            }
            other => StriError::status(StatusCode::RegexRuleSyntax, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_syntax_error() {
        let err = StriError::from(regex::Regex::new("(a").unwrap_err());
        assert_eq!(err.status_code(), Some(StatusCode::RegexRuleSyntax));
        assert!(err.to_string().contains("U_REGEX_RULE_SYNTAX"));
    }

    #[test]
    fn from_too_big() {
        let err = regex::RegexBuilder::new(r"\w{500}")
            .size_limit(16)
            .build()
            .unwrap_err();
        let err = StriError::from(err);
        assert_eq!(err.status_code(), Some(StatusCode::RegexPatternTooBig));
    }

    #[test]
    fn from_backtracking_errors() {
        let err = StriError::from(fancy_regex::Regex::new("(a").unwrap_err());
        assert_eq!(err.status_code(), Some(StatusCode::RegexRuleSyntax));

        let re = fancy_regex::RegexBuilder::new("(?i)(a|b|ab)*(?=c)")
            .backtrack_limit(1000)
            .build()
            .unwrap();
        let err = StriError::from(re.is_match(&"ab".repeat(30)).unwrap_err());
        assert_eq!(err.status_code(), Some(StatusCode::RegexStackOverflow));
        assert!(err.to_string().contains("U_REGEX_STACK_OVERFLOW"));
    }

    #[test]
    fn context_is_appended() {
        let err = StriError::status(StatusCode::RegexRuleSyntax, "unclosed group")
            .with_context("(a");
        assert_eq!(err.to_string(), "unclosed group (U_REGEX_RULE_SYNTAX) in `(a`");
    }

    #[test]
    fn context_ignored_for_other_variants() {
        let err = StriError::BytesEncoding.with_context("x");
        assert_eq!(err, StriError::BytesEncoding);
    }

    #[test]
    fn display_impl() {
        assert_eq!(
            StriError::BytesEncoding.to_string(),
            "bytes encoding is not supported by this function"
        );
        assert_eq!(StriError::Internal(String::new()).to_string(), "internal error");
        let err = StriError::InvalidEncoding {
            index: 2,
            encoding: "UTF-8",
        };
        assert_eq!(err.to_string(), "invalid UTF-8 byte sequence detected at element 3");
    }

    #[test]
    fn error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(StriError::BytesEncoding);
        assert!(err.to_string().starts_with("bytes encoding"));
    }
}
