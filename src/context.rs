// context.rs - Explicit per-call configuration.
//
// Holds what would otherwise be process-wide state: the default locale,
// the host's native encoding, and the sink for user-visible warnings.

use std::cell::RefCell;
use std::fmt;

use encoding_rs::Encoding;
use icu_locid::Locale;

use crate::error::StriError;

/// A soft, per-element diagnostic. Never aborts the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Argument lengths are not multiples of each other.
    RecyclingRule,
    /// An empty search pattern was skipped.
    EmptyPattern,
    /// An option bag entry was not recognized.
    UnknownOption { kind: &'static str, name: String },
    /// A recognized option has no effect with the current engine.
    UnsupportedOption { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::RecyclingRule => write!(
                f,
                "longer object length is not a multiple of shorter object length"
            ),
            Warning::EmptyPattern => write!(f, "empty search patterns are not supported"),
            Warning::UnknownOption { kind, name } => {
                write!(f, "incorrect {} option: `{}`. ignoring", kind, name)
            }
            Warning::UnsupportedOption { name } => {
                write!(f, "option `{}` is not supported by this engine. ignoring", name)
            }
        }
    }
}

/// Configuration shared by all containers built during one call.
///
/// ```
/// use strivec::Context;
///
/// let ctx = Context::builder().locale("de_DE").build().unwrap();
/// assert_eq!(ctx.locale().to_string(), "de-DE");
/// ```
pub struct Context {
    locale: Locale,
    native_encoding: &'static Encoding,
    warnings: RefCell<Vec<Warning>>,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Default locale for collators, break iterators and case mapping.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Encoding used for strings declared as native.
    pub fn native_encoding(&self) -> &'static Encoding {
        self.native_encoding
    }

    /// Resolve a caller locale, falling back to the context default
    /// for `None` and the empty string.
    pub fn resolve_locale(&self, name: Option<&str>) -> Result<Locale, StriError> {
        match name {
            None | Some("") => Ok(self.locale.clone()),
            Some(name) => parse_locale(name),
        }
    }

    /// Record a warning and forward it to the `log` facade.
    pub fn warn(&self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.borrow_mut().push(warning);
    }

    /// Drain the warnings collected so far.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.borrow_mut())
    }
}

impl Default for Context {
    fn default() -> Self {
        Context {
            locale: Locale::UND,
            native_encoding: encoding_rs::UTF_8,
            warnings: RefCell::new(Vec::new()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("locale", &self.locale.to_string())
            .field("native_encoding", &self.native_encoding.name())
            .finish_non_exhaustive()
    }
}

// === ContextBuilder ===

/// Builder for a [`Context`].
#[derive(Debug, Default)]
pub struct ContextBuilder {
    locale: Option<String>,
    native_encoding: Option<String>,
}

impl ContextBuilder {
    /// Default locale, e.g. `"en_US"` or `"de-DE"`.
    pub fn locale(mut self, name: &str) -> Self {
        self.locale = Some(name.to_string());
        self
    }

    /// WHATWG label of the native encoding, e.g. `"latin1"` or `"shift_jis"`.
    pub fn native_encoding(mut self, label: &str) -> Self {
        self.native_encoding = Some(label.to_string());
        self
    }

    pub fn build(self) -> Result<Context, StriError> {
        let locale = match self.locale.as_deref() {
            None | Some("") => Locale::UND,
            Some(name) => parse_locale(name)?,
        };
        let native_encoding = match self.native_encoding.as_deref() {
            None => encoding_rs::UTF_8,
            Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                StriError::argument("native_encoding", format!("unknown encoding `{}`", label))
            })?,
        };
        log::debug!(
            "context: locale={} native_encoding={}",
            locale,
            native_encoding.name()
        );
        Ok(Context {
            locale,
            native_encoding,
            warnings: RefCell::new(Vec::new()),
        })
    }
}

/// Parse a locale identifier; both `_` and `-` separators are accepted.
pub fn parse_locale(name: &str) -> Result<Locale, StriError> {
    let normalized = name.replace('_', "-");
    normalized
        .parse::<Locale>()
        .map_err(|_| StriError::argument("locale", format!("cannot parse `{}`", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context() {
        let ctx = Context::default();
        assert_eq!(ctx.locale(), &Locale::UND);
        assert_eq!(ctx.native_encoding(), encoding_rs::UTF_8);
    }

    #[test]
    fn builder_locale_and_encoding() {
        let ctx = Context::builder()
            .locale("pl_PL")
            .native_encoding("latin1")
            .build()
            .unwrap();
        assert_eq!(ctx.locale().to_string(), "pl-PL");
        assert_eq!(ctx.native_encoding(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn builder_rejects_unknown_encoding() {
        let err = Context::builder().native_encoding("klingon").build().unwrap_err();
        assert!(matches!(err, StriError::Argument { .. }));
    }

    #[test]
    fn resolve_locale_falls_back() {
        let ctx = Context::builder().locale("fr").build().unwrap();
        assert_eq!(ctx.resolve_locale(None).unwrap().to_string(), "fr");
        assert_eq!(ctx.resolve_locale(Some("")).unwrap().to_string(), "fr");
        assert_eq!(ctx.resolve_locale(Some("ja_JP")).unwrap().to_string(), "ja-JP");
        assert!(ctx.resolve_locale(Some("!!")).is_err());
    }

    #[test]
    fn warnings_are_collected() {
        let ctx = Context::default();
        ctx.warn(Warning::EmptyPattern);
        ctx.warn(Warning::UnknownOption {
            kind: "regex",
            name: "foo".to_string(),
        });
        let warnings = ctx.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[1].to_string(),
            "incorrect regex option: `foo`. ignoring"
        );
        assert!(ctx.take_warnings().is_empty());
    }
}
