// collator.rs - Collator options and construction.

use icu_collator::{
    AlternateHandling, BackwardSecondLevel, CaseFirst, CaseLevel, Collator, Numeric, Strength,
};

use crate::context::{Context, Warning};
use crate::error::{StatusCode, StriError};
use crate::options::{OptionBag, OptionValue};

/// Caller-facing collator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatorOptions {
    /// `None` or `""` selects the context locale.
    pub locale: Option<String>,
    /// 1 = primary ... 4 = quaternary, 5 = identical.
    pub strength: u8,
    /// Treat spaces and punctuation as ignorable.
    pub alternate_shifted: bool,
    /// Backward secondary ordering (French accents).
    pub french: bool,
    /// `Some(true)` upper first, `Some(false)` lower first, `None` off.
    pub uppercase_first: Option<bool>,
    pub case_level: bool,
    /// Accepted for compatibility; input is always normalized.
    pub normalization: bool,
    /// Compare digit runs by numeric value.
    pub numeric: bool,
}

impl Default for CollatorOptions {
    fn default() -> Self {
        CollatorOptions {
            locale: None,
            strength: 3,
            alternate_shifted: false,
            french: false,
            uppercase_first: None,
            case_level: false,
            normalization: false,
            numeric: false,
        }
    }
}

impl CollatorOptions {
    pub fn with_strength(strength: u8) -> Self {
        CollatorOptions {
            strength,
            ..Default::default()
        }
    }

    /// Parse `locale`, `strength`, `alternate_shifted`, `french`,
    /// `uppercase_first`, `case_level`, `normalization` and `numeric`.
    pub fn from_bag(ctx: &Context, bag: &OptionBag) -> Result<Self, StriError> {
        let mut opts = CollatorOptions::default();
        for (name, value) in bag.iter() {
            match name {
                "locale" => {
                    opts.locale = match value {
                        OptionValue::Null => None,
                        v => Some(v.as_str(name)?.to_string()),
                    }
                }
                "strength" => {
                    let v = value.as_int(name)?;
                    if !(1..=5).contains(&v) {
                        return Err(StriError::argument(name, "expected a value in 1..=5"));
                    }
                    opts.strength = v as u8;
                }
                "alternate_shifted" => opts.alternate_shifted = value.as_bool(name)?,
                "french" => opts.french = value.as_bool(name)?,
                "uppercase_first" => {
                    opts.uppercase_first = match value {
                        OptionValue::Null => None,
                        v => Some(v.as_bool(name)?),
                    }
                }
                "case_level" => opts.case_level = value.as_bool(name)?,
                "normalization" => opts.normalization = value.as_bool(name)?,
                "numeric" => opts.numeric = value.as_bool(name)?,
                _ => ctx.warn(Warning::UnknownOption {
                    kind: "collator",
                    name: name.to_string(),
                }),
            }
        }
        Ok(opts)
    }
}

/// Open a collator for `opts`, resolving the locale through `ctx`.
pub fn open_collator(ctx: &Context, opts: &CollatorOptions) -> Result<Collator, StriError> {
    let locale = ctx.resolve_locale(opts.locale.as_deref())?;

    let mut icu = icu_collator::CollatorOptions::new();
    icu.strength = Some(match opts.strength {
        1 => Strength::Primary,
        2 => Strength::Secondary,
        4 => Strength::Quaternary,
        5 => Strength::Identical,
        _ => Strength::Tertiary,
    });
    icu.alternate_handling = Some(if opts.alternate_shifted {
        AlternateHandling::Shifted
    } else {
        AlternateHandling::NonIgnorable
    });
    icu.backward_second_level = Some(if opts.french {
        BackwardSecondLevel::On
    } else {
        BackwardSecondLevel::Off
    });
    icu.case_first = Some(match opts.uppercase_first {
        Some(true) => CaseFirst::UpperFirst,
        Some(false) => CaseFirst::LowerFirst,
        None => CaseFirst::Off,
    });
    icu.case_level = Some(if opts.case_level {
        CaseLevel::On
    } else {
        CaseLevel::Off
    });
    icu.numeric = Some(if opts.numeric { Numeric::On } else { Numeric::Off });

    log::debug!("opening collator for locale {} with {:?}", locale, opts);
    Collator::try_new(&(&locale).into(), icu).map_err(|err| {
        StriError::status(StatusCode::MissingResource, err.to_string())
            .with_context(&locale.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn options_from_bag() {
        let ctx = Context::default();
        let bag = OptionBag::new()
            .with("strength", 1)
            .with("numeric", true)
            .with("uppercase_first", false)
            .with("locale", "pl_PL")
            .with("colour", true);
        let opts = CollatorOptions::from_bag(&ctx, &bag).unwrap();
        assert_eq!(opts.strength, 1);
        assert!(opts.numeric);
        assert_eq!(opts.uppercase_first, Some(false));
        assert_eq!(opts.locale.as_deref(), Some("pl_PL"));
        assert_eq!(
            ctx.take_warnings()[0].to_string(),
            "incorrect collator option: `colour`. ignoring"
        );
    }

    #[test]
    fn strength_out_of_range() {
        let ctx = Context::default();
        let bag = OptionBag::new().with("strength", 9);
        assert!(CollatorOptions::from_bag(&ctx, &bag).is_err());
    }

    #[test]
    fn primary_strength_ignores_accents() {
        let ctx = Context::default();
        let col = open_collator(&ctx, &CollatorOptions::with_strength(1)).unwrap();
        assert_eq!(col.compare("é", "E"), Ordering::Equal);
        let col = open_collator(&ctx, &CollatorOptions::default()).unwrap();
        assert_ne!(col.compare("é", "e"), Ordering::Equal);
    }

    #[test]
    fn numeric_ordering() {
        let ctx = Context::default();
        let opts = CollatorOptions {
            numeric: true,
            ..Default::default()
        };
        let col = open_collator(&ctx, &opts).unwrap();
        assert_eq!(col.compare("a2", "a10"), Ordering::Less);
    }

    #[test]
    fn bad_locale_is_an_argument_error() {
        let ctx = Context::default();
        let opts = CollatorOptions {
            locale: Some("@@".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            open_collator(&ctx, &opts),
            Err(StriError::Argument { .. })
        ));
    }
}
