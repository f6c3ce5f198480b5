// trans.rs - Case mapping and normalization.
//
// Results are written back into a deep copy of the input, one element
// at a time. NA stays NA.

use icu_casemap::CaseMapper;
use icu_normalizer::{ComposingNormalizer, DecomposingNormalizer};

use crate::container::Utf8Container;
use crate::context::Context;
use crate::error::StriError;
use crate::host::NativeString;

/// Unicode normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

enum Normalizer {
    Composing(ComposingNormalizer),
    Decomposing(DecomposingNormalizer),
}

impl Normalizer {
    fn new(form: NormalizationForm) -> Self {
        match form {
            NormalizationForm::Nfc => Normalizer::Composing(ComposingNormalizer::new_nfc()),
            NormalizationForm::Nfkc => Normalizer::Composing(ComposingNormalizer::new_nfkc()),
            NormalizationForm::Nfd => Normalizer::Decomposing(DecomposingNormalizer::new_nfd()),
            NormalizationForm::Nfkd => Normalizer::Decomposing(DecomposingNormalizer::new_nfkd()),
        }
    }

    fn normalize(&self, s: &str) -> String {
        match self {
            Normalizer::Composing(n) => n.normalize(s),
            Normalizer::Decomposing(n) => n.normalize(s),
        }
    }

    fn is_normalized(&self, s: &str) -> bool {
        match self {
            Normalizer::Composing(n) => n.is_normalized(s),
            Normalizer::Decomposing(n) => n.is_normalized(s),
        }
    }
}

/// Apply `f` to every non-NA element of a deep copy of `str`.
fn map_each(
    ctx: &Context,
    str: &[Option<NativeString>],
    mut f: impl FnMut(&str) -> String,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let mut cont = Utf8Container::new(ctx, str, str.len(), false)?;
    for i in cont.vectorize() {
        if cont.is_na(i) {
            continue;
        }
        let mapped = f(cont.get(i)?.as_str());
        cont.set(i, mapped)?;
    }
    Ok(cont.to_host_all())
}

/// Lowercase with the rules of `locale` (`None`: context locale).
pub fn to_lower(
    ctx: &Context,
    str: &[Option<NativeString>],
    locale: Option<&str>,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let locale = ctx.resolve_locale(locale)?;
    let mapper = CaseMapper::new();
    log::debug!("lowercasing {} strings for locale {}", str.len(), locale);
    map_each(ctx, str, |s| mapper.lowercase_to_string(s, &locale.id))
}

/// Uppercase with the rules of `locale` (`None`: context locale).
pub fn to_upper(
    ctx: &Context,
    str: &[Option<NativeString>],
    locale: Option<&str>,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let locale = ctx.resolve_locale(locale)?;
    let mapper = CaseMapper::new();
    log::debug!("uppercasing {} strings for locale {}", str.len(), locale);
    map_each(ctx, str, |s| mapper.uppercase_to_string(s, &locale.id))
}

/// Locale-independent full case folding.
pub fn casefold(
    ctx: &Context,
    str: &[Option<NativeString>],
) -> Result<Vec<Option<NativeString>>, StriError> {
    let mapper = CaseMapper::new();
    map_each(ctx, str, |s| mapper.fold_string(s))
}

pub fn normalize(
    ctx: &Context,
    str: &[Option<NativeString>],
    form: NormalizationForm,
) -> Result<Vec<Option<NativeString>>, StriError> {
    let normalizer = Normalizer::new(form);
    map_each(ctx, str, |s| normalizer.normalize(s))
}

/// Whether each element is already in `form`.
pub fn is_normalized(
    ctx: &Context,
    str: &[Option<NativeString>],
    form: NormalizationForm,
) -> Result<Vec<Option<bool>>, StriError> {
    let normalizer = Normalizer::new(form);
    let cont = Utf8Container::new(ctx, str, str.len(), true)?;
    cont.vectorize()
        .map(|i| {
            if cont.is_na(i) {
                return Ok(None);
            }
            Ok(Some(normalizer.is_normalized(cont.get(i)?.as_str())))
        })
        .collect()
}
