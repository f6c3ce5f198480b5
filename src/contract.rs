// contract.rs - Internal invariant checks.
//
// `contract!` is evaluated in debug builds and when the `contracts`
// feature is on. A failed check returns `StriError::Internal` from the
// enclosing function; with checks disabled the condition is never
// evaluated.

/// Whether contract checks are compiled in.
pub(crate) const ENABLED: bool = cfg!(any(debug_assertions, feature = "contracts"));

macro_rules! contract {
    ($cond:expr, $($arg:tt)+) => {
        if $crate::contract::ENABLED && !($cond) {
            ::log::error!("contract violated: {}", format_args!($($arg)+));
            return Err($crate::error::StriError::Internal(format!($($arg)+)));
        }
    };
}

/// True if `idx` is sorted ascending.
pub(crate) fn is_sorted(idx: &[i32]) -> bool {
    idx.windows(2).all(|w| w[0] <= w[1])
}
