// prelude.rs - Convenient re-exports for callers of the operations.
//
//! # Prelude
//!
//! ```
//! use strivec::prelude::*;
//!
//! let ctx = Context::default();
//! let s = host_vec(&[Some("a-b")]);
//! let out = search::fixed::count(&ctx, &s, &host_vec(&[Some("-")]), false).unwrap();
//! assert_eq!(out, vec![Some(1)]);
//! ```

pub use crate::brkiter::{BreakIterKind, BrkIterOptions};
pub use crate::collator::CollatorOptions;
pub use crate::context::{Context, Warning};
pub use crate::error::StriError;
pub use crate::host::{host_strs, host_vec, NativeString};
pub use crate::options::{OptionBag, RegexFlags, RegexOptions};
pub use crate::search::{self, SpanForm};
pub use crate::trans::NormalizationForm;
