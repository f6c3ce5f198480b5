//! # strivec
//!
//! Vectorized, NA-aware Unicode string operations for a scripting-language
//! host, built on [ICU4X](https://github.com/unicode-org/icu4x) and the
//! [`regex`](https://crates.io/crates/regex) crate, with
//! [`fancy_regex`](https://crates.io/crates/fancy-regex) for patterns that
//! need look-around or backreferences.
//!
//! The host hands over vectors of possibly-missing strings in various
//! declared encodings. Each operation converts them once into containers,
//! recycles shorter arguments to a common length, and walks the result
//! index by index while reusing compiled matchers, searchers and break
//! iterators whenever the same pattern comes round again.
//!
//! ## Quick Start
//!
//! ```rust
//! use strivec::prelude::*;
//!
//! let ctx = Context::default();
//! let s = host_vec(&[Some("żółw i ŻÓŁW"), None]);
//! let p = host_vec(&[Some("(?i)żółw")]);
//!
//! let spans = search::regex::locate_all(
//!     &ctx, &s, &p, false, SpanForm::InclusiveEnd, &RegexOptions::default(),
//! ).unwrap();
//! assert_eq!(spans[0], vec![Some((1, 4)), Some((8, 11))]);
//! assert_eq!(spans[1], vec![None]);
//! ```
//!
//! Options arrive as loosely typed option bags:
//!
//! ```rust
//! use strivec::prelude::*;
//!
//! let ctx = Context::default();
//! let bag = OptionBag::new().with("case_insensitive", true);
//! let opts = RegexOptions::from_bag(&ctx, &bag).unwrap();
//! let s = host_vec(&[Some("ABC")]);
//! let p = host_vec(&[Some("b")]);
//! let found = search::regex::detect(&ctx, &s, &p, &opts).unwrap();
//! assert_eq!(found, vec![Some(true)]);
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`host`] | Host string values and their declared encodings |
//! | [`string8`] | NA-aware UTF-8 string and scratch buffer |
//! | [`container`] | Vectorized UTF-8/UTF-16/list/integer and pattern containers |
//! | [`index`] | Byte, code unit and code point offset translation |
//! | [`cache`] | Single-slot keyed cache for per-pattern engine objects |
//! | [`options`] | Option bags and regex flags |
//! | [`collator`] | Collator options and construction |
//! | [`brkiter`] | Break iterator options and boundary walker |
//! | [`search`] | Regex, fixed, collation and boundary search operations |
//! | [`sub`] | Substrings by code point index |
//! | [`trans`] | Case mapping and normalization |
//! | [`join`] | Joining lists of string vectors |
//! | [`context`] | Locale, native encoding and warnings |
//! | [`error`] | Error types |

// Enable #[coverage(off)] attribute when running under cargo-llvm-cov on nightly.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[macro_use]
mod contract;

pub mod brkiter;
pub mod cache;
pub mod collator;
pub mod container;
pub mod context;
pub mod error;
pub mod host;
pub mod index;
pub mod join;
pub mod options;
pub mod prelude;
pub mod search;
pub mod string8;
pub mod sub;
pub mod trans;

pub use context::{Context, ContextBuilder, Warning};
pub use error::{StatusCode, StriError};
pub use host::{host_strs, host_vec, to_host_vec, NativeEncoding, NativeString};
pub use options::{OptionBag, OptionValue, RegexFlags, RegexOptions};
