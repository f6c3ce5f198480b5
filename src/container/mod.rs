// container/mod.rs - Vectorized string and pattern containers.
//
// Every container converts its host vector once, on construction, and
// maps a vectorized index `i` in `0..nrecycle` to slot `i % n`.

pub mod base;
pub mod bytesearch;
pub mod indexable;
pub mod int;
pub mod list_utf8;
pub mod regex;
pub mod usearch;
pub mod utf16;
pub mod utf8;

pub use base::{recycling_rule, ContainerBase, Vectorize};
pub use bytesearch::{ByteSearchContainer, ByteSearcher};
pub use indexable::IndexableUtf8Container;
pub use int::IntContainer;
pub use list_utf8::{HostList, ListUtf8Container};
pub use self::regex::{CompiledRegex, RegexMatcher, RegexPatternContainer};
pub use usearch::{CollatorSearch, CollatorSearchContainer};
pub use utf16::Utf16Container;
pub use utf8::Utf8Container;
