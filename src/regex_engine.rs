//! Abstraction over `regex` and `regex-lite` depending on whether we have the
//! `unicode` crate feature enabled.

#[cfg(feature = "unicode")]
pub(crate) use regex::{escape, Regex};
#[cfg(not(feature = "unicode"))]
pub(crate) use regex_lite::{escape, Regex};
