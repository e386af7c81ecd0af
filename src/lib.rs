//! Path spec matching and specificity-ordered routing table.
//!
//! This crate selects the best-matching route for a request path among
//! heterogeneous pattern grammars: exact literals, classic prefix/suffix
//! globs, regular expressions, and templated path segments. All grammars are
//! ranked by a single total [specificity order](SpecGroup), so the most
//! deliberate spec always wins regardless of registration order.
//!
//! Paths handed to this crate are expected to be normalized and decoded
//! already: no query string, no fragment, segments separated by `/`.
//!
//! # Examples
//! ```
//! use route_table::{PathSpec, RoutingTable};
//!
//! let mut table = RoutingTable::new();
//! table.insert(PathSpec::new("/animal/bird/*")?, "birds");
//! table.insert(PathSpec::new("/animal/*")?, "animals");
//! table.insert(PathSpec::new("/")?, "default");
//! table.insert(PathSpec::template("/animal/{kind}/cam")?, "cam");
//!
//! assert_eq!(*table.best_match("/animal/bird/eagle").unwrap().resource(), "birds");
//! assert_eq!(*table.best_match("/animal/fish/cam").unwrap().resource(), "cam");
//! assert_eq!(*table.best_match("/Other/path").unwrap().resource(), "default");
//! # Ok::<_, route_table::MalformedSpec>(())
//! ```

#![deny(rust_2018_idioms, nonstandard_style)]

mod order;
mod params;
mod regex_engine;
mod shared;
mod spec;
mod table;

pub use self::params::Parameters;
pub use self::shared::SharedRoutingTable;
pub use self::spec::{MalformedSpec, PathSpec, SpecGroup};
pub use self::table::{Mapping, RoutingTable};

/// A type that can expose a request path for matching.
///
/// Lookup methods on [`RoutingTable`] accept any implementor, so callers can
/// pass their own request type directly instead of extracting a string first.
pub trait ResourcePath {
    fn path(&self) -> &str;
}

impl ResourcePath for str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for String {
    fn path(&self) -> &str {
        self.as_str()
    }
}

impl<'a> ResourcePath for &'a str {
    fn path(&self) -> &str {
        self
    }
}

impl ResourcePath for bytestring::ByteString {
    fn path(&self) -> &str {
        self
    }
}

#[cfg(feature = "http")]
mod http_impls {
    use http::Uri;

    use super::ResourcePath;

    impl ResourcePath for Uri {
        fn path(&self) -> &str {
            self.path()
        }
    }
}
