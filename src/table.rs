use std::{mem, slice};

use tracing::debug;

use crate::{spec::PathSpec, ResourcePath};

/// A single spec-to-resource association held by a [`RoutingTable`].
///
/// Mappings are created at registration time and immutable afterwards;
/// ranking between mappings is delegated to the specificity order on the
/// spec.
#[derive(Debug, Clone)]
pub struct Mapping<T> {
    spec: PathSpec,
    resource: T,
}

impl<T> Mapping<T> {
    /// Returns the compiled spec of this mapping.
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    /// Returns the registered resource of this mapping.
    pub fn resource(&self) -> &T {
        &self.resource
    }

    /// Consumes the mapping, returning its spec and resource.
    pub fn into_parts(self) -> (PathSpec, T) {
        (self.spec, self.resource)
    }
}

/// An ordered collection of spec-to-resource mappings.
///
/// The table is kept sorted by the specificity order at all times, so lookups
/// simply scan for the first matching spec. At most one mapping exists per
/// declaration string; re-registering a declaration replaces its resource.
///
/// The table itself is a plain value: matching is synchronous and
/// side-effect free, and nothing is mutated during lookups. The intended
/// usage is build-then-read; for tables that change while serving lookups see
/// [`SharedRoutingTable`](crate::SharedRoutingTable).
///
/// # Examples
/// ```
/// use route_table::{PathSpec, RoutingTable};
///
/// let mut table = RoutingTable::new();
/// table.insert(PathSpec::new("/abs/path")?, "exact");
/// table.insert(PathSpec::new("/abs/*")?, "glob");
///
/// let best = table.best_match("/abs/path").unwrap();
/// assert_eq!(*best.resource(), "exact");
/// assert_eq!(best.spec().declaration(), "/abs/path");
///
/// assert!(table.best_match("/other").is_none());
/// # Ok::<_, route_table::MalformedSpec>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoutingTable<T> {
    mappings: Vec<Mapping<T>>,
}

impl<T> Default for RoutingTable<T> {
    fn default() -> Self {
        RoutingTable {
            mappings: Vec::new(),
        }
    }
}

impl<T> RoutingTable<T> {
    /// Constructs an empty table.
    pub fn new() -> Self {
        RoutingTable::default()
    }

    /// Returns number of registered mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if no mappings are registered.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Registers `resource` under `spec`.
    ///
    /// At most one mapping exists per declaration string. If `spec` is equal
    /// to an already-registered spec, only the resource is replaced and the
    /// previous resource is returned. A mapping under the same declaration
    /// but compiled by a different constructor is replaced entirely, spec
    /// included, and moves to the new spec's position in the specificity
    /// order. Otherwise the mapping is inserted at its position in the order.
    pub fn insert(&mut self, spec: PathSpec, resource: T) -> Option<T> {
        let replaced = match self
            .mappings
            .iter()
            .position(|mapping| mapping.spec.declaration() == spec.declaration())
        {
            Some(at) if self.mappings[at].spec == spec => {
                debug!("replacing resource mapped to {:?}", spec.declaration());
                return Some(mem::replace(&mut self.mappings[at].resource, resource));
            }
            Some(at) => {
                // same declaration under a different grammar; the stale spec
                // is dropped and the mapping re-sorted below
                debug!("replacing mapping for {:?}", spec.declaration());
                Some(self.mappings.remove(at).resource)
            }
            None => None,
        };

        let at = self
            .mappings
            .binary_search_by(|mapping| mapping.spec.cmp(&spec))
            .unwrap_or_else(|at| at);
        self.mappings.insert(at, Mapping { spec, resource });

        replaced
    }

    /// Returns the resource registered under exactly `declaration`, if any.
    pub fn get(&self, declaration: &str) -> Option<&T> {
        self.mappings
            .iter()
            .find(|mapping| mapping.spec.declaration() == declaration)
            .map(|mapping| &mapping.resource)
    }

    /// Unregisters the mapping with exactly `declaration`, returning its
    /// resource.
    pub fn remove(&mut self, declaration: &str) -> Option<T> {
        let at = self
            .mappings
            .iter()
            .position(|mapping| mapping.spec.declaration() == declaration)?;

        Some(self.mappings.remove(at).resource)
    }

    /// Returns the most specific mapping whose spec matches `path`.
    ///
    /// Equivalent to the first item of [`matches`](Self::matches). `None`
    /// when nothing matches; deciding what that means (usually "not found")
    /// is left to the caller.
    pub fn best_match<P>(&self, path: &P) -> Option<&Mapping<T>>
    where
        P: ResourcePath + ?Sized,
    {
        let path = path.path();
        self.mappings.iter().find(|mapping| mapping.spec.matches(path))
    }

    /// Iterates over every mapping whose spec matches `path`, most specific
    /// first.
    ///
    /// The iterator borrows the table and can be restarted by calling this
    /// method again; matching has no side effects.
    pub fn matches<'a, P>(&'a self, path: &'a P) -> impl Iterator<Item = &'a Mapping<T>>
    where
        P: ResourcePath + ?Sized,
    {
        let path = path.path();
        self.mappings
            .iter()
            .filter(move |mapping| mapping.spec.matches(path))
    }

    /// Iterates over all mappings in specificity order.
    pub fn iter(&self) -> slice::Iter<'_, Mapping<T>> {
        self.mappings.iter()
    }
}

impl<'a, T> IntoIterator for &'a RoutingTable<T> {
    type Item = &'a Mapping<T>;
    type IntoIter = slice::Iter<'a, Mapping<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic(decl: &str) -> PathSpec {
        PathSpec::new(decl).unwrap()
    }

    fn resource<'a>(table: &RoutingTable<&'a str>, path: &str) -> Option<&'a str> {
        table.best_match(path).map(|mapping| *mapping.resource())
    }

    fn matched_declarations<'a>(table: &'a RoutingTable<&str>, path: &'a str) -> Vec<&'a str> {
        table
            .matches(path)
            .map(|mapping| mapping.spec().declaration())
            .collect()
    }

    #[test]
    fn classic_match_order() {
        let mut table = RoutingTable::new();
        table.insert(classic("/abs/path"), "1");
        table.insert(classic("/abs/path/longer"), "2");
        table.insert(classic("/animal/bird/*"), "3");
        table.insert(classic("/animal/fish/*"), "4");
        table.insert(classic("/animal/*"), "5");
        table.insert(classic("*.tar.gz"), "6");
        table.insert(classic("*.gz"), "7");
        table.insert(classic("/"), "8");
        table.insert(classic(""), "10");
        table.insert(classic("/\u{20AC}uro/*"), "11");

        let cases = [
            ("/abs/path", "1"),
            ("/abs/path/xxx", "8"),
            ("/abs/pith", "8"),
            ("/abs/path/longer", "2"),
            ("/abs/path/", "8"),
            ("/animal/bird/eagle/bald", "3"),
            ("/animal/fish/shark/grey", "4"),
            ("/animal/insect/bug", "5"),
            ("/animal", "5"),
            ("/animal/", "5"),
            ("/animal/x", "5"),
            ("/animal/*", "5"),
            ("/suffix/path.tar.gz", "6"),
            ("/suffix/path.gz", "7"),
            ("/animal/path.gz", "5"),
            ("/Other/path", "8"),
            ("/\u{20AC}uro/path", "11"),
            ("/", "10"),
        ];
        for (path, expected) in cases {
            assert_eq!(resource(&table, path), Some(expected), "path {:?}", path);
        }

        assert_eq!(
            table.best_match("/abs/path").unwrap().spec().declaration(),
            "/abs/path"
        );

        assert_eq!(
            matched_declarations(&table, "/animal/bird/path.tar.gz"),
            vec!["/animal/bird/*", "/animal/*", "*.tar.gz", "*.gz", "/"]
        );
        assert_eq!(
            matched_declarations(&table, "/animal/fish/"),
            vec!["/animal/fish/*", "/animal/*", "/"]
        );
        assert_eq!(
            matched_declarations(&table, "/animal/fish"),
            vec!["/animal/fish/*", "/animal/*", "/"]
        );
        assert_eq!(matched_declarations(&table, "/"), vec!["", "/"]);
        assert_eq!(matched_declarations(&table, ""), vec!["/"]);

        // an empty-prefix glob outranks the default and both suffix globs
        table.insert(classic("/*"), "0");

        assert_eq!(resource(&table, "/abs/path"), Some("1"));
        assert_eq!(resource(&table, "/abs/path/xxx"), Some("0"));
        assert_eq!(resource(&table, "/abs/pith"), Some("0"));
        assert_eq!(resource(&table, "/abs/path/longer"), Some("2"));
        assert_eq!(resource(&table, "/abs/path/"), Some("0"));
        assert_eq!(resource(&table, "/animal/bird/eagle/bald"), Some("3"));
        assert_eq!(resource(&table, "/animal/insect/bug"), Some("5"));
        assert_eq!(resource(&table, "/suffix/path.tar.gz"), Some("0"));
        assert_eq!(resource(&table, "/suffix/path.gz"), Some("0"));
        assert_eq!(resource(&table, "/animal/path.gz"), Some("5"));
        assert_eq!(resource(&table, "/Other/path"), Some("0"));
        assert_eq!(resource(&table, "/"), Some("10"));
    }

    #[test]
    fn mixed_regex_match_order() {
        let mut table = RoutingTable::new();
        table.insert(classic("/"), "default");
        table.insert(classic("/animal/bird/*"), "birds");
        table.insert(classic("/animal/fish/*"), "fishes");
        table.insert(classic("/animal/*"), "animals");
        table.insert(PathSpec::regex("^/animal/.*/chat$").unwrap(), "animalChat");
        table.insert(PathSpec::regex("^/animal/.*/cam$").unwrap(), "animalCam");
        table.insert(PathSpec::regex("^/entrance/cam$").unwrap(), "entranceCam");

        assert_eq!(resource(&table, "/animal/bird/eagle"), Some("birds"));
        assert_eq!(resource(&table, "/animal/fish/bass/sea"), Some("fishes"));
        assert_eq!(
            resource(&table, "/animal/peccary/javalina/evolution"),
            Some("animals")
        );
        assert_eq!(resource(&table, "/"), Some("default"));
        assert_eq!(resource(&table, "/animal/bird/eagle/chat"), Some("animalChat"));
        assert_eq!(
            resource(&table, "/animal/bird/penguin/chat"),
            Some("animalChat")
        );
        assert_eq!(resource(&table, "/animal/fish/trout/cam"), Some("animalCam"));
        assert_eq!(resource(&table, "/entrance/cam"), Some("entranceCam"));
    }

    #[test]
    fn mixed_template_match_order() {
        let mut table = RoutingTable::new();
        table.insert(classic("/"), "default");
        table.insert(classic("/animal/bird/*"), "birds");
        table.insert(classic("/animal/fish/*"), "fishes");
        table.insert(classic("/animal/*"), "animals");
        table.insert(
            PathSpec::template("/animal/{kind}/{name}/chat").unwrap(),
            "animalChat",
        );
        table.insert(
            PathSpec::template("/animal/{kind}/{name}/cam").unwrap(),
            "animalCam",
        );
        table.insert(PathSpec::template("/entrance/cam").unwrap(), "entranceCam");

        assert_eq!(resource(&table, "/animal/bird/eagle"), Some("birds"));
        assert_eq!(resource(&table, "/animal/fish/bass/sea"), Some("fishes"));
        assert_eq!(
            resource(&table, "/animal/peccary/javalina/evolution"),
            Some("animals")
        );
        assert_eq!(resource(&table, "/"), Some("default"));
        assert_eq!(resource(&table, "/animal/bird/eagle/chat"), Some("animalChat"));
        assert_eq!(resource(&table, "/animal/fish/trout/cam"), Some("animalCam"));
        assert_eq!(resource(&table, "/entrance/cam"), Some("entranceCam"));
    }

    #[test]
    fn template_specificity() {
        let mut table = RoutingTable::new();
        table.insert(PathSpec::template("/a/{var}/c").unwrap(), "endpointA");
        table.insert(PathSpec::template("/a/b/c").unwrap(), "endpointB");
        table.insert(PathSpec::template("/a/{var1}/{var2}").unwrap(), "endpointC");
        table.insert(PathSpec::template("/{var1}/d").unwrap(), "endpointD");
        table.insert(PathSpec::template("/b/{var2}").unwrap(), "endpointE");

        assert_eq!(resource(&table, "/a/b/c"), Some("endpointB"));
        assert_eq!(resource(&table, "/a/d/c"), Some("endpointA"));
        assert_eq!(resource(&table, "/a/x/y"), Some("endpointC"));
        assert_eq!(resource(&table, "/b/d"), Some("endpointE"));
    }

    #[test]
    fn root_exact_outranks_default() {
        let mut table = RoutingTable::new();
        table.insert(classic(""), "A");
        table.insert(classic("/"), "B");

        assert_eq!(resource(&table, "/"), Some("A"));
        assert_eq!(resource(&table, "/anything"), Some("B"));
    }

    #[test]
    fn empty_prefix_glob_outranks_default() {
        let mut table = RoutingTable::new();
        table.insert(classic("/"), "default");
        table.insert(classic("/*"), "any");

        assert_eq!(resource(&table, "/abs/path"), Some("any"));
        assert_eq!(resource(&table, "/abs/path/xxx"), Some("any"));
        assert_eq!(resource(&table, "/animal/bird/eagle/bald"), Some("any"));
        assert_eq!(resource(&table, "/"), Some("any"));
    }

    #[test]
    fn precedence_is_insertion_order_independent() {
        let mut forward = RoutingTable::new();
        forward.insert(classic("/dump/gzip/*"), "prefix");
        forward.insert(classic("*.txt"), "suffix");

        let mut reverse = RoutingTable::new();
        reverse.insert(classic("*.txt"), "suffix");
        reverse.insert(classic("/dump/gzip/*"), "prefix");

        for table in [&forward, &reverse] {
            assert_eq!(resource(table, "/foo/bar"), None);
            assert_eq!(resource(table, "/dump/gzip/something"), Some("prefix"));
            assert_eq!(resource(table, "/foo/something.txt"), Some("suffix"));
            assert_eq!(resource(table, "/dump/gzip/something.txt"), Some("prefix"));
        }
    }

    #[test]
    fn best_match_is_head_of_matches() {
        let mut table = RoutingTable::new();
        table.insert(classic("/animal/bird/*"), "birds");
        table.insert(classic("/animal/*"), "animals");
        table.insert(classic("/"), "default");

        for path in ["/animal/bird/eagle", "/animal/insect/bug", "/Other", "/"] {
            let head = table.matches(path).next().map(|m| *m.resource());
            assert_eq!(resource(&table, path), head);
        }

        // a second call observes the same sequence from the start
        let first: Vec<_> = matched_declarations(&table, "/animal/bird/eagle");
        let second: Vec<_> = matched_declarations(&table, "/animal/bird/eagle");
        assert_eq!(first, second);
    }

    #[test]
    fn iteration_is_sorted() {
        let mut table = RoutingTable::new();
        table.insert(classic("/"), "default");
        table.insert(classic("*.gz"), "gz");
        table.insert(classic("/animal/*"), "animals");
        table.insert(PathSpec::template("/a/{v}").unwrap(), "template");
        table.insert(classic("/abs/path"), "exact");

        let declarations: Vec<_> = table.iter().map(|m| m.spec().declaration()).collect();
        assert_eq!(
            declarations,
            vec!["/abs/path", "/a/{v}", "/animal/*", "*.gz", "/"]
        );

        // sorting the already-sorted view changes nothing
        let mut specs: Vec<_> = table.iter().map(|m| m.spec().clone()).collect();
        specs.sort();
        let resorted: Vec<_> = specs.iter().map(|s| s.declaration()).collect();
        assert_eq!(resorted, declarations);
    }

    #[test]
    fn reinsert_replaces_resource() {
        let mut table = RoutingTable::new();
        assert_eq!(table.insert(classic("/animal/*"), "old"), None);
        assert_eq!(table.insert(classic("/animal/*"), "new"), Some("old"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("/animal/*"), Some(&"new"));
        assert_eq!(resource(&table, "/animal/bird"), Some("new"));
    }

    #[test]
    fn reinsert_under_other_grammar_replaces_spec() {
        let mut table = RoutingTable::new();

        // "{" is a plain character in the classic grammar, so this compiles
        // as an exact literal under the same declaration as the template
        assert_eq!(table.insert(classic("/a/{v}"), "literal"), None);
        assert_eq!(resource(&table, "/a/{v}"), Some("literal"));
        assert_eq!(resource(&table, "/a/x"), None);

        assert_eq!(
            table.insert(PathSpec::template("/a/{v}").unwrap(), "template"),
            Some("literal")
        );

        assert_eq!(table.len(), 1);
        assert_eq!(resource(&table, "/a/x"), Some("template"));
        assert_eq!(
            table.best_match("/a/x").unwrap().spec().group(),
            crate::SpecGroup::Patterned
        );
    }

    #[test]
    fn remove_by_declaration() {
        let mut table = RoutingTable::new();
        table.insert(classic("/animal/*"), "animals");
        table.insert(classic("/"), "default");

        assert_eq!(table.remove("/animal/*"), Some("animals"));
        assert_eq!(table.remove("/animal/*"), None);
        assert_eq!(table.len(), 1);
        assert_eq!(resource(&table, "/animal/bird"), Some("default"));
    }

    #[test]
    fn lookup_accepts_resource_path_impls() {
        let mut table = RoutingTable::new();
        table.insert(classic("/animal/*"), "animals");

        let owned = String::from("/animal/bird");
        assert_eq!(resource(&table, "/animal/bird"), Some("animals"));
        assert!(table.best_match(&owned).is_some());

        #[cfg(feature = "http")]
        {
            let uri = "http://localhost/animal/bird".parse::<http::Uri>().unwrap();
            assert!(table.best_match(&uri).is_some());
        }
    }
}
