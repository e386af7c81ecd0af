use std::{
    fmt,
    hash::{Hash, Hasher},
};

use derive_more::{Display, Error};

use crate::{
    params::Parameters,
    regex_engine::{escape, Regex},
};

/// Coarse specificity tier of a [`PathSpec`].
///
/// Tiers are ranked ascending from most to least specific, and form the first
/// key of the specificity order: an exact literal always beats a patterned
/// spec, which always beats prefix globs, and so on down to the catch-all
/// default. This keeps hand-written patterns ranked above blanket globs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecGroup {
    /// Matches exactly one path.
    Exact,

    /// Regex and path-template specs.
    Patterned,

    /// Trailing-glob specs of the form `prefix/*`.
    PrefixGlob,

    /// Leading-glob specs of the form `*suffix`.
    SuffixGlob,

    /// The catch-all `"/"` spec.
    Default,
}

/// Error returned when a declaration cannot be compiled into any recognized
/// grammar.
///
/// Raised only while compiling a spec; matching never fails.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MalformedSpec {
    /// Declaration does not begin with a slash (and is not a recognized glob
    /// or the empty root form).
    #[display(fmt = "declaration {:?} does not begin with a slash", declaration)]
    Relative { declaration: String },

    /// `*` used anywhere other than a trailing `/*` or a leading `*`.
    #[display(fmt = "unsupported glob shape in declaration {:?}", declaration)]
    GlobShape { declaration: String },

    /// Template segment with unbalanced or misplaced braces.
    #[display(fmt = "unbalanced template braces in declaration {:?}", declaration)]
    TemplateBraces { declaration: String },

    /// Template placeholder whose name is empty, repeated, or not a valid
    /// identifier.
    #[display(fmt = "invalid placeholder name {:?} in declaration {:?}", name, declaration)]
    PlaceholderName { declaration: String, name: String },

    /// Declaration is not a valid regular expression.
    #[display(fmt = "invalid regular expression {:?}: {}", declaration, message)]
    Regex { declaration: String, message: String },
}

/// A compiled path-matching rule.
///
/// A `PathSpec` is built once from a declaration string and is immutable
/// afterwards; its [group](Self::group) and [specificity](Self::specificity)
/// are pure functions of the declaration. Three grammar families are
/// supported, each with its own constructor:
///
/// - [`new`](Self::new) compiles the classic web-descriptor grammar: exact
///   literals, `prefix/*` globs, `*suffix` globs, the catch-all `"/"`, and
///   the empty root-only form.
/// - [`regex`](Self::regex) compiles a regular expression matched against the
///   whole path.
/// - [`template`](Self::template) compiles a segment template where `{name}`
///   placeholders each bind one non-empty path segment.
///
/// # Examples
/// ```
/// use route_table::PathSpec;
///
/// let spec = PathSpec::new("/animal/*").unwrap();
/// assert!(spec.matches("/animal"));
/// assert!(spec.matches("/animal/bird"));
/// assert!(!spec.matches("/animals"));
///
/// let spec = PathSpec::template("/user/{id}").unwrap();
/// assert!(spec.matches("/user/123"));
/// assert_eq!(spec.captured("/user/123").unwrap().get("id"), Some("123"));
/// ```
#[derive(Debug, Clone)]
pub struct PathSpec {
    declaration: String,
    pub(crate) kind: SpecKind,
}

#[derive(Debug, Clone)]
pub(crate) enum SpecKind {
    /// The empty declaration; matches the root path only.
    Root,

    /// The `"/"` declaration; matches every path.
    Default,

    /// Literal declaration compared by string equality.
    Exact,

    /// `prefix/*` glob; matches at segment boundaries only.
    Prefix,

    /// `*suffix` glob.
    Suffix,

    /// Whole-path regular expression.
    Regex(Regex),

    /// Literal and placeholder segments.
    Template(Template),
}

#[derive(Debug, Clone)]
pub(crate) struct Template {
    regex: Regex,
    pub(crate) segments: Vec<TemplateSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateSegment {
    Literal(String),
    Placeholder(String),
}

impl PathSpec {
    /// Compiles a classic web-descriptor declaration.
    ///
    /// Recognized shapes, in the order they are tried:
    ///
    /// | Declaration | Behavior |
    /// |---|---|
    /// | `""` | matches only `"/"` |
    /// | `"/"` | matches every path |
    /// | `*suffix` | matches paths ending with `suffix` |
    /// | `prefix/*` | matches `prefix` itself and any sub-path below it |
    /// | anything else without `*` | matches by string equality |
    ///
    /// Any other use of `*`, and any relative declaration, is rejected.
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// assert!(PathSpec::new("/foo/bar").unwrap().matches("/foo/bar"));
    /// assert!(PathSpec::new("*.tar.gz").unwrap().matches("/dist/pkg.tar.gz"));
    /// assert!(PathSpec::new("/foo/*").unwrap().matches("/foo/bar"));
    ///
    /// assert!(PathSpec::new("foo/bar").is_err());
    /// assert!(PathSpec::new("/foo/*/bar").is_err());
    /// ```
    pub fn new(declaration: impl Into<String>) -> Result<PathSpec, MalformedSpec> {
        let declaration = declaration.into();

        let kind = match classify(&declaration) {
            Ok(kind) => kind,
            Err(ClassicShape::Relative) => {
                return Err(MalformedSpec::Relative { declaration });
            }
            Err(ClassicShape::Glob) => {
                return Err(MalformedSpec::GlobShape { declaration });
            }
        };

        Ok(PathSpec { declaration, kind })
    }

    /// Compiles a regular expression declaration.
    ///
    /// Matching is always a whole-path match, so the declaration's own anchors
    /// (`^`, `$`) are permitted but redundant; a pattern that would only match
    /// a substring does not match at all.
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::regex("^/animal/.*/chat$").unwrap();
    /// assert!(spec.matches("/animal/bird/eagle/chat"));
    /// assert!(!spec.matches("/animal/bird/eagle/chat/archive"));
    ///
    /// assert!(PathSpec::regex("^/animal/(").is_err());
    /// ```
    pub fn regex(declaration: impl Into<String>) -> Result<PathSpec, MalformedSpec> {
        let declaration = declaration.into();

        let anchored = format!(r"\A(?:{})\z", declaration);
        let regex = Regex::new(&anchored).map_err(|err| MalformedSpec::Regex {
            declaration: declaration.clone(),
            message: err.to_string(),
        })?;

        Ok(PathSpec {
            declaration,
            kind: SpecKind::Regex(regex),
        })
    }

    /// Compiles a path-template declaration.
    ///
    /// The declaration is a `/`-separated sequence of segments, each either a
    /// literal or a `{name}` placeholder. A path matches when it has the same
    /// number of segments, every literal segment is equal positionally, and
    /// every placeholder position holds a non-empty segment. Placeholder
    /// values are available through [`captured`](Self::captured).
    ///
    /// Placeholder names must be unique identifiers (ASCII alphanumerics and
    /// `_`, not starting with a digit).
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::template("/a/{var}/c").unwrap();
    /// assert!(spec.matches("/a/b/c"));
    /// assert!(!spec.matches("/a/b"));
    /// assert!(!spec.matches("/a/b/c/d"));
    ///
    /// assert!(PathSpec::template("/a/{var").is_err());
    /// assert!(PathSpec::template("/a/{}").is_err());
    /// ```
    pub fn template(declaration: impl Into<String>) -> Result<PathSpec, MalformedSpec> {
        let declaration = declaration.into();

        if !declaration.starts_with('/') {
            return Err(MalformedSpec::Relative { declaration });
        }

        let mut segments = Vec::new();
        let mut pattern = String::from(r"\A");

        for raw in declaration[1..].split('/') {
            pattern.push('/');

            if let Some(inner) = raw.strip_prefix('{') {
                let name = match inner.strip_suffix('}') {
                    Some(name) => name,
                    None => {
                        return Err(MalformedSpec::TemplateBraces {
                            declaration: declaration.clone(),
                        });
                    }
                };

                if !is_placeholder_name(name)
                    || segments.contains(&TemplateSegment::Placeholder(name.to_owned()))
                {
                    return Err(MalformedSpec::PlaceholderName {
                        declaration: declaration.clone(),
                        name: name.to_owned(),
                    });
                }

                pattern.push_str("(?P<");
                pattern.push_str(name);
                pattern.push_str(">[^/]+)");
                segments.push(TemplateSegment::Placeholder(name.to_owned()));
            } else {
                if raw.contains('{') || raw.contains('}') {
                    return Err(MalformedSpec::TemplateBraces {
                        declaration: declaration.clone(),
                    });
                }

                pattern.push_str(&escape(raw));
                segments.push(TemplateSegment::Literal(raw.to_owned()));
            }
        }

        pattern.push_str(r"\z");

        // only placeholder names can fail here and those are validated above
        let regex = Regex::new(&pattern).map_err(|err| MalformedSpec::Regex {
            declaration: declaration.clone(),
            message: err.to_string(),
        })?;

        Ok(PathSpec {
            declaration,
            kind: SpecKind::Template(Template { regex, segments }),
        })
    }

    /// Returns the declaration string this spec was compiled from.
    ///
    /// The declaration is the identity key for overwrites in a
    /// [`RoutingTable`](crate::RoutingTable).
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Returns the specificity tier of this spec.
    pub fn group(&self) -> SpecGroup {
        match self.kind {
            SpecKind::Root | SpecKind::Exact => SpecGroup::Exact,
            SpecKind::Default => SpecGroup::Default,
            SpecKind::Prefix => SpecGroup::PrefixGlob,
            SpecKind::Suffix => SpecGroup::SuffixGlob,
            SpecKind::Regex(_) | SpecKind::Template(_) => SpecGroup::Patterned,
        }
    }

    /// Returns the tie-break key used inside a specificity tier.
    ///
    /// Longer keys are more specific. The key is the declared prefix or
    /// suffix length for glob specs, the segment count for templates, and the
    /// declaration length otherwise.
    pub fn specificity(&self) -> usize {
        match &self.kind {
            SpecKind::Prefix => self.prefix().len(),
            SpecKind::Suffix => self.suffix().len(),
            SpecKind::Template(template) => template.segments.len(),
            SpecKind::Root | SpecKind::Default | SpecKind::Exact | SpecKind::Regex(_) => {
                self.declaration.len()
            }
        }
    }

    /// Returns `true` if `path` matches this spec.
    ///
    /// Prefix globs only match at segment boundaries: the character following
    /// the declared prefix must be a `/` or the end of the path, so `/xyz/*`
    /// does not match `/xyz123`.
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::new("/xyz/*").unwrap();
    /// assert!(spec.matches("/xyz"));
    /// assert!(spec.matches("/xyz/"));
    /// assert!(spec.matches("/xyz/123.txt"));
    /// assert!(!spec.matches("/xyz123"));
    /// assert!(!spec.matches("/xyz.123"));
    /// ```
    pub fn matches(&self, path: &str) -> bool {
        match &self.kind {
            SpecKind::Root => path == "/",
            SpecKind::Default => true,
            SpecKind::Exact => path == self.declaration,
            SpecKind::Prefix => match path.strip_prefix(self.prefix()) {
                Some(rem) => rem.is_empty() || rem.starts_with('/'),
                None => false,
            },
            SpecKind::Suffix => path.ends_with(self.suffix()),
            SpecKind::Regex(regex) => regex.is_match(path),
            SpecKind::Template(template) => template.regex.is_match(path),
        }
    }

    /// Returns the portion of `path` consumed by the match.
    ///
    /// For prefix globs this is the declared prefix; for the other classic
    /// forms it is the whole path. Regex and template specs define no
    /// sub-path split and return `None`, as does any non-matching path.
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::new("/foo/*").unwrap();
    /// assert_eq!(spec.matched_prefix("/foo/bar"), Some("/foo"));
    /// assert_eq!(spec.matched_prefix("/foo"), Some("/foo"));
    /// assert_eq!(spec.matched_prefix("/bar"), None);
    /// ```
    pub fn matched_prefix<'p>(&self, path: &'p str) -> Option<&'p str> {
        if !self.matches(path) {
            return None;
        }

        match &self.kind {
            SpecKind::Prefix => Some(&path[..self.prefix().len()]),
            SpecKind::Regex(_) | SpecKind::Template(_) => None,
            _ => Some(path),
        }
    }

    /// Returns the sub-path left over after the matched prefix.
    ///
    /// Only prefix globs can produce a remainder; it starts with the boundary
    /// slash. `None` means the path ends at the prefix (or does not match).
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::new("/foo/*").unwrap();
    /// assert_eq!(spec.remainder("/foo/bar"), Some("/bar"));
    /// assert_eq!(spec.remainder("/foo/"), Some("/"));
    /// assert_eq!(spec.remainder("/foo"), None);
    /// ```
    pub fn remainder<'p>(&self, path: &'p str) -> Option<&'p str> {
        if !self.matches(path) {
            return None;
        }

        match &self.kind {
            SpecKind::Prefix => {
                let rem = &path[self.prefix().len()..];
                if rem.is_empty() {
                    None
                } else {
                    Some(rem)
                }
            }
            _ => None,
        }
    }

    /// Collects named values from `path` if it matches.
    ///
    /// Template specs yield their placeholder bindings; regex specs yield
    /// their named capture groups. Classic specs yield an empty collection on
    /// a match. Returns `None` when `path` does not match.
    ///
    /// # Examples
    /// ```
    /// use route_table::PathSpec;
    ///
    /// let spec = PathSpec::template("/animal/{kind}/{name}").unwrap();
    /// let params = spec.captured("/animal/bird/eagle").unwrap();
    /// assert_eq!(params.get("kind"), Some("bird"));
    /// assert_eq!(params.get("name"), Some("eagle"));
    ///
    /// assert!(spec.captured("/animal/bird").is_none());
    /// ```
    pub fn captured<'p>(&self, path: &'p str) -> Option<Parameters<'_, 'p>> {
        match &self.kind {
            SpecKind::Regex(regex) => {
                let captures = regex.captures(path)?;
                let mut params = Parameters::default();

                for name in regex.capture_names().flatten() {
                    if let Some(value) = captures.name(name) {
                        params.push(name, value.as_str());
                    }
                }

                Some(params)
            }

            SpecKind::Template(template) => {
                let captures = template.regex.captures(path)?;
                let mut params = Parameters::with_capacity(template.segments.len());

                for segment in &template.segments {
                    if let TemplateSegment::Placeholder(name) = segment {
                        // every placeholder participates in a template match
                        let value = captures.name(name)?;
                        params.push(name, value.as_str());
                    }
                }

                Some(params)
            }

            _ => {
                if self.matches(path) {
                    Some(Parameters::default())
                } else {
                    None
                }
            }
        }
    }

    /// Declared prefix of a `Prefix` spec.
    pub(crate) fn prefix(&self) -> &str {
        &self.declaration[..self.declaration.len() - 2]
    }

    /// Declared suffix of a `Suffix` spec.
    pub(crate) fn suffix(&self) -> &str {
        &self.declaration[1..]
    }

    /// Rank of the grammar variant, used only to keep the specificity order
    /// total and consistent with equality.
    pub(crate) fn variant_rank(&self) -> u8 {
        match self.kind {
            SpecKind::Root => 0,
            SpecKind::Default => 1,
            SpecKind::Exact => 2,
            SpecKind::Prefix => 3,
            SpecKind::Suffix => 4,
            SpecKind::Regex(_) => 5,
            SpecKind::Template(_) => 6,
        }
    }
}

enum ClassicShape {
    Relative,
    Glob,
}

fn classify(decl: &str) -> Result<SpecKind, ClassicShape> {
    if decl.is_empty() {
        return Ok(SpecKind::Root);
    }

    if decl == "/" {
        return Ok(SpecKind::Default);
    }

    if let Some(suffix) = decl.strip_prefix('*') {
        // leading glob; the rest is a plain suffix
        if suffix.is_empty() || suffix.contains('*') {
            return Err(ClassicShape::Glob);
        }
        return Ok(SpecKind::Suffix);
    }

    if !decl.starts_with('/') {
        return Err(ClassicShape::Relative);
    }

    if let Some(prefix) = decl.strip_suffix("/*") {
        if prefix.contains('*') {
            return Err(ClassicShape::Glob);
        }
        return Ok(SpecKind::Prefix);
    }

    if decl.contains('*') {
        return Err(ClassicShape::Glob);
    }

    Ok(SpecKind::Exact)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Eq for PathSpec {}

impl PartialEq for PathSpec {
    fn eq(&self, other: &PathSpec) -> bool {
        self.declaration == other.declaration && self.variant_rank() == other.variant_rank()
    }
}

impl Hash for PathSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.declaration.hash(state);
        self.variant_rank().hash(state);
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.declaration)
    }
}
