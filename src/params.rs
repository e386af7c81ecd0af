use std::ops::Index;

/// Named values captured from a matched path.
///
/// Produced by [`PathSpec::captured`](crate::PathSpec::captured). Template
/// specs yield one entry per placeholder segment; regex specs yield one entry
/// per named capture group that participated in the match. Specs without a
/// capture model produce an empty collection.
#[derive(Debug, Clone, Default)]
pub struct Parameters<'s, 'p> {
    items: Vec<(&'s str, &'p str)>,
}

impl<'s, 'p> Parameters<'s, 'p> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Parameters {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &'s str, value: &'p str) {
        self.items.push((name, value));
    }

    /// Returns the captured value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&'p str> {
        self.items
            .iter()
            .find(|(item_name, _)| *item_name == name)
            .map(|(_, value)| *value)
    }

    /// Returns number of captured values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'s str, &'p str)> + '_ {
        self.items.iter().copied()
    }
}

impl<'s, 'p> Index<&str> for Parameters<'s, 'p> {
    type Output = str;

    fn index(&self, name: &str) -> &str {
        self.get(name)
            .expect("value for parameter is not available")
    }
}
