//! Route parameter storage.
//!
//! A route rarely captures more than a handful of segments, so captures live
//! in a small inline vector and are looked up by linear scan.

use smallvec::SmallVec;
use std::slice;

/// Captures kept on the stack before spilling to the heap.
const INLINE_PARAMS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    name: String,
    raw: String,
}

/// Route-matched path parameters for one request.
///
/// Values are stored exactly as the router captured them, which means they
/// are still path-escaped. Unescaping is the job of the reader.
///
/// # Example
///
/// ```rust
/// use hermes_router::Params;
///
/// let mut params = Params::new();
/// params.push("owner", "ada");
/// params.push("repo", "engine%20notes");
///
/// assert_eq!(params.get("repo"), Some("engine%20notes"));
/// assert_eq!(params.names().collect::<Vec<_>>(), ["owner", "repo"]);
/// assert!(params.get("branch").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[Capture; INLINE_PARAMS]>,
}

impl Params {
    /// Returns an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a capture without looking for an existing one.
    ///
    /// Routers use this while walking a match; lookups return the first
    /// capture with a given name.
    pub fn push(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.captures.push(Capture {
            name: name.into(),
            raw: raw.into(),
        });
    }

    /// Replaces the raw value of `name`, appending it when absent, and
    /// returns the value it replaced.
    ///
    /// Used when a request is rewritten and dispatched again with different
    /// route values.
    pub fn set(&mut self, name: impl Into<String>, raw: impl Into<String>) -> Option<String> {
        let name = name.into();
        let raw = raw.into();
        if let Some(capture) = self.captures.iter_mut().find(|c| c.name == name) {
            return Some(std::mem::replace(&mut capture.raw, raw));
        }
        self.captures.push(Capture { name, raw });
        None
    }

    /// Removes every capture named `name`, returning the first one's value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let first = self.position(name)?;
        let removed = self.captures.remove(first);
        self.captures.retain(|c| c.name != name);
        Some(removed.raw)
    }

    /// Raw value of the first capture named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.captures[i].raw.as_str())
    }

    /// Capture names in match order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.captures.iter().map(|c| c.name.as_str())
    }

    /// Number of captures, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// True when the route captured nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// `(name, raw value)` pairs in match order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            captures: self.captures.iter(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.captures.iter().position(|c| c.name == name)
    }
}

/// Iterator over `(name, raw value)` pairs of a [`Params`] set.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    captures: slice::Iter<'a, Capture>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.captures
            .next()
            .map(|c| (c.name.as_str(), c.raw.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.captures.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, raw) in iter {
            params.push(name, raw);
        }
        params
    }
}
