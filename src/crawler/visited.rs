//! Visited-URL set used by the collector for deduplication

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

/// Hash set with O(1) membership checks and inserts
///
/// Entries are never removed: once a URL is visited it stays visited for the
/// rest of the crawl.
#[derive(Debug)]
pub struct VisitedSet<T> {
    elements: HashSet<T>,
}

impl<T: Eq + Hash> VisitedSet<T> {
    pub fn new() -> Self {
        Self {
            elements: HashSet::new(),
        }
    }

    /// Returns true if the element has been recorded
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.elements.contains(element)
    }

    /// Records an element, returning true if it was not present before
    pub fn insert(&mut self, element: T) -> bool {
        self.elements.insert(element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: Eq + Hash> Default for VisitedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
