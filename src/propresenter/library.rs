//! Read-only snapshot of the `ProPresenter` library.
//!
//! Fetched once per run. Lookup is exact and case-sensitive; the fuzzy
//! matcher only feeds the "did you mean" hint of a miss.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::types::PresentationId;

/// A named presentation in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Presentation identifier.
    pub id: PresentationId,
    /// Presentation name as shown in `ProPresenter`.
    pub name: String,
}

impl LibraryEntry {
    /// Create an entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PresentationId::new(id),
            name: name.into(),
        }
    }
}

/// Library contents at the time of the fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySnapshot {
    entries: Vec<LibraryEntry>,
}

impl LibrarySnapshot {
    /// Wrap fetched entries.
    pub const fn new(entries: Vec<LibraryEntry>) -> Self {
        Self { entries }
    }

    /// All entries in library order.
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose name equals `title` exactly.
    pub fn find(&self, title: &str) -> Option<&LibraryEntry> {
        self.entries.iter().find(|e| e.name == title)
    }

    /// Most similar entry name, for diagnostics after a failed [`find`](Self::find).
    pub fn closest_name(&self, title: &str) -> Option<&str> {
        let matcher = SkimMatcherV2::default().ignore_case();
        self.entries
            .iter()
            .filter_map(|e| matcher.fuzzy_match(&e.name, title).map(|score| (score, e)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, e)| e.name.as_str())
    }
}

impl FromIterator<LibraryEntry> for LibrarySnapshot {
    fn from_iter<I: IntoIterator<Item = LibraryEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn snapshot() -> LibrarySnapshot {
        [
            LibraryEntry::new("p1", "Mighty to Save"),
            LibraryEntry::new("p2", "Cornerstone"),
            LibraryEntry::new("p3", "Cornerstone"),
            LibraryEntry::new("p4", "Way Maker (Live)"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn exact_match_first_wins() {
        let library = snapshot();
        assert_eq!(library.find("Cornerstone").map(|e| e.id.as_str()), Some("p2"));
        assert_eq!(library.find("Mighty to Save").map(|e| e.id.as_str()), Some("p1"));
    }

    #[test]
    fn lookup_is_case_sensitive_and_unnormalized() {
        let library = snapshot();
        assert!(library.find("mighty to save").is_none());
        assert!(library.find(" Mighty to Save").is_none());
        assert!(library.find("Way Maker").is_none());
    }

    #[test]
    fn lookup_is_repeatable() {
        let library = snapshot();
        for title in ["Cornerstone", "Unknown Song"] {
            assert_eq!(library.find(title), library.find(title));
        }
    }

    #[test]
    fn closest_name_suggests_near_miss() {
        let library = snapshot();
        assert_eq!(library.closest_name("Way Maker"), Some("Way Maker (Live)"));
        assert_eq!(library.closest_name("qqqq"), None);
        assert_eq!(LibrarySnapshot::default().closest_name("x"), None);
    }
}
