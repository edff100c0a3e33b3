//! Query builder - turns raw search/filter parameters into a storage-neutral
//! predicate.
//!
//! Absent or blank parameters mean "no constraint", never "match nothing".
//! Backends either evaluate [`ArtQuery::matches`] in process or compile the
//! fields into their own query language.

use crate::domain::ArtPost;

/// Predicate over art posts. All present constraints combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtQuery {
    /// Case-insensitive substring matched against title OR poster name.
    pub search: Option<String>,
    /// Exact art type.
    pub art_type: Option<String>,
    /// The post must carry every one of these subjects.
    pub subjects: Vec<String>,
}

impl ArtQuery {
    /// The empty predicate: every post matches.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: Option<&str>) -> Self {
        Self {
            search: non_blank(term),
            ..Self::default()
        }
    }

    /// `subjects` is the comma-delimited form used in query strings.
    pub fn filter(art_type: Option<&str>, subjects: Option<&str>) -> Self {
        Self {
            art_type: non_blank(art_type),
            subjects: subjects.map(split_subjects).unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Combine search and filter parameters from one request.
    pub fn from_params(
        search: Option<&str>,
        art_type: Option<&str>,
        subjects: Option<&str>,
    ) -> Self {
        Self {
            search: non_blank(search),
            ..Self::filter(art_type, subjects)
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.is_none() && self.art_type.is_none() && self.subjects.is_empty()
    }

    /// Evaluate the predicate against a single post.
    pub fn matches(&self, post: &ArtPost) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            if !post.title.to_lowercase().contains(&term)
                && !post.poster_name.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(art_type) = &self.art_type {
            if &post.art_type != art_type {
                return false;
            }
        }

        self.subjects
            .iter()
            .all(|wanted| post.subjects.iter().any(|s| s == wanted))
    }
}

/// Split a comma-delimited subject list, dropping blank items.
pub fn split_subjects(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
