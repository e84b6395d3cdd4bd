//! Daily report and department feed

use super::session::Session;
use super::visit::FeedVisit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Most authors the directory lists at once
pub const AUTHOR_DIRECTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub drugs: u32,
    #[serde(default)]
    pub tests: u32,
    #[serde(default)]
    pub consults: u32,
}

/// Per-author activity for the day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCounts {
    #[serde(default)]
    pub patients: u32,
    #[serde(default)]
    pub visits: u32,
    #[serde(default)]
    pub critical: u32,
}

/// Aggregate report for a day/department scope plus the department feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyReport {
    pub patients_seen: u32,
    pub totals: ReportTotals,
    /// Human-readable summary lines, as produced by the server
    pub lines: Vec<String>,
    pub by_author_detail: BTreeMap<String, AuthorCounts>,
    /// Feed visits keyed by author display name, newest first
    pub by_author: BTreeMap<String, Vec<FeedVisit>>,
}

impl DailyReport {
    /// Narrow the per-author sections to what `session` may see
    ///
    /// Students only ever see their own entries. Supervisors and admins see
    /// every author, or a single one when `author` is given.
    pub fn visible_to(&self, session: &Session, author: Option<&str>) -> DailyReport {
        let wanted = if session.role.sees_all_authors() {
            author.map(str::trim).filter(|a| !a.is_empty())
        } else {
            Some(session.display_name.as_str())
        };

        let Some(wanted) = wanted else {
            return self.clone();
        };

        DailyReport {
            patients_seen: self.patients_seen,
            totals: self.totals,
            lines: self.lines.clone(),
            by_author_detail: self
                .by_author_detail
                .iter()
                .filter(|(name, _)| name.as_str() == wanted)
                .map(|(name, counts)| (name.clone(), *counts))
                .collect(),
            by_author: self
                .by_author
                .iter()
                .filter(|(name, _)| name.as_str() == wanted)
                .map(|(name, visits)| (name.clone(), visits.clone()))
                .collect(),
        }
    }

    /// Authors matching `query`, favourites first, then by name
    pub fn author_directory(&self, query: &str, favorites: &FavoriteAuthors) -> Vec<String> {
        let query = query.trim().to_lowercase();
        let mut authors: Vec<&String> = self
            .by_author_detail
            .keys()
            .filter(|name| name.to_lowercase().contains(&query))
            .collect();

        authors.sort_by(|a, b| {
            favorites
                .contains(b)
                .cmp(&favorites.contains(a))
                .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        });

        authors
            .into_iter()
            .take(AUTHOR_DIRECTORY_LIMIT)
            .cloned()
            .collect()
    }
}

/// Authors pinned to the top of the directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteAuthors(Vec<String>);

impl FavoriteAuthors {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Add or remove `name`; returns whether it is now a favourite
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|n| n == name) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(name.to_string());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
