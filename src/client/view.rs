//! Filtering, sorting and counters over an in-memory candidate list.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::candidate::{Candidate, CandidateStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    NameAsc,
    NameDesc,
    DateAsc,
    #[default]
    DateDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::DateAsc,
        SortOption::DateDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::DateAsc => "date-asc",
            SortOption::DateDesc => "date-desc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort option `{0}`")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| UnknownSortOption(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(CandidateStatus),
}

impl FromStr for StatusFilter {
    type Err = crate::models::candidate::UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub search: String,
    pub status: StatusFilter,
    /// `None` means any skill.
    pub skill: Option<String>,
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        matches_search(candidate, &self.search)
            && matches_status(candidate, self.status)
            && matches_skill(candidate, self.skill.as_deref())
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.status != StatusFilter::All || self.skill.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Case-insensitive substring match on the name. An empty term matches everything.
pub fn matches_search(candidate: &Candidate, term: &str) -> bool {
    candidate
        .name
        .to_lowercase()
        .contains(&term.to_lowercase())
}

pub fn matches_status(candidate: &Candidate, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Only(status) => candidate.status == status,
    }
}

pub fn matches_skill(candidate: &Candidate, skill: Option<&str>) -> bool {
    match skill {
        None => true,
        Some(skill) => candidate.skills.iter().any(|s| s == skill),
    }
}

pub fn compare(a: &Candidate, b: &Candidate, sort: SortOption) -> Ordering {
    match sort {
        SortOption::NameAsc => compare_names(&a.name, &b.name),
        SortOption::NameDesc => compare_names(&b.name, &a.name),
        SortOption::DateAsc => a.created_at.cmp(&b.created_at),
        SortOption::DateDesc => b.created_at.cmp(&a.created_at),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// The filtered, sorted view over `candidates`. The sort is stable.
pub fn visible<'a>(
    candidates: &'a [Candidate],
    filter: &CandidateFilter,
    sort: SortOption,
) -> Vec<&'a Candidate> {
    let mut result: Vec<&Candidate> = candidates.iter().filter(|c| filter.matches(c)).collect();
    result.sort_by(|a, b| compare(a, b, sort));
    result
}

/// Every skill used by at least one candidate, distinct and sorted.
pub fn available_skills(candidates: &[Candidate]) -> Vec<String> {
    candidates
        .iter()
        .flat_map(|c| c.skills.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub interview: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn get(&self, status: CandidateStatus) -> usize {
        match status {
            CandidateStatus::Active => self.active,
            CandidateStatus::Interview => self.interview,
            CandidateStatus::Rejected => self.rejected,
        }
    }
}

pub fn status_counts(candidates: &[Candidate]) -> StatusCounts {
    candidates
        .iter()
        .fold(StatusCounts::default(), |mut counts, candidate| {
            counts.total += 1;
            match candidate.status {
                CandidateStatus::Active => counts.active += 1,
                CandidateStatus::Interview => counts.interview += 1,
                CandidateStatus::Rejected => counts.rejected += 1,
            }
            counts
        })
}
