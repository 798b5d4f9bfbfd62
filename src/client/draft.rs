//! Form state for the create and edit dialogs. A draft never touches the
//! board until it is submitted as a payload.

use std::collections::BTreeSet;
use tracing::warn;

use super::api::CandidateApi;
use crate::dto::candidate_dto::{CreateCandidatePayload, UpdateCandidatePayload};
use crate::models::candidate::{Candidate, CandidateStatus};

/// Selected skill tags plus the catalogue they are picked from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillPicker {
    selected: Vec<String>,
    known: BTreeSet<String>,
}

impl SkillPicker {
    pub fn with_selected(selected: Vec<String>) -> Self {
        Self {
            selected,
            known: BTreeSet::new(),
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn known(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn is_selected(&self, skill: &str) -> bool {
        self.selected.iter().any(|s| s == skill)
    }

    pub fn extend_known<I: IntoIterator<Item = String>>(&mut self, skills: I) {
        self.known.extend(skills);
    }

    pub fn toggle(&mut self, skill: &str) {
        if self.is_selected(skill) {
            self.remove(skill);
        } else {
            self.selected.push(skill.to_string());
        }
    }

    /// Selects a typed-in skill and adds it to the catalogue. Returns false
    /// for blank or already-selected input.
    pub fn add_custom(&mut self, raw: &str) -> bool {
        let skill = raw.trim();
        if skill.is_empty() || self.is_selected(skill) {
            return false;
        }
        self.selected.push(skill.to_string());
        self.known.insert(skill.to_string());
        true
    }

    pub fn remove(&mut self, skill: &str) {
        self.selected.retain(|s| s != skill);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub name: String,
    pub position: String,
    pub status: CandidateStatus,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub skills: SkillPicker,
}

impl Default for CandidateDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateDraft {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            position: String::new(),
            status: CandidateStatus::Active,
            email: String::new(),
            phone: String::new(),
            description: String::new(),
            skills: SkillPicker::default(),
        }
    }

    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            position: candidate.position.clone(),
            status: candidate.status,
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            description: candidate.description.clone(),
            skills: SkillPicker::with_selected(candidate.skills.clone()),
        }
    }

    /// Seeds the skill catalogue from the server. A failure only leaves the
    /// catalogue as it was.
    pub async fn load_known_skills<A: CandidateApi + ?Sized>(&mut self, api: &A) {
        match api.list_skills().await {
            Ok(skills) => self.skills.extend_known(skills),
            Err(err) => warn!(error = %err, "Failed to load skills"),
        }
    }

    pub fn to_create_payload(&self) -> CreateCandidatePayload {
        CreateCandidatePayload {
            name: self.name.clone(),
            position: self.position.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            description: self.description.clone(),
            status: self.status.to_string(),
            skills: self.skills.selected().to_vec(),
        }
    }

    /// An edit sends every field, so the server replaces the skill set wholesale.
    pub fn to_update_payload(&self) -> UpdateCandidatePayload {
        UpdateCandidatePayload {
            name: Some(self.name.clone()),
            position: Some(self.position.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status.to_string()),
            skills: Some(self.skills.selected().to_vec()),
        }
    }
}
