use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::models::candidate::CandidateStatus;
use crate::utils::validation::{failure, validate};

/// Order in which field errors are reported; only the first one is returned.
const FIELD_ORDER: [&str; 7] = [
    "name",
    "position",
    "email",
    "phone",
    "description",
    "status",
    "skills",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCandidatePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required and must be a non-empty string"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        message = "Position is required and must be a non-empty string"
    ))]
    pub position: String,
    #[serde(default)]
    #[validate(contains(pattern = "@", message = "Valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Skills must be a non-empty array"),
        custom(function = "validate_skill_names")
    )]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCandidatePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name must be a non-empty string"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Position must be a non-empty string"))]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(contains(pattern = "@", message = "Valid email is required"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Phone must be a non-empty string"))]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Description must be a non-empty string"))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_skill_names"))]
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// A validated, normalized create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub name: String,
    pub position: String,
    pub status: CandidateStatus,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// A validated update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateChanges {
    pub name: Option<String>,
    pub position: Option<String>,
    pub status: Option<CandidateStatus>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
}

impl CreateCandidatePayload {
    pub fn into_new_candidate(self) -> Result<NewCandidate> {
        let payload = Self {
            name: self.name.trim().to_string(),
            position: self.position.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            skills: normalize_skills(self.skills),
        };
        validate(&payload, &FIELD_ORDER)?;

        Ok(NewCandidate {
            status: parse_status(&payload.status),
            name: payload.name,
            position: payload.position,
            email: payload.email,
            phone: payload.phone,
            description: payload.description,
            skills: payload.skills,
        })
    }
}

impl UpdateCandidatePayload {
    pub fn into_changes(self) -> Result<CandidateChanges> {
        let payload = Self {
            name: trimmed(self.name),
            position: trimmed(self.position),
            email: self.email.as_deref().map(normalize_email),
            phone: trimmed(self.phone),
            description: trimmed(self.description),
            status: self.status,
            skills: self.skills.map(normalize_skills),
        };
        validate(&payload, &FIELD_ORDER)?;

        Ok(CandidateChanges {
            status: payload.status.as_deref().map(parse_status),
            name: payload.name,
            position: payload.position,
            email: payload.email,
            phone: payload.phone,
            description: payload.description,
            skills: payload.skills,
        })
    }
}

impl UpdateStatusPayload {
    pub fn into_status(self) -> Result<CandidateStatus> {
        validate(&self, &FIELD_ORDER)?;
        Ok(parse_status(&self.status))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims every name and drops repeats, keeping the first occurrence.
fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim().to_string();
        if !seen.contains(&skill) {
            seen.push(skill);
        }
    }
    seen
}

// Only reached after `validate_status` accepted the value.
fn parse_status(raw: &str) -> CandidateStatus {
    raw.parse().unwrap_or_default()
}

fn validate_status(status: &str) -> std::result::Result<(), ValidationError> {
    if status.is_empty() {
        return Err(failure("status_required", "Status is required"));
    }
    status
        .parse::<CandidateStatus>()
        .map(|_| ())
        .map_err(|_| {
            failure(
                "status_invalid",
                "Status must be one of: active, interview, rejected",
            )
        })
}

fn validate_skill_names(skills: &[String]) -> std::result::Result<(), ValidationError> {
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err(failure(
            "skill_empty",
            "All skills must be non-empty strings",
        ));
    }
    Ok(())
}
