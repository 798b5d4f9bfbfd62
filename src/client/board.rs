//! The in-memory candidate list a client renders, with optimistic mutations.
//!
//! Every mutation runs in two phases. `begin_*` snapshots the list and applies
//! the expected result right away, returning a [`PendingMutation`]. `settle`
//! then either swaps in the server's copy or restores the snapshot. The async
//! wrappers (`create`, `update`, ...) run both phases around the API call.

use chrono::Utc;
use tracing::{info, warn};

use super::api::{CandidateApi, ClientError};
use super::view::{self, CandidateFilter, SortOption, StatusCounts};
use crate::dto::candidate_dto::{CreateCandidatePayload, UpdateCandidatePayload};
use crate::models::candidate::{Candidate, CandidateStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the user, e.g. a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    StatusChange,
    Delete,
}

impl MutationKind {
    fn success_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Candidate added successfully",
            MutationKind::Update => "Candidate updated successfully",
            MutationKind::StatusChange => "Status updated successfully",
            MutationKind::Delete => "Candidate deleted successfully",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create candidate",
            MutationKind::Update => "Failed to update candidate",
            MutationKind::StatusChange => "Failed to update status",
            MutationKind::Delete => "Failed to delete candidate",
        }
    }
}

/// A speculative change that has been applied but not yet confirmed.
#[derive(Debug, Clone)]
#[must_use = "a pending mutation must be settled"]
pub struct PendingMutation {
    kind: MutationKind,
    target: i32,
    snapshot: Vec<Candidate>,
}

impl PendingMutation {
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// The candidate id the change applies to. Negative for a provisional create.
    pub fn target(&self) -> i32 {
        self.target
    }
}

pub struct CandidateBoard<A> {
    api: A,
    candidates: Vec<Candidate>,
    load_state: LoadState,
    notices: Vec<Notice>,
    next_provisional_id: i32,
}

impl<A: CandidateApi> CandidateBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            candidates: Vec::new(),
            load_state: LoadState::Loading,
            notices: Vec::new(),
            next_provisional_id: -1,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn visible(&self, filter: &CandidateFilter, sort: SortOption) -> Vec<&Candidate> {
        view::visible(&self.candidates, filter, sort)
    }

    pub fn available_skills(&self) -> Vec<String> {
        view::available_skills(&self.candidates)
    }

    pub fn status_counts(&self) -> StatusCounts {
        view::status_counts(&self.candidates)
    }

    /// Fetches the full list. On failure the previous list is kept.
    pub async fn load(&mut self) {
        self.load_state = LoadState::Loading;
        match self.api.list().await {
            Ok(candidates) => {
                info!(count = candidates.len(), "Loaded candidates");
                self.candidates = candidates;
                self.load_state = LoadState::Ready;
            }
            Err(err) => {
                warn!(error = %err, "Failed to load candidates");
                let message = "Failed to load candidates".to_string();
                self.push(NoticeKind::Error, message.clone());
                self.load_state = LoadState::Failed(message);
            }
        }
    }

    pub async fn retry(&mut self) {
        self.load().await
    }

    pub fn begin_create(&mut self, payload: &CreateCandidatePayload) -> PendingMutation {
        let snapshot = self.candidates.clone();
        let id = self.next_provisional_id;
        self.next_provisional_id -= 1;

        let now = Utc::now();
        let provisional = Candidate {
            id,
            name: payload.name.trim().to_string(),
            position: payload.position.trim().to_string(),
            status: payload.status.parse().unwrap_or_default(),
            email: payload.email.trim().to_lowercase(),
            phone: payload.phone.trim().to_string(),
            description: payload.description.trim().to_string(),
            skills: payload.skills.clone(),
            created_at: now,
            updated_at: now,
        };
        self.candidates.insert(0, provisional);

        PendingMutation {
            kind: MutationKind::Create,
            target: id,
            snapshot,
        }
    }

    pub fn begin_update(&mut self, id: i32, payload: &UpdateCandidatePayload) -> PendingMutation {
        let snapshot = self.candidates.clone();
        if let Some(candidate) = self.find_mut(id) {
            apply_update(candidate, payload);
            candidate.updated_at = Utc::now();
        }
        PendingMutation {
            kind: MutationKind::Update,
            target: id,
            snapshot,
        }
    }

    pub fn begin_status_change(&mut self, id: i32, status: CandidateStatus) -> PendingMutation {
        let snapshot = self.candidates.clone();
        if let Some(candidate) = self.find_mut(id) {
            candidate.status = status;
            candidate.updated_at = Utc::now();
        }
        PendingMutation {
            kind: MutationKind::StatusChange,
            target: id,
            snapshot,
        }
    }

    pub fn begin_delete(&mut self, id: i32) -> PendingMutation {
        let snapshot = self.candidates.clone();
        self.candidates.retain(|c| c.id != id);
        PendingMutation {
            kind: MutationKind::Delete,
            target: id,
            snapshot,
        }
    }

    /// Confirms or rolls back `pending`. `Ok(Some(_))` carries the server's
    /// copy of the touched candidate, `Ok(None)` a confirmed delete.
    pub fn settle(
        &mut self,
        pending: PendingMutation,
        outcome: Result<Option<Candidate>, &ClientError>,
    ) {
        match outcome {
            Ok(confirmed) => {
                if let Some(server) = confirmed {
                    self.replace(pending.target, server, pending.kind);
                }
                self.push(NoticeKind::Success, pending.kind.success_message().to_string());
            }
            Err(err) => {
                warn!(kind = ?pending.kind, id = pending.target, error = %err, "Mutation failed, rolling back");
                self.candidates = pending.snapshot;
                let message = err
                    .server_message()
                    .unwrap_or(pending.kind.failure_message())
                    .to_string();
                self.push(NoticeKind::Error, message);
            }
        }
    }

    pub async fn create(&mut self, payload: &CreateCandidatePayload) -> Result<Candidate, ClientError> {
        let pending = self.begin_create(payload);
        let result = self.api.create(payload).await;
        self.settle(pending, result.as_ref().map(|c| Some(c.clone())));
        result
    }

    pub async fn update(
        &mut self,
        id: i32,
        payload: &UpdateCandidatePayload,
    ) -> Result<Candidate, ClientError> {
        let pending = self.begin_update(id, payload);
        let result = self.api.update(id, payload).await;
        self.settle(pending, result.as_ref().map(|c| Some(c.clone())));
        result
    }

    pub async fn update_status(
        &mut self,
        id: i32,
        status: CandidateStatus,
    ) -> Result<Candidate, ClientError> {
        let pending = self.begin_status_change(id, status);
        let result = self.api.update_status(id, status).await;
        self.settle(pending, result.as_ref().map(|c| Some(c.clone())));
        result
    }

    pub async fn delete(&mut self, id: i32) -> Result<(), ClientError> {
        let pending = self.begin_delete(id);
        let result = self.api.delete(id).await;
        self.settle(pending, result.as_ref().map(|_| None));
        result
    }

    fn find_mut(&mut self, id: i32) -> Option<&mut Candidate> {
        self.candidates.iter_mut().find(|c| c.id == id)
    }

    fn replace(&mut self, target: i32, server: Candidate, kind: MutationKind) {
        match self.find_mut(target) {
            Some(slot) => *slot = server,
            // The list was reloaded while the create was in flight.
            None if kind == MutationKind::Create => {
                if !self.candidates.iter().any(|c| c.id == server.id) {
                    self.candidates.insert(0, server);
                }
            }
            None => {}
        }
    }

    fn push(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
    }
}

fn apply_update(candidate: &mut Candidate, payload: &UpdateCandidatePayload) {
    if let Some(name) = &payload.name {
        candidate.name = name.trim().to_string();
    }
    if let Some(position) = &payload.position {
        candidate.position = position.trim().to_string();
    }
    if let Some(email) = &payload.email {
        candidate.email = email.trim().to_lowercase();
    }
    if let Some(phone) = &payload.phone {
        candidate.phone = phone.trim().to_string();
    }
    if let Some(description) = &payload.description {
        candidate.description = description.trim().to_string();
    }
    if let Some(status) = payload.status.as_deref().and_then(|s| s.parse().ok()) {
        candidate.status = status;
    }
    if let Some(skills) = &payload.skills {
        candidate.skills = skills.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::MockCandidateApi;
    use crate::client::view::fixtures::candidate;
    use tokio_test::{assert_err, assert_ok};
    use CandidateStatus::*;

    fn sample() -> Vec<Candidate> {
        vec![
            candidate(1, "Alex Johnson", Active, &["Rust"], 1),
            candidate(2, "Maria Garcia", Interview, &["React"], 2),
        ]
    }

    fn api_error(message: &str) -> ClientError {
        ClientError::Api {
            status: 400,
            message: message.to_string(),
        }
    }

    async fn loaded(mut api: MockCandidateApi) -> CandidateBoard<MockCandidateApi> {
        api.expect_list().times(1).returning(|| Ok(sample()));
        let mut board = CandidateBoard::new(api);
        board.load().await;
        board
    }

    #[tokio::test]
    async fn status_change_is_visible_before_the_server_answers() {
        let mut board = loaded(MockCandidateApi::new()).await;
        assert_eq!(board.load_state(), &LoadState::Ready);

        let pending = board.begin_status_change(1, Rejected);
        assert_eq!(board.candidates()[0].status, Rejected);
        assert_eq!(board.candidates()[0].name, "Alex Johnson");

        let mut server = candidate(1, "Alex Johnson", Rejected, &["Rust"], 1);
        server.updated_at = server.created_at + chrono::Duration::minutes(30);
        board.settle(pending, Ok(Some(server.clone())));

        assert_eq!(board.candidates()[0], server);
        assert_eq!(
            board.take_notices(),
            vec![Notice {
                kind: NoticeKind::Success,
                message: "Status updated successfully".into()
            }]
        );
    }

    #[tokio::test]
    async fn failed_update_restores_the_snapshot() {
        let mut api = MockCandidateApi::new();
        api.expect_update()
            .withf(|id, payload| *id == 2 && payload.name.as_deref() == Some("Mary"))
            .times(1)
            .returning(|_, _| Err(api_error("Email already exists")));
        let mut board = loaded(api).await;
        let before = board.candidates().to_vec();

        let payload = UpdateCandidatePayload {
            name: Some("Mary".into()),
            skills: Some(vec!["Go".into()]),
            ..Default::default()
        };
        let err = assert_err!(board.update(2, &payload).await);

        assert_eq!(err.server_message(), Some("Email already exists"));
        assert_eq!(board.candidates(), before.as_slice());
        assert_eq!(
            board.take_notices(),
            vec![Notice {
                kind: NoticeKind::Error,
                message: "Email already exists".into()
            }]
        );
    }

    #[tokio::test]
    async fn failed_delete_without_server_message_uses_the_fallback() {
        let mut api = MockCandidateApi::new();
        api.expect_delete()
            .times(1)
            .returning(|_| Err(ClientError::BaseUrl("unreachable".into())));
        let mut board = loaded(api).await;

        let pending = board.begin_delete(1);
        assert_eq!(board.candidates().len(), 1);
        board.settle(pending, Err(&ClientError::BaseUrl("unreachable".into())));
        assert_eq!(board.candidates().len(), 2);

        assert_err!(board.delete(1).await);
        assert_eq!(board.candidates().len(), 2);
        let notices = board.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices
            .iter()
            .all(|n| n.kind == NoticeKind::Error && n.message == "Failed to delete candidate"));
    }

    #[tokio::test]
    async fn create_shows_a_provisional_entry_then_the_server_copy() {
        let mut api = MockCandidateApi::new();
        api.expect_create()
            .times(1)
            .returning(|_| Ok(candidate(9, "Sarah Williams", Active, &["AWS"], 5)));
        let mut board = loaded(api).await;

        let payload = CreateCandidatePayload {
            name: "Sarah Williams".into(),
            position: "DevOps".into(),
            email: "Sarah@Example.com".into(),
            phone: "+1-555-0104".into(),
            description: "Cloud".into(),
            status: "active".into(),
            skills: vec!["AWS".into()],
        };
        let pending = board.begin_create(&payload);
        assert!(pending.target() < 0);
        assert_eq!(board.candidates()[0].id, pending.target());
        assert_eq!(board.candidates()[0].email, "sarah@example.com");
        board.settle(pending, Err(&api_error("Email already exists")));
        assert_eq!(board.candidates().len(), 2);

        let created = assert_ok!(board.create(&payload).await);
        assert_eq!(created.id, 9);
        assert_eq!(board.candidates().len(), 3);
        assert_eq!(board.candidates()[0].id, 9);
        assert!(board.candidates().iter().all(|c| c.id > 0));
    }

    #[tokio::test]
    async fn delete_removes_the_entry_for_good() {
        let mut api = MockCandidateApi::new();
        api.expect_delete().withf(|id| *id == 2).returning(|_| Ok(()));
        let mut board = loaded(api).await;

        assert_ok!(board.delete(2).await);
        assert_eq!(board.candidates().len(), 1);
        assert_eq!(board.status_counts().interview, 0);
        assert_eq!(board.take_notices()[0].message, "Candidate deleted successfully");
    }

    #[tokio::test]
    async fn failed_load_can_be_retried() {
        let mut api = MockCandidateApi::new();
        let mut calls = 0;
        api.expect_list().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(ClientError::Api {
                    status: 500,
                    message: "Failed to fetch candidates".into(),
                })
            } else {
                Ok(sample())
            }
        });

        let mut board = CandidateBoard::new(api);
        board.load().await;
        assert_eq!(
            board.load_state(),
            &LoadState::Failed("Failed to load candidates".into())
        );
        assert!(board.candidates().is_empty());
        assert_eq!(board.take_notices()[0].kind, NoticeKind::Error);

        board.retry().await;
        assert_eq!(board.load_state(), &LoadState::Ready);
        assert_eq!(board.available_skills(), vec!["React", "Rust"]);
        assert!(board.take_notices().is_empty());
    }
}
