//! Client-side state for a candidate board backed by the REST API.

pub mod api;
pub mod board;
pub mod draft;
pub mod view;

pub use api::{CandidateApi, ClientError, HttpCandidateApi};
pub use board::{CandidateBoard, LoadState, MutationKind, Notice, NoticeKind, PendingMutation};
pub use draft::{CandidateDraft, SkillPicker};
pub use view::{CandidateFilter, SortOption, StatusFilter};
