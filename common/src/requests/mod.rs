//! JSON payloads exchanged between the editor frontend and the backend that
//! are not plain model types.

use serde::{Deserialize, Serialize};

/// Header carrying the authenticated owner's id. Authentication itself is
/// handled upstream; requests without it act as `ANONYMOUS_OWNER`.
pub const OWNER_HEADER: &str = "X-Owner-Id";
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Query string of `GET /api/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of entries, newest first. Defaults to 50.
    pub limit: Option<usize>,
}

/// Body of every non-2xx JSON response produced by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error class, e.g. `conflict` or `not_found`.
    pub kind: String,
    pub message: String,
}
