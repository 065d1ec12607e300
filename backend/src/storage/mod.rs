//! # Persistence Adapter
//!
//! Everything the application stores goes through [`PortfolioStore`]. The
//! concrete store is built once in `main.rs` and handed to the services as
//! `web::Data<Arc<dyn PortfolioStore>>`; no handler opens its own connection.
//!
//! ## Implementations
//! - `sqlite::SqliteStore`: the production store (one SQLite file, schema
//!   created on open).
//! - `memory::MemoryStore`: an in-process store for tests and demos.
//!
//! Store methods are blocking. Handlers call them through `web::block` so a
//! slow disk never stalls the async workers.

pub mod memory;
pub mod sqlite;

use chrono::{SecondsFormat, Utc};
use common::model::history::{HistoryItem, HistoryKind};
use common::model::portfolio::{NewPortfolio, PortfolioUpdate, SavedPortfolio};

use crate::error::{ServiceError, ServiceResult};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Length of a share id (the path segment of a public link).
pub const SHARE_ID_LEN: usize = 11;
const SHARE_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub trait PortfolioStore: Send + Sync {
    /// Stores a new portfolio at version 1 with a fresh share id.
    fn create(&self, owner_id: &str, portfolio: NewPortfolio) -> ServiceResult<SavedPortfolio>;

    /// Applies a partial update and bumps the version. Fails with
    /// `Conflict` when `expected_version` is set and differs from the stored
    /// version, and with `NotFound` for an unknown id.
    fn update(&self, id: &str, update: PortfolioUpdate) -> ServiceResult<SavedPortfolio>;

    fn get(&self, id: &str) -> ServiceResult<Option<SavedPortfolio>>;

    fn get_by_share_id(&self, share_id: &str) -> ServiceResult<Option<SavedPortfolio>>;

    /// The owner's portfolios, most recently created first.
    fn list(&self, owner_id: &str) -> ServiceResult<Vec<SavedPortfolio>>;

    /// Returns whether a record was removed.
    fn delete(&self, id: &str) -> ServiceResult<bool>;

    /// Adds one view and one visitor. Does not touch `version`.
    fn increment_view_counters(&self, id: &str) -> ServiceResult<()>;

    fn add_history(
        &self,
        owner_id: &str,
        kind: HistoryKind,
        action: &str,
        portfolio: Option<&str>,
    ) -> ServiceResult<HistoryItem>;

    /// Newest first.
    fn list_history(&self, owner_id: &str, limit: usize) -> ServiceResult<Vec<HistoryItem>>;

    /// Returns the number of entries removed.
    fn clear_history(&self, owner_id: &str) -> ServiceResult<usize>;
}

/// RFC 3339 timestamp with millisecond precision, UTC.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Random alphanumeric id of [`SHARE_ID_LEN`] characters.
pub fn new_share_id() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    bytes
        .iter()
        .take(SHARE_ID_LEN)
        .map(|b| SHARE_ID_ALPHABET[*b as usize % SHARE_ID_ALPHABET.len()] as char)
        .collect()
}

pub fn is_share_id(value: &str) -> bool {
    value.len() == SHARE_ID_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn share_link(public_base_url: &str, share_id: &str) -> String {
    format!("{}/portfolio/{}", public_base_url.trim_end_matches('/'), share_id)
}

/// Builds the record stored by `create`.
pub(crate) fn new_record(owner_id: &str, portfolio: NewPortfolio, public_base_url: &str) -> SavedPortfolio {
    let share_id = new_share_id();
    SavedPortfolio {
        id: new_record_id(),
        owner_id: owner_id.to_string(),
        template_id: portfolio.template_id,
        template_name: portfolio.template_name,
        preview_image: portfolio.preview_image,
        name: portfolio.name,
        html_content: portfolio.html_content,
        style: portfolio.style,
        created_at: now(),
        updated_at: None,
        share_link: share_link(public_base_url, &share_id),
        share_id,
        is_public: false,
        views: 0,
        visitors: 0,
        version: 1,
    }
}

/// Checks the optimistic version and applies `update` to `stored` in place.
pub(crate) fn apply_update(stored: &mut SavedPortfolio, update: PortfolioUpdate) -> ServiceResult<()> {
    if let Some(expected) = update.expected_version {
        if expected != stored.version {
            return Err(ServiceError::Conflict {
                id: stored.id.clone(),
                current: stored.version,
                expected,
            });
        }
    }
    if let Some(name) = update.name {
        stored.name = name;
    }
    if let Some(html) = update.html_content {
        stored.html_content = html;
    }
    if let Some(style) = update.style {
        stored.style = style;
    }
    if let Some(is_public) = update.is_public {
        stored.is_public = is_public;
    }
    stored.version += 1;
    stored.updated_at = Some(now());
    Ok(())
}


/// Behaviour every store must share; run against each implementation.
#[cfg(test)]
pub(crate) fn check_store_contract(store: &dyn PortfolioStore) {
    use pretty_assertions::assert_eq;

    let created = store.create("u1", fixtures::new_portfolio("Mine")).unwrap();
    assert_eq!(created.version, 1);
    assert!(!created.is_public);
    assert!(is_share_id(&created.share_id));
    assert!(created.share_link.ends_with(&format!("/portfolio/{}", created.share_id)));
    store.create("u2", fixtures::new_portfolio("Theirs")).unwrap();

    assert_eq!(store.get(&created.id).unwrap(), Some(created.clone()));
    assert_eq!(store.get_by_share_id(&created.share_id).unwrap(), Some(created.clone()));
    assert_eq!(store.list("u1").unwrap().len(), 1);

    let updated = store
        .update(
            &created.id,
            PortfolioUpdate {
                html_content: Some("<html><body>v2</body></html>".into()),
                expected_version: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.name, "Mine");
    assert!(updated.updated_at.is_some());

    let stale = store.update(
        &created.id,
        PortfolioUpdate {
            name: Some("Stale".into()),
            expected_version: Some(1),
            ..Default::default()
        },
    );
    assert!(matches!(stale, Err(ServiceError::Conflict { current: 2, expected: 1, .. })));

    store.increment_view_counters(&created.id).unwrap();
    store.increment_view_counters(&created.id).unwrap();
    let viewed = store.get(&created.id).unwrap().unwrap();
    assert_eq!((viewed.views, viewed.visitors, viewed.version), (2, 2, 2));

    assert!(matches!(
        store.update("missing", PortfolioUpdate::default()),
        Err(ServiceError::NotFound(_))
    ));

    store.add_history("u1", HistoryKind::Create, "Created new portfolio", Some("Mine")).unwrap();
    store.add_history("u1", HistoryKind::Edit, "Updated portfolio", Some("Mine")).unwrap();
    store.add_history("u2", HistoryKind::Profile, "Updated profile information", None).unwrap();
    let history = store.list_history("u1", 50).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, HistoryKind::Edit);
    assert_eq!(store.list_history("u1", 1).unwrap().len(), 1);
    assert_eq!(store.clear_history("u1").unwrap(), 2);
    assert_eq!(store.list_history("u2", 50).unwrap().len(), 1);

    assert!(store.delete(&created.id).unwrap());
    assert!(!store.delete(&created.id).unwrap());
    assert_eq!(store.get(&created.id).unwrap(), None);
}
