//! In-process store. State lives for the life of the value; used by tests and
//! by `PB_DATABASE=:memory:`.

use std::sync::{Mutex, MutexGuard};

use common::model::history::{HistoryItem, HistoryKind};
use common::model::portfolio::{NewPortfolio, PortfolioUpdate, SavedPortfolio};

use super::{apply_update, new_record, new_record_id, now, PortfolioStore};
use crate::error::{ServiceError, ServiceResult};

#[derive(Default)]
struct Inner {
    /// Creation order.
    portfolios: Vec<SavedPortfolio>,
    /// (owner, entry) in insertion order.
    history: Vec<(String, HistoryItem)>,
}

pub struct MemoryStore {
    public_base_url: String,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        MemoryStore {
            public_base_url: public_base_url.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| ServiceError::Persistence("memory store lock poisoned".to_string()))
    }
}

impl PortfolioStore for MemoryStore {
    fn create(&self, owner_id: &str, portfolio: NewPortfolio) -> ServiceResult<SavedPortfolio> {
        let record = new_record(owner_id, portfolio, &self.public_base_url);
        self.lock()?.portfolios.push(record.clone());
        Ok(record)
    }

    fn update(&self, id: &str, update: PortfolioUpdate) -> ServiceResult<SavedPortfolio> {
        let mut inner = self.lock()?;
        let stored = inner
            .portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Portfolio {id}")))?;
        apply_update(stored, update)?;
        Ok(stored.clone())
    }

    fn get(&self, id: &str) -> ServiceResult<Option<SavedPortfolio>> {
        Ok(self.lock()?.portfolios.iter().find(|p| p.id == id).cloned())
    }

    fn get_by_share_id(&self, share_id: &str) -> ServiceResult<Option<SavedPortfolio>> {
        Ok(self
            .lock()?
            .portfolios
            .iter()
            .find(|p| p.share_id == share_id)
            .cloned())
    }

    fn list(&self, owner_id: &str) -> ServiceResult<Vec<SavedPortfolio>> {
        Ok(self
            .lock()?
            .portfolios
            .iter()
            .rev()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &str) -> ServiceResult<bool> {
        let mut inner = self.lock()?;
        let before = inner.portfolios.len();
        inner.portfolios.retain(|p| p.id != id);
        Ok(inner.portfolios.len() != before)
    }

    fn increment_view_counters(&self, id: &str) -> ServiceResult<()> {
        let mut inner = self.lock()?;
        let stored = inner
            .portfolios
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Portfolio {id}")))?;
        stored.views += 1;
        stored.visitors += 1;
        Ok(())
    }

    fn add_history(
        &self,
        owner_id: &str,
        kind: HistoryKind,
        action: &str,
        portfolio: Option<&str>,
    ) -> ServiceResult<HistoryItem> {
        let item = HistoryItem {
            id: new_record_id(),
            action: action.to_string(),
            kind,
            portfolio: portfolio.map(str::to_string),
            timestamp: now(),
        };
        self.lock()?.history.push((owner_id.to_string(), item.clone()));
        Ok(item)
    }

    fn list_history(&self, owner_id: &str, limit: usize) -> ServiceResult<Vec<HistoryItem>> {
        Ok(self
            .lock()?
            .history
            .iter()
            .rev()
            .filter(|(owner, _)| owner == owner_id)
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn clear_history(&self, owner_id: &str) -> ServiceResult<usize> {
        let mut inner = self.lock()?;
        let before = inner.history.len();
        inner.history.retain(|(owner, _)| owner != owner_id);
        Ok(before - inner.history.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_contract() {
        super::super::check_store_contract(&MemoryStore::new("http://localhost:8080"));
    }
}
