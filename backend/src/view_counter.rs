//! Fire-and-forget view counting for public portfolio pages.
//!
//! Serving a public page must not wait on a database write, so the handler
//! only pushes a [`ViewEvent`] into a bounded channel. A single background
//! task (`start_view_updater`, spawned in `main.rs`) drains the channel and
//! applies the increments through the store on the blocking pool. When the
//! channel is full the view is dropped and logged; the page is still served.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::storage::PortfolioStore;

/// Capacity of the view event channel.
pub const VIEW_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct ViewEvent {
    pub(crate) portfolio_id: String,
}

/// Cloneable handle given to handlers as `web::Data`.
#[derive(Clone)]
pub struct ViewCounter {
    tx: mpsc::Sender<ViewEvent>,
}

impl ViewCounter {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ViewEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ViewCounter { tx }, rx)
    }

    /// Queues one view of the portfolio. Never blocks; returns `false` when
    /// the view was dropped.
    pub fn record(&self, portfolio_id: &str) -> bool {
        let event = ViewEvent {
            portfolio_id: portfolio_id.to_string(),
        };
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping view of {portfolio_id}: {e}");
                false
            }
        }
    }
}

/// Applies queued view events until every [`ViewCounter`] is dropped.
pub async fn start_view_updater(store: Arc<dyn PortfolioStore>, mut rx: mpsc::Receiver<ViewEvent>) {
    while let Some(event) = rx.recv().await {
        let store = store.clone();
        let id = event.portfolio_id;
        let result = tokio::task::spawn_blocking(move || {
            let outcome = store.increment_view_counters(&id);
            (id, outcome)
        })
        .await;
        match result {
            Ok((_, Ok(()))) => {}
            Ok((id, Err(e))) => log::warn!("could not count view of {id}: {e}"),
            Err(e) => log::error!("view updater task failed: {e}"),
        }
    }
    log::debug!("view updater stopped");
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::storage::fixtures::new_portfolio;
    use crate::storage::MemoryStore;

    #[actix_web::test]
    async fn queued_views_reach_the_store() {
        let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("http://localhost"));
        let saved = store.create("u1", new_portfolio("Viewed")).unwrap();
        let (counter, rx) = ViewCounter::channel(8);
        let updater = tokio::spawn(start_view_updater(store.clone(), rx));

        counter.record(&saved.id);
        counter.record(&saved.id);
        counter.record("unknown-id");
        drop(counter);
        updater.await.unwrap();

        let viewed = store.get(&saved.id).unwrap().unwrap();
        assert_eq!(viewed.views, 2);
        assert_eq!(viewed.visitors, 2);
    }

    #[test]
    fn full_channel_drops_views_instead_of_blocking() {
        let (counter, mut rx) = ViewCounter::channel(1);
        let started = Instant::now();
        assert!(counter.record("a"));
        assert!(!counter.record("b"));
        assert!(!counter.record("c"));
        assert!(started.elapsed() < Duration::from_millis(100));

        assert_eq!(rx.try_recv().unwrap().portfolio_id, "a");
        assert!(rx.try_recv().is_err());
        // room again once the updater has caught up
        assert!(counter.record("d"));
    }
}
