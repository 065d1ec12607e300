//! SQLite-backed store.
//!
//! One connection, guarded by a mutex, serves every request; calls arrive on
//! actix's blocking pool. The schema is created on open, so a fresh database
//! file needs no migration step.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use common::model::history::{HistoryItem, HistoryKind};
use common::model::portfolio::{NewPortfolio, PortfolioUpdate, SavedPortfolio};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{apply_update, new_record, new_record_id, now, PortfolioStore};
use crate::error::{ServiceError, ServiceResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS portfolios (
    id            TEXT PRIMARY KEY,
    owner_id      TEXT NOT NULL,
    template_id   INTEGER NOT NULL,
    template_name TEXT NOT NULL,
    preview_image TEXT NOT NULL,
    name          TEXT NOT NULL,
    html_content  TEXT NOT NULL,
    style         TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT,
    share_id      TEXT NOT NULL UNIQUE,
    share_link    TEXT NOT NULL,
    is_public     INTEGER NOT NULL DEFAULT 0,
    views         INTEGER NOT NULL DEFAULT 0,
    visitors      INTEGER NOT NULL DEFAULT 0,
    version       INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS portfolios_owner ON portfolios (owner_id);
CREATE TABLE IF NOT EXISTS history (
    id        TEXT PRIMARY KEY,
    owner_id  TEXT NOT NULL,
    action    TEXT NOT NULL,
    kind      TEXT NOT NULL,
    portfolio TEXT,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS history_owner ON history (owner_id, timestamp);
";

const PORTFOLIO_COLUMNS: &str = "id, owner_id, template_id, template_name, preview_image, name, \
     html_content, style, created_at, updated_at, share_id, share_link, is_public, views, visitors, version";

pub struct SqliteStore {
    public_base_url: String,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, public_base_url: impl Into<String>) -> ServiceResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!("opened portfolio database {}", path.as_ref().display());
        Self::with_connection(conn, public_base_url.into())
    }

    pub fn open_in_memory(public_base_url: impl Into<String>) -> ServiceResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, public_base_url.into())
    }

    fn with_connection(conn: Connection, public_base_url: String) -> ServiceResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            public_base_url,
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> ServiceResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ServiceError::Persistence("database connection lock poisoned".to_string()))
    }

    fn find_one(conn: &Connection, column: &str, value: &str) -> ServiceResult<Option<SavedPortfolio>> {
        let sql = format!("SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE {column} = ?1");
        Ok(conn
            .query_row(&sql, params![value], read_portfolio)
            .optional()?)
    }
}

fn read_portfolio(row: &Row) -> rusqlite::Result<SavedPortfolio> {
    let style: String = row.get(7)?;
    let style = serde_json::from_str(&style)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
    Ok(SavedPortfolio {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        template_id: row.get(2)?,
        template_name: row.get(3)?,
        preview_image: row.get(4)?,
        name: row.get(5)?,
        html_content: row.get(6)?,
        style,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        share_id: row.get(10)?,
        share_link: row.get(11)?,
        is_public: row.get(12)?,
        views: row.get::<_, i64>(13)?.max(0) as u64,
        visitors: row.get::<_, i64>(14)?.max(0) as u64,
        version: row.get::<_, i64>(15)?.max(0) as u64,
    })
}

fn read_history(row: &Row) -> rusqlite::Result<HistoryItem> {
    let kind: String = row.get(2)?;
    let kind = HistoryKind::parse(&kind).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, format!("unknown history kind '{kind}'").into())
    })?;
    Ok(HistoryItem {
        id: row.get(0)?,
        action: row.get(1)?,
        kind,
        portfolio: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

impl PortfolioStore for SqliteStore {
    fn create(&self, owner_id: &str, portfolio: NewPortfolio) -> ServiceResult<SavedPortfolio> {
        let record = new_record(owner_id, portfolio, &self.public_base_url);
        let style = serde_json::to_string(&record.style)?;
        self.conn()?.execute(
            &format!(
                "INSERT INTO portfolios ({PORTFOLIO_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                record.id,
                record.owner_id,
                record.template_id,
                record.template_name,
                record.preview_image,
                record.name,
                record.html_content,
                style,
                record.created_at,
                record.updated_at,
                record.share_id,
                record.share_link,
                record.is_public,
                record.views as i64,
                record.visitors as i64,
                record.version as i64,
            ],
        )?;
        Ok(record)
    }

    fn update(&self, id: &str, update: PortfolioUpdate) -> ServiceResult<SavedPortfolio> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut stored = Self::find_one(&tx, "id", id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Portfolio {id}")))?;
        apply_update(&mut stored, update)?;
        tx.execute(
            "UPDATE portfolios SET name = ?1, html_content = ?2, style = ?3, is_public = ?4, \
             version = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                stored.name,
                stored.html_content,
                serde_json::to_string(&stored.style)?,
                stored.is_public,
                stored.version as i64,
                stored.updated_at,
                stored.id,
            ],
        )?;
        tx.commit()?;
        Ok(stored)
    }

    fn get(&self, id: &str) -> ServiceResult<Option<SavedPortfolio>> {
        let conn = self.conn()?;
        Self::find_one(&conn, "id", id)
    }

    fn get_by_share_id(&self, share_id: &str) -> ServiceResult<Option<SavedPortfolio>> {
        let conn = self.conn()?;
        Self::find_one(&conn, "share_id", share_id)
    }

    fn list(&self, owner_id: &str) -> ServiceResult<Vec<SavedPortfolio>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE owner_id = ?1 \
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map(params![owner_id], read_portfolio)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn delete(&self, id: &str) -> ServiceResult<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM portfolios WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn increment_view_counters(&self, id: &str) -> ServiceResult<()> {
        let changed = self.conn()?.execute(
            "UPDATE portfolios SET views = views + 1, visitors = visitors + 1 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(ServiceError::NotFound(format!("Portfolio {id}")));
        }
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
        self.conn()?.execute(
            "INSERT INTO history (id, owner_id, action, kind, portfolio, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.id,
                owner_id,
                item.action,
                item.kind.as_str(),
                item.portfolio,
                item.timestamp
            ],
        )?;
        Ok(item)
    }

    fn list_history(&self, owner_id: &str, limit: usize) -> ServiceResult<Vec<HistoryItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, action, kind, portfolio, timestamp FROM history WHERE owner_id = ?1 \
             ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![owner_id, limit as i64], read_history)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn clear_history(&self, owner_id: &str) -> ServiceResult<usize> {
        Ok(self
            .conn()?
            .execute("DELETE FROM history WHERE owner_id = ?1", params![owner_id])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::new_portfolio;

    #[test]
    fn sqlite_store_contract() {
        let store = SqliteStore::open_in_memory("http://localhost:8080").unwrap();
        crate::storage::check_store_contract(&store);
    }

    #[test]
    fn records_survive_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolios.sqlite");
        let created = {
            let store = SqliteStore::open(&path, "https://folio.example.com").unwrap();
            store.create("u1", new_portfolio("Kept")).unwrap()
        };
        let store = SqliteStore::open(&path, "https://folio.example.com").unwrap();
        let loaded = store.get(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(loaded.share_link.starts_with("https://folio.example.com/portfolio/"));
    }
}
