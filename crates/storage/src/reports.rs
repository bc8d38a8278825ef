//! Report and session repositories on top of a [`KeyValueStore`].

use civic_core::{Report, ReportId, Session};
use serde_json::Value;
use tracing::{debug, warn};

use super::{KeyValueStore, Result};

/// Key holding the JSON array of reports.
pub const REPORTS_KEY: &str = "civicsense_reports";

/// Key holding the current login session.
pub const SESSION_KEY: &str = "civicsense_user_session";

/// The report list, stored as a single JSON array under [`REPORTS_KEY`].
pub struct ReportStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ReportStore<S> {
    /// Wrap a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Raw array entries, parsed or not.
    async fn load_raw(&self) -> Vec<Value> {
        match self.store.get(REPORTS_KEY).await {
            Ok(Some(Value::Array(items))) => items,
            Ok(Some(_)) => {
                warn!("Report store does not hold an array, treating as empty");
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable report store: {}", e);
                Vec::new()
            }
        }
    }

    /// Load every report.
    ///
    /// A missing key, a value that is not an array, or an unreadable file
    /// all load as an empty list. Individual entries that do not parse are
    /// skipped here but stay in storage across writes.
    pub async fn load_all(&self) -> Vec<Report> {
        let reports: Vec<Report> = self
            .load_raw()
            .await
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Report>(item) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Skipping malformed report: {}", e);
                    None
                }
            })
            .collect();

        debug!("Loaded {} reports", reports.len());
        reports
    }

    /// Replace the stored reports with `reports`.
    ///
    /// Parseable entries are overwritten in order; entries that do not parse
    /// as a report keep their position. Extra reports are appended.
    pub async fn save_all(&mut self, reports: &[Report]) -> Result<()> {
        let mut incoming = reports.iter();
        let mut items = Vec::with_capacity(reports.len());

        for item in self.load_raw().await {
            if serde_json::from_value::<Report>(item.clone()).is_err() {
                items.push(item);
            } else if let Some(report) = incoming.next() {
                items.push(serde_json::to_value(report)?);
            }
        }
        for report in incoming {
            items.push(serde_json::to_value(report)?);
        }

        self.store.set(REPORTS_KEY, &Value::Array(items)).await
    }

    /// Remove every report.
    pub async fn clear(&mut self) -> Result<()> {
        self.store.remove(REPORTS_KEY).await
    }

    /// Find one report by id.
    pub async fn find(&self, id: &ReportId) -> Option<Report> {
        self.load_all().await.into_iter().find(|r| &r.id == id)
    }

    /// Append a new report.
    pub async fn push(&mut self, report: &Report) -> Result<()> {
        let mut items = self.load_raw().await;
        items.push(serde_json::to_value(report)?);
        self.store.set(REPORTS_KEY, &Value::Array(items)).await
    }

    /// Replace the stored entry with the same id. Returns false if absent.
    pub async fn replace(&mut self, report: &Report) -> Result<bool> {
        let mut items = self.load_raw().await;
        let Some(slot) = items
            .iter_mut()
            .find(|item| item.get("id").and_then(Value::as_str) == Some(report.id.as_str()))
        else {
            return Ok(false);
        };
        *slot = serde_json::to_value(report)?;
        self.store.set(REPORTS_KEY, &Value::Array(items)).await?;
        Ok(true)
    }
}

/// The login session, stored under [`SESSION_KEY`].
pub struct SessionStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current session. Unreadable data counts as logged out.
    pub async fn load(&self) -> Option<Session> {
        match self.store.get(SESSION_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value)
                .map_err(|e| warn!("Ignoring malformed session: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    /// Store a session.
    pub async fn save(&mut self, session: &Session) -> Result<()> {
        let value = serde_json::to_value(session)?;
        self.store.set(SESSION_KEY, &value).await
    }

    /// Log out.
    pub async fn clear(&mut self) -> Result<()> {
        self.store.remove(SESSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use civic_core::{Category, Role};
    use serde_json::json;

    fn report(id: &str) -> Report {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        Report::new(ReportId::from(id), "Title", "Description", Category::Other, at)
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty() {
        let store = ReportStore::new(MemoryStorage::new());
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_array_loads_empty() {
        let mut kv = MemoryStorage::new();
        kv.set(REPORTS_KEY, &json!({"oops": true})).await.unwrap();
        let store = ReportStore::new(kv);
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entries_skipped() {
        let mut kv = MemoryStorage::new();
        let good = serde_json::to_value(report("R-1")).unwrap();
        kv.set(REPORTS_KEY, &json!([good, {"id": "R-2"}])).await.unwrap();
        let store = ReportStore::new(kv);
        let loaded = store.load_all().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "R-1");
    }

    #[tokio::test]
    async fn test_push_find_replace_clear() {
        let mut store = ReportStore::new(MemoryStorage::new());
        store.push(&report("R-1")).await.unwrap();
        store.push(&report("R-2")).await.unwrap();
        assert_eq!(store.load_all().await.len(), 2);

        let mut updated = store.find(&ReportId::from("R-2")).await.unwrap();
        updated.address = "Sector 15".to_string();
        assert!(store.replace(&updated).await.unwrap());
        assert_eq!(store.find(&ReportId::from("R-2")).await.unwrap().address, "Sector 15");

        assert!(!store.replace(&report("R-9")).await.unwrap());
        assert!(store.find(&ReportId::from("R-9")).await.is_none());

        store.clear().await.unwrap();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let mut sessions = SessionStore::new(MemoryStorage::new());
        assert!(sessions.load().await.is_none());

        let session = Session::start("9876543210", Role::Admin, Utc::now());
        sessions.save(&session).await.unwrap();
        assert_eq!(sessions.load().await, Some(session));

        sessions.clear().await.unwrap();
        assert!(sessions.load().await.is_none());
    }

    #[tokio::test]
    async fn test_reports_persist_in_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let kv = crate::JsonStorage::new(dir.path()).await.unwrap();
        let mut store = ReportStore::new(kv);
        store.push(&report("R-1")).await.unwrap();

        let reopened = ReportStore::new(crate::JsonStorage::new(dir.path()).await.unwrap());
        assert_eq!(reopened.load_all().await, vec![report("R-1")]);
    }

    #[tokio::test]
    async fn test_malformed_entries_survive_writes() {
        let mut kv = MemoryStorage::new();
        let mut foreign = serde_json::to_value(report("R-2")).unwrap();
        foreign["latitude"] = json!(23.34);
        kv.set(REPORTS_KEY, &json!([serde_json::to_value(report("R-1")).unwrap(), foreign.clone()]))
            .await
            .unwrap();
        let mut store = ReportStore::new(kv.clone());

        store.push(&report("R-3")).await.unwrap();
        let mut updated = report("R-1");
        updated.address = "Sector 15".to_string();
        assert!(store.replace(&updated).await.unwrap());

        let loaded = store.load_all().await;
        store.save_all(&loaded).await.unwrap();

        let stored = kv.get(REPORTS_KEY).await.unwrap().unwrap();
        let items = stored.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["address"], "Sector 15");
        assert_eq!(items[1], foreign);
        assert_eq!(items[2]["id"], "R-3");
        assert_eq!(loaded.len(), 2);
    }
}
