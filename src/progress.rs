//! Level-unlock progress
//!
//! The unlock service stores one `{levelId, unlocked}` record per level.
//! `LevelStore` implements the same resource rules in-process (seeding,
//! unique ids, body validation, status codes) and `UnlockView` is what the
//! level-select menu reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::consts::{LAST_LEVEL, TUTORIAL_LEVEL};

/// First playable level, unlocked from the start
pub const FIRST_LEVEL: u32 = 1;

/// A single unlock record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub level_id: u32,
    pub unlocked: bool,
}

impl LevelRecord {
    pub const fn new(level_id: u32, unlocked: bool) -> Self {
        Self { level_id, unlocked }
    }
}

/// Errors from the level resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("level {0} not found")]
    NotFound(u32),

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error("level {0} already exists")]
    Conflict(u32),
}

impl StoreError {
    /// HTTP status the service answers with
    pub fn status(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::InvalidRequest(_) => 400,
            StoreError::Conflict(_) => 409,
        }
    }
}

/// Validate a `POST /levels` body: integer `levelId`, boolean `unlocked`
pub fn parse_create_body(body: &str) -> Result<LevelRecord, StoreError> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| StoreError::InvalidRequest("body is not JSON"))?;
    let level_id = value
        .get("levelId")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or(StoreError::InvalidRequest("levelId must be a non-negative integer"))?;
    let unlocked = value
        .get("unlocked")
        .and_then(Value::as_bool)
        .ok_or(StoreError::InvalidRequest("unlocked must be a boolean"))?;
    Ok(LevelRecord::new(level_id, unlocked))
}

/// Validate a `PUT /levels/:id` body: boolean `unlocked`
pub fn parse_update_body(body: &str) -> Result<bool, StoreError> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| StoreError::InvalidRequest("body is not JSON"))?;
    value
        .get("unlocked")
        .and_then(Value::as_bool)
        .ok_or(StoreError::InvalidRequest("unlocked must be a boolean"))
}

/// In-process level resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelStore {
    records: Vec<LevelRecord>,
}

impl LevelStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Store with the default records: level 1 unlocked, the rest locked
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.seed_defaults();
        store
    }

    /// Insert the default records, but only into an empty store
    pub fn seed_defaults(&mut self) -> bool {
        if !self.records.is_empty() {
            return false;
        }
        self.records = (FIRST_LEVEL..=LAST_LEVEL)
            .map(|id| LevelRecord::new(id, id == FIRST_LEVEL))
            .collect();
        log::info!("Initialized default level data");
        true
    }

    /// `GET /levels`
    pub fn list(&self) -> &[LevelRecord] {
        &self.records
    }

    /// `GET /levels/:id`
    pub fn get(&self, level_id: u32) -> Result<LevelRecord, StoreError> {
        self.records
            .iter()
            .find(|r| r.level_id == level_id)
            .copied()
            .ok_or(StoreError::NotFound(level_id))
    }

    /// `POST /levels`
    pub fn create(&mut self, record: LevelRecord) -> Result<LevelRecord, StoreError> {
        if self.records.iter().any(|r| r.level_id == record.level_id) {
            return Err(StoreError::Conflict(record.level_id));
        }
        self.records.push(record);
        Ok(record)
    }

    /// `POST /levels` with a raw JSON body
    pub fn create_from_body(&mut self, body: &str) -> Result<LevelRecord, StoreError> {
        let record = parse_create_body(body)?;
        self.create(record)
    }

    /// `PUT /levels/:id` with a raw JSON body
    pub fn update_from_body(
        &mut self,
        level_id: u32,
        body: &str,
    ) -> Result<LevelRecord, StoreError> {
        let unlocked = parse_update_body(body)?;
        self.update(level_id, unlocked)
    }

    /// `PUT /levels/:id`
    pub fn update(&mut self, level_id: u32, unlocked: bool) -> Result<LevelRecord, StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.level_id == level_id)
            .ok_or(StoreError::NotFound(level_id))?;
        record.unlocked = unlocked;
        Ok(*record)
    }

    /// `DELETE /levels/:id`
    pub fn delete(&mut self, level_id: u32) -> Result<(), StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.level_id == level_id)
            .ok_or(StoreError::NotFound(level_id))?;
        self.records.remove(index);
        Ok(())
    }

    /// Lock everything past the first level
    pub fn reset_progress(&mut self) -> Result<(), StoreError> {
        for level_id in FIRST_LEVEL + 1..=LAST_LEVEL {
            self.update(level_id, false)?;
        }
        Ok(())
    }

    /// Snapshot for the level-select menu
    pub fn view(&self) -> UnlockView {
        UnlockView::from_records(&self.records)
    }
}

/// Which levels the menu lets the player start
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnlockView {
    unlocked: Vec<u32>,
}

impl UnlockView {
    pub fn from_records(records: &[LevelRecord]) -> Self {
        let mut unlocked: Vec<u32> = records
            .iter()
            .filter(|r| r.unlocked)
            .map(|r| r.level_id)
            .collect();
        unlocked.sort_unstable();
        unlocked.dedup();
        Self { unlocked }
    }

    /// Used when the unlock service cannot be reached: only level 1
    pub fn fallback() -> Self {
        Self {
            unlocked: vec![FIRST_LEVEL],
        }
    }

    /// The tutorial is always playable
    pub fn is_unlocked(&self, level_id: u32) -> bool {
        level_id == TUTORIAL_LEVEL || self.unlocked.binary_search(&level_id).is_ok()
    }

    /// Mark `level_id` playable without waiting for the service
    pub fn unlock(&mut self, level_id: u32) {
        if let Err(index) = self.unlocked.binary_search(&level_id) {
            self.unlocked.insert(index, level_id);
        }
    }

    pub fn unlocked_levels(&self) -> &[u32] {
        &self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_defaults() {
        let store = LevelStore::seeded();
        assert_eq!(
            store.list(),
            &[
                LevelRecord::new(1, true),
                LevelRecord::new(2, false),
                LevelRecord::new(3, false),
            ]
        );
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut store = LevelStore::new();
        store.create(LevelRecord::new(2, true)).unwrap();
        assert!(!store.seed_defaults());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_crud_cycle() {
        let mut store = LevelStore::seeded();
        assert_eq!(store.update(2, true), Ok(LevelRecord::new(2, true)));
        assert_eq!(store.get(2), Ok(LevelRecord::new(2, true)));

        assert_eq!(store.delete(3), Ok(()));
        assert_eq!(store.get(3), Err(StoreError::NotFound(3)));
        assert_eq!(store.delete(3), Err(StoreError::NotFound(3)));

        assert_eq!(store.update(7, true), Err(StoreError::NotFound(7)));
        assert_eq!(
            store.create(LevelRecord::new(1, false)),
            Err(StoreError::Conflict(1))
        );
        assert!(store.create(LevelRecord::new(4, false)).is_ok());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::NotFound(1).status(), 404);
        assert_eq!(StoreError::InvalidRequest("x").status(), 400);
        assert_eq!(StoreError::Conflict(1).status(), 409);
    }

    #[test]
    fn test_create_body_validation() {
        assert_eq!(
            parse_create_body(r#"{"levelId": 4, "unlocked": false}"#),
            Ok(LevelRecord::new(4, false))
        );
        assert!(parse_create_body(r#"{"levelId": "4", "unlocked": false}"#).is_err());
        assert!(parse_create_body(r#"{"levelId": 4, "unlocked": "yes"}"#).is_err());
        assert!(parse_create_body(r#"{"levelId": 4}"#).is_err());
        assert!(parse_create_body("not json").is_err());
    }

    #[test]
    fn test_update_body_validation() {
        assert_eq!(parse_update_body(r#"{"unlocked": true}"#), Ok(true));
        assert_eq!(
            parse_update_body(r#"{"unlocked": 1}"#).map_err(|e| e.status()),
            Err(400)
        );
    }

    #[test]
    fn test_record_wire_format() {
        let json = serde_json::to_string(&LevelRecord::new(2, true)).unwrap();
        assert_eq!(json, r#"{"levelId":2,"unlocked":true}"#);

        // Extra fields from the database are ignored
        let record: LevelRecord =
            serde_json::from_str(r#"{"_id":"abc","levelId":3,"unlocked":false,"__v":0}"#).unwrap();
        assert_eq!(record, LevelRecord::new(3, false));
    }

    #[test]
    fn test_reset_progress_locks_later_levels() {
        let mut store = LevelStore::seeded();
        store.update(2, true).unwrap();
        store.update(3, true).unwrap();
        store.reset_progress().unwrap();

        let view = store.view();
        assert!(view.is_unlocked(1));
        assert!(!view.is_unlocked(2));
        assert!(!view.is_unlocked(3));
    }

    #[test]
    fn test_body_entry_points() {
        let mut store = LevelStore::seeded();
        assert_eq!(
            store.update_from_body(2, r#"{"unlocked": true}"#),
            Ok(LevelRecord::new(2, true))
        );
        assert_eq!(
            store.update_from_body(2, r#"{"unlocked": "no"}"#).map_err(|e| e.status()),
            Err(400)
        );
        assert_eq!(
            store.update_from_body(9, r#"{"unlocked": true}"#).map_err(|e| e.status()),
            Err(404)
        );
        assert_eq!(
            store
                .create_from_body(r#"{"levelId": 1, "unlocked": true}"#)
                .map_err(|e| e.status()),
            Err(409)
        );
        assert!(store.create_from_body(r#"{"levelId": 4, "unlocked": false}"#).is_ok());
    }

    #[test]
    fn test_local_unlock_survives_service_outage() {
        // Service down: only the fallback is known
        let mut view = UnlockView::fallback();
        assert!(!view.is_unlocked(2));

        view.unlock(2);
        view.unlock(2);
        assert!(view.is_unlocked(2));
        assert!(!view.is_unlocked(3));
        assert_eq!(view.unlocked_levels(), &[1, 2]);
    }

    #[test]
    fn test_fallback_view() {
        let view = UnlockView::fallback();
        assert!(view.is_unlocked(TUTORIAL_LEVEL));
        assert!(view.is_unlocked(1));
        assert!(!view.is_unlocked(2));
        assert!(!view.is_unlocked(3));
    }
}
