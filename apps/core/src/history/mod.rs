/// Prediction History Log — append-only per-user record list over the
/// Persisted Store.
///
/// Each user partition lives under `predictionHistory_<userId>` as a JSON
/// array. A corrupt partition self-heals to empty (logged, never fatal).
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::store::{keys, KeyValueStore};

/// Assessment type: one prediction domain with its own input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Dengue,
    Kidney,
    MentalHealth,
}

impl Disease {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disease::Dengue => "dengue",
            Disease::Kidney => "kidney",
            Disease::MentalHealth => "mental_health",
        }
    }
}

impl std::fmt::Display for Disease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only ordering; the stored partition keeps insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Recent,
    Risk,
}

/// Fixed risk thresholds: >0.7 high, >0.4 medium, else low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            RiskLevel::High
        } else if score > 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::Low => "Low Risk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: String,
    pub disease: Disease,
    pub timestamp: DateTime<Utc>,
    /// Expected in [0,1] but not enforced by producers.
    #[serde(rename = "riskScore", default)]
    pub risk_score: f64,
    /// Opaque label or class index from the remote service.
    #[serde(default)]
    pub prediction: Value,
    /// The exact input form snapshot used for the request.
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

/// Counts shown in the history summary bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn KeyValueStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Appends one record to the user's partition, preserving all prior
    /// records unchanged.
    pub fn append(&self, user_id: &str, record: PredictionRecord) {
        let mut records = self.load(user_id);
        records.push(record);
        self.save(user_id, &records);
    }

    /// Snapshot of the partition, optionally filtered to one assessment
    /// type and re-sorted for display. The stored data is untouched.
    pub fn list(
        &self,
        user_id: &str,
        filter: Option<Disease>,
        sort: SortOrder,
    ) -> Vec<PredictionRecord> {
        let mut records = self.load(user_id);
        if let Some(disease) = filter {
            records.retain(|r| r.disease == disease);
        }
        match sort {
            SortOrder::Recent => records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortOrder::Risk => records.sort_by(|a, b| {
                b.risk_score
                    .partial_cmp(&a.risk_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        records
    }

    /// Removes exactly one record by id; a no-op when the id is absent.
    pub fn delete_one(&self, user_id: &str, record_id: &str) {
        let mut records = self.load(user_id);
        let before = records.len();
        records.retain(|r| r.id != record_id);
        if records.len() != before {
            self.save(user_id, &records);
            info!("Deleted prediction {record_id} for user {user_id}");
        }
    }

    /// Empties the user's partition. Destructive-action confirmation is the
    /// caller's responsibility.
    pub fn clear_all(&self, user_id: &str) {
        self.store.set(&keys::history(user_id), "[]");
        info!("Cleared prediction history for user {user_id}");
    }

    /// Human-readable JSON export of the partition, round-trippable through
    /// `PredictionRecord` deserialization.
    pub fn export_snapshot(&self, user_id: &str) -> Vec<u8> {
        let records = self.load(user_id);
        serde_json::to_vec_pretty(&records).unwrap_or_else(|_| b"[]".to_vec())
    }

    /// Download filename for an export taken on `date`:
    /// `medical-history-<ISO-date>.json`.
    pub fn export_filename(date: NaiveDate) -> String {
        format!("medical-history-{}.json", date.format("%Y-%m-%d"))
    }

    pub fn stats(&self, user_id: &str) -> HistoryStats {
        let records = self.load(user_id);
        let mut stats = HistoryStats {
            total: records.len(),
            ..HistoryStats::default()
        };
        for record in &records {
            match RiskLevel::from_score(record.risk_score) {
                RiskLevel::High => stats.high_risk += 1,
                RiskLevel::Medium => stats.medium_risk += 1,
                RiskLevel::Low => stats.low_risk += 1,
            }
        }
        stats
    }

    fn load(&self, user_id: &str) -> Vec<PredictionRecord> {
        let raw = match self.store.get(&keys::history(user_id)) {
            Some(raw) => raw,
            None => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Corrupt history partition for user {user_id}: {e}; treating as empty");
                Vec::new()
            }
        }
    }

    fn save(&self, user_id: &str, records: &[PredictionRecord]) {
        match serde_json::to_string(records) {
            Ok(json) => self.store.set(&keys::history(user_id), &json),
            Err(e) => warn!("Failed to serialize history for user {user_id}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn log() -> (HistoryLog, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (HistoryLog::new(store.clone()), store)
    }

    fn record(id: &str, disease: Disease, risk: f64, minute: u32) -> PredictionRecord {
        PredictionRecord {
            id: id.to_string(),
            disease,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap(),
            risk_score: risk,
            prediction: json!(1),
            details: BTreeMap::from([("Age".to_string(), json!("30"))]),
        }
    }

    #[test]
    fn test_append_then_list_returns_exactly_those_records() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        log.append("u1", record("b", Disease::Kidney, 0.2, 1));
        log.append("u1", record("c", Disease::Dengue, 0.5, 2));

        let ids: Vec<_> = log
            .list("u1", None, SortOrder::Recent)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_by_risk_descending() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.2, 0));
        log.append("u1", record("b", Disease::Dengue, 0.9, 1));
        log.append("u1", record("c", Disease::Dengue, 0.5, 2));

        let ids: Vec<_> = log
            .list("u1", None, SortOrder::Risk)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_filter_restricts_to_one_disease() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        log.append("u1", record("b", Disease::Kidney, 0.2, 1));

        let dengue = log.list("u1", Some(Disease::Dengue), SortOrder::Recent);
        assert_eq!(dengue.len(), 1);
        assert_eq!(dengue[0].id, "a");
    }

    #[test]
    fn test_delete_one_leaves_others_unchanged() {
        let (log, _) = log();
        let keep = record("keep", Disease::Dengue, 0.8, 0);
        log.append("u1", keep.clone());
        log.append("u1", record("drop", Disease::Kidney, 0.2, 1));

        log.delete_one("u1", "drop");
        let remaining = log.list("u1", None, SortOrder::Recent);
        assert_eq!(remaining, vec![keep]);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        log.delete_one("u1", "nope");
        assert_eq!(log.list("u1", None, SortOrder::Recent).len(), 1);
    }

    #[test]
    fn test_clear_all_does_not_touch_other_partition() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        log.append("u2", record("b", Disease::Kidney, 0.2, 1));

        log.clear_all("u1");
        assert!(log.list("u1", None, SortOrder::Recent).is_empty());
        assert_eq!(log.list("u2", None, SortOrder::Recent).len(), 1);
    }

    #[test]
    fn test_corrupt_partition_self_heals_to_empty() {
        let (log, store) = log();
        store.set(&keys::history("u1"), "not valid json at all");
        assert!(log.list("u1", None, SortOrder::Recent).is_empty());

        // Appending afterwards works and replaces the corrupt value.
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        assert_eq!(log.list("u1", None, SortOrder::Recent).len(), 1);
    }

    #[test]
    fn test_export_snapshot_round_trips() {
        let (log, _) = log();
        let rec = record("a", Disease::MentalHealth, 0.45, 0);
        log.append("u1", rec.clone());

        let bytes = log.export_snapshot("u1");
        let parsed: Vec<PredictionRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, vec![rec]);
    }

    #[test]
    fn test_export_filename_pattern() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            HistoryLog::export_filename(date),
            "medical-history-2025-03-01.json"
        );
    }

    #[test]
    fn test_stats_bucketing() {
        let (log, _) = log();
        log.append("u1", record("a", Disease::Dengue, 0.8, 0));
        log.append("u1", record("b", Disease::Dengue, 0.41, 1));
        log.append("u1", record("c", Disease::Dengue, 0.7, 2)); // boundary: medium
        log.append("u1", record("d", Disease::Dengue, 0.4, 3)); // boundary: low

        let stats = log.stats("u1");
        assert_eq!(stats.total, 4);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.medium_risk, 2);
        assert_eq!(stats.low_risk, 1);
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.71).label(), "High Risk");
        assert_eq!(RiskLevel::from_score(0.7).label(), "Medium Risk");
        assert_eq!(RiskLevel::from_score(0.41).label(), "Medium Risk");
        assert_eq!(RiskLevel::from_score(0.4).label(), "Low Risk");
        assert_eq!(RiskLevel::from_score(0.0).label(), "Low Risk");
    }

    #[test]
    fn test_disease_serde_names() {
        assert_eq!(serde_json::to_string(&Disease::MentalHealth).unwrap(), "\"mental_health\"");
        let d: Disease = serde_json::from_str("\"dengue\"").unwrap();
        assert_eq!(d, Disease::Dengue);
    }
}
