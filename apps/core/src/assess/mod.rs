/// Submission flow: the strictly ordered sequence behind one form submit.
///
/// clear previous result → coerce → call the prediction service → on
/// success, write the result slot then append to the history log. A second
/// submission for the same assessment type while one is in flight is
/// rejected (`RequestError::Busy`) rather than allowed to race.
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::RequestError;
use crate::history::{Disease, HistoryLog, PredictionRecord};
use crate::prediction::{AssessmentInput, PredictionClient, PredictionResponse};
use crate::results::ResultCache;

pub struct AssessmentService {
    client: PredictionClient,
    cache: Arc<ResultCache>,
    history: HistoryLog,
    in_flight: Mutex<HashSet<Disease>>,
}

impl AssessmentService {
    pub fn new(client: PredictionClient, cache: Arc<ResultCache>, history: HistoryLog) -> Self {
        Self {
            client,
            cache,
            history,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Submits one assessment form for `user_partition` (a user id or
    /// `anonymous`). On success the result is cached and a record is
    /// appended to the caller's history partition.
    pub async fn submit(
        &self,
        user_partition: &str,
        disease: Disease,
        form: &BTreeMap<String, String>,
    ) -> Result<PredictionResponse, RequestError> {
        if !self.in_flight.lock().unwrap().insert(disease) {
            warn!("Rejected concurrent {disease} submission");
            return Err(RequestError::Busy);
        }
        let outcome = self.run(user_partition, disease, form).await;
        self.in_flight.lock().unwrap().remove(&disease);
        outcome
    }

    async fn run(
        &self,
        user_partition: &str,
        disease: Disease,
        form: &BTreeMap<String, String>,
    ) -> Result<PredictionResponse, RequestError> {
        // Stale results must not linger while the request is in flight.
        self.cache.clear(disease);

        let input = AssessmentInput::from_form(disease, form)?;
        let response = self.client.predict(&input).await?;

        self.cache.set(disease, response.clone());
        self.history.append(
            user_partition,
            PredictionRecord {
                id: Uuid::new_v4().to_string(),
                disease,
                timestamp: Utc::now(),
                risk_score: response.risk_score().unwrap_or(0.0),
                prediction: response.prediction.clone().unwrap_or(Value::Null),
                details: form
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            },
        );
        Ok(response)
    }
}
