/// Remote Prediction Client — the single point of entry for all calls to
/// the prediction service.
///
/// ARCHITECTURAL RULE: no other module may talk to the prediction API
/// directly. Inputs are typed per assessment (no free-form JSON out), and
/// form strings are coerced to numbers here, before any network I/O.
use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::RequestError;
use crate::history::Disease;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dengue model features, in the exact names the backend scaler expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DengueInput {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: f64,
    #[serde(rename = "NS1")]
    pub ns1: f64,
    #[serde(rename = "IgG")]
    pub igg: f64,
    #[serde(rename = "IgM")]
    pub igm: f64,
    #[serde(rename = "Area")]
    pub area: f64,
    #[serde(rename = "AreaType")]
    pub area_type: f64,
    #[serde(rename = "HouseType")]
    pub house_type: f64,
    #[serde(rename = "District_encoded")]
    pub district_encoded: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Symptoms")]
    pub symptoms: f64,
    #[serde(rename = "Platelet_Count")]
    pub platelet_count: f64,
    #[serde(rename = "WBC_Count")]
    pub wbc_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KidneyInput {
    pub age: f64,
    pub bp: f64,
    pub sg: f64,
    pub al: f64,
    pub su: f64,
    pub bgr: f64,
    pub bu: f64,
    pub sc: f64,
    pub sod: f64,
    pub pot: f64,
    pub hemo: f64,
    pub pcv: f64,
    pub wc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentalHealthInput {
    pub age: f64,
    pub gender: f64,
    pub employment: f64,
    pub work_env: f64,
    pub stress: f64,
    pub sleep: f64,
    pub activity: f64,
    pub depression: f64,
    pub anxiety: f64,
    pub support: f64,
    pub productivity: f64,
    pub mh_history: f64,
    pub treatment: f64,
}

/// Tagged union over the three assessment schemas. Serializes untagged:
/// the wire body is the flat numeric-field object each endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssessmentInput {
    Dengue(DengueInput),
    Kidney(KidneyInput),
    MentalHealth(MentalHealthInput),
}

impl AssessmentInput {
    pub fn disease(&self) -> Disease {
        match self {
            AssessmentInput::Dengue(_) => Disease::Dengue,
            AssessmentInput::Kidney(_) => Disease::Kidney,
            AssessmentInput::MentalHealth(_) => Disease::MentalHealth,
        }
    }

    /// Coerces a raw form snapshot (field name → string) into the typed
    /// input for `disease`. Required fields must be present and non-blank;
    /// non-numeric values fail with a validation error. Neither ever
    /// reaches the network. Missing optional fields default to 0.0,
    /// matching the backend's own handling.
    pub fn from_form(
        disease: Disease,
        form: &BTreeMap<String, String>,
    ) -> Result<Self, RequestError> {
        for name in required_fields(disease) {
            let missing = form.get(*name).map_or(true, |v| v.trim().is_empty());
            if missing {
                return Err(RequestError::Validation(format!(
                    "Field '{name}' is required"
                )));
            }
        }
        let f = |name: &str| numeric_field(form, name);
        Ok(match disease {
            Disease::Dengue => AssessmentInput::Dengue(DengueInput {
                age: f("Age")?,
                gender: f("Gender")?,
                ns1: f("NS1")?,
                igg: f("IgG")?,
                igm: f("IgM")?,
                area: f("Area")?,
                area_type: f("AreaType")?,
                house_type: f("HouseType")?,
                district_encoded: f("District_encoded")?,
                temperature: f("Temperature")?,
                symptoms: f("Symptoms")?,
                platelet_count: f("Platelet_Count")?,
                wbc_count: f("WBC_Count")?,
            }),
            Disease::Kidney => AssessmentInput::Kidney(KidneyInput {
                age: f("age")?,
                bp: f("bp")?,
                sg: f("sg")?,
                al: f("al")?,
                su: f("su")?,
                bgr: f("bgr")?,
                bu: f("bu")?,
                sc: f("sc")?,
                sod: f("sod")?,
                pot: f("pot")?,
                hemo: f("hemo")?,
                pcv: f("pcv")?,
                wc: f("wc")?,
            }),
            Disease::MentalHealth => AssessmentInput::MentalHealth(MentalHealthInput {
                age: f("age")?,
                gender: f("gender")?,
                employment: f("employment")?,
                work_env: f("work_env")?,
                stress: f("stress")?,
                sleep: f("sleep")?,
                activity: f("activity")?,
                depression: f("depression")?,
                anxiety: f("anxiety")?,
                support: f("support")?,
                productivity: f("productivity")?,
                mh_history: f("mh_history")?,
                treatment: f("treatment")?,
            }),
        })
    }
}

/// Fields a submission must fill in before it may proceed. The remaining
/// features are optional and default to 0.0.
fn required_fields(disease: Disease) -> &'static [&'static str] {
    match disease {
        Disease::Dengue => &["Age", "Temperature"],
        Disease::Kidney => &["age", "bp", "sc"],
        // The mental-health form pre-fills every field.
        Disease::MentalHealth => &[],
    }
}

fn numeric_field(form: &BTreeMap<String, String>, name: &str) -> Result<f64, RequestError> {
    match form.get(name) {
        None => {
            warn!("Missing field {name} in form, defaulting to 0.0");
            Ok(0.0)
        }
        Some(raw) if raw.trim().is_empty() => Ok(0.0),
        Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
            RequestError::Validation(format!("Field '{name}' must be a number, got '{raw}'"))
        }),
    }
}

/// Endpoint path per assessment type.
pub fn endpoint(disease: Disease) -> &'static str {
    match disease {
        Disease::Dengue => "/dengue/predict",
        Disease::Kidney => "/kidney/predict",
        Disease::MentalHealth => "/mental-health/assessment",
    }
}

/// Normalized prediction response. Known fields are typed; everything else
/// the server sends lands in the `extra` bucket instead of being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PredictionResponse {
    /// The numeric risk indicator: probability when present, confidence
    /// otherwise.
    pub fn risk_score(&self) -> Option<f64> {
        self.probability.or(self.confidence)
    }
}

/// Error body shape the prediction service uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct PredictionClient {
    client: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// One prediction call. No retries — resubmission is the caller's
    /// decision.
    pub async fn predict(
        &self,
        input: &AssessmentInput,
    ) -> Result<PredictionResponse, RequestError> {
        let disease = input.disease();
        let url = format!("{}{}", self.base_url, endpoint(disease));
        debug!("Making prediction request to {url}");

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServerErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!("Prediction API returned {status} for {disease}: {message}");
            return Err(RequestError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PredictionResponse = serde_json::from_str(&body)?;
        info!(
            "Prediction succeeded for {disease}: risk_score={:?}",
            parsed.risk_score()
        );
        Ok(parsed)
    }

    /// Liveness probe: GET /health, any 2xx counts.
    pub async fn health_check(&self) -> Result<(), RequestError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(map_send_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RequestError::Server {
                status: status.as_u16(),
                message: String::new(),
            })
        }
    }
}

fn map_send_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout
    } else {
        RequestError::Network(err.to_string())
    }
}
