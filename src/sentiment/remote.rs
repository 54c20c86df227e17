//! Hosted inference endpoint client
//!
//! Talks to a text-classification endpoint that accepts `{"inputs": text}`
//! and answers with a list of `{label, score}` candidates per input, the
//! shape served by the Hugging Face inference API.

use crate::sentiment::classifier::{ModelError, RawPrediction, SentimentModel};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model served by the inference API
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// One label candidate
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Endpoints answer either per batch (`[[...]]`) or flat (`[...]`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_candidates(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(candidates) => candidates,
        }
    }
}

/// Pick the highest-scoring candidate; the first one wins a tie
pub fn top_prediction(candidates: &[LabelScore]) -> Option<RawPrediction> {
    candidates
        .iter()
        .fold(None::<&LabelScore>, |best, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        })
        .map(|best| RawPrediction::new(best.label.clone(), best.score))
}

/// Blocking client for a hosted sentiment model
pub struct HttpSentimentModel {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpSentimentModel {
    /// Create a client for `endpoint` with a 30 second timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token: None,
        })
    }

    /// Send a bearer token with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SentimentModel for HttpSentimentModel {
    fn predict(&self, text: &str) -> Result<RawPrediction, ModelError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InferenceResponse = response.json()?;
        top_prediction(&parsed.into_candidates())
            .ok_or_else(|| ModelError::InvalidOutput("empty candidate list".to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batched_response() {
        let body = r#"[[{"label":"NEGATIVE","score":0.12},{"label":"POSITIVE","score":0.88}]]"#;
        let parsed: InferenceResponse = serde_json::from_str(body).unwrap();
        let top = top_prediction(&parsed.into_candidates()).unwrap();

        assert_eq!(top, RawPrediction::new("POSITIVE", 0.88));
    }

    #[test]
    fn test_parse_flat_response() {
        let body = r#"[{"label":"NEGATIVE","score":0.97},{"label":"POSITIVE","score":0.03}]"#;
        let parsed: InferenceResponse = serde_json::from_str(body).unwrap();
        let top = top_prediction(&parsed.into_candidates()).unwrap();

        assert_eq!(top.label, "NEGATIVE");
    }

    #[test]
    fn test_top_prediction_tie_and_empty() {
        let candidates = vec![
            LabelScore {
                label: "NEGATIVE".to_string(),
                score: 0.5,
            },
            LabelScore {
                label: "POSITIVE".to_string(),
                score: 0.5,
            },
        ];
        assert_eq!(top_prediction(&candidates).unwrap().label, "NEGATIVE");
        assert!(top_prediction(&[]).is_none());
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let model = HttpSentimentModel::new("http://127.0.0.1:9/unreachable").unwrap();
        assert!(model.predict("hello").is_err());
    }
}
