// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{MediaKind, MediaRef};
use crate::infra::networking::http::HTTPClient;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub static URL_LOCAL_INFERENCE_SERVICE: &str = "http://127.0.0.1:8000";

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: MediaKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionResponse {
    score: f64,
    model_version: Option<String>,
    runtime_ms: Option<f64>,
}

#[derive(Debug, PartialEq)]
pub struct Prediction {
    pub score: f64,
    pub model_version: Option<String>,
    pub runtime_ms: Option<u64>,
}

pub struct InferenceServiceClient {
    base_url: String,
    http_client: Arc<HTTPClient>,
}

impl InferenceServiceClient {
    pub fn new(base_url: String, http_client: Arc<HTTPClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub async fn predict(&self, media: &MediaRef) -> anyhow::Result<Prediction> {
        let endpoint = format!("{}/predict", self.base_url);
        let request = PredictionRequest {
            url: media.url.as_str(),
            kind: media.kind,
        };

        let response = self
            .http_client
            .post(&endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .context("[verisight.inference] scorer refused the request")?
            .json::<PredictionResponse>()
            .await
            .context("[verisight.inference] malformed scorer response")?;

        let runtime_ms = response
            .runtime_ms
            .filter(|millis| millis.is_finite() && *millis >= 0.0)
            .map(|millis| millis.round() as u64);

        Ok(Prediction {
            score: response.score,
            model_version: response.model_version,
            runtime_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::models::{MediaKind, MediaRef};
    use crate::infra::networking::http::HTTP_CLIENT;
    use crate::infra::networking::inference::{InferenceServiceClient, Prediction};
    use assertor::{EqualityAssertion, ResultAssertion};
    use httpmock::MockServer;
    use serde_json::json;

    fn sample_media() -> MediaRef {
        MediaRef::parse("https://cdn.example.com/face.png", MediaKind::Image).unwrap()
    }

    #[tokio::test]
    async fn should_predict_score_for_media() {
        let mock_server = MockServer::start();
        let client = InferenceServiceClient::new(mock_server.base_url(), HTTP_CLIENT.clone());

        let mocked = mock_server.mock(|when, then| {
            when.method("POST")
                .path("/predict")
                .json_body(json!({ "url": "https://cdn.example.com/face.png", "type": "image" }));

            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "score": 0.85, "modelVersion": "effnet-b0-v3", "runtimeMs": 41.7 }));
        });

        let prediction = client.predict(&sample_media()).await.unwrap();

        mocked.assert();
        let expected = Prediction {
            score: 0.85,
            model_version: Some("effnet-b0-v3".to_string()),
            runtime_ms: Some(42),
        };
        assertor::assert_that!(prediction).is_equal_to(expected);
    }

    #[tokio::test]
    async fn should_fail_when_scorer_is_not_available() {
        let mock_server = MockServer::start();
        let client = InferenceServiceClient::new(mock_server.base_url(), HTTP_CLIENT.clone());

        let mocked = mock_server.mock(|when, then| {
            when.method("POST").path("/predict");
            then.status(500).body("model not loaded");
        });

        let prediction = client.predict(&sample_media()).await;

        mocked.assert();
        assertor::assert_that!(prediction).is_err();
    }

    #[tokio::test]
    async fn should_fail_with_malformed_response() {
        let mock_server = MockServer::start();
        let client = InferenceServiceClient::new(mock_server.base_url(), HTTP_CLIENT.clone());

        let mocked = mock_server.mock(|when, then| {
            when.method("POST").path("/predict");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "score": "very fake" }));
        });

        let prediction = client.predict(&sample_media()).await;

        mocked.assert();
        assertor::assert_that!(prediction).is_err();
    }
}
