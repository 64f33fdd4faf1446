//! HTTP client for the FHIR REST endpoint.
//!
//! The client speaks plain FHIR search: `Patient` and `Observation`
//! queries returning `Bundle` pages, followed through their next-links
//! until the result set is exhausted. Requests are blocking-sequential
//! from the caller's point of view; there is no retry logic, and any
//! failure propagates to the caller.

use crate::fhir::resources::{Bundle, Observation, Patient};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the FHIR endpoint.
#[derive(Debug, Error)]
pub enum FhirError {
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("cannot connect to FHIR server at {0}")]
    Connect(String),

    #[error("failed to send request to {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("FHIR server returned {status} for {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("failed to parse FHIR response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Configuration for the FHIR client.
#[derive(Debug, Clone)]
pub struct FhirClientConfig {
    /// Base URL of the FHIR server, e.g. `http://localhost:8080/fhir`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Page size requested via `_count`.
    pub page_size: usize,
}

/// Client for a FHIR REST endpoint.
pub struct FhirClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
    page_size: usize,
}

impl FhirClient {
    /// Create a new client against the given server.
    pub fn new(config: FhirClientConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
            page_size: config.page_size,
        }
    }

    /// Fetch every patient the server knows about, in server order.
    pub async fn get_all_patients(&self) -> Result<Vec<Patient>, FhirError> {
        self.fetch_all(self.patients_url()).await
    }

    /// Fetch every observation recorded for one patient.
    pub async fn get_patient_observations(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Observation>, FhirError> {
        self.fetch_all(self.observations_url(patient_id)).await
    }

    fn patients_url(&self) -> String {
        format!("{}/Patient?_count={}", self.base_url, self.page_size)
    }

    fn observations_url(&self, patient_id: &str) -> String {
        format!(
            "{}/Observation?patient={}&_count={}",
            self.base_url, patient_id, self.page_size
        )
    }

    /// Walk a search result across all its pages.
    async fn fetch_all<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, FhirError> {
        let mut resources = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let bundle: Bundle<T> = self.get_bundle(&url).await?;
            next = bundle.next_link().map(str::to_string);
            resources.extend(bundle.into_resources());
        }

        Ok(resources)
    }

    async fn get_bundle<T: DeserializeOwned>(&self, url: &str) -> Result<Bundle<T>, FhirError> {
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FhirError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                FhirError::Connect(self.base_url.clone())
            } else {
                FhirError::Request {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FhirError::Status {
                status,
                url: url.to_string(),
                body,
            });
        }

        response.json::<Bundle<T>>().await.map_err(|e| FhirError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}
