//! FHIR endpoint integration.
//!
//! This module provides the REST client and the partial serde models of
//! the resources the pipeline consumes.

pub mod client;
pub mod resources;

pub use client::{FhirClient, FhirClientConfig, FhirError};
