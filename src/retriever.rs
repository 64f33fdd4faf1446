//! Patient and observation retrieval.
//!
//! Walks a bounded sample of patients, fetching each one's observations
//! and feeding them to the collector. Fetches are sequential, one patient
//! at a time; any client failure aborts the run.

use crate::analysis::VitalsCollector;
use crate::fhir::resources::Patient;
use crate::fhir::FhirClient;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Retrieve up to `sample_size` patients and aggregate their vital signs.
pub async fn retrieve_data(
    client: &FhirClient,
    collector: &mut VitalsCollector,
    sample_size: usize,
    show_progress: bool,
) -> Result<()> {
    let patients = client.get_all_patients().await?;
    info!("Server returned {} patients", patients.len());

    let patients = truncate_to_sample(patients, sample_size);

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(patients.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for patient in &patients {
        debug!("Fetching observations for patient {}", patient.id);
        let observations = client.get_patient_observations(&patient.id).await?;

        let birthdate = patient
            .birth_date
            .as_deref()
            .with_context(|| format!("patient {} has no birth date", patient.id))?;

        collector.collect_relevant_metrics(birthdate, patient.gender, &observations)?;

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Retrieval complete");
    }

    info!(
        "Collected {} samples from {} patients",
        collector.total_samples(),
        patients.len()
    );

    Ok(())
}

/// Cap the patient list at the configured sample size, preserving order.
fn truncate_to_sample(mut patients: Vec<Patient>, sample_size: usize) -> Vec<Patient> {
    patients.truncate(sample_size);
    patients
}
