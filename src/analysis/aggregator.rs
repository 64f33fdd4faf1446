//! Vital-sign aggregation and per-age averaging.
//!
//! This module owns the statistical heart of the tool: classifying
//! observations into the four metric collections and reducing each
//! collection to per-age average values for one gender.

use crate::fhir::resources::Observation;
use crate::models::{AgeSeries, Gender, Metric, MetricSample};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

/// Number of age buckets; every sample's age must fall in [0, 110).
const MAX_AGE_BUCKETS: usize = 110;

/// Accumulates metric samples for one run.
///
/// The four collections grow monotonically while patients are retrieved
/// and are never mutated afterward.
#[derive(Debug, Default)]
pub struct VitalsCollector {
    weights: Vec<MetricSample>,
    bmis: Vec<MetricSample>,
    heart_rates: Vec<MetricSample>,
    respiratory_rates: Vec<MetricSample>,
}

impl VitalsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples collected so far for one metric.
    pub fn samples(&self, metric: Metric) -> &[MetricSample] {
        match metric {
            Metric::BodyWeight => &self.weights,
            Metric::BodyMassIndex => &self.bmis,
            Metric::HeartRate => &self.heart_rates,
            Metric::RespiratoryRate => &self.respiratory_rates,
        }
    }

    fn samples_mut(&mut self, metric: Metric) -> &mut Vec<MetricSample> {
        match metric {
            Metric::BodyWeight => &mut self.weights,
            Metric::BodyMassIndex => &mut self.bmis,
            Metric::HeartRate => &mut self.heart_rates,
            Metric::RespiratoryRate => &mut self.respiratory_rates,
        }
    }

    /// Total number of samples across all four collections.
    pub fn total_samples(&self) -> usize {
        Metric::ALL.iter().map(|m| self.samples(*m).len()).sum()
    }

    /// Collect the relevant metrics from one patient's observations.
    ///
    /// Observations outside the "vital-signs" category are skipped, as are
    /// observations with no components. Only the first component is read;
    /// components whose display name matches none of the four metrics are
    /// dropped silently.
    pub fn collect_relevant_metrics(
        &mut self,
        birthdate: &str,
        gender: Gender,
        observations: &[Observation],
    ) -> Result<()> {
        for observation in observations {
            if observation.category_code() != Some("vital-signs") {
                continue;
            }

            let components = observation.components();
            let Some(first) = components.first() else {
                continue;
            };

            let date = observation
                .date()
                .context("vital-signs observation has no effective date")?;
            let age = get_age(birthdate, date)?;

            if let Some(metric) = Metric::from_display_name(first.display_name) {
                self.samples_mut(metric)
                    .push(MetricSample::new(age, first.value, gender));
            }
        }

        Ok(())
    }
}

/// Whole years elapsed between `birthdate` and `observation_date`.
///
/// Only the first 10 characters of each string are parsed, so a
/// time-of-day suffix on the observation date is ignored. The result is
/// decremented by one when the month/day anniversary has not yet passed
/// in the observation year.
pub fn get_age(birthdate: &str, observation_date: &str) -> Result<i32> {
    let birth = parse_date_prefix(birthdate)?;
    let observed = parse_date_prefix(observation_date)?;

    let mut age = observed.year() - birth.year();
    if (observed.month(), observed.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    Ok(age)
}

fn parse_date_prefix(date: &str) -> Result<NaiveDate> {
    let prefix = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .with_context(|| format!("invalid date string: {:?}", date))
}

/// Per-age averages for the samples matching one gender.
///
/// The returned series is sorted by age ascending; ages with no matching
/// samples contribute no entry. The ages and averages vectors are
/// index-aligned: both are fed from the same accumulator pass, so their
/// lengths always agree.
pub fn analyze_data(samples: &[MetricSample], gender: Gender) -> Result<AgeSeries> {
    let mut buckets = [(0u32, 0f64); MAX_AGE_BUCKETS];
    let mut ages: Vec<i32> = Vec::new();

    for sample in samples.iter().filter(|s| s.gender == gender) {
        let index = usize::try_from(sample.age)
            .ok()
            .filter(|i| *i < MAX_AGE_BUCKETS)
            .with_context(|| {
                format!(
                    "age {} outside supported range 0..{}",
                    sample.age, MAX_AGE_BUCKETS
                )
            })?;

        if !ages.contains(&sample.age) {
            ages.push(sample.age);
        }

        buckets[index].0 += 1;
        buckets[index].1 += sample.value;
    }

    let averages = buckets
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, sum)| sum / f64::from(*count))
        .collect();

    ages.sort_unstable();

    Ok(AgeSeries { ages, averages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(age: i32, value: f64, gender: Gender) -> MetricSample {
        MetricSample::new(age, value, gender)
    }

    fn vitals_observation(display: &str, value: f64, date: &str) -> Observation {
        serde_json::from_value(json!({
            "category": [{"coding": [{"code": "vital-signs"}]}],
            "code": {"text": display},
            "effectiveDateTime": date,
            "valueQuantity": {"value": value}
        }))
        .unwrap()
    }

    #[test]
    fn test_get_age_day_before_birthday() {
        assert_eq!(get_age("2000-06-15", "2020-06-14").unwrap(), 19);
    }

    #[test]
    fn test_get_age_on_birthday() {
        assert_eq!(get_age("2000-06-15", "2020-06-15").unwrap(), 20);
    }

    #[test]
    fn test_get_age_day_after_birthday() {
        assert_eq!(get_age("2000-06-15", "2020-06-16").unwrap(), 20);
    }

    #[test]
    fn test_get_age_ignores_time_suffix() {
        assert_eq!(
            get_age("2000-06-15", "2020-06-15T08:30:00+00:00").unwrap(),
            20
        );
    }

    #[test]
    fn test_get_age_malformed_date_errors() {
        assert!(get_age("20XX-06-15", "2020-06-15").is_err());
        assert!(get_age("2000-06-15", "not a date").is_err());
        assert!(get_age("", "2020-06-15").is_err());
    }

    #[test]
    fn test_analyze_data_empty_input() {
        let series = analyze_data(&[], Gender::Male).unwrap();
        assert!(series.ages.is_empty());
        assert!(series.averages.is_empty());
    }

    #[test]
    fn test_analyze_data_averages_per_age() {
        let samples = vec![
            sample(30, 70.0, Gender::Male),
            sample(30, 80.0, Gender::Male),
            sample(40, 90.0, Gender::Male),
        ];

        let series = analyze_data(&samples, Gender::Male).unwrap();
        assert_eq!(series.ages, vec![30, 40]);
        assert_eq!(series.averages, vec![75.0, 90.0]);
    }

    #[test]
    fn test_analyze_data_sequences_stay_aligned() {
        // Ages deliberately out of order with duplicates across genders.
        let samples = vec![
            sample(52, 61.0, Gender::Female),
            sample(9, 30.0, Gender::Female),
            sample(52, 63.0, Gender::Female),
            sample(9, 32.0, Gender::Male),
            sample(107, 55.0, Gender::Female),
        ];

        let series = analyze_data(&samples, Gender::Female).unwrap();
        assert_eq!(series.ages.len(), series.averages.len());
        assert_eq!(series.ages, vec![9, 52, 107]);
        assert_eq!(series.averages, vec![30.0, 62.0, 55.0]);
    }

    #[test]
    fn test_analyze_data_excludes_other_genders() {
        let samples = vec![
            sample(30, 70.0, Gender::Male),
            sample(30, 100.0, Gender::Female),
            sample(30, 100.0, Gender::Unknown),
        ];

        let series = analyze_data(&samples, Gender::Male).unwrap();
        assert_eq!(series.ages, vec![30]);
        assert_eq!(series.averages, vec![70.0]);
    }

    #[test]
    fn test_analyze_data_rejects_out_of_range_ages() {
        assert!(analyze_data(&[sample(110, 70.0, Gender::Male)], Gender::Male).is_err());
        assert!(analyze_data(&[sample(-1, 70.0, Gender::Male)], Gender::Male).is_err());
        // Boundary value 109 is still in range.
        assert!(analyze_data(&[sample(109, 70.0, Gender::Male)], Gender::Male).is_ok());
    }

    #[test]
    fn test_collect_appends_matching_sample() {
        let mut collector = VitalsCollector::new();
        let observations = vec![vitals_observation("Body Weight", 71.5, "2020-06-15")];

        collector
            .collect_relevant_metrics("2000-06-15", Gender::Female, &observations)
            .unwrap();

        let samples = collector.samples(Metric::BodyWeight);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].age, 20);
        assert_eq!(samples[0].value, 71.5);
        assert_eq!(samples[0].gender, Gender::Female);
    }

    #[test]
    fn test_collect_skips_non_vital_signs_category() {
        let mut collector = VitalsCollector::new();
        let observation: Observation = serde_json::from_value(json!({
            "category": [{"coding": [{"code": "laboratory"}]}],
            "code": {"text": "Body Weight"},
            "effectiveDateTime": "2020-06-15",
            "valueQuantity": {"value": 71.5}
        }))
        .unwrap();

        collector
            .collect_relevant_metrics("2000-06-15", Gender::Male, &[observation])
            .unwrap();
        assert_eq!(collector.total_samples(), 0);
    }

    #[test]
    fn test_collect_drops_unrecognized_display_name() {
        let mut collector = VitalsCollector::new();
        let observations = vec![vitals_observation("Body Height", 170.0, "2020-06-15")];

        collector
            .collect_relevant_metrics("2000-06-15", Gender::Male, &observations)
            .unwrap();
        assert_eq!(collector.total_samples(), 0);
    }

    #[test]
    fn test_collect_skips_observation_without_components() {
        let mut collector = VitalsCollector::new();
        let observation: Observation = serde_json::from_value(json!({
            "category": [{"coding": [{"code": "vital-signs"}]}],
            "effectiveDateTime": "2020-06-15"
        }))
        .unwrap();

        collector
            .collect_relevant_metrics("2000-06-15", Gender::Male, &[observation])
            .unwrap();
        assert_eq!(collector.total_samples(), 0);
    }

    #[test]
    fn test_collect_reads_first_component_only() {
        let mut collector = VitalsCollector::new();
        let observation: Observation = serde_json::from_value(json!({
            "category": [{"coding": [{"code": "vital-signs"}]}],
            "effectiveDateTime": "2020-06-15",
            "component": [
                {"code": {"text": "Heart rate"}, "valueQuantity": {"value": 64.0}},
                {"code": {"text": "Respiratory rate"}, "valueQuantity": {"value": 14.0}}
            ]
        }))
        .unwrap();

        collector
            .collect_relevant_metrics("2000-06-15", Gender::Male, &[observation])
            .unwrap();

        assert_eq!(collector.samples(Metric::HeartRate).len(), 1);
        assert_eq!(collector.samples(Metric::RespiratoryRate).len(), 0);
    }

    #[test]
    fn test_collect_malformed_birthdate_is_fatal() {
        let mut collector = VitalsCollector::new();
        let observations = vec![vitals_observation("Body Weight", 71.5, "2020-06-15")];

        let result =
            collector.collect_relevant_metrics("not-a-date", Gender::Male, &observations);
        assert!(result.is_err());
    }
}
