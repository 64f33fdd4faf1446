//! Data models for the vitals visualizer.
//!
//! This module contains the core data structures used throughout
//! the application for representing genders, metrics, and derived series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative gender of a patient.
///
/// Mirrors the FHIR AdministrativeGender value set. Server values outside
/// the set deserialize to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
            Gender::Unknown => write!(f, "unknown"),
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

/// One of the four vital-sign metrics this tool charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    BodyWeight,
    BodyMassIndex,
    HeartRate,
    RespiratoryRate,
}

impl Metric {
    /// All metrics, in chart order (left-to-right, top-to-bottom).
    pub const ALL: [Metric; 4] = [
        Metric::BodyWeight,
        Metric::BodyMassIndex,
        Metric::HeartRate,
        Metric::RespiratoryRate,
    ];

    /// Map an observation component display name to a metric.
    ///
    /// Matching is exact; any other display name returns `None` and the
    /// observation is dropped without an error or a log line.
    pub fn from_display_name(name: &str) -> Option<Self> {
        match name {
            "Body Weight" => Some(Metric::BodyWeight),
            "Body Mass Index" => Some(Metric::BodyMassIndex),
            "Heart rate" => Some(Metric::HeartRate),
            "Respiratory rate" => Some(Metric::RespiratoryRate),
            _ => None,
        }
    }

    /// Short name used in chart captions.
    pub fn title(&self) -> &'static str {
        match self {
            Metric::BodyWeight => "Weight",
            Metric::BodyMassIndex => "BMI",
            Metric::HeartRate => "Heart Rate",
            Metric::RespiratoryRate => "Respiratory Rate",
        }
    }

    /// Y-axis label for the metric's sub-chart.
    pub fn y_label(&self) -> &'static str {
        match self {
            Metric::BodyWeight => "Weight (kg)",
            Metric::BodyMassIndex => "BMI (kg/m2)",
            Metric::HeartRate => "Heart rate (bpm)",
            Metric::RespiratoryRate => "Respiratory rate (breaths/min)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// A single aggregated observation: the patient's age at observation time,
/// the measured value, and the patient's gender.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Whole years elapsed between birthdate and observation date.
    pub age: i32,
    /// Numeric value of the first observation component.
    pub value: f64,
    /// Gender of the observed patient.
    pub gender: Gender,
}

impl MetricSample {
    pub fn new(age: i32, value: f64, gender: Gender) -> Self {
        Self { age, value, gender }
    }
}

/// Per-age average values for one (metric, gender) pair.
///
/// `ages` and `averages` are index-aligned and always equal in length:
/// `averages[i]` is the mean value observed at `ages[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgeSeries {
    /// Sorted, de-duplicated ages present among the matching samples.
    pub ages: Vec<i32>,
    /// Mean observed value per age, in the same order as `ages`.
    pub averages: Vec<f64>,
}

impl AgeSeries {
    /// Returns true if no samples matched the query.
    #[allow(dead_code)] // Utility accessor
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Iterate the series as (age, average) points.
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.ages.iter().copied().zip(self.averages.iter().copied())
    }
}
