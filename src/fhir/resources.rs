//! JSON models for the FHIR resources this tool reads.
//!
//! These models are not complete representations of the FHIR specification.
//! They only cover the fields the aggregation pipeline actually consumes:
//! patient demographics, observation categories, and component values.

use crate::models::Gender;
use serde::Deserialize;

/// A page of search results returned by the FHIR server.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Bundle<T> {
    #[serde(default)]
    pub link: Vec<BundleLink>,
    #[serde(default)]
    pub entry: Vec<BundleEntry<T>>,
}

impl<T> Bundle<T> {
    /// URL of the next page, if the server reported one.
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == "next")
            .map(|l| l.url.as_str())
    }

    /// Consume the bundle, yielding its resources in page order.
    pub fn into_resources(self) -> impl Iterator<Item = T> {
        self.entry.into_iter().filter_map(|e| e.resource)
    }
}

/// Paging link attached to a bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

/// One entry of a bundle page.
#[derive(Debug, Clone, Deserialize)]
pub struct BundleEntry<T> {
    pub resource: Option<T>,
}

/// [Patient](<https://hl7.org/fhir/patient.html>)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub birth_date: Option<String>,
    #[serde(default)]
    pub gender: Gender,
}

/// [Observation](<https://hl7.org/fhir/observation.html>)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub category: Vec<CodeableConcept>,
    pub code: Option<CodeableConcept>,
    pub effective_date_time: Option<String>,
    pub value_quantity: Option<Quantity>,
    #[serde(default)]
    pub component: Vec<ObservationComponent>,
}

/// One entry of an observation's `component` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationComponent {
    pub code: CodeableConcept,
    pub value_quantity: Option<Quantity>,
}

/// [CodeableConcept](<https://hl7.org/fhir/datatypes.html#CodeableConcept>)
#[derive(Debug, Clone, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Human-readable name: the concept text, falling back to the first
    /// coding's display.
    pub fn display_name(&self) -> Option<&str> {
        self.text
            .as_deref()
            .or_else(|| self.coding.first().and_then(|c| c.display.as_deref()))
    }
}

/// [Coding](<https://hl7.org/fhir/datatypes.html#Coding>)
#[derive(Debug, Clone, Deserialize)]
pub struct Coding {
    pub code: Option<String>,
    pub display: Option<String>,
}

/// [Quantity](<https://hl7.org/fhir/datatypes.html#Quantity>)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Quantity {
    pub value: f64,
}

/// Flattened view of one observation component: display name plus value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentView<'a> {
    pub display_name: &'a str,
    pub value: f64,
}

impl Observation {
    /// Category code of the observation ("vital-signs" for the records
    /// this tool cares about).
    pub fn category_code(&self) -> Option<&str> {
        self.category
            .first()
            .and_then(|c| c.coding.first())
            .and_then(|c| c.code.as_deref())
    }

    /// Date the observation was taken ("YYYY-MM-DD", possibly followed by
    /// a time-of-day suffix).
    pub fn date(&self) -> Option<&str> {
        self.effective_date_time.as_deref()
    }

    /// Ordered component view: the observation's own code/value pair first
    /// (when a value is present), then the `component` list entries.
    pub fn components(&self) -> Vec<ComponentView<'_>> {
        let mut out = Vec::new();

        if let (Some(name), Some(quantity)) = (
            self.code.as_ref().and_then(|c| c.display_name()),
            self.value_quantity.as_ref(),
        ) {
            out.push(ComponentView {
                display_name: name,
                value: quantity.value,
            });
        }

        for component in &self.component {
            if let (Some(name), Some(quantity)) =
                (component.code.display_name(), component.value_quantity.as_ref())
            {
                out.push(ComponentView {
                    display_name: name,
                    value: quantity.value,
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals_observation_json() -> &'static str {
        r#"{
            "resourceType": "Observation",
            "category": [{
                "coding": [{"code": "vital-signs", "display": "vital-signs"}]
            }],
            "code": {"text": "Body Weight"},
            "effectiveDateTime": "2020-06-15T10:30:00+00:00",
            "valueQuantity": {"value": 71.4, "unit": "kg"}
        }"#
    }

    #[test]
    fn test_parse_patient() {
        let json = r#"{
            "resourceType": "Patient",
            "id": "8c0e8b95-0f6b-4e2e-9e54-7a0923d4a2c8",
            "gender": "female",
            "birthDate": "1972-03-01"
        }"#;

        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.id, "8c0e8b95-0f6b-4e2e-9e54-7a0923d4a2c8");
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.birth_date.as_deref(), Some("1972-03-01"));
    }

    #[test]
    fn test_parse_observation_root_value() {
        let observation: Observation =
            serde_json::from_str(vitals_observation_json()).unwrap();

        assert_eq!(observation.category_code(), Some("vital-signs"));
        assert_eq!(
            observation.date(),
            Some("2020-06-15T10:30:00+00:00")
        );

        let components = observation.components();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].display_name, "Body Weight");
        assert_eq!(components[0].value, 71.4);
    }

    #[test]
    fn test_components_root_value_precedes_component_list() {
        let json = r#"{
            "category": [{"coding": [{"code": "vital-signs"}]}],
            "code": {"text": "Blood Pressure"},
            "component": [
                {"code": {"text": "Systolic Blood Pressure"}, "valueQuantity": {"value": 120.0}},
                {"code": {"text": "Diastolic Blood Pressure"}, "valueQuantity": {"value": 80.0}}
            ]
        }"#;

        let observation: Observation = serde_json::from_str(json).unwrap();
        let components = observation.components();

        // No root valueQuantity, so the component list is the whole view.
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].display_name, "Systolic Blood Pressure");
        assert_eq!(components[1].value, 80.0);
    }

    #[test]
    fn test_display_name_falls_back_to_coding() {
        let json = r#"{"coding": [{"code": "8302-2", "display": "Body Height"}]}"#;
        let concept: CodeableConcept = serde_json::from_str(json).unwrap();
        assert_eq!(concept.display_name(), Some("Body Height"));
    }

    #[test]
    fn test_parse_bundle_with_next_link() {
        let json = r#"{
            "resourceType": "Bundle",
            "link": [
                {"relation": "self", "url": "http://fhir.example/Patient?_count=50"},
                {"relation": "next", "url": "http://fhir.example/Patient?_count=50&page=2"}
            ],
            "entry": [
                {"resource": {"id": "p1", "gender": "male", "birthDate": "1990-01-01"}},
                {"resource": {"id": "p2", "gender": "female", "birthDate": "1985-07-12"}}
            ]
        }"#;

        let bundle: Bundle<Patient> = serde_json::from_str(json).unwrap();
        assert_eq!(
            bundle.next_link(),
            Some("http://fhir.example/Patient?_count=50&page=2")
        );

        let patients: Vec<Patient> = bundle.into_resources().collect();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[1].id, "p2");
    }

    #[test]
    fn test_bundle_without_entries() {
        let bundle: Bundle<Patient> = serde_json::from_str(r#"{"resourceType": "Bundle"}"#).unwrap();
        assert!(bundle.next_link().is_none());
        assert_eq!(bundle.into_resources().count(), 0);
    }
}
