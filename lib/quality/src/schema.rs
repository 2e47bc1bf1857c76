//! The declarative set of fields a complete record is expected to carry.

use crate::QualityError;
use edm_quality_model::vocab::{dc, dcterms, edm, skos};
use edm_quality_model::{Graph, NamedNode, NamedNodeRef, SubjectRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// A named field that is present if any of its predicates has a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub predicates: Vec<NamedNode>,
}

impl FieldSpec {
    pub fn new<'a>(
        name: impl Into<String>,
        predicates: impl IntoIterator<Item = NamedNodeRef<'a>>,
    ) -> Self {
        Self {
            name: name.into(),
            predicates: predicates.into_iter().map(NamedNodeRef::into_owned).collect(),
        }
    }

    /// Whether `subject` has a value for any of the predicates of this field.
    pub fn is_filled(&self, graph: &Graph, subject: SubjectRef<'_>) -> bool {
        self.predicates.iter().any(|predicate| {
            graph
                .object_for_subject_predicate(subject, predicate)
                .is_some()
        })
    }
}

/// Record-level fields are looked up on the record itself, aggregation-level fields on the
/// aggregation the record belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    pub record_fields: Vec<FieldSpec>,
    pub aggregation_fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// The fields scored for Europeana records.
    pub fn edm() -> Self {
        Self {
            record_fields: vec![
                FieldSpec::new("title", [dc::TITLE, skos::PREF_LABEL]),
                FieldSpec::new("creator", [dc::CREATOR]),
                FieldSpec::new("description", [dc::DESCRIPTION]),
                FieldSpec::new("language", [dc::LANGUAGE]),
                FieldSpec::new("type", [dc::TYPE]),
                FieldSpec::new("year", [dc::DATE, dcterms::CREATED]),
            ],
            aggregation_fields: vec![
                FieldSpec::new("dataProvider", [edm::DATA_PROVIDER]),
                FieldSpec::new("provider", [edm::PROVIDER]),
                FieldSpec::new("country", [edm::COUNTRY]),
                FieldSpec::new("rights", [edm::RIGHTS]),
                FieldSpec::new("isShownBy", [edm::IS_SHOWN_BY]),
            ],
        }
    }

    /// Reads a schema from a JSON document.
    ///
    /// ```json
    /// {
    ///   "record_fields": [{ "name": "title", "predicates": ["http://purl.org/dc/elements/1.1/title"] }],
    ///   "aggregation_fields": []
    /// }
    /// ```
    pub fn from_json(reader: impl Read) -> Result<Self, QualityError> {
        let document: SchemaDocument = serde_json::from_reader(reader)?;
        let schema = Self {
            record_fields: parse_fields(document.record_fields)?,
            aggregation_fields: parse_fields(document.aggregation_fields)?,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Writes the schema as a JSON document readable by [FieldSchema::from_json].
    pub fn to_json(&self) -> Result<String, QualityError> {
        let document = SchemaDocument {
            record_fields: self.record_fields.iter().map(FieldDocument::from).collect(),
            aggregation_fields: self
                .aggregation_fields
                .iter()
                .map(FieldDocument::from)
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.record_fields.iter().chain(&self.aggregation_fields)
    }

    /// The denominator of the fill ratio.
    pub fn total_fields(&self) -> usize {
        self.record_fields.len() + self.aggregation_fields.len()
    }

    fn validate(&self) -> Result<(), QualityError> {
        let mut names = HashSet::new();
        for field in self.fields() {
            if field.name.is_empty() {
                return Err(QualityError::InvalidSchema(
                    "field names must not be empty".into(),
                ));
            }
            if field.predicates.is_empty() {
                return Err(QualityError::InvalidSchema(format!(
                    "field '{}' has no predicates",
                    field.name
                )));
            }
            if !names.insert(field.name.as_str()) {
                return Err(QualityError::InvalidSchema(format!(
                    "field '{}' is declared more than once",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::edm()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(default)]
    record_fields: Vec<FieldDocument>,
    #[serde(default)]
    aggregation_fields: Vec<FieldDocument>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDocument {
    name: String,
    predicates: Vec<String>,
}

impl From<&FieldSpec> for FieldDocument {
    fn from(field: &FieldSpec) -> Self {
        Self {
            name: field.name.clone(),
            predicates: field
                .predicates
                .iter()
                .map(|p| p.as_str().to_owned())
                .collect(),
        }
    }
}

fn parse_fields(fields: Vec<FieldDocument>) -> Result<Vec<FieldSpec>, QualityError> {
    fields
        .into_iter()
        .map(|field| -> Result<FieldSpec, QualityError> {
            let predicates = field
                .predicates
                .into_iter()
                .map(NamedNode::new)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldSpec {
                name: field.name,
                predicates,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edm_schema_has_eleven_fields() {
        let schema = FieldSchema::edm();
        assert_eq!(schema.record_fields.len(), 6);
        assert_eq!(schema.aggregation_fields.len(), 5);
        assert_eq!(schema.total_fields(), 11);
    }

    #[test]
    fn json_round_trip_keeps_the_schema() -> Result<(), QualityError> {
        let schema = FieldSchema::edm();
        let json = schema.to_json()?;
        assert_eq!(FieldSchema::from_json(json.as_bytes())?, schema);
        Ok(())
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let json = r#"{
            "record_fields": [{ "name": "title", "predicates": ["http://purl.org/dc/elements/1.1/title"] }],
            "aggregation_fields": [{ "name": "title", "predicates": ["http://purl.org/dc/terms/title"] }]
        }"#;
        assert!(matches!(
            FieldSchema::from_json(json.as_bytes()),
            Err(QualityError::InvalidSchema(_))
        ));
    }

    #[test]
    fn invalid_predicates_are_rejected() {
        let json = r#"{ "record_fields": [{ "name": "title", "predicates": ["not an iri"] }] }"#;
        assert!(matches!(
            FieldSchema::from_json(json.as_bytes()),
            Err(QualityError::InvalidIri(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let json = r#"{ "fields": [] }"#;
        assert!(matches!(
            FieldSchema::from_json(json.as_bytes()),
            Err(QualityError::SchemaFormat(_))
        ));
    }
}
