//! Property-value facts returned by structured knowledge sources.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::features::names;

/// A (subject, property, value) triple about one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Label of the subject the property belongs to.
    pub subject: String,
    /// Human-readable property name, e.g. `"birth place"`.
    pub property: String,
    /// Property value rendered as text; becomes the answer text.
    pub value: String,
    /// Resource identifier of the value, when the value is itself an entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_resource: Option<String>,
    /// Feature set to 1.0 on the candidate to record which channel produced it.
    pub origin_feature: String,
    /// Confidence reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Fact {
    /// Starts building a fact.
    #[must_use]
    pub fn builder() -> FactBuilder {
        FactBuilder::default()
    }

    /// Candidate title: subject and property separated by a space.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.subject, self.property)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {} -- {}", self.subject, self.property, self.value)
    }
}

/// Builder for [`Fact`].
///
/// # Example
/// ```
/// use propsearch::Fact;
///
/// let fact = Fact::builder()
///     .subject("Einstein")
///     .property("birth place")
///     .value("Ulm")
///     .value_resource("http://dbpedia.org/resource/Ulm")
///     .origin_feature("OriginDBpOntology")
///     .build()?;
/// assert_eq!(fact.title(), "Einstein birth place");
/// # Ok::<(), propsearch::ValidationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FactBuilder {
    subject: Option<String>,
    property: Option<String>,
    value: Option<String>,
    value_resource: Option<String>,
    origin_feature: Option<String>,
    score: Option<f64>,
}

impl FactBuilder {
    /// Set the subject label (required).
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the property name (required).
    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Set the value text (required).
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the value resource identifier (optional).
    #[must_use]
    pub fn value_resource(mut self, resource: impl Into<String>) -> Self {
        self.value_resource = Some(resource.into());
        self
    }

    /// Set the origin feature name (required).
    #[must_use]
    pub fn origin_feature(mut self, feature: impl Into<String>) -> Self {
        self.origin_feature = Some(feature.into());
        self
    }

    /// Set the source confidence (optional).
    #[must_use]
    pub const fn score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Build the fact.
    ///
    /// Returns `ValidationError::MissingField` if a required field is not set
    /// and `ValidationError::EmptyProperty` if the property is blank.
    /// `ValidationError::ReservedFeature` if the origin feature is one of the
    /// fixed feature names.
    pub fn build(self) -> Result<Fact, ValidationError> {
        let subject = self.subject.ok_or_else(|| missing("subject"))?;
        let property = self.property.ok_or_else(|| missing("property"))?;
        if property.trim().is_empty() {
            return Err(ValidationError::EmptyProperty);
        }
        let value = self.value.ok_or_else(|| missing("value"))?;
        let origin_feature = self.origin_feature.ok_or_else(|| missing("origin_feature"))?;
        if names::is_reserved(&origin_feature) {
            return Err(ValidationError::ReservedFeature {
                name: origin_feature,
            });
        }

        Ok(Fact {
            subject,
            property,
            value,
            value_resource: self.value_resource,
            origin_feature,
            score: self.score,
        })
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::MissingField {
        field: field.to_string(),
    }
}
