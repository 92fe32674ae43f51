//! Lexical answer type (LAT) tags for structured candidates.
//!
//! The property name is a good coarse type hint for its value: the value
//! of "birth place" is a place. The tag spans the whole candidate text
//! and is anchored to a synthetic plural-noun POS span so it looks like
//! every other LAT the pipeline produces.

use serde::{Deserialize, Serialize};

use crate::provenance::StructuredKind;

/// POS value of the synthetic span.
pub const SYNTHETIC_POS: &str = "NNS";

/// Part-of-speech span. Offsets are byte offsets into the candidate text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosTag {
    /// Start offset (inclusive).
    pub begin: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// POS value.
    pub value: String,
}

/// Coarse type hint attached to a candidate answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTag {
    /// Start offset (inclusive).
    pub begin: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Offsets of the annotation the type was derived from; structured
    /// tags have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<(usize, usize)>,
    /// Lower-cased type label.
    pub text: String,
    /// Grammatical anchor.
    pub pos: PosTag,
    /// Specificity in the type hierarchy (0.0 = as given).
    pub specificity: f64,
    /// Word-sense synset; 0 means unassigned.
    pub synset: u64,
    /// Source family that produced the tag.
    pub kind: StructuredKind,
}

/// Tags `text` with the lower-cased `property` as its type.
#[must_use]
pub fn tag(text: &str, property: &str, kind: StructuredKind) -> TypeTag {
    let label = property.to_lowercase();
    let end = text.len();

    tracing::debug!(answer = %text, lat = %label, "property LAT");

    TypeTag {
        begin: 0,
        end,
        base: None,
        text: label,
        pos: PosTag {
            begin: 0,
            end,
            value: SYNTHETIC_POS.to_string(),
        },
        specificity: 0.0,
        synset: 0,
        kind,
    }
}
