//! # Size Fields
//!
//! Distance, threshold and minimum fields, evaluated pointwise when surfaces
//! are tessellated.

use std::collections::BTreeMap;

use glam::DVec3;
use kernel_api::{FieldTag, KernelError, KernelResult, Threshold};

/// A mesh size field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Distance to point entities; `positions` caches their coordinates.
    Distance {
        points: Vec<kernel_api::DimTag>,
        positions: Vec<DVec3>,
    },
    Threshold(Threshold),
    Min(Vec<FieldTag>),
}

/// Evaluates `tag` at `at`.
///
/// Fields only reference fields created before them, so evaluation always
/// terminates.
pub fn evaluate(fields: &BTreeMap<FieldTag, Field>, tag: FieldTag, at: DVec3) -> KernelResult<f64> {
    let field = fields.get(&tag).ok_or(KernelError::UnknownField(tag))?;
    Ok(match field {
        Field::Distance { positions, .. } => positions
            .iter()
            .map(|p| p.distance(at))
            .fold(f64::INFINITY, f64::min),
        Field::Threshold(threshold) => threshold.size_at(evaluate(fields, threshold.input, at)?),
        Field::Min(inputs) => {
            let mut value = f64::INFINITY;
            for input in inputs {
                value = value.min(evaluate(fields, *input, at)?);
            }
            value
        }
    })
}
