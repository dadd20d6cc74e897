//! Tight Bounds of the Template-Point Region
//!
//! The smallest axis-aligned rectangle of exact grade values containing
//! every template point. Front ends use it to frame the parameter plane
//! before asking for slices; a module with no template points has no
//! meaningful bounds and yields `None` rather than a degenerate
//! rectangle.

use serde::{Deserialize, Serialize};

use crate::numeric::{ExactValue, GradeIndex};
use crate::pipeline::ComputeResult;
use crate::presentation::TemplatePoint;

/// Componentwise extremes of the template-point grades, as exact
/// values. `x_low ≤ x_high` and `y_low ≤ y_high` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_low: ExactValue,
    pub x_high: ExactValue,
    pub y_low: ExactValue,
    pub y_high: ExactValue,
}

/// Bounds of a finished computation, `None` when the module has no
/// template points.
pub fn compute_bounds(result: &ComputeResult) -> Option<Bounds> {
    bounds_of(&result.template_points, &result.x_index, &result.y_index)
}

pub(crate) fn bounds_of(
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
) -> Option<Bounds> {
    let first = points.first()?;
    let (mut x_min, mut x_max) = (first.x, first.x);
    let (mut y_min, mut y_max) = (first.y, first.y);
    for p in &points[1..] {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }
    // registries are sorted, so index extremes are value extremes
    Some(Bounds {
        x_low: x_index.value(x_min).clone(),
        x_high: x_index.value(x_max).clone(),
        y_low: y_index.value(y_min).clone(),
        y_high: y_index.value(y_max).clone(),
    })
}
