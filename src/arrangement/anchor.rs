//! Support Lines from Anchor Grades
//!
//! A query line with slope `m > 0` and dual offset `b` visits the
//! template points in the order of their push positions, and that order
//! changes exactly when the dual point `(m, b)` crosses the dual line of
//! some *anchor*: the componentwise join of a pair of template-point
//! grades (a point joined with itself included). Joins must be taken,
//! not just the points themselves, because the relative push order of
//! two incomparable points flips across the dual line of their join.
//!
//! The dual of the primal point `(x, y)` is the line `b = −x·m + y`;
//! anchors with an infinite coordinate have no dual line inside the
//! strip and are skipped.

use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::numeric::GradeIndex;
use crate::presentation::TemplatePoint;

/// The dual line `b = −x·m + y` of one anchor, by its exact primal
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportLine {
    pub x: BigRational,
    pub y: BigRational,
}

impl SupportLine {
    /// The exact offset of the line at slope `m`.
    pub fn value_at(&self, m: &BigRational) -> BigRational {
        &self.y - &self.x * m
    }

    /// Dual slope `m` at which `self` and `other` cross, `None` for
    /// parallel lines.
    pub fn crossing(&self, other: &SupportLine) -> Option<BigRational> {
        if self.x == other.x {
            return None;
        }
        Some((&other.y - &self.y) / (&other.x - &self.x))
    }
}

/// Derives the deduplicated support lines of a template-point set, in
/// increasing dual-slope order (the insertion order of the builder).
pub fn support_lines(
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
) -> Vec<SupportLine> {
    let mut anchors: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (i, p) in points.iter().enumerate() {
        for q in &points[i..] {
            let j = p.grade().join(&q.grade());
            anchors.insert((j.x, j.y));
        }
    }

    let mut lines: Vec<SupportLine> = anchors
        .into_iter()
        .filter_map(|(ix, iy)| {
            let x = x_index.value(ix).as_ratio()?;
            let y = y_index.value(iy).as_ratio()?;
            Some(SupportLine { x: x.clone(), y: y.clone() })
        })
        .collect();

    // dual slope is −x: increasing slope means decreasing x
    lines.sort_by(|a, b| b.x.cmp(&a.x).then_with(|| a.y.cmp(&b.y)));
    lines
}
