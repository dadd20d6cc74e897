//! Grade Registry and Bigraded Positions
//!
//! Combinatorial structures (presentation matrices, the arrangement)
//! never carry exact coordinates around; they reference grades through
//! small integer indices into a per-axis registry of deduplicated,
//! sorted exact values. A [`Grade`] is one position in the two-parameter
//! lattice, as a pair of such indices.

use serde::{Deserialize, Serialize};

use super::exact::ExactValue;

/// Sorted, deduplicated registry of the exact coordinate values that
/// occur along one axis of the filtration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeIndex {
    values: Vec<ExactValue>,
}

impl GradeIndex {
    /// Builds the registry from an arbitrary collection of values.
    pub fn from_values(mut values: Vec<ExactValue>) -> Self {
        values.sort();
        values.dedup();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The exact value at `index`.
    pub fn value(&self, index: usize) -> &ExactValue {
        &self.values[index]
    }

    /// Index of an exact value, by exact comparison.
    pub fn index_of(&self, value: &ExactValue) -> Option<usize> {
        self.values.binary_search(value).ok()
    }

    pub fn values(&self) -> &[ExactValue] {
        &self.values
    }
}

/// One position in the two-parameter grade lattice, as indices into the
/// x- and y-axis registries. Immutable once the filtration is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grade {
    pub x: usize,
    pub y: usize,
}

impl Grade {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Componentwise partial order: `self ≤ other` on both axes.
    pub fn leq(&self, other: &Grade) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// Componentwise join (least upper bound). Because each registry is
    /// sorted, the index join is also the value join.
    pub fn join(&self, other: &Grade) -> Grade {
        Grade::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Colexicographic key (y major, x minor), the processing order of
    /// the presentation algorithms.
    pub fn colex(&self) -> (usize, usize) {
        (self.y, self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sorts_and_dedups() {
        let idx = GradeIndex::from_values(vec![
            ExactValue::from_int(2),
            ExactValue::zero(),
            ExactValue::ratio(1, 2),
            ExactValue::from_int(2),
        ]);
        assert_eq!(idx.len(), 3);
        assert_eq!(*idx.value(0), ExactValue::zero());
        assert_eq!(*idx.value(1), ExactValue::ratio(1, 2));
        assert_eq!(*idx.value(2), ExactValue::from_int(2));
    }

    #[test]
    fn test_exact_lookup() {
        let idx = GradeIndex::from_values(vec![ExactValue::zero(), ExactValue::ratio(1, 3)]);
        assert_eq!(idx.index_of(&ExactValue::ratio(1, 3)), Some(1));
        assert_eq!(idx.index_of(&ExactValue::ratio(1, 4)), None);
    }

    #[test]
    fn test_grade_lattice_ops() {
        let a = Grade::new(0, 2);
        let b = Grade::new(1, 1);
        assert!(!a.leq(&b));
        assert!(!b.leq(&a));
        assert_eq!(a.join(&b), Grade::new(1, 2));
        assert!(a.leq(&a.join(&b)));
        assert!(b.leq(&a.join(&b)));
    }

    #[test]
    fn test_colex_order() {
        let mut grades = vec![Grade::new(2, 0), Grade::new(0, 1), Grade::new(1, 0)];
        grades.sort_by_key(|g| g.colex());
        assert_eq!(grades, vec![Grade::new(1, 0), Grade::new(2, 0), Grade::new(0, 1)]);
    }
}
