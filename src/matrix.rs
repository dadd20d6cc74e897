//! Sparse GF(2) Columns and Graded Matrices
//!
//! All boundary and presentation matrices are over the two-element
//! field, stored column-wise as sorted sets of nonzero row indices.
//! Column addition is symmetric difference; the reduction pivot of a
//! column is its largest nonzero row ("low" entry), as in the standard
//! persistence algorithm.
//!
//! A [`GradedMatrix`] pairs each column with the bigraded position at
//! which it enters the filtration; rank computations restricted to a
//! grade only see columns at or below that grade.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::numeric::Grade;

/// A sparse column over GF(2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    rows: BTreeSet<usize>,
}

impl Column {
    pub fn new() -> Self {
        Self { rows: BTreeSet::new() }
    }

    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self { rows: indices.into_iter().collect() }
    }

    /// Single-entry column (a standard basis vector).
    pub fn unit(row: usize) -> Self {
        Self::from_indices([row])
    }

    pub fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// The pivot: largest nonzero row index.
    pub fn low(&self) -> Option<usize> {
        self.rows.iter().next_back().copied()
    }

    /// GF(2) addition: symmetric difference of supports.
    pub fn add_assign(&mut self, other: &Column) {
        for &row in &other.rows {
            if !self.rows.remove(&row) {
                self.rows.insert(row);
            }
        }
    }

    /// Flip a single entry.
    pub fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    /// Rewrites row indices through `map`; used when generators are
    /// renumbered after minimization.
    pub fn remap(&self, map: &BTreeMap<usize, usize>) -> Column {
        Column::from_indices(self.rows.iter().map(|r| map[r]))
    }
}

/// An echelon basis of a GF(2) subspace, keyed by pivot row. Inserting
/// a dependent column leaves the basis unchanged.
#[derive(Debug, Clone, Default)]
pub struct F2Basis {
    pivots: BTreeMap<usize, Column>,
}

impl F2Basis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces `col` against the basis and inserts the remainder if it
    /// is nonzero. Returns `true` when `col` was independent.
    pub fn insert(&mut self, mut col: Column) -> bool {
        while let Some(low) = col.low() {
            match self.pivots.get(&low) {
                Some(pivot) => col.add_assign(pivot),
                None => {
                    self.pivots.insert(low, col);
                    return true;
                }
            }
        }
        false
    }

    /// Fully reduces `col` without modifying the basis.
    pub fn reduce(&self, mut col: Column) -> Column {
        while let Some(low) = col.low() {
            match self.pivots.get(&low) {
                Some(pivot) => col.add_assign(pivot),
                None => break,
            }
        }
        col
    }

    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Rank of the span of a collection of columns.
    pub fn rank_of<'a>(cols: impl IntoIterator<Item = &'a Column>) -> usize {
        let mut basis = F2Basis::new();
        for col in cols {
            basis.insert(col.clone());
        }
        basis.rank()
    }
}

/// Columns of a bigraded map, each tagged with the grade at which it
/// appears. `rows` is the dimension of the codomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedMatrix {
    pub rows: usize,
    pub columns: Vec<Column>,
    pub grades: Vec<Grade>,
}

impl GradedMatrix {
    pub fn new(rows: usize, columns: Vec<Column>, grades: Vec<Grade>) -> Self {
        debug_assert_eq!(columns.len(), grades.len());
        Self { rows, columns, grades }
    }

    /// An empty map into a space of `rows` dimensions.
    pub fn empty(rows: usize) -> Self {
        Self { rows, columns: Vec::new(), grades: Vec::new() }
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column indices at or below `grade`, in the fixed input order.
    pub fn columns_at(&self, grade: Grade) -> impl Iterator<Item = usize> + '_ {
        self.grades
            .iter()
            .enumerate()
            .filter(move |(_, g)| g.leq(&grade))
            .map(|(i, _)| i)
    }

    /// Column processing order for the graded algorithms: colex by
    /// grade, then input index.
    pub fn colex_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.ncols()).collect();
        order.sort_by_key(|&i| (self.grades[i].colex(), i));
        order
    }

    /// Rank of the columns at or below `grade`.
    pub fn rank_at(&self, grade: Grade) -> usize {
        F2Basis::rank_of(self.columns_at(grade).map(|i| &self.columns[i]))
    }
}
