//! Bifiltration Input: Graded Chain Complex Data
//!
//! The presentation builder consumes a two-parameter filtered chain
//! complex restricted to the three degrees that matter for a single
//! homology degree `d`: cells of degree `d-1`, `d`, and `d+1`, with the
//! two GF(2) boundary maps between them and a bigrade for every cell.
//!
//! Grades must be monotone: a cell can never appear before one of its
//! faces on either axis. Violations are rejected up front as input
//! errors, before any computation starts.
//!
//! [`Bifiltration::from_simplices`] builds the boundary matrices of a
//! graded simplicial complex directly from vertex lists, the same face
//! lookup used when assembling a filtered complex from scratch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::{Column, GradedMatrix};
use crate::numeric::{ExactValue, Grade, GradeIndex};

/// A simplex of a bifiltered complex: sorted vertex indices plus the
/// exact bigrade at which it appears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedSimplex {
    pub vertices: Vec<usize>,
    pub x: ExactValue,
    pub y: ExactValue,
}

impl GradedSimplex {
    pub fn new(vertices: Vec<usize>, x: ExactValue, y: ExactValue) -> Self {
        Self { vertices, x, y }
    }

    pub fn dimension(&self) -> usize {
        self.vertices.len() - 1
    }
}

/// A validated two-parameter filtered chain complex around one homology
/// degree. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bifiltration {
    pub x_index: GradeIndex,
    pub y_index: GradeIndex,
    /// Grades of the degree `d-1` cells (rows of `low`).
    low_cell_grades: Vec<Grade>,
    /// Boundary map from degree `d` cells; column grades are the grades
    /// of the `d`-cells.
    pub low: GradedMatrix,
    /// Boundary map from degree `d+1` cells into the `d`-cells.
    pub high: GradedMatrix,
}

impl Bifiltration {
    /// Builds and validates a bifiltration from raw matrix data.
    pub fn new(
        x_index: GradeIndex,
        y_index: GradeIndex,
        low_cell_grades: Vec<Grade>,
        low: GradedMatrix,
        high: GradedMatrix,
    ) -> Result<Self> {
        let f = Self { x_index, y_index, low_cell_grades, low, high };
        f.validate()?;
        Ok(f)
    }

    /// Grades of the degree `d` cells.
    pub fn mid_grades(&self) -> &[Grade] {
        &self.low.grades
    }

    fn validate(&self) -> Result<()> {
        if self.low.rows != self.low_cell_grades.len() {
            return Err(Error::filtration(format!(
                "low boundary has {} rows but {} row grades",
                self.low.rows,
                self.low_cell_grades.len()
            )));
        }
        if self.high.rows != self.low.ncols() {
            return Err(Error::filtration(format!(
                "high boundary has {} rows but there are {} middle cells",
                self.high.rows,
                self.low.ncols()
            )));
        }

        let in_range = |g: &Grade| g.x < self.x_index.len() && g.y < self.y_index.len();
        let all_grades = self
            .low_cell_grades
            .iter()
            .chain(&self.low.grades)
            .chain(&self.high.grades);
        for g in all_grades {
            if !in_range(g) {
                return Err(Error::filtration(format!(
                    "grade ({}, {}) outside the registered value range",
                    g.x, g.y
                )));
            }
        }

        self.check_monotone(&self.low, &self.low_cell_grades, "low")?;
        self.check_monotone(&self.high, &self.low.grades, "high")?;
        Ok(())
    }

    fn check_monotone(&self, map: &GradedMatrix, row_grades: &[Grade], name: &str) -> Result<()> {
        for (j, col) in map.columns.iter().enumerate() {
            for r in col.iter() {
                if r >= map.rows {
                    return Err(Error::filtration(format!(
                        "{name} boundary column {j} references row {r} of {}",
                        map.rows
                    )));
                }
                if !row_grades[r].leq(&map.grades[j]) {
                    return Err(Error::filtration(format!(
                        "{name} boundary column {j} appears before its face {r}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Assembles the boundary matrices of a graded simplicial complex
    /// for homology degree `hom_degree`. Simplices of other dimensions
    /// are ignored. Fails if a required face is missing or a grade is
    /// not monotone.
    pub fn from_simplices(simplices: &[GradedSimplex], hom_degree: usize) -> Result<Self> {
        let x_index =
            GradeIndex::from_values(simplices.iter().map(|s| s.x.clone()).collect());
        let y_index =
            GradeIndex::from_values(simplices.iter().map(|s| s.y.clone()).collect());

        // Collect cells of the three relevant dimensions, in input order.
        let mut cells: [Vec<(Vec<usize>, Grade)>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut lookup: [BTreeMap<Vec<usize>, usize>; 3] =
            [BTreeMap::new(), BTreeMap::new(), BTreeMap::new()];
        for s in simplices {
            if s.vertices.is_empty() {
                return Err(Error::filtration("simplex with an empty vertex list"));
            }
            let dim = s.dimension();
            let level = if hom_degree == 0 {
                // no degree -1 cells; vertices are the middle level
                match dim {
                    0 => 1,
                    1 => 2,
                    _ => continue,
                }
            } else if dim + 1 >= hom_degree && dim <= hom_degree + 1 {
                dim + 1 - hom_degree
            } else {
                continue;
            };

            let mut vertices = s.vertices.clone();
            vertices.sort_unstable();
            vertices.dedup();
            if vertices.len() != s.vertices.len() {
                return Err(Error::filtration(format!(
                    "simplex {:?} has repeated vertices",
                    s.vertices
                )));
            }
            let grade = Grade::new(
                x_index
                    .index_of(&s.x)
                    .ok_or_else(|| Error::invariant("unregistered x grade value"))?,
                y_index
                    .index_of(&s.y)
                    .ok_or_else(|| Error::invariant("unregistered y grade value"))?,
            );
            if lookup[level].insert(vertices.clone(), cells[level].len()).is_some() {
                return Err(Error::filtration(format!(
                    "duplicate simplex {vertices:?}"
                )));
            }
            cells[level].push((vertices, grade));
        }

        let boundary_columns = |level: usize| -> Result<Vec<Column>> {
            cells[level]
                .iter()
                .map(|(vertices, _)| {
                    if vertices.len() == 1 {
                        return Ok(Column::new());
                    }
                    let mut col = Column::new();
                    for i in 0..vertices.len() {
                        let mut face = vertices.clone();
                        face.remove(i);
                        match lookup[level - 1].get(&face) {
                            Some(&idx) => col.toggle(idx),
                            None => {
                                return Err(Error::filtration(format!(
                                    "face {face:?} of {vertices:?} is missing"
                                )))
                            }
                        }
                    }
                    Ok(col)
                })
                .collect()
        };

        let low_cell_grades: Vec<Grade> = cells[0].iter().map(|(_, g)| *g).collect();
        let mid_grades: Vec<Grade> = cells[1].iter().map(|(_, g)| *g).collect();
        let high_grades: Vec<Grade> = cells[2].iter().map(|(_, g)| *g).collect();

        let low_cols = if hom_degree == 0 {
            vec![Column::new(); cells[1].len()]
        } else {
            boundary_columns(1)?
        };
        let high_cols = boundary_columns(2)?;

        let low = GradedMatrix::new(cells[0].len(), low_cols, mid_grades);
        let high = GradedMatrix::new(cells[1].len(), high_cols, high_grades);
        Self::new(x_index, y_index, low_cell_grades, low, high)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn v(n: i64) -> ExactValue {
        ExactValue::from_int(n)
    }

    /// Two vertices joined by an edge, all in degree 0 homology.
    pub(crate) fn two_points_one_edge() -> Bifiltration {
        Bifiltration::from_simplices(
            &[
                GradedSimplex::new(vec![0], v(0), v(0)),
                GradedSimplex::new(vec![1], v(1), v(0)),
                GradedSimplex::new(vec![0, 1], v(1), v(1)),
            ],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_single_vertex() {
        let f = Bifiltration::from_simplices(
            &[GradedSimplex::new(vec![0], v(0), v(0))],
            0,
        )
        .unwrap();
        assert_eq!(f.low.rows, 0);
        assert_eq!(f.low.ncols(), 1);
        assert_eq!(f.high.ncols(), 0);
        assert_eq!(f.mid_grades(), &[Grade::new(0, 0)]);
    }

    #[test]
    fn test_edge_boundary() {
        let f = two_points_one_edge();
        assert_eq!(f.low.ncols(), 2);
        assert_eq!(f.high.ncols(), 1);
        assert_eq!(f.high.columns[0], Column::from_indices([0, 1]));
        assert_eq!(f.high.grades[0], Grade::new(1, 1));
    }

    #[test]
    fn test_degree_one_square() {
        // four edges of a square; homology degree 1
        let simplices = [
            GradedSimplex::new(vec![0], v(0), v(0)),
            GradedSimplex::new(vec![1], v(0), v(0)),
            GradedSimplex::new(vec![2], v(0), v(0)),
            GradedSimplex::new(vec![3], v(0), v(0)),
            GradedSimplex::new(vec![0, 1], v(1), v(1)),
            GradedSimplex::new(vec![1, 2], v(1), v(1)),
            GradedSimplex::new(vec![2, 3], v(1), v(1)),
            GradedSimplex::new(vec![0, 3], v(1), v(1)),
        ];
        let f = Bifiltration::from_simplices(&simplices, 1).unwrap();
        assert_eq!(f.low.rows, 4);
        assert_eq!(f.low.ncols(), 4);
        assert_eq!(f.high.ncols(), 0);
    }

    #[test]
    fn test_non_monotone_is_rejected() {
        // edge appears before one of its endpoints on the x axis
        let err = Bifiltration::from_simplices(
            &[
                GradedSimplex::new(vec![0], v(0), v(0)),
                GradedSimplex::new(vec![1], v(2), v(0)),
                GradedSimplex::new(vec![0, 1], v(1), v(1)),
            ],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFiltration { .. }));
    }

    #[test]
    fn test_empty_simplex_is_rejected() {
        let err = Bifiltration::from_simplices(
            &[GradedSimplex::new(vec![], v(0), v(0))],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFiltration { .. }));
    }

    #[test]
    fn test_missing_face_is_rejected() {
        let err = Bifiltration::from_simplices(
            &[
                GradedSimplex::new(vec![0], v(0), v(0)),
                GradedSimplex::new(vec![0, 1], v(1), v(1)),
            ],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFiltration { .. }));
    }
}
