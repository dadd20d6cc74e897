//! Graded Kernel and Minimal Generating Sets
//!
//! The presentation algorithms reduce to two primitives over bigraded
//! GF(2) matrices:
//!
//! - the kernel of the columns visible at a fixed grade, as explicit
//!   combination vectors (standard column reduction with a slave matrix
//!   recording the combinations), and
//! - minimal generators of a graded submodule: sweeping candidate
//!   grades in colexicographic order and extending a basis over the
//!   span of the generators already found.
//!
//! In two parameters the join of any set of grades is realized by some
//! pair of them (one attains the x maximum, one the y maximum), so the
//! pairwise joins of the column grades are the only grades at which new
//! kernel generators can appear.

use std::collections::{BTreeMap, BTreeSet};

use crate::matrix::{Column, F2Basis, GradedMatrix};
use crate::numeric::Grade;

/// Basis of the kernel of the columns of `mat` at or below `grade`,
/// as combination vectors in domain coordinates. `order` fixes the
/// reduction order (colex by grade, then index) so results are
/// deterministic across grades.
pub(crate) fn kernel_basis_at(mat: &GradedMatrix, grade: Grade, order: &[usize]) -> Vec<Column> {
    let mut pivots: BTreeMap<usize, usize> = BTreeMap::new();
    let mut red_cols: Vec<Column> = Vec::new();
    let mut red_combos: Vec<Column> = Vec::new();
    let mut kernel = Vec::new();

    'columns: for &j in order {
        if !mat.grades[j].leq(&grade) {
            continue;
        }
        let mut col = mat.columns[j].clone();
        let mut combo = Column::unit(j);
        while let Some(low) = col.low() {
            match pivots.get(&low) {
                Some(&p) => {
                    col.add_assign(&red_cols[p]);
                    combo.add_assign(&red_combos[p]);
                }
                None => {
                    pivots.insert(low, red_cols.len());
                    red_cols.push(col);
                    red_combos.push(combo);
                    continue 'columns;
                }
            }
        }
        // fully reduced to zero: the combination is a kernel vector
        kernel.push(combo);
    }
    kernel
}

/// Minimal generators of the kernel module of `mat`, with the grades at
/// which they first exist, as columns in domain coordinates.
pub(crate) fn kernel_generators(mat: &GradedMatrix) -> Vec<(Grade, Column)> {
    let order = mat.colex_order();

    let mut candidates: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (i, a) in mat.grades.iter().enumerate() {
        for b in &mat.grades[i..] {
            candidates.insert(a.join(b).colex());
        }
    }

    let mut found: Vec<(Grade, Column)> = Vec::new();
    for (y, x) in candidates {
        let g = Grade::new(x, y);
        let kernel = kernel_basis_at(mat, g, &order);
        if kernel.is_empty() {
            continue;
        }
        let mut basis = F2Basis::new();
        for (h, col) in &found {
            if h.leq(&g) {
                basis.insert(col.clone());
            }
        }
        for col in kernel {
            if basis.insert(col.clone()) {
                found.push((g, col));
            }
        }
    }
    found
}

/// Reduces a generating set of a graded submodule to a minimal one:
/// a generator is dropped when it lies in the span of the generators
/// already kept at its own grade.
pub(crate) fn minimize_generators(mut gens: Vec<(Grade, Column)>) -> Vec<(Grade, Column)> {
    gens.sort_by_key(|(g, _)| g.colex());
    let mut kept: Vec<(Grade, Column)> = Vec::new();
    for (g, col) in gens {
        let mut basis = F2Basis::new();
        for (h, c) in &kept {
            if h.leq(&g) {
                basis.insert(c.clone());
            }
        }
        if basis.insert(col.clone()) {
            kept.push((g, col));
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_of_square_cycle() {
        // boundary of the four edges of a square on vertices 0..4
        let m = GradedMatrix::new(
            4,
            vec![
                Column::from_indices([0, 1]),
                Column::from_indices([1, 2]),
                Column::from_indices([2, 3]),
                Column::from_indices([0, 3]),
            ],
            vec![Grade::new(1, 1); 4],
        );
        let gens = kernel_generators(&m);
        assert_eq!(gens.len(), 1);
        assert_eq!(gens[0].0, Grade::new(1, 1));
        // the cycle uses all four edges
        assert_eq!(gens[0].1, Column::from_indices([0, 1, 2, 3]));
    }

    #[test]
    fn test_kernel_generator_at_join_grade() {
        // two equal columns entering at incomparable grades: their sum
        // vanishes, but only once both are present, at the join (1, 1)
        let m = GradedMatrix::new(
            1,
            vec![Column::unit(0), Column::unit(0)],
            vec![Grade::new(1, 0), Grade::new(0, 1)],
        );
        let gens = kernel_generators(&m);
        assert_eq!(gens.len(), 1);
        assert_eq!(gens[0].0, Grade::new(1, 1));
        assert_eq!(gens[0].1, Column::from_indices([0, 1]));
    }

    #[test]
    fn test_zero_map_kernel_is_free() {
        let m = GradedMatrix::new(
            0,
            vec![Column::new(), Column::new()],
            vec![Grade::new(0, 0), Grade::new(1, 0)],
        );
        let gens = kernel_generators(&m);
        assert_eq!(gens.len(), 2);
        assert_eq!(gens[0].0, Grade::new(0, 0));
        assert_eq!(gens[1].0, Grade::new(1, 0));
    }

    #[test]
    fn test_minimize_drops_dependent_generator() {
        let gens = vec![
            (Grade::new(0, 0), Column::unit(0)),
            (Grade::new(1, 0), Column::unit(1)),
            // dependent on the two above, which exist at (1, 1)
            (Grade::new(1, 1), Column::from_indices([0, 1])),
        ];
        let kept = minimize_generators(gens);
        assert_eq!(kept.len(), 2);
    }
}
