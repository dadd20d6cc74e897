//! Multigraded Betti Numbers and Template Points
//!
//! The three Betti number functions of the module are the grade
//! multiplicities of its minimal resolution: generators (ξ₀), relations
//! (ξ₁), and second syzygies (ξ₂). A grade carrying a nonzero value of
//! any of the three is a *template point*; the collection of template
//! points is the only input the arrangement builder needs.
//!
//! Also provided is the Hilbert function of the module over the full
//! grade grid, the per-grade dimension `dim M(x, y)`.

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filtration::Bifiltration;
use crate::matrix::F2Basis;
use crate::numeric::Grade;

use super::kernel::{kernel_basis_at, kernel_generators};
use super::minimal::Presentation;

/// A grade position carrying nonzero multigraded Betti numbers.
/// `zero`, `one`, `two` are the multiplicities of ξ₀, ξ₁, ξ₂ at the
/// grade `(x, y)` (indices into the axis registries); at least one of
/// them is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePoint {
    pub x: usize,
    pub y: usize,
    pub zero: u32,
    pub one: u32,
    pub two: u32,
}

impl TemplatePoint {
    pub fn new(x: usize, y: usize, zero: u32, one: u32, two: u32) -> Self {
        Self { x, y, zero, one, two }
    }

    pub fn grade(&self) -> Grade {
        Grade::new(self.x, self.y)
    }
}

/// Folds per-grade (ξ₀, ξ₁, ξ₂) counts into template points, colex
/// sorted, dropping all-zero grades.
pub(crate) fn collect_template_points(
    counts: BTreeMap<(usize, usize), [u32; 3]>,
) -> Vec<TemplatePoint> {
    counts
        .into_iter()
        .filter(|(_, c)| c.iter().any(|&v| v > 0))
        .map(|((y, x), c)| TemplatePoint::new(x, y, c[0], c[1], c[2]))
        .collect()
}

/// Betti numbers read off a minimal presentation: generator grades,
/// relation grades, and the minimal generators of the relation kernel
/// (the second syzygies).
pub fn betti_from_presentation(pres: &Presentation) -> Vec<TemplatePoint> {
    let mut counts: BTreeMap<(usize, usize), [u32; 3]> = BTreeMap::new();
    for g in &pres.generators {
        counts.entry(g.colex()).or_default()[0] += 1;
    }
    for g in &pres.relations.grades {
        counts.entry(g.colex()).or_default()[1] += 1;
    }
    for (g, _) in kernel_generators(&pres.relations) {
        counts.entry(g.colex()).or_default()[2] += 1;
    }
    collect_template_points(counts)
}

/// The Hilbert function `dim M(x, y)` over the full grade grid,
/// computed independently per grade (cycles minus boundaries) and in
/// parallel across grid rows.
pub fn hilbert_grid(f: &Bifiltration) -> Array2<u32> {
    let nx = f.x_index.len();
    let ny = f.y_index.len();
    let mut grid = Array2::<u32>::zeros((nx, ny));
    if nx == 0 || ny == 0 {
        return grid;
    }

    let rows: Vec<Vec<u32>> = (0..ny)
        .into_par_iter()
        .map(|j| {
            (0..nx)
                .map(|i| {
                    let g = Grade::new(i, j);
                    let visible = f.low.columns_at(g).count();
                    let z = visible - f.low.rank_at(g);
                    let b = f.high.rank_at(g);
                    debug_assert!(b <= z);
                    z.saturating_sub(b) as u32
                })
                .collect()
        })
        .collect();

    for (j, row) in rows.into_iter().enumerate() {
        for (i, dim) in row.into_iter().enumerate() {
            grid[[i, j]] = dim;
        }
    }
    grid
}

/// Cycle-space dimension helper shared with the Koszul strategy.
pub(crate) fn cycle_basis(
    f: &Bifiltration,
    grade: Grade,
    order: &[usize],
) -> Vec<crate::matrix::Column> {
    kernel_basis_at(&f.low, grade, order)
}

/// Boundary-space dimension at a grade.
pub(crate) fn boundary_rank(f: &Bifiltration, grade: Grade) -> usize {
    F2Basis::rank_of(f.high.columns_at(grade).map(|i| &f.high.columns[i]))
}
