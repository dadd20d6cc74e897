//! Homology-Based Betti Numbers via the Koszul Complex
//!
//! Alternative Betti-number strategy that never materializes the
//! presentation. At each grade `a` the three Betti numbers are the
//! homology dimensions of the Koszul complex
//!
//!   M(a−e₁−e₂) → M(a−e₁) ⊕ M(a−e₂) → M(a)
//!
//! and every dimension in sight reduces to exact ranks of cycle and
//! boundary subspaces of the middle chain group:
//!
//! - ξ₀(a) = dim Z(a) − dim(Z(a−e₁) + Z(a−e₂) + B(a))
//! - ξ₂(a) = dim(B(a−e₁) ∩ B(a−e₂)) − dim B(a−e₁−e₂)
//! - ξ₁(a) from the two above and the Euler characteristic of the
//!   complex.
//!
//! Faster than building the presentation when only the template points
//! are wanted; cannot emit presentation data. Grid rows are independent
//! and evaluated in parallel.

use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::filtration::Bifiltration;
use crate::matrix::{Column, F2Basis};
use crate::numeric::Grade;

use super::betti::{boundary_rank, collect_template_points, cycle_basis, TemplatePoint};

/// Template points from per-grade Koszul homology ranks.
pub fn koszul_template_points(f: &Bifiltration) -> Result<Vec<TemplatePoint>> {
    let nx = f.x_index.len();
    let ny = f.y_index.len();
    if nx == 0 || ny == 0 {
        return Ok(Vec::new());
    }
    let order = f.low.colex_order();

    let rows: Vec<Vec<(usize, [i64; 3])>> = (0..ny)
        .into_par_iter()
        .map(|j| {
            (0..nx)
                .map(|i| Ok((i, betti_at(f, i, j, &order)?)))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut counts: BTreeMap<(usize, usize), [u32; 3]> = BTreeMap::new();
    for (j, row) in rows.into_iter().enumerate() {
        for (i, betti) in row {
            if betti.iter().any(|&b| b > 0) {
                counts.insert((j, i), [betti[0] as u32, betti[1] as u32, betti[2] as u32]);
            }
        }
    }
    Ok(collect_template_points(counts))
}

fn betti_at(f: &Bifiltration, i: usize, j: usize, order: &[usize]) -> Result<[i64; 3]> {
    let g = Grade::new(i, j);
    let z_dim = cycle_basis(f, g, order).len() as i64;
    let b_dim = boundary_rank(f, g) as i64;

    let boundary_cols = |g: Grade| -> Vec<&Column> {
        f.high.columns_at(g).map(|c| &f.high.columns[c]).collect()
    };

    // span of the two one-step-lower cycle spaces together with the
    // boundaries at `a`; cycle combinations are already chain vectors
    // in middle-cell coordinates
    let mut d1_span = F2Basis::new();
    if i > 0 {
        for col in cycle_basis(f, Grade::new(i - 1, j), order) {
            d1_span.insert(col);
        }
    }
    if j > 0 {
        for col in cycle_basis(f, Grade::new(i, j - 1), order) {
            d1_span.insert(col);
        }
    }
    for col in boundary_cols(g) {
        d1_span.insert(col.clone());
    }
    let zero = z_dim - d1_span.rank() as i64;

    let two = if i > 0 && j > 0 {
        let b1 = boundary_cols(Grade::new(i - 1, j));
        let b2 = boundary_cols(Grade::new(i, j - 1));
        let r1 = F2Basis::rank_of(b1.iter().copied()) as i64;
        let r2 = F2Basis::rank_of(b2.iter().copied()) as i64;
        let r_union = F2Basis::rank_of(b1.iter().chain(b2.iter()).copied()) as i64;
        let r_corner = boundary_rank(f, Grade::new(i - 1, j - 1)) as i64;
        (r1 + r2 - r_union) - r_corner
    } else {
        0
    };

    let m_left = if i > 0 { module_dim(f, Grade::new(i - 1, j), order) } else { 0 };
    let m_below = if j > 0 { module_dim(f, Grade::new(i, j - 1), order) } else { 0 };
    let m_corner = if i > 0 && j > 0 {
        module_dim(f, Grade::new(i - 1, j - 1), order)
    } else {
        0
    };
    let rank_d1 = d1_span.rank() as i64 - b_dim;
    let one = m_left + m_below - rank_d1 - (m_corner - two);

    if zero < 0 || one < 0 || two < 0 {
        return Err(Error::invariant(format!(
            "negative Koszul rank at grade ({i}, {j}): ({zero}, {one}, {two})"
        )));
    }
    Ok([zero, one, two])
}

fn module_dim(f: &Bifiltration, g: Grade, order: &[usize]) -> i64 {
    cycle_basis(f, g, order).len() as i64 - boundary_rank(f, g) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtration::tests::two_points_one_edge;
    use crate::filtration::GradedSimplex;
    use crate::numeric::ExactValue;
    use crate::presentation::betti::betti_from_presentation;
    use crate::presentation::minimal::minimal_presentation;

    fn v(n: i64) -> ExactValue {
        ExactValue::from_int(n)
    }

    fn agree(f: &Bifiltration) {
        let via_pres = betti_from_presentation(&minimal_presentation(f).unwrap());
        let via_koszul = koszul_template_points(f).unwrap();
        assert_eq!(via_pres, via_koszul);
    }

    #[test]
    fn test_agreement_single_vertex() {
        let f = Bifiltration::from_simplices(
            &[GradedSimplex::new(vec![0], v(0), v(0))],
            0,
        )
        .unwrap();
        agree(&f);
        assert_eq!(
            koszul_template_points(&f).unwrap(),
            vec![TemplatePoint::new(0, 0, 1, 0, 0)]
        );
    }

    #[test]
    fn test_agreement_merge() {
        agree(&two_points_one_edge());
    }

    #[test]
    fn test_agreement_hook_with_syzygy() {
        let f = crate::presentation::minimal::tests::hook();
        agree(&f);
        let points = koszul_template_points(&f).unwrap();
        let syz: Vec<_> = points.iter().filter(|p| p.two > 0).collect();
        assert_eq!(syz.len(), 1);
        assert_eq!((syz[0].x, syz[0].y, syz[0].two), (1, 1, 1));
    }

    #[test]
    fn test_agreement_degree_one_square() {
        let simplices = [
            GradedSimplex::new(vec![0], v(0), v(0)),
            GradedSimplex::new(vec![1], v(0), v(0)),
            GradedSimplex::new(vec![2], v(0), v(0)),
            GradedSimplex::new(vec![3], v(0), v(0)),
            GradedSimplex::new(vec![0, 1], v(1), v(0)),
            GradedSimplex::new(vec![1, 2], v(0), v(1)),
            GradedSimplex::new(vec![2, 3], v(1), v(0)),
            GradedSimplex::new(vec![0, 3], v(0), v(1)),
        ];
        let f = Bifiltration::from_simplices(&simplices, 1).unwrap();
        agree(&f);
        // the cycle exists once all four edges do, at the join (1, 1)
        assert_eq!(
            koszul_template_points(&f).unwrap(),
            vec![TemplatePoint::new(1, 1, 1, 0, 0)]
        );
    }
}
