//! Minimal Free Presentation
//!
//! Builds the minimal presentation of the degree-`d` homology module of
//! a bifiltration: minimal generators of the cycle module, relations
//! obtained by rewriting the boundary columns in generator coordinates,
//! then minimization in two steps:
//!
//! 1. pivot cancellation: a relation whose grade equals the grade of a
//!    generator it touches removes that generator/relation pair;
//! 2. redundant relations: a relation in the span of relations already
//!    present at its own grade is dropped.
//!
//! The result is the smallest generator/relation description of the
//! module up to isomorphism; its grade multiplicities are the first two
//! multigraded Betti number functions.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filtration::Bifiltration;
use crate::matrix::{Column, GradedMatrix};
use crate::numeric::{Grade, GradeIndex};

use super::kernel::{kernel_generators, minimize_generators};

/// A minimal free presentation: generator grades and the sparse
/// relation matrix in generator coordinates. Computed once, read-only
/// afterward; consumed for printing/export, not by the arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub generators: Vec<Grade>,
    pub relations: GradedMatrix,
}

impl Presentation {
    /// Plain-text sparse rendering, one generator or relation per line,
    /// grades shown as exact coordinate values.
    pub fn render(&self, x_index: &GradeIndex, y_index: &GradeIndex) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "MINIMAL PRESENTATION:");
        let _ = writeln!(out, "Generators ({}):", self.generators.len());
        for g in &self.generators {
            let _ = writeln!(out, "  ({}, {})", x_index.value(g.x), y_index.value(g.y));
        }
        let _ = writeln!(out, "Relations ({}):", self.relations.ncols());
        for (col, g) in self.relations.columns.iter().zip(&self.relations.grades) {
            let entries: Vec<String> = col.iter().map(|r| r.to_string()).collect();
            let _ = writeln!(
                out,
                "  ({}, {}): {}",
                x_index.value(g.x),
                y_index.value(g.y),
                entries.join(" ")
            );
        }
        out
    }
}

/// Computes the minimal presentation of the homology module of `f`.
pub fn minimal_presentation(f: &Bifiltration) -> Result<Presentation> {
    let kgens = kernel_generators(&f.low);

    // Rewrite each boundary column in generator coordinates, using only
    // the generators alive at the column's grade.
    let mut rel_cols: Vec<Column> = Vec::with_capacity(f.high.ncols());
    let mut rel_grades: Vec<Grade> = Vec::with_capacity(f.high.ncols());
    for (j, col) in f.high.columns.iter().enumerate() {
        let grade = f.high.grades[j];
        rel_cols.push(express_in_generators(col, &kgens, grade)?);
        rel_grades.push(grade);
    }

    // Pivot cancellation at equal grades.
    let mut gen_alive = vec![true; kgens.len()];
    let mut rel_alive = vec![true; rel_cols.len()];
    loop {
        let mut target: Option<(usize, usize)> = None;
        'scan: for ri in 0..rel_cols.len() {
            if !rel_alive[ri] {
                continue;
            }
            for e in rel_cols[ri].iter() {
                if gen_alive[e] && kgens[e].0 == rel_grades[ri] {
                    target = Some((ri, e));
                    break 'scan;
                }
            }
        }
        let Some((ri, e)) = target else { break };
        let rcol = rel_cols[ri].clone();
        for rj in 0..rel_cols.len() {
            if rj != ri && rel_alive[rj] && rel_cols[rj].contains(e) {
                rel_cols[rj].add_assign(&rcol);
            }
        }
        gen_alive[e] = false;
        rel_alive[ri] = false;
    }

    // Renumber surviving generators.
    let gen_map: BTreeMap<usize, usize> = gen_alive
        .iter()
        .enumerate()
        .filter(|(_, alive)| **alive)
        .enumerate()
        .map(|(new, (old, _))| (old, new))
        .collect();
    let generators: Vec<Grade> = kgens
        .iter()
        .enumerate()
        .filter(|(i, _)| gen_alive[*i])
        .map(|(_, (g, _))| *g)
        .collect();

    let survivors: Vec<(Grade, Column)> = rel_cols
        .iter()
        .zip(&rel_grades)
        .zip(&rel_alive)
        .filter(|((col, _), alive)| **alive && !col.is_zero())
        .map(|((col, g), _)| (*g, col.remap(&gen_map)))
        .collect();
    let minimized = minimize_generators(survivors);

    let (grades, columns): (Vec<Grade>, Vec<Column>) = minimized.into_iter().unzip();
    Ok(Presentation {
        relations: GradedMatrix::new(generators.len(), columns, grades),
        generators,
    })
}

/// Solves `col = sum of generators` over GF(2), restricted to the
/// generators alive at `grade`. The boundary of a valid complex always
/// lies in the cycle span; failure is an internal defect.
fn express_in_generators(
    col: &Column,
    gens: &[(Grade, Column)],
    grade: Grade,
) -> Result<Column> {
    let mut pivots: BTreeMap<usize, usize> = BTreeMap::new();
    let mut ech_cols: Vec<Column> = Vec::new();
    let mut ech_combos: Vec<Column> = Vec::new();
    for (gi, (g, gcol)) in gens.iter().enumerate() {
        if !g.leq(&grade) {
            continue;
        }
        let mut c = gcol.clone();
        let mut combo = Column::unit(gi);
        while let Some(low) = c.low() {
            match pivots.get(&low) {
                Some(&p) => {
                    c.add_assign(&ech_cols[p]);
                    combo.add_assign(&ech_combos[p]);
                }
                None => {
                    pivots.insert(low, ech_cols.len());
                    ech_cols.push(c);
                    ech_combos.push(combo);
                    break;
                }
            }
        }
    }

    let mut c = col.clone();
    let mut combo = Column::new();
    while let Some(low) = c.low() {
        match pivots.get(&low) {
            Some(&p) => {
                c.add_assign(&ech_cols[p]);
                combo.add_assign(&ech_combos[p]);
            }
            None => break,
        }
    }
    if !c.is_zero() {
        return Err(Error::invariant(
            "boundary column is not spanned by cycle generators at its grade",
        ));
    }
    Ok(combo)
}
