//! Staged Computation Pipeline
//!
//! [`compute`] runs the whole construction in order: multigraded Betti
//! numbers (by either strategy), the Hilbert-function grid, then the
//! augmented arrangement. The stages are reported through a
//! [`ProgressSink`] and the artifacts come back together as one
//! immutable [`ComputeResult`] value; once returned it is read-only and
//! any number of concurrent queries may share it.
//!
//! Parallel work (per-grade ranks, query batches) runs on the ambient
//! `rayon` pool; a positive `max_threads` installs a dedicated pool of
//! that size for the duration of the computation.

use ndarray::Array2;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arrangement::{build_arrangement, Arrangement};
use crate::error::{Error, Result};
use crate::filtration::Bifiltration;
use crate::numeric::GradeIndex;
use crate::presentation::{
    betti_from_presentation, hilbert_grid, koszul_template_points, minimal_presentation,
    Presentation, TemplatePoint,
};
use crate::progress::ProgressSink;

/// Knobs of [`compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeOptions {
    /// Compute template points from Koszul homology ranks instead of
    /// building the minimal presentation. Faster when only the template
    /// points are needed; the result then carries no presentation.
    pub koszul: bool,
    /// Worker pool size; `0` lets the runtime decide.
    pub max_threads: usize,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self { koszul: false, max_threads: 0 }
    }
}

/// Everything one computation produces. Immutable after construction;
/// queries and bounds only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub x_index: GradeIndex,
    pub y_index: GradeIndex,
    pub template_points: Vec<TemplatePoint>,
    /// Absent under the Koszul strategy.
    pub presentation: Option<Presentation>,
    /// `dim M(x, y)` over the full grade grid.
    pub hilbert: Array2<u32>,
    pub arrangement: Arrangement,
}

/// Runs the full pipeline on a validated bifiltration.
pub fn compute(
    f: &Bifiltration,
    options: &ComputeOptions,
    progress: &dyn ProgressSink,
) -> Result<ComputeResult> {
    if options.max_threads == 0 {
        return compute_stages(f, options, progress);
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.max_threads)
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;
    pool.install(|| compute_stages(f, options, progress))
}

fn compute_stages(
    f: &Bifiltration,
    options: &ComputeOptions,
    progress: &dyn ProgressSink,
) -> Result<ComputeResult> {
    progress.advance_stage();
    let (template_points, presentation) = if options.koszul {
        (koszul_template_points(f)?, None)
    } else {
        let presentation = minimal_presentation(f)?;
        (betti_from_presentation(&presentation), Some(presentation))
    };
    info!(
        points = template_points.len(),
        koszul = options.koszul,
        "template points computed"
    );

    progress.advance_stage();
    let hilbert = hilbert_grid(f);

    progress.advance_stage();
    let arrangement = build_arrangement(&template_points, &f.x_index, &f.y_index, progress)?;
    let (vertices, edges, faces) = arrangement.counts();
    info!(vertices, edges, faces, "augmented arrangement built");

    Ok(ComputeResult {
        x_index: f.x_index.clone(),
        y_index: f.y_index.clone(),
        template_points,
        presentation,
        hilbert,
        arrangement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtration::tests::two_points_one_edge;
    use crate::filtration::GradedSimplex;
    use crate::numeric::ExactValue;
    use crate::progress::tests::CountingProgress;
    use crate::progress::NoopProgress;
    use crate::query::{parse_queries, query_barcodes, render_barcode, SliceQuery};
    use std::sync::atomic::Ordering;

    fn merge() -> ComputeResult {
        compute(&two_points_one_edge(), &ComputeOptions::default(), &NoopProgress).unwrap()
    }

    #[test]
    fn test_end_to_end_merge() {
        let result = merge();
        assert_eq!(result.template_points.len(), 3);
        assert!(result.presentation.is_some());
        assert_eq!(result.arrangement.counts(), (10, 14, 6));
        assert_eq!(result.hilbert[[1, 0]], 2);
        assert_eq!(result.hilbert[[1, 1]], 1);
    }

    #[test]
    fn test_strategies_agree_on_everything_but_presentation() {
        let f = two_points_one_edge();
        let direct = compute(&f, &ComputeOptions::default(), &NoopProgress).unwrap();
        let koszul = compute(
            &f,
            &ComputeOptions { koszul: true, max_threads: 0 },
            &NoopProgress,
        )
        .unwrap();
        assert!(koszul.presentation.is_none());
        assert_eq!(direct.template_points, koszul.template_points);
        assert_eq!(direct.arrangement, koszul.arrangement);
        assert_eq!(direct.hilbert, koszul.hilbert);
    }

    #[test]
    fn test_single_simplex_module() {
        // one vertex at the origin: a free module on one generator
        let f = crate::filtration::Bifiltration::from_simplices(
            &[GradedSimplex::new(vec![0], ExactValue::zero(), ExactValue::zero())],
            0,
        )
        .unwrap();
        let result = compute(&f, &ComputeOptions::default(), &NoopProgress).unwrap();
        assert_eq!(result.template_points.len(), 1);
        // one horizontal support line through the rectangle
        assert_eq!(result.arrangement.counts(), (6, 7, 3));

        let barcodes =
            query_barcodes(&result, &[SliceQuery::new(45.0, 0.0)]).unwrap();
        assert_eq!(barcodes[0].bars.len(), 1);
        assert_eq!(barcodes[0].bars[0].death, f64::INFINITY);
        assert_eq!(barcodes[0].bars[0].multiplicity, 1);
    }

    #[test]
    fn test_degree_one_cycle_query() {
        // square cycle whose last edges arrive at incomparable grades;
        // the loop exists only above their join (1, 1)
        fn v(n: i64) -> ExactValue {
            ExactValue::from_int(n)
        }
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
        let f = crate::filtration::Bifiltration::from_simplices(&simplices, 1).unwrap();
        let result = compute(&f, &ComputeOptions::default(), &NoopProgress).unwrap();
        assert_eq!(result.template_points.len(), 1);

        let barcodes = query_barcodes(&result, &[SliceQuery::new(45.0, 0.0)]).unwrap();
        let bars = &barcodes[0].bars;
        assert_eq!(bars.len(), 1);
        assert!((bars[0].birth - 2.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(bars[0].death, f64::INFINITY);
    }

    #[test]
    fn test_progress_stages_and_ticks() {
        let sink = CountingProgress::default();
        let result = compute(&two_points_one_edge(), &ComputeOptions::default(), &sink).unwrap();
        assert_eq!(sink.stages.load(Ordering::Relaxed), 3);
        // one tick per inserted support line
        assert_eq!(
            sink.ticks.load(Ordering::Relaxed),
            result.arrangement.lines.len()
        );
    }

    #[test]
    fn test_dedicated_pool() {
        let options = ComputeOptions { koszul: false, max_threads: 2 };
        let result = compute(&two_points_one_edge(), &options, &NoopProgress).unwrap();
        assert_eq!(result.template_points.len(), 3);
    }

    #[test]
    fn test_determinism_across_runs() {
        assert_eq!(merge(), merge());
    }

    #[test]
    fn test_query_file_round_trip() {
        let result = merge();
        let queries = parse_queries("# batch\n45 0\n\n0 0\n").unwrap();
        let barcodes = query_barcodes(&result, &queries).unwrap();
        assert_eq!(barcodes.len(), 2);
        let text = render_barcode(&queries[0], &barcodes[0]);
        assert!(text.starts_with("45 0: 0 "));
        assert!(text.ends_with("x1"));
    }

    #[test]
    fn test_query_file_with_commented_line() {
        // the commented angle-100 line is skipped; the three valid
        // queries produce one output line each, in order
        let result = merge();
        let text = "23 -0.22\n67 1.88\n10 0.92\n#100 0.92\n";
        let queries = parse_queries(text).unwrap();
        assert_eq!(queries.len(), 3);
        let barcodes = query_barcodes(&result, &queries).unwrap();
        assert_eq!(barcodes.len(), 3);
        let rendered: Vec<String> = queries
            .iter()
            .zip(&barcodes)
            .map(|(q, b)| render_barcode(q, b))
            .collect();
        assert!(rendered[0].starts_with("23 -0.22: "));
        assert!(rendered[1].starts_with("67 1.88: "));
        assert!(rendered[2].starts_with("10 0.92: "));

        // uncommented, the same line is an angle-range error
        let err = parse_queries("23 -0.22\n67 1.88\n10 0.92\n100 0.92\n").unwrap_err();
        assert!(matches!(err, crate::error::Error::AngleOutOfRange { line: 4, .. }));
    }
}
