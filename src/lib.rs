//! # bipersist
//!
//! Two-Parameter Persistent Homology: Multigraded Betti Numbers,
//! Augmented Line Arrangements, and Exact Slice-Barcode Queries
//!
//! ## Framework
//!
//! A bifiltered complex defines a persistence module over two ordered
//! parameters at once. Unlike the one-parameter case it has no complete
//! barcode invariant; this crate computes the practical substitutes:
//!
//! 1. **Multigraded Betti numbers (ξ₀, ξ₁, ξ₂)**: the grades and
//!    multiplicities of minimal generators, relations, and second
//!    syzygies of the homology module, over GF(2)
//!
//! 2. **The augmented arrangement**: a planar subdivision of the dual
//!    (slope, offset) plane whose faces classify every affine slice
//!    line of positive slope by the combinatorial type of its barcode,
//!    each face carrying a symbolic barcode template
//!
//! 3. **Slice barcodes**: for any query line (angle, offset), the exact
//!    barcode of the restricted one-parameter module, answered by point
//!    location plus template specialization rather than by re-running
//!    persistence
//!
//! ## Exactness
//!
//! All grade coordinates, intersections, and push positions are exact
//! rationals ([`numeric::ExactValue`], `num_rational`); floating point
//! appears only in query inputs (converted exactly) and the final
//! reported endpoints. Degenerate configurations — concurrent support
//! lines, queries through arrangement vertices — are decided by exact
//! comparison and documented tie-breaks, never by epsilon.
//!
//! ## Pipeline
//!
//!   bifiltration → Betti numbers → augmented arrangement → queries
//!
//! [`pipeline::compute`] runs the construction once and returns an
//! immutable [`pipeline::ComputeResult`]; [`query::query_barcodes`] and
//! [`bounds::compute_bounds`] read it concurrently.
//!
//! ## References
//!
//! - Lesnick & Wright, "Interactive Visualization of 2-D Persistence
//!   Modules" (2015)
//! - Carlsson & Zomorodian, "The Theory of Multidimensional
//!   Persistence" (2009)
//! - Edelsbrunner & Harer, "Computational Topology" (2010)

pub mod arrangement;
pub mod bounds;
pub mod error;
pub mod filtration;
pub mod matrix;
pub mod numeric;
pub mod pipeline;
pub mod presentation;
pub mod progress;
pub mod query;

// Re-exports: the one-call surface
pub use bounds::{compute_bounds, Bounds};
pub use error::{Error, Result};
pub use filtration::{Bifiltration, GradedSimplex};
pub use numeric::{ExactValue, Grade, GradeIndex, INFTY};
pub use pipeline::{compute, ComputeOptions, ComputeResult};
pub use presentation::{Presentation, TemplatePoint};
pub use progress::{LogProgress, NoopProgress, ProgressSink};
pub use query::{parse_queries, query_barcodes, render_barcode, Bar, Barcode, SliceQuery};
