//! Algebraic Layer: Presentations and Multigraded Betti Numbers
//!
//! Turns a validated [`Bifiltration`](crate::filtration::Bifiltration)
//! into the algebraic invariants the geometric layer consumes:
//!
//! - [`minimal_presentation`]: minimal generators and relations of the
//!   homology module,
//! - [`betti_from_presentation`] / [`koszul_template_points`]: the
//!   multigraded Betti number functions ξ₀, ξ₁, ξ₂ folded into
//!   [`TemplatePoint`]s,
//! - [`hilbert_grid`]: the per-grade dimension of the module.
//!
//! The two Betti strategies are interchangeable; the Koszul route skips
//! the presentation entirely and exists for callers that only need the
//! template points.

mod betti;
mod kernel;
mod koszul;
mod minimal;

pub use betti::{betti_from_presentation, hilbert_grid, TemplatePoint};
pub use koszul::koszul_template_points;
pub use minimal::{minimal_presentation, Presentation};
