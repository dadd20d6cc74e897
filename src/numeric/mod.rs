//! Numeric Foundations: Exact Scalars and Grade Registries
//!
//! Everything upstream of barcode reporting runs on exact rational
//! arithmetic. This module provides the scalar type and the per-axis
//! grade registries that let combinatorial structures refer to grades by
//! small integer index.

mod exact;
mod grades;

pub use exact::{ExactValue, ParseExactError, INFTY};
pub use grades::{Grade, GradeIndex};
