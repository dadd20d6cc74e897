//! Geometric Layer: the Augmented Line Arrangement
//!
//! Encodes every combinatorially distinct slice barcode of the module
//! at once. A slice line with angle in `(0°, 90°)` corresponds to a
//! point of the dual `(slope, offset)` plane; the dual lines of the
//! anchor grades subdivide that plane into faces, and every dual point
//! inside one face orders the template-point pushes identically. Each
//! face therefore carries a single symbolic [`TemplateEntry`] list that
//! specializes to the concrete barcode of any of its lines.
//!
//! Construction is exact throughout; see [`builder`] for the clipping
//! and linking strategy and [`dcel`] for the arena representation.

mod anchor;
mod builder;
mod dcel;
mod template;

pub use anchor::{support_lines, SupportLine};
pub use builder::build_arrangement;
pub use dcel::{
    Arrangement, DualPoint, Face, FaceId, HalfEdge, HalfEdgeId, SlabColumn, SlabIndex, Vertex,
    VertexId,
};
pub use template::TemplateEntry;

pub(crate) use template::{match_events, PushEvent};
