//! Half-Edge Arena for the Dual-Plane Subdivision
//!
//! The arrangement is a doubly connected edge list stored as three flat
//! arenas of plain records addressed by integer handles. Twin, next and
//! face pointers are handles into the arenas, so the naturally cyclic
//! structure carries no reference cycles and navigation stays O(1).
//!
//! Coordinates are exact rationals in the dual `(m, b)` plane. Interior
//! face cycles run counterclockwise; the single clockwise cycle along
//! the clip frame is the outer face.

use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::anchor::SupportLine;
use super::template::TemplateEntry;

/// A point of the dual plane: slope `m`, offset `b`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DualPoint {
    pub m: BigRational,
    pub b: BigRational,
}

impl DualPoint {
    pub fn new(m: BigRational, b: BigRational) -> Self {
        Self { m, b }
    }
}

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub usize);
    };
}

arena_id!(VertexId);
arena_id!(HalfEdgeId);
arena_id!(FaceId);

/// An arrangement vertex: its exact position and the outgoing half
/// edges in counterclockwise angular order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: DualPoint,
    pub outgoing: Vec<HalfEdgeId>,
}

/// One direction of an edge. `line` is the index of the support line
/// the edge lies on, `None` for clip-frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfEdge {
    pub origin: VertexId,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub face: FaceId,
    pub line: Option<usize>,
}

/// A face of the subdivision with its exact centroid and barcode
/// template. The outer face carries an empty template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub edge: HalfEdgeId,
    pub centroid: DualPoint,
    pub template: Vec<TemplateEntry>,
}

/// The augmented arrangement: support lines, the half-edge subdivision
/// of the clip rectangle `[0, m_max] × [−b_max, b_max]`, per-face
/// templates, and the slab point-location index. Immutable once built;
/// queries only read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement {
    pub lines: Vec<SupportLine>,
    pub vertices: Vec<Vertex>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
    pub outer_face: FaceId,
    pub m_max: BigRational,
    pub b_max: BigRational,
    pub slabs: SlabIndex,
}

/// Point-location index over the vertical slabs between consecutive
/// vertex slopes. No two support lines cross in the interior of a slab,
/// so the lines there are totally ordered by offset and the face of a
/// point is named by the rank of its offset among them. Lookup is two
/// binary searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabIndex {
    /// Distinct vertex slopes, ascending; slab `i` spans
    /// `[boundaries[i], boundaries[i + 1]]`.
    pub(crate) boundaries: Vec<BigRational>,
    pub(crate) columns: Vec<SlabColumn>,
}

/// The lines crossing one slab, bottom to top, each paired with the
/// face on the upper side of its edge there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabColumn {
    pub(crate) lines: Vec<(usize, FaceId)>,
    /// The face just above the bottom border of the frame.
    pub(crate) bottom: FaceId,
}

impl SlabIndex {
    /// Face of the point `(m, b)` inside the clip frame. A point on an
    /// edge or vertex counts every line through it as below, so the
    /// chosen face lies on the side of increasing offset.
    pub fn locate(&self, lines: &[SupportLine], m: &BigRational, b: &BigRational) -> FaceId {
        let upper = self.boundaries.partition_point(|x| x <= m);
        let slab = upper.saturating_sub(1).min(self.columns.len() - 1);
        let column = &self.columns[slab];
        let below = column
            .lines
            .partition_point(|(li, _)| lines[*li].value_at(m) <= *b);
        if below == 0 {
            column.bottom
        } else {
            column.lines[below - 1].1
        }
    }
}

impl Arrangement {
    pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h.0].twin
    }

    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[h.0].next
    }

    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[h.0].origin
    }

    pub fn target(&self, h: HalfEdgeId) -> VertexId {
        self.origin(self.twin(h))
    }

    /// The half edges of a face boundary, in cycle order.
    pub fn face_cycle(&self, f: FaceId) -> Vec<HalfEdgeId> {
        let start = self.faces[f.0].edge;
        let mut cycle = vec![start];
        let mut h = self.next(start);
        while h != start {
            cycle.push(h);
            h = self.next(h);
        }
        cycle
    }

    /// Face ids excluding the outer face.
    pub fn inner_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId).filter(|f| *f != self.outer_face)
    }

    /// `(vertices, edges, faces)` with edges counted undirected.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.vertices.len(), self.half_edges.len() / 2, self.faces.len())
    }
}

/// Counterclockwise angular order of direction vectors, starting just
/// above the positive `m` axis. Total for the directions that occur at
/// an arrangement vertex, where no two edges leave in the same
/// direction.
pub(crate) fn ccw_cmp(a: &(BigRational, BigRational), b: &(BigRational, BigRational)) -> Ordering {
    fn half(d: &(BigRational, BigRational)) -> u8 {
        if d.1.is_positive() || (d.1.is_zero() && d.0.is_positive()) {
            0
        } else {
            1
        }
    }
    half(a).cmp(&half(b)).then_with(|| {
        let cross = &a.0 * &b.1 - &a.1 * &b.0;
        if cross.is_positive() {
            Ordering::Less
        } else if cross.is_negative() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}
