//! Arrangement Construction
//!
//! Builds the half-edge subdivision of the support lines clipped to the
//! rectangle `[0, m_max] × [−b_max, b_max]` of the dual plane. The
//! bounds are chosen so that the clip changes nothing combinatorial:
//! `m_max` exceeds every pairwise crossing slope, so the left-to-right
//! order of the lines is final at the right border, and `b_max` exceeds
//! every line offset inside the strip, so no line meets the top or
//! bottom edge. Every face of the unbounded half-strip arrangement is
//! therefore represented by exactly one clipped face.
//!
//! Lines are inserted in increasing slope order; all intersections are
//! computed exactly, and coincident intersection points (three or more
//! concurrent lines) coalesce into a single vertex through exact
//! interning. Half edges are linked by exact angular order around each
//! vertex, faces are read off as `next` cycles, and the single
//! clockwise cycle along the clip frame is the outer face.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::numeric::GradeIndex;
use crate::presentation::TemplatePoint;
use crate::progress::ProgressSink;

use super::anchor::{support_lines, SupportLine};
use super::dcel::{
    ccw_cmp, Arrangement, DualPoint, Face, FaceId, HalfEdge, HalfEdgeId, SlabColumn, SlabIndex,
    Vertex, VertexId,
};
use super::template::face_template;

/// Builds the augmented arrangement of a template-point set.
pub fn build_arrangement(
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
    progress: &dyn ProgressSink,
) -> Result<Arrangement> {
    let lines = support_lines(points, x_index, y_index);
    progress.set_stage_steps(lines.len());

    let (m_max, b_max) = clip_bounds(&lines);
    let mut interner = VertexInterner::default();

    // Insert lines in slope order; each line contributes its two border
    // endpoints and its exact crossings with the lines already present.
    let mut line_vertices: Vec<Vec<usize>> = vec![Vec::new(); lines.len()];
    for (li, line) in lines.iter().enumerate() {
        let left = interner.intern(DualPoint::new(BigRational::zero(), line.y.clone()));
        let right = interner.intern(DualPoint::new(m_max.clone(), line.value_at(&m_max)));
        line_vertices[li].push(left);
        line_vertices[li].push(right);
        for lj in 0..li {
            let Some(m) = line.crossing(&lines[lj]) else { continue };
            if m.is_negative() || m > m_max {
                continue;
            }
            let v = interner.intern(DualPoint::new(m.clone(), line.value_at(&m)));
            line_vertices[li].push(v);
            line_vertices[lj].push(v);
        }
        progress.progress(1);
    }
    for corner in [
        DualPoint::new(BigRational::zero(), b_max.clone()),
        DualPoint::new(BigRational::zero(), -b_max.clone()),
        DualPoint::new(m_max.clone(), b_max.clone()),
        DualPoint::new(m_max.clone(), -b_max.clone()),
    ] {
        interner.intern(corner);
    }
    let positions = interner.positions;

    // Segments: consecutive vertices along each line, then along each
    // side of the clip frame.
    let mut segments: Vec<(usize, usize, Option<usize>)> = Vec::new();
    for (li, mut ids) in line_vertices.into_iter().enumerate() {
        ids.sort_by(|a, b| positions[*a].m.cmp(&positions[*b].m));
        ids.dedup();
        for w in ids.windows(2) {
            segments.push((w[0], w[1], Some(li)));
        }
    }
    for (u, v) in border_segments(&positions, &m_max, &b_max) {
        segments.push((u, v, None));
    }

    link_faces(lines, positions, segments, m_max, b_max, points, x_index, y_index)
}

/// `(m_max, b_max)` of the clip rectangle.
fn clip_bounds(lines: &[SupportLine]) -> (BigRational, BigRational) {
    let mut m_max = BigRational::zero();
    for (i, a) in lines.iter().enumerate() {
        for b in &lines[i + 1..] {
            if let Some(m) = a.crossing(b) {
                if m > m_max {
                    m_max = m;
                }
            }
        }
    }
    m_max += BigRational::one();

    let mut extreme = BigRational::zero();
    for line in lines {
        for value in [line.value_at(&BigRational::zero()), line.value_at(&m_max)] {
            let a = value.abs();
            if a > extreme {
                extreme = a;
            }
        }
    }
    (m_max, extreme + BigRational::one())
}

#[derive(Default)]
struct VertexInterner {
    map: BTreeMap<DualPoint, usize>,
    positions: Vec<DualPoint>,
}

impl VertexInterner {
    fn intern(&mut self, p: DualPoint) -> usize {
        if let Some(&id) = self.map.get(&p) {
            return id;
        }
        let id = self.positions.len();
        self.positions.push(p.clone());
        self.map.insert(p, id);
        id
    }
}

/// Consecutive vertex pairs along each side of the clip frame.
fn border_segments(
    positions: &[DualPoint],
    m_max: &BigRational,
    b_max: &BigRational,
) -> Vec<(usize, usize)> {
    let zero = BigRational::zero();
    let bottom = -b_max.clone();
    let on_left = |p: &DualPoint| p.m == zero;
    let on_right = |p: &DualPoint| p.m == *m_max;
    let on_top = |p: &DualPoint| p.b == *b_max;
    let on_bottom = |p: &DualPoint| p.b == bottom;
    let sides: [(&dyn Fn(&DualPoint) -> bool, bool); 4] = [
        (&on_left, true),
        (&on_right, true),
        (&on_top, false),
        (&on_bottom, false),
    ];

    let mut out = Vec::new();
    for (test, sort_by_b) in sides {
        let mut ids: Vec<usize> =
            (0..positions.len()).filter(|&i| test(&positions[i])).collect();
        ids.sort_by(|x, y| {
            if sort_by_b {
                positions[*x].b.cmp(&positions[*y].b)
            } else {
                positions[*x].m.cmp(&positions[*y].m)
            }
        });
        for w in ids.windows(2) {
            out.push((w[0], w[1]));
        }
    }
    out
}

/// Links half edges around each vertex, extracts the `next` cycles as
/// faces, and attaches centroids and templates.
#[allow(clippy::too_many_arguments)]
fn link_faces(
    lines: Vec<SupportLine>,
    positions: Vec<DualPoint>,
    segments: Vec<(usize, usize, Option<usize>)>,
    m_max: BigRational,
    b_max: BigRational,
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
) -> Result<Arrangement> {
    let n_he = segments.len() * 2;
    let mut origin = vec![0usize; n_he];
    let mut line_of = vec![None; n_he];
    for (s, &(u, v, li)) in segments.iter().enumerate() {
        origin[2 * s] = u;
        origin[2 * s + 1] = v;
        line_of[2 * s] = li;
        line_of[2 * s + 1] = li;
    }
    let twin = |h: usize| h ^ 1;

    // CCW rotation system at every vertex.
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); positions.len()];
    for h in 0..n_he {
        outgoing[origin[h]].push(h);
    }
    for (v, out) in outgoing.iter_mut().enumerate() {
        out.sort_by(|&a, &b| {
            let da = direction(&positions, origin[twin(a)], v);
            let db = direction(&positions, origin[twin(b)], v);
            ccw_cmp(&da, &db)
        });
    }

    // next(h): rotate one step clockwise past the twin at the target.
    let mut next = vec![0usize; n_he];
    for (h, nxt) in next.iter_mut().enumerate() {
        let t = origin[twin(h)];
        let out = &outgoing[t];
        let pos = out
            .iter()
            .position(|&e| e == twin(h))
            .ok_or_else(|| Error::invariant("half edge missing from its rotation system"))?;
        *nxt = out[(pos + out.len() - 1) % out.len()];
    }

    // Faces as next-cycles; the one clockwise cycle is the outer face.
    let mut face_of = vec![usize::MAX; n_he];
    let mut faces: Vec<Face> = Vec::new();
    let mut outer: Option<usize> = None;
    for start in 0..n_he {
        if face_of[start] != usize::MAX {
            continue;
        }
        let id = faces.len();
        let mut cycle = Vec::new();
        let mut h = start;
        loop {
            face_of[h] = id;
            cycle.push(h);
            h = next[h];
            if h == start {
                break;
            }
        }
        let (area2, centroid) = cycle_geometry(&positions, &origin, &cycle);
        if area2.is_negative() {
            if outer.replace(id).is_some() {
                return Err(Error::invariant("more than one clockwise face cycle"));
            }
        }
        faces.push(Face {
            edge: HalfEdgeId(start),
            centroid,
            template: Vec::new(),
        });
    }
    let outer =
        FaceId(outer.ok_or_else(|| Error::invariant("no clockwise face cycle found"))?);

    let nv = positions.len();
    let ne = segments.len();
    let nf = faces.len();
    if nv + nf != ne + 2 {
        return Err(Error::invariant(format!(
            "Euler check failed: V={nv} E={ne} F={nf}"
        )));
    }
    debug!(vertices = nv, edges = ne, faces = nf, "arrangement linked");

    for (id, face) in faces.iter_mut().enumerate() {
        if FaceId(id) != outer {
            face.template =
                face_template(points, x_index, y_index, &face.centroid.m, &face.centroid.b);
        }
    }

    let mut arrangement = Arrangement {
        lines,
        vertices: positions
            .into_iter()
            .enumerate()
            .map(|(v, position)| Vertex {
                position,
                outgoing: outgoing[v].iter().map(|&h| HalfEdgeId(h)).collect(),
            })
            .collect(),
        half_edges: (0..n_he)
            .map(|h| HalfEdge {
                origin: VertexId(origin[h]),
                twin: HalfEdgeId(twin(h)),
                next: HalfEdgeId(next[h]),
                face: FaceId(face_of[h]),
                line: line_of[h],
            })
            .collect(),
        faces,
        outer_face: outer,
        m_max,
        b_max,
        slabs: SlabIndex::default(),
    };
    arrangement.slabs = build_slab_index(&arrangement)?;
    Ok(arrangement)
}

/// Builds the slab point-location index: the distinct vertex slopes
/// bound the slabs, and within each slab the rightward half edge of a
/// line (or of the bottom border) names the face above it.
fn build_slab_index(arr: &Arrangement) -> Result<SlabIndex> {
    let two = BigRational::from_integer(BigInt::from(2));
    let mut boundaries: Vec<BigRational> =
        arr.vertices.iter().map(|v| v.position.m.clone()).collect();
    boundaries.sort();
    boundaries.dedup();

    let bottom_b = -arr.b_max.clone();
    let mut columns = Vec::with_capacity(boundaries.len().saturating_sub(1));
    for w in boundaries.windows(2) {
        let mid = (&w[0] + &w[1]) / &two;
        let mut by_value: Vec<(usize, BigRational)> = arr
            .lines
            .iter()
            .enumerate()
            .map(|(li, l)| (li, l.value_at(&mid)))
            .collect();
        by_value.sort_by(|a, b| a.1.cmp(&b.1));
        let mut slab_lines = Vec::with_capacity(by_value.len());
        for (li, _) in by_value {
            slab_lines.push((li, rightward_face(arr, &mid, Some(li), None)?));
        }
        let bottom = rightward_face(arr, &mid, None, Some(&bottom_b))?;
        columns.push(SlabColumn { lines: slab_lines, bottom });
    }
    Ok(SlabIndex { boundaries, columns })
}

/// Face on the upper side of the unique left-to-right half edge that
/// spans slope `mid` on the given line (`want_b` selects a horizontal
/// border when `want_line` is `None`).
fn rightward_face(
    arr: &Arrangement,
    mid: &BigRational,
    want_line: Option<usize>,
    want_b: Option<&BigRational>,
) -> Result<FaceId> {
    for he in &arr.half_edges {
        if he.line != want_line {
            continue;
        }
        let u = &arr.vertices[he.origin.0].position;
        let v = &arr.vertices[arr.half_edges[he.twin.0].origin.0].position;
        if !(u.m < *mid && *mid < v.m) {
            continue;
        }
        if let Some(border) = want_b {
            if u.b != *border {
                continue;
            }
        }
        return Ok(he.face);
    }
    Err(Error::invariant("no rightward half edge spans the slab"))
}

fn direction(positions: &[DualPoint], to: usize, from: usize) -> (BigRational, BigRational) {
    (
        &positions[to].m - &positions[from].m,
        &positions[to].b - &positions[from].b,
    )
}

/// Twice the signed area of a cycle and the average of its vertices.
/// Interior cycles are counterclockwise and convex, so the average is
/// an interior point.
fn cycle_geometry(
    positions: &[DualPoint],
    origin: &[usize],
    cycle: &[usize],
) -> (BigRational, DualPoint) {
    let mut area2 = BigRational::zero();
    let mut sum_m = BigRational::zero();
    let mut sum_b = BigRational::zero();
    for (k, &h) in cycle.iter().enumerate() {
        let p = &positions[origin[h]];
        let q = &positions[origin[cycle[(k + 1) % cycle.len()]]];
        area2 += &p.m * &q.b - &q.m * &p.b;
        sum_m += &p.m;
        sum_b += &p.b;
    }
    let n = BigRational::from_integer(BigInt::from(cycle.len()));
    (area2, DualPoint::new(sum_m / &n, sum_b / &n))
}
