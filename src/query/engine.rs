//! Barcode Queries Against the Augmented Arrangement
//!
//! Answering a slice query is point location plus template
//! specialization. The float query is converted to an exact dual point
//! (`f64` to rational loses nothing), located in the arrangement, and
//! the containing face's symbolic template is evaluated against the
//! query's actual geometry; floating point enters only in that last
//! evaluation. Location goes through the arrangement's slab index, two
//! binary searches instead of a walk over the faces. A query landing
//! exactly on an edge or vertex counts every line through it as below,
//! so boundaries belong to the face on the side of increasing offset.
//!
//! Queries beyond the clip frame are clamped into the unbounded face
//! they select; past `m_max` no two support lines cross again, so the
//! face is determined by how many lines pass below the query point.
//! The two boundary angles 0° and 90° have no dual point and are
//! answered by matching the template-point pushes on the horizontal or
//! vertical slice line directly, exactly.
//!
//! Batches are answered in parallel; each output barcode keeps the
//! position of its query.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::arrangement::{match_events, Arrangement, DualPoint, FaceId, PushEvent, TemplateEntry};
use crate::error::{Error, Result};
use crate::numeric::{ExactValue, GradeIndex, INFTY};
use crate::pipeline::ComputeResult;
use crate::presentation::TemplatePoint;

use super::slice::SliceQuery;

/// One reported bar. `death` is `f64::INFINITY` for open bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub birth: f64,
    pub death: f64,
    pub multiplicity: u32,
}

/// The barcode of one slice line, ordered by increasing birth, then
/// decreasing death.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Barcode {
    pub bars: Vec<Bar>,
}

/// Answers a query batch, one barcode per query in input order. The
/// whole batch is validated before any barcode is computed.
pub fn query_barcodes(result: &ComputeResult, queries: &[SliceQuery]) -> Result<Vec<Barcode>> {
    for (i, q) in queries.iter().enumerate() {
        q.validate(i + 1)?;
    }
    queries.par_iter().map(|q| barcode_for(result, q)).collect()
}

/// `"<angle> <offset>: <birth> <death|inf> x<mult>, …"`.
pub fn render_barcode(query: &SliceQuery, barcode: &Barcode) -> String {
    let mut out = format!("{} {}: ", query.angle, query.offset);
    for (i, bar) in barcode.bars.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if bar.death == f64::INFINITY {
            let _ = write!(out, "{} inf x{}", bar.birth, bar.multiplicity);
        } else {
            let _ = write!(out, "{} {} x{}", bar.birth, bar.death, bar.multiplicity);
        }
    }
    out
}

fn barcode_for(result: &ComputeResult, query: &SliceQuery) -> Result<Barcode> {
    if query.angle == 0.0 || query.angle == 90.0 {
        return axis_barcode(result, query, query.angle == 90.0);
    }

    let theta = query.angle.to_radians();
    let m = theta.tan();
    let b = query.offset / theta.cos();
    let to_exact = |v: f64| {
        BigRational::from_float(v)
            .ok_or_else(|| Error::invariant(format!("non-finite dual coordinate for {v}")))
    };
    let face = locate_face(&result.arrangement, &to_exact(m)?, &to_exact(b)?)?;
    let template = &result.arrangement.faces[face.0].template;
    Ok(specialize(
        template,
        &result.template_points,
        &result.x_index,
        &result.y_index,
        query,
    ))
}

/// Face containing the exact dual point, after clamping into the
/// frame. The slab index answers in logarithmic time; the result is
/// cross-checked against the face boundary.
fn locate_face(arr: &Arrangement, m: &BigRational, b: &BigRational) -> Result<FaceId> {
    let point = clamp_to_frame(arr, m, b);
    let face = arr.slabs.locate(&arr.lines, &point.m, &point.b);
    if face == arr.outer_face || !face_contains(arr, face, &point) {
        return Err(Error::invariant("located face does not contain the query point"));
    }
    Ok(face)
}

/// Convex containment: the point is on or left of every edge of the
/// counterclockwise face cycle.
fn face_contains(arr: &Arrangement, f: FaceId, p: &DualPoint) -> bool {
    arr.face_cycle(f).into_iter().all(|h| {
        let u = &arr.vertices[arr.origin(h).0].position;
        let v = &arr.vertices[arr.target(h).0].position;
        let cross = (&v.m - &u.m) * (&p.b - &u.b) - (&v.b - &u.b) * (&p.m - &u.m);
        !cross.is_negative()
    })
}

/// Maps a dual point outside the clip frame to an interior point of the
/// same combinatorial face.
fn clamp_to_frame(arr: &Arrangement, m: &BigRational, b: &BigRational) -> DualPoint {
    let two = BigRational::from_integer(BigInt::from(2));

    if *m >= arr.m_max {
        // line order is final past m_max; count the lines below the
        // point (ties count as below, putting the point in the face of
        // larger offset) and take the matching slot on the right border
        let below = arr.lines.iter().filter(|l| l.value_at(m) <= *b).count();
        let mut values: Vec<BigRational> =
            arr.lines.iter().map(|l| l.value_at(&arr.m_max)).collect();
        values.sort();
        let lower = if below == 0 { -arr.b_max.clone() } else { values[below - 1].clone() };
        let upper = if below == values.len() { arr.b_max.clone() } else { values[below].clone() };
        return DualPoint::new(arr.m_max.clone(), (lower + upper) / two);
    }
    if *b >= arr.b_max {
        let top = arr.lines.iter().map(|l| l.value_at(m)).max();
        let lower = top.unwrap_or_else(|| -arr.b_max.clone());
        return DualPoint::new(m.clone(), (lower + &arr.b_max) / two);
    }
    if *b <= -arr.b_max.clone() {
        let bottom = arr.lines.iter().map(|l| l.value_at(m)).min();
        let upper = bottom.unwrap_or_else(|| arr.b_max.clone());
        return DualPoint::new(m.clone(), (upper - &arr.b_max) / two);
    }
    DualPoint::new(m.clone(), b.clone())
}

/// Evaluates a face template against the concrete query line. This is
/// the one floating-point step of the query path.
fn specialize(
    template: &[TemplateEntry],
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
    query: &SliceQuery,
) -> Barcode {
    let theta = query.angle.to_radians();
    let (sin, cos) = theta.sin_cos();
    let m = sin / cos;
    let b = query.offset / cos;
    // basepoint: the foot of the offset normal
    let p0 = (-query.offset * sin, query.offset * cos);

    let param = |idx: usize| -> f64 {
        let px = x_index.value(points[idx].x).to_f64();
        let py = y_index.value(points[idx].y).to_f64();
        let (qx, qy) = if py <= m * px + b {
            (px, m * px + b)
        } else {
            ((py - b) / m, py)
        };
        (qx - p0.0) * cos + (qy - p0.1) * sin
    };

    let bars = template.iter().map(|e| Bar {
        birth: param(e.birth),
        death: e.death.map(param).unwrap_or(f64::INFINITY),
        multiplicity: e.multiplicity,
    });
    collect_bars(bars)
}

/// Drops empty and unborn bars, merges equal ones, and orders the rest.
fn collect_bars(bars: impl Iterator<Item = Bar>) -> Barcode {
    let mut bars: Vec<Bar> = bars
        .filter(|bar| bar.birth.is_finite() && bar.birth < bar.death)
        .collect();
    bars.sort_by(|a, b| a.birth.total_cmp(&b.birth).then(b.death.total_cmp(&a.death)));

    let mut merged: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match merged.last_mut() {
            Some(last) if last.birth == bar.birth && last.death == bar.death => {
                last.multiplicity += bar.multiplicity;
            }
            _ => merged.push(bar),
        }
    }
    Barcode { bars: merged }
}

/// Direct matching on the horizontal (`angle = 0`) or vertical
/// (`angle = 90`) slice line, with exact push positions.
fn axis_barcode(result: &ComputeResult, query: &SliceQuery, vertical: bool) -> Result<Barcode> {
    let threshold = ExactValue::from_float(if vertical { -query.offset } else { query.offset })
        .ok_or_else(|| Error::invariant("non-finite query offset"))?;

    let position = |p: &TemplatePoint| -> ExactValue {
        let (gate, coord) = if vertical {
            (result.x_index.value(p.x), result.y_index.value(p.y))
        } else {
            (result.y_index.value(p.y), result.x_index.value(p.x))
        };
        if *gate <= threshold {
            coord.clone()
        } else {
            INFTY
        }
    };

    let mut events = Vec::new();
    for (i, p) in result.template_points.iter().enumerate() {
        if p.zero == 0 && p.one == 0 {
            continue;
        }
        let pos = position(p);
        if p.zero > 0 {
            events.push(PushEvent { pos: pos.clone(), death: false, point: i, multiplicity: p.zero });
        }
        if p.one > 0 {
            events.push(PushEvent { pos, death: true, point: i, multiplicity: p.one });
        }
    }
    let entries = match_events(events);

    let value = |idx: usize| position(&result.template_points[idx]).to_f64();
    let bars = entries.iter().map(|e| Bar {
        birth: value(e.birth),
        death: e.death.map(value).unwrap_or(f64::INFINITY),
        multiplicity: e.multiplicity,
    });
    Ok(collect_bars(bars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtration::tests::two_points_one_edge;
    use crate::pipeline::{compute, ComputeOptions};
    use crate::progress::NoopProgress;
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn merge_result() -> ComputeResult {
        compute(&two_points_one_edge(), &ComputeOptions::default(), &NoopProgress).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_diagonal_query_on_merge() {
        let result = merge_result();
        let barcodes =
            query_barcodes(&result, &[SliceQuery::new(45.0, 0.0)]).unwrap();
        let bars = &barcodes[0].bars;
        let root2 = 2.0_f64.sqrt();
        assert_eq!(bars.len(), 2);
        assert!(close(bars[0].birth, 0.0) && close(bars[0].death, root2));
        assert!(close(bars[1].birth, root2) && bars[1].death == f64::INFINITY);
        assert_eq!((bars[0].multiplicity, bars[1].multiplicity), (1, 1));
    }

    #[test]
    fn test_horizontal_query_never_merges() {
        // at y = 0 the merging edge (grade (1,1)) is not yet present
        let result = merge_result();
        let barcodes = query_barcodes(&result, &[SliceQuery::new(0.0, 0.0)]).unwrap();
        let bars = &barcodes[0].bars;
        assert_eq!(bars.len(), 2);
        assert!(close(bars[0].birth, 0.0) && bars[0].death == f64::INFINITY);
        assert!(close(bars[1].birth, 1.0) && bars[1].death == f64::INFINITY);
    }

    #[test]
    fn test_vertical_query_sees_one_component() {
        // x = 0 contains only the first vertex
        let result = merge_result();
        let barcodes = query_barcodes(&result, &[SliceQuery::new(90.0, 0.0)]).unwrap();
        let bars = &barcodes[0].bars;
        assert_eq!(bars.len(), 1);
        assert!(close(bars[0].birth, 0.0) && bars[0].death == f64::INFINITY);
    }

    #[test]
    fn test_vertex_tie_breaks_to_larger_offset() {
        // (m, b) = (1, 0) is an arrangement vertex of the merge
        // pattern; the chosen face must be the one above both lines
        let result = merge_result();
        let face = locate_face(&result.arrangement, &rat(1), &rat(0)).unwrap();
        let centroid = &result.arrangement.faces[face.0].centroid;
        assert_eq!((centroid.m.clone(), centroid.b.clone()), (rat(1), ratio(7, 5)));
    }

    #[test]
    fn test_clamp_beyond_right_border() {
        // far past m_max and below every line: the bottom face
        let result = merge_result();
        let face = locate_face(&result.arrangement, &rat(10), &rat(-20)).unwrap();
        let centroid = &result.arrangement.faces[face.0].centroid;
        assert_eq!((centroid.m.clone(), centroid.b.clone()), (rat(1), rat(-2)));
    }

    #[test]
    fn test_clamp_above_top_border() {
        let result = merge_result();
        let face = locate_face(&result.arrangement, &ratio(1, 2), &rat(100)).unwrap();
        let centroid = &result.arrangement.faces[face.0].centroid;
        assert_eq!((centroid.m.clone(), centroid.b.clone()), (rat(1), ratio(7, 5)));
    }

    #[test]
    fn test_clamp_below_bottom_border() {
        let result = merge_result();
        let face = locate_face(&result.arrangement, &ratio(1, 2), &rat(-100)).unwrap();
        let centroid = &result.arrangement.faces[face.0].centroid;
        assert_eq!((centroid.m.clone(), centroid.b.clone()), (rat(1), rat(-2)));
    }

    #[test]
    fn test_location_agrees_with_containment() {
        // the slab index must name the face that exactly contains the
        // point; every inner face's centroid locates to that face
        let result = merge_result();
        let arr = &result.arrangement;
        for f in arr.inner_faces() {
            let c = arr.faces[f.0].centroid.clone();
            assert_eq!(locate_face(arr, &c.m, &c.b).unwrap(), f);
        }
    }

    #[test]
    fn test_batch_order_and_validation() {
        let result = merge_result();
        let err = query_barcodes(
            &result,
            &[SliceQuery::new(45.0, 0.0), SliceQuery::new(120.0, 0.0)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::AngleOutOfRange { line: 2, .. }));

        let barcodes = query_barcodes(
            &result,
            &[SliceQuery::new(0.0, 0.0), SliceQuery::new(45.0, 0.0)],
        )
        .unwrap();
        assert_eq!(barcodes.len(), 2);
        assert_ne!(barcodes[0], barcodes[1]);
    }

    #[test]
    fn test_render_format() {
        let barcode = Barcode {
            bars: vec![
                Bar { birth: 0.0, death: 1.5, multiplicity: 2 },
                Bar { birth: 1.5, death: f64::INFINITY, multiplicity: 1 },
            ],
        };
        let text = render_barcode(&SliceQuery::new(45.0, 0.25), &barcode);
        assert_eq!(text, "45 0.25: 0 1.5 x2, 1.5 inf x1");
    }

    #[test]
    fn test_render_empty_barcode() {
        let text = render_barcode(&SliceQuery::new(0.0, 0.0), &Barcode::default());
        assert_eq!(text, "0 0: ");
    }
}
