//! Barcode Templates
//!
//! A face's template records, symbolically, which template points pair
//! up along every slice line whose dual point lies inside the face. The
//! pairing is computed once from the face centroid; the defining
//! invariant of the arrangement is that the same pairing is valid for
//! every interior point of the face.
//!
//! Pushing a template point onto the primal line `y = m·x + b` moves it
//! up/right to the least point of the line that dominates it; the push
//! is recorded by the `x` coordinate of where it lands, which orders
//! events along the line. Birth events (ξ₀ multiplicities) and death
//! events (ξ₁ multiplicities) are swept in push order, births first at
//! equal positions, and each death consumes the lowest-position births
//! still unmatched, carrying multiplicity. Births left over at the end
//! are open (essential) entries; deaths left over kill nothing on this
//! slice and are dropped.

use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::numeric::{ExactValue, GradeIndex};
use crate::presentation::TemplatePoint;

/// One symbolic template entry: indices into the template-point list.
/// `death: None` marks an open bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub birth: usize,
    pub death: Option<usize>,
    pub multiplicity: u32,
}

/// A birth or death event at an exact position along a slice line.
#[derive(Debug, Clone)]
pub(crate) struct PushEvent {
    pub pos: ExactValue,
    pub death: bool,
    pub point: usize,
    pub multiplicity: u32,
}

/// Exact push of the primal point `(px, py)` onto the line
/// `y = m·x + b` with `m > 0`, as the `x` coordinate of the landing
/// point. `inf` coordinates push to `inf`.
pub(crate) fn push_position(
    px: &ExactValue,
    py: &ExactValue,
    m: &BigRational,
    b: &BigRational,
) -> ExactValue {
    let m = ExactValue::Finite(m.clone());
    let b = ExactValue::Finite(b.clone());
    let line_at_px = &(&m * px) + &b;
    if *py <= line_at_px {
        px.clone()
    } else {
        &(py - &b) / &m
    }
}

/// Sweeps events in `(position, births first, point index)` order and
/// pairs deaths with the earliest unmatched births.
pub(crate) fn match_events(mut events: Vec<PushEvent>) -> Vec<TemplateEntry> {
    events.sort_by(|a, b| {
        a.pos
            .cmp(&b.pos)
            .then(a.death.cmp(&b.death))
            .then(a.point.cmp(&b.point))
    });

    let mut open: VecDeque<(usize, u32)> = VecDeque::new();
    let mut entries = Vec::new();
    for ev in events {
        if !ev.death {
            open.push_back((ev.point, ev.multiplicity));
            continue;
        }
        let mut remaining = ev.multiplicity;
        while remaining > 0 {
            let Some((birth, avail)) = open.front_mut() else { break };
            let used = remaining.min(*avail);
            entries.push(TemplateEntry {
                birth: *birth,
                death: Some(ev.point),
                multiplicity: used,
            });
            remaining -= used;
            *avail -= used;
            if *avail == 0 {
                open.pop_front();
            }
        }
    }
    for (birth, multiplicity) in open {
        entries.push(TemplateEntry { birth, death: None, multiplicity });
    }
    entries
}

/// The template of the face whose centroid is `(m, b)`.
pub(crate) fn face_template(
    points: &[TemplatePoint],
    x_index: &GradeIndex,
    y_index: &GradeIndex,
    m: &BigRational,
    b: &BigRational,
) -> Vec<TemplateEntry> {
    let mut events = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if p.zero == 0 && p.one == 0 {
            continue;
        }
        let pos = push_position(x_index.value(p.x), y_index.value(p.y), m, b);
        if p.zero > 0 {
            events.push(PushEvent { pos: pos.clone(), death: false, point: i, multiplicity: p.zero });
        }
        if p.one > 0 {
            events.push(PushEvent { pos, death: true, point: i, multiplicity: p.one });
        }
    }
    match_events(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn v(n: i64) -> ExactValue {
        ExactValue::from_int(n)
    }

    #[test]
    fn test_push_below_and_above() {
        // line y = x
        let m = rat(1);
        let b = rat(0);
        // below the line: pushed straight up, position is its own x
        assert_eq!(push_position(&v(2), &v(1), &m, &b), v(2));
        // above the line: pushed right to x = y
        assert_eq!(push_position(&v(1), &v(3), &m, &b), v(3));
        // on the line
        assert_eq!(push_position(&v(2), &v(2), &m, &b), v(2));
        // infinite coordinate never lands
        assert_eq!(push_position(&v(0), &ExactValue::Infinity, &m, &b), ExactValue::Infinity);
    }

    #[test]
    fn test_death_consumes_earliest_birth() {
        let events = vec![
            PushEvent { pos: v(0), death: false, point: 0, multiplicity: 1 },
            PushEvent { pos: v(1), death: false, point: 1, multiplicity: 1 },
            PushEvent { pos: v(1), death: true, point: 2, multiplicity: 1 },
        ];
        let entries = match_events(events);
        assert_eq!(
            entries,
            vec![
                TemplateEntry { birth: 0, death: Some(2), multiplicity: 1 },
                TemplateEntry { birth: 1, death: None, multiplicity: 1 },
            ]
        );
    }

    #[test]
    fn test_multiplicity_split_across_births() {
        let events = vec![
            PushEvent { pos: v(0), death: false, point: 0, multiplicity: 2 },
            PushEvent { pos: v(1), death: false, point: 1, multiplicity: 1 },
            PushEvent { pos: v(2), death: true, point: 2, multiplicity: 3 },
        ];
        let entries = match_events(events);
        assert_eq!(
            entries,
            vec![
                TemplateEntry { birth: 0, death: Some(2), multiplicity: 2 },
                TemplateEntry { birth: 1, death: Some(2), multiplicity: 1 },
            ]
        );
    }

    #[test]
    fn test_excess_death_is_dropped() {
        // one birth, two incomparable deaths: only the earlier death
        // kills anything on this slice
        let events = vec![
            PushEvent { pos: v(0), death: false, point: 0, multiplicity: 1 },
            PushEvent { pos: v(1), death: true, point: 1, multiplicity: 1 },
            PushEvent { pos: v(2), death: true, point: 2, multiplicity: 1 },
        ];
        let entries = match_events(events);
        assert_eq!(
            entries,
            vec![TemplateEntry { birth: 0, death: Some(1), multiplicity: 1 }]
        );
    }

    #[test]
    fn test_birth_before_death_at_equal_position() {
        let events = vec![
            PushEvent { pos: v(1), death: true, point: 1, multiplicity: 1 },
            PushEvent { pos: v(1), death: false, point: 0, multiplicity: 1 },
        ];
        let entries = match_events(events);
        assert_eq!(
            entries,
            vec![TemplateEntry { birth: 0, death: Some(1), multiplicity: 1 }]
        );
    }

    #[test]
    fn test_face_template_of_merge_pattern() {
        // template points of two components merging: births at (0,0)
        // and (1,0), death at (1,1); slice line y = x
        let points = vec![
            TemplatePoint::new(0, 0, 1, 0, 0),
            TemplatePoint::new(1, 0, 1, 0, 0),
            TemplatePoint::new(1, 1, 0, 1, 0),
        ];
        let idx = GradeIndex::from_values(vec![v(0), v(1)]);
        let entries = face_template(&points, &idx, &idx, &rat(1), &rat(0));
        assert_eq!(
            entries,
            vec![
                TemplateEntry { birth: 0, death: Some(2), multiplicity: 1 },
                TemplateEntry { birth: 1, death: None, multiplicity: 1 },
            ]
        );
    }
}
