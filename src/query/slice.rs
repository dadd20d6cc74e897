//! Slice-Line Queries and the Query-File Grammar
//!
//! A query is a slice line of the parameter plane given by an angle in
//! degrees, `0` horizontal through `90` vertical, and a signed offset:
//! the line's distance from the origin along its unit normal
//! `(−sin θ, cos θ)`. Query files carry one `angle offset` pair per
//! line; `#` comments and blank lines are skipped, and the first
//! invalid line aborts the whole batch with its line number.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One slice line: angle in degrees within `[0, 90]`, finite offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceQuery {
    pub angle: f64,
    pub offset: f64,
}

impl SliceQuery {
    pub fn new(angle: f64, offset: f64) -> Self {
        Self { angle, offset }
    }

    /// Range validation; `line` is reported in the error.
    pub(crate) fn validate(&self, line: usize) -> Result<()> {
        if !self.angle.is_finite() || !(0.0..=90.0).contains(&self.angle) {
            return Err(Error::AngleOutOfRange { line, angle: self.angle });
        }
        if !self.offset.is_finite() {
            return Err(Error::OffsetNotFinite { line, offset: self.offset });
        }
        Ok(())
    }
}

/// Parses a query file. Aborts on the first malformed or out-of-range
/// line.
pub fn parse_queries(text: &str) -> Result<Vec<SliceQuery>> {
    let mut queries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let query = match (fields.next(), fields.next(), fields.next()) {
            (Some(a), Some(o), None) => match (a.parse::<f64>(), o.parse::<f64>()) {
                (Ok(angle), Ok(offset)) => SliceQuery::new(angle, offset),
                _ => return Err(Error::ParseQuery { line, content: raw.to_owned() }),
            },
            _ => return Err(Error::ParseQuery { line, content: raw.to_owned() }),
        };
        query.validate(line)?;
        queries.push(query);
    }
    Ok(queries)
}
