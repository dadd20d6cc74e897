//! Query Layer: Slice Lines to Barcodes
//!
//! Parses query batches ([`parse_queries`]), answers them against a
//! finished computation ([`query_barcodes`]), and renders the results
//! ([`render_barcode`]). Answering never touches the filtration again;
//! everything is read off the augmented arrangement.

mod engine;
mod slice;

pub use engine::{query_barcodes, render_barcode, Bar, Barcode};
pub use slice::{parse_queries, SliceQuery};
