//! toby-fuzzy: case-insensitive subsequence matching and ranking.
//!
//! A query matches a text when its characters appear in the text in order,
//! not necessarily contiguously. Matches are ranked by a positional score
//! where lower is better: a prefix scores `0`, a contiguous substring `1`,
//! and anything else accumulates the gaps between matched characters, with
//! a leading gap counted three times over.

pub mod score;
pub mod search;

pub use score::*;
pub use search::*;
