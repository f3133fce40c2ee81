//! # Router Module
//!
//! Path matching and route resolution. Route paths may contain `{name}`
//! placeholders; at registration time each path is compiled into an
//! anchored regex with named captures, and at request time the router
//! scans the compiled patterns in registration order, returning the first
//! one whose path *and* method match together with the extracted path
//! parameters.
//!
//! First-match-wins is deliberate: overlapping patterns resolve to the
//! earliest registration, regardless of specificity.

mod core;
mod pattern;

pub use core::{Route, RouteMatch, Router};
pub use pattern::{PathPattern, PatternError};
