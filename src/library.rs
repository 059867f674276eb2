//! Track catalog: the `Track` and `Collection` records the player consumes,
//! plus a local-directory scanner that produces them.
//!
//! Records are immutable once built; the player shares them as `Arc<Track>`.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;
