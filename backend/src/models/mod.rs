//! Domain models for impact estimation.

pub mod ids;
pub mod impact;
pub mod macros;
pub mod metric;
pub mod scenario;

pub use ids::*;
pub use impact::*;
pub use metric::*;
pub use scenario::*;
