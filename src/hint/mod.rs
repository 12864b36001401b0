//! Structural hints.
//!
//! Hints are reported after resolution when enabled in the options, but depend only on the
//! syntax tree: [`always_exits`] classifies statements and expressions that can never complete
//! normally, and [`HintGenerator`] uses it to find missing returns and dead code.

mod generator;
mod reachability;

pub use generator::HintGenerator;
pub use reachability::always_exits;
