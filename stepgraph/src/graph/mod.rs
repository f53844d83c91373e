//! State graph: chain states, build an immutable graph, validate and serialize it.
//!
//! `chain` / `Chain` link states linearly, `StateGraphBuilder` collects states and
//! an entry point, `build` hoists inline targets and validates, and the resulting
//! `StateGraph` renders to a States-language document.

mod builder;
mod chain;
mod logging;
mod serialize;
mod state_graph;
mod validate;

pub use builder::StateGraphBuilder;
pub use chain::{chain, Chain};
pub use serialize::{render_document, DocumentOptions};
pub use state_graph::StateGraph;
pub use validate::{ValidationReport, ValidationWarning};
