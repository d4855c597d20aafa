//! Presentation: result tables, fit reports, graphs and progress output.

pub mod graph;
pub mod table;
pub mod verbose;

pub use graph::{render_ascii_graph, GraphData, Series};
pub use table::{format_parameter, write_fit_report, ResultTable};
pub use verbose::VerboseReporter;
