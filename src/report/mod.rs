//! Report and export generation.

pub mod csv;
pub mod generator;

pub use generator::{
    build_report, chart_series, generate_json_report, generate_markdown_report,
};
