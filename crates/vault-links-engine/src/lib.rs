pub mod encoding;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod rules;


// Re-export key types for easier usage
pub use io::*;
pub use models::Document;
pub use pipeline::{Pipeline, Preset, Rule, TransformReport, Transformed};
pub use rules::remap::{RemapError, RemapTable};
