pub mod config;
pub mod output_format;

pub use config::SynthesisConfig;
pub use output_format::{IconOutputFormat, IconTarget};
