pub mod classifier;
pub mod flow;
pub mod types;

pub use classifier::classify;
pub use flow::{collect_flow_files, parse_flow, read_flow_file};
