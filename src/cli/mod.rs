//! CLI argument parsing and processing

pub mod args;
pub mod process;

pub use args::{flag_takes_value, Args, LogFormat};
pub use process::{parse_parameters, Parameters};
