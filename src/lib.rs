pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod ui;
pub mod version_file;
pub mod warning;

pub use error::{FlowError, Result};
