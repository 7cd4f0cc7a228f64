//! Domain logic - pure rules independent of git and the file system

pub mod branch;
pub mod changelog;
pub mod options;
pub mod tag;
pub mod version;

pub use branch::{BranchRef, BranchType};
pub use changelog::ChangelogSection;
pub use options::WorkflowOptions;
pub use tag::Tag;
pub use version::{Version, VersionBump};
