//! CLI commands

pub mod generate;
pub mod list;
pub mod read;
pub mod render;
pub mod schema;
pub mod validate;
