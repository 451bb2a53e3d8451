//! Parser layer
//! - error.rs: ParseError
//! - specifier.rs: `version` input parser and specifier classification
//! - project_toml.rs: Julia project/manifest file parser

pub mod error;
pub mod project_toml;
pub mod specifier;

pub use error::ParseError;
pub use project_toml::{ProjectToml, ProjectTomlParser};
pub use specifier::{Alias, IfMissing, Specifier, parse_specifiers};
