//! Parser error type

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Input is neither a string nor a list of strings
    #[error("Unable to parse \"version\" input:\n{0}")]
    UnparsableInput(String),

    /// A specifier does not match the specifier grammar
    #[error("Invalid version specifier provided: \"{0}\"")]
    InvalidSpecifier(String),

    /// Missing-version policy is neither `warn` nor `error`
    #[error("Invalid \"if-missing\" input: \"{0}\" (expected \"warn\" or \"error\")")]
    InvalidIfMissing(String),

    /// Project or manifest file is not valid TOML
    #[error("Invalid TOML: {0}")]
    InvalidToml(String),

    /// Tree-sitter related error
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}
