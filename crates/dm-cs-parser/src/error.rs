//! Error types for the dm-cs-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while parsing C# source and extracting assembly attributes.

/// Errors that can occur during C# parsing.
///
/// # Examples
///
/// ```
/// use dm_cs_parser::ParseError;
///
/// fn handle_error(err: ParseError) {
///     match err {
///         ParseError::LanguageInit => eprintln!("Failed to set C# language"),
///         ParseError::QueryCompile { offset, .. } => {
///             eprintln!("Query compilation failed at offset {offset}");
///         }
///         ParseError::Parse => eprintln!("Failed to parse source code"),
///         ParseError::Syntax { line, column } => {
///             eprintln!("Syntax error at {line}:{column}");
///         }
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the C# language on the parser.
    #[error("failed to set C# language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser produced no tree (cancelled or out of memory).
    #[error("failed to parse source code")]
    Parse,

    /// The source is not valid C#.
    ///
    /// Positions are 1-indexed.
    #[error("invalid C# source: syntax error at line {line}, column {column}")]
    Syntax {
        /// Line of the first error node.
        line: usize,
        /// Column of the first error node.
        column: usize,
    },
}
