//! Pre-compiled tree-sitter queries for C# attribute extraction.
//!
//! This module provides the [`ATTRIBUTE_QUERY`] constant and
//! [`get_attribute_query`] for lazily compiling and caching it.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;

/// Tree-sitter query matching every attribute in a C# compilation unit.
///
/// Matches both type-level and assembly-level attributes; callers keep only
/// those whose parent is a global (`[assembly: ...]`) attribute list.
///
/// # Capture Names
///
/// - `attribute` - The `attribute` node (name plus optional argument list)
pub const ATTRIBUTE_QUERY: &str = r"
(attribute
  name: (_)) @attribute
";

/// Capture index for `attribute`.
pub const CAPTURE_ATTRIBUTE: u32 = 0;

/// Global cache for the compiled attribute query.
static COMPILED_QUERY: OnceLock<Query> = OnceLock::new();

/// Returns the compiled attribute query.
///
/// The query is compiled once and cached for all subsequent calls.
/// This function is thread-safe.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn get_attribute_query() -> Result<&'static Query, ParseError> {
    if let Some(query) = COMPILED_QUERY.get() {
        return Ok(query);
    }

    let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
    let query = compile_query(&language)?;

    Ok(COMPILED_QUERY.get_or_init(|| query))
}

/// Compiles the attribute query for the given language.
fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Query::new(language, ATTRIBUTE_QUERY).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles() {
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();
        let result = compile_query(&language);
        assert!(result.is_ok(), "Query should compile: {result:?}");
    }

    #[test]
    fn test_capture_names() {
        let query = get_attribute_query().expect("Query should compile");
        let names = query.capture_names();
        assert_eq!(names.len(), 1);
        assert_eq!(names[CAPTURE_ATTRIBUTE as usize], "attribute");
    }

    #[test]
    fn test_query_cached() {
        let first = get_attribute_query().expect("Query should compile");
        let second = get_attribute_query().expect("Query should compile");
        assert!(std::ptr::eq(first, second));
    }
}
