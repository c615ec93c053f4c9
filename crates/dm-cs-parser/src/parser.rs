//! C# parser management using tree-sitter.
//!
//! This module provides the [`CsParser`] struct for parsing `AssemblyInfo.cs`
//! style sources and extracting their assembly-level attributes.

use smallvec::SmallVec;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::attribute::{AssemblyAttribute, extract_assembly_attributes};
use crate::error::ParseError;
use crate::queries::get_attribute_query;

/// Result of parsing a C# file.
#[derive(Debug)]
pub struct ParseResult {
    /// Assembly-level attributes in source order.
    pub attributes: SmallVec<[AssemblyAttribute; 16]>,

    /// The syntax tree from parsing.
    pub tree: Tree,
}

impl ParseResult {
    /// Returns the value of the first attribute whose name matches `name`.
    ///
    /// Matching ignores any namespace qualifier and the `Attribute` suffix.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| simple_name(&a.name) == simple_name(name))
            .and_then(|a| a.value.as_deref())
    }
}

/// Reduces `System.Reflection.AssemblyTitleAttribute` to `AssemblyTitle`.
fn simple_name(name: &str) -> &str {
    let last = name.rsplit('.').next().unwrap_or(name);
    last.strip_suffix("Attribute").unwrap_or(last)
}

/// C# parser for extracting assembly attributes.
///
/// Wraps a tree-sitter parser configured for C#. The parser can be reused for
/// multiple files to avoid repeated initialization.
///
/// # Thread Safety
///
/// `CsParser` is `Send` but not `Sync`. The underlying tree-sitter query is
/// shared across all parser instances.
///
/// # Examples
///
/// ```
/// use dm_cs_parser::CsParser;
///
/// let mut parser = CsParser::new()?;
/// let source = r#"
/// using System.Reflection;
/// [assembly: AssemblyCompany("Contoso")]
/// [assembly: AssemblyVersion("1.2.0.0")]
/// "#;
/// let result = parser.parse(source)?;
/// assert_eq!(result.value_of("AssemblyCompany"), Some("Contoso"));
/// # Ok::<(), dm_cs_parser::ParseError>(())
/// ```
pub struct CsParser {
    /// The underlying tree-sitter parser.
    parser: Parser,
    /// The C# language for the parser.
    language: Language,
}

impl CsParser {
    /// Creates a new C# parser.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the C# language cannot be set
    /// on the parser.
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_c_sharp::LANGUAGE.into();

        parser
            .set_language(&language)
            .map_err(|_| ParseError::LanguageInit)?;

        Ok(Self { parser, language })
    }

    /// Parses C# source and extracts assembly attributes.
    ///
    /// # Errors
    ///
    /// - Returns [`ParseError::Parse`] if tree-sitter produces no tree
    /// - Returns [`ParseError::Syntax`] if the source contains syntax errors
    /// - Returns [`ParseError::QueryCompile`] if the attribute query fails to compile
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, ParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(ParseError::Parse)?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root)
                .map_or((1, 1), |n| {
                    let point = n.start_position();
                    (point.row + 1, point.column + 1)
                });
            return Err(ParseError::Syntax { line, column });
        }

        let query = get_attribute_query()?;
        let attributes = extract_assembly_attributes(&tree, source, query);

        Ok(ParseResult { attributes, tree })
    }

    /// Returns the tree-sitter language used by this parser.
    #[inline]
    pub fn language(&self) -> &Language {
        &self.language
    }
}

impl std::fmt::Debug for CsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsParser")
            .field("language", &"C#")
            .finish_non_exhaustive()
    }
}

/// Finds the first error or missing node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}
