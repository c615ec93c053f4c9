//! Assembly attribute extraction from C# source using tree-sitter queries.
//!
//! This module provides [`extract_assembly_attributes`], which turns a parsed
//! compilation unit into a list of [`AssemblyAttribute`] values, and the
//! string-literal decoding it relies on.

use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::queries::CAPTURE_ATTRIBUTE;

/// An `[assembly: ...]` attribute found in source.
///
/// # Examples
///
/// ```
/// use dm_cs_parser::CsParser;
///
/// let mut parser = CsParser::new()?;
/// let result = parser.parse(r#"[assembly: AssemblyTitle("Widgets")]"#)?;
///
/// let title = &result.attributes[0];
/// assert_eq!(title.name, "AssemblyTitle");
/// assert_eq!(title.value.as_deref(), Some("Widgets"));
/// assert_eq!(title.line, 1);
/// # Ok::<(), dm_cs_parser::ParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyAttribute {
    /// Attribute name as written (may be qualified or carry the `Attribute` suffix).
    pub name: String,

    /// First positional argument, if it is a compile-time string.
    pub value: Option<String>,

    /// Line of the attribute (1-indexed).
    pub line: usize,
}

/// Extracts all assembly-level attributes from a parsed syntax tree.
///
/// Module-level (`[module: ...]`) and type-level attributes are ignored.
/// Attributes are returned in source order.
///
/// # Arguments
///
/// * `tree` - The parsed syntax tree
/// * `source` - The original source code (needed to extract text from nodes)
/// * `query` - The pre-compiled attribute query
pub fn extract_assembly_attributes(
    tree: &Tree,
    source: &str,
    query: &Query,
) -> SmallVec<[AssemblyAttribute; 16]> {
    let source_bytes = source.as_bytes();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source_bytes);

    let mut attributes: SmallVec<[AssemblyAttribute; 16]> = SmallVec::new();
    while let Some(match_) = matches.next() {
        for capture in match_.captures {
            if capture.index != CAPTURE_ATTRIBUTE {
                continue;
            }
            let node = capture.node;
            if !is_assembly_target(node, source_bytes) {
                continue;
            }
            if let Some(attribute) = build_attribute(node, source_bytes) {
                attributes.push(attribute);
            }
        }
    }

    attributes.sort_by_key(|a| a.line);
    attributes
}

/// Returns `true` if the attribute sits in an `[assembly: ...]` list.
fn is_assembly_target(attribute: Node<'_>, source: &[u8]) -> bool {
    let Some(parent) = attribute.parent() else {
        return false;
    };
    if !parent.kind().starts_with("global_attribute") {
        return false;
    }
    parent
        .utf8_text(source)
        .map(|text| text.trim_start_matches('[').trim_start().starts_with("assembly"))
        .unwrap_or(false)
}

/// Builds an [`AssemblyAttribute`] from an `attribute` node.
fn build_attribute(node: Node<'_>, source: &[u8]) -> Option<AssemblyAttribute> {
    let name_node = node.child_by_field_name("name")?;
    let name: String = name_node
        .utf8_text(source)
        .ok()?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let value = first_positional_argument(node).and_then(|expr| evaluate_string(expr, source));

    Some(AssemblyAttribute {
        name,
        value,
        line: node.start_position().row + 1,
    })
}

/// Finds the expression of the first positional argument.
fn first_positional_argument(attribute: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = attribute.walk();
    let arguments = attribute
        .named_children(&mut cursor)
        .find(|child| child.kind() == "attribute_argument_list")?;

    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|child| child.kind() == "attribute_argument")?;

    // `Name = value` and `name: value` arguments carry an extra identifier.
    if first.named_child_count() != 1 {
        return None;
    }
    first.named_child(0)
}

/// Evaluates a constant string expression.
///
/// Supports regular, verbatim and raw literals, parentheses, and `+`
/// concatenation of those. Anything else yields `None`.
fn evaluate_string(node: Node<'_>, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string_literal" => unescape_regular(node.utf8_text(source).ok()?),
        "verbatim_string_literal" => unescape_verbatim(node.utf8_text(source).ok()?),
        "raw_string_literal" => strip_raw(node.utf8_text(source).ok()?),
        "parenthesized_expression" => evaluate_string(node.named_child(0)?, source),
        "binary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            if operator.kind() != "+" {
                return None;
            }
            let left = evaluate_string(node.child_by_field_name("left")?, source)?;
            let right = evaluate_string(node.child_by_field_name("right")?, source)?;
            Some(left + &right)
        }
        _ => None,
    }
}

/// Decodes a regular `"..."` literal, including its escape sequences.
pub fn unescape_regular(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            'u' => hex_char(&mut chars, 4, 4)?,
            'U' => hex_char(&mut chars, 8, 8)?,
            'x' => hex_char(&mut chars, 1, 4)?,
            _ => return None,
        };
        out.push(decoded);
    }

    Some(out)
}

/// Reads between `min` and `max` hex digits and converts them to a char.
fn hex_char(chars: &mut std::str::Chars<'_>, min: usize, max: usize) -> Option<char> {
    let mut value: u32 = 0;
    let mut count = 0;
    while count < max {
        let Some(digit) = chars.clone().next().and_then(|c| c.to_digit(16)) else {
            break;
        };
        chars.next();
        value = value * 16 + digit;
        count += 1;
    }
    if count < min {
        return None;
    }
    char::from_u32(value)
}

/// Decodes a verbatim `@"..."` literal, where `""` stands for one quote.
pub fn unescape_verbatim(literal: &str) -> Option<String> {
    let inner = literal
        .strip_prefix("@\"")
        .or_else(|| literal.strip_prefix("\"@"))?
        .strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

/// Strips the quote fences from a raw `"""..."""` literal.
fn strip_raw(literal: &str) -> Option<String> {
    let fence = literal.chars().take_while(|&c| c == '"').count();
    if fence < 3 || literal.len() < fence * 2 {
        return None;
    }
    let inner = &literal[fence..literal.len() - fence];
    Some(inner.trim_matches('\n').to_owned())
}
