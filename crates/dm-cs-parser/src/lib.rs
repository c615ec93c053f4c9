//! C# parser using tree-sitter for assembly-level attribute extraction.
//!
//! This crate reads `AssemblyInfo.cs` style sources and reports the
//! `[assembly: ...]` attributes they declare:
//!
//! - Attribute names as written (qualified or with the `Attribute` suffix)
//! - The first positional argument when it is a compile-time string
//! - Source lines for diagnostics
//!
//! # Overview
//!
//! The main entry point is [`CsParser`]:
//!
//! ```
//! use dm_cs_parser::CsParser;
//!
//! let mut parser = CsParser::new()?;
//! let source = r#"
//!     using System.Reflection;
//!     [assembly: AssemblyTitle("Contoso.Widgets")]
//!     [assembly: AssemblyVersion("2.1.0.0")]
//! "#;
//!
//! let result = parser.parse(source)?;
//! for attribute in &result.attributes {
//!     println!("{} = {:?}", attribute.name, attribute.value);
//! }
//! # Ok::<(), dm_cs_parser::ParseError>(())
//! ```
//!
//! # String Evaluation
//!
//! | Expression | Example | Value |
//! |------------|---------|-------|
//! | Regular | `"a\tb"` | escapes decoded |
//! | Verbatim | `@"C:\x"` | `""` becomes `"` |
//! | Raw | `"""text"""` | fences stripped |
//! | Concatenation | `"a" + "b"` | `ab` |
//!
//! Any other argument (numbers, `typeof`, constants) has no value.
//!
//! # Thread Safety
//!
//! [`CsParser`] is `Send` but not `Sync`. The compiled query is shared
//! globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod attribute;
pub mod error;
mod parser;
pub mod queries;

pub use attribute::{AssemblyAttribute, extract_assembly_attributes, unescape_regular, unescape_verbatim};
pub use error::ParseError;
pub use parser::{CsParser, ParseResult};
