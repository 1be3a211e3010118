//! Convert HCL documents into a JSON value tree plus a parallel tree of
//! source positions.
//!
//! ```
//! use hcl2json::{convert_file, parse_config, Options};
//!
//! let file = parse_config(b"service \"web\" { port = 80 }\n", "main.hcl").unwrap();
//! let (values, lines) = convert_file(&file, Options::default()).unwrap();
//! assert!(values["service"].as_mapping().is_some());
//! assert!(lines.entries.contains_key("service"));
//! ```

pub mod ast;
pub mod convert;
pub mod error;
pub mod export;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use ast::File;
pub use convert::{convert_file, Options};
pub use error::HclError;
pub use parser::parse_config;
pub use tree::{LineMap, LineNode, ValueMap, ValueNode};
