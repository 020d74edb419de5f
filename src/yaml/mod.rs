//! Config file parsing
//!
//! `config.yaml` in the user config directory and `stockpile.yaml` in the
//! data directory are layered over the defaults. Syntax and type errors carry
//! a source span so miette can point at the offending line.

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{parse_yaml, read_layer};
