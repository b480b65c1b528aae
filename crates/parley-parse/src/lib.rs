//! # parley-parse
//!
//! Turns raw model completions into schema-conforming structured values.
//!
//! `SchemaParser` tolerates one surrounding code fence, parses the text as
//! JSON and checks it against an `OutputSchema`, reporting the first field
//! path that fails.

pub mod parser;

pub use parser::SchemaParser;
