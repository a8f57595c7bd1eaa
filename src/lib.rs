//! Permissive, 8-bit-clean JSON document model.
//!
//! The core is a tagged-union [`Value`] tree, a stack-driven parser that
//! accepts a small superset of the standard grammar (`//` line comments,
//! a leading `+` on numbers, trailing commas), and a compact/indented
//! serializer with byte-exact round-trips. The [`bind`] module carries the
//! runtime binding registry through which host objects read, write and
//! call into document nodes.

pub mod bind;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod value;

pub use error::{JsonError, SyntaxError, TypeError};
pub use parser::{from_reader, from_slice, from_str};
pub use serializer::{to_string, to_writer};
pub use value::{Array, Kind, Object, Value};
