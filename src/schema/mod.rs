//! Structural schemas for flow and tool payloads.
//!
//! A [`Schema`] both validates JSON values and describes the expected shape
//! to the model (see [`Schema::to_json_schema`]).

pub mod error;
pub mod registry;
pub mod schema;
pub mod validation;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use schema::{Schema, SchemaKind};
pub use validation::{strip_undeclared, validate, validate_value};
