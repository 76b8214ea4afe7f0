//! Navigation paths into a JSON document.
//!
//! A [`JsonPath`] is an ordered list of [`Segment`]s, each either an object
//! key or an array index. The empty path addresses the document root.

pub mod errors;
pub mod model;

pub use errors::PathError;
pub use model::{render, JsonPath, Segment};
