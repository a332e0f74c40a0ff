#![deny(unsafe_code)]

pub mod defaults;
pub mod error;
pub mod registry;

pub use crate::defaults::default_fields;
pub use crate::error::SchemaError;
pub use crate::registry::{PRIMARY_FIELD, SchemaRegistry};
