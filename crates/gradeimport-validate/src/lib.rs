#![deny(unsafe_code)]

pub mod checks;
pub mod validator;

pub use checks::grade::{VALID_GRADES, is_valid_grade, normalize_grade};
pub use validator::{RowValidator, SYSTEM_FIELD};
