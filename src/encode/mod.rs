//! Wire encodings of gathered metric families.
pub mod json;
pub mod text;
