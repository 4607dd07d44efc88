//! Helpers shared by the primitives and the pipeline
//!
//! Currently those are:
//! hash
//! tools
//!
pub mod hash;
pub mod tools;
