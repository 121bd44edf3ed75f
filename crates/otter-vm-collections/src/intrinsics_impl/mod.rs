//! Built-in object implementations
//!
//! Each module installs one intrinsic's properties through the builders in
//! [`crate::builtin_builder`].

pub mod helpers;
pub mod iterator;
pub mod object;
pub mod set;
pub mod set_iterator;
