//! FFI (Foreign Function Interface) layer for the native module convention.
//!
//! Every native module exposes a single C-linkage function,
//! `int run(int argc, const char **argv)`, callable from any language that
//! supports C FFI. This crate both exports one (see [`entry::run`]) and
//! provides the argument plumbing hosts use to call others.

pub mod args;
pub mod entry;
pub mod types;

pub use args::{ArgvView, CArgs};
pub use entry::{echo_args, run};
pub use types::*;
