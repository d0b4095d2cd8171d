//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `mono`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `virtual_monorepo` library and prints the result.

pub mod add;
pub mod check;
pub mod completions;
pub mod init;
pub mod link;
pub mod list;
pub mod remove;
pub mod unlock;
