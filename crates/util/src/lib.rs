//! # Lazycurl Utilities
//!
//! String-level machinery behind the command builder: environment variable
//! substitution, shell quoting, shell-like lexing, percent encoding and the
//! HTTP status marker protocol. Everything in this crate is pure; process
//! spawning lives in `lazycurl-engine`.

pub mod command;
pub mod interpolation;
pub mod quoting;
pub mod shell_lexing;
pub mod status;

pub use command::{Mode, build, build_args, render_command};
pub use interpolation::substitute;
pub use quoting::{needs_quoting, quote, quote_if_needed};
pub use shell_lexing::split_command;
