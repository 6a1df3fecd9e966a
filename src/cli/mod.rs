//! `sarpair` command line front end.
//!
//! `args` declares the flags, `errors` holds failures that only make sense on
//! the command line (missing or half-given output lists), and `runner` merges an
//! optional JSON preset with the flags before handing over to `sarpair::api`.
//! Library users should call `sarpair::api` directly.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
