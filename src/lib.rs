//! Project-level `.d.ts` generation: configuration, source discovery and
//! writing of declaration files. The extraction itself lives in
//! [`dtsx_extract`].

pub mod config;
pub mod discover;
pub mod generate;

pub use config::{ConfigError, DtsConfig, DtsxConfig};
pub use generate::{generate, GenerateOptions, Generated};
