//! Build driver for texcv: everything that happens after the LaTeX source is
//! written.
//!
//! - [`Engine`]: runs the external compiler with a timeout and collects its
//!   warnings
//! - [`clean`]: removes rendered and auxiliary files
//! - [`is_stale`]: timestamp comparison between the artifact and its inputs
//! - [`Watcher`]: polling change detection for `texcv watch`

pub mod clean;
pub mod engine;
mod error;
pub mod freshness;
mod walk;
pub mod watch;

pub use clean::{clean, AUX_EXTENSIONS};
pub use engine::{CompileReport, Engine, EngineConfig};
pub use error::BuildError;
pub use freshness::{is_stale, newest_modification};
pub use watch::Watcher;
