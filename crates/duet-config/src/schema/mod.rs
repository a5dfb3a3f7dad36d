//! Configuration schema types for the duet server.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod matching;
mod media;
mod server;

pub use logging::*;
pub use matching::*;
pub use media::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct DuetConfig {
    pub server: ServerConfig,
    pub matching: MatchingConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}
