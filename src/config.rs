//! Run settings: defaults, then an optional `leetcard.toml`, then `LEETCARD_*`
//! environment variables. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::batch::BatchPolicy;

pub const ENV_PREFIX: &str = "LEETCARD";
pub const DEFAULT_FILE: &str = "leetcard";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub debug: bool,
    pub skip_failures: bool,
    pub fetch_remote_images: bool,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("pages"),
            output_dir: PathBuf::from("out"),
            debug: false,
            skip_failures: false,
            fetch_remote_images: true,
            fetch_timeout_secs: 10,
            user_agent: concat!("leetcard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `file` must exist; otherwise `leetcard.toml`
    /// in the working directory is read if present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        if self.skip_failures {
            BatchPolicy::SkipFailures
        } else {
            BatchPolicy::FailFast
        }
    }
}
