// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging setup for the connector.
//!
//! The connector logs through `tracing`. [`init_logging`] installs a
//! `tracing-subscriber` fmt layer, filtered to this crate, that writes to the
//! configured file or to stderr.
//!
//! The level comes from `DriverConfig::with_log_level`, then `RUST_LOG`,
//! then defaults to `warn`:
//!
//! ```bash
//! RUST_LOG=databricks_connector=debug ./cube-worker
//! ```

use std::fs::{File, OpenOptions};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TARGET: &str = "databricks_connector";

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Logging configuration carried by `DriverConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace` (any case).
    pub level: Option<String>,
    /// Append to this file instead of stderr.
    pub file: Option<String>,
}

impl LogConfig {
    fn filter(&self) -> Option<EnvFilter> {
        match self.level.as_deref().map(str::to_ascii_lowercase) {
            Some(level) if level == "off" => None,
            Some(level) => Some(EnvFilter::new(format!("{}={}", TARGET, level))),
            None => Some(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", TARGET))),
            ),
        }
    }

    fn open_file(&self) -> Option<File> {
        let path = self.file.as_deref()?;
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("{}: cannot open log file {}: {}", TARGET, path, e);
                None
            }
        }
    }
}

/// Install the subscriber once per process; later calls are no-ops.
///
/// Does nothing when another global subscriber is already set.
pub fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let Some(filter) = config.filter() else {
            return;
        };
        let layer = fmt::layer().with_target(false);
        let registry = tracing_subscriber::registry().with(filter);
        let _ = match config.open_file() {
            Some(file) => registry
                .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
                .try_init(),
            None => registry.with(layer.with_writer(std::io::stderr)).try_init(),
        };
    });
}
