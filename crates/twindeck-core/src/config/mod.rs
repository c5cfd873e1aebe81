//! Configuration storage for Twindeck
//!
//! - YAML loading and saving for any serde config type
//! - Standard locations for the config file and the log
//!
//! # Usage
//!
//! ```ignore
//! use twindeck_core::config::{default_config_path, load_config, save_config};
//!
//! let path = default_config_path();
//! let config: PlayerConfig = load_config(&path);
//! save_config(&config, &path)?;
//! ```

mod io;
mod paths;

pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path, default_log_path};
