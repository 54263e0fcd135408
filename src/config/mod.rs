//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will follow links {} hops deep", config.crawler.max_depth);
//! ```

mod parser;
mod profile;
mod types;
mod validation;

// Re-export types
pub use profile::{EngineProfile, PageUrlError};
pub use types::{
    Config, CrawlerConfig, ExtractorPreset, OutputConfig, SearchConfig, SearchEngine,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate as validate_config;
