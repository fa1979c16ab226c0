use std::fs::{read_to_string, write};
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};

use serde_derive::{Deserialize, Serialize};

use toml::from_str;

use crate::core::common::{LoggingOptions, ResolveOptions};

#[derive(Default, Deserialize, Debug, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub resolve_options: ResolveOptions,
    pub logging_options: LoggingOptions,
}

impl Config {
    /// Load `filename`. A missing file is `Ok(None)`, an unreadable
    /// or malformed one is an error.
    pub fn load(filename: &str) -> Result<Option<Config>> {
        let config = match read_to_string(filename) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("failed to read config file `{filename}`")),
        };
        let config: Config = from_str(&config).with_context(|| format!("config file `{filename}` is invalid"))?;
        Ok(Some(config))
    }

    /// Write a default configuration to `filename`.
    /// An existing file is only replaced when `force` is set.
    pub fn generate(filename: &str, force: bool) -> Result<()> {
        if Path::new(filename).exists() && !force {
            bail!("config file `{filename}` already exists, use `--force` to overwrite it")
        }
        let toml_config = Config::to_toml()?;
        write(filename, toml_config)?;
        println!("Config file `{filename}` created.");
        Ok(())
    }

    pub fn to_toml() -> Result<String> {
        let config = Config::default();
        let toml_config = toml::to_string(&config)?;
        Ok(toml_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::ResolverBackend;

    #[test]
    fn default_config_round_trips_through_toml() {
        let toml_config = Config::to_toml().unwrap();
        let config: Config = from_str(&toml_config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml_config = r#"
            [resolve_options]
            nameservers = ["1.1.1.1", "8.8.8.8"]
            query_timeout = 3000
            attempts = 1
            lookup_timeout = 10000
            concurrency = 64
            backend = "system"
        "#;
        let config: Config = from_str(toml_config).unwrap();

        assert_eq!(config.resolve_options.nameservers.len(), 2);
        assert_eq!(config.resolve_options.concurrency, 64);
        assert_eq!(config.resolve_options.backend, ResolverBackend::System);
        assert_eq!(config.logging_options, LoggingOptions::default());
    }

    #[test]
    fn load_missing_file_is_none() {
        assert!(Config::load("this/file/does/not/exist.toml").unwrap().is_none());
    }

    #[test]
    fn load_malformed_file_is_error() {
        let path = std::env::temp_dir().join(format!("sr-malformed-{}.toml", std::process::id()));
        write(&path, "[resolve_options]\nconcurrency = \"lots\"\n").unwrap();

        let result = Config::load(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);

        let e = result.unwrap_err();
        assert!(e.to_string().contains("is invalid"));
    }

    #[test]
    fn load_valid_file_is_some() {
        let path = std::env::temp_dir().join(format!("sr-valid-{}.toml", std::process::id()));
        write(&path, "[resolve_options]\nconcurrency = 32\n").unwrap();

        let result = Config::load(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);

        let config = result.unwrap().unwrap();
        assert_eq!(config.resolve_options.concurrency, 32);
    }
}
