use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::{Deserialize, Serialize};

use crate::{Mode, Result};

/// Base configuration schema
pub trait BaseConfig: Sized + Default + Serialize + for<'a> Deserialize<'a> {
    /// Package name (e.g. `CARGO_PKG_NAME`)
    const PACKAGE: &'static str;

    /// Path of the serialized configuration
    fn path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(Self::PACKAGE))
            .map(|p| p.join("config.toml"))
    }

    /// Load a config instance from the config dir
    ///
    /// A default configuration is written on first use.
    fn load() -> Result<Self> {
        let path = Self::path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "unable to define configuration path")
        })?;

        if !path.exists() {
            let config = Self::default();

            // config serialization is optional
            config
                .save(&path)
                .unwrap_or_else(|e| tracing::warn!("failed to serialize config file: {}", e));

            return Ok(config);
        }

        Self::load_from(path)
    }

    /// Load a config instance from a file
    fn load_from<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        tracing::debug!("loading config from {}", path.display());

        let contents = fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Write the config instance to a file, creating its parent dirs
    fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(path, contents)?;

        Ok(())
    }
}

/// Configuration of the constraint system and the list types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Execution mode of configured constraint systems
    pub mode: Mode,
    /// Hash prefix of configured list types
    pub list_prefix: String,
    /// Flag to keep a log of witnesses and constraints in checked mode
    pub record_constraints: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Checked,
            list_prefix: String::new(),
            record_constraints: true,
        }
    }
}

impl Config {
    /// Set the execution mode
    pub fn with_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Set the hash prefix of list types
    pub fn with_list_prefix<S>(&mut self, prefix: S) -> &mut Self
    where
        S: Into<String>,
    {
        self.list_prefix = prefix.into();
        self
    }

    /// Set the flag to record witnesses and constraints
    pub fn with_record_constraints(&mut self, record_constraints: bool) -> &mut Self {
        self.record_constraints = record_constraints;
        self
    }
}

impl BaseConfig for Config {
    const PACKAGE: &'static str = env!("CARGO_PKG_NAME");
}

#[test]
fn builder_functions_works() {
    let mut config = Config::default();

    config
        .with_mode(Mode::Native)
        .with_list_prefix("mina")
        .with_record_constraints(false);

    assert_eq!(config.mode, Mode::Native);
    assert_eq!(config.list_prefix, "mina");
    assert!(!config.record_constraints);
}

#[test]
fn missing_keys_are_defaulted() {
    let config: Config = toml::from_str("mode = \"native\"").expect("valid config");

    assert_eq!(config.mode, Mode::Native);
    assert_eq!(config.list_prefix, "");
    assert!(config.record_constraints);
}
