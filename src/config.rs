use std::{
   io,
   path::{Path, PathBuf},
};

use directories::BaseDirs;
use figment::{
   Figment,
   providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LOOKUP_LIMIT: usize = 4;

pub const LISTING_MAX_CHARS: usize = 2048;
pub const LISTING_MAX_GROUPS: usize = 8;

pub const ENV_PREFIX: &str = "ITEMDEX_";

pub fn data_dir() -> Option<PathBuf> {
   BaseDirs::new().map(|dirs| dirs.home_dir().join(".itemdex"))
}

pub fn config_path() -> Option<PathBuf> {
   data_dir().map(|dir| dir.join("config.toml"))
}

pub fn default_catalog_path() -> Option<PathBuf> {
   data_dir().map(|dir| dir.join("catalog.json"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
   pub limit: usize,
}

impl Default for LookupConfig {
   fn default() -> Self {
      Self { limit: DEFAULT_LOOKUP_LIMIT }
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
   pub max_chars:  usize,
   pub max_groups: usize,
}

impl Default for ListingConfig {
   fn default() -> Self {
      Self { max_chars: LISTING_MAX_CHARS, max_groups: LISTING_MAX_GROUPS }
   }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
   /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
   pub filter: String,
}

impl Default for LogConfig {
   fn default() -> Self {
      Self { filter: "warn".to_string() }
   }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
   #[serde(skip_serializing_if = "Option::is_none")]
   pub catalog: Option<PathBuf>,
   pub lookup:  LookupConfig,
   pub listing: ListingConfig,
   pub log:     LogConfig,
}

impl Config {
   /// Layers built-in defaults, the TOML file at `path` (or the default
   /// location when it exists) and `ITEMDEX_*` environment variables.
   /// Nested keys use a double underscore: `ITEMDEX_LISTING__MAX_CHARS`.
   /// An explicitly given file must exist; the default one is optional.
   pub fn load(path: Option<&Path>) -> Result<Self> {
      if let Some(path) = path
         && !path.is_file()
      {
         return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("config file {} not found", path.display()),
         )));
      }
      Ok(Self::figment(path).extract()?)
   }

   pub fn figment(path: Option<&Path>) -> Figment {
      let file = path.map(Path::to_path_buf).or_else(config_path);
      let mut figment = Figment::from(Serialized::defaults(Self::default()));
      if let Some(file) = file {
         figment = figment.merge(Toml::file(file));
      }
      figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
   }

   pub fn catalog_path(&self) -> Option<PathBuf> {
      self.catalog.clone().or_else(default_catalog_path)
   }

   pub fn listing_options(&self) -> crate::listing::ListingOptions {
      crate::listing::ListingOptions {
         max_chars: self.listing.max_chars,
         max_groups: self.listing.max_groups,
         ..Default::default()
      }
   }
}
