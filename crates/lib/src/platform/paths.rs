use std::path::PathBuf;

use crate::consts::{APP_NAME, STORE_ENV};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  std::env::var_os("USERPROFILE")
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  std::env::var_os("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the directory for data files for the application
#[cfg(windows)]
pub fn data_dir() -> PathBuf {
  std::env::var_os("APPDATA")
    .map(PathBuf::from)
    .unwrap_or_else(home_dir)
    .join(APP_NAME)
}

/// Returns the directory for data files for the application
#[cfg(not(windows))]
pub fn data_dir() -> PathBuf {
  let data_home = std::env::var("XDG_DATA_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".local").join("share"));
  data_home.join(APP_NAME)
}

/// Location of the direct data store.
///
/// `REDSEED_STORE` wins over the data directory default.
pub fn default_store_path() -> PathBuf {
  if let Ok(path) = std::env::var(STORE_ENV) {
    return PathBuf::from(path);
  }
  data_dir().join("store.json")
}
