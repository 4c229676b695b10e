//! repo::config
//!
//! Scalar configuration reads and writes.
//!
//! Reads go through a config snapshot (live `git2::Config` handles refuse
//! `get_string` without one). Absent keys and sections read as `None`;
//! malformed keys or failed writes report `false`. Writes create
//! intermediate sections as needed.

use super::error::RepoError;
use super::handle::RepoHandle;

impl RepoHandle {
    /// The string value for `key`, or `None` when the key or its section
    /// is absent.
    pub fn config_value(&self, key: &str) -> Result<Option<String>, RepoError> {
        let mut config = self.repo().config()?;
        let snapshot = config.snapshot()?;
        Ok(snapshot.get_string(key).ok())
    }

    /// Write `value` for `key`, creating intermediate sections as needed.
    ///
    /// Returns `false` for a malformed key, leaving the configuration
    /// unchanged.
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<bool, RepoError> {
        let mut config = self.repo().config()?;
        Ok(config.set_str(key, value).is_ok())
    }
}
