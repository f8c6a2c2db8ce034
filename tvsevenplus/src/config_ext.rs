//! 7plus settings in tvconfig
//!
//! The [`SevenPlusConfigExt`] trait adds the 7plus settings to
//! `tvconfig::Config`:
//!
//! - enabling/disabling the source
//! - the bearer credential used for playback negotiation
//! - an optional location used for market resolution
//!
//! # Example
//!
//! ```no_run
//! use tvconfig::get_config;
//! use tvsevenplus::{SevenPlusClient, SevenPlusConfigExt};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = get_config();
//! if !config.get_sevenplus_enabled()? {
//!     return Ok(());
//! }
//!
//! let client = SevenPlusClient::builder().with_config(&config)?.build().await?;
//! # Ok(())
//! # }
//! ```

use crate::client::ClientBuilder;
use anyhow::Result;
use tvconfig::{impl_bool_config, Config};

const ENABLED: &[&str] = &["sources", "sevenplus", "enabled"];
const TOKEN: &[&str] = &["sources", "sevenplus", "token"];
const LATITUDE: &[&str] = &["sources", "sevenplus", "latitude"];
const LONGITUDE: &[&str] = &["sources", "sevenplus", "longitude"];

/// Extension trait for 7plus settings
pub trait SevenPlusConfigExt {
    /// `true` unless the source was disabled
    fn get_sevenplus_enabled(&self) -> Result<bool>;
    fn set_sevenplus_enabled(&self, enabled: bool) -> Result<()>;

    /// Bearer credential for playback, if configured
    fn get_sevenplus_token(&self) -> Result<Option<String>>;
    fn set_sevenplus_token(&self, token: &str) -> Result<()>;

    /// `(latitude, longitude)` when both are set
    fn get_sevenplus_location(&self) -> Result<Option<(f64, f64)>>;

    /// Stores the location, `None` returns to IP-based markets
    fn set_sevenplus_location(&self, location: Option<(f64, f64)>) -> Result<()>;
}

impl SevenPlusConfigExt for Config {
    impl_bool_config!(get_sevenplus_enabled, set_sevenplus_enabled, ENABLED, true);

    fn get_sevenplus_token(&self) -> Result<Option<String>> {
        self.get_string(TOKEN)
    }

    fn set_sevenplus_token(&self, token: &str) -> Result<()> {
        self.set_string(TOKEN, token)
    }

    fn get_sevenplus_location(&self) -> Result<Option<(f64, f64)>> {
        match (self.get_f64(LATITUDE)?, self.get_f64(LONGITUDE)?) {
            (Some(lat), Some(lon)) => Ok(Some((lat, lon))),
            _ => Ok(None),
        }
    }

    fn set_sevenplus_location(&self, location: Option<(f64, f64)>) -> Result<()> {
        self.set_f64(LATITUDE, location.map(|(lat, _)| lat))?;
        self.set_f64(LONGITUDE, location.map(|(_, lon)| lon))
    }
}

impl ClientBuilder {
    /// Applies the token and location stored in `config`
    pub fn with_config(self, config: &Config) -> Result<Self> {
        let mut builder = self.location(config.get_sevenplus_location()?);
        if let Some(token) = config.get_sevenplus_token()? {
            builder = builder.token(token);
        }
        Ok(builder)
    }
}
