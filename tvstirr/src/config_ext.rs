//! Stirr settings in tvconfig
//!
//! ```no_run
//! use tvconfig::get_config;
//! use tvstirr::StirrConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let options = config.get_stirr_list_options()?;
//! println!("EPG in plots: {}", options.show_epg);
//! # Ok(())
//! # }
//! ```

use crate::channels::ListOptions;
use anyhow::Result;
use std::time::Duration;
use tvconfig::{impl_bool_config, impl_u64_config, Config};

/// Default lifetime of the cached feed (15 minutes)
pub const DEFAULT_FEED_CACHE_TTL_SECS: u64 = 15 * 60;

const ENABLED: &[&str] = &["sources", "stirr", "enabled"];
const SHOW_CHNO: &[&str] = &["sources", "stirr", "show_chno"];
const SHOW_EPG: &[&str] = &["sources", "stirr", "show_epg"];
const SHOW_GROUPS: &[&str] = &["sources", "stirr", "show_groups"];
const FEED_CACHE_TTL: &[&str] = &["sources", "stirr", "feed_cache_ttl_secs"];

/// Extension trait for Stirr settings
pub trait StirrConfigExt {
    fn get_stirr_enabled(&self) -> Result<bool>;
    fn set_stirr_enabled(&self, enabled: bool) -> Result<()>;

    /// Prefix labels with channel numbers and sort by them
    fn get_stirr_show_chno(&self) -> Result<bool>;
    fn set_stirr_show_chno(&self, show: bool) -> Result<()>;

    /// Upcoming programmes in plots instead of descriptions
    fn get_stirr_show_epg(&self) -> Result<bool>;
    fn set_stirr_show_epg(&self, show: bool) -> Result<()>;

    /// Browse by group before listing channels
    fn get_stirr_show_groups(&self) -> Result<bool>;
    fn set_stirr_show_groups(&self, show: bool) -> Result<()>;

    fn get_stirr_feed_cache_ttl_secs(&self) -> Result<u64>;
    fn set_stirr_feed_cache_ttl_secs(&self, secs: u64) -> Result<()>;

    fn get_stirr_list_options(&self) -> Result<ListOptions> {
        Ok(ListOptions {
            show_chno: self.get_stirr_show_chno()?,
            show_epg: self.get_stirr_show_epg()?,
        })
    }

    fn get_stirr_feed_cache_ttl(&self) -> Result<Duration> {
        Ok(Duration::from_secs(self.get_stirr_feed_cache_ttl_secs()?))
    }
}

impl StirrConfigExt for Config {
    impl_bool_config!(get_stirr_enabled, set_stirr_enabled, ENABLED, true);
    impl_bool_config!(get_stirr_show_chno, set_stirr_show_chno, SHOW_CHNO, true);
    impl_bool_config!(get_stirr_show_epg, set_stirr_show_epg, SHOW_EPG, true);
    impl_bool_config!(get_stirr_show_groups, set_stirr_show_groups, SHOW_GROUPS, true);
    impl_u64_config!(
        get_stirr_feed_cache_ttl_secs,
        set_stirr_feed_cache_ttl_secs,
        FEED_CACHE_TTL,
        DEFAULT_FEED_CACHE_TTL_SECS
    );
}
