//! Display strings

pub const LIVE_TV: &str = "Live TV";
pub const ALL: &str = "All";
pub const MY_CHANNELS: &str = "My Channels";
pub const ADD_MY_CHANNEL: &str = "Add to My Channels";
pub const DEL_MY_CHANNEL: &str = "Remove from My Channels";
pub const SEARCH: &str = "Search";

pub fn channel_count(count: usize) -> String {
    format!("{} Channels", count)
}
