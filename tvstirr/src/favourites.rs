//! The user's favourite channels ("My Channels")

use crate::error::Result;
use crate::models::Channel;
use crate::regions::RegionSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use tvconfig::UserState;

/// User-state key of the favourites list
pub const FAVOURITES_KEY: &str = "favourites";

/// Ordered list of favourite channel ids, without duplicates
#[derive(Clone)]
pub struct Favourites {
    state: Arc<dyn UserState>,
}

impl fmt::Debug for Favourites {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Favourites").finish_non_exhaustive()
    }
}

impl Favourites {
    pub fn new(state: Arc<dyn UserState>) -> Self {
        Self { state }
    }

    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.state.get_list(FAVOURITES_KEY)?)
    }

    /// Adds `id` unless it is already a favourite
    ///
    /// Returns the channel when `id` exists in the feed, `None` (and stores
    /// nothing) otherwise.
    pub fn add(&self, id: &str, regions: &RegionSet) -> Result<Option<Arc<Channel>>> {
        let Some(channel) = regions.all().channels.get(id) else {
            debug!(id, "ignoring favourite for unknown channel");
            return Ok(None);
        };

        self.state.append_if_absent(FAVOURITES_KEY, id)?;
        Ok(Some(Arc::clone(channel)))
    }

    /// Removes `id`; returns whether it was a favourite
    pub fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.state.remove_if_present(FAVOURITES_KEY, id)?)
    }
}
