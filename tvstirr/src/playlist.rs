//! M3U playlist export
//!
//! The exported document starts with `#EXTM3U`, then lists every channel of
//! the selected regions, regions in selection order and channels by number.
//! A channel already listed by an earlier region is skipped. Attribute
//! values are written verbatim.

use crate::error::Result;
use crate::models::Channel;
use crate::regions::{Region, RegionCode, RegionSet};
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use tvconfig::UserState;

/// User-state key of the merge selection
pub const MERGE_REGIONS_KEY: &str = "merge_regions";

/// Playlist header line
pub const M3U_HEADER: &str = "#EXTM3U";

/// Region codes selected for playlist export
///
/// Codes are stored as given. Codes absent from the current regions are
/// only dropped when the selection is resolved.
#[derive(Clone)]
pub struct MergeSelection {
    state: Arc<dyn UserState>,
}

impl fmt::Debug for MergeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeSelection").finish_non_exhaustive()
    }
}

impl MergeSelection {
    pub fn new(state: Arc<dyn UserState>) -> Self {
        Self { state }
    }

    /// Stored codes, unfiltered
    pub fn codes(&self) -> Result<Vec<RegionCode>> {
        Ok(self
            .state
            .get_list(MERGE_REGIONS_KEY)?
            .iter()
            .map(|code| RegionCode::from(code.as_str()))
            .collect())
    }

    pub fn set(&self, codes: &[RegionCode]) -> Result<()> {
        let codes: Vec<String> = codes.iter().map(|c| c.as_str().to_string()).collect();
        Ok(self.state.set_list(MERGE_REGIONS_KEY, &codes)?)
    }

    /// Stored codes present in `regions`, `[All]` when none is
    pub fn resolve(&self, regions: &RegionSet) -> Result<Vec<RegionCode>> {
        let (valid, dropped): (Vec<RegionCode>, Vec<RegionCode>) = self
            .codes()?
            .into_iter()
            .partition(|code| regions.contains(code));

        if !dropped.is_empty() {
            debug!(?dropped, "ignoring unavailable merge regions");
        }

        if valid.is_empty() {
            Ok(vec![RegionCode::All])
        } else {
            Ok(valid)
        }
    }
}

/// Renders the playlist of `selection`
///
/// `stream_url` gives the URL written under each `#EXTINF` line.
pub fn render_m3u<F>(regions: &RegionSet, selection: &[RegionCode], stream_url: F) -> String
where
    F: Fn(&Channel) -> String,
{
    let mut out = String::from(M3U_HEADER);
    let mut added: HashSet<&str> = HashSet::new();

    for region in selection.iter().filter_map(|code| regions.get(code)) {
        for channel in sorted_by_chno(region) {
            if !added.insert(channel.id.as_str()) {
                continue;
            }

            let _ = write!(
                out,
                "\n#EXTINF:-1 tvg-id=\"{id}\" tvg-chno=\"{chno}\" tvg-name=\"{name}\" tvg-logo=\"{logo}\" group-title=\"{group}\",{name}\n{url}",
                id = channel.id,
                chno = channel.chno,
                name = channel.name,
                logo = channel.logo.as_deref().unwrap_or_default(),
                group = channel.groups.join(";"),
                url = stream_url(channel),
            );
        }
    }

    out
}

/// Writes the playlist of `selection` to `path` as UTF-8
pub async fn write_playlist<F>(
    path: impl AsRef<Path>,
    regions: &RegionSet,
    selection: &[RegionCode],
    stream_url: F,
) -> Result<()>
where
    F: Fn(&Channel) -> String,
{
    let document = render_m3u(regions, selection, stream_url);
    tokio::fs::write(path.as_ref(), document).await?;
    debug!(path = %path.as_ref().display(), "playlist written");
    Ok(())
}

fn sorted_by_chno(region: &Region) -> Vec<&Arc<Channel>> {
    let mut channels: Vec<&Arc<Channel>> = region.channels.values().collect();
    channels.sort_by(|a, b| a.chno.cmp(&b.chno));
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelNumber;
    use crate::regions::tests::{channel, feed};
    use tvconfig::MemoryUserState;

    fn regions(favourites: &[&str]) -> RegionSet {
        let feed = feed(vec![
            channel("a", "Alpha", ChannelNumber::Number(3), &["News", "Local"]),
            channel("b", "Bravo", ChannelNumber::Number(1), &["Sports"]),
            channel("c", "Charlie", ChannelNumber::Number(2), &[]),
        ]);
        let favourites: Vec<String> = favourites.iter().map(|s| s.to_string()).collect();
        RegionSet::materialize(&feed, &favourites)
    }

    fn direct(channel: &Channel) -> String {
        channel.url.clone()
    }

    #[test]
    fn test_document_format() {
        let regions = regions(&[]);
        let m3u = render_m3u(&regions, &[RegionCode::All], direct);

        assert!(m3u.starts_with("#EXTM3U\n#EXTINF"));
        assert!(m3u.contains(
            "#EXTINF:-1 tvg-id=\"a\" tvg-chno=\"3\" tvg-name=\"Alpha\" tvg-logo=\"https://cdn/a.png\" group-title=\"News;Local\",Alpha\nhttps://cdn/a.m3u8"
        ));
        assert!(!m3u.ends_with('\n'));

        let order: Vec<&str> = m3u
            .lines()
            .filter(|l| l.starts_with("#EXTINF"))
            .filter_map(|l| l.rsplit(',').next())
            .collect();
        assert_eq!(order, ["Bravo", "Charlie", "Alpha"]);
    }

    #[test]
    fn test_duplicates_across_regions_are_emitted_once() {
        let regions = regions(&["a"]);
        let m3u = render_m3u(
            &regions,
            &[RegionCode::MyChannels, RegionCode::All],
            direct,
        );

        assert_eq!(m3u.matches("#EXTINF").count(), 3);
        assert_eq!(m3u.matches("tvg-id=\"a\"").count(), 1);
        // First occurrence comes from the first selected region
        let first = m3u.lines().nth(1).unwrap();
        assert!(first.contains("tvg-id=\"a\""));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut c = channel("q", "Say \"Hi\", there", ChannelNumber::Number(1), &[]);
        c.logo = None;
        let regions = RegionSet::materialize(&feed(vec![c]), &[]);

        let m3u = render_m3u(&regions, &[RegionCode::All], direct);
        assert!(m3u.contains("tvg-name=\"Say \"Hi\", there\""));
        assert!(m3u.contains("tvg-logo=\"\""));
    }

    #[test]
    fn test_custom_stream_url() {
        let regions = regions(&[]);
        let m3u = render_m3u(&regions, &[RegionCode::All], |c| {
            format!("plugin://tvstirr/play?id={}", c.id)
        });
        assert!(m3u.contains("\nplugin://tvstirr/play?id=b\n"));
    }

    #[test]
    fn test_selection_drops_unknown_codes_at_use_time() {
        let state = Arc::new(MemoryUserState::new());
        let selection = MergeSelection::new(state.clone());
        let regions = regions(&[]);

        assert_eq!(selection.resolve(&regions).unwrap(), [RegionCode::All]);

        selection
            .set(&[RegionCode::from("GONE"), RegionCode::MyChannels])
            .unwrap();
        assert_eq!(
            selection.resolve(&regions).unwrap(),
            [RegionCode::MyChannels]
        );
        // Stored list keeps the invalid code
        assert_eq!(
            state.get_list(MERGE_REGIONS_KEY).unwrap(),
            ["GONE", "MY_CHANNELS"]
        );

        selection.set(&[RegionCode::from("GONE")]).unwrap();
        assert_eq!(selection.resolve(&regions).unwrap(), [RegionCode::All]);
    }

    #[tokio::test]
    async fn test_write_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.m3u8");
        let regions = regions(&[]);

        write_playlist(&path, &regions, &[RegionCode::All], direct)
            .await
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_m3u(&regions, &[RegionCode::All], direct));
    }
}
