//! Channel listings
//!
//! Turns a channel mapping into the displayable items of a listing: sorted,
//! optionally restricted to a group, with a plot made of the channel groups
//! followed by either the description or the upcoming programmes.

use crate::labels;
use crate::models::Channel;
use crate::regions::{GroupFilter, RegionCode};
use chrono::{DateTime, Duration, TimeZone};
use std::collections::BTreeMap;
use std::fmt::{Display, Write};
use std::sync::Arc;
use tvsource::{Action, ContextAction, ListItem};

/// Maximum number of programmes shown in a plot
pub const EPG_COUNT: usize = 5;

/// Display toggles of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Sort by channel number and prefix labels with it
    pub show_chno: bool,
    /// Show upcoming programmes instead of the description
    pub show_epg: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_chno: true,
            show_epg: true,
        }
    }
}

/// Builds the items of a channel listing
///
/// Channels are sorted by number (or by trimmed lower-case name when
/// `show_chno` is off); ties keep the mapping order. `region` decides the
/// context action: removal in "My Channels", addition elsewhere. Programme
/// times are shown in the timezone of `now`.
pub fn process_channels<Tz>(
    channels: &BTreeMap<String, Arc<Channel>>,
    group: &GroupFilter,
    region: &RegionCode,
    options: ListOptions,
    now: &DateTime<Tz>,
) -> Vec<ListItem>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut sorted: Vec<&Arc<Channel>> = channels.values().collect();
    if options.show_chno {
        sorted.sort_by(|a, b| a.chno.cmp(&b.chno));
    } else {
        sorted.sort_by_cached_key(|c| c.name.trim().to_lowercase());
    }

    sorted
        .into_iter()
        .filter(|channel| channel.matches(group))
        .map(|channel| channel_item(channel, region, options, now))
        .collect()
}

fn channel_item<Tz>(
    channel: &Channel,
    region: &RegionCode,
    options: ListOptions,
    now: &DateTime<Tz>,
) -> ListItem
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut plot = format!("[B]{}[/B]\n", channel.groups.join(" / "));
    if options.show_epg {
        plot.push_str(&epg_lines(channel, now));
    } else {
        plot.push_str(channel.description.as_deref().unwrap_or_default());
    }

    let label = if options.show_chno {
        format!("{} | {}", channel.chno, channel.name)
    } else {
        channel.name.clone()
    };

    let context = match region {
        RegionCode::MyChannels => ContextAction::new(
            labels::DEL_MY_CHANNEL,
            Action::RemoveFavourite {
                id: channel.id.clone(),
            },
        ),
        _ => ContextAction::new(
            labels::ADD_MY_CHANNEL,
            Action::AddFavourite {
                id: channel.id.clone(),
            },
        ),
    };

    ListItem::playable(
        label,
        Action::Play {
            id: channel.id.clone(),
            live: true,
        },
    )
    .with_plot(plot)
    .with_thumb(channel.logo.clone())
    .with_context(context)
}

/// Current and upcoming programmes, one `[h:mma] title` line each
///
/// A programme ends where the next one starts, the last one after an hour.
pub fn epg_lines<Tz>(channel: &Channel, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let mut lines = String::new();
    let mut count = 0;

    for (index, program) in channel.programs.iter().enumerate() {
        let start = program.start;
        // None when the hour past the last start overflows
        let stop = match channel.programs.get(index + 1) {
            Some(next) => Some(next.start),
            None => start.checked_add_signed(Duration::hours(1)),
        };

        let airing = start <= *now && stop.map_or(true, |stop| *now < stop);
        if airing || start > *now {
            let local = start.with_timezone(&tz);
            let _ = writeln!(lines, "[{}] {}", local.format("%-I:%M%P"), program.title);
            count += 1;
            if count == EPG_COUNT {
                break;
            }
        }
    }

    lines
}
