//! Navigation model shared by the sources
//!
//! Sources describe what to display as [`Folder`]s of [`ListItem`]s. The
//! hosting application renders them and maps each [`Action`] back to a
//! call on the source.

use serde::{Deserialize, Serialize};

/// Group restriction of a channel listing
///
/// `All` is the wildcard; a group literally named "All" is `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupFilter {
    /// No restriction
    All,
    /// Only channels tagged with this group
    Named(String),
}

impl GroupFilter {
    pub fn named(group: impl Into<String>) -> Self {
        Self::Named(group.into())
    }
}

/// What happens when an item (or one of its context entries) is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Resolve and play `id`
    Play { id: String, live: bool },
    /// Open `region`: its group index without `group`, else a listing
    Browse {
        region: String,
        group: Option<GroupFilter>,
    },
    AddFavourite { id: String },
    RemoveFavourite { id: String },
    /// Ask the user for a query and search the source
    Search,
}

/// Entry of an item's context menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAction {
    pub label: String,
    pub action: Action,
}

impl ContextAction {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// One displayable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub label: String,
    /// Long description shown next to the item
    pub plot: Option<String>,
    /// Thumbnail URL
    pub thumb: Option<String>,
    pub playable: bool,
    pub action: Action,
    #[serde(default)]
    pub context: Vec<ContextAction>,
}

impl ListItem {
    /// A folder-like entry that opens another listing
    pub fn browse(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            plot: None,
            thumb: None,
            playable: false,
            action,
            context: Vec::new(),
        }
    }

    /// A playable entry
    pub fn playable(label: impl Into<String>, action: Action) -> Self {
        Self {
            playable: true,
            ..Self::browse(label, action)
        }
    }

    pub fn with_plot(mut self, plot: impl Into<String>) -> Self {
        self.plot = Some(plot.into());
        self
    }

    pub fn with_thumb(mut self, thumb: Option<String>) -> Self {
        self.thumb = thumb;
        self
    }

    pub fn with_context(mut self, entry: ContextAction) -> Self {
        self.context.push(entry);
        self
    }
}

/// A titled list of items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub title: String,
    pub items: Vec<ListItem>,
}

impl Folder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: ListItem) {
        self.items.push(item);
    }

    pub fn add_items(&mut self, items: impl IntoIterator<Item = ListItem>) {
        self.items.extend(items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playable_item_builder() {
        let item = ListItem::playable(
            "7 | Seven",
            Action::Play {
                id: "seven".into(),
                live: true,
            },
        )
        .with_plot("[B]News[/B]\n")
        .with_thumb(None)
        .with_context(ContextAction::new(
            "Add",
            Action::AddFavourite { id: "seven".into() },
        ));

        assert!(item.playable);
        assert_eq!(item.plot.as_deref(), Some("[B]News[/B]\n"));
        assert!(item.thumb.is_none());
        assert_eq!(item.context.len(), 1);
    }

    #[test]
    fn test_folder_collects_items() {
        let mut folder = Folder::new("Live TV");
        assert!(folder.is_empty());

        let browse = |group| Action::Browse {
            region: "ALL".into(),
            group: Some(group),
        };
        folder.add_item(ListItem::browse("All (2)", browse(GroupFilter::All)));
        folder.add_items([ListItem::browse("News (1)", browse(GroupFilter::named("News")))]);

        assert_eq!(folder.len(), 2);
        assert!(!folder.items[0].playable);
        assert_ne!(folder.items[0].action, folder.items[1].action);
    }
}
