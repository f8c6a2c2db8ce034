//! End-to-end tests of the Stirr source against a mock feed server

use chrono::{DateTime, TimeZone, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tvconfig::{Config, MemoryUserState};
use tvsource::{Action, GroupFilter, SourceError, StreamProtocol, TvSource};
use tvstirr::{Error, ListOptions, RegionCode, StirrClient, StirrConfigExt, StirrSource};

const FEED: &str = r#"{
    "headers": {"user-agent": "stirr-app", "referer": "https://stirr.com"},
    "channels": {
        "wx": {
            "name": "Weather Now", "chno": 30, "url": "https://cdn/wx.m3u8",
            "groups": ["News", "Weather"], "logo": "https://cdn/wx.png",
            "programs": [[1709287200, "Morning Forecast"], [1709290800, "Midday Forecast"]]
        },
        "news": {
            "name": "Local News", "chno": 10, "url": "https://cdn/news.m3u8",
            "groups": ["News"], "headers": {"user-agent": "news-player"}
        },
        "film": {
            "name": "classic movies", "chno": 20, "url": "https://cdn/film.m3u8",
            "groups": ["Movies"], "description": "Old films"
        }
    }
}"#;

fn gzip(json: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

async fn feed_server(expected_fetches: usize) -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/app.json.gz")
        .with_body(gzip(FEED))
        .expect(expected_fetches)
        .create_async()
        .await;
    (server, mock)
}

fn source_for(server: &mockito::ServerGuard) -> StirrSource {
    let client = StirrClient::with_url(&format!("{}/app.json.gz", server.url())).unwrap();
    StirrSource::new(client, Arc::new(MemoryUserState::new()))
}

// 2024-03-01 10:30 UTC, during "Morning Forecast"
fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
}

fn labels(items: &[tvsource::ListItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

#[tokio::test]
async fn test_feed_is_fetched_once_per_window() {
    let (server, mock) = feed_server(1).await;
    let source = source_for(&server);

    source.live_tv(&RegionCode::All, None).await.unwrap();
    source.search("news").await.unwrap();
    source.play("news").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_feed_is_refetched_after_expiry() {
    let (server, mock) = feed_server(2).await;
    let source = source_for(&server).with_feed_ttl(Duration::from_millis(100));

    source.feed().await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    source.feed().await.unwrap();
    source.feed().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_group_index() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let folder = source.live_tv(&RegionCode::All, None).await.unwrap();

    assert_eq!(folder.title, "Live TV");
    assert_eq!(
        labels(&folder.items),
        ["All (3)", "Movies (1)", "News (2)", "Weather (1)"]
    );
    assert_eq!(folder.items[2].plot.as_deref(), Some("News\n\n2 Channels"));
    assert_eq!(
        folder.items[2].action,
        Action::Browse {
            region: "ALL".to_string(),
            group: Some(GroupFilter::named("News")),
        }
    );
}

#[tokio::test]
async fn test_empty_region_has_no_all_entry() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let folder = source.live_tv(&RegionCode::MyChannels, None).await.unwrap();
    assert!(folder.is_empty());
}

#[tokio::test]
async fn test_group_listing() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let folder = source
        .live_tv_at(&RegionCode::All, Some(GroupFilter::named("News")), &morning())
        .await
        .unwrap();

    assert_eq!(folder.title, "News");
    assert_eq!(labels(&folder.items), ["10 | Local News", "30 | Weather Now"]);

    let plot = folder.items[1].plot.as_deref().unwrap();
    assert!(plot.starts_with("[B]News / Weather[/B]\n"));
    assert!(plot.contains("] Morning Forecast\n"));
    assert!(plot.contains("] Midday Forecast\n"));
}

#[tokio::test]
async fn test_unknown_region_shows_all() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let folder = source
        .live_tv(&RegionCode::from("NOWHERE"), Some(GroupFilter::All))
        .await
        .unwrap();

    assert_eq!(folder.title, "All");
    assert_eq!(folder.len(), 3);
}

#[tokio::test]
async fn test_hidden_groups_list_channels_directly() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server)
        .with_show_groups(false)
        .with_options(ListOptions {
            show_chno: false,
            show_epg: false,
        });

    let folder = source
        .live_tv(&RegionCode::All, Some(GroupFilter::named("Movies")))
        .await
        .unwrap();

    assert_eq!(folder.title, "All");
    assert_eq!(
        labels(&folder.items),
        ["classic movies", "Local News", "Weather Now"]
    );
    assert_eq!(folder.items[0].plot.as_deref(), Some("[B]Movies[/B]\nOld films"));
}

#[tokio::test]
async fn test_favourites_drive_my_channels() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let added = source.add_favourite("wx").await.unwrap();
    assert_eq!(added.map(|c| c.name.clone()).as_deref(), Some("Weather Now"));
    assert!(source.add_favourite("missing").await.unwrap().is_none());
    source.add_favourite("wx").await.unwrap();

    let mine = source
        .live_tv(&RegionCode::MyChannels, Some(GroupFilter::All))
        .await
        .unwrap();
    assert_eq!(mine.title, "My Channels");
    assert_eq!(mine.len(), 1);
    assert_eq!(
        mine.items[0].context[0].action,
        Action::RemoveFavourite { id: "wx".into() }
    );

    assert!(source.del_favourite("wx").await.unwrap());
    assert!(!source.del_favourite("wx").await.unwrap());
    let mine = source
        .live_tv(&RegionCode::MyChannels, Some(GroupFilter::All))
        .await
        .unwrap();
    assert!(mine.is_empty());
}

#[tokio::test]
async fn test_search_matches_name_number_and_groups() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server).with_options(ListOptions {
        show_chno: true,
        show_epg: false,
    });

    let by_group = source.search("WEATHER").await.unwrap();
    assert_eq!(labels(&by_group), ["30 | Weather Now"]);

    let by_number = source.search("20").await.unwrap();
    assert_eq!(labels(&by_number), ["20 | classic movies"]);

    let by_name = source.search("news").await.unwrap();
    assert_eq!(labels(&by_name), ["10 | Local News", "30 | Weather Now"]);
    assert_eq!(
        by_name[0].context[0].action,
        Action::AddFavourite { id: "news".into() }
    );

    assert!(source.search("cooking").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_play_overlays_channel_headers() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    let stream = source.play("news").await.unwrap();
    assert_eq!(stream.url, "https://cdn/news.m3u8");
    assert_eq!(stream.protocol, StreamProtocol::Hls);
    assert!(stream.live);
    assert_eq!(
        stream.headers.get("user-agent").map(String::as_str),
        Some("news-player")
    );
    assert_eq!(
        stream.headers.get("referer").map(String::as_str),
        Some("https://stirr.com")
    );

    let err = source.play("missing").await.unwrap_err();
    assert!(matches!(err, Error::ChannelNotFound(ref id) if id == "missing"));
}

#[tokio::test]
async fn test_resolve_through_trait() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);
    let source: &dyn TvSource = &source;

    assert_eq!(source.id(), "stirr");
    let stream = source.resolve("film").await.unwrap();
    assert_eq!(stream.url, "https://cdn/film.m3u8");
    assert!(matches!(
        source.resolve("nope").await,
        Err(SourceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_playlist_uses_merge_selection() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server)
        .with_stream_url(|channel| format!("plugin://stirr/play?id={}", channel.id));

    source.add_favourite("wx").await.unwrap();
    source
        .set_merge_regions(&[RegionCode::MyChannels, RegionCode::All])
        .await
        .unwrap();

    let m3u = source.render_playlist().await.unwrap();
    let names: Vec<&str> = m3u
        .lines()
        .filter(|l| l.starts_with("#EXTINF"))
        .filter_map(|l| l.rsplit(',').next())
        .collect();
    assert_eq!(names, ["Weather Now", "Local News", "classic movies"]);
    assert!(m3u.contains("\nplugin://stirr/play?id=wx\n"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stirr.m3u8");
    source.playlist(&path).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), m3u);
}

#[tokio::test]
async fn test_available_regions() {
    let (server, _mock) = feed_server(1).await;
    let source = source_for(&server);

    source
        .set_merge_regions(&[RegionCode::All, RegionCode::from("GONE")])
        .await
        .unwrap();
    let regions = source.available_regions().await.unwrap();

    let summary: Vec<(&str, bool)> = regions
        .iter()
        .map(|r| (r.name.as_str(), r.selected))
        .collect();
    assert_eq!(summary, [("My Channels", false), ("All", true)]);
}

#[tokio::test]
async fn test_source_from_config_persists_favourites() {
    let (server, _mock) = feed_server(2).await;
    let dir = tempfile::tempdir().unwrap();
    let dir_path = dir.path().to_str().unwrap().to_string();
    let client = StirrClient::with_url(&format!("{}/app.json.gz", server.url())).unwrap();

    let config = Arc::new(Config::load_config(&dir_path).unwrap());
    let source = StirrSource::from_config(client.clone(), config).unwrap();
    source.add_favourite("film").await.unwrap();

    let reloaded = Arc::new(Config::load_config(&dir_path).unwrap());
    let source = StirrSource::from_config(client, reloaded).unwrap();
    let regions = source.regions().await.unwrap();
    assert!(regions.my_channels().channels.contains_key("film"));
}

#[tokio::test]
async fn test_home_folder() {
    let (server, mock) = feed_server(0).await;
    let source = source_for(&server);

    let home = source.home();
    assert_eq!(labels(&home.items), ["Live TV", "My Channels", "Search"]);
    assert_eq!(
        home.items[1].action,
        Action::Browse {
            region: "MY_CHANNELS".to_string(),
            group: None,
        }
    );
    assert_eq!(home.items[2].action, Action::Search);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_disabled_source_does_not_fetch() {
    let (server, mock) = feed_server(0).await;
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
    config.set_stirr_enabled(false).unwrap();

    let client = StirrClient::with_url(&format!("{}/app.json.gz", server.url())).unwrap();
    let source = StirrSource::from_config(client, config).unwrap();
    assert!(!source.is_enabled());

    assert!(matches!(
        source.live_tv(&RegionCode::All, None).await,
        Err(Error::Disabled)
    ));
    let source: &dyn TvSource = &source;
    assert!(matches!(
        source.resolve("news").await,
        Err(SourceError::Unavailable(_))
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_feed_with_bad_programme_still_loads() {
    let feed = r#"{"channels": {
        "wx": {
            "name": "Weather Now", "chno": 30, "url": "https://cdn/wx.m3u8",
            "programs": [[1709287200.0, "Morning Forecast"], [1709290800, null]]
        },
        "news": {"name": "Local News", "chno": 10.0, "url": "https://cdn/news.m3u8"}
    }}"#;
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/app.json.gz")
        .with_body(gzip(feed))
        .create_async()
        .await;
    let source = source_for(&server).with_options(ListOptions {
        show_chno: true,
        show_epg: true,
    });

    let folder = source
        .live_tv_at(&RegionCode::All, Some(GroupFilter::All), &morning())
        .await
        .unwrap();

    assert_eq!(labels(&folder.items), ["10 | Local News", "30 | Weather Now"]);
    let plot = folder.items[1].plot.as_deref().unwrap();
    assert!(plot.contains("] Morning Forecast\n"));
    assert_eq!(plot.lines().count(), 2);
}
