use std::sync::Arc;
use std::time::Duration;

use super::lookup::parse_search_response;
use super::*;
use crate::config::MetadataSettings;
use crate::testing::StubLookup;

const SAMPLE: &str = r#"{
  "kind": "youtube#searchListResponse",
  "items": [
    {
      "id": { "kind": "youtube#video", "videoId": "abc123XYZ" },
      "snippet": {
        "title": "Artist &amp; Friends - Track (Official Video)",
        "thumbnails": {
          "default": { "url": "https://i.ytimg.com/vi/abc123XYZ/default.jpg" },
          "medium": { "url": "https://i.ytimg.com/vi/abc123XYZ/mqdefault.jpg" }
        }
      }
    }
  ]
}"#;

#[test]
fn parses_first_item_title_and_best_thumbnail() {
    let info = parse_search_response(SAMPLE).unwrap().unwrap();
    assert_eq!(info.title, "Artist & Friends - Track (Official Video)");
    assert_eq!(
        info.thumbnail_url.as_deref(),
        Some("https://i.ytimg.com/vi/abc123XYZ/mqdefault.jpg")
    );
}

#[test]
fn empty_item_list_is_not_found() {
    assert_eq!(parse_search_response(r#"{"items": []}"#).unwrap(), None);
    assert_eq!(parse_search_response("{}").unwrap(), None);
}

#[test]
fn garbage_body_is_malformed() {
    assert!(matches!(
        parse_search_response("<html>"),
        Err(LookupError::Malformed(_))
    ));
}

#[test]
fn lookup_needs_a_key_and_the_enabled_flag() {
    let mut settings = MetadataSettings::default();
    assert!(YoutubeLookup::from_settings(&settings).unwrap().is_none());

    settings.api_key = Some("   ".into());
    assert!(YoutubeLookup::from_settings(&settings).unwrap().is_none());

    settings.api_key = Some("k".into());
    settings.enabled = false;
    assert!(YoutubeLookup::from_settings(&settings).unwrap().is_none());

    settings.enabled = true;
    assert!(YoutubeLookup::from_settings(&settings).unwrap().is_some());
}

#[test]
fn slot_accepts_only_the_newest_token() {
    let slot = MetadataSlot::default();
    slot.begin(1);
    slot.begin(2);
    assert!(!slot.offer(1, MetadataDisplay::NotFound));
    assert!(slot.take().is_none());

    assert!(slot.offer(2, MetadataDisplay::NotFound));
    assert_eq!(slot.take(), Some(MetadataDisplay::NotFound));
    assert_eq!(slot.take(), None);
}

#[test]
fn disabled_fetcher_reports_unavailable_without_spawning() {
    let fetcher = MetadataFetcher::disabled();
    assert!(fetcher.request(1, "Track").is_none());
    assert_eq!(fetcher.take_update(), Some(MetadataDisplay::Unavailable));
}

#[test]
fn fetcher_delivers_found_and_not_found() {
    let stub = Arc::new(StubLookup::new().answer("Track", "Track (Live)"));
    let fetcher = MetadataFetcher::new(Some(stub.clone()));

    fetcher.request(1, "Track").unwrap().join().unwrap();
    match fetcher.take_update() {
        Some(MetadataDisplay::Found(info)) => assert_eq!(info.title, "Track (Live)"),
        other => panic!("unexpected {other:?}"),
    }

    fetcher.request(2, "Unknown").unwrap().join().unwrap();
    assert_eq!(fetcher.take_update(), Some(MetadataDisplay::NotFound));
    assert_eq!(stub.calls(), 2);
}

#[test]
fn lookup_errors_become_a_placeholder() {
    let stub = Arc::new(StubLookup::new());
    let fetcher = MetadataFetcher::new(Some(stub));
    fetcher.request(1, "offline").unwrap().join().unwrap();
    assert_eq!(fetcher.take_update(), Some(MetadataDisplay::Unavailable));
}

#[test]
fn late_result_for_an_older_track_is_discarded() {
    let stub = Arc::new(
        StubLookup::new()
            .answer("Slow", "Slow Song")
            .answer("Fast", "Fast Song")
            .delay("Slow", Duration::from_millis(50)),
    );
    let fetcher = MetadataFetcher::new(Some(stub));

    let slow = fetcher.request(1, "Slow").unwrap();
    let fast = fetcher.request(2, "Fast").unwrap();
    fast.join().unwrap();
    slow.join().unwrap();

    match fetcher.take_update() {
        Some(MetadataDisplay::Found(info)) => assert_eq!(info.title, "Fast Song"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(fetcher.take_update(), None);
}

#[test]
fn empty_query_is_not_found_without_a_call() {
    let stub = Arc::new(StubLookup::new());
    let fetcher = MetadataFetcher::new(Some(stub.clone()));
    assert!(fetcher.request(1, "").is_none());
    assert_eq!(fetcher.take_update(), Some(MetadataDisplay::NotFound));
    assert_eq!(stub.calls(), 0);
}
