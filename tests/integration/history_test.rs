//! History Store Integration Tests
//!
//! Aggregates are checked against both backends so the SQLite round trip
//! cannot change what the dashboard shows.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use deeptrust::services::history::{HistoryStore, MediaFilter};
use deeptrust::storage::SqliteHistory;
use deeptrust_core::{AnalysisResult, HistoryEntry, MediaType, ResultTier};

fn stores() -> Vec<(&'static str, HistoryStore)> {
    vec![
        ("memory", HistoryStore::in_memory()),
        (
            "sqlite",
            HistoryStore::new(Arc::new(SqliteHistory::new_in_memory().unwrap())),
        ),
    ]
}

fn entry(media_type: MediaType, score: u8) -> HistoryEntry {
    HistoryEntry::completed(
        media_type,
        format!("{}-{}.bin", media_type, score),
        AnalysisResult::without_signals(score, ResultTier::Secondary),
    )
}

#[test]
fn test_month_count_excludes_other_months() {
    let reference = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    for (name, store) in stores() {
        store.append(&entry(MediaType::Image, 10).dated(reference)).unwrap();
        store
            .append(&entry(MediaType::Image, 20).dated(reference - Duration::days(3)))
            .unwrap();
        store
            .append(&entry(MediaType::Video, 30).dated(reference - Duration::days(40)))
            .unwrap();

        assert_eq!(
            store.count_in_month(&MediaFilter::all(), &reference).unwrap(),
            2,
            "{}",
            name
        );
        assert_eq!(store.count_total(&MediaFilter::all()).unwrap(), 3, "{}", name);
    }
}

#[test]
fn test_high_risk_count_is_exact() {
    for (name, store) in stores() {
        for score in [70, 85, 99, 100] {
            store.append(&entry(MediaType::Video, score)).unwrap();
        }
        for score in [0, 39, 40, 69] {
            store.append(&entry(MediaType::Video, score)).unwrap();
        }

        assert_eq!(store.count_high_risk(&MediaFilter::all()).unwrap(), 4, "{}", name);
    }
}

#[test]
fn test_filter_restricts_every_aggregate() {
    for (name, store) in stores() {
        store.append(&entry(MediaType::Image, 90)).unwrap();
        store.append(&entry(MediaType::Audio, 90)).unwrap();
        store.append(&entry(MediaType::Audio, 10)).unwrap();
        store.append(&HistoryEntry::failed(MediaType::Audio, "broken.mp3")).unwrap();

        let audio = store.summary(&MediaFilter::only(MediaType::Audio)).unwrap();
        assert_eq!(audio.total, 3, "{}", name);
        assert_eq!(audio.monthly, 3, "{}", name);
        assert_eq!(audio.high_risk, 1, "{}", name);

        let mixed = store
            .summary(&MediaFilter::of(&[MediaType::Image, MediaType::Audio]))
            .unwrap();
        assert_eq!(mixed.total, 4, "{}", name);
        assert_eq!(mixed.high_risk, 2, "{}", name);
    }
}

#[test]
fn test_list_keeps_insertion_order_and_recent_reverses() {
    for (name, store) in stores() {
        let first = entry(MediaType::Image, 1);
        let second = entry(MediaType::Image, 2);
        let third = entry(MediaType::Video, 3);
        for e in [&first, &second, &third] {
            store.append(e).unwrap();
        }

        assert_eq!(store.list().unwrap(), vec![first.clone(), second.clone(), third.clone()], "{}", name);

        let recent = store.recent(&MediaFilter::only(MediaType::Image), 5).unwrap();
        assert_eq!(recent, vec![second.clone(), first.clone()], "{}", name);

        assert_eq!(store.get(third.id()).unwrap(), third, "{}", name);
    }
}

#[test]
fn test_duplicate_id_is_refused_by_both_backends() {
    for (name, store) in stores() {
        let original = entry(MediaType::Audio, 55);
        store.append(&original).unwrap();

        assert!(store.append(&original).is_err(), "{}", name);
        assert_eq!(store.count_total(&MediaFilter::all()).unwrap(), 1, "{}", name);
    }
}
