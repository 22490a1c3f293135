//! Progress history tests: eviction, ordering and derived statistics.

use chrono::{Duration, TimeZone, Utc};
use guard_shared::achievements::unlocked_achievements;
use guard_shared::{
    Hint, HintCode, MemoryStorage, ProgressStats, ProgressStore, SessionMetrics, MAX_SESSIONS,
};
use tempfile::TempDir;

fn numbered_session(n: u64) -> SessionMetrics {
    let start = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap() + Duration::hours(n as i64);
    let mut m = SessionMetrics::new(start);
    m.punches = n;
    m.reaction_ms = 1_500;
    m.accuracy.stance = 60;
    m.frames = 100;
    m.finish(start + Duration::minutes(10))
}

#[test]
fn test_101_sessions_keep_most_recent_100_in_order() {
    let store = ProgressStore::new(MemoryStorage::new());
    for n in 0..101 {
        store.log(&numbered_session(n)).unwrap();
    }

    let sessions = store.get_sessions();
    assert_eq!(sessions.len(), MAX_SESSIONS);
    let ids: Vec<u64> = sessions.iter().map(|s| s.punches).collect();
    let expected: Vec<u64> = (1..101).collect();
    assert_eq!(ids, expected);
    assert!(sessions.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_length_never_exceeds_cap() {
    let store = ProgressStore::new(MemoryStorage::new());
    for n in 0..250 {
        store.log(&numbered_session(n)).unwrap();
        assert!(store.get_sessions().len() <= MAX_SESSIONS);
    }
}

#[test]
fn test_stats_recomputed_from_log() {
    let dir = TempDir::new().unwrap();
    let store = ProgressStore::open(dir.path());
    assert_eq!(store.get_stats(), ProgressStats::default());

    for _ in 0..4 {
        store.log(&numbered_session(5)).unwrap();
    }

    let stats = store.get_stats();
    assert_eq!(stats.sessions, 4);
    assert_eq!(stats.accuracy.stance, 60.0);
    assert_eq!(stats.accuracy.blocks, 0.0);
    assert_eq!(stats.total_punches, 20);
    assert_eq!(stats.avg_reaction_ms, 1_500.0);
    assert_eq!(stats.total_training_ms, 4 * 10 * 60_000);

    // A fresh handle over the same directory derives identical stats
    assert_eq!(ProgressStore::open(dir.path()).get_stats(), stats);
}

#[test]
fn test_persisted_layout_is_a_list_of_records() {
    let dir = TempDir::new().unwrap();
    let store = ProgressStore::open(dir.path());
    store.log(&numbered_session(3)).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("guardai_progress.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["punches"], 3);
    assert_eq!(records[0]["reactionMs"], 1_500);
    assert_eq!(records[0]["durationMs"], 600_000);
}

#[test]
fn test_reset_clears_stats_and_badges() {
    let store = ProgressStore::new(MemoryStorage::new());
    store.log(&numbered_session(150)).unwrap();
    assert!(!unlocked_achievements(&store.get_stats()).is_empty());

    store.reset().unwrap();
    assert_eq!(store.get_stats(), ProgressStats::default());
    assert!(store.achievements().iter().all(|a| !a.unlocked));
}

fn folded_session(clean: usize, warned: usize) -> SessionMetrics {
    let start = Utc.with_ymd_and_hms(2026, 5, 2, 18, 0, 0).unwrap();
    let mut m = SessionMetrics::new(start);
    for _ in 0..clean {
        m.fold_hints(&[]);
    }
    for _ in 0..warned {
        m.fold_hints(&[Hint::warn(HintCode::RaiseGuard)]);
    }
    m.finish(start + Duration::seconds(10))
}

#[test]
fn test_folded_accuracy_is_a_percentage() {
    let store = ProgressStore::new(MemoryStorage::new());
    store.log(&folded_session(300, 0)).unwrap();
    let stats = store.get_stats();
    assert_eq!(stats.accuracy.stance, 100.0);

    store.reset().unwrap();
    store.log(&folded_session(3, 7)).unwrap();
    let stats = store.get_stats();
    assert!((stats.accuracy.stance - 30.0).abs() < 1e-9);
    let ids: Vec<_> = unlocked_achievements(&stats).iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["first_session"]);
}

#[test]
fn test_solid_stance_needs_ninety_percent_of_frames() {
    let store = ProgressStore::new(MemoryStorage::new());
    store.log(&folded_session(89, 11)).unwrap();
    assert!(!store.achievements().iter().any(|a| a.id == "solid_stance" && a.unlocked));

    store.log(&folded_session(100, 0)).unwrap();
    // 189 of 200 frames clean
    assert!(store.achievements().iter().any(|a| a.id == "solid_stance" && a.unlocked));
}

