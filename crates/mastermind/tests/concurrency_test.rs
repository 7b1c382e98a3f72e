//! Tests for concurrent guesses on one session.

mod common;

use common::{FixedSupplier, ManualClock};
use mastermind::{GameService, GameStore, MemoryStore, SqliteStore};
use mastermind_engine::{CLASSIC_ATTEMPTS, GameError, ModeKind};
use std::sync::Arc;
use std::thread;
use tempfile::NamedTempFile;

const RACERS: usize = 8;

fn service_over<S: GameStore>(store: S) -> GameService<S> {
    GameService::with_clock(
        store,
        Arc::new(FixedSupplier(vec![0, 0, 0, 0])),
        Arc::new(ManualClock::new()),
        60,
    )
}

/// Plays a classic session down to one attempt, then races the last guess.
async fn race_last_guess<S: GameStore>(service: &GameService<S>) {
    let view = service
        .create_session(ModeKind::Classic, None)
        .await
        .expect("Create failed");
    let id = *view.id();

    for _ in 1..CLASSIC_ATTEMPTS {
        service.submit_guess(&id, &[7, 7, 7, 7]).expect("Guess failed");
    }

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..RACERS)
            .map(|_| scope.spawn(|| service.submit_guess(&id, &[1, 1, 1, 1])))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Racer panicked"))
            .collect()
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.as_game(), Some(&GameError::NoAttemptsRemaining(id)));
    }

    let state = service.game_state(&id).expect("State failed");
    assert!(state.session().is_over());
    assert_eq!(*state.session().attempts_left(), Some(0));
    assert_eq!(state.guesses().len(), CLASSIC_ATTEMPTS as usize);
    let ordinals: Vec<u32> = state.guesses().iter().map(|r| *r.ordinal()).collect();
    assert_eq!(ordinals, (1..=CLASSIC_ATTEMPTS).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_memory_store_accepts_last_guess_once() {
    let service = service_over(MemoryStore::new());
    race_last_guess(&service).await;
}

#[tokio::test]
async fn test_sqlite_store_accepts_last_guess_once() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");

    let service = service_over(store);
    race_last_guess(&service).await;
}
