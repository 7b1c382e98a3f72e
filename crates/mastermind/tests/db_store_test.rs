//! Tests for the SQLite-backed store.

mod common;

use common::{FixedSupplier, ManualClock};
use mastermind::{GameService, GameStore, SqliteStore};
use mastermind_engine::{Code, GameError, ModeKind, SessionId, SessionStatus};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Creates a temporary database file with schema applied. The file handle must
/// stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

fn service_over(
    store: SqliteStore,
    secret: Vec<i64>,
) -> (GameService<SqliteStore>, ManualClock) {
    let clock = ManualClock::new();
    let service = GameService::with_clock(
        store,
        Arc::new(FixedSupplier(secret)),
        Arc::new(clock.clone()),
        60,
    );
    (service, clock)
}

#[test]
fn test_empty_path_rejected() {
    assert!(SqliteStore::new(String::new()).is_err());
}

#[test]
fn test_migrate_is_repeatable() {
    let (_db, store) = setup_test_db();
    store.migrate().expect("Second migration failed");
}

#[tokio::test]
async fn test_session_round_trip() {
    let (_db, store) = setup_test_db();
    let (service, _) = service_over(store, vec![4, 2, 6, 1]);
    let view = service
        .create_session(ModeKind::Timed, Some(90))
        .await
        .expect("Create failed");

    let loaded = service
        .store()
        .load_session(view.id())
        .expect("Load failed")
        .expect("Session missing");
    assert_eq!(loaded.view(*view.created_at()), view);
    assert_eq!(loaded.time_limit_secs(), Some(90));
    assert!(
        service
            .store()
            .load_session(&SessionId::random())
            .expect("Load failed")
            .is_none()
    );
}

#[tokio::test]
async fn test_win_persists_session_and_record() {
    let (_db, store) = setup_test_db();
    let (service, _) = service_over(store, vec![4, 2, 6, 1]);
    let view = service
        .create_session(ModeKind::Classic, None)
        .await
        .expect("Create failed");

    service
        .submit_guess(view.id(), &[1, 2, 4, 6])
        .expect("Guess failed");
    let hit = service
        .submit_guess(view.id(), &[4, 2, 6, 1])
        .expect("Guess failed");
    assert!(hit.session().is_win());
    assert_eq!(*hit.record().ordinal(), 2);

    let state = service.game_state(view.id()).expect("State failed");
    assert_eq!(*state.session().status(), SessionStatus::Won);
    assert_eq!(*state.session().attempts_left(), Some(8));
    assert_eq!(state.guesses().len(), 2);
    assert_eq!(*state.guesses()[0].score().correct_positions(), 1);
    assert_eq!(*state.guesses()[0].score().correct_numbers(), 3);
    assert_eq!(
        *state.session().secret(),
        Some(Code::from_raw(&[4, 2, 6, 1]).unwrap())
    );

    let after = service.submit_guess(view.id(), &[4, 2, 6, 1]);
    assert_eq!(
        after.expect_err("Guess after win should fail").as_game(),
        Some(&GameError::SessionAlreadyOver(*view.id()))
    );
}

#[tokio::test]
async fn test_classic_exhaustion_persists() {
    let (_db, store) = setup_test_db();
    let (service, _) = service_over(store, vec![0, 0, 0, 0]);
    let view = service
        .create_session(ModeKind::Classic, None)
        .await
        .expect("Create failed");

    for _ in 0..10 {
        service
            .submit_guess(view.id(), &[1, 1, 1, 1])
            .expect("Guess failed");
    }

    let eleventh = service.submit_guess(view.id(), &[0, 0, 0, 0]);
    assert_eq!(
        eleventh.expect_err("11th guess should fail").as_game(),
        Some(&GameError::NoAttemptsRemaining(*view.id()))
    );

    let history = service.history(view.id()).expect("History failed");
    let ordinals: Vec<u32> = history.iter().map(|r| *r.ordinal()).collect();
    assert_eq!(ordinals, (1..=10).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_timeout_commits_loss_without_record() {
    let (_db, store) = setup_test_db();
    let (service, clock) = service_over(store, vec![5, 5, 1, 1]);
    let view = service
        .create_session(ModeKind::Timed, Some(60))
        .await
        .expect("Create failed");

    clock.advance(61);
    let err = service.submit_guess(view.id(), &[5, 5, 1, 1]);
    assert_eq!(
        err.expect_err("Late guess should fail").as_game(),
        Some(&GameError::TimeExpired(*view.id()))
    );

    let stored = service
        .store()
        .load_session(view.id())
        .expect("Load failed")
        .expect("Session missing");
    assert!(stored.is_over());
    assert!(!stored.is_win());
    assert!(service.history(view.id()).expect("History failed").is_empty());

    let again = service.submit_guess(view.id(), &[5, 5, 1, 1]);
    assert_eq!(
        again.expect_err("Guess after expiry should fail").as_game(),
        Some(&GameError::SessionAlreadyOver(*view.id()))
    );
}

#[tokio::test]
async fn test_expire_persists_and_is_idempotent() {
    let (_db, store) = setup_test_db();
    let (service, _) = service_over(store, vec![3, 1, 4, 1]);
    let view = service
        .create_session(ModeKind::Classic, None)
        .await
        .expect("Create failed");

    let expired = service.expire_session(view.id()).expect("Expire failed");
    assert!(expired.is_over());
    assert_eq!(*expired.attempts_left(), Some(10));

    let again = service.expire_session(view.id()).expect("Expire failed");
    assert_eq!(again, expired);
}

#[tokio::test]
async fn test_unknown_session_in_sqlite() {
    let (_db, store) = setup_test_db();
    let (service, _) = service_over(store, vec![3, 1, 4, 1]);
    let missing = SessionId::random();

    let err = service.submit_guess(&missing, &[0, 0, 0, 0]);
    assert_eq!(
        err.expect_err("Unknown session should fail").as_game(),
        Some(&GameError::SessionNotFound(missing))
    );
    let err = service.expire_session(&missing);
    assert_eq!(
        err.expect_err("Unknown session should fail").as_game(),
        Some(&GameError::SessionNotFound(missing))
    );
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let (first, second) = {
        let store = SqliteStore::open(db_path.clone()).expect("Failed to open store");
        let (service, clock) = service_over(store, vec![2, 7, 1, 0]);
        let first = service
            .create_session(ModeKind::Classic, None)
            .await
            .expect("Create failed");
        clock.advance(1);
        let second = service
            .create_session(ModeKind::Timed, None)
            .await
            .expect("Create failed");
        service
            .submit_guess(first.id(), &[2, 7, 0, 1])
            .expect("Guess failed");
        (first, second)
    };

    let reopened = SqliteStore::open(db_path).expect("Failed to reopen store");
    let (service, _) = service_over(reopened, vec![0, 0, 0, 0]);

    let listed = service.list_sessions().expect("List failed");
    let ids: Vec<SessionId> = listed.iter().map(|v| *v.id()).collect();
    assert_eq!(ids, vec![*second.id(), *first.id()]);

    let state = service.game_state(first.id()).expect("State failed");
    assert_eq!(*state.session().attempts_left(), Some(9));
    assert_eq!(state.guesses().len(), 1);
    assert_eq!(*state.guesses()[0].score().correct_positions(), 2);
    assert_eq!(*state.guesses()[0].score().correct_numbers(), 2);

    let hit = service
        .submit_guess(first.id(), &[2, 7, 1, 0])
        .expect("Guess failed");
    assert!(hit.session().is_win());
}
