//! SQLite-backed session and history store.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use mastermind_engine::{GameError, GuessRecord, Session, SessionId};
use tracing::{debug, info, instrument};

use crate::db::models::{GuessRow, NewGuessRow, NewSessionRow, SessionChanges, SessionRow};
use crate::db::schema;
use crate::error::{ServiceError, StoreError};
use crate::store::{Commit, GameStore, Step};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on another writer before giving up.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Game store persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Creates a store for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, StoreError> {
        if db_path.trim().is_empty() {
            return Err(StoreError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating SqliteStore");
        Ok(Self { db_path })
    }

    /// Opens the database and applies any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        let store = Self::new(db_path)?;
        store.migrate()?;
        Ok(store)
    }

    /// Applies pending schema migrations.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(|e| StoreError::new(format!("Failed to set busy timeout: {}", e)))?;
        Ok(conn)
    }
}

impl GameStore for SqliteStore {
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let row = NewSessionRow::from_session(session)?;

        let stored = diesel::insert_into(schema::sessions::table)
            .values(&row)
            .returning(SessionRow::as_returning())
            .get_result(&mut conn)?;

        info!(session_id = %stored.id(), mode = %stored.mode(), "Session stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn load_session(&self, id: &SessionId) -> Result<Option<Session>, ServiceError> {
        let mut conn = self.connection()?;

        let row = schema::sessions::table
            .find(id.to_string())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StoreError::from)?;

        match row {
            Some(row) => Ok(Some(row.into_session()?)),
            None => {
                debug!("Session not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn list_sessions(&self) -> Result<Vec<Session>, ServiceError> {
        let mut conn = self.connection()?;

        let rows = schema::sessions::table
            .order(schema::sessions::created_at.desc())
            .select(SessionRow::as_select())
            .load(&mut conn)
            .map_err(StoreError::from)?;

        let sessions = rows
            .into_iter()
            .map(SessionRow::into_session)
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = sessions.len(), "Sessions loaded");
        Ok(sessions)
    }

    #[instrument(skip(self))]
    fn history(&self, id: &SessionId) -> Result<Vec<GuessRecord>, ServiceError> {
        let mut conn = self.connection()?;

        let rows = schema::guess_records::table
            .filter(schema::guess_records::session_id.eq(id.to_string()))
            .order(schema::guess_records::ordinal.asc())
            .select(GuessRow::as_select())
            .load(&mut conn)
            .map_err(StoreError::from)?;

        let records = rows
            .into_iter()
            .map(GuessRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "History loaded");
        Ok(records)
    }

    #[instrument(skip(self, step))]
    fn apply<T, F>(&self, id: &SessionId, step: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&Session, u32) -> Step<T>,
    {
        let mut conn = self.connection()?;
        let key = id.to_string();

        // IMMEDIATE takes the write lock up front, so the read below cannot go
        // stale before the update lands.
        let result = conn.immediate_transaction::<_, ServiceError, _>(|conn| {
            let session = schema::sessions::table
                .find(&key)
                .select(SessionRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(GameError::SessionNotFound(*id))?
                .into_session()?;

            let recorded: i64 = schema::guess_records::table
                .filter(schema::guess_records::session_id.eq(&key))
                .count()
                .get_result(conn)?;
            let next_ordinal = u32::try_from(recorded + 1)
                .map_err(|_| StoreError::new(format!("History length {} overflows", recorded)))?;

            let Step { commit, result } = step(&session, next_ordinal);

            if let Some(Commit {
                session,
                record,
                updated_at,
            }) = commit
            {
                let changes = SessionChanges::from_session(&session, updated_at)?;
                diesel::update(schema::sessions::table.find(&key))
                    .set(&changes)
                    .execute(conn)?;

                if let Some(record) = record {
                    let row = NewGuessRow::from_record(&record)?;
                    diesel::insert_into(schema::guess_records::table)
                        .values(&row)
                        .execute(conn)?;
                    debug!(
                        record_id = %row.id(),
                        ordinal = row.ordinal(),
                        "History record appended"
                    );
                }
                debug!(status = %session.status(), "Step committed");
            }

            Ok(result)
        })?;

        Ok(result?)
    }
}
