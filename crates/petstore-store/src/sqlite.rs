// ABOUTME: SQLite-backed PetStore where every mutation runs in its own transaction.
// ABOUTME: Change detection relies on rows-affected counts rather than comparing values in Rust.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use petstore_core::{Pet, SqliteConfig, StoreConfig};
use rusqlite::{Connection, Params, Row, Transaction};

use crate::store::{PetStore, StoreError};

const SQL_IS_READY: &str = "SELECT 1";

const SQL_CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS pets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(45) NOT NULL,
    race VARCHAR(25) NOT NULL,
    mod VARCHAR(25) NOT NULL
)";

const SQL_INSERT_PET: &str = "INSERT INTO pets (name, race, mod) VALUES (?1, ?2, ?3) RETURNING id";

const SQL_GET_PET: &str = "SELECT id, name, race, mod FROM pets WHERE id = ?1";

const SQL_GET_ALL_PETS: &str = "SELECT id, name, race, mod FROM pets ORDER BY id ASC";

const SQL_VERIFY_PET_EXISTS: &str = "SELECT id FROM pets WHERE id = ?1";

const SQL_DELETE_PET: &str = "DELETE FROM pets WHERE id = ?1";

// The inequality predicate makes an identical update match zero rows, so
// "nothing changed" is reported by the database itself.
const SQL_UPDATE_PET: &str = "UPDATE pets SET name = ?2, race = ?3, mod = ?4
    WHERE id = ?1 AND (name <> ?2 OR race <> ?3 OR mod <> ?4)";

/// Receives every statement before it runs, with its bound arguments.
type QueryLogger = fn(&str, &dyn fmt::Debug);

fn log_query(query: &str, args: &dyn fmt::Debug) {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    tracing::info!(args = ?args, "SQL query: {}", query);
}

fn log_nothing(_query: &str, _args: &dyn fmt::Debug) {}

fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get(0)?,
        name: row.get(1)?,
        race: row.get(2)?,
        modifier: row.get(3)?,
    })
}

fn not_found_or(id: i64, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => StoreError::PetNotFound(id),
        other => StoreError::Sqlite(other),
    }
}

/// Run `statement` inside a transaction. Commits when it returns `Ok`,
/// otherwise rolls back and returns the statement's own error; a failing
/// rollback is only logged.
fn run_in_transaction<T, F>(conn: &mut Connection, statement: F) -> Result<T, StoreError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
{
    let tx = conn.transaction().map_err(StoreError::Transaction)?;
    match statement(&tx) {
        Ok(value) => {
            tx.commit().map_err(StoreError::Transaction)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!("rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}

/// A PetStore persisted in a SQLite database.
///
/// The connection is created by `open` and dropped by `close`; every other
/// operation fails with `StoreError::NotOpen` outside that window. The single
/// connection is guarded by a mutex, which also serializes transactions.
pub struct SqlitePetStore {
    cfg: SqliteConfig,
    conn: Mutex<Option<Connection>>,
    logger: QueryLogger,
}

impl SqlitePetStore {
    pub const NAME: &'static str = "sqlite";

    pub fn new(cfg: SqliteConfig) -> Self {
        let logger: QueryLogger = if cfg.log_queries { log_query } else { log_nothing };
        Self {
            cfg,
            conn: Mutex::new(None),
            logger,
        }
    }

    /// Build from the store section; a missing sqlite section falls back to a
    /// private in-memory database.
    pub fn from_store_config(cfg: &StoreConfig) -> Self {
        let sqlite = cfg.sqlite.clone().unwrap_or_else(|| {
            tracing::warn!("no sqlite section configured, using an in-memory database");
            SqliteConfig::in_memory()
        });
        Self::new(sqlite)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(StoreError::NotOpen)?;
        f(conn)
    }

    fn execute<P>(&self, conn: &Connection, sql: &str, params: P) -> rusqlite::Result<usize>
    where
        P: Params + fmt::Debug,
    {
        (self.logger)(sql, &params);
        conn.execute(sql, params)
    }

    fn query_row<T, P, F>(&self, conn: &Connection, sql: &str, params: P, f: F) -> rusqlite::Result<T>
    where
        P: Params + fmt::Debug,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        (self.logger)(sql, &params);
        conn.query_row(sql, params, f)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.cfg.path)?;
        conn.busy_timeout(self.cfg.busy_timeout())?;
        self.query_row(&conn, SQL_IS_READY, (), |row| row.get::<_, i64>(0))?;
        self.execute(&conn, SQL_CREATE_TABLE, ())?;
        Ok(conn)
    }
}

impl PetStore for SqlitePetStore {
    fn add_pet(&self, name: &str, race: &str, modifier: &str) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            run_in_transaction(conn, |tx| {
                let id = self.query_row(tx, SQL_INSERT_PET, (name, race, modifier), |row| {
                    row.get(0)
                })?;
                Ok(id)
            })
        })
    }

    fn get_pet(&self, id: i64) -> Result<Pet, StoreError> {
        self.with_conn(|conn| {
            self.query_row(conn, SQL_GET_PET, (id,), pet_from_row)
                .map_err(|e| not_found_or(id, e))
        })
    }

    fn get_all_pets(&self) -> Result<Vec<Pet>, StoreError> {
        self.with_conn(|conn| {
            (self.logger)(SQL_GET_ALL_PETS, &());
            let mut stmt = conn.prepare(SQL_GET_ALL_PETS)?;
            let rows = stmt.query_map([], pet_from_row)?;

            let mut pets = Vec::new();
            for row in rows {
                pets.push(row?);
            }
            Ok(pets)
        })
    }

    fn delete_pet(&self, id: i64) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            run_in_transaction(conn, |tx| {
                match self.execute(tx, SQL_DELETE_PET, (id,))? {
                    0 => Err(StoreError::PetNotFound(id)),
                    _ => Ok(()),
                }
            })
        })
    }

    fn update_pet(
        &self,
        id: i64,
        name: &str,
        race: &str,
        modifier: &str,
    ) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            self.query_row(conn, SQL_VERIFY_PET_EXISTS, (id,), |row| row.get::<_, i64>(0))
                .map_err(|e| not_found_or(id, e))?;

            run_in_transaction(conn, |tx| {
                let count = self.execute(tx, SQL_UPDATE_PET, (id, name, race, modifier))?;
                Ok(count > 0)
            })
        })
    }

    fn open(&self) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.is_some() {
            tracing::debug!("sqlite store already open");
            return Ok(());
        }
        *guard = Some(self.connect()?);
        tracing::info!("sqlite store opened at {}", self.cfg.path);
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        let Some(conn) = self.lock().take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        tracing::info!("sqlite store closed");
        Ok(())
    }

    fn is_ready(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let value: i64 = self.query_row(conn, SQL_IS_READY, (), |row| row.get(0))?;
            if value != 1 {
                return Err(StoreError::NotReady(value));
            }
            Ok(())
        })
    }
}
