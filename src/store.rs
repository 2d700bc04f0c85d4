use std::path::PathBuf;

use rusqlite::{params, Connection, Row, Transaction};
use serde::Serialize;

use crate::db_meta;
use crate::error::{Error, Result};
use crate::schema;
use crate::tune::Tune;

/// A tune as stored, with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTune {
    pub tune_id: i64,
    #[serde(flatten)]
    pub tune: Tune,
}

pub struct StoreSource {
    db_path: PathBuf,
}

/// An open connection to the tune database. The connection is closed when
/// the `Store` is dropped.
pub struct Store {
    conn: Connection,
}

impl StoreSource {
    pub fn create(db_path: PathBuf) -> Result<StoreSource> {
        info!("using '{}'", db_path.to_string_lossy());

        let source = StoreSource { db_path };

        let mut store = source.get()?;
        db_meta::ensure_schema(&mut store.conn, schema::TUNE_SCHEMA)?;

        Ok(source)
    }

    pub fn get(&self) -> Result<Store> {
        let conn = match Connection::open(&self.db_path) {
            Ok(c) => c,
            Err(e) => {
                error!(
                    "can't open sqlite database '{}': {}",
                    self.db_path.to_string_lossy(),
                    e
                );
                return Err(Error::DatabaseOpen {
                    path: self.db_path.clone(),
                    source: e,
                });
            }
        };

        conn.execute_batch("PRAGMA journal_mode = WAL;")?;

        Ok(Store { conn })
    }
}

const TUNE_COLUMNS: &str =
    "tune_id, book, file_path, x, title, rhythm, meter, key, raw_text";

impl Store {
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    fn _get_tune(row: &Row) -> rusqlite::Result<StoredTune> {
        Ok(StoredTune {
            tune_id: row.get(0)?,
            tune: Tune {
                book: row.get(1)?,
                file_path: row.get(2)?,
                index: row.get(3)?,
                title: row.get(4)?,
                rhythm: row.get(5)?,
                meter: row.get(6)?,
                key: row.get(7)?,
                raw_text: row.get(8)?,
            },
        })
    }

    pub fn clear_all(&self) -> Result<()> {
        debug!("clear all tunes");

        clear_all(&self.conn)
    }

    /// Inserts `tunes` in order inside one transaction.
    pub fn insert_many(&mut self, tunes: &[Tune]) -> Result<()> {
        let tx = self.conn.transaction()?;
        insert_many(&tx, tunes)?;
        tx.commit()?;
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<StoredTune>> {
        trace!("load all tunes");

        let mut st = self.conn.prepare(&format!(
            "SELECT {} FROM Tune ORDER BY tune_id",
            TUNE_COLUMNS
        ))?;

        let tunes = st
            .query_map([], Self::_get_tune)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tunes)
    }

    pub fn tune(&self, tune_id: i64) -> Result<Option<StoredTune>> {
        trace!("get tune tune_id={}", tune_id);

        let mut st = self.conn.prepare(&format!(
            "SELECT {} FROM Tune WHERE tune_id = ?",
            TUNE_COLUMNS
        ))?;

        let mut rows = st.query(params![tune_id])?;

        if let Some(row) = rows.next()? {
            Ok(Some(Self::_get_tune(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(tune_id) FROM Tune", [], |row| row.get(0))?)
    }
}

/// Deletes every tune. Takes a plain connection so it can run inside a
/// rebuild-wide transaction as well.
pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM Tune", [])?;
    Ok(())
}

pub fn insert_many(tx: &Transaction, tunes: &[Tune]) -> Result<()> {
    let mut st = tx.prepare_cached(
        "INSERT INTO Tune (book, file_path, x, title, rhythm, meter, key, raw_text)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )?;

    for tune in tunes {
        st.execute(params![
            tune.book,
            tune.file_path,
            tune.index,
            tune.title,
            tune.rhythm,
            tune.meter,
            tune.key,
            tune.raw_text,
        ])?;
    }

    trace!("inserted {} tunes", tunes.len());

    Ok(())
}
