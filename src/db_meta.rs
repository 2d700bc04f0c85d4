use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::schema;

/// Makes sure `schema` exists in `conn`, recording `schema::SCHEMA_VERSION`
/// in the meta table on first use. Safe to call on every start.
pub fn ensure_schema(conn: &mut Connection, schema: &str) -> Result<()> {
    trace!("trying to get schema version");

    conn.execute_batch(schema::META_SCHEMA)?;

    let schema_version: Option<String> = conn
        .query_row("SELECT CAST(value AS TEXT) FROM Tunedb WHERE key = 'schema'", [], |row| {
            row.get(0)
        })
        .optional()?;

    match schema_version {
        Some(version) => {
            if version.trim().parse::<u32>().ok() != Some(schema::SCHEMA_VERSION) {
                error!(
                    "schema version '{}' is not supported, expected {}",
                    version,
                    schema::SCHEMA_VERSION
                );
                return Err(Error::SchemaVersionMismatch {
                    expected: schema::SCHEMA_VERSION,
                    found: version,
                });
            }

            trace!("schema version {}", version);

            // Tables are created with IF NOT EXISTS, re-running is harmless
            conn.execute_batch(schema)?;
        }
        None => {
            info!("initializing schema version {}", schema::SCHEMA_VERSION);

            let tx = conn.transaction()?;
            tx.execute_batch(schema)?;
            tx.execute(
                "INSERT INTO Tunedb (key, value) VALUES ('schema', ?)",
                params![schema::SCHEMA_VERSION.to_string()],
            )?;
            tx.commit()?;
        }
    }

    Ok(())
}
