use std::io::Write;
use std::path::Path;

use rusqlite::blob::ZeroBlob;
use rusqlite::{params, Connection, DatabaseName, Error, OpenFlags, Row};

use crate::domain::Storage;
use kernel::Report;

const CACHE_SIZE: &str = "4096";

pub enum Mode {
    ReadWrite,
    ReadOnly,
}

pub struct Sqlite {
    conn: Connection,
}

impl Storage for Sqlite {
    type Err = Error;

    fn new_database(&self) -> Result<(), Self::Err> {
        self.pragma_update("encoding", "UTF-8")?;

        self.conn.execute(
            "CREATE TABLE report (
                  id           TEXT PRIMARY KEY,
                  sender_name  TEXT NOT NULL,
                  age          INTEGER NOT NULL,
                  job          TEXT NOT NULL,
                  file_url     TEXT
                  )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE blob (
                  key           TEXT PRIMARY KEY,
                  content_type  TEXT NOT NULL,
                  data          BLOB NOT NULL
                  )",
            [],
        )?;

        Ok(())
    }

    fn get_reports(&mut self) -> Result<Vec<Report>, Self::Err> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, sender_name, age, job, file_url FROM report")?;
        let reports = stmt.query_map([], row_to_report)?;
        reports.collect()
    }

    fn get_report(&mut self, id: &str) -> Result<Report, Self::Err> {
        self.conn.query_row(
            "SELECT id, sender_name, age, job, file_url FROM report WHERE id = ?1",
            params![id],
            row_to_report,
        )
    }

    fn insert_report(&mut self, report: &Report) -> Result<(), Self::Err> {
        self.pragma_update("synchronous", "FULL")?;
        self.conn.execute(
            "INSERT INTO report (id, sender_name, age, job, file_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                report.id,
                report.sender_name,
                report.age,
                report.job,
                report.file_url
            ],
        )?;
        Ok(())
    }

    fn update_report(&mut self, report: &Report) -> Result<usize, Self::Err> {
        self.pragma_update("synchronous", "FULL")?;
        self.conn.execute(
            "UPDATE report SET sender_name = ?2, age = ?3, job = ?4, file_url = ?5 WHERE id = ?1",
            params![
                report.id,
                report.sender_name,
                report.age,
                report.job,
                report.file_url
            ],
        )
    }

    fn delete_report(&mut self, id: &str) -> Result<usize, Self::Err> {
        self.conn
            .execute("DELETE FROM report WHERE id = ?1", params![id])
    }

    fn put_blob(&mut self, key: &str, content_type: &str, data: Vec<u8>) -> Result<usize, Self::Err> {
        self.assign_cache_size()?;
        self.pragma_update("synchronous", "FULL")?;

        let tx = self.conn.transaction()?;

        // Overwrite semantics: a key holds exactly one blob.
        tx.execute("DELETE FROM blob WHERE key = ?1", params![key])?;

        let len = data.len() as i32;
        tx.execute(
            "INSERT INTO blob (key, content_type, data) VALUES (?1, ?2, ?3)",
            params![key, content_type, &ZeroBlob(len)],
        )?;

        let rowid = tx.last_insert_rowid();

        let mut blob = tx.blob_open(DatabaseName::Main, "blob", "data", rowid, false)?;
        let bytes_written = data.len();
        match blob.write_all(&data) {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("{e}");
            }
        }
        blob.flush().unwrap_or_default();
        blob.close()?;

        tx.commit()?;

        Ok(bytes_written)
    }

    fn get_blob(&self, key: &str) -> Result<(String, Vec<u8>), Self::Err> {
        self.conn.query_row(
            "SELECT content_type, data FROM blob WHERE key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
    }

    fn delete_blob(&mut self, key: &str) -> Result<usize, Self::Err> {
        self.conn
            .execute("DELETE FROM blob WHERE key = ?1", params![key])
    }
}

fn row_to_report(row: &Row<'_>) -> Result<Report, Error> {
    Ok(Report {
        id: row.get(0)?,
        sender_name: row.get(1)?,
        age: row.get(2)?,
        job: row.get(3)?,
        file_url: row.get(4)?,
        file: None,
    })
}

impl Sqlite {
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode) -> Result<Self, Error> {
        let c = match mode {
            Mode::ReadWrite => Connection::open(path),
            Mode::ReadOnly => Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY),
        };
        Ok(Self { conn: c? })
    }

    fn assign_cache_size(&self) -> Result<(), Error> {
        self.pragma_update("cache_size", CACHE_SIZE)
    }

    fn pragma_update(&self, name: &str, value: &str) -> Result<(), Error> {
        self.conn.pragma_update(None, name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::env;
    use std::path::PathBuf;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                abcdefghijklmnopqrstuvwxyz\
                                0123456789_";

    fn new_db() -> PathBuf {
        let name: String = (0..12)
            .map(|_| {
                let idx = rand::thread_rng().gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();
        let db = env::temp_dir().join(name + ".db");
        Sqlite::open(db.clone(), Mode::ReadWrite)
            .unwrap()
            .new_database()
            .unwrap();
        db
    }

    fn report(id: &str, file_url: Option<&str>) -> Report {
        Report {
            id: id.to_owned(),
            sender_name: String::from("Alice"),
            age: 30,
            job: String::from("Engineer"),
            file_url: file_url.map(str::to_owned),
            file: None,
        }
    }

    #[test]
    fn report_roundtrip() {
        // Arrange
        let db = new_db();
        let mut storage = Sqlite::open(&db, Mode::ReadWrite).unwrap();

        // Act
        storage.insert_report(&report("r1", None)).unwrap();
        let fetched = storage.get_report("r1").unwrap();

        // Assert
        assert_eq!(fetched.sender_name, "Alice");
        assert_eq!(fetched.age, 30);
        assert_eq!(fetched.file_url, None);
        std::fs::remove_file(db).unwrap_or_default();
    }

    #[test]
    fn get_report_missing_is_no_rows() {
        // Arrange
        let db = new_db();
        let mut storage = Sqlite::open(&db, Mode::ReadWrite).unwrap();

        // Act
        let result = storage.get_report("nope");

        // Assert
        assert!(matches!(result, Err(Error::QueryReturnedNoRows)));
        std::fs::remove_file(db).unwrap_or_default();
    }

    #[test]
    fn put_blob_overwrites_by_key() {
        // Arrange
        let db = new_db();
        let mut storage = Sqlite::open(&db, Mode::ReadWrite).unwrap();

        // Act
        storage
            .put_blob("report.txt", "text/plain", b"first".to_vec())
            .unwrap();
        storage
            .put_blob("report.txt", "text/plain", b"second".to_vec())
            .unwrap();
        let (content_type, data) = storage.get_blob("report.txt").unwrap();

        // Assert
        assert_eq!(content_type, "text/plain");
        assert_eq!(data, b"second");
        std::fs::remove_file(db).unwrap_or_default();
    }

    #[test]
    fn delete_blob_removes_data() {
        // Arrange
        let db = new_db();
        let mut storage = Sqlite::open(&db, Mode::ReadWrite).unwrap();
        storage
            .put_blob("gone.txt", "text/plain", b"bye".to_vec())
            .unwrap();

        // Act
        let deleted = storage.delete_blob("gone.txt").unwrap();

        // Assert
        assert_eq!(deleted, 1);
        assert!(storage.get_blob("gone.txt").is_err());
        std::fs::remove_file(db).unwrap_or_default();
    }
}
