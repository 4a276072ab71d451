use crate::model::{PriceSample, StorageError};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, params};

/// Local cache of the fetched price series.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens the database and creates the tables if needed.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS prices (
                timestamp INTEGER PRIMARY KEY,
                price REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fetch_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fetched_at TEXT NOT NULL,
                samples INTEGER NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Replaces the cached series and records the fetch time.
    /// Later samples with a duplicate timestamp are dropped so the first one wins.
    pub fn replace_series(
        &mut self,
        samples: &[PriceSample],
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM prices", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO prices (timestamp, price) VALUES (?1, ?2)")?;
            for sample in samples {
                stmt.execute(params![sample.timestamp, sample.price])?;
            }
        }
        tx.execute(
            "INSERT INTO fetch_log (fetched_at, samples) VALUES (?1, ?2)",
            params![fetched_at.to_rfc3339(), samples.len() as i64],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Cached series in chronological order.
    pub fn load_series(&self) -> Result<Vec<PriceSample>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT timestamp, price FROM prices ORDER BY timestamp ASC")?;
        let rows = stmt.query_map([], |row| Ok(PriceSample::new(row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn last_fetched(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT fetched_at FROM fetch_log ORDER BY id DESC LIMIT 1")?;
        let mut rows = stmt.query([])?;

        if let Some(row) = rows.next()? {
            let fetched_at: String = row.get(0)?;
            let parsed = DateTime::parse_from_rfc3339(&fetched_at)
                .map_err(|e| StorageError::InvalidValue(format!("fetched_at: {}", e)))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        } else {
            Ok(None)
        }
    }

    /// True if the last fetch is younger than `max_age` relative to `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> Result<bool, StorageError> {
        Ok(self
            .last_fetched()?
            .is_some_and(|fetched| now.signed_duration_since(fetched) < max_age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn storage() -> SqliteStorage {
        SqliteStorage::new(":memory:").unwrap()
    }

    #[test]
    fn empty_cache_is_stale() {
        let s = storage();
        assert!(s.load_series().unwrap().is_empty());
        assert!(s.last_fetched().unwrap().is_none());
        assert!(!s.is_fresh(Duration::hours(12), Utc::now()).unwrap());
    }

    #[test]
    fn replace_series_round_trips_in_order() {
        let mut s = storage();
        let fetched = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        s.replace_series(
            &[PriceSample::new(2, 20.0), PriceSample::new(1, 10.0), PriceSample::new(2, 99.0)],
            fetched,
        )
        .unwrap();

        assert_eq!(
            s.load_series().unwrap(),
            vec![PriceSample::new(1, 10.0), PriceSample::new(2, 20.0)]
        );
        assert_eq!(s.last_fetched().unwrap(), Some(fetched));
    }

    #[test]
    fn replace_discards_previous_series() {
        let mut s = storage();
        let fetched = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        s.replace_series(&[PriceSample::new(1, 10.0)], fetched).unwrap();
        s.replace_series(&[PriceSample::new(5, 50.0)], fetched + Duration::hours(1))
            .unwrap();
        assert_eq!(s.load_series().unwrap(), vec![PriceSample::new(5, 50.0)]);
        assert_eq!(s.last_fetched().unwrap(), Some(fetched + Duration::hours(1)));
    }

    #[test]
    fn freshness_uses_max_age() {
        let mut s = storage();
        let fetched = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        s.replace_series(&[PriceSample::new(1, 10.0)], fetched).unwrap();
        assert!(s.is_fresh(Duration::hours(12), fetched + Duration::hours(11)).unwrap());
        assert!(!s.is_fresh(Duration::hours(12), fetched + Duration::hours(12)).unwrap());
    }
}
