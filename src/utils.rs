use chrono::{DateTime, Utc};

pub mod db {
    use anyhow::Result;
    use rusqlite::{OptionalExtension, Transaction};

    pub fn init_metadata_and_get_version(tx: &Transaction) -> Result<i32> {
        let create_db_metadata_sql = "
        CREATE TABLE IF NOT EXISTS `db_metadata` (
        `key`	TEXT NOT NULL,
        `value`	TEXT,
        PRIMARY KEY(`key`)
        )";
        tx.execute(create_db_metadata_sql, ())?;

        let version_str: Option<String> = tx
            .query_row(
                "SELECT `value` FROM `db_metadata` WHERE key='version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(match version_str {
            None => 0,
            Some(s) => s.parse()?,
        })
    }

    pub fn set_version_in_metadata(tx: &Transaction, version: i32) -> Result<()> {
        tx.execute(
            "INSERT OR REPLACE INTO `db_metadata` (key, value) VALUES (?1, ?2)",
            ("version", version.to_string()),
        )?;
        Ok(())
    }
}

// Timestamps are stored as unix milliseconds so sessions started within the
// same second still order correctly.
pub fn timestamp_ms_to_datetime(timestamp_ms: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp_ms))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::timestamp_ms_to_datetime;

    #[test]
    fn timestamp_ms() {
        let time = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        assert_eq!(
            timestamp_ms_to_datetime(time.timestamp_millis()).unwrap(),
            time
        );
        assert!(timestamp_ms_to_datetime(i64::MAX).is_err());
    }
}
