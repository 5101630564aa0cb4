use crate::core::channel::{ChannelRecord, dedup_key};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE: &str = "pet_channels.csv";

/// In-memory channel table, ordered as on disk and indexed by dedup key.
#[derive(Debug, Default, Clone)]
pub struct ChannelDatabase {
    records: Vec<ChannelRecord>,
    index: HashMap<String, usize>,
}

impl ChannelDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ChannelRecord>) -> Result<Self> {
        let mut db = Self::new();
        for record in records {
            let key = dedup_key(&record.channel_url)?;
            if db.index.contains_key(&key) {
                return Err(Error::DuplicateChannel(record.channel_url));
            }
            db.index.insert(key, db.records.len());
            db.records.push(record);
        }
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ChannelRecord] {
        &self.records
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ChannelRecord> {
        self.index.get(key).map(|&idx| &mut self.records[idx])
    }

    /// Appends a record under `key`. Callers check for an existing entry first.
    pub(crate) fn push(&mut self, key: String, record: ChannelRecord) {
        debug_assert!(!self.index.contains_key(&key));
        self.index.insert(key, self.records.len());
        self.records.push(record);
    }
}

/// Whole-file CSV persistence for [`ChannelDatabase`].
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full database. A missing file is an empty database; any
    /// read or parse problem is returned as an error.
    pub fn load(&self) -> Result<ChannelDatabase> {
        if !self.path.exists() {
            tracing::info!("No channel database at {}, starting empty", self.path.display());
            return Ok(ChannelDatabase::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let records = reader
            .deserialize::<ChannelRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let db = ChannelDatabase::from_records(records)?;
        tracing::info!("Loaded {} channels from {}", db.len(), self.path.display());
        Ok(db)
    }

    /// Overwrites the file with every record, in order.
    pub fn save(&self, db: &ChannelDatabase) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&self.path)?;

        if db.is_empty() {
            writer.write_record(HEADER)?;
        }
        for record in db.records() {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!("Saved {} channels to {}", db.len(), self.path.display());
        Ok(())
    }
}

const HEADER: [&str; 6] = [
    "channel_url",
    "keywords",
    "country",
    "first_seen",
    "last_seen",
    "recommendation_count",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::Country;
    use chrono::NaiveDate;

    fn record(url: &str, count: u32) -> ChannelRecord {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let mut record =
            ChannelRecord::new(url.to_string(), &["pets, cats".to_string()], Country::Us, day);
        record.recommendation_count = count;
        record
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("absent.csv"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("channels.csv"));
        let records = vec![record("https://www.tiktok.com/@doggo", 3)];
        let db = ChannelDatabase::from_records(records).unwrap();

        store.save(&db).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            written,
            "channel_url,keywords,country,first_seen,last_seen,recommendation_count\n\
             https://www.tiktok.com/@doggo,\"pets, cats\",US,2025-01-15,2025-01-15,3\n"
        );
    }

    #[test]
    fn empty_database_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("channels.csv"));
        store.save(&ChannelDatabase::new()).unwrap();

        let written = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            written,
            "channel_url,keywords,country,first_seen,last_seen,recommendation_count\n"
        );
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn load_preserves_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("channels.csv"));
        let db = ChannelDatabase::from_records(vec![
            record("https://www.tiktok.com/@zebra", 1),
            record("https://www.tiktok.com/@aardvark", 2),
        ])
        .unwrap();
        store.save(&db).unwrap();

        let loaded = store.load().unwrap();
        let urls: Vec<&str> = loaded.records().iter().map(|r| r.channel_url.as_str()).collect();
        assert_eq!(urls, ["https://www.tiktok.com/@zebra", "https://www.tiktok.com/@aardvark"]);
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let result = ChannelDatabase::from_records(vec![
            record("https://www.tiktok.com/@doggo", 1),
            record("HTTPS://www.tiktok.com/@DOGGO/", 1),
        ]);
        assert!(matches!(result, Err(Error::DuplicateChannel(_))));
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.csv");
        fs::write(
            &path,
            "channel_url,keywords,country,first_seen,last_seen,recommendation_count\n\
             https://www.tiktok.com/@doggo,pets,US,yesterday,today,many\n",
        )
        .unwrap();

        assert!(CsvStore::new(path).load().is_err());
    }
}
