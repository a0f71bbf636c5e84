use crate::errors::StoreError;
use crate::models::{Record, RECORD_COLUMNS};
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Record),
    Empty,
}

/// The CSV record table, newest row first.
///
/// Reads and read-modify-write cycles are serialized within one process, so
/// a reader never sees a half-written table. Nothing guards the file against
/// a second process.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every row. A missing file, or a header that lacks any of the
    /// expected columns, loads as an empty table.
    pub async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let _guard = self.lock.lock().await;
        read_table(&self.path).await
    }

    /// Inserts `record` as the first row and rewrites the table.
    pub async fn append(&self, record: Record) -> Result<Vec<Record>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut rows = read_table(&self.path).await?;
        rows.insert(0, record);
        write_table(&self.path, &rows).await?;
        info!(rows = rows.len(), "record appended");
        Ok(rows)
    }

    /// Removes the most recently appended record, which is the first row.
    pub async fn delete_latest(&self) -> Result<DeleteOutcome, StoreError> {
        let _guard = self.lock.lock().await;
        let mut rows = read_table(&self.path).await?;
        if rows.is_empty() {
            return Ok(DeleteOutcome::Empty);
        }

        let removed = rows.remove(0);
        write_table(&self.path, &rows).await?;
        info!(rows = rows.len(), seat = %removed.seat, "latest record deleted");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Newest `limit` rows, restricted to `user` when given.
    pub async fn preview(&self, user: Option<&str>, limit: usize) -> Result<Vec<Record>, StoreError> {
        let rows = {
            let _guard = self.lock.lock().await;
            read_table(&self.path).await?
        };
        Ok(rows
            .into_iter()
            .filter(|row| user.is_none_or(|user| row.user == user))
            .take(limit)
            .collect())
    }
}

async fn read_table(path: &Path) -> Result<Vec<Record>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => parse_table(&bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

async fn write_table(path: &Path, rows: &[Record]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, encode_table(rows)?).await?;
    Ok(())
}

fn parse_table(bytes: &[u8]) -> Result<Vec<Record>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let positions: Option<Vec<usize>> = RECORD_COLUMNS
        .iter()
        .map(|column| headers.iter().position(|header| header == *column))
        .collect();
    let Some(positions) = positions else {
        if !headers.is_empty() {
            warn!(header = ?headers, "record table schema mismatch, treating as empty");
        }
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let projected: StringRecord = positions
            .iter()
            .map(|&index| row.get(index).unwrap_or(""))
            .collect();
        rows.push(projected.deserialize::<Record>(None)?);
    }
    Ok(rows)
}

fn encode_table(rows: &[Record]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(RECORD_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn record(seat: &str, user: &str) -> Record {
        Record {
            user: user.to_string(),
            date: "2026-10-18".to_string(),
            shop: "サンシャイン豊見城店".to_string(),
            machine: "ハナハナホウオウ〜天翔〜".to_string(),
            seat: seat.to_string(),
            spins: 1500,
            big_count: 2,
            reg_count: 3,
            big_rate: "833.3".to_string(),
            reg_rate: "625.0".to_string(),
            combined_rate: "357.1".to_string(),
            coin_diff: 500,
            payout: "約 8925円".to_string(),
            memo: "設定6, 朝一".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_places_new_record_first() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));

        store.append(record("101", "default_user")).await.unwrap();
        store.append(record("102", "default_user")).await.unwrap();
        let before = store.load().await.unwrap();

        store.append(record("103", "default_user")).await.unwrap();
        let after = store.load().await.unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], record("103", "default_user"));
        assert_eq!(after[1..], before[..]);
    }

    #[tokio::test]
    async fn written_header_uses_fixed_columns() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        store.append(record("7", "default_user")).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(header, RECORD_COLUMNS.join(","));
    }

    #[tokio::test]
    async fn header_missing_a_column_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let header: Vec<&str> = RECORD_COLUMNS
            .iter()
            .copied()
            .filter(|column| *column != "メモ")
            .collect();
        let row = "u,2026-10-18,s,m,1,100,1,1,100.0,100.0,50.0,0,約 0円";
        std::fs::write(&path, format!("{}\n{}\n", header.join(","), row)).unwrap();

        let store = RecordStore::new(path);
        assert!(store.load().await.unwrap().is_empty());

        store.append(record("9", "u")).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reordered_and_extra_columns_are_projected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let mut header: Vec<&str> = RECORD_COLUMNS.to_vec();
        header.reverse();
        header.push("extra");
        let row = "memo,約 0円,-20,50.0,100.0,100.0,1,1,100,12,m,s,2026-10-18,u,ignored";
        std::fs::write(&path, format!("{}\n{}\n", header.join(","), row)).unwrap();

        let rows = RecordStore::new(path).load().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user, "u");
        assert_eq!(rows[0].seat, "12");
        assert_eq!(rows[0].coin_diff, -20);
        assert_eq!(rows[0].memo, "memo");
    }

    #[tokio::test]
    async fn delete_on_empty_table_reports_empty() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));

        assert_eq!(store.delete_latest().await.unwrap(), DeleteOutcome::Empty);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_most_recent_append() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        store.append(record("1", "a")).await.unwrap();
        store.append(record("2", "a")).await.unwrap();

        let outcome = store.delete_latest().await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted(record("2", "a")));
        assert_eq!(store.load().await.unwrap(), vec![record("1", "a")]);
    }

    #[tokio::test]
    async fn preview_filters_by_user_and_limits() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        for seat in 0..12 {
            store.append(record(&seat.to_string(), "a")).await.unwrap();
        }
        store.append(record("b-1", "b")).await.unwrap();

        let preview = store.preview(Some("a"), 10).await.unwrap();
        assert_eq!(preview.len(), 10);
        assert_eq!(preview[0].seat, "11");
        assert!(preview.iter().all(|row| row.user == "a"));

        let everyone = store.preview(None, 10).await.unwrap();
        assert_eq!(everyone[0].seat, "b-1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reads_never_observe_partial_writes() {
        let dir = tempdir().unwrap();
        let store = Arc::new(RecordStore::new(dir.path().join("records.csv")));
        let memo = "長いメモ".repeat(2_000);

        let writer = {
            let store = Arc::clone(&store);
            let memo = memo.clone();
            tokio::spawn(async move {
                for seat in 0..40 {
                    let mut row = record(&seat.to_string(), "a");
                    row.memo = memo.clone();
                    store.append(row).await.unwrap();
                }
            })
        };

        let mut last_len = 0;
        while !writer.is_finished() {
            let rows = store.preview(None, usize::MAX).await.unwrap();
            assert!(rows.len() >= last_len);
            assert!(rows.iter().all(|row| row.memo == memo));
            last_len = rows.len();
        }
        writer.await.unwrap();

        assert_eq!(store.load().await.unwrap().len(), 40);
    }
}
