//! Append-only journal for the guestbook collection
//!
//! Every create and delete is persisted before it is acknowledged. On
//! startup the journal is replayed to rebuild the collection.
//!
//! Format per record:
//! - length: u32 (4 bytes)
//! - data: [u8; length] (JSON-encoded `JournalRecord`)
//! - crc: u32 (4 bytes, CRC32 of length + data)

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::GuestbookEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Largest record accepted on replay
const MAX_RECORD_LEN: usize = 1_000_000;

/// Sync strategy for journal writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalSyncMode {
    /// Fsync after every record
    #[default]
    EveryWrite,
    /// Write without fsync, rely on the OS
    None,
}

/// One journaled mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalRecord {
    Created { entry: GuestbookEntry },
    Deleted { id: String },
}

/// Append-only journal file
pub struct Journal {
    file: File,
    path: PathBuf,
    record_count: u64,
    sync_mode: JournalSyncMode,
}

impl Journal {
    /// Open or create a journal file
    pub fn open(path: impl AsRef<Path>, sync_mode: JournalSyncMode) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let (records, valid_len) = Self::read_all(&path)?;
        let file_len = file.metadata()?.len();
        if valid_len < file_len {
            // Drop a damaged tail so new records are not appended after it
            tracing::warn!(
                path = ?path,
                valid_len,
                file_len,
                "Truncating damaged journal tail"
            );
            file.set_len(valid_len)?;
        }
        let record_count = records.len() as u64;

        Ok(Self {
            file,
            path,
            record_count,
            sync_mode,
        })
    }

    /// Append a record
    ///
    /// The record counts only once it is written (and synced, in
    /// `EveryWrite` mode). On failure the file is cut back to its previous
    /// length so a partly written record cannot resurface on replay.
    pub fn append(&mut self, record: &JournalRecord) -> StoreResult<()> {
        let mut frame = Vec::new();
        Self::write_record(&mut frame, record)?;

        let committed_len = self.file.metadata()?.len();
        if let Err(e) = self.write_frame(&frame) {
            self.rollback(committed_len);
            return Err(e);
        }
        self.record_count += 1;
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> StoreResult<()> {
        self.file.write_all(frame)?;
        if self.sync_mode == JournalSyncMode::EveryWrite {
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn rollback(&mut self, committed_len: u64) {
        if let Err(e) = self.file.set_len(committed_len) {
            tracing::error!(
                path = ?self.path,
                committed_len,
                error = %e,
                "Failed to roll back journal append"
            );
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> StoreResult<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Rebuild the live collection from the journal
    pub fn recover(&self) -> StoreResult<HashMap<String, GuestbookEntry>> {
        let (records, _) = Self::read_all(&self.path)?;
        Ok(replay(records))
    }

    /// Rewrite the journal so it holds only `live` entries
    pub fn compact(&mut self, live: &[GuestbookEntry]) -> StoreResult<()> {
        let tmp_path = self.path.with_extension("compact");
        {
            let mut tmp = BufWriter::new(File::create(&tmp_path)?);
            for entry in live {
                Self::write_record(
                    &mut tmp,
                    &JournalRecord::Created {
                        entry: entry.clone(),
                    },
                )?;
            }
            tmp.flush()?;
            tmp.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.record_count = live.len() as u64;

        tracing::info!(path = ?self.path, records = self.record_count, "Journal compacted");
        Ok(())
    }

    /// Number of records currently in the journal
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Path of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record<W: Write>(writer: &mut W, record: &JournalRecord) -> StoreResult<()> {
        let data = serde_json::to_vec(record)?;
        let len = (data.len() as u32).to_le_bytes();

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&len);
        hasher.update(&data);
        let crc = hasher.finalize();

        writer.write_all(&len)?;
        writer.write_all(&data)?;
        writer.write_all(&crc.to_le_bytes())?;
        Ok(())
    }

    /// Read every intact record, stopping at the first damaged one.
    /// Also returns the byte length covered by the intact records.
    fn read_all(path: &Path) -> StoreResult<(Vec<JournalRecord>, u64)> {
        if !path.exists() {
            return Ok((Vec::new(), 0));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        let mut valid_len = 0u64;

        loop {
            match Self::read_record_from(&mut reader) {
                Ok(Some((record, size))) => {
                    records.push(record);
                    valid_len += size;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Journal replay stopped at record {}: {}", records.len(), e);
                    break;
                }
            }
        }

        Ok((records, valid_len))
    }

    /// Read one record and its framed size in bytes
    fn read_record_from<R: Read>(reader: &mut R) -> StoreResult<Option<(JournalRecord, u64)>> {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_buf) as usize;

        if len > MAX_RECORD_LEN {
            return Err(StoreError::Corruption(format!(
                "Record length too large: {}",
                len
            )));
        }

        let mut data = vec![0u8; len];
        reader.read_exact(&mut data)?;

        let mut crc_buf = [0u8; 4];
        reader.read_exact(&mut crc_buf)?;
        let stored_crc = u32::from_le_bytes(crc_buf);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&len_buf);
        hasher.update(&data);
        let computed_crc = hasher.finalize();

        if stored_crc != computed_crc {
            return Err(StoreError::Corruption(format!(
                "CRC mismatch: stored={}, computed={}",
                stored_crc, computed_crc
            )));
        }

        let record = serde_json::from_slice(&data)?;
        Ok(Some((record, 8 + len as u64)))
    }
}

/// Apply records in order
pub fn replay(records: Vec<JournalRecord>) -> HashMap<String, GuestbookEntry> {
    let mut live = HashMap::new();
    for record in records {
        match record {
            JournalRecord::Created { entry } => {
                live.insert(entry.id.clone(), entry);
            }
            JournalRecord::Deleted { id } => {
                live.remove(&id);
            }
        }
    }
    live
}
