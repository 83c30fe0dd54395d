// src/payload.rs
//! The decrypted payload: a nested ZIP of named entries
//!
//! Entry order is significant and preserved across a rebuild. A subset of the
//! entries are chat records, recognised by name alone:
//!
//! ```text
//! Chats/<id>.arcx.json
//! ```
//!
//! Only chat records are ever eligible for removal. Every other entry is
//! copied through with the same name, bytes and position.

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use tracing::{debug, warn};
use zeroize::Zeroize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::aliases::PlainText;
use crate::consts::{CHAT_PREFIX, CHAT_SUFFIX};
use crate::error::CoreError;
use crate::filter::ChatVerdict;

pub type Result<T> = std::result::Result<T, CoreError>;

const EOCD_SIGNATURE: &[u8] = b"PK\x05\x06";
const EOCD_LEN: usize = 22;
const ZIP64_LOCATOR_SIGNATURE: &[u8] = b"PK\x06\x07";
const ZIP64_LOCATOR_LEN: usize = 20;
const ZIP64_EOCD_SIGNATURE: &[u8] = b"PK\x06\x06";
const ZIP64_EOCD_LEN: usize = 56;

/// True for entry names of the form `Chats/<id>.arcx.json`
pub fn is_chat_record(name: &str) -> bool {
    name.starts_with(CHAT_PREFIX) && name.ends_with(CHAT_SUFFIX)
}

/// One named blob inside the payload. Bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PayloadEntry {
    name: String,
    data: Vec<u8>,
}

impl PayloadEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    pub fn is_chat_record(&self) -> bool {
        is_chat_record(&self.name)
    }
}

impl std::fmt::Debug for PayloadEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadEntry")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

impl Drop for PayloadEntry {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

/// Result of [`PayloadArchive::rebuild`]
pub struct Rebuilt {
    /// Freshly serialized payload ZIP
    pub payload: PlainText,
    /// Chat records dropped by the filter
    pub removed: usize,
    /// Chat records left in the payload (malformed ones included)
    pub kept_chats: usize,
    /// Chat records that could not be parsed and were passed through
    pub malformed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PayloadArchive {
    entries: Vec<PayloadEntry>,
}

impl PayloadArchive {
    /// Parse a payload ZIP into its entries, in archive order
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| CoreError::CorruptPayload(e.to_string()))?;

        // ZipArchive indexes by name, so same-named entries collapse into one
        let declared = declared_entry_count(bytes).ok_or_else(|| {
            CoreError::CorruptPayload("unreadable end of central directory".into())
        })?;
        if declared != zip.len() as u64 {
            return Err(CoreError::CorruptPayload(format!(
                "{declared} entries listed but only {} distinct names",
                zip.len()
            )));
        }

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .map_err(|e| CoreError::CorruptPayload(e.to_string()))?;
            let name = file.name().to_owned();

            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| CoreError::CorruptPayload(format!("{name}: {e}")))?;
            entries.push(PayloadEntry { name, data });
        }

        debug!(entries = entries.len(), "payload opened");
        Ok(Self { entries })
    }

    /// Build a payload from entries; names must be unique
    pub fn from_entries(entries: impl IntoIterator<Item = PayloadEntry>) -> Result<Self> {
        let entries: Vec<PayloadEntry> = entries.into_iter().collect();
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.name()) {
                return Err(CoreError::CorruptPayload(format!(
                    "duplicate entry {}",
                    entry.name()
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PayloadEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name() == name)
            .map(PayloadEntry::data)
    }

    pub fn chat_records(&self) -> impl Iterator<Item = &PayloadEntry> {
        self.entries.iter().filter(|e| e.is_chat_record())
    }

    /// Serialize every entry, unchanged, into a new ZIP
    pub fn to_bytes(&self) -> Result<PlainText> {
        write_entries(self.entries.iter())
    }

    /// Re-serialize the payload, asking `decide` about each chat record
    ///
    /// `decide` is only consulted for chat records; all other entries are
    /// copied through in place.
    pub fn rebuild<F>(&self, mut decide: F) -> Result<Rebuilt>
    where
        F: FnMut(&PayloadEntry) -> ChatVerdict,
    {
        let mut removed = 0;
        let mut kept_chats = 0;
        let mut malformed = 0;

        let mut survivors = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.is_chat_record() {
                match decide(entry) {
                    ChatVerdict::Drop { assistant_messages } => {
                        debug!(name = entry.name(), assistant_messages, "dropping chat");
                        removed += 1;
                        continue;
                    }
                    ChatVerdict::Malformed => {
                        warn!(name = entry.name(), "chat record unreadable, keeping as-is");
                        malformed += 1;
                    }
                    ChatVerdict::Keep { .. } => {}
                }
                kept_chats += 1;
            }
            survivors.push(entry);
        }

        Ok(Rebuilt {
            payload: write_entries(survivors.into_iter())?,
            removed,
            kept_chats,
            malformed,
        })
    }
}

/// Entry count recorded in the end-of-central-directory record
///
/// Follows the ZIP64 locator when the classic field is saturated.
fn declared_entry_count(bytes: &[u8]) -> Option<u64> {
    let last = bytes.len().checked_sub(EOCD_LEN)?;
    let first = last.saturating_sub(u16::MAX as usize);
    let eocd = (first..=last).rev().find(|&pos| {
        bytes[pos..].starts_with(EOCD_SIGNATURE)
            && pos + EOCD_LEN + usize::from(read_u16(bytes, pos + 20)) == bytes.len()
    })?;

    let total = read_u16(bytes, eocd + 10);
    if total != u16::MAX {
        return Some(u64::from(total));
    }

    let locator = eocd.checked_sub(ZIP64_LOCATOR_LEN)?;
    if !bytes[locator..].starts_with(ZIP64_LOCATOR_SIGNATURE) {
        return Some(u64::from(total));
    }
    let record = usize::try_from(read_u64(bytes, locator + 8)?).ok()?;
    let header = bytes.get(record..record.checked_add(ZIP64_EOCD_LEN)?)?;
    if !header.starts_with(ZIP64_EOCD_SIGNATURE) {
        return None;
    }
    read_u64(header, 32)
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let raw = bytes.get(at..at + 8)?;
    Some(u64::from_le_bytes(raw.try_into().ok()?))
}

fn write_entries<'a>(entries: impl Iterator<Item = &'a PayloadEntry>) -> Result<PlainText> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        if entry.is_dir() {
            zip.add_directory(entry.name(), options)
                .map_err(std::io::Error::other)?;
        } else {
            zip.start_file(entry.name(), options)
                .map_err(std::io::Error::other)?;
            zip.write_all(entry.data())?;
        }
    }

    let cursor = zip.finish().map_err(std::io::Error::other)?;
    Ok(PlainText::new(cursor.into_inner()))
}
