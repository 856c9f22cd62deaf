//! Durable snapshot of a [`MemoryLedger`]
//!
//! A snapshot is one JSON document:
//!
//! ```text
//! {"format_version":1,"height":N,"checksum":C,"collections":{name:{key:base64}}}
//! ```
//!
//! `checksum` is the CRC32 of the serialized `collections` object. Loading
//! verifies it and refuses to open a ledger whose contents do not match.
//! Saving writes a sibling temp file and renames it over the target, so a
//! crash mid-save leaves the previous snapshot intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::errors::{LedgerError, LedgerResult};
use super::keys::Collection;
use super::memory::{CollectionMap, MemoryLedger};

const FORMAT_VERSION: u32 = 1;

type EncodedCollections = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    format_version: u32,
    height: u64,
    checksum: u32,
    collections: EncodedCollections,
}

/// CRC32 (IEEE) over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn encode(collections: &CollectionMap) -> EncodedCollections {
    collections
        .iter()
        .map(|(name, entries)| {
            let encoded = entries
                .iter()
                .map(|(key, value)| (key.clone(), STANDARD.encode(value)))
                .collect();
            (name.clone(), encoded)
        })
        .collect()
}

fn decode(collections: EncodedCollections) -> LedgerResult<CollectionMap> {
    let mut decoded = CollectionMap::new();
    for (name, entries) in collections {
        if Collection::from_name(&name).is_none() {
            return Err(LedgerError::Corrupted(format!(
                "unknown collection '{}'",
                name
            )));
        }
        let mut values = BTreeMap::new();
        for (key, value) in entries {
            let bytes = STANDARD.decode(value.as_bytes()).map_err(|e| {
                LedgerError::Corrupted(format!("{}/{}: invalid base64: {}", name, key, e))
            })?;
            values.insert(key, bytes);
        }
        decoded.insert(name, values);
    }
    Ok(decoded)
}

impl MemoryLedger {
    /// Writes the committed state to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> LedgerResult<()> {
        let path = path.as_ref();
        let collections = encode(&self.collections);
        let checksum = compute_checksum(&serde_json::to_vec(&collections)?);

        let file = SnapshotFile {
            format_version: FORMAT_VERSION,
            height: self.height,
            checksum,
            collections,
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Reads a snapshot written by [`MemoryLedger::save`]
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        let file: SnapshotFile = serde_json::from_slice(&bytes)
            .map_err(|e| LedgerError::Corrupted(format!("unreadable snapshot: {}", e)))?;

        if file.format_version != FORMAT_VERSION {
            return Err(LedgerError::Corrupted(format!(
                "unsupported format_version {}",
                file.format_version
            )));
        }

        let actual = compute_checksum(&serde_json::to_vec(&file.collections)?);
        if actual != file.checksum {
            return Err(LedgerError::Corrupted(format!(
                "checksum mismatch: expected {:08x}, computed {:08x}",
                file.checksum, actual
            )));
        }

        Ok(MemoryLedger {
            collections: decode(file.collections)?,
            height: file.height,
        })
    }

    /// Loads `path` if it exists, otherwise starts empty
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }
}
