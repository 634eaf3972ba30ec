//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Persisted vote log cursors
//!
//! The state file maps `host:port` to the last processed sequence number:
//!
//! ```json
//! {
//!   "mc.example.com:25575": {
//!     "last_seq": 42,
//!     "updated_at": "2026-01-01T12:00:00Z"
//!   }
//! }
//! ```
//!
//! Every write goes to a sibling `.tmp` file which is synced and renamed over
//! the real file, so a crash leaves either the old or the new state.

use crate::CursorError;
use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Cursor for one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Highest sequence number already processed
    #[serde(default)]
    pub last_seq: u64,
    /// When `last_seq` last moved. An unreadable stamp loads as the load time.
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Offset-less stamps written by other tools, read as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = value.as_str().and_then(parse_timestamp);
    if parsed.is_none() {
        trace!(%value, "Unreadable cursor timestamp");
    }
    Ok(parsed.unwrap_or_else(Utc::now))
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Cursor map backed by a JSON file.
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
    cursors: BTreeMap<String, Cursor>,
}

impl CursorStore {
    /// An empty store that will write to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cursors: BTreeMap::new(),
        }
    }

    /// Load the store from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CursorError> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cursor file, starting empty");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(e.into()),
        };
        let cursors = if text.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&text)?
        };
        debug!(path = %path.display(), endpoints = cursors.len(), "Loaded cursor file");
        Ok(Self { path, cursors })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last processed sequence for `key`, or 0
    pub fn last_seq(&self, key: &str) -> u64 {
        self.cursors.get(key).map_or(0, |cursor| cursor.last_seq)
    }

    /// Full cursor for `key`
    pub fn cursor(&self, key: &str) -> Option<&Cursor> {
        self.cursors.get(key)
    }

    /// Move `key` forward to `seq` and write the file.
    ///
    /// Does nothing and returns `false` when `seq` is not greater than the
    /// stored value, so the cursor never moves backwards.
    pub fn advance(&mut self, key: &str, seq: u64) -> Result<bool, CursorError> {
        if self.cursors.get(key).is_some_and(|cursor| cursor.last_seq >= seq) {
            trace!(key, seq, "Cursor already at or past sequence");
            return Ok(false);
        }
        self.cursors.insert(
            key.to_string(),
            Cursor {
                last_seq: seq,
                updated_at: Utc::now(),
            },
        );
        self.save()?;
        debug!(key, last_seq = seq, "Persisted cursor");
        Ok(true)
    }

    /// Atomically write the whole map to disk
    pub fn save(&self) -> Result<(), CursorError> {
        let content = serde_json::to_string_pretty(&self.cursors)?;
        atomic_write(&self.path, &content)?;
        counter!("craftlink.votelog.cursor_writes").increment(1);
        Ok(())
    }
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::load(dir.path().join("vote_state.json")).unwrap();
        assert_eq!(store.last_seq("h:25575"), 0);
        assert!(store.cursor("h:25575").is_none());
    }

    #[test]
    fn survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("vote_state.json");

        let mut store = CursorStore::load(&path).unwrap();
        assert!(store.advance("h:25575", 42).unwrap());

        let reloaded = CursorStore::load(&path).unwrap();
        assert_eq!(reloaded.last_seq("h:25575"), 42);
        assert_eq!(reloaded.last_seq("other:25575"), 0);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn never_moves_backwards() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CursorStore::empty(dir.path().join("state.json"));
        assert!(store.advance("h:1", 10).unwrap());
        assert!(!store.advance("h:1", 10).unwrap());
        assert!(!store.advance("h:1", 3).unwrap());
        assert_eq!(store.last_seq("h:1"), 10);
    }

    #[test]
    fn file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = CursorStore::empty(&path);
        store.advance("mc:25575", 7).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mc:25575"]["last_seq"], 7);
        let stamp = value["mc:25575"]["updated_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
    }

    #[test]
    fn reads_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"mc:25575": {"last_seq": 311, "updated_at": "2025-06-01T10:00:00.123456+00:00"}, "old:1": {"last_seq": 2}}"#,
        )
        .unwrap();
        let store = CursorStore::load(&path).unwrap();
        assert_eq!(store.last_seq("mc:25575"), 311);
        assert_eq!(store.last_seq("old:1"), 2);
    }

    #[test]
    fn offset_less_timestamp_keeps_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"h:25575": {"last_seq": 42, "updated_at": "2025-06-01T10:00:00.123456"}, "other:1": {"last_seq": 9, "updated_at": "2025-06-01 10:00:00"}}"#,
        )
        .unwrap();

        let mut store = CursorStore::load(&path).unwrap();
        assert_eq!(store.last_seq("h:25575"), 42);
        let stamp = store.cursor("h:25575").unwrap().updated_at;
        assert_eq!(stamp.to_rfc3339(), "2025-06-01T10:00:00.123456+00:00");

        assert!(store.advance("h:25575", 43).unwrap());
        let reloaded = CursorStore::load(&path).unwrap();
        assert_eq!(reloaded.last_seq("h:25575"), 43);
        assert_eq!(reloaded.last_seq("other:1"), 9);
    }

    #[test]
    fn unreadable_timestamp_keeps_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"h:25575": {"last_seq": 42, "updated_at": "last tuesday"}, "h:2": {"last_seq": 5, "updated_at": 1717236000}, "h:3": {"last_seq": 6, "updated_at": null}}"#,
        )
        .unwrap();

        let store = CursorStore::load(&path).unwrap();
        assert_eq!(store.last_seq("h:25575"), 42);
        assert_eq!(store.last_seq("h:2"), 5);
        assert_eq!(store.last_seq("h:3"), 6);
    }

    #[test]
    fn corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            CursorStore::load(&path),
            Err(CursorError::Corrupt(_))
        ));
    }

    #[test]
    fn blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "\n").unwrap();
        assert_eq!(CursorStore::load(&path).unwrap().last_seq("h:1"), 0);
    }
}
