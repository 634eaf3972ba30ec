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

//! `divotelog` response entries

use crate::VoteLogError;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of response characters kept in a parse-miss error
const MISS_PREVIEW_CHARS: usize = 200;

/// One buffered console line returned by `divotelog`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteLogEntry {
    /// Server-assigned sequence number, ascending
    #[serde(default, deserialize_with = "null_as_default")]
    pub seq: u64,
    /// Server timestamp in milliseconds
    #[serde(default)]
    pub time: Option<u64>,
    /// Raw console line
    #[serde(default, deserialize_with = "null_as_default")]
    pub line: String,
}

impl VoteLogEntry {
    /// Create an entry
    pub fn new(seq: u64, line: impl Into<String>) -> Self {
        Self {
            seq,
            time: None,
            line: line.into(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Extract the JSON array of entries from a `divotelog` response.
///
/// The server surrounds the array with human-readable text, so the slice
/// from the first `[` to the last `]` is parsed. A response without that
/// pair, or whose slice is not a JSON array of entries, is a
/// [`VoteLogError::ParseMiss`].
pub fn parse_batch(response: &str) -> Result<Vec<VoteLogEntry>, VoteLogError> {
    let (Some(start), Some(end)) = (response.find('['), response.rfind(']')) else {
        return Err(miss(response));
    };
    if end < start {
        return Err(miss(response));
    }
    serde_json::from_str(&response[start..=end]).map_err(|_| miss(response))
}

fn miss(response: &str) -> VoteLogError {
    VoteLogError::ParseMiss(response.chars().take(MISS_PREVIEW_CHARS).collect())
}
