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

//! Console line recognition for vote plugins

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static VOTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)Vote \(from:(\S+) username:(\S+) address:").ok());

static VOTING_PLUGIN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)service site '([^']+)' by player '([^']+)'").ok());

/// A vote recognised in a console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEvent {
    /// Player who voted
    pub player: String,
    /// Voting site or service name as reported by the plugin
    pub service: String,
    /// Whether the vote came from PlanetMinecraft
    pub is_pmc: bool,
}

impl VoteEvent {
    /// Create an event, deriving `is_pmc` from the service name
    pub fn new(player: impl Into<String>, service: impl Into<String>) -> Self {
        let service = service.into();
        let lower = service.to_lowercase();
        let is_pmc = lower.contains("planetminecraft") || lower.contains("pmc");
        Self {
            player: player.into(),
            service,
            is_pmc,
        }
    }
}

/// Recognise a Votifier or VotingPlugin vote line.
///
/// Returns `None` for unrelated lines and for lines that carry a plugin
/// marker but do not match that plugin's layout.
///
/// ```
/// use craftlink_votelog::parse_vote_line;
///
/// let event = parse_vote_line(
///     "[Votifier] Got a protocol v1 vote record -> Vote (from:PlanetMinecraft.com username:Alex address:1.2.3.4",
/// )
/// .unwrap();
/// assert_eq!(event.player, "Alex");
/// assert!(event.is_pmc);
/// ```
pub fn parse_vote_line(line: &str) -> Option<VoteEvent> {
    let lower = line.to_lowercase();

    if lower.contains("[votifier]")
        || (lower.contains("protocol v1 vote record") && lower.contains("vote (from:"))
    {
        let captures = VOTIFIER.as_ref()?.captures(line);
        return match captures {
            Some(caps) => {
                let event = VoteEvent::new(&caps[2], &caps[1]);
                debug!(player = %event.player, service = %event.service, "Parsed Votifier vote");
                Some(event)
            }
            None => {
                trace!(line, "Votifier marker without vote record");
                None
            }
        };
    }

    if lower.contains("[votingplugin]")
        || (lower.contains("received a vote from service site") && lower.contains("by player"))
    {
        let captures = VOTING_PLUGIN.as_ref()?.captures(line);
        return match captures {
            Some(caps) => {
                let event = VoteEvent::new(&caps[2], &caps[1]);
                debug!(player = %event.player, service = %event.service, "Parsed VotingPlugin vote");
                Some(event)
            }
            None => {
                trace!(line, "VotingPlugin marker without vote record");
                None
            }
        };
    }

    None
}
