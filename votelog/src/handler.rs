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

//! Vote event sink

use crate::{VoteEvent, VoteLogEntry};
use async_trait::async_trait;

/// Receives what the poller finds in the vote log.
///
/// # Example
///
/// ```no_run
/// use craftlink_votelog::{VoteEvent, VoteHandler};
/// use async_trait::async_trait;
///
/// struct Announcer;
///
/// #[async_trait]
/// impl VoteHandler for Announcer {
///     async fn on_vote(&self, event: VoteEvent) {
///         if event.is_pmc {
///             println!("Thank you {} for voting for us on PMC!", event.player);
///         } else {
///             println!("Thank you {} for voting on {}!", event.player, event.service);
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait VoteHandler: Send + Sync + 'static {
    /// Called once per recognised vote, in sequence order
    async fn on_vote(&self, event: VoteEvent);

    /// Called for every new non-empty console line, before vote recognition
    async fn on_line(&self, _entry: &VoteLogEntry) {}
}
