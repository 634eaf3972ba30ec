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

//! Property tests for vote line and batch parsing

use craftlink_votelog::{VoteEvent, VoteLogEntry, parse_batch, parse_vote_line};
use proptest::prelude::*;

fn entries() -> impl Strategy<Value = Vec<VoteLogEntry>> {
    proptest::collection::vec(
        (1u64..1_000_000, proptest::option::of(any::<u64>()), "[ -~]{0,40}").prop_map(
            |(seq, time, line)| VoteLogEntry { seq, time, line },
        ),
        0..16,
    )
}

proptest! {
    #[test]
    fn arbitrary_lines_never_panic(line in "\\PC{0,120}") {
        let _ = parse_vote_line(&line);
    }

    #[test]
    fn votingplugin_lines_yield_player_and_site(
        player in "[A-Za-z0-9_]{1,16}",
        site in "[A-Za-z0-9. ]{1,24}",
    ) {
        let line = format!("[VotingPlugin] Received a vote from service site '{site}' by player '{player}'!");
        prop_assert_eq!(parse_vote_line(&line), Some(VoteEvent::new(player, site)));
    }

    #[test]
    fn votifier_lines_yield_player_and_service(
        player in "[A-Za-z0-9_]{1,16}",
        service in "[A-Za-z0-9.]{1,24}",
    ) {
        let line = format!(
            "[Votifier] Got a protocol v1 vote record from /127.0.0.1:1 -> Vote (from:{service} username:{player} address:127.0.0.1 timeStamp:0 additionalData:null)"
        );
        prop_assert_eq!(parse_vote_line(&line), Some(VoteEvent::new(player, service)));
    }

    #[test]
    fn batches_survive_surrounding_text(
        batch in entries(),
        prefix in "[^\\[\\]]{0,24}",
        suffix in "[^\\[\\]]{0,24}",
    ) {
        let response = format!("{prefix}{}{suffix}", serde_json::to_string(&batch).unwrap());
        prop_assert_eq!(parse_batch(&response).unwrap(), batch);
    }

    #[test]
    fn arbitrary_responses_never_panic(response in "\\PC{0,200}") {
        let _ = parse_batch(&response);
    }
}
