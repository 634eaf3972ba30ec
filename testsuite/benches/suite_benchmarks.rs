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

//! Integration Benchmarks for Craftlink
//!
//! Measures command round trips and vote log polls against the mock RCON
//! server over loopback.

use async_trait::async_trait;
use craftlink_client::{RconClient, RconConfig};
use craftlink_testsuite::MockRconServer;
use craftlink_votelog::{
    CursorStore, PollerConfig, VoteEvent, VoteHandler, VoteLogPoller, parse_batch,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

const PASSWORD: &str = "bench";

struct DiscardHandler;

#[async_trait]
impl VoteHandler for DiscardHandler {
    async fn on_vote(&self, event: VoteEvent) {
        black_box(event);
    }
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// Command Round Trips
// ============================================================================

fn bench_command_round_trip(c: &mut Criterion) {
    let rt = runtime();
    let (server, client) = rt.block_on(async {
        let server = MockRconServer::start(PASSWORD).await.unwrap();
        server.set_reply("list", "There are 3 of a max of 20 players online: a, b, c");
        let client = RconClient::new(RconConfig::default().with_endpoint(server.endpoint(PASSWORD)));
        assert!(client.connect().await);
        (server, client)
    });

    c.bench_function("command_round_trip", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(client.send_command("list").await.unwrap()) });
    });

    rt.block_on(async {
        client.disconnect().await;
        server.shutdown().await;
    });
}

// ============================================================================
// Vote Log Polling
// ============================================================================

fn bench_divotelog_batch(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("divotelog_batch");

    for size in [1usize, 50, 200] {
        let (server, client) = rt.block_on(async {
            let server = MockRconServer::start(PASSWORD).await.unwrap();
            for i in 0..size {
                server.push_vote_line(format!(
                    "[VotingPlugin] Received a vote from service site 'CraftRank' by player 'p{i}'!"
                ));
            }
            let client = RconClient::new(RconConfig::default().with_endpoint(server.endpoint(PASSWORD)));
            (server, client)
        });
        let command = format!("divotelog 0 {size}");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.to_async(&rt).iter(|| async {
                let response = client.send_command(&command).await.unwrap();
                black_box(parse_batch(&response).unwrap())
            });
        });

        rt.block_on(server.shutdown());
    }

    group.finish();
}

fn bench_process_batch(c: &mut Criterion) {
    let rt = runtime();
    let dir = tempfile::tempdir().unwrap();
    let client = Arc::new(RconClient::new(RconConfig::default()));
    let batch: Vec<_> = (1..=50u64)
        .map(|seq| {
            craftlink_votelog::VoteLogEntry::new(
                seq,
                format!("[VotingPlugin] Received a vote from service site 'CraftRank' by player 'p{seq}'!"),
            )
        })
        .collect();

    c.bench_function("process_batch_50", |b| {
        b.to_async(&rt).iter(|| async {
            let mut poller = VoteLogPoller::new(
                client.clone(),
                Arc::new(DiscardHandler),
                CursorStore::empty(dir.path().join("vote_state.json")),
                PollerConfig::default(),
            );
            // skip the backlog pass so every entry is emitted
            poller.process_batch(&[]).await;
            black_box(poller.process_batch(&batch).await)
        });
    });
}

criterion_group!(
    benches,
    bench_command_round_trip,
    bench_divotelog_batch,
    bench_process_batch,
);
criterion_main!(benches);
