//! End-to-end draft benchmark for Huddle.
//!
//! Connects observers to a running server over WebSocket, drafts players
//! `1..=N` from one extra connection and reports how long each draft takes to
//! reach every observer.
//!
//! Usage: `e2e_draft [observers] [players] [url]`. Start the server first
//! with a fresh draft; already-drafted players come back declined.

use futures_util::{SinkExt, StreamExt};
use huddle_protocol::{codec, ClientFrame, ServerFrame};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Barrier};
use tokio_tungstenite::{connect_async, tungstenite::Message};

const DEFAULT_URL: &str = "ws://127.0.0.1:3001/ws";
const RECV_TIMEOUT: Duration = Duration::from_secs(10);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let observers: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(16);
    let players: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let url = args.get(3).cloned().unwrap_or_else(|| DEFAULT_URL.to_string());

    println!("Huddle end-to-end draft benchmark");
    println!("  server:    {}", url);
    println!("  observers: {}", observers);
    println!("  players:   {}", players);
    println!();

    if let Err(e) = run(&url, observers, players).await {
        eprintln!("benchmark failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(url: &str, observers: usize, players: u64) -> Result<(), BoxError> {
    let barrier = Arc::new(Barrier::new(observers + 1));
    let (arrivals_tx, mut arrivals_rx) = mpsc::unbounded_channel::<(u64, Instant)>();

    let mut handles = Vec::with_capacity(observers);
    for observer in 0..observers {
        let url = url.to_string();
        let barrier = Arc::clone(&barrier);
        let arrivals = arrivals_tx.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = run_observer(&url, players, barrier, arrivals).await {
                eprintln!("observer {} error: {}", observer, e);
            }
        }));
    }
    drop(arrivals_tx);

    barrier.wait().await;
    println!("All {} observers connected", observers);

    let (ws, _) = connect_async(url).await?;
    let (mut sender, mut receiver) = ws.split();
    // Connected frame
    receiver.next().await;

    let mut sent_at = Vec::with_capacity(players as usize);
    let mut declined = 0u64;
    let start = Instant::now();

    for player_id in 1..=players {
        let frame = ClientFrame::draft(Some(player_id), player_id);
        sent_at.push(Instant::now());
        sender.send(Message::Text(codec::encode(&frame)?)).await?;

        // Wait for the reply so drafts stay in order.
        loop {
            let Some(msg) = tokio::time::timeout(RECV_TIMEOUT, receiver.next()).await? else {
                return Err("drafter connection closed".into());
            };
            let Message::Text(text) = msg? else { continue };
            match codec::decode::<ServerFrame>(text.as_bytes())? {
                ServerFrame::Ack { .. } => break,
                ServerFrame::Declined { .. } => {
                    declined += 1;
                    break;
                }
                _ => {}
            }
        }
    }
    let draft_elapsed = start.elapsed();

    let mut latencies = Vec::new();
    while let Ok(Some((player_id, at))) =
        tokio::time::timeout(RECV_TIMEOUT, arrivals_rx.recv()).await
    {
        if let Some(sent) = sent_at.get(player_id.saturating_sub(1) as usize) {
            latencies.push(at.saturating_duration_since(*sent));
        }
        if latencies.len() as u64 == (players - declined) * observers as u64 {
            break;
        }
    }

    for handle in handles {
        handle.abort();
    }

    report(players, declined, observers, draft_elapsed, &mut latencies);
    Ok(())
}

async fn run_observer(
    url: &str,
    players: u64,
    barrier: Arc<Barrier>,
    arrivals: mpsc::UnboundedSender<(u64, Instant)>,
) -> Result<(), BoxError> {
    let (ws, _) = connect_async(url).await?;
    let (_sender, mut receiver) = ws.split();

    // Connected frame
    receiver.next().await;
    barrier.wait().await;

    while let Some(msg) = receiver.next().await {
        let Message::Text(text) = msg? else { continue };
        let frame: ServerFrame = codec::decode(text.as_bytes())?;
        if let ServerFrame::Draft { player_id, .. } = frame {
            let _ = arrivals.send((player_id, Instant::now()));
            if player_id == players {
                break;
            }
        }
    }
    Ok(())
}

fn report(
    players: u64,
    declined: u64,
    observers: usize,
    elapsed: Duration,
    latencies: &mut [Duration],
) {
    latencies.sort_unstable();
    let percentile = |p: f64| -> Duration {
        if latencies.is_empty() {
            return Duration::ZERO;
        }
        let idx = ((latencies.len() - 1) as f64 * p).round() as usize;
        latencies[idx]
    };

    println!();
    println!("Results");
    println!("  drafts:        {} ({} declined)", players, declined);
    println!("  draft time:    {:.2}s", elapsed.as_secs_f64());
    println!(
        "  drafts/s:      {:.0}",
        players as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("  deliveries:    {} to {} observers", latencies.len(), observers);
    println!("  latency p50:   {:?}", percentile(0.50));
    println!("  latency p99:   {:?}", percentile(0.99));
    println!("  latency max:   {:?}", percentile(1.0));
}
