//! Load probe: concurrent visitors against a running gateway.
//! Each visitor keeps its own cookie jar (one session), sends its questions in order,
//! then clears its chat. Run with the gateway up: cargo run --bin load_probe

use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const CONCURRENT_VISITORS: usize = 8;
const TURNS_PER_VISITOR: usize = 4;

const QUESTIONS: &[&str] = &[
    "What are your skills?",
    "Tell me about your projects",
    "What did you do at your research internship?",
    "Which cloud platforms have you used?",
    "What certifications do you hold?",
    "Have you published any papers?",
    "How can I contact you?",
    "What are you studying?",
];

#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("PORTFOLIO_PROBE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    println!(
        "[load_probe] {} visitors x {} turns = {} chat requests against {}",
        CONCURRENT_VISITORS,
        TURNS_PER_VISITOR,
        CONCURRENT_VISITORS * TURNS_PER_VISITOR,
        base_url
    );

    let success = Arc::new(AtomicU32::new(0));
    let failure = Arc::new(AtomicU32::new(0));
    let latencies: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for visitor in 0..CONCURRENT_VISITORS {
        let base_url = base_url.clone();
        let success = Arc::clone(&success);
        let failure = Arc::clone(&failure);
        let latencies = Arc::clone(&latencies);

        handles.push(tokio::spawn(async move {
            let client = match Client::builder().cookie_store(true).build() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("[load_probe] visitor {}: client init failed: {}", visitor, e);
                    return;
                }
            };

            for turn in 0..TURNS_PER_VISITOR {
                let question = QUESTIONS[(visitor + turn) % QUESTIONS.len()];
                let start = Instant::now();
                let res = client
                    .post(format!("{}/api/chat", base_url))
                    .json(&json!({ "message": question }))
                    .send()
                    .await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match res {
                    Ok(resp) if resp.status().is_success() => {
                        success.fetch_add(1, Ordering::Relaxed);
                        latencies.lock().await.push(elapsed_ms);
                    }
                    Ok(resp) => {
                        failure.fetch_add(1, Ordering::Relaxed);
                        eprintln!(
                            "[load_probe] visitor {} turn {}: HTTP {}",
                            visitor,
                            turn,
                            resp.status()
                        );
                    }
                    Err(e) => {
                        failure.fetch_add(1, Ordering::Relaxed);
                        eprintln!("[load_probe] visitor {} turn {}: {}", visitor, turn, e);
                    }
                }
            }

            let _ = client.post(format!("{}/api/clear", base_url)).send().await;
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    let s = success.load(Ordering::Relaxed);
    let f = failure.load(Ordering::Relaxed);
    let total = s + f;
    let success_rate = if total > 0 { (s as f64 / total as f64) * 100.0 } else { 0.0 };
    let latencies = latencies.lock().await;
    let avg_latency_ms = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<u64>() as f64 / latencies.len() as f64
    };

    println!(
        "[load_probe] Success rate: {:.1}% | Average latency: {:.0}ms",
        success_rate, avg_latency_ms
    );
    println!("[load_probe] Total: {} | Success: {} | Failure: {}", total, s, f);
}
