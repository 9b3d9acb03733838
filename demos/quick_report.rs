//! Calls both RestV1 endpoints and reports how each call went.
//!
//! Run with: `cargo run --example quick_report -- http://localhost:8080/api`

use restv1::{Client, Error};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ReqQuick {
    server: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RespQuick {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ReqReport {
    server: String,
    uptime_secs: u64,
    load: Vec<f32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restv1=debug,quick_report=info")
        .init();

    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/api".to_string());

    let client = Client::new(&base, Duration::from_secs(5), 3)?;
    println!("Talking to {}", client.base_url());

    println!("=== Quick ===");
    let quick = ReqQuick {
        server: "db-01".to_string(),
    };
    match client.quick::<_, RespQuick>(&quick).await {
        Ok(response) => {
            println!("Response: {:?}", response.data);
            println!("Attempts: {}", response.attempts);
            println!("Latency: {:?}", response.latency);
        }
        Err(e) => println!("Quick failed: {}", e),
    }
    println!();

    println!("=== Report ===");
    let report = ReqReport {
        server: "db-01".to_string(),
        uptime_secs: 86_400,
        load: vec![0.42, 0.37, 0.30],
    };
    match client.report::<_, serde_json::Value>(&report).await {
        Ok(response) => println!("Response: {}", response.raw_body),
        Err(Error::RateLimited { retry_after, .. }) => {
            println!("Rate limited, try again in {:?}", retry_after);
        }
        Err(Error::Conflict { .. }) => {
            println!("The previous report for this server is still being stored");
        }
        Err(e) => match e.status() {
            Some(status) => println!("Server answered {}: {}", status, e),
            None => println!("Report failed: {}", e),
        },
    }

    Ok(())
}
