//! Integration tests for the explicit responder endpoints
//!
//! Exercises both spoofed families against a store loaded from a JSON blob,
//! verifying status codes and reply shapes endpoint by endpoint.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tronmock::api::{build_router, AppState};
use tronmock::responses::{token, Defaults};
use tronmock::store::RecordStore;

fn server_with_blob(dir: &TempDir, blob: &Value) -> TestServer {
    let path = dir.path().join("pegasus.json");
    std::fs::write(&path, serde_json::to_string(blob).unwrap()).unwrap();

    let store = Arc::new(RecordStore::new(path));
    store.load();

    let state = AppState {
        store,
        defaults: Defaults {
            sentinel_block: 45_000_000,
        },
    };
    TestServer::new(build_router(state)).expect("Failed to create test server")
}

fn scenario_blob() -> Value {
    json!({
        "abc123": {
            "blockNumber": 45_000_001u64,
            "timestamp": 1_700_000_000_000i64,
            "transferLog": {
                "transfer": { "from": "TA", "to": "TB", "amount": "500000" }
            }
        }
    })
}

#[tokio::test]
async fn transaction_info_round_trips_the_source_blob() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server.get("/api/transaction-info?hash=abc123").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["hash"], "abc123");
    assert_eq!(body["block"], 45_000_001u64);
    assert_eq!(body["timestamp"], 1_700_000_000_000i64);
    assert_eq!(body["confirmed"], true);
    assert_eq!(body["confirmations"], 100);
    assert_eq!(body["contractRet"][0]["contractRet"], "SUCCESS");
    assert_eq!(body["transfers"][0]["from"], "TA");
    assert_eq!(body["transfers"][0]["to"], "TB");
    assert_eq!(body["transfers"][0]["amount"], "500000");
    assert_eq!(body["transfers"][0]["contract_address"], token::CONTRACT);

    let response = server.get("/api/transaction-info?hash=ffff00").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn account_wallet_reports_balance_or_not_found() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server.get("/api/account/wallet?address=TB").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["address"], "TB");
    let tokens = body["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0]["balance"], "500000");
    assert_eq!(tokens[0]["token_name"], "TetherToken");
    assert_eq!(tokens[0]["token_abbr"], "USDT");
    assert_eq!(tokens[0]["token_decimal"], 6);
    assert_eq!(tokens[0]["token_type"], "trc20");

    // Never appearing and appearing with nothing inbound are the same: 404.
    let response = server.get("/api/account/wallet?address=TZ").await;
    assert_eq!(response.status_code(), 404);
    let response = server.get("/api/account/wallet?address=TA").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn balance_sums_every_inbound_transfer() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(
        &dir,
        &json!({
            "h1": { "transferLog": { "transfer": { "from": "TA", "to": "TB", "amount": "500000" } } },
            "h2": { "transferLog": { "transfer": { "from": "TC", "to": "TB", "amount": "250000" } } },
            "h3": { "transferLog": { "transfer": { "from": "TB", "to": "TD", "amount": "9" } } }
        }),
    );

    let response = server.get("/api/account/wallet?address=TB").await;
    let body: Value = response.json();
    assert_eq!(body["tokens"][0]["balance"], "750000");
}

#[tokio::test]
async fn contract_triggers_batch_filters_by_contract_and_hash_list() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server
        .post("/api/contracts/smart-contract-triggers-batch")
        .json(&json!({
            "hashList": ["abc123", "missing"],
            "contractAddress": token::CONTRACT,
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    let event = &body["data"][0];
    assert_eq!(event["transaction_id"], "abc123");
    assert_eq!(event["event_name"], "Transfer");
    assert_eq!(event["block_number"], 45_000_001u64);
    assert_eq!(event["result"]["from"], "TA");
    assert_eq!(event["result"]["to"], "TB");
    assert_eq!(event["result"]["value"], "500000");

    // Foreign contract: nothing to report.
    let response = server
        .post("/api/contracts/smart-contract-triggers-batch")
        .json(&json!({ "hashList": ["abc123"], "contractAddress": "TRother" }))
        .await;
    assert_eq!(response.status_code(), 404);

    // A malformed body degrades to no fields, which means no contract match.
    let response = server
        .post("/api/contracts/smart-contract-triggers-batch")
        .text("{not json")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn token_analysis_honors_the_trailing_window() {
    let dir = TempDir::new().unwrap();
    // The scenario timestamp (Nov 2023) is far older than one day.
    let server = server_with_blob(&dir, &scenario_blob());

    let url = format!("/api/tokenTransfer/analysis?token={}&days=1", token::CONTRACT);
    let response = server.get(&url).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn token_analysis_aggregates_recent_transfers() {
    let dir = TempDir::new().unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    let server = server_with_blob(
        &dir,
        &json!({
            "r1": {
                "timestamp": now - 1_000,
                "transferLog": { "transfer": { "from": "TA", "to": "TB", "amount": "300" } }
            },
            "r2": {
                "timestamp": now - 2_000,
                "transferLog": { "transfer": { "from": "TC", "to": "TD", "amount": "100" } }
            }
        }),
    );

    let url = format!("/api/tokenTransfer/analysis?token={}&days=1", token::CONTRACT);
    let response = server.get(&url).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["token"], token::CONTRACT);
    assert_eq!(body["total_volume"], "400");
    assert_eq!(body["transfer_count"], 2);
    assert_eq!(body["avg_amount"], "200");
    assert_eq!(body["days"], 1);

    // Foreign token: 404 regardless of data.
    let response = server
        .get("/api/tokenTransfer/analysis?token=TRother&days=1")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn token_analysis_defaults_to_a_ten_day_window() {
    let dir = TempDir::new().unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    const DAY_MS: i64 = 86_400_000;
    let server = server_with_blob(
        &dir,
        &json!({
            "recent": {
                "timestamp": now - 5 * DAY_MS,
                "transferLog": { "transfer": { "from": "TA", "to": "TB", "amount": "300" } }
            },
            "ancient": {
                "timestamp": now - 30 * DAY_MS,
                "transferLog": { "transfer": { "from": "TC", "to": "TD", "amount": "100" } }
            }
        }),
    );

    // No days parameter: the window is ten days, wide enough for the
    // five-day-old transfer but not the thirty-day-old one.
    let url = format!("/api/tokenTransfer/analysis?token={}", token::CONTRACT);
    let response = server.get(&url).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["days"], 10);
    assert_eq!(body["total_volume"], "300");
    assert_eq!(body["transfer_count"], 1);
}

#[tokio::test]
async fn token_analysis_tolerates_a_non_numeric_window() {
    let dir = TempDir::new().unwrap();
    let now = chrono::Utc::now().timestamp_millis();
    let server = server_with_blob(
        &dir,
        &json!({
            "r1": {
                "timestamp": now - 1_000,
                "transferLog": { "transfer": { "from": "TA", "to": "TB", "amount": "300" } }
            }
        }),
    );

    // Unparseable days degrades to the ten-day default, same as the
    // versioned path through the catch-all tree.
    let url = format!(
        "/api/tokenTransfer/analysis?token={}&days=soon",
        token::CONTRACT
    );
    let response = server.get(&url).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["days"], 10);
    assert_eq!(body["total_volume"], "300");

    let url = format!(
        "/api/v2/tokenTransfer/analysis?token={}&days=soon",
        token::CONTRACT
    );
    let response = server.get(&url).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["days"], 10);
}

#[tokio::test]
async fn wallet_getaccount_hex_encodes_balances() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server
        .post("/wallet/getaccount")
        .json(&json!({ "address": "TB" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["address"], "TB");
    // 500000 = 0x7a120
    assert_eq!(body["balance"], "0x7a120");
    assert_eq!(body["trc20"][token::CONTRACT], "0x7a120");

    let response = server
        .post("/wallet/getaccount")
        .json(&json!({ "address": "TZ" }))
        .await;
    assert_eq!(response.status_code(), 404);

    // Missing field: best-effort parse yields no address, hence no data.
    let response = server.post("/wallet/getaccount").json(&json!({})).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn trigger_constant_contract_simulates_balance_of() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server
        .post("/wallet/triggerconstantcontract")
        .json(&json!({
            "contract_address": token::CONTRACT,
            "owner_address": "TB",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["constant_result"][0], "7a120");

    // Zero balance and foreign contract both read as "nothing to report".
    let response = server
        .post("/wallet/triggerconstantcontract")
        .json(&json!({ "contract_address": token::CONTRACT, "owner_address": "TZ" }))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .post("/wallet/triggerconstantcontract")
        .json(&json!({ "contract_address": "TRother", "owner_address": "TB" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn gettransactionbyid_confirms_known_hashes() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(&dir, &scenario_blob());

    let response = server
        .post("/wallet/gettransactionbyid")
        .json(&json!({ "value": "abc123" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["txID"], "abc123");
    assert_eq!(body["ret"][0]["contractRet"], "SUCCESS");

    let response = server
        .post("/wallet/gettransactionbyid")
        .json(&json!({ "value": "ffff00" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn malformed_stored_amount_fails_the_touched_aggregation() {
    let dir = TempDir::new().unwrap();
    let server = server_with_blob(
        &dir,
        &json!({
            "bad": { "transferLog": { "transfer": { "from": "TA", "to": "TB", "amount": "12x34" } } }
        }),
    );

    let response = server.get("/api/account/wallet?address=TB").await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    // Generic message only; no store detail leaks to the caller.
    assert_eq!(body["error"], "internal server error");

    // Lookups that never parse the amount are unaffected.
    let response = server
        .post("/wallet/gettransactionbyid")
        .json(&json!({ "value": "bad" }))
        .await;
    assert_eq!(response.status_code(), 200);
}
