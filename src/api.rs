//! HTTP surface for the mock responder
//!
//! Dispatches inbound requests across two spoofed API families (the
//! explorer tree under `/api`, the node-RPC tree under `/wallet` and
//! `/v1`) plus health and refresh routes. Known endpoints get explicit
//! routes; everything else under a family prefix lands in that family's
//! fallback, which walks an ordered pattern table (most specific first) and
//! otherwise answers with the family's "nothing to report" shape. Unknown
//! routes never surface an error to the caller.

use axum::{
    extract::{OriginalUri, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregate::{self, Direction};
use crate::error::StoreError;
use crate::responses::{self, token, Defaults};
use crate::store::RecordStore;

const DEFAULT_ANALYSIS_DAYS: i64 = 10;

/// Shared handler state: the swappable record table plus the defaulting
/// policy applied at synthesis time.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub defaults: Defaults,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// The requested hash/address/contract is not in the store. Expected
    /// and frequent; rendered as a bare 404, never logged as an error.
    NotFound,
    /// Store-integrity failure (e.g. a malformed stored amount). Logged in
    /// full, reported to the caller as a generic server error with no store
    /// detail.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store integrity failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
struct HashQuery {
    hash: String,
}

#[derive(Deserialize)]
struct AddressQuery {
    address: String,
}

#[derive(Deserialize)]
struct AnalysisQuery {
    token: String,
    #[serde(default = "default_days", deserialize_with = "lenient_days")]
    days: i64,
}

fn default_days() -> i64 {
    DEFAULT_ANALYSIS_DAYS
}

/// A non-numeric `days` degrades to the default instead of rejecting the
/// whole query, matching the lenient-input policy of the fallback tree.
fn lenient_days<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or(DEFAULT_ANALYSIS_DAYS))
}

#[derive(Debug, Default, Deserialize)]
struct BatchTriggersRequest {
    #[serde(default, rename = "hashList")]
    hash_list: Vec<String>,
    #[serde(default, rename = "contractAddress")]
    contract_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GetAccountRequest {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TriggerContractRequest {
    #[serde(default)]
    contract_address: Option<String>,
    #[serde(default)]
    owner_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TransactionByIdRequest {
    #[serde(default)]
    value: Option<String>,
}

/// Best-effort body parse. A malformed or absent body degrades to "no
/// fields extracted"; the request still gets a response.
fn lenient_body<T: DeserializeOwned + Default>(body: &str) -> T {
    serde_json::from_str(body).unwrap_or_default()
}

// ============================================================================
// Fallback Pattern Tables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanRoute {
    ContractEvents,
    TransactionInfo,
    AccountWallet,
    TokenAnalysis,
    Trc20Transfers,
    AccountTransactions,
}

/// Explorer-family patterns, ordered most-specific-first. The first entry
/// whose segments all appear in the request path (in order) wins, so the
/// batch-triggers pattern must stay ahead of the generic account ones.
const SCAN_ROUTES: &[(&[&str], ScanRoute)] = &[
    (
        &["contracts", "smart-contract-triggers-batch"],
        ScanRoute::ContractEvents,
    ),
    (&["transaction-info"], ScanRoute::TransactionInfo),
    (&["account", "wallet"], ScanRoute::AccountWallet),
    (&["tokenTransfer", "analysis"], ScanRoute::TokenAnalysis),
    (&["token_trc20", "transfers"], ScanRoute::Trc20Transfers),
    (&["account", "transactions"], ScanRoute::AccountTransactions),
    (&["accounts", "transactions"], ScanRoute::AccountTransactions),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridRoute {
    GetAccount,
    TriggerConstantContract,
    GetTransactionById,
    ContractEvents,
    AccountTransactions,
}

/// Node-RPC-family patterns, same matching rules as [`SCAN_ROUTES`].
const GRID_ROUTES: &[(&[&str], GridRoute)] = &[
    (&["wallet", "getaccount"], GridRoute::GetAccount),
    (
        &["wallet", "triggerconstantcontract"],
        GridRoute::TriggerConstantContract,
    ),
    (&["wallet", "gettransactionbyid"], GridRoute::GetTransactionById),
    (&["contracts", "events"], GridRoute::ContractEvents),
    (&["accounts", "transactions"], GridRoute::AccountTransactions),
    (&["account", "transactions"], GridRoute::AccountTransactions),
];

/// True when every pattern segment appears as a path segment, in order.
fn path_matches(path: &str, pattern: &[&str]) -> bool {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    pattern.iter().all(|want| segments.any(|seg| seg == *want))
}

fn match_route<R: Copy>(path: &str, table: &[(&[&str], R)]) -> Option<R> {
    table
        .iter()
        .find(|(pattern, _)| path_matches(path, pattern))
        .map(|(_, route)| *route)
}

/// Positional field extraction: the path segment following any of the given
/// keywords (e.g. the address after `accounts`).
fn segment_after<'a>(path: &'a str, keywords: &[&str]) -> Option<&'a str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    segments
        .windows(2)
        .find(|w| keywords.contains(&w[0]))
        .map(|w| w[1])
}

// ============================================================================
// Core Responders
// ============================================================================
//
// Shared between the explicit routes and the family fallbacks, so both
// dispatch paths produce byte-identical replies.

fn respond_transaction_info(state: &AppState, hash: &str) -> Result<Json<Value>, ApiError> {
    let records = state.store.snapshot();
    let record = records.get(hash).ok_or(ApiError::NotFound)?;
    Ok(Json(responses::transaction_info(
        hash,
        record,
        &state.defaults,
        now_ms(),
    )))
}

fn respond_account_wallet(state: &AppState, address: &str) -> Result<Json<Value>, ApiError> {
    let records = state.store.snapshot();
    let (balance, matched) = aggregate::balance_of(&records, address)?;
    if !matched {
        return Err(ApiError::NotFound);
    }
    Ok(Json(responses::wallet_tokens(address, balance)))
}

fn respond_contract_events(
    state: &AppState,
    request: &BatchTriggersRequest,
) -> Result<Json<Value>, ApiError> {
    // Events exist only for the tracked token contract.
    if request.contract_address.as_deref() != Some(token::CONTRACT) {
        return Err(ApiError::NotFound);
    }
    Ok(respond_events_for(state, &request.hash_list))
}

fn respond_events_for(state: &AppState, hashes: &[String]) -> Json<Value> {
    let records = state.store.snapshot();
    let events: Vec<_> = aggregate::events_for_hashes(&records, hashes).collect();
    Json(responses::contract_events(&events, &state.defaults, now_ms()))
}

fn respond_token_analysis(
    state: &AppState,
    token_addr: &str,
    days: i64,
) -> Result<Json<Value>, ApiError> {
    if token_addr != token::CONTRACT {
        return Err(ApiError::NotFound);
    }
    let records = state.store.snapshot();
    let stats =
        aggregate::transfers_in_window(&records, days, now_ms())?.ok_or(ApiError::NotFound)?;
    Ok(Json(responses::token_analysis(token_addr, &stats, days)))
}

fn respond_rpc_account(state: &AppState, address: Option<&str>) -> Result<Json<Value>, ApiError> {
    let address = address.ok_or(ApiError::NotFound)?;
    let records = state.store.snapshot();
    let (balance, matched) = aggregate::balance_of(&records, address)?;
    if !matched {
        return Err(ApiError::NotFound);
    }
    Ok(Json(responses::rpc_account(address, balance)))
}

fn respond_constant_call(
    state: &AppState,
    contract: Option<&str>,
    owner: Option<&str>,
) -> Result<Json<Value>, ApiError> {
    if contract != Some(token::CONTRACT) {
        return Err(ApiError::NotFound);
    }
    let owner = owner.ok_or(ApiError::NotFound)?;
    let records = state.store.snapshot();
    let (balance, _) = aggregate::balance_of(&records, owner)?;
    // A zero balance is "nothing to report" for a balanceOf call.
    if balance.is_zero() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(responses::constant_result(balance)))
}

fn respond_transaction_by_id(
    state: &AppState,
    txid: Option<&str>,
) -> Result<Json<Value>, ApiError> {
    let txid = txid.ok_or(ApiError::NotFound)?;
    let records = state.store.snapshot();
    if !records.contains_key(txid) {
        return Err(ApiError::NotFound);
    }
    Ok(Json(responses::transaction_by_id(txid)))
}

fn respond_account_transactions(state: &AppState, address: Option<&str>) -> Json<Value> {
    let records = state.store.snapshot();
    let matches: Vec<_> = match address {
        Some(addr) => aggregate::transfers_involving(&records, addr, Direction::Either).collect(),
        None => Vec::new(),
    };
    Json(responses::account_transactions(
        &matches,
        &state.defaults,
        now_ms(),
    ))
}

fn respond_trc20_transfers(
    state: &AppState,
    contract: Option<&str>,
    related: Option<&str>,
) -> Json<Value> {
    let records = state.store.snapshot();
    let matches: Vec<_> = if let Some(addr) = related {
        aggregate::transfers_involving(&records, addr, Direction::Either).collect()
    } else if contract == Some(token::CONTRACT) {
        aggregate::all_transfers(&records).collect()
    } else {
        Vec::new()
    };
    Json(responses::trc20_transfers(&matches, &state.defaults, now_ms()))
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn get_transaction_info(
    State(state): State<AppState>,
    Query(query): Query<HashQuery>,
) -> Result<Json<Value>, ApiError> {
    respond_transaction_info(&state, &query.hash)
}

async fn get_account_wallet(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<Value>, ApiError> {
    respond_account_wallet(&state, &query.address)
}

async fn post_contract_triggers_batch(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let request: BatchTriggersRequest = lenient_body(&body);
    respond_contract_events(&state, &request)
}

async fn get_token_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<Value>, ApiError> {
    respond_token_analysis(&state, &query.token, query.days)
}

async fn wallet_get_account(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let request: GetAccountRequest = lenient_body(&body);
    respond_rpc_account(&state, request.address.as_deref())
}

async fn wallet_trigger_constant_contract(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let request: TriggerContractRequest = lenient_body(&body);
    respond_constant_call(
        &state,
        request.contract_address.as_deref(),
        request.owner_address.as_deref(),
    )
}

async fn wallet_get_transaction_by_id(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let request: TransactionByIdRequest = lenient_body(&body);
    respond_transaction_by_id(&state, request.value.as_deref())
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(responses::health(state.store.len(), now_ms()))
}

async fn refresh_store(State(state): State<AppState>) -> Json<Value> {
    let entries = state.store.load();
    Json(responses::refreshed(entries))
}

// ============================================================================
// Family Fallbacks
// ============================================================================

/// Catch-all for explorer-family paths with no explicit route. Unmatched
/// or field-less requests get the family's empty listing, never an error.
async fn scan_fallback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    params: Option<Query<HashMap<String, String>>>,
    body: String,
) -> Response {
    let path = uri.path();
    let params = params.map(|Query(p)| p).unwrap_or_default();

    let result = match match_route(path, SCAN_ROUTES) {
        Some(ScanRoute::TransactionInfo) => match params.get("hash") {
            Some(hash) => respond_transaction_info(&state, hash),
            None => return Json(responses::explorer_empty()).into_response(),
        },
        Some(ScanRoute::AccountWallet) => match params.get("address") {
            Some(address) => respond_account_wallet(&state, address),
            None => return Json(responses::explorer_empty()).into_response(),
        },
        Some(ScanRoute::ContractEvents) => {
            let request: BatchTriggersRequest = lenient_body(&body);
            respond_contract_events(&state, &request)
        }
        Some(ScanRoute::TokenAnalysis) => match params.get("token") {
            Some(token_addr) => {
                let days = params
                    .get("days")
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(DEFAULT_ANALYSIS_DAYS);
                respond_token_analysis(&state, token_addr, days)
            }
            None => return Json(responses::explorer_empty()).into_response(),
        },
        Some(ScanRoute::Trc20Transfers) => {
            return respond_trc20_transfers(
                &state,
                params.get("contract").map(String::as_str),
                params.get("relatedAddress").map(String::as_str),
            )
            .into_response();
        }
        Some(ScanRoute::AccountTransactions) => {
            let address = segment_after(path, &["account", "accounts"]);
            return respond_account_transactions(&state, address).into_response();
        }
        None => return Json(responses::explorer_empty()).into_response(),
    };

    match result {
        Ok(json) => json.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Catch-all for node-RPC-family paths under `/v1`. Routes the mock does
/// not model are acknowledged with a generic pass-through.
async fn grid_fallback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: String,
) -> Response {
    let path = uri.path();

    let result = match match_route(path, GRID_ROUTES) {
        Some(GridRoute::GetAccount) => {
            let request: GetAccountRequest = lenient_body(&body);
            respond_rpc_account(&state, request.address.as_deref())
        }
        Some(GridRoute::TriggerConstantContract) => {
            let request: TriggerContractRequest = lenient_body(&body);
            respond_constant_call(
                &state,
                request.contract_address.as_deref(),
                request.owner_address.as_deref(),
            )
        }
        Some(GridRoute::GetTransactionById) => {
            let request: TransactionByIdRequest = lenient_body(&body);
            respond_transaction_by_id(&state, request.value.as_deref())
        }
        Some(GridRoute::ContractEvents) => {
            // Contract address is positional on this form of the call.
            if segment_after(path, &["contracts"]) == Some(token::CONTRACT) {
                let request: BatchTriggersRequest = lenient_body(&body);
                return respond_events_for(&state, &request.hash_list).into_response();
            }
            // Foreign contract: an empty event listing, not a 404.
            return respond_events_for(&state, &[]).into_response();
        }
        Some(GridRoute::AccountTransactions) => {
            let address = segment_after(path, &["account", "accounts"]);
            return respond_account_transactions(&state, address).into_response();
        }
        None => return Json(responses::pass_through()).into_response(),
    };

    match result {
        Ok(json) => json.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware. Logs method, path, status and duration.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the full router (exposed separately for testing).
pub fn build_router(state: AppState) -> Router {
    // Mirror any caller: the spoofed upstreams answer browsers too.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Explorer family. The family tree covers ANY method on /api/**,
        // so a wrong-method hit on an explicit path falls through to the
        // scan fallback rather than a bare 405.
        .route(
            "/api/transaction-info",
            get(get_transaction_info).fallback(scan_fallback),
        )
        .route(
            "/api/account/wallet",
            get(get_account_wallet).fallback(scan_fallback),
        )
        .route(
            "/api/contracts/smart-contract-triggers-batch",
            post(post_contract_triggers_batch).fallback(scan_fallback),
        )
        .route(
            "/api/tokenTransfer/analysis",
            get(get_token_analysis).fallback(scan_fallback),
        )
        // Node-RPC family
        .route("/wallet/getaccount", post(wallet_get_account))
        .route(
            "/wallet/triggerconstantcontract",
            post(wallet_trigger_constant_contract),
        )
        .route(
            "/wallet/gettransactionbyid",
            post(wallet_get_transaction_by_id),
        )
        // Family catch-alls; explicit routes above always win
        .route("/api/*rest", any(scan_fallback))
        .route("/v1/*rest", any(grid_fallback))
        // System
        .route("/health", get(health_check))
        .route("/refresh", post(refresh_store))
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .with_state(state)
}

/// Run the responder until the process is killed.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "mock responder listening");

    axum::serve(listener, app).await?;

    Ok(())
}
