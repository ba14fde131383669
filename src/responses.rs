//! Protocol-shaped reply construction
//!
//! Two reply families are built from the same records: the explorer family
//! (Tronscan-style flat JSON with human-facing token metadata) and the
//! node-RPC family (Trongrid-style wallet calls with hex-encoded balances).
//! "No data" is a first-class outcome here: every listing shape has a
//! well-formed empty rendition, produced by handing these builders an empty
//! slice.

use crate::aggregate::{TransferMatch, WindowStats};
use crate::store::TransactionRecord;
use primitive_types::U256;
use serde_json::{json, Value};

/// Metadata for the single tracked token. Static by design: the mock only
/// ever impersonates one contract.
pub mod token {
    pub const CONTRACT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    pub const NAME: &str = "TetherToken";
    pub const SYMBOL: &str = "USDT";
    pub const DECIMALS: u8 = 6;
}

/// Defaulting policy for absent record fields.
///
/// Records keep absent fields as `None`; the substitutions happen here, at
/// synthesis time, with the sentinel block number coming from configuration
/// and the timestamp from the request clock.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub sentinel_block: u64,
}

impl Defaults {
    pub fn block(&self, record: &TransactionRecord) -> u64 {
        record.block_number.unwrap_or(self.sentinel_block)
    }

    pub fn timestamp(&self, record: &TransactionRecord, now_ms: i64) -> i64 {
        record.timestamp.unwrap_or(now_ms)
    }
}

// ============================================================================
// Explorer family
// ============================================================================

/// Transaction detail for `GET /api/transaction-info`.
pub fn transaction_info(
    hash: &str,
    record: &TransactionRecord,
    defaults: &Defaults,
    now_ms: i64,
) -> Value {
    let mut response = json!({
        "hash": hash,
        "block": defaults.block(record),
        "timestamp": defaults.timestamp(record, now_ms),
        "confirmed": true,
        "confirmations": 100,
        "contractRet": [{ "contractRet": "SUCCESS" }],
    });

    if let Some(transfer) = record.transfer() {
        response["transfers"] = json!([{
            "from": transfer.from,
            "to": transfer.to,
            "amount": transfer.amount,
            "contract_address": token::CONTRACT,
        }]);
    }

    response
}

/// Token balance listing for `GET /api/account/wallet`.
pub fn wallet_tokens(address: &str, balance: U256) -> Value {
    json!({
        "address": address,
        "tokens": [{
            "token_id": token::CONTRACT,
            "token_name": token::NAME,
            "token_abbr": token::SYMBOL,
            "token_decimal": token::DECIMALS,
            "balance": balance.to_string(),
            "token_type": "trc20",
        }],
    })
}

/// Batched Transfer events for the smart-contract-triggers endpoints.
pub fn contract_events(events: &[TransferMatch<'_>], defaults: &Defaults, now_ms: i64) -> Value {
    let data: Vec<Value> = events
        .iter()
        .map(|m| {
            json!({
                "transaction_id": m.hash,
                "contract_address": token::CONTRACT,
                "event_name": "Transfer",
                "block_number": defaults.block(m.record),
                "timestamp": defaults.timestamp(m.record, now_ms),
                "result": {
                    "from": m.transfer.from,
                    "to": m.transfer.to,
                    "value": m.transfer.amount,
                },
            })
        })
        .collect();

    json!({ "total": data.len(), "data": data })
}

/// Volume statistics for `GET /api/tokenTransfer/analysis`.
pub fn token_analysis(token_addr: &str, stats: &WindowStats, days: i64) -> Value {
    json!({
        "token": token_addr,
        "total_volume": stats.volume.to_string(),
        "transfer_count": stats.count,
        "avg_amount": stats.average.to_string(),
        "days": days,
    })
}

/// Per-address transaction listing (always 200, possibly empty).
pub fn account_transactions(matches: &[TransferMatch<'_>], defaults: &Defaults, now_ms: i64) -> Value {
    let data: Vec<Value> = matches
        .iter()
        .map(|m| {
            json!({
                "hash": m.hash,
                "block": defaults.block(m.record),
                "timestamp": defaults.timestamp(m.record, now_ms),
                "from": m.transfer.from,
                "to": m.transfer.to,
                "value": m.transfer.amount,
                "token": token::SYMBOL,
                "contractAddress": token::CONTRACT,
            })
        })
        .collect();

    json!({
        "total": data.len(),
        "rangeTotal": data.len(),
        "data": data,
    })
}

/// TRC20 transfer listing (always 200, possibly empty).
pub fn trc20_transfers(matches: &[TransferMatch<'_>], defaults: &Defaults, now_ms: i64) -> Value {
    let transfers: Vec<Value> = matches
        .iter()
        .map(|m| {
            json!({
                "transaction_id": m.hash,
                "from": m.transfer.from,
                "to": m.transfer.to,
                "amount": m.transfer.amount,
                "contract_address": token::CONTRACT,
                "block": defaults.block(m.record),
                "timestamp": defaults.timestamp(m.record, now_ms),
            })
        })
        .collect();

    json!({ "total": transfers.len(), "token_transfers": transfers })
}

/// Generic empty listing used when an explorer-family route carries nothing
/// to report.
pub fn explorer_empty() -> Value {
    json!({ "data": [], "total": 0 })
}

// ============================================================================
// Node-RPC family
// ============================================================================

/// Account summary for `POST /wallet/getaccount`. Balances are hex-encoded
/// with a `0x` prefix, the way the wallet RPC reports them.
pub fn rpc_account(address: &str, balance: U256) -> Value {
    let hex = format!("{:#x}", balance);
    json!({
        "address": address,
        "balance": &hex,
        "trc20": { (token::CONTRACT): &hex },
    })
}

/// Simulated read-only contract call (a `balanceOf` answer). The value is
/// bare hex, no prefix, inside `constant_result`.
pub fn constant_result(balance: U256) -> Value {
    json!({ "constant_result": [format!("{:x}", balance)] })
}

/// Minimal confirmation record for `POST /wallet/gettransactionbyid`.
pub fn transaction_by_id(txid: &str) -> Value {
    json!({
        "txID": txid,
        "ret": [{ "contractRet": "SUCCESS" }],
    })
}

/// Acknowledgement for node-RPC routes the mock does not model.
pub fn pass_through() -> Value {
    json!({ "result": true, "message": "API handled by proxy" })
}

// ============================================================================
// Fixed routes
// ============================================================================

pub fn health(entries: usize, now_ms: i64) -> Value {
    json!({
        "status": "healthy",
        "pegasus_entries": entries,
        "timestamp": now_ms,
    })
}

pub fn refreshed(entries: usize) -> Value {
    json!({ "status": "refreshed", "entries": entries })
}
