//! Derived views over the record store
//!
//! Balance, transfer-listing and windowed-volume aggregations. Every value
//! is recomputed from a store snapshot on each call; nothing is cached or
//! incrementally maintained, so results are always a pure function of the
//! current table.
//!
//! Amounts travel as decimal strings in the store and are parsed to
//! [`U256`] here. A string that is not a valid integer literal is a
//! store-integrity error and fails the aggregation that touched it.

use crate::error::{Result, StoreError};
use crate::store::{RecordMap, TransactionRecord, TransferEvent};
use primitive_types::U256;

pub const DAY_MS: i64 = 86_400_000;

/// Which side of a transfer an address must appear on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    To,
    From,
    Either,
}

/// A transfer together with the transaction that carries it.
#[derive(Debug, Clone, Copy)]
pub struct TransferMatch<'a> {
    pub hash: &'a str,
    pub record: &'a TransactionRecord,
    pub transfer: &'a TransferEvent,
}

/// Volume statistics over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub volume: U256,
    pub count: u64,
    /// Integer division of volume by count.
    pub average: U256,
}

pub fn parse_amount(hash: &str, amount: &str) -> Result<U256> {
    U256::from_dec_str(amount).map_err(|_| StoreError::MalformedAmount {
        hash: hash.to_string(),
        amount: amount.to_string(),
    })
}

/// Sum of inbound transfer amounts for `address` across the whole table.
///
/// The flag reports whether any transfer matched at all. An address with
/// zero matches is indistinguishable from an unknown address; both are
/// "no data" to every caller.
pub fn balance_of(records: &RecordMap, address: &str) -> Result<(U256, bool)> {
    let mut total = U256::zero();
    let mut matched = false;

    for (hash, record) in records {
        let Some(transfer) = record.transfer() else {
            continue;
        };
        if transfer.to != address {
            continue;
        }
        let amount = parse_amount(hash, &transfer.amount)?;
        total = total
            .checked_add(amount)
            .ok_or_else(|| StoreError::AmountOverflow { hash: hash.clone() })?;
        matched = true;
    }

    Ok((total, matched))
}

/// All transfers involving `address` on the given side. Restartable: call
/// again for a fresh pass over the same snapshot.
pub fn transfers_involving<'a>(
    records: &'a RecordMap,
    address: &'a str,
    direction: Direction,
) -> impl Iterator<Item = TransferMatch<'a>> {
    records.iter().filter_map(move |(hash, record)| {
        let transfer = record.transfer()?;
        let hit = match direction {
            Direction::To => transfer.to == address,
            Direction::From => transfer.from == address,
            Direction::Either => transfer.to == address || transfer.from == address,
        };
        hit.then_some(TransferMatch {
            hash,
            record,
            transfer,
        })
    })
}

/// Every transfer in the table, regardless of address.
pub fn all_transfers(records: &RecordMap) -> impl Iterator<Item = TransferMatch<'_>> {
    records.iter().filter_map(|(hash, record)| {
        let transfer = record.transfer()?;
        Some(TransferMatch {
            hash,
            record,
            transfer,
        })
    })
}

/// Volume and count of transfers in the trailing `days` window.
///
/// A record must carry both a timestamp and a transfer to count. The lower
/// bound `now - days` is inclusive, the upper bound is `now`. Zero matches
/// is "no data", not a zero-valued report.
pub fn transfers_in_window(
    records: &RecordMap,
    days: i64,
    now_ms: i64,
) -> Result<Option<WindowStats>> {
    let start = now_ms.saturating_sub(days.saturating_mul(DAY_MS));

    let mut volume = U256::zero();
    let mut count: u64 = 0;

    for (hash, record) in records {
        let Some(timestamp) = record.timestamp else {
            continue;
        };
        let Some(transfer) = record.transfer() else {
            continue;
        };
        if timestamp < start || timestamp > now_ms {
            continue;
        }
        let amount = parse_amount(hash, &transfer.amount)?;
        volume = volume
            .checked_add(amount)
            .ok_or_else(|| StoreError::AmountOverflow { hash: hash.clone() })?;
        count += 1;
    }

    if count == 0 {
        return Ok(None);
    }

    Ok(Some(WindowStats {
        volume,
        count,
        average: volume / U256::from(count),
    }))
}

/// Records whose hash appears in `hashes` and which carry a transfer, in
/// the order the hashes were supplied. The caller applies the contract
/// filter of the originating request before asking for events at all.
pub fn events_for_hashes<'a>(
    records: &'a RecordMap,
    hashes: &'a [String],
) -> impl Iterator<Item = TransferMatch<'a>> {
    hashes.iter().filter_map(|hash| {
        let record = records.get(hash)?;
        let transfer = record.transfer()?;
        Some(TransferMatch {
            hash,
            record,
            transfer,
        })
    })
}
