// types/src/rrc20.rs
//! RRC-20 ledger entities: the closed operation and verdict
//! enumerations, token state, marketplace listings and the per-attempt
//! operation record.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::decimal::Decimal;

/// Value of the `p` field that marks an inscription as RRC-20
/// (compared case-insensitively).
pub const PROTOCOL_NAME: &str = "rrc-20";

/// Maximum tick length in bytes.
pub const MAX_TICK_BYTES: usize = 18;

/// Addresses allowed to mint past a token's per-operation limit. Both
/// endpoints of the mint must be listed for the bypass to apply.
pub const MINT_LIMIT_WHITELIST: &[&str] = &["0xf9f128d9b8ddb66883708ba08a171e9018bed559"];

/// The closed set of RRC-20 operations.
///
/// `Exchange` is never written in an inscription; it is synthesized
/// when an on-chain listing-transfer event settles a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Deploy,
    Mint,
    Transfer,
    List,
    Exchange,
}

impl Operation {
    /// Parse an inscription's `op` field. Only the four inscribable
    /// operations are accepted; anything else (including `exchange`)
    /// is unknown.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "deploy" => Some(Self::Deploy),
            "mint" => Some(Self::Mint),
            "transfer" => Some(Self::Transfer),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::List => "list",
            Self::Exchange => "exchange",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an attempted RRC-20 operation.
///
/// The numeric codes are stable for downstream consumers: 1 is
/// success, 0 an unclassified internal failure, negatives specific
/// rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Verdict {
    Ok = 1,
    Unknown = 0,
    EmptyTick = -1,
    TickTooLong = -2,
    UnknownOperation = -3,
    MaxMissing = -11,
    BadDecimal = -12,
    LimitMissing = -13,
    OverMintLimit = -14,
    NotPositive = -15,
    MaxBelowLimit = -16,
    AlreadyDeployed = -17,
    AmountMissing = -21,
    AmountUnparseable = -22,
    TokenNotDeployed = -23,
    PrecisionExceeded = -24,
    SupplyExhausted = -27,
    TransferToSelf = -28,
    InsufficientBalance = -29,
    ListToSelf = -30,
    ListingNotFound = -31,
    ListingOriginMismatch = -33,
    ListingContractMismatch = -34,
}

impl Verdict {
    pub fn code(self) -> i8 {
        self as i8
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "operation successful",
            Self::Unknown => "unknown error",
            Self::EmptyTick => "empty tick",
            Self::TickTooLong => "tick is too long",
            Self::UnknownOperation => "unknown operation",
            Self::MaxMissing => "max is missing",
            Self::BadDecimal => "max or lim is not a decimal",
            Self::LimitMissing => "lim is missing",
            Self::OverMintLimit => "amount exceeds the mint limit",
            Self::NotPositive => "value must be positive",
            Self::MaxBelowLimit => "max is below lim",
            Self::AlreadyDeployed => "tick already deployed",
            Self::AmountMissing => "amt is missing",
            Self::AmountUnparseable => "amt is not a decimal",
            Self::TokenNotDeployed => "tick not deployed",
            Self::PrecisionExceeded => "amount exceeds token precision",
            Self::SupplyExhausted => "supply exhausted",
            Self::TransferToSelf => "cannot transfer to self",
            Self::InsufficientBalance => "insufficient balance",
            Self::ListToSelf => "cannot list to self",
            Self::ListingNotFound => "listing not found",
            Self::ListingOriginMismatch => "event sender does not match the listing origin",
            Self::ListingContractMismatch => "event contract does not match the listing target",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown verdict code {0}")]
pub struct UnknownVerdict(pub i8);

impl TryFrom<i8> for Verdict {
    type Error = UnknownVerdict;

    fn try_from(code: i8) -> Result<Self, UnknownVerdict> {
        let verdict = match code {
            1 => Self::Ok,
            0 => Self::Unknown,
            -1 => Self::EmptyTick,
            -2 => Self::TickTooLong,
            -3 => Self::UnknownOperation,
            -11 => Self::MaxMissing,
            -12 => Self::BadDecimal,
            -13 => Self::LimitMissing,
            -14 => Self::OverMintLimit,
            -15 => Self::NotPositive,
            -16 => Self::MaxBelowLimit,
            -17 => Self::AlreadyDeployed,
            -21 => Self::AmountMissing,
            -22 => Self::AmountUnparseable,
            -23 => Self::TokenNotDeployed,
            -24 => Self::PrecisionExceeded,
            -27 => Self::SupplyExhausted,
            -28 => Self::TransferToSelf,
            -29 => Self::InsufficientBalance,
            -30 => Self::ListToSelf,
            -31 => Self::ListingNotFound,
            -33 => Self::ListingOriginMismatch,
            -34 => Self::ListingContractMismatch,
            other => return Err(UnknownVerdict(other)),
        };
        Ok(verdict)
    }
}

/// A deployed token and its running counters.
#[derive(Debug, Clone, Serialize)]
pub struct Token {
    /// Tick in its deploy-time casing; lookups use the lowercase form.
    pub tick: String,
    /// Inscription number of the deploy.
    pub deploy_number: u64,
    /// Fractional digits admitted, fixed by the deploy `max` literal.
    pub precision: u32,
    pub max: Decimal,
    /// Per-mint limit.
    pub limit: Decimal,
    pub minted: Decimal,
    /// Minted fraction of max in parts per million.
    pub progress: u32,
    pub holders: u32,
    pub trxs: u32,
    pub created_at: u64,
    /// Block timestamp of the mint that reached `max`.
    pub completed_at: Option<u64>,
    pub deploy_address: String,
    pub deploy_hash: String,
}

/// An open marketplace listing: tokens debited from the seller and
/// escrowed until a listing-transfer event settles or the listing is
/// left open forever.
#[derive(Debug, Clone, Serialize)]
pub struct ListingRecord {
    /// Hash of the listing inscription's transaction; the listing key.
    pub hash: String,
    pub tick: String,
    pub origin_addr: String,
    /// Marketplace contract the listing was addressed to.
    pub listed_to: String,
    pub amount: Decimal,
    pub listed_ts: u64,
}

/// One attempted RRC-20 operation, valid or not, in encounter order.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    /// Global inscription number; 0 for exchanges.
    pub number: u64,
    pub hash: String,
    pub tick: String,
    /// None when the inscription named an operation outside the
    /// protocol (verdict -3).
    pub operation: Option<Operation>,
    pub from: String,
    pub to: String,
    pub precision: u32,
    pub max: Option<Decimal>,
    pub limit: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub timestamp: u64,
    pub valid: Verdict,
}
