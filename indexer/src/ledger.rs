// indexer/src/ledger.rs
//! The authoritative RRC-20 ledger: tokens, balances, open listings
//! and the append-only operation log.
//!
//! State changes happen only inside [`Ledger::apply_inscription`] and
//! [`Ledger::apply_listing_transfer`]; each call appends exactly one
//! [`OperationRecord`] carrying the validation verdict, whether the
//! operation was accepted or not.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::warn;

use parser::ListingTransfer;
use types::rrc20::MINT_LIMIT_WHITELIST;
use types::{Decimal, Inscription, ListingRecord, Operation, OperationRecord, Token, Verdict};

type Balances = IndexMap<String, Decimal>;

pub struct Ledger {
    /// Number of the last applied block.
    height: u64,
    /// Tokens keyed by lowercase tick.
    tokens: IndexMap<String, Token>,
    /// Per-token balances: lowercase tick, then lowercase owner.
    balances: IndexMap<String, Balances>,
    /// Open listings keyed by the listing inscription's tx hash.
    listings: IndexMap<String, ListingRecord>,
    /// Every attempted operation, in encounter order.
    records: Vec<OperationRecord>,
}

impl Ledger {
    pub fn new(initial_height: u64) -> Self {
        Self {
            height: initial_height,
            tokens: IndexMap::new(),
            balances: IndexMap::new(),
            listings: IndexMap::new(),
            records: Vec::new(),
        }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub(crate) fn set_height(&mut self, height: u64) {
        self.height = height;
    }

    pub fn token(&self, tick: &str) -> Option<&Token> {
        self.tokens.get(&tick.to_lowercase())
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }

    pub fn balance(&self, tick: &str, owner: &str) -> Option<&Decimal> {
        self.balances
            .get(&tick.to_lowercase())?
            .get(&owner.to_lowercase())
    }

    pub fn balances(&self, tick: &str) -> Option<&IndexMap<String, Decimal>> {
        self.balances.get(&tick.to_lowercase())
    }

    pub fn listing(&self, hash: &str) -> Option<&ListingRecord> {
        self.listings.get(hash)
    }

    pub fn listings(&self) -> impl Iterator<Item = &ListingRecord> {
        self.listings.values()
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    /// Validate and apply one RRC-20 inscription.
    pub fn apply_inscription(
        &mut self,
        inscription: &Inscription,
        params: &BTreeMap<String, String>,
    ) -> &OperationRecord {
        let operation = params.get("op").and_then(|op| Operation::parse(op));
        let mut record = OperationRecord {
            number: inscription.number,
            hash: inscription.hash.clone(),
            tick: params.get("tick").cloned().unwrap_or_default(),
            operation,
            from: inscription.from.to_lowercase(),
            to: inscription.to.to_lowercase(),
            precision: 0,
            max: None,
            limit: None,
            amount: None,
            timestamp: inscription.timestamp,
            valid: Verdict::Unknown,
        };

        record.valid = if record.tick.trim().is_empty() {
            Verdict::EmptyTick
        } else if record.tick.len() > types::rrc20::MAX_TICK_BYTES {
            Verdict::TickTooLong
        } else {
            match operation {
                Some(Operation::Deploy) => self.deploy(&mut record, inscription, params),
                Some(Operation::Mint) => self.mint(&mut record, inscription, params),
                Some(Operation::Transfer) => self.transfer(&mut record, params),
                Some(Operation::List) => self.list(&mut record, inscription, params),
                Some(Operation::Exchange) | None => Verdict::UnknownOperation,
            }
        };

        self.push(record)
    }

    /// Settle (or reject) a marketplace listing against an on-chain
    /// listing-transfer event.
    pub fn apply_listing_transfer(
        &mut self,
        tx_hash: &str,
        event: &ListingTransfer,
        timestamp: u64,
    ) -> &OperationRecord {
        let from = event.from.to_lowercase();
        let to = event.to.to_lowercase();
        let contract = event.contract_address.to_lowercase();
        let key = event.id_hex();

        let mut record = OperationRecord {
            number: 0,
            hash: tx_hash.to_owned(),
            tick: String::new(),
            operation: Some(Operation::Exchange),
            from: from.clone(),
            to: to.clone(),
            precision: 0,
            max: None,
            limit: None,
            amount: None,
            timestamp,
            valid: Verdict::Ok,
        };

        record.valid = match self.listings.get(&key).cloned() {
            None => {
                warn!(id = %key, "listing-transfer event for unknown listing");
                Verdict::ListingNotFound
            }
            Some(listing) => {
                let tick_key = listing.tick.to_lowercase();
                record.tick = listing.tick.clone();
                record.amount = Some(listing.amount.clone());
                if let Some(token) = self.tokens.get(&tick_key) {
                    record.precision = token.precision;
                    record.max = Some(token.max.clone());
                    record.limit = Some(token.limit.clone());
                }

                if listing.origin_addr != from {
                    Verdict::ListingOriginMismatch
                } else if listing.listed_to != contract {
                    Verdict::ListingContractMismatch
                } else {
                    let new_holder =
                        credit(self.balances.entry(tick_key.clone()).or_default(), &to, &listing.amount);
                    if let Some(token) = self.tokens.get_mut(&tick_key) {
                        token.trxs += 1;
                        if new_holder {
                            token.holders += 1;
                        }
                    }
                    self.listings.shift_remove(&key);
                    Verdict::Ok
                }
            }
        };

        self.push(record)
    }

    fn deploy(
        &mut self,
        record: &mut OperationRecord,
        inscription: &Inscription,
        params: &BTreeMap<String, String>,
    ) -> Verdict {
        let Some(max_literal) = params.get("max") else {
            return Verdict::MaxMissing;
        };
        let Ok(max) = Decimal::parse(max_literal) else {
            return Verdict::BadDecimal;
        };
        let Some(limit_literal) = params.get("lim") else {
            return Verdict::LimitMissing;
        };
        let Ok(limit) = Decimal::parse(limit_literal) else {
            return Verdict::BadDecimal;
        };

        // the max literal's written scale fixes the token's precision
        let precision = max.scale();
        record.precision = precision;
        record.max = Some(max.clone());
        record.limit = Some(limit.clone());

        if max.is_zero() || limit.is_zero() {
            return Verdict::NotPositive;
        }
        if max < limit {
            return Verdict::MaxBelowLimit;
        }

        record.tick = record.tick.trim().to_owned();
        let key = record.tick.to_lowercase();
        if self.tokens.contains_key(&key) {
            return Verdict::AlreadyDeployed;
        }

        self.tokens.insert(
            key.clone(),
            Token {
                tick: record.tick.clone(),
                deploy_number: inscription.number,
                precision,
                max,
                limit,
                minted: Decimal::zero(),
                progress: 0,
                holders: 0,
                trxs: 0,
                created_at: inscription.timestamp,
                completed_at: None,
                deploy_address: record.to.clone(),
                deploy_hash: inscription.hash.clone(),
            },
        );
        self.balances.insert(key, Balances::new());
        Verdict::Ok
    }

    fn mint(
        &mut self,
        record: &mut OperationRecord,
        inscription: &Inscription,
        params: &BTreeMap<String, String>,
    ) -> Verdict {
        let Some(amount_literal) = params.get("amt") else {
            return Verdict::AmountMissing;
        };
        let Ok(mut amount) = Decimal::parse(amount_literal) else {
            return Verdict::AmountUnparseable;
        };
        record.amount = Some(amount.clone());

        let key = record.tick.to_lowercase();
        let Some(token) = self.tokens.get(&key) else {
            return Verdict::TokenNotDeployed;
        };
        if amount.scale() > token.precision {
            return Verdict::PrecisionExceeded;
        }
        if amount.is_zero() {
            return Verdict::NotPositive;
        }

        let whitelisted = MINT_LIMIT_WHITELIST.contains(&record.from.as_str())
            && MINT_LIMIT_WHITELIST.contains(&record.to.as_str());
        if !whitelisted && amount > token.limit {
            return Verdict::OverMintLimit;
        }

        // saturate against the remaining supply
        let remaining = token.max.sub(&token.minted).unwrap_or_else(|_| Decimal::zero());
        if remaining < amount {
            if remaining.is_zero() {
                return Verdict::SupplyExhausted;
            }
            amount = remaining;
            record.amount = Some(amount.clone());
        }

        let new_holder = credit(
            self.balances.entry(key.clone()).or_default(),
            &record.to,
            &amount,
        );

        if let Some(token) = self.tokens.get_mut(&key) {
            token.minted = token.minted.add(&amount);
            token.trxs += 1;
            token.progress = token.minted.ppm_of(&token.max);
            if token.minted == token.max {
                token.completed_at = Some(inscription.timestamp);
            }
            if new_holder {
                token.holders += 1;
            }
        }
        Verdict::Ok
    }

    fn transfer(
        &mut self,
        record: &mut OperationRecord,
        params: &BTreeMap<String, String>,
    ) -> Verdict {
        let Some(amount_literal) = params.get("amt") else {
            return Verdict::AmountMissing;
        };
        let Ok(amount) = Decimal::parse(amount_literal) else {
            return Verdict::AmountUnparseable;
        };

        let key = record.tick.to_lowercase();
        let Some(token) = self.tokens.get(&key) else {
            return Verdict::TokenNotDeployed;
        };
        if amount.scale() > token.precision {
            return Verdict::PrecisionExceeded;
        }
        if amount.is_zero() {
            return Verdict::NotPositive;
        }
        if record.from == record.to {
            return Verdict::TransferToSelf;
        }

        record.amount = Some(amount.clone());

        let Some(balances) = self.balances.get_mut(&key) else {
            return Verdict::Unknown;
        };
        let Some(reduce_holder) = debit(balances, &record.from, &amount) else {
            return Verdict::InsufficientBalance;
        };
        let new_holder = credit(balances, &record.to, &amount);

        if let Some(token) = self.tokens.get_mut(&key) {
            if reduce_holder {
                token.holders -= 1;
            }
            if new_holder {
                token.holders += 1;
            }
            token.trxs += 1;
        }
        Verdict::Ok
    }

    fn list(
        &mut self,
        record: &mut OperationRecord,
        inscription: &Inscription,
        params: &BTreeMap<String, String>,
    ) -> Verdict {
        let Some(amount_literal) = params.get("amt") else {
            return Verdict::AmountMissing;
        };
        let Ok(amount) = Decimal::parse(amount_literal) else {
            return Verdict::AmountUnparseable;
        };

        let key = record.tick.to_lowercase();
        let Some(token) = self.tokens.get(&key) else {
            return Verdict::TokenNotDeployed;
        };
        if amount.scale() > token.precision {
            return Verdict::PrecisionExceeded;
        }
        if amount.is_zero() {
            return Verdict::NotPositive;
        }
        if record.from == record.to {
            return Verdict::ListToSelf;
        }

        record.amount = Some(amount.clone());

        let Some(balances) = self.balances.get_mut(&key) else {
            return Verdict::Unknown;
        };
        // escrow: the seller is debited, nobody is credited until the
        // listing-transfer event settles the listing
        let Some(reduce_holder) = debit(balances, &record.from, &amount) else {
            return Verdict::InsufficientBalance;
        };

        self.listings.insert(
            inscription.hash.clone(),
            ListingRecord {
                hash: inscription.hash.clone(),
                tick: record.tick.clone(),
                origin_addr: record.from.clone(),
                listed_to: record.to.clone(),
                amount,
                listed_ts: inscription.timestamp,
            },
        );

        if let Some(token) = self.tokens.get_mut(&key) {
            if reduce_holder {
                token.holders -= 1;
            }
        }
        Verdict::Ok
    }

    fn push(&mut self, record: OperationRecord) -> &OperationRecord {
        if !record.valid.is_ok() {
            warn!(
                code = record.valid.code(),
                verdict = %record.valid,
                operation = record.operation.map(|op| op.as_str()).unwrap_or("?"),
                tick = %record.tick,
                hash = %record.hash,
                "rejected rrc-20 operation"
            );
        }
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }
}

/// Add `amount` to `owner`, reporting whether they became a holder.
fn credit(balances: &mut Balances, owner: &str, amount: &Decimal) -> bool {
    match balances.get_mut(owner) {
        Some(balance) => {
            let was_zero = balance.is_zero();
            *balance = balance.add(amount);
            was_zero
        }
        None => {
            balances.insert(owner.to_owned(), amount.clone());
            true
        }
    }
}

/// Remove `amount` from `owner`, reporting whether their balance fell
/// to zero. `None` when the balance does not cover the amount.
fn debit(balances: &mut Balances, owner: &str, amount: &Decimal) -> Option<bool> {
    let balance = balances.get_mut(owner)?;
    if balance.is_zero() || *amount > *balance {
        return None;
    }
    *balance = balance.sub(amount).ok()?;
    Some(balance.is_zero())
}
