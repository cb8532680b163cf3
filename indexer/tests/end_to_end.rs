// indexer/tests/end_to_end.rs
//! Drives the block applier over deterministic hand-built block
//! streams and checks the ledger against its invariants.

use indexer::{ApplyError, BlockApplier, Ledger};
use types::chain::PROTOCOL_GENESIS_HEIGHT;
use types::{ChainBlock, ChainReceipt, ChainTransaction, Decimal, LogRecord, Verdict};

const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const DAVE: &str = "0xdddddddddddddddddddddddddddddddddddddddd";
const MARKET: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

fn tx_hash(seed: u64) -> String {
    format!("0x{seed:064x}")
}

fn inscribe(seed: u64, from: &str, to: &str, content: &str) -> ChainTransaction {
    ChainTransaction {
        id: tx_hash(seed),
        from: from.to_owned(),
        to: to.to_owned(),
        block: 0,
        idx: seed as u32,
        timestamp: 1_700_000_000 + seed,
        input: format!("0x{}", hex::encode(format!("data:,{content}").as_bytes())),
    }
}

fn listing_transfer_receipt(
    seed: u64,
    listing_hash: &str,
    from: &str,
    to: &str,
    contract: &str,
) -> ChainReceipt {
    let pad = |address: &str| format!("0x{}{}", "00".repeat(12), address.trim_start_matches("0x"));
    ChainReceipt {
        tx_hash: tx_hash(seed),
        timestamp: 1_700_000_000 + seed,
        logs: vec![LogRecord {
            address: contract.to_owned(),
            topics: vec![
                parser::listing_transfer_topic().to_owned(),
                pad(from),
                pad(to),
            ],
            data: listing_hash.to_owned(),
        }],
    }
}

struct Chain {
    applier: BlockApplier,
    next_number: u64,
}

impl Chain {
    fn new(initial_height: u64) -> Self {
        Self {
            applier: BlockApplier::new(initial_height),
            next_number: initial_height + 1,
        }
    }

    fn apply(&mut self, txs: Vec<ChainTransaction>, receipts: Vec<ChainReceipt>) {
        let number = self.next_number;
        self.next_number += 1;
        let mut txs = txs;
        for tx in &mut txs {
            tx.block = number;
        }
        self.applier
            .apply_block(&ChainBlock {
                number,
                timestamp: 1_700_000_000 + number,
                txs,
                receipts,
            })
            .unwrap();
        check_invariants(self.applier.ledger());
    }

    fn ledger(&self) -> &Ledger {
        self.applier.ledger()
    }
}

/// The always-true ledger properties: token bounds, the progress
/// formula, conservation of supply against balances and escrowed
/// listings, and holder counting.
fn check_invariants(ledger: &Ledger) {
    for token in ledger.tokens() {
        assert!(token.minted <= token.max, "minted over max for {}", token.tick);
        assert!(token.limit <= token.max, "limit over max for {}", token.tick);
        assert_eq!(
            token.progress,
            token.minted.ppm_of(&token.max),
            "progress out of step for {}",
            token.tick
        );

        let balances = ledger.balances(&token.tick).expect("token without balances");
        let circulating = balances
            .values()
            .fold(Decimal::zero(), |sum, balance| sum.add(balance));
        let escrowed = ledger
            .listings()
            .filter(|listing| listing.tick.to_lowercase() == token.tick.to_lowercase())
            .fold(Decimal::zero(), |sum, listing| sum.add(&listing.amount));
        assert_eq!(
            circulating.add(&escrowed),
            token.minted,
            "supply not conserved for {}",
            token.tick
        );

        let holders = balances.values().filter(|balance| !balance.is_zero()).count();
        assert_eq!(token.holders as usize, holders, "holder count for {}", token.tick);
    }
}

#[test]
fn deploy_then_mint_exact_limit() {
    let mut chain = Chain::new(PROTOCOL_GENESIS_HEIGHT);
    chain.apply(
        vec![inscribe(
            1,
            ALICE,
            ALICE,
            r#"{"p":"rrc-20","op":"deploy","tick":"ROSE","max":"1000","lim":"100"}"#,
        )],
        vec![],
    );
    chain.apply(
        vec![inscribe(
            2,
            ALICE,
            BOB,
            r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
        )],
        vec![],
    );

    let ledger = chain.ledger();
    assert_eq!(ledger.height(), PROTOCOL_GENESIS_HEIGHT + 2);

    let token = ledger.token("rose").unwrap();
    assert_eq!(token.tick, "ROSE");
    assert_eq!(token.precision, 0);
    assert_eq!(token.minted.to_string(), "100");
    assert_eq!(token.progress, 100_000);
    assert_eq!(token.holders, 1);
    assert_eq!(ledger.balance("rose", BOB).unwrap().to_string(), "100");

    let records = ledger.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.valid.is_ok()));
    assert_eq!(records[0].number, 0);
    assert_eq!(records[1].number, 1);
}

#[test]
fn mint_is_clamped_against_remaining_supply() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![inscribe(
            1,
            ALICE,
            ALICE,
            r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000","lim":"100"}"#,
        )],
        vec![],
    );
    let mut mints: Vec<ChainTransaction> = (0..9)
        .map(|i| {
            inscribe(
                10 + i,
                ALICE,
                BOB,
                r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
            )
        })
        .collect();
    mints.push(inscribe(
        30,
        ALICE,
        BOB,
        r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"50"}"#,
    ));
    chain.apply(mints, vec![]);

    // 950 of 1000 minted; this mint asks for 100 and gets the last 50
    chain.apply(
        vec![inscribe(
            40,
            ALICE,
            BOB,
            r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
        )],
        vec![],
    );

    let ledger = chain.ledger();
    let clamped = ledger.records().last().unwrap();
    assert!(clamped.valid.is_ok());
    assert_eq!(clamped.amount.as_ref().unwrap().to_string(), "50");

    let token = ledger.token("rose").unwrap();
    assert_eq!(token.minted.to_string(), "1000");
    assert_eq!(token.progress, 1_000_000);
    // completion is stamped with the minting block's timestamp
    assert_eq!(token.completed_at, Some(1_700_000_040));

    // the well is dry now
    chain.apply(
        vec![inscribe(
            50,
            ALICE,
            BOB,
            r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"1"}"#,
        )],
        vec![],
    );
    let exhausted = chain.ledger().records().last().unwrap();
    assert_eq!(exhausted.valid, Verdict::SupplyExhausted);
}

#[test]
fn transfer_to_self_changes_nothing() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![
            inscribe(
                1,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000","lim":"100"}"#,
            ),
            inscribe(
                2,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
            ),
        ],
        vec![],
    );
    chain.apply(
        vec![inscribe(
            3,
            ALICE,
            ALICE,
            r#"{"p":"rrc-20","op":"transfer","tick":"rose","amt":"10"}"#,
        )],
        vec![],
    );

    let ledger = chain.ledger();
    assert_eq!(ledger.records().last().unwrap().valid, Verdict::TransferToSelf);
    assert_eq!(ledger.balance("rose", ALICE).unwrap().to_string(), "100");
    assert_eq!(ledger.token("rose").unwrap().trxs, 1);
}

#[test]
fn list_then_matching_exchange() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![
            inscribe(
                1,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000","lim":"100"}"#,
            ),
            inscribe(
                2,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
            ),
        ],
        vec![],
    );

    let listing_hash = tx_hash(3);
    chain.apply(
        vec![inscribe(
            3,
            ALICE,
            MARKET,
            r#"{"p":"rrc-20","op":"list","tick":"rose","amt":"50"}"#,
        )],
        vec![],
    );
    assert!(chain.ledger().listing(&listing_hash).is_some());
    assert_eq!(chain.ledger().token("rose").unwrap().trxs, 1);

    // the marketplace emits the settling event in a later block
    chain.apply(
        vec![],
        vec![listing_transfer_receipt(9, &listing_hash, ALICE, DAVE, MARKET)],
    );

    let ledger = chain.ledger();
    let exchange = ledger.records().last().unwrap();
    assert!(exchange.valid.is_ok());
    assert_eq!(exchange.number, 0);
    assert_eq!(exchange.tick, "rose");
    assert_eq!(exchange.amount.as_ref().unwrap().to_string(), "50");

    assert_eq!(ledger.balance("rose", DAVE).unwrap().to_string(), "50");
    assert!(ledger.listing(&listing_hash).is_none());
    let token = ledger.token("rose").unwrap();
    assert_eq!(token.trxs, 2);
    assert_eq!(token.holders, 2);

    // the same event again: the listing no longer exists
    chain.apply(
        vec![],
        vec![listing_transfer_receipt(10, &listing_hash, ALICE, DAVE, MARKET)],
    );
    assert_eq!(
        chain.ledger().records().last().unwrap().valid,
        Verdict::ListingNotFound
    );
}

#[test]
fn exchange_with_wrong_origin_keeps_the_listing_open() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![
            inscribe(
                1,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000","lim":"100"}"#,
            ),
            inscribe(
                2,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
            ),
            inscribe(
                3,
                ALICE,
                MARKET,
                r#"{"p":"rrc-20","op":"list","tick":"rose","amt":"50"}"#,
            ),
        ],
        vec![],
    );

    let listing_hash = tx_hash(3);
    chain.apply(
        vec![],
        vec![listing_transfer_receipt(9, &listing_hash, BOB, DAVE, MARKET)],
    );

    let ledger = chain.ledger();
    assert_eq!(
        ledger.records().last().unwrap().valid,
        Verdict::ListingOriginMismatch
    );
    assert!(ledger.listing(&listing_hash).is_some());
    assert!(ledger.balance("rose", DAVE).is_none());
}

#[test]
fn amount_scale_beyond_precision_is_rejected() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![inscribe(
            1,
            ALICE,
            ALICE,
            r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000.00","lim":"100"}"#,
        )],
        vec![],
    );
    chain.apply(
        vec![inscribe(
            2,
            ALICE,
            BOB,
            r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"1.234"}"#,
        )],
        vec![],
    );

    let ledger = chain.ledger();
    assert_eq!(
        ledger.records().last().unwrap().valid,
        Verdict::PrecisionExceeded
    );
    assert!(ledger.balance("rose", BOB).is_none());
    assert!(ledger.token("rose").unwrap().minted.is_zero());
}

#[test]
fn out_of_order_blocks_are_rejected_without_side_effects() {
    let mut applier = BlockApplier::new(PROTOCOL_GENESIS_HEIGHT);
    let stray = ChainBlock {
        number: PROTOCOL_GENESIS_HEIGHT + 5,
        timestamp: 0,
        txs: vec![inscribe(
            1,
            ALICE,
            ALICE,
            r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1","lim":"1"}"#,
        )],
        receipts: vec![],
    };
    assert_eq!(
        applier.apply_block(&stray),
        Err(ApplyError::NonContiguousBlock {
            expected: PROTOCOL_GENESIS_HEIGHT + 1,
            got: PROTOCOL_GENESIS_HEIGHT + 5,
        })
    );
    assert_eq!(applier.ledger().height(), PROTOCOL_GENESIS_HEIGHT);
    assert!(applier.ledger().records().is_empty());
    assert_eq!(applier.ledger().tokens().count(), 0);
}

#[test]
fn inscription_numbers_have_no_gaps_across_blocks() {
    let mut chain = Chain::new(0);
    chain.apply(
        vec![
            inscribe(
                1,
                ALICE,
                ALICE,
                r#"{"p":"rrc-20","op":"deploy","tick":"rose","max":"1000","lim":"100"}"#,
            ),
            // inert inscription: consumes a number, no record
            inscribe(2, ALICE, BOB, "gm"),
        ],
        vec![],
    );
    chain.apply(
        vec![
            inscribe(
                3,
                ALICE,
                BOB,
                r#"{"p":"rrc-20","op":"mint","tick":"rose","amt":"100"}"#,
            ),
            // invalid operation: still numbered, recorded with -3
            inscribe(4, ALICE, BOB, r#"{"p":"rrc-20","op":"burn","tick":"rose"}"#),
        ],
        vec![],
    );

    let numbers: Vec<u64> = chain
        .ledger()
        .records()
        .iter()
        .map(|record| record.number)
        .collect();
    assert_eq!(numbers, vec![0, 2, 3]);
    assert_eq!(
        chain.ledger().records()[2].valid,
        Verdict::UnknownOperation
    );
}
