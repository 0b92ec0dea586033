// RGB Engine: deterministic validation of client-side-validated asset
// contracts.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2025 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2025 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2019-2025 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end contract lifecycles run through the validation engine.

use rgbengine::ifaces::{
    self, GS_BURNED, GS_FRACTIONS, GS_ISSUED, GS_NAME, GS_PRECISION, GS_TICKER, OS_AMOUNT,
    OS_FRACTION, OS_INFLATION, OS_RENOMINATION, TS_BURN, TS_INFLATE, TS_RENOMINATE, TS_TRANSFER,
};
use rgbengine::validation::{Engine, Failure, Outcome, Step};
use rgbengine::{
    Allocation, Amount, AuthToken, ContractId, FieldValue, MaybeKnown, Operation, Opout,
    OwnedFraction, OwnedState, TokenIndex,
};

fn auth(seed: u8) -> AuthToken { AuthToken::from_array([seed; 32]) }

fn rgb20_engine() -> (Engine, Operation, ContractId) {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb20::non_inflatable())
        .unwrap();
    let genesis = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Test asset")
        .add_global(GS_TICKER, "TEST")
        .add_global(GS_PRECISION, 8u64)
        .add_global(GS_ISSUED, 1000u64)
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(1));
    let contract_id = ContractId::from(genesis.id());
    (engine, genesis, contract_id)
}

#[test]
fn fungible_issue_and_transfer() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis.clone()).unwrap();

    let transfer = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(600), auth(2))
        .add_assignment(OS_AMOUNT, Amount::with(400), auth(3));
    let outcome = engine.submit(transfer.clone()).unwrap();
    assert!(matches!(outcome, Outcome::Committed { .. }));

    let state = engine.contract(contract_id).unwrap().state();
    assert_eq!(state.unspent_sum(OS_AMOUNT), Some(1000));
    assert!(state.owned(Opout::new(genesis.id(), 0)).unwrap().is_spent());
}

#[test]
fn inflating_transfer_is_rejected() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis.clone()).unwrap();
    let transfer = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(600), auth(2))
        .add_assignment(OS_AMOUNT, Amount::with(500), auth(3));

    let rejection = engine.submit(transfer.clone()).unwrap_err();
    assert_eq!(rejection.step, Step::PredicateChecked);
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(transfer.id(), "inflation".into())
    );
    // A rejected operation must leave no trace in the contract.
    let contract = engine.contract(contract_id).unwrap();
    assert_eq!(contract.graph().len(), 1);
    assert!(!contract
        .state()
        .owned(Opout::new(genesis.id(), 0))
        .unwrap()
        .is_spent());
}

#[test]
fn conservation_holds_across_transfer_chains() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis.clone()).unwrap();

    let split = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(250), auth(2))
        .add_assignment(OS_AMOUNT, Amount::with(750), auth(3));
    engine.submit(split.clone()).unwrap();

    let merge = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(split.id(), 0))
        .add_input(Opout::new(split.id(), 1))
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(4));
    engine.submit(merge).unwrap();

    let state = engine.contract(contract_id).unwrap().state();
    assert_eq!(state.unspent_sum(OS_AMOUNT), Some(1000));
    assert_eq!(
        engine.query(contract_id, "circulating").unwrap(),
        MaybeKnown::Known(Amount::with(1000))
    );
}

#[test]
fn double_spend_commits_exactly_one() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis.clone()).unwrap();
    let prev = Opout::new(genesis.id(), 0);

    let first = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(prev)
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(2));
    let second = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(prev)
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(3));

    let verdicts = engine.submit_all([first.clone(), second.clone()]);
    assert!(matches!(verdicts[0], Ok(Outcome::Committed { .. })));
    let rejection = verdicts[1].as_ref().unwrap_err();
    assert_eq!(rejection.step, Step::Bound);
    assert_eq!(
        rejection.failure,
        Failure::DoubleSpend(second.id(), prev, first.id())
    );
}

#[test]
fn resubmission_is_a_noop() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis.clone()).unwrap();
    let transfer = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(2));
    engine.submit(transfer.clone()).unwrap();

    assert_eq!(
        engine.submit(transfer.clone()).unwrap(),
        Outcome::Duplicate(transfer.id())
    );
    assert_eq!(engine.contract(contract_id).unwrap().graph().len(), 2);
}

#[test]
fn nft_fractions_must_complete_the_whole() {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb21::fractional())
        .unwrap();

    let token = TokenIndex::with(1);
    let complete = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Artwork")
        .add_global(GS_FRACTIONS, 10u64)
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(5)),
            auth(1),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(5)),
            auth(2),
        );
    engine.submit(complete).unwrap();

    let incomplete = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Artwork II")
        .add_global(GS_FRACTIONS, 10u64)
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(5)),
            auth(1),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(4)),
            auth(2),
        );
    let rejection = engine.submit(incomplete.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(incomplete.id(), "incompleteFractions".into())
    );
}

#[test]
fn multi_token_genesis_requires_each_token_complete() {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb21::fractional())
        .unwrap();

    // Two tokens whose units add up to the whole, yet each individually
    // incomplete.
    let incomplete = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Diptych")
        .add_global(GS_FRACTIONS, 10u64)
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(1), OwnedFraction::with(6)),
            auth(1),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(2), OwnedFraction::with(4)),
            auth(2),
        );
    let rejection = engine.submit(incomplete.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(incomplete.id(), "incompleteFractions".into())
    );

    // Every token complete, with one of them split across two holders.
    let complete = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Diptych")
        .add_global(GS_FRACTIONS, 10u64)
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(1), OwnedFraction::with(10)),
            auth(1),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(2), OwnedFraction::with(6)),
            auth(2),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(2), OwnedFraction::with(4)),
            auth(3),
        );
    engine.submit(complete).unwrap();
}

#[test]
fn nft_transfer_cannot_swap_token_identity() {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb21::fractional())
        .unwrap();
    let genesis = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Collection")
        .add_global(GS_FRACTIONS, 10u64)
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(1), OwnedFraction::with(10)),
            auth(1),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(2), OwnedFraction::with(10)),
            auth(2),
        );
    let contract_id = ContractId::from(genesis.id());
    engine.submit(genesis.clone()).unwrap();

    // Re-emitting the consumed units under a fresh token index would mint a
    // token which was never part of the collection.
    let swap = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(3), OwnedFraction::with(10)),
            auth(3),
        );
    let rejection = engine.submit(swap.clone()).unwrap_err();
    assert_eq!(rejection.step, Step::PredicateChecked);
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(swap.id(), "inflation".into())
    );

    // Rebalancing units between existing tokens is equally denied.
    let rebalance = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_input(Opout::new(genesis.id(), 1))
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(1), OwnedFraction::with(15)),
            auth(3),
        )
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(2), OwnedFraction::with(5)),
            auth(4),
        );
    let rejection = engine.submit(rebalance.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(rebalance.id(), "inflation".into())
    );

    // The same units under the same token index change hands freely.
    let transfer = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(
            OS_FRACTION,
            Allocation::with(TokenIndex::with(1), OwnedFraction::with(10)),
            auth(3),
        );
    assert!(matches!(
        engine.submit(transfer).unwrap(),
        Outcome::Committed { .. }
    ));
}

#[test]
fn undeclared_fractions_default_to_indivisible() {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb21::fractional())
        .unwrap();
    let token = TokenIndex::with(1);

    let indivisible = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Singleton")
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(1)),
            auth(1),
        );
    engine.submit(indivisible).unwrap();

    let oversized = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Singleton II")
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(2)),
            auth(1),
        );
    let rejection = engine.submit(oversized.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(oversized.id(), "incompleteFractions".into())
    );
}

#[test]
fn nft_transfer_conserves_fractions() {
    let mut engine = Engine::new();
    let schema_id = engine.register_schema(ifaces::rgb21::unique()).unwrap();
    let token = TokenIndex::with(1);
    let genesis = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Artwork")
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(1)),
            auth(1),
        );
    let contract_id = ContractId::from(genesis.id());
    engine.submit(genesis.clone()).unwrap();

    let transfer = Operation::transition(contract_id, TS_TRANSFER)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(
            OS_FRACTION,
            Allocation::with(token, OwnedFraction::with(1)),
            auth(2),
        );
    engine.submit(transfer).unwrap();

    let state = engine.contract(contract_id).unwrap().state();
    let holders = state.unspent(OS_FRACTION).collect::<Vec<_>>();
    assert_eq!(holders.len(), 1);
    assert_eq!(
        holders[0].1.state,
        OwnedState::Allocation(Allocation::with(token, OwnedFraction::with(1)))
    );
}

fn inflatable_engine(max_supply: u64) -> (Engine, Operation, ContractId) {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb20::inflatable(max_supply))
        .unwrap();
    let genesis = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Inflatable asset")
        .add_global(GS_TICKER, "INFL")
        .add_global(GS_PRECISION, 8u64)
        .add_global(GS_ISSUED, 1000u64)
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(1))
        .add_assignment(OS_INFLATION, OwnedState::Rights, auth(2));
    let contract_id = ContractId::from(genesis.id());
    (engine, genesis, contract_id)
}

#[test]
fn total_issued_stays_unknown_until_rights_are_spent() {
    let (mut engine, genesis, contract_id) = inflatable_engine(5000);
    engine.submit(genesis.clone()).unwrap();

    // An unspent inflation right means further issues may exist elsewhere.
    assert_eq!(
        engine.query(contract_id, "totalIssued").unwrap(),
        MaybeKnown::Unknown
    );
    assert_eq!(
        engine.query(contract_id, "knownIssued").unwrap(),
        MaybeKnown::Known(Amount::with(1000))
    );

    // Spending the right without producing a new one seals the supply.
    let inflate = Operation::transition(contract_id, TS_INFLATE)
        .add_global(GS_ISSUED, 500u64)
        .add_input(Opout::new(genesis.id(), 1))
        .add_assignment(OS_AMOUNT, Amount::with(500), auth(3));
    engine.submit(inflate).unwrap();

    assert_eq!(
        engine.query(contract_id, "totalIssued").unwrap(),
        MaybeKnown::Known(Amount::with(1500))
    );
    assert_eq!(
        engine.query(contract_id, "circulating").unwrap(),
        MaybeKnown::Known(Amount::with(1500))
    );
}

#[test]
fn inflation_above_max_supply_is_rejected() {
    let (mut engine, genesis, contract_id) = inflatable_engine(1200);
    engine.submit(genesis.clone()).unwrap();

    let inflate = Operation::transition(contract_id, TS_INFLATE)
        .add_global(GS_ISSUED, 500u64)
        .add_input(Opout::new(genesis.id(), 1))
        .add_assignment(OS_AMOUNT, Amount::with(500), auth(3));
    let rejection = engine.submit(inflate.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(inflate.id(), "maxSupplyExceeded".into())
    );
}

#[test]
fn burn_reduces_circulating_supply() {
    let (mut engine, genesis, contract_id) = inflatable_engine(5000);
    engine.submit(genesis.clone()).unwrap();

    // Seal the supply first so that circulating becomes definite.
    let inflate = Operation::transition(contract_id, TS_INFLATE)
        .add_global(GS_ISSUED, 0u64)
        .add_input(Opout::new(genesis.id(), 1))
        .add_assignment(OS_AMOUNT, Amount::with(0), auth(3));
    engine.submit(inflate).unwrap();

    let burn = Operation::transition(contract_id, TS_BURN)
        .add_global(GS_BURNED, 400u64)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(600), auth(4));
    engine.submit(burn).unwrap();

    assert_eq!(
        engine.query(contract_id, "knownBurned").unwrap(),
        MaybeKnown::Known(Amount::with(400))
    );
    assert_eq!(
        engine.query(contract_id, "circulating").unwrap(),
        MaybeKnown::Known(Amount::with(600))
    );
}

#[test]
fn burn_must_declare_the_burned_amount() {
    let (mut engine, genesis, contract_id) = inflatable_engine(5000);
    engine.submit(genesis.clone()).unwrap();

    let burn = Operation::transition(contract_id, TS_BURN)
        .add_global(GS_BURNED, 400u64)
        .add_input(Opout::new(genesis.id(), 0))
        .add_assignment(OS_AMOUNT, Amount::with(700), auth(4));
    let rejection = engine.submit(burn.clone()).unwrap_err();
    assert_eq!(
        rejection.failure,
        Failure::PredicateFailed(burn.id(), "invalidBurn".into())
    );
}

#[test]
fn renomination_requires_the_right() {
    let (mut engine, genesis, contract_id) = inflatable_engine(5000);
    engine.submit(genesis.clone()).unwrap();

    // The genesis above assigned no renomination right; closing a balance
    // output instead violates the transition structure.
    let renominate = Operation::transition(contract_id, ifaces::TS_RENOMINATE)
        .add_global(GS_TICKER, "NEW")
        .add_input(Opout::new(genesis.id(), 0));
    let rejection = engine.submit(renominate).unwrap_err();
    assert_eq!(rejection.step, Step::Bound);
}

#[test]
fn renomination_replaces_nomination_and_may_reissue_the_right() {
    let mut engine = Engine::new();
    let schema_id = engine
        .register_schema(ifaces::rgb20::inflatable(5000))
        .unwrap();
    let genesis = Operation::genesis(schema_id)
        .add_global(GS_NAME, "Inflatable asset")
        .add_global(GS_TICKER, "OLD")
        .add_global(GS_PRECISION, 8u64)
        .add_global(GS_ISSUED, 1000u64)
        .add_assignment(OS_AMOUNT, Amount::with(1000), auth(1))
        .add_assignment(OS_RENOMINATION, OwnedState::Rights, auth(2));
    let contract_id = ContractId::from(genesis.id());
    engine.submit(genesis.clone()).unwrap();

    let renominate = Operation::transition(contract_id, TS_RENOMINATE)
        .add_global(GS_TICKER, "NEW")
        .add_input(Opout::new(genesis.id(), 1))
        .add_assignment(OS_RENOMINATION, OwnedState::Rights, auth(3));
    let renominate_id = renominate.id();
    engine.submit(renominate).unwrap();

    let state = engine.contract(contract_id).unwrap().state();
    // The new ticker supersedes the old one; untouched nomination fields stay.
    assert_eq!(state.global(GS_TICKER), &[FieldValue::from("NEW")]);
    assert_eq!(state.global(GS_NAME), &[FieldValue::from("Inflatable asset")]);

    // The freshly issued right is spendable in a further renomination.
    let fresh = Opout::new(renominate_id, 0);
    assert!(!state.owned(fresh).unwrap().is_spent());
    let again = Operation::transition(contract_id, TS_RENOMINATE)
        .add_global(GS_NAME, "Renamed asset")
        .add_input(fresh);
    engine.submit(again).unwrap();

    let state = engine.contract(contract_id).unwrap().state();
    assert_eq!(state.global(GS_NAME), &[FieldValue::from("Renamed asset")]);
    assert!(state.owned(fresh).unwrap().is_spent());
}

#[test]
fn aggregate_queries_validate_their_targets() {
    let (mut engine, genesis, contract_id) = rgb20_engine();
    engine.submit(genesis).unwrap();

    assert!(engine.query(contract_id, "noSuchAggregate").is_err());
    assert!(engine
        .query(ContractId::from_array([0xEE; 32]), "circulating")
        .is_err());
}
