mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use zcn_client::cancel::Cancellation;
use zcn_client::client::{Availability, Client, Intent};
use zcn_client::smart_contract::{SmartContractCall, INTEREST_POOL_SC_ADDRESS, STORAGE_SC_ADDRESS};
use zcn_common::{
    new_signature_scheme, SchemeKind, Transaction, TransactionStatus, TransactionType,
    VerifyStatus, ZcnError,
};

const MINERS: [&str; 3] = ["http://m1", "http://m2", "http://m3"];
const SHARDERS: [&str; 2] = ["http://s1", "http://s2"];

fn healthy_network() -> Arc<MockTransport> {
    let transport = MockTransport::new();
    transport.set("http://m1", Behavior::Accept);
    transport.set("http://m2", Behavior::Accept);
    transport.set("http://m3", Behavior::Hang);
    transport.set("http://s1", Behavior::Accept);
    transport.set("http://s2", Behavior::Unrelated);
    transport
}

fn direct_client(transport: &Arc<MockTransport>) -> Client {
    Client::new(
        Arc::new(config(SchemeKind::Ed25519, &MINERS, &SHARDERS)),
        ed25519_wallet(1),
        transport.clone(),
    )
    .unwrap()
}

fn submitted(transport: &MockTransport) -> Transaction {
    let request = transport
        .requests()
        .into_iter()
        .find(|r| r.body.is_some())
        .unwrap();
    Transaction::from_json(&request.body.unwrap()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn send_reaches_quorum_and_confirms() {
    let transport = healthy_network();
    let callback = RecordingCallback::new();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();

    txn.send("recipient", 100, "rent").await.unwrap();

    assert_eq!(txn.transaction_status(), TransactionStatus::Success);
    assert_eq!(txn.verify_status(), VerifyStatus::Success);
    assert_eq!(txn.transaction_error(), Availability::Ready(None));
    assert_eq!(txn.verify_error(), Availability::Ready(None));
    let confirmation = txn.verify_output().ready().flatten().unwrap();
    assert_eq!(Some(confirmation.hash.as_str()), txn.transaction_hash());

    let echoed = Transaction::from_json(txn.output().ready().unwrap()).unwrap();
    assert_eq!(echoed.hash, txn.transaction().hash);

    let sent = submitted(&transport);
    assert_eq!(sent.transaction_type, TransactionType::Send);
    assert_eq!(sent.transaction_data, r#"{"note":"rent"}"#);
    assert_eq!(sent.chain_id, "test-chain");
    assert!(sent.is_hash_current());

    assert_eq!(callback.count(), 1);
    let completion = callback.last().unwrap();
    assert_eq!(completion, txn.completion());
    assert_eq!(completion.verify_status, VerifyStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn accessors_are_stable_after_completion() {
    let transport = healthy_network();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.send("recipient", 1, "").await.unwrap();

    assert_eq!(txn.output(), txn.output());
    assert_eq!(txn.verify_output(), txn.verify_output());
    assert_eq!(txn.transaction_error(), txn.transaction_error());
    assert_eq!(txn.verify_error(), txn.verify_error());
    assert!(txn.is_complete());
}

#[tokio::test(start_paused = true)]
async fn every_miner_echoing_another_hash_fails_broadcast() {
    let transport = MockTransport::new();
    for url in MINERS {
        transport.set(url, Behavior::WrongHash);
    }
    transport.set("http://s1", Behavior::Accept);
    let callback = RecordingCallback::new();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();

    let err = txn.send("recipient", 1, "").await.unwrap_err();
    assert!(matches!(err, ZcnError::BroadcastFailed(_)));
    assert_eq!(txn.transaction_status(), TransactionStatus::Error);
    assert_eq!(txn.verify_status(), VerifyStatus::Unknown);
    assert_eq!(txn.transaction_error(), Availability::Ready(Some(&err)));
    assert_eq!(txn.verify_output(), Availability::Ready(None));
    assert_eq!(transport.calls_to("http://s1"), 0);
    assert_eq!(callback.count(), 1);
    assert_eq!(callback.last().unwrap().error, Some(err.clone()));

    assert_eq!(txn.verify().await, Err(ZcnError::InvalidTransaction));
    assert_eq!(transport.calls_to("http://s1"), 0);
    assert_eq!(txn.transaction_error(), Availability::Ready(Some(&err)));
    assert_eq!(callback.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn delegated_signature_verifies_under_combined_key() {
    let transport = healthy_network();
    let (wallet, authorizer_share) = split_wallet();
    let authorizer = MockAuthorizer::new(&authorizer_share, AuthMode::Cosign);
    let client = Client::new(
        Arc::new(config(SchemeKind::Bls0Chain, &MINERS, &SHARDERS)),
        wallet.clone(),
        transport.clone(),
    )
    .unwrap()
    .with_authorizer(authorizer.clone())
    .unwrap();

    let mut txn = client.transaction().unwrap();
    txn.send("recipient", 3, "split").await.unwrap();
    assert_eq!(txn.verify_status(), VerifyStatus::Success);
    assert_eq!(authorizer.calls.load(Ordering::SeqCst), 1);

    let sent = submitted(&transport);
    assert_eq!(sent.client_id, wallet.client_id);
    assert_eq!(sent.public_key, wallet.client_key);

    let mut combined = new_signature_scheme(SchemeKind::Bls0Chain);
    combined.set_public_key(&wallet.client_key).unwrap();
    assert!(sent.verify_signature(combined.as_ref()).unwrap());

    let mut client_only = new_signature_scheme(SchemeKind::Bls0Chain);
    client_only
        .set_public_key(&wallet.primary_key().unwrap().public_key)
        .unwrap();
    assert!(!sent.verify_signature(client_only.as_ref()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn authorization_failure_never_broadcasts() {
    for mode in [AuthMode::Refuse, AuthMode::WrongHash] {
        let transport = healthy_network();
        let (wallet, authorizer_share) = split_wallet();
        let client = Client::new(
            Arc::new(config(SchemeKind::Bls0Chain, &MINERS, &SHARDERS)),
            wallet,
            transport.clone(),
        )
        .unwrap()
        .with_authorizer(MockAuthorizer::new(&authorizer_share, mode))
        .unwrap();
        let callback = RecordingCallback::new();
        let mut txn = client.transaction().unwrap();
        txn.set_transaction_callback(callback.clone()).unwrap();

        let err = txn.send("recipient", 3, "split").await.unwrap_err();
        assert!(matches!(err, ZcnError::AuthorizationFailed(_)), "{mode:?}: {err}");
        assert_eq!(transport.total_calls(), 0);
        assert_eq!(txn.transaction_status(), TransactionStatus::Error);
        assert_eq!(callback.count(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn smart_contract_calls_target_their_contract() {
    let transport = healthy_network();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.lock_tokens(500, 1, 1).await.unwrap();

    let sent = submitted(&transport);
    assert_eq!(sent.to_client_id, INTEREST_POOL_SC_ADDRESS);
    assert_eq!(sent.transaction_type, TransactionType::SmartContract);
    assert_eq!(sent.value, 500);
    assert_eq!(sent.transaction_data, r#"{"name":"lock","input":{"duration":"1h1m"}}"#);

    let transport = healthy_network();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.cancel_allocation("alloc-1").await.unwrap();
    let sent = submitted(&transport);
    assert_eq!(sent.to_client_id, STORAGE_SC_ADDRESS);
    assert_eq!(
        sent.transaction_data,
        r#"{"name":"cancel_allocation","input":{"allocation_id":"alloc-1"}}"#
    );
}

#[tokio::test(start_paused = true)]
async fn fee_and_nonce_are_part_of_the_submission() {
    let transport = healthy_network();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.set_transaction_fee(7).unwrap();
    txn.set_transaction_nonce(3).unwrap();
    txn.store_data("payload").await.unwrap();

    let sent = submitted(&transport);
    assert_eq!(sent.fee, 7);
    assert_eq!(sent.nonce, 3);
    assert_eq!(sent.transaction_type, TransactionType::Data);
    assert!(sent.is_hash_current());
    assert_eq!(
        txn.set_transaction_fee(8).unwrap_err(),
        ZcnError::AlreadyExists("transaction fee".into())
    );
    assert!(txn.set_transaction_callback(RecordingCallback::new()).is_err());
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeout_can_be_polled_again() {
    let transport = healthy_network();
    transport.script(
        "http://s1",
        vec![
            Behavior::Status(404),
            Behavior::Status(404),
            Behavior::Status(404),
            Behavior::Accept,
        ],
    );
    let callback = RecordingCallback::new();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();

    let err = txn.send("recipient", 1, "").await.unwrap_err();
    assert!(matches!(err, ZcnError::ConfirmationTimeout(_)));
    assert_eq!(txn.transaction_status(), TransactionStatus::Success);
    assert_eq!(txn.verify_status(), VerifyStatus::Fail);
    assert_eq!(txn.verify_error(), Availability::Ready(Some(&err)));

    txn.verify().await.unwrap();
    assert_eq!(txn.verify_status(), VerifyStatus::Success);
    assert_eq!(txn.verify_error(), Availability::Ready(None));
    assert_eq!(callback.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn included_as_failed_is_rejection() {
    let transport = healthy_network();
    transport.set("http://s1", Behavior::IncludeFailed);
    let mut txn = direct_client(&transport).transaction().unwrap();

    let err = txn.send("recipient", 1, "").await.unwrap_err();
    assert!(matches!(err, ZcnError::ConfirmationRejected(_)));
    assert_eq!(txn.verify_status(), VerifyStatus::Fail);
}

#[tokio::test(start_paused = true)]
async fn adopted_hash_is_verified() {
    let transport = healthy_network();
    let known = signed_transfer(9);
    transport.remember(&known);
    let callback = RecordingCallback::new();
    let mut txn = direct_client(&transport).transaction().unwrap();
    txn.set_transaction_hash(&known.hash).unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();

    txn.verify().await.unwrap();
    assert_eq!(txn.verify_status(), VerifyStatus::Success);
    assert_eq!(txn.transaction_status(), TransactionStatus::Unsent);
    assert!(matches!(
        txn.send("recipient", 1, "").await,
        Err(ZcnError::Validation(_))
    ));
    assert_eq!(callback.count(), 1);
    assert_eq!(callback.last().unwrap().hash, known.hash);
}

#[tokio::test(start_paused = true)]
async fn spawned_orchestrator_reports_through_callback() {
    let transport = healthy_network();
    let client = direct_client(&transport);

    let callback = RecordingCallback::new();
    let mut txn = client.transaction().unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();
    let handle = txn.spawn(Intent::Call {
        call: SmartContractCall::CreateReadPool,
        value: 0,
    });
    let txn = handle.await.unwrap();
    assert_eq!(txn.verify_status(), VerifyStatus::Success);
    assert_eq!(callback.count(), 1);

    let callback = RecordingCallback::new();
    let mut txn = client.transaction().unwrap();
    txn.set_transaction_callback(callback.clone()).unwrap();
    let txn = txn
        .spawn(Intent::Send {
            to_client_id: String::new(),
            value: 1,
            description: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(txn.transaction_status(), TransactionStatus::Error);
    assert!(matches!(
        callback.last().unwrap().error,
        Some(ZcnError::Validation(_))
    ));
    assert_eq!(callback.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn independent_orchestrators_run_concurrently() {
    let transport = healthy_network();
    transport.set("http://m4", Behavior::Accept);
    transport.set("http://m5", Behavior::Fail);

    let lenient = direct_client(&transport);
    let strict = Client::new(
        Arc::new(zcn_client::config::ClientConfig {
            min_submit: 1.0,
            ..config(SchemeKind::Ed25519, &["http://m4", "http://m5"], &SHARDERS)
        }),
        ed25519_wallet(2),
        transport.clone(),
    )
    .unwrap();

    let mut a = lenient.transaction().unwrap();
    let mut b = strict.transaction().unwrap();
    let (ra, rb) = tokio::join!(a.send("x", 1, "a"), b.send("y", 2, "b"));
    assert!(ra.is_ok());
    assert!(matches!(rb, Err(ZcnError::BroadcastFailed(_))));
    assert_ne!(a.transaction_hash(), b.transaction_hash());
    assert_eq!(a.verify_status(), VerifyStatus::Success);
    assert_eq!(b.verify_status(), VerifyStatus::Unknown);
}

#[tokio::test(start_paused = true)]
async fn cancelled_broadcast_is_a_timeout() {
    let transport = MockTransport::new();
    for url in MINERS {
        transport.set(url, Behavior::Hang);
    }
    let client = direct_client(&transport);
    let cancel = Cancellation::never().with_timeout(Duration::from_millis(500));
    let mut txn = client.transaction_with_cancel(cancel).unwrap();

    let err = txn.send("recipient", 1, "").await.unwrap_err();
    assert!(matches!(err, ZcnError::Timeout(_)));
    assert_eq!(txn.transaction_status(), TransactionStatus::Error);
}
