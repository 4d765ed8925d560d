//! Permit construction, signing, and execution against scripted contracts.
use alloy::{
    primitives::{Address, Bytes, U256},
    signers::Signer,
};
use clearsig_bindings::{IERC20Permit, IERC5267};
use clearsig_constants::{
    test_utils::{CHAIN_ID, NETWORK, OVERRIDDEN_TOKEN, OVERRIDES, SPENDER, TOKEN},
    DomainOverrides, StaticNetworks,
};
use clearsig_flows::{
    CapabilityError, ExecutionDispatcher, ExecutionError, ExecutionState, PermitError,
    PermitExecution, PermitOptions, PermitTypedDataBuilder, ProbeOutcome, Recovery, SignError,
    SignedPermit, SigningGate, TokenCapabilityResolver,
};
use clearsig_test_utils::{
    fixtures::{eip5267_domain, permit_token, plain_token, TOKEN_NAME},
    reader::{MockChainReader, MockResponse},
    relay::MockRelayer,
    users::{TEST_SIGNERS, TEST_USERS},
    writer::MockWriter,
};
use clearsig_types::{AmountError, HumanAmount, SignatureParts};

const DEADLINE: u64 = 1_700_003_600;

fn builder(reader: &MockChainReader) -> PermitTypedDataBuilder<MockChainReader> {
    let resolver = TokenCapabilityResolver::new(reader.clone())
        .with_overrides(DomainOverrides::from_entries(OVERRIDES));
    PermitTypedDataBuilder::new(resolver)
        .with_options(PermitOptions::default().with_deadline(DEADLINE))
}

fn dispatcher(writer: &MockWriter) -> ExecutionDispatcher<MockWriter, MockRelayer> {
    ExecutionDispatcher::new(writer.clone())
        .with_networks(StaticNetworks::known().with_record(NETWORK))
}

fn amount(s: &str) -> HumanAmount {
    HumanAmount::parse(s).unwrap()
}

async fn signed_permit(reader: &MockChainReader) -> SignedPermit {
    let owner = TEST_USERS[0];
    let prepared =
        builder(reader).build(TOKEN, owner, SPENDER, &amount("1.5"), CHAIN_ID).await.unwrap();
    let signature = SigningGate::new()
        .sign_typed_data(&TEST_SIGNERS[0], reader, prepared.envelope())
        .await
        .unwrap();
    SignedPermit::new(CHAIN_ID, *prepared.params(), signature)
}

#[tokio::test]
async fn builds_and_signs_permit() {
    clearsig_test_utils::init_tracing();
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    reader.on_call(
        TOKEN,
        &IERC20Permit::noncesCall { owner: TEST_USERS[0] },
        MockResponse::value(&U256::from(3)),
    );

    let owner = TEST_USERS[0];
    let prepared =
        builder(&reader).build(TOKEN, owner, SPENDER, &amount("1.5"), CHAIN_ID).await.unwrap();

    let envelope = prepared.envelope();
    assert_eq!(envelope.domain().name.as_deref(), Some(TOKEN_NAME));
    assert_eq!(envelope.domain().version.as_deref(), Some("1"));
    assert_eq!(envelope.chain_id(), Some(CHAIN_ID));
    assert_eq!(envelope.verifying_contract(), Some(TOKEN));

    let message = envelope.message();
    assert_eq!(message.owner, owner);
    assert_eq!(message.spender, SPENDER);
    assert_eq!(message.value, U256::from(1_500_000));
    assert_eq!(message.nonce, U256::from(3));
    assert_eq!(message.deadline, U256::from(DEADLINE));

    assert_eq!(prepared.metadata().decimals, 6);
    assert_eq!(prepared.metadata().supports_permit, Some(true));
    assert_eq!(prepared.metadata().used_eip5267, Some(false));
    assert_eq!(prepared.params().token_address, TOKEN);
    assert_eq!(prepared.params().chain_id, CHAIN_ID);

    let signature = SigningGate::new()
        .sign_typed_data(&TEST_SIGNERS[0], &reader, envelope)
        .await
        .unwrap();
    let recovered = signature
        .to_signature()
        .unwrap()
        .recover_address_from_prehash(&envelope.signing_hash())
        .unwrap();
    assert_eq!(recovered, owner);

    // The joined signature splits back into the same components.
    assert_eq!(SignatureParts::split(&signature.join()).unwrap(), signature);
}

#[tokio::test]
async fn permit_unsupported() {
    let reader = MockChainReader::new(CHAIN_ID);
    plain_token(&reader, TOKEN, 18);

    let err = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("1"), CHAIN_ID)
        .await
        .unwrap_err();
    let PermitError::PermitUnsupported(token) = err else {
        panic!("expected unsupported, got {err:?}")
    };
    assert_eq!(token, TOKEN);

    // Only the two probes were made. No owner nonce was read.
    let nonces = reader.calls_of::<IERC20Permit::noncesCall>(TOKEN);
    assert_eq!(nonces, vec![IERC20Permit::noncesCall { owner: Address::ZERO }]);
    assert_eq!(reader.calls().len(), 2);
}

#[tokio::test]
async fn domain_separator_alone_is_enough() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    reader.on_call(
        TOKEN,
        &IERC20Permit::noncesCall { owner: Address::ZERO },
        MockResponse::revert(),
    );

    let resolver = TokenCapabilityResolver::new(reader.clone());
    assert!(resolver.check_permit_support(TOKEN).await.unwrap());
}

#[tokio::test]
async fn transport_failure_is_not_unsupported() {
    let reader = MockChainReader::new(CHAIN_ID);
    plain_token(&reader, TOKEN, 6);
    reader.on::<IERC20Permit::noncesCall>(TOKEN, MockResponse::rpc("connection reset"));

    let err = TokenCapabilityResolver::new(reader.clone())
        .check_permit_support(TOKEN)
        .await
        .unwrap_err();
    let CapabilityError::Indeterminate { token, probe, .. } = err else {
        panic!("expected indeterminate, got {err:?}")
    };
    assert_eq!((token, probe), (TOKEN, "EIP-2612"));
}

#[tokio::test]
async fn metadata_unavailable() {
    let reader = MockChainReader::new(CHAIN_ID);

    let err = TokenCapabilityResolver::new(reader.clone())
        .resolve_metadata(TOKEN, CHAIN_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, CapabilityError::MetadataUnavailable { token, .. } if token == TOKEN));
}

#[tokio::test]
async fn metadata_requires_matching_chain() {
    let reader = MockChainReader::new(CHAIN_ID);
    plain_token(&reader, TOKEN, 6);
    let resolver = TokenCapabilityResolver::new(reader.clone());

    let metadata = resolver.resolve_metadata(TOKEN, CHAIN_ID).await.unwrap();
    assert_eq!(metadata.decimals, 6);

    let err = resolver.resolve_metadata(TOKEN, 1).await.unwrap_err();
    assert!(matches!(err, CapabilityError::ChainMismatch { expected: 1, actual: CHAIN_ID }));

    reader.disconnect();
    let err = resolver.resolve_metadata(TOKEN, CHAIN_ID).await.unwrap_err();
    assert!(matches!(err, CapabilityError::ChainId(_)));
}

#[tokio::test]
async fn eip5267_detection() {
    let reader = MockChainReader::new(CHAIN_ID);
    let resolver = TokenCapabilityResolver::new(reader.clone());

    // Unscripted calls revert.
    assert!(!resolver.check_eip5267(TOKEN).await.unwrap());

    eip5267_domain(&reader, TOKEN, TOKEN_NAME, "2", CHAIN_ID);
    assert!(resolver.check_eip5267(TOKEN).await.unwrap());
    let report = resolver.eip5267_report(TOKEN).await;
    assert_eq!(report.outcome, ProbeOutcome::Supported);
    assert_eq!(report.domain.unwrap().version.as_deref(), Some("2"));

    // Transport failures leave support unknown.
    reader.on::<IERC5267::eip712DomainCall>(TOKEN, MockResponse::rpc("connection reset"));
    let err = resolver.check_eip5267(TOKEN).await.unwrap_err();
    assert!(matches!(err, CapabilityError::Indeterminate { probe: "EIP-5267", .. }));
}

#[tokio::test]
async fn truncated_eip5267_return_is_supported() {
    let reader = MockChainReader::new(CHAIN_ID);
    let resolver = TokenCapabilityResolver::new(reader.clone());

    // Shorter than the domain tuple's head.
    let truncated = Bytes::from(vec![0u8; 32]);
    reader.on::<IERC5267::eip712DomainCall>(TOKEN, MockResponse::Return(truncated));
    assert!(resolver.check_eip5267(TOKEN).await.unwrap());
    let report = resolver.eip5267_report(TOKEN).await;
    assert_eq!(report.outcome, ProbeOutcome::Supported);
    assert!(!report.has_domain());
}

#[tokio::test]
async fn empty_eip5267_return_is_unsupported() {
    let reader = MockChainReader::new(CHAIN_ID);
    let resolver = TokenCapabilityResolver::new(reader.clone());

    // An address without code answers every call with empty data.
    reader.on::<IERC5267::eip712DomainCall>(TOKEN, MockResponse::Return(Bytes::new()));
    assert!(!resolver.check_eip5267(TOKEN).await.unwrap());
    let report = resolver.eip5267_report(TOKEN).await;
    assert_eq!(report.outcome, ProbeOutcome::Unsupported);
    assert!(!report.has_domain());

    // The same holds for the permit probes.
    plain_token(&reader, TOKEN, 6);
    reader
        .on::<IERC20Permit::noncesCall>(TOKEN, MockResponse::Return(Bytes::new()))
        .on::<IERC20Permit::DOMAIN_SEPARATORCall>(TOKEN, MockResponse::Return(Bytes::new()));
    assert!(!resolver.check_permit_support(TOKEN).await.unwrap());
}

#[tokio::test]
async fn amount_validation() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);

    let err = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("1.0000001"), CHAIN_ID)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PermitError::Amount(AmountError::AmountPrecisionExceeded { decimals: 6, .. })
    ));

    // Zero is rejected before any read.
    let calls = reader.calls().len();
    let err = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("0.000"), CHAIN_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, PermitError::Amount(AmountError::Zero)));
    assert_eq!(reader.calls().len(), calls);
}

#[tokio::test]
async fn domain_override_applies() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, OVERRIDDEN_TOKEN, 6, 0);

    let prepared = builder(&reader)
        .build(OVERRIDDEN_TOKEN, TEST_USERS[0], SPENDER, &amount("2"), CHAIN_ID)
        .await
        .unwrap();
    let domain = prepared.envelope().domain();
    assert_eq!(domain.version.as_deref(), Some("2"));
    assert_eq!(domain.chain_id, Some(U256::from(1)));
    // The request itself stays on the connected chain.
    assert_eq!(prepared.params().chain_id, CHAIN_ID);
}

#[tokio::test]
async fn eip5267_domain_is_used() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    eip5267_domain(&reader, TOKEN, "Test Token (Bridged)", "2", CHAIN_ID);

    let prepared = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("2"), CHAIN_ID)
        .await
        .unwrap();
    let domain = prepared.envelope().domain();
    assert_eq!(domain.name.as_deref(), Some("Test Token (Bridged)"));
    assert_eq!(domain.version.as_deref(), Some("2"));
    assert_eq!(prepared.metadata().used_eip5267, Some(true));
}

#[tokio::test]
async fn wrong_chain_is_rejected() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);

    let err = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("1"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PermitError::ChainMismatch { expected: 1, actual: CHAIN_ID }));

    // The wallet switches chains between building and signing.
    let prepared = builder(&reader)
        .build(TOKEN, TEST_USERS[0], SPENDER, &amount("1"), CHAIN_ID)
        .await
        .unwrap();
    reader.set_chain_id(10);
    let err = SigningGate::new()
        .sign_typed_data(&TEST_SIGNERS[0], &reader, prepared.envelope())
        .await
        .unwrap_err();
    assert!(matches!(err, SignError::ChainMismatch { expected: CHAIN_ID, actual: 10 }));

    // A signer bound to another chain is refused too.
    reader.set_chain_id(CHAIN_ID);
    let signer = TEST_SIGNERS[0].clone().with_chain_id(Some(1));
    let err = SigningGate::new()
        .sign_typed_data(&signer, &reader, prepared.envelope())
        .await
        .unwrap_err();
    assert!(matches!(err, SignError::ChainMismatch { expected: CHAIN_ID, actual: 1 }));
}

#[tokio::test]
async fn permit_only_execution() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    let dispatcher = dispatcher(&writer);
    let report =
        dispatcher.submit_permit(&mut request, PermitExecution::PermitOnly).await.unwrap();

    let sent = writer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, TOKEN);
    let call = sent[0].decode::<IERC20Permit::permitCall>();
    assert_eq!(call, request.payload().permit_call(request.signature()));

    assert_eq!(report.tx_hash, sent[0].tx_hash);
    assert_eq!(report.request_id, request.id());
    assert_eq!(
        report.explorer_url.as_deref(),
        Some(format!("https://explorer.test/tx/{}", sent[0].tx_hash).as_str())
    );
    assert_eq!(request.state(), &ExecutionState::Submitting { tx_hash: Some(report.tx_hash) });

    let confirmed = dispatcher.confirm(&mut request).await.unwrap();
    assert_eq!(confirmed.block_number, Some(1));
    assert_eq!(
        request.state(),
        &ExecutionState::Confirmed { tx_hash: report.tx_hash, block_number: Some(1) }
    );
}

#[tokio::test]
async fn permit_and_transfer() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    let report = dispatcher(&writer)
        .execute_permit(&mut request, PermitExecution::PermitAndTransfer)
        .await
        .unwrap();

    let sent = writer.sent();
    assert_eq!(sent.len(), 2);
    let transfer = sent[1].decode::<IERC20Permit::transferFromCall>();
    assert_eq!(transfer.from, TEST_USERS[0]);
    assert_eq!(transfer.to, SPENDER);
    assert_eq!(transfer.value, U256::from(1_500_000));
    assert_eq!(report.tx_hash, sent[1].tx_hash);
    assert!(matches!(request.state(), ExecutionState::Confirmed { .. }));
}

#[tokio::test]
async fn reverted_permit_aborts_transfer() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    writer.revert_calls::<IERC20Permit::permitCall>();
    let err = dispatcher(&writer)
        .submit_permit(&mut request, PermitExecution::PermitAndTransfer)
        .await
        .unwrap_err();

    let sent = writer.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(err, ExecutionError::Reverted(hash) if hash == sent[0].tx_hash));
    assert_eq!(err.recovery(), Some(Recovery::Resign));
    assert!(matches!(
        request.state(),
        ExecutionState::Failed { recovery: Some(Recovery::Resign), tx_hash: Some(_), .. }
    ));
    assert!(request.retry().is_err());
}

#[tokio::test]
async fn rejected_send_can_be_resubmitted() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    let dispatcher = dispatcher(&writer);
    writer.reject_sends(Some("insufficient funds for gas"));
    let err =
        dispatcher.submit_permit(&mut request, PermitExecution::PermitOnly).await.unwrap_err();
    assert!(matches!(err, ExecutionError::NotSubmitted(_)));
    assert_eq!(err.recovery(), Some(Recovery::Resubmit));
    assert!(writer.sent().is_empty());

    // Retrying is explicit and reuses the same signature.
    let signature = *request.signature();
    request.retry().unwrap();
    writer.reject_sends(None);
    dispatcher.execute_permit(&mut request, PermitExecution::PermitOnly).await.unwrap();
    assert_eq!(request.signature(), &signature);
    assert!(matches!(request.state(), ExecutionState::Confirmed { .. }));
}

#[tokio::test]
async fn missing_receipt_keeps_hash() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    writer.withhold_receipts(true);
    let err = dispatcher(&writer)
        .execute_permit(&mut request, PermitExecution::PermitOnly)
        .await
        .unwrap_err();
    assert_eq!(err.recovery(), Some(Recovery::AwaitReceipt));
    let tx_hash = writer.sent()[0].tx_hash;
    assert_eq!(request.state().tx_hash(), Some(tx_hash));

    // The same transaction is awaited again, nothing is resent.
    writer.withhold_receipts(false);
    let dispatcher = dispatcher(&writer);
    assert_eq!(dispatcher.confirm(&mut request).await.unwrap().tx_hash, tx_hash);
    assert_eq!(writer.sent().len(), 1);
    assert!(matches!(request.state(), ExecutionState::Confirmed { .. }));
}

#[tokio::test]
async fn pending_permit_receipt_still_sends_transfer() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    let dispatcher = dispatcher(&writer);
    writer.withhold_receipts(true);
    let err = dispatcher
        .execute_permit(&mut request, PermitExecution::PermitAndTransfer)
        .await
        .unwrap_err();

    let permit_hash = writer.sent()[0].tx_hash;
    assert!(matches!(
        &err,
        ExecutionError::TransferPending { permit_hash: hash, .. } if *hash == permit_hash
    ));
    assert_eq!(err.recovery(), Some(Recovery::ContinueTransfer));
    assert!(matches!(
        request.state(),
        ExecutionState::Failed { recovery: Some(Recovery::ContinueTransfer), .. }
    ));
    assert_eq!(request.state().tx_hash(), Some(permit_hash));

    // The permit alone must not be reported as the finished operation.
    writer.withhold_receipts(false);
    let err = dispatcher.confirm(&mut request).await.unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidTransition(_)));
    assert!(request.retry().is_err());
    assert_eq!(writer.sent().len(), 1);

    let report = dispatcher.resume_transfer(&mut request).await.unwrap();
    let sent = writer.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].tx_hash, permit_hash);
    let transfer = sent[1].decode::<IERC20Permit::transferFromCall>();
    assert_eq!(transfer.from, TEST_USERS[0]);
    assert_eq!(transfer.value, U256::from(1_500_000));
    assert_eq!(report.tx_hash, sent[1].tx_hash);

    dispatcher.confirm(&mut request).await.unwrap();
    assert!(matches!(
        request.state(),
        ExecutionState::Confirmed { tx_hash, .. } if *tx_hash == sent[1].tx_hash
    ));
}

#[tokio::test]
async fn unsent_transfer_resumes_without_resending_permit() {
    let reader = MockChainReader::new(CHAIN_ID);
    permit_token(&reader, TOKEN, 6, 0);
    let mut request = signed_permit(&reader).await;

    let writer = MockWriter::new();
    let dispatcher = dispatcher(&writer);
    writer.reject_calls::<IERC20Permit::transferFromCall>(true);
    let err = dispatcher
        .submit_permit(&mut request, PermitExecution::PermitAndTransfer)
        .await
        .unwrap_err();
    assert_eq!(err.recovery(), Some(Recovery::ContinueTransfer));
    assert_eq!(writer.sent().len(), 1);

    writer.reject_calls::<IERC20Permit::transferFromCall>(false);
    let report = dispatcher.resume_transfer(&mut request).await.unwrap();
    let sent = writer.sent();
    assert_eq!(sent.len(), 2);
    sent[0].decode::<IERC20Permit::permitCall>();
    sent[1].decode::<IERC20Permit::transferFromCall>();
    assert_eq!(report.tx_hash, sent[1].tx_hash);

    // A request without a pending transfer cannot be resumed.
    assert!(matches!(
        dispatcher.resume_transfer(&mut request).await.unwrap_err(),
        ExecutionError::InvalidTransition(_)
    ));
}
