//! Flow schedule construction, signing, and execution against a scripted
//! macro and forwarder.
use alloy::primitives::{aliases::I96, Bytes, U256};
use clearsig_bindings::{IFlowScheduler712Macro, IOnly712MacroForwarder};
use clearsig_constants::{
    test_utils::{CHAIN_ID, FORWARDER, MACRO, RECEIVER, SUPER_TOKEN},
    LANG_EN,
};
use clearsig_flows::{
    build_typed_data, compute_nonce_key, ExecutionDispatcher, ExecutionError, ExecutionState,
    FlowScheduleTypedDataBuilder, MacroCall, NonceScope, Recovery, ScheduleError, SignedMacro,
    SigningGate,
};
use clearsig_test_utils::{
    fixtures::{encode_action_params, encode_run_macro_params, FlowSchedulerFixture},
    reader::{MockChainReader, MockResponse},
    relay::{MockRelayer, RelayReply},
    users::{TEST_SIGNERS, TEST_USERS},
    writer::MockWriter,
};
use clearsig_types::{FlowSchedulerDeployment, ScheduleFlowParams, SecurityTemplate};
use std::time::Duration;

const DESCRIPTION: &str =
    "Create a flow of 1 token per day to 0x3333333333333333333333333333333333333333";

const DEPLOYMENT: FlowSchedulerDeployment =
    FlowSchedulerDeployment::new(CHAIN_ID, FORWARDER, MACRO);

fn params() -> ScheduleFlowParams {
    ScheduleFlowParams {
        super_token: SUPER_TOKEN,
        receiver: RECEIVER,
        start_date: 1_700_003_600,
        start_max_delay: 86_400,
        flow_rate: I96::try_from(11_574_074_074_074i64).unwrap(),
        start_amount: U256::ZERO,
        end_date: 1_700_604_800,
        user_data: Bytes::from_static(&[0xca, 0xfe]),
    }
}

type Builder = FlowScheduleTypedDataBuilder<MockChainReader>;

fn setup() -> (MockChainReader, FlowSchedulerFixture, Builder) {
    let reader = MockChainReader::new(CHAIN_ID);
    let fixture = FlowSchedulerFixture::install(&reader, DEPLOYMENT, DESCRIPTION);
    let builder = FlowScheduleTypedDataBuilder::new(reader.clone(), DEPLOYMENT);
    (reader, fixture, builder)
}

async fn signed_macro(builder: &Builder) -> SignedMacro {
    let sender = TEST_USERS[1];
    let prepared =
        builder.prepare(sender, params(), &SecurityTemplate::default()).await.unwrap();
    let signature = SigningGate::new()
        .sign_typed_data(&TEST_SIGNERS[1], builder.reader(), prepared.envelope())
        .await
        .unwrap();
    SignedMacro::new(
        CHAIN_ID,
        MacroCall {
            forwarder: FORWARDER,
            macro_address: MACRO,
            params: prepared.run_macro_params().clone(),
            signer: sender,
        },
        signature,
    )
}

#[tokio::test]
async fn prepares_schedule() {
    clearsig_test_utils::init_tracing();
    let (reader, fixture, builder) = setup();
    fixture.set_nonce(7);

    let sender = TEST_USERS[1];
    let template =
        SecurityTemplate::default().with_validity(U256::ZERO, U256::from(1_800_000_000));
    let prepared = builder.prepare(sender, params(), &template).await.unwrap();

    let envelope = prepared.envelope();
    assert_eq!(envelope.primary_type(), "ScheduleFlow");
    assert_eq!(envelope.domain().name.as_deref(), Some("ClearSigning"));
    assert_eq!(envelope.domain().version.as_deref(), Some("1"));
    assert_eq!(envelope.chain_id(), Some(CHAIN_ID));
    assert_eq!(envelope.verifying_contract(), Some(FORWARDER));

    let message = envelope.message();
    assert_eq!(message.action.description, DESCRIPTION);
    assert_eq!(message.action.userData, params().user_data);
    assert_eq!(message.security.domain, "flowscheduler.xyz");
    assert_eq!(message.security.provider, "macros.superfluid.eth");
    assert_eq!(message.security.validBefore, U256::from(1_800_000_000));
    assert_eq!(message.security.nonce, U256::from(7));

    // The digest is exactly that of the pure assembly.
    let expected = build_typed_data(
        &params(),
        prepared.security(),
        DESCRIPTION.to_string(),
        CHAIN_ID,
        FORWARDER,
    );
    assert_eq!(envelope.signing_hash(), expected.signing_hash());

    let action_params = encode_action_params(&params().to_macro_params());
    assert_eq!(prepared.action().action_params, action_params);
    assert_eq!(
        prepared.run_macro_params(),
        &encode_run_macro_params(&action_params, &prepared.security().to_forwarder())
    );

    // The macro is asked in English, and the nonce is read under the flow
    // scheduler key.
    let encode = reader
        .calls_of::<IFlowScheduler712Macro::encodeCreateFlowScheduleParamsCall>(MACRO);
    assert_eq!(encode.len(), 1);
    assert_eq!(encode[0].lang, LANG_EN);
    let nonces = reader.calls_of::<IOnly712MacroForwarder::getNonceCall>(FORWARDER);
    assert_eq!(nonces.len(), 1);
    assert_eq!((nonces[0].sender, nonces[0].key), (sender, compute_nonce_key()));

    let scope = NonceScope { chain_id: CHAIN_ID, forwarder: FORWARDER, sender };
    assert_eq!(builder.nonces().latest(&scope), Some(U256::from(7)));
}

#[tokio::test]
async fn signature_recovers_sender() {
    let (_, _, builder) = setup();
    let prepared =
        builder.prepare(TEST_USERS[1], params(), &SecurityTemplate::default()).await.unwrap();

    let signature = SigningGate::new()
        .sign_typed_data(&TEST_SIGNERS[1], builder.reader(), prepared.envelope())
        .await
        .unwrap();
    let recovered = signature
        .to_signature()
        .unwrap()
        .recover_address_from_prehash(&prepared.envelope().signing_hash())
        .unwrap();
    assert_eq!(recovered, TEST_USERS[1]);
}

#[tokio::test]
async fn resigning_fetches_a_fresh_nonce() {
    let (reader, fixture, builder) = setup();
    let template = SecurityTemplate::default();

    let first = builder.prepare(TEST_USERS[1], params(), &template).await.unwrap();
    fixture.set_nonce(1);
    let second = builder.prepare(TEST_USERS[1], params(), &template).await.unwrap();

    assert_eq!(first.security().nonce, U256::ZERO);
    assert_eq!(second.security().nonce, U256::from(1));
    assert_ne!(first.envelope().signing_hash(), second.envelope().signing_hash());
    assert_eq!(reader.calls_of::<IOnly712MacroForwarder::getNonceCall>(FORWARDER).len(), 2);
}

#[tokio::test]
async fn nonce_is_stable_without_state_change() {
    let (_, fixture, builder) = setup();
    fixture.set_nonce(4);
    let a = builder.fetch_next_nonce(TEST_USERS[1]).await.unwrap();
    let b = builder.fetch_next_nonce(TEST_USERS[1]).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test(start_paused = true)]
async fn superseded_nonce_fetch_is_discarded() {
    let (reader, fixture, builder) = setup();
    reader.delay_next::<IOnly712MacroForwarder::getNonceCall>(FORWARDER, Duration::from_secs(1));

    let sender = TEST_USERS[1];
    let (first, second) = tokio::join!(builder.fetch_tracked_nonce(sender), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        fixture.set_nonce(9);
        builder.fetch_tracked_nonce(sender).await
    });

    assert!(matches!(first, Err(ScheduleError::NonceSuperseded)));
    assert_eq!(second.unwrap(), U256::from(9));
    let scope = NonceScope { chain_id: CHAIN_ID, forwarder: FORWARDER, sender };
    assert_eq!(builder.nonces().latest(&scope), Some(U256::from(9)));
}

#[tokio::test]
async fn macro_revert() {
    let (reader, _, builder) = setup();
    reader.on::<IFlowScheduler712Macro::encodeCreateFlowScheduleParamsCall>(
        MACRO,
        MockResponse::revert(),
    );

    let err = builder.describe_and_encode_action(&params()).await.unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::MacroEncodingFailed { contract, .. } if contract == MACRO
    ));
}

#[tokio::test]
async fn nonce_unavailable() {
    let (reader, _, builder) = setup();
    reader.on::<IOnly712MacroForwarder::getNonceCall>(FORWARDER, MockResponse::rpc("timeout"));

    let err = builder
        .prepare(TEST_USERS[1], params(), &SecurityTemplate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::NonceUnavailable(_)));
}

#[tokio::test]
async fn deployment_chain_must_match() {
    let (reader, _, builder) = setup();
    reader.set_chain_id(1);

    let err = builder
        .prepare(TEST_USERS[1], params(), &SecurityTemplate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScheduleError::ChainMismatch { expected: CHAIN_ID, actual: 1 }));
}

#[tokio::test]
async fn submits_run_macro_from_wallet() {
    let (_, _, builder) = setup();
    let mut request = signed_macro(&builder).await;

    let writer = MockWriter::new();
    let dispatcher = ExecutionDispatcher::<_, MockRelayer>::new(writer.clone());
    let report = dispatcher.execute_macro(&mut request).await.unwrap();

    let sent = writer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, FORWARDER);
    let call = sent[0].decode::<IOnly712MacroForwarder::runMacroCall>();
    assert_eq!(call.m, MACRO);
    assert_eq!(call.signer, TEST_USERS[1]);
    assert_eq!(call.params, request.payload().params);
    assert_eq!(call.signature.len(), 65);
    assert_eq!(&call.signature[..], &request.signature().to_bytes()[..]);

    assert_eq!(report.tx_hash, sent[0].tx_hash);
    // No explorer is registered for the test chain.
    assert_eq!(report.explorer_url, None);
    assert!(matches!(request.state(), ExecutionState::Confirmed { .. }));
}

#[tokio::test]
async fn relays_signed_macro() {
    let (_, _, builder) = setup();
    let mut request = signed_macro(&builder).await;

    let relayer = MockRelayer::new();
    let dispatcher = ExecutionDispatcher::new(MockWriter::new()).with_relayer(relayer.clone());
    let report = dispatcher.relay_macro(&mut request).await.unwrap();

    let requests = relayer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].macro_address, MACRO);
    assert_eq!(requests[0].signer, TEST_USERS[1]);
    assert_eq!(requests[0].params, request.payload().params);
    assert_eq!(&requests[0].signature[..], &request.signature().to_bytes()[..]);
    assert_eq!(request.state(), &ExecutionState::RelayAccepted { tx_hash: report.tx_hash });
}

#[tokio::test]
async fn relay_rejection() {
    let (_, _, builder) = setup();
    let mut request = signed_macro(&builder).await;

    let relayer = MockRelayer::new();
    relayer.reply(RelayReply::Reject("reverted".into()));
    let dispatcher = ExecutionDispatcher::new(MockWriter::new()).with_relayer(relayer);

    let err = dispatcher.relay_macro(&mut request).await.unwrap_err();
    let ExecutionError::RelayRejected(message) = &err else {
        panic!("expected rejection, got {err:?}")
    };
    assert_eq!(message, "reverted");
    assert!(matches!(
        request.state(),
        ExecutionState::RelayFailed { recovery: Some(Recovery::Resign), .. }
    ));
    assert!(request.retry().is_err());
}

#[tokio::test]
async fn relay_transport_failure_can_be_retried() {
    let (_, _, builder) = setup();
    let mut request = signed_macro(&builder).await;

    let relayer = MockRelayer::new();
    relayer.reply(RelayReply::Http(503, "unavailable".into()));
    let dispatcher = ExecutionDispatcher::new(MockWriter::new()).with_relayer(relayer.clone());

    let err = dispatcher.relay_macro(&mut request).await.unwrap_err();
    assert_eq!(err.recovery(), Some(Recovery::RetryRelay));

    request.retry().unwrap();
    dispatcher.relay_macro(&mut request).await.unwrap();
    assert_eq!(relayer.requests().len(), 2);
    assert!(matches!(request.state(), ExecutionState::RelayAccepted { .. }));
}

#[tokio::test]
async fn relay_not_configured() {
    let (_, _, builder) = setup();
    let mut request = signed_macro(&builder).await;

    let dispatcher = ExecutionDispatcher::<_, MockRelayer>::new(MockWriter::new());
    let err = dispatcher.relay_macro(&mut request).await.unwrap_err();
    assert!(matches!(err, ExecutionError::RelayNotConfigured));
    assert_eq!(request.state(), &ExecutionState::Signed);
}
