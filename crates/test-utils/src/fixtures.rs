//! Scripted token and flow scheduler contracts for [`MockChainReader`].
use crate::reader::{MockChainReader, MockResponse};
use alloy::{
    primitives::{keccak256, Address, Bytes, FixedBytes, B256, U256},
    sol_types::{sol_data, SolCall, SolType},
};
use clearsig_bindings::{
    IERC20Permit, IERC5267,
    IFlowScheduler712Macro::{self, CreateFlowScheduleParams},
    IOnly712MacroForwarder::{self, SecurityType},
};
use clearsig_types::FlowSchedulerDeployment;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Name reported by fixture tokens.
pub const TOKEN_NAME: &str = "Test Token";

/// Symbol reported by fixture tokens.
pub const TOKEN_SYMBOL: &str = "TT";

/// Separator reported by fixture permit tokens.
pub const DOMAIN_SEPARATOR: B256 = B256::repeat_byte(0xd5);

/// Script an ERC-20 without permit support.
pub fn plain_token(reader: &MockChainReader, token: Address, decimals: u8) {
    reader
        .on::<IERC20Permit::nameCall>(token, MockResponse::value(&TOKEN_NAME.to_string()))
        .on::<IERC20Permit::symbolCall>(token, MockResponse::value(&TOKEN_SYMBOL.to_string()))
        .on::<IERC20Permit::decimalsCall>(token, MockResponse::value(&U256::from(decimals)));
}

/// Script an EIP-2612 token. Every owner's nonce is `nonce`.
pub fn permit_token(reader: &MockChainReader, token: Address, decimals: u8, nonce: u64) {
    plain_token(reader, token, decimals);
    reader
        .on::<IERC20Permit::noncesCall>(token, MockResponse::value(&U256::from(nonce)))
        .on::<IERC20Permit::DOMAIN_SEPARATORCall>(token, MockResponse::value(&DOMAIN_SEPARATOR));
}

/// Script an EIP-5267 `eip712Domain` reporting name, version, chain id, and
/// verifying contract.
pub fn eip5267_domain(
    reader: &MockChainReader,
    token: Address,
    name: &str,
    version: &str,
    chain_id: u64,
) {
    let ret = (
        FixedBytes::<1>([0x0f]),
        name.to_string(),
        version.to_string(),
        U256::from(chain_id),
        token,
        B256::ZERO,
        Vec::<U256>::new(),
    );
    reader.on::<IERC5267::eip712DomainCall>(token, MockResponse::params(&ret));
}

/// Encode `runMacro` params the way the forwarder does.
pub fn encode_run_macro_params(action_params: &Bytes, security: &SecurityType) -> Bytes {
    <(sol_data::Bytes, SecurityType) as SolType>::abi_encode_params(&(
        action_params.clone(),
        security.clone(),
    ))
    .into()
}

/// Encode action params the way the macro does.
pub fn encode_action_params(params: &CreateFlowScheduleParams) -> Bytes {
    <CreateFlowScheduleParams as SolType>::abi_encode(params).into()
}

/// A scripted flow scheduler macro and forwarder.
#[derive(Debug, Clone)]
pub struct FlowSchedulerFixture {
    deployment: FlowSchedulerDeployment,
    nonce: Arc<AtomicU64>,
}

impl FlowSchedulerFixture {
    /// Script `deployment` on `reader`. The macro renders every action as
    /// `description`; the forwarder's nonce starts at zero.
    pub fn install(
        reader: &MockChainReader,
        deployment: FlowSchedulerDeployment,
        description: &str,
    ) -> Self {
        let nonce = Arc::new(AtomicU64::new(0));
        let fixture = Self { deployment, nonce: nonce.clone() };

        let description = description.to_string();
        reader.respond_with(
            deployment.macro_address(),
            IFlowScheduler712Macro::encodeCreateFlowScheduleParamsCall::SELECTOR,
            move |input| {
                let call =
                    IFlowScheduler712Macro::encodeCreateFlowScheduleParamsCall::abi_decode(input)
                        .unwrap();
                let action_params = encode_action_params(&call.params);
                let struct_hash = keccak256(&action_params);
                MockResponse::params(&(description.clone(), action_params, struct_hash))
            },
        );
        reader.respond_with(
            deployment.forwarder(),
            IOnly712MacroForwarder::getNonceCall::SELECTOR,
            move |_| MockResponse::value(&U256::from(nonce.load(Ordering::SeqCst))),
        );
        reader.respond_with(
            deployment.forwarder(),
            IOnly712MacroForwarder::encodeParamsCall::SELECTOR,
            |input| {
                let call = IOnly712MacroForwarder::encodeParamsCall::abi_decode(input).unwrap();
                MockResponse::value(&encode_run_macro_params(&call.actionParams, &call.security))
            },
        );

        fixture
    }

    /// Get the deployment.
    pub const fn deployment(&self) -> &FlowSchedulerDeployment {
        &self.deployment
    }

    /// Set the forwarder's next nonce.
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }
}
