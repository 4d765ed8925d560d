mod error;
pub use error::ConfigError;

/// Helpers for loading values from the environment.
pub mod env_utils;

use alloy::primitives::Address;
use clearsig_constants::{op_sepolia, KnownChains};
use tracing::warn;
use url::Url;

/// Env var holding the OP Sepolia 712 macro forwarder address.
pub const OP_SEPOLIA_FORWARDER_ENV: &str = "OP_SEPOLIA_ONLY712_FORWARDER_ADDRESS";
/// Env var holding the OP Sepolia flow scheduler macro address.
pub const OP_SEPOLIA_MACRO_ENV: &str = "OP_SEPOLIA_FLOW_SCHEDULER_712_MACRO_ADDRESS";
/// Env var holding the relayer base URL.
pub const RELAYER_URL_ENV: &str = "CLEARSIG_RELAYER_URL";

/// Addresses of the flow scheduler macro and the forwarder that runs it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FlowSchedulerDeployment {
    chain_id: u64,
    forwarder: Address,
    macro_address: Address,
}

impl FlowSchedulerDeployment {
    /// Create a new deployment.
    pub const fn new(chain_id: u64, forwarder: Address, macro_address: Address) -> Self {
        Self { chain_id, forwarder, macro_address }
    }

    /// Get the chain id.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the forwarder address, the EIP-712 verifying contract.
    pub const fn forwarder(&self) -> Address {
        self.forwarder
    }

    /// Get the macro address.
    pub const fn macro_address(&self) -> Address {
        self.macro_address
    }
}

/// Deployment and relayer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSigConfig {
    deployments: Vec<FlowSchedulerDeployment>,
    relayer_url: Option<Url>,
}

impl ClearSigConfig {
    /// Create a new config.
    pub const fn new(deployments: Vec<FlowSchedulerDeployment>, relayer_url: Option<Url>) -> Self {
        Self { deployments, relayer_url }
    }

    /// Load from the environment.
    ///
    /// A missing or invalid deployment address disables the flow schedule
    /// flow on that chain rather than failing. An invalid relayer URL is an
    /// error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let deployments = FlowSchedulerDeployment::load_op_sepolia().into_iter().collect();
        let relayer_url = env_utils::load_url_opt(RELAYER_URL_ENV)?;
        Ok(Self { deployments, relayer_url })
    }

    /// Add a deployment, replacing any existing one for the same chain.
    pub fn with_deployment(mut self, deployment: FlowSchedulerDeployment) -> Self {
        self.deployments.retain(|d| d.chain_id != deployment.chain_id);
        self.deployments.push(deployment);
        self
    }

    /// Set the relayer URL.
    pub fn with_relayer_url(mut self, url: Url) -> Self {
        self.relayer_url = Some(url);
        self
    }

    /// Get the flow scheduler deployment for a chain, if the flow is
    /// available there.
    pub fn deployment_for(&self, chain_id: u64) -> Option<FlowSchedulerDeployment> {
        self.deployments.iter().find(|d| d.chain_id == chain_id).copied()
    }

    /// Get the relayer URL.
    pub const fn relayer_url(&self) -> Option<&Url> {
        self.relayer_url.as_ref()
    }
}

impl FlowSchedulerDeployment {
    /// Load the deployment for a chain from the environment.
    ///
    /// Returns `None` for chains without a flow scheduler deployment, or
    /// when its addresses are not configured. Only the deployment's own
    /// variables are read.
    pub fn for_chain(chain_id: u64) -> Option<Self> {
        match KnownChains::from_chain_id(chain_id)? {
            KnownChains::OpSepolia => Self::load_op_sepolia(),
            _ => None,
        }
    }

    fn load_op_sepolia() -> Option<Self> {
        let addresses = env_utils::load_address(OP_SEPOLIA_FORWARDER_ENV).and_then(|forwarder| {
            Ok((forwarder, env_utils::load_address(OP_SEPOLIA_MACRO_ENV)?))
        });
        match addresses {
            Ok((forwarder, macro_address)) => {
                Some(Self::new(op_sepolia::CHAIN_ID, forwarder, macro_address))
            }
            Err(e) => {
                warn!(%e, chain_id = op_sepolia::CHAIN_ID, "flow scheduler not configured");
                None
            }
        }
    }
}
