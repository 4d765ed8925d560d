use crate::{mainnet, op_sepolia};
use alloy::primitives::TxHash;
use std::borrow::Cow;

/// A chain known to the explorer registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NetworkRecord {
    /// Chain id.
    chain_id: u64,
    /// Human-facing chain name.
    name: Cow<'static, str>,
    /// Base URL of the chain's block explorer, if it has one.
    explorer: Option<Cow<'static, str>>,
}

impl NetworkRecord {
    /// Create a new network record.
    pub const fn new(
        chain_id: u64,
        name: Cow<'static, str>,
        explorer: Option<Cow<'static, str>>,
    ) -> Self {
        Self { chain_id, name, explorer }
    }

    /// Get the chain id.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get the chain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the explorer base URL.
    pub fn explorer(&self) -> Option<&str> {
        self.explorer.as_deref()
    }
}

const fn known(chain_id: u64, name: &'static str, explorer: &'static str) -> NetworkRecord {
    NetworkRecord::new(chain_id, Cow::Borrowed(name), Some(Cow::Borrowed(explorer)))
}

/// Networks with well-known block explorers.
pub const KNOWN_NETWORKS: &[NetworkRecord] = &[
    known(mainnet::CHAIN_ID, mainnet::NAME, mainnet::EXPLORER),
    known(5, "Goerli", "https://goerli.etherscan.io"),
    known(11_155_111, "Sepolia", "https://sepolia.etherscan.io"),
    known(10, "OP Mainnet", "https://optimistic.etherscan.io"),
    known(op_sepolia::CHAIN_ID, op_sepolia::NAME, op_sepolia::EXPLORER),
    known(137, "Polygon", "https://polygonscan.com"),
    known(80_001, "Polygon Mumbai", "https://mumbai.polygonscan.com"),
    known(43_113, "Avalanche Fuji", "https://testnet.snowtrace.io"),
];

/// Resolves human-facing explorer links for chains.
pub trait NetworkRegistry {
    /// Get the explorer base URL for a chain, if one is known.
    fn explorer_url_for(&self, chain_id: u64) -> Option<&str>;

    /// Get the explorer URL of a transaction. Returns `None` when the chain
    /// has no known explorer.
    fn explorer_tx_url(&self, chain_id: u64, tx_hash: TxHash) -> Option<String> {
        self.explorer_url_for(chain_id)
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

/// A [`NetworkRegistry`] backed by a list of [`NetworkRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticNetworks {
    records: Cow<'static, [NetworkRecord]>,
}

impl Default for StaticNetworks {
    fn default() -> Self {
        Self::known()
    }
}

impl StaticNetworks {
    /// The built-in [`KNOWN_NETWORKS`].
    pub const fn known() -> Self {
        Self { records: Cow::Borrowed(KNOWN_NETWORKS) }
    }

    /// A registry of caller-supplied records.
    pub const fn from_records(records: Vec<NetworkRecord>) -> Self {
        Self { records: Cow::Owned(records) }
    }

    /// Add a record. A record for an already-present chain replaces it.
    pub fn with_record(mut self, record: NetworkRecord) -> Self {
        let records = self.records.to_mut();
        records.retain(|r| r.chain_id != record.chain_id);
        records.push(record);
        self
    }

    /// Get the record for a chain.
    pub fn get(&self, chain_id: u64) -> Option<&NetworkRecord> {
        self.records.iter().find(|r| r.chain_id == chain_id)
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkRecord> {
        self.records.iter()
    }
}

impl NetworkRegistry for StaticNetworks {
    fn explorer_url_for(&self, chain_id: u64) -> Option<&str> {
        self.get(chain_id).and_then(NetworkRecord::explorer)
    }
}

impl<T: NetworkRegistry + ?Sized> NetworkRegistry for &T {
    fn explorer_url_for(&self, chain_id: u64) -> Option<&str> {
        (**self).explorer_url_for(chain_id)
    }
}
