mod chains;
pub use chains::{KnownChains, ParseChainError};

mod networks;
pub use networks::{NetworkRecord, NetworkRegistry, StaticNetworks, KNOWN_NETWORKS};

mod overrides;
pub use overrides::{DomainOverride, DomainOverrides, DOMAIN_OVERRIDES};
