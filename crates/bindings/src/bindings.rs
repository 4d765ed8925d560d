#![allow(clippy::too_many_arguments)]
#![allow(missing_docs)]
use alloy::primitives::{Address, U256};

mod erc20 {
    alloy::sol!(
        #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        interface IERC20Permit {
            function name() external view returns (string);
            function symbol() external view returns (string);
            function decimals() external view returns (uint8);
            function nonces(address owner) external view returns (uint256);
            function DOMAIN_SEPARATOR() external view returns (bytes32);
            function permit(
                address owner,
                address spender,
                uint256 value,
                uint256 deadline,
                uint8 v,
                bytes32 r,
                bytes32 s
            ) external;
            function transferFrom(address from, address to, uint256 value) external returns (bool);
        }
    );
}
pub use erc20::IERC20Permit;

mod erc5267 {
    alloy::sol!(
        #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        interface IERC5267 {
            function eip712Domain()
                external
                view
                returns (
                    bytes1 fields,
                    string name,
                    string version,
                    uint256 chainId,
                    address verifyingContract,
                    bytes32 salt,
                    uint256[] extensions
                );
        }
    );
}
pub use erc5267::IERC5267;

mod flow_scheduler {
    alloy::sol!(
        #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        interface IFlowScheduler712Macro {
            struct CreateFlowScheduleParams {
                address superToken;
                address receiver;
                uint32 startDate;
                uint32 startMaxDelay;
                int96 flowRate;
                uint256 startAmount;
                uint32 endDate;
                bytes userData;
            }

            function encodeCreateFlowScheduleParams(
                bytes32 lang,
                CreateFlowScheduleParams memory params
            )
                external
                view
                returns (string memory description, bytes memory actionParams, bytes32 structHash);
        }
    );
}
pub use flow_scheduler::IFlowScheduler712Macro;

mod forwarder {
    alloy::sol!(
        #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        interface IOnly712MacroForwarder {
            struct SecurityType {
                string domain;
                string provider;
                uint256 validAfter;
                uint256 validBefore;
                uint256 nonce;
            }

            function getNonce(address sender, uint192 key) external view returns (uint256);

            function encodeParams(
                bytes memory actionParams,
                SecurityType memory security
            ) external pure returns (bytes memory);

            function runMacro(
                address m,
                bytes memory params,
                address signer,
                bytes memory signature
            ) external payable returns (bool);
        }
    );
}
pub use forwarder::IOnly712MacroForwarder;

impl IERC20Permit::permitCall {
    /// Build a `permit` call from its signed components.
    pub const fn from_parts(
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: u8,
        r: alloy::primitives::B256,
        s: alloy::primitives::B256,
    ) -> Self {
        Self { owner, spender, value, deadline, v, r, s }
    }
}

impl IERC5267::eip712DomainReturn {
    /// Convert the introspected domain into an [`Eip712Domain`].
    ///
    /// Fields whose bit is unset in `fields` are left as `None`, following
    /// the EIP-5267 field bitmap.
    ///
    /// [`Eip712Domain`]: alloy::sol_types::Eip712Domain
    pub fn to_domain(&self) -> alloy::sol_types::Eip712Domain {
        let bits = self.fields[0];
        let set = |bit: u8| bits & (1 << bit) != 0;
        alloy::sol_types::Eip712Domain {
            name: set(0).then(|| self.name.clone().into()),
            version: set(1).then(|| self.version.clone().into()),
            chain_id: set(2).then_some(self.chainId),
            verifying_contract: set(3).then_some(self.verifyingContract),
            salt: set(4).then_some(self.salt),
        }
    }
}
