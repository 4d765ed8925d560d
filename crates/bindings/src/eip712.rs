#![allow(missing_docs)]

alloy::sol! {
    /// EIP-2612 permit message.
    #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }

    /// The action half of a flow schedule authorization.
    #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Action {
        string description;
        address superToken;
        address receiver;
        uint32 startDate;
        uint32 startMaxDelay;
        int96 flowRate;
        uint256 startAmount;
        uint32 endDate;
        bytes userData;
    }

    /// Replay and validity constraints checked by the forwarder.
    #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct Security {
        string domain;
        string provider;
        uint256 validAfter;
        uint256 validBefore;
        uint256 nonce;
    }

    /// Primary type signed for a flow schedule macro.
    #[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    struct ScheduleFlow {
        Action action;
        Security security;
    }
}
