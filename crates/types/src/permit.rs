use crate::SignatureParts;
use alloy::primitives::{Address, U256};
use clearsig_bindings::IERC20Permit;
use serde::{Deserialize, Serialize};

/// Parameters of one permit sign request.
///
/// Created once per request and never mutated. The execution step that
/// follows signing owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitParameters {
    /// Token holder granting the allowance.
    pub owner: Address,
    /// Account receiving the allowance.
    pub spender: Address,
    /// Allowance in integer units.
    pub value: U256,
    /// Unix timestamp after which the permit is invalid.
    pub deadline: U256,
    /// The token.
    pub token_address: Address,
    /// Chain the permit was signed for.
    pub chain_id: u64,
}

impl PermitParameters {
    /// Build the token's `permit` call from a signature over these
    /// parameters.
    pub const fn permit_call(&self, signature: &SignatureParts) -> IERC20Permit::permitCall {
        IERC20Permit::permitCall::from_parts(
            self.owner,
            self.spender,
            self.value,
            self.deadline,
            signature.v,
            signature.r,
            signature.s,
        )
    }

    /// Build the `transferFrom(owner, spender, value)` call that spends the
    /// permitted allowance.
    pub const fn transfer_from_call(&self) -> IERC20Permit::transferFromCall {
        IERC20Permit::transferFromCall { from: self.owner, to: self.spender, value: self.value }
    }
}
