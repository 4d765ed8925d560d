//! Deterministic test accounts.
use alloy::{
    primitives::{Address, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use std::sync::LazyLock;

/// Make a wallet with a deterministic keypair.
pub fn make_wallet(i: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(i)).unwrap()
}

/// Test signers used in tests.
pub static TEST_SIGNERS: LazyLock<[PrivateKeySigner; 10]> =
    LazyLock::new(|| core::array::from_fn(|i| make_wallet(i as u8 + 1)));

/// Test users used in tests. Addresses corresponding to [`TEST_SIGNERS`].
pub static TEST_USERS: LazyLock<[Address; 10]> =
    LazyLock::new(|| TEST_SIGNERS.each_ref().map(|s| s.address()));

/// A test signer bound to `chain_id`.
pub fn chain_signer(i: usize, chain_id: u64) -> PrivateKeySigner {
    TEST_SIGNERS[i].clone().with_chain_id(Some(chain_id))
}
