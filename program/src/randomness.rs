// Randomness oracle integration for the interval raffle
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{hash::Hash, keccak, pubkey::Pubkey};
use std::fmt;

use crate::error::LotteryError;

/// Block confirmations the oracle waits for before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Compute budget handed to the fulfillment callback
pub const CALLBACK_GAS_LIMIT: u32 = 500_000;
/// Random words per request; only the first one picks the winner
pub const NUM_WORDS: u32 = 1;

/// Correlation identifier linking a fulfillment to the draw that asked for it
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestId(pub [u8; 32]);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Hash::new_from_array(self.0), f)
    }
}

/// Opaque 256-bit random value delivered by the oracle (big-endian)
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomWord(pub [u8; 32]);

impl RandomWord {
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        RandomWord(bytes)
    }

    /// Reduces the full 256-bit value modulo `modulus`.
    /// Returns `None` for a zero modulus.
    pub fn modulo(&self, modulus: u64) -> Option<u64> {
        if modulus == 0 {
            return None;
        }
        let modulus = modulus as u128;
        let rem = self
            .0
            .iter()
            .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus);
        Some(rem as u64)
    }
}

/// Parameters forwarded to the oracle with every request.
/// Gas and confirmation tuning is interpreted by the oracle, never by the lottery.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomnessParams {
    /// Oracle key hash ("gas lane") selecting the proving key
    pub key_hash: [u8; 32],
    /// Oracle subscription billed for the request
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

impl RandomnessParams {
    pub const LEN: usize = 32 + 8 + 2 + 4 + 4;

    pub fn new(key_hash: [u8; 32], subscription_id: u64) -> Self {
        Self {
            key_hash,
            subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: CALLBACK_GAS_LIMIT,
            num_words: NUM_WORDS,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.num_words >= 1
    }
}

/// Capability for issuing randomness requests.
///
/// The returned id is stored as the outstanding request; the oracle answers
/// later through a separate fulfillment entry point carrying the same id.
pub trait RandomnessOracle {
    fn request_randomness(
        &mut self,
        params: &RandomnessParams,
        nonce: u64,
    ) -> Result<RequestId, LotteryError>;
}

/// On-chain request issuer.
///
/// Derives the request id from the lottery account, the key hash, the
/// subscription and the request nonce. The id is announced in the
/// `DrawRequested` event which the bound oracle watches.
pub struct AnnouncedOracle {
    lottery: Pubkey,
}

impl AnnouncedOracle {
    pub fn new(lottery: Pubkey) -> Self {
        Self { lottery }
    }
}

impl RandomnessOracle for AnnouncedOracle {
    fn request_randomness(
        &mut self,
        params: &RandomnessParams,
        nonce: u64,
    ) -> Result<RequestId, LotteryError> {
        Ok(derive_request_id(&self.lottery, params, nonce))
    }
}

pub fn derive_request_id(lottery: &Pubkey, params: &RandomnessParams, nonce: u64) -> RequestId {
    let hash = keccak::hashv(&[
        b"randomness-request".as_ref(),
        lottery.as_ref(),
        &params.key_hash,
        &params.subscription_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ]);
    RequestId(hash.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulo_small_values() {
        assert_eq!(RandomWord::from_u64(9).modulo(4), Some(1));
        assert_eq!(RandomWord::from_u64(3).modulo(4), Some(3));
        assert_eq!(RandomWord::from_u64(0).modulo(7), Some(0));
        assert_eq!(RandomWord::from_u64(9).modulo(0), None);
    }

    #[test]
    fn modulo_uses_all_256_bits() {
        // 2^256 - 1 is divisible by 3 and 5, and leaves 15 mod 16
        let max = RandomWord([0xff; 32]);
        assert_eq!(max.modulo(3), Some(0));
        assert_eq!(max.modulo(5), Some(0));
        assert_eq!(max.modulo(16), Some(15));

        // 2^64 mod 10 == 6
        let mut bytes = [0u8; 32];
        bytes[23] = 1;
        assert_eq!(RandomWord(bytes).modulo(10), Some(6));
    }

    #[test]
    fn request_ids_differ_per_nonce_and_lottery() {
        let params = RandomnessParams::new([7; 32], 42);
        let lottery = Pubkey::new_unique();
        let first = derive_request_id(&lottery, &params, 0);
        assert_eq!(first, derive_request_id(&lottery, &params, 0));
        assert_ne!(first, derive_request_id(&lottery, &params, 1));
        assert_ne!(first, derive_request_id(&Pubkey::new_unique(), &params, 0));
    }

    #[test]
    fn default_params_match_deployment() {
        let params = RandomnessParams::new([0; 32], 1);
        assert_eq!(params.request_confirmations, 3);
        assert_eq!(params.callback_gas_limit, 500_000);
        assert_eq!(params.num_words, 1);
        assert!(params.is_valid());
        assert!(!RandomnessParams { num_words: 0, ..params }.is_valid());
    }
}
