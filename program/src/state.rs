// Interval raffle - account state
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;
use crate::randomness::{RandomnessParams, RequestId};

/// Maximum number of entry slots a lottery account can hold
pub const MAX_ENTRANTS: usize = 256;

/// Status of the current round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// Accepting entries
    Open,
    /// Draw requested, waiting for randomness
    Calculating,
}

/// Round configuration, fixed when the lottery is initialized
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LotteryConfig {
    /// Minimum deposit per entry in lamports
    pub entrance_fee: u64,
    /// Minimum number of seconds between draws
    pub interval: u64,
    /// Randomness oracle authority allowed to fulfill requests
    pub oracle: Pubkey,
    /// Parameters forwarded with every randomness request
    pub randomness: RandomnessParams,
}

impl LotteryConfig {
    pub const LEN: usize = 8 + 8 + 32 + RandomnessParams::LEN;

    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.entrance_fee == 0 || self.interval == 0 || !self.randomness.is_valid() {
            return Err(LotteryError::InvalidConfig);
        }
        Ok(())
    }
}

/// Lottery account data
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Lottery {
    pub(crate) is_initialized: bool,
    pub(crate) config: LotteryConfig,
    pub(crate) state: RoundState,
    /// One slot per entry, in entry order
    pub(crate) players: Vec<Pubkey>,
    /// Lamports deposited since the last payout
    pub(crate) pot_balance: u64,
    /// Time of the last draw request (or of initialization)
    pub(crate) last_timestamp: UnixTimestamp,
    /// Present exactly while the round is calculating
    pub(crate) outstanding_request: Option<RequestId>,
    pub(crate) recent_winner: Option<Pubkey>,
    /// Number of randomness requests issued so far
    pub(crate) request_nonce: u64,
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Lottery {
    /// Account size needed for a full registry
    pub const LEN: usize = 1
        + LotteryConfig::LEN
        + 1
        + (4 + 32 * MAX_ENTRANTS)
        + 8
        + 8
        + (1 + 32)
        + (1 + 32)
        + 8;

    pub fn new(config: LotteryConfig, now: UnixTimestamp) -> Self {
        Self {
            is_initialized: true,
            config,
            state: RoundState::Open,
            players: Vec::new(),
            pot_balance: 0,
            last_timestamp: now,
            outstanding_request: None,
            recent_winner: None,
            request_nonce: 0,
        }
    }

    /// Decodes the lottery from account data; trailing capacity is ignored.
    pub fn unpack(src: &[u8]) -> Result<Self, ProgramError> {
        let mut buf = src;
        Self::deserialize(&mut buf).map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }

    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        if dst.len() < Self::LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }
        let mut buf = dst;
        self.serialize(&mut buf)
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }

    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn oracle(&self) -> &Pubkey {
        &self.config.oracle
    }

    pub fn request_confirmations(&self) -> u16 {
        self.config.randomness.request_confirmations
    }

    pub fn num_words(&self) -> u32 {
        self.config.randomness.num_words
    }

    pub fn players(&self) -> &[Pubkey] {
        &self.players
    }

    pub fn pot_balance(&self) -> u64 {
        self.pot_balance
    }

    pub fn last_timestamp(&self) -> UnixTimestamp {
        self.last_timestamp
    }

    pub fn outstanding_request(&self) -> Option<RequestId> {
        self.outstanding_request
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        self.recent_winner
    }

    pub fn request_nonce(&self) -> u64 {
        self.request_nonce
    }
}
