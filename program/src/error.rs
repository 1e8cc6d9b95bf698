use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError, program_error::ProgramError,
};
use thiserror::Error;

use crate::state::RoundState;

/// Errors that may be returned by the lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Deposit below the entrance fee
    #[error("Deposit of {provided} lamports is below the entrance fee of {required}")]
    InsufficientDeposit { required: u64, provided: u64 },

    /// Entries are only accepted while the round is open
    #[error("Round is not open")]
    RoundNotOpen,

    /// A draw was triggered while the upkeep predicate is false
    #[error("Upkeep not needed (state: {state:?}, balance: {balance}, players: {count})")]
    UpkeepNotNeeded {
        state: RoundState,
        balance: u64,
        count: u64,
    },

    /// Fulfillment does not match the outstanding randomness request
    #[error("Unknown randomness request")]
    UnknownRequest,

    /// Pot could not be delivered to the winner
    #[error("Transfer failed")]
    TransferFailed,

    /// Registry lookup past the last entrant
    #[error("Index {index} out of range for {count} players")]
    IndexOutOfRange { index: u64, count: u64 },

    /// The lottery account has no room for another entrant
    #[error("Lottery is full")]
    LotteryFull,

    #[error("Amount overflow")]
    AmountOverflow,

    /// Only the configured oracle may deliver randomness
    #[error("Signer is not the configured randomness oracle")]
    UnauthorizedOracle,

    #[error("Invalid lottery configuration")]
    InvalidConfig,

    #[error("Lottery already initialized")]
    AlreadyInitialized,
}

impl LotteryError {
    /// Stable custom error code reported through `ProgramError::Custom`
    pub fn code(&self) -> u32 {
        match self {
            LotteryError::InsufficientDeposit { .. } => 0,
            LotteryError::RoundNotOpen => 1,
            LotteryError::UpkeepNotNeeded { .. } => 2,
            LotteryError::UnknownRequest => 3,
            LotteryError::TransferFailed => 4,
            LotteryError::IndexOutOfRange { .. } => 5,
            LotteryError::LotteryFull => 6,
            LotteryError::AmountOverflow => 7,
            LotteryError::UnauthorizedOracle => 8,
            LotteryError::InvalidConfig => 9,
            LotteryError::AlreadyInitialized => 10,
        }
    }
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e.code())
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
