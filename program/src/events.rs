// Interval raffle - observable events
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, log::sol_log_data, msg, pubkey::Pubkey};

use crate::randomness::RequestId;

/// Events published in the program log for monitors and the keeper network
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum LotteryEvent {
    /// A deposit was accepted and took one registry slot
    EntryRecorded { player: Pubkey, amount: u64 },
    /// A draw started; the oracle answers with the same request id
    DrawRequested { request_id: RequestId },
    /// The pot was delivered and the round reopened
    WinnerPicked {
        winner: Pubkey,
        amount: u64,
        timestamp: UnixTimestamp,
    },
}

impl LotteryEvent {
    /// Writes the event as a human readable line and as Borsh encoded log data.
    pub fn emit(&self) {
        match self {
            LotteryEvent::EntryRecorded { player, amount } => {
                msg!("EntryRecorded: player={}, amount={}", player, amount);
            }
            LotteryEvent::DrawRequested { request_id } => {
                msg!("DrawRequested: request_id={}", request_id);
            }
            LotteryEvent::WinnerPicked {
                winner,
                amount,
                timestamp,
            } => {
                msg!(
                    "WinnerPicked: winner={}, amount={}, timestamp={}",
                    winner,
                    amount,
                    timestamp
                );
            }
        }
        match self.try_to_vec() {
            Ok(data) => sol_log_data(&[data.as_slice()]),
            Err(e) => msg!("Failed to encode event: {}", e),
        }
    }
}
