// Interval raffle
// Periodic lottery drawn with externally supplied randomness

pub mod error;
pub mod events;
pub mod instruction;
pub mod payout;
pub mod processor;
pub mod randomness;
pub mod round;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

/// Instruction handler shared by the entrypoint and `solana-program-test`
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data)
}
