use arrayref::{array_ref, array_refs};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::mem::size_of;

use crate::randomness::{RandomWord, RandomnessParams, RequestId};

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Initialize a lottery with its fixed round configuration
    ///
    /// Accounts expected:
    /// 0. `[signer]` The admin setting up the lottery
    /// 1. `[writable]` The lottery account, pre-allocated with `Lottery::LEN` bytes and owned by this program
    /// 2. `[]` The randomness oracle authority that will fulfill draws
    Initialize {
        /// Minimum deposit per entry in lamports
        entrance_fee: u64,
        /// Minimum seconds between draws
        interval: u64,
        randomness: RandomnessParams,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player paying the deposit
    /// 1. `[writable]` The lottery account
    /// 2. `[]` The system program
    Enter {
        /// Deposit in lamports, at least the entrance fee
        amount: u64,
    },

    /// Evaluate the upkeep predicate; the `UpkeepStatus` is returned as return data
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery account
    CheckUpkeep,

    /// Start a draw if upkeep is needed (anyone may call, normally a keeper)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The keeper triggering the draw
    /// 1. `[writable]` The lottery account
    PerformUpkeep,

    /// Deliver randomness for the outstanding draw and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` The configured randomness oracle
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The winner (registry entry at `random_word % count`)
    FulfillRandomness {
        request_id: RequestId,
        random_word: RandomWord,
    },
}

impl LotteryInstruction {
    const INITIALIZE_LEN: usize = 8 + 8 + RandomnessParams::LEN;
    const FULFILL_LEN: usize = 32 + 32;

    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                if rest.len() < Self::INITIALIZE_LEN {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let src = array_ref![rest, 0, LotteryInstruction::INITIALIZE_LEN];
                let (
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    request_confirmations,
                    callback_gas_limit,
                    num_words,
                ) = array_refs![src, 8, 8, 32, 8, 2, 4, 4];
                Self::Initialize {
                    entrance_fee: u64::from_le_bytes(*entrance_fee),
                    interval: u64::from_le_bytes(*interval),
                    randomness: RandomnessParams {
                        key_hash: *key_hash,
                        subscription_id: u64::from_le_bytes(*subscription_id),
                        request_confirmations: u16::from_le_bytes(*request_confirmations),
                        callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
                        num_words: u32::from_le_bytes(*num_words),
                    },
                }
            }
            1 => {
                let amount = rest
                    .get(..8)
                    .and_then(|slice| slice.try_into().ok())
                    .map(u64::from_le_bytes)
                    .ok_or(ProgramError::InvalidInstructionData)?;
                Self::Enter { amount }
            }
            2 => Self::CheckUpkeep,
            3 => Self::PerformUpkeep,
            4 => {
                if rest.len() < Self::FULFILL_LEN {
                    return Err(ProgramError::InvalidInstructionData);
                }
                let src = array_ref![rest, 0, LotteryInstruction::FULFILL_LEN];
                let (request_id, random_word) = array_refs![src, 32, 32];
                Self::FulfillRandomness {
                    request_id: RequestId(*request_id),
                    random_word: RandomWord(*random_word),
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match self {
            Self::Initialize {
                entrance_fee,
                interval,
                randomness,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(&randomness.key_hash);
                buf.extend_from_slice(&randomness.subscription_id.to_le_bytes());
                buf.extend_from_slice(&randomness.request_confirmations.to_le_bytes());
                buf.extend_from_slice(&randomness.callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(&randomness.num_words.to_le_bytes());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(2),
            Self::PerformUpkeep => buf.push(3),
            Self::FulfillRandomness {
                request_id,
                random_word,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.0);
                buf.extend_from_slice(&random_word.0);
            }
        }
        buf
    }
}

/// Create initialize instruction
pub fn initialize(
    program_id: &Pubkey,
    admin: &Pubkey,
    lottery_account: &Pubkey,
    oracle: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    randomness: RandomnessParams,
) -> Instruction {
    let data = LotteryInstruction::Initialize {
        entrance_fee,
        interval,
        randomness,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*admin, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(*oracle, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create enter instruction
pub fn enter(
    program_id: &Pubkey,
    player: &Pubkey,
    lottery_account: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = LotteryInstruction::Enter { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, lottery_account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*lottery_account, false)],
        data: LotteryInstruction::CheckUpkeep.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(program_id: &Pubkey, keeper: &Pubkey, lottery_account: &Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(*keeper, true),
        AccountMeta::new(*lottery_account, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::PerformUpkeep.pack(),
    }
}

/// Create fulfill_randomness instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle: &Pubkey,
    lottery_account: &Pubkey,
    winner: &Pubkey,
    request_id: RequestId,
    random_word: RandomWord,
) -> Instruction {
    let data = LotteryInstruction::FulfillRandomness {
        request_id,
        random_word,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*oracle, true),
        AccountMeta::new(*lottery_account, false),
        AccountMeta::new(*winner, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}
