// Interval raffle - instruction processor
use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    error::LotteryError,
    events::LotteryEvent,
    instruction::LotteryInstruction,
    payout::LamportPayout,
    randomness::{AnnouncedOracle, RandomWord, RandomnessParams, RequestId},
    state::{Lottery, LotteryConfig},
};

/// Program state handler.
pub struct Processor;

impl Processor {
    /// Unpacks the instruction and routes it to its handler
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize {
                entrance_fee,
                interval,
                randomness,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, entrance_fee, interval, randomness)
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, amount)
            }
            LotteryInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            LotteryInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            LotteryInstruction::FulfillRandomness {
                request_id,
                random_word,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(program_id, accounts, request_id, random_word)
            }
        }
    }

    /// Process the Initialize instruction
    ///
    /// Writes the fixed round configuration into a pre-allocated,
    /// program-owned lottery account and opens the first round
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        randomness: RandomnessParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let oracle_info = next_account_info(account_info_iter)?;

        // Verify the admin signed the transaction
        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        Self::check_lottery_account(program_id, lottery_info)?;

        // The registry is stored inline, so the account must hold a full one
        if lottery_info.data_len() < Lottery::LEN {
            msg!("Lottery account needs {} bytes", Lottery::LEN);
            return Err(ProgramError::AccountDataTooSmall);
        }
        let rent = Rent::get()?;
        if !rent.is_exempt(lottery_info.lamports(), lottery_info.data_len()) {
            msg!("Lottery account must be rent exempt");
            return Err(ProgramError::AccountNotRentExempt);
        }

        // Check if the lottery is already initialized
        let existing = Lottery::unpack(&lottery_info.data.borrow())?;
        if existing.is_initialized() {
            return Err(Self::fail(LotteryError::AlreadyInitialized));
        }

        let config = LotteryConfig {
            entrance_fee,
            interval,
            oracle: *oracle_info.key,
            randomness,
        };
        config.validate().map_err(Self::fail)?;

        let clock = Clock::get()?;
        let lottery = Lottery::new(config, clock.unix_timestamp);
        lottery.pack(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: EntranceFee={}, Interval={}s, Oracle={}",
            entrance_fee,
            interval,
            oracle_info.key
        );
        Ok(())
    }

    /// Process the Enter instruction
    ///
    /// Records one registry slot for the player and moves the deposit into
    /// the lottery account
    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        // Verify the player signed the transaction
        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        // Verify the system program account
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }
        let mut lottery = Self::load_lottery(program_id, lottery_info)?;

        // Apply the entry to a local copy; it is stored only after the deposit lands
        let event = lottery.enter(*player_info.key, amount).map_err(Self::fail)?;

        // Transfer the deposit from the player to the lottery account
        invoke(
            &system_instruction::transfer(player_info.key, lottery_info.key, amount),
            &[
                player_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        lottery.pack(&mut lottery_info.data.borrow_mut())?;
        msg!(
            "Entry {} recorded, pot is now {} lamports",
            lottery.count(),
            lottery.pot_balance()
        );
        event.emit();
        Ok(())
    }

    /// Process the CheckUpkeep instruction
    ///
    /// Read-only. The Borsh-encoded `UpkeepStatus` is published as return data
    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let lottery_info = next_account_info(account_info_iter)?;

        // Check that the lottery account is owned by our program
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }

        let clock = Clock::get()?;
        let status = lottery.check_upkeep(clock.unix_timestamp);
        msg!(
            "Upkeep needed: {} (state: {:?}, balance: {}, players: {}, elapsed: {}s)",
            status.upkeep_needed,
            status.state,
            status.balance,
            status.player_count,
            status.elapsed
        );

        let data = status
            .try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
        set_return_data(&data);
        Ok(())
    }

    /// Process the PerformUpkeep instruction
    ///
    /// Any keeper may call this; the draw only starts when upkeep is needed.
    /// The new request id is returned as return data and announced in the log
    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let keeper_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;

        // Verify the keeper signed the transaction
        if !keeper_info.is_signer {
            msg!("Keeper must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut lottery = Self::load_lottery(program_id, lottery_info)?;

        let clock = Clock::get()?;
        let mut oracle = AnnouncedOracle::new(*lottery_info.key);
        let event = lottery
            .perform_upkeep(clock.unix_timestamp, &mut oracle)
            .map_err(Self::fail)?;

        lottery.pack(&mut lottery_info.data.borrow_mut())?;
        if let LotteryEvent::DrawRequested { request_id } = &event {
            set_return_data(&request_id.0);
        }
        msg!(
            "Draw requested with {} players and {} lamports in the pot",
            lottery.count(),
            lottery.pot_balance()
        );
        event.emit();
        Ok(())
    }

    /// Process the FulfillRandomness instruction
    ///
    /// Only the configured oracle can deliver randomness. The winner account
    /// must be the registry entry selected by the random word
    fn process_fulfill_randomness(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: RequestId,
        random_word: RandomWord,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        // Verify the oracle signed the transaction
        if !oracle_info.is_signer {
            msg!("Oracle must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        let mut lottery = Self::load_lottery(program_id, lottery_info)?;
        // Check the signer is the oracle bound at initialization
        if oracle_info.key != lottery.oracle() {
            return Err(Self::fail(LotteryError::UnauthorizedOracle));
        }

        let clock = Clock::get()?;
        let rent = Rent::get()?;
        // Pick the winner and pay out the pot; state is stored only on success
        let mut payout = LamportPayout::new(lottery_info, winner_info, rent);
        let event = lottery
            .fulfill_randomness(request_id, random_word, clock.unix_timestamp, &mut payout)
            .map_err(Self::fail)?;

        lottery.pack(&mut lottery_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    /// Lottery account must be program-owned and writable
    fn check_lottery_account(program_id: &Pubkey, lottery_info: &AccountInfo) -> ProgramResult {
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        if !lottery_info.is_writable {
            msg!("Lottery account must be writable");
            return Err(ProgramError::InvalidArgument);
        }
        Ok(())
    }

    /// Loads an initialized lottery after the ownership checks
    fn load_lottery(program_id: &Pubkey, lottery_info: &AccountInfo) -> Result<Lottery, ProgramError> {
        Self::check_lottery_account(program_id, lottery_info)?;
        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            msg!("Lottery account is not initialized");
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(lottery)
    }

    /// Logs the structured error before it is flattened into a custom code
    fn fail(err: LotteryError) -> ProgramError {
        msg!("Error: {}", err);
        err.into()
    }
}
