// Interval raffle - prize delivery
use solana_program::{account_info::AccountInfo, msg, pubkey::Pubkey, rent::Rent};

use crate::error::LotteryError;

/// Delivers the pot to a winner as a single all-or-nothing step
pub trait Payout {
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<(), LotteryError>;
}

/// Moves lamports out of the program-owned lottery account.
///
/// The lottery account keeps its rent-exempt reserve; only the pot above it
/// is paid out. Both balances are computed and borrowed before either is
/// written.
pub struct LamportPayout<'a, 'info> {
    vault: &'a AccountInfo<'info>,
    recipient: &'a AccountInfo<'info>,
    rent: Rent,
}

impl<'a, 'info> LamportPayout<'a, 'info> {
    pub fn new(vault: &'a AccountInfo<'info>, recipient: &'a AccountInfo<'info>, rent: Rent) -> Self {
        Self {
            vault,
            recipient,
            rent,
        }
    }
}

impl<'a, 'info> Payout for LamportPayout<'a, 'info> {
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<(), LotteryError> {
        if self.recipient.key != recipient {
            msg!("Winner account {} does not match drawn winner {}", self.recipient.key, recipient);
            return Err(LotteryError::TransferFailed);
        }
        if !self.recipient.is_writable || self.recipient.executable {
            msg!("Winner account {} cannot receive lamports", recipient);
            return Err(LotteryError::TransferFailed);
        }

        let reserve = self.rent.minimum_balance(self.vault.data_len());
        let vault_after = self
            .vault
            .lamports()
            .checked_sub(amount)
            .filter(|rest| *rest >= reserve)
            .ok_or_else(|| {
                msg!("Lottery account cannot cover a payout of {} lamports", amount);
                LotteryError::TransferFailed
            })?;
        let recipient_after = self
            .recipient
            .lamports()
            .checked_add(amount)
            .ok_or(LotteryError::TransferFailed)?;
        if recipient_after < self.rent.minimum_balance(self.recipient.data_len()) {
            msg!("Payout would leave winner account below rent exemption");
            return Err(LotteryError::TransferFailed);
        }

        let mut vault_lamports = self
            .vault
            .try_borrow_mut_lamports()
            .map_err(|_| LotteryError::TransferFailed)?;
        let mut recipient_lamports = self
            .recipient
            .try_borrow_mut_lamports()
            .map_err(|_| LotteryError::TransferFailed)?;
        **vault_lamports = vault_after;
        **recipient_lamports = recipient_after;

        msg!("Paid {} lamports to {}", amount, recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAccount {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl TestAccount {
        fn new(lamports: u64, data_len: usize) -> Self {
            Self {
                key: Pubkey::new_unique(),
                owner: Pubkey::new_unique(),
                lamports,
                data: vec![0; data_len],
            }
        }

        fn info(&mut self, is_writable: bool, executable: bool) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                false,
                is_writable,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                executable,
                0,
            )
        }
    }

    fn vault_reserve(rent: &Rent) -> u64 {
        rent.minimum_balance(100)
    }

    #[test]
    fn pays_pot_above_reserve() {
        let rent = Rent::default();
        let reserve = vault_reserve(&rent);
        let mut vault = TestAccount::new(reserve + 40, 100);
        let mut winner = TestAccount::new(rent.minimum_balance(0), 0);
        let winner_key = winner.key;
        let winner_start = winner.lamports;
        {
            let vault_info = vault.info(true, false);
            let winner_info = winner.info(true, false);
            let mut payout = LamportPayout::new(&vault_info, &winner_info, rent);
            payout.transfer(&winner_key, 40).unwrap();
        }
        assert_eq!(vault.lamports, reserve);
        assert_eq!(winner.lamports, winner_start + 40);
    }

    #[test]
    fn rejects_wrong_recipient_without_moving_funds() {
        let rent = Rent::default();
        let reserve = vault_reserve(&rent);
        let mut vault = TestAccount::new(reserve + 40, 100);
        let mut other = TestAccount::new(rent.minimum_balance(0), 0);
        let drawn = Pubkey::new_unique();
        {
            let vault_info = vault.info(true, false);
            let other_info = other.info(true, false);
            let mut payout = LamportPayout::new(&vault_info, &other_info, rent);
            assert_eq!(
                payout.transfer(&drawn, 40),
                Err(LotteryError::TransferFailed)
            );
        }
        assert_eq!(vault.lamports, reserve + 40);
    }

    #[test]
    fn rejects_executable_or_readonly_recipient() {
        let rent = Rent::default();
        let reserve = vault_reserve(&rent);
        let mut vault = TestAccount::new(reserve + 40, 100);
        let mut program = TestAccount::new(rent.minimum_balance(0), 0);
        let key = program.key;
        {
            let vault_info = vault.info(true, false);
            let program_info = program.info(true, true);
            let mut payout = LamportPayout::new(&vault_info, &program_info, rent);
            assert_eq!(payout.transfer(&key, 40), Err(LotteryError::TransferFailed));
        }
        {
            let vault_info = vault.info(true, false);
            let readonly_info = program.info(false, false);
            let mut payout = LamportPayout::new(&vault_info, &readonly_info, rent);
            assert_eq!(payout.transfer(&key, 40), Err(LotteryError::TransferFailed));
        }
        assert_eq!(vault.lamports, reserve + 40);
    }

    #[test]
    fn never_dips_into_rent_reserve() {
        let rent = Rent::default();
        let reserve = vault_reserve(&rent);
        let mut vault = TestAccount::new(reserve + 10, 100);
        let mut winner = TestAccount::new(rent.minimum_balance(0), 0);
        let winner_key = winner.key;
        {
            let vault_info = vault.info(true, false);
            let winner_info = winner.info(true, false);
            let mut payout = LamportPayout::new(&vault_info, &winner_info, rent);
            assert_eq!(
                payout.transfer(&winner_key, 11),
                Err(LotteryError::TransferFailed)
            );
        }
        assert_eq!(vault.lamports, reserve + 10);
    }

    #[test]
    fn rejects_credit_that_leaves_new_account_below_rent() {
        let rent = Rent::default();
        let reserve = vault_reserve(&rent);
        let mut vault = TestAccount::new(reserve + 10, 100);
        let mut fresh = TestAccount::new(0, 0);
        let key = fresh.key;
        {
            let vault_info = vault.info(true, false);
            let fresh_info = fresh.info(true, false);
            let mut payout = LamportPayout::new(&vault_info, &fresh_info, rent);
            assert_eq!(payout.transfer(&key, 10), Err(LotteryError::TransferFailed));
        }
        assert_eq!(fresh.lamports, 0);
    }
}
