// Interval raffle - round state machine
//
// Every operation takes the lottery record by exclusive reference and either
// applies completely or leaves it untouched.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::error::LotteryError;
use crate::events::LotteryEvent;
use crate::payout::Payout;
use crate::randomness::{RandomWord, RandomnessOracle, RequestId};
use crate::state::{Lottery, RoundState, MAX_ENTRANTS};

/// Result of the upkeep predicate plus the values it was computed from
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    pub state: RoundState,
    pub balance: u64,
    pub player_count: u64,
    /// Seconds since the last draw request
    pub elapsed: i64,
}

impl Lottery {
    /// Records one entry slot for `player`.
    pub fn enter(&mut self, player: Pubkey, amount: u64) -> Result<LotteryEvent, LotteryError> {
        if self.state != RoundState::Open {
            return Err(LotteryError::RoundNotOpen);
        }
        if amount < self.config.entrance_fee {
            return Err(LotteryError::InsufficientDeposit {
                required: self.config.entrance_fee,
                provided: amount,
            });
        }
        if self.players.len() >= MAX_ENTRANTS {
            return Err(LotteryError::LotteryFull);
        }
        let pot_balance = self
            .pot_balance
            .checked_add(amount)
            .ok_or(LotteryError::AmountOverflow)?;

        self.players.push(player);
        self.pot_balance = pot_balance;
        Ok(LotteryEvent::EntryRecorded { player, amount })
    }

    pub fn player_at(&self, index: u64) -> Result<&Pubkey, LotteryError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.players.get(i))
            .ok_or(LotteryError::IndexOutOfRange {
                index,
                count: self.count(),
            })
    }

    pub fn count(&self) -> u64 {
        self.players.len() as u64
    }

    /// Decides whether a draw may start at `now`. Never mutates.
    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepStatus {
        let elapsed = now.saturating_sub(self.last_timestamp);
        let interval_passed = elapsed >= 0 && elapsed as u64 >= self.config.interval;
        let upkeep_needed = self.state == RoundState::Open
            && interval_passed
            && !self.players.is_empty()
            && self.pot_balance > 0;

        UpkeepStatus {
            upkeep_needed,
            state: self.state,
            balance: self.pot_balance,
            player_count: self.count(),
            elapsed,
        }
    }

    /// Closes the round and asks the oracle for randomness.
    ///
    /// The predicate is re-evaluated here, so a stale or repeated trigger is
    /// rejected with the diagnostic triple.
    pub fn perform_upkeep<O: RandomnessOracle>(
        &mut self,
        now: UnixTimestamp,
        oracle: &mut O,
    ) -> Result<LotteryEvent, LotteryError> {
        let status = self.check_upkeep(now);
        if !status.upkeep_needed {
            return Err(LotteryError::UpkeepNotNeeded {
                state: status.state,
                balance: status.balance,
                count: status.player_count,
            });
        }

        let request_id = oracle.request_randomness(&self.config.randomness, self.request_nonce)?;
        let request_nonce = self
            .request_nonce
            .checked_add(1)
            .ok_or(LotteryError::AmountOverflow)?;

        self.state = RoundState::Calculating;
        self.last_timestamp = now;
        self.outstanding_request = Some(request_id);
        self.request_nonce = request_nonce;
        Ok(LotteryEvent::DrawRequested { request_id })
    }

    /// Settles the outstanding draw with the oracle's random word.
    ///
    /// The reset is staged on a copy and committed only once the payout went
    /// through; on any failure the round stays `Calculating` with the same
    /// request id.
    pub fn fulfill_randomness<P: Payout>(
        &mut self,
        request_id: RequestId,
        random_word: RandomWord,
        now: UnixTimestamp,
        payout: &mut P,
    ) -> Result<LotteryEvent, LotteryError> {
        if self.outstanding_request != Some(request_id) {
            return Err(LotteryError::UnknownRequest);
        }

        // The registry cannot change while calculating, so its current length
        // is the length at request time.
        let winner_index = random_word
            .modulo(self.count())
            .ok_or(LotteryError::IndexOutOfRange { index: 0, count: 0 })?;
        let winner = *self.player_at(winner_index)?;

        let mut draft = self.clone();
        draft.outstanding_request = None;
        draft.state = RoundState::Open;
        draft.players.clear();
        let amount = draft.pot_balance;
        draft.pot_balance = 0;
        draft.recent_winner = Some(winner);

        payout.transfer(&winner, amount)?;

        *self = draft;
        Ok(LotteryEvent::WinnerPicked {
            winner,
            amount,
            timestamp: now,
        })
    }
}
