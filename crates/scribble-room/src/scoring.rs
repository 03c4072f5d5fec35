//! Points awarded for correct guesses.

/// Award for the first correct guess of a round. Each later guesser gets
/// one point less, down to zero.
pub const GUESS_AWARD: u32 = 10;

/// Flat bonus to the drawer when the first guesser gets it.
pub const DRAWER_BONUS: u32 = 10;

/// Extra point to the drawer once every guesser has answered.
pub const ROUND_COMPLETE_BONUS: u32 = 1;

/// What a correct guesser earns given how many answered before them.
pub fn guess_award(answered_before: usize) -> u32 {
    let before = u32::try_from(answered_before).unwrap_or(u32::MAX);
    GUESS_AWARD.saturating_sub(before)
}
