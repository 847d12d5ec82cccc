use strum_macros::{Display, EnumIter};

/// Unlockable milestones, evaluated synchronously when a choice is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Achievement {
    #[strum(serialize = "First Steps")]
    FirstSteps,
    #[strum(serialize = "Survivor")]
    Survivor,
    #[strum(serialize = "Untouchable")]
    Untouchable,
    #[strum(serialize = "Hoarder")]
    Hoarder,
}

impl Achievement {
    /// Short unlock hint shown next to the achievement name.
    pub fn hint(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "5 turns",
            Achievement::Survivor => "20 turns",
            Achievement::Untouchable => "No damage",
            Achievement::Hoarder => "5+ items",
        }
    }
}

/// Returns the achievements unlocked by this submission, in evaluation order.
///
/// Inputs are the pre-turn hp and inventory size together with the turn count
/// already incremented for the submission being made. Each achievement
/// unlocks at most once; anything in `already` is skipped.
pub fn newly_unlocked(
    hp: u8,
    turn_count: u32,
    items_held: usize,
    already: &[Achievement],
) -> Vec<Achievement> {
    let mut unlocked = Vec::new();
    let mut check = |hit: bool, achievement: Achievement| {
        if hit && !already.contains(&achievement) {
            unlocked.push(achievement);
        }
    };

    check(turn_count == 5, Achievement::FirstSteps);
    check(turn_count == 20, Achievement::Survivor);
    check(hp == 100 && turn_count > 10, Achievement::Untouchable);
    check(items_held >= 5, Achievement::Hoarder);

    unlocked
}
