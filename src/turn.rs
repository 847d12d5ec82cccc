use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Named severity of a choice, controlling the deterministic health deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Risk {
    Safe,
    Minor,
    Moderate,
    Major,
}

impl Risk {
    /// Health points deducted by a choice of this tier.
    pub fn deduction(self) -> u8 {
        match self {
            Risk::Safe => 0,
            Risk::Minor => 10,
            Risk::Moderate => 20,
            Risk::Major => 40,
        }
    }

    /// The exact HP the model is instructed to return for this tier.
    pub fn outcome(self, hp: u8) -> u8 {
        hp.saturating_sub(self.deduction())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub label: String,
    pub action_id: String,
    pub risk: Risk,
}

/// The structured narrative and state payload produced for one turn.
///
/// `hp` stays an i64 at the wire boundary: the upstream contract does not
/// guarantee the [0,100] range, so clamping happens where the value is
/// adopted into the session ([`clamp_hp`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnContent {
    pub location_name: String,
    pub description: String,
    pub hp: i64,
    pub hp_change_reason: Option<String>,
    pub inventory: Vec<String>,
    pub choices: Vec<Choice>,
}

/// One player action paired with the resulting turn content.
///
/// Records are append-only: `result` is `None` only for the pending record
/// sent with an in-flight request, never in the session history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub action: String,
    pub result: Option<TurnContent>,
}

/// Clamps a raw model-reported HP value into the displayable range.
pub fn clamp_hp(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}
