use crate::turn::{Risk, TurnRecord};
use serde::{Deserialize, Serialize};

/// Synthetic action submitted to kick off a fresh session.
pub const START_ACTION: &str = "START_GAME";

/// The request shape the turn requester accepts: the accumulated history
/// (whose last record is the just-submitted, still unresolved action),
/// the player's current health and held items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub history: Vec<TurnRecord>,
    pub current_hp: u8,
    pub inventory: Vec<String>,
}

/// Builds the game-master prompt for one turn.
///
/// The post-turn HP for every risk tier is pre-computed here and embedded as
/// a literal number, so the model substitutes a value instead of doing
/// arithmetic. Reaching 0 HP instructs a short death scene with no choices.
pub fn build_turn_prompt(request: &TurnRequest) -> String {
    let hp = request.current_hp;
    let inventory_list = if request.inventory.is_empty() {
        "nothing".to_string()
    } else {
        request.inventory.join(", ")
    };
    let last_action = request
        .history
        .last()
        .map(|record| record.action.as_str())
        .unwrap_or(START_ACTION);

    let minor = Risk::Minor.outcome(hp);
    let moderate = Risk::Moderate.outcome(hp);
    let major = Risk::Major.outcome(hp);

    format!(
        r#"You are an ENGAGING text adventure game master. Create immersive, dramatic scenarios.

Current State:
- HP: {hp}/100
- Inventory: {inventory_list}
- Last Action: "{last_action}"

STORYTELLING RULES:
1. Write engaging descriptions (3-5 sentences, 80-120 words)
2. Be vivid and immersive
3. Create tension and atmosphere
4. Focus on the immediate situation

HP SYSTEM - CRITICAL:
You MUST return the CALCULATED new HP value:
- Safe actions: Return hp: {hp} (no change)
- Minor risk: Return hp: {minor}
- Moderate risk: Return hp: {moderate}
- Major risk: Return hp: {major}

Provide a brief hpChangeReason when HP changes, null otherwise.
If HP reaches 0, write a short death scene and return empty choices [].

CHOICES:
- Give 1 to 4 diverse choices with clear risk levels
- Label each choice with the correct risk: 'safe', 'minor', 'moderate' or 'major'
- Make risky choices actually cause HP loss

Create ENGAGING modern scenarios: heists, escapes, mysteries, survival situations."#
    )
}
