use crate::achievements::{self, Achievement};
use crate::error::GameError;
use crate::partial::TurnSnapshot;
use crate::prompt::{START_ACTION, TurnRequest};
use crate::requester::{TurnEvent, TurnSource};
use crate::save::{PersistedSave, SaveStore};
use crate::turn::{TurnContent, TurnRecord, clamp_hp};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const STARTING_HP: u8 = 100;

/// Everything a play-through owns: identity, canonical history, health,
/// items and unlocked achievements. Discarded wholesale on restart.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_id: Uuid,
    pub history: Vec<TurnRecord>,
    pub hp: u8,
    pub inventory: Vec<String>,
    pub turn_count: u32,
    pub achievements: Vec<Achievement>,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            history: Vec::new(),
            hp: STARTING_HP,
            inventory: Vec::new(),
            turn_count: 0,
            achievements: Vec::new(),
        }
    }
}

enum Phase {
    Idle,
    Streaming {
        action: String,
        pre_turn_hp: u8,
        events: mpsc::UnboundedReceiver<TurnEvent>,
    },
    /// The stream ended without a finish event. The action is retained so the
    /// same submission can be retried instead of leaving the player hanging.
    Failed { action: String },
    Dead,
}

/// How a resolved turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Failed,
}

/// Snapshot handed to the render layer on every streamed update.
#[derive(Debug, Clone)]
pub struct TurnUpdate {
    pub hp: u8,
    /// True when this update lowered the displayed hp; the damage pulse
    /// fires immediately, ahead of stream completion.
    pub flashed: bool,
    pub snapshot: TurnSnapshot,
}

/// What the UI should currently show.
pub enum Projection<'a> {
    /// A turn is streaming; show the live partial object.
    Streaming(&'a TurnSnapshot),
    /// The last adopted turn content.
    Settled(&'a TurnContent),
    /// Nothing yet; the session has not started.
    Empty,
}

/// The single-threaded state machine driving one play-through.
///
/// Exactly one turn is in flight at a time: `submit_action` issues the
/// request, `resolve_turn` pumps the event channel until the turn finishes or
/// the stream dies. Persistence happens after a turn fully resolves and is
/// never awaited by gameplay.
pub struct SessionController {
    source: Arc<dyn TurnSource>,
    store: Arc<dyn SaveStore>,
    state: SessionState,
    phase: Phase,
    current: Option<TurnContent>,
    preview: Option<TurnSnapshot>,
    damage_flashes: u64,
}

impl SessionController {
    /// Boot: assigns a fresh session identifier. No prior persisted save is
    /// looked up; every page of this story starts blank.
    pub fn new(source: Arc<dyn TurnSource>, store: Arc<dyn SaveStore>) -> Self {
        Self {
            source,
            store,
            state: SessionState::fresh(),
            phase: Phase::Idle,
            current: None,
            preview: None,
            damage_flashes: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn hp(&self) -> u8 {
        self.state.hp
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.phase, Phase::Streaming { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed { .. })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.phase, Phase::Dead)
    }

    /// Monotone counter of damage pulses, for the render layer to animate.
    pub fn damage_flashes(&self) -> u64 {
        self.damage_flashes
    }

    /// The current turn projection: live snapshot while streaming, otherwise
    /// the last finished turn content.
    pub fn projection(&self) -> Projection<'_> {
        if let Some(snapshot) = &self.preview {
            return Projection::Streaming(snapshot);
        }
        if let Some(content) = &self.current {
            return Projection::Settled(content);
        }
        match self
            .state
            .history
            .iter()
            .rev()
            .find_map(|record| record.result.as_ref())
        {
            Some(content) => Projection::Settled(content),
            None => Projection::Empty,
        }
    }

    /// Kicks off a fresh story with the start sentinel.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.submit_action(START_ACTION)
    }

    /// Uses a held item, encoded as a synthetic action.
    pub fn use_item(&mut self, item: &str) -> Result<(), GameError> {
        self.submit_action(format!("Use {item}"))
    }

    /// Submits a player action. Rejected while a turn is streaming, while a
    /// failed turn awaits retry, and once the session is over.
    ///
    /// Achievements are evaluated here, before the turn result is known,
    /// against the pre-turn hp and inventory and the just-incremented turn
    /// count: "First Steps" fires on the exact submission where the count
    /// transitions to 5.
    pub fn submit_action(&mut self, action: impl Into<String>) -> Result<(), GameError> {
        match self.phase {
            Phase::Streaming { .. } => return Err(GameError::TurnInFlight),
            Phase::Failed { .. } => return Err(GameError::TurnFailed),
            Phase::Dead => return Err(GameError::SessionOver),
            Phase::Idle => {}
        }
        if self.state.hp == 0 {
            self.phase = Phase::Dead;
            return Err(GameError::SessionOver);
        }

        self.state.turn_count += 1;
        let unlocked = achievements::newly_unlocked(
            self.state.hp,
            self.state.turn_count,
            self.state.inventory.len(),
            &self.state.achievements,
        );
        for achievement in &unlocked {
            log::info!("achievement unlocked: {achievement}");
        }
        self.state.achievements.extend(unlocked);

        self.issue(action.into());
        Ok(())
    }

    /// Re-issues the action of a failed turn. Turn count and achievements are
    /// untouched; the submission already happened.
    pub fn retry(&mut self) -> Result<(), GameError> {
        let action = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Failed { action } => action,
            other => {
                self.phase = other;
                return Err(GameError::NoFailedTurn);
            }
        };
        self.issue(action);
        Ok(())
    }

    fn issue(&mut self, action: String) {
        let mut history = self.state.history.clone();
        history.push(TurnRecord {
            action: action.clone(),
            result: None,
        });
        let request = TurnRequest {
            history,
            current_hp: self.state.hp,
            inventory: self.state.inventory.clone(),
        };
        let events = self.source.request_turn(request);
        self.phase = Phase::Streaming {
            action,
            pre_turn_hp: self.state.hp,
            events,
        };
    }

    /// Pumps the in-flight turn to completion, invoking `on_update` for every
    /// partial snapshot.
    ///
    /// Partial objects only update the live projection; the finish event is
    /// authoritative: hp is clamped into [0,100] and adopted, the inventory
    /// replaced wholesale, the turn appended to history and the save upserted
    /// fire-and-forget. A stream that ends without a finish event leaves the
    /// session in a failed-turn state with the displayed hp restored.
    pub async fn resolve_turn<F>(&mut self, mut on_update: F) -> Result<TurnOutcome, GameError>
    where
        F: FnMut(&TurnUpdate),
    {
        let (action, pre_turn_hp, mut events) =
            match std::mem::replace(&mut self.phase, Phase::Idle) {
                Phase::Streaming {
                    action,
                    pre_turn_hp,
                    events,
                } => (action, pre_turn_hp, events),
                other => {
                    self.phase = other;
                    return Err(GameError::NoTurnInFlight);
                }
            };

        while let Some(event) = events.recv().await {
            match event {
                TurnEvent::Partial(snapshot) => {
                    let mut flashed = false;
                    if let Some(raw) = snapshot.hp {
                        let shown = clamp_hp(raw);
                        if shown < self.state.hp {
                            self.damage_flashes += 1;
                            flashed = true;
                        }
                        self.state.hp = shown;
                    }
                    self.preview = Some(snapshot.clone());
                    on_update(&TurnUpdate {
                        hp: self.state.hp,
                        flashed,
                        snapshot,
                    });
                }
                TurnEvent::Finish(content) => {
                    let final_hp = clamp_hp(content.hp);
                    if final_hp < pre_turn_hp {
                        self.damage_flashes += 1;
                    }
                    self.state.hp = final_hp;
                    self.state.inventory = content.inventory.clone();
                    self.state.history.push(TurnRecord {
                        action,
                        result: Some(content.clone()),
                    });
                    self.preview = None;
                    self.current = Some(content);
                    self.spawn_save();
                    self.phase = if self.state.hp == 0 {
                        Phase::Dead
                    } else {
                        Phase::Idle
                    };
                    return Ok(TurnOutcome::Completed);
                }
            }
        }

        // Channel closed without a finish event: the upstream request failed.
        // Partial hp previews are rolled back; nothing was adopted.
        self.preview = None;
        self.state.hp = pre_turn_hp;
        self.phase = Phase::Failed { action };
        Ok(TurnOutcome::Failed)
    }

    /// Full restart: discards all in-memory state and re-enters boot under a
    /// new identifier. The store row of the abandoned session is never
    /// cleared; the upsert key simply rotates.
    pub fn restart(&mut self) {
        self.state = SessionState::fresh();
        self.phase = Phase::Idle;
        self.current = None;
        self.preview = None;
    }

    fn spawn_save(&self) {
        let save = PersistedSave {
            session_id: self.state.session_id,
            history: self.state.history.clone(),
            hp: self.state.hp,
            inventory: self.state.inventory.clone(),
            location_name: self
                .current
                .as_ref()
                .or_else(|| {
                    self.state
                        .history
                        .iter()
                        .rev()
                        .find_map(|record| record.result.as_ref())
                })
                .map(|content| content.location_name.clone())
                .unwrap_or_default(),
            last_updated: Utc::now(),
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.upsert(save).await {
                // Swallowed on purpose: a lost autosave never blocks play.
                log::warn!("autosave failed: {e:#}");
            }
        });
    }
}
