pub mod achievements;
pub mod error;
pub mod logging;
pub mod partial;
pub mod prompt;
pub mod requester;
pub mod save;
pub mod session;
pub mod settings;
pub mod turn;

// Re-export commonly used items for easier access
pub use achievements::Achievement;
pub use error::{AppError, GameError, SaveError, TurnError};
pub use partial::TurnSnapshot;
pub use prompt::{TurnRequest, build_turn_prompt};
pub use requester::{OpenAiTurnSource, TurnEvent, TurnSource};
pub use save::{PersistedSave, RestSaveStore, SaveStore};
pub use session::{Projection, SessionController, SessionState, TurnOutcome, TurnUpdate};
pub use turn::{Choice, Risk, TurnContent, TurnRecord, clamp_hp};
