//! Match simulation
//!
//! All gameplay lives here, with no rendering, audio, or platform code:
//! - Seeded RNG only
//! - Tick counter and wall clock passed in explicitly
//! - Output flows out as `GameEvent`s and read-only snapshots

pub mod ai;
pub mod collision;
pub mod effects;
pub mod events;
pub mod fighter;
pub mod ring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use ai::{AiController, AiState};
pub use collision::{Volume, boxes_overlap, distance};
pub use effects::Effect;
pub use events::{EffectKind, Events, GameEvent, SoundEffect};
pub use fighter::{
    ActionOutcome, DamageOutcome, Fighter, FighterKind, FighterState, MeleeKind, Rejection,
};
pub use ring::{Ring, RingState};
pub use snapshot::{Hud, Snapshot};
pub use state::{GamePhase, GameState, MatchOutcome, NextAction};
pub use tick::{AimInput, TickInput, tick};
