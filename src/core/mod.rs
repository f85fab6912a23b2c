pub mod championship;
pub mod engine;
pub mod resolver;
pub mod team;

pub use crate::domain::model::{
    ChampionshipStandings, ClassStanding, Participant, ParticipantIdentity, ParticipantKey,
    RallyRound, RawResult, TeamRallyResult,
};
pub use crate::domain::ports::{ResultStore, StoreConfig};
pub use crate::utils::error::Result;
