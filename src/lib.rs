pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::RestResultStore;
pub use core::engine::StandingsEngine;
pub use domain::model::{ChampionshipStandings, ClassStanding, TeamRallyResult};
pub use domain::ports::{ResultStore, StoreConfig};
pub use utils::error::{Result, StandingsError};
