use crate::domain::ports::StoreConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_id, validate_timeout, validate_url, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rally-standings")]
#[command(about = "Championship and team standings for the rally community site")]
pub struct CliConfig {
    /// Base URL of the backend's REST API
    #[arg(long)]
    pub api_endpoint: String,

    #[arg(long, default_value = "30")]
    pub request_timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print season standings for a championship, per class
    Championship { championship_id: i64 },
    /// Print team results for one rally and class
    TeamRally { rally_id: i64, class_id: i64 },
}

impl StoreConfig for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_timeout("request_timeout_secs", self.request_timeout_secs)?;
        match self.command {
            Command::Championship { championship_id } => {
                validate_positive_id("championship_id", championship_id)
            }
            Command::TeamRally { rally_id, class_id } => {
                validate_positive_id("rally_id", rally_id)?;
                validate_positive_id("class_id", class_id)
            }
        }
    }
}
