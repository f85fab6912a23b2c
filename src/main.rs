use clap::Parser;
use rally_standings::utils::{logger, validation::Validate};
use rally_standings::{
    ChampionshipStandings, CliConfig, Command, RestResultStore, StandingsEngine, TeamRallyResult,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting rally-standings CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let store = RestResultStore::new(&config)?;
    let engine = StandingsEngine::new(store);

    let outcome = match config.command {
        Command::Championship { championship_id } => engine
            .championship_standings(championship_id)
            .await
            .map(|standings| print_championship(&standings)),
        Command::TeamRally { rally_id, class_id } => engine
            .team_rally_results(rally_id, class_id)
            .await
            .map(|results| print_team_rally(&results)),
    };

    if let Err(e) = outcome {
        tracing::error!("Standings computation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    Ok(())
}

fn print_championship(standings: &ChampionshipStandings) {
    println!("Championship {} standings", standings.championship_id);
    for (class_name, class) in &standings.classes {
        println!("\nClass {}", class_name);
        for standing in class {
            let rounds: Vec<String> = standing
                .scores
                .iter()
                .map(|score| {
                    if score.participated {
                        score.points.to_string()
                    } else {
                        "-".to_string()
                    }
                })
                .collect();
            println!(
                "  {:>2}. {:<24} {:>4} pts  ({} rounds)  [{}]",
                standing.championship_position,
                standing.participant.display_name,
                standing.total_points,
                standing.rounds_participated,
                rounds.join(" ")
            );
        }
    }

    println!(
        "\nRows: {} linked, {} unlinked, {} skipped",
        standings.linked_rows, standings.unlinked_rows, standings.skipped_rows
    );
    for warning in &standings.warnings {
        eprintln!("⚠ {}", warning);
    }
}

fn print_team_rally(results: &[TeamRallyResult]) {
    for result in results {
        println!(
            "{:>2}. {:<24} {:>4} pts  ({})",
            result.rank, result.team_name, result.total_points, result.class_name
        );
        for member in &result.members {
            let marker = if member.contributed { "*" } else { " " };
            println!("      {} {:<22} {:>4}", marker, member.display_name, member.points);
        }
    }
    if results.is_empty() {
        println!("No team results for this rally and class.");
    }
}
