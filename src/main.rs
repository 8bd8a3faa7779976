use env_logger::Env;
use log::{error, info};
use std::env;
use std::str::FromStr;

use league_core::{League, LeagueError, LeagueRepository, LeagueService, MemoryRepository, ProjectionConfig, Result};

const USAGE: &str = "usage: league_sim <table|next-week|play-all|results|estimate|champions|reset|edit MATCH HOME AWAY>";

fn setting<T: FromStr>(name: &'static str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| LeagueError::InvalidSetting { name, value }),
        Err(_) => Ok(None),
    }
}

fn projection_config() -> Result<ProjectionConfig> {
    let mut config = ProjectionConfig::default();
    if let Some(trials) = setting("TRIALS")? {
        config = config.with_trials(trials);
    }
    if let Some(cutoff) = setting("CUTOFF_WEEK")? {
        config = config.with_cutoff_week(cutoff);
    }
    if let Some(seed) = setting("SEED")? {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn number_arg(args: &[String], index: usize, name: &'static str) -> Result<u32> {
    let value = args.get(index).cloned().unwrap_or_default();
    value
        .parse()
        .map_err(|_| LeagueError::InvalidSetting { name, value })
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Table,
    NextWeek,
    PlayAll,
    Results,
    Estimate,
    Champions,
    Reset,
    Edit { match_id: u32, home: u32, away: u32 },
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::NextWeek | Command::PlayAll | Command::Reset | Command::Edit { .. }
        )
    }
}

/// Parse the command line (without the program name); no command means `table`.
fn parse_command(args: &[String]) -> Result<Command> {
    let command = match args.first().map(String::as_str).unwrap_or("table") {
        "table" => Command::Table,
        "next-week" => Command::NextWeek,
        "play-all" => Command::PlayAll,
        "results" => Command::Results,
        "estimate" => Command::Estimate,
        "champions" => Command::Champions,
        "reset" => Command::Reset,
        "edit" => Command::Edit {
            match_id: number_arg(args, 1, "MATCH")?,
            home: number_arg(args, 2, "HOME")?,
            away: number_arg(args, 3, "AWAY")?,
        },
        other => {
            return Err(LeagueError::InvalidSetting {
                name: "COMMAND",
                value: other.to_string(),
            })
        }
    };
    Ok(command)
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = parse_command(&args).map_err(|err| {
        eprintln!("{}", USAGE);
        err
    })?;

    let league_file: Option<String> = setting("LEAGUE_FILE")?;
    let league = match &league_file {
        Some(path) => League::from_json_file(path)?,
        None => League::bootstrap(),
    };
    league.validate()?;
    info!("loaded league: {} teams, {} matches", league.teams.len(), league.matches.len());

    let repository = MemoryRepository::new(league);
    let config = projection_config()?;
    let mut service = match config.seed {
        Some(seed) => LeagueService::with_seed(repository, seed),
        None => LeagueService::new(repository),
    }
    .with_config(config);

    match command {
        Command::Table => print_json(&service.table()?)?,
        Command::NextWeek => print_json(&service.play_next_week()?)?,
        Command::PlayAll => print_json(&service.play_all()?)?,
        Command::Results => print_json(&service.results_by_week()?)?,
        Command::Estimate => print_json(&service.estimate_final_table()?)?,
        Command::Champions => print_json(&service.estimate_champions()?)?,
        Command::Reset => service.reset()?,
        Command::Edit { match_id, home, away } => {
            print_json(&service.edit_match_result(match_id, home, away)?)?
        }
    }

    if let (true, Some(path)) = (command.mutates(), &league_file) {
        std::fs::write(path, service.repository().get_league()?.to_json()?)?;
        info!("saved league to {}", path);
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_command_is_table() {
        assert_eq!(parse_command(&[]).unwrap(), Command::Table);
        assert!(!Command::Table.mutates());
    }

    #[test]
    fn test_edit_parses_match_and_goals() {
        let command = parse_command(&args(&["edit", "7", "2", "0"])).unwrap();
        assert_eq!(command, Command::Edit { match_id: 7, home: 2, away: 0 });
        assert!(command.mutates());
    }

    #[test]
    fn test_edit_rejects_bad_number() {
        let err = parse_command(&args(&["edit", "seven", "2", "0"])).unwrap_err();
        assert!(matches!(err, LeagueError::InvalidSetting { name: "MATCH", .. }));

        let err = parse_command(&args(&["edit", "7", "2"])).unwrap_err();
        assert!(matches!(err, LeagueError::InvalidSetting { name: "AWAY", .. }));
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let err = parse_command(&args(&["simulate-everything"])).unwrap_err();
        match err {
            LeagueError::InvalidSetting { name, value } => {
                assert_eq!(name, "COMMAND");
                assert_eq!(value, "simulate-everything");
            }
            other => panic!("unexpected error {}", other),
        }
    }
}
