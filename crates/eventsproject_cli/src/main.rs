//! Command-line front end for `eventsproject_core`.
//!
//! # Responsibility
//! - Resolve configuration, open the database, run one use-case.
//! - Print results as JSON on stdout and errors on stderr.

mod command;
mod config;

use command::{Command, StoreCommand};
use config::CliConfig;
use eventsproject_core::db::open_db;
use eventsproject_core::{
    core_version, init_logging, ping, Event, EventId, EventRepository, EventService,
    EventServiceError, Logistics, Participant, ParticipantId, ParticipantRepository,
    SqliteEventRepository, SqliteParticipantRepository,
};
use log::error;
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let config = CliConfig::from_env();
    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(message) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {message}");
        }
    }

    match run(&config, command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig, command: Command) -> Result<serde_json::Value, Box<dyn Error>> {
    match command {
        Command::Ping => Ok(json!({ "ping": ping() })),
        Command::Version => Ok(json!({ "version": core_version() })),
        Command::Store(command) => run_store(config, command),
    }
}

fn run_store(
    config: &CliConfig,
    command: StoreCommand,
) -> Result<serde_json::Value, Box<dyn Error>> {
    let conn = open_db(&config.db_path)?;
    let events = SqliteEventRepository::try_new(&conn)?;
    let participants = SqliteParticipantRepository::try_new(&conn)?;
    let service = EventService::new(&events, &participants);

    let output = match command {
        StoreCommand::AddParticipant { nom, prenom, tache } => {
            let saved = service.add_participant(&Participant::new(nom, prenom, tache))?;
            serde_json::to_value(saved)?
        }
        StoreCommand::AddEvent {
            description,
            date_debut,
            date_fin,
            participant_ids,
        } => {
            // Single save, after every participant is resolved.
            let mut event = Event::scheduled(description, date_debut, date_fin);
            for id in participant_ids.into_iter().map(ParticipantId) {
                let mut participant = participants
                    .find_by_id(id)?
                    .ok_or(EventServiceError::ParticipantNotFound(id))?;
                event.enroll(&mut participant)?;
            }
            serde_json::to_value(service.add_affect_event_participants(event)?)?
        }
        StoreCommand::AddLog {
            event_description,
            description,
            reserve,
            prix_unit,
            quantite,
        } => {
            let item = Logistics::priced(description, reserve, prix_unit, quantite);
            serde_json::to_value(service.add_affect_log(item, &event_description)?)?
        }
        StoreCommand::LogisticsDates { start, end } => {
            serde_json::to_value(service.get_logistics_dates(start, end)?)?
        }
        StoreCommand::RecomputeCosts { nom, prenom, tache } => {
            service.recompute_costs(&nom, &prenom, &tache)?;
            json!({ "status": "ok" })
        }
        StoreCommand::ShowEvent { id } => match events.find_by_id(EventId(id))? {
            Some(event) => serde_json::to_value(event)?,
            None => return Err(format!("event not found: {id}").into()),
        },
    };
    Ok(output)
}
