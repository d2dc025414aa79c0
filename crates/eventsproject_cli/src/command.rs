//! Command-line parsing.

use chrono::NaiveDate;

pub const USAGE: &str = "usage: eventsproject <command> [args]

commands:
  ping
  version
  add-participant <nom> <prenom> <tache>
  add-event <description> <date_debut> <date_fin> [participant_id...]
  add-log <event_description> <description> <reserve> <prix_unit> <quantite>
  logistics-dates <start> <end>
  recompute-costs <nom> <prenom> <tache>
  show-event <id>

dates use YYYY-MM-DD";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    Version,
    /// Anything that needs the database.
    Store(StoreCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    AddParticipant {
        nom: String,
        prenom: String,
        tache: String,
    },
    AddEvent {
        description: String,
        date_debut: NaiveDate,
        date_fin: NaiveDate,
        participant_ids: Vec<i64>,
    },
    AddLog {
        event_description: String,
        description: String,
        reserve: bool,
        prix_unit: f64,
        quantite: u32,
    },
    LogisticsDates {
        start: NaiveDate,
        end: NaiveDate,
    },
    RecomputeCosts {
        nom: String,
        prenom: String,
        tache: String,
    },
    ShowEvent {
        id: i64,
    },
}

/// Parses arguments after the program name.
pub fn parse(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    match (name.as_str(), rest) {
        ("ping", []) => Ok(Command::Ping),
        ("version", []) => Ok(Command::Version),
        (name, rest) => parse_store(name, rest).map(Command::Store),
    }
}

fn parse_store(name: &str, rest: &[String]) -> Result<StoreCommand, String> {
    match (name, rest) {
        ("add-participant", [nom, prenom, tache]) => Ok(StoreCommand::AddParticipant {
            nom: nom.clone(),
            prenom: prenom.clone(),
            tache: tache.clone(),
        }),
        ("add-event", [description, date_debut, date_fin, ids @ ..]) => Ok(StoreCommand::AddEvent {
            description: description.clone(),
            date_debut: parse_date(date_debut)?,
            date_fin: parse_date(date_fin)?,
            participant_ids: ids
                .iter()
                .map(|id| parse_number(id, "participant_id"))
                .collect::<Result<_, _>>()?,
        }),
        ("add-log", [event_description, description, reserve, prix_unit, quantite]) => {
            Ok(StoreCommand::AddLog {
                event_description: event_description.clone(),
                description: description.clone(),
                reserve: parse_bool(reserve)?,
                prix_unit: parse_number(prix_unit, "prix_unit")?,
                quantite: parse_number(quantite, "quantite")?,
            })
        }
        ("logistics-dates", [start, end]) => Ok(StoreCommand::LogisticsDates {
            start: parse_date(start)?,
            end: parse_date(end)?,
        }),
        ("recompute-costs", [nom, prenom, tache]) => Ok(StoreCommand::RecomputeCosts {
            nom: nom.clone(),
            prenom: prenom.clone(),
            tache: tache.clone(),
        }),
        ("show-event", [id]) => Ok(StoreCommand::ShowEvent {
            id: parse_number(id, "id")?,
        }),
        (other, _) => Err(format!("unknown command or arguments: `{other}`\n\n{USAGE}")),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("invalid date `{value}`: {err}"))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("invalid boolean `{value}`")),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| format!("invalid {field} `{value}`: {err}"))
}
