//! Command-line front end for the staff scheduling core.
//!
//! # Responsibility
//! - Resolve database and logging settings from flags or environment.
//! - Run one directory operation per invocation against a SQLite file.
//! - Print plain text lines and map failures to exit codes.

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use uniadmin_core::db::{open_db, DbError};
use uniadmin_core::{
    core_version, default_log_level, init_logging, ping, DirectoryError, EntryId, RepoError, Role,
    Specialty, SqliteStaffRepository, StaffDirectory, StaffRecord, StaffRegistration,
    StaffRepository, TimeInterval,
};

/// University staff administration tool
#[derive(Parser, Debug)]
#[command(name = "uniadmin")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database file
    #[arg(long, global = true, env = "UNIADMIN_DB", default_value = "uniadmin.db")]
    db: String,

    /// Absolute directory for log files; logging is off when unset
    #[arg(long, global = true, env = "UNIADMIN_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "UNIADMIN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info
    Ping,
    /// Register a staff member
    Register {
        id: String,
        display_name: String,
        #[arg(value_parser = parse_role)]
        role: Role,
        /// Defaults to the role's specialty when omitted
        #[arg(long, value_parser = parse_specialty)]
        specialty: Option<Specialty>,
    },
    /// Add an availability slot, e.g. 2025-06-01T09:00 2025-06-01T10:00
    AddSlot {
        staff_id: String,
        #[arg(value_parser = parse_instant)]
        start: NaiveDateTime,
        #[arg(value_parser = parse_instant)]
        end: NaiveDateTime,
    },
    /// Remove an availability slot by entry id
    RemoveSlot {
        staff_id: String,
        entry_id: EntryId,
    },
    /// List staff available on a date or inside a window
    Available {
        /// Calendar date (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["from", "to"], required_unless_present = "from")]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_instant, requires = "to")]
        from: Option<NaiveDateTime>,
        #[arg(long, value_parser = parse_instant, requires = "from")]
        to: Option<NaiveDateTime>,
    },
    /// List staff whose specialty matches the text
    Specialty { text: String },
    /// Change the role of a staff member
    SetRole { staff_id: String, role: String },
    /// Change the specialty of a staff member; `none` clears it
    SetSpecialty { staff_id: String, specialty: String },
    /// Delete a staff member and all of their slots
    Delete { staff_id: String },
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Usage(String),
    Db(DbError),
    Repo(RepoError),
    Directory(DirectoryError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Directory(DirectoryError::StaffNotFound(_))
            | Self::Directory(DirectoryError::EntryNotFound(_)) => 3,
            Self::Directory(DirectoryError::OverlapConflict { .. })
            | Self::Directory(DirectoryError::DuplicateStaff(_)) => 4,
            Self::Directory(DirectoryError::Repo(_)) | Self::Db(_) | Self::Repo(_) => 5,
            Self::Directory(_) | Self::Usage(_) => 2,
            Self::Logging(_) => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging: {message}"),
            Self::Usage(message) => write!(f, "usage: {message}"),
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Repo(err) => write!(f, "repository: {err}"),
            Self::Directory(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DirectoryError> for CliError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(CliError::Logging)?;
    }

    if let Command::Ping = args.command {
        println!("uniadmin_core ping={}", ping());
        println!("uniadmin_core version={}", core_version());
        return Ok(());
    }

    let mut conn = open_db(&args.db)?;
    let mut repo = SqliteStaffRepository::try_new(&mut conn)?;
    let directory = StaffDirectory::load_from(&repo)?;

    match args.command {
        Command::Ping => {}
        Command::Register {
            id,
            display_name,
            role,
            specialty,
        } => {
            let record = directory.register(StaffRegistration {
                id,
                display_name,
                role,
                specialty,
            })?;
            directory.persist_profile(&mut repo, &record.id)?;
            print_record(&record);
        }
        Command::AddSlot {
            staff_id,
            start,
            end,
        } => {
            let entry = directory.add_availability_with(
                &mut repo,
                &staff_id,
                TimeInterval::new(start, end),
            )?;
            println!("{} {} {}", entry.id, entry.start, entry.end);
        }
        Command::RemoveSlot { staff_id, entry_id } => {
            directory.remove_availability_with(&mut repo, &staff_id, entry_id)?;
            println!("removed {entry_id}");
        }
        Command::Available { date, from, to } => {
            let records = match (date, from, to) {
                (Some(date), None, None) => directory.find_available_on(date),
                (None, Some(from), Some(to)) => directory.find_available(from, to),
                _ => {
                    return Err(CliError::Usage(
                        "available needs --date or both --from and --to".to_string(),
                    ))
                }
            };
            records.iter().for_each(print_record);
        }
        Command::Specialty { text } => {
            directory.match_specialty(&text).iter().for_each(print_record);
        }
        Command::SetRole { staff_id, role } => {
            let record = directory.change_role(&staff_id, &role)?;
            directory.persist_profile(&mut repo, &staff_id)?;
            print_record(&record);
        }
        Command::SetSpecialty {
            staff_id,
            specialty,
        } => {
            let record = directory.change_specialty(&staff_id, &specialty)?;
            directory.persist_profile(&mut repo, &staff_id)?;
            print_record(&record);
        }
        Command::Delete { staff_id } => {
            let removed = directory.delete(&staff_id)?;
            repo.delete(&staff_id)?;
            println!(
                "deleted {} entries_removed={}",
                removed.id,
                removed.schedule.len()
            );
        }
    }
    Ok(())
}

fn print_record(record: &StaffRecord) {
    println!(
        "{}\t{}\t{}\t{}\tslots={}",
        record.id,
        record.display_name,
        record.role.as_str(),
        record.specialty_text().unwrap_or("-"),
        record.schedule.len()
    );
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role `{raw}`"))
}

fn parse_specialty(raw: &str) -> Result<Specialty, String> {
    Specialty::parse(raw).ok_or_else(|| format!("unknown specialty `{raw}`"))
}

fn parse_instant(raw: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got `{raw}`"))
}
