//! Command line and environment settings

use clap::{value_parser, Arg, ArgMatches, Command};
use hrsync_core::{SyncConfig, DEFAULT_BATCH_SIZE};
use hrsync_odoo::OdooConfig;
use std::path::PathBuf;

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogFormat {
    Plain,
    Json,
}

/// Everything one run needs
#[derive(Debug)]
pub(crate) struct Settings {
    pub(crate) odoo: OdooConfig,
    pub(crate) sync: SyncConfig,
    pub(crate) log_level: String,
    pub(crate) log_format: LogFormat,
}

pub(crate) fn command() -> Command {
    Command::new("hrsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror HR employee records and photos into a local backup")
        .arg(
            Arg::new("url")
                .long("url")
                .env("ODOO_URL")
                .required(true)
                .help("Base URL of the Odoo server"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .env("ODOO_DB")
                .required(true)
                .help("Odoo database name"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .env("ODOO_USER")
                .required(true)
                .help("Login of the API user"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .env("ODOO_KEY")
                .hide_env_values(true)
                .required(true)
                .help("API key or password"),
        )
        .arg(
            Arg::new("backup")
                .long("backup")
                .default_value("hr_backup.json")
                .value_parser(value_parser!(PathBuf))
                .help("Backup JSON file"),
        )
        .arg(
            Arg::new("images")
                .long("images")
                .default_value("emp_img")
                .value_parser(value_parser!(PathBuf))
                .help("Directory of employee photos"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .default_value("25")
                .value_parser(value_parser!(usize))
                .help("Records read per remote request"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .help("Log filter used when RUST_LOG is unset"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .default_value("plain")
                .value_parser(["plain", "json"])
                .help("Log line layout"),
        )
}

impl Settings {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Self {
        let text = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned().unwrap_or_default();

        let odoo = OdooConfig::new(text("url"), text("db"), text("user"), text("key"));
        let batch_size = matches
            .get_one::<usize>("batch-size")
            .copied()
            .unwrap_or(DEFAULT_BATCH_SIZE);
        let sync = SyncConfig::new(path("backup"), path("images")).with_batch_size(batch_size);

        let log_format = match text("log-format").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        Self {
            odoo,
            sync,
            log_level: text("log-level"),
            log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDENTIALS: [&str; 9] = [
        "hrsync", "--url", "https://erp.example.com", "--db", "prod", "--user", "bot", "--key", "k",
    ];

    #[test]
    fn defaults() {
        let matches = command().try_get_matches_from(CREDENTIALS).unwrap();
        let settings = Settings::from_matches(&matches);

        assert_eq!(settings.sync.backup_path, PathBuf::from("hr_backup.json"));
        assert_eq!(settings.sync.image_dir, PathBuf::from("emp_img"));
        assert_eq!(settings.sync.batch_size, 25);
        assert_eq!(settings.odoo.database, "prod");
        assert_eq!(settings.log_format, LogFormat::Plain);
    }

    #[test]
    fn overrides() {
        let mut args = CREDENTIALS.to_vec();
        args.extend(["--backup", "/srv/hr.json", "--images", "/srv/img", "--batch-size", "10", "--log-format", "json"]);
        let matches = command().try_get_matches_from(args).unwrap();
        let settings = Settings::from_matches(&matches);

        assert_eq!(settings.sync.backup_path, PathBuf::from("/srv/hr.json"));
        assert_eq!(settings.sync.batch_size, 10);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_non_numeric_batch_size() {
        let mut args = CREDENTIALS.to_vec();
        args.extend(["--batch-size", "many"]);
        assert!(command().try_get_matches_from(args).is_err());
    }
}
