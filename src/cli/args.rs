//! Command-line argument definitions for the LDUSER converter
//!
//! The converter takes no positional arguments: everything about the run
//! comes from the configuration file. The only behavioral switch is whether
//! the finished file is uploaded.

use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the Symphony LDUSER converter
///
/// Converts a student-information CSV export into a SirsiDynix Symphony
/// LDUSER flat file for the load users report.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "symphony-lduser",
    version,
    about = "Convert student CSV exports into Symphony LDUSER flat files",
    long_about = "Reads the student export named in the configuration file, writes one LDUSER \
                  document per student to the configured flat file, keeps a timestamped copy \
                  in the archive directory, and optionally uploads the result over SFTP for \
                  the Symphony load users report."
)]
pub struct Args {
    /// Upload the generated file over SFTP after writing it
    ///
    /// Uses the [sftp] section of the configuration file. The server's host
    /// key is verified against the configured known hosts file unless
    /// host_key_check = "disabled".
    #[arg(
        short = 's',
        long = "sftp",
        help = "Upload the resulting flat file via SFTP"
    )]
    pub sftp: bool,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ./config/symphony.toml, then ~/.config/symphony-lduser/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Check arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }

    /// Resolve the configuration file to load
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => crate::config::Config::default_config_path()
                .map_err(|e| Error::configuration(format!("{:#}", e))),
        }
    }

    /// Get log level string for the tracing filter
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress spinners and the summary (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["symphony-lduser"]).unwrap();

        assert!(!args.sftp);
        assert_eq!(args.config_file, None);
        assert_eq!(args.get_log_level(), "warn");
        assert!(args.show_progress());
    }

    #[test]
    fn test_sftp_flag() {
        let args = Args::try_parse_from(["symphony-lduser", "--sftp"]).unwrap();
        assert!(args.sftp);

        let args = Args::try_parse_from(["symphony-lduser", "-s"]).unwrap();
        assert!(args.sftp);
    }

    #[test]
    fn test_verbosity_levels() {
        let args = Args::try_parse_from(["symphony-lduser", "-vv"]).unwrap();
        assert_eq!(args.get_log_level(), "debug");

        let args = Args::try_parse_from(["symphony-lduser", "-q"]).unwrap();
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());

        assert!(Args::try_parse_from(["symphony-lduser", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_positional_arguments_rejected() {
        assert!(Args::try_parse_from(["symphony-lduser", "students.csv"]).is_err());
    }

    #[test]
    fn test_validate_missing_config_file() {
        let args = Args {
            config_file: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Default::default()
        };
        assert!(matches!(args.validate(), Err(Error::Configuration { .. })));
        assert_eq!(
            args.config_path().unwrap(),
            PathBuf::from("/definitely/not/here.toml")
        );
    }
}
