//! Command-line options for the `pid1` binary.
//!
//! `pid1 [OPTIONS] <COMMAND> [ARGS]...`; everything after the options is
//! the primary command's argv, hyphens and all.

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::OrphanPolicy;

/// Minimal init for containers: runs COMMAND under a valid init process.
#[derive(Parser, Debug)]
#[command(name = "pid1", disable_version_flag = true)]
pub struct Options {
    /// Policy for descendants that outlive the main process
    #[arg(long = "orphan-policy", value_enum, default_value_t = OrphanPolicy::Adopt)]
    pub orphan_policy: OrphanPolicy,

    /// Log supervision events to stderr
    #[arg(short, long)]
    pub debug: bool,

    /// The command to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Parses the process arguments, exiting directly on help (0) or on any
/// option error (1).
pub fn parse() -> Options {
    match Options::try_parse() {
        Ok(opts) => opts,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{e}");
            std::process::exit(0);
        }
        Err(e) => {
            eprint!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_adopt() {
        let opts = Options::try_parse_from(["pid1", "sleep", "10"]).unwrap();
        assert_eq!(opts.orphan_policy, OrphanPolicy::Adopt);
        assert!(!opts.debug);
        assert_eq!(opts.command, vec!["sleep", "10"]);
    }

    #[test]
    fn accepts_kill_policy() {
        let opts =
            Options::try_parse_from(["pid1", "--orphan-policy", "kill", "sh", "-c", "exit 0"])
                .unwrap();
        assert_eq!(opts.orphan_policy, OrphanPolicy::Kill);
        assert_eq!(opts.command, vec!["sh", "-c", "exit 0"]);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Options::try_parse_from(["pid1", "--orphan-policy", "ignore", "true"]).is_err());
    }

    #[test]
    fn command_may_carry_flags() {
        let opts = Options::try_parse_from(["pid1", "env", "-i", "true"]).unwrap();
        assert_eq!(opts.command, vec!["env", "-i", "true"]);
    }

    #[test]
    fn empty_command_parses_as_empty() {
        // Rejection (exit 1, "no command provided") happens in the binary so
        // library callers get a typed error instead of a process exit.
        let opts = Options::try_parse_from(["pid1"]).unwrap();
        assert!(opts.command.is_empty());
    }
}
