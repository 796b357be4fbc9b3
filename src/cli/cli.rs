use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The root directory of the git repository
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Set up the changelist stores in this repository
    Init,
    /// Print every changelist and its files
    List,
    /// Create a changelist, optionally with initial files
    Create {
        name: String,
        files: Vec<String>,
    },
    /// Rename a changelist, keeping its identity
    Rename {
        old_name: String,
        new_name: String,
    },
    /// Delete a changelist and release its files
    Remove { name: String },
    /// Add a file to a changelist
    Add { changelist: String, file: String },
    /// Take a file out of its changelist
    RemoveFile { file: String },
    /// Stage every file of a changelist and empty it
    Stage { name: String },
    /// Stage a single file and take it out of its changelist
    StageFile { file: String },
    /// Reload and re-list on external edits until interrupted
    Watch,
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn subcommands_parse_with_defaults() {
        let cli = Cli::parse_from(["git-changelists", "add", "Feature", "src/a.ts"]);

        assert!(matches!(
            cli.command,
            CliCommand::Add { changelist, file } if changelist == "Feature" && file == "src/a.ts"
        ));
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn create_accepts_initial_files() {
        let cli = Cli::parse_from(["git-changelists", "create", "Feature", "a.ts", "b.ts"]);

        assert!(matches!(
            cli.command,
            CliCommand::Create { name, files } if name == "Feature" && files == ["a.ts", "b.ts"]
        ));
    }

    #[test]
    fn global_flags_apply_before_the_subcommand() {
        let cli = Cli::parse_from(["git-changelists", "-l", "debug", "-r", "/tmp/repo", "list"]);

        assert!(matches!(cli.command, CliCommand::List));
        assert_eq!(cli.root, PathBuf::from("/tmp/repo"));
    }
}
