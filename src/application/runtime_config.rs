use std::path::PathBuf;

use crate::cli::{Cli, CliCommand};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: CliCommand,
    pub root: PathBuf,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            root: cli.root,
        }
    }
}
