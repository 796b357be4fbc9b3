use snafu::prelude::*;
use snafu::Snafu;
use tracing::{debug, info, warn};

use crate::application::render;
use crate::application::RuntimeConfig;
use crate::change_detection::FileWatcher;
use crate::cli::CliCommand;
use crate::engine::{Session, SessionError};
use crate::ext::BestEffortPathExt;
use crate::git;
use crate::scheduler::{DebounceScheduler, DEBOUNCE_DELAY};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();

        ensure!(
            git::is_repository(&app_config.root).await,
            NotARepositorySnafu {
                root: app_config.root.best_effort_path_display(),
            }
        );

        let mut session = Session::open(&app_config.root).context(SessionSnafu)?;
        session.load().await.context(SessionSnafu)?;
        debug!("Loaded session with {} changelists", session.tree().len());

        Self::dispatch(&mut session, app_config.command)
            .await
            .context(SessionSnafu)?;

        Ok(())
    }

    async fn dispatch(session: &mut Session, command: CliCommand) -> Result<(), SessionError> {
        match command {
            CliCommand::Init => session.init().await,
            CliCommand::List => {
                session.require_initialized()?;
                render::render_tree(session.tree());
                Ok(())
            }
            CliCommand::Create { name, files } => session.create_changelist(&name, &files).await,
            CliCommand::Rename { old_name, new_name } => {
                session.rename_changelist(&old_name, &new_name).await
            }
            CliCommand::Remove { name } => session.remove_changelist(&name).await,
            CliCommand::Add { changelist, file } => session.add_file(&changelist, &file).await,
            CliCommand::RemoveFile { file } => session.remove_file(&file).await,
            CliCommand::Stage { name } => session.stage_changelist(&name).await,
            CliCommand::StageFile { file } => session.stage_file(&file).await,
            CliCommand::Watch => Self::watch(session).await,
        }
    }

    /// Polls the exclude file and the sidecar for external edits, reloading
    /// and re-listing once per debounced burst. Runs until interrupted.
    async fn watch(session: &mut Session) -> Result<(), SessionError> {
        session.require_initialized()?;

        let (mut scheduler, signal) = DebounceScheduler::new(DEBOUNCE_DELAY);
        let watcher = FileWatcher::new(
            vec![session.exclude_path(), session.sidecar_path()],
            signal,
        );
        compio::runtime::spawn(watcher.run()).detach();

        info!("Watching for external changelist edits");
        render::render_tree(session.tree());

        while let Some(()) = scheduler.next_reload().await {
            Self::reload_cycle(session).await;
        }

        Ok(())
    }

    /// One reload-and-render cycle. A failed reload (a half-written sidecar
    /// from an editor mid-save) is reported once and the current tree is
    /// kept; the next complete write reloads cleanly.
    async fn reload_cycle(session: &mut Session) {
        match session.reload().await {
            Ok(()) => render::render_tree(session.tree()),
            Err(error) => warn!("Reload failed, keeping the current changelists: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[compio::test]
    async fn a_half_written_sidecar_does_not_end_the_watch_cycle() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let mut session = Session::open(dir.path()).unwrap();
        session.init().await.unwrap();
        session
            .create_changelist("Feature", &["src/a.ts".to_string()])
            .await
            .unwrap();

        // An editor saving mid-write leaves truncated JSON behind
        std::fs::write(session.sidecar_path(), b"[{\"id\": \"trunc").unwrap();

        Application::reload_cycle(&mut session).await;

        assert!(session.tree().contains("Feature"));
        assert!(session.tree().members("Feature").unwrap().contains("src/a.ts"));

        // Once the write completes, the next cycle reloads cleanly
        session.persist().await.unwrap();
        session.reload().await.unwrap();
        assert!(session.tree().contains("Feature"));
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("'{}' is not a git repository", root))]
    NotARepositoryError { root: String },
    #[snafu(display("Critical failure encountered during the session"))]
    SessionError { source: SessionError },
}
