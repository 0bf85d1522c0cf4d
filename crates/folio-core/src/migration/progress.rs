use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{FolioError, Result};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationStage {
    Preparing,
    BackingUp,
    Migrating,
    Validating,
    Completed,
    Error,
}

impl MigrationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStage::Preparing => "preparing",
            MigrationStage::BackingUp => "backing-up",
            MigrationStage::Migrating => "migrating",
            MigrationStage::Validating => "validating",
            MigrationStage::Completed => "completed",
            MigrationStage::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationStage::Completed | MigrationStage::Error)
    }

    pub fn can_transition_to(&self, next: MigrationStage) -> bool {
        use MigrationStage::*;
        match (self, next) {
            (from, Error) => !from.is_terminal(),
            (Preparing, BackingUp | Migrating) => true,
            (BackingUp, Migrating) => true,
            (Migrating, Validating) => true,
            (Validating, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress event sent to the caller at each pipeline step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProgress {
    pub stage: MigrationStage,
    pub processed: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cooperative cancellation, polled between records
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`FolioError::Interrupted`] once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FolioError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Tracks the current stage and forwards every change to the caller
pub(crate) struct ProgressReporter<'p> {
    callback: &'p mut dyn FnMut(&MigrationProgress),
    state: MigrationProgress,
}

impl<'p> ProgressReporter<'p> {
    pub(crate) fn new(callback: &'p mut dyn FnMut(&MigrationProgress)) -> Self {
        let mut reporter = Self {
            callback,
            state: MigrationProgress {
                stage: MigrationStage::Preparing,
                processed: 0,
                total: 0,
                current_item: None,
                error: None,
            },
        };
        tracing::info!(stage = %MigrationStage::Preparing, "migration stage");
        reporter.emit();
        reporter
    }

    pub(crate) fn stage(&self) -> MigrationStage {
        self.state.stage
    }

    pub(crate) fn enter(&mut self, stage: MigrationStage) -> Result<()> {
        if !self.state.stage.can_transition_to(stage) {
            return Err(FolioError::Other(format!(
                "illegal migration stage transition: {} -> {}",
                self.state.stage, stage
            )));
        }
        tracing::info!(%stage, "migration stage");
        self.state.stage = stage;
        self.state.current_item = None;
        self.emit();
        Ok(())
    }

    pub(crate) fn set_total(&mut self, total: usize) {
        self.state.total = total;
        self.state.processed = 0;
    }

    pub(crate) fn item(&mut self, processed: usize, current_item: Option<&str>) {
        self.state.processed = processed;
        self.state.current_item = current_item.map(str::to_string);
        self.emit();
    }

    /// Move to the error stage; a terminal stage is left alone
    pub(crate) fn fail(&mut self, error: &FolioError) {
        if self.state.stage.is_terminal() {
            return;
        }
        self.state.stage = MigrationStage::Error;
        self.state.error = Some(error.to_string());
        self.emit();
    }

    fn emit(&mut self) {
        (self.callback)(&self.state);
    }
}
