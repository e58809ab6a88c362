use thiserror::Error;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::diagnostics::run_diagnostics;
use crate::host::{HostError, HostProbe, SystemHost};
use crate::runner::{Executor, ShellRunner};
use crate::{Command, Response};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Comando desconocido: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ExecuteCommand,
    AnalyzeText,
    GetSystemInfo,
    ArchDiagnostics,
}

impl Action {
    pub fn parse(action: &str) -> Option<Self> {
        match action.to_lowercase().as_str() {
            "execute_command" => Some(Self::ExecuteCommand),
            "analyze_text" => Some(Self::AnalyzeText),
            "get_system_info" => Some(Self::GetSystemInfo),
            "arch_diagnostics" => Some(Self::ArchDiagnostics),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExecuteCommand => "execute_command",
            Self::AnalyzeText => "analyze_text",
            Self::GetSystemInfo => "get_system_info",
            Self::ArchDiagnostics => "arch_diagnostics",
        }
    }
}

pub struct Dispatcher<E = ShellRunner, H = SystemHost> {
    executor: E,
    host: H,
}

impl Dispatcher {
    pub fn system() -> Self {
        Self::new(ShellRunner::new(), SystemHost)
    }
}

impl<E: Executor, H: HostProbe> Dispatcher<E, H> {
    pub fn new(executor: E, host: H) -> Self {
        Self { executor, host }
    }

    /// Never fails: handler errors come back as a failed `Response`.
    pub fn dispatch(&self, command: &Command) -> Response {
        match self.try_dispatch(command) {
            Ok(response) => response,
            Err(e) => {
                warn!(action = %command.action, error = %e, "handler failed");
                Response::failure(e.to_string())
            }
        }
    }

    fn try_dispatch(&self, command: &Command) -> Result<Response, DispatchError> {
        let action = Action::parse(&command.action)
            .ok_or_else(|| DispatchError::UnknownAction(command.action.clone()))?;
        debug!(action = action.as_str(), "dispatching");

        match action {
            Action::ExecuteCommand => Ok(self.executor.run(command.data_or_empty())),
            Action::AnalyzeText => analyze_text(command.data_or_empty()),
            Action::GetSystemInfo => self.system_info(),
            Action::ArchDiagnostics => Ok(run_diagnostics(&self.executor)),
        }
    }

    fn system_info(&self) -> Result<Response, DispatchError> {
        let info = self.host.snapshot()?;
        Ok(Response::ok(serde_json::to_string(&info)?))
    }
}

fn analyze_text(text: &str) -> Result<Response, DispatchError> {
    let analysis = classify(text);
    Ok(Response::ok(serde_json::to_string(&analysis)?))
}
