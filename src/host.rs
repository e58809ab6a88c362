use std::io;

use nix::unistd::{User, getuid};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub os: String,
    pub machine: String,
    pub user: String,
    pub working_directory: String,
    pub processor_count: usize,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unable to resolve host name")]
    MachineName,

    #[error("unable to resolve current user: {0}")]
    User(String),

    #[error("unable to read working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("unable to count processors: {0}")]
    ProcessorCount(#[source] io::Error),
}

// Every call takes a fresh snapshot, nothing is cached.
pub trait HostProbe {
    fn snapshot(&self) -> Result<HostInfo, HostError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn snapshot(&self) -> Result<HostInfo, HostError> {
        let os = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
        let machine = System::host_name().ok_or(HostError::MachineName)?;
        let working_directory = std::env::current_dir()
            .map_err(HostError::WorkingDirectory)?
            .to_string_lossy()
            .into_owned();
        let processor_count = std::thread::available_parallelism()
            .map_err(HostError::ProcessorCount)?
            .get();

        Ok(HostInfo {
            os,
            machine,
            user: current_user()?,
            working_directory,
            processor_count,
        })
    }
}

fn current_user() -> Result<String, HostError> {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => Ok(user.name),
        // No passwd entry (common in containers), fall back to the login env.
        Ok(None) => std::env::var("USER")
            .map_err(|_| HostError::User(format!("no passwd entry for uid {}", getuid()))),
        Err(errno) => Err(HostError::User(errno.to_string())),
    }
}
