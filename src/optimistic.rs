//! Optimistic flag toggling with rollback.
//!
//! Front-ends flip a clinic's outreach flags instantly and persist in the
//! background. This module models each toggle as an invertible command:
//! apply the command to the local view, dispatch it to a sink, and on sink
//! failure apply the inverse so the view converges back to the persisted
//! state. Commands for different (clinic, channel) pairs are independent,
//! so one failed toggle never disturbs another.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::handlers::clinics::ProspectChannel;
use crate::errors::Error;
use crate::types::ClinicId;

/// A single flag mutation. Inverting it yields the command that undoes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCommand {
    pub clinic_id: ClinicId,
    pub channel: ProspectChannel,
    pub value: bool,
}

impl FlagCommand {
    pub fn inverse(self) -> Self {
        Self {
            value: !self.value,
            ..self
        }
    }
}

/// Destination a flag command is persisted to, typically the clinics
/// repository or a remote API.
#[async_trait::async_trait]
pub trait FlagSink: Send + Sync {
    async fn persist(&self, command: FlagCommand) -> Result<(), Error>;
}

/// Local view of outreach flags, updated optimistically.
pub struct OptimisticFlags<S> {
    state: Mutex<HashMap<(ClinicId, ProspectChannel), bool>>,
    sink: S,
}

impl<S: FlagSink> OptimisticFlags<S> {
    pub fn new(sink: S) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            sink,
        }
    }

    /// Seed the local view with a clinic's persisted flag value.
    pub fn load(&self, clinic_id: ClinicId, channel: ProspectChannel, value: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.insert((clinic_id, channel), value);
    }

    /// Current local value of a flag, if known.
    pub fn get(&self, clinic_id: ClinicId, channel: ProspectChannel) -> Option<bool> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.get(&(clinic_id, channel)).copied()
    }

    fn apply(&self, command: FlagCommand) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.insert((command.clinic_id, command.channel), command.value);
    }

    /// Apply a toggle locally, then persist it. If persistence fails the
    /// inverse command is applied and the error is returned to the caller.
    pub async fn set(&self, command: FlagCommand) -> Result<(), Error> {
        self.apply(command);
        match self.sink.persist(command).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.apply(command.inverse());
                Err(e)
            }
        }
    }
}
