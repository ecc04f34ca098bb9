//! Shared test doubles for setup-slv crates.
//!
//! Enabled with the `test-utils` feature.

use crate::host::ActionsHost;
use crate::process::{ToolOutput, ToolRunner};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// `add_path`
    AddPath(PathBuf),
    /// `export_variable`
    Export(String, String),
    /// `set_secret`
    Mask(String),
    /// `save_state`
    SaveState(String, String),
    /// `set_failed`
    Failed(String),
}

/// [`ActionsHost`] that records every command in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
    state: HashMap<String, String>,
}

impl RecordingHost {
    /// Create an empty recording host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that answers `get_state` from `state`.
    #[must_use]
    pub fn with_state(state: &[(&str, &str)]) -> Self {
        Self {
            events: Mutex::default(),
            state: state
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// All recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Exported `(name, value)` pairs, in order.
    #[must_use]
    pub fn exports(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Export(name, value) => Some((name, value)),
                _ => None,
            })
            .collect()
    }

    /// Masked values, in order.
    #[must_use]
    pub fn masks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Mask(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ActionsHost for RecordingHost {
    fn add_path(&self, dir: &Path) -> Result<()> {
        self.push(HostEvent::AddPath(dir.to_path_buf()));
        Ok(())
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<()> {
        self.push(HostEvent::Export(name.to_string(), value.to_string()));
        Ok(())
    }

    fn set_secret(&self, value: &str) {
        self.push(HostEvent::Mask(value.to_string()));
    }

    fn save_state(&self, name: &str, value: &str) -> Result<()> {
        self.push(HostEvent::SaveState(name.to_string(), value.to_string()));
        Ok(())
    }

    fn get_state(&self, name: &str) -> Option<String> {
        self.state.get(name).cloned()
    }

    fn set_failed(&self, message: &str) {
        self.push(HostEvent::Failed(message.to_string()));
    }
}

/// A recorded tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Arguments passed to the tool
    pub args: Vec<String>,
    /// Environment variables passed to the tool
    pub env: Vec<(String, String)>,
}

/// [`ToolRunner`] that replays queued outputs and records invocations.
///
/// `None` entries in the queue behave like a tool missing from the path.
/// Once the queue is empty every call reports the tool as missing.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outputs: Mutex<VecDeque<Option<ToolOutput>>>,
    invocations: Mutex<Vec<Invocation>>,
    prepended: Mutex<Vec<PathBuf>>,
}

impl ScriptedRunner {
    /// Runner that replays `outputs` in order.
    #[must_use]
    pub fn new(outputs: impl IntoIterator<Item = Option<ToolOutput>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Invocations seen so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().map(|i| i.clone()).unwrap_or_default()
    }

    /// Directories passed to `prepend_path`, most recent first.
    #[must_use]
    pub fn prepended(&self) -> Vec<PathBuf> {
        self.prepended.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    fn program(&self) -> &str {
        "slv"
    }

    async fn run(&self, args: &[&str], env: &[(&str, &str)]) -> Result<ToolOutput> {
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push(Invocation {
                args: args.iter().map(|a| (*a).to_string()).collect(),
                env: env
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            });
        }
        let next = self
            .outputs
            .lock()
            .ok()
            .and_then(|mut outputs| outputs.pop_front())
            .flatten();
        next.ok_or_else(|| Error::ToolNotFound {
            program: "slv".to_string(),
        })
    }

    fn prepend_path(&self, dir: &Path) {
        if let Ok(mut prepended) = self.prepended.lock() {
            prepended.insert(0, dir.to_path_buf());
        }
    }
}
