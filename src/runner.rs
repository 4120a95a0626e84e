use crate::config::Config;
use crate::process;
use crate::registry::ToolSpec;
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const MAX_ERROR_DETAIL_CHARS: usize = 2_000;

/// Lifecycle of a single tool's update. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Pending,
    Checking,
    Updating,
    Done,
    Failed,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Done | Status::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The update command ran and exited non-zero.
    UpdateFailed,
    /// The update command outlived its deadline and was killed.
    TimedOut,
    /// The update command could not be spawned at all.
    NotInvocable,
}

#[derive(Debug, Clone)]
pub struct UpdateFailure {
    pub kind: FailureKind,
    pub detail: String,
}

/// Per-tool run record. Written only by that tool's own task; the renderer
/// and the final summary observe snapshots through a watch channel.
#[derive(Debug, Clone)]
pub struct ToolRunState {
    pub name: String,
    pub status: Status,
    pub version_before: Option<String>,
    pub version_after: Option<String>,
    pub failure: Option<UpdateFailure>,
}

impl ToolRunState {
    fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Pending,
            version_before: None,
            version_after: None,
            failure: None,
        }
    }

    fn fail(&mut self, kind: FailureKind, detail: String) {
        self.status = Status::Failed;
        self.failure = Some(UpdateFailure {
            kind,
            detail: truncate_detail(detail),
        });
    }
}

/// A running update fan-out: one spawned task per tool.
pub struct UpdateHandle {
    names: Vec<String>,
    tasks: Vec<JoinHandle<ToolRunState>>,
    receivers: Vec<watch::Receiver<ToolRunState>>,
}

impl UpdateHandle {
    /// Read-only snapshot receivers, in input order, for the renderer.
    pub fn receivers(&self) -> Vec<watch::Receiver<ToolRunState>> {
        self.receivers.clone()
    }

    /// Wait for every task and return the terminal states in input order.
    /// Individual failures are recorded per tool; this never fails as a whole.
    pub async fn join(self) -> Vec<ToolRunState> {
        let results = join_all(self.tasks).await;
        self.names
            .into_iter()
            .zip(results)
            .map(|(name, result)| match result {
                Ok(state) => state,
                Err(_) => {
                    let mut state = ToolRunState::pending(&name);
                    state.fail(FailureKind::UpdateFailed, "update task panicked".to_string());
                    state
                }
            })
            .collect()
    }
}

/// Launch one concurrent update task per spec.
pub fn start(specs: Vec<ToolSpec>, config: &Config) -> UpdateHandle {
    let mut names = Vec::with_capacity(specs.len());
    let mut tasks = Vec::with_capacity(specs.len());
    let mut receivers = Vec::with_capacity(specs.len());

    for spec in specs {
        let (tx, rx) = watch::channel(ToolRunState::pending(&spec.name));
        names.push(spec.name.clone());
        receivers.push(rx);
        tasks.push(tokio::spawn(update_tool(spec, config.clone(), tx)));
    }

    UpdateHandle {
        names,
        tasks,
        receivers,
    }
}

/// Run every update to completion and return the terminal states.
pub async fn run(specs: Vec<ToolSpec>, config: &Config) -> Vec<ToolRunState> {
    start(specs, config).join().await
}

async fn update_tool(
    spec: ToolSpec,
    config: Config,
    tx: watch::Sender<ToolRunState>,
) -> ToolRunState {
    let mut state = ToolRunState::pending(&spec.name);

    // A failed version probe downgrades to "unknown"; it never blocks the update.
    state.status = Status::Checking;
    tx.send_replace(state.clone());
    state.version_before = query_version(&spec, &config).await;

    state.status = Status::Updating;
    tx.send_replace(state.clone());

    match process::run(
        &spec.update_command,
        spec.working_dir.as_deref(),
        config.update_timeout,
    )
    .await
    {
        Ok(output) if output.success() => {
            state.version_after = match query_version(&spec, &config).await {
                Some(version) => Some(version),
                None => state.version_before.clone(),
            };
            state.status = Status::Done;
        }
        Ok(output) => {
            let mut detail = output.combined();
            if detail.is_empty() {
                detail = output.status.to_string();
            }
            state.fail(FailureKind::UpdateFailed, detail);
        }
        Err(err) => {
            let kind = if err.is_timeout() {
                FailureKind::TimedOut
            } else if err.is_not_found() {
                FailureKind::NotInvocable
            } else {
                FailureKind::UpdateFailed
            };
            state.fail(kind, err.to_string());
        }
    }

    tx.send_replace(state.clone());
    state
}

async fn query_version(spec: &ToolSpec, config: &Config) -> Option<String> {
    match process::run(
        &spec.version_command,
        spec.working_dir.as_deref(),
        config.version_timeout,
    )
    .await
    {
        Ok(output) if output.success() => {
            let version = output.stdout.trim().to_string();
            (!version.is_empty()).then_some(version)
        }
        _ => None,
    }
}

fn truncate_detail(detail: String) -> String {
    if detail.chars().count() <= MAX_ERROR_DETAIL_CHARS {
        return detail;
    }
    let truncated: String = detail.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    format!("{truncated}… (truncated)")
}
