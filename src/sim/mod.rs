//! The simulated server environment
//!
//! Holds everything a command can observe or change: the filesystem,
//! the process table, Docker containers, Kubernetes pods and
//! deployments, and named resource gauges. Queries never mutate;
//! mutation happens only through the named apply operations (or a
//! [`StateChange`] applied by the level engine), which keeps replays
//! deterministic.

pub mod baseline;
pub mod fs;

pub use fs::{FsNode, FsTree};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of a simulated OS process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcState {
    Running,
    Stopped,
    Killed,
}

impl ProcState {
    /// The STAT column letter `ps` prints.
    pub fn stat_char(&self) -> char {
        match self {
            ProcState::Running => 'S',
            ProcState::Stopped => 'T',
            ProcState::Killed => 'Z',
        }
    }
}

impl std::fmt::Display for ProcState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcState::Running => write!(f, "running"),
            ProcState::Stopped => write!(f, "stopped"),
            ProcState::Killed => write!(f, "killed"),
        }
    }
}

/// A simulated OS process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    pub state: ProcState,
    pub command: String,
    pub cpu: f32,
    pub mem: f32,
}

/// Status of a Docker container. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerStatus {
    Running,
    Exited,
    Restarting,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Running => write!(f, "Up 2 days"),
            ContainerStatus::Exited => write!(f, "Exited (1) 2 hours ago"),
            ContainerStatus::Restarting => write!(f, "Restarting (1) 5 seconds ago"),
        }
    }
}

/// A simulated Docker container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
    pub ports: String,
    pub logs: Vec<String>,
}

/// Phase of a Kubernetes pod. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Running,
    Pending,
    CrashLoopBackOff,
    Failed,
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodPhase::Running => write!(f, "Running"),
            PodPhase::Pending => write!(f, "Pending"),
            PodPhase::CrashLoopBackOff => write!(f, "CrashLoopBackOff"),
            PodPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// A simulated Kubernetes pod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub namespace: String,
    pub phase: PodPhase,
    pub deployment: String,
    pub restarts: u32,
    pub logs: Vec<String>,
}

/// A simulated Kubernetes deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub replicas: u32,
}

/// A named mutation a level step applies to the environment on success.
///
/// These are the same operations the mutating shell commands use; the
/// level engine just invokes them from data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    ProcessState { pid: u32, state: ProcState },
    ContainerStatus { id: String, status: ContainerStatus },
    PodPhase { name: String, phase: PodPhase },
    ScaleDeployment { name: String, replicas: u32 },
    CreateDir { path: String },
    WriteFile { path: String, content: String },
    DeletePath { path: String },
    SetMetric { name: String, value: u32 },
    AppendContainerLog { id: String, line: String },
    AppendPodLog { name: String, line: String },
}

/// The whole simulated world. One per session; queries are read-only,
/// apply operations are the only mutation paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimEnv {
    pub fs: FsTree,
    processes: BTreeMap<u32, Process>,
    containers: BTreeMap<String, Container>,
    pods: BTreeMap<String, Pod>,
    deployments: BTreeMap<String, Deployment>,
    metrics: BTreeMap<String, u32>,
}

impl SimEnv {
    /// An empty world. Most callers want [`SimEnv::baseline`].
    pub fn empty() -> Self {
        Self {
            fs: FsTree::new(),
            processes: BTreeMap::new(),
            containers: BTreeMap::new(),
            pods: BTreeMap::new(),
            deployments: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// The default troubled server every session starts from.
    pub fn baseline() -> Self {
        baseline::build()
    }

    // --- Queries ---

    pub fn processes(&self) -> impl Iterator<Item = (&u32, &Process)> {
        self.processes.iter()
    }

    pub fn process(&self, pid: u32) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// First process whose name matches, for `systemctl <verb> <unit>`.
    pub fn process_by_name(&self, name: &str) -> Option<(u32, &Process)> {
        self.processes
            .iter()
            .find(|(_, p)| p.name == name)
            .map(|(pid, p)| (*pid, p))
    }

    pub fn containers(&self) -> impl Iterator<Item = (&String, &Container)> {
        self.containers.iter()
    }

    /// Resolve a container by exact name or id prefix, like the Docker CLI.
    pub fn container(&self, name_or_id: &str) -> Option<(&String, &Container)> {
        self.containers
            .iter()
            .find(|(id, c)| c.name == name_or_id || id.starts_with(name_or_id))
    }

    pub fn pods(&self) -> impl Iterator<Item = (&String, &Pod)> {
        self.pods.iter()
    }

    pub fn pod(&self, name: &str) -> Option<&Pod> {
        self.pods.get(name)
    }

    pub fn deployments(&self) -> impl Iterator<Item = (&String, &Deployment)> {
        self.deployments.iter()
    }

    pub fn deployment(&self, name: &str) -> Option<&Deployment> {
        self.deployments.get(name)
    }

    pub fn metric(&self, name: &str) -> Option<u32> {
        self.metrics.get(name).copied()
    }

    // --- Apply operations ---

    pub fn add_process(&mut self, pid: u32, process: Process) {
        self.processes.insert(pid, process);
    }

    pub fn set_process_state(&mut self, pid: u32, state: ProcState) -> bool {
        match self.processes.get_mut(&pid) {
            Some(p) => {
                p.state = state;
                true
            }
            None => false,
        }
    }

    pub fn add_container(&mut self, id: &str, container: Container) {
        self.containers.insert(id.to_string(), container);
    }

    /// Set a container's status by exact name or id prefix.
    pub fn set_container_status(&mut self, name_or_id: &str, status: ContainerStatus) -> bool {
        let id = match self.container(name_or_id) {
            Some((id, _)) => id.clone(),
            None => return false,
        };
        self.containers.get_mut(&id).map(|c| c.status = status).is_some()
    }

    pub fn append_container_log(&mut self, name_or_id: &str, line: &str) -> bool {
        let id = match self.container(name_or_id) {
            Some((id, _)) => id.clone(),
            None => return false,
        };
        match self.containers.get_mut(&id) {
            Some(c) => {
                c.logs.push(line.to_string());
                true
            }
            None => false,
        }
    }

    pub fn add_pod(&mut self, name: &str, pod: Pod) {
        self.pods.insert(name.to_string(), pod);
    }

    pub fn set_pod_phase(&mut self, name: &str, phase: PodPhase) -> bool {
        match self.pods.get_mut(name) {
            Some(p) => {
                p.phase = phase;
                true
            }
            None => false,
        }
    }

    pub fn append_pod_log(&mut self, name: &str, line: &str) -> bool {
        match self.pods.get_mut(name) {
            Some(p) => {
                p.logs.push(line.to_string());
                true
            }
            None => false,
        }
    }

    pub fn delete_pod(&mut self, name: &str) -> bool {
        self.pods.remove(name).is_some()
    }

    pub fn add_deployment(&mut self, name: &str, replicas: u32) {
        self.deployments.insert(name.to_string(), Deployment { replicas });
    }

    pub fn scale_deployment(&mut self, name: &str, replicas: u32) -> bool {
        match self.deployments.get_mut(name) {
            Some(d) => {
                d.replicas = replicas;
                true
            }
            None => false,
        }
    }

    pub fn set_metric(&mut self, name: &str, value: u32) {
        self.metrics.insert(name.to_string(), value);
    }

    /// Apply a level-authored state change. Misses are ignored: a level
    /// that references a vanished target must not crash the session.
    pub fn apply(&mut self, change: &StateChange) {
        match change {
            StateChange::ProcessState { pid, state } => {
                self.set_process_state(*pid, *state);
            }
            StateChange::ContainerStatus { id, status } => {
                self.set_container_status(id, *status);
            }
            StateChange::PodPhase { name, phase } => {
                self.set_pod_phase(name, *phase);
            }
            StateChange::ScaleDeployment { name, replicas } => {
                self.scale_deployment(name, *replicas);
            }
            StateChange::CreateDir { path } => {
                self.fs.mkdir(path);
            }
            StateChange::WriteFile { path, content } => {
                self.fs.insert(path, FsNode::file(content));
            }
            StateChange::DeletePath { path } => {
                self.fs.remove(path);
            }
            StateChange::SetMetric { name, value } => {
                self.set_metric(name, *value);
            }
            StateChange::AppendContainerLog { id, line } => {
                self.append_container_log(id, line);
            }
            StateChange::AppendPodLog { name, line } => {
                self.append_pod_log(name, line);
            }
        }
    }
}
