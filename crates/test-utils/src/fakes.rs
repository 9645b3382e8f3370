//! In-memory stand-ins for the compiler and the process supervisor.
//!
//! Both fakes share their state through an `Arc<Mutex<..>>`; clone the
//! fake before handing it to an `Orchestrator` and keep the clone to
//! inspect what happened.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotbuild::errors::{HotbuildError, Result};
use hotbuild::exec::{BoxFuture, BuildOutput, BuildRequest, Compiler, ProcessSupervisor};

/// Scripted result of one fake compile.
#[derive(Debug, Clone)]
pub enum FakeBuild {
    Succeed,
    Fail(i32),
    /// The compiler could not be invoked at all.
    Unavailable,
}

#[derive(Debug, Default)]
struct CompilerState {
    script: VecDeque<FakeBuild>,
    requests: Vec<BuildRequest>,
}

/// Compiler that records requests and replays a script. Once the script is
/// exhausted every build succeeds.
#[derive(Debug, Clone, Default)]
pub struct FakeCompiler {
    state: Arc<Mutex<CompilerState>>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, build: FakeBuild) -> &Self {
        self.state.lock().unwrap().script.push_back(build);
        self
    }

    pub fn requests(&self) -> Vec<BuildRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn builds(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }
}

impl Compiler for FakeCompiler {
    fn build(&self, request: BuildRequest) -> BoxFuture<'_, Result<BuildOutput>> {
        let next = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            state.script.pop_front().unwrap_or(FakeBuild::Succeed)
        };

        Box::pin(async move {
            match next {
                FakeBuild::Succeed => Ok(BuildOutput::succeeded("")),
                FakeBuild::Fail(code) => Ok(BuildOutput::failed(code, "main.go:3:1: syntax error")),
                FakeBuild::Unavailable => Err(HotbuildError::Process(
                    "compiler not found".to_string(),
                )),
            }
        })
    }
}

#[derive(Debug)]
struct SupervisorState {
    next_pid: u32,
    alive: BTreeSet<u32>,
    started: Vec<(PathBuf, String, u32)>,
    terminated: Vec<u32>,
    signalled: Vec<(u32, Duration)>,
    fail_start: bool,
    fail_terminate: bool,
    ignore_signals: bool,
}

impl Default for SupervisorState {
    fn default() -> Self {
        Self {
            next_pid: 1000,
            alive: BTreeSet::new(),
            started: Vec::new(),
            terminated: Vec::new(),
            signalled: Vec::new(),
            fail_start: false,
            fail_terminate: false,
            ignore_signals: false,
        }
    }
}

/// Supervisor that hands out increasing fake pids and tracks which are alive.
#[derive(Debug, Clone, Default)]
pub struct FakeSupervisor {
    state: Arc<Mutex<SupervisorState>>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `start` fail.
    pub fn fail_start(&self, fail: bool) {
        self.state.lock().unwrap().fail_start = fail;
    }

    /// Make every following `terminate` fail (the process stays alive).
    pub fn fail_terminate(&self, fail: bool) {
        self.state.lock().unwrap().fail_terminate = fail;
    }

    /// Make processes ignore the stop signal, so `stop` falls back to a kill.
    pub fn ignore_signals(&self, ignore: bool) {
        self.state.lock().unwrap().ignore_signals = ignore;
    }

    /// Simulate the program exiting on its own.
    pub fn exit(&self, pid: u32) {
        self.state.lock().unwrap().alive.remove(&pid);
    }

    pub fn alive(&self) -> Vec<u32> {
        self.state.lock().unwrap().alive.iter().copied().collect()
    }

    pub fn started(&self) -> Vec<(PathBuf, String, u32)> {
        self.state.lock().unwrap().started.clone()
    }

    /// Pids that were killed, by `terminate` or by a `stop` fallback.
    pub fn terminated(&self) -> Vec<u32> {
        self.state.lock().unwrap().terminated.clone()
    }

    /// Pids asked to stop, with the grace period they were given.
    pub fn signalled(&self) -> Vec<(u32, Duration)> {
        self.state.lock().unwrap().signalled.clone()
    }
}

impl ProcessSupervisor for FakeSupervisor {
    fn start(&mut self, program: &Path, args: &str) -> Result<u32> {
        let mut state = self.state.lock().unwrap();
        if state.fail_start {
            return Err(HotbuildError::Process(format!(
                "launching {}: permission denied",
                program.display()
            )));
        }
        let pid = state.next_pid;
        state.next_pid += 1;
        state.alive.insert(pid);
        state
            .started
            .push((program.to_path_buf(), args.to_string(), pid));
        Ok(pid)
    }

    fn terminate(&mut self, pid: u32) -> BoxFuture<'_, Result<()>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            if state.fail_terminate {
                Err(HotbuildError::Process(format!("kill {pid}: operation not permitted")))
            } else if state.alive.remove(&pid) {
                state.terminated.push(pid);
                Ok(())
            } else {
                Err(HotbuildError::Process(format!("no supervised process with pid {pid}")))
            }
        };
        Box::pin(async move { result })
    }

    fn stop(&mut self, pid: u32, grace: Duration) -> BoxFuture<'_, Result<bool>> {
        let result = {
            let mut state = self.state.lock().unwrap();
            if !state.alive.remove(&pid) {
                Err(HotbuildError::Process(format!("no supervised process with pid {pid}")))
            } else {
                state.signalled.push((pid, grace));
                if state.ignore_signals {
                    state.terminated.push(pid);
                    Ok(false)
                } else {
                    Ok(true)
                }
            }
        };
        Box::pin(async move { result })
    }

    fn is_running(&mut self, pid: u32) -> bool {
        self.state.lock().unwrap().alive.contains(&pid)
    }
}
