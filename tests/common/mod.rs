#![allow(dead_code, unused_imports)]

pub use hotbuild_test_utils::builders;
pub use hotbuild_test_utils::fakes;
pub use hotbuild_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use hotbuild::engine::{BuildTarget, Orchestrator};
use hotbuild::fs::mock::MockFileSystem;
use hotbuild::fs::{PlatformFileOps, UnixFileOps};

use fakes::{FakeCompiler, FakeSupervisor};

pub struct Harness {
    pub orchestrator: Orchestrator<FakeCompiler, FakeSupervisor>,
    pub compiler: FakeCompiler,
    pub supervisor: FakeSupervisor,
    pub fs: MockFileSystem,
}

/// Orchestrator over fakes building `./main.go` into `./main`.
pub fn harness() -> Harness {
    harness_on(Box::new(UnixFileOps))
}

pub fn harness_on(platform: Box<dyn PlatformFileOps>) -> Harness {
    let compiler = FakeCompiler::new();
    let supervisor = FakeSupervisor::new();
    let fs = MockFileSystem::new();
    fs.add_file("./main.go", "package main");

    let mut target = BuildTarget::new("./main.go");
    target.run_args = "server -p 8080".to_string();

    let orchestrator = Orchestrator::new(
        target,
        compiler.clone(),
        supervisor.clone(),
        platform,
        Arc::new(fs.clone()),
    );
    Harness {
        orchestrator,
        compiler,
        supervisor,
        fs,
    }
}
