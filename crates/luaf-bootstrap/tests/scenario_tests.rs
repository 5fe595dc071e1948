//! End-to-end attachment scenarios over a simulated process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use luaf_bootstrap::{AttachState, Bootstrap, BootstrapConfig, Platform};
use luaf_errors::AttachError;
use luaf_test_helpers::must;
use parking_lot::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Process {
    exe: PathBuf,
    modules: Vec<PathBuf>,
    core_on_disk: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    load_attempts: usize,
    dialogs: Vec<(String, String)>,
}

/// A process shared by every forwarding stub mapped into it.
#[derive(Debug, Clone)]
struct FakeProcess(Arc<Mutex<Process>>);

impl FakeProcess {
    fn new(exe: &str) -> Self {
        Self(Arc::new(Mutex::new(Process {
            exe: PathBuf::from(exe),
            modules: vec![PathBuf::from(exe), PathBuf::from("/sys/kernel32.dll")],
            ..Process::default()
        })))
    }

    fn with_core_in(self, dir: &str) -> Self {
        self.state().core_on_disk = Some(PathBuf::from(dir));
        self
    }

    fn state(&self) -> MutexGuard<'_, Process> {
        self.0.lock()
    }

    fn stub(&self) -> Bootstrap<FakeProcess> {
        must(Bootstrap::new(BootstrapConfig::default(), self.clone()))
    }
}

impl Platform for FakeProcess {
    fn current_exe(&self) -> Result<PathBuf, AttachError> {
        Ok(self.state().exe.clone())
    }

    fn loaded_modules(&self) -> Result<Vec<PathBuf>, AttachError> {
        Ok(self.state().modules.clone())
    }

    fn resolve_dir(&self, dir: &Path) -> Result<PathBuf, AttachError> {
        Ok(Path::new("/games/mhw").join(dir))
    }

    fn add_search_dir(&self, dir: &Path) -> Result<(), AttachError> {
        self.state().search_dirs.push(dir.to_path_buf());
        Ok(())
    }

    fn load_module(&self, name: &str) -> Result<(), AttachError> {
        let mut state = self.state();
        state.load_attempts += 1;
        let found = state
            .core_on_disk
            .clone()
            .filter(|dir| state.search_dirs.contains(dir));
        match found {
            Some(dir) => {
                state.modules.push(dir.join(name));
                Ok(())
            }
            None => Err(AttachError::core_load(name, "module not found")),
        }
    }

    fn show_error(&self, title: &str, message: &str) {
        self.state()
            .dialogs
            .push((title.to_string(), message.to_string()));
    }
}

const HOST_EXE: &str = "/games/mhw/MonsterHunterWorld.exe";
const BIN: &str = "/games/mhw/lua_framework/bin";

#[test]
fn two_stubs_in_one_process_load_the_core_once() {
    let process = FakeProcess::new(HOST_EXE).with_core_in(BIN);

    assert_eq!(process.stub().attach(), AttachState::CoreLoaded);
    assert_eq!(process.stub().attach(), AttachState::AlreadyAttached);

    let state = process.state();
    assert_eq!(state.load_attempts, 1);
    assert_eq!(state.search_dirs, vec![PathBuf::from(BIN)]);
    assert!(state.dialogs.is_empty());
}

#[test]
fn foreign_process_is_left_untouched() {
    let process = FakeProcess::new("/usr/bin/other_game.exe").with_core_in(BIN);

    assert_eq!(process.stub().attach(), AttachState::HostMismatch);

    let state = process.state();
    assert_eq!(state.load_attempts, 0);
    assert!(state.search_dirs.is_empty());
    assert!(state.dialogs.is_empty());
}

#[test]
fn missing_core_reports_once_per_attach() {
    let process = FakeProcess::new(HOST_EXE);

    assert_eq!(process.stub().attach(), AttachState::Failed);

    let state = process.state();
    assert_eq!(state.load_attempts, 1);
    assert_eq!(
        state.dialogs,
        vec![(
            "LuaFramework".to_string(),
            "Failed to load lua_framework.dll".to_string()
        )]
    );
}

#[test]
fn core_mapped_by_the_host_is_respected() {
    let process = FakeProcess::new(HOST_EXE).with_core_in(BIN);
    process
        .state()
        .modules
        .push(PathBuf::from("/games/mhw/Lua_Framework.dll"));

    assert_eq!(process.stub().attach(), AttachState::AlreadyAttached);
    assert_eq!(process.state().load_attempts, 0);
}

#[test]
fn custom_configuration_is_honored() {
    let process = FakeProcess::new("/opt/sandbox/game.bin").with_core_in("/games/mhw/plugins");
    let config = BootstrapConfig {
        host_executable: "GAME.BIN".to_string(),
        core_module: "core.so".to_string(),
        search_dir: PathBuf::from("plugins"),
        dialog_title: "Sandbox".to_string(),
    };
    let stub = must(Bootstrap::new(config, process.clone()));

    assert_eq!(stub.attach(), AttachState::CoreLoaded);
    assert!(
        process
            .state()
            .modules
            .contains(&PathBuf::from("/games/mhw/plugins/core.so"))
    );
}
