//! Shared fixtures for integration tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Directory holding the fixture logs.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Read a fixture log by name.
pub fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {name}: {e}"))
}

/// Parse a JSON file written by the binaries.
pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid JSON in {}: {e}", path.display()))
}

/// A scratch working directory with isolated config and no webhook.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("home")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copy fixture `fixture` to `dest` (relative to the workspace).
    pub fn add_fixture(&self, fixture: &str, dest: &str) -> PathBuf {
        let path = self.path().join(dest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, load_fixture(fixture)).unwrap();
        path
    }

    /// Write arbitrary text to `dest` (relative to the workspace).
    pub fn add_file(&self, dest: &str, content: &str) -> PathBuf {
        let path = self.path().join(dest);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// The batch tool, run from inside the workspace.
    pub fn batch(&self) -> Command {
        self.command(env!("CARGO_BIN_EXE_gaussparse"))
    }

    /// The single-file tool, run from inside the workspace.
    pub fn single(&self) -> Command {
        self.command(env!("CARGO_BIN_EXE_gaussparse-file"))
    }

    fn command(&self, bin: &str) -> Command {
        let home = self.path().join("home");
        let mut cmd = Command::new(bin);
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env_remove("DISCORD_URL");
        cmd
    }
}
