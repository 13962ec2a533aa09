//! End-to-end tests driving the `tilesmith` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const PATTERN: &str = r"^2.5/.+/(?P<release_name>[a-z-_]+)-(?P<release_version>[0-9\.]+(-\w+(\.[0-9]+)?)?)-(?P<stemcell_os>[a-z-_]+)-(?P<stemcell_version>[\d\.]+)\.tgz$";

const LOCK: &str = r#"
[stemcell]
os = "ubuntu-xenial"
version = "190.0.0"

[[releases]]
name = "bpm"
version = "1.2.3-lts"
"#;

/// Test context with a config, lock file and local release mirror in a temp dir
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    fn config_path(&self) -> PathBuf {
        self.path("tilesmith.toml")
    }

    fn tilesmith(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tilesmith"))
            .env_remove("TILESMITH_CONFIG")
            .env_remove("RUST_LOG")
            .current_dir(self.temp_dir.path())
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .output()
            .expect("failed to run tilesmith")
    }
}

fn local_source(mirror: &Path) -> String {
    format!(
        "[[release_sources]]\ntype = \"local\"\npath = '{}'\nregex = '{PATTERN}'\n",
        mirror.display()
    )
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.tilesmith(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("fetch"));
    assert!(stdout.contains("publish"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.tilesmith(&["--version"]);
    assert!(output.status.success());
}

#[test]
fn test_fetch_from_local_source() {
    let ctx = TestContext::new();
    ctx.write(
        "mirror/2.5/bpm/bpm-1.2.3-lts-ubuntu-xenial-190.0.0.tgz",
        "bpm tarball",
    );
    ctx.write("mirror/README", "not a release");
    ctx.write("tilesmith.toml", &local_source(&ctx.path("mirror")));
    ctx.write("tilesmith.lock", LOCK);

    let out_dir = ctx.path("out/releases");
    let output = ctx.tilesmith(&[
        "fetch",
        "--releases-directory",
        out_dir.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let fetched = out_dir.join("bpm-1.2.3-lts-ubuntu-xenial-190.0.0.tgz");
    assert_eq!(std::fs::read_to_string(&fetched).unwrap(), "bpm tarball");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bpm-1.2.3-lts-ubuntu-xenial-190.0.0.tgz"));
}

#[test]
fn test_fetch_reports_missing_release() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.path("mirror")).unwrap();
    ctx.write("tilesmith.toml", &local_source(&ctx.path("mirror")));
    ctx.write("tilesmith.lock", LOCK);

    let output = ctx.tilesmith(&["fetch"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("couldn't find \"bpm\" 1.2.3-lts in any release source"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_publish_to_unknown_remote_lists_buckets() {
    let ctx = TestContext::new();
    ctx.write(
        "tilesmith.toml",
        "[[release_sources]]\ntype = \"s3\"\nbucket = \"some-bucket\"\nregex = '.+'\n",
    );
    ctx.write("tilesmith.lock", LOCK);
    let tarball = ctx.write("bpm-1.2.3.tgz", "bpm tarball");

    let output = ctx.tilesmith(&[
        "publish",
        "--name",
        "bpm",
        "--version",
        "1.2.3",
        "--remote",
        "nope",
        "--path",
        tarball.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("some acceptable sources are: some-bucket"),
        "stderr: {stderr}"
    );
    assert_eq!(
        std::fs::read_to_string(ctx.path("tilesmith.lock")).unwrap(),
        LOCK
    );
}

#[test]
fn test_completions_command() {
    let ctx = TestContext::new();
    let output = ctx.tilesmith(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tilesmith"));
}
