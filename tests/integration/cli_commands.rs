//! CLI routing through RunContext and the compiled binary.

use super::test_utils::{read_tree, tree, with_env};
use clap::Parser;
use mirror_move::cli::{Cli, RunContext};
use mirror_move::error::ApiError;
use mirror_move::lock::LOCK_FILE_NAME;
use mirror_move::map::MapFile;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Context from an explicit config file, with the global config directory
/// pointed at `config_dir` so a developer's own settings stay out.
fn context(config_dir: &Path, toml: &str) -> RunContext {
    let path = config_dir.join("config.toml");
    fs::write(&path, toml).unwrap();
    let xdg = config_dir.to_str().unwrap();
    with_env(&[("XDG_CONFIG_HOME", xdg)], || RunContext::new(Some(path)).unwrap())
}

fn run(ctx: &RunContext, args: &[&str]) -> Result<String, ApiError> {
    let mut argv = vec!["mirror-move"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    ctx.execute(&cli.command)
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_scan_then_reconcile_execute() {
    let work = TempDir::new().unwrap();
    let ctx = context(work.path(), "");
    let target_dir = tree(&[("sorted/a.txt", b"a"), ("sorted/b.txt", b"b")]);
    let current_dir = tree(&[("a.txt", b"a"), ("b.txt", b"b")]);
    let target_map = work.path().join("target.json");
    let current_map = work.path().join("current.json");

    let summary = run(&ctx, &["scan", s(target_dir.path()), s(&target_map)]).unwrap();
    assert!(summary.contains("Hash map saved to"));
    assert!(summary.contains("(2 entries)"));
    run(&ctx, &["scan", s(current_dir.path()), s(&current_map)]).unwrap();

    let report = run(
        &ctx,
        &[
            "reconcile",
            s(current_dir.path()),
            s(&current_map),
            s(&target_map),
            "--execute",
        ],
    )
    .unwrap();
    assert!(report.contains("=== EXECUTE MODE (files were moved) ==="));
    assert_eq!(read_tree(current_dir.path()), read_tree(target_dir.path()));
    assert!(!current_dir.path().join(LOCK_FILE_NAME).exists());
}

#[test]
fn test_reconcile_defaults_to_dry_run_with_json_report() {
    let work = TempDir::new().unwrap();
    let ctx = context(work.path(), "");
    let target_dir = tree(&[("c/x.txt", b"x"), ("d/z.txt", b"z")]);
    let current_dir = tree(&[("a/x.txt", b"x"), ("b/y.txt", b"y")]);
    let target_map = work.path().join("target.json");
    let current_map = work.path().join("current.json");
    run(&ctx, &["scan", s(target_dir.path()), s(&target_map)]).unwrap();
    run(&ctx, &["scan", s(current_dir.path()), s(&current_map)]).unwrap();
    let before = read_tree(current_dir.path());

    let report = run(
        &ctx,
        &[
            "reconcile",
            s(current_dir.path()),
            s(&current_map),
            s(&target_map),
            "--format",
            "json",
        ],
    )
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json["mode"], "dry_run");
    assert_eq!(json["moved"][0]["source"], "a/x.txt");
    assert_eq!(json["moved"][0]["destination"], "c/x.txt");
    assert_eq!(json["missing"][0]["path"], "d/z.txt");
    assert_eq!(json["extra"][0]["path"], "b/y.txt");
    assert_eq!(read_tree(current_dir.path()), before);
}

#[test]
fn test_reconcile_with_unreadable_map_fails() {
    let work = TempDir::new().unwrap();
    let ctx = context(work.path(), "");
    let base = tree(&[]);
    let target_map = work.path().join("target.json");
    fs::write(&target_map, "[1, 2").unwrap();
    MapFile::new(work.path().join("current.json"))
        .save(&Default::default())
        .unwrap();

    let err = run(
        &ctx,
        &[
            "reconcile",
            s(base.path()),
            s(&work.path().join("current.json")),
            s(&target_map),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Map(_)));
    assert!(mirror_move::cli::map_error(&err).starts_with("Error: Could not load hash maps"));
}

#[test]
fn test_execute_refuses_locked_base() {
    let work = TempDir::new().unwrap();
    let ctx = context(work.path(), "");
    let base = tree(&[("a.txt", b"a")]);
    let map = work.path().join("map.json");
    run(&ctx, &["scan", s(base.path()), s(&map)]).unwrap();
    fs::write(base.path().join(LOCK_FILE_NAME), "4242\n").unwrap();

    let err = run(
        &ctx,
        &["reconcile", s(base.path()), s(&map), s(&map), "--execute"],
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Locked(_)));

    // With locking disabled the run goes ahead.
    let unlocked = context(work.path(), "[reconcile]\nlock = false\n");
    run(
        &unlocked,
        &["reconcile", s(base.path()), s(&map), s(&map), "--execute"],
    )
    .unwrap();
}

#[test]
fn test_config_file_and_environment_select_algorithm() {
    let work = TempDir::new().unwrap();
    let dir = tree(&[("a.txt", b"a")]);

    let ctx = context(work.path(), "[scan]\nalgorithm = \"sha256\"\n");
    assert_eq!(ctx.config().scan.algorithm.name(), "sha256");
    let map = work.path().join("sha.json");
    run(&ctx, &["scan", s(dir.path()), s(&map)]).unwrap();
    let entry = MapFile::new(&map).load().unwrap();
    assert_eq!(entry.iter().next().unwrap().hash.as_str().len(), 64);

    let path = work.path().join("config.toml");
    fs::write(&path, "").unwrap();
    let from_env = with_env(
        &[
            ("MIRROR_MOVE__SCAN__CHECKPOINT_EVERY", "7"),
            ("XDG_CONFIG_HOME", work.path().to_str().unwrap()),
        ],
        || RunContext::new(Some(path)).unwrap(),
    );
    assert_eq!(from_env.config().scan.checkpoint_every, 7);
}

#[cfg(target_os = "linux")]
#[test]
fn test_explicit_config_layers_over_global_file() {
    let xdg = TempDir::new().unwrap();
    let global_dir = xdg.path().join("mirror-move");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        "[scan]\nalgorithm = \"sha256\"\nchunk_size = 1024\n",
    )
    .unwrap();

    let work = TempDir::new().unwrap();
    let explicit = work.path().join("explicit.toml");
    fs::write(&explicit, "[scan]\nchunk_size = 2048\n").unwrap();

    let config = with_env(&[("XDG_CONFIG_HOME", xdg.path().to_str().unwrap())], || {
        RunContext::new(Some(explicit)).unwrap().config().clone()
    });
    assert_eq!(config.scan.algorithm.name(), "sha256", "global file still applies");
    assert_eq!(config.scan.chunk_size, 2048, "explicit file wins over global");
}

#[test]
fn test_invalid_config_is_rejected() {
    let work = TempDir::new().unwrap();
    let path = work.path().join("config.toml");
    fs::write(&path, "[scan]\nchunk_size = 0\n").unwrap();
    let err = RunContext::new(Some(path)).err().unwrap();
    assert!(err.to_string().contains("chunk_size"));
}

#[test]
fn test_binary_scan_and_dry_run() {
    let work = TempDir::new().unwrap();
    let config = work.path().join("config.toml");
    fs::write(&config, "").unwrap();
    let base = tree(&[("one.txt", b"1")]);
    let target_dir = tree(&[("sub/one.txt", b"1")]);
    let current_map = work.path().join("current.json");
    let target_map = work.path().join("target.json");
    let bin = env!("CARGO_BIN_EXE_mirror-move");

    for (root, map) in [(base.path(), &current_map), (target_dir.path(), &target_map)] {
        let output = Command::new(bin)
            .env("XDG_CONFIG_HOME", work.path())
            .arg("--config")
            .arg(&config)
            .arg("--quiet")
            .arg("scan")
            .arg(root)
            .arg(map)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "scan should succeed: stderr={:?}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let output = Command::new(bin)
        .env("XDG_CONFIG_HOME", work.path())
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .arg("reconcile")
        .arg(base.path())
        .arg(&current_map)
        .arg(&target_map)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== DRY RUN MODE (use --execute to actually move files) ==="));
    assert!(stdout.contains("one.txt -> sub/one.txt"));
    assert!(output.stderr.is_empty(), "quiet run should not log");
    assert!(base.path().join("one.txt").exists());

    let output = Command::new(bin)
        .env("XDG_CONFIG_HOME", work.path())
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .arg("reconcile")
        .arg(base.path().join("missing"))
        .arg(&current_map)
        .arg(&target_map)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}
