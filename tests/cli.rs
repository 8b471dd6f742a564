//! CLI tests for the layercfg binary.
//!
//! These run the real binary against the setup.cfg fixture and against
//! layered files written to temp directories.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use layercfg::discover::ENV_USER_CONFIG;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the layercfg binary with no layering from the environment.
fn layercfg() -> Command {
    let mut cmd = cargo_bin_cmd!("layercfg");
    cmd.env_remove("LAYERCFG_FILES").env_remove("RUST_LOG");
    cmd
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("setup.cfg")
}

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("write config file");
    path
}

// ============================================================================
// Typed Lookups
// ============================================================================

mod get {
    use super::*;

    #[test]
    fn scalar_by_default() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "aliases", "test"])
            .assert()
            .success()
            .stdout("pytest\n");
    }

    #[test]
    fn list_prints_one_item_per_line() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "tool:pytest", "addopts", "--as", "list"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "--durations=20\n--doctest-modules\n-ra\n",
            ))
            .stdout(predicate::str::ends_with("--capture=sys\n"));
    }

    #[test]
    fn rules_keep_insertion_order() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "flake8", "select", "--as", "rules"])
            .assert()
            .success()
            .stdout("A\nE\nF\nW\nC\n");
    }

    #[test]
    fn rules_reject_file_patterns() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "flake8", "exclude", "--as", "rules"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid rule code"));
    }

    #[test]
    fn missing_key_fails() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "aliases", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("[aliases] nope is not set"));
    }

    #[test]
    fn bool_and_int() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write(&tmp, "tool.cfg", "[tool]\nstrict = yes\nlimit = 99\nmode = maybe\n");

        layercfg()
            .arg("-f")
            .arg(&path)
            .args(["get", "tool", "strict", "--as", "bool"])
            .assert()
            .success()
            .stdout("true\n");

        layercfg()
            .arg("-f")
            .arg(&path)
            .args(["get", "tool", "limit", "--as", "int"])
            .assert()
            .success()
            .stdout("99\n");

        layercfg()
            .arg("-f")
            .arg(&path)
            .args(["get", "tool", "mode", "--as", "bool"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a boolean"));
    }

    #[test]
    fn interpolate_scalar() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write(&tmp, "paths.cfg", "[paths]\nroot = /srv\nlogs = %(root)s/logs\n");

        layercfg()
            .arg("-f")
            .arg(&path)
            .args(["get", "paths", "logs", "--interpolate"])
            .assert()
            .success()
            .stdout("/srv/logs\n");

        layercfg()
            .arg("-f")
            .arg(&path)
            .args(["get", "paths", "logs"])
            .assert()
            .success()
            .stdout("%(root)s/logs\n");
    }

    #[test]
    fn interpolate_rejects_lists() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "flake8", "select", "--as", "list", "--interpolate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("only applies to scalar"));
    }

    #[test]
    fn unknown_kind_rejected() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .args(["get", "aliases", "test", "--as", "float"])
            .assert()
            .failure();
    }
}

// ============================================================================
// Layering
// ============================================================================

mod layering {
    use super::*;

    const BASE: &str = "[flake8]\nignore = Y\nselect = E,W\n";
    const OVERLAY: &str = "[flake8]\nignore = X\n+select = F,W\n";

    #[test]
    fn later_files_win() {
        let tmp = TempDir::new().expect("tempdir");
        let base = write(&tmp, "base.cfg", BASE);
        let overlay = write(&tmp, "overlay.cfg", OVERLAY);

        layercfg()
            .arg("-f")
            .arg(&base)
            .arg("-f")
            .arg(&overlay)
            .args(["get", "flake8", "ignore"])
            .assert()
            .success()
            .stdout("X\n");

        layercfg()
            .arg("-f")
            .arg(&overlay)
            .arg("-f")
            .arg(&base)
            .args(["get", "flake8", "ignore"])
            .assert()
            .success()
            .stdout("Y\n");
    }

    #[test]
    fn additive_key_appends() {
        let tmp = TempDir::new().expect("tempdir");
        let base = write(&tmp, "base.cfg", BASE);
        let overlay = write(&tmp, "overlay.cfg", OVERLAY);

        layercfg()
            .arg("-f")
            .arg(&base)
            .arg("-f")
            .arg(&overlay)
            .args(["get", "flake8", "select", "--as", "rules"])
            .assert()
            .success()
            .stdout("E\nW\nF\n");
    }

    #[test]
    fn files_from_environment() {
        let tmp = TempDir::new().expect("tempdir");
        let base = write(&tmp, "base.cfg", BASE);
        let overlay = write(&tmp, "overlay.cfg", OVERLAY);
        let files = format!("{}:{}", base.display(), overlay.display());

        layercfg()
            .env("LAYERCFG_FILES", files)
            .args(["get", "flake8", "ignore"])
            .assert()
            .success()
            .stdout("X\n");
    }

    #[test]
    fn missing_file_fails() {
        let tmp = TempDir::new().expect("tempdir");

        layercfg()
            .arg("-f")
            .arg(tmp.path().join("absent.cfg"))
            .arg("sections")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }

    #[test]
    fn discovers_project_file_from_working_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("src").join("pkg");
        fs::create_dir_all(&nested).expect("create nested dirs");
        write(&tmp, "layercfg-test.cfg", "[aliases]\ntest = pytest\n");

        layercfg()
            .current_dir(&nested)
            .env(ENV_USER_CONFIG, tmp.path().join("absent-user.cfg"))
            .args(["--name", "layercfg-test.cfg", "get", "aliases", "test"])
            .assert()
            .success()
            .stdout("pytest\n");
    }

    #[test]
    fn nothing_discovered_fails() {
        let tmp = TempDir::new().expect("tempdir");

        layercfg()
            .current_dir(tmp.path())
            .env(ENV_USER_CONFIG, tmp.path().join("absent-user.cfg"))
            .args(["--name", "layercfg-absent.cfg", "sections"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no layercfg-absent.cfg found in"));
    }
}

// ============================================================================
// Dump and Sections
// ============================================================================

mod output {
    use super::*;

    #[test]
    fn sections_in_file_order() {
        layercfg()
            .arg("-f")
            .arg(fixture())
            .arg("sections")
            .assert()
            .success()
            .stdout("aliases\nbdist_rpm\nflake8\ntool:pytest\npydocstyle\n");
    }

    #[test]
    fn dump_is_canonical() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write(
            &tmp,
            "messy.cfg",
            "[docs]\n# comment\nfiles=README.rst\n    LICENSE.txt\n\n\n[aliases]\ntest   =   pytest\n",
        );

        layercfg()
            .arg("-f")
            .arg(&path)
            .arg("dump")
            .assert()
            .success()
            .stdout("[docs]\nfiles = README.rst\n    LICENSE.txt\n\n[aliases]\ntest = pytest\n");
    }

    #[test]
    fn dumped_merge_reloads() {
        let tmp = TempDir::new().expect("tempdir");
        let base = write(&tmp, "base.cfg", "[a]\nx = a\n");
        let overlay = write(&tmp, "overlay.cfg", "[a]\n+x = #b,;c\n");

        let output = layercfg()
            .arg("-f")
            .arg(&base)
            .arg("-f")
            .arg(&overlay)
            .arg("dump")
            .output()
            .expect("run layercfg dump");
        assert!(output.status.success());
        let dumped = write(
            &tmp,
            "dumped.cfg",
            &String::from_utf8(output.stdout).expect("utf-8 dump"),
        );

        layercfg()
            .arg("-f")
            .arg(&dumped)
            .args(["get", "a", "x", "--as", "list"])
            .assert()
            .success()
            .stdout("a\n#b\n;c\n");
    }
}
