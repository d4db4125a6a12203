//! Integration tests for vidscaffold

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary with config lookup pinned to a file that does not exist
    fn vidscaffold(config_dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("vidscaffold");
        cmd.env("VIDSCAFFOLD_CONFIG", config_dir.join("absent.toml"))
            .env_remove("VIDSCAFFOLD_VERBOSE");
        cmd
    }

    #[test]
    fn help_displays() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--dry-run"))
            .stdout(predicate::str::contains("--clean"));
    }

    #[test]
    fn version_displays() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("vidscaffold"));
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .arg("--frobnicate")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn malformed_verbose_env_is_fatal() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .env("VIDSCAFFOLD_VERBOSE", "loud")
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid verbosity level: loud"));
    }

    #[test]
    fn check_reports_missing_tools() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .env("PATH", "")
            .args(["--check", "--root"])
            .arg(tmp.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("not found on PATH"))
            .stdout(predicate::str::contains("0 passed"))
            .stderr(predicate::str::contains("Missing prerequisite node"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn dry_run_on_empty_root_lists_pending_steps() {
        let tmp = TempDir::new().unwrap();
        vidscaffold(tmp.path())
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("run `npm init -y` (pending)"))
            .stdout(predicate::str::contains("install routes/videos.js (pending)"))
            .stdout(predicate::str::contains("step(s) pending"));

        assert!(!tmp.path().join("backend").exists());
        assert!(!tmp.path().join(".backend.stepcache.json").exists());
    }

    #[test]
    fn dry_run_shows_cached_steps() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("backend")).unwrap();
        std::fs::write(
            tmp.path().join(".backend.stepcache.json"),
            r#"{
  "version": 1,
  "target": "backend",
  "updated_at": "2026-01-01T00:00:00Z",
  "steps": [
    { "key": { "kind": "command", "argv": ["npm", "init", "-y"] }, "done": true }
  ]
}"#,
        )
        .unwrap();

        vidscaffold(tmp.path())
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("run `npm init -y` (cached)"))
            .stdout(predicate::str::contains("run `npx sequelize-cli init` (pending)"));
    }

    #[test]
    fn local_config_renames_targets() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("vidscaffold.toml"),
            "[general]\nbackend_dir = \"api\"\n",
        )
        .unwrap();

        cargo_bin_cmd!("vidscaffold")
            .env_remove("VIDSCAFFOLD_CONFIG")
            .env_remove("VIDSCAFFOLD_VERBOSE")
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(format!(
                "api ({})",
                tmp.path().join("api").display()
            )))
            .stdout(predicate::str::contains("install server.js (pending)"));
    }

    #[test]
    fn missing_templates_are_fatal() {
        let tmp = TempDir::new().unwrap();
        let templates = tmp.path().join("no-templates");
        std::fs::create_dir(&templates).unwrap();

        vidscaffold(tmp.path())
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .arg("--templates")
            .arg(&templates)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Template not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("broken.toml");
        std::fs::write(&config, "[general\nbackend_dir = 3").unwrap();

        vidscaffold(tmp.path())
            .env("VIDSCAFFOLD_CONFIG", &config)
            .args(["--dry-run", "--root"])
            .arg(tmp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    /// Directory of stand-in `node`/`npm`/`npx`/`ffmpeg` scripts that log
    /// every non-version call to `calls.log` beside them
    #[cfg(unix)]
    fn stub_tools(dir: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let log = bin.join("calls.log");
        for tool in ["node", "npm", "npx", "ffmpeg"] {
            let script = format!(
                "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo v20.11.1; exit 0; fi\necho \"{tool} $*\" >> '{}'\n",
                log.display()
            );
            let path = bin.join(tool);
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        bin
    }

    #[cfg(unix)]
    fn logged_calls(bin: &Path) -> Vec<String> {
        std::fs::read_to_string(bin.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[cfg(unix)]
    #[test]
    fn second_run_reports_same_checks_and_spawns_nothing() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir(&work).unwrap();
        let bin = stub_tools(tmp.path());

        vidscaffold(tmp.path())
            .env("PATH", &bin)
            .arg("--root")
            .arg(&work)
            .assert()
            .success()
            .stdout(predicate::str::contains("26 passed, 0 failed"))
            .stdout(predicate::str::contains("backend: 14 step(s) run, 0 cached"))
            .stdout(predicate::str::contains("frontend: 8 step(s) run, 0 cached"));

        let first_calls = logged_calls(&bin);
        assert!(first_calls.contains(&"npm init -y".to_string()));
        assert!(first_calls.contains(&"npx sequelize-cli db:migrate".to_string()));
        assert!(work.join("backend").join("routes").join("videos.js").is_file());
        assert!(work.join(".frontend.stepcache.json").is_file());

        vidscaffold(tmp.path())
            .env("PATH", &bin)
            .arg("--root")
            .arg(&work)
            .assert()
            .success()
            .stdout(predicate::str::contains("26 passed, 0 failed"))
            .stdout(predicate::str::contains("backend: 0 step(s) run, 14 cached"))
            .stdout(predicate::str::contains("frontend: 0 step(s) run, 8 cached"));

        assert_eq!(logged_calls(&bin), first_calls);
    }

    #[cfg(unix)]
    #[test]
    fn clean_removes_targets_and_rebuilds_cache() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        let backend = work.join("backend");
        std::fs::create_dir_all(&backend).unwrap();
        std::fs::write(backend.join("leftover.txt"), "old").unwrap();
        std::fs::write(
            work.join(".backend.stepcache.json"),
            r#"{
  "version": 1,
  "target": "backend",
  "updated_at": "2026-01-01T00:00:00Z",
  "steps": [
    { "key": { "kind": "command", "argv": ["npm", "init", "-y"] }, "done": true }
  ]
}"#,
        )
        .unwrap();
        let bin = stub_tools(tmp.path());

        vidscaffold(tmp.path())
            .env("PATH", &bin)
            .args(["--clean", "--root"])
            .arg(&work)
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed backend"))
            .stdout(predicate::str::contains("backend: 14 step(s) run, 0 cached"));

        assert!(!backend.join("leftover.txt").exists());
        assert!(backend.join("server.js").is_file());
        assert!(logged_calls(&bin).contains(&"npm init -y".to_string()));

        let record = std::fs::read_to_string(work.join(".backend.stepcache.json")).unwrap();
        assert!(!record.contains("2026-01-01T00:00:00Z"));
        assert!(record.contains("db:migrate"));
    }
}
