//! Integration tests for the cache-step binary

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::path::Path;

fn cache_step() -> Command {
    cargo_bin_cmd!("cache-step")
}

fn write_json(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

mod cli_tests {
    use super::*;

    #[test]
    fn help_displays() {
        cache_step()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache step"));
    }

    #[test]
    fn version_displays() {
        cache_step()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache-step"));
    }

    #[test]
    fn missing_inputs_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let context = write_json(dir.path(), "context.json", "{}");
        cache_step()
            .args(["run", "--inputs"])
            .arg(dir.path().join("nope.json"))
            .arg("--context")
            .arg(&context)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}

mod config_error_tests {
    use super::*;

    // Scenario: key present, bucket missing. The error travels inside
    // the recorded result, not the exit code, so the host can relay it.
    #[test]
    fn run_reports_missing_bucket_in_result() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_json(
            dir.path(),
            "inputs.json",
            r#"{"key":"abc","path":"cache","region":"cn-shenzhen",
                "credentials":{"accessKeyId":"ak","accessKeySecret":"sk"}}"#,
        );
        let context = write_json(dir.path(), "context.json", "{}");

        cache_step()
            .arg("run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&context)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""cache-hit":false"#))
            .stdout(predicate::str::contains("Bucket does not meet expectations"));
    }

    #[test]
    fn post_run_with_prior_error_exits_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_json(
            dir.path(),
            "inputs.json",
            r#"{"key":"abc","path":"cache","region":"cn-shenzhen",
                "ossConfig":{"bucket":"artifacts"},
                "credentials":{"accessKeyId":"ak","accessKeySecret":"sk"}}"#,
        );
        let context = write_json(
            dir.path(),
            "context.json",
            r#"{"stepContext":{"run":{"outputs":{"cache-hit":false,"error":"existence check failed"}}}}"#,
        );

        cache_step()
            .arg("post-run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&context)
            .assert()
            .success();
    }
}

#[cfg(unix)]
mod stub_transfer_tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    /// Install a stub transfer tool that logs each invocation's first
    /// argument and replies with a scripted du marker line.
    fn install_stub(dir: &Path, object_count: u64) -> (PathBuf, PathBuf) {
        let log = dir.join("stub.log");
        let stub = dir.join("ossutil-stub");
        let script = format!(
            "#!/bin/sh\necho \"$1\" >> {}\nif [ \"$1\" = du ]; then echo 'total object count: {}'; fi\nexit 0\n",
            log.display(),
            object_count
        );
        std::fs::write(&stub, script).unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
        (stub, log)
    }

    fn stub_log(log: &Path) -> Vec<String> {
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn valid_inputs(dir: &Path) -> PathBuf {
        write_json(
            dir,
            "inputs.json",
            &format!(
                r#"{{"key":"abc","path":"{}","region":"cn-shenzhen",
                    "ossConfig":{{"bucket":"artifacts"}},
                    "credentials":{{"accessKeyId":"ak","accessKeySecret":"sk"}}}}"#,
                dir.join("cache").display()
            ),
        )
    }

    // Scenario: empty prefix, then push. Phase one reports a clean
    // miss; phase two performs exactly one upload.
    #[test]
    fn miss_then_push() {
        let dir = tempfile::tempdir().unwrap();
        let (stub, log) = install_stub(dir.path(), 0);
        let inputs = valid_inputs(dir.path());
        let context = write_json(dir.path(), "context.json", "{}");

        cache_step()
            .arg("run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&context)
            .args(["--transfer-bin"])
            .arg(&stub)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"cache-hit":false}"#));
        assert_eq!(stub_log(&log), vec!["du"]);

        let post_context = write_json(
            dir.path(),
            "post_context.json",
            r#"{"stepContext":{"run":{"outputs":{"cache-hit":false}}}}"#,
        );
        cache_step()
            .arg("post-run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&post_context)
            .args(["--transfer-bin"])
            .arg(&stub)
            .assert()
            .success();
        assert_eq!(stub_log(&log), vec!["du", "cp"]);
    }

    // Scenario: populated prefix. Phase one fetches and reports a hit;
    // phase two performs zero transfer calls.
    #[test]
    fn hit_then_skip() {
        let dir = tempfile::tempdir().unwrap();
        let (stub, log) = install_stub(dir.path(), 3);
        let inputs = valid_inputs(dir.path());
        let context = write_json(dir.path(), "context.json", "{}");

        cache_step()
            .arg("run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&context)
            .args(["--transfer-bin"])
            .arg(&stub)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"cache-hit":true}"#));
        assert_eq!(stub_log(&log), vec!["du", "cp"]);
        assert!(dir.path().join("cache").is_dir());

        let post_context = write_json(
            dir.path(),
            "post_context.json",
            r#"{"stepContext":{"run":{"outputs":{"cache-hit":true}}}}"#,
        );
        cache_step()
            .arg("post-run")
            .args(["--inputs"])
            .arg(&inputs)
            .arg("--context")
            .arg(&post_context)
            .args(["--transfer-bin"])
            .arg(&stub)
            .assert()
            .success();
        // No further transfer calls after the prior hit
        assert_eq!(stub_log(&log), vec!["du", "cp"]);
    }
}
