use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("yt-transcript").unwrap();
    cmd.env_remove("YT_TRANSCRIPT_CONFIG");
    cmd
}

#[test]
fn help_lists_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--translate"))
        .stdout(predicate::str::contains("--timestamps"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn unparsable_video_exits_with_2() {
    cmd()
        .arg("not a url")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Cannot parse YouTube video id from: not a url",
        ));
}

#[test]
fn unknown_host_exits_with_2() {
    cmd()
        .arg("https://vimeo.com/watch?v=dQw4w9WgXcQ")
        .assert()
        .code(2);
}

#[test]
fn bad_config_file_exits_with_1() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "http:\n  timeout_secs: 0\n").unwrap();

    cmd()
        .arg("dQw4w9WgXcQ")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn conflicting_format_flags_are_rejected() {
    cmd()
        .args(["dQw4w9WgXcQ", "--json", "--format", "srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
