use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();
    let output = t.run(&["--help"]);
    assert_success(&output);
    for command in ["keys", "select", "encrypt", "decrypt", "detect", "open", "save"] {
        assert_stdout_contains(&output, command);
    }
}

#[test]
fn test_version() {
    let t = Test::new();
    let output = t.run(&["--version"]);
    assert_success(&output);
    assert_stdout_contains(&output, "gpgpad");
}

#[test]
fn test_completions() {
    let t = Test::new();
    for shell in ["bash", "zsh", "fish", "power-shell"] {
        let output = t.run(&["completions", shell]);
        assert_success(&output);
        assert_stdout_contains(&output, "gpgpad");
    }
}

#[test]
fn test_completions_need_no_config() {
    let t = Test::new();
    t.write_config("not [valid toml");
    assert_success(&t.run(&["completions", "bash"]));
}

#[test]
fn test_keys_help_mentions_filters() {
    use predicates::prelude::*;

    Test::new()
        .cmd()
        .args(["keys", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--include-expired"))
        .stdout(predicate::str::contains("--private"));
}
