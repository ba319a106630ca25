use assert_cmd::Command;

mod scan;

/// Returns a command that runs `sigscan` with the test data directory as
/// the home directory, so that a `.sigscan.toml` file in the user's real
/// home directory doesn't affect the tests.
pub(crate) fn sigscan() -> Command {
    let mut cmd = Command::cargo_bin("sigscan").unwrap();
    cmd.env("HOME", "src/tests/testdata")
        .env("USERPROFILE", "src/tests/testdata");
    cmd
}
