use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use crate::tests::sigscan;

#[test]
fn builtin_signatures() {
    sigscan()
        .arg("scan")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/malicious.py [low] 2 match(es)
2:10-27:base64_decode: base64.b64decode(
3:0-5:exec_call: exec(
",
        );
}

#[test]
fn custom_signatures() {
    sigscan()
        .arg("scan")
        .arg("--signatures")
        .arg("src/tests/testdata/signatures.toml")
        .arg("src/tests/testdata/script.sh")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/script.sh [medium] 4 match(es)
2:8-15:http: http://
2:0-12:curl_pipe: curl -s http
3:5-11:rm_rf: rm -rf
3:0-4:sudo: sudo
",
        );
}

#[test]
fn no_builtin() {
    sigscan()
        .arg("scan")
        .arg("--no-builtin")
        .arg("-s")
        .arg("src/tests/testdata/signatures.toml")
        .arg("src/tests/testdata/script.sh")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/script.sh [low] 2 match(es)
2:0-12:curl_pipe: curl -s http
3:0-4:sudo: sudo
",
        );
}

#[test]
fn no_matches() {
    sigscan()
        .arg("scan")
        .arg("src/tests/testdata/clean.txt")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn stdin() {
    sigscan()
        .arg("scan")
        .arg("-")
        .write_stdin("x = 1\ny = eval(x)\n")
        .assert()
        .success()
        .stdout("- [low] 1 match(es)\n2:4-9:eval_call: eval(\n");
}

#[test]
fn preview() {
    sigscan()
        .arg("scan")
        .arg("--preview")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/malicious.py [low] 2 match(es)
2:10-27:base64_decode: base64.b64decode(
3:0-5:exec_call: exec(
   1 | import base64
   2 | payload = base64.b64decode(data)
   3 | exec(payload)
",
        );
}

#[test]
fn output_format_ndjson() {
    sigscan()
        .arg("scan")
        .arg("--output-format=ndjson")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""path":"src/tests/testdata/malicious.py""#,
        ))
        .stdout(predicate::str::contains(r#""risk_level":"low""#))
        .stdout(predicate::str::contains(r#""total_lines":3"#))
        .stdout(predicate::str::contains(r#""matches_found":2"#))
        .stdout(predicate::str::contains(
            r#""description":"Detects exec() function calls (dynamic code execution)","end":5,"line_no":3,"pattern":"exec\\(","signature":"exec_call","snippet":"exec(","start":0"#,
        ))
        .stdout(predicate::str::contains("preview").not());
}

#[test]
fn output_format_ndjson_clean_file() {
    sigscan()
        .arg("scan")
        .arg("-o")
        .arg("ndjson")
        .arg("--preview")
        .arg("src/tests/testdata/clean.txt")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""risk_level":"safe""#))
        .stdout(predicate::str::contains(
            r#""preview":["hello world","nothing to see here"]"#,
        ));
}

#[test]
fn directory() {
    sigscan()
        .arg("scan")
        .arg("--threads=1")
        .arg("src/tests/testdata")
        .assert()
        .success()
        .stdout(predicate::str::contains("malicious.py [low] 2 match(es)"))
        .stdout(predicate::str::contains("script.sh [low] 2 match(es)"))
        .stdout(predicate::str::contains("clean.txt").not())
        .stdout(predicate::str::contains("signatures.toml").not());
}

#[test]
fn directory_recursive() {
    let temp_dir = TempDir::new().unwrap();

    temp_dir.child("a.py").write_str("eval(x)\n").unwrap();
    temp_dir.child("sub/b.js").write_str("eval(y)\n").unwrap();
    temp_dir.child("sub/c.bin").write_str("eval(z)\n").unwrap();

    sigscan()
        .arg("scan")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.py [low] 1 match(es)"))
        .stdout(predicate::str::contains("b.js").not());

    sigscan()
        .arg("scan")
        .arg("--recursive")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("a.py [low] 1 match(es)"))
        .stdout(predicate::str::contains("b.js [low] 1 match(es)"))
        .stdout(predicate::str::contains("c.bin").not());
}

#[test]
fn directory_upper_case_extensions() {
    let temp_dir = TempDir::new().unwrap();

    temp_dir.child("evil.py").write_str("eval(x)\n").unwrap();
    temp_dir.child("DROPPER.PY").write_str("eval(x)\n").unwrap();
    temp_dir.child("payload.Sh").write_str("rm -rf /\n").unwrap();

    sigscan()
        .arg("scan")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("evil.py [low] 1 match(es)"))
        .stdout(predicate::str::contains("DROPPER.PY [low] 1 match(es)"))
        .stdout(predicate::str::contains("payload.Sh [low] 1 match(es)"));
}

#[test]
fn skip_larger() {
    sigscan()
        .arg("scan")
        .arg("--skip-larger=10")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn recursive_with_file() {
    sigscan()
        .arg("scan")
        .arg("--recursive")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .failure()
        .code(1)
        .stderr(
            "error: can't use '--recursive' when <TARGET_PATH> is a file\n",
        );
}

#[test]
fn invalid_signature() {
    sigscan()
        .arg("scan")
        .arg("-s")
        .arg("src/tests/testdata/invalid.toml")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .failure()
        .code(1)
        .stderr(
            "error: invalid signature `bad` (pattern: `a(b`): unbalanced parentheses in pattern\n",
        );
}

#[test]
fn duplicate_signature() {
    let temp_dir = TempDir::new().unwrap();
    let signatures = temp_dir.child("signatures.toml");

    signatures
        .write_str(
            r#"
            [[signature]]
            name = "eval_call"
            pattern = 'eval'
            "#,
        )
        .unwrap();

    sigscan()
        .arg("scan")
        .arg("-s")
        .arg(signatures.path())
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .failure()
        .code(1)
        .stderr("error: duplicate signature `eval_call`\n");
}

#[test]
fn config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file
        .write_str(
            r#"
            [signatures]
            builtin = false
            files = ["src/tests/testdata/signatures.toml"]
            "#,
        )
        .unwrap();

    sigscan()
        .arg("--config")
        .arg(config_file.path())
        .arg("scan")
        .arg("src/tests/testdata/script.sh")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/script.sh [low] 2 match(es)
2:0-12:curl_pipe: curl -s http
3:0-4:sudo: sudo
",
        );
}

#[test]
fn config_max_line_length() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file
        .write_str(
            r#"
            [scan]
            max_line_length = 10
            "#,
        )
        .unwrap();

    sigscan()
        .arg("--config")
        .arg(config_file.path())
        .arg("scan")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/malicious.py [low] 1 match(es)
3:0-5:exec_call: exec(
",
        );
}

#[test]
fn invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file
        .write_str(
            r#"
            [scan]
            unknown = true
            "#,
        )
        .unwrap();

    sigscan()
        .arg("--config")
        .arg(config_file.path())
        .arg("scan")
        .arg("src/tests/testdata/malicious.py")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(
            "error: can not load config file",
        ));
}
