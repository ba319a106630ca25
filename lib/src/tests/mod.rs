/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::{compile_signatures, scan_lines, Match, RiskLevel, Scanner};

macro_rules! scan {
    ($pattern:literal, $line:literal) => {{
        let signatures = compile_signatures([("test", $pattern)]).unwrap();
        scan_lines(&signatures, [$line])
    }};
}

macro_rules! assert_ranges {
    (
        $pattern:literal,
        $line:literal,
        [$($start:literal .. $end:literal),*]
    ) => {{
        let ranges: Vec<(usize, usize)> = scan!($pattern, $line)
            .iter()
            .map(|m| (m.start(), m.end()))
            .collect();

        assert_eq!(
            ranges,
            vec![$(($start, $end)),*],
            "\n\n`{}` scanning {:?}",
            $pattern,
            $line
        );
    }};
}

#[test]
fn escaped_literals() {
    assert_eq!(
        scan!(r"eval\(", "eval(x)"),
        vec![Match {
            signature: "test".to_string(),
            pattern: r"eval\(".to_string(),
            line_no: 1,
            range: 0..5,
            data: "eval(".to_string(),
        }]
    );

    assert_ranges!(r"eval\(", "eval[", []);
    assert_ranges!(r"base64\.b64decode\(", "base64.b64decode(", [0..17]);
    assert_ranges!(r"base64\.b64decode\(", "base64Xb64decodeY", []);
    assert_ranges!(r"\*", "a*b", [1..2]);
    assert_ranges!(r"\|", "a|b", [1..2]);
    assert_ranges!(r"\\", r"a\b", [1..2]);
    assert_ranges!(r"\(\)", "f()", [1..3]);
}

#[test]
fn operators() {
    assert_ranges!("a.b", "xaby", [1..3]);
    assert_ranges!("ab", "xaby", [1..3]);
    assert_ranges!("a|b", "abc", [0..1, 1..2]);
    assert_ranges!("(a|b)c", "acbc", [0..2, 2..4]);
    assert_ranges!("ab*c", "ac abc abbbc", [0..2, 3..6, 7..12]);
    assert_ranges!("a(bc)*", "abcbcb", [0..5]);
    assert_ranges!("x(a|b)*y", "xababy xy", [0..6, 7..9]);
    assert_ranges!("a|bc*", "bccx", [0..3]);
}

#[test]
fn overlapping_matches() {
    assert_ranges!("a", "aaa", [0..1, 1..2, 2..3]);
    assert_ranges!("a*", "aaa", [0..3, 1..3, 2..3]);
    assert_ranges!("aba", "ababa", [0..3, 2..5]);
}

#[test]
fn star_closure() {
    assert_ranges!("a*", "", []);
    assert_ranges!("a*", "a", [0..1]);
    assert_ranges!("a*", "b", []);
    assert_ranges!("(ab)*", "aba", [0..2]);
}

#[test]
fn multiple_signatures_and_lines() {
    let signatures = compile_signatures([
        ("eval_call", r"eval\("),
        ("exec_call", r"exec\("),
        ("powershell", "powershell"),
    ])
    .unwrap();

    let source = "\
import os
eval(exec(x))
powershell -c \"exec(y)\"
";

    let results = Scanner::new(&signatures).scan(source);

    assert_eq!(
        results
            .matches()
            .iter()
            .map(|m| (m.line_no, m.signature.as_str(), m.start()))
            .collect::<Vec<_>>(),
        vec![
            (2, "eval_call", 0),
            (2, "exec_call", 5),
            (3, "exec_call", 15),
            (3, "powershell", 0),
        ]
    );

    assert_eq!(results.num_lines(), 3);
    assert_eq!(results.risk_level(), RiskLevel::Medium);
}

#[test]
fn unicode() {
    assert_ranges!("日本", "こんにちは日本", [5..7]);
    assert_ranges!("é*", "ééé", [0..3, 1..3, 2..3]);
}
