use std::collections::BTreeMap;
use std::error::Error as StdError;

use pretty_assertions::assert_eq;

use crate::re;
use crate::{
    compile_signatures, scan_lines, CompiledSignature, Compiler, Error,
};

#[test]
fn compile_valid_signatures() {
    let signatures = compile_signatures([
        ("eval_call", r"eval\("),
        ("exec_call", r"exec\("),
        ("good", "a.b"),
    ])
    .unwrap();

    assert_eq!(
        signatures.iter().map(|s| s.name()).collect::<Vec<_>>(),
        vec!["eval_call", "exec_call", "good"]
    );

    assert_eq!(signatures[0].pattern(), r"eval\(");
    assert_eq!(signatures[2].pattern(), "a.b");
}

#[test]
fn preserves_mapping_order() {
    // A BTreeMap iterates its keys in lexicographic order, the compiled
    // signatures must follow that order.
    let mut map = BTreeMap::new();
    map.insert("zeta".to_string(), "z".to_string());
    map.insert("alpha".to_string(), "a".to_string());
    map.insert("mid".to_string(), "m".to_string());

    let signatures = compile_signatures(&map).unwrap();

    assert_eq!(
        signatures.iter().map(|s| s.name()).collect::<Vec<_>>(),
        vec!["alpha", "mid", "zeta"]
    );
}

#[test]
fn unbalanced_parentheses() {
    let err = compile_signatures([("bad", "a(b")]).unwrap_err();

    assert_eq!(
        err,
        Error::SignatureCompilation {
            name: "bad".to_string(),
            pattern: "a(b".to_string(),
            source: re::Error::UnbalancedParentheses,
        }
    );

    assert_eq!(err.signature_name(), "bad");
    assert_eq!(err.cause(), Some(&re::Error::UnbalancedParentheses));
    assert_eq!(err.to_string(), "invalid signature `bad` (pattern: `a(b`)");
    assert_eq!(
        err.source().unwrap().to_string(),
        "unbalanced parentheses in pattern"
    );
}

#[test]
fn fail_fast() {
    // The error corresponds to the first invalid signature, the following
    // ones are not even compiled.
    let err = compile_signatures([
        ("ok", "abc"),
        ("empty", ""),
        ("trailing", r"abc\"),
    ])
    .unwrap_err();

    assert_eq!(err.signature_name(), "empty");
    assert_eq!(err.cause(), Some(&re::Error::EmptyPattern));
}

#[test]
fn error_kinds() {
    let cause = |pattern: &str| {
        CompiledSignature::new("test", pattern).unwrap_err().cause().cloned()
    };

    assert_eq!(cause(""), Some(re::Error::EmptyPattern));
    assert_eq!(cause(r"foo\"), Some(re::Error::TrailingEscape));
    assert_eq!(cause("(foo"), Some(re::Error::UnbalancedParentheses));
    assert_eq!(cause("foo)"), Some(re::Error::UnbalancedParentheses));
    assert_eq!(
        cause("foo|"),
        Some(re::Error::OperatorArity { operator: '|', expected: 2, found: 1 })
    );
    assert_eq!(
        cause("*"),
        Some(re::Error::OperatorArity { operator: '*', expected: 1, found: 0 })
    );
    assert_eq!(
        cause("()"),
        Some(re::Error::MalformedExpression { fragments: 0 })
    );
}

#[test]
fn duplicate_signature() {
    let mut compiler = Compiler::new();

    compiler.add_signature("foo", "foo").unwrap();

    assert_eq!(
        compiler.add_signature("foo", "bar").err().unwrap(),
        Error::DuplicateSignature { name: "foo".to_string() }
    );

    assert_eq!(compiler.len(), 1);
    assert_eq!(compiler.build()[0].pattern(), "foo");
}

#[test]
fn compile_twice() {
    let s1 = CompiledSignature::new("abb", "(a|b)*abb").unwrap();
    let s2 = CompiledSignature::new("abb", "(a|b)*abb").unwrap();

    assert_eq!(s1.dfa().num_states(), s2.dfa().num_states());
    assert_eq!(s1.dfa().num_transitions(), s2.dfa().num_transitions());
    assert_eq!(
        s1.dfa().accepting_states().collect::<Vec<_>>(),
        s2.dfa().accepting_states().collect::<Vec<_>>()
    );
}

#[test]
fn compile_twice_same_matches() {
    let signatures = [
        ("abb", "(a|b)*abb"),
        ("eval_call", r"eval\("),
        ("star", "x(y|z)*"),
    ];

    let first = compile_signatures(signatures).unwrap();
    let second = compile_signatures(signatures).unwrap();

    for lines in [
        vec!["aabb", "ababb", "bbbb"],
        vec!["eval(x) + eval(y)", ""],
        vec!["xyzzy", "zyx", "xxyy"],
    ] {
        let matches = scan_lines(&first, &lines);
        assert!(!matches.is_empty());
        assert_eq!(matches, scan_lines(&second, &lines));
    }
}
