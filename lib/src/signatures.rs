/*! Built-in signatures and signature definitions.

The built-in set covers a few common indicators of malicious or suspicious
code. It is compiled only once per process, the first time it is used.
*/

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::compiler::{compile_signatures, CompiledSignature, Error};

/// Description for signatures that don't have one.
pub const DEFAULT_DESCRIPTION: &str = "Custom malware signature";

/// Built-in signatures as `(name, pattern, description)`.
pub const BUILTIN_SIGNATURES: &[(&str, &str, &str)] = &[
    (
        "eval_call",
        r"eval\(",
        "Detects eval() function calls (dynamic code execution)",
    ),
    (
        "exec_call",
        r"exec\(",
        "Detects exec() function calls (dynamic code execution)",
    ),
    (
        "base64_decode",
        r"base64\.b64decode\(",
        "Detects base64 decoding (potential obfuscation)",
    ),
    ("rm_rf", "rm -rf", "Detects destructive file deletion commands"),
    ("powershell", "powershell", "Detects PowerShell execution"),
    ("http", "http://", "Detects HTTP URLs (potential C&C communication)"),
];

/// Definition of a signature before compilation.
///
/// This is the format used in signature files, where each signature is a
/// `[[signature]]` table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureDef {
    pub name: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SignatureDef {
    /// Returns the signature's description. Signatures without an explicit
    /// one use the description of the built-in signature with the same
    /// name, or [`DEFAULT_DESCRIPTION`].
    pub fn description(&self) -> &str {
        match &self.description {
            Some(desc) => desc.as_str(),
            None => description(self.name.as_str()),
        }
    }
}

lazy_static! {
    static ref BUILTIN: Vec<CompiledSignature> = compile_signatures(
        BUILTIN_SIGNATURES.iter().map(|(name, pattern, _)| (*name, *pattern))
    )
    .expect("built-in signatures should compile");
}

/// Returns the built-in signatures, already compiled.
pub fn builtin() -> &'static [CompiledSignature] {
    BUILTIN.as_slice()
}

/// Returns the definitions of the built-in signatures.
pub fn builtin_defs() -> Vec<SignatureDef> {
    BUILTIN_SIGNATURES
        .iter()
        .map(|(name, pattern, desc)| SignatureDef {
            name: name.to_string(),
            pattern: pattern.to_string(),
            description: Some(desc.to_string()),
        })
        .collect()
}

/// Returns the description of a built-in signature, or
/// [`DEFAULT_DESCRIPTION`] if there's no built-in signature with that name.
pub fn description(name: &str) -> &'static str {
    BUILTIN_SIGNATURES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, _, desc)| *desc)
        .unwrap_or(DEFAULT_DESCRIPTION)
}

/// Compiles a list of signature definitions, in order.
pub fn compile_defs(
    defs: &[SignatureDef],
) -> Result<Vec<CompiledSignature>, Error> {
    compile_signatures(defs.iter().map(|def| (&def.name, &def.pattern)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::scan_lines;

    #[test]
    fn builtin_order() {
        assert_eq!(
            builtin().iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec![
                "eval_call",
                "exec_call",
                "base64_decode",
                "rm_rf",
                "powershell",
                "http"
            ]
        );
        // Compiled only once.
        assert!(std::ptr::eq(builtin(), builtin()));
    }

    #[test]
    fn builtin_matches() {
        let lines = [
            "import base64",
            "code = base64.b64decode(payload)",
            "exec(code)",
            "os.system('rm -rf /tmp/x')",
            "url = 'http://evil.example'",
            "https://fine.example",
        ];

        let matches = scan_lines(builtin(), lines);

        assert_eq!(
            matches
                .iter()
                .map(|m| (m.line_no, m.signature.as_str(), m.data.as_str()))
                .collect::<Vec<_>>(),
            vec![
                (2, "base64_decode", "base64.b64decode("),
                (3, "exec_call", "exec("),
                (4, "rm_rf", "rm -rf"),
                (5, "http", "http://"),
            ]
        );
    }

    #[test]
    fn descriptions() {
        assert_eq!(
            description("rm_rf"),
            "Detects destructive file deletion commands"
        );
        assert_eq!(description("unknown"), DEFAULT_DESCRIPTION);

        let def = SignatureDef {
            name: "http".to_string(),
            pattern: "http://".to_string(),
            description: None,
        };

        assert_eq!(
            def.description(),
            "Detects HTTP URLs (potential C&C communication)"
        );

        assert_eq!(builtin_defs().len(), BUILTIN_SIGNATURES.len());
    }

    #[test]
    fn compile_definitions() {
        let defs = vec![
            SignatureDef {
                name: "a".to_string(),
                pattern: "a(b|c)".to_string(),
                description: None,
            },
            SignatureDef {
                name: "b".to_string(),
                pattern: "(".to_string(),
                description: None,
            },
        ];

        assert_eq!(compile_defs(&defs[..1]).unwrap()[0].name(), "a");
        assert_eq!(compile_defs(&defs).unwrap_err().signature_name(), "b");
    }
}
