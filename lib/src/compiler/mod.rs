/*! Compiles signatures into deterministic automata.

Signatures must be compiled before they can be used for scanning. Compiling
a signature consists in tokenizing its pattern, converting the tokens to
postfix notation, building a NFA with Thompson's construction and finally
converting the NFA into a DFA. See [`crate::re`] for details.

Compilation is fail-fast: the first invalid pattern aborts the whole batch,
so a partial set of signatures is never produced.
*/

use rustc_hash::FxHashSet;
#[cfg(feature = "logging")]
use log::*;
#[cfg(feature = "logging")]
use std::time::Instant;

use crate::re::dfa::{nfa_to_dfa, Dfa};
use crate::re::nfa::regex_to_nfa;

#[doc(inline)]
pub use crate::compiler::errors::*;

mod errors;

#[cfg(test)]
mod tests;

/// A signature with its pattern compiled into a DFA.
///
/// Compiled signatures are immutable, they can be shared among multiple
/// threads and used by any number of concurrent scans.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    name: String,
    pattern: String,
    dfa: Dfa,
}

impl CompiledSignature {
    /// Compiles a single signature.
    pub fn new(name: &str, pattern: &str) -> Result<Self, Error> {
        let err = |source| Error::SignatureCompilation {
            name: name.to_string(),
            pattern: pattern.to_string(),
            source,
        };

        let nfa = regex_to_nfa(pattern).map_err(err)?;
        let dfa = nfa_to_dfa(&nfa);

        #[cfg(feature = "logging")]
        debug!(
            "signature `{}`: NFA with {} states and {} transitions, \
             DFA with {} states and {} transitions",
            name,
            nfa.num_states(),
            nfa.num_transitions(),
            dfa.num_states(),
            dfa.num_transitions(),
        );

        Ok(Self { name: name.to_string(), pattern: pattern.to_string(), dfa })
    }

    /// Name of the signature.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Pattern of the signature, as it was written.
    #[inline]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The DFA for the signature's pattern.
    #[inline]
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}

/// Compiles signatures.
///
/// # Example
///
/// ```
/// # use sigscan::Compiler;
/// let mut compiler = Compiler::new();
///
/// compiler
///     .add_signature("eval_call", r"eval\(")?
///     .add_signature("rm_rf", "rm -rf")?;
///
/// let signatures = compiler.build();
/// assert_eq!(signatures.len(), 2);
/// # Ok::<(), sigscan::Error>(())
/// ```
#[derive(Default)]
pub struct Compiler {
    signatures: Vec<CompiledSignature>,
    names: FxHashSet<String>,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a signature and adds it to the set of compiled signatures.
    ///
    /// Signature names must be unique.
    pub fn add_signature(
        &mut self,
        name: &str,
        pattern: &str,
    ) -> Result<&mut Self, Error> {
        if self.names.contains(name) {
            return Err(Error::DuplicateSignature { name: name.to_string() });
        }

        self.signatures.push(CompiledSignature::new(name, pattern)?);
        self.names.insert(name.to_string());

        Ok(self)
    }

    /// Number of signatures added so far.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Returns the compiled signatures, in the order they were added.
    pub fn build(self) -> Vec<CompiledSignature> {
        self.signatures
    }
}

/// Compiles a set of signatures given as `(name, pattern)` pairs.
///
/// The order of the returned signatures is the iteration order of
/// `signatures`. If any pattern is invalid, the whole compilation fails with
/// an error that identifies the signature.
///
/// # Example
///
/// ```
/// # use sigscan::compile_signatures;
/// let signatures = compile_signatures([
///     ("eval_call", r"eval\("),
///     ("base64_decode", r"base64\.b64decode\("),
/// ])?;
///
/// assert_eq!(signatures[0].name(), "eval_call");
/// assert_eq!(signatures[1].name(), "base64_decode");
/// # Ok::<(), sigscan::Error>(())
/// ```
pub fn compile_signatures<I, N, P>(
    signatures: I,
) -> Result<Vec<CompiledSignature>, Error>
where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<str>,
{
    #[cfg(feature = "logging")]
    let start = Instant::now();

    let mut compiler = Compiler::new();

    for (name, pattern) in signatures {
        compiler.add_signature(name.as_ref(), pattern.as_ref())?;
    }

    #[cfg(feature = "logging")]
    info!(
        "compiled {} signature(s) in {:?}",
        compiler.len(),
        Instant::elapsed(&start)
    );

    Ok(compiler.build())
}
