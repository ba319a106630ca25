/*! A signature-based scanner for malicious patterns in text.

Signatures are named patterns written in a small regular-expression language
(literals, union, concatenation, Kleene star and grouping, see [`re`]). Each
pattern is compiled into a deterministic finite automaton (DFA) by building a
non-deterministic one with Thompson's construction and applying the subset
construction to it. The compiled signatures are then used for scanning text
line by line, reporting every match together with its line number, offsets
and the matching text.

There are two main types in this crate: [`Compiler`] and [`Scanner`]. A
compiler takes pairs of signature names and patterns and produces
[`CompiledSignature`]s, which are passed to the scanner for scanning text or
files. Compiled signatures are immutable and can be shared by any number of
scanners.

# Example

```rust
# use sigscan;
// Compile some signatures.
let signatures = sigscan::compile_signatures([
    ("eval_call", r"eval\("),
    ("rm_rf", "rm -rf"),
]).unwrap();

// Create a scanner that uses the compiled signatures.
let scanner = sigscan::Scanner::new(&signatures);

// Scan some text.
let results = scanner.scan("x = eval(y)\nos.system('rm -rf /')\n");

assert_eq!(results.matches().len(), 2);
assert_eq!(results.risk_level(), sigscan::RiskLevel::Low);
```
*/

pub use compiler::compile_signatures;
pub use compiler::CompiledSignature;
pub use compiler::Compiler;
pub use compiler::Error;

pub use scanner::scan_line;
pub use scanner::scan_lines;
pub use scanner::scan_source;
pub use scanner::Match;
pub use scanner::RiskLevel;
pub use scanner::ScanError;
pub use scanner::ScanResults;
pub use scanner::Scanner;

pub use signatures::SignatureDef;

pub mod re;
pub mod signatures;

mod compiler;
mod scanner;

#[cfg(test)]
mod tests;
