/*! Scans text looking for signatures.

Text is scanned line by line. For each line and each signature, the
signature's DFA is simulated starting at every position in the line. From
each starting position the DFA consumes symbols until it has no transition
for the next one (or the line ends), and the longest prefix that left the DFA
in an accepting state, if any, is reported as a match. This means that:

- There's at most one match per signature and starting position.
- Matches starting at different positions may overlap, and all of them are
  reported.
- Matches are never empty, an accepting start state alone doesn't produce
  a match.
- Matches of different signatures are independent of each other.

The cost is quadratic in the length of the line, in the worst case, which is
acceptable for line-sized inputs. Callers that need to bound the scanning
time must limit the length of the lines (see [`Scanner::max_line_length`]).

Scanning never fails, and doesn't modify the compiled signatures, which can
be shared by multiple scans running concurrently.
*/

use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use log::*;
use serde::Serialize;
use thiserror::Error;

use crate::compiler::CompiledSignature;
use crate::re::dfa::Dfa;

pub use crate::scanner::matches::Match;

pub(crate) mod matches;


/// Error returned by [`Scanner::scan_file`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScanError {
    /// The file could not be read.
    #[error("can not read `{path}`")]
    OpenError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Returns the length of the longest prefix of `input` accepted by `dfa`,
/// or `None` if no non-empty prefix is accepted.
fn longest_match(dfa: &Dfa, input: &[char]) -> Option<usize> {
    let mut state = dfa.start();
    let mut longest = None;

    for (i, symbol) in input.iter().enumerate() {
        match dfa.step(state, *symbol) {
            Some(next) => state = next,
            None => break,
        }
        if dfa.is_accepting(state) {
            longest = Some(i + 1);
        }
    }

    longest
}

/// Scans a single line with the DFA of some signature.
///
/// `signature` and `pattern` are copied into the returned matches, while
/// `line_no` is the number of the line (starting at 1). Matches are
/// returned in ascending order of starting offset.
pub fn scan_line(
    dfa: &Dfa,
    line: &str,
    signature: &str,
    pattern: &str,
    line_no: usize,
) -> Vec<Match> {
    let symbols: Vec<char> = line.chars().collect();
    let mut matches = Vec::new();

    for start in 0..symbols.len() {
        if let Some(len) = longest_match(dfa, &symbols[start..]) {
            matches.push(Match {
                signature: signature.to_string(),
                pattern: pattern.to_string(),
                line_no,
                range: start..start + len,
                data: symbols[start..start + len].iter().collect(),
            })
        }
    }

    matches
}

/// Scans a sequence of lines with a set of compiled signatures.
///
/// Matches are sorted by line number. Within the same line, all matches of
/// the first signature go first, followed by the matches of the second one,
/// and so on. Trailing newlines at the end of each line are removed before
/// scanning it.
pub fn scan_lines<I, S>(
    signatures: &[CompiledSignature],
    lines: I,
) -> Vec<Match>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut matches = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        let line = line.as_ref().trim_end_matches('\n');
        for signature in signatures {
            matches.append(&mut scan_line(
                signature.dfa(),
                line,
                signature.name(),
                signature.pattern(),
                i + 1,
            ));
        }
    }

    matches
}

/// Splits `text` in lines and scans them with [`scan_lines`].
///
/// Returns the lines, without their line terminators, together with the
/// matches.
pub fn scan_source<'t>(
    signatures: &[CompiledSignature],
    text: &'t str,
) -> (Vec<&'t str>, Vec<Match>) {
    let lines: Vec<&str> = text.lines().collect();
    let matches = scan_lines(signatures, lines.iter());
    (lines, matches)
}

/// How risky some scanned content is, based on the number of matches.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// No matches.
    Safe,
    /// 1 or 2 matches.
    Low,
    /// 3 to 5 matches.
    Medium,
    /// 6 to 10 matches.
    High,
    /// More than 10 matches.
    Critical,
}

impl RiskLevel {
    /// Returns the risk level that corresponds to the given number of
    /// matches.
    pub fn from_num_matches(n: usize) -> Self {
        match n {
            0 => Self::Safe,
            1..=2 => Self::Low,
            3..=5 => Self::Medium,
            6..=10 => Self::High,
            _ => Self::Critical,
        }
    }
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Safe => "safe",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// Results produced by [`Scanner`].
#[derive(Debug)]
pub struct ScanResults {
    lines: Vec<String>,
    matches: Vec<Match>,
}

impl ScanResults {
    /// The scanned lines, without line terminators and after applying the
    /// maximum line length, if any.
    pub fn lines(&self) -> &[String] {
        self.lines.as_slice()
    }

    /// Number of scanned lines.
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Matches found, in the order described in [`scan_lines`].
    pub fn matches(&self) -> &[Match] {
        self.matches.as_slice()
    }

    /// Consumes the results and returns the matches.
    pub fn into_matches(self) -> Vec<Match> {
        self.matches
    }

    /// Risk level according to the number of matches.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_num_matches(self.matches.len())
    }

    /// Returns the number of matches for each signature that matched at
    /// least once, in order of first appearance.
    pub fn matches_per_signature(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for m in &self.matches {
            match counts.iter_mut().find(|(name, _)| *name == m.signature) {
                Some((_, count)) => *count += 1,
                None => counts.push((m.signature.as_str(), 1)),
            }
        }
        counts
    }
}

/// Scans text, files or lines using a set of compiled signatures.
///
/// The scanner borrows the signatures, which can be shared with any number
/// of scanners, even across threads.
///
/// # Example
///
/// ```
/// # use sigscan::{compile_signatures, Scanner};
/// let signatures = compile_signatures([("eval_call", r"eval\(")])?;
/// let scanner = Scanner::new(&signatures);
///
/// let results = scanner.scan("x = 1\neval(code)\n");
///
/// assert_eq!(results.num_lines(), 2);
/// assert_eq!(results.matches().len(), 1);
/// assert_eq!(results.matches()[0].line_no, 2);
/// assert_eq!(results.matches()[0].data, "eval(");
/// # Ok::<(), sigscan::Error>(())
/// ```
pub struct Scanner<'s> {
    signatures: &'s [CompiledSignature],
    max_line_length: Option<usize>,
}

impl<'s> Scanner<'s> {
    /// Creates a new scanner.
    pub fn new(signatures: &'s [CompiledSignature]) -> Self {
        Self { signatures, max_line_length: None }
    }

    /// Sets the maximum length of a line, in characters. Longer lines are
    /// truncated before being scanned. By default there's no limit.
    pub fn max_line_length(mut self, n: usize) -> Self {
        self.max_line_length = Some(n);
        self
    }

    /// Signatures used by this scanner.
    pub fn signatures(&self) -> &'s [CompiledSignature] {
        self.signatures
    }

    /// Scans some text.
    pub fn scan(&self, text: &str) -> ScanResults {
        let lines: Vec<String> = text
            .lines()
            .map(|line| self.truncate(line).to_string())
            .collect();

        let matches = scan_lines(self.signatures, lines.iter());

        #[cfg(feature = "logging")]
        debug!(
            "scanned {} line(s) with {} signature(s), {} match(es)",
            lines.len(),
            self.signatures.len(),
            matches.len()
        );

        ScanResults { lines, matches }
    }

    /// Scans a file.
    ///
    /// The file content is decoded as UTF-8, invalid sequences are replaced
    /// with the replacement character (U+FFFD).
    pub fn scan_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<ScanResults, ScanError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| ScanError::OpenError {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(self.scan(String::from_utf8_lossy(&data).as_ref()))
    }

    fn truncate<'a>(&self, line: &'a str) -> &'a str {
        match self.max_line_length {
            Some(n) => match line.char_indices().nth(n) {
                Some((i, _)) => &line[..i],
                None => line,
            },
            None => line,
        }
    }
}
