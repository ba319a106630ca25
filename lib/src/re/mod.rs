/*! This module parses and compiles the patterns used by signatures.

The pattern language is deliberately small. It has literal symbols and only
three operators:

- `|` union (alternation),
- `.` concatenation,
- `*` Kleene star,

plus parentheses for grouping and `\` for escaping. Notice that `.` is **not**
a wildcard matching any character as in most regexp dialects, it is an
explicit concatenation operator. `a.b` matches the string `ab`, exactly like
`ab` does. A literal dot must be written as `\.`, and the same applies to any
other operator character that must be matched literally (`\*`, `\|`, `\(`,
`\)`, `\\`).

Compiling a pattern goes through these stages:

1. The [`tokenizer`] splits the pattern into [`tokenizer::Token`]s.
2. The [`postfix`] converter makes concatenation explicit and reorders the
   tokens in postfix order with the shunting-yard algorithm.
3. The [`nfa`] builder consumes the postfix tokens and builds an NFA with
   epsilon transitions using [Thompson's construction][1].
4. The [`dfa`] compiler determinizes the NFA using the
   [subset construction][2] algorithm.

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://en.wikipedia.org/wiki/Powerset_construction
*/

use thiserror::Error;

pub mod dfa;
pub mod nfa;
pub mod postfix;
pub mod tokenizer;


/// Errors returned while compiling a pattern.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The pattern is an empty string.
    #[error("empty pattern")]
    EmptyPattern,

    /// The pattern ends with a backslash that doesn't escape anything.
    #[error("trailing backslash in pattern")]
    TrailingEscape,

    /// A `)` without a matching `(`, or a `(` that is never closed.
    #[error("unbalanced parentheses in pattern")]
    UnbalancedParentheses,

    /// An operator doesn't have enough operands. `|` and `.` need two
    /// operands, `*` needs one.
    #[error(
        "operator `{operator}` expects {expected} operand(s), found {found}"
    )]
    OperatorArity { operator: char, expected: usize, found: usize },

    /// The postfix expression didn't reduce to exactly one automaton.
    #[error(
        "could not reduce pattern to a single automaton \
         ({fragments} fragments left)"
    )]
    MalformedExpression { fragments: usize },
}
