use std::fmt::{Display, Formatter};

use crate::re::Error;

/// A token in a pattern.
///
/// Operators have their own variants, any other character is a
/// [`Token::Literal`]. A character that follows a backslash is always a
/// literal, even if it is an operator character.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Token {
    /// A literal symbol. `escaped` is true if the symbol was preceded by
    /// a backslash in the pattern.
    Literal { symbol: char, escaped: bool },
    /// `|`
    Union,
    /// `.`, either written explicitly or inserted by
    /// [`crate::re::postfix::insert_concat`].
    Concat,
    /// `*`
    Star,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
}

impl Token {
    /// Creates a literal token for a symbol that was not escaped.
    pub fn literal(symbol: char) -> Self {
        Self::Literal { symbol, escaped: false }
    }

    /// Creates a literal token for a symbol that was escaped.
    pub fn escaped(symbol: char) -> Self {
        Self::Literal { symbol, escaped: true }
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Returns true if the token can be the last one in a sub-expression.
    #[inline]
    pub(crate) fn ends_expr(&self) -> bool {
        matches!(self, Self::Literal { .. } | Self::RightParen | Self::Star)
    }

    /// Returns true if the token can be the first one in a sub-expression.
    #[inline]
    pub(crate) fn starts_expr(&self) -> bool {
        matches!(self, Self::Literal { .. } | Self::LeftParen)
    }

    /// Operator precedence used by the shunting-yard algorithm. Literals and
    /// parentheses have precedence 0.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Star => 3,
            Self::Concat => 2,
            Self::Union => 1,
            Self::Literal { .. } | Self::LeftParen | Self::RightParen => 0,
        }
    }

    /// The character that represents an operator in the pattern syntax.
    pub(crate) fn operator_char(&self) -> Option<char> {
        match self {
            Self::Union => Some('|'),
            Self::Concat => Some('.'),
            Self::Star => Some('*'),
            Self::LeftParen => Some('('),
            Self::RightParen => Some(')'),
            Self::Literal { .. } => None,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal { symbol, escaped: true } => {
                write!(f, "\\{}", symbol)
            }
            Self::Literal { symbol, escaped: false } => {
                write!(f, "{}", symbol)
            }
            op => write!(f, "{}", op.operator_char().unwrap_or_default()),
        }
    }
}

/// Splits a pattern into tokens.
///
/// Each character is a token, except backslashes, which are consumed
/// together with the character that follows them, producing an escaped
/// literal.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, Error> {
    if pattern.is_empty() {
        return Err(Error::EmptyPattern);
    }

    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        let token = match c {
            '\\' => match chars.next() {
                Some(escaped) => Token::escaped(escaped),
                None => return Err(Error::TrailingEscape),
            },
            '|' => Token::Union,
            '.' => Token::Concat,
            '*' => Token::Star,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            c => Token::literal(c),
        };
        tokens.push(token);
    }

    Ok(tokens)
}
