/*! Conversion of patterns into postfix notation.

Patterns are converted into postfix (a.k.a. reverse Polish) notation before
building the NFA, as postfix expressions can be evaluated left-to-right with
a single stack, without worrying about precedence or parentheses. For
instance, `a(b|c)*d` is converted into `a b c | * . d .`.
*/

use crate::re::tokenizer::{tokenize, Token};
use crate::re::Error;

/// Inserts explicit [`Token::Concat`] tokens wherever concatenation is
/// implied by juxtaposition.
///
/// A concatenation is inserted between two adjacent tokens when the first
/// one can end a sub-expression (a literal, `)` or `*`) and the second one
/// can start a sub-expression (a literal or `(`). Examples:
///
/// ```text
/// ab      -> a.b
/// a(b|c)  -> a.(b|c)
/// (a|b)c  -> (a|b).c
/// a*b     -> a*.b
/// ```
///
/// Concatenations that are already explicit are left untouched.
pub fn insert_concat(tokens: &[Token]) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len() * 2);

    for (i, token) in tokens.iter().enumerate() {
        result.push(*token);
        if let Some(next) = tokens.get(i + 1) {
            if token.ends_expr() && next.starts_expr() {
                result.push(Token::Concat);
            }
        }
    }

    result
}

/// Tokenizes a pattern and returns its tokens in postfix order.
///
/// This is an implementation of the [shunting-yard][1] algorithm where
/// `*` has higher precedence than `.`, and `.` has higher precedence than
/// `|`. All operators are left-associative.
///
/// [1]: https://en.wikipedia.org/wiki/Shunting_yard_algorithm
pub fn to_postfix(pattern: &str) -> Result<Vec<Token>, Error> {
    let tokens = insert_concat(tokenize(pattern)?.as_slice());

    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Literal { .. } => output.push(token),
            Token::LeftParen => operators.push(token),
            Token::RightParen => loop {
                match operators.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(Error::UnbalancedParentheses),
                }
            },
            Token::Union | Token::Concat | Token::Star => {
                while let Some(top) = operators.last() {
                    if *top == Token::LeftParen
                        || top.precedence() < token.precedence()
                    {
                        break;
                    }
                    output.push(*top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
    }

    while let Some(op) = operators.pop() {
        if matches!(op, Token::LeftParen | Token::RightParen) {
            return Err(Error::UnbalancedParentheses);
        }
        output.push(op);
    }

    Ok(output)
}
