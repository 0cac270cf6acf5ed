use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Token type for dice formulas.
///
/// A whole dice term (`3d6kh1`, `d20`, `2d6x`) is a single token; its
/// pieces are split apart by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// Integer literal.
    Integer(i64),
    /// Dice term, stored as its source text.
    Dice(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Dice(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]*[dD][0-9]+((kh|KH)[0-9]*|[xX][0-9]*)*")]
    Dice,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input.
    pub span: Range<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Lex a formula into `(Token, Span)` pairs, collecting every error.
pub fn lex(source: &str) -> (Vec<(Token, Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::Plus => Token::Plus,
                    RawToken::Minus => Token::Minus,
                    RawToken::Integer => match lexer.slice().parse::<i64>() {
                        Ok(n) => Token::Integer(n),
                        Err(_) => {
                            errors.push(LexError {
                                span: span.clone(),
                                message: format!("integer out of range: {}", lexer.slice()),
                            });
                            continue;
                        }
                    },
                    RawToken::Dice => Token::Dice(lexer.slice().to_lowercase()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
            }
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        let (tokens, errors) = lex(source);
        assert!(errors.is_empty(), "errors: {errors:?}");
        tokens.iter().map(|(t, _)| t.to_string()).collect()
    }

    #[test]
    fn lex_attack_formula() {
        assert_eq!(kinds("1d20 + 2 + 3d6kh1"), vec!["1d20", "+", "2", "+", "3d6kh1"]);
    }

    #[test]
    fn lex_without_spaces() {
        assert_eq!(kinds("1d20+0-1d6"), vec!["1d20", "+", "0", "-", "1d6"]);
    }

    #[test]
    fn lex_modifiers_and_case() {
        assert_eq!(kinds("2D6xKH2"), vec!["2d6xkh2"]);
        assert_eq!(kinds("d20"), vec!["d20"]);
    }

    #[test]
    fn lex_reports_bad_characters() {
        let (_, errors) = lex("1d20 * 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].span, 5..6);
    }
}
