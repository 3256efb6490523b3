//! Tokenizer for one shorthand argument using logos

use logos::Logos;
use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Relation symbols (longer patterns first)
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("==")]
    #[token("=")]
    Equals,

    // Modifier characters
    #[token("@")]
    At,
    #[token("%")]
    Percent,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("$")]
    Dollar,
    #[token("!")]
    Bang,

    // Separates a peer id from the peer's attribute
    #[token(".")]
    Dot,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // A leading digit needs a letter later on; all-digit runs stay numbers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string())]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LessOrEqual => f.write_str("'<='"),
            Token::GreaterOrEqual => f.write_str("'>='"),
            Token::Equals => f.write_str("'='"),
            Token::At => f.write_str("'@'"),
            Token::Percent => f.write_str("'%'"),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Lt => f.write_str("'<'"),
            Token::Gt => f.write_str("'>'"),
            Token::Star => f.write_str("'*'"),
            Token::Slash => f.write_str("'/'"),
            Token::Dollar => f.write_str("'$'"),
            Token::Bang => f.write_str("'!'"),
            Token::Dot => f.write_str("'.'"),
            Token::Number(n) => write!(f, "number {}", n),
            Token::Word(w) => write!(f, "name '{}'", w),
        }
    }
}

/// Lex input string into tokens with spans.
///
/// Characters that match no token are dropped; use [`invalid_spans`] to find them.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Spans of characters the lexer cannot tokenize
pub fn invalid_spans(input: &str) -> Vec<Span> {
    Token::lexer(input)
        .spanned()
        .filter(|(tok, _)| tok.is_err())
        .map(|(_, span)| span)
        .collect()
}
