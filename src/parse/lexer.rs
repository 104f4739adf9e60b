use winnow::ascii::digit1;
use winnow::combinator::{alt, opt};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use crate::CompareOp;

/// The lexical category of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal; a leading `-` is folded in when it cannot be a
    /// binary minus (start of input, or after an operator or `(`).
    Number(f64),
    Bool(bool),
    Ident,
    Plus,
    Minus,
    Star,
    Slash,
    Compare(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
    /// A character outside the formula alphabet. Kept as a token so the
    /// parser can report it with its exact position.
    Unexpected(char),
}

/// A lexical unit borrowed from the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl TokenKind {
    /// Whether a token of this kind can end an operand. A `-` after such a
    /// token is a binary minus, never a sign.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Number(_) | TokenKind::Bool(_) | TokenKind::Ident | TokenKind::RParen
        )
    }
}

impl Token<'_> {
    /// Byte offset just past the end of this token.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

// -- Whitespace -------------------------------------------------------------

fn ws<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(0.., char::is_whitespace).parse_next(input)
}

// -- Literals and words -----------------------------------------------------

fn number(input: &mut &str) -> ModalResult<f64> {
    (digit1, opt(('.', digit1)))
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn signed_number(input: &mut &str) -> ModalResult<f64> {
    ('-', digit1, opt(('.', digit1)))
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn classify_word(word: &str) -> TokenKind {
    match word {
        "true" => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        w if w.eq_ignore_ascii_case("and") => TokenKind::And,
        w if w.eq_ignore_ascii_case("or") => TokenKind::Or,
        w if w.eq_ignore_ascii_case("not") => TokenKind::Not,
        _ => TokenKind::Ident,
    }
}

fn word(input: &mut &str) -> ModalResult<TokenKind> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(classify_word)
        .parse_next(input)
}

// -- Operators --------------------------------------------------------------

fn comparator(input: &mut &str) -> ModalResult<TokenKind> {
    alt((
        "<=".value(TokenKind::Compare(CompareOp::Lte)),
        "<".value(TokenKind::Compare(CompareOp::Lt)),
        ">=".value(TokenKind::Compare(CompareOp::Gte)),
        ">".value(TokenKind::Compare(CompareOp::Gt)),
        "==".value(TokenKind::Compare(CompareOp::Eq)),
        "!=".value(TokenKind::Compare(CompareOp::Neq)),
    ))
    .parse_next(input)
}

fn punctuation(input: &mut &str) -> ModalResult<TokenKind> {
    alt((
        "&&".value(TokenKind::And),
        "||".value(TokenKind::Or),
        '!'.value(TokenKind::Not),
        '+'.value(TokenKind::Plus),
        '-'.value(TokenKind::Minus),
        '*'.value(TokenKind::Star),
        '/'.value(TokenKind::Slash),
        '('.value(TokenKind::LParen),
        ')'.value(TokenKind::RParen),
    ))
    .parse_next(input)
}

fn token_kind(input: &mut &str, allow_sign: bool) -> ModalResult<TokenKind> {
    if allow_sign {
        let checkpoint = *input;
        if let Ok(n) = signed_number(input) {
            return Ok(TokenKind::Number(n));
        }
        *input = checkpoint;
    }
    // `!=` must be tried before the lone `!`.
    alt((number.map(TokenKind::Number), word, comparator, punctuation)).parse_next(input)
}

// -- Entry point ------------------------------------------------------------

/// Split `source` into tokens in a single left-to-right pass.
///
/// Never fails: characters outside the formula alphabet become
/// [`TokenKind::Unexpected`] tokens at their source offset.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut input = source;
    let mut tokens: Vec<Token<'_>> = Vec::new();

    loop {
        let _ = ws(&mut input);
        if input.is_empty() {
            break;
        }

        let offset = source.len() - input.len();
        let allow_sign = tokens.last().map_or(true, |t| !t.kind.ends_operand());
        let start = input;

        let kind = match token_kind(&mut input, allow_sign) {
            Ok(kind) => kind,
            Err(_) => {
                let mut chars = start.chars();
                let Some(c) = chars.next() else { break };
                input = chars.as_str();
                TokenKind::Unexpected(c)
            }
        };

        let end = source.len() - input.len();
        tokens.push(Token {
            kind,
            text: &source[offset..end],
            offset,
        });
    }

    tokens
}
