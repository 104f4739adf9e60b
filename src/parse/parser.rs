use crate::types::{BinaryOp, Expr, Limits, UnaryOp};

use super::error::ParseError;
use super::lexer::{Token, TokenKind};

/// Precedence-climbing parser over a token slice.
///
/// Recursion only happens on nesting (parentheses and prefix operators),
/// which is bounded by [`Limits::max_depth`]. Operator chains are folded in
/// loops; each production returns its subtree's height so the finished tree
/// stays within [`Limits::max_height`].
struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    depth: usize,
    limits: Limits,
}

type Parsed = Result<(Expr, usize), ParseError>;

impl<'t, 'a> Parser<'t, 'a> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, Token::end)
    }

    fn offset(&self) -> usize {
        self.peek().map_or_else(|| self.end_offset(), |t| t.offset)
    }

    /// Error for the current position. Unrecognized characters are reported
    /// as such rather than as a generic syntax error.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Unexpected(character),
                offset,
                ..
            }) => ParseError::UnexpectedCharacter {
                character: *character,
                offset: *offset,
            },
            Some(token) => ParseError::Syntax {
                offset: token.offset,
                expected,
                found: Some(token.text.to_owned()),
            },
            None => ParseError::Syntax {
                offset: self.end_offset(),
                expected,
                found: None,
            },
        }
    }

    fn check_height(&self, height: usize, offset: usize) -> Result<usize, ParseError> {
        if height > self.limits.max_height {
            return Err(ParseError::ExpressionTooComplex {
                limit: self.limits.max_height,
                offset,
            });
        }
        Ok(height)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(ParseError::ExpressionTooComplex {
                limit: self.limits.max_depth,
                offset: self.offset(),
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: (Expr, usize),
        right: (Expr, usize),
        offset: usize,
    ) -> Parsed {
        let height = self.check_height(1 + left.1.max(right.1), offset)?;
        Ok((Expr::Binary(op, Box::new(left.0), Box::new(right.0)), height))
    }

    // -- Grammar (lowest to highest precedence) -----------------------------

    fn or_expr(&mut self) -> Parsed {
        let mut left = self.and_expr()?;
        while let Some(TokenKind::Or) = self.peek_kind() {
            let offset = self.offset();
            self.pos += 1;
            let right = self.and_expr()?;
            left = self.binary(BinaryOp::Or, left, right, offset)?;
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Parsed {
        let mut left = self.not_expr()?;
        while let Some(TokenKind::And) = self.peek_kind() {
            let offset = self.offset();
            self.pos += 1;
            let right = self.not_expr()?;
            left = self.binary(BinaryOp::And, left, right, offset)?;
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Parsed {
        if let Some(TokenKind::Not) = self.peek_kind() {
            let offset = self.offset();
            self.pos += 1;
            self.enter()?;
            let (inner, h) = self.not_expr()?;
            self.leave();
            let height = self.check_height(h + 1, offset)?;
            return Ok((Expr::Unary(UnaryOp::Not, Box::new(inner)), height));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Parsed {
        let left = self.additive()?;
        let Some(TokenKind::Compare(op)) = self.peek_kind() else {
            return Ok(left);
        };
        let op = *op;
        let offset = self.offset();
        self.pos += 1;
        let right = self.additive()?;
        if let Some(TokenKind::Compare(_)) = self.peek_kind() {
            return Err(self.unexpected("'and', 'or' or end of comparison"));
        }
        let height = self.check_height(1 + left.1.max(right.1), offset)?;
        Ok((
            Expr::Compare(op, Box::new(left.0), Box::new(right.0)),
            height,
        ))
    }

    fn additive(&mut self) -> Parsed {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            let offset = self.offset();
            self.pos += 1;
            let right = self.multiplicative()?;
            left = self.binary(op, left, right, offset)?;
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Parsed {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => break,
            };
            let offset = self.offset();
            self.pos += 1;
            let right = self.unary()?;
            left = self.binary(op, left, right, offset)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> Parsed {
        if let Some(TokenKind::Minus) = self.peek_kind() {
            let offset = self.offset();
            self.pos += 1;
            self.enter()?;
            let (inner, h) = self.unary()?;
            self.leave();
            let height = self.check_height(h + 1, offset)?;
            return Ok((Expr::Unary(UnaryOp::Neg, Box::new(inner)), height));
        }
        self.primary()
    }

    fn primary(&mut self) -> Parsed {
        let Some(token) = self.peek() else {
            return Err(self.unexpected("expression"));
        };
        let expr = match &token.kind {
            TokenKind::Number(n) => Expr::Number(*n),
            TokenKind::Bool(b) => Expr::Bool(*b),
            TokenKind::Ident => Expr::Var(token.text.to_owned()),
            TokenKind::LParen => {
                self.pos += 1;
                self.enter()?;
                let inner = self.or_expr()?;
                self.leave();
                if let Some(TokenKind::RParen) = self.peek_kind() {
                    self.pos += 1;
                    return Ok(inner);
                }
                return Err(self.unexpected("')'"));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.pos += 1;
        Ok((expr, 0))
    }
}

/// Parse a token sequence into an expression tree using the given limits.
///
/// # Errors
///
/// Returns [`ParseError`] when the tokens do not form exactly one complete
/// expression, when they contain an unrecognized character, when nesting
/// exceeds `limits.max_depth`, or when the tree would be taller than
/// `limits.max_height`.
pub fn parse_with(tokens: &[Token<'_>], limits: &Limits) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        limits: *limits,
    };
    let (expr, _) = parser.or_expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("operator or end of input"));
    }
    Ok(expr)
}
