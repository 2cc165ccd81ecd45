//! Recursive-descent parser for the formula language.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := power (('*' | '/' | '%') power)*
//! power   := unary ('^' power)?          // right-associative
//! unary   := '-' unary | atom
//! atom    := NUMBER | call | field | '(' expr ')'
//! call    := FUNC '(' expr (',' expr)* ')'
//! field   := IDENT ('.' IDENT)*
//! ```
//!
//! Only whitelisted function names are accepted; an unknown identifier
//! followed by `(` is rejected at parse time with a nearest-name
//! suggestion. Bare identifiers become field references, checked later
//! against the field catalog by `validate`.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::ast::{BinOp, Expr, Func, FUNC_NAMES};
use crate::error::SyntaxError;
use crate::lexer::{lex, Spanned, Token};
use crate::path::FieldPath;

/// Parse formula text into an expression tree.
pub fn parse(src: &str) -> Result<Expr, SyntaxError> {
    let tokens = lex(src)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: &Token) -> bool {
        if &self.peek().token == token {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SyntaxError> {
        let found = self.peek();
        if found.token == token {
            self.bump();
            Ok(())
        } else {
            Err(SyntaxError::new(
                found.pos,
                format!("expected {}, found {}", what, found.token.describe()),
            ))
        }
    }

    fn expect_eof(&mut self) -> Result<(), SyntaxError> {
        let found = self.peek();
        match found.token {
            Token::Eof => Ok(()),
            Token::RParen => Err(SyntaxError::new(found.pos, "unmatched ')'")),
            _ => Err(SyntaxError::new(
                found.pos,
                format!("unexpected {} after formula", found.token.describe()),
            )),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek().token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.peek().token {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Rem,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_power()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_unary()?;
        if self.eat(&Token::Caret) {
            // Right-associative: 2^3^2 = 2^(3^2)
            let exp = self.parse_power()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exp),
            });
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let found = self.peek().clone();
        match &found.token {
            Token::Number(text) => {
                self.bump();
                let value = Decimal::from_str(text).map_err(|_| {
                    SyntaxError::new(found.pos, format!("invalid number '{}'", text))
                })?;
                Ok(Expr::Number(value))
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            Token::Ident(name) => {
                self.bump();
                if self.peek().token == Token::LParen {
                    self.parse_call(name, found.pos)
                } else {
                    self.parse_field(name.clone(), found.pos)
                }
            }
            other => Err(SyntaxError::new(
                found.pos,
                format!("expected a number, field, or function, found {}", other.describe()),
            )),
        }
    }

    fn parse_call(&mut self, name: &str, name_pos: usize) -> Result<Expr, SyntaxError> {
        let func = match Func::from_name(name) {
            Some(f) => f,
            None => {
                let err = match nearest_function(name) {
                    Some(near) => SyntaxError::with_suggestion(
                        name_pos,
                        format!("unknown function '{}'", name),
                        near,
                    ),
                    None => SyntaxError::new(name_pos, format!("unknown function '{}'", name)),
                };
                return Err(err);
            }
        };
        self.expect(Token::LParen, "'('")?;
        let mut args = vec![self.parse_expr()?];
        while self.eat(&Token::Comma) {
            args.push(self.parse_expr()?);
        }
        let close_pos = self.peek().pos;
        self.expect(Token::RParen, "')'")?;

        let (min, max) = func.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                format!("{}", min)
            } else if max == usize::MAX {
                format!("at least {}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(SyntaxError::new(
                close_pos,
                format!(
                    "{}() takes {} argument(s), got {}",
                    func.name(),
                    expected,
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call { func, args })
    }

    fn parse_field(&mut self, first: String, pos: usize) -> Result<Expr, SyntaxError> {
        let mut text = first;
        while self.eat(&Token::Dot) {
            let seg = self.peek().clone();
            match &seg.token {
                Token::Ident(name) => {
                    self.bump();
                    text.push('.');
                    text.push_str(name);
                }
                other => {
                    return Err(SyntaxError::new(
                        seg.pos,
                        format!("expected field segment after '.', found {}", other.describe()),
                    ));
                }
            }
        }
        let path = FieldPath::parse(&text).map_err(|msg| SyntaxError::new(pos, msg))?;
        Ok(Expr::Field(path))
    }
}

/// Closest whitelisted function name within edit distance 2.
fn nearest_function(name: &str) -> Option<String> {
    FUNC_NAMES
        .iter()
        .map(|cand| (edit_distance(name, cand), *cand))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, cand)| cand.to_string())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_mul_over_add() {
        let e = parse("1 + 2 * 3").unwrap();
        match e {
            Expr::Binary { op: BinOp::Add, rhs, .. } => match *rhs {
                Expr::Binary { op: BinOp::Mul, .. } => {}
                other => panic!("expected mul on the right, got {:?}", other),
            },
            other => panic!("expected add at the top, got {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let e = parse("2 ^ 3 ^ 2").unwrap();
        match e {
            Expr::Binary { op: BinOp::Pow, rhs, .. } => match *rhs {
                Expr::Binary { op: BinOp::Pow, .. } => {}
                other => panic!("expected pow on the right, got {:?}", other),
            },
            other => panic!("expected pow at the top, got {:?}", other),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_mul() {
        let e = parse("-ram_gb * 2").unwrap();
        match e {
            Expr::Binary { op: BinOp::Mul, lhs, .. } => match *lhs {
                Expr::Neg(_) => {}
                other => panic!("expected negation on the left, got {:?}", other),
            },
            other => panic!("expected mul at the top, got {:?}", other),
        }
    }

    #[test]
    fn parses_dotted_field_reference() {
        let e = parse("ram_spec.ddr_generation").unwrap();
        match e {
            Expr::Field(p) => assert_eq!(p.to_string(), "ram_spec.ddr_generation"),
            other => panic!("expected field ref, got {:?}", other),
        }
    }

    #[test]
    fn unknown_function_rejected_with_suggestion() {
        let err = parse("rond(ram_gb)").unwrap_err();
        assert!(err.message.contains("unknown function 'rond'"));
        assert_eq!(err.suggestion.as_deref(), Some("round"));
        assert_eq!(err.position, 0);
    }

    #[test]
    fn bare_identifier_is_a_field_not_an_error() {
        // Field existence is validate()'s concern, not the parser's
        assert!(parse("unheard_of_field + 1").is_ok());
    }

    #[test]
    fn arity_checked_at_parse_time() {
        let err = parse("clamp(ram_gb, 0)").unwrap_err();
        assert!(err.message.contains("clamp() takes 3 argument(s), got 2"));
        assert!(parse("min(1, 2, 3, 4)").is_ok());
        assert!(parse("abs(1, 2)").is_err());
    }

    #[test]
    fn unbalanced_parens_report_position() {
        let err = parse("(1 + 2").unwrap_err();
        assert!(err.message.contains("expected ')'"));
        let err = parse("1 + 2)").unwrap_err();
        assert_eq!(err.message, "unmatched ')'");
        assert_eq!(err.position, 5);
    }

    #[test]
    fn empty_formula_is_an_error() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn trailing_operator_is_an_error() {
        let err = parse("ram_gb *").unwrap_err();
        assert!(err.message.contains("expected a number, field, or function"));
    }
}
