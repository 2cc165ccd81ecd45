use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers — function names and field path segments
    Ident(String),
    /// Numeric literal — kept as string to preserve exact representation
    Number(String),
    // Punctuation
    LParen,
    RParen,
    Comma,
    Dot,
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    // End of input
    Eof,
}

impl Token {
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier '{}'", s),
            Token::Number(s) => format!("number '{}'", s),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::Eof => "end of formula".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    /// Character offset of the token's first character.
    pub pos: usize,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let tok_pos = pos;

        // Numeric literal: digits with an optional single decimal point
        if c.is_ascii_digit() {
            let mut s = String::new();
            let mut seen_dot = false;
            while pos < chars.len() {
                let nc = chars[pos];
                if nc.is_ascii_digit() {
                    s.push(nc);
                    pos += 1;
                } else if nc == '.' && !seen_dot && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit() {
                    seen_dot = true;
                    s.push(nc);
                    pos += 1;
                } else {
                    break;
                }
            }
            tokens.push(Spanned {
                token: Token::Number(s),
                pos: tok_pos,
            });
            continue;
        }

        // Identifier
        if c.is_ascii_alphabetic() || c == '_' {
            let mut s = String::new();
            while pos < chars.len() {
                let nc = chars[pos];
                if nc.is_ascii_alphanumeric() || nc == '_' {
                    s.push(nc);
                    pos += 1;
                } else {
                    break;
                }
            }
            tokens.push(Spanned {
                token: Token::Ident(s),
                pos: tok_pos,
            });
            continue;
        }

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            other => {
                return Err(SyntaxError::new(
                    tok_pos,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        tokens.push(Spanned { token, pos: tok_pos });
        pos += 1;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        pos: chars.len(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("ram_gb * 2.5"),
            vec![
                Token::Ident("ram_gb".to_string()),
                Token::Star,
                Token::Number("2.5".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn lexes_dotted_field_and_call() {
        assert_eq!(
            kinds("min(cpu.mark, 100)"),
            vec![
                Token::Ident("min".to_string()),
                Token::LParen,
                Token::Ident("cpu".to_string()),
                Token::Dot,
                Token::Ident("mark".to_string()),
                Token::Comma,
                Token::Number("100".to_string()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn number_does_not_swallow_trailing_dot() {
        // `2.` is a number then a stray dot, not "2."
        assert_eq!(
            kinds("2.x"),
            vec![
                Token::Number("2".to_string()),
                Token::Dot,
                Token::Ident("x".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn reports_position_of_bad_char() {
        let err = lex("a + $b").unwrap_err();
        assert_eq!(err.position, 4);
        assert!(err.message.contains("'$'"));
    }
}
