//! Tokenizer for the expression language.

use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    /// Bare identifier or backtick-quoted column name.
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Int(v) => v.to_string(),
            Token::Float(v) => v.to_string(),
            Token::Str(s) => format!("'{s}'"),
            Token::Ident(name) => format!("column '{name}'"),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::Percent => "%".to_string(),
            Token::Eq => "==".to_string(),
            Token::Ne => "!=".to_string(),
            Token::Lt => "<".to_string(),
            Token::Le => "<=".to_string(),
            Token::Gt => ">".to_string(),
            Token::Ge => ">=".to_string(),
        }
    }
}

/// A token and the byte offset where it starts.
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    tokens: Vec<Spanned>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), ExpressionError> {
        while let Some((offset, ch)) = self.chars.next() {
            let token = match ch {
                c if c.is_whitespace() => continue,
                '(' => Token::LParen,
                ')' => Token::RParen,
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '%' => Token::Percent,
                '=' => {
                    self.expect('=', offset, '=')?;
                    Token::Eq
                }
                '!' => {
                    if self.eat('=') {
                        Token::Ne
                    } else {
                        Token::Not
                    }
                }
                '<' => {
                    if self.eat('=') {
                        Token::Le
                    } else {
                        Token::Lt
                    }
                }
                '>' => {
                    if self.eat('=') {
                        Token::Ge
                    } else {
                        Token::Gt
                    }
                }
                '&' => {
                    self.expect('&', offset, '&')?;
                    Token::And
                }
                '|' => {
                    self.expect('|', offset, '|')?;
                    Token::Or
                }
                '\'' | '"' => Token::Str(self.string(ch, offset)?),
                '`' => Token::Ident(self.quoted_ident(offset)?),
                c if c.is_ascii_digit() || c == '.' => self.number(offset)?,
                c if c.is_alphabetic() || c == '_' => self.word(offset),
                c => return Err(ExpressionError::UnexpectedChar { ch: c, offset }),
            };
            self.tokens.push((token, offset));
        }
        Ok(())
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.chars.peek().is_some_and(|(_, c)| *c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    /// Requires the second character of a two-character operator.
    fn expect(
        &mut self,
        expected: char,
        offset: usize,
        first: char,
    ) -> Result<(), ExpressionError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedChar { ch: first, offset })
        }
    }

    fn string(&mut self, quote: char, offset: usize) -> Result<String, ExpressionError> {
        let mut value = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                c if c == quote => return Ok(value),
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, other)) => value.push(other),
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(ExpressionError::Unterminated {
            what: "string",
            offset,
        })
    }

    fn quoted_ident(&mut self, offset: usize) -> Result<String, ExpressionError> {
        let mut name = String::new();
        for (_, ch) in self.chars.by_ref() {
            if ch == '`' {
                return Ok(name);
            }
            name.push(ch);
        }
        Err(ExpressionError::Unterminated {
            what: "column name",
            offset,
        })
    }

    /// Byte offset just past the last consumed character.
    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map_or(self.source.len(), |(offset, _)| *offset)
    }

    fn number(&mut self, start: usize) -> Result<Token, ExpressionError> {
        let mut is_float = self.source[start..].starts_with('.');
        loop {
            match self.chars.peek().map(|(_, c)| *c) {
                Some(c) if c.is_ascii_digit() => {}
                Some('.') if !is_float => is_float = true,
                Some('e' | 'E') => {
                    is_float = true;
                    self.chars.next();
                    if self.chars.peek().is_some_and(|(_, c)| *c == '+' || *c == '-') {
                        self.chars.next();
                    }
                    continue;
                }
                _ => break,
            }
            self.chars.next();
        }
        let end = self.position();
        let text = &self.source[start..end];
        let invalid = || ExpressionError::InvalidNumber(text.to_string());
        if is_float {
            text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            match text.parse::<i64>() {
                Ok(v) => Ok(Token::Int(v)),
                Err(_) => text.parse::<f64>().map(Token::Float).map_err(|_| invalid()),
            }
        }
    }

    fn word(&mut self, start: usize) -> Token {
        while self
            .chars
            .peek()
            .is_some_and(|(_, c)| c.is_alphanumeric() || *c == '_')
        {
            self.chars.next();
        }
        let end = self.position();
        let word = &self.source[start..end];
        match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            _ => Token::Ident(word.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn operators_and_literals() {
        assert_eq!(
            kinds("price >= 2.5 && `unit price` != 'a\\'b'"),
            vec![
                Token::Ident("price".into()),
                Token::Ge,
                Token::Float(2.5),
                Token::And,
                Token::Ident("unit price".into()),
                Token::Ne,
                Token::Str("a'b".into()),
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("NOT x or TRUE"),
            vec![
                Token::Not,
                Token::Ident("x".into()),
                Token::Or,
                Token::True
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 1e3 .5"),
            vec![Token::Int(42), Token::Float(1000.0), Token::Float(0.5)]
        );
    }

    #[test]
    fn single_equals_is_rejected() {
        assert_eq!(
            tokenize("a = 1"),
            Err(ExpressionError::UnexpectedChar { ch: '=', offset: 2 })
        );
    }

    #[test]
    fn unterminated_string() {
        assert!(matches!(
            tokenize("name == 'abc"),
            Err(ExpressionError::Unterminated { what: "string", .. })
        ));
    }

    #[test]
    fn attribute_access_is_not_a_token() {
        assert!(matches!(
            tokenize("df.columns"),
            Err(ExpressionError::InvalidNumber(_))
        ));
        assert!(matches!(
            tokenize("x[0]"),
            Err(ExpressionError::UnexpectedChar { ch: '[', .. })
        ));
    }
}
