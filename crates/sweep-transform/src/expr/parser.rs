//! Recursive-descent parser producing an [`Node`] tree.
//!
//! Precedence, lowest first: `or`, `and`, `not`, comparison, `+ -`,
//! `* / %`, unary minus.

use super::lexer::{Spanned, Token};
use super::{ArithOp, CompareOp, MAX_DEPTH, Node, Value};
use crate::error::ExpressionError;

pub(crate) struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
    end_offset: usize,
    /// Referenced column names, indexed by slot.
    pub(crate) columns: Vec<String>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned>, end_offset: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            end_offset,
            columns: Vec::new(),
        }
    }

    pub(crate) fn parse(&mut self) -> Result<Node, ExpressionError> {
        if self.tokens.is_empty() {
            return Err(ExpressionError::Empty);
        }
        let node = self.expr()?;
        if let Some((token, offset)) = self.tokens.get(self.pos) {
            return Err(ExpressionError::Syntax {
                offset: *offset,
                message: format!("unexpected {}", token.describe()),
            });
        }
        Ok(node)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.end_offset, |(_, offset)| *offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(token, _)| token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooComplex(format!(
                "nesting deeper than {MAX_DEPTH}"
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<Node, ExpressionError> {
        self.enter()?;
        let node = self.or();
        self.leave();
        node
    }

    fn or(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            node = Node::Or(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn and(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.not()?;
        while self.eat(&Token::And) {
            let right = self.not()?;
            node = Node::And(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn not(&mut self) -> Result<Node, ExpressionError> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.not();
            self.leave();
            return Ok(Node::Not(Box::new(inner?)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Node, ExpressionError> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        Ok(Node::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn additive(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => return Ok(node),
            };
            self.pos += 1;
            let right = self.term()?;
            node = Node::Arith {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
    }

    fn term(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => ArithOp::Mul,
                Some(Token::Slash) => ArithOp::Div,
                Some(Token::Percent) => ArithOp::Rem,
                _ => return Ok(node),
            };
            self.pos += 1;
            let right = self.unary()?;
            node = Node::Arith {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        if self.eat(&Token::Minus) {
            self.enter()?;
            let inner = self.unary();
            self.leave();
            return Ok(Node::Neg(Box::new(inner?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node, ExpressionError> {
        let offset = self.offset();
        let Some(token) = self.advance() else {
            return Err(ExpressionError::Syntax {
                offset,
                message: "unexpected end of expression".to_string(),
            });
        };
        match token {
            Token::Int(v) => Ok(Node::Literal(Value::Int(v))),
            Token::Float(v) => Ok(Node::Literal(Value::Float(v))),
            Token::Str(s) => Ok(Node::Literal(Value::Text(s))),
            Token::True => Ok(Node::Literal(Value::Bool(true))),
            Token::False => Ok(Node::Literal(Value::Bool(false))),
            Token::Null => Ok(Node::Literal(Value::Null)),
            Token::Ident(name) => Ok(Node::Column(self.slot(name))),
            Token::LParen => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(ExpressionError::Syntax {
                        offset: self.offset(),
                        message: "expected ')'".to_string(),
                    });
                }
                Ok(inner)
            }
            other => Err(ExpressionError::Syntax {
                offset,
                message: format!("unexpected {}", other.describe()),
            }),
        }
    }

    fn slot(&mut self, name: String) -> usize {
        match self.columns.iter().position(|existing| *existing == name) {
            Some(slot) => slot,
            None => {
                self.columns.push(name);
                self.columns.len() - 1
            }
        }
    }
}
