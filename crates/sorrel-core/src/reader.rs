use crate::ast::Node;
use crate::error::SorrelError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Reads every form in `src`.
pub fn parse(src: &str) -> Result<Vec<Node>, SorrelError> {
    Reader::new(src).read_all()
}

pub struct Reader<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Reader<'a> {
    pub fn new(src: &'a str) -> Reader<'a> {
        Reader {
            lexer: Lexer::new(src),
        }
    }

    pub fn read_all(&mut self) -> Result<Vec<Node>, SorrelError> {
        let mut nodes = vec![];
        while let Some(token) = self.lexer.next_token()? {
            nodes.push(self.read_form(token)?);
        }
        Ok(nodes)
    }

    fn read_form(&mut self, token: Token) -> Result<Node, SorrelError> {
        match token.kind {
            TokenKind::ParenOpen => {
                let items = self.read_until(TokenKind::ParenClose, token.offset)?;
                Ok(Node::List(items))
            }
            TokenKind::BracketOpen => {
                let items = self.read_until(TokenKind::BracketClose, token.offset)?;
                Ok(Node::Vector(items))
            }
            // Brace literals always read as array maps; promotion to a
            // real map is the evaluator's job.
            TokenKind::BraceOpen => {
                let items = self.read_until(TokenKind::BraceClose, token.offset)?;
                if items.len() % 2 != 0 {
                    return Err(SorrelError::parse(
                        "hashmap literal must have an even number of elements",
                    )
                    .with_offset(token.offset));
                }
                Ok(Node::ArrayMap(items))
            }
            TokenKind::ParenClose | TokenKind::BracketClose | TokenKind::BraceClose => Err(
                SorrelError::parse(format!("unexpected {}", token.text)).with_offset(token.offset),
            ),
            TokenKind::Quote => self.read_quoted("quote", &token),
            TokenKind::Quasiquote => self.read_quoted("quasiquote", &token),
            TokenKind::Unquote => self.read_quoted("unquote", &token),
            TokenKind::UnquoteSplicing => self.read_quoted("unquote-splicing", &token),
            TokenKind::Symbol => Ok(Node::Symbol(token.text)),
            TokenKind::Keyword => {
                if token.text.len() < 2 {
                    return Err(SorrelError::parse("bad keyword").with_offset(token.offset));
                }
                Ok(Node::Keyword(token.text[1..].to_string()))
            }
            TokenKind::Number => match token.text.parse::<f64>() {
                Ok(value) => Ok(Node::number(value)),
                Err(_) => Err(
                    SorrelError::parse(format!("cannot parse number from {}", token.text))
                        .with_offset(token.offset),
                ),
            },
            TokenKind::Str => unescape(&token.text, token.offset).map(Node::string),
        }
    }

    fn read_until(
        &mut self,
        close: TokenKind,
        open_offset: usize,
    ) -> Result<Vec<Node>, SorrelError> {
        let mut items = vec![];
        loop {
            let token = self
                .lexer
                .next_token()?
                .ok_or_else(|| SorrelError::parse("unexpected EOF").with_offset(open_offset))?;
            if token.kind == close {
                return Ok(items);
            }
            items.push(self.read_form(token)?);
        }
    }

    /// Wraps exactly the next form, so `'x` reads as `(quote x)`.
    fn read_quoted(&mut self, name: &str, token: &Token) -> Result<Node, SorrelError> {
        let next = self
            .lexer
            .next_token()?
            .ok_or_else(|| SorrelError::parse("unexpected EOF").with_offset(token.offset))?;
        let form = self.read_form(next)?;
        Ok(Node::list(vec![Node::symbol(name), form]))
    }
}

/// Strips the surrounding quotes and resolves the escapes the printer
/// emits. Literal newlines inside a string are kept as written.
fn unescape(text: &str, offset: usize) -> Result<String, SorrelError> {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            other => {
                return Err(SorrelError::parse(format!(
                    "unsupported escape \\{}",
                    other.map(String::from).unwrap_or_default()
                ))
                .with_offset(offset))
            }
        }
    }
    Ok(out)
}
