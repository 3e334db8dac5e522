use crate::error::SorrelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    Symbol,
    Keyword,
    Number,
    Str,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first rune of the token.
    pub offset: usize,
}

/// Pull tokenizer. The reader asks for one token at a time; nothing is
/// scanned past what was asked for.
pub struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

const SEPARATORS: &str = ", \t\r\n";
const IDENTIFIER_PUNCTUATION: &str = "?&@~<>=-+*/_#:.";

fn is_identifier_rune(c: char) -> bool {
    c.is_alphanumeric() || IDENTIFIER_PUNCTUATION.contains(c)
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Lexer<'a> {
        Lexer {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    /// Returns the next token, `None` at end of input. An unterminated
    /// string or comment is an error, which also ends the stream.
    pub fn next_token(&mut self) -> Result<Option<Token>, SorrelError> {
        self.skip_blank()?;
        let start = self.offset();
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(None),
        };
        let token = match c {
            '(' => self.token(TokenKind::ParenOpen, start),
            ')' => self.token(TokenKind::ParenClose, start),
            '[' => self.token(TokenKind::BracketOpen, start),
            ']' => self.token(TokenKind::BracketClose, start),
            '{' => self.token(TokenKind::BraceOpen, start),
            '}' => self.token(TokenKind::BraceClose, start),
            '"' => self.string(start)?,
            '\'' => self.token(TokenKind::Quote, start),
            '`' => self.token(TokenKind::Quasiquote, start),
            '~' => {
                if self.peek() == Some('@') {
                    self.bump();
                    self.token(TokenKind::UnquoteSplicing, start)
                } else {
                    self.token(TokenKind::Unquote, start)
                }
            }
            ':' => self.keyword(start),
            c if c.is_ascii_digit() => self.number(start),
            '+' | '-' => {
                if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                    self.number(start)
                } else {
                    self.symbol(start)
                }
            }
            c if is_identifier_rune(c) => self.symbol(start),
            other => {
                return Err(SorrelError::lex(format!("bad rune {:?}", other)).with_offset(start))
            }
        };
        Ok(Some(token))
    }

    fn skip_blank(&mut self) -> Result<(), SorrelError> {
        loop {
            match self.peek() {
                Some(c) if SEPARATORS.contains(c) => {
                    self.bump();
                }
                Some(';') => {
                    let start = self.offset();
                    loop {
                        match self.bump() {
                            Some('\n') => break,
                            Some(_) => {}
                            None => {
                                return Err(SorrelError::lex("unterminated comment")
                                    .with_offset(start))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn string(&mut self, start: usize) -> Result<Token, SorrelError> {
        loop {
            match self.bump() {
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(
                            SorrelError::lex("unterminated quoted string").with_offset(start)
                        );
                    }
                }
                Some('"') => return Ok(self.token(TokenKind::Str, start)),
                Some(_) => {}
                None => {
                    return Err(SorrelError::lex("unterminated quoted string").with_offset(start))
                }
            }
        }
    }

    fn keyword(&mut self, start: usize) -> Token {
        self.eat_identifier();
        self.token(TokenKind::Keyword, start)
    }

    fn symbol(&mut self, start: usize) -> Token {
        self.eat_identifier();
        self.token(TokenKind::Symbol, start)
    }

    /// Digits, an optional fraction and an optional exponent. A
    /// trailing identifier rune turns the whole token back into a
    /// symbol, so `1x` and `1.2.3` read as symbols while `1e6` stays
    /// numeric.
    fn number(&mut self, start: usize) -> Token {
        self.eat_digits();
        if self.peek() == Some('.') && self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.eat_digits();
            } else {
                self.pos = mark;
            }
        }
        if self.peek().map_or(false, is_identifier_rune) {
            return self.symbol(start);
        }
        self.token(TokenKind::Number, start)
    }

    fn eat_digits(&mut self) {
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn eat_identifier(&mut self) {
        while self.peek().map_or(false, is_identifier_rune) {
            self.bump();
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            text: self.src[start..self.offset()].to_string(),
            offset: start,
        }
    }

    fn offset(&self) -> usize {
        match self.chars.get(self.pos) {
            Some((i, _)) => *i,
            None => self.src.len(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }
}
