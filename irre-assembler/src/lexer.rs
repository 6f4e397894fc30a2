//! Lexer for IRRE assembly source
//!
//! Single token class grammar: identifiers, numeric literals, label
//! markers, `%` directives, quoted strings (inside `%d` payloads), and
//! newlines. Comments run from `;` to end of line.

use crate::item::SourceLoc;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Mnemonic, register name, or label reference
    Identifier(String),
    /// Identifier immediately followed by `:`
    LabelDef(String),
    /// `%` followed by a directive name
    Directive(String),
    /// Standalone `:` (as in `%entry: main`)
    Colon,
    /// Numeric literal in its 32-bit two's-complement carrier
    Number(u32),
    /// Quoted string body with escapes applied (only meaningful in `%d`)
    Str(Vec<u8>),
    Newline,
    Eof,
}

impl Token {
    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(s) => format!("identifier '{}'", s),
            Token::LabelDef(s) => format!("label '{}:'", s),
            Token::Directive(s) => format!("directive '%{}'", s),
            Token::Colon => "':'".to_string(),
            Token::Number(n) => format!("number {}", n),
            Token::Str(_) => "string literal".to_string(),
            Token::Newline => "end of line".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// A token with the source position where it started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub loc: SourceLoc,
}

/// Lexical error with its source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub loc: SourceLoc,
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.line, self.col)
    }

    fn err(&self, loc: SourceLoc, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            loc,
        }
    }

    fn skip_blank(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    fn read_digits(&mut self, radix: u32) -> String {
        let mut out = String::new();
        while let Some(ch) = self.current() {
            if ch.is_digit(radix) {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    /// Numeric literal: `$[-]hex`, `#[-]dec`, `[-]dec`, or `0x` hex.
    /// Negative values take their two's-complement form in 32 bits.
    fn read_number(&mut self) -> Result<Token, LexError> {
        let loc = self.loc();

        let (radix, explicit_prefix) = match self.current() {
            Some('$') => {
                self.advance();
                (16, true)
            }
            Some('#') => {
                self.advance();
                (10, true)
            }
            _ => (10, false),
        };

        let negative = if self.current() == Some('-') {
            self.advance();
            true
        } else {
            false
        };

        // bare `0x`/`0X` hex, as emitted by the disassembler
        let radix = if !explicit_prefix
            && !negative
            && self.current() == Some('0')
            && matches!(self.peek(1), Some('x') | Some('X'))
        {
            self.advance();
            self.advance();
            16
        } else {
            radix
        };

        let digits = self.read_digits(radix);
        if digits.is_empty() {
            return Err(self.err(loc, "expected digits in numeric literal"));
        }

        let magnitude = u64::from_str_radix(&digits, radix)
            .map_err(|_| self.err(loc, format!("numeric literal out of range: {}", digits)))?;

        // 32-bit carrier; negatives wrap to two's complement
        let value = if negative {
            (magnitude as u32).wrapping_neg()
        } else {
            magnitude as u32
        };

        Ok(Token::Number(value))
    }

    /// Quoted string with escapes `\n \t \r \\ \" \0`
    fn read_string(&mut self) -> Result<Token, LexError> {
        let loc = self.loc();
        self.advance(); // opening quote

        let mut bytes = Vec::new();
        loop {
            match self.current() {
                None | Some('\n') => {
                    return Err(self.err(loc, "unterminated string literal"));
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::Str(bytes));
                }
                Some('\\') => {
                    self.advance();
                    let esc_loc = self.loc();
                    match self.advance() {
                        Some('n') => bytes.push(b'\n'),
                        Some('t') => bytes.push(b'\t'),
                        Some('r') => bytes.push(b'\r'),
                        Some('\\') => bytes.push(b'\\'),
                        Some('"') => bytes.push(b'"'),
                        Some('0') => bytes.push(0),
                        Some(other) => {
                            return Err(
                                self.err(esc_loc, format!("invalid escape sequence: \\{}", other))
                            );
                        }
                        None => return Err(self.err(loc, "unterminated string literal")),
                    }
                }
                Some(ch) => {
                    // string bodies contribute their literal byte sequence
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    self.advance();
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_blank();
        let loc = self.loc();

        let token = match self.current() {
            None => Token::Eof,
            Some('\n') => {
                self.advance();
                Token::Newline
            }
            Some(';') => {
                self.skip_comment();
                return self.next_token();
            }
            Some(':') => {
                self.advance();
                Token::Colon
            }
            Some('%') => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(self.err(loc, "expected directive name after '%'"));
                }
                Token::Directive(name)
            }
            Some('"') => self.read_string()?,
            Some(ch) if ch == '$' || ch == '#' || ch == '-' || ch.is_ascii_digit() => {
                self.read_number()?
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let name = self.read_identifier();
                // a label definition binds the colon immediately
                if self.current() == Some(':') {
                    self.advance();
                    Token::LabelDef(name)
                } else {
                    Token::Identifier(name)
                }
            }
            Some(ch) => {
                return Err(self.err(loc, format!("unexpected character '{}'", ch)));
            }
        };

        Ok(Spanned { token, loc })
    }

    /// Tokenize the whole input, ending with `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = matches!(spanned.token, Token::Eof);
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
