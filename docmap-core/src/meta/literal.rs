//! Parser for the object literal exported by a `_meta.js` file.
//!
//! Only data is understood: string and identifier keys, string values, nested
//! objects and the scalar literals `true`, `false`, `null` and numbers.
//! Anything that would need evaluation (identifiers, calls, JSX, template
//! interpolation) is rejected with a positioned error.

use std::fmt;

use super::{MetaMap, MetaValue};

/// Deepest object nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 128;

/// A 1-indexed line/column location in the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

/// Parse the object literal at the start of `source` (leading trivia allowed).
///
/// Returns the parsed map and the byte offset just past the closing brace.
/// Whatever follows the literal is left untouched.
pub fn parse_object(source: &str) -> Result<(MetaMap, usize), ParseError> {
    let mut parser = Parser::new(source);
    parser.skip_trivia()?;
    let map = parser.parse_object()?;
    Ok((map, parser.cursor))
}

struct Parser<'a> {
    source: &'a str,
    cursor: usize,
    line: usize,
    col: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            col: 1,
            depth: 0,
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        self.error_at(self.position(), message)
    }

    fn error_at<T>(&self, position: Position, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            message: message.into(),
            position,
        })
    }

    fn remaining(&self) -> &'a str {
        &self.source[self.cursor..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_char_second(&self) -> Option<char> {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Skip whitespace, `//` line comments and `/* */` block comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek_char(), self.peek_char_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.next_char();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.next_char() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.position();
                    self.next_char();
                    self.next_char();
                    loop {
                        match self.next_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.next_char();
                                break;
                            }
                            Some(_) => {}
                            None => return self.error_at(start, "unterminated block comment"),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(c) if c == expected => {
                self.next_char();
                Ok(())
            }
            Some(c) => self.error(format!("expected `{expected}`, found `{c}`")),
            None => self.error(format!("expected `{expected}`, found end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<MetaMap, ParseError> {
        if self.depth >= MAX_DEPTH {
            return self.error("nesting too deep");
        }
        self.depth += 1;
        let map = self.parse_members();
        self.depth -= 1;
        map
    }

    fn parse_members(&mut self) -> Result<MetaMap, ParseError> {
        self.expect('{')?;
        let mut map = MetaMap::new();

        loop {
            self.skip_trivia()?;
            if self.peek_char() == Some('}') {
                self.next_char();
                return Ok(map);
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                Some('}') => {
                    self.next_char();
                    return Ok(map);
                }
                Some(c) => return self.error(format!("expected `,` or `}}`, found `{c}`")),
                None => return self.error("unterminated object"),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        match self.peek_char() {
            Some(q @ ('"' | '\'' | '`')) => self.parse_string(q),
            Some(c) if is_ident_char(c) => Ok(self.take_while(is_ident_char).to_string()),
            Some(c) => self.error(format!("expected a key, found `{c}`")),
            None => self.error("expected a key, found end of input"),
        }
    }

    fn parse_value(&mut self) -> Result<MetaValue, ParseError> {
        match self.peek_char() {
            Some('{') => Ok(MetaValue::Nested(self.parse_object()?)),
            Some(q @ ('"' | '\'' | '`')) => Ok(MetaValue::Title(self.parse_string(q)?)),
            Some(c) if is_word_char(c) => {
                let start = self.position();
                let word = self.take_while(is_word_char);
                match word {
                    "true" | "false" | "null" => Ok(MetaValue::Other),
                    _ if word.parse::<f64>().is_ok() => Ok(MetaValue::Other),
                    _ => self.error_at(start, format!("unsupported expression `{word}`")),
                }
            }
            Some(c) => self.error(format!("unsupported value starting with `{c}`")),
            None => self.error("expected a value, found end of input"),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.position();
        self.next_char();
        let mut out = String::new();

        loop {
            match self.next_char() {
                None => return self.error_at(start, "unterminated string"),
                Some(c) if c == quote => return Ok(out),
                Some('$') if quote == '`' && self.peek_char() == Some('{') => {
                    return self.error("template interpolation is not supported");
                }
                Some('\n') if quote != '`' => {
                    return self.error_at(start, "unterminated string");
                }
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        let position = self.position();
        let Some(c) = self.next_char() else {
            return self.error_at(position, "unterminated escape sequence");
        };

        let escaped = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            'u' => return self.parse_unicode_escape(position),
            other => other,
        };
        Ok(escaped)
    }

    fn parse_unicode_escape(&mut self, position: Position) -> Result<char, ParseError> {
        let digits = if self.peek_char() == Some('{') {
            self.next_char();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            self.expect('}')?;
            digits
        } else {
            let start = self.cursor;
            for _ in 0..4 {
                match self.peek_char() {
                    Some(c) if c.is_ascii_hexdigit() => {
                        self.next_char();
                    }
                    _ => return self.error_at(position, "invalid unicode escape"),
                }
            }
            &self.source[start..self.cursor]
        };

        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| self.error_at(position, "invalid unicode escape"), Ok)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.cursor;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.next_char();
        }
        &self.source[start..self.cursor]
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_word_char(c: char) -> bool {
    is_ident_char(c) || matches!(c, '.' | '-' | '+')
}
