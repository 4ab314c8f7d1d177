//! XML parser
//!
//! A recursive-descent parser over a byte cursor. It accepts the subset of
//! XML the converter cares about: elements, attributes, text, CDATA text,
//! entities. Declarations, DOCTYPEs, processing instructions and comments
//! are skipped. Nesting depth is bounded by [`Config::max_depth`] so
//! untrusted input cannot grow the call stack without limit.

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

/// Parser configuration
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Maximum element nesting depth
    pub max_depth: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
}

impl<'a> Parser<'a> {
    /// Create a parser with the default configuration
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config { max_depth: 128 })
    }

    /// Create a parser with a custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
        }
    }

    /// Parse a complete XML document
    pub fn parse(&mut self) -> Result<Document> {
        self.skip_prolog()?;
        let root = self.parse_element(0)?;
        self.cursor.skip_whitespace();

        if !self.cursor.is_eof() {
            return Err(Error::at(ErrorKind::TrailingContent, self.cursor.position()));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, declarations, processing instructions and comments
    /// before the root element.
    fn skip_prolog(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.current() != Some(b'<') {
                return Ok(());
            }
            match self.cursor.peek(1) {
                Some(b'?') => {
                    self.cursor.advance_by(2);
                    self.skip_until(b"?>")?;
                }
                Some(b'!') => {
                    self.cursor.advance_by(2);
                    self.skip_markup_declaration()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_element(&mut self, depth: u16) -> Result<Element> {
        if depth >= self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }

        self.expect_byte(b'<')?;

        if self.cursor.current() == Some(b'/') {
            return Err(self.error_here("unexpected closing tag"));
        }

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.current() == Some(b'/') {
            self.cursor.advance();
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;
        let children = self.parse_content(&name, depth)?;

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    /// Parse element content up to and including the matching closing tag.
    fn parse_content(&mut self, open_name: &str, depth: u16) -> Result<Vec<Content>> {
        let mut children = Vec::new();

        loop {
            if self.cursor.is_eof() {
                return Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()));
            }

            if self.cursor.current() != Some(b'<') {
                if let Some(text) = self.parse_text()? {
                    children.push(Content::Text(text));
                }
                continue;
            }

            match self.cursor.peek(1) {
                Some(b'/') => {
                    self.cursor.advance_by(2);
                    let close_pos = self.cursor.position();
                    let close_name = self.parse_name()?;
                    if close_name != open_name {
                        return Err(Error::at(
                            ErrorKind::MismatchedTag {
                                expected: open_name.to_string(),
                                found: close_name,
                            },
                            close_pos,
                        ));
                    }
                    self.cursor.skip_whitespace();
                    self.expect_byte(b'>')?;
                    return Ok(children);
                }
                Some(b'?') => {
                    self.cursor.advance_by(2);
                    self.skip_until(b"?>")?;
                }
                Some(b'!') => {
                    self.cursor.advance_by(2);
                    if self.cursor.peek_bytes(7) == Some(b"[CDATA[") {
                        self.cursor.advance_by(7);
                        let text = self.take_until(b"]]>")?;
                        if !text.is_empty() {
                            children.push(Content::Text(text));
                        }
                    } else {
                        self.skip_markup_declaration()?;
                    }
                }
                _ => {
                    let child = self.parse_element(depth + 1)?;
                    children.push(Content::Element(child));
                }
            }
        }
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()))
                }
            }

            let name_pos = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute { name },
                    name_pos,
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b @ (b'"' | b'\'')) => b,
            _ => return Err(self.error_here("expected quoted attribute value")),
        };
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw, self.cursor.position())?;
                return decode_entities(&text, self.cursor.position());
            }
            self.cursor.advance();
        }

        Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()))
    }

    /// Parse a run of character data. Returns None for whitespace-only runs.
    fn parse_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw, self.cursor.position())?;
        let text = decode_entities(&text, self.cursor.position())?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.trim().to_string()))
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();

        let Some(first) = self.cursor.current() else {
            return Err(Error::at(ErrorKind::UnexpectedEof, start_pos));
        };
        if !is_name_start(first) {
            return Err(Error::at(ErrorKind::InvalidToken, start_pos));
        }

        self.cursor.advance();
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start), start_pos)
    }

    /// Skip a `<!...>` section: comment or DOCTYPE. The cursor sits just
    /// past the `!`.
    fn skip_markup_declaration(&mut self) -> Result<()> {
        if self.cursor.peek_bytes(2) == Some(b"--") {
            self.cursor.advance_by(2);
            self.skip_until(b"-->")
        } else {
            self.skip_until(b">")
        }
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        self.take_until(pattern).map(|_| ())
    }

    /// Consume bytes up to `pattern`, returning them decoded; the pattern
    /// itself is consumed but excluded.
    fn take_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while self.cursor.current().is_some() {
            if self.cursor.peek_bytes(pattern.len()) == Some(pattern) {
                let raw = self.cursor.slice_from(start);
                let text = bytes_to_string(raw, self.cursor.position())?;
                self.cursor.advance_by(pattern.len());
                return Ok(text);
            }
            self.cursor.advance();
        }
        Err(Error::at(ErrorKind::UnexpectedEof, self.cursor.position()))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.current() == Some(expected) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(self.error_here("unexpected token"))
        }
    }

    fn error_here(&self, message: &str) -> Error {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::at(self.cursor.position()),
            message.to_string(),
        )
    }
}

fn bytes_to_string(bytes: &[u8], pos: crate::error::Pos) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| Error::at(ErrorKind::InvalidUtf8, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: crate::error::Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(Error::at(ErrorKind::InvalidEntity { entity }, pos)),
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
