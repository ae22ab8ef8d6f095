//! Reader for the JavaScript literals Doxygen writes into its `search/` directory.
//!
//! Only the subset the index builder emits is understood: `var`/`let`/`const`
//! declarations whose values are arrays, objects, quoted strings and integers.

/// A parsed JavaScript literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Literal {
    Str(String),
    Int(i64),
    Array(Vec<Literal>),
    /// Object members in source order. Numeric keys are kept as their decimal text.
    Object(Vec<(String, Literal)>),
}

impl Literal {
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub(crate) fn as_array(&self) -> Option<&[Literal]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn as_object(&self) -> Option<&[(String, Literal)]> {
        match self {
            Self::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Syntax error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at byte {offset}")]
pub(crate) struct LiteralError {
    pub(crate) offset: usize,
    pub(crate) message: String,
}

/// Parse every top-level declaration in `src`, returning `(name, value)` pairs in order.
pub(crate) fn parse_script(src: &str) -> Result<Vec<(String, Literal)>, LiteralError> {
    let mut parser = Parser { src, pos: 0 };
    let mut declarations = Vec::new();

    loop {
        parser.skip_trivia();
        if parser.at_end() {
            break;
        }

        let keyword = parser.identifier()?;
        if !matches!(keyword, "var" | "let" | "const") {
            return Err(parser.error(format!("expected declaration, found '{}'", keyword)));
        }
        parser.skip_trivia();
        let name = parser.identifier()?.to_string();
        parser.skip_trivia();
        parser.expect('=')?;
        let value = parser.value()?;
        parser.skip_trivia();
        parser.eat(';');

        declarations.push((name, value));
    }

    Ok(declarations)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    /// Skips whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.src[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(body) = trimmed.strip_prefix("/*") {
                self.pos += body.find("*/").map_or(trimmed.len(), |end| end + 4);
            } else {
                break;
            }
        }
    }

    fn identifier(&mut self) -> Result<&'a str, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected identifier"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_trivia();
        match self.peek() {
            Some('[') => self.array(),
            Some('{') => self.object(),
            Some(quote @ ('\'' | '"')) => self.string(quote).map(Literal::Str),
            Some(c) if c == '-' || c.is_ascii_digit() => self.integer(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn array(&mut self) -> Result<Literal, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat(']') {
                return Ok(Literal::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia();
            if !self.eat(',') {
                self.skip_trivia();
                self.expect(']')?;
                return Ok(Literal::Array(items));
            }
        }
    }

    fn object(&mut self) -> Result<Literal, LiteralError> {
        self.expect('{')?;
        let mut members = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat('}') {
                return Ok(Literal::Object(members));
            }
            let key = match self.peek() {
                Some(quote @ ('\'' | '"')) => self.string(quote)?,
                _ => self.identifier()?.to_string(),
            };
            self.skip_trivia();
            self.expect(':')?;
            let value = self.value()?;
            members.push((key, value));
            self.skip_trivia();
            if !self.eat(',') {
                self.skip_trivia();
                self.expect('}')?;
                return Ok(Literal::Object(members));
            }
        }
    }

    fn integer(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        self.eat('-');
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src[start..self.pos]
            .parse()
            .map(Literal::Int)
            .map_err(|e| LiteralError {
                offset: start,
                message: format!("invalid integer: {}", e),
            })
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let code = self.hex_digits(2)?;
                out.push(char::from_u32(code).ok_or_else(|| self.error("invalid \\x escape"))?);
            }
            Some('u') => {
                let high = self.hex_digits(4)?;
                let code = if (0xD800..0xDC00).contains(&high) && self.src[self.pos..].starts_with("\\u")
                {
                    self.pos += 2;
                    let low = self.hex_digits(4)?;
                    0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF)
                } else {
                    high
                };
                out.push(char::from_u32(code).ok_or_else(|| self.error("invalid \\u escape"))?);
            }
            // Line continuation
            Some('\n') => {}
            Some(c) => out.push(c),
            None => return Err(self.error("unterminated escape")),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Result<u32, LiteralError> {
        let digits = self
            .src
            .get(self.pos..self.pos + count)
            .ok_or_else(|| self.error("truncated escape"))?;
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid hex escape"))?;
        self.pos += count;
        Ok(value)
    }
}
