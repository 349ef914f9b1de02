//! Reading and quoting for the old-style (NeXTSTEP) ASCII property lists that
//! Xcode uses for `project.pbxproj`.

use indexmap::IndexMap;
use once_cell_regex::regex;
use std::{borrow::Cow, fmt::Write as _};
use thiserror::Error;

pub type Dict = IndexMap<String, Value>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    String(String),
    Array(Vec<Value>),
    Dict(Dict),
    Data(Vec<u8>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Dict> for Value {
    fn from(dict: Dict) -> Self {
        Self::Dict(dict)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid data literal")]
    InvalidData,
    #[error("trailing characters after the top-level value")]
    TrailingCharacters,
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("{kind} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
}

fn is_unquoted_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let pos = if src.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let consumed = &self.src[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rfind('\n')
            .map_or(consumed, |idx| &consumed[idx + 1..])
            .chars()
            .count()
            + 1;
        ParseError { kind, line, column }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => self.error(ParseErrorKind::UnexpectedChar(c)),
            None => self.error(ParseErrorKind::UnexpectedEof),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => {
                        self.pos = self.src.len();
                        return Err(self.error(ParseErrorKind::UnterminatedComment));
                    }
                }
            } else if rest.starts_with("//") {
                match rest.find('\n') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.src.len(),
                }
            } else if let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
                self.pos += c.len_utf8();
            } else {
                return Ok(());
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_trivia()?;
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.dict().map(Value::Dict),
            Some('(') => self.array().map(Value::Array),
            Some('<') => self.data().map(Value::Data),
            Some(_) => self.string().map(Value::String),
            None => Err(self.unexpected()),
        }
    }

    fn dict(&mut self) -> Result<Dict, ParseError> {
        self.expect('{')?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(dict);
            }
            let key = self.string()?;
            self.expect('=')?;
            let value = self.value()?;
            self.expect(';')?;
            dict.insert(key, value);
        }
    }

    fn array(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => (),
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(quote @ '"') | Some(quote @ '\'') => {
                self.bump();
                self.quoted(quote)
            }
            Some(c) if is_unquoted_char(c) => {
                let len = self
                    .rest()
                    .find(|c: char| !is_unquoted_char(c))
                    .unwrap_or_else(|| self.rest().len());
                let s = self.rest()[..len].to_owned();
                self.pos += len;
                Ok(s)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(ParseErrorKind::UnterminatedString)),
                Some(c) if c == quote => return Ok(s),
                Some('\\') => s.push(self.escape()?),
                Some(c) => s.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            None => Err(self.error(ParseErrorKind::UnterminatedString)),
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('a') => Ok('\u{7}'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('v') => Ok('\u{b}'),
            Some('U') | Some('u') => {
                let digits = self.rest().get(..4).filter(|digits| {
                    digits.chars().all(|c| c.is_ascii_hexdigit())
                });
                let c = digits
                    .and_then(|digits| u32::from_str_radix(digits, 16).ok())
                    .and_then(std::char::from_u32)
                    .ok_or_else(|| self.error(ParseErrorKind::InvalidEscape))?;
                self.pos += 4;
                Ok(c)
            }
            Some(c @ '\\') | Some(c @ '"') | Some(c @ '\'') | Some(c @ '\n') => Ok(c),
            Some(_) => Err(self.error(ParseErrorKind::InvalidEscape)),
        }
    }

    fn data(&mut self) -> Result<Vec<u8>, ParseError> {
        self.expect('<')?;
        let end = self
            .rest()
            .find('>')
            .ok_or_else(|| self.error(ParseErrorKind::InvalidData))?;
        let digits: String = self.rest()[..end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = hex::decode(&digits).map_err(|_| self.error(ParseErrorKind::InvalidData))?;
        self.pos += end + 1;
        Ok(bytes)
    }
}

/// Parses a complete property list document.
pub fn parse(src: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(src);
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.pos == src.len() {
        Ok(value)
    } else {
        Err(parser.error(ParseErrorKind::TrailingCharacters))
    }
}

/// Renders `s` the way Xcode writes it, quoting and escaping only when the
/// bare form wouldn't read back as the same string.
pub fn quote(s: &str) -> Cow<'_, str> {
    if regex!(r"^[A-Za-z0-9_$/:.]+$").is_match(s) && !s.contains("//") {
        return Cow::Borrowed(s);
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\U{:04x}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    fn dict(entries: Vec<(&str, Value)>) -> Value {
        Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        )
    }

    #[test]
    fn parses_nested_document_with_comments() {
        let src = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objects = {
		ABC /* main.swift */ = {isa = PBXFileReference; path = "main.swift"; };
	};
	list = (
		a,
		"b c",
	);
}
"#;
        let expected = dict(vec![
            ("archiveVersion", "1".into()),
            ("classes", dict(vec![])),
            (
                "objects",
                dict(vec![(
                    "ABC",
                    dict(vec![
                        ("isa", "PBXFileReference".into()),
                        ("path", "main.swift".into()),
                    ]),
                )]),
            ),
            ("list", Value::Array(vec!["a".into(), "b c".into()])),
        ]);
        assert_eq!(parse(src).unwrap(), expected);
    }

    #[test]
    fn keeps_key_order() {
        let value = parse("{ zeta = 1; alpha = 2; mid = 3; }").unwrap();
        let keys: Vec<_> = value.as_dict().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn array_without_trailing_comma() {
        let value = parse("(one, two)").unwrap();
        assert_eq!(value, Value::Array(vec!["one".into(), "two".into()]));
    }

    #[test]
    fn data_literal() {
        let value = parse("<0fbd 7f>").unwrap();
        assert_eq!(value, Value::Data(vec![0x0f, 0xbd, 0x7f]));
    }

    #[rstest(input, expected,
        case(r#""a\"b""#, "a\"b"),
        case(r#""tab\there""#, "tab\there"),
        case(r#""line\nbreak""#, "line\nbreak"),
        case(r#""back\\slash""#, "back\\slash"),
        case(r#""\U00e9t\U00e9""#, "été"),
        case("'single'", "single"),
        case(r#""$(inherited)""#, "$(inherited)")
    )]
    fn test_parse_string(input: &str, expected: &str) {
        assert_eq!(parse(input).unwrap(), Value::String(expected.to_owned()));
    }

    #[rstest(input, kind, line, column,
        case("{ a = 1; ", ParseErrorKind::UnexpectedEof, 1, 10),
        case("{ a = 1 }", ParseErrorKind::UnexpectedChar('}'), 1, 9),
        case("{\n  a = \"open;\n}", ParseErrorKind::UnterminatedString, 3, 2),
        case("/* never closed", ParseErrorKind::UnterminatedComment, 1, 16),
        case("\"\\q\"", ParseErrorKind::InvalidEscape, 1, 4),
        case("<abc>", ParseErrorKind::InvalidData, 1, 2),
        case("{ } extra", ParseErrorKind::TrailingCharacters, 1, 5)
    )]
    fn test_parse_error(input: &str, kind: ParseErrorKind, line: usize, column: usize) {
        assert_eq!(parse(input).unwrap_err(), ParseError { kind, line, column });
    }

    #[rstest(input, expected,
        case("PodPeace", "PodPeace"),
        case("com.podcash.PodPeace", "com.podcash.PodPeace"),
        case("5.0", "5.0"),
        case("", "\"\""),
        case("<group>", "\"<group>\""),
        case("Xcode 14.0", "\"Xcode 14.0\""),
        case("com.apple.product-type.application", "\"com.apple.product-type.application\""),
        case("$(inherited)", "\"$(inherited)\""),
        case("https://example.com", "\"https://example.com\""),
        case("say \"hi\"\n", "\"say \\\"hi\\\"\\n\"")
    )]
    fn test_quote(input: &str, expected: &str) {
        assert_eq!(quote(input), expected);
    }
}
