//! DataPath parser.
//!
//! ```text
//! path      := '/'? segment ('/' segment)*
//! segment   := word | '"' quoted '"' | '$key' | '*' | word '*' | '*' word
//!            | '..' | '..' word | '@' digits '.' digits
//!            | '[' path ']' | '{' segment (',' segment)* '}'
//! ```

use datapath_model::{ContainerId, DataPointer, ForwardComponent, ForwardPath, SlotId};
use thiserror::Error;

use crate::types::{MultiPath, PathComponent};
use crate::PathError;

/// A path that failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at position {position} in {input:?}")]
pub struct PathSyntaxError {
    pub input: String,
    /// Byte offset of the offending character.
    pub position: usize,
    pub kind: SyntaxErrorKind,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("empty segment")]
    EmptySegment,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unclosed string")]
    UnclosedString,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid pointer")]
    InvalidPointer,
    #[error("unknown marker")]
    UnknownMarker,
    #[error("$key must be the last segment")]
    KeyNotLast,
}

/// DataPath parser.
pub struct DataPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> DataPathParser<'a> {
    /// Parse a multi-path. The empty string is the empty relative path.
    pub fn parse(input: &'a str) -> Result<MultiPath, PathSyntaxError> {
        let mut parser = Self { input, pos: 0 };
        let path = parser.parse_path(&[])?;
        if let Some(c) = parser.peek() {
            return Err(parser.error(SyntaxErrorKind::UnexpectedChar(c)));
        }
        Ok(path)
    }

    /// Parse a path made of plain descent segments only. A leading `/` is
    /// accepted and ignored.
    pub fn parse_forward(input: &'a str) -> Result<ForwardPath, PathError> {
        Ok(Self::parse(input)?.to_forward()?)
    }

    /// Parse segments until the end of input or one of `terminators`.
    fn parse_path(&mut self, terminators: &[char]) -> Result<MultiPath, PathSyntaxError> {
        let absolute = self.peek() == Some('/');
        if absolute {
            self.advance();
        }
        let mut path = if absolute {
            MultiPath::absolute()
        } else {
            MultiPath::relative()
        };

        if self.at_path_end(terminators) {
            return Ok(path);
        }
        loop {
            let start = self.pos;
            let component = self.parse_segment()?;
            if path.push(component).is_err() {
                return Err(self.error_at(start, SyntaxErrorKind::KeyNotLast));
            }
            match self.peek() {
                Some('/') => self.advance(),
                _ if self.at_path_end(terminators) => return Ok(path),
                Some(c) => return Err(self.error(SyntaxErrorKind::UnexpectedChar(c))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
        }
    }

    fn parse_segment(&mut self) -> Result<PathComponent, PathSyntaxError> {
        match self.peek() {
            None | Some('/') | Some(']') | Some('}') | Some(',') => {
                Err(self.error(SyntaxErrorKind::EmptySegment))
            }
            Some('"') => {
                let key = self.parse_string()?;
                Ok(PathComponent::Forward(ForwardComponent::Key(key)))
            }
            Some('[') => {
                self.advance();
                let nested = self.parse_path(&[']'])?;
                self.expect(']')?;
                Ok(PathComponent::Nested(Box::new(nested)))
            }
            Some('{') => self.parse_union(),
            Some('$') => {
                let start = self.pos;
                self.advance();
                if self.parse_word()? == "key" {
                    Ok(PathComponent::Key)
                } else {
                    Err(self.error_at(start, SyntaxErrorKind::UnknownMarker))
                }
            }
            Some('@') => self.parse_pointer(),
            Some('.') if self.peek_str("..") => {
                self.advance();
                self.advance();
                match self.peek() {
                    Some('"') => Ok(PathComponent::ContextKey(self.parse_string()?)),
                    Some(c) if is_word_char(c) => Ok(PathComponent::ContextKey(self.parse_word()?)),
                    _ => Ok(PathComponent::Reverse),
                }
            }
            Some(c) if is_word_char(c) || c == '*' => self.parse_word_or_wildcard(),
            Some(c) => Err(self.error(SyntaxErrorKind::UnexpectedChar(c))),
        }
    }

    fn parse_union(&mut self) -> Result<PathComponent, PathSyntaxError> {
        self.expect('{')?;
        let mut alternatives = Vec::new();
        loop {
            self.skip_whitespace();
            alternatives.push(self.parse_segment()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some('}') => {
                    self.advance();
                    return Ok(PathComponent::Union(alternatives));
                }
                Some(c) => return Err(self.error(SyntaxErrorKind::UnexpectedChar(c))),
                None => return Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
            }
        }
    }

    fn parse_word_or_wildcard(&mut self) -> Result<PathComponent, PathSyntaxError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_word_char(c) || c == '*') {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        let stars = text.matches('*').count();
        if stars == 0 {
            return Ok(PathComponent::word(text));
        }
        let is_affix = text == "*"
            || (stars == 1 && (text.starts_with('*') || text.ends_with('*')));
        if !is_affix {
            let offset = text
                .char_indices()
                .filter(|(_, c)| *c == '*')
                .map(|(i, _)| i)
                .find(|&i| i != 0 && i != text.len() - 1)
                .unwrap_or(0);
            return Err(self.error_at(start + offset, SyntaxErrorKind::UnexpectedChar('*')));
        }
        Ok(PathComponent::Wildcard(text.to_string()))
    }

    fn parse_pointer(&mut self) -> Result<PathComponent, PathSyntaxError> {
        let start = self.pos;
        self.expect('@')?;
        let container = self.parse_digits();
        let slot = if self.peek() == Some('.') {
            self.advance();
            self.parse_digits()
        } else {
            None
        };
        let container = container.and_then(|digits| digits.parse::<u64>().ok());
        let slot = slot.and_then(|digits| digits.parse::<SlotId>().ok());
        match (container, slot) {
            (Some(container), Some(slot)) => Ok(PathComponent::Forward(ForwardComponent::Pointer(
                DataPointer {
                    container: ContainerId::from_raw(container),
                    slot,
                },
            ))),
            _ => Err(self.error_at(start, SyntaxErrorKind::InvalidPointer)),
        }
    }

    fn parse_digits(&mut self) -> Option<&'a str> {
        let input = self.input;
        let start = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        (self.pos > start).then(|| &input[start..self.pos])
    }

    fn parse_word(&mut self) -> Result<String, PathSyntaxError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_word_char(c)) {
            self.advance();
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(SyntaxErrorKind::UnexpectedChar(c)),
                None => self.error(SyntaxErrorKind::UnexpectedEnd),
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, PathSyntaxError> {
        let start = self.pos;
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, SyntaxErrorKind::UnclosedString)),
                Some('"') => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        None => return Err(self.error_at(start, SyntaxErrorKind::UnclosedString)),
                        Some(_) => return Err(self.error(SyntaxErrorKind::InvalidEscape)),
                    };
                    out.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
    }

    fn at_path_end(&self, terminators: &[char]) -> bool {
        match self.peek() {
            None => true,
            Some(c) => terminators.contains(&c),
        }
    }

    fn error(&self, kind: SyntaxErrorKind) -> PathSyntaxError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, position: usize, kind: SyntaxErrorKind) -> PathSyntaxError {
        PathSyntaxError {
            input: self.input.to_string(),
            position,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), PathSyntaxError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(SyntaxErrorKind::UnexpectedChar(c))),
            None => Err(self.error(SyntaxErrorKind::UnexpectedEnd)),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '/' | '*' | '[' | ']' | '{' | '}' | ',' | '"' | '\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use datapath_model::KeyOrIndex;

    fn parse(input: &str) -> MultiPath {
        DataPathParser::parse(input).unwrap()
    }

    fn error_kind(input: &str) -> SyntaxErrorKind {
        DataPathParser::parse(input).unwrap_err().kind
    }

    #[test]
    fn empty_paths() {
        assert_eq!(parse(""), MultiPath::relative());
        assert_eq!(parse("/"), MultiPath::absolute());
    }

    #[test]
    fn words_are_ambiguous_until_quoted() {
        let path = parse("/users/0/\"0\"");
        assert!(path.is_absolute());
        assert_eq!(
            path.components(),
            &[
                PathComponent::Forward(ForwardComponent::IndexOrKey(KeyOrIndex::Key("users".into()))),
                PathComponent::Forward(ForwardComponent::IndexOrKey(KeyOrIndex::Index(0))),
                PathComponent::Forward(ForwardComponent::Key("0".into())),
            ]
        );
    }

    #[test]
    fn quoted_words_unescape() {
        let path = parse(r#""a/b"/"say \"hi\"\n""#);
        assert_eq!(
            path.components(),
            &[
                PathComponent::Forward(ForwardComponent::key("a/b")),
                PathComponent::Forward(ForwardComponent::key("say \"hi\"\n")),
            ]
        );
    }

    #[test]
    fn markers() {
        let path = parse("../../..row/*/a*/*b/$key");
        assert_eq!(
            path.components(),
            &[
                PathComponent::Reverse,
                PathComponent::Reverse,
                PathComponent::ContextKey("row".into()),
                PathComponent::Wildcard("*".into()),
                PathComponent::Wildcard("a*".into()),
                PathComponent::Wildcard("*b".into()),
                PathComponent::Key,
            ]
        );
    }

    #[test]
    fn nested_and_union() {
        let path = parse("items/[/sel/idx]/{a, b,[x]}");
        let nested = parse("/sel/idx");
        assert_eq!(
            path.components(),
            &[
                PathComponent::word("items"),
                PathComponent::Nested(Box::new(nested)),
                PathComponent::Union(vec![
                    PathComponent::word("a"),
                    PathComponent::word("b"),
                    PathComponent::Nested(Box::new(parse("x"))),
                ]),
            ]
        );
    }

    #[test]
    fn pointers() {
        let path = parse("list/@17.4");
        assert_eq!(
            path.components()[1],
            PathComponent::Forward(ForwardComponent::Pointer(DataPointer {
                container: ContainerId::from_raw(17),
                slot: 4,
            }))
        );
        let wide = parse("@3.5000000000");
        assert_eq!(
            wide.components()[0],
            PathComponent::Forward(ForwardComponent::Pointer(DataPointer {
                container: ContainerId::from_raw(3),
                slot: 5_000_000_000,
            }))
        );
        assert_eq!(wide.to_string(), "@3.5000000000");
        assert_eq!(error_kind("@17"), SyntaxErrorKind::InvalidPointer);
        assert_eq!(error_kind("@x.1"), SyntaxErrorKind::InvalidPointer);
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = DataPathParser::parse("a//b").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.kind, SyntaxErrorKind::EmptySegment);
        assert_eq!(err.input, "a//b");

        assert_eq!(error_kind("a/"), SyntaxErrorKind::EmptySegment);
        assert_eq!(error_kind("[a"), SyntaxErrorKind::UnexpectedEnd);
        assert_eq!(error_kind("a]"), SyntaxErrorKind::UnexpectedChar(']'));
        assert_eq!(error_kind("{a,b"), SyntaxErrorKind::UnexpectedEnd);
        assert_eq!(error_kind("{}"), SyntaxErrorKind::EmptySegment);
        assert_eq!(error_kind("\"open"), SyntaxErrorKind::UnclosedString);
        assert_eq!(error_kind(r#""\q""#), SyntaxErrorKind::InvalidEscape);
        assert_eq!(error_kind("$value"), SyntaxErrorKind::UnknownMarker);
        assert_eq!(error_kind("a b"), SyntaxErrorKind::UnexpectedChar(' '));

        let err = DataPathParser::parse("a*b").unwrap_err();
        assert_eq!((err.position, err.kind), (1, SyntaxErrorKind::UnexpectedChar('*')));

        let err = DataPathParser::parse("a/$key/b").unwrap_err();
        assert_eq!((err.position, err.kind), (7, SyntaxErrorKind::KeyNotLast));
    }

    #[test]
    fn forward_paths_reject_query_segments() {
        assert_eq!(
            DataPathParser::parse_forward("/a/0").unwrap(),
            ForwardPath::from_words(["a", "0"])
        );
        assert!(matches!(
            DataPathParser::parse_forward("a/*"),
            Err(PathError::IllegalComponent { .. })
        ));
        assert!(matches!(
            DataPathParser::parse_forward("a/["),
            Err(PathError::Syntax(_))
        ));
    }

    #[test]
    fn display_reads_back() {
        for input in [
            "",
            "/",
            "a/0/\"0\"",
            "/items/[../idx]/{a,\"b c\"}/..row/*/$key",
            "x*/*y/@3.1",
            "..\"odd name\"/\"..\"",
        ] {
            let path = parse(input);
            assert_eq!(parse(&path.to_string()), path, "{input}");
        }
    }
}
