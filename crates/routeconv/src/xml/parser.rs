//! XML parser implementation

use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{is_name_char, is_name_start, Content, Document, Element};
use crate::xml::Config;

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
}

impl<'a> Parser<'a> {
    /// Create a new XML parser with default config
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new XML parser with custom config
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        // UTF-8 byte order mark
        if self.cursor.starts_with(&[0xEF, 0xBB, 0xBF]) {
            self.cursor.advance_by(3);
        }
        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::UnexpectedToken, "missing root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(
                ErrorKind::UnexpectedToken,
                "unexpected content after root element",
            ));
        }

        Ok(Document { root })
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.expect_byte(b'<')?;
        self.enter()?;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect_byte(b'>')?;
            self.leave();
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(
                    ErrorKind::UnterminatedMarkup,
                    format!("element <{name}> is never closed"),
                ));
            }

            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: name,
                            found: close_name,
                        },
                        self.cursor.position(),
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.read_until(b"]]>")?;
                children.push(Content::Text(text));
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element()?;
                children.push(Content::Element(child));
                continue;
            }

            if let Some(text) = self.parse_text()? {
                children.push(Content::Text(text));
            }
        }

        self.leave();
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(
                        self.error_here(ErrorKind::UnterminatedMarkup, "unexpected end of input")
                    )
                }
            }

            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute { name },
                    self.cursor.position(),
                ));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(self.error_here(
                    ErrorKind::UnexpectedToken,
                    "expected quoted attribute value",
                ))
            }
        };
        let start_pos = self.cursor.position();
        self.cursor.advance();

        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                return decode_entities(&text).map_err(|err| relocate(err, start_pos));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated attribute value"))
    }

    fn parse_text(&mut self) -> Result<Option<String>> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = self.cursor.slice_from(start);
        let text = bytes_to_string(raw)?;
        let text = decode_entities(&text).map_err(|err| relocate(err, start_pos))?;

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            _ => return Err(self.error_here(ErrorKind::UnexpectedToken, "expected name")),
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start))
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // DOCTYPE may carry an internal subset in brackets
        let mut bracket_depth = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => bracket_depth += 1,
                b']' => bracket_depth = bracket_depth.saturating_sub(1),
                b'>' if bracket_depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated declaration"))
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        self.read_until(pattern).map(|_| ())
    }

    fn read_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return bytes_to_string(raw);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnterminatedMarkup, "unterminated markup"))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            let found = self
                .cursor
                .current()
                .map_or_else(|| "end of input".to_string(), |b| format!("`{}`", char::from(b)));
            Err(self.error_here(
                ErrorKind::UnexpectedToken,
                format!("expected `{}`, found {found}", char::from(expected)),
            ))
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_add(1);
        if self.config.max_depth > 0 && self.depth > self.config.max_depth {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded {
                    max: self.config.max_depth,
                },
                self.cursor.position(),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn error_here(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::with_message(kind, Span::at(self.cursor.position()), message)
    }
}

fn relocate(err: Error, pos: crate::error::Pos) -> Error {
    Error::with_message(err.kind().clone(), Span::at(pos), err.message())
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, Span::empty()))
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut closed = false;
        for next in chars.by_ref() {
            if next == ';' {
                closed = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if closed {
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
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidEntity { entity },
                    Span::empty(),
                ))
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_eq<T: PartialEq + std::fmt::Debug>(left: T, right: T) -> Result<()> {
        if left == right {
            Ok(())
        } else {
            Err(Error::with_message(
                ErrorKind::UnexpectedToken,
                Span::empty(),
                format!("assertion failed: left={left:?} right={right:?}"),
            ))
        }
    }

    fn parse(input: &str) -> Result<Document> {
        Parser::new(input.as_bytes()).parse()
    }

    #[test]
    fn test_parse_with_prolog_and_comments() -> Result<()> {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<!DOCTYPE blueprint>
<blueprint xmlns="http://www.osgi.org/xmlns/blueprint/v1.0.0">
  <!-- inner comment -->
  <bean id="a"/>
</blueprint>
"#;
        let doc = parse(input)?;
        ensure_eq(doc.root.name.as_str(), "blueprint")?;
        ensure_eq(doc.root.elements().count(), 1)?;
        ensure_eq(
            doc.root.attribute("xmlns"),
            Some("http://www.osgi.org/xmlns/blueprint/v1.0.0"),
        )
    }

    #[test]
    fn test_parse_with_attributes() -> Result<()> {
        let doc = parse("<to uri=\"jms:q?a=1&amp;b=2\" id='x'/>")?;
        ensure_eq(doc.root.attribute("uri"), Some("jms:q?a=1&b=2"))?;
        ensure_eq(doc.root.attribute("id"), Some("x"))
    }

    #[test]
    fn test_parse_text_with_entities() -> Result<()> {
        let doc = parse("<simple>${body} &gt; 5 &#38;&#x26;</simple>")?;
        ensure_eq(doc.root.text().as_deref(), Some("${body} > 5 &&"))
    }

    #[test]
    fn test_parse_raw_gt_in_text() -> Result<()> {
        let doc = parse("<simple>${body} > 5</simple>")?;
        ensure_eq(doc.root.text().as_deref(), Some("${body} > 5"))
    }

    #[test]
    fn test_parse_cdata_as_text() -> Result<()> {
        let doc = parse("<groovy><![CDATA[a < b && c]]></groovy>")?;
        ensure_eq(doc.root.text().as_deref(), Some("a < b && c"))
    }

    #[test]
    fn test_parse_prefixed_names() -> Result<()> {
        let doc = parse("<camel:route><camel:from uri=\"direct:a\"/></camel:route>")?;
        ensure_eq(doc.root.local_name(), "route")?;
        ensure_eq(doc.root.elements_named("from").count(), 1)
    }

    #[test]
    fn test_mismatched_tag() -> Result<()> {
        match parse("<route><from></route>") {
            Err(err) => ensure_eq(
                err.kind().clone(),
                ErrorKind::MismatchedTag {
                    expected: "from".to_string(),
                    found: "route".to_string(),
                },
            ),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }

    #[test]
    fn test_unterminated_element() -> Result<()> {
        match parse("<route><from/>") {
            Err(err) => ensure_eq(err.kind().clone(), ErrorKind::UnterminatedMarkup),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }

    #[test]
    fn test_invalid_entity() -> Result<()> {
        match parse("<a b=\"x &nope; y\"/>") {
            Err(err) => ensure_eq(
                err.kind().clone(),
                ErrorKind::InvalidEntity {
                    entity: "nope".to_string(),
                },
            ),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }

    #[test]
    fn test_duplicate_attribute() -> Result<()> {
        match parse("<a b=\"1\" b=\"2\"/>") {
            Err(err) => ensure_eq(
                err.kind().clone(),
                ErrorKind::DuplicateAttribute {
                    name: "b".to_string(),
                },
            ),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }

    #[test]
    fn test_max_depth() -> Result<()> {
        let config = Config {
            max_depth: 2,
            ..Config::default()
        };
        let mut parser = Parser::with_config(b"<a><b><c/></b></a>", config);
        match parser.parse() {
            Err(err) => ensure_eq(err.kind().clone(), ErrorKind::MaxDepthExceeded { max: 2 }),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }

    #[test]
    fn test_trailing_content_rejected() -> Result<()> {
        match parse("<a/><b/>") {
            Err(err) => ensure_eq(err.kind().clone(), ErrorKind::UnexpectedToken),
            Ok(_) => ensure_eq("parsed", "error"),
        }
    }
}
