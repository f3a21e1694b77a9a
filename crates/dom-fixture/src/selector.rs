//! CSS selector subset used by the fixture.

use storefront_core_types::DriverError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub(crate) Vec<Complex>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Complex {
    /// Compounds left to right; the combinator of the first entry is ignored.
    pub(crate) parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) simples: Vec<Simple>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Simple {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: Option<(AttrOp, String)>,
    },
    Not(SelectorList),
    FirstChild,
    LastChild,
    NthChild(usize),
    HasText(String),
    Disabled,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Word,
}

impl AttrOp {
    pub(crate) fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            AttrOp::Equals => actual == expected,
            AttrOp::Contains => !expected.is_empty() && actual.contains(expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
            AttrOp::Word => actual.split_whitespace().any(|w| w == expected),
        }
    }
}

/// Parse a selector list such as `h1.hidden.md\:flex, main > h1`.
pub fn parse_selector(input: &str) -> Result<SelectorList, DriverError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        source: input,
    };
    let list = parser.parse_list()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(list)
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> DriverError {
        DriverError::InvalidSelector(format!(
            "{} at offset {} in '{}'",
            reason, self.pos, self.source
        ))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), DriverError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    /// Skips whitespace, reporting whether any was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, DriverError> {
        let mut items = vec![self.parse_complex()?];
        loop {
            self.skip_ws();
            if self.eat(',') {
                items.push(self.parse_complex()?);
            } else {
                break;
            }
        }
        Ok(SelectorList(items))
    }

    fn parse_complex(&mut self) -> Result<Complex, DriverError> {
        self.skip_ws();
        let mut parts = vec![(Combinator::Descendant, self.parse_compound()?)];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    parts.push((Combinator::Child, self.parse_compound()?));
                }
                Some(_) if had_ws => {
                    parts.push((Combinator::Descendant, self.parse_compound()?));
                }
                Some(_) => return Err(self.error("unexpected character")),
            }
        }
        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, DriverError> {
        let mut tag = None;
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if is_ident_start(c) => {
                tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        let mut simples = Vec::new();
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    simples.push(Simple::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    simples.push(Simple::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    simples.push(self.parse_attr()?);
                }
                Some(':') => {
                    self.pos += 1;
                    simples.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if tag.is_none() && !universal && simples.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(Compound { tag, simples })
    }

    fn parse_ident(&mut self) -> Result<String, DriverError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some(escaped) => {
                        out.push(escaped);
                        self.pos += 1;
                    }
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(out)
    }

    fn parse_string(&mut self) -> Result<String, DriverError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted string")),
        };
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    if let Some(c) = self.peek() {
                        out.push(c);
                        self.pos += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_attr(&mut self) -> Result<Simple, DriverError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();
        if self.eat(']') {
            return Ok(Simple::Attr { name, op: None });
        }

        let op = match self.peek() {
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c @ ('*' | '^' | '$' | '~')) => {
                self.pos += 1;
                self.expect('=')?;
                match c {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Word,
                }
            }
            _ => return Err(self.error("expected attribute operator")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some('"' | '\'') => self.parse_string()?,
            _ => self.parse_ident()?,
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(Simple::Attr {
            name,
            op: Some((op, value)),
        })
    }

    fn parse_pseudo(&mut self) -> Result<Simple, DriverError> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => Ok(Simple::FirstChild),
            "last-child" => Ok(Simple::LastChild),
            "disabled" => Ok(Simple::Disabled),
            "enabled" => Ok(Simple::Enabled),
            "not" => {
                self.expect('(')?;
                let inner = self.parse_list()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Simple::Not(inner))
            }
            "nth-child" => {
                self.expect('(')?;
                self.skip_ws();
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let n = digits
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| self.error("expected positive integer"))?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Simple::NthChild(n))
            }
            "has-text" => {
                self.expect('(')?;
                self.skip_ws();
                let text = self.parse_string()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Simple::HasText(text))
            }
            other => Err(self.error(&format!("unsupported pseudo-class ':{}'", other))),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn is_ident_start(c: char) -> bool {
    is_ident_char(c) || c == '\\'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_class_names_keep_the_literal_colon() {
        let list = parse_selector(r"h1.hidden.md\:flex").unwrap();
        let compound = &list.0[0].parts[0].1;
        assert_eq!(compound.tag.as_deref(), Some("h1"));
        assert_eq!(
            compound.simples,
            vec![
                Simple::Class("hidden".into()),
                Simple::Class("md:flex".into())
            ]
        );
    }

    #[test]
    fn parses_combinators_and_lists() {
        let list = parse_selector("nav ol > li a, button[data-testid*='cart']").unwrap();
        assert_eq!(list.0.len(), 2);
        let combinators: Vec<_> = list.0[0].parts.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::Descendant
            ]
        );
    }

    #[test]
    fn parses_nested_not_and_has_text() {
        let list = parse_selector(r#"button:not(.size, [aria-label^="Size"]):has-text("Red")"#)
            .unwrap();
        let simples = &list.0[0].parts[0].1.simples;
        assert!(matches!(&simples[0], Simple::Not(inner) if inner.0.len() == 2));
        assert_eq!(simples[1], Simple::HasText("Red".into()));
    }

    #[test]
    fn rejects_malformed_selectors() {
        for bad in ["", "h1[", "div >", ".", "a:hover", "li:nth-child(0)", "p[title=\"x]"] {
            let err = parse_selector(bad).unwrap_err();
            assert!(
                matches!(err, DriverError::InvalidSelector(_)),
                "{bad:?} should be rejected"
            );
        }
    }
}
