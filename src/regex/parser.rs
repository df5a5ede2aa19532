//! Regex parser
//!
//! Parses a byte-oriented regex into a [`RegEx`] tree. Supported syntax:
//!
//! - alternation `a|b`, grouping `(...)`
//! - quantifiers `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`
//! - `.` (any byte but the record delimiter), `[...]`, `[^...]`
//! - escapes `\n \t \r \d \D \w \W \s \S`, and `\` before any other byte
//!   for the byte itself
//!
//! A `.*` inside a concatenation splits it into a [`RegEx::Wildcard`];
//! a leading or trailing `.*` is dropped, since it cannot change where the
//! rest of the pattern matches.

use super::ast::{ByteSet, Primitive, RegEx, RepeatKind};
use anyhow::{Result, bail};

/// Largest bound accepted in `{n,m}`
const MAX_REPEAT: u32 = 1000;

/// Parse a regex string into an expression tree
pub fn parse_regex(input: &str) -> Result<RegEx> {
    if input.is_empty() {
        bail!("empty regex");
    }

    let mut parser = RegExParser::new(input.as_bytes());
    let regex = parser.parse_alt()?;

    if let Some(b) = parser.peek() {
        // Only an unmatched ')' stops the top-level alternation early
        bail!("unmatched '{}' at position {}", b as char, parser.pos);
    }
    if regex.is_gap() {
        bail!("regex has no content outside of '.*'");
    }

    Ok(regex)
}

struct RegExParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> RegExParser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_alt(&mut self) -> Result<RegEx> {
        let start = self.pos;
        let mut node = self.parse_concat()?;
        let mut gap_branch = node.is_gap();
        let mut branches = 1;

        while self.consume(b'|') {
            let rhs = self.parse_concat()?;
            gap_branch |= rhs.is_gap();
            branches += 1;
            node = RegEx::union(node, rhs);
        }

        // A gap only has meaning between two sides of a concatenation
        if gap_branch && branches > 1 {
            bail!("'.*' cannot be an alternative at position {}", start);
        }

        Ok(node)
    }

    fn parse_concat(&mut self) -> Result<RegEx> {
        let mut items = Vec::new();

        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }
            items.push(self.parse_repeat()?);
        }

        Ok(build_concat(items))
    }

    fn parse_repeat(&mut self) -> Result<RegEx> {
        let start = self.pos;
        let mut node = self.parse_atom()?;

        while let Some(b) = self.peek() {
            let kind = match b {
                b'*' => {
                    self.advance();
                    RepeatKind::ZeroOrMore
                }
                b'+' => {
                    self.advance();
                    RepeatKind::OneOrMore
                }
                b'?' => {
                    self.advance();
                    RepeatKind::ZeroOrOne
                }
                b'{' => self.parse_bounds()?,
                _ => break,
            };
            if node.is_gap() {
                bail!("quantifier applied to '.*' at position {}", start);
            }
            node = RegEx::repeat(node, kind);
        }

        Ok(node)
    }

    fn parse_atom(&mut self) -> Result<RegEx> {
        let pos = self.pos;
        let Some(b) = self.next() else {
            bail!("unexpected end of regex");
        };

        match b {
            b'(' => {
                let inner = self.parse_alt()?;
                if !self.consume(b')') {
                    bail!("unclosed '(' at position {}", pos);
                }
                Ok(inner)
            }
            b'[' => self.parse_class(pos),
            b'.' => Ok(RegEx::Primitive(Primitive::Dot)),
            b'\\' => self.parse_escape(pos),
            b'*' | b'+' | b'?' | b'{' => {
                bail!("dangling quantifier '{}' at position {}", b as char, pos)
            }
            _ => Ok(RegEx::mgram(&[b])),
        }
    }

    fn parse_escape(&mut self, pos: usize) -> Result<RegEx> {
        let Some(b) = self.next() else {
            bail!("trailing backslash at position {}", pos);
        };

        let class = |set: ByteSet, negated: bool| RegEx::Primitive(Primitive::CharRange { set, negated });

        Ok(match b {
            b'd' => class(digit_set(), false),
            b'D' => class(digit_set(), true),
            b'w' => class(word_set(), false),
            b'W' => class(word_set(), true),
            b's' => class(space_set(), false),
            b'S' => class(space_set(), true),
            _ => RegEx::mgram(&[self.escaped_byte(b, pos)?]),
        })
    }

    fn parse_class(&mut self, pos: usize) -> Result<RegEx> {
        let negated = self.consume(b'^');
        let mut set = ByteSet::new();
        let mut first = true;

        loop {
            let Some(b) = self.next() else {
                bail!("unclosed '[' at position {}", pos);
            };

            // A ']' right after '[' or '[^' is a literal
            if b == b']' && !first {
                break;
            }
            first = false;

            let lo = match b {
                b'\\' => {
                    let Some(e) = self.next() else {
                        bail!("unclosed '[' at position {}", pos);
                    };
                    match e {
                        b'd' => {
                            set.extend(&digit_set());
                            continue;
                        }
                        b'w' => {
                            set.extend(&word_set());
                            continue;
                        }
                        b's' => {
                            set.extend(&space_set());
                            continue;
                        }
                        _ => self.escaped_byte(e, pos)?,
                    }
                }
                _ => b,
            };

            // Range `lo-hi`, unless the '-' is the last byte of the class
            if self.peek() == Some(b'-') && self.peek_at(1).is_some_and(|n| n != b']') {
                self.advance();
                let hi = match self.next() {
                    Some(b'\\') => match self.next() {
                        Some(e) => self.escaped_byte(e, pos)?,
                        None => bail!("unclosed '[' at position {}", pos),
                    },
                    Some(h) => h,
                    None => bail!("unclosed '[' at position {}", pos),
                };
                if hi < lo {
                    bail!(
                        "invalid class range '{}-{}' at position {}",
                        lo as char,
                        hi as char,
                        pos
                    );
                }
                set.insert_range(lo, hi);
            } else {
                set.insert(lo);
            }
        }

        if set.is_empty() {
            bail!("empty character class at position {}", pos);
        }

        Ok(RegEx::Primitive(Primitive::CharRange { set, negated }))
    }

    /// Parse `{n}`, `{n,}` or `{n,m}`; the cursor is on the `{`
    fn parse_bounds(&mut self) -> Result<RepeatKind> {
        let pos = self.pos;
        self.advance();

        let min = self.parse_number(pos)?;
        let max = if self.consume(b',') {
            if self.peek() == Some(b'}') {
                None
            } else {
                Some(self.parse_number(pos)?)
            }
        } else {
            Some(min)
        };

        if !self.consume(b'}') {
            bail!("unclosed '{{' at position {}", pos);
        }
        if let Some(max) = max {
            if min > max {
                bail!("invalid repetition {{{},{}}} at position {}", min, max, pos);
            }
        }

        Ok(RepeatKind::MinToMax { min, max })
    }

    fn parse_number(&mut self, pos: usize) -> Result<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        let digits = std::str::from_utf8(&self.input[start..self.pos])?;
        match digits.parse::<u32>() {
            Ok(n) if n <= MAX_REPEAT => Ok(n),
            Ok(_) => bail!("repetition bound above {} at position {}", MAX_REPEAT, pos),
            Err(_) => bail!("expected a number in '{{...}}' at position {}", pos),
        }
    }

    /// Byte denoted by `\<e>`; `\xHH` reads two hex digits
    fn escaped_byte(&mut self, e: u8, pos: usize) -> Result<u8> {
        if e != b'x' {
            return Ok(unescape(e));
        }
        let hex = self.input.get(self.pos..self.pos + 2).unwrap_or_default();
        let value = std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match value {
            Some(v) => {
                self.pos += 2;
                Ok(v)
            }
            None => bail!("expected two hex digits after '\\x' at position {}", pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos + ahead).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn consume(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

/// Build a concatenation from parsed items, splitting on `.*` gaps
fn build_concat(items: Vec<RegEx>) -> RegEx {
    if items.len() == 1 {
        // A lone `.*` is kept so callers can reject or report it
        return items.into_iter().next().unwrap_or(RegEx::Blank);
    }

    let mut segments: Vec<Vec<RegEx>> = vec![Vec::new()];
    for item in items {
        if item.is_gap() {
            segments.push(Vec::new());
        } else if let Some(last) = segments.last_mut() {
            last.push(item);
        }
    }

    segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(fold_segment)
        .reduce(RegEx::wildcard)
        .unwrap_or(RegEx::Blank)
}

/// Concatenate a gap-free run of items, merging adjacent literals
fn fold_segment(items: Vec<RegEx>) -> RegEx {
    let mut merged: Vec<RegEx> = Vec::with_capacity(items.len());

    for item in items {
        if let RegEx::Primitive(Primitive::Mgram(next)) = &item {
            if let Some(RegEx::Primitive(Primitive::Mgram(prev))) = merged.last_mut() {
                prev.extend_from_slice(next);
                continue;
            }
        }
        merged.push(item);
    }

    merged
        .into_iter()
        .reduce(RegEx::concat)
        .unwrap_or(RegEx::Blank)
}

fn unescape(b: u8) -> u8 {
    match b {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        _ => b,
    }
}

fn digit_set() -> ByteSet {
    let mut set = ByteSet::new();
    set.insert_range(b'0', b'9');
    set
}

fn word_set() -> ByteSet {
    let mut set = digit_set();
    set.insert_range(b'a', b'z');
    set.insert_range(b'A', b'Z');
    set.insert(b'_');
    set
}

fn space_set() -> ByteSet {
    let mut set = ByteSet::new();
    for b in [b' ', b'\t', b'\n', b'\r', 0x0B, 0x0C] {
        set.insert(b);
    }
    set
}
