//! Expression tree for byte-oriented regular expressions.

use std::fmt;

/// A parsed regular expression.
///
/// `Wildcard(left, right)` stands for `left.*right`: a left match, an
/// unconstrained gap of any length, then a right match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegEx {
    /// Matches the empty string
    Blank,
    Primitive(Primitive),
    Union(Box<RegEx>, Box<RegEx>),
    Concat(Box<RegEx>, Box<RegEx>),
    Repeat(Box<RegEx>, RepeatKind),
    Wildcard(Box<RegEx>, Box<RegEx>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    /// Literal byte string
    Mgram(Vec<u8>),
    CharRange { set: ByteSet, negated: bool },
    /// Any byte except the record delimiter
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
    MinToMax { min: u32, max: Option<u32> },
}

impl RepeatKind {
    /// Inclusive repetition bounds; `None` means unbounded
    pub fn bounds(self) -> (u32, Option<u32>) {
        match self {
            RepeatKind::ZeroOrMore => (0, None),
            RepeatKind::OneOrMore => (1, None),
            RepeatKind::ZeroOrOne => (0, Some(1)),
            RepeatKind::MinToMax { min, max } => (min, max),
        }
    }
}

impl RegEx {
    pub fn mgram(bytes: &[u8]) -> Self {
        RegEx::Primitive(Primitive::Mgram(bytes.to_vec()))
    }

    pub fn union(a: RegEx, b: RegEx) -> Self {
        RegEx::Union(Box::new(a), Box::new(b))
    }

    pub fn concat(a: RegEx, b: RegEx) -> Self {
        RegEx::Concat(Box::new(a), Box::new(b))
    }

    pub fn repeat(inner: RegEx, kind: RepeatKind) -> Self {
        RegEx::Repeat(Box::new(inner), kind)
    }

    pub fn wildcard(left: RegEx, right: RegEx) -> Self {
        RegEx::Wildcard(Box::new(left), Box::new(right))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, RegEx::Blank)
    }

    /// True if a `Wildcard` node appears anywhere in this tree
    pub fn contains_wildcard(&self) -> bool {
        match self {
            RegEx::Wildcard(..) => true,
            RegEx::Blank | RegEx::Primitive(_) => false,
            RegEx::Union(a, b) | RegEx::Concat(a, b) => {
                a.contains_wildcard() || b.contains_wildcard()
            }
            RegEx::Repeat(inner, _) => inner.contains_wildcard(),
        }
    }

    /// True for `.*`, the gap marker the parser turns into a wildcard
    pub(crate) fn is_gap(&self) -> bool {
        matches!(
            self,
            RegEx::Repeat(inner, RepeatKind::ZeroOrMore)
                if matches!(**inner, RegEx::Primitive(Primitive::Dot))
        )
    }
}

impl fmt::Display for RegEx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegEx::Blank => Ok(()),
            RegEx::Primitive(p) => write!(f, "{p}"),
            RegEx::Union(a, b) => write!(f, "({a}|{b})"),
            RegEx::Concat(a, b) => write!(f, "{a}{b}"),
            RegEx::Repeat(inner, kind) => {
                let atomic = match &**inner {
                    RegEx::Primitive(Primitive::Mgram(bytes)) => bytes.len() == 1,
                    RegEx::Primitive(_) | RegEx::Union(..) => true,
                    _ => false,
                };
                if atomic {
                    write!(f, "{inner}")?;
                } else {
                    write!(f, "({inner})")?;
                }
                match kind {
                    RepeatKind::ZeroOrMore => write!(f, "*"),
                    RepeatKind::OneOrMore => write!(f, "+"),
                    RepeatKind::ZeroOrOne => write!(f, "?"),
                    RepeatKind::MinToMax { min, max: Some(max) } if min == max => {
                        write!(f, "{{{min}}}")
                    }
                    RepeatKind::MinToMax { min, max: Some(max) } => write!(f, "{{{min},{max}}}"),
                    RepeatKind::MinToMax { min, max: None } => write!(f, "{{{min},}}"),
                }
            }
            RegEx::Wildcard(left, right) => write!(f, "{left}.*{right}"),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Mgram(bytes) => {
                for &b in bytes {
                    write_byte(f, b, b".[]()|*+?{}\\^$")?;
                }
                Ok(())
            }
            Primitive::CharRange { set, negated } => {
                write!(f, "[")?;
                if *negated {
                    write!(f, "^")?;
                }
                for (lo, hi) in set.runs() {
                    write_byte(f, lo, b"]\\^-")?;
                    if hi > lo {
                        write!(f, "-")?;
                        write_byte(f, hi, b"]\\^-")?;
                    }
                }
                write!(f, "]")
            }
            Primitive::Dot => write!(f, "."),
        }
    }
}

fn write_byte(f: &mut fmt::Formatter<'_>, b: u8, meta: &[u8]) -> fmt::Result {
    match b {
        b'\n' => write!(f, "\\n"),
        b'\t' => write!(f, "\\t"),
        b'\r' => write!(f, "\\r"),
        _ if meta.contains(&b) => write!(f, "\\{}", b as char),
        0x20..=0x7E => write!(f, "{}", b as char),
        _ => write!(f, "\\x{b:02x}"),
    }
}

/// A set of bytes, one bit per value.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, b: u8) {
        self.bits[(b >> 6) as usize] |= 1 << (b & 63);
    }

    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for b in lo..=hi {
            self.insert(b);
        }
    }

    pub fn extend(&mut self, other: &ByteSet) {
        for (mine, theirs) in self.bits.iter_mut().zip(other.bits) {
            *mine |= theirs;
        }
    }

    pub fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1 << (b & 63)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=255u8).filter(move |&b| self.contains(b))
    }

    /// Maximal runs of consecutive members, as inclusive `(lo, hi)` pairs
    pub fn runs(&self) -> Vec<(u8, u8)> {
        let mut runs: Vec<(u8, u8)> = Vec::new();
        for b in self.iter() {
            match runs.last_mut() {
                Some((_, hi)) if *hi as u16 + 1 == b as u16 => *hi = b,
                _ => runs.push((b, b)),
            }
        }
        runs
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.runs().iter().map(|(lo, hi)| {
                if lo == hi {
                    format!("{:?}", *lo as char)
                } else {
                    format!("{:?}-{:?}", *lo as char, *hi as char)
                }
            }))
            .finish()
    }
}
