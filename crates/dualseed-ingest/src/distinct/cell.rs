//! Cell classification for distinct extraction
//!
//! A cell is either a plain value or a serialized list. Sources mix JSON
//! (`["a", "b"]`) with Python-style literals (`['a', 'b',]`), so candidates go
//! through a strict JSON parse first and a permissive literal parse second.

use serde_json::Value;

/// Result of classifying one trimmed cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// An ordinary value
    Scalar(String),
    /// A list; elements are rendered, trimmed and non-empty
    ListOf(Vec<String>),
    /// Looked like a list but parsed as neither syntax (or parsed to a non-list)
    Malformed(String),
}

impl CellValue {
    /// Values this cell contributes to a distinct set
    ///
    /// Malformed cells are kept verbatim, like scalars.
    pub fn into_values(self) -> Vec<String> {
        match self {
            CellValue::Scalar(value) | CellValue::Malformed(value) => {
                if value.is_empty() {
                    Vec::new()
                } else {
                    vec![value]
                }
            },
            CellValue::ListOf(items) => items,
        }
    }
}

/// Classify a raw cell
pub fn classify_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if !trimmed.starts_with('[') {
        return CellValue::Scalar(trimmed.to_string());
    }

    let parsed = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some(Literal::from(value)),
        Err(_) => LiteralParser::new(trimmed).parse_document(),
    };

    match parsed {
        Some(Literal::List(items)) => CellValue::ListOf(
            items
                .iter()
                .map(|item| item.to_display().trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ),
        _ => CellValue::Malformed(trimmed.to_string()),
    }
}

/// A parsed literal value
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Str(String),
    Int(i128),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Literal::None,
            Value::Bool(b) => Literal::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Literal::Int(i128::from(i)),
                None => match n.as_u64() {
                    Some(u) => Literal::Int(i128::from(u)),
                    None => Literal::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
            },
            Value::String(s) => Literal::Str(s),
            Value::Array(items) => Literal::List(items.into_iter().map(Literal::from).collect()),
            Value::Object(map) => Literal::Dict(
                map.into_iter()
                    .map(|(k, v)| (Literal::Str(k), Literal::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Literal {
    /// Text form of a list element: strings bare, everything else in literal form
    fn to_display(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            other => other.to_repr(),
        }
    }

    fn to_repr(&self) -> String {
        match self {
            Literal::Str(s) => quote(s),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => format_float(*f),
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::None => "None".to_string(),
            Literal::List(items) => format!("[{}]", join_repr(items)),
            Literal::Tuple(items) if items.len() == 1 => format!("({},)", items[0].to_repr()),
            Literal::Tuple(items) => format!("({})", join_repr(items)),
            Literal::Set(items) if items.is_empty() => "set()".to_string(),
            Literal::Set(items) => format!("{{{}}}", join_repr(items)),
            Literal::Dict(entries) => format!(
                "{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_repr(), v.to_repr()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

fn join_repr(items: &[Literal]) -> String {
    items
        .iter()
        .map(Literal::to_repr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Quote a string the way literal syntax prints it: single quotes unless the
/// text contains a single quote and no double quote.
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            },
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Recursive-descent parser for Python-style container literals
struct LiteralParser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Parse exactly one value followed only by whitespace
    fn parse_document(mut self) -> Option<Literal> {
        let value = self.parse_value()?;
        self.skip_ws();
        match self.chars.peek() {
            None => Some(value),
            Some(_) => None,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.chars.peek() == Some(&expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn parse_value(&mut self) -> Option<Literal> {
        self.skip_ws();
        match *self.chars.peek()? {
            '[' => {
                self.chars.next();
                self.parse_sequence(']').map(|(items, _)| Literal::List(items))
            },
            '(' => {
                self.chars.next();
                let (items, trailing_comma) = self.parse_sequence(')')?;
                // `(x)` is a parenthesised value, `(x,)` a one-element tuple
                if items.len() == 1 && !trailing_comma {
                    items.into_iter().next()
                } else {
                    Some(Literal::Tuple(items))
                }
            },
            '{' => {
                self.chars.next();
                self.parse_braced()
            },
            '\'' | '"' => self.parse_string(),
            c if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => self.parse_number(),
            c if c.is_alphabetic() || c == '_' => self.parse_word(),
            _ => None,
        }
    }

    /// Comma-separated values up to `close`; returns whether a trailing comma was seen
    fn parse_sequence(&mut self, close: char) -> Option<(Vec<Literal>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            if self.eat(close) {
                return Some((items, trailing_comma));
            }
            items.push(self.parse_value()?);
            trailing_comma = self.eat(',');
            if !trailing_comma {
                return self.eat(close).then_some((items, false));
            }
        }
    }

    fn parse_braced(&mut self) -> Option<Literal> {
        if self.eat('}') {
            return Some(Literal::Dict(Vec::new()));
        }
        let first = self.parse_value()?;
        if self.eat(':') {
            let mut entries = vec![(first, self.parse_value()?)];
            loop {
                if !self.eat(',') {
                    return self.eat('}').then_some(Literal::Dict(entries));
                }
                if self.eat('}') {
                    return Some(Literal::Dict(entries));
                }
                let key = self.parse_value()?;
                if !self.eat(':') {
                    return None;
                }
                entries.push((key, self.parse_value()?));
            }
        }

        let mut items = vec![first];
        loop {
            if !self.eat(',') {
                return self.eat('}').then_some(Literal::Set(items));
            }
            if self.eat('}') {
                return Some(Literal::Set(items));
            }
            items.push(self.parse_value()?);
        }
    }

    fn parse_string(&mut self) -> Option<Literal> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            match self.chars.next()? {
                c if c == quote => break,
                '\n' => return None,
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    '\n' => {},
                    other => {
                        out.push('\\');
                        out.push(other);
                    },
                },
                c => out.push(c),
            }
        }

        // Adjacent literals concatenate: 'a' 'b' == 'ab'
        self.skip_ws();
        if matches!(self.chars.peek(), Some('\'' | '"')) {
            if let Some(Literal::Str(rest)) = self.parse_string() {
                out.push_str(&rest);
            } else {
                return None;
            }
        }
        Some(Literal::Str(out))
    }

    fn parse_number(&mut self) -> Option<Literal> {
        let mut negative = false;
        while let Some(&sign) = self.chars.peek() {
            match sign {
                '-' => negative = !negative,
                '+' => {},
                _ => break,
            }
            self.chars.next();
            self.skip_ws();
        }

        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            let exponent_sign = (c == '-' || c == '+') && matches!(text.chars().last(), Some('e' | 'E'));
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '_' || exponent_sign {
                if c != '_' {
                    text.push(c);
                }
                self.chars.next();
            } else {
                break;
            }
        }
        if text.is_empty() || !text.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }

        let is_float = text.contains(['.', 'e', 'E']);
        if is_float {
            let value: f64 = text.parse().ok()?;
            Some(Literal::Float(if negative { -value } else { value }))
        } else {
            if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c != '0') {
                return None;
            }
            let value: i128 = text.parse().ok()?;
            Some(Literal::Int(if negative { -value } else { value }))
        }
    }

    fn parse_word(&mut self) -> Option<Literal> {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        match word.as_str() {
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            "None" => Some(Literal::None),
            _ => None,
        }
    }
}
