use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

use crate::error::{GanttError, GanttResult};

/// Moment-style tokens, longest first so `MMMM` wins over `MM`.
const TOKENS: [(&str, &str); 22] = [
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("dddd", "%A"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("WW", "%V"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("W", "%-V"),
    ("A", "%p"),
    ("a", "%P"),
];

/// Header label format compiled once per column pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFormat {
    pattern: String,
}

impl LabelFormat {
    /// Translates a moment-style display format (`HH:mm`, `MMM D`, `[Week] W`)
    /// into a strftime pattern. `W`/`WW` are ISO week numbers.
    pub fn compile(format: &str) -> GanttResult<Self> {
        let pattern = translate(format)?;
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(GanttError::configuration(format!(
                "time scale format `{format}` cannot be rendered"
            )));
        }
        Ok(Self { pattern })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .format_with_items(StrftimeItems::new(&self.pattern))
            .to_string()
    }
}

fn translate(format: &str) -> GanttResult<String> {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            let close = rest.find(']').ok_or_else(|| {
                GanttError::configuration(format!(
                    "time scale format `{format}` has an unterminated `[` literal"
                ))
            })?;
            push_literal(&mut out, &rest[1..close]);
            rest = &rest[close + 1..];
            continue;
        }

        for (token, replacement) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }

        push_literal(&mut out, &rest[..ch.len_utf8()]);
        rest = &rest[ch.len_utf8()..];
    }

    Ok(out)
}

fn push_literal(out: &mut String, literal: &str) {
    for ch in literal.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}
