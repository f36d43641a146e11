//! Color markup embedded in label text.
//!
//! Supported tags: `<color=#RRGGBB>`, `<color=#RRGGBBAA>` and
//! `<color=name>` (see [`Color::from_name`]), closed by `</color>`. Tags nest.
//! Anything else, including unknown tags, is literal text.

use thiserror::Error;

use crate::color::Color;

const OPEN_PREFIX: &str = "<color=";
const CLOSE_TAG: &str = "</color>";

/// Errors found while parsing label markup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    #[error("Unknown color `{0}`")]
    UnknownColor(String),

    #[error("Unmatched closing tag at byte {0}")]
    UnmatchedClose(usize),

    #[error("{0} color tag(s) left open")]
    Unclosed(usize),
}

/// A run of text drawn with a single color.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    /// Markup color, or `None` for the label's base color
    pub color: Option<Color>,
}

/// Wraps `text` in a color tag.
pub fn colored(text: &str, color: Color) -> String {
    format!("{}{}>{}{}", OPEN_PREFIX, color.to_hex(), text, CLOSE_TAG)
}

/// Splits markup into colored spans.
pub fn parse(source: &str) -> Result<Vec<TextSpan>, MarkupError> {
    let mut spans: Vec<TextSpan> = Vec::new();
    let mut stack: Vec<Color> = Vec::new();
    let mut current = String::new();
    let mut rest = source;
    let mut offset = 0;

    let flush = |current: &mut String, spans: &mut Vec<TextSpan>, color: Option<Color>| {
        if !current.is_empty() {
            spans.push(TextSpan {
                text: std::mem::take(current),
                color,
            });
        }
    };

    while let Some(pos) = rest.find('<') {
        current.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix(OPEN_PREFIX)
            && let Some(end) = after.find('>')
        {
            let value = after[..end].trim_matches('"');
            let color = Color::from_hex(value)
                .filter(|_| value.starts_with('#'))
                .or_else(|| Color::from_name(value))
                .ok_or_else(|| MarkupError::UnknownColor(value.to_string()))?;
            flush(&mut current, &mut spans, stack.last().copied());
            stack.push(color);
            let consumed = pos + OPEN_PREFIX.len() + end + 1;
            rest = &rest[consumed..];
            offset += consumed;
            continue;
        }

        if tail.starts_with(CLOSE_TAG) {
            if stack.is_empty() {
                return Err(MarkupError::UnmatchedClose(offset + pos));
            }
            flush(&mut current, &mut spans, stack.last().copied());
            stack.pop();
            let consumed = pos + CLOSE_TAG.len();
            rest = &rest[consumed..];
            offset += consumed;
            continue;
        }

        // Literal '<'
        current.push('<');
        rest = &rest[pos + 1..];
        offset += pos + 1;
    }

    current.push_str(rest);
    if !stack.is_empty() {
        return Err(MarkupError::Unclosed(stack.len()));
    }
    flush(&mut current, &mut spans, None);
    Ok(spans)
}

/// Parses markup, falling back to the raw text as a single span on error.
pub fn parse_lossy(source: &str) -> Vec<TextSpan> {
    parse(source).unwrap_or_else(|e| {
        tracing::debug!("Drawing label markup verbatim: {}", e);
        vec![TextSpan {
            text: source.to_string(),
            color: None,
        }]
    })
}

/// Plain text with markup removed (or the raw text if it is malformed).
pub fn strip(source: &str) -> String {
    parse_lossy(source).into_iter().map(|s| s.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_span() {
        let spans = parse("hello").unwrap();
        assert_eq!(
            spans,
            vec![TextSpan {
                text: "hello".into(),
                color: None
            }]
        );
    }

    #[test]
    fn test_colored_round_trip() {
        let text = format!("speed: {}", colored("12.5", Color::RED));
        let spans = parse(&text).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "speed: ");
        assert_eq!(spans[1].text, "12.5");
        assert_eq!(spans[1].color.map(|c| c.to_rgba8()), Some(Color::RED.to_rgba8()));
        assert_eq!(strip(&text), "speed: 12.5");
    }

    #[test]
    fn test_nested_tags_restore_outer_color() {
        let spans = parse("<color=red>a<color=#00FF00>b</color>c</color>d").unwrap();
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        assert_eq!(spans[0].color, Some(Color::RED));
        assert_eq!(spans[2].color, Some(Color::RED));
        assert_eq!(spans[3].color, None);
    }

    #[test]
    fn test_literal_angle_brackets() {
        assert_eq!(strip("a < b <b>"), "a < b <b>");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse("<color=mauve>x</color>"),
            Err(MarkupError::UnknownColor("mauve".into()))
        );
        assert_eq!(parse("x</color>"), Err(MarkupError::UnmatchedClose(1)));
        assert_eq!(parse("<color=red>x"), Err(MarkupError::Unclosed(1)));
        // Lossy parse keeps the raw text
        assert_eq!(strip("<color=red>x"), "<color=red>x");
    }
}
