//! Destination address templates.
//!
//! A template is plain text with `{key}` placeholders. `{{` and `}}` stand for
//! literal braces. Keys may contain ASCII alphanumerics, `_`, `-` and `.`.
//!
//! ```rust
//! use mqosc_std::template::Template;
//! use mqosc_core::TemplateData;
//!
//! let template = Template::compile("/light/{capture_1}/{action}").unwrap();
//! let mut data = TemplateData::new();
//! data.insert("capture_1", "kitchen");
//! data.insert("action", "turn-on");
//! assert_eq!(template.render(&data).unwrap(), "/light/kitchen/turn-on");
//! ```

use mqosc_core::{RESERVED_PREFIX, RenderError, TemplateData, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Key(String),
}

/// A compiled address template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

impl Template {
    /// Compile a template.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, next)| next == '{').is_some() => text.push('{'),
                '}' if chars.next_if(|&(_, next)| next == '}').is_some() => text.push('}'),
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                '{' => {
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, c)) => key.push(c),
                            None => return Err(TemplateError::Unclosed(pos)),
                        }
                    }
                    if key.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder(pos));
                    }
                    if !key.chars().all(is_key_char) {
                        return Err(TemplateError::InvalidKey(key));
                    }
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    parts.push(Part::Key(key));
                }
                c => text.push(c),
            }
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }

        Ok(Self {
            source: template.to_owned(),
            parts,
        })
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder keys in order of appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Key(key) => Some(key.as_str()),
            Part::Text(_) => None,
        })
    }

    /// Check that every reserved capture placeholder refers to one of
    /// `wildcards` captures.
    pub fn check_captures(&self, wildcards: usize) -> Result<(), TemplateError> {
        for key in self.keys() {
            let Some(index) = key.strip_prefix(RESERVED_PREFIX) else {
                continue;
            };
            // Only the canonical spelling is ever written by the merge step.
            let parsed = index.parse::<usize>().ok().filter(|n| n.to_string() == index);
            match parsed {
                Some(0) | None => return Err(TemplateError::InvalidCapture(key.to_owned())),
                Some(n) if n > wildcards => {
                    return Err(TemplateError::CaptureOutOfRange {
                        key: key.to_owned(),
                        wildcards,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Render against `data`.
    pub fn render(&self, data: &TemplateData) -> Result<String, RenderError> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Key(key) => {
                    let value = data
                        .get(key)
                        .ok_or_else(|| RenderError::Missing(key.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> TemplateData {
        let mut data = TemplateData::new();
        for (k, v) in pairs {
            data.insert(*k, *v);
        }
        data
    }

    #[test]
    fn test_render_capture() {
        let template = Template::compile("light/{capture_1}/turn-on").unwrap();
        let out = template.render(&data(&[("capture_1", "kitchen")])).unwrap();
        assert_eq!(out, "light/kitchen/turn-on");
    }

    #[test]
    fn test_render_is_idempotent() {
        let template = Template::compile("/{a}/{b}/{a}").unwrap();
        let values = data(&[("a", "1"), ("b", "2")]);
        let first = template.render(&values).unwrap();
        let second = template.render(&values).unwrap();
        assert_eq!(first, "/1/2/1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_escaped_braces() {
        let template = Template::compile("/raw/{{x}}/{v}").unwrap();
        assert_eq!(template.render(&data(&[("v", "1")])).unwrap(), "/raw/{x}/1");
        assert_eq!(template.keys().collect::<Vec<_>>(), vec!["v"]);
    }

    #[test]
    fn test_plain_text() {
        let template = Template::compile("/static/address").unwrap();
        assert_eq!(template.keys().count(), 0);
        assert_eq!(template.render(&TemplateData::new()).unwrap(), "/static/address");
    }

    #[test]
    fn test_missing_key() {
        let template = Template::compile("/{room}/on").unwrap();
        assert_eq!(
            template.render(&TemplateData::new()),
            Err(RenderError::Missing("room".into()))
        );
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(Template::compile("/a/{b"), Err(TemplateError::Unclosed(3)));
        assert_eq!(Template::compile("/a}"), Err(TemplateError::UnmatchedClose(2)));
        assert_eq!(Template::compile("/{}"), Err(TemplateError::EmptyPlaceholder(1)));
        assert_eq!(
            Template::compile("/{ .Payload }"),
            Err(TemplateError::InvalidKey(" .Payload ".into()))
        );
    }

    #[test]
    fn test_check_captures() {
        let template = Template::compile("/{capture_1}/{capture_2}").unwrap();
        assert!(template.check_captures(2).is_ok());
        assert_eq!(
            template.check_captures(1),
            Err(TemplateError::CaptureOutOfRange {
                key: "capture_2".into(),
                wildcards: 1,
            })
        );

        let zero = Template::compile("/{capture_0}").unwrap();
        assert_eq!(
            zero.check_captures(3),
            Err(TemplateError::InvalidCapture("capture_0".into()))
        );

        let named = Template::compile("/{capture_room}").unwrap();
        assert_eq!(
            named.check_captures(3),
            Err(TemplateError::InvalidCapture("capture_room".into()))
        );
    }

    #[test]
    fn test_check_captures_requires_canonical_index() {
        for key in ["capture_01", "capture_001", "capture_00"] {
            let template = Template::compile(&format!("/{{{key}}}")).unwrap();
            assert_eq!(
                template.check_captures(1),
                Err(TemplateError::InvalidCapture(key.into())),
                "{key}"
            );
        }
        let template = Template::compile("/{capture_10}").unwrap();
        assert!(template.check_captures(10).is_ok());
    }
}
