//! Style properties and per-property merging.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Style set by a conditional-format rule.
///
/// Wire keys are `bg`, `color`, `fontWeight`, `fontStyle`, `textDecoration`,
/// `border` and `class`. Numbers are accepted where strings are expected
/// (`"fontWeight": 700`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProps {
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl StyleProps {
    pub fn is_empty(&self) -> bool {
        self == &StyleProps::default()
    }
}

fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Effective style of a cell or row after all matching rules.
///
/// Later merges overwrite earlier ones property by property; classes
/// accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_decoration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
}

impl CellStyle {
    /// Applies the properties a rule sets, leaving the others untouched.
    pub fn merge(&mut self, props: &StyleProps) {
        overwrite(&mut self.background, &props.bg);
        overwrite(&mut self.color, &props.color);
        overwrite(&mut self.font_weight, &props.font_weight);
        overwrite(&mut self.font_style, &props.font_style);
        overwrite(&mut self.text_decoration, &props.text_decoration);
        overwrite(&mut self.border, &props.border);
        if let Some(class) = &props.class {
            self.add_class(class);
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &CellStyle::default()
    }

    /// Inline CSS declarations for the set properties.
    pub fn css(&self) -> String {
        [
            ("background-color", &self.background),
            ("color", &self.color),
            ("font-weight", &self.font_weight),
            ("font-style", &self.font_style),
            ("text-decoration", &self.text_decoration),
            ("border", &self.border),
        ]
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}: {v};")))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

fn overwrite(slot: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_per_property() {
        let mut style = CellStyle::default();
        style.merge(&StyleProps {
            font_weight: Some("bold".into()),
            bg: Some("yellow".into()),
            ..Default::default()
        });
        style.merge(&StyleProps {
            bg: Some("red".into()),
            ..Default::default()
        });
        assert_eq!(style.background.as_deref(), Some("red"));
        assert_eq!(style.font_weight.as_deref(), Some("bold"));
    }

    #[test]
    fn test_classes_accumulate() {
        let mut style = CellStyle::default();
        style.merge(&StyleProps { class: Some("a".into()), ..Default::default() });
        style.merge(&StyleProps { class: Some("b".into()), ..Default::default() });
        style.merge(&StyleProps { class: Some("a".into()), ..Default::default() });
        assert_eq!(style.classes, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_numbers_as_strings() {
        let props: StyleProps = serde_json::from_str(r##"{"fontWeight": 700, "bg": "#fee"}"##).unwrap();
        assert_eq!(props.font_weight.as_deref(), Some("700"));
        assert_eq!(props.bg.as_deref(), Some("#fee"));
    }

    #[test]
    fn test_css() {
        let mut style = CellStyle::default();
        style.merge(&StyleProps {
            bg: Some("red".into()),
            font_weight: Some("bold".into()),
            ..Default::default()
        });
        assert_eq!(style.css(), "background-color: red; font-weight: bold;");
    }
}
