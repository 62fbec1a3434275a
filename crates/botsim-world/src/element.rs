//! Declarative element descriptors

use serde::{Deserialize, Serialize};

/// Descriptor for one object to be materialised by an [`ObjectFactory`].
///
/// Device configs list these under an interactor's `elements` option. Any
/// keys this struct does not recognise are kept in `extra` and carried onto
/// the constructed object untouched.
///
/// [`ObjectFactory`]: crate::ObjectFactory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    pub key: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Local position inside the owning frame
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDef>,
    #[serde(flatten)]
    pub extra: toml::Table,
}

fn default_kind() -> String {
    "object".to_string()
}

/// Visual attributes of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualDef {
    /// Draw depth; larger values render on top
    #[serde(default, alias = "zPos")]
    pub z_pos: f32,
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl ElementDef {
    pub fn new(key: impl Into<String>, position: [f32; 2]) -> Self {
        Self {
            key: key.into(),
            kind: default_kind(),
            position,
            visual: None,
            extra: toml::Table::new(),
        }
    }

    pub fn with_visual(mut self, z_pos: f32) -> Self {
        self.visual = Some(VisualDef {
            z_pos,
            extra: toml::Table::new(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_deserialization() {
        let toml_str = r#"
key = "light"
position = [0.5, -1]
radius = 0.2

[visual]
zPos = 2
fill = "button_red"
"#;
        let def: ElementDef = toml::from_str(toml_str).unwrap();
        assert_eq!(def.key, "light");
        assert_eq!(def.kind, "object");
        assert_eq!(def.position, [0.5, -1.0]);
        let visual = def.visual.as_ref().unwrap();
        assert_eq!(visual.z_pos, 2.0);
        assert_eq!(
            visual.extra.get("fill").and_then(|v| v.as_str()),
            Some("button_red")
        );
        assert_eq!(def.extra.get("radius").and_then(|v| v.as_float()), Some(0.2));
    }

    #[test]
    fn test_element_defaults() {
        let def: ElementDef = toml::from_str(r#"key = "bare""#).unwrap();
        assert_eq!(def.position, [0.0, 0.0]);
        assert!(def.visual.is_none());
        assert!(def.extra.is_empty());
    }
}
