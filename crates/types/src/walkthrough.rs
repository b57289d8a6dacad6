//! Declarative walkthrough definitions.
//!
//! A definition file describes a walkthrough the same way a screen would
//! build one in code: global settings, an optional bubble style, and an
//! ordered list of steps. Files may be authored in JSON or YAML; the format
//! is chosen from the file extension.
//!
//! ```yaml
//! id: getting_started
//! settings:
//!   automatic_delay_ms: 3000
//! style:
//!   preset: white
//! steps:
//!   - kind: highlighted
//!     anchor: { view: slider }
//!     text_location: below
//!     content: { text: "Drag to adjust the volume." }
//!   - kind: standalone
//!     center_offset: { x: 0, y: -4 }
//!     content: { text: "That's all!" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{CellRect, CellSize, EdgeInsets, Offset};
use crate::layout::{LayoutEdge, LayoutPriority, LayoutRelation, TextLocation};

/// Errors raised while loading or validating walkthrough definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to read walkthrough definition {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON walkthrough definition: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML walkthrough definition: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported walkthrough definition format for {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),
    #[error("standalone step {index} needs either `center_offset` or `layout`")]
    MissingPlacement { index: usize },
    #[error("standalone step {index} declares both `center_offset` and `layout`")]
    AmbiguousPlacement { index: usize },
    #[error("step {index} has empty content")]
    EmptyContent { index: usize },
    #[error("step {index} anchors to a view with an empty identifier")]
    EmptyAnchor { index: usize },
    #[error("invalid color '{value}'")]
    InvalidColor { value: String },
    #[error("alpha must be between 0 and 1, got {value}")]
    InvalidAlpha { value: f32 },
}

/// A complete walkthrough as authored in a definition file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkthroughDefinition {
    /// Identity used for the completion flag (`<id>-WalkthroughCompleted`).
    pub id: String,
    /// Optional human-readable title.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub settings: SettingsDefinition,
    #[serde(default)]
    pub style: StyleDefinition,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl WalkthroughDefinition {
    /// Load and validate a definition from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: &Path) -> Result<Self, DefinitionError> {
        let content = fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        let definition = match extension.as_deref() {
            Some("json") => Self::from_json_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            _ => return Err(DefinitionError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(definition)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_yaml::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check the structural invariants serde cannot express.
    ///
    /// A standalone step must carry exactly one placement strategy; an empty
    /// step list is valid and yields a walkthrough that never starts.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for (index, step) in self.steps.iter().enumerate() {
            if step.content().is_empty() {
                return Err(DefinitionError::EmptyContent { index });
            }
            match step {
                StepDefinition::Standalone(standalone) => match (&standalone.center_offset, standalone.layout.is_empty()) {
                    (None, true) => return Err(DefinitionError::MissingPlacement { index }),
                    (Some(_), false) => return Err(DefinitionError::AmbiguousPlacement { index }),
                    _ => {}
                },
                StepDefinition::Highlighted(highlighted) => {
                    if let AnchorDefinition::View(id) = &highlighted.anchor
                        && id.trim().is_empty()
                    {
                        return Err(DefinitionError::EmptyAnchor { index });
                    }
                }
            }
        }
        if let Some(mode) = &self.settings.presentation_mode {
            mode.validate()?;
        }
        Ok(())
    }
}

/// Overrides for walkthrough settings; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDefinition {
    /// Duration of each step transition in milliseconds.
    pub step_transition_ms: Option<u64>,
    /// Padding added to the highlighted area's width and height.
    pub highlighting_offset: Option<Offset>,
    /// Auto-advance delay in milliseconds. Absent means taps drive the walkthrough.
    pub automatic_delay_ms: Option<u64>,
    pub min_bubble_horizontal_margin: Option<u16>,
    pub preferred_bubble_max_width: Option<u16>,
    /// Written as `{ dim: { alpha: 0.5 } }` or a bare `none`.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub presentation_mode: Option<PresentationModeDefinition>,
    /// Whether Esc dismisses the walkthrough.
    pub dismiss_on_escape: Option<bool>,
}

/// How the screen behind the walkthrough is treated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationModeDefinition {
    DimAndHighlight(DimDefinition),
    Dim(DimDefinition),
    None,
}

impl PresentationModeDefinition {
    fn validate(&self) -> Result<(), DefinitionError> {
        match self {
            PresentationModeDefinition::DimAndHighlight(dim) | PresentationModeDefinition::Dim(dim) => match dim.alpha {
                Some(alpha) if !(0.0..=1.0).contains(&alpha) => Err(DefinitionError::InvalidAlpha { value: alpha }),
                _ => Ok(()),
            },
            PresentationModeDefinition::None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimDefinition {
    /// Color name or `#RRGGBB` hex value.
    pub color: Option<String>,
    pub alpha: Option<f32>,
}

/// Named bubble style presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    #[default]
    Default,
    White,
}

/// Bubble style: a preset plus optional field overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleDefinition {
    pub preset: StylePreset,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub shadow: Option<ShadowDefinition>,
    pub corner_radius: Option<u16>,
    pub text_insets: Option<EdgeInsets>,
    pub y_offset: Option<u16>,
    pub arrow_size: Option<CellSize>,
}

/// Shadow override; `none` removes the preset's shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowDefinition {
    None,
    Light,
    Dark,
    Custom {
        #[serde(default)]
        offset: Offset,
        color: String,
        opacity: f32,
    },
}

/// One authored step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDefinition {
    Standalone(StandaloneStepDefinition),
    Highlighted(HighlightedStepDefinition),
}

impl StepDefinition {
    pub fn content(&self) -> &ContentDefinition {
        match self {
            StepDefinition::Standalone(step) => &step.content,
            StepDefinition::Highlighted(step) => &step.content,
        }
    }

    pub fn needs_interaction(&self) -> bool {
        match self {
            StepDefinition::Standalone(step) => step.needs_interaction,
            StepDefinition::Highlighted(step) => step.needs_interaction,
        }
    }

    pub fn auto_advance_ms(&self) -> Option<u64> {
        match self {
            StepDefinition::Standalone(step) => step.auto_advance_ms,
            StepDefinition::Highlighted(step) => step.auto_advance_ms,
        }
    }
}

/// A bubble that is not attached to any area of the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandaloneStepDefinition {
    pub content: ContentDefinition,
    /// Offset of the bubble centre from the container centre.
    #[serde(default)]
    pub center_offset: Option<Offset>,
    /// Explicit constraint rules against the container.
    #[serde(default)]
    pub layout: Vec<LayoutRuleDefinition>,
    #[serde(default)]
    pub needs_interaction: bool,
    #[serde(default)]
    pub auto_advance_ms: Option<u64>,
}

/// A bubble pointing at an area of the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightedStepDefinition {
    pub content: ContentDefinition,
    pub anchor: AnchorDefinition,
    #[serde(default)]
    pub text_location: TextLocation,
    #[serde(default)]
    pub needs_interaction: bool,
    #[serde(default)]
    pub auto_advance_ms: Option<u64>,
}

/// Target area of a highlighted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorDefinition {
    /// Identifier of a view registered by the host screen.
    View(String),
    /// Fixed rectangle relative to the container origin.
    Rect(CellRect),
}

/// `bubble.<edge> <relation> container.<reference> + constant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRuleDefinition {
    pub edge: LayoutEdge,
    #[serde(default)]
    pub relation: LayoutRelation,
    pub reference: LayoutEdge,
    #[serde(default)]
    pub constant: i32,
    #[serde(default)]
    pub priority: LayoutPriority,
}

/// Bubble body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentDefinition {
    Text(String),
    Rich(Vec<SpanDefinition>),
}

impl ContentDefinition {
    pub fn is_empty(&self) -> bool {
        match self {
            ContentDefinition::Text(text) => text.trim().is_empty(),
            ContentDefinition::Rich(spans) => spans.iter().all(|span| span.text.is_empty()),
        }
    }
}

/// Styled run of rich text. A `\n` inside `text` starts a new line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanDefinition {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r##"
id: settings_tour
settings:
  automatic_delay_ms: 3000
  presentation_mode:
    dim_and_highlight: { color: "#000000", alpha: 0.6 }
style:
  preset: white
  corner_radius: 0
steps:
  - kind: standalone
    layout:
      - { edge: center_x, reference: center_x, priority: low }
      - { edge: top, reference: top, constant: 3 }
    content: { text: "Welcome!" }
  - kind: highlighted
    anchor: { view: slider }
    text_location: above
    needs_interaction: true
    content:
      rich:
        - { text: "Bold ", bold: true }
        - { text: "plain" }
  - kind: highlighted
    anchor: { rect: { x: 2, y: 3, width: 10, height: 1 } }
    content: { text: "A fixed area" }
"##;

    #[test]
    fn deserializes_yaml_walkthrough() {
        let definition = WalkthroughDefinition::from_yaml_str(SAMPLE_YAML).expect("deserialize walkthrough");

        assert_eq!(definition.id, "settings_tour");
        assert_eq!(definition.settings.automatic_delay_ms, Some(3000));
        assert_eq!(definition.style.preset, StylePreset::White);
        assert_eq!(definition.steps.len(), 3);
        assert_eq!(
            definition.settings.presentation_mode,
            Some(PresentationModeDefinition::DimAndHighlight(DimDefinition {
                color: Some("#000000".to_string()),
                alpha: Some(0.6)
            }))
        );
        assert!(definition.steps[1].needs_interaction());
        match &definition.steps[0] {
            StepDefinition::Standalone(step) => {
                assert_eq!(step.layout.len(), 2);
                assert_eq!(step.layout[0].priority, LayoutPriority::Low);
                assert_eq!(step.layout[1].relation, LayoutRelation::Equal);
                assert_eq!(step.layout[1].constant, 3);
            }
            other => panic!("expected standalone step, got {other:?}"),
        }
        match &definition.steps[2] {
            StepDefinition::Highlighted(step) => {
                assert_eq!(step.anchor, AnchorDefinition::Rect(CellRect::new(2, 3, 10, 1)));
                assert_eq!(step.text_location, TextLocation::Below);
            }
            other => panic!("expected highlighted step, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_json_walkthrough() {
        let json = r#"{
            "id": "json_tour",
            "settings": { "presentation_mode": "none" },
            "steps": [
                { "kind": "standalone", "center_offset": { "x": 0, "y": -4 }, "content": { "text": "Hi" } }
            ]
        }"#;
        let definition = WalkthroughDefinition::from_json_str(json).unwrap();
        assert_eq!(definition.settings.presentation_mode, Some(PresentationModeDefinition::None));
        assert_eq!(definition.steps.len(), 1);
    }

    #[test]
    fn standalone_without_placement_fails_loudly() {
        let yaml = r#"
id: broken
steps:
  - kind: standalone
    content: { text: "Where do I go?" }
"#;
        let error = WalkthroughDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(error, DefinitionError::MissingPlacement { index: 0 }));
    }

    #[test]
    fn standalone_with_both_placements_is_rejected() {
        let yaml = r#"
id: broken
steps:
  - kind: standalone
    center_offset: { x: 1, y: 1 }
    layout:
      - { edge: left, reference: left }
    content: { text: "Two homes" }
"#;
        let error = WalkthroughDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(error, DefinitionError::AmbiguousPlacement { index: 0 }));
    }

    #[test]
    fn empty_content_and_anchor_are_rejected() {
        let yaml = r#"
id: broken
steps:
  - kind: highlighted
    anchor: { view: "  " }
    content: { text: "Somewhere" }
"#;
        assert!(matches!(
            WalkthroughDefinition::from_yaml_str(yaml).unwrap_err(),
            DefinitionError::EmptyAnchor { index: 0 }
        ));

        let yaml = r#"
id: broken
steps:
  - kind: highlighted
    anchor: { view: slider }
    content: { text: "" }
"#;
        assert!(matches!(
            WalkthroughDefinition::from_yaml_str(yaml).unwrap_err(),
            DefinitionError::EmptyContent { index: 0 }
        ));
    }

    #[test]
    fn alpha_outside_unit_range_is_rejected() {
        let json = r#"{ "id": "x", "settings": { "presentation_mode": { "dim": { "alpha": 1.5 } } } }"#;
        assert!(matches!(
            WalkthroughDefinition::from_json_str(json).unwrap_err(),
            DefinitionError::InvalidAlpha { .. }
        ));
    }

    #[test]
    fn empty_step_list_is_valid() {
        let definition = WalkthroughDefinition::from_json_str(r#"{ "id": "empty" }"#).unwrap();
        assert!(definition.steps.is_empty());
    }

    #[test]
    fn repository_sample_walkthrough_parses() {
        let yaml_text = include_str!("../../../walkthroughs/getting_started.yaml");
        let definition = WalkthroughDefinition::from_yaml_str(yaml_text).expect("parse sample walkthrough");
        assert_eq!(definition.id, "getting_started");
        assert!(!definition.steps.is_empty());
        assert!(matches!(
            definition.settings.presentation_mode,
            Some(PresentationModeDefinition::DimAndHighlight(DimDefinition { alpha: Some(_), .. }))
        ));

        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../walkthroughs/getting_started.yaml");
        assert_eq!(WalkthroughDefinition::from_path(&path).expect("load sample from disk"), definition);
    }

    #[test]
    fn mode_and_shadow_accept_maps_and_bare_names() {
        let yaml = r##"
id: styled
settings:
  presentation_mode: { dim: { alpha: 0.4 } }
style:
  shadow:
    custom: { offset: { x: 2, y: 1 }, color: "#101010", opacity: 0.5 }
"##;
        let definition = WalkthroughDefinition::from_yaml_str(yaml).expect("map forms parse");
        assert_eq!(
            definition.settings.presentation_mode,
            Some(PresentationModeDefinition::Dim(DimDefinition {
                color: None,
                alpha: Some(0.4)
            }))
        );
        assert_eq!(
            definition.style.shadow,
            Some(ShadowDefinition::Custom {
                offset: Offset::new(2, 1),
                color: "#101010".to_string(),
                opacity: 0.5
            })
        );

        let yaml = "id: plain\nsettings: { presentation_mode: none }\nstyle: { shadow: dark }\n";
        let definition = WalkthroughDefinition::from_yaml_str(yaml).expect("bare names parse");
        assert_eq!(definition.settings.presentation_mode, Some(PresentationModeDefinition::None));
        assert_eq!(definition.style.shadow, Some(ShadowDefinition::Dark));
        assert_eq!(WalkthroughDefinition::from_yaml_str("id: bare\n").unwrap().style.shadow, None);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("lumen-definition-test.toml");
        fs::write(&path, "id = 'x'").unwrap();
        let error = WalkthroughDefinition::from_path(&path).unwrap_err();
        assert!(matches!(error, DefinitionError::UnsupportedFormat(_)));
        let _ = fs::remove_file(&path);
    }
}
