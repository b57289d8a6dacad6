//! Walkthroughs loaded from definition files.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use lumen_types::{
    AnchorDefinition, CellSize, ContentDefinition, DefinitionError, LayoutRuleDefinition, PresentationModeDefinition,
    SettingsDefinition, ShadowDefinition, SpanDefinition, StepDefinition, StyleDefinition, StylePreset, WalkthroughDefinition,
};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use tracing::warn;

use super::anchors::ViewId;
use super::content::Content;
use super::provider::WalkthroughProvider;
use super::settings::{DEFAULT_DIM_ALPHA, PresentationMode, WalkthroughSettings};
use super::step::{Anchor, HighlightedStep, StandalonePlacement, StandaloneStep, Step};
use super::style::{BubbleStyle, ShadowStyle};
use crate::layout::constraint::{LayoutConstraint, Reference};

/// A validated definition file acting as a walkthrough provider.
#[derive(Debug, Clone)]
pub struct DefinedWalkthrough {
    definition: WalkthroughDefinition,
    settings: WalkthroughSettings,
    style: BubbleStyle,
}

impl DefinedWalkthrough {
    /// Validate `definition` and resolve its settings, style and colors.
    pub fn new(definition: WalkthroughDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;
        let settings = settings_from(&definition.settings)?;
        let style = style_from(&definition.style)?;
        build_steps(&definition)?;
        Ok(Self {
            definition,
            settings,
            style,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, DefinitionError> {
        Self::new(WalkthroughDefinition::from_path(path)?)
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn title(&self) -> Option<&str> {
        self.definition.title.as_deref()
    }

    pub fn settings(&self) -> &WalkthroughSettings {
        &self.settings
    }

    pub fn style(&self) -> &BubbleStyle {
        &self.style
    }

    pub fn step_count(&self) -> usize {
        self.definition.steps.len()
    }

    /// Distinct view identifiers the steps anchor to, in first-use order.
    pub fn anchor_views(&self) -> Vec<&str> {
        let mut views: Vec<&str> = Vec::new();
        for step in &self.definition.steps {
            if let StepDefinition::Highlighted(step) = step
                && let AnchorDefinition::View(id) = &step.anchor
                && !views.contains(&id.as_str())
            {
                views.push(id);
            }
        }
        views
    }
}

impl WalkthroughProvider for DefinedWalkthrough {
    fn walkthrough_steps(&self) -> Vec<Step> {
        build_steps(&self.definition).unwrap_or_else(|error| {
            warn!(id = %self.definition.id, %error, "walkthrough definition no longer builds");
            Vec::new()
        })
    }

    fn walkthrough_identity(&self) -> String {
        self.definition.id.clone()
    }
}

fn parse_color(value: &str) -> Result<Color, DefinitionError> {
    Color::from_str(value.trim()).map_err(|_| DefinitionError::InvalidColor { value: value.to_string() })
}

fn settings_from(definition: &SettingsDefinition) -> Result<WalkthroughSettings, DefinitionError> {
    let defaults = WalkthroughSettings::default();
    let to_cells = |value: i32| u16::try_from(value.max(0)).unwrap_or(u16::MAX);
    Ok(WalkthroughSettings {
        step_transition: definition
            .step_transition_ms
            .map_or(defaults.step_transition, Duration::from_millis),
        highlighting_offset: definition
            .highlighting_offset
            .map_or(defaults.highlighting_offset, |offset| CellSize::new(to_cells(offset.x), to_cells(offset.y))),
        automatic_delay: definition.automatic_delay_ms.map(Duration::from_millis).or(defaults.automatic_delay),
        min_bubble_horizontal_margin: definition
            .min_bubble_horizontal_margin
            .unwrap_or(defaults.min_bubble_horizontal_margin),
        preferred_bubble_max_width: definition.preferred_bubble_max_width.or(defaults.preferred_bubble_max_width),
        presentation_mode: match &definition.presentation_mode {
            Some(mode) => presentation_mode_from(mode)?,
            None => defaults.presentation_mode,
        },
        dismiss_on_escape: definition.dismiss_on_escape.unwrap_or(defaults.dismiss_on_escape),
    })
}

fn presentation_mode_from(definition: &PresentationModeDefinition) -> Result<PresentationMode, DefinitionError> {
    let dim = |color: &Option<String>, alpha: Option<f32>| -> Result<(Color, f32), DefinitionError> {
        let color = color.as_deref().map_or(Ok(Color::Rgb(0, 0, 0)), parse_color)?;
        Ok((color, alpha.unwrap_or(DEFAULT_DIM_ALPHA)))
    };
    Ok(match definition {
        PresentationModeDefinition::DimAndHighlight(definition) => {
            let (color, alpha) = dim(&definition.color, definition.alpha)?;
            PresentationMode::DimAndHighlight { color, alpha }
        }
        PresentationModeDefinition::Dim(definition) => {
            let (color, alpha) = dim(&definition.color, definition.alpha)?;
            PresentationMode::Dim { color, alpha }
        }
        PresentationModeDefinition::None => PresentationMode::None,
    })
}

fn style_from(definition: &StyleDefinition) -> Result<BubbleStyle, DefinitionError> {
    let mut style = match definition.preset {
        StylePreset::Default => BubbleStyle::default(),
        StylePreset::White => BubbleStyle::white(),
    };
    if let Some(color) = &definition.text_color {
        style.text_color = parse_color(color)?;
    }
    if let Some(color) = &definition.background_color {
        style.background_color = parse_color(color)?;
    }
    if let Some(shadow) = &definition.shadow {
        style.shadow = match shadow {
            ShadowDefinition::None => None,
            ShadowDefinition::Light => Some(ShadowStyle::light()),
            ShadowDefinition::Dark => Some(ShadowStyle::dark()),
            ShadowDefinition::Custom { offset, color, opacity } => Some(ShadowStyle {
                offset: *offset,
                color: parse_color(color)?,
                opacity: opacity.clamp(0.0, 1.0),
            }),
        };
    }
    if let Some(radius) = definition.corner_radius {
        style.corner_radius = radius;
    }
    if let Some(insets) = definition.text_insets {
        style.text_insets = insets;
    }
    if let Some(offset) = definition.y_offset {
        style.y_offset_to_highlighted_area = offset;
    }
    if let Some(size) = definition.arrow_size {
        style.arrow_size = size;
    }
    Ok(style)
}

fn build_steps(definition: &WalkthroughDefinition) -> Result<Vec<Step>, DefinitionError> {
    definition.steps.iter().map(build_step).collect()
}

fn build_step(definition: &StepDefinition) -> Result<Step, DefinitionError> {
    let content = build_content(definition.content())?;
    let auto_advance = definition.auto_advance_ms().map(Duration::from_millis);
    let step = match definition {
        StepDefinition::Standalone(definition) => {
            let placement = match definition.center_offset {
                Some(offset) => StandalonePlacement::CenterOffset(offset),
                None => {
                    let constraints: Vec<LayoutConstraint> = definition.layout.iter().map(layout_rule).collect();
                    StandalonePlacement::Layout(Box::new(move |_| constraints.clone()))
                }
            };
            Step::Standalone(StandaloneStep {
                content,
                placement,
                needs_interaction: definition.needs_interaction,
                auto_advance,
            })
        }
        StepDefinition::Highlighted(definition) => Step::Highlighted(HighlightedStep {
            content,
            anchor: match &definition.anchor {
                AnchorDefinition::View(id) => Anchor::View(ViewId::new(id.as_str())),
                AnchorDefinition::Rect(rect) => Anchor::Rect(Rect::new(rect.x, rect.y, rect.width, rect.height)),
            },
            text_location: definition.text_location,
            needs_interaction: definition.needs_interaction,
            auto_advance,
        }),
    };
    Ok(step)
}

fn layout_rule(rule: &LayoutRuleDefinition) -> LayoutConstraint {
    LayoutConstraint::new(rule.edge, rule.relation, Reference::Container(rule.reference), rule.constant).with_priority(rule.priority)
}

fn build_content(definition: &ContentDefinition) -> Result<Content, DefinitionError> {
    match definition {
        ContentDefinition::Text(text) => Ok(Content::plain(text.as_str())),
        ContentDefinition::Rich(spans) => {
            let mut lines = vec![Line::default()];
            for span in spans {
                let style = span_style(span)?;
                for (index, part) in span.text.split('\n').enumerate() {
                    if index > 0 {
                        lines.push(Line::default());
                    }
                    if let Some(line) = lines.last_mut()
                        && !part.is_empty()
                    {
                        line.push_span(Span::styled(part.to_string(), style));
                    }
                }
            }
            Ok(Content::rich(Text::from(lines)))
        }
    }
}

fn span_style(span: &SpanDefinition) -> Result<Style, DefinitionError> {
    let mut style = Style::default();
    if span.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.underline {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if let Some(color) = &span.color {
        style = style.fg(parse_color(color)?);
    }
    Ok(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::constraint::{LayoutContext, solve};
    use crate::walkthrough::anchors::AnchorMap;
    use lumen_types::{LayoutEdge, LayoutPriority, TextLocation};

    const SAMPLE: &str = include_str!("../../../../walkthroughs/getting_started.yaml");

    fn sample() -> DefinedWalkthrough {
        DefinedWalkthrough::new(WalkthroughDefinition::from_yaml_str(SAMPLE).unwrap()).unwrap()
    }

    #[test]
    fn sample_definition_builds_every_step() {
        let walkthrough = sample();
        assert_eq!(walkthrough.id(), "getting_started");
        assert_eq!(walkthrough.completion_key(), "getting_started-WalkthroughCompleted");
        assert_eq!(walkthrough.settings().automatic_delay, Some(Duration::from_secs(4)));
        assert_eq!(walkthrough.style(), &BubbleStyle::white());
        assert_eq!(walkthrough.anchor_views(), vec!["slider", "button2"]);

        let steps = walkthrough.walkthrough_steps();
        assert_eq!(steps.len(), 5);
        assert!(matches!(&steps[3], Step::Highlighted(step) if step.anchor == Anchor::Rect(Rect::new(0, 0, 12, 3))));
        assert!(matches!(&steps[4], Step::Standalone(step) if matches!(step.placement, StandalonePlacement::CenterOffset(_))));
    }

    #[test]
    fn layout_rules_resolve_against_the_container() {
        let steps = sample().walkthrough_steps();
        let Step::Standalone(StandaloneStep {
            placement: StandalonePlacement::Layout(handler),
            ..
        }) = &steps[0]
        else {
            panic!("first step uses a layout handler");
        };
        let anchors = AnchorMap::new();
        let context = LayoutContext::new(Rect::new(0, 0, 80, 24), &anchors);
        let constraints = handler(&context);
        assert_eq!(constraints[0].priority, LayoutPriority::Low);
        assert_eq!(constraints[1].reference, Reference::Container(LayoutEdge::Top));

        let bounds = solve(&constraints, CellSize::new(20, 3), &context).unwrap();
        assert_eq!((bounds.center_x(), bounds.top()), (40, 4));
    }

    #[test]
    fn rich_spans_keep_styles_and_split_lines() {
        let content = build_content(&ContentDefinition::Rich(vec![
            SpanDefinition {
                text: "Bold\nnext".into(),
                bold: true,
                ..SpanDefinition::default()
            },
            SpanDefinition {
                text: " red".into(),
                color: Some("red".into()),
                ..SpanDefinition::default()
            },
        ]))
        .unwrap();
        let Content::RichText(text) = content else {
            panic!("expected rich text");
        };
        assert_eq!(text.lines.len(), 2);
        assert_eq!(text.lines[0].spans[0].style.add_modifier, Modifier::BOLD);
        assert_eq!(text.lines[1].spans[1].style.fg, Some(Color::Red));
    }

    #[test]
    fn invalid_colors_are_reported() {
        let yaml = r##"
id: broken
style: { background_color: "#12345G" }
steps:
  - kind: highlighted
    anchor: { view: title }
    text_location: below
    content: { text: "x" }
"##;
        let error = DefinedWalkthrough::new(WalkthroughDefinition::from_yaml_str(yaml).unwrap()).unwrap_err();
        assert!(matches!(error, DefinitionError::InvalidColor { value } if value == "#12345G"));
    }

    #[test]
    fn settings_fill_defaults_and_parse_modes() {
        let yaml = r#"
id: modes
settings:
  presentation_mode: { dim: { alpha: 0.5 } }
  dismiss_on_escape: false
steps:
  - kind: highlighted
    anchor: { view: title }
    text_location: above
    needs_interaction: true
    content: { text: "x" }
"#;
        let walkthrough = DefinedWalkthrough::new(WalkthroughDefinition::from_yaml_str(yaml).unwrap()).unwrap();
        let settings = walkthrough.settings();
        assert_eq!(
            settings.presentation_mode,
            PresentationMode::Dim {
                color: Color::Rgb(0, 0, 0),
                alpha: 0.5
            }
        );
        assert!(!settings.dismiss_on_escape);
        assert_eq!(settings.step_transition, WalkthroughSettings::default().step_transition);

        let steps = walkthrough.walkthrough_steps();
        assert!(steps[0].needs_interaction());
        assert!(matches!(&steps[0], Step::Highlighted(step) if step.text_location == TextLocation::Above));
    }
}
