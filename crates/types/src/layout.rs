//! Vocabulary for bubble layout constraints.

use serde::{Deserialize, Serialize};

/// Horizontal or vertical layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Edge (or centre line) of a laid out item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutEdge {
    Left,
    Right,
    CenterX,
    Top,
    Bottom,
    CenterY,
}

impl LayoutEdge {
    pub const fn axis(self) -> Axis {
        match self {
            LayoutEdge::Left | LayoutEdge::Right | LayoutEdge::CenterX => Axis::Horizontal,
            LayoutEdge::Top | LayoutEdge::Bottom | LayoutEdge::CenterY => Axis::Vertical,
        }
    }
}

/// Relation between a constrained edge and its reference value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRelation {
    #[default]
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

/// Constraint priority. Required constraints always win over low ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPriority {
    Low,
    #[default]
    Required,
}

/// Side of the highlighted area on which the bubble text appears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLocation {
    Above,
    #[default]
    Below,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_report_their_axis() {
        assert_eq!(LayoutEdge::CenterX.axis(), Axis::Horizontal);
        assert_eq!(LayoutEdge::Bottom.axis(), Axis::Vertical);
    }

    #[test]
    fn required_outranks_low() {
        assert!(LayoutPriority::Required > LayoutPriority::Low);
    }
}
