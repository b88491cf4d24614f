use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{LayoutDirection, Margins, Orientation};

/// Layout-wide configuration.
///
/// Every field has a default, so a partial JSON document such as `{"horizontal_spacing": 4}`
/// is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Default horizontal spacing; overrides the style when set to a non-negative value.
    pub horizontal_spacing: Option<f64>,
    pub vertical_spacing: Option<f64>,
    /// Fuse chains, duplicates and zero-sized anchors before solving.
    pub simplify: bool,
    pub contents_margins: Margins,
    pub direction: LayoutDirection,
    /// Overrides the simplex pivot budget (which otherwise grows with the tableau size).
    pub max_simplex_iterations: Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            horizontal_spacing: None,
            vertical_spacing: None,
            simplify: true,
            contents_margins: Margins::default(),
            direction: LayoutDirection::LeftToRight,
            max_simplex_iterations: None,
        }
    }
}

impl LayoutOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configured spacing for `orientation`, if it should override the style.
    pub fn spacing(&self, orientation: Orientation) -> Option<f64> {
        let value = match orientation {
            Orientation::Horizontal => self.horizontal_spacing,
            Orientation::Vertical => self.vertical_spacing,
        }?;
        (value.is_finite() && value >= 0.0).then_some(value)
    }

    pub(crate) fn set_spacing(&mut self, orientation: Orientation, value: Option<f64>) {
        match orientation {
            Orientation::Horizontal => self.horizontal_spacing = value,
            Orientation::Vertical => self.vertical_spacing = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fill_in_defaults() {
        let options =
            LayoutOptions::from_json(r#"{"horizontal_spacing": 4, "direction": "right_to_left"}"#)
                .unwrap();
        assert_eq!(options.horizontal_spacing, Some(4.0));
        assert_eq!(options.direction, LayoutDirection::RightToLeft);
        assert!(options.simplify);
        assert_eq!(options.contents_margins, Margins::default());
    }

    #[test]
    fn negative_spacing_defers_to_the_style() {
        let options = LayoutOptions {
            vertical_spacing: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(options.spacing(Orientation::Vertical), None);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(LayoutOptions::from_json(r#"{"simplify": "yes"}"#).is_err());
    }

    #[test]
    fn json_round_trips() {
        let options = LayoutOptions {
            contents_margins: Margins::uniform(2.0),
            max_simplex_iterations: Some(500),
            ..Default::default()
        };
        let text = options.to_json().unwrap();
        assert_eq!(LayoutOptions::from_json(&text).unwrap(), options);
    }
}
