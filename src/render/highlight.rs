use crate::theme::{parse_color, ParseColorError};
use ordered_float::OrderedFloat;
use plotters::style::RGBColor;
use std::collections::BTreeMap;
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;

/// How to mark a day whose value matches a highlight key
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Highlight {
    pub(crate) color: RGBColor,
    pub(crate) label: Option<String>,
}

impl Highlight {
    pub(crate) fn new(color: RGBColor) -> Highlight {
        Highlight { color, label: None }
    }

    pub(crate) fn label<S: Into<String>>(mut self, label: S) -> Highlight {
        self.label = Some(label.into());
        self
    }
}

/// Highlights keyed by the exact day value they apply to.  `-0.0` and `0.0`
/// are the same key; NaN days never match.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct HighlightMap(BTreeMap<OrderedFloat<f64>, Highlight>);

impl HighlightMap {
    pub(crate) fn new() -> HighlightMap {
        HighlightMap::default()
    }

    pub(crate) fn insert(&mut self, value: f64, highlight: Highlight) -> Option<Highlight> {
        self.0.insert(OrderedFloat(value), highlight)
    }

    pub(crate) fn get(&self, value: f64) -> Option<&Highlight> {
        if value.is_nan() {
            return None;
        }
        self.0.get(&OrderedFloat(value))
    }
}

#[cfg(test)]
impl HighlightMap {
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<HighlightRule> for HighlightMap {
    fn from_iter<I: IntoIterator<Item = HighlightRule>>(iter: I) -> Self {
        let mut map = HighlightMap::new();
        map.extend(iter);
        map
    }
}

impl Extend<HighlightRule> for HighlightMap {
    fn extend<I: IntoIterator<Item = HighlightRule>>(&mut self, iter: I) {
        for HighlightRule { value, highlight } in iter {
            self.insert(value, highlight);
        }
    }
}

/// A highlight as written on the command line: `VALUE=COLOR[:LABEL]`
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HighlightRule {
    pub(crate) value: f64,
    pub(crate) highlight: Highlight,
}

impl FromStr for HighlightRule {
    type Err = ParseHighlightError;

    fn from_str(s: &str) -> Result<HighlightRule, ParseHighlightError> {
        let (value, rest) = s.split_once('=').ok_or(ParseHighlightError::Syntax)?;
        let value = value.trim().parse::<f64>()?;
        if value.is_nan() {
            return Err(ParseHighlightError::NotANumber);
        }
        let (color, label) = match rest.split_once(':') {
            Some((color, label)) => (color, Some(label)),
            None => (rest, None),
        };
        let mut highlight = Highlight::new(parse_color(color.trim())?);
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            highlight = highlight.label(label);
        }
        Ok(HighlightRule { value, highlight })
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum ParseHighlightError {
    #[error("expected VALUE=COLOR[:LABEL]")]
    Syntax,
    #[error("invalid highlight value")]
    Value(#[from] ParseFloatError),
    #[error("highlight value cannot be NaN")]
    NotANumber,
    #[error(transparent)]
    Color(#[from] ParseColorError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let mut map = HighlightMap::new();
        map.insert(100.0, Highlight::new(RGBColor(255, 0, 0)).label("Holiday"));
        assert_eq!(
            map.get(100.0),
            Some(&Highlight {
                color: RGBColor(255, 0, 0),
                label: Some(String::from("Holiday")),
            })
        );
        assert_eq!(map.get(100.000_001), None);
        assert_eq!(map.get(99.0), None);
    }

    #[test]
    fn test_zero_key_matches_zero() {
        let mut map = HighlightMap::new();
        map.insert(0.0, Highlight::new(RGBColor(128, 128, 128)));
        assert!(map.get(0.0).is_some());
        assert!(map.get(-0.0).is_some());
        assert!(map.get(f64::MIN_POSITIVE).is_none());
    }

    #[test]
    fn test_negative_zero_key() {
        let mut map = HighlightMap::new();
        map.insert(-0.0, Highlight::new(RGBColor(128, 128, 128)));
        assert!(map.get(0.0).is_some());
    }

    #[test]
    fn test_nan_never_matches() {
        let mut map = HighlightMap::new();
        map.insert(f64::NAN, Highlight::new(RGBColor(255, 0, 0)));
        assert!(map.get(f64::NAN).is_none());
        assert!(map.get(0.0).is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut map = HighlightMap::new();
        assert!(map.is_empty());
        map.insert(1.0, Highlight::new(RGBColor(0, 0, 255)));
        let old = map.insert(1.0, Highlight::new(RGBColor(255, 0, 0)));
        assert_eq!(old, Some(Highlight::new(RGBColor(0, 0, 255))));
        assert_eq!(map.get(1.0).map(|h| h.color), Some(RGBColor(255, 0, 0)));
    }

    #[test]
    fn test_parse_rule() {
        let rule = "100=red:Public holiday"
            .parse::<HighlightRule>()
            .expect("rule should parse");
        assert_eq!(rule.value, 100.0);
        assert_eq!(
            rule.highlight,
            Highlight::new(RGBColor(255, 0, 0)).label("Public holiday")
        );

        let rule = "-2.5=#00ff00".parse::<HighlightRule>().expect("rule should parse");
        assert_eq!(rule.value, -2.5);
        assert_eq!(rule.highlight, Highlight::new(RGBColor(0, 255, 0)));

        let rule = "0=k:".parse::<HighlightRule>().expect("rule should parse");
        assert_eq!(rule.highlight.label, None);
    }

    #[test]
    fn test_parse_rule_errors() {
        assert_eq!(
            "red".parse::<HighlightRule>(),
            Err(ParseHighlightError::Syntax)
        );
        assert!(matches!(
            "x=red".parse::<HighlightRule>(),
            Err(ParseHighlightError::Value(_))
        ));
        assert_eq!(
            "NaN=red".parse::<HighlightRule>(),
            Err(ParseHighlightError::NotANumber)
        );
        assert!(matches!(
            "1=reddish".parse::<HighlightRule>(),
            Err(ParseHighlightError::Color(_))
        ));
    }

    #[test]
    fn test_collect_rules() {
        let map = ["1=red:One", "2=blue"]
            .into_iter()
            .map(|s| s.parse::<HighlightRule>())
            .collect::<Result<HighlightMap, _>>()
            .expect("rules should parse");
        assert_eq!(map.get(1.0).and_then(|h| h.label.as_deref()), Some("One"));
        assert_eq!(map.get(2.0).map(|h| h.color), Some(RGBColor(0, 0, 255)));
    }
}
