//! Per-group draw-style resolution.
//!
//! Styles come from substring-matched override maps; groups without a match
//! take the next colour of the fixed cycle and a solid line. Override maps
//! are insertion-ordered, so the first matching key wins when several keys
//! substring-match a group name.

use crate::utils::config::COLOUR_CYCLE;
use indexmap::IndexMap;
use log::warn;
use plotters::style::RGBColor;

/// Line rendering style for a group's mean line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineKind {
    #[default]
    Solid,
    Dashed,
}

/// User-supplied style overrides, keyed by group-name substring
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides {
    pub colours: IndexMap<String, String>,
    pub lines: IndexMap<String, LineKind>,
}

/// Hands out cycle colours to groups without an override
#[derive(Debug, Default)]
pub struct StyleCycle {
    next: usize,
}

impl StyleCycle {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_colour(&mut self) -> RGBColor {
        let hex = COLOUR_CYCLE[self.next % COLOUR_CYCLE.len()];
        self.next += 1;
        // The cycle entries are compile-time constants and always parse
        parse_hex(hex).unwrap_or(RGBColor(0, 0, 0))
    }
}

/// Resolve the colour and line style for one group
pub fn resolve_style(
    name: &str,
    overrides: &StyleOverrides,
    cycle: &mut StyleCycle,
) -> (RGBColor, LineKind) {
    let colour = overrides
        .colours
        .iter()
        .find(|(key, _)| name.contains(key.as_str()))
        .and_then(|(key, hex)| {
            let parsed = parse_hex(hex);
            if parsed.is_none() {
                warn!("Ignoring invalid colour override '{}' for '{}'", hex, key);
            }
            parsed
        })
        .unwrap_or_else(|| cycle.next_colour());

    let line = overrides
        .lines
        .iter()
        .find(|(key, _)| name.contains(key.as_str()))
        .map(|(_, kind)| *kind)
        .unwrap_or_default();

    (colour, line)
}

/// Parse a `#rrggbb` hex colour
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}
