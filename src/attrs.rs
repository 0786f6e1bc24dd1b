//! Typed attribute sets for configurable components.
//!
//! Attributes arrive either as a string property map (the way circuit files
//! store them) or as JSON, and are validated once here.
//! Components only ever see an [`OscilloscopeAttrs`] whose fields are in range.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AttrError, Result};
use crate::func::Sensitivity;

/// Minimum number of data inputs on an oscilloscope.
pub const MIN_INPUTS: u8 = 1;
/// Maximum number of data inputs on an oscilloscope.
pub const MAX_INPUTS: u8 = 32;
/// Minimum number of displayed clock periods.
pub const MIN_TRACE_LENGTH: u8 = 4;
/// Maximum number of displayed clock periods.
pub const MAX_TRACE_LENGTH: u8 = 35;

/// Which clock edges get a marker line drawn across the trace.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// No markers.
    #[serde(alias = "no")]
    None,
    /// Low to high clock transitions.
    #[default]
    Rising,
    /// High to low clock transitions.
    Falling,
    /// Any clock transition.
    Both,
}
impl TriggerMode {
    /// The edge sensitivity matching this mode.
    pub fn sensitivity(self) -> Sensitivity {
        match self {
            TriggerMode::None    => Sensitivity::DontCare,
            TriggerMode::Rising  => Sensitivity::Posedge,
            TriggerMode::Falling => Sensitivity::Negedge,
            TriggerMode::Both    => Sensitivity::Anyedge,
        }
    }
}
impl FromStr for TriggerMode {
    type Err = AttrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "no" | "none" => Ok(TriggerMode::None),
            "rising"      => Ok(TriggerMode::Rising),
            "falling"     => Ok(TriggerMode::Falling),
            "both"        => Ok(TriggerMode::Both),
            _ => Err(AttrError::InvalidValue { key: "trigger_mode", value: s.to_string() })
        }
    }
}

/// An RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}
impl FromStr for Color {
    type Err = AttrError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AttrError::InvalidValue { key: "border_color", value: s.to_string() };

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}
impl TryFrom<String> for Color {
    type Error = AttrError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Attributes of a [`Oscilloscope`].
///
/// [`Oscilloscope`]: crate::func::Oscilloscope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OscilloscopeAttrs {
    /// Number of sampled data inputs (the clock is sampled in addition).
    pub inputs: u8,
    /// Number of clock periods shown; each period is two samples.
    pub trace_length: u8,
    /// Which clock edges get a marker.
    pub trigger_mode: TriggerMode,
    /// Whether the clock channel is displayed as its own row.
    pub show_clock: bool,
    /// Border color, used for rendering only.
    pub border_color: Color,
}
impl Default for OscilloscopeAttrs {
    fn default() -> Self {
        Self {
            inputs: 2,
            trace_length: 15,
            trigger_mode: TriggerMode::Rising,
            show_clock: true,
            border_color: Color { r: 0, g: 240, b: 240 },
        }
    }
}
impl OscilloscopeAttrs {
    /// Checks every field is in range.
    pub fn validate(self) -> Result<Self> {
        check_range("inputs", self.inputs, MIN_INPUTS, MAX_INPUTS)?;
        check_range("trace_length", self.trace_length, MIN_TRACE_LENGTH, MAX_TRACE_LENGTH)?;
        Ok(self)
    }

    /// Clamps every field into range.
    pub(crate) fn clamped(self) -> Self {
        Self {
            inputs: self.inputs.clamp(MIN_INPUTS, MAX_INPUTS),
            trace_length: self.trace_length.clamp(MIN_TRACE_LENGTH, MAX_TRACE_LENGTH),
            ..self
        }
    }

    /// Number of history channels: every data input plus the clock.
    pub fn channel_count(&self) -> usize {
        usize::from(self.inputs) + 1
    }
    /// Number of samples retained per channel.
    pub fn depth(&self) -> usize {
        usize::from(self.trace_length) * 2
    }

    /// Parses a JSON attribute set. Missing fields take their defaults.
    ///
    /// ```
    /// use circuitsim_kernel::attrs::{OscilloscopeAttrs, TriggerMode};
    ///
    /// let attrs = OscilloscopeAttrs::from_json(r#"{ "inputs": 4, "trigger_mode": "both" }"#).unwrap();
    /// assert_eq!(attrs.inputs, 4);
    /// assert_eq!(attrs.trigger_mode, TriggerMode::Both);
    /// assert_eq!(attrs.trace_length, 15);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<Self>(json)?.validate()
    }
    /// Writes this attribute set as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builds an attribute set from a string property map.
    ///
    /// Both the canonical keys and the names used by older circuit files are accepted
    /// (`nState`, `frontlines`, `showclock`, `color`).
    /// Keys which do not configure the oscilloscope (labels, fonts, ...) are ignored.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let lookup = |keys: &[&str]| keys.iter().find_map(|&k| props.get(k)).map(|v| v.trim());
        let mut attrs = Self::default();

        if let Some(v) = lookup(&["inputs"]) {
            attrs.inputs = parse_int("inputs", v, MIN_INPUTS, MAX_INPUTS)?;
        }
        if let Some(v) = lookup(&["trace_length", "nState"]) {
            attrs.trace_length = parse_int("trace_length", v, MIN_TRACE_LENGTH, MAX_TRACE_LENGTH)?;
        }
        if let Some(v) = lookup(&["trigger_mode", "frontlines"]) {
            attrs.trigger_mode = v.parse()?;
        }
        if let Some(v) = lookup(&["show_clock", "showclock"]) {
            attrs.show_clock = v.parse()
                .map_err(|_| AttrError::InvalidValue { key: "show_clock", value: v.to_string() })?;
        }
        if let Some(v) = lookup(&["border_color", "color"]) {
            attrs.border_color = v.parse()?;
        }

        Ok(attrs)
    }
}

fn check_range(key: &'static str, value: u8, min: u8, max: u8) -> Result<()> {
    match (min..=max).contains(&value) {
        true => Ok(()),
        false => Err(AttrError::OutOfRange {
            key,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        })
    }
}

fn parse_int(key: &'static str, text: &str, min: u8, max: u8) -> Result<u8> {
    let value: i64 = text.parse()
        .map_err(|_| AttrError::InvalidValue { key, value: text.to_string() })?;
    match u8::try_from(value) {
        Ok(v) => check_range(key, v, min, max).map(|_| v),
        Err(_) => Err(AttrError::OutOfRange { key, value, min: i64::from(min), max: i64::from(max) })
    }
}
