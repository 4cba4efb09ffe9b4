//! Minimal TOML parser for clock configuration
//!
//! Handles only the subset `clock.toml` uses and needs no allocator, so the
//! firmware can parse an override stored in flash at boot.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs (integer, boolean, quoted or bare string)
//! - Comments (`# ...`), whole-line or trailing
//!
//! Unknown keys are ignored; the firmware build script rejects them when
//! validating the embedded file.

use super::types::{ClockConfig, DisplayKind, InputKind};
use crate::nav::ClockFunction;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or does not parse
    InvalidValue,
    /// Value outside the accepted range
    OutOfRange,
    /// Values contradict each other
    Inconsistent,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Input,
    Nav,
    Capabilities,
    Functions,
}

/// Parse TOML configuration into a validated [`ClockConfig`]
pub fn parse_config(input: &str) -> Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = strip_comment(header);
            let name = header.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(name.trim())?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ParseError> {
    match name {
        "display" => Ok(Section::Display),
        "input" => Ok(Section::Input),
        "nav" => Ok(Section::Nav),
        "capabilities" => Ok(Section::Capabilities),
        "functions" => Ok(Section::Functions),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment that is not inside a quoted string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim_end(),
            _ => {}
        }
    }
    text
}

/// Split a `key = value` line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse whole seconds into milliseconds
fn parse_seconds(value: &str) -> Result<u32, ParseError> {
    let seconds: u32 = parse_int(value)?;
    seconds.checked_mul(1000).ok_or(ParseError::OutOfRange)
}

fn parse_display_kind(value: &str) -> Result<DisplayKind, ParseError> {
    match parse_string(value) {
        "nixie" => Ok(DisplayKind::Nixie),
        "max7219" => Ok(DisplayKind::Max7219),
        "ht16k33" => Ok(DisplayKind::Ht16k33),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_input_kind(value: &str) -> Result<InputKind, ParseError> {
    match parse_string(value) {
        "buttons" => Ok(InputKind::Buttons),
        "ladder" => Ok(InputKind::Ladder),
        _ => Err(ParseError::InvalidValue),
    }
}

fn function_for_key(key: &str) -> Option<ClockFunction> {
    match key {
        "date" => Some(ClockFunction::Date),
        "alarm" => Some(ClockFunction::Alarm),
        "timer" => Some(ClockFunction::Timer),
        "thermometer" => Some(ClockFunction::Thermometer),
        "tube_test" => Some(ClockFunction::TubeTest),
        "day_counter" => Some(ClockFunction::DayCounter),
        "sun" => Some(ClockFunction::Sun),
        "weather" => Some(ClockFunction::Weather),
        _ => None,
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ClockConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Display => {
            let d = &mut config.display;
            match key {
                "kind" => d.kind = parse_display_kind(value)?,
                "width" => d.width = parse_int(value)?,
                "blink_ms" => d.blink_ms = parse_int(value)?,
                "edit_blink_ms" => d.edit_blink_ms = parse_int(value)?,
                "fade_unit_ms" => d.fade_unit_ms = parse_int(value)?,
                "slice_full_us" => d.slice_full_us = parse_int(value)?,
                "slice_dim_us" => d.slice_dim_us = parse_int(value)?,
                "intensity_full" => d.intensity_full = parse_int(value)?,
                "intensity_dim" => d.intensity_dim = parse_int(value)?,
                _ => {} // Ignore unknown keys
            }
        }
        Section::Input => {
            let i = &mut config.input;
            match key {
                "kind" => i.kind = parse_input_kind(value)?,
                "debounce_ms" => i.debounce_ms = parse_int(value)?,
                "hold_short_ms" => i.hold_ms[0] = parse_int(value)?,
                "hold_long_ms" => i.hold_ms[1] = parse_int(value)?,
                "hold_very_long_ms" => i.hold_ms[2] = parse_int(value)?,
                "hold_super_long_ms" => i.hold_ms[3] = parse_int(value)?,
                "repeat_slow_ms" => i.repeat_slow_ms = parse_int(value)?,
                "repeat_fast_ms" => i.repeat_fast_ms = parse_int(value)?,
                "rotary_fast_ms" => i.rotary_fast_ms = parse_int(value)?,
                "rotary_slow_ms" => i.rotary_slow_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Nav => {
            let n = &mut config.nav;
            match key {
                "settings_timeout_s" => n.settings_timeout_ms = parse_seconds(value)?,
                "temp_timeout_s" => n.temp_timeout_ms = parse_seconds(value)?,
                "page_timeout_s" => n.page_timeout_ms = parse_seconds(value)?,
                "unoff_s" => n.unoff_ms = parse_seconds(value)?,
                _ => {}
            }
        }
        Section::Capabilities => {
            let c = &mut config.capabilities;
            match key {
                "alt" => c.has_alt = parse_bool(value)?,
                "rotary" => c.has_rotary = parse_bool(value)?,
                "signal" => c.has_signal = parse_bool(value)?,
                "ambient" => c.has_ambient = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Functions => {
            if let Some(function) = function_for_key(key) {
                config
                    .capabilities
                    .functions
                    .set(function, parse_bool(value)?);
            }
        }
    }

    Ok(())
}
