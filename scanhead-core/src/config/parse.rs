//! Parser for `sensor.toml`
//!
//! A minimal line-based TOML reader covering only what the sensor
//! configuration uses. It does NOT support the full TOML grammar.
//!
//! Supported:
//! - `[section]` headers
//! - `key = value` pairs with integer values (optionally quoted)
//! - Comments (`# ...`), including trailing comments
//!
//! Keys the parser does not know are skipped, so newer files still load on
//! older firmware. Unknown sections are rejected.

use super::types::{ConfigError, SensorConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value is not a number in range for its key
    InvalidValue,
    /// Key/value line outside any section
    OutsideSection,
    /// Parsed values fail cross-field validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Servo,
    Ranger,
    Sweep,
    Timing,
    Buttons,
    Link,
    Telemeter,
}

/// Parse and validate a configuration, starting from defaults
pub fn parse_config(input: &str) -> Result<SensorConfig, ParseError> {
    let mut config = SensorConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "servo" => Ok(Section::Servo),
        "ranger" => Ok(Section::Ranger),
        "sweep" => Ok(Section::Sweep),
        "timing" => Ok(Section::Timing),
        "buttons" => Ok(Section::Buttons),
        "link" => Ok(Section::Link),
        "telemeter" => Ok(Section::Telemeter),
        _ => Err(ParseError::InvalidSection),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) if line[..pos].matches('"').count() % 2 == 0 => line[..pos].trim(),
        _ => line,
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, accepting a quoted form
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let value = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    };
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut SensorConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::OutsideSection),
        Section::Servo => match key {
            "min_pulse_us" => config.servo.min_pulse_us = parse_int(value)?,
            "max_pulse_us" => config.servo.max_pulse_us = parse_int(value)?,
            "max_angle" => config.servo.max_angle = parse_int(value)?,
            _ => {}
        },
        Section::Ranger => match key {
            "max_range_cm" => config.ranger.max_range_cm = parse_int(value)?,
            "us_per_cm" => config.ranger.us_per_cm = parse_int(value)?,
            "timeout_ms" => config.ranger.timeout_ms = parse_int(value)?,
            _ => {}
        },
        Section::Sweep => match key {
            "from" => config.sweep.from = parse_int(value)?,
            "to" => config.sweep.to = parse_int(value)?,
            "step" => config.sweep.step = parse_int(value)?,
            _ => {}
        },
        Section::Timing => match key {
            "tick_ms" => config.timing.tick_ms = parse_int(value)?,
            "settle_ticks" => config.timing.settle_ticks = parse_int(value)?,
            "default_delay_ms" => config.timing.default_delay_ms = parse_int(value)?,
            _ => {}
        },
        Section::Buttons => match key {
            "debounce_ms" => config.buttons.debounce_ms = parse_int(value)?,
            "long_press_ms" => config.buttons.long_press_ms = parse_int(value)?,
            _ => {}
        },
        Section::Link => {
            if key == "baud" {
                config.link.baud = parse_int(value)?;
            }
        }
        Section::Telemeter => {
            if key == "default_angle" {
                config.telemeter.default_angle = parse_int(value)?;
            }
        }
    }
    Ok(())
}
