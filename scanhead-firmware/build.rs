//! Build script for scanhead-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sensor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sections the on-device parser understands, with their integer keys and ranges
const SCHEMA: &[(&str, &[(&str, i64, i64)])] = &[
    (
        "servo",
        &[
            ("min_pulse_us", 0, 20_000),
            ("max_pulse_us", 0, 20_000),
            ("max_angle", 1, 180),
        ],
    ),
    (
        "ranger",
        &[
            ("max_range_cm", 1, 999),
            ("us_per_cm", 1, 1000),
            ("timeout_ms", 1, 1000),
        ],
    ),
    ("sweep", &[("from", 0, 180), ("to", 0, 180), ("step", 1, 180)]),
    (
        "timing",
        &[
            ("tick_ms", 1, 10_000),
            ("settle_ticks", 0, 255),
            ("default_delay_ms", 0, 65_535),
        ],
    ),
    (
        "buttons",
        &[("debounce_ms", 1, 1000), ("long_press_ms", 1, 10_000)],
    ),
    ("link", &[("baud", 300, 921_600)]),
    ("telemeter", &[("default_angle", 0, 180)]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sensor.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=sensor.toml");

    let config_path = Path::new("sensor.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: sensor.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds sensor.toml at build time.                  ║\n\
            ║  Please create one in the scanhead-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sensor.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in sensor.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = validate_sections(&config);
    errors.extend(validate_cross_fields(&config));

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid sensor configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=sensor.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check section names, value types and ranges
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (name, section) in root {
        let keys = match SCHEMA.iter().find(|(s, _)| *s == name.as_str()) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", name));
                continue;
            }
        };

        let section = match section.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", name));
                continue;
            }
        };

        for (key, min, max) in keys.iter() {
            match section.get(*key) {
                None => {}
                Some(toml::Value::Integer(v)) if v < min || v > max => {
                    errors.push(format!("[{}] {} must be {}-{}", name, key, min, max));
                }
                Some(toml::Value::Integer(_)) => {}
                Some(_) => errors.push(format!("[{}] {} must be an integer", name, key)),
            }
        }
    }

    errors
}

fn get_int(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Constraints spanning several keys, mirrored from the on-device validation
fn validate_cross_fields(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let min_pulse = get_int(config, "servo", "min_pulse_us").unwrap_or(500);
    let max_pulse = get_int(config, "servo", "max_pulse_us").unwrap_or(2400);
    if min_pulse >= max_pulse {
        errors.push("[servo] min_pulse_us must be below max_pulse_us".to_string());
    }

    let max_angle = get_int(config, "servo", "max_angle").unwrap_or(180);
    let from = get_int(config, "sweep", "from").unwrap_or(0);
    let to = get_int(config, "sweep", "to").unwrap_or(180);
    if from > to || to > max_angle {
        errors.push("[sweep] needs from <= to <= servo max_angle".to_string());
    }

    let default_angle = get_int(config, "telemeter", "default_angle").unwrap_or(90);
    if default_angle > max_angle {
        errors.push("[telemeter] default_angle beyond servo max_angle".to_string());
    }

    errors
}
