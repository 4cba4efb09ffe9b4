//! Build script for horologe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys each section accepts, with the inclusive range of integer keys
const DISPLAY_KEYS: &[(&str, Option<(i64, i64)>)] = &[
    ("kind", None),
    ("width", Some((4, 6))),
    ("blink_ms", Some((0, 10_000))),
    ("edit_blink_ms", Some((1, 10_000))),
    ("fade_unit_ms", Some((0, 1000))),
    ("slice_full_us", Some((100, 20_000))),
    ("slice_dim_us", Some((0, 20_000))),
    ("intensity_full", Some((0, 15))),
    ("intensity_dim", Some((0, 15))),
];

const INPUT_KEYS: &[(&str, Option<(i64, i64)>)] = &[
    ("kind", None),
    ("debounce_ms", Some((0, 1000))),
    ("hold_short_ms", Some((1, 60_000))),
    ("hold_long_ms", Some((1, 60_000))),
    ("hold_very_long_ms", Some((1, 60_000))),
    ("hold_super_long_ms", Some((1, 60_000))),
    ("repeat_slow_ms", Some((1, 5000))),
    ("repeat_fast_ms", Some((1, 5000))),
    ("rotary_fast_ms", Some((1, 5000))),
    ("rotary_slow_ms", Some((1, 5000))),
];

const NAV_KEYS: &[(&str, Option<(i64, i64)>)] = &[
    ("settings_timeout_s", Some((1, 3600))),
    ("temp_timeout_s", Some((1, 3600))),
    ("page_timeout_s", Some((1, 3600))),
    ("unoff_s", Some((1, 3600))),
];

const CAPABILITY_KEYS: &[&str] = &["alt", "rotary", "signal", "ambient"];

const FUNCTION_KEYS: &[&str] = &[
    "date",
    "alarm",
    "timer",
    "thermometer",
    "tube_test",
    "day_counter",
    "sun",
    "weather",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read clock.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in clock.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        fail("clock.toml must be a table", &[]);
    };
    for (name, value) in root {
        if !value.is_table() {
            errors.push(format!("top-level key '{}' is not a [section]", name));
        }
    }

    validate_ranged(&config, "display", DISPLAY_KEYS, &mut errors);
    validate_ranged(&config, "input", INPUT_KEYS, &mut errors);
    validate_ranged(&config, "nav", NAV_KEYS, &mut errors);
    validate_flags(&config, "capabilities", CAPABILITY_KEYS, &mut errors);
    validate_flags(&config, "functions", FUNCTION_KEYS, &mut errors);
    validate_kinds(&config, &mut errors);
    validate_consistency(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in clock.toml", &errors);
    }

    println!("cargo:warning=clock.toml validated successfully");
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let line = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", line)
        })
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    config.get(name).and_then(|s| s.as_table())
}

fn integer(config: &toml::Value, section_name: &str, key: &str) -> Option<i64> {
    section(config, section_name)?.get(key)?.as_integer()
}

/// Known keys only; integers within their range
fn validate_ranged(
    config: &toml::Value,
    name: &str,
    keys: &[(&str, Option<(i64, i64)>)],
    errors: &mut Vec<String>,
) {
    let Some(table) = section(config, name) else {
        return;
    };
    for (key, value) in table {
        match keys.iter().find(|(k, _)| k == key) {
            None => errors.push(format!("[{}] unknown key '{}'", name, key)),
            Some((_, Some((min, max)))) => match value.as_integer() {
                Some(v) if v < *min || v > *max => {
                    errors.push(format!("[{}] {} must be {}-{}", name, key, min, max))
                }
                Some(_) => {}
                None => errors.push(format!("[{}] {} must be an integer", name, key)),
            },
            Some((_, None)) => {
                if !value.is_str() {
                    errors.push(format!("[{}] {} must be a string", name, key));
                }
            }
        }
    }
}

/// Known keys only; every value boolean
fn validate_flags(config: &toml::Value, name: &str, keys: &[&str], errors: &mut Vec<String>) {
    let Some(table) = section(config, name) else {
        return;
    };
    for (key, value) in table {
        if !keys.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", name, key));
        } else if !value.is_bool() {
            errors.push(format!("[{}] {} must be true or false", name, key));
        }
    }
}

fn validate_kinds(config: &toml::Value, errors: &mut Vec<String>) {
    let kinds = [
        ("display", &["nixie", "max7219", "ht16k33"][..]),
        ("input", &["buttons", "ladder"][..]),
    ];
    for (name, allowed) in kinds {
        let kind = section(config, name)
            .and_then(|s| s.get("kind"))
            .and_then(|k| k.as_str());
        if let Some(kind) = kind {
            if !allowed.contains(&kind) {
                errors.push(format!("[{}] kind must be one of {}", name, allowed.join(", ")));
            }
        }
    }
}

/// Cross-field rules the firmware's parser also enforces
fn validate_consistency(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(width) = integer(config, "display", "width") {
        if width != 4 && width != 6 {
            errors.push("[display] width must be 4 or 6".to_string());
        }
    }

    let pairs = [
        ("display", "slice_dim_us", "slice_full_us"),
        ("display", "intensity_dim", "intensity_full"),
        ("input", "repeat_fast_ms", "repeat_slow_ms"),
    ];
    for (name, low, high) in pairs {
        if let (Some(l), Some(h)) = (integer(config, name, low), integer(config, name, high)) {
            if l > h {
                errors.push(format!("[{}] {} must not exceed {}", name, low, high));
            }
        }
    }

    if let (Some(fast), Some(slow)) = (
        integer(config, "input", "rotary_fast_ms"),
        integer(config, "input", "rotary_slow_ms"),
    ) {
        if fast >= slow {
            errors.push("[input] rotary_fast_ms must be below rotary_slow_ms".to_string());
        }
    }

    let holds: Vec<i64> = [
        "hold_short_ms",
        "hold_long_ms",
        "hold_very_long_ms",
        "hold_super_long_ms",
    ]
    .iter()
    .filter_map(|key| integer(config, "input", key))
    .collect();
    if holds.windows(2).any(|w| w[0] >= w[1]) {
        errors.push("[input] hold thresholds must strictly increase".to_string());
    }
}
