//! Configuration loading and environment parsing.

use super::validation::validate_config;
use super::Config;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Prefix for whole-document sources (`STEAL_ARENA_CONFIG_JSON`, ...).
pub const CONFIG_ENV_PREFIX: &str = "STEAL_ARENA_CONFIG_";
/// Prefix for per-field overrides (`STEAL_ARENA__GAME__MAX_PLAYERS_PER_ROOM=4`).
pub const FIELD_ENV_PREFIX: &str = "STEAL_ARENA__";

/// Load configuration with the following precedence (highest first):
/// 1) `STEAL_ARENA_CONFIG_JSON` env var containing raw JSON
/// 2) If `STEAL_ARENA_CONFIG_STDIN=true/1`, read JSON from stdin
/// 3) File pointed by `STEAL_ARENA_CONFIG_PATH` env var
/// 4) config.json in current working directory
/// 5) config.json next to the executable
/// 6) Defaults compiled into the binary
///
/// Individual fields can then be overridden with `STEAL_ARENA__SECTION__FIELD=value`.
/// Read and parse failures are printed to stderr and the source is skipped.
///
/// Validation failures are reported but not propagated; `main` re-runs
/// [`validate_config`] and refuses to start on error.
#[must_use]
pub fn load() -> Config {
    use std::env;
    use std::io::Read;
    use std::path::PathBuf;

    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    // Lowest precedence first so later merges win
    if let Ok(exe_path) = env::current_exe() {
        if let Some(mut exe_dir) = exe_path.parent().map(Path::to_path_buf) {
            exe_dir.push("config.json");
            merge_file_source(&mut merged, &exe_dir);
        }
    }

    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    if let Ok(path) = env::var(format!("{CONFIG_ENV_PREFIX}PATH")) {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    if let Ok(val) = env::var(format!("{CONFIG_ENV_PREFIX}STDIN")) {
        if env_var_truthy(&val) {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("Failed to read config from stdin: {e}");
            } else if let Some(value) = parse_json_document(&buf, "stdin") {
                merge_values(&mut merged, value);
            }
        }
    }

    if let Ok(json) = env::var(format!("{CONFIG_ENV_PREFIX}JSON")) {
        if let Some(value) = parse_json_document(&json, "STEAL_ARENA_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    apply_env_overrides(&mut merged, env::vars());

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

/// Deep-merge `source` into `target`; objects merge key by key, anything else replaces.
fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

/// Apply `STEAL_ARENA__*` overrides one at a time. An override that would make
/// the document fail to deserialize is reported and skipped; the rest still apply.
fn apply_env_overrides<I>(root: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, raw_value) in vars {
        let Some(stripped) = key.strip_prefix(FIELD_ENV_PREFIX) else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        let mut candidate = root.clone();
        set_nested_value(&mut candidate, &segments, parse_env_value(&raw_value));
        match serde_json::from_value::<Config>(candidate.clone()) {
            Ok(_) => *root = candidate,
            // Already broken by an earlier source; this override cannot make it worse
            Err(_) if serde_json::from_value::<Config>(root.clone()).is_err() => {
                *root = candidate;
            }
            Err(err) => eprintln!("Ignoring config override {key}={raw_value}: {err}"),
        }
    }
}

fn env_var_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

fn parse_env_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    // JSON scalars (numbers, booleans, quoted strings) parse as-is; anything else is a string.
    // Comma lists stay strings because cors_origins is itself comma-separated.
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if !value.is_array() && !value.is_object() => value,
        _ => Value::String(trimmed.to_string()),
    }
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };

    if rest.is_empty() {
        map.insert(head.clone(), value);
        return;
    }

    let entry = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, rest, value);
}
