//! gc-config
//!
//! Layered YAML configuration for the storefront engine:
//! - later layers override earlier ones (deep merge of mappings)
//! - the merged document is canonical JSON, hashed with SHA-256 (`config_hash`)
//! - literal secrets abort loading (`CONFIG_SECRET_DETECTED`)
//! - leaf keys nobody reads are reported (`report_unused_keys`)
//! - [`StorefrontConfig`] is the typed view the binary consumes

mod storefront;

pub use storefront::{
    AuditSettings, OutcomeSetting, PaymentSettings, StorefrontConfig, SupportSettings,
};


use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use tracing::warn;

/// Payment-provider and key-material prefixes; a leaf string starting with
/// one of these aborts loading.
const SECRET_PREFIXES: &[&str] = &["sk_live", "sk_test", "FLWSECK", "AKIA", "-----BEGIN"];

/// Shorter strings are never treated as credentials.
const MIN_SECRET_LEN: usize = 8;

/// Unused leaves listed in a `Fail` error before truncation.
const UNUSED_PREVIEW: usize = 12;

/// Top-level sections read by [`StorefrontConfig::from_json`]. Keep in sync
/// with the typed view.
pub const CONSUMED_POINTERS: &[&str] = &["/payment", "/audit", "/support"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    /// Sections the typed view reads, sorted.
    pub consumed_prefixes: Vec<String>,
    /// Leaves outside every consumed section, sorted.
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Report config leaves outside [`CONSUMED_POINTERS`].
///
/// `Warn` logs each unused leaf and returns the report; `Fail` errors when any exist.
pub fn report_unused_keys(config_json: &Value, policy: UnusedKeyPolicy) -> Result<UnusedKeyReport> {
    let mut consumed_prefixes: Vec<String> =
        CONSUMED_POINTERS.iter().map(|p| p.to_string()).collect();
    consumed_prefixes.sort();

    let mut unused: Vec<String> = leaves(config_json)
        .into_iter()
        .map(|(pointer, _)| pointer)
        .filter(|pointer| !consumed_prefixes.iter().any(|section| within(section, pointer)))
        .collect();
    unused.sort();

    let report = UnusedKeyReport {
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };
    if report.is_clean() {
        return Ok(report);
    }

    if policy == UnusedKeyPolicy::Fail {
        let shown = &report.unused_leaf_pointers
            [..report.unused_leaf_pointers.len().min(UNUSED_PREVIEW)];
        bail!(
            "CONFIG_UNUSED_KEYS: {} unused config leaf key(s): {}",
            report.unused_leaf_pointers.len(),
            shown.join(", ")
        );
    }
    for leaf in &report.unused_leaf_pointers {
        warn!(leaf = %leaf, "unused config key");
    }
    Ok(report)
}

/// `section` covers itself and anything below it, on token boundaries:
/// "/payment" covers "/payment/timeout_ms" but not "/payments/x".
fn within(section: &str, pointer: &str) -> bool {
    pointer
        .strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Every scalar leaf with its JSON pointer (RFC 6901 escaping).
fn leaves(root: &Value) -> Vec<(String, &Value)> {
    let mut out = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];
    while let Some((pointer, value)) = stack.pop() {
        match value {
            Value::Object(map) => stack.extend(map.iter().map(|(k, v)| {
                (format!("{pointer}/{}", k.replace('~', "~0").replace('/', "~1")), v)
            })),
            Value::Array(items) => stack.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("{pointer}/{i}"), v)),
            ),
            _ if pointer.is_empty() => out.push(("/".to_string(), value)),
            _ => out.push((pointer, value)),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed view of the merged document.
    pub fn storefront(&self) -> Result<StorefrontConfig> {
        StorefrontConfig::from_json(&self.config_json)
    }
}

/// Read each file in order, then merge as [`load_layered_yaml_from_strings`].
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<_>>>()?;
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

/// Later documents override earlier ones key by key; an empty document
/// contributes nothing.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (layer, raw) in yaml_docs.iter().enumerate() {
        let doc: serde_yaml::Value = serde_yaml::from_str(raw)
            .with_context(|| format!("CONFIG_INVALID: layer {layer} is not valid yaml"))?;
        let doc = serde_json::to_value(doc)
            .with_context(|| format!("CONFIG_INVALID: layer {layer} has non-json keys"))?;
        if !doc.is_null() {
            merge_into(&mut merged, doc);
        }
    }

    if let Some((pointer, _)) = leaves(&merged)
        .into_iter()
        .find(|(_, v)| v.as_str().is_some_and(looks_like_secret))
    {
        bail!("CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED");
    }

    // serde_json's default Map keeps keys sorted, so plain serialization is canonical.
    let canonical_json =
        serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = hex::encode(Sha256::digest(canonical_json.as_bytes()));
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Mappings merge recursively; anything else in `overlay` replaces `base`.
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    t.len() >= MIN_SECRET_LEN && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}
