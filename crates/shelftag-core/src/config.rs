// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configuration store.
//
// The configuration document is JSON.  Whatever the user writes is merged
// key-by-key over the built-in defaults, so a file containing only
// `{"features": {"show_datetime": false}}` is a complete configuration.
// The result is an immutable value built once at startup and shared by
// reference; requests never mutate it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, ShelftagError};
use crate::types::{FeatureFlags, LabelGeometry, Slot, SlotLayout};

/// Default raw TCP port (HP JetDirect).
pub const DEFAULT_RAW_PORT: u16 = 9100;

/// Default port of the local HTTP endpoint.
pub const DEFAULT_SERVER_PORT: u16 = 9123;

/// Complete Shelftag configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelftagConfig {
    pub printer: PrinterConfig,
    pub server: ServerConfig,
    pub label: LabelGeometry,
    pub features: FeatureFlags,
    pub underline: UnderlineConfig,
    pub datetime: DateTimeConfig,
    /// Main text layout keyed by slot number (1..=4).
    pub slots: BTreeMap<u8, SlotLayout>,
    /// Main text layout keyed by left-segment digit count.  Only consulted
    /// in print-only-left mode.
    pub layouts_by_left_len: BTreeMap<usize, SlotLayout>,
    /// Layout for labels that are not `<digits>-<digits>`.
    pub fallback: SlotLayout,
}

/// Printer identity and how bytes reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Human-readable name, used in logs and job names.
    pub name: String,
    pub transport: TransportConfig,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            name: "Xprinter XP-420B".into(),
            transport: TransportConfig::default(),
        }
    }
}

/// Raw transport to the printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Write to a device node (e.g. `/dev/usb/lp0`) or a capture file.
    Device { path: PathBuf },
    /// Raw TCP socket (JetDirect).
    Tcp {
        host: String,
        #[serde(default = "default_raw_port")]
        port: u16,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Device {
            path: PathBuf::from("/dev/usb/lp0"),
        }
    }
}

fn default_raw_port() -> u16 {
    DEFAULT_RAW_PORT
}

/// Bind address of the HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_SERVER_PORT,
        }
    }
}

/// Separator bar drawn across the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderlineConfig {
    /// Bar height in dots.
    pub thickness: u32,
    /// Distance from the bottom edge to the top of the bar, in dots.
    pub y_from_bottom: u32,
}

impl Default for UnderlineConfig {
    fn default() -> Self {
        Self {
            thickness: 5,
            y_from_bottom: 35,
        }
    }
}

/// Timestamp line and the lift it applies to the main text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeConfig {
    pub mul_x: u32,
    pub mul_y: u32,
    pub x: u32,
    /// Distance from the bottom edge to the timestamp anchor, in dots.
    pub y_from_bottom: u32,
    /// Dots the main text is lifted by, keyed by slot number.
    pub shift: BTreeMap<u8, u32>,
    /// Dots the main text is lifted by in print-only-left mode, keyed by
    /// left-segment digit count.
    pub shift_by_left_len: BTreeMap<usize, u32>,
}

impl Default for DateTimeConfig {
    fn default() -> Self {
        Self {
            mul_x: 7,
            mul_y: 7,
            x: 73,
            y_from_bottom: 20,
            shift: BTreeMap::from([(1, 20), (2, 8), (3, 0), (4, 0)]),
            shift_by_left_len: BTreeMap::new(),
        }
    }
}

/// Built-in layout of each slot.
pub fn default_slot_layout(slot: Slot) -> SlotLayout {
    match slot {
        Slot::One => SlotLayout::new(45, 34, 40),
        Slot::Two => SlotLayout::new(40, 24, 40),
        Slot::Three => SlotLayout::new(34, 14, 43),
        Slot::Four => SlotLayout::default(),
    }
}

impl Default for ShelftagConfig {
    fn default() -> Self {
        Self {
            printer: PrinterConfig::default(),
            server: ServerConfig::default(),
            label: LabelGeometry::default(),
            features: FeatureFlags::default(),
            underline: UnderlineConfig::default(),
            datetime: DateTimeConfig::default(),
            slots: Slot::ALL
                .into_iter()
                .map(|slot| (slot.number(), default_slot_layout(slot)))
                .collect(),
            layouts_by_left_len: BTreeMap::new(),
            fallback: SlotLayout::new(28, 14, 40),
        }
    }
}

impl ShelftagConfig {
    /// Parse a configuration document and merge it over the defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(json)
            .map_err(|e| ShelftagError::Config(format!("parse: {e}")))?;
        Self::from_overrides(overrides)
    }

    /// Merge an already-parsed document over the defaults.
    pub fn from_overrides(overrides: Value) -> Result<Self> {
        if !overrides.is_object() && !overrides.is_null() {
            return Err(ShelftagError::Config(
                "top level must be a JSON object".into(),
            ));
        }

        let mut merged = serde_json::to_value(Self::default())?;
        merge_json(&mut merged, overrides);

        serde_json::from_value(merged).map_err(|e| ShelftagError::Config(format!("schema: {e}")))
    }

    /// Load the configuration document at `path`.
    ///
    /// A missing file yields the built-in defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using built-in defaults");
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&data).map_err(|e| match e {
            ShelftagError::Config(reason) => {
                ShelftagError::Config(format!("{}: {reason}", path.display()))
            }
            other => other,
        })?;

        info!(
            path = %path.display(),
            printer = %config.printer.name,
            "configuration loaded"
        );
        debug!(?config, "effective configuration");
        Ok(config)
    }

    /// Layout configured for `slot`, if any.
    pub fn slot_layout(&self, slot: Slot) -> Option<SlotLayout> {
        self.slots.get(&slot.number()).copied()
    }

    /// Layout configured for a left segment of `left_len` digits, if any.
    pub fn left_len_layout(&self, left_len: usize) -> Option<SlotLayout> {
        self.layouts_by_left_len.get(&left_len).copied()
    }

    /// Timestamp lift for `slot`, if configured.
    pub fn slot_shift(&self, slot: Slot) -> Option<u32> {
        self.datetime.shift.get(&slot.number()).copied()
    }

    /// Timestamp lift for a left segment of `left_len` digits, if configured.
    pub fn left_len_shift(&self, left_len: usize) -> Option<u32> {
        self.datetime.shift_by_left_len.get(&left_len).copied()
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key-by-key; any other overlay value replaces the base
/// value.  `null` counts as absent and leaves the base untouched.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ShelftagConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ShelftagConfig::default());
    }

    #[test]
    fn null_document_yields_defaults() {
        let config = ShelftagConfig::from_json_str("null").unwrap();
        assert_eq!(config, ShelftagConfig::default());
    }

    #[test]
    fn defaults_match_xp420b_stock() {
        let config = ShelftagConfig::default();
        assert_eq!(config.label.width_mm, 30);
        assert_eq!(config.label.height_mm, 20);
        assert_eq!(config.label.dots_per_mm, 8);
        assert_eq!(config.label.gap_mm, 2);
        assert_eq!(config.slot_layout(Slot::One), Some(SlotLayout::new(45, 34, 40)));
        assert_eq!(config.slot_layout(Slot::Four), Some(SlotLayout::new(28, 14, 50)));
        assert_eq!(config.fallback, SlotLayout::new(28, 14, 40));
        assert_eq!(config.slot_shift(Slot::One), Some(20));
        assert_eq!(config.slot_shift(Slot::Two), Some(8));
        assert!(config.layouts_by_left_len.is_empty());
        assert_eq!(config.server.port, 9123);
    }

    #[test]
    fn partial_slot_override_keeps_sibling_fields() {
        let config =
            ShelftagConfig::from_json_str(r#"{"slots": {"2": {"scale": 50}}}"#).unwrap();
        assert_eq!(config.slot_layout(Slot::Two), Some(SlotLayout::new(50, 24, 40)));
        assert_eq!(config.slot_layout(Slot::One), Some(SlotLayout::new(45, 34, 40)));
    }

    #[test]
    fn partial_feature_override() {
        let config =
            ShelftagConfig::from_json_str(r#"{"features": {"print_only_left": true}}"#).unwrap();
        assert!(config.features.print_only_left);
        assert!(config.features.show_underline);
        assert!(config.features.show_datetime);
    }

    #[test]
    fn left_len_tables_are_added() {
        let config = ShelftagConfig::from_json_str(
            r#"{
                "layouts_by_left_len": {"1": {"scale": 60, "x": 80, "y": 20}},
                "datetime": {"shift_by_left_len": {"1": 12}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.left_len_layout(1), Some(SlotLayout::new(60, 80, 20)));
        assert_eq!(config.left_len_layout(2), None);
        assert_eq!(config.left_len_shift(1), Some(12));
        // Slot shifts untouched by the sibling override.
        assert_eq!(config.slot_shift(Slot::One), Some(20));
    }

    #[test]
    fn partial_left_len_entry_defaults_missing_fields() {
        let config =
            ShelftagConfig::from_json_str(r#"{"layouts_by_left_len": {"1": {"scale": 70}}}"#)
                .unwrap();
        assert_eq!(config.left_len_layout(1), Some(SlotLayout::new(70, 14, 50)));
    }

    #[test]
    fn tcp_transport_gets_default_port() {
        let config = ShelftagConfig::from_json_str(
            r#"{"printer": {"transport": {"kind": "tcp", "host": "192.168.1.50"}}}"#,
        )
        .unwrap();
        assert_eq!(
            config.printer.transport,
            TransportConfig::Tcp {
                host: "192.168.1.50".into(),
                port: DEFAULT_RAW_PORT,
            }
        );
        assert_eq!(config.printer.name, "Xprinter XP-420B");
    }

    #[test]
    fn null_values_are_treated_as_absent() {
        let config =
            ShelftagConfig::from_json_str(r#"{"fallback": null, "underline": {"thickness": null}}"#)
                .unwrap();
        assert_eq!(config.fallback, SlotLayout::new(28, 14, 40));
        assert_eq!(config.underline.thickness, 5);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = ShelftagConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ShelftagError::Config(_)));
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = ShelftagConfig::from_json_str(r#"{"label": {"width_mm": "wide"}}"#).unwrap_err();
        assert!(matches!(err, ShelftagError::Config(_)));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = ShelftagConfig::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ShelftagError::Config(_)));
    }

    #[test]
    fn removing_any_single_key_reproduces_default() {
        let full = serde_json::to_value(ShelftagConfig::default()).unwrap();
        let Value::Object(sections) = full.clone() else {
            panic!("defaults serialize to an object");
        };

        for (section, value) in sections {
            match value {
                Value::Object(fields) => {
                    for field in fields.keys() {
                        let mut doc = full.clone();
                        doc[&section].as_object_mut().unwrap().remove(field);
                        let config = ShelftagConfig::from_overrides(doc).unwrap();
                        assert_eq!(config, ShelftagConfig::default(), "{section}.{field}");
                    }
                }
                _ => {
                    let mut doc = full.clone();
                    doc.as_object_mut().unwrap().remove(&section);
                    let config = ShelftagConfig::from_overrides(doc).unwrap();
                    assert_eq!(config, ShelftagConfig::default(), "{section}");
                }
            }
        }
    }

    #[test]
    fn merge_replaces_scalars_and_arrays() {
        let mut base = json!({"a": 1, "b": {"c": [1, 2], "d": true}});
        merge_json(&mut base, json!({"a": 2, "b": {"c": [3]}, "e": "new"}));
        assert_eq!(base, json!({"a": 2, "b": {"c": [3], "d": true}, "e": "new"}));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShelftagConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ShelftagConfig::default());
    }

    #[test]
    fn load_reads_overrides_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"printer": {"name": "Counter"}, "label": {"height_mm": 25}}"#,
        )
        .unwrap();

        let config = ShelftagConfig::load(&path).unwrap();
        assert_eq!(config.printer.name, "Counter");
        assert_eq!(config.label.height_mm, 25);
        assert_eq!(config.label.width_mm, 30);
    }

    #[test]
    fn load_reports_path_on_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();

        let err = ShelftagConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
