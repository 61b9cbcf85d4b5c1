// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Shelftag label server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a label print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Layout category of a `<digits>-<digits>` label, chosen by the digit
/// counts of its two segments.
///
/// Serialized as its number, the same key the configuration document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    /// One digit on each side (`1-1`, `2-3`).
    One,
    /// `1-NN…` or `NN-1`.
    Two,
    /// `NN-NN…` or `NNN-1`.
    Three,
    /// Everything else.
    Four,
}

impl Slot {
    /// All slots in ascending order.
    pub const ALL: [Slot; 4] = [Slot::One, Slot::Two, Slot::Three, Slot::Four];

    /// Numeric key used for this slot in the configuration document.
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    /// Inverse of [`Slot::number`].
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("no slot {n}, expected 1..=4"))
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Font scale and anchor of the main text, in printer dots.
///
/// Fields left out of a configuration entry take the slot-4 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLayout {
    /// Applied to both the X and Y multiplier of the TSPL `TEXT` command.
    pub scale: u32,
    pub x: u32,
    pub y: u32,
}

impl SlotLayout {
    pub const fn new(scale: u32, x: u32, y: u32) -> Self {
        Self { scale, x, y }
    }
}

impl Default for SlotLayout {
    /// Smallest text, fits any shelf code.
    fn default() -> Self {
        Self::new(28, 14, 50)
    }
}

/// Physical label stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelGeometry {
    pub width_mm: u32,
    pub height_mm: u32,
    /// 8 for 203 dpi heads, 12 for 300 dpi.
    pub dots_per_mm: u32,
    /// Gap between labels on the liner.
    pub gap_mm: u32,
}

impl LabelGeometry {
    pub fn width_dots(&self) -> u32 {
        self.width_mm.saturating_mul(self.dots_per_mm)
    }

    pub fn height_dots(&self) -> u32 {
        self.height_mm.saturating_mul(self.dots_per_mm)
    }
}

impl Default for LabelGeometry {
    fn default() -> Self {
        Self {
            width_mm: 30,
            height_mm: 20,
            dots_per_mm: 8,
            gap_mm: 2,
        }
    }
}

/// Optional decorations and rendering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Draw a full-width bar near the bottom edge.
    pub show_underline: bool,
    /// Print `dd.mm HH:MM` under the bar and lift the main text.
    pub show_datetime: bool,
    /// Print only the segment left of the hyphen.
    pub print_only_left: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            show_underline: true,
            show_datetime: true,
            print_only_left: false,
        }
    }
}

/// Lifecycle state of the HTTP label server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Error,
}
