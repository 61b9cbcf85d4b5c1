// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout resolution.
//
// The main text's scale and anchor come from the first table in an ordered
// chain of lookups that has an entry for the label:
//
//   print-only-left:  left-length table → slot table → slot 4
//   normal:           slot table → slot 4
//   literal labels:   fallback layout
//
// When the timestamp is enabled the anchor is lifted by a per-slot (or
// per-left-length) shift, clamped at the top edge.

use serde::Serialize;
use tracing::debug;

use shelftag_core::config::{ShelftagConfig, default_slot_layout};
use shelftag_core::types::{Slot, SlotLayout};

use crate::classify::LabelShape;

/// One step in the layout lookup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutLookup {
    /// `layouts_by_left_len[n]`.
    LeftLen(usize),
    /// `slots[slot]`.
    Slot(Slot),
    /// `fallback`; always present.
    Fallback,
}

impl LayoutLookup {
    /// Look this step up in `config`.  `None` means "not configured, try the
    /// next step".
    pub fn find(&self, config: &ShelftagConfig) -> Option<SlotLayout> {
        match *self {
            Self::LeftLen(n) => config.left_len_layout(n),
            Self::Slot(slot) => config.slot_layout(slot),
            Self::Fallback => Some(config.fallback),
        }
    }

    fn source(&self) -> LayoutSource {
        match *self {
            Self::LeftLen(n) => LayoutSource::LeftLen(n),
            Self::Slot(slot) => LayoutSource::Slot(slot),
            Self::Fallback => LayoutSource::Fallback,
        }
    }
}

/// Which table the resolved layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "table", content = "key", rename_all = "snake_case")]
pub enum LayoutSource {
    LeftLen(usize),
    Slot(Slot),
    Fallback,
    /// Slot 4 was removed from the configuration; the built-in value is used.
    BuiltIn,
}

/// Ordered lookup chain for a classified label.
pub fn lookup_chain(shape: &LabelShape<'_>, print_only_left: bool) -> Vec<LayoutLookup> {
    match *shape {
        LabelShape::Literal(_) => vec![LayoutLookup::Fallback],
        LabelShape::NumericPair { left, slot, .. } => {
            let mut chain = Vec::with_capacity(3);
            if print_only_left {
                chain.push(LayoutLookup::LeftLen(left.len()));
            }
            chain.push(LayoutLookup::Slot(slot));
            if slot != Slot::Four {
                chain.push(LayoutLookup::Slot(Slot::Four));
            }
            chain
        }
    }
}

/// Concrete rendering parameters for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPlan {
    /// Text of the main `TEXT` command, unescaped.
    pub text: String,
    /// Scale and anchor after the timestamp shift.
    pub layout: SlotLayout,
    pub source: LayoutSource,
    pub slot: Option<Slot>,
    /// Dots the anchor was lifted by (before clamping).
    pub shift: u32,
    /// Draw the separator bar.
    pub underline: bool,
    /// Draw the timestamp line.
    pub datetime: bool,
}

/// Resolve the rendering parameters for `shape` under `config`.
pub fn resolve(shape: &LabelShape<'_>, config: &ShelftagConfig) -> RenderPlan {
    let flags = config.features;

    let text = match *shape {
        LabelShape::NumericPair { left, .. } if flags.print_only_left => left.to_owned(),
        LabelShape::NumericPair { left, right, .. } => format!("{left}-{right}"),
        LabelShape::Literal(label) => label.to_owned(),
    };

    let (base, source) = lookup_chain(shape, flags.print_only_left)
        .iter()
        .find_map(|step| step.find(config).map(|layout| (layout, step.source())))
        .unwrap_or((default_slot_layout(Slot::Four), LayoutSource::BuiltIn));

    let shift = if flags.show_datetime {
        datetime_shift(shape, config)
    } else {
        0
    };

    let layout = SlotLayout {
        y: base.y.saturating_sub(shift),
        ..base
    };

    debug!(
        text = %text,
        slot = ?shape.slot(),
        ?source,
        scale = layout.scale,
        x = layout.x,
        y = layout.y,
        shift,
        "layout resolved"
    );

    RenderPlan {
        text,
        layout,
        source,
        slot: shape.slot(),
        shift,
        underline: flags.show_underline,
        datetime: flags.show_datetime,
    }
}

/// Dots the main text is lifted by to make room for the timestamp.
///
/// Keyed by slot, or by left-segment length in print-only-left mode.  A
/// missing key and literal labels mean no lift.
pub fn datetime_shift(shape: &LabelShape<'_>, config: &ShelftagConfig) -> u32 {
    match *shape {
        LabelShape::Literal(_) => 0,
        LabelShape::NumericPair { left, .. } if config.features.print_only_left => {
            config.left_len_shift(left.len()).unwrap_or(0)
        }
        LabelShape::NumericPair { slot, .. } => config.slot_shift(slot).unwrap_or(0),
    }
}
