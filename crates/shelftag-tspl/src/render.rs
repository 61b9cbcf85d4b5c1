// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine entry point: label text in, TSPL job out.

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use shelftag_core::config::ShelftagConfig;

use crate::classify::{LabelRequest, classify};
use crate::layout::{RenderPlan, resolve};
use crate::script::{PrinterScript, emit};

/// Result of rendering one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub plan: RenderPlan,
    pub script: PrinterScript,
}

impl Rendered {
    /// Whether the label missed the numeric-pair shape and was laid out
    /// with the fallback table.
    pub fn is_fallback(&self) -> bool {
        self.plan.slot.is_none()
    }
}

/// Render `label` with the timestamp taken from `now`.
///
/// Never fails: labels that are not shelf codes are printed verbatim with
/// the fallback layout.
pub fn render(label: &LabelRequest, config: &ShelftagConfig, now: NaiveDateTime) -> Rendered {
    let shape = classify(label.as_str());
    let plan = resolve(&shape, config);
    let script = emit(&plan, config, now);

    debug!(
        label = %label,
        slot = ?plan.slot,
        statements = script.commands().len(),
        "label rendered"
    );

    Rendered { plan, script }
}

/// Render `label` stamped with the local wall-clock time.
pub fn render_now(label: &LabelRequest, config: &ShelftagConfig) -> Rendered {
    render(label, config, Local::now().naive_local())
}
