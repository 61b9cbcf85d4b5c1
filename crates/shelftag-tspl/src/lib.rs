// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shelftag TSPL turns a shelf code into a TSPL script for a direct-thermal
// label printer.  The pipeline is classify → resolve layout → emit script.
// Nothing in this crate performs I/O or can fail.

pub mod classify;
pub mod escape;
pub mod layout;
pub mod render;
pub mod script;

pub use classify::{LabelRequest, LabelShape, classify};
pub use layout::{LayoutLookup, LayoutSource, RenderPlan, resolve};
pub use render::{Rendered, render, render_now};
pub use script::{PrinterScript, TsplCommand};
