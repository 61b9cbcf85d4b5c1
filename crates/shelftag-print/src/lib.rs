// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shelftag Print: the local HTTP endpoint that accepts shelf codes and the
// raw transports that deliver rendered TSPL jobs to the printer.  This crate
// bridges the pure engine in `shelftag-tspl` and the actual device.

pub mod device;
pub mod job;
pub mod raw_client;
pub mod server;
pub mod sink;

pub use job::LabelJob;
pub use server::LabelServer;
pub use sink::PrinterSink;
