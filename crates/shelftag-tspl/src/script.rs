// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TSPL command emission.
//
// A label job is a fixed sequence of statements, each terminated by CRLF
// (including the last):
//
//   SIZE 30 mm,20 mm
//   GAP 2 mm,0
//   DIRECTION 1
//   CLS
//   TEXT x,y,"0",0,mul,mul,"<label>"
//   BAR 0,y,width,thickness          (underline)
//   TEXT x,y,"0",0,mx,my,"dd.mm HH:MM" (timestamp)
//   PRINT 1,1

use std::fmt;

use chrono::NaiveDateTime;

use shelftag_core::config::ShelftagConfig;

use crate::escape::escape_quoted;
use crate::layout::RenderPlan;

/// Statement terminator.
pub const LINE_END: &str = "\r\n";

/// Built-in font used for every `TEXT` statement.
pub const FONT: &str = "0";

/// `DIRECTION` value; labels come out head-first.
pub const DIRECTION: u8 = 1;

/// `strftime` pattern of the timestamp line.
pub const TIMESTAMP_FORMAT: &str = "%d.%m %H:%M";

/// One TSPL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsplCommand {
    Size { width_mm: u32, height_mm: u32 },
    Gap { gap_mm: u32 },
    Direction(u8),
    Cls,
    Text {
        x: u32,
        y: u32,
        font: &'static str,
        rotation: u32,
        mul_x: u32,
        mul_y: u32,
        content: String,
    },
    Bar { x: u32, y: u32, width: u32, height: u32 },
    Print { sets: u32, copies: u32 },
}

impl fmt::Display for TsplCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size { width_mm, height_mm } => write!(f, "SIZE {width_mm} mm,{height_mm} mm"),
            Self::Gap { gap_mm } => write!(f, "GAP {gap_mm} mm,0"),
            Self::Direction(d) => write!(f, "DIRECTION {d}"),
            Self::Cls => f.write_str("CLS"),
            Self::Text {
                x,
                y,
                font,
                rotation,
                mul_x,
                mul_y,
                content,
            } => write!(
                f,
                "TEXT {x},{y},\"{}\",{rotation},{mul_x},{mul_y},\"{}\"",
                escape_quoted(font),
                escape_quoted(content)
            ),
            Self::Bar {
                x,
                y,
                width,
                height,
            } => write!(f, "BAR {x},{y},{width},{height}"),
            Self::Print { sets, copies } => write!(f, "PRINT {sets},{copies}"),
        }
    }
}

/// A complete, ordered TSPL job for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterScript {
    commands: Vec<TsplCommand>,
}

impl PrinterScript {
    pub fn commands(&self) -> &[TsplCommand] {
        &self.commands
    }

    /// Rendered statements without terminators.
    pub fn lines(&self) -> Vec<String> {
        self.commands.iter().map(ToString::to_string).collect()
    }

    /// ASCII job bytes for the printer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for PrinterScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            write!(f, "{command}{LINE_END}")?;
        }
        Ok(())
    }
}

/// Build the TSPL job for a resolved plan.
///
/// `now` is only read when the plan asks for a timestamp.
pub fn emit(plan: &RenderPlan, config: &ShelftagConfig, now: NaiveDateTime) -> PrinterScript {
    let geometry = config.label;
    let width_dots = geometry.width_dots();
    let height_dots = geometry.height_dots();

    let mut commands = vec![
        TsplCommand::Size {
            width_mm: geometry.width_mm,
            height_mm: geometry.height_mm,
        },
        TsplCommand::Gap {
            gap_mm: geometry.gap_mm,
        },
        TsplCommand::Direction(DIRECTION),
        TsplCommand::Cls,
        TsplCommand::Text {
            x: plan.layout.x,
            y: plan.layout.y,
            font: FONT,
            rotation: 0,
            mul_x: plan.layout.scale,
            mul_y: plan.layout.scale,
            content: plan.text.clone(),
        },
    ];

    if plan.underline {
        commands.push(TsplCommand::Bar {
            x: 0,
            y: height_dots.saturating_sub(config.underline.y_from_bottom),
            width: width_dots,
            height: config.underline.thickness,
        });
    }

    if plan.datetime {
        commands.push(TsplCommand::Text {
            x: config.datetime.x,
            y: height_dots.saturating_sub(config.datetime.y_from_bottom),
            font: FONT,
            rotation: 0,
            mul_x: config.datetime.mul_x,
            mul_y: config.datetime.mul_y,
            content: now.format(TIMESTAMP_FORMAT).to_string(),
        });
    }

    commands.push(TsplCommand::Print { sets: 1, copies: 1 });

    PrinterScript { commands }
}
