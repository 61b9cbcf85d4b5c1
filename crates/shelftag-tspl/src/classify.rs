// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label classification.
//
// A shelf code looks like `<digits>-<digits>`.  The digit counts of the two
// segments pick one of four layout slots; anything else is printed verbatim
// with the fallback layout.

use shelftag_core::types::Slot;

/// A trimmed label as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest(String);

impl LabelRequest {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the label is a `<digits>-<digits>` shelf code.
    ///
    /// The HTTP endpoint only prints labels that pass this check.
    pub fn is_shelf_code(&self) -> bool {
        matches!(classify(&self.0), LabelShape::NumericPair { .. })
    }
}

impl std::fmt::Display for LabelRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of classifying a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelShape<'a> {
    /// `<digits>-<digits>` with the slot chosen from the segment lengths.
    NumericPair {
        left: &'a str,
        right: &'a str,
        slot: Slot,
    },
    /// Anything else; printed as-is with the fallback layout.
    Literal(&'a str),
}

impl LabelShape<'_> {
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::NumericPair { slot, .. } => Some(*slot),
            Self::Literal(_) => None,
        }
    }

    /// Digit count of the left segment, for numeric pairs.
    pub fn left_len(&self) -> Option<usize> {
        match self {
            Self::NumericPair { left, .. } => Some(left.len()),
            Self::Literal(_) => None,
        }
    }
}

/// Classify `label`.  Pure: the same input always yields the same shape.
pub fn classify(label: &str) -> LabelShape<'_> {
    let Some((left, right)) = label.split_once('-') else {
        return LabelShape::Literal(label);
    };

    if !is_digits(left) || !is_digits(right) {
        return LabelShape::Literal(label);
    }

    LabelShape::NumericPair {
        left,
        right,
        slot: slot_for(left.len(), right.len()),
    }
}

/// Slot for a numeric pair with the given segment lengths.
pub fn slot_for(left_len: usize, right_len: usize) -> Slot {
    match (left_len, right_len) {
        (1, 1) => Slot::One,
        (1, 2..) | (2, 1) => Slot::Two,
        (2, 2..) | (3, 1) => Slot::Three,
        _ => Slot::Four,
    }
}

// Non-empty and ASCII digits only.  A second hyphen lands in `right` and
// fails here.
fn is_digits(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
