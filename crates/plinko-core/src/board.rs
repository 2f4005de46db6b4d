//! Board configuration and the size-derived geometry of a Plinko board.
//!
//! [`BoardLayout`] is a pure function of [`BoardConfig`]: it places the peg
//! lattice, the boundary walls, the slot dividers and the slot sensors in
//! viewport pixels (origin top-left, +y down). The physics side turns the
//! layout into bodies; nothing here knows about a physics engine.
//!
//! Row `r` (0-indexed) holds `r + 3` pegs, centred horizontally, so the
//! lattice widens toward the bottom where `rows + 2` pegs bound the
//! `rows + 1` slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Thickness of walls, top guide and floor, in pixels.
pub const WALL_THICKNESS: f64 = 40.0;

// ---------------------------------------------------------------------------
// RowCount
// ---------------------------------------------------------------------------

/// Number of peg rows. Only the five board sizes the game offers are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RowCount(u32);

impl RowCount {
    pub const R8: RowCount = RowCount(8);
    pub const R10: RowCount = RowCount(10);
    pub const R12: RowCount = RowCount(12);
    pub const R14: RowCount = RowCount(14);
    pub const R16: RowCount = RowCount(16);

    /// Every valid row count, smallest first.
    pub const ALL: [RowCount; 5] = [Self::R8, Self::R10, Self::R12, Self::R14, Self::R16];

    /// Validate a raw row count.
    pub fn new(rows: u32) -> Result<Self, ConfigError> {
        if Self::ALL.iter().any(|r| r.0 == rows) {
            Ok(Self(rows))
        } else {
            Err(ConfigError::InvalidRowCount { rows })
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// `rows + 1`.
    #[inline]
    pub fn slot_count(self) -> usize {
        self.0 as usize + 1
    }

    /// Index of the centre slot.
    #[inline]
    pub fn centre_slot(self) -> usize {
        self.0 as usize / 2
    }

    pub(crate) fn table_index(self) -> usize {
        ((self.0 - 8) / 2) as usize
    }
}

impl TryFrom<u32> for RowCount {
    type Error = ConfigError;

    fn try_from(rows: u32) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<RowCount> for u32 {
    fn from(rows: RowCount) -> u32 {
        rows.0
    }
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RowCount {
    fn default() -> Self {
        Self::R16
    }
}

// ---------------------------------------------------------------------------
// BoardConfig
// ---------------------------------------------------------------------------

/// Row count plus the viewport the board must fit in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: RowCount,
    /// Viewport width in pixels. Must be positive and finite.
    pub width: f64,
    /// Viewport height in pixels. Must be positive and finite.
    pub height: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: RowCount::R16,
            width: 800.0,
            height: 900.0,
        }
    }
}

impl BoardConfig {
    pub fn new(rows: u32, width: f64, height: f64) -> Result<Self, ConfigError> {
        let config = Self {
            rows: RowCount::new(rows)?,
            width,
            height,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

/// A point in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle described by centre and half-extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub cx: f64,
    pub cy: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl Rect {
    /// Build from edge coordinates.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            cx: (left + right) * 0.5,
            cy: (top + bottom) * 0.5,
            half_width: (right - left) * 0.5,
            half_height: (bottom - top) * 0.5,
        }
    }

    pub fn left(&self) -> f64 {
        self.cx - self.half_width
    }

    pub fn right(&self) -> f64 {
        self.cx + self.half_width
    }

    pub fn top(&self) -> f64 {
        self.cy - self.half_height
    }

    pub fn bottom(&self) -> f64 {
        self.cy + self.half_height
    }
}

/// One payout slot at the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotGeometry {
    pub index: usize,
    /// Horizontal centre.
    pub x: f64,
    pub width: f64,
    /// Trigger volume, narrower than the slot so it never overlaps a divider.
    pub sensor: Rect,
}

/// The static walls around the peg field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub left: Rect,
    pub right: Rect,
    /// Low-restitution ceiling just above the spawn height.
    pub top_guide: Rect,
    /// Catch-all floor under the slots.
    pub floor: Rect,
}

// ---------------------------------------------------------------------------
// BoardLayout
// ---------------------------------------------------------------------------

/// Every size-derived quantity of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub config: BoardConfig,
    pub padding: f64,
    pub peg_radius: f64,
    pub chip_radius: f64,
    pub peg_spacing_x: f64,
    pub peg_spacing_y: f64,
    pub first_row_y: f64,
    pub last_row_y: f64,
    pub slot_top: f64,
    pub board_bottom: f64,
    pub spawn_y: f64,
    /// Peg centres, row by row.
    pub pegs: Vec<Vec<Point>>,
    pub slots: Vec<SlotGeometry>,
    pub dividers: Vec<Rect>,
    pub boundary: Boundary,
}

impl BoardLayout {
    /// Lay out a board. Fails only if the config itself is invalid.
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rows = config.rows.get();
        let rows_f = f64::from(rows);
        let (width, height) = (config.width, config.height);
        let cx = width * 0.5;

        let padding = (0.05 * width.min(height)).max(8.0);
        let peg_spacing_x = (width - 2.0 * padding) / (rows_f + 1.0);
        if peg_spacing_x <= 0.0 {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        let peg_radius = (0.12 * peg_spacing_x).clamp(2.0, 10.0);
        let chip_radius = 0.8 * peg_radius;

        let board_bottom = height - padding;
        let slot_height = (0.08 * height).max(24.0);
        let slot_top = board_bottom - slot_height;

        let peg_spacing_y = ((slot_top - 0.1 * height) / (rows_f - 0.4)).min(peg_spacing_x);
        if peg_spacing_y <= 0.0 {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        let last_row_y = slot_top - 0.6 * peg_spacing_y;
        let first_row_y = last_row_y - (rows_f - 1.0) * peg_spacing_y;
        let spawn_y =
            first_row_y - (0.5 * peg_spacing_y).max(peg_radius + chip_radius + 4.0);

        let pegs: Vec<Vec<Point>> = (0..rows)
            .map(|r| {
                let count = r + 3;
                let half_span = f64::from(r + 2) * 0.5;
                (0..count)
                    .map(|i| Point {
                        x: cx + (f64::from(i) - half_span) * peg_spacing_x,
                        y: first_row_y + f64::from(r) * peg_spacing_y,
                    })
                    .collect()
            })
            .collect();

        let sensor_half_height = 0.2 * slot_height;
        let sensor_cy = board_bottom - 0.25 * slot_height;
        let slots = (0..config.rows.slot_count())
            .map(|i| {
                let x = cx + (i as f64 - rows_f * 0.5) * peg_spacing_x;
                SlotGeometry {
                    index: i,
                    x,
                    width: peg_spacing_x,
                    sensor: Rect {
                        cx: x,
                        cy: sensor_cy,
                        half_width: 0.35 * peg_spacing_x,
                        half_height: sensor_half_height,
                    },
                }
            })
            .collect::<Vec<_>>();

        // Interior boundaries only; the side walls close the outer slots.
        let divider_half_width = (0.35 * peg_radius).max(1.5);
        let last_row = &pegs[pegs.len() - 1];
        let dividers = last_row[1..last_row.len() - 1]
            .iter()
            .map(|p| Rect::from_edges(
                p.x - divider_half_width,
                slot_top,
                p.x + divider_half_width,
                board_bottom,
            ))
            .collect();

        let inner_left = padding;
        let inner_right = width - padding;
        let guide_bottom = spawn_y - 4.0 * chip_radius;
        let boundary = Boundary {
            left: Rect::from_edges(inner_left - WALL_THICKNESS, -height, inner_left, 2.0 * height),
            right: Rect::from_edges(inner_right, -height, inner_right + WALL_THICKNESS, 2.0 * height),
            top_guide: Rect::from_edges(
                inner_left,
                guide_bottom - WALL_THICKNESS,
                inner_right,
                guide_bottom,
            ),
            floor: Rect::from_edges(-width, board_bottom, 2.0 * width, board_bottom + WALL_THICKNESS),
        };

        tracing::trace!(
            rows,
            width,
            height,
            peg_spacing_x,
            peg_spacing_y,
            peg_radius,
            chip_radius,
            "board layout computed"
        );

        Ok(Self {
            config,
            padding,
            peg_radius,
            chip_radius,
            peg_spacing_x,
            peg_spacing_y,
            first_row_y,
            last_row_y,
            slot_top,
            board_bottom,
            spawn_y,
            pegs,
            slots,
            dividers,
            boundary,
        })
    }

    pub fn rows(&self) -> RowCount {
        self.config.rows
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Horizontal centre of the board.
    pub fn centre_x(&self) -> f64 {
        self.config.width * 0.5
    }

    /// Half the distance between the side walls' inner faces.
    pub fn half_inner_width(&self) -> f64 {
        self.config.width * 0.5 - self.padding
    }

    /// Total peg count over all rows.
    pub fn peg_count(&self) -> usize {
        self.pegs.iter().map(Vec::len).sum()
    }

    /// Horizontal range a chip may spawn in: clear of both walls by
    /// `chip_radius + peg_radius + 2` pixels.
    pub fn drop_zone(&self) -> (f64, f64) {
        let margin = self.chip_radius + self.peg_radius + 2.0;
        (
            self.padding + margin,
            self.config.width - self.padding - margin,
        )
    }
}
