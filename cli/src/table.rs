// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

/// Plain-text table, one row per datum, optionally padded into aligned columns.
pub struct Table<'a, T, C: Column<T>> {
    pub columns: &'a [C],
    pub separator: &'a str,
    pub padding: bool,
    pub data: &'a [T],
}

impl<T, C: Column<T>> Table<'_, T, C> {
    pub fn write_to(&self, w: &mut impl io::Write) -> Result<(), Box<dyn Error>> {
        let rows: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|d| self.columns.iter().map(|col| col.format(d)).collect())
            .collect();

        let widths = self.padding.then(|| column_widths(&rows, self.columns.len()));

        for (cells, datum) in rows.into_iter().zip(self.data) {
            let last = cells.len().saturating_sub(1);
            for (j, (col, cell)) in self.columns.iter().zip(cells).enumerate() {
                let direction = col.padding_direction();
                let cell = match widths.as_ref().and_then(|w| w.get(j)) {
                    // trailing left-aligned cells need no padding
                    Some(_) if j == last && direction == PaddingDirection::Left => cell,
                    Some(&width) => pad(cell, width, direction),
                    None => cell,
                };
                let cell = match col.get_color(datum) {
                    Some(color) => cell.color(color).to_string(),
                    None => cell,
                };
                write!(w, "{cell}")?;

                if j < last {
                    write!(w, "{}", self.separator)?;
                } else {
                    writeln!(w)?;
                }
            }
        }

        Ok(())
    }
}

pub trait Column<T> {
    fn format(&self, data: &T) -> String;
    fn padding_direction(&self) -> PaddingDirection;
    fn get_color(&self, data: &T) -> Option<Color>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

fn pad(cell: String, width: usize, direction: PaddingDirection) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match direction {
        PaddingDirection::Left => cell + &fill,
        PaddingDirection::Right => fill + &cell,
    }
}

fn column_widths(rows: &[Vec<String>], columns: usize) -> Vec<usize> {
    let mut widths = vec![0; columns];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }
    widths
}
