// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io};

use colored::Color;
use jiff::{Timestamp, Zoned};
use tick_core::{Importance, Item};

use crate::arg::OutputFormat;
use crate::table::{Column, PaddingDirection, Table};
use crate::util::{format_deadline, short_id};

#[derive(Debug)]
pub struct ItemFormatter {
    columns: Vec<ItemColumn>,
    format: OutputFormat,
}

impl ItemFormatter {
    pub fn new(now: Zoned) -> Self {
        Self {
            columns: vec![
                ItemColumn::Done,
                ItemColumn::Id,
                ItemColumn::Importance,
                ItemColumn::Deadline(now),
                ItemColumn::Text,
            ],
            format: OutputFormat::Table,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn write_to(&self, w: &mut impl io::Write, items: &[Item]) -> Result<(), Box<dyn Error>> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, items)?;
                writeln!(w)?;
                Ok(())
            }
            OutputFormat::Table => Table {
                columns: &self.columns,
                separator: " ",
                padding: true,
                data: items,
            }
            .write_to(w),
        }
    }

    pub fn print(&self, items: &[Item]) -> Result<(), Box<dyn Error>> {
        self.write_to(&mut io::stdout().lock(), items)
    }
}

#[derive(Debug, Clone)]
enum ItemColumn {
    Done,
    Id,
    Importance,
    Deadline(Zoned),
    Text,
}

impl Column<Item> for ItemColumn {
    fn format(&self, item: &Item) -> String {
        match self {
            ItemColumn::Done => (if item.is_done() { "[x]" } else { "[ ]" }).to_string(),
            ItemColumn::Id => short_id(item.id()).to_string(),
            ItemColumn::Importance => match item.importance() {
                Importance::High => "!",
                Importance::Normal => "",
                Importance::Low => "-",
            }
            .to_string(),
            ItemColumn::Deadline(now) => item
                .deadline()
                .map(|d| format_deadline(d, now.time_zone()))
                .unwrap_or_default(),
            ItemColumn::Text => item.text().to_string(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            ItemColumn::Importance => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn get_color(&self, item: &Item) -> Option<Color> {
        match self {
            ItemColumn::Importance => Some(Color::Red),
            ItemColumn::Deadline(now) if !item.is_done() => {
                deadline_color(item.deadline()?, now)
            }
            ItemColumn::Text if item.is_done() => Some(Color::BrightBlack),
            _ => None,
        }
    }
}

/// Red once the deadline has passed, yellow when it falls later today.
fn deadline_color(deadline: Timestamp, now: &Zoned) -> Option<Color> {
    if deadline < now.timestamp() {
        Some(Color::Red)
    } else if deadline.to_zoned(now.time_zone().clone()).date() == now.date() {
        Some(Color::Yellow)
    } else {
        None
    }
}
