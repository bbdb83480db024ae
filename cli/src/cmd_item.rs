// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use jiff::Zoned;
use tick_core::{Importance, Item, ItemDraft, ItemPatch, SyncEngine};

use crate::arg::{CommonArgs, ItemArgs, OutputFormat};
use crate::item_formatter::ItemFormatter;
use crate::util::parse_deadline;

#[derive(Debug, Clone)]
pub struct CmdList {
    pub output_format: OutputFormat,
}

impl CmdList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List all items, open ones first")
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing items...");
        let mut items = engine.items().await;
        items.sort_by_key(Item::is_done);
        print(&items, self.output_format)
    }
}

#[derive(Debug, Clone)]
pub struct CmdAdd {
    pub text: String,
    pub importance: Option<Importance>,
    pub deadline: Option<String>,
    pub output_format: OutputFormat,
}

impl CmdAdd {
    pub const NAME: &str = "add";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("new")
            .about("Add a new item")
            .arg(ItemArgs::text(true))
            .arg(ItemArgs::importance())
            .arg(ItemArgs::deadline())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            text: ItemArgs::get_text(matches).unwrap_or_default(),
            importance: ItemArgs::get_importance(matches),
            deadline: ItemArgs::get_deadline(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding item...");
        let now = Zoned::now();
        let draft = ItemDraft {
            text: self.text,
            importance: self.importance.unwrap_or_default(),
            deadline: match &self.deadline {
                Some(deadline) => parse_deadline(deadline, &now)?,
                None => None,
            },
            done: false,
        };
        let item = engine.add(draft.into_item(now.timestamp())?).await?;
        print(&[item], self.output_format)
    }
}

#[derive(Debug, Clone)]
pub struct CmdEdit {
    pub id: String,
    pub text: Option<String>,
    pub importance: Option<Importance>,
    pub deadline: Option<String>,
    pub output_format: OutputFormat,
}

impl CmdEdit {
    pub const NAME: &str = "edit";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Edit an item")
            .arg(ItemArgs::id())
            .arg(ItemArgs::text(false))
            .arg(ItemArgs::importance())
            .arg(ItemArgs::deadline())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            id: ItemArgs::get_id(matches),
            text: ItemArgs::get_text(matches),
            importance: ItemArgs::get_importance(matches),
            deadline: ItemArgs::get_deadline(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "editing item...");
        let now = Zoned::now();
        let patch = ItemPatch {
            text: self.text,
            importance: self.importance,
            deadline: self
                .deadline
                .as_deref()
                .map(|d| parse_deadline(d, &now))
                .transpose()?,
            done: None,
        };
        if patch.is_empty() {
            return Err("Nothing to change, pass --text, --importance or --deadline".into());
        }

        let id = resolve_id(engine, &self.id).await?;
        let current = engine.get(&id).await.ok_or("Item not found")?;
        let item = engine.edit(&id, patch.apply(&current, now.timestamp())?).await?;
        print(&[item], self.output_format)
    }
}

#[derive(Debug, Clone)]
pub struct CmdDone {
    pub ids: Vec<String>,
    pub output_format: OutputFormat,
}

impl CmdDone {
    pub const NAME: &str = "done";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mark items as done")
            .arg(ItemArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: ItemArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "marking items as done...");
        let items = set_done(engine, &self.ids, true).await?;
        print(&items, self.output_format)
    }
}

#[derive(Debug, Clone)]
pub struct CmdUndo {
    pub ids: Vec<String>,
    pub output_format: OutputFormat,
}

impl CmdUndo {
    pub const NAME: &str = "undo";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Mark items as not done")
            .arg(ItemArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: ItemArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "marking items as undone...");
        let items = set_done(engine, &self.ids, false).await?;
        print(&items, self.output_format)
    }
}

#[derive(Debug, Clone)]
pub struct CmdDelete {
    pub ids: Vec<String>,
    pub output_format: OutputFormat,
}

impl CmdDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete items")
            .arg(ItemArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: ItemArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, engine: &SyncEngine) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting items...");
        let mut deleted = Vec::with_capacity(self.ids.len());
        for query in &self.ids {
            let id = resolve_id(engine, query).await?;
            deleted.push(engine.delete(&id).await?);
        }
        print(&deleted, self.output_format)
    }
}

async fn set_done(
    engine: &SyncEngine,
    ids: &[String],
    done: bool,
) -> Result<Vec<Item>, Box<dyn Error>> {
    let mut items = Vec::with_capacity(ids.len());
    for query in ids {
        let id = resolve_id(engine, query).await?;
        let current = engine.get(&id).await.ok_or("Item not found")?;
        let item = if current.is_done() == done {
            tracing::info!(%id, done, "item already in the requested state");
            current
        } else {
            engine
                .edit(&id, current.mark_done(done, jiff::Timestamp::now()))
                .await?
        };
        items.push(item);
    }
    Ok(items)
}

/// Finds the item whose id is `query` or, failing that, starts with it.
async fn resolve_id(engine: &SyncEngine, query: &str) -> Result<String, Box<dyn Error>> {
    if engine.get(query).await.is_some() {
        return Ok(query.to_string());
    }
    if query.is_empty() {
        return Err("Item id must not be empty".into());
    }

    let matches: Vec<String> = engine
        .items()
        .await
        .into_iter()
        .filter(|i| i.id().starts_with(query))
        .map(|i| i.id().to_string())
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Err(format!("Item not found: {query}").into()),
        _ => Err(format!("Ambiguous id {query}, it matches {} items", matches.len()).into()),
    }
}

fn print(items: &[Item], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    ItemFormatter::new(Zoned::now())
        .with_output_format(format)
        .print(items)
}
