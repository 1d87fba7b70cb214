//! `tcheck` subcommands.
//!
//! ## Commands
//!
//! - `tcheck --book tit current`
//! - `tcheck --book tit next [--filter reminders]`
//! - `tcheck --book tit prev [--filter not-finished]`
//! - `tcheck --book tit goto --group apostle --chapter 1 --verse 1 --quote ἀπόστολος`
//! - `tcheck --book tit menu [--filter comments] [--book-name Titus] [--rtl]`
//! - `tcheck --book tit verse --chapter 1 --verse 1`
//! - `tcheck --book tit helps --link en/ta/translate/figs-metaphor --resources DIR`

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tcheck_core::config::{CheckingConfig, ConfigLoader};
use tcheck_core::group_data::{load_groups_index, load_project_group_data};
use tcheck_core::helps::{HelpsLink, ResourcesSnapshot, follow_helps_link};
use tcheck_core::menu::{GroupMenu, MenuItem, menu_entries};
use tcheck_core::quote::quote_to_string;
use tcheck_core::{
    AutoCommitter, CheckRecord, CheckingSession, ContextId, FilterKey, Filters, GroupIndexEntry,
    GroupsData, GroupsIndex, GroupsStore, Reference, TextDirection,
};

/// Navigate and inspect the checks of one book in a project.
#[derive(Debug, Parser)]
#[command(name = "tcheck", version)]
pub struct CheckCli {
    /// Configuration file (defaults to ./tcheck.toml, then the user config dir).
    #[arg(long = "config", short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Project directory (defaults to current directory).
    #[arg(long = "project", short = 'C', default_value = ".", global = true)]
    pub project: PathBuf,

    /// Checking tool whose group data is used.
    #[arg(long = "tool", default_value = "translationWords", global = true)]
    pub tool: String,

    /// Book id (e.g., tit).
    #[arg(long = "book", short = 'b', global = true, default_value = "")]
    pub book: String,

    /// Groups index file. Without one, groups are ordered by id.
    #[arg(long = "groups-index", global = true)]
    pub groups_index: Option<PathBuf>,

    /// Do not commit the project after changing context.
    #[arg(long = "no-commit", global = true)]
    pub no_commit: bool,

    /// Output as JSON.
    #[arg(long = "json", short = 'j', global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CheckSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum CheckSubcommand {
    /// Show the current context (restoring the saved one if any).
    Current,
    /// Move to the next visible check.
    Next(StepArgs),
    /// Move to the previous visible check.
    Prev(StepArgs),
    /// Make a specific check current.
    Goto(GotoArgs),
    /// Print the group menu.
    Menu(MenuArgs),
    /// Print the checks of every group on one verse.
    Verse(VerseArgs),
    /// Follow a translation-helps link.
    Helps(HelpsArgs),
}

#[derive(Debug, Parser)]
pub struct StepArgs {
    /// Only stop at checks matching this filter (repeatable).
    #[arg(long = "filter", short = 'f')]
    pub filters: Vec<FilterKey>,
}

#[derive(Debug, Parser)]
pub struct GotoArgs {
    /// Group id.
    #[arg(long = "group", short = 'g')]
    pub group: String,

    #[arg(long = "chapter")]
    pub chapter: u32,

    #[arg(long = "verse")]
    pub verse: u32,

    /// Original-language quote of the check.
    #[arg(long = "quote", short = 'q')]
    pub quote: String,

    #[arg(long = "occurrence", default_value_t = 1)]
    pub occurrence: u32,
}

#[derive(Debug, Parser)]
pub struct MenuArgs {
    /// Only show checks matching this filter (repeatable).
    #[arg(long = "filter", short = 'f')]
    pub filters: Vec<FilterKey>,

    /// Book name used in item titles (defaults to the book id).
    #[arg(long = "book-name")]
    pub book_name: Option<String>,

    /// Right-to-left titles.
    #[arg(long = "rtl")]
    pub rtl: bool,
}

#[derive(Debug, Parser)]
pub struct VerseArgs {
    #[arg(long = "chapter")]
    pub chapter: u32,

    #[arg(long = "verse")]
    pub verse: u32,
}

#[derive(Debug, Parser)]
pub struct HelpsArgs {
    /// Link of the form <lang>/<type>/<category>/<article>.
    #[arg(long = "link", short = 'l')]
    pub link: String,

    /// Root of the helps resources (<root>/<lang>/<resourceDir>/<category>/<article>.md).
    #[arg(long = "resources", short = 'r')]
    pub resources: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepOutput<'a> {
    moved: bool,
    context_id: Option<&'a ContextId>,
}

impl CheckCli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        if let CheckSubcommand::Helps(args) = &self.command {
            return cmd_helps(args, self.json);
        }
        if self.book.is_empty() {
            anyhow::bail!("--book is required");
        }

        let store = self.load_store()?;
        let mut auto_commit = config.auto_commit.clone();
        auto_commit.enabled &= !self.no_commit;
        let committer = Arc::new(AutoCommitter::new(
            &self.project,
            &auto_commit,
            config.user.identity(),
        ));
        let mut session = CheckingSession::new(
            self.project.clone(),
            self.tool.clone(),
            self.book.clone(),
            store,
            committer.clone(),
        )
        .with_filters(config.navigation.filters()?)
        .with_username(config.user.username.clone());

        let result = self.dispatch(&mut session);
        committer.wait_idle().await;
        result
    }

    fn load_config(&self) -> Result<CheckingConfig> {
        let config = match &self.config {
            Some(path) => ConfigLoader::new().with_file(path).load(),
            None => ConfigLoader::load_default(),
        };
        config.context("loading configuration")
    }

    fn load_store(&self) -> Result<GroupsStore> {
        let data = load_project_group_data(&self.project, &self.tool, &self.book);
        let index = match &self.groups_index {
            Some(path) => load_groups_index(path)
                .with_context(|| format!("loading groups index {}", path.display()))?,
            None => index_from_data(&data),
        };
        tracing::debug!(
            "Loaded {} groups ({} with data) for {} {}",
            index.len(),
            data.len(),
            self.tool,
            self.book
        );
        Ok(GroupsStore::new(index, data))
    }

    fn dispatch(&self, session: &mut CheckingSession) -> Result<()> {
        match &self.command {
            CheckSubcommand::Current => {
                let current = session.load_current_context_id()?;
                print_context(current.as_ref(), self.json)
            }
            CheckSubcommand::Next(args) => self.cmd_step(session, args, true),
            CheckSubcommand::Prev(args) => self.cmd_step(session, args, false),
            CheckSubcommand::Goto(args) => {
                let context_id = ContextId::new(
                    self.tool.clone(),
                    args.group.clone(),
                    Reference::new(self.book.clone(), args.chapter, args.verse),
                    args.quote.as_str(),
                    args.occurrence,
                );
                session.change_current_context_id(Some(context_id))?;
                print_context(session.context_id(), self.json)
            }
            CheckSubcommand::Menu(args) => self.cmd_menu(session, args),
            CheckSubcommand::Verse(args) => self.cmd_verse(session, args),
            CheckSubcommand::Helps(args) => cmd_helps(args, self.json),
        }
    }

    fn cmd_step(
        &self,
        session: &mut CheckingSession,
        args: &StepArgs,
        forward: bool,
    ) -> Result<()> {
        if !args.filters.is_empty() {
            *session.filters_mut() = Filters::from_keys(args.filters.iter().copied())?;
        }
        session.load_current_context_id()?;
        let moved = if forward {
            session.change_to_next_context_id()?
        } else {
            session.change_to_previous_context_id()?
        };

        if self.json {
            let output = StepOutput {
                moved: moved.is_some(),
                context_id: session.context_id(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        if moved.is_none() {
            println!(
                "No {} check; staying at current context",
                if forward { "next" } else { "previous" }
            );
        }
        print_context(session.context_id(), false)
    }

    fn cmd_menu(&self, session: &CheckingSession, args: &MenuArgs) -> Result<()> {
        let filters = if args.filters.is_empty() {
            session.filters().clone()
        } else {
            Filters::from_keys(args.filters.iter().copied())?
        };
        let direction = if args.rtl {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        };
        let book_name = args.book_name.as_deref().unwrap_or(&self.book);
        let store = session.store();
        let groups = menu_entries(store.index(), store.data(), book_name, direction);
        let menu = GroupMenu::new(groups, filters, |_: &ContextId| {});
        let visible = menu.visible_groups();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&visible)?);
            return Ok(());
        }
        if visible.is_empty() {
            println!("No results");
        }
        for group in &visible {
            println!("{} ({})", group.title, group.id);
            for item in &group.children {
                println!("  [{}] {}", status_marks(item), item.title);
            }
        }
        Ok(())
    }

    fn cmd_verse(&self, session: &CheckingSession, args: &VerseArgs) -> Result<()> {
        let context_id = ContextId {
            tool: self.tool.clone(),
            reference: Some(Reference::new(self.book.clone(), args.chapter, args.verse)),
            ..ContextId::default()
        };
        let on_verse: BTreeMap<String, Vec<CheckRecord>> = session
            .store()
            .group_data_for_verse(&context_id)
            .into_iter()
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&on_verse)?);
            return Ok(());
        }
        for (group_id, records) in &on_verse {
            println!("{group_id}");
            for record in records {
                println!(
                    "  {} (occurrence {})",
                    quote_to_string(&record.context_id.quote),
                    record.context_id.occurrence
                );
            }
        }
        Ok(())
    }
}

fn cmd_helps(args: &HelpsArgs, json: bool) -> Result<()> {
    let link = HelpsLink::parse(&args.link)?;
    let mut resources = ResourcesSnapshot::new();
    if let Some(resource_dir) = link.resource_dir() {
        resources.load_article(
            &args.resources,
            resource_dir,
            &link.article,
            &link.lang,
            &link.category,
        )?;
    }
    let modal = follow_helps_link(&args.link, &resources);

    if json {
        println!("{}", serde_json::to_string_pretty(&modal)?);
    } else {
        println!("{}", modal.article);
    }
    Ok(())
}

/// Groups in id order, named by id, for projects without an index file.
fn index_from_data(data: &GroupsData) -> GroupsIndex {
    let mut ids: Vec<&String> = data.keys().collect();
    ids.sort();
    ids.into_iter()
        .map(|id| GroupIndexEntry::new(id.clone(), id.clone()))
        .collect()
}

fn print_context(context_id: Option<&ContextId>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&context_id)?);
        return Ok(());
    }
    match context_id {
        Some(context_id) => println!(
            "{} \"{}\" (occurrence {})",
            context_id.reference_str(),
            quote_to_string(&context_id.quote),
            context_id.occurrence
        ),
        None => println!("No checks in project"),
    }
    Ok(())
}

fn status_marks(item: &MenuItem) -> String {
    [
        (item.finished, 'x'),
        (item.reminders, 'b'),
        (item.invalidated, '!'),
        (item.comments, 'c'),
        (item.verse_edits, 'e'),
    ]
    .iter()
    .map(|&(set, mark)| if set { mark } else { ' ' })
    .collect()
}
