//! Interactive browse command.
//!
//! Reads one command per line from stdin and renders every store update.
//! Plain text becomes the search; lines starting with `:` are commands.
//! On end of input the session waits for the current fetch, renders it and
//! exits, so `echo garnet | geode browse minerals` works in scripts.

use anyhow::{Context, Result, bail};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

use geode_core::{
    Article, Entity, EntityKind, FilterValue, Locality, Mineral, Photo, ResultStore, Sort,
};
use geode_list::{ListController, Screen};

use super::query::{self, QueryArgs, RADIUS_KEY};
use crate::cli::SourceArgs;
use crate::output;
use crate::settings::{self, Resolved};

const HELP: &str = "\
Type to search. Commands:
  :more                   load the next page
  :sort FIELD[:asc|desc]  sort (no argument restores server order)
  :filter KEY=VALUE       substring filter
  :range KEY=MIN..MAX     numeric range filter
  :choice KEY=A,B         multi-choice filter
  :near LAT,LNG,KM        radius filter
  :unfilter KEY           remove a filter
  :reset                  clear search, filters and sort
  :help                   show this help
  :quit                   exit";

#[derive(Args, Debug)]
pub struct BrowseArgs {
    /// Screen to browse (minerals, articles, photos, localities, associate-minerals)
    pub screen: Screen,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Search(String),
    More,
    Sort(Option<Sort>),
    Filter(String, FilterValue),
    Unfilter(String),
    Reset,
    Help,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Result<Input> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Input::Search(line.to_string()));
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        let input = match (name, arg) {
            ("more" | "m", "") => Input::More,
            ("sort", "") => Input::Sort(None),
            ("sort", arg) => Input::Sort(Some(arg.parse().context("Invalid sort")?)),
            ("filter", arg) => {
                let (key, value) = query::parse_text(arg)?;
                Input::Filter(key, value)
            }
            ("range", arg) => {
                let (key, value) = query::parse_range(arg)?;
                Input::Filter(key, value)
            }
            ("choice", arg) => {
                let (key, value) = query::parse_choices(arg)?;
                Input::Filter(key, value)
            }
            ("near", arg) => Input::Filter(RADIUS_KEY.to_string(), query::parse_near(arg)?),
            ("unfilter", key) if !key.is_empty() => Input::Unfilter(key.to_string()),
            ("reset", "") => Input::Reset,
            ("help" | "h" | "?", "") => Input::Help,
            ("quit" | "q" | "exit", "") => Input::Quit,
            _ => bail!("Unknown command ':{}' (try :help)", command),
        };
        Ok(input)
    }
}

pub async fn run(args: BrowseArgs, source: &SourceArgs) -> Result<()> {
    let resolved = settings::load()?.resolve(source)?;

    match args.screen.kind() {
        EntityKind::Mineral => browse::<Mineral>(&args, &resolved).await,
        EntityKind::Locality => browse::<Locality>(&args, &resolved).await,
        EntityKind::Photo => browse::<Photo>(&args, &resolved).await,
        EntityKind::Article => browse::<Article>(&args, &resolved).await,
    }
}

async fn browse<T: Entity>(args: &BrowseArgs, resolved: &Resolved) -> Result<()> {
    let controller: ListController<T> = args
        .screen
        .controller(resolved.open_source()?, resolved.controller)
        .context("Failed to open screen")?;
    controller.set_query(args.query.apply(args.screen.initial_query())?);

    output::status(&format!("Browsing {} ({})", args.screen, resolved.api));
    output::status(HELP);

    let mut view = View::default();
    let mut updates = controller.updates();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    controller.mount();

    loop {
        tokio::select! {
            Some(store) = updates.next() => view.render(&store),
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    // End of input: show the result of what was typed.
                    let store = controller.wait_idle().await;
                    view.render(&store);
                    break;
                };
                match Input::parse(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => view.apply(&controller, input),
                    Err(e) => output::error(&format!("{:#}", e)),
                }
            }
        }
    }

    controller.unmount();
    Ok(())
}

/// What has been printed for the current query.
#[derive(Debug, Default)]
struct View {
    shown: usize,
    last: Option<Status>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Searching,
    LoadingMore,
    Empty,
    More,
    End,
}

impl View {
    fn apply<T: Entity>(&mut self, controller: &ListController<T>, input: Input) {
        let changed = match input {
            Input::Search(text) => controller.set_search_text(text),
            Input::Sort(sort) => controller.set_sort(sort),
            Input::Filter(key, value) => controller.set_filter(key, value),
            Input::Unfilter(key) => controller.remove_filter(&key),
            Input::Reset => controller.reset(),
            Input::More => {
                if !controller.end_reached() {
                    output::status("Nothing more to load.");
                }
                false
            }
            Input::Help => {
                output::status(HELP);
                false
            }
            Input::Quit => false,
        };

        if changed {
            self.shown = 0;
            self.last = None;
        }
    }

    fn render<T: Entity>(&mut self, store: &ResultStore<T>) {
        if store.is_initial_loading {
            self.shown = 0;
            self.status(Status::Searching);
            return;
        }

        if store.items.len() < self.shown {
            self.shown = 0;
        }
        if store.items.len() > self.shown {
            for (offset, item) in store.items[self.shown..].iter().enumerate() {
                output::item(self.shown + offset, item);
            }
            self.shown = store.items.len();
            self.last = None;
        }

        let status = if store.is_loading_more {
            Status::LoadingMore
        } else if store.items.is_empty() {
            Status::Empty
        } else if store.cursor.is_some() {
            Status::More
        } else {
            Status::End
        };
        self.status(status);
    }

    fn status(&mut self, status: Status) {
        if self.last == Some(status) {
            return;
        }
        self.last = Some(status);

        match status {
            Status::Searching => output::status("Searching..."),
            Status::LoadingMore => output::status("Loading more..."),
            Status::Empty => output::no_results("Type :reset to clear search and filters."),
            Status::More => {
                output::status(&format!("{} shown. :more for the next page", self.shown))
            }
            Status::End => output::status(&format!("End of results ({}).", self.shown)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_search() {
        assert_eq!(
            Input::parse("  red garnet ").unwrap(),
            Input::Search("red garnet".to_string())
        );
        assert_eq!(Input::parse("").unwrap(), Input::Search(String::new()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Input::parse(":more").unwrap(), Input::More);
        assert_eq!(Input::parse(":reset").unwrap(), Input::Reset);
        assert_eq!(Input::parse(":q").unwrap(), Input::Quit);
        assert_eq!(Input::parse(":sort").unwrap(), Input::Sort(None));
        assert_eq!(
            Input::parse(":sort hardness:desc").unwrap(),
            Input::Sort(Some(Sort::desc("hardness")))
        );
        assert_eq!(
            Input::parse(":filter formula=SiO").unwrap(),
            Input::Filter("formula".to_string(), FilterValue::text("SiO"))
        );
        assert_eq!(
            Input::parse(":unfilter formula").unwrap(),
            Input::Unfilter("formula".to_string())
        );
    }

    #[test]
    fn test_bad_commands() {
        assert!(Input::parse(":frobnicate").is_err());
        assert!(Input::parse(":more please").is_err());
        assert!(Input::parse(":range hardness=x..y").is_err());
        assert!(Input::parse(":unfilter").is_err());
    }
}
