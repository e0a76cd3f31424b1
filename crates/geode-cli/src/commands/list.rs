//! List command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use geode_core::{
    Article, Cursor, Entity, EntityKind, Locality, Mineral, Photo, ResultStore,
};
use geode_list::{ListController, Screen};

use super::query::QueryArgs;
use crate::cli::SourceArgs;
use crate::output;
use crate::settings::{self, Resolved};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Screen to list (minerals, articles, photos, localities, associate-minerals)
    pub screen: Screen,

    #[command(flatten)]
    pub query: QueryArgs,

    /// Number of pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Print records as JSON, one per line
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ListArgs, source: &SourceArgs) -> Result<()> {
    let resolved = settings::load()?.resolve(source)?;

    match args.screen.kind() {
        EntityKind::Mineral => list::<Mineral>(&args, &resolved).await,
        EntityKind::Locality => list::<Locality>(&args, &resolved).await,
        EntityKind::Photo => list::<Photo>(&args, &resolved).await,
        EntityKind::Article => list::<Article>(&args, &resolved).await,
    }
}

async fn list<T: Entity>(args: &ListArgs, resolved: &Resolved) -> Result<()> {
    // Nobody is typing; fetch at once.
    let config = resolved.controller.with_debounce(Duration::ZERO);
    let controller: ListController<T> = args
        .screen
        .controller(resolved.open_source()?, config)
        .context("Failed to open screen")?;

    let query = args.query.apply(args.screen.initial_query())?;
    controller.set_query(query);
    controller.mount();

    let mut store = controller.wait_idle().await;
    for _ in 1..args.pages {
        let before = store.cursor.clone();
        if !controller.end_reached() {
            break;
        }
        store = controller.wait_idle().await;
        if append_stalled(before.as_ref(), &store) {
            output::status("Could not load the next page.");
            break;
        }
    }
    controller.unmount();

    if store.items.is_empty() {
        output::no_results("Try a broader search or fewer filters.");
        return Ok(());
    }

    for (position, item) in store.items.iter().enumerate() {
        if args.json {
            output::json(item)?;
        } else {
            output::item(position, item);
        }
    }

    if store.cursor.is_some() {
        output::status(&format!(
            "{} shown, more available (use --pages {})",
            store.items.len(),
            args.pages + 1
        ));
    }

    Ok(())
}

/// A failed append leaves the cursor where it was; a successful one moves
/// it, even when the page itself was empty.
fn append_stalled<T>(before: Option<&Cursor>, store: &ResultStore<T>) -> bool {
    store.cursor.is_some() && store.cursor.as_ref() == before
}
