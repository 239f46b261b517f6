use std::{
    io::Read,
    path::PathBuf,
    process::ExitCode,
};

use clap::{
    Args,
    Parser,
    Subcommand,
};
use tracing::{
    error,
    warn,
};
use xivcollect::{
    catalog::{
        detail::describe_acquisition,
        LoadMore,
        OwnershipFilter,
        Page,
        SortKey,
    },
    core::{
        loader::load_store,
        store::GLOBAL_SEARCH_LIMIT,
        tables::patch_bucket,
        utils::{
            display_name,
            display_patch,
        },
        Item,
    },
    persistence::{
        FileStore,
        KeyValueStore,
    },
    AppConfig,
    Browser,
    CatalogError,
    ItemStore,
};

#[derive(Debug, Parser)]
#[command(name = "xivcollect", version, about = "Browse collection data and track what you own")]
struct Cli {
    /// Data directory or base URL (overrides config)
    #[arg(long, global = true)]
    data: Option<String>,

    /// Store file for ownership, wishlist and settings (overrides config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file (defaults to config.json in the app data dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Filtered, sorted list of one collection
    List(ListArgs),
    /// Item detail
    Show { collection: String, id: u32 },
    /// Name search across all collections
    Search {
        query: String,
        #[arg(long, default_value_t = GLOBAL_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Toggle ownership of an item
    Own { collection: String, id: u32 },
    /// Toggle an item on the wishlist
    Wish { collection: String, id: u32 },
    /// Show the wishlist
    Wishlist,
    /// Completion per collection
    Progress {
        /// Toggle a source category out of (or back into) progress counting
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Print a backup code
    Export,
    /// Replace all stored data with a backup code ("-" reads stdin)
    Import { code: String },
}

#[derive(Debug, Args)]
struct ListArgs {
    collection: String,

    #[arg(long = "category")]
    categories: Vec<String>,

    /// Patch bucket label, e.g. 6.x or 未知
    #[arg(long = "patch")]
    patches: Vec<String>,

    #[arg(long)]
    search: Option<String>,

    #[arg(long, default_value = "name")]
    sort: String,

    /// all, owned or not-owned; persisted
    #[arg(long)]
    ownership: Option<OwnershipFilter>,

    #[arg(long)]
    show_no_source: bool,

    /// Number of pages to render
    #[arg(long, default_value_t = 1)]
    pages: usize,
}

fn init_tracing() {
    use tracing_subscriber::{
        prelude::*,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CatalogError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(data) = cli.data {
        config.data_source = data;
    }
    if let Some(store) = cli.store {
        config.store_file = Some(store);
    }

    let kv = FileStore::open(config.store_path())?;

    // Backups only touch the key-value store.
    let items = match &cli.command {
        Command::Export | Command::Import { .. } => ItemStore::default(),
        _ => load_store(&config.data_source()).await?,
    };
    let mut browser = Browser::new(&items, kv)?;

    match cli.command {
        Command::List(args) => list(&mut browser, args),
        Command::Show { collection, id } => show(&browser, &collection, id),
        Command::Search { query, limit } => {
            search(&items, &query, limit);
            Ok(())
        }
        Command::Own { collection, id } => {
            browser.select_collection(&collection)?;
            let owned = browser.toggle_owned(id)?;
            println!("{collection}:{id} {}", if owned { "owned" } else { "not owned" });
            Ok(())
        }
        Command::Wish { collection, id } => {
            let wished = browser.toggle_wishlist(&collection, id)?;
            println!("{collection}:{id} {}", if wished { "wishlisted" } else { "removed" });
            Ok(())
        }
        Command::Wishlist => {
            for entry in browser.wishlist_entries() {
                print_row(entry.collection, entry.item);
            }
            Ok(())
        }
        Command::Progress { exclude } => progress(&mut browser, &items, &exclude),
        Command::Export => export(&browser),
        Command::Import { code } => import(&mut browser, &code),
    }
}

fn list<S: KeyValueStore>(
    browser: &mut Browser<'_, S>,
    args: ListArgs,
) -> Result<(), CatalogError> {
    browser.select_collection(&args.collection)?;
    for category in &args.categories {
        browser.toggle_category(category);
    }
    for patch in &args.patches {
        if patch_bucket(patch).is_none() {
            warn!(patch = %patch, "Unknown patch bucket");
        }
        browser.toggle_patch(patch);
    }
    if let Some(query) = &args.search {
        browser.set_search_query(query);
    }
    if args.show_no_source {
        browser.toggle_show_no_source();
    }
    if let Some(ownership) = args.ownership {
        browser.set_ownership_filter(ownership)?;
    }
    browser.set_sort_key(SortKey::from_key(&args.sort));

    let first = browser.refresh();
    print_page(browser, &first);
    for _ in 1..args.pages {
        let Some(page) = browser.render_more() else {
            break;
        };
        print_page(browser, &page);
    }

    let counts = browser.counts();
    println!(
        "-- showing {} / {} ({} total, sorted by {})",
        counts.rendered,
        counts.filtered,
        counts.total,
        browser.effective_sort_key().label()
    );
    if let LoadMore::Visible { remaining } = browser.load_more() {
        println!("-- {remaining} more, use --pages to see them");
    }
    Ok(())
}

fn print_page<S: KeyValueStore>(browser: &Browser<'_, S>, page: &Page<'_>) {
    for item in &page.items {
        let owned = if browser.is_owned(item.id) { "x" } else { " " };
        println!("[{owned}] {:>6}  {:<8} {}", item.id, display_patch(item), display_name(item));
    }
}

fn show<S: KeyValueStore>(
    browser: &Browser<'_, S>,
    collection: &str,
    id: u32,
) -> Result<(), CatalogError> {
    let detail = browser.item_detail_in(collection, id)?;

    println!("{}", detail.name);
    println!("Patch {}", detail.patch);
    println!("Icon  {}", detail.icon_url);
    if !detail.description.is_empty() {
        println!();
        println!("{}", detail.description);
    }
    println!();
    if detail.acquisitions.is_empty() {
        println!("No source data");
    }
    for acquisition in &detail.acquisitions {
        println!("- {}", describe_acquisition(acquisition));
    }
    if let Some(sprite) = detail.sprite {
        println!("Sprite {} ({} frames)", sprite.url, sprite.frames);
    }
    println!();
    println!("owned: {}  wishlist: {}", detail.owned, detail.wishlisted);
    Ok(())
}

fn search(items: &ItemStore, query: &str, limit: usize) {
    let hits = items.search_all(query, limit);
    if hits.is_empty() {
        println!("No results");
    }
    for hit in hits {
        print_row(hit.collection, hit.item);
    }
}

fn print_row(collection: &str, item: &Item) {
    println!("{collection:<22} {:>6}  {}", item.id, display_name(item));
}

fn progress<S: KeyValueStore>(
    browser: &mut Browser<'_, S>,
    items: &ItemStore,
    exclude: &[String],
) -> Result<(), CatalogError> {
    for category in exclude {
        let excluded = browser.toggle_exclude_category(category)?;
        println!("{category} {}", if excluded { "excluded" } else { "counted" });
    }

    for collection in items.tabs() {
        let progress = browser.progress_for(&collection.collection_name)?;
        println!("{:<22} {progress}", collection.collection_name);
    }
    Ok(())
}

fn export<S: KeyValueStore>(browser: &Browser<'_, S>) -> Result<(), CatalogError> {
    let stats = browser.export_stats()?;
    eprintln!("{} owned, {} on the wishlist", stats.total_owned, stats.wishlist_count);
    println!("{}", browser.export_backup()?);
    Ok(())
}

fn import<S: KeyValueStore>(browser: &mut Browser<'_, S>, code: &str) -> Result<(), CatalogError> {
    let code = if code == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        code.to_string()
    };

    browser.import_backup(&code)?;
    let stats = browser.export_stats()?;
    println!("Imported {} owned, {} on the wishlist", stats.total_owned, stats.wishlist_count);
    Ok(())
}
