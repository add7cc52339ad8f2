use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use versecraft::{
    AssetCatalog, Compositor, PostFilter, PostStore, RenderRequest, SortOrder, Theme,
};

#[derive(Parser, Debug)]
#[command(name = "versecraft", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a verse onto a themed background and save the PNG.
    Render(RenderArgs),
    /// List known backgrounds per theme as JSON.
    Backgrounds(CatalogArgs),
    /// List available font names as JSON.
    Fonts(CatalogArgs),
    /// Manage the post archive.
    Post(PostArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Verse text to render.
    #[arg(long)]
    text: String,

    /// Theme to pick the background from.
    #[arg(long, default_value = "default")]
    theme: Theme,

    /// Font display name.
    #[arg(long, default_value = "DancingScript")]
    font: String,

    /// Specific background file name (random within the theme otherwise).
    #[arg(long)]
    background: Option<String>,

    /// Foreground color as #RRGGBB.
    #[arg(long, default_value = "#ffffff")]
    color: String,

    /// Directory holding backgrounds/ and fonts/.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Directory the finished PNG is written into.
    #[arg(long, default_value = "generated")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Directory holding backgrounds/ and fonts/.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// Path of the post archive file.
    #[arg(long, default_value = "posts.json")]
    store: PathBuf,

    #[command(subcommand)]
    cmd: PostCommand,
}

#[derive(Subcommand, Debug)]
enum PostCommand {
    /// Add a post to the archive.
    Add {
        /// Verse text.
        #[arg(long)]
        content: String,
        /// Theme to file the post under.
        #[arg(long, default_value = "default")]
        theme: Theme,
        /// Comma-separated tags.
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// List posts, optionally filtered.
    List {
        /// Keep only posts with this theme.
        #[arg(long)]
        theme: Option<Theme>,
        /// Keep only posts whose tags contain this substring.
        #[arg(long)]
        tag: Option<String>,
        /// Listing order.
        #[arg(long, value_enum, default_value_t = SortChoice::DateDesc)]
        sort: SortChoice,
    },
    /// Search posts by content or tags.
    Search {
        /// Substring to search for.
        #[arg(long)]
        query: String,
        /// Keep only posts with this theme.
        #[arg(long)]
        theme: Option<Theme>,
        /// Keep only posts whose tags contain this substring.
        #[arg(long)]
        tag: Option<String>,
        /// Listing order.
        #[arg(long, value_enum, default_value_t = SortChoice::DateDesc)]
        sort: SortChoice,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortChoice {
    DateDesc,
    DateAsc,
    Theme,
}

impl From<SortChoice> for SortOrder {
    fn from(choice: SortChoice) -> Self {
        match choice {
            SortChoice::DateDesc => SortOrder::DateDesc,
            SortChoice::DateAsc => SortOrder::DateAsc,
            SortChoice::Theme => SortOrder::Theme,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Backgrounds(args) => cmd_backgrounds(args),
        Command::Fonts(args) => cmd_fonts(args),
        Command::Post(args) => cmd_post(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let catalog = AssetCatalog::scan(&args.assets_root);
    let mut compositor = Compositor::new(catalog);

    let rendered = compositor.render(&RenderRequest {
        text: args.text,
        theme: args.theme,
        font: args.font,
        background: args.background,
        color: args.color,
    })?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out_path = args.out_dir.join(&rendered.filename);
    std::fs::write(&out_path, &rendered.png)
        .with_context(|| format!("write '{}'", out_path.display()))?;

    println!("{}", out_path.display());
    Ok(())
}

fn cmd_backgrounds(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = AssetCatalog::scan(&args.assets_root);
    println!(
        "{}",
        serde_json::to_string_pretty(catalog.backgrounds_by_theme())?
    );
    Ok(())
}

fn cmd_fonts(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = AssetCatalog::scan(&args.assets_root);
    println!("{}", serde_json::to_string_pretty(&catalog.font_names())?);
    Ok(())
}

fn cmd_post(args: PostArgs) -> anyhow::Result<()> {
    let mut store = PostStore::open(&args.store)?;
    match args.cmd {
        PostCommand::Add {
            content,
            theme,
            tags,
        } => {
            let post = store.add(&content, theme, &tags)?;
            println!("{}", serde_json::to_string_pretty(post)?);
        }
        PostCommand::List { theme, tag, sort } => {
            let posts = store.list(
                PostFilter {
                    theme,
                    tag: tag.as_deref(),
                },
                sort.into(),
            );
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
        PostCommand::Search {
            query,
            theme,
            tag,
            sort,
        } => {
            let posts = store.search(
                &query,
                PostFilter {
                    theme,
                    tag: tag.as_deref(),
                },
                sort.into(),
            );
            println!("{}", serde_json::to_string_pretty(&posts)?);
        }
    }
    Ok(())
}
