use clap::{Args, Parser, Subcommand};
use media_gallery::config::{self, GalleryConfig};
use media_gallery::gallery::Gallery;
use media_gallery::imaging::RustBackend;
use media_gallery::render::ItemRenderer;
use media_gallery::{output, server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-gallery")]
#[command(about = "Browse a directory of photos and videos over HTTP")]
#[command(long_about = "\
Browse a directory of photos and videos over HTTP

Every directory that holds images or videos becomes one page. Pages are
listed newest first by the most recent modification time of their files.
Thumbnails are generated on demand and cached in a SQLite database, keyed
by file path and invalidated when a file's modification time changes.

The directory tree is rescanned on every request: new, changed and deleted
files show up on the next page load without a restart.

Run 'media-gallery gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command that touches a gallery.
#[derive(Args, Clone)]
struct GalleryArgs {
    /// Directory tree to serve
    #[arg(short = 'r', long)]
    root_dir: PathBuf,

    /// SQLite database holding cached thumbnails (created if missing)
    #[arg(short = 'd', long)]
    db_path: PathBuf,

    /// Config file layered over the stock defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the gallery and serve it over HTTP
    Serve {
        #[command(flatten)]
        gallery: GalleryArgs,

        /// Address to listen on [default: 127.0.0.1]
        #[arg(short = 'l', long)]
        listen_addr: Option<String>,

        /// Port to listen on [default: 3000]
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Scan once, warm the thumbnail cache and list the pages found
    Scan {
        #[command(flatten)]
        gallery: GalleryArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve {
            gallery: args,
            listen_addr,
            port,
        } => {
            let config = config::load_config(args.config.as_deref())?
                .with_overrides(listen_addr, port)?;
            let gallery = open_gallery(&args, &config)?;

            let (index, stats) = gallery.refresh()?;
            tracing::info!(
                pages = index.page_count(),
                items = index.item_count(),
                cache = %stats,
                "initial scan complete"
            );
            tracing::info!(root = %gallery.root().display(), "root dir");
            tracing::info!(db = %gallery.db_path().display(), "database");

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(
                Arc::new(gallery),
                &config.server.listen_addr,
                config.server.port,
            ))?;
        }
        Command::Scan { gallery: args } => {
            let config = config::load_config(args.config.as_deref())?;
            let gallery = open_gallery(&args, &config)?;
            let (index, stats) = gallery.refresh()?;
            output::print_scan_output(&index, &stats);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn open_gallery(
    args: &GalleryArgs,
    config: &GalleryConfig,
) -> Result<Gallery, Box<dyn std::error::Error>> {
    let renderer = ItemRenderer::new(
        Arc::new(RustBackend::new()),
        config.thumbnails.to_thumbnail_config(),
    );
    Ok(Gallery::open(
        &args.root_dir,
        &args.db_path,
        config.cache.busy_timeout(),
        renderer,
    )?)
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
