//! wintery command line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "wintery")]
#[command(version)]
#[command(about = "Markdown blog generator with category filters", long_about = None)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Verbose log output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up a fresh blog with a sample post
    Init {
        /// Where to create it
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Draft a new post or page under source/
    New {
        /// Post title
        title: String,

        /// Category label; repeat the flag for several
        #[arg(long)]
        category: Vec<String>,

        /// Create a standalone page instead of a post
        #[arg(long)]
        page: bool,

        /// Output filename, without the .md extension
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Build the site into the public directory
    #[command(alias = "g")]
    Generate {
        /// Rebuild whenever a source file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Preview the site locally with live rebuild
    #[command(alias = "s")]
    Server {
        /// TCP port for the preview server
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Interface to bind
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open the browser once the server is up
        #[arg(short, long)]
        open: bool,

        /// Serve what is on disk without watching for changes
        #[arg(long)]
        r#static: bool,
    },

    /// Delete the public directory
    Clean,

    /// Print posts, pages or categories
    List {
        /// One of: post, page, category
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Print the version
    Version,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "wintery=debug,info"
    } else {
        "wintery=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            wintery::commands::init::init_site(&target)?;
            println!("New blog created at {}", target.display());
        }

        Commands::New {
            title,
            category,
            page,
            path,
        } => {
            let app = wintery::Wintery::new(&base_dir)?;
            wintery::commands::new::create(&app, &title, &category, page, path.as_deref())?;
        }

        Commands::Generate { watch } => {
            let app = wintery::Wintery::new(&base_dir)?;
            wintery::commands::generate::run(&app)?;
            if watch {
                wintery::commands::generate::watch(&app).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let app = wintery::Wintery::new(&base_dir)?;
            // Serve from a fresh build
            app.generate()?;
            wintery::server::start(&app, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let app = wintery::Wintery::new(&base_dir)?;
            app.clean()?;
        }

        Commands::List { r#type } => {
            let app = wintery::Wintery::new(&base_dir)?;
            wintery::commands::list::run(&app, &r#type)?;
        }

        Commands::Version => {
            println!("wintery {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
