//! `taskboard` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`: start the API server.
//! - `migrate`: run pending database migrations.
//! - `board`: print a board's lists and cards in order.
//! - `reorder`: dry-run a drag against a board snapshot JSON file.

mod logger;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use db::SqlPositionStore;
use engine::{BoardSnapshot, DragEnd, DropLocation, ItemKind, PositionBase, PositionStore, reorder};
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard", about = "Multi-tenant Kanban board service", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://taskboard.db", global = true)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "TASKBOARD_BIND", default_value = "0.0.0.0:8080")]
        bind: String,

        #[arg(long, env = "TASKBOARD_MAX_CONNECTIONS", default_value_t = 10)]
        max_connections: u32,

        /// Position given to the first list or card of an empty container.
        #[arg(long, default_value_t = 1)]
        position_base: i32,
    },
    /// Run pending database migrations.
    Migrate,
    /// Print a board's lists and cards in position order.
    Board {
        board_id: Uuid,
    },
    /// Apply a drag to a board snapshot file and print the resulting updates.
    Reorder {
        /// Path to a board snapshot JSON file (as served by `GET /api/boards/{id}/lists`).
        path: PathBuf,

        #[arg(long, value_enum)]
        kind: Kind,

        /// Source container: the board for lists, a list for cards.
        #[arg(long)]
        source: Option<Uuid>,

        /// Source index.
        #[arg(long)]
        from: usize,

        /// Destination container.  Defaults to the source container.
        #[arg(long)]
        dest: Option<Uuid>,

        /// Destination index.
        #[arg(long)]
        to: usize,

        #[arg(long, default_value_t = 1)]
        base: i32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    List,
    Card,
}

impl From<Kind> for ItemKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::List => ItemKind::List,
            Kind::Card => ItemKind::Card,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match cli.command {
        Command::Serve { bind, max_connections, position_base } => {
            let pool = db::pool::create_pool(&cli.database_url, max_connections)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;

            let config = api::ServerConfig {
                bind,
                position_base: PositionBase::new(position_base),
            };
            api::serve(config, pool).await.context("server error")?;
        }
        Command::Migrate => {
            info!("Running migrations against {}", cli.database_url);
            let pool = db::pool::create_pool(&cli.database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::run_migrations(&pool).await.context("migration failed")?;
            info!("Migrations applied successfully");
        }
        Command::Board { board_id } => {
            let pool = db::pool::create_pool(&cli.database_url, 2)
                .await
                .context("failed to connect to database")?;
            let store = SqlPositionStore::new(pool);
            let snapshot = store.get_lists_with_cards(board_id).await?;
            print_board(&snapshot);
        }
        Command::Reorder { path, kind, source, from, dest, to, base } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read file {}", path.display()))?;
            let snapshot: BoardSnapshot =
                serde_json::from_str(&content).context("invalid board snapshot JSON")?;

            let board_id = snapshot.board.id;
            let source = match (kind, source) {
                (_, Some(id)) => id,
                (Kind::List, None) => board_id,
                (Kind::Card, None) => bail!("--source <LIST_ID> is required for card moves"),
            };
            let drag = DragEnd {
                kind: kind.into(),
                source: DropLocation { container_id: source, index: from },
                destination: Some(DropLocation { container_id: dest.unwrap_or(source), index: to }),
            };

            let outcome = reorder(board_id, &snapshot.lists, &drag, PositionBase::new(base))?;
            println!("{}", serde_json::to_string_pretty(&outcome.updates)?);
        }
    }

    Ok(())
}

fn print_board(snapshot: &BoardSnapshot) {
    println!("{} (version {})", snapshot.board.title, snapshot.board.version);
    for entry in &snapshot.lists {
        println!("  [{}] {}", entry.list.position, entry.list.title);
        for card in &entry.cards {
            println!("      [{}] {}", card.position, card.title);
        }
    }
}
