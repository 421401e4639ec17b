//! Vitrine CLI - Drive the product page and cart from a terminal.
//!
//! Each invocation is one visit to the page. State lives in the storage file
//! (`VITRINE_STORAGE_FILE`), so selections, the shipping address and the cart
//! carry over between invocations until they expire.
//!
//! # Usage
//!
//! ```bash
//! # Show the product page
//! vitrine product
//!
//! # Choose a variant and quantity
//! vitrine color Azul
//! vitrine size G
//! vitrine quantity 2
//!
//! # Resolve a postal code, then add to the cart
//! vitrine shipping 01310-930
//! vitrine add
//!
//! # Inspect and edit the cart
//! vitrine cart
//! vitrine remove <item-id>
//! vitrine clear
//! ```
//!
//! # Commands
//!
//! - `product`, `color`, `size`, `quantity`, `image` - Product page and selection
//! - `shipping` - Postal-code lookup
//! - `add`, `cart`, `remove`, `clear`, `badge` - Cart widgets
//! - `demo` - Two pages sharing one storage area

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine product page and cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the product, the current selection and the shipping address
    Product,
    /// Choose a color by id or name
    Color {
        /// Color id (`color-1`) or name (`Preto`)
        value: String,
    },
    /// Choose a size by id or name
    Size {
        /// Size id (`size-3`) or name (`M`)
        value: String,
    },
    /// Set the quantity
    Quantity {
        /// A number from 1 to 10, `inc` or `dec`
        value: String,
    },
    /// Show a gallery image of the selected color
    Image {
        /// Position in the color's gallery, starting at 0
        index: usize,
    },
    /// Resolve a postal code and store the shipping address
    Shipping {
        /// Postal code (`01310-930` or `01310930`); omit to show the stored one
        postal_code: Option<String>,

        /// Forget the stored address
        #[arg(long, conflicts_with = "postal_code")]
        clear: bool,
    },
    /// Add the current selection to the cart
    Add,
    /// List the cart
    Cart,
    /// Remove a cart item
    Remove {
        /// Item id as shown by `vitrine cart`
        item_id: String,
    },
    /// Empty the cart
    Clear,
    /// Show the header badge count
    Badge,
    /// Run two pages over one shared storage area and watch them sync
    Demo,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_storefront=info,vitrine_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        e.report();
        tracing::error!("Command failed: {e}");
        commands::say(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::from_config(config)?;

    match cli.command {
        Commands::Product => commands::product::show(&state),
        Commands::Color { value } => commands::product::color(&state, &value)?,
        Commands::Size { value } => commands::product::size(&state, &value)?,
        Commands::Quantity { value } => commands::product::quantity(&state, &value)?,
        Commands::Image { index } => commands::product::image(&state, index)?,
        Commands::Shipping { postal_code, clear } => {
            commands::shipping::run(&state, postal_code.as_deref(), clear).await?;
        }
        Commands::Add => commands::cart::add(&state).await?,
        Commands::Cart => commands::cart::list(&state).await,
        Commands::Remove { item_id } => commands::cart::remove(&state, &item_id).await?,
        Commands::Clear => commands::cart::clear(&state).await,
        Commands::Badge => commands::cart::badge(&state).await,
        Commands::Demo => commands::demo::run(state.config().clone()).await,
    }
    Ok(())
}
