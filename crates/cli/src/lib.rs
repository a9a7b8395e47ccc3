pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::{FilterSelection, PriceBucket, SortSelection};

use crate::commands::catalog::ProductsArgs;

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront catalog operator CLI",
    long_about = "Inspect configuration, check backend readiness, and run the catalog view, search, and suggestion logic against the configured backend.",
    after_help = "Examples:\n  storefront doctor --json\n  storefront products --filter discounts --sort price-asc\n  storefront suggest le"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and backend connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List products through the filter, price-range and sort pipeline")]
    Products {
        #[arg(long, help = "Only products in this category (case-insensitive)")]
        category: Option<String>,
        #[arg(long, default_value = "all", help = "all|discounts|in-stock|featured|bestsellers")]
        filter: FilterSelection,
        #[arg(long, help = "under-100|100-500|500-1000|over-1000")]
        price_range: Option<PriceBucket>,
        #[arg(
            long,
            default_value = "relevance",
            help = "relevance|price-asc|price-desc|name-asc|name-desc|newest|discount"
        )]
        sort: SortSelection,
        #[arg(long, help = "Maximum number of products to print")]
        limit: Option<usize>,
    },
    #[command(about = "List categories with their product counts")]
    Categories,
    #[command(about = "Full search over product titles and brands")]
    Search { text: String },
    #[command(about = "Search-box suggestions for partial input")]
    Suggest { text: String },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        logging::init(&config.logging);
    }

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Products { category, filter, price_range, sort, limit } => {
            commands::catalog::products(ProductsArgs { category, filter, price_range, sort, limit })
        }
        Command::Categories => commands::catalog::categories(),
        Command::Search { text } => commands::search::search(&text),
        Command::Suggest { text } => commands::search::suggest(&text),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
