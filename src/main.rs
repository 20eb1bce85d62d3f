use clap::Parser;
use menufy::core::export::Block;
use menufy::core::presentation::{
    display_availability, display_price, dish_type_options, public_menu_url, star_rating,
    ProductFilter,
};
use menufy::utils::error::ErrorSeverity;
use menufy::utils::logger;
use menufy::{
    AggregateResult, CatalogAggregator, CatalogError, CliConfig, Command, HttpCatalogClient,
    ImageResolver, LocalStorage, Result, SnapshotExporter, TomlConfig,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if config.logging.json {
        logger::init_json_logger(config.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, config.logging.level.as_deref());
    }

    tracing::info!("Starting menufy against {}", config.backend.base_url);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: &TomlConfig) -> Result<()> {
    let client = HttpCatalogClient::new(&config.backend.base_url, config.request_timeout())?;

    match command {
        Command::Menus => {
            let menus = CatalogAggregator::new(client).list_menus().await?;
            if menus.is_empty() {
                println!("No menus available");
            }
            for menu in menus {
                println!("{}  {}  {}", menu.id, menu.name, star_rating(menu.rating));
            }
        }
        Command::Products { dish_type, search } => {
            let products = CatalogAggregator::new(client).list_products().await?;
            let filter = ProductFilter { dish_type, search };
            let matching = filter.apply(&products);

            println!("Dish types: {}", dish_type_options(&products).join(", "));
            if matching.is_empty() {
                println!("No products found");
            }
            for product in matching {
                println!(
                    "{}  {}  {}  {}",
                    product.id,
                    product.name,
                    display_price(product.price),
                    display_availability(product)
                );
            }
        }
        Command::Menu { menu_id } => {
            let outcome = CatalogAggregator::new(client)
                .aggregate(menu_id.as_deref())
                .await;
            let state = AggregateResult::from_outcome(&outcome);
            println!("{}", serde_json::to_string_pretty(&state)?);
            outcome?;
        }
        Command::Export {
            menu_id,
            category,
            yes,
            ..
        } => {
            let exporter =
                SnapshotExporter::new(client.clone(), ImageResolver::new(config.media_origin()));
            let tree = CatalogAggregator::new(client)
                .aggregate(menu_id.as_deref())
                .await?;

            let snapshot = match category.as_deref() {
                Some(category_id) => {
                    let node = tree.category(category_id).ok_or_else(|| {
                        CatalogError::PreconditionMissing {
                            field: format!("category {} in menu {}", category_id, tree.menu.id),
                        }
                    })?;
                    exporter.preview_category(&tree.menu.id, node)
                }
                None => exporter.preview_tree(&tree),
            };

            println!("Preview of {}:", snapshot.file_name());
            for block in snapshot.blocks() {
                match block {
                    Block::Title(text) => println!("# {}", text),
                    Block::Heading(text) => println!("## {}", text),
                    Block::Paragraph(text) => println!("   {}", text),
                    Block::Image { reference, .. } => println!("   [image {}]", reference),
                }
            }

            if !yes {
                println!("Run again with --yes to write {}", snapshot.file_name());
                return Ok(());
            }

            let document = exporter.confirm(&snapshot).await;
            let storage = LocalStorage::new(config.export.output_path.clone());
            let path = exporter.save(&document, &storage).await?;

            println!("✅ Export written: {} ({} pages)", path, document.page_count);
            for note in &document.placeholders {
                println!("⚠️ Placeholder for {}: {}", note.reference, note.reason);
            }
        }
        Command::Link { menu_id } => {
            let url = public_menu_url(&config.frontend.public_base_url, menu_id.as_deref())?;
            println!("{}", url);
        }
    }

    Ok(())
}
