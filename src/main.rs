use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use plot_valuator::pipeline::analysis;
use plot_valuator::{logging, metrics, Config, FileSource, Pipeline, RunStatus};

#[derive(Parser)]
#[command(name = "plot_valuator")]
#[command(about = "Extracts, scores and values building-plot listings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run extraction, scoring and valuation and persist the result
    Run {
        /// Listing document (JSON)
        #[arg(long)]
        input: String,
        /// Output directory (overrides config)
        #[arg(long)]
        output_dir: Option<String>,
        /// Print the Prometheus metrics snapshot after the run
        #[arg(long)]
        show_metrics: bool,
    },
    /// Run extraction only and report skipped listings
    Extract {
        #[arg(long)]
        input: String,
    },
    /// Show the best listings by deal score
    Deals {
        #[arg(long)]
        input: String,
        /// Number of listings (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Rank districts and show listings priced below their district average
    Districts {
        #[arg(long)]
        input: String,
        /// Number of best-value listings (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Show market overview, price segments and size categories
    Market {
        #[arg(long)]
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;
    metrics::init_metrics(config.pipeline.metrics_addr.as_deref());

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            show_metrics,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.pipeline.output_dir.clone());
            let pipeline = Pipeline::new(Box::new(FileSource::new(input)), config);
            let result = pipeline.run().await?;

            println!("\n📊 Pipeline Results:");
            println!("   Total listings: {}", result.total_listings);
            println!("   Valued: {}", result.extracted_count());
            println!("   Skipped: {}", result.skipped_count());
            for (rating, count) in analysis::rating_distribution(&result.records) {
                println!("   {}: {}", rating, count);
            }

            if result.status == RunStatus::NothingExtracted {
                warn!("No listings extracted; nothing persisted");
                println!("⚠️  No listings extracted");
                return Ok(());
            }

            match Pipeline::persist_to_json(&result, &output_dir) {
                Ok(path) => {
                    info!("💾 Saved results to {}", path);
                    println!("   Output file: {}", path);
                }
                Err(e) => {
                    error!("Failed to persist results: {}", e);
                    return Err(e.into());
                }
            }

            if show_metrics {
                match metrics::render() {
                    Some(snapshot) => println!("\n📈 Metrics:\n{}", snapshot),
                    None => warn!("Metrics recorder not installed"),
                }
            }
        }
        Commands::Extract { input } => {
            let pipeline = Pipeline::new(Box::new(FileSource::new(input)), config);
            let report = pipeline.extract().await?;

            println!(
                "Extracted {} of {} listings",
                report.records.len(),
                report.total_listings
            );
            for skipped in &report.skipped {
                println!("   - {} ({})", skipped.record_path, skipped.reason);
            }
        }
        Commands::Deals { input, top } => {
            let top = top.unwrap_or(config.pipeline.top_deals);
            let pipeline = Pipeline::new(Box::new(FileSource::new(input)), config);
            let result = pipeline.run().await?;

            for (rank, deal) in analysis::best_deals(&result.records, top).iter().enumerate() {
                let record = &deal.record.record;
                println!(
                    "{:>3}. {:<12} {:<24} score={:>5.1} deal={:>5.1} {}",
                    rank + 1,
                    record.id.as_deref().unwrap_or("-"),
                    record.district.as_deref().unwrap_or("-"),
                    deal.record.quality.quality_score,
                    deal.deal_score,
                    deal.record.valuation.value_rating,
                );
            }
        }
        Commands::Districts { input, top } => {
            let top = top.unwrap_or(config.pipeline.top_deals);
            let pipeline = Pipeline::new(Box::new(FileSource::new(input)), config);
            let result = pipeline.run().await?;

            println!("\n🏘️  District ranking:");
            for district in analysis::district_ranking(&result.records) {
                println!(
                    "   {:<24} n={:>3} mean={:>10} median={:>10} €/m²={:>6} agent={}",
                    district.district,
                    district.count,
                    whole(district.mean_price),
                    whole(district.median_price),
                    whole(district.mean_price_per_area),
                    whole(district.mean_agent_rating),
                );
            }

            println!("\n💡 Best value within district:");
            for (rank, value) in analysis::best_value_properties(&result.records, top)
                .iter()
                .enumerate()
            {
                let record = &value.record.record;
                println!(
                    "{:>3}. {:<12} {:<24} €/m²={:>6} district €/m²={:>6.0} value={:>5.1}%",
                    rank + 1,
                    record.id.as_deref().unwrap_or("-"),
                    value.district,
                    whole(record.price_per_area),
                    value.district_avg_price_per_area,
                    value.value_score,
                );
            }
        }
        Commands::Market { input } => {
            let pipeline = Pipeline::new(Box::new(FileSource::new(input)), config);
            let result = pipeline.run().await?;

            let overview = analysis::market_overview(&result.records);
            println!("\n📊 Market overview:");
            println!("   Listings: {}", overview.total_listings);
            println!("   Districts: {}", overview.district_count);
            println!("   Mean price: {}", whole(overview.mean_price));
            println!("   Median price: {}", whole(overview.median_price));
            println!(
                "   Price range: {} - {}",
                whole(overview.min_price),
                whole(overview.max_price)
            );
            println!("   Mean plot area: {} m²", whole(overview.mean_area));
            println!("   Mean price/m²: {}", whole(overview.mean_price_per_area));

            println!("\n💶 Price segments:");
            for segment in analysis::price_segments(&result.records) {
                println!(
                    "   {:<12} n={:>3} area={:>6} €/m²={:>6} top district={}",
                    segment.segment.to_string(),
                    segment.count,
                    whole(segment.mean_area),
                    whole(segment.mean_price_per_area),
                    segment.most_common_district.as_deref().unwrap_or("-"),
                );
            }

            println!("\n📐 Size categories:");
            for category in analysis::size_categories(&result.records) {
                println!(
                    "   {:<22} n={:>3} price={:>10} €/m²={:>6}",
                    category.category.to_string(),
                    category.count,
                    whole(category.mean_price),
                    whole(category.mean_price_per_area),
                );
            }
        }
    }

    Ok(())
}

fn whole(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.0}", v))
}
