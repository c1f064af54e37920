//! Module for the "harvest" stage.

use chrono::Local;
use econrag::harvest::{yearly_ranges, CrossrefClient, Harvester};

use super::*;

/// Options for the harvest stage
#[derive(Args, Clone)]
pub struct HarvestOptions {
  /// First publication year to harvest (defaults to the configured year)
  #[arg(long)]
  pub start_year: Option<i32>,

  /// Items requested per page (defaults to the configured size)
  #[arg(long)]
  pub page_size: Option<usize>,
}

/// Function for the [`Commands::Harvest`] in the CLI.
pub async fn harvest(config: &Config, options: HarvestOptions) -> Result<()> {
  let email = config.contact_email()?;
  let registry = config.registry()?;
  let cache = SqliteCache::open(config.cache_path()).await?;
  let client = CrossrefClient::new(&config.crossref_url, email)?;
  let harvester =
    Harvester::new(client, cache).with_page_size(options.page_size.unwrap_or(config.page_size));

  let ranges =
    yearly_ranges(options.start_year.unwrap_or(config.start_year), Local::now().date_naive());
  println!(
    "{} Harvesting {} journals over {} years into {}",
    style(WORKING_PREFIX).cyan(),
    registry.len(),
    ranges.len(),
    style(config.cache_path().display()).yellow()
  );

  let report = harvester.run(&registry, &ranges).await;

  for combination in &report.empty {
    println!("{} No items for {}", style(INFO_PREFIX).blue(), combination);
  }
  for (combination, error) in &report.failures {
    println!("{} {} failed: {}", style(WARNING_PREFIX).yellow(), combination, error);
  }

  println!(
    "{} {} items from {} combinations, {} failed, {} pages cached",
    style(SUCCESS_PREFIX).green(),
    report.items,
    report.completed,
    report.failures.len(),
    harvester.cache().len().await?
  );
  Ok(())
}
