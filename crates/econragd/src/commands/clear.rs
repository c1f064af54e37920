//! Module for clearing the response cache.

use super::*;

/// Function for the [`Commands::Clear`] in the CLI.
pub async fn clear(config: &Config, accept_defaults: bool) -> Result<()> {
  let path = config.cache_path();
  if !path.exists() {
    println!(
      "{} No cache found at: {}",
      style(WARNING_PREFIX).yellow(),
      style(path.display()).yellow()
    );
    return Ok(());
  }

  let cache = SqliteCache::open(&path).await?;
  let count = cache.len().await?;
  println!(
    "{} Cache at {} holds {} pages",
    style(WARNING_PREFIX).yellow(),
    style(path.display()).yellow(),
    count
  );

  if !accept_defaults
    && !dialoguer::Confirm::new()
      .with_prompt("Are you sure you want to clear the cache? Cleared pages must be fetched again.")
      .default(false)
      .wait_for_newline(true)
      .interact()?
  {
    println!("{} Operation cancelled", style(ERROR_PREFIX).red());
    return Ok(());
  }

  cache.clear().await?;
  println!("{} Cache cleared", style(SUCCESS_PREFIX).green());
  Ok(())
}
