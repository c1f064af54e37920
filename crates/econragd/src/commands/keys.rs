//! Module for listing the response cache.

use econrag::key::FetchRequest;

use super::*;

/// Function for the [`Commands::Keys`] in the CLI.
pub async fn keys(config: &Config) -> Result<()> {
  let cache = SqliteCache::open(config.cache_path()).await?;
  let keys = cache.keys().await?;

  for key in &keys {
    println!("{} {}", style(ITEM_PREFIX).dim(), key);
    match FetchRequest::from_key(key) {
      Ok(request) => {
        for (name, value) in request.params() {
          println!("   {} = {}", style(name).cyan(), value);
        }
      },
      Err(e) => println!("   {} {}", style(WARNING_PREFIX).yellow(), e),
    }
  }

  println!("{} {} cached pages", style(INFO_PREFIX).blue(), keys.len());
  Ok(())
}
