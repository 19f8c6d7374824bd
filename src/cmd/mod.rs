pub mod item;
pub mod sort;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use itemdex::{
   config::Config,
   normalize::AliasTable,
   search::ItemSearch,
   store::{ItemStore, MemoryStore},
};

#[derive(Debug, Clone, Copy)]
pub struct Output {
   pub json:  bool,
   pub plain: bool,
}

/// Loads the configured catalog and indexes it.
pub async fn load_engine(config: &Config, output: Output) -> Result<ItemSearch> {
   let path = config
      .catalog_path()
      .context("no catalog configured and no home directory to look in")?;

   let spinner = (!output.json && !output.plain).then(|| {
      let spinner = ProgressBar::new_spinner();
      spinner.set_style(
         ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
      );
      spinner.enable_steady_tick(Duration::from_millis(100));
      spinner.set_message(format!("Loading {}...", path.display()));
      spinner
   });

   let store = MemoryStore::load(&path)
      .with_context(|| format!("failed to load catalog {}", path.display()))?;
   let store: Arc<dyn ItemStore> = Arc::new(store);

   if let Some(spinner) = &spinner {
      spinner.set_message("Indexing item names...");
   }
   let search = ItemSearch::bootstrap(store, Arc::new(AliasTable::builtin()))
      .await
      .context("failed to index catalog")?
      .with_limit(config.lookup.limit);

   if let Some(spinner) = spinner {
      spinner.finish_and_clear();
   }
   Ok(search)
}
