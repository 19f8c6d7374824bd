pub mod ranking;

use std::sync::Arc;

use crate::{
   config::DEFAULT_LOOKUP_LIMIT,
   error::Result,
   expr::SortExpression,
   index::SearchIndex,
   listing::{self, Listing, ListingOptions},
   normalize::AliasTable,
   retrieve::{Retriever, StructuredHints},
   store::{Filter, ItemStore},
   types::ItemRecord,
};

/// Best hit for a lookup plus the runners-up shown as similar results.
#[derive(Debug, Clone)]
pub struct Lookup {
   pub item:    ItemRecord,
   pub similar: Vec<ItemRecord>,
   /// Whether the hit came from the fuzzy index rather than exact retrieval.
   pub fuzzy:   bool,
}

pub struct ItemSearch {
   retriever: Retriever,
   aliases:   Arc<AliasTable>,
   limit:     usize,
}

impl ItemSearch {
   pub fn new(store: Arc<dyn ItemStore>, index: Arc<SearchIndex>, aliases: Arc<AliasTable>) -> Self {
      Self { retriever: Retriever::new(store, index), aliases, limit: DEFAULT_LOOKUP_LIMIT }
   }

   /// Indexes every distinct name currently in `store`.
   pub async fn bootstrap(store: Arc<dyn ItemStore>, aliases: Arc<AliasTable>) -> Result<Self> {
      let records = store.count().await?;
      let names = store.distinct_names().await?;
      let index = SearchIndex::build(names)?;
      tracing::info!(records, names = index.len(), "search engine ready");
      Ok(Self::new(store, Arc::new(index), aliases))
   }

   pub const fn with_limit(mut self, limit: usize) -> Self {
      self.limit = limit;
      self
   }

   /// Looks up `name`, falling back to fuzzy retrieval when exact retrieval
   /// yields nothing. `None` means nothing matched either way.
   pub async fn lookup(&self, name: &str, hints: &StructuredHints) -> Result<Option<Lookup>> {
      let query = self.aliases.normalize(name);

      for fuzzy in [false, true] {
         let candidates = self.retriever.resolve(&query, hints, fuzzy).await?;
         let mut ranked = ranking::rank(candidates, &query, self.limit).into_iter();
         if let Some(best) = ranked.next() {
            tracing::info!(
               query = %query.phrase,
               item = %best.record.title,
               fuzzy,
               "lookup resolved"
            );
            return Ok(Some(Lookup {
               item: best.record,
               similar: ranked.map(|r| r.record).collect(),
               fuzzy,
            }));
         }
      }

      tracing::info!(query = %query.phrase, "lookup found nothing");
      Ok(None)
   }

   /// Scores every record matching `hints` with `expression` and groups the
   /// result into a bounded listing.
   pub async fn sort_listing(
      &self,
      expression: &SortExpression,
      hints: &StructuredHints,
      options: &ListingOptions,
   ) -> Result<Listing> {
      let filter = Filter::and(vec![hints.to_filter(), listing::exclusions()]);
      let scored = self.retriever.score_all(&filter, expression).await?;
      let listing = listing::build(&expression.label, scored, options);
      tracing::info!(
         label = %listing.label,
         groups = listing.groups.len(),
         truncated = listing.truncated,
         "built sort listing"
      );
      Ok(listing)
   }
}
