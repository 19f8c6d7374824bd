//! Candidate retrieval: turns a normalized query plus structured hints into a
//! store [`Filter`] and fetches scored records.

use std::{
   collections::HashMap,
   sync::{Arc, LazyLock},
};

use regex::{Regex, RegexBuilder};

use crate::{
   Result,
   error::Error,
   expr::SortExpression,
   index::SearchIndex,
   normalize::NormalizedQuery,
   store::{CmpOp, Field, Filter, ItemStore, Value},
   types::{Category, ItemRecord, Scored},
};

static ROMAN_NUMERAL: LazyLock<Regex> = LazyLock::new(|| {
   RegexBuilder::new(r"^(?:x{0,3})(?:ix|iv|v?i{0,3})$")
      .case_insensitive(true)
      .build()
      .expect("roman numeral pattern is valid")
});

/// Level constraint parsed from a command, e.g. `<= 50`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFilter {
   pub op:    CmpOp,
   pub value: f64,
}

/// Structured constraints that accompany a free-text query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredHints {
   pub category: Option<Category>,
   pub types:    Vec<String>,
   pub level:    Option<LevelFilter>,
}

impl StructuredHints {
   pub fn to_filter(&self) -> Filter {
      let mut filters = Vec::new();
      if let Some(category) = self.category {
         filters.push(Filter::Eq(Field::Category, category.as_str().into()));
      }
      match self.types.as_slice() {
         [] => {},
         [single] => filters.push(Filter::Eq(Field::Type, single.as_str().into())),
         many => filters.push(Filter::In(
            Field::Type,
            many.iter().map(|t| Value::from(t.as_str())).collect(),
         )),
      }
      if let Some(level) = self.level {
         filters.push(Filter::Cmp(Field::Level, level.op, level.value.into()));
      }
      Filter::and(filters)
   }
}

/// Expands one query word into index clauses: synonyms for a few weapon
/// words, otherwise a fuzziness scaled to the word length.
pub fn expand_word(word: &str) -> String {
   match word {
      "blade" => "blade sword dagger knife".to_string(),
      "dagger" | "knife" => "dagger knife blade".to_string(),
      "sword" => "blade sword".to_string(),
      "staff" => "staff stave".to_string(),
      _ => {
         let len = word.chars().count();
         if len <= 2 {
            word.to_string()
         } else if len == 3 {
            format!("{word}~1")
         } else if len <= 5 {
            format!("+{word}~1")
         } else {
            let mut chars = word.chars();
            let first = chars.next().unwrap_or_default();
            format!("+{first}^{}~2", chars.as_str())
         }
      },
   }
}

pub fn expand_fuzzy_query(query: &NormalizedQuery) -> String {
   query
      .words()
      .filter(|w| !w.is_empty())
      .map(expand_word)
      .collect::<Vec<_>>()
      .join(" ")
}

/// Compiled size cap for patterns built from query text.
const NAME_PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Pattern tolerating dropped or inserted spaces after the third character,
/// anchored to a word edge. `"frost scythe"` also matches `"frostscythe"`.
/// Overlong queries fail with [`Error::Pattern`].
pub fn spaced_name_regex(phrase: &str) -> Result<Regex> {
   let compact: Vec<char> = phrase.chars().filter(|c| *c != ' ').collect();
   let split = compact.len().min(3);
   let mut pattern: String = regex::escape(&compact[..split].iter().collect::<String>());
   for c in &compact[split..] {
      pattern.push_str(" ?");
      pattern.push_str(&regex::escape(&c.to_string()));
   }

   RegexBuilder::new(&format!("(?:^{pattern})|(?:{pattern}$)|(?: {pattern})|(?:{pattern} )"))
      .case_insensitive(true)
      .size_limit(NAME_PATTERN_SIZE_LIMIT)
      .build()
      .map_err(Error::from)
}

/// If one of the last two query words is a roman numeral, requires it as a
/// standalone word in the name so `"blade ii"` does not match `"blade iii"`.
pub fn roman_numeral_filter(query: &NormalizedQuery) -> Result<Option<Filter>> {
   let words: Vec<&str> = query.words().filter(|w| !w.is_empty()).collect();
   let Some(numeral) = words.iter().rev().take(2).find(|w| ROMAN_NUMERAL.is_match(w)) else {
      return Ok(None);
   };

   let escaped = regex::escape(numeral);
   let re = RegexBuilder::new(&format!("(?: {escaped} )|(?: {escaped}$)"))
      .case_insensitive(true)
      .build()?;
   Ok(Some(Filter::Regex(Field::Name, re)))
}

pub struct Retriever {
   store: Arc<dyn ItemStore>,
   index: Arc<SearchIndex>,
}

impl Retriever {
   pub fn new(store: Arc<dyn ItemStore>, index: Arc<SearchIndex>) -> Self {
      Self { store, index }
   }

   /// Fetches candidates for `query`. Each candidate carries its relevance:
   /// the store's text score, or the index score when `fuzzy` is set.
   pub async fn resolve(
      &self,
      query: &NormalizedQuery,
      hints: &StructuredHints,
      fuzzy: bool,
   ) -> Result<Vec<Scored<ItemRecord>>> {
      if query.is_empty() {
         return Ok(Vec::new());
      }
      if fuzzy { self.resolve_fuzzy(query, hints).await } else { self.resolve_exact(query, hints).await }
   }

   async fn resolve_exact(
      &self,
      query: &NormalizedQuery,
      hints: &StructuredHints,
   ) -> Result<Vec<Scored<ItemRecord>>> {
      let text = Filter::Text { phrases: query.tokens.clone() };
      let name = if query.phrase.chars().count() >= 3 {
         Filter::or(vec![text, Filter::Regex(Field::Name, spaced_name_regex(&query.phrase)?)])
      } else {
         text
      };

      let mut filters = vec![hints.to_filter(), name];
      filters.extend(roman_numeral_filter(query)?);

      let found = self.store.find(&Filter::and(filters)).await?;
      tracing::debug!(query = %query.phrase, candidates = found.len(), "exact retrieval");
      Ok(found)
   }

   async fn resolve_fuzzy(
      &self,
      query: &NormalizedQuery,
      hints: &StructuredHints,
   ) -> Result<Vec<Scored<ItemRecord>>> {
      let expanded = expand_fuzzy_query(query);
      let matches = self.index.query(&expanded)?;
      if matches.is_empty() {
         tracing::debug!(query = %expanded, "fuzzy retrieval found nothing");
         return Ok(Vec::new());
      }

      let relevance: HashMap<String, f64> =
         matches.into_iter().map(|m| (m.item, m.score)).collect();
      let names = relevance.keys().map(|n| Value::from(n.as_str())).collect();

      let mut filters = vec![hints.to_filter(), Filter::In(Field::Name, names)];
      filters.extend(roman_numeral_filter(query)?);

      let found = self
         .store
         .find(&Filter::and(filters))
         .await?
         .into_iter()
         .map(|c| {
            let score = relevance.get(&c.item.name).copied().unwrap_or_default();
            Scored::new(c.item, score)
         })
         .collect::<Vec<_>>();
      tracing::debug!(query = %expanded, candidates = found.len(), "fuzzy retrieval");
      Ok(found)
   }

   /// Scores every record matching `filter` with `expression`.
   pub async fn score_all(
      &self,
      filter: &Filter,
      expression: &SortExpression,
   ) -> Result<Vec<Scored<ItemRecord>>> {
      let records = self.store.find(filter).await?;
      Ok(records
         .into_iter()
         .map(|c| {
            let score = expression.evaluate(&c.item);
            Scored::new(c.item, score)
         })
         .collect())
   }
}
