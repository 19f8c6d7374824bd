use std::{collections::BTreeSet, path::Path};

use parking_lot::RwLock;
use rayon::prelude::*;

use super::{CmpOp, Field, Filter, ItemStore, Value};
use crate::{
   error::{Error, Result},
   types::{ItemRecord, Scored},
};

/// Borrowed view of a record attribute, compared against a [`Value`].
#[derive(Debug, Clone, Copy)]
enum FieldRef<'a> {
   Str(&'a str),
   Num(f64),
}

impl FieldRef<'_> {
   fn compare(self, op: CmpOp, value: &Value) -> bool {
      match (self, value) {
         (Self::Str(lhs), Value::Str(rhs)) => op.holds(&lhs, &rhs.as_str()),
         (Self::Num(lhs), Value::Num(rhs)) => op.holds(&lhs, rhs),
         _ => false,
      }
   }
}

fn field(record: &ItemRecord, field: Field) -> FieldRef<'_> {
   match field {
      Field::Name => FieldRef::Str(&record.name),
      Field::Category => FieldRef::Str(record.category.as_str()),
      Field::Type => FieldRef::Str(&record.item_type),
      Field::Level => FieldRef::Num(f64::from(record.level)),
   }
}

/// Relevance of `phrases` against `name`: each query word found among the
/// name's words adds `freq * (0.5 + 0.5 * freq / name_words)`. Returns `None`
/// unless every query word is present.
fn text_score(phrases: &[String], name: &str) -> Option<f64> {
   let name_words: Vec<&str> = name.split(' ').filter(|w| !w.is_empty()).collect();
   if name_words.is_empty() {
      return None;
   }
   let total = name_words.len() as f64;

   let mut score = 0.0;
   let mut any = false;
   for word in phrases.iter().flat_map(|p| p.split(' ')).filter(|w| !w.is_empty()) {
      let freq = name_words.iter().filter(|w| **w == word).count() as f64;
      if freq == 0.0 {
         return None;
      }
      any = true;
      score += freq * 0.5f64.mul_add(freq / total, 0.5);
   }
   any.then_some(score)
}

/// Evaluates `filter` against one record. `Some(score)` means it matched.
fn evaluate(filter: &Filter, record: &ItemRecord) -> Option<f64> {
   match filter {
      Filter::All => Some(0.0),
      Filter::Eq(f, value) => field(record, *f).compare(CmpOp::Eq, value).then_some(0.0),
      Filter::Cmp(f, op, value) => field(record, *f).compare(*op, value).then_some(0.0),
      Filter::In(f, values) => {
         let current = field(record, *f);
         values.iter().any(|v| current.compare(CmpOp::Eq, v)).then_some(0.0)
      },
      Filter::Text { phrases } => text_score(phrases, &record.name),
      Filter::Regex(f, re) => match field(record, *f) {
         FieldRef::Str(s) => re.is_match(s).then_some(0.0),
         FieldRef::Num(n) => re.is_match(&n.to_string()).then_some(0.0),
      },
      Filter::EveryTagGroup(tags) => record
         .every_tag_group(|g| tags.iter().all(|t| g.contains(t)))
         .then_some(0.0),
      Filter::And(filters) => filters.iter().try_fold(0.0, |acc, f| Some(acc + evaluate(f, record)?)),
      Filter::Or(filters) => filters
         .iter()
         .filter_map(|f| evaluate(f, record))
         .reduce(f64::max),
      Filter::Not(inner) => evaluate(inner, record).is_none().then_some(0.0),
   }
}

/// In-process store over a catalog loaded into memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
   records: RwLock<Vec<ItemRecord>>,
}

impl MemoryStore {
   pub fn from_records(records: Vec<ItemRecord>) -> Result<Self> {
      for record in &records {
         record.validate()?;
      }
      Ok(Self { records: RwLock::new(records) })
   }

   /// Reads a JSON array of item records.
   pub fn load(path: &Path) -> Result<Self> {
      let data = std::fs::read(path)
         .map_err(|source| Error::Catalog { path: path.to_path_buf(), source })?;
      let records: Vec<ItemRecord> = serde_json::from_slice(&data)?;
      tracing::info!(path = %path.display(), records = records.len(), "loaded catalog");
      Self::from_records(records)
   }
}

#[async_trait::async_trait]
impl ItemStore for MemoryStore {
   async fn find(&self, filter: &Filter) -> Result<Vec<Scored<ItemRecord>>> {
      let records = self.records.read();
      // Collecting a parallel iterator keeps input order.
      let matched: Vec<_> = records
         .par_iter()
         .filter_map(|r| evaluate(filter, r).map(|score| Scored::new(r.clone(), score)))
         .collect();
      tracing::debug!(scanned = records.len(), matched = matched.len(), "memory store query");
      Ok(matched)
   }

   async fn distinct_names(&self) -> Result<Vec<String>> {
      let records = self.records.read();
      let names: BTreeSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
      Ok(names.into_iter().map(str::to_string).collect())
   }

   async fn count(&self) -> Result<usize> {
      Ok(self.records.read().len())
   }
}
