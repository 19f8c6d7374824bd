//! Candidate ranking: availability priority, per-family collapse and the
//! final exact-match-first ordering.

use std::{cmp::Ordering, collections::HashSet};

use crate::{
   normalize::NormalizedQuery,
   types::{ItemRecord, Scored},
};

/// Availability penalty of a single tag. Temporary items rank lowest,
/// followed by rares, special offers and Dragon Coin items.
pub fn tag_priority(tag: &str) -> i32 {
   match tag {
      "temp" => -4,
      "rare" => -3,
      "so" => -2,
      "dc" => -1,
      _ => 0,
   }
}

/// Best availability over a record's tag-group options. A group's value is
/// the sum over its tags.
pub fn priority(record: &ItemRecord) -> i32 {
   record
      .tag_set
      .iter()
      .map(|group| group.tags.iter().map(|t| tag_priority(t)).sum::<i32>())
      .max()
      .unwrap_or(0)
}

/// A candidate with every sort key precomputed.
#[derive(Debug, Clone)]
pub struct RankedItem {
   pub record:         ItemRecord,
   pub relevance:      f64,
   pub priority:       i32,
   pub bonus_sum:      i64,
   /// `bonus_sum + level * relevance`.
   pub combined_score: f64,
   pub exact_match:    bool,
}

impl RankedItem {
   pub fn new(candidate: Scored<ItemRecord>, query: &NormalizedQuery) -> Self {
      let Scored { item: record, score: relevance } = candidate;
      let bonus_sum = record.bonus_sum();
      let combined_score = f64::from(record.level).mul_add(relevance, bonus_sum as f64);
      Self {
         priority: priority(&record),
         exact_match: query.matches_exactly(&record.name),
         bonus_sum,
         combined_score,
         relevance,
         record,
      }
   }

   pub fn has_relevance(&self) -> bool {
      self.relevance > 0.0
   }
}

fn desc_f64(a: f64, b: f64) -> Ordering {
   b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Orders variants within the catalog: most available, highest level, then
/// best combined score first.
pub fn sort_by_availability(items: &mut [RankedItem]) {
   items.sort_by(|a, b| {
      b.priority
         .cmp(&a.priority)
         .then_with(|| b.record.level.cmp(&a.record.level))
         .then_with(|| desc_f64(a.combined_score, b.combined_score))
   });
}

/// Keeps the first item of each family, preserving order.
pub fn collapse_families(items: Vec<RankedItem>) -> Vec<RankedItem> {
   let mut seen = HashSet::new();
   items
      .into_iter()
      .filter(|item| seen.insert(item.record.family.clone()))
      .collect()
}

/// Final order: exact name hits first, then availability, relevance presence,
/// combined score and bonus total.
pub fn sort_for_display(items: &mut [RankedItem]) {
   items.sort_by(|a, b| {
      b.exact_match
         .cmp(&a.exact_match)
         .then_with(|| b.priority.cmp(&a.priority))
         .then_with(|| b.has_relevance().cmp(&a.has_relevance()))
         .then_with(|| desc_f64(a.combined_score, b.combined_score))
         .then_with(|| b.bonus_sum.cmp(&a.bonus_sum))
   });
}

/// Full ranking pipeline, truncated to `limit` entries.
pub fn rank(
   candidates: Vec<Scored<ItemRecord>>,
   query: &NormalizedQuery,
   limit: usize,
) -> Vec<RankedItem> {
   let mut items: Vec<RankedItem> =
      candidates.into_iter().map(|c| RankedItem::new(c, query)).collect();

   sort_by_availability(&mut items);
   let mut items = collapse_families(items);
   sort_for_display(&mut items);
   items.truncate(limit);
   items
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::{
      normalize::AliasTable,
      types::fixtures::{boosts, record, tagged},
   };

   fn make_candidate(name: &str, family: &str, level: u8, relevance: f64) -> Scored<ItemRecord> {
      let mut rec = record(name, level);
      rec.family = family.to_string();
      Scored::new(rec, relevance)
   }

   fn query(text: &str) -> NormalizedQuery {
      AliasTable::builtin().normalize(text)
   }

   #[test]
   fn test_priority() {
      assert_eq!(priority(&record("blade", 1)), 0);
      assert_eq!(priority(&tagged(record("blade", 1), &[&["rare", "dc"]])), -4);
      assert_eq!(priority(&tagged(record("blade", 1), &[&["temp"], &["so"]])), -2);
      assert_eq!(priority(&tagged(record("blade", 1), &[&["se"], &["rare"]])), 0);
   }

   #[test]
   fn test_combined_score() {
      let mut candidate = make_candidate("blade of awe", "blade of awe", 20, 1.5);
      candidate.item.bonuses = boosts(&[("int", 3), ("crit", -1)]);
      let ranked = RankedItem::new(candidate, &query("awe"));
      assert_eq!(ranked.bonus_sum, 2);
      assert_eq!(ranked.combined_score, 32.0);
      assert!(!ranked.exact_match);
   }

   #[test]
   fn test_temp_variant_loses_family() {
      let temp = Scored::new(tagged(record("blade of awe", 80), &[&["temp"]]), 1.0);
      let permanent = Scored::new(record("blade of awe", 10), 1.0);
      let ranked = rank(vec![temp, permanent], &query("blade of awe"), 4);
      assert_eq!(ranked.len(), 1);
      assert_eq!(ranked[0].record.level, 10);
   }

   #[test]
   fn test_higher_level_wins_family() {
      let ranked = rank(
         vec![
            make_candidate("frostscythe", "frostscythe", 30, 1.0),
            make_candidate("frostscythe", "frostscythe", 75, 1.0),
         ],
         &query("frostscythe"),
         4,
      );
      assert_eq!(ranked.len(), 1);
      assert_eq!(ranked[0].record.level, 75);
   }

   #[test]
   fn test_exact_match_beats_priority() {
      let rare_exact = Scored::new(tagged(record("ice scythe", 40), &[&["rare"]]), 0.1);
      let common = make_candidate("ice scythe of doom", "doom", 90, 5.0);
      let ranked = rank(vec![common, rare_exact], &query("Ice Scythe"), 4);
      assert_eq!(ranked[0].record.name, "ice scythe");
      assert!(ranked[0].exact_match);
   }

   #[test]
   fn test_alias_expansion_counts_as_exact() {
      let ranked = rank(
         vec![
            make_candidate("ancient dragonlord axe", "adl axe", 80, 2.0),
            make_candidate("ancient dragonlord helm", "adl helm", 70, 1.0),
         ],
         &query("adl"),
         4,
      );
      assert_eq!(ranked[0].record.name, "ancient dragonlord helm");
   }

   #[test]
   fn test_limit_and_ordering() {
      let candidates = (0..6)
         .map(|i| make_candidate(&format!("blade {i}"), &format!("f{i}"), 10, f64::from(i)))
         .collect();
      let ranked = rank(candidates, &query("blade"), 4);
      let names: Vec<_> = ranked.iter().map(|r| r.record.name.as_str()).collect();
      assert_eq!(names, vec!["blade 5", "blade 4", "blade 3", "blade 2"]);
   }

   #[test]
   fn test_relevance_presence_before_score() {
      let mut no_text = make_candidate("blade a", "a", 10, 0.0);
      no_text.item.bonuses = boosts(&[("int", 50)]);
      let with_text = make_candidate("blade b", "b", 10, 0.5);
      let ranked = rank(vec![no_text, with_text], &query("blade"), 4);
      assert_eq!(ranked[0].record.name, "blade b");
   }
}
