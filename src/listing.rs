//! Grouped, size-bounded listings of records ordered by a sort expression.
//!
//! Records sharing a score form one group. Output stops at whichever comes
//! first: the group cap or the character budget of the rendered text.

use std::{cmp::Ordering, collections::HashMap};

use serde::Serialize;

use crate::{
   config::{LISTING_MAX_CHARS, LISTING_MAX_GROUPS},
   store::Filter,
   types::{ItemRecord, Scored},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
   Ascending,
   #[default]
   Descending,
}

impl Direction {
   const fn apply(self, ord: Ordering) -> Ordering {
      match self {
         Self::Ascending => ord,
         Self::Descending => ord.reverse(),
      }
   }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingOptions {
   pub direction:  Direction,
   pub max_chars:  usize,
   pub max_groups: usize,
}

impl Default for ListingOptions {
   fn default() -> Self {
      Self {
         direction:  Direction::Descending,
         max_chars:  LISTING_MAX_CHARS,
         max_groups: LISTING_MAX_GROUPS,
      }
   }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
   pub title: String,
   pub link:  String,
   pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreGroup {
   pub score:   f64,
   pub entries: Vec<ListingEntry>,
}

impl ScoreGroup {
   pub fn render(&self) -> String {
      let titles: Vec<&str> = self.entries.iter().map(|e| e.title.as_str()).collect();
      format!("**{}**: {}", format_score(self.score), titles.join(", "))
   }
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
   pub label:     String,
   pub direction: Direction,
   pub groups:    Vec<ScoreGroup>,
   /// Set when groups or entries were left out because of the budget or group cap.
   pub truncated: bool,
}

impl Listing {
   pub fn render(&self) -> String {
      let mut out = String::new();
      for (i, group) in self.groups.iter().enumerate() {
         if i > 0 {
            out.push('\n');
         }
         out.push_str(&group.render());
      }
      out
   }

   pub fn is_empty(&self) -> bool {
      self.groups.is_empty()
   }
}

/// Signed score, without decimals when integral.
pub fn format_score(score: f64) -> String {
   if score.fract() == 0.0 {
      format!("{:+}", score as i64)
   } else {
      format!("{score:+.2}")
   }
}

/// Store filter for records that never show up in listings: default gear,
/// and items that are both temporary and rare in every variant.
pub fn exclusions() -> Filter {
   Filter::and(vec![
      Filter::EveryTagGroup(vec!["default".into()]).negate(),
      Filter::EveryTagGroup(vec!["temp".into(), "rare".into()]).negate(),
   ])
}

fn is_rare_only(record: &ItemRecord) -> bool {
   record.every_tag_group(|g| g.contains("rare"))
}

/// Keeps one record per `key`, choosing the highest level (first on ties),
/// and preserves the input order of survivors.
fn keep_highest_level<K, F>(records: Vec<Scored<ItemRecord>>, key: F) -> Vec<Scored<ItemRecord>>
where
   K: std::hash::Hash + Eq,
   F: Fn(&ItemRecord) -> K,
{
   let mut best: HashMap<K, usize> = HashMap::new();
   for (i, r) in records.iter().enumerate() {
      best
         .entry(key(&r.item))
         .and_modify(|j| {
            if r.item.level > records[*j].item.level {
               *j = i;
            }
         })
         .or_insert(i);
   }

   records
      .into_iter()
      .enumerate()
      .filter(|(i, r)| best.get(&key(&r.item)) == Some(i))
      .map(|(_, r)| r)
      .collect()
}

/// Leading entries of `group` whose rendering fits in `budget` characters,
/// or `None` when not even the first one does.
fn fit_entries(mut group: ScoreGroup, budget: usize) -> Option<ScoreGroup> {
   let mut used = format!("**{}**: ", format_score(group.score)).chars().count();
   let mut keep = 0;
   for (i, entry) in group.entries.iter().enumerate() {
      let cost = entry.title.chars().count() + if i > 0 { 2 } else { 0 };
      if used + cost > budget {
         break;
      }
      used += cost;
      keep += 1;
   }
   if keep == 0 {
      return None;
   }
   group.entries.truncate(keep);
   Some(group)
}

/// Groups scored records into a listing titled `label`.
pub fn build(label: &str, scored: Vec<Scored<ItemRecord>>, options: &ListingOptions) -> Listing {
   let mut records: Vec<Scored<ItemRecord>> = scored
      .into_iter()
      .filter(|s| s.score != 0.0 && s.score.is_finite())
      .collect();

   records.sort_by(|a, b| {
      options.direction.apply(
         a.score
            .partial_cmp(&b.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item.level.cmp(&b.item.level)),
      )
   });

   let records = keep_highest_level(records, |r| r.link.clone());
   let records = keep_highest_level(records, |r| r.name.clone());

   let mut raw_groups: Vec<(f64, Vec<ItemRecord>)> = Vec::new();
   for r in records {
      match raw_groups.last_mut() {
         Some((score, items)) if *score == r.score => items.push(r.item),
         _ => raw_groups.push((r.score, vec![r.item])),
      }
   }

   let mut groups = Vec::new();
   let mut used = 0usize;
   let mut truncated = false;

   for (score, items) in raw_groups {
      if groups.len() >= options.max_groups {
         truncated = true;
         break;
      }

      let suppress_rare = groups.len() >= 2;
      let entries: Vec<ListingEntry> = items
         .into_iter()
         .filter(|item| !(suppress_rare && is_rare_only(item)))
         .map(|item| ListingEntry { title: item.title, link: item.link, level: item.level })
         .collect();
      if entries.is_empty() {
         continue;
      }

      let group = ScoreGroup { score, entries };
      let cost = group.render().chars().count() + usize::from(!groups.is_empty());
      if used + cost > options.max_chars {
         truncated = true;
         if groups.is_empty() {
            groups.extend(fit_entries(group, options.max_chars));
         }
         break;
      }
      used += cost;
      groups.push(group);
   }

   Listing { label: label.to_string(), direction: options.direction, groups, truncated }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::types::fixtures::{record, tagged};

   fn scored(name: &str, level: u8, score: f64) -> Scored<ItemRecord> {
      Scored::new(record(name, level), score)
   }

   fn titles(listing: &Listing) -> Vec<Vec<&str>> {
      listing
         .groups
         .iter()
         .map(|g| g.entries.iter().map(|e| e.title.as_str()).collect())
         .collect()
   }

   #[test]
   fn test_format_score() {
      assert_eq!(format_score(4.0), "+4");
      assert_eq!(format_score(-3.0), "-3");
      assert_eq!(format_score(12.5), "+12.50");
   }

   #[test]
   fn test_groups_by_score() {
      let listing = build(
         "INT",
         vec![
            scored("a", 10, 3.0),
            scored("b", 20, 5.0),
            scored("c", 30, 3.0),
            scored("d", 40, 0.0),
         ],
         &ListingOptions::default(),
      );
      assert_eq!(titles(&listing), vec![vec!["B"], vec!["C", "A"]]);
      assert_eq!(listing.render(), "**+5**: B\n**+3**: C, A");
      assert!(!listing.truncated);
   }

   #[test]
   fn test_ascending() {
      let options = ListingOptions { direction: Direction::Ascending, ..Default::default() };
      let listing = build("INT", vec![scored("a", 10, 3.0), scored("b", 20, -5.0)], &options);
      assert_eq!(titles(&listing), vec![vec!["B"], vec!["A"]]);
   }

   #[test]
   fn test_duplicates_keep_highest_level() {
      let mut low = scored("blade of awe", 10, 4.0);
      low.item.link = "https://wiki.example/boa".to_string();
      let mut high = scored("blade of awe", 50, 4.0);
      high.item.link = "https://wiki.example/boa".to_string();
      let listing = build("INT", vec![low, high], &ListingOptions::default());
      assert_eq!(listing.groups.len(), 1);
      assert_eq!(listing.groups[0].entries.len(), 1);
      assert_eq!(listing.groups[0].entries[0].level, 50);
   }

   #[tokio::test]
   async fn test_exclusions() {
      use crate::store::{ItemStore, MemoryStore};

      let store = MemoryStore::from_records(vec![
         tagged(record("default sword", 1), &[&["default"]]),
         tagged(record("event axe", 1), &[&["temp", "rare"]]),
         tagged(record("event mace", 1), &[&["temp", "rare"], &[]]),
         tagged(record("rare bow", 1), &[&["rare"]]),
      ])
      .unwrap();
      let kept = store.find(&exclusions()).await.unwrap();
      let names: Vec<&str> = kept.iter().map(|s| s.item.name.as_str()).collect();
      assert_eq!(names, vec!["event mace", "rare bow"]);
   }

   #[test]
   fn test_rare_suppressed_after_second_group() {
      let rare = |name: &str, score: f64| Scored::new(tagged(record(name, 10), &[&["rare"]]), score);
      let listing = build(
         "INT",
         vec![
            rare("r1", 9.0),
            rare("r2", 8.0),
            rare("r3", 7.0),
            scored("c3", 10, 7.0),
            rare("r4", 6.0),
         ],
         &ListingOptions::default(),
      );
      assert_eq!(titles(&listing), vec![vec!["R1"], vec!["R2"], vec!["C3"]]);
   }

   #[test]
   fn test_group_cap() {
      let records = (1..=12).map(|i| scored(&format!("item {i}"), 10, f64::from(i))).collect();
      let listing = build("INT", records, &ListingOptions::default());
      assert_eq!(listing.groups.len(), LISTING_MAX_GROUPS);
      assert!(listing.truncated);
      assert_eq!(listing.groups[0].score, 12.0);
   }

   #[test]
   fn test_char_budget() {
      let records = (1..=12).map(|i| scored(&format!("item {i:02}"), 10, f64::from(i))).collect();
      let options = ListingOptions { max_chars: 40, ..Default::default() };
      let listing = build("INT", records, &options);
      // "**+12**: Item 12" is 16 characters, plus a newline between groups.
      assert_eq!(listing.groups.len(), 2);
      assert!(listing.truncated);
      assert!(listing.render().chars().count() <= 40);
   }

   #[test]
   fn test_oversized_first_group_is_cut_to_budget() {
      let mut records: Vec<_> =
         (0..150).map(|i| scored(&format!("item number {i:03}"), 10, 5.0)).collect();
      records.push(scored("runner up", 10, 4.0));
      let listing = build("INT", records, &ListingOptions::default());

      assert_eq!(listing.groups.len(), 1);
      assert!(!listing.groups[0].entries.is_empty());
      assert!(listing.groups[0].entries.len() < 150);
      assert!(listing.truncated);
      assert!(listing.render().chars().count() <= LISTING_MAX_CHARS);
   }

   #[test]
   fn test_first_entry_over_budget() {
      let options = ListingOptions { max_chars: 8, ..Default::default() };
      let listing = build("INT", vec![scored("blade of awe", 10, 5.0)], &options);
      assert!(listing.is_empty());
      assert!(listing.truncated);
   }
}
