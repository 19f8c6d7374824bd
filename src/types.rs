use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MAX_LEVEL: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
   Weapon,
   Accessory,
}

impl Category {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Weapon => "weapon",
         Self::Accessory => "accessory",
      }
   }
}

/// One alternative combination of tags a record can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
   #[serde(default)]
   pub tags: Vec<String>,
}

impl TagGroup {
   pub fn contains(&self, tag: &str) -> bool {
      self.tags.iter().any(|t| t == tag)
   }
}

/// A named signed value, used for both stat bonuses and resistances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
   pub k: String,
   pub v: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Special {
   pub activation: String,
   pub effect:     String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub elements:   Option<Vec<String>>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub rate:       Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrinketSkill {
   pub effect:      String,
   pub mana_cost:   i32,
   pub cooldown:    i32,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub damage_type: Option<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub element:     Option<Vec<String>>,
}

/// One catalog entry: a single variant of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
   pub name:         String,
   pub title:        String,
   pub link:         String,
   pub family:       String,
   pub category:     Category,
   #[serde(rename = "type")]
   pub item_type:    String,
   pub level:        u8,
   #[serde(default)]
   pub tag_set:      Vec<TagGroup>,
   #[serde(default)]
   pub bonuses:      Vec<Boost>,
   #[serde(default)]
   pub resists:      Vec<Boost>,
   #[serde(default)]
   pub damage:       Vec<u32>,
   #[serde(default)]
   pub elements:     Vec<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub specials:     Option<Vec<Special>>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub skill:        Option<TrinketSkill>,
   #[serde(default)]
   pub images:       Vec<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub modifies:     Option<String>,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub color_custom: Option<Vec<String>>,
}

impl ItemRecord {
   pub fn validate(&self) -> Result<()> {
      if self.title.trim().is_empty() {
         return Err(Error::InvalidRecord { title: self.name.clone(), reason: "empty title" });
      }
      if self.level > MAX_LEVEL {
         return Err(Error::InvalidRecord {
            title:  self.title.clone(),
            reason: "level out of range",
         });
      }
      Ok(())
   }

   pub fn bonus(&self, key: &str) -> Option<i32> {
      self.bonuses.iter().find(|b| b.k == key).map(|b| b.v)
   }

   pub fn resist(&self, key: &str) -> Option<i32> {
      self.resists.iter().find(|b| b.k == key).map(|b| b.v)
   }

   pub fn bonus_sum(&self) -> i64 {
      self.bonuses.iter().map(|b| i64::from(b.v)).sum()
   }

   /// Mean of the damage range; scaled weapons (no damage listed) average 0.
   pub fn average_damage(&self) -> f64 {
      if self.damage.is_empty() {
         return 0.0;
      }
      self.damage.iter().map(|&d| f64::from(d)).sum::<f64>() / self.damage.len() as f64
   }

   pub fn all_tags(&self) -> impl Iterator<Item = &str> {
      self.tag_set.iter().flat_map(|g| g.tags.iter().map(String::as_str))
   }

   pub fn is_cosmetic(&self) -> bool {
      self.all_tags().any(|t| t == "cosmetic")
   }

   /// Whether every tag-group option satisfies `pred`. A record without any
   /// tag-group has a single implicit empty option.
   pub fn every_tag_group(&self, pred: impl Fn(&TagGroup) -> bool) -> bool {
      if self.tag_set.is_empty() {
         return pred(&TagGroup::default());
      }
      self.tag_set.iter().all(pred)
   }
}

/// Value attached to a record by a store or index query.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
   pub item:  T,
   pub score: f64,
}

impl<T> Scored<T> {
   pub const fn new(item: T, score: f64) -> Self {
      Self { item, score }
   }
}

#[cfg(test)]
pub(crate) mod fixtures {
   use super::*;

   pub fn record(name: &str, level: u8) -> ItemRecord {
      ItemRecord {
         name:         name.to_string(),
         title:        crate::format::capitalize(name),
         link:         format!("https://wiki.example/{}", name.replace(' ', "-")),
         family:       name.to_string(),
         category:     Category::Weapon,
         item_type:    "sword".to_string(),
         level,
         tag_set:      Vec::new(),
         bonuses:      Vec::new(),
         resists:      Vec::new(),
         damage:       Vec::new(),
         elements:     vec!["fire".to_string()],
         specials:     None,
         skill:        None,
         images:       Vec::new(),
         modifies:     None,
         color_custom: None,
      }
   }

   pub fn tagged(mut rec: ItemRecord, groups: &[&[&str]]) -> ItemRecord {
      rec.tag_set = groups
         .iter()
         .map(|g| TagGroup { tags: g.iter().map(|t| (*t).to_string()).collect() })
         .collect();
      rec
   }

   pub fn boosts(pairs: &[(&str, i32)]) -> Vec<Boost> {
      pairs
         .iter()
         .map(|(k, v)| Boost { k: (*k).to_string(), v: *v })
         .collect()
   }
}
