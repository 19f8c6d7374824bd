//! Display helpers and the item card shown for a lookup hit.

use serde::Serialize;

use crate::types::{Boost, Category, ItemRecord};

/// Words rendered fully upper-cased instead of title-cased.
const FULL_CAP_WORDS: &[&str] =
   &["str", "int", "dex", "luk", "cha", "wis", "end", "dm", "fs", "so", "dc", "da", "ak"];

/// Activations whose proc rate is meaningless and therefore hidden.
const RATELESS_ACTIVATIONS: &[&str] = &["specific enemy", "click weapon"];

/// Title-cases every word of `text`, or upper-cases it entirely when the whole
/// text is a stat abbreviation such as `int`.
pub fn capitalize(text: &str) -> String {
   if FULL_CAP_WORDS.contains(&text) {
      return text.to_uppercase();
   }
   if text.trim().is_empty() {
      return text.to_string();
   }

   text
      .trim()
      .split(' ')
      .map(|word| {
         let mut chars = word.chars();
         chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
         })
      })
      .collect::<Vec<_>>()
      .join(" ")
}

pub fn format_tag(tag: &str) -> String {
   match tag {
      "se" => "Seasonal".to_string(),
      "ak" => "ArchKnight Saga".to_string(),
      "alexander" => "Alexander Saga".to_string(),
      "temp" => "Temporary".to_string(),
      "fs" => "Free Storage".to_string(),
      other => capitalize(other),
   }
}

/// `[{int, 3}, {melee def, -1}]` renders as `INT +3, Melee Def -1`.
pub fn format_boosts(boosts: &[Boost]) -> String {
   if boosts.is_empty() {
      return "None".to_string();
   }
   boosts
      .iter()
      .map(|b| format!("{} {}{}", capitalize(&b.k), if b.v < 0 { "" } else { "+" }, b.v))
      .collect::<Vec<_>>()
      .join(", ")
}

fn join_capitalized(values: &[String], sep: &str) -> String {
   values.iter().map(|v| capitalize(v)).collect::<Vec<_>>().join(sep)
}

/// Proc chance as a percentage, kept to five decimal places of the raw rate.
fn format_rate(rate: f64) -> String {
   let pct = (rate * 1e5).round() / 1e3;
   format!("{pct}%")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardField {
   pub name:  String,
   pub value: String,
}

/// Everything shown for one looked-up item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCard {
   pub title:       String,
   pub url:         String,
   pub description: Vec<String>,
   pub fields:      Vec<CardField>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub image:       Option<String>,
   #[serde(skip_serializing_if = "Option::is_none")]
   pub footer:      Option<String>,
}

impl ItemCard {
   pub fn new(item: &ItemRecord, similar: &[ItemRecord]) -> Self {
      let cosmetic = item.is_cosmetic();
      let tags = item
         .tag_set
         .iter()
         .map(|group| {
            let names = group.tags.iter().map(|t| format_tag(t)).collect::<Vec<_>>();
            if names.is_empty() {
               "`None`".to_string()
            } else {
               format!("`{}`", names.join(", "))
            }
         })
         .collect::<Vec<_>>()
         .join(" or ");

      let mut description = vec![
         format!("**Tags:** {tags}"),
         format!("**Level:** {}", item.level),
         format!("**Type:** {}", capitalize(&item.item_type)),
      ];
      let mut fields = Vec::new();

      match item.category {
         Category::Weapon => {
            if !cosmetic {
               let damage = if item.damage.is_empty() {
                  "Scaled".to_string()
               } else {
                  item.damage.iter().map(u32::to_string).collect::<Vec<_>>().join("-")
               };
               description.push(format!("**Damage:** {damage}"));
            }
            description.push(format!("**Element:** {}", join_capitalized(&item.elements, " / ")));
            if !cosmetic {
               description.push(format!("**Bonuses:** {}", format_boosts(&item.bonuses)));
               description.push(format!("**Resists:** {}", format_boosts(&item.resists)));
            }

            for special in item.specials.iter().flatten() {
               let mut lines = vec![
                  format!("**Activation:** {}", capitalize(&special.activation)),
                  format!("**Effect:** {}", special.effect),
               ];
               if let Some(elements) = &special.elements {
                  lines.push(format!("**Element:** {}", join_capitalized(elements, " / ")));
               }
               if !RATELESS_ACTIVATIONS.contains(&special.activation.as_str())
                  && let Some(rate) = special.rate
               {
                  lines.push(format!("**Rate:** {}", format_rate(rate)));
               }
               fields.push(CardField { name: "Weapon Special".to_string(), value: lines.join("\n") });
            }
         },
         Category::Accessory => {
            if !cosmetic {
               description.push(format!("**Bonuses:** {}", format_boosts(&item.bonuses)));
               description.push(format!("**Resists:** {}", format_boosts(&item.resists)));
            }
            if let Some(modifies) = &item.modifies {
               description.push(format!("**Modifies:** {modifies}"));
            }

            if let Some(skill) = &item.skill {
               let element = skill
                  .element
                  .as_deref()
                  .map(|e| join_capitalized(e, " / "))
                  .filter(|e| !e.is_empty())
                  .unwrap_or_else(|| "N/A".to_string());
               let value = [
                  format!("**Effect:** {}", skill.effect),
                  format!("**Mana Cost:** {}", skill.mana_cost),
                  format!("**Cooldown:** {}", skill.cooldown),
                  format!(
                     "**Damage Type:** {}",
                     capitalize(skill.damage_type.as_deref().unwrap_or("N/A"))
                  ),
                  format!("**Element:** {element}"),
               ]
               .join("\n");
               fields.push(CardField { name: "Trinket Skill".to_string(), value });
            }
         },
      }

      if !similar.is_empty() {
         let value = similar
            .iter()
            .map(|s| format!("[{}]({})", s.title, s.link))
            .collect::<Vec<_>>()
            .join(", ");
         fields.push(CardField { name: "Similar Results".to_string(), value });
      }

      if item.images.len() > 1 {
         let value = item.images[1..]
            .iter()
            .enumerate()
            .map(|(i, url)| format!("[Appearance {}]({url})", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
         fields.push(CardField { name: "Other Appearances".to_string(), value });
      }

      let footer = item
         .color_custom
         .as_ref()
         .map(|colors| format!("This item is color-custom to your {} color", colors.join(", ")));

      Self {
         title: item.title.clone(),
         url: item.link.clone(),
         description,
         fields,
         image: item.images.first().cloned(),
         footer,
      }
   }
}
