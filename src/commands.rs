//! Parsing of item command input: the command name picks category and type
//! constraints, the text may end in a level comparison such as `>= 50`.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
   error::FilterError,
   retrieve::{LevelFilter, StructuredHints},
   store::CmpOp,
   types::{Category, MAX_LEVEL},
};

pub const ITEM_COMMAND: &str = "item";

/// Level operators, longest first so `<=` wins over `<`.
const LEVEL_OPERATORS: &[(&str, CmpOp)] = &[
   ("===", CmpOp::Eq),
   ("=/=", CmpOp::Ne),
   ("==", CmpOp::Eq),
   ("<=", CmpOp::Le),
   ("=<", CmpOp::Le),
   (">=", CmpOp::Ge),
   ("=>", CmpOp::Ge),
   ("!=", CmpOp::Ne),
   ("=", CmpOp::Eq),
   ("<", CmpOp::Lt),
   (">", CmpOp::Gt),
   ("/", CmpOp::Le),
];

static LEVEL_OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
   let alternatives: Vec<String> = LEVEL_OPERATORS
      .iter()
      .map(|(op, _)| format!("(?:{})", regex::escape(op)))
      .collect();
   Regex::new(&alternatives.join("|")).expect("level operator pattern is valid")
});

static SPECIAL_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new("[^a-zA-Z0-9 \\-|'\"\u{2018}\u{2019}\u{201c}\u{201d}]")
      .expect("special character pattern is valid")
});

pub const WEAPON_COMMANDS: &[&str] =
   &["wep", "weap", "weapon", "sword", "axe", "mace", "staff", "wand", "dagger", "scythe"];

pub const ACCESSORY_COMMANDS: &[&str] = &[
   "acc",
   "accessory",
   "belt",
   "cape",
   "wings",
   "wing",
   "helm",
   "helmet",
   "necklace",
   "ring",
   "trinket",
   "bracer",
];

fn types(names: &[&str]) -> Vec<String> {
   names.iter().map(|n| (*n).to_string()).collect()
}

/// Category and type constraints implied by the command used.
pub fn command_hints(command: &str) -> Result<StructuredHints, FilterError> {
   let command = command.to_lowercase();
   let (category, types) = match command.as_str() {
      ITEM_COMMAND => (None, Vec::new()),
      "wep" | "weap" | "weapon" => (Some(Category::Weapon), Vec::new()),
      "sword" | "axe" | "mace" => (Some(Category::Weapon), types(&["sword", "mace", "axe"])),
      "staff" | "wand" => (Some(Category::Weapon), types(&["staff", "wand"])),
      "dagger" | "scythe" => (Some(Category::Weapon), vec![command.clone()]),
      "acc" | "accessory" => (Some(Category::Accessory), Vec::new()),
      "helm" | "helmet" => (Some(Category::Accessory), types(&["helm"])),
      "cape" | "wing" | "wings" => (Some(Category::Accessory), types(&["cape", "wings"])),
      "belt" | "necklace" | "ring" | "trinket" | "bracer" => {
         (Some(Category::Accessory), vec![command.clone()])
      },
      _ => return Err(FilterError::UnknownCommand(command)),
   };
   Ok(StructuredHints { category, types, level: None })
}

/// Parses `value` as a level bound for `op`.
pub fn parse_level(op: CmpOp, value: &str) -> Result<LevelFilter, FilterError> {
   let value = value.trim();
   let level: f64 = value.parse().map_err(|_| FilterError::InvalidLevelFilter)?;
   if value.is_empty() || !level.is_finite() {
      return Err(FilterError::InvalidLevelFilter);
   }
   if !(0.0..=f64::from(MAX_LEVEL)).contains(&level) {
      return Err(FilterError::LevelOutOfRange);
   }
   Ok(LevelFilter { op, value: level })
}

/// Splits `input` at its first level operator, if any, returning the name
/// part and the parsed filter.
pub fn split_level_filter(input: &str) -> Result<(&str, Option<LevelFilter>), FilterError> {
   let Some(m) = LEVEL_OPERATOR.find(input) else {
      return Ok((input.trim(), None));
   };
   let op = LEVEL_OPERATORS
      .iter()
      .find(|(symbol, _)| *symbol == m.as_str())
      .map(|(_, op)| *op)
      .ok_or(FilterError::InvalidLevelFilter)?;
   let filter = parse_level(op, &input[m.end()..])?;
   Ok((input[..m.start()].trim(), Some(filter)))
}

/// A parsed item command.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRequest {
   pub name:  String,
   pub hints: StructuredHints,
}

pub fn parse_item_request(command: &str, input: &str) -> Result<ItemRequest, FilterError> {
   let mut hints = command_hints(command)?;
   if input.trim().is_empty() {
      return Err(FilterError::EmptyQuery);
   }

   let (name, level) = split_level_filter(input)?;
   if SPECIAL_CHARACTERS.is_match(name) {
      return Err(FilterError::SpecialCharacters);
   }
   hints.level = level;
   Ok(ItemRequest { name: name.to_string(), hints })
}

pub fn usage(command: &str) -> String {
   format!(
      "Usage: {command} `[name]` - Fetches the details of an item\n_or_ {command} `[name]` \
       `(operator)` `level` - Fetches the details of an item and filters based on `level`\n`level` \
       should be between 0 and 90 and `operator` must be one of the following: `=`, `<`, `>`, \
       `<=`, `>=`, `!= or =/=`"
   )
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_command_hints() {
      let hints = command_hints("axe").unwrap();
      assert_eq!(hints.category, Some(Category::Weapon));
      assert_eq!(hints.types, vec!["sword", "mace", "axe"]);

      let hints = command_hints("Helmet").unwrap();
      assert_eq!(hints.category, Some(Category::Accessory));
      assert_eq!(hints.types, vec!["helm"]);

      assert_eq!(command_hints("scythe").unwrap().types, vec!["scythe"]);
      assert_eq!(command_hints("wing").unwrap().types, vec!["cape", "wings"]);
      assert_eq!(command_hints("item").unwrap(), StructuredHints::default());
      assert!(command_hints("acc").unwrap().types.is_empty());
      assert_eq!(command_hints("shield"), Err(FilterError::UnknownCommand("shield".into())));
   }

   #[test]
   fn test_every_listed_command_is_known() {
      for command in WEAPON_COMMANDS.iter().chain(ACCESSORY_COMMANDS) {
         assert!(command_hints(command).is_ok(), "{command}");
      }
   }

   #[test]
   fn test_level_operators() {
      let cases = [
         ("blade <= 50", CmpOp::Le),
         ("blade =< 50", CmpOp::Le),
         ("blade / 50", CmpOp::Le),
         ("blade >= 50", CmpOp::Ge),
         ("blade => 50", CmpOp::Ge),
         ("blade === 50", CmpOp::Eq),
         ("blade == 50", CmpOp::Eq),
         ("blade = 50", CmpOp::Eq),
         ("blade != 50", CmpOp::Ne),
         ("blade =/= 50", CmpOp::Ne),
         ("blade < 50", CmpOp::Lt),
         ("blade > 50", CmpOp::Gt),
      ];
      for (input, op) in cases {
         let (name, filter) = split_level_filter(input).unwrap();
         assert_eq!(name, "blade", "{input}");
         assert_eq!(filter, Some(LevelFilter { op, value: 50.0 }), "{input}");
      }
   }

   #[test]
   fn test_level_errors() {
      assert_eq!(split_level_filter("blade <="), Err(FilterError::InvalidLevelFilter));
      assert_eq!(split_level_filter("blade < ten"), Err(FilterError::InvalidLevelFilter));
      assert_eq!(split_level_filter("blade < inf"), Err(FilterError::InvalidLevelFilter));
      assert_eq!(split_level_filter("blade > 91"), Err(FilterError::LevelOutOfRange));
      assert_eq!(split_level_filter("blade > -1"), Err(FilterError::LevelOutOfRange));
      assert_eq!(split_level_filter("blade of awe"), Ok(("blade of awe", None)));
   }

   #[test]
   fn test_parse_item_request() {
      let request = parse_item_request("sword", "Blade of Awe >= 15").unwrap();
      assert_eq!(request.name, "Blade of Awe");
      assert_eq!(request.hints.level, Some(LevelFilter { op: CmpOp::Ge, value: 15.0 }));
      assert_eq!(request.hints.category, Some(Category::Weapon));

      assert_eq!(
         parse_item_request("item", "Alina's “Bouquet”").map(|r| r.name),
         Ok("Alina's “Bouquet”".to_string())
      );
      assert_eq!(parse_item_request("item", "blade!"), Err(FilterError::SpecialCharacters));
      assert_eq!(parse_item_request("item", "  "), Err(FilterError::EmptyQuery));
   }

   #[test]
   fn test_usage_mentions_command() {
      assert!(usage("wep").starts_with("Usage: wep `[name]`"));
   }
}
