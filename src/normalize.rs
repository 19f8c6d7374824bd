//! Text canonicalization and alias expansion for item names.
//!
//! Raw user text is lowercased, stripped of diacritics and quoting, and
//! collapsed into space separated tokens before any alias is applied.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// Whole-phrase aliases, checked before any per-word replacement.
const FULL_PHRASE_ALIASES: &[(&str, &str)] = &[
   ("dm cannon", "defender cannon"),
   ("drgn capacitor", "drgn c4p4c170r"),
   ("drgn claw", "drgn c74w"),
   ("drgn visor", "drgn v1z0r"),
   ("drgn vizor", "drgn v1z0r"),
   ("ur mom", "unsqueakable farce"),
   ("your mom", "unsqueakable farce"),
   ("1k wings", "wings of the thousand flames"),
   ("1k infernos", "wings of the thousand infernos"),
];

const WORD_ALIASES: &[(&str, &str)] = &[
   ("adl", "ancient dragonlord helm"),
   ("adsoe", "ancient dragon amulet scythe of the elements"),
   ("aya", "summon gem ayauhnqui ex"),
   ("ba", "baltaels aventail"),
   ("blod", "blinding light of destiny"),
   ("boa", "blade of awe"),
   ("bod", "blade of destiny"),
   ("bsw", "baltaels aventail"),
   ("c7", "the corrupted seven"),
   ("ddb", "defenders dragon belt"),
   ("ddn", "defenders dragon necklace"),
   ("ddr", "defenders dragon ring"),
   ("ddsoe", "doomed dragon amulet scythe of the elements"),
   ("ddsoe1", "doomed dragon amulet scythe of elementals"),
   ("ddsoe2", "doomed dragon amulet scythe of the elements"),
   ("ddv", "distorted doom visage"),
   ("drk", "dragonknight"),
   ("dsod", "dragonstaff of destiny"),
   ("eud", "elemental unity defender"),
   ("fc", "frozen claymore"),
   ("fdl", "fierce dragonlord"),
   ("dlc", "dragonlord captain"),
   ("fs", "frostscythe"),
   ("gg", "forgotten gloom glaive"),
   ("gt", "grove tender"),
   ("isis", "ice scythe"),
   ("lh", "lucky hammer"),
   ("npsb", "necro paragon soulblade"),
   ("nsod", "necrotic sword of doom"),
   ("nstb", "not so tiny bubbles"),
   ("pdl", "dragons patience"),
   ("rdl", "dragons rage"),
   ("bdl", "dragons bulwark"),
   ("wdl", "dragons wrath"),
   ("scc", "sea chickens conquest"),
   ("sf", "soulforged"),
   ("tbod", "twin blades of destiny"),
   ("udsod", "ultimate dragonstaff of destiny"),
   ("ublod", "ultimate blinding light of destiny"),
   ("utbod", "ultimate twin blades of destiny"),
   ("unrav", "unraveler"),
   ("uok", "ultra omniknight"),
   ("vik", "vanilla ice katana"),
];

/// Characters removed outright rather than turned into separators.
const fn is_stripped(c: char) -> bool {
   matches!(c, '(' | ')' | '\'' | '"' | '\u{201c}' | '\u{201d}' | '\u{2018}' | '\u{2019}' | '`')
}

const fn is_kept(c: char) -> bool {
   c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '?' | '|')
}

const fn is_combining_mark(c: char) -> bool {
   matches!(c, '\u{0300}'..='\u{036f}')
}

/// Canonicalizes raw text into a comparable form.
///
/// Example: `"Alina's Battle-Bouquet Staff"` becomes
/// `"alinas battle bouquet staff"`.
pub fn sanitize_text(text: &str) -> String {
   let lowered = text.to_lowercase();
   let mut out = String::with_capacity(lowered.len());
   let mut pending_space = false;

   for c in lowered.nfd().filter(|&c| !is_combining_mark(c) && !is_stripped(c)) {
      if is_kept(c) {
         if pending_space && !out.is_empty() {
            out.push(' ');
         }
         pending_space = false;
         out.push(c);
      } else {
         pending_space = true;
      }
   }

   out
}

/// A sanitized, alias-resolved query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
   /// Sanitized text after full-phrase alias resolution.
   pub phrase: String,
   /// Per-word fragments after single-word alias resolution. A fragment may
   /// hold several words when an alias expanded it.
   pub tokens: Vec<String>,
}

impl NormalizedQuery {
   /// Fragments joined back into one phrase.
   pub fn expanded(&self) -> String {
      self.tokens.join(" ")
   }

   /// Individual words of the expanded phrase.
   pub fn words(&self) -> impl Iterator<Item = &str> {
      self.tokens.iter().flat_map(|t| t.split(' '))
   }

   pub fn is_empty(&self) -> bool {
      self.phrase.is_empty()
   }

   /// Whether a stored normalized name is an exact hit for this query, either
   /// as typed or after alias expansion.
   pub fn matches_exactly(&self, name: &str) -> bool {
      name == self.phrase || name == self.expanded()
   }
}

/// Fixed alias tables mapping shorthand to canonical item names.
#[derive(Debug, Clone)]
pub struct AliasTable {
   phrases: HashMap<&'static str, &'static str>,
   words:   HashMap<&'static str, &'static str>,
}

impl AliasTable {
   pub fn builtin() -> Self {
      Self::new(FULL_PHRASE_ALIASES, WORD_ALIASES)
   }

   pub fn new(
      phrases: &[(&'static str, &'static str)],
      words: &[(&'static str, &'static str)],
   ) -> Self {
      Self { phrases: phrases.iter().copied().collect(), words: words.iter().copied().collect() }
   }

   pub fn empty() -> Self {
      Self::new(&[], &[])
   }

   /// Applies the alias tables to already sanitized text.
   pub fn resolve(&self, sanitized: &str) -> NormalizedQuery {
      let phrase = self
         .phrases
         .get(sanitized)
         .map_or_else(|| sanitized.to_string(), |canonical| (*canonical).to_string());

      let tokens = phrase
         .split(' ')
         .map(|word| {
            self
               .words
               .get(word)
               .map_or_else(|| word.to_string(), |canonical| (*canonical).to_string())
         })
         .collect();

      NormalizedQuery { phrase, tokens }
   }

   pub fn normalize(&self, raw: &str) -> NormalizedQuery {
      self.resolve(&sanitize_text(raw))
   }
}

impl Default for AliasTable {
   fn default() -> Self {
      Self::builtin()
   }
}
