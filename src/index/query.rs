//! Query syntax understood by [`SearchIndex::query`](super::SearchIndex::query).
//!
//! A query is a whitespace separated list of clauses:
//!
//! - `term` is optional: it adds to the score when it matches.
//! - `+term` is required: documents without a match are discarded.
//! - `term~N` matches index terms within edit distance `N`.
//! - `t^erm` pins everything before `^`: matches must start with `t`.

use super::analyze;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
   Optional,
   Required,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
   pub term:          String,
   pub presence:      Presence,
   pub edit_distance: usize,
   /// Leading characters that must match exactly.
   pub pinned:        usize,
}

impl Clause {
   pub fn prefix(&self) -> &str {
      let end = self.term.char_indices().nth(self.pinned).map_or(self.term.len(), |(i, _)| i);
      &self.term[..end]
   }

   pub const fn is_required(&self) -> bool {
      matches!(self.presence, Presence::Required)
   }
}

/// One raw clause may analyze into several terms (`x-ray`); each inherits the
/// presence and fuzziness, only the first keeps the pin.
fn parse_clause(raw: &str) -> Vec<Clause> {
   let (presence, rest) = match raw.strip_prefix('+') {
      Some(rest) => (Presence::Required, rest),
      None => (Presence::Optional, raw),
   };

   let (body, edit_distance) = match rest.rsplit_once('~') {
      Some((body, n)) => (body, n.parse().unwrap_or(0)),
      None => (rest, 0),
   };

   let (pinned, term) = match body.split_once('^') {
      Some((head, tail)) => (head.chars().count(), format!("{head}{tail}")),
      None => (0, body.to_string()),
   };

   // Stop words vanish; pinning never extends past the analyzed term.
   analyze(&term)
      .into_iter()
      .enumerate()
      .map(|(i, term)| {
         let pinned = if i == 0 { pinned.min(term.chars().count()) } else { 0 };
         Clause { term, presence, edit_distance, pinned }
      })
      .collect()
}

pub fn parse_query(query: &str) -> Vec<Clause> {
   query.split_whitespace().flat_map(parse_clause).collect()
}
