//! Fuzzy full-text index over distinct item names.
//!
//! Built once at startup into an in-memory tantivy index and immutable
//! afterwards. Names are split into words, stop words are dropped and a
//! trailing `s` is stripped from longer tokens. Exact term hits score with
//! BM25; fuzzy hits add a flat, smaller weight.

pub mod query;

use tantivy::{
   Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc,
   collector::TopDocs,
   query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery},
   schema::{Field, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value},
   tokenizer::{
      LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer, Token, TokenFilter, TokenStream,
      Tokenizer,
   },
};

pub use self::query::{Clause, Presence, parse_query};
use crate::{Result, types::Scored};

const NAME_TOKENIZER: &str = "item_name";

/// Largest edit distance tantivy's Levenshtein automata support.
const MAX_EDIT_DISTANCE: usize = 2;

/// Weight of a fuzzy hit relative to the flat score it would otherwise get.
const FUZZY_WEIGHT: f32 = 0.5;

const WRITER_MEMORY: usize = 15_000_000;

const STOP_WORDS: &[&str] = &[
   "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
   "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
   "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got",
   "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in",
   "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might",
   "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
   "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so", "some",
   "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "tis", "to",
   "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where", "which", "while",
   "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

/// Drops a trailing `s` from tokens longer than two characters.
#[derive(Clone)]
struct TrailingSFilter;

impl TokenFilter for TrailingSFilter {
   type Tokenizer<T: Tokenizer> = TrailingSWrapper<T>;

   fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
      TrailingSWrapper(tokenizer)
   }
}

#[derive(Clone)]
struct TrailingSWrapper<T>(T);

impl<T: Tokenizer> Tokenizer for TrailingSWrapper<T> {
   type TokenStream<'a> = TrailingSStream<T::TokenStream<'a>>;

   fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
      TrailingSStream(self.0.token_stream(text))
   }
}

struct TrailingSStream<T>(T);

impl<T: TokenStream> TokenStream for TrailingSStream<T> {
   fn advance(&mut self) -> bool {
      if !self.0.advance() {
         return false;
      }
      let text = &mut self.0.token_mut().text;
      if text.chars().count() > 2 && text.ends_with('s') {
         text.pop();
      }
      true
   }

   fn token(&self) -> &Token {
      self.0.token()
   }

   fn token_mut(&mut self) -> &mut Token {
      self.0.token_mut()
   }
}

/// Analyzer shared by indexing and query parsing.
pub fn name_analyzer() -> TextAnalyzer {
   TextAnalyzer::builder(SimpleTokenizer::default())
      .filter(LowerCaser)
      .filter(StopWordFilter::remove(STOP_WORDS.iter().map(|w| (*w).to_string())))
      .filter(TrailingSFilter)
      .build()
}

/// Tokens `text` is indexed under.
pub fn analyze(text: &str) -> Vec<String> {
   let mut analyzer = name_analyzer();
   let mut stream = analyzer.token_stream(text);
   let mut tokens = Vec::new();
   while stream.advance() {
      tokens.push(stream.token().text.clone());
   }
   tokens
}

pub struct SearchIndex {
   reader: IndexReader,
   name:   Field,
   terms:  Field,
   len:    usize,
}

impl SearchIndex {
   /// Indexes each name once; the name doubles as the document reference.
   pub fn build<I>(names: I) -> Result<Self>
   where
      I: IntoIterator<Item = String>,
   {
      let mut names: Vec<String> = names.into_iter().collect();
      names.sort_unstable();
      names.dedup();

      let mut builder = Schema::builder();
      let name = builder.add_text_field("name", STORED);
      let indexing = TextFieldIndexing::default()
         .set_tokenizer(NAME_TOKENIZER)
         .set_index_option(IndexRecordOption::WithFreqs);
      let terms =
         builder.add_text_field("terms", TextOptions::default().set_indexing_options(indexing));

      let index = Index::create_in_ram(builder.build());
      index.tokenizers().register(NAME_TOKENIZER, name_analyzer());

      let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY)?;
      for n in &names {
         writer.add_document(doc!(name => n.as_str(), terms => n.as_str()))?;
      }
      writer.commit()?;

      let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
      tracing::info!(documents = names.len(), "built name index");

      Ok(Self { reader, name, terms, len: names.len() })
   }

   pub const fn len(&self) -> usize {
      self.len
   }

   pub const fn is_empty(&self) -> bool {
      self.len == 0
   }

   fn term(&self, text: &str) -> Term {
      Term::from_field_text(self.terms, text)
   }

   /// Query for one clause: the exact term, widened by a fuzzy match when the
   /// clause allows edits, and restricted to the pinned prefix if any.
   fn clause_query(&self, clause: &Clause) -> Result<Box<dyn Query>> {
      let exact: Box<dyn Query> =
         Box::new(TermQuery::new(self.term(&clause.term), IndexRecordOption::WithFreqs));
      let distance = clause.edit_distance.min(MAX_EDIT_DISTANCE) as u8;
      if distance == 0 {
         return Ok(exact);
      }

      let fuzzy = FuzzyTermQuery::new(self.term(&clause.term), distance, true);
      let matcher: Box<dyn Query> = Box::new(BooleanQuery::new(vec![
         (Occur::Should, exact),
         (Occur::Should, Box::new(BoostQuery::new(Box::new(fuzzy), FUZZY_WEIGHT))),
      ]));

      let prefix = clause.prefix();
      if prefix.is_empty() {
         return Ok(matcher);
      }
      let pinned = RegexQuery::from_pattern(&format!("{}.*", regex::escape(prefix)), self.terms)?;
      Ok(Box::new(BooleanQuery::new(vec![
         (Occur::Must, matcher),
         (Occur::Must, Box::new(BoostQuery::new(Box::new(pinned), 0.0))),
      ])))
   }

   /// Evaluates a query string (see [`query`]) and returns matching names,
   /// best first.
   pub fn query(&self, query: &str) -> Result<Vec<Scored<String>>> {
      let clauses = parse_query(query);
      if clauses.is_empty() || self.is_empty() {
         return Ok(Vec::new());
      }

      let mut subqueries = Vec::with_capacity(clauses.len());
      for clause in &clauses {
         let occur = if clause.is_required() { Occur::Must } else { Occur::Should };
         subqueries.push((occur, self.clause_query(clause)?));
      }
      let query = BooleanQuery::new(subqueries);

      let searcher = self.reader.searcher();
      let top = searcher.search(&query, &TopDocs::with_limit(self.len))?;

      let mut results = Vec::with_capacity(top.len());
      for (score, address) in top {
         let doc: TantivyDocument = searcher.doc(address)?;
         if let Some(name) = doc.get_first(self.name).and_then(|v| v.as_str()) {
            results.push(Scored::new(name.to_string(), f64::from(score)));
         }
      }

      results.sort_by(|a, b| {
         b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item.cmp(&b.item))
      });

      tracing::debug!(clauses = clauses.len(), results = results.len(), "index query");
      Ok(results)
   }
}
