pub mod memory;

use std::sync::Arc;

use regex::Regex;

use crate::{
   error::Result,
   types::{ItemRecord, Scored},
};

/// Record attributes a [`Filter`] can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
   Name,
   Category,
   Type,
   Level,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
   Str(String),
   Num(f64),
}

impl From<&str> for Value {
   fn from(s: &str) -> Self {
      Self::Str(s.to_string())
   }
}

impl From<String> for Value {
   fn from(s: String) -> Self {
      Self::Str(s)
   }
}

impl From<f64> for Value {
   fn from(n: f64) -> Self {
      Self::Num(n)
   }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
   Eq,
   Ne,
   Lt,
   Le,
   Gt,
   Ge,
}

impl CmpOp {
   pub fn holds<T: PartialOrd>(self, lhs: &T, rhs: &T) -> bool {
      match self {
         Self::Eq => lhs == rhs,
         Self::Ne => lhs != rhs,
         Self::Lt => lhs < rhs,
         Self::Le => lhs <= rhs,
         Self::Gt => lhs > rhs,
         Self::Ge => lhs >= rhs,
      }
   }
}

/// Store-agnostic predicate over item records.
///
/// Backends lower it into their own query language. `Text` is the only
/// variant that contributes a relevance score.
#[derive(Debug, Clone)]
pub enum Filter {
   All,
   Eq(Field, Value),
   Cmp(Field, CmpOp, Value),
   In(Field, Vec<Value>),
   /// Every word of every phrase must occur in the record's name.
   Text { phrases: Vec<String> },
   Regex(Field, Regex),
   /// Every tag group holds all of these tags. An untagged record counts as
   /// one empty group.
   EveryTagGroup(Vec<String>),
   And(Vec<Self>),
   Or(Vec<Self>),
   Not(Box<Self>),
}

impl Filter {
   /// Conjunction that flattens trivial cases.
   pub fn and(filters: Vec<Self>) -> Self {
      let mut filters: Vec<Self> = filters.into_iter().filter(|f| !matches!(f, Self::All)).collect();
      match filters.len() {
         0 => Self::All,
         1 => filters.remove(0),
         _ => Self::And(filters),
      }
   }

   pub fn or(filters: Vec<Self>) -> Self {
      if filters.len() == 1 {
         return filters.into_iter().next().unwrap_or(Self::All);
      }
      Self::Or(filters)
   }

   pub fn negate(self) -> Self {
      Self::Not(Box::new(self))
   }
}

#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
   /// Records matching `filter`, in catalog order, each with its text score
   /// (zero unless a `Text` clause matched).
   async fn find(&self, filter: &Filter) -> Result<Vec<Scored<ItemRecord>>>;

   async fn distinct_names(&self) -> Result<Vec<String>>;

   async fn count(&self) -> Result<usize>;
}

#[async_trait::async_trait]
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
   async fn find(&self, filter: &Filter) -> Result<Vec<Scored<ItemRecord>>> {
      (**self).find(filter).await
   }

   async fn distinct_names(&self) -> Result<Vec<String>> {
      (**self).distinct_names().await
   }

   async fn count(&self) -> Result<usize> {
      (**self).count().await
   }
}

pub use memory::MemoryStore;
