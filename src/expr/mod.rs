//! User-defined sort expressions such as `int + dex - (fire - ice)`.
//!
//! An expression is tokenized, checked and converted to postfix once, then
//! folded twice: into a scoring function over item records and into the
//! human-readable label shown above a listing.

pub mod compile;
pub mod parser;
pub mod pretty;

use smallvec::SmallVec;

pub use self::{compile::ScoreExpr, parser::to_postfix};
use crate::{
   Result,
   error::{Error, ExpressionError},
};

/// Upper bound on `+`/`-` occurrences, unary ones included.
pub const MAX_OPERATORS: usize = 5;

/// Stat names read from an item's bonuses. Any other operand except
/// `damage` is read from its resists.
pub const BONUS_ATTRIBUTES: &[&str] = &[
   "block",
   "dodge",
   "parry",
   "crit",
   "magic def",
   "pierce def",
   "melee def",
   "wis",
   "end",
   "cha",
   "luk",
   "int",
   "dex",
   "str",
   "bonus",
];

pub fn is_bonus(name: &str) -> bool {
   BONUS_ATTRIBUTES.contains(&name)
}

pub fn is_resist(name: &str) -> bool {
   name != "damage" && !is_bonus(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
   Add,
   Sub,
   Neg,
}

impl Operator {
   pub const fn precedence(self) -> u8 {
      match self {
         Self::Add | Self::Sub => 1,
         Self::Neg => 2,
      }
   }

   pub const fn is_unary(self) -> bool {
      matches!(self, Self::Neg)
   }

   pub const fn symbol(self) -> char {
      match self {
         Self::Add => '+',
         Self::Sub | Self::Neg => '-',
      }
   }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixToken {
   Operand(String),
   Operator(Operator),
}

/// Evaluates a postfix sequence with caller supplied operand and operator
/// semantics.
///
/// A well-formed sequence leaves exactly one value on the stack. Anything else
/// is reported as [`Error::MalformedPostfix`] with the offending position.
pub fn fold_postfix<T>(
   postfix: &[PostfixToken],
   mut operand: impl FnMut(&str) -> T,
   mut unary: impl FnMut(Operator, T) -> T,
   mut binary: impl FnMut(Operator, T, T) -> T,
) -> Result<T> {
   let mut stack: SmallVec<[T; 8]> = SmallVec::new();

   for (position, token) in postfix.iter().enumerate() {
      let value = match token {
         PostfixToken::Operand(name) => operand(name),
         PostfixToken::Operator(op) if op.is_unary() => {
            let rhs = stack.pop().ok_or(Error::MalformedPostfix { position })?;
            unary(*op, rhs)
         },
         PostfixToken::Operator(op) => {
            let rhs = stack.pop().ok_or(Error::MalformedPostfix { position })?;
            let lhs = stack.pop().ok_or(Error::MalformedPostfix { position })?;
            binary(*op, lhs, rhs)
         },
      };
      stack.push(value);
   }

   let result = stack.pop().ok_or(Error::MalformedPostfix { position: postfix.len() })?;
   if stack.is_empty() {
      Ok(result)
   } else {
      Err(Error::MalformedPostfix { position: postfix.len() })
   }
}

/// A validated sort expression, ready to score records and to be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct SortExpression {
   /// Fully parenthesized rendering, e.g. `(INT - DEX)`.
   pub canonical: String,
   /// Display label: the canonical form without its outermost brackets.
   pub label:     String,
   pub score:     ScoreExpr,
}

impl SortExpression {
   pub fn evaluate(&self, item: &crate::types::ItemRecord) -> f64 {
      self.score.evaluate(item)
   }
}

/// Parses `source` and compiles it into both a scorer and a label.
pub fn compile_sort(source: &str) -> Result<SortExpression> {
   let postfix = to_postfix(source)?;
   if postfix.is_empty() {
      return Err(ExpressionError::EmptyExpression.into());
   }

   let canonical = pretty::canonical(&postfix)?;
   let label = pretty::strip_outer_brackets(&canonical).to_string();
   let score = compile::compile(&postfix)?;

   tracing::debug!(expression = source, label = %label, "compiled sort expression");
   Ok(SortExpression { canonical, label, score })
}

#[cfg(test)]
mod tests {
   use proptest::prelude::*;

   use super::*;
   use crate::types::fixtures::{boosts, record};

   fn expression_error(source: &str) -> ExpressionError {
      match compile_sort(source) {
         Err(Error::Expression(err)) => err,
         other => panic!("expected expression error for {source:?}, got {other:?}"),
      }
   }

   #[test]
   fn test_fold_postfix_counts() {
      let postfix = vec![
         PostfixToken::Operand("a".into()),
         PostfixToken::Operand("b".into()),
         PostfixToken::Operator(Operator::Sub),
         PostfixToken::Operator(Operator::Neg),
      ];
      let value = fold_postfix(
         &postfix,
         |name| if name == "a" { 5 } else { 2 },
         |_, v| -v,
         |op, l, r| if op == Operator::Add { l + r } else { l - r },
      )
      .unwrap();
      assert_eq!(value, -3);
   }

   #[test]
   fn test_fold_postfix_rejects_malformed() {
      let underflow = vec![PostfixToken::Operator(Operator::Add)];
      assert!(matches!(
         fold_postfix(&underflow, |_| 0, |_, v| v, |_, l, r| l + r),
         Err(Error::MalformedPostfix { position: 0 })
      ));

      let leftover = vec![PostfixToken::Operand("a".into()), PostfixToken::Operand("b".into())];
      assert!(matches!(
         fold_postfix(&leftover, |_| 0, |_, v| v, |_, l, r| l + r),
         Err(Error::MalformedPostfix { position: 2 })
      ));
   }

   #[test]
   fn test_labels_are_canonical() {
      let a = compile_sort("int-dex").unwrap();
      let b = compile_sort(" INT - DEX ").unwrap();
      assert_eq!(a.canonical, "(INT - DEX)");
      assert_eq!(a.canonical, b.canonical);
      assert_eq!(a.label, "INT - DEX");
      assert_eq!(b.label, "INT - DEX");
   }

   #[test]
   fn test_unary_minus_scores() {
      let expr = compile_sort("-str+int").unwrap();
      let mut item = record("blade of awe", 10);
      item.bonuses = boosts(&[("str", 5), ("int", 3)]);
      assert_eq!(expr.evaluate(&item), -2.0);
      assert_eq!(expr.label, "(-STR) + INT");
   }

   #[test]
   fn test_rejections() {
      assert_eq!(expression_error("a+b+c+d+e+f+g"), ExpressionError::TooManyOperators);
      assert_eq!(expression_error("-a+b+c+d+e+f"), ExpressionError::TooManyOperators);
      assert!(matches!(expression_error("int+int"), ExpressionError::DuplicateOperand(_)));
      assert_eq!(expression_error("(int+dex"), ExpressionError::UnbalancedBrackets);
      assert_eq!(expression_error("int+dex)"), ExpressionError::UnbalancedBrackets);
      assert_eq!(expression_error("()"), ExpressionError::EmptyBrackets);
      assert_eq!(expression_error("int*2"), ExpressionError::InvalidCharacter('*'));
      assert_eq!(expression_error("   "), ExpressionError::EmptyExpression);
   }

   #[test]
   fn test_operand_spacing_is_collapsed() {
      let expr = compile_sort("magic   def - fire").unwrap();
      assert_eq!(expr.label, "Magic Def - Fire Res");
   }

   proptest! {
      #[test]
      fn accepted_expressions_always_fold(source in "[a-c ()+\\-]{0,16}") {
         match compile_sort(&source) {
            Ok(expr) => {
               prop_assert!(!expr.label.is_empty());
               let _ = expr.evaluate(&record("blade of awe", 10));
            },
            Err(Error::Expression(_)) => {},
            Err(other) => prop_assert!(false, "unexpected failure {other:?} for {source:?}"),
         }
      }
   }
}
