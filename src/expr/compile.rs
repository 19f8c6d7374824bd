use super::{Operator, PostfixToken, fold_postfix, is_bonus};
use crate::{Result, types::ItemRecord};

/// Where an operand's value is read from on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
   /// Mean of the damage range.
   Damage,
   Bonus(String),
   Resist(String),
}

impl Attribute {
   pub fn from_operand(name: &str) -> Self {
      if name == "damage" {
         Self::Damage
      } else if is_bonus(name) {
         Self::Bonus(name.to_string())
      } else {
         Self::Resist(name.to_string())
      }
   }

   /// Missing stats count as zero.
   pub fn read(&self, item: &ItemRecord) -> f64 {
      match self {
         Self::Damage => item.average_damage(),
         Self::Bonus(key) => item.bonus(key).map_or(0.0, f64::from),
         Self::Resist(key) => item.resist(key).map_or(0.0, f64::from),
      }
   }
}

/// Arithmetic tree scoring a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreExpr {
   Attr(Attribute),
   Neg(Box<Self>),
   Add(Box<Self>, Box<Self>),
   Sub(Box<Self>, Box<Self>),
}

impl ScoreExpr {
   pub fn evaluate(&self, item: &ItemRecord) -> f64 {
      match self {
         Self::Attr(attr) => attr.read(item),
         Self::Neg(inner) => -inner.evaluate(item),
         Self::Add(lhs, rhs) => lhs.evaluate(item) + rhs.evaluate(item),
         Self::Sub(lhs, rhs) => lhs.evaluate(item) - rhs.evaluate(item),
      }
   }
}

pub fn compile(postfix: &[PostfixToken]) -> Result<ScoreExpr> {
   fold_postfix(
      postfix,
      |name| ScoreExpr::Attr(Attribute::from_operand(name)),
      |_, inner| ScoreExpr::Neg(Box::new(inner)),
      |op, lhs, rhs| match op {
         Operator::Add => ScoreExpr::Add(Box::new(lhs), Box::new(rhs)),
         _ => ScoreExpr::Sub(Box::new(lhs), Box::new(rhs)),
      },
   )
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::{
      expr::to_postfix,
      types::fixtures::{boosts, record},
   };

   fn score(source: &str, item: &ItemRecord) -> f64 {
      compile(&to_postfix(source).unwrap()).unwrap().evaluate(item)
   }

   #[test]
   fn test_attribute_routing() {
      assert_eq!(Attribute::from_operand("damage"), Attribute::Damage);
      assert_eq!(Attribute::from_operand("magic def"), Attribute::Bonus("magic def".into()));
      assert_eq!(Attribute::from_operand("fire"), Attribute::Resist("fire".into()));
   }

   #[test]
   fn test_evaluate() {
      let mut item = record("frostscythe", 75);
      item.damage = vec![20, 31];
      item.bonuses = boosts(&[("int", 6), ("crit", 2)]);
      item.resists = boosts(&[("ice", 10), ("fire", -5)]);

      assert_eq!(score("damage", &item), 25.5);
      assert_eq!(score("int - (ice + fire)", &item), 1.0);
      assert_eq!(score("-fire - dex", &item), 5.0);
      assert_eq!(score("crit + luk + water", &item), 2.0);
   }
}
