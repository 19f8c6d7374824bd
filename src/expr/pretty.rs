use super::{PostfixToken, fold_postfix, is_resist};
use crate::{Result, format::capitalize};

fn operand_label(name: &str) -> String {
   if name == "damage" {
      capitalize("avg damage")
   } else if is_resist(name) {
      capitalize(&format!("{name} res"))
   } else {
      capitalize(name)
   }
}

/// Fully parenthesized rendering of a postfix expression.
pub fn canonical(postfix: &[PostfixToken]) -> Result<String> {
   fold_postfix(
      postfix,
      operand_label,
      |op, inner| format!("({}{inner})", op.symbol()),
      |op, lhs, rhs| format!("({lhs} {} {rhs})", op.symbol()),
   )
}

/// Removes one enclosing bracket pair, if present.
pub fn strip_outer_brackets(text: &str) -> &str {
   text.strip_prefix('(').and_then(|t| t.strip_suffix(')')).unwrap_or(text)
}
