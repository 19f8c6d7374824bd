use std::collections::HashSet;

use smallvec::SmallVec;

use super::{MAX_OPERATORS, Operator, PostfixToken};
use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
   Open,
   Close,
   Plus,
   Minus,
   Operand(String),
}

const fn is_operand_start(c: char) -> bool {
   c.is_ascii_lowercase() || c == '?'
}

const fn is_operand_char(c: char) -> bool {
   is_operand_start(c) || c == ' '
}

/// Splits `source` into brackets, operators and operand names.
///
/// Operand names may contain inner spaces (`magic def`); runs of spaces are
/// collapsed to one. Letters are matched case-insensitively.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
   let chars: Vec<char> = source.trim().chars().map(|c| c.to_ascii_lowercase()).collect();
   let mut tokens = Vec::new();
   let mut seen = HashSet::new();
   let mut operators = 0;
   let mut i = 0;

   while i < chars.len() {
      let c = chars[i];
      match c {
         ' ' => {},
         '+' | '-' => {
            operators += 1;
            if operators > MAX_OPERATORS {
               return Err(ExpressionError::TooManyOperators);
            }
            tokens.push(if c == '+' { Token::Plus } else { Token::Minus });
         },
         '(' => tokens.push(Token::Open),
         ')' => tokens.push(Token::Close),
         c if is_operand_start(c) => {
            let start = i;
            while i < chars.len() && is_operand_char(chars[i]) {
               i += 1;
            }
            let raw: String = chars[start..i].iter().collect();
            let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if !seen.insert(name.clone()) {
               return Err(ExpressionError::DuplicateOperand(name));
            }
            tokens.push(Token::Operand(name));
            continue;
         },
         other => return Err(ExpressionError::InvalidCharacter(other)),
      }
      i += 1;
   }

   Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
   Open,
   Op(Operator),
}

/// Operator stack for the shunting-yard conversion. Expressions are capped at
/// a handful of operators, so it never spills to the heap in practice.
#[derive(Debug, Default)]
struct OperatorStack {
   items: SmallVec<[Pending; 8]>,
}

impl OperatorStack {
   fn push(&mut self, item: Pending) {
      self.items.push(item);
   }

   /// Pops operators binding at least as tightly as `op`.
   fn pop_tighter(&mut self, op: Operator, output: &mut Vec<PostfixToken>) {
      while let Some(&Pending::Op(top)) = self.items.last()
         && top.precedence() >= op.precedence()
      {
         self.items.pop();
         output.push(PostfixToken::Operator(top));
      }
   }

   /// Pops through the nearest open bracket. Fails if there is none.
   fn close_group(&mut self, output: &mut Vec<PostfixToken>) -> Result<(), ExpressionError> {
      while let Some(item) = self.items.pop() {
         match item {
            Pending::Open => return Ok(()),
            Pending::Op(op) => output.push(PostfixToken::Operator(op)),
         }
      }
      Err(ExpressionError::UnbalancedBrackets)
   }

   fn drain(mut self, output: &mut Vec<PostfixToken>) -> Result<(), ExpressionError> {
      while let Some(item) = self.items.pop() {
         match item {
            Pending::Open => return Err(ExpressionError::UnbalancedBrackets),
            Pending::Op(op) => output.push(PostfixToken::Operator(op)),
         }
      }
      Ok(())
   }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
   Open,
   Close,
   Operator,
   Operand,
}

/// Converts infix tokens into postfix, rejecting structurally invalid input.
pub fn tokens_to_postfix(tokens: Vec<Token>) -> Result<Vec<PostfixToken>, ExpressionError> {
   let mut output = Vec::with_capacity(tokens.len());
   let mut stack = OperatorStack::default();
   let mut last: Option<Last> = None;

   for token in tokens {
      match token {
         Token::Open => {
            match last {
               Some(Last::Close) => return Err(ExpressionError::OpenAfterClose),
               Some(Last::Operand) => return Err(ExpressionError::OpenAfterOperand),
               _ => {},
            }
            stack.push(Pending::Open);
            last = Some(Last::Open);
         },
         Token::Close => {
            match last {
               Some(Last::Operator) => return Err(ExpressionError::CloseAfterOperator),
               Some(Last::Open) => return Err(ExpressionError::EmptyBrackets),
               _ => {},
            }
            stack.close_group(&mut output)?;
            last = Some(Last::Close);
         },
         Token::Plus | Token::Minus => {
            let prefix = matches!(last, None | Some(Last::Open | Last::Operator));
            let op = match (token, prefix) {
               (Token::Plus, true) => continue,
               (Token::Minus, true) => Operator::Neg,
               (Token::Plus, false) => Operator::Add,
               _ => Operator::Sub,
            };
            // Prefix operators have no left operand yet, so nothing is popped.
            if !prefix {
               stack.pop_tighter(op, &mut output);
            }
            stack.push(Pending::Op(op));
            last = Some(Last::Operator);
         },
         Token::Operand(name) => {
            if last == Some(Last::Close) {
               return Err(ExpressionError::OperandAfterClose);
            }
            output.push(PostfixToken::Operand(name));
            last = Some(Last::Operand);
         },
      }
   }

   if last == Some(Last::Operator) {
      return Err(ExpressionError::TrailingOperator);
   }
   stack.drain(&mut output)?;
   Ok(output)
}

pub fn to_postfix(source: &str) -> Result<Vec<PostfixToken>, ExpressionError> {
   tokens_to_postfix(tokenize(source)?)
}

#[cfg(test)]
mod tests {
   use super::*;

   fn render(postfix: &[PostfixToken]) -> String {
      postfix
         .iter()
         .map(|t| match t {
            PostfixToken::Operand(name) => name.clone(),
            PostfixToken::Operator(Operator::Neg) => "neg".to_string(),
            PostfixToken::Operator(op) => op.symbol().to_string(),
         })
         .collect::<Vec<_>>()
         .join(" ")
   }

   #[test]
   fn test_tokenize() {
      let tokens = tokenize(" Magic Def-(FIRE) ").unwrap();
      assert_eq!(tokens, vec![
         Token::Operand("magic def".into()),
         Token::Minus,
         Token::Open,
         Token::Operand("fire".into()),
         Token::Close,
      ]);
   }

   #[test]
   fn test_tokenize_limits() {
      assert!(tokenize("a+b+c+d+e+f").is_ok());
      assert_eq!(tokenize("a+b+c+d+e+f+g"), Err(ExpressionError::TooManyOperators));
      assert_eq!(tokenize("-a+b+c+d+e+f"), Err(ExpressionError::TooManyOperators));
      assert!(tokenize("--a+b+c+d").is_ok());
      assert_eq!(tokenize("int\t+dex"), Err(ExpressionError::InvalidCharacter('\t')));
      assert_eq!(tokenize("fire + Fire"), Err(ExpressionError::DuplicateOperand("fire".into())));
   }

   #[test]
   fn test_precedence_and_associativity() {
      assert_eq!(render(&to_postfix("a - b + c").unwrap()), "a b - c +");
      assert_eq!(render(&to_postfix("a - (b + c)").unwrap()), "a b c + -");
      assert_eq!(render(&to_postfix("-a + b").unwrap()), "a neg b +");
      assert_eq!(render(&to_postfix("a + -b").unwrap()), "a b neg +");
   }

   #[test]
   fn test_repeated_prefix_operators() {
      assert_eq!(render(&to_postfix("--a").unwrap()), "a neg neg");
      assert_eq!(render(&to_postfix("+a").unwrap()), "a");
      assert_eq!(render(&to_postfix("a++b").unwrap()), "a b +");
   }

   #[test]
   fn test_structural_errors() {
      assert_eq!(to_postfix("(a)(b)"), Err(ExpressionError::OpenAfterClose));
      assert_eq!(to_postfix("a(b)"), Err(ExpressionError::OpenAfterOperand));
      assert_eq!(to_postfix("(a-)"), Err(ExpressionError::CloseAfterOperator));
      assert_eq!(to_postfix("(+)"), Err(ExpressionError::EmptyBrackets));
      assert_eq!(to_postfix("(a)b"), Err(ExpressionError::OperandAfterClose));
      assert_eq!(to_postfix("a +"), Err(ExpressionError::TrailingOperator));
      assert_eq!(to_postfix(")a"), Err(ExpressionError::UnbalancedBrackets));
      assert_eq!(to_postfix("((a)"), Err(ExpressionError::UnbalancedBrackets));
   }
}
