use std::path::PathBuf;

use thiserror::Error;

use crate::expr::MAX_OPERATORS;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A sort expression the user typed that cannot be compiled.
///
/// Every variant renders as the message shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
   #[error("'{0}' is an invalid sort expression character.")]
   InvalidCharacter(char),
   #[error("Your sort expression cannot have more than {max} operators in it.", max = MAX_OPERATORS)]
   TooManyOperators,
   #[error("Your sort expression cannot use the same operand more than once.")]
   DuplicateOperand(String),
   #[error("Your sort expression is invalid. You cannot have an open bracket right after a close bracket.")]
   OpenAfterClose,
   #[error("Your sort expression is invalid. You cannot have an open bracket right after an operand.")]
   OpenAfterOperand,
   #[error("Your sort expression is invalid. You cannot have a close bracket right after an operator.")]
   CloseAfterOperator,
   #[error("Your sort expression is invalid. Bracket pairs cannot be empty.")]
   EmptyBrackets,
   #[error("Your sort expression is invalid. You cannot have an operand right after a close bracket.")]
   OperandAfterClose,
   #[error("Your sort expression is invalid. You cannot end an expression with an operator.")]
   TrailingOperator,
   #[error("Your sort expression is invalid. Make sure your brackets are balanced correctly.")]
   UnbalancedBrackets,
   #[error("Your sort expression is empty.")]
   EmptyExpression,
}

/// Invalid structured filter input on an item command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
   #[error("Either the operator you used or the number you entered is invalid.")]
   InvalidLevelFilter,
   #[error("The `level` filter must be between 0 and 90.")]
   LevelOutOfRange,
   #[error("The search query cannot contain special characters.")]
   SpecialCharacters,
   #[error("Unknown command '{0}'.")]
   UnknownCommand(String),
   #[error("Give me an item name to look for.")]
   EmptyQuery,
}

#[derive(Debug, Error)]
pub enum Error {
   #[error(transparent)]
   Expression(#[from] ExpressionError),

   #[error(transparent)]
   Filter(#[from] FilterError),

   #[error("store error: {0}")]
   Store(String),

   #[error("search index error: {0}")]
   Index(#[from] tantivy::TantivyError),

   #[error("cannot build name pattern: {0}")]
   Pattern(#[from] regex::Error),

   #[error("malformed postfix expression at token {position}")]
   MalformedPostfix { position: usize },

   #[error("invalid record '{title}': {reason}")]
   InvalidRecord { title: String, reason: &'static str },

   #[error("failed to read catalog {path}: {source}")]
   Catalog {
      path:   PathBuf,
      #[source]
      source: std::io::Error,
   },

   #[error("configuration error: {0}")]
   Config(#[from] Box<figment::Error>),

   #[error(transparent)]
   Io(#[from] std::io::Error),

   #[error(transparent)]
   Json(#[from] serde_json::Error),
}

impl Error {
   /// Whether the error stems from user input and should be echoed back
   /// rather than reported as a fault.
   pub fn is_user_error(&self) -> bool {
      matches!(
         self,
         Self::Expression(_) | Self::Filter(_) | Self::Pattern(regex::Error::CompiledTooBig(_))
      )
   }
}

impl From<figment::Error> for Error {
   fn from(err: figment::Error) -> Self {
      Self::Config(Box::new(err))
   }
}
