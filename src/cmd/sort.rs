use anyhow::Result;
use console::style;
use itemdex::{
   Error,
   commands,
   config::Config,
   error::FilterError,
   expr::compile_sort,
   listing::{Direction, Listing},
   retrieve::LevelFilter,
};

use super::Output;

#[derive(Debug, Clone)]
pub struct SortOptions {
   pub ascending: bool,
   pub command:   String,
   pub level:     Option<String>,
}

fn parse_level_bound(bound: &str) -> Result<LevelFilter, FilterError> {
   match commands::split_level_filter(bound)? {
      ("", Some(filter)) => Ok(filter),
      _ => Err(FilterError::InvalidLevelFilter),
   }
}

pub async fn execute(
   config: &Config,
   expression: &str,
   options: SortOptions,
   output: Output,
) -> Result<()> {
   let expression = compile_sort(expression)?;
   let mut hints = commands::command_hints(&options.command).map_err(Error::from)?;
   if let Some(bound) = &options.level {
      hints.level = Some(parse_level_bound(bound).map_err(Error::from)?);
   }

   let mut listing_options = config.listing_options();
   if options.ascending {
      listing_options.direction = Direction::Ascending;
   }

   let search = super::load_engine(config, output).await?;
   let listing = search.sort_listing(&expression, &hints, &listing_options).await?;

   if output.json {
      println!("{}", serde_json::to_string(&listing)?);
      return Ok(());
   }
   print_listing(&listing, output.plain);
   Ok(())
}

fn print_listing(listing: &Listing, plain: bool) {
   let order = match listing.direction {
      Direction::Ascending => "ascending",
      Direction::Descending => "descending",
   };
   let header = format!("Sorted by {} ({order})", listing.label);

   if plain {
      println!("{header}");
   } else {
      println!("{}", style(header).bold());
   }

   if !listing.is_empty() {
      println!("{}", listing.render());
   } else if !listing.truncated {
      println!("No items matched");
      return;
   }

   if listing.truncated {
      if plain {
         println!("(more results omitted)");
      } else {
         println!("{}", style("(more results omitted)").dim());
      }
   }
}

#[cfg(test)]
mod tests {
   use itemdex::store::CmpOp;

   use super::*;

   #[test]
   fn test_parse_level_bound() {
      assert_eq!(parse_level_bound("<=50"), Ok(LevelFilter { op: CmpOp::Le, value: 50.0 }));
      assert_eq!(parse_level_bound(">= 10"), Ok(LevelFilter { op: CmpOp::Ge, value: 10.0 }));
      assert_eq!(parse_level_bound("50"), Err(FilterError::InvalidLevelFilter));
      assert_eq!(parse_level_bound("blade < 50"), Err(FilterError::InvalidLevelFilter));
      assert_eq!(parse_level_bound("< 95"), Err(FilterError::LevelOutOfRange));
   }
}
