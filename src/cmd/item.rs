use anyhow::Result;
use console::style;
use itemdex::{
   Error,
   commands::{self, ItemRequest},
   config::Config,
   format::ItemCard,
};
use serde::Serialize;

use super::Output;

#[derive(Debug, Serialize)]
struct JsonOutput {
   query: String,
   fuzzy: bool,
   #[serde(skip_serializing_if = "Option::is_none")]
   item:  Option<ItemCard>,
}

pub async fn execute(config: &Config, command: &str, input: &str, output: Output) -> Result<()> {
   let ItemRequest { name, hints } = match commands::parse_item_request(command, input) {
      Ok(request) => request,
      Err(err) => {
         if !output.json {
            println!("{}", commands::usage(command));
         }
         return Err(Error::from(err).into());
      },
   };

   let search = super::load_engine(config, output).await?;
   let lookup = search.lookup(&name, &hints).await?;

   if output.json {
      let json = JsonOutput {
         fuzzy: lookup.as_ref().is_some_and(|l| l.fuzzy),
         item:  lookup.as_ref().map(|l| ItemCard::new(&l.item, &l.similar)),
         query: name,
      };
      println!("{}", serde_json::to_string(&json)?);
      return Ok(());
   }

   let Some(lookup) = lookup else {
      if output.plain {
         println!("No item was found");
      } else {
         println!("{}", style("No item was found").dim());
      }
      return Ok(());
   };

   print_card(&ItemCard::new(&lookup.item, &lookup.similar), output.plain);
   Ok(())
}

fn print_card(card: &ItemCard, plain: bool) {
   if plain {
      println!("{}", card.title);
      println!("{}", card.url);
   } else {
      println!("{}", style(&card.title).bold().cyan());
      println!("{}", style(&card.url).dim().underlined());
   }

   for line in &card.description {
      println!("{line}");
   }

   for field in &card.fields {
      println!();
      if plain {
         println!("{}", field.name);
      } else {
         println!("{}", style(&field.name).bold());
      }
      println!("{}", field.value);
   }

   if let Some(image) = &card.image {
      println!();
      println!("{image}");
   }
   if let Some(footer) = &card.footer {
      println!();
      if plain {
         println!("{footer}");
      } else {
         println!("{}", style(footer).dim().italic());
      }
   }
}
