use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use console::style;
use is_terminal::IsTerminal;
use itemdex::{commands::ITEM_COMMAND, config::Config};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "itemdex", version, about = "Look up catalog items and rank them by stats")]
struct Cli {
   /// Config file, defaults to ~/.itemdex/config.toml
   #[arg(long, global = true, env = "ITEMDEX_CONFIG")]
   config: Option<PathBuf>,

   /// Catalog JSON file, overrides the configured one
   #[arg(long, global = true)]
   catalog: Option<PathBuf>,

   /// Print machine-readable JSON
   #[arg(long, global = true)]
   json: bool,

   /// Disable colors and decorations
   #[arg(long, global = true)]
   plain: bool,

   #[command(subcommand)]
   command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
   /// Fetch the details of an item, e.g. `item blade of awe >= 15`
   Item {
      /// Chat command to emulate (`wep`, `helm`, `ring`, ...)
      #[arg(long = "as", default_value = ITEM_COMMAND)]
      command: String,

      #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
      query: Vec<String>,
   },

   /// List items ordered by a stat expression, e.g. `sort "int - dex"`
   Sort {
      #[arg(allow_hyphen_values = true)]
      expression: String,

      /// Lowest scores first
      #[arg(long)]
      asc: bool,

      /// Restrict to the items a chat command would search (`wep`, `helm`, ...)
      #[arg(long = "as", default_value = ITEM_COMMAND)]
      command: String,

      /// Level bound such as `<=50`
      #[arg(long, allow_hyphen_values = true)]
      level: Option<String>,
   },
}

fn init_tracing(config: &Config) {
   let filter = EnvFilter::try_from_default_env()
      .or_else(|_| EnvFilter::try_new(&config.log.filter))
      .unwrap_or_else(|_| EnvFilter::new("warn"));
   tracing_subscriber::fmt()
      .with_env_filter(filter)
      .with_writer(std::io::stderr)
      .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
   let mut config = Config::load(cli.config.as_deref())?;
   if let Some(catalog) = cli.catalog {
      config.catalog = Some(catalog);
   }
   init_tracing(&config);

   let output = cmd::Output {
      json:  cli.json,
      plain: cli.plain || !std::io::stdout().is_terminal(),
   };

   match cli.command {
      Cmd::Item { command, query } => cmd::item::execute(&config, &command, &query.join(" "), output).await,
      Cmd::Sort { expression, asc, command, level } => {
         let options = cmd::sort::SortOptions { ascending: asc, command, level };
         cmd::sort::execute(&config, &expression, options, output).await
      },
   }
}

#[tokio::main]
async fn main() -> ExitCode {
   let cli = Cli::parse();
   match run(cli).await {
      Ok(()) => ExitCode::SUCCESS,
      Err(err) => {
         if let Some(user) = err.downcast_ref::<itemdex::Error>()
            && user.is_user_error()
         {
            eprintln!("{}", style(user).yellow());
            return ExitCode::from(2);
         }
         eprintln!("{} {err:#}", style("error:").red().bold());
         ExitCode::FAILURE
      },
   }
}
