// Entrypoint for the `coriolis` binary.
// - Keeps `main` small: resolve settings, build a client and hand the parsed
//   command to the UI layer.

use clap::Parser;
use log::debug;

use coriolis_cli::ui::{self, Cli};
use coriolis_cli::{Client, Config};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v when set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load()?;
    cli.apply_to(&mut config);
    ui::prompt_for_token(&mut config)?;
    debug!("using API at {}", config.url);

    let mut client = Client::new(&config)?;
    if cli.legacy {
        client = client.legacy();
    }
    ui::run(&cli.command, &client)
}
