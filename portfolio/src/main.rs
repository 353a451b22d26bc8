use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use portfolio::commands::{contact::ContactCommand, email::EmailCommand, serve::serve};
use portfolio_config::DEFAULT_CONFIG_PATH;
use portfolio_utils::portfolio_version;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_BIN_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    init_tracing();

    let config = portfolio_config::load(&cli.config).context("Failed to load config")?;

    match cli.command {
        Command::Serve => serve(config).await?,
        Command::Contact(command) => command.invoke(config).await?,
        Command::Email { command } => command.invoke(config).await?,
        Command::CheckConfig { verbose } => {
            verbose.then(|| println!("{config:#?}"));
        }
        Command::Completion { .. } => unreachable!(),
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version = portfolio_version())]
struct Cli {
    /// Config files to load, later files override earlier ones
    #[arg(
        long,
        global = true,
        env = "PORTFOLIO_CONFIG",
        value_delimiter = ',',
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: Vec<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the mail relay http server
    #[command(aliases(["run", "start", "s"]))]
    Serve,
    /// Submit a message through the contact form
    #[command(aliases(["c"]))]
    Contact(ContactCommand),
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Validate configuration
    CheckConfig {
        /// Print a debug representation of the config
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    #[cfg(tracing_pretty)]
    let fmt_layer = fmt_layer.pretty();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(EnvFilter::from_default_env()))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn contact_arguments() {
        let cli = Cli::try_parse_from([
            "portfolio",
            "contact",
            "--name",
            "Jane Doe",
            "--email",
            "jane@gmail.com",
            "--subject",
            "Hi",
            "--message",
            "Loved your portfolio!",
        ])
        .unwrap();

        assert_eq!(cli.config, [PathBuf::from(DEFAULT_CONFIG_PATH)]);
        assert!(matches!(cli.command, Command::Contact(_)));
    }

    #[test]
    fn multiple_config_files() {
        let cli =
            Cli::try_parse_from(["portfolio", "check-config", "--config", "a.toml,b.toml"]).unwrap();

        assert_eq!(cli.config, [PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
    }
}
