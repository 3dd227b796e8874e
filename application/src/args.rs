//! [`Args`] definitions.

use clap::{Parser, Subcommand};

/// Server of the Click & Buy property listing.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Command`] to run instead of serving HTTP requests.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// One-off command.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates the first administrator, if no user is registered yet.
    CreateAdmin {
        /// Name of the administrator.
        #[arg(long)]
        name: String,

        /// Surname of the administrator.
        #[arg(long)]
        surname: String,

        /// Email of the administrator.
        #[arg(long)]
        email: String,

        /// Password of the administrator.
        #[arg(long)]
        password: String,
    },
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{Args, Command};

    #[test]
    fn defaults_to_serving() {
        let args = Args::try_parse_from(["app"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(args.command.is_none());
    }

    #[test]
    fn parses_create_admin() {
        let args = Args::try_parse_from([
            "app",
            "--config",
            "prod.toml",
            "create-admin",
            "--name",
            "Jane",
            "--surname",
            "Doe",
            "--email",
            "jane@example.com",
            "--password",
            "hunter22",
        ])
        .unwrap();

        assert_eq!(args.config, "prod.toml");
        let Some(Command::CreateAdmin { email, .. }) = args.command else {
            panic!("expected `create-admin` command");
        };
        assert_eq!(email, "jane@example.com");
    }
}
