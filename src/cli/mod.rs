//! Command-line interface for storypage.

pub mod commands;

use clap::{Parser, Subcommand};

/// storypage - a single-page story site with an admin dashboard
#[derive(Parser)]
#[command(name = "storypage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the web server (default)
    Serve,

    /// Write a default config.toml and initialize the database
    Init,

    /// Set a user's password, read from stdin
    Passwd {
        /// Account to change
        username: String,
    },

    /// List users with their roles and magic links
    #[command(alias = "ls")]
    Users,

    /// Regenerate a user's magic link and print it
    Link {
        /// Account whose link is replaced
        username: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["storypage"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["storypage", "passwd", "admin"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Passwd {
                username: "admin".to_string()
            })
        );

        let cli = Cli::try_parse_from(["storypage", "ls"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Users));

        assert!(Cli::try_parse_from(["storypage", "link"]).is_err());
    }
}
