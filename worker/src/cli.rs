//! CLI argument parsing for the tidywave-worker binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tidywave-worker", about = "Tidywave scheduling and routing worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Seed demo clients with generated schedules and exit
    SeedDemo {
        /// How many demo clients to create
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_migrate_command_parses() {
        let cli = Cli::parse_from(["tidywave-worker", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["tidywave-worker"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_seed_demo_takes_a_count() {
        let cli = Cli::parse_from(["tidywave-worker", "seed-demo", "--count", "4"]);
        match cli.command {
            Some(Command::SeedDemo { count }) => assert_eq!(count, 4),
            _ => panic!("expected seed-demo"),
        }
    }

    #[test]
    fn test_cli_seed_demo_count_defaults() {
        let cli = Cli::parse_from(["tidywave-worker", "seed-demo"]);
        assert!(matches!(cli.command, Some(Command::SeedDemo { count: 10 })));
    }
}
