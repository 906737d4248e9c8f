use clap::Parser;
use std::time::Duration;

use crate::game::chat::{DEFAULT_BODY_LIMIT, DEFAULT_CHAT_CAPACITY};
use crate::game::timer::DEFAULT_TURN_BUDGET;

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about = "Two-player chess table over websockets")]
pub struct Args {
    /// Address to bind the HTTP server to
    #[clap(short = 'H', long, env = "CHESS_TABLE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[clap(short, long, env = "CHESS_TABLE_PORT", default_value = "8080")]
    pub port: u16,

    /// Time each side gets per move before forfeiting, in milliseconds
    #[clap(long, env = "CHESS_TABLE_TURN_BUDGET_MS", default_value = "60000")]
    pub turn_budget_ms: u64,
}

impl Args {
    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn table_config(&self) -> TableConfig {
        TableConfig {
            turn_budget: Duration::from_millis(self.turn_budget_ms),
            ..TableConfig::default()
        }
    }
}

/// Tunables of the game table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub turn_budget: Duration,
    pub chat_capacity: usize,
    pub chat_body_limit: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            turn_budget: DEFAULT_TURN_BUDGET,
            chat_capacity: DEFAULT_CHAT_CAPACITY,
            chat_body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chess_table"]).unwrap();
        assert_eq!(args.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(args.table_config(), TableConfig::default());
        assert_eq!(TableConfig::default().turn_budget, Duration::from_secs(60));
    }

    #[test]
    fn test_turn_budget_flag() {
        let args = Args::try_parse_from(["chess_table", "--turn-budget-ms", "1500", "-p", "9000"]).unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(args.table_config().turn_budget, Duration::from_millis(1500));
        assert_eq!(args.table_config().chat_capacity, 50);
    }
}
