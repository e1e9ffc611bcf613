use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

/// Fraud scoring engine configuration.
#[derive(Debug, Parser)]
#[command(name = "fraudr")]
#[command(about = "Fraud scoring engine combining a learned model with guard-rail rules")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the scoring HTTP service
    Serve(ServeConfig),

    /// Generate a labeled training dataset
    Synth(SynthConfig),
}

/// Configuration for the scoring service.
#[derive(Debug, Clone, Parser)]
pub struct ServeConfig {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "FRAUDR_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to the ONNX model artifact
    #[arg(long, default_value = "model.onnx", env = "FRAUDR_MODEL_PATH")]
    pub model_path: PathBuf,

    /// Path to policy YAML file (built-in defaults when not set)
    #[arg(long, env = "FRAUDR_POLICY_PATH")]
    pub policy_path: Option<PathBuf>,

    /// Intra-op thread count for ONNX inference
    #[arg(long, default_value = "1", env = "FRAUDR_ONNX_THREADS")]
    pub onnx_threads: usize,

    /// Latency budget in milliseconds for the score endpoint
    #[arg(long, default_value = "100", env = "FRAUDR_LATENCY_BUDGET_MS")]
    pub latency_budget_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "FRAUDR_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value = "30", env = "FRAUDR_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,
}

impl ServeConfig {
    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        ServeConfig {
            listen_addr: "0.0.0.0:8080".to_string(),
            model_path: PathBuf::from("model.onnx"),
            policy_path: None,
            onnx_threads: 1,
            latency_budget_ms: 100,
            log_level: "info".to_string(),
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
        }
    }
}

/// Configuration for dataset synthesis.
#[derive(Debug, Clone, Parser)]
pub struct SynthConfig {
    /// Output path for the JSON-lines dataset
    #[arg(long, default_value = "dataset.jsonl", env = "FRAUDR_SYNTH_OUTPUT")]
    pub output: PathBuf,

    /// Number of transactions to generate
    #[arg(long, default_value = "2000000", env = "FRAUDR_SYNTH_POPULATION")]
    pub population: usize,

    /// Number of distinct user profiles
    #[arg(long, default_value = "20000", env = "FRAUDR_SYNTH_USERS")]
    pub users: usize,

    /// RNG seed
    #[arg(long, default_value = "42", env = "FRAUDR_SYNTH_SEED")]
    pub seed: u64,

    /// Path to policy YAML file (built-in defaults when not set)
    #[arg(long, env = "FRAUDR_POLICY_PATH")]
    pub policy_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            output: PathBuf::from("dataset.jsonl"),
            population: 2_000_000,
            users: 20_000,
            seed: 42,
            policy_path: None,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serve_config() {
        let config = ServeConfig::default();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.latency_budget_ms, 100);
        assert_eq!(config.onnx_threads, 1);
        assert!(config.policy_path.is_none());
    }

    #[test]
    fn test_default_synth_config() {
        let config = SynthConfig::default();

        assert_eq!(config.population, 2_000_000);
        assert_eq!(config.users, 20_000);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_duration_helpers() {
        let config = ServeConfig {
            shutdown_timeout_secs: 15,
            ..Default::default()
        };

        assert_eq!(config.shutdown_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_cli_parses_serve() {
        let cli = Cli::parse_from(["fraudr", "serve", "--model-path", "fraud.onnx"]);

        match cli.command {
            Command::Serve(config) => {
                assert_eq!(config.model_path, PathBuf::from("fraud.onnx"));
                assert_eq!(config.listen_addr, "0.0.0.0:8080");
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_cli_parses_synth() {
        let cli = Cli::parse_from(["fraudr", "synth", "--population", "1000", "--seed", "7"]);

        match cli.command {
            Command::Synth(config) => {
                assert_eq!(config.population, 1_000);
                assert_eq!(config.seed, 7);
                assert_eq!(config.users, 20_000);
            }
            _ => panic!("expected synth command"),
        }
    }
}
