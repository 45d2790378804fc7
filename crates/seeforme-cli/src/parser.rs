//! Main CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Describe what the camera sees, out loud.
#[derive(Debug, Parser)]
#[command(name = "seeforme")]
#[command(about = "Capture a scene, describe it with a vision model, and speak the description")]
#[command(version)]
pub struct Cli {
    /// Directory for settings, the marker store and downloaded weights
    #[arg(long = "data-dir", env = "SEEFORME_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Inference server base URL
    #[arg(long = "server-url", env = "SEEFORME_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// Vision model identifier
    #[arg(long = "model", env = "SEEFORME_MODEL", global = true)]
    pub model: Option<String>,

    /// Language the description is spoken in (e.g. "Spanish")
    #[arg(long = "language", env = "SEEFORME_LANGUAGE", global = true)]
    pub language: Option<String>,

    /// Image file treated as the camera viewfinder
    #[arg(long = "snapshot", env = "SEEFORME_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Speaking rate multiplier (0.1-2.0)
    #[arg(long = "rate", global = true)]
    pub rate: Option<f32>,

    /// Speak each description as soon as a scan produces it
    #[arg(long = "auto-speak", global = true)]
    pub auto_speak: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "seeforme",
            "--verbose",
            "--language",
            "French",
            "--rate",
            "1.1",
            "languages",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.language.as_deref(), Some("French"));
        assert_eq!(cli.rate, Some(1.1));
        assert!(matches!(cli.command, Some(Commands::Languages)));
    }

    #[test]
    fn test_describe_args() {
        let cli = Cli::parse_from([
            "seeforme",
            "describe",
            "/tmp/door.jpg",
            "--question",
            "What color is the door?",
            "--speak",
        ]);
        let Some(Commands::Describe {
            image,
            question,
            speak,
        }) = cli.command
        else {
            panic!("expected describe");
        };
        assert_eq!(image, PathBuf::from("/tmp/door.jpg"));
        assert_eq!(question.as_deref(), Some("What color is the door?"));
        assert!(speak);
    }
}
