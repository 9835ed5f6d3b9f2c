//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Manage Piper voices, whisper models and cloned voices, and speak text.
#[derive(Parser)]
#[command(name = "voxkit")]
#[command(about = "Local voice assets and speech synthesis")]
#[command(version)]
pub struct Cli {
    /// Override the data directory for this invocation
    #[arg(long = "data-dir", global = true, env = "VOXKIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CloneCommand, VoicesCommand, WhisperCommand};
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["voxkit", "--verbose", "--data-dir", "/tmp/vox", "paths"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/vox")));
        assert!(matches!(cli.command, Some(Commands::Paths)));
    }

    #[test]
    fn test_speak_args() {
        let cli = Cli::parse_from([
            "voxkit", "speak", "hello there", "--voice", "en_GB-alan-medium", "--speed", "1.5",
        ]);
        let Some(Commands::Speak {
            text, voice, speed, out,
        }) = cli.command
        else {
            panic!("expected speak");
        };
        assert_eq!(text, "hello there");
        assert_eq!(voice.as_deref(), Some("en_GB-alan-medium"));
        assert_eq!(speed, Some(1.5));
        assert_eq!(out, PathBuf::from("speech.wav"));
    }

    #[test]
    fn test_nested_subcommands() {
        let cli = Cli::parse_from(["voxkit", "voices", "remove", "custom:mine"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Voices(VoicesCommand::Remove { ref key })) if key == "custom:mine"
        ));

        let cli = Cli::parse_from(["voxkit", "whisper", "install", "small.en"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Whisper(WhisperCommand::Install { ref key })) if key == "small.en"
        ));

        let cli = Cli::parse_from([
            "voxkit", "clone", "import", "talk.mp4", "--name", "Host", "--start", "1.5", "--end",
            "9",
        ]);
        let Some(Commands::Clone(CloneCommand::Import {
            start, end, language, ..
        })) = cli.command
        else {
            panic!("expected clone import");
        };
        assert!((start - 1.5).abs() < f64::EPSILON);
        assert!((end - 9.0).abs() < f64::EPSILON);
        assert_eq!(language, "en");
    }
}
