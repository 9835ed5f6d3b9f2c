//! Main commands enum and its subcommand groups.

use std::path::PathBuf;

use clap::Subcommand;

/// Available voxkit commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths for all voxkit directories
    Paths,

    /// Browse the remote Piper voice catalog
    Catalog {
        /// Ignore the cached copy and fetch again
        #[arg(long)]
        refresh: bool,
        /// Only show voices whose language code starts with this (e.g. "en", "de_DE")
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Manage installed Piper voices
    #[command(subcommand)]
    Voices(VoicesCommand),

    /// Manage the Piper engine
    #[command(subcommand)]
    Piper(PiperCommand),

    /// Synthesize text to a WAV file with Piper
    Speak {
        /// Text to speak
        text: String,
        /// Voice key (defaults to the selected voice)
        #[arg(long)]
        voice: Option<String>,
        /// Speed multiplier, 1.0 = normal (defaults to the saved speed)
        #[arg(long)]
        speed: Option<f32>,
        /// Where to write the audio
        #[arg(short, long, default_value = "speech.wav")]
        out: PathBuf,
    },

    /// Manage whisper.cpp transcription models
    #[command(subcommand)]
    Whisper(WhisperCommand),

    /// Transcribe an audio file with whisper.cpp
    Transcribe {
        /// Audio file to transcribe
        audio: PathBuf,
        /// Model key (defaults to the selected model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage XTTS cloned voices
    #[command(subcommand)]
    Clone(CloneCommand),
}

/// Piper voice management.
#[derive(Subcommand)]
pub enum VoicesCommand {
    /// List installed voices
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a voice from the catalog
    Install {
        /// Catalog key (e.g. "en_US-lessac-medium")
        key: String,
    },

    /// Import a Piper model (.onnx with its .onnx.json next to it)
    Import {
        /// Model file; prompts for one when omitted
        model: Option<PathBuf>,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Remove a downloaded or imported voice
    Remove {
        /// Voice key ("custom:<name>" for imported voices)
        key: String,
    },

    /// Make a voice the default for `speak`
    Select {
        /// Voice key
        key: String,
    },
}

/// Piper engine management.
#[derive(Subcommand)]
pub enum PiperCommand {
    /// Download the Piper release for this (or another) platform
    Install {
        /// Platform id such as "linux-x86_64" (defaults to the running platform)
        #[arg(long)]
        platform: Option<String>,
    },

    /// Show whether Piper is installed and where
    Status,
}

/// Transcription model management.
#[derive(Subcommand)]
pub enum WhisperCommand {
    /// List available models and mark installed ones
    List,

    /// Download a model
    Install {
        /// Model key (e.g. "base.en")
        key: String,
    },

    /// Make an installed model the default
    Select {
        /// Model key
        key: String,
    },

    /// Delete an installed model
    Remove {
        /// Model key
        key: String,
    },

    /// Show installed and selected models
    Status,
}

/// Cloned voice management.
#[derive(Subcommand)]
pub enum CloneCommand {
    /// Create a cloned voice from a reference recording
    Create {
        /// Display name
        name: String,
        /// Reference recording (a clean 3-30 s WAV works best)
        reference: PathBuf,
        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Cut a reference clip out of a longer audio or video file
    Import {
        /// Source media
        media: PathBuf,
        /// Display name
        #[arg(long)]
        name: String,
        /// Clip start in seconds
        #[arg(long)]
        start: f64,
        /// Clip end in seconds
        #[arg(long)]
        end: f64,
        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Download a sample reference voice, or list samples when no id is given
    Sample {
        /// Sample id (e.g. "en_sample")
        id: Option<String>,
    },

    /// List cloned voices
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a cloned voice
    Delete {
        /// Voice id
        id: String,
    },

    /// Speak text in a cloned voice
    Speak {
        /// Voice id
        id: String,
        /// Text to speak
        text: String,
        /// Where to write the audio
        #[arg(short, long, default_value = "clone.wav")]
        out: PathBuf,
        /// Sampling temperature
        #[arg(long)]
        temperature: Option<f32>,
        /// Speed multiplier
        #[arg(long)]
        speed: Option<f32>,
    },
}
