//! Subcommand definitions.

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Interactive scanner: type `scan`, `speak`, `flip`, `new` or `quit`
    Run,

    /// Describe a single image file
    Describe {
        /// Image to describe
        image: PathBuf,

        /// Ask a specific question about the image instead of describing it
        #[arg(short = 'q', long)]
        question: Option<String>,

        /// Also speak the answer
        #[arg(short = 's', long)]
        speak: bool,
    },

    /// List voices offered by the speech engine
    Voices,

    /// List supported speech languages
    Languages,
}
