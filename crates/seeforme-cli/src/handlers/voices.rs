//! Voices command handler.

use anyhow::{Context, Result};

use crate::bootstrap::CliContext;

/// List the voices the speech engine offers.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let voices = ctx
        .speech
        .list_voices()
        .await
        .context("Is espeak-ng installed?")?;

    if voices.is_empty() {
        println!("No voices available.");
        return Ok(());
    }

    println!("{:<16} {:<10} NAME", "ID", "LANGUAGE");
    for voice in voices {
        println!(
            "{:<16} {:<10} {}",
            voice.identifier, voice.language_tag, voice.display_name
        );
    }
    Ok(())
}
