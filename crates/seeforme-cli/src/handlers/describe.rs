//! Describe command handler.
//!
//! One-shot analysis of an image file, optionally answering a question about
//! it and speaking the answer.

use std::path::Path;

use anyhow::{Context, Result, bail};
use seeforme_core::domain::{AnalysisRequest, ImageHandle};

use crate::adapters::file_uri;
use crate::bootstrap::CliContext;

pub async fn execute(
    ctx: &CliContext,
    image: &Path,
    question: Option<&str>,
    speak: bool,
) -> Result<()> {
    if !image.is_file() {
        bail!("Image not found: {}", image.display());
    }

    ctx.session
        .ensure_ready()
        .await
        .context("Vision model is not available")?;

    let result = ctx
        .session
        .analyze(build_request(image, question))
        .await
        .context("Scene analysis failed")?;
    println!("{}", result.description);

    if speak && !result.description.trim().is_empty() {
        ctx.speech
            .speak(&result.description, ctx.language())
            .await
            .context("Could not speak the description")?;
    }

    Ok(())
}

fn build_request(image: &Path, question: Option<&str>) -> AnalysisRequest {
    let handle = ImageHandle::new(file_uri(image));
    match question {
        Some(question) => AnalysisRequest::ask(handle, question),
        None => AnalysisRequest::describe(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_becomes_ask_request() {
        let request = build_request(Path::new("/tmp/door.jpg"), Some("What color is it?"));
        assert_eq!(request.image().uri(), "file:///tmp/door.jpg");
        assert_eq!(request.question(), Some("What color is it?"));
    }

    #[test]
    fn blank_question_describes() {
        let request = build_request(Path::new("/tmp/door.jpg"), Some("  "));
        assert_eq!(request.question(), None);

        let request = build_request(Path::new("/tmp/door.jpg"), None);
        assert_eq!(request.question(), None);
    }
}
