//! Prompt construction and response cleanup.

/// Control tokens some chat templates leak into the generated text.
pub const END_OF_TURN_TOKENS: &[&str] = &[
    "<|im_end|>",
    "<end_of_turn>",
    "<|eot_id|>",
    "<|endoftext|>",
    "</s>",
];

const DESCRIBE_PROMPT: &str = "Describe what you see in this image in detail. \
Be specific and descriptive about the objects, scene, colors, and layout. \
Write naturally as if describing it to someone who can't see the image.";

/// Build the prompt for one analysis.
///
/// A non-blank `question` gets a question-answering prompt that pushes the
/// model towards concrete colors, counts and identification; otherwise the
/// model is asked for a general scene description.
pub fn build_prompt(question: Option<&str>) -> String {
    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(question) => format!(
            "Look at this image and answer the following question: \"{question}\"\n\n\
             Be specific and detailed in your answer. \
             If the question asks about colors, describe the exact colors you see. \
             If it asks about objects, identify them clearly. \
             If it asks about quantities, count them. \
             If it asks about the weather or environment, describe what you can observe from the image."
        ),
        None => DESCRIBE_PROMPT.to_owned(),
    }
}

/// Strip end-of-turn control tokens and surrounding whitespace.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.to_owned();
    for token in END_OF_TURN_TOKENS {
        if text.contains(token) {
            text = text.replace(token, "");
        }
    }
    text.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_question_uses_describe_prompt() {
        assert_eq!(build_prompt(None), DESCRIBE_PROMPT);
        assert_eq!(build_prompt(Some("   ")), DESCRIBE_PROMPT);
    }

    #[test]
    fn question_is_quoted_into_prompt() {
        let prompt = build_prompt(Some(" How many cups are on the table? "));
        assert!(prompt.starts_with(
            "Look at this image and answer the following question: \"How many cups are on the table?\""
        ));
        assert!(prompt.contains("count them"));
        assert!(prompt.contains("exact colors"));
    }

    #[test]
    fn cleanup_strips_control_tokens_and_whitespace() {
        assert_eq!(
            clean_response("  A red bicycle leaning on a wall.<|im_end|>\n"),
            "A red bicycle leaning on a wall."
        );
        assert_eq!(
            clean_response("Two dogs<end_of_turn><|im_end|>"),
            "Two dogs"
        );
    }

    #[test]
    fn cleanup_of_only_tokens_is_empty() {
        assert_eq!(clean_response("<|im_end|> </s>"), "");
    }
}
