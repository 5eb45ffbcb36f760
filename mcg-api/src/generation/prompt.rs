//! Prompt construction for flashcard generation

/// System instruction sent alongside every generation prompt
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that generates flashcards from notes.";

/// Build the user prompt for a set of notes
///
/// The notes are embedded verbatim at the end of the prompt, never truncated.
/// The requested shape is an object wrapping the card array under
/// `flashcards`, which is what the JSON-object response mode can return.
pub fn build_prompt(notes: &str) -> String {
    format!(
        r#"Generate flashcards from the following notes.
Each flashcard should have a question on the front and the answer on the back.
Return a JSON object with a single field "flashcards" whose value is a JSON array of objects.
Each object must have exactly two string fields: "front" and "back".

Format example:
{{
  "flashcards": [
    {{"front": "What is X?", "back": "X is Y"}},
    {{"front": "What is the capital of France?", "back": "Paris"}}
  ]
}}

Notes:
{notes}
"#
    )
}
