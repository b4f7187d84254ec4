//! Grounding prompt assembly.
//!
//! The template wording is a behavioural contract with the language model.
//! Any change to the wording must bump [`PROMPT_VERSION`].

/// Version of the grounding template and [`FALLBACK_ANSWER`].
///
/// Version 1 is an English rendering of the Portuguese template and fallback
/// phrase used by earlier deployments; models answer in the prompt's language,
/// so answers change language along with it.
pub const PROMPT_VERSION: u32 = 1;

/// Placed between retrieved chunks in the context section.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// What the model is told to say when the context lacks the answer.
pub const FALLBACK_ANSWER: &str =
    "Based on the provided documents, I could not find information about this.";

/// Build the prompt for `question` grounded on `chunks`, in the given order.
///
/// An empty `chunks` slice yields an empty context section; the instruction
/// then steers the model to the fallback answer.
pub fn build_prompt<S: AsRef<str>>(question: &str, chunks: &[S]) -> String {
    let context = chunks.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(CONTEXT_SEPARATOR);
    format!(
        "\
You are an assistant specialised in answering questions based on a provided context.
Use ONLY the information in the context below to write your answer.
If the answer is not in the context, say \"{FALLBACK_ANSWER}\"

Context:
{context}

---

User question: {question}

Answer:
"
    )
}
