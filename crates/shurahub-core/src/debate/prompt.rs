//! Prompt builders for the three debate stages.
//!
//! Each builder embeds earlier stage output verbatim; later stages are only
//! built once the earlier text is final.

use std::fmt::Write as _;

use super::context::ContextEntry;

/// Opener prompt: the raw question, followed by a recap of earlier exchanges
/// in this session when there are any.
pub fn opener(user_text: &str, history: &[&ContextEntry]) -> String {
    if history.is_empty() {
        return user_text.to_string();
    }

    let mut prompt = String::from(user_text);
    prompt.push_str("\n\nFor context, earlier in this conversation:\n");
    for entry in history {
        let _ = write!(
            prompt,
            "\nQ: {}\nA: {}\n",
            entry.question(),
            entry.answer()
        );
    }
    prompt
}

/// Critiquer prompt: challenge and improve the opener's answer.
pub fn critique(user_text: &str, opener_model: &str, opener_text: &str) -> String {
    format!(
        "Your colleague, {opener_model}, has responded to the user. Your task is to critique \
         their response and offer a better, more refined alternative. Directly address their \
         points.\n\n\
         User's query: \"{user_text}\"\n\n\
         {opener_model}'s response: \"{opener_text}\""
    )
}

/// Synthesizer prompt: judge the exchange and give one definitive, cited answer.
pub fn synthesis(
    user_text: &str,
    opener_model: &str,
    opener_text: &str,
    critiquer_model: &str,
    critiquer_text: &str,
) -> String {
    format!(
        r#"You are the final judge in a debate between two AI colleagues, {opener_model} and {critiquer_model}, who are responding to a user's query. Your task is to synthesize their discussion and provide the single best possible answer to the user.

User's Query: "{user_text}"

**The Debate:**

**{opener_model} said:** "{opener_text}"

**{critiquer_model} critiqued and added:** "{critiquer_text}"

IMPORTANT INSTRUCTIONS FOR YOUR RESPONSE:
1. Provide a clear, definitive answer to the user's query
2. Include inline citation markers to show which arguments influenced your decision:
   - Use [O1], [O2], [O3] etc. when referencing {opener_model}'s arguments
   - Use [C1], [C2], [C3] etc. when referencing {critiquer_model}'s arguments
3. After your main answer, include a "Citations:" section that lists each marker with the specific quote

Example format:
"You should choose option A[O1] because of its scalability[O2], though option B has better performance[C1] in some cases."

Citations:
[O1]: "Option A is the industry standard"
[O2]: "A scales to millions of users easily"
[C1]: "B benchmarks 40% faster on initial load"

Now provide your final answer with citations:"#
    )
}
