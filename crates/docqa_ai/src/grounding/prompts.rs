use docqa_core::domain::Fact;

/// Strict-grounding paraphrase prompt: rules, the facts as `- (source) content` lines, the question.
pub fn build_prompt(facts: &[Fact], question: &str, refusal_sentence: &str) -> String {
    let context = facts
        .iter()
        .map(|f| format!("- ({}) {}", f.source, f.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI assistant answering questions strictly from internal construction documents.

RULES (MANDATORY):
- Use ONLY the information present in the CONTEXT.
- Do NOT add assumptions, explanations, or inferred details.
- Do NOT combine unrelated sections.
- Do NOT invent roles, penalties, systems, or policies.
- If the answer is not explicitly stated, respond exactly:
  "{refusal_sentence}"

CONTEXT:
{context}

QUESTION:
{question}

ANSWER (direct, factual, minimal):"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_only_given_facts_with_sources() {
        let facts = vec![
            Fact::new("payments.md", "Payments are released in five milestone stages"),
            Fact::new("warranty.md", "Premier homes carry a ten year structural warranty"),
        ];
        let p = build_prompt(&facts, "how are payments released", "Not stated.");
        assert!(p.contains("- (payments.md) Payments are released in five milestone stages\n- (warranty.md)"));
        assert!(p.contains("respond exactly:\n  \"Not stated.\""));
        assert!(p.trim_end().ends_with("ANSWER (direct, factual, minimal):"));
        assert!(p.contains("QUESTION:\nhow are payments released"));
    }
}
