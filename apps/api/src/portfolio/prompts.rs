// LLM prompt constants for portfolio generation.

/// System prompt — enforces JSON-only output.
pub const PORTFOLIO_SYSTEM: &str = "You are a copywriter drafting personal portfolio sites. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Portfolio prompt template. Replace `{answers_json}` before sending.
pub const PORTFOLIO_PROMPT_TEMPLATE: &str = r#"You are generating copy for a personal portfolio site. Use the user's answers to draft concise, premium-sounding content.
Keep it SHORT. Each item should be 2–6 words max. Each section title 1–3 words. Bio 1–2 sentences.
Return ONLY valid JSON with this shape:
{
  "name": string,
  "headline": string,
  "bio": string,
  "sections": [{ "title": string, "items": string[] }],
  "callToAction": string
}
Use at most 4 sections with at most 3 items each.
User answers:
{answers_json}"#;
