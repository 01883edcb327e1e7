//! Parsing of model output into a structured summary.
//!
//! Models are asked for bare JSON but routinely wrap it in markdown code
//! fences, prepend commentary, or get truncated mid-object. Parsing never
//! fails: anything that does not decode into the full structure becomes a
//! narrative-only summary carrying the raw text.

use tracing::debug;

use medibridge_core::types::ConsultationSummary;

/// Interpret a raw model response as a [`ConsultationSummary`].
pub fn parse_summary(raw: &str) -> ConsultationSummary {
    let body = strip_code_fence(raw).trim();

    match serde_json::from_str::<ConsultationSummary>(body) {
        Ok(summary) => summary,
        Err(err) => {
            debug!(error = %err, "model response is not summary JSON, keeping narrative");
            ConsultationSummary::narrative_only(raw.trim())
        }
    }
}

/// Strip a markdown code fence from `raw`, if present.
///
/// Handles a leading `json` language tag and an unterminated fence (the
/// model ran out of tokens before closing it). Without a fence the input
/// is returned unchanged.
fn strip_code_fence(raw: &str) -> &str {
    let Some(open) = raw.find("```") else {
        return raw;
    };

    let mut body = &raw[open + 3..];
    if let Some(rest) = body.strip_prefix("json") {
        body = rest;
    }

    match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "symptoms": ["headache", "nausea"],
        "diagnoses": ["migraine"],
        "medications": ["sumatriptan 50mg"],
        "followup_actions": ["return in two weeks"],
        "full_text": "Patient reports recurring headaches."
    }"#;

    #[test]
    fn test_parse_bare_json() {
        let summary = parse_summary(VALID_JSON);
        assert_eq!(summary.symptoms, vec!["headache", "nausea"]);
        assert_eq!(summary.diagnoses, vec!["migraine"]);
        assert_eq!(summary.full_text, "Patient reports recurring headaches.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID_JSON);
        assert_eq!(parse_summary(&fenced), parse_summary(VALID_JSON));
    }

    #[test]
    fn test_parse_fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", VALID_JSON);
        assert_eq!(parse_summary(&fenced), parse_summary(VALID_JSON));
    }

    #[test]
    fn test_parse_unterminated_fence() {
        let fenced = format!("```json\n{}", VALID_JSON);
        assert_eq!(parse_summary(&fenced), parse_summary(VALID_JSON));
    }

    #[test]
    fn test_fence_with_surrounding_commentary() {
        let wrapped = format!("Here is the summary:\n```json\n{}\n```\nLet me know!", VALID_JSON);
        assert_eq!(parse_summary(&wrapped), parse_summary(VALID_JSON));
    }

    #[test]
    fn test_prose_falls_back_to_narrative() {
        let prose = "The patient seems to have a migraine and should rest.";
        let summary = parse_summary(prose);

        assert!(summary.symptoms.is_empty());
        assert!(summary.diagnoses.is_empty());
        assert!(summary.medications.is_empty());
        assert!(summary.followup_actions.is_empty());
        assert_eq!(summary.full_text, prose);
    }

    #[test]
    fn test_missing_field_falls_back_to_narrative() {
        // No full_text field, so the structure is incomplete.
        let partial = r#"{"symptoms": ["cough"], "diagnoses": [], "medications": [], "followup_actions": []}"#;
        let summary = parse_summary(partial);

        assert!(summary.symptoms.is_empty());
        assert_eq!(summary.full_text, partial);
    }

    #[test]
    fn test_truncated_json_falls_back_to_narrative() {
        let truncated = r#"```json
{"symptoms": ["headache"], "diagnoses": ["mi"#;
        let summary = parse_summary(truncated);

        assert!(summary.symptoms.is_empty());
        assert_eq!(summary.full_text, truncated);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let extra = r#"{
            "symptoms": [],
            "diagnoses": [],
            "medications": [],
            "followup_actions": [],
            "full_text": "Routine checkup.",
            "confidence": 0.93
        }"#;
        let summary = parse_summary(extra);
        assert_eq!(summary.full_text, "Routine checkup.");
    }

    #[test]
    fn test_fallback_preserves_raw_text_trimmed() {
        let summary = parse_summary("  not json at all  \n");
        assert_eq!(summary.full_text, "not json at all");
    }
}
