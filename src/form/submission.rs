use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hard cap on story length. Counted client-side and re-checked here.
pub const MAX_STORY_WORDS: u32 = 250;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 5;

/// One student's story entry as persisted in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub full_name: String,
    pub form_class: String,
    pub story: String,
    pub word_count: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Submission request from the public form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub form_class: String,
    #[serde(default)]
    pub story: String,
    /// Client-computed and advisory: checked against the cap but never
    /// recomputed from the story text. Absent on the wire means 0.
    #[serde(default)]
    pub word_count: u32,
}

/// Validates a submission request
pub fn validate_submission(req: &SubmitRequest) -> Result<(), String> {
    if req.full_name.trim().is_empty()
        || req.form_class.trim().is_empty()
        || req.story.trim().is_empty()
    {
        return Err("All fields are required.".to_string());
    }

    if req.word_count > MAX_STORY_WORDS {
        return Err("Story exceeds the 250 word limit.".to_string());
    }

    Ok(())
}

/// Builds a persisted record from a validated request. The id and the
/// timestamp are fixed here and never change afterwards.
pub fn build_submission(req: SubmitRequest) -> Submission {
    Submission {
        id: new_submission_id(),
        full_name: req.full_name,
        form_class: req.form_class,
        story: req.story,
        word_count: req.word_count,
        submitted_at: Utc::now(),
    }
}

/// Generates an opaque submission id: the millisecond timestamp rendered in
/// base 36, followed by five random base-36 characters.
pub fn new_submission_id() -> String {
    let mut id = to_base36(Utc::now().timestamp_millis().unsigned_abs());
    let mut rng = rand::thread_rng();
    for _ in 0..ID_SUFFIX_LEN {
        id.push(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    // 13 base-36 digits cover the full u64 range.
    let mut digits = [0u8; 13];
    let mut used = 0;
    while n > 0 {
        digits[used] = ID_ALPHABET[(n % 36) as usize];
        n /= 36;
        used += 1;
    }
    let mut out = String::with_capacity(used + ID_SUFFIX_LEN);
    while used > 0 {
        used -= 1;
        out.push(digits[used] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SubmitRequest {
        SubmitRequest {
            full_name: "Ada Lovelace".to_string(),
            form_class: "8C".to_string(),
            story: "Short story text.".to_string(),
            word_count: 3,
        }
    }

    #[test]
    fn accepts_a_valid_request() {
        assert!(validate_submission(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_empty_required_fields() {
        for field in ["full_name", "form_class", "story"] {
            let mut req = valid_request();
            match field {
                "full_name" => req.full_name = "   ".to_string(),
                "form_class" => req.form_class = String::new(),
                _ => req.story = "\n".to_string(),
            }
            let err = validate_submission(&req).unwrap_err();
            assert_eq!(err, "All fields are required.");
        }
    }

    #[test]
    fn word_count_boundary_is_inclusive() {
        let mut req = valid_request();
        req.word_count = MAX_STORY_WORDS;
        assert!(validate_submission(&req).is_ok());

        req.word_count = MAX_STORY_WORDS + 1;
        let err = validate_submission(&req).unwrap_err();
        assert_eq!(err, "Story exceeds the 250 word limit.");
    }

    #[test]
    fn missing_word_count_deserializes_to_zero_and_passes() {
        let req: SubmitRequest = serde_json::from_str(
            r#"{"fullName":"Ada Lovelace","formClass":"8C","story":"Short story text."}"#,
        )
        .unwrap();
        assert_eq!(req.word_count, 0);
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn build_sets_id_and_timestamp() {
        let submission = build_submission(valid_request());
        assert!(!submission.id.is_empty());
        assert_eq!(submission.full_name, "Ada Lovelace");
        assert!(submission.submitted_at <= Utc::now());
    }

    #[test]
    fn ids_are_base36_and_distinct() {
        let ids: Vec<String> = (0..50).map(|_| new_submission_id()).collect();
        for id in &ids {
            assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
            assert!(id.len() > ID_SUFFIX_LEN);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let submission = build_submission(valid_request());
        let value = serde_json::to_value(&submission).unwrap();
        for key in ["id", "fullName", "formClass", "story", "wordCount", "submittedAt"] {
            assert!(value.get(key).is_some(), "missing wire field {key}");
        }
    }
}
