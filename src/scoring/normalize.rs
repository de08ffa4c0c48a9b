const IMAGE_PLACEHOLDER: &str = "<image>";
const IMAGE_PLACEHOLDER_LINE: &str = "\n<image>";

pub const AFFIRMATIVE: &str = "yes";

pub fn ground_truth_question(raw: &str) -> String {
    raw.replace(IMAGE_PLACEHOLDER_LINE, "")
        .replace(IMAGE_PLACEHOLDER, "")
        .trim()
        .to_string()
}

pub fn prediction_question(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn ground_truth_answer(raw: &str) -> String {
    raw.to_lowercase()
}

pub fn prediction_response(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).to_string()
}

pub fn is_affirmative(normalized: &str) -> bool {
    normalized == AFFIRMATIVE
}
