//! Keyword-based subject inference for free-text topics.

const MATH_KEYWORDS: &[&str] = &[
    "math", "algebra", "geometry", "calculus", "equation", "fraction", "decimal",
    "multiplication", "multiply", "division", "divide", "times", "number", "arithmetic",
    "trigonometry", "statistics", "percent",
];

const SCIENCE_KEYWORDS: &[&str] = &[
    "science", "physics", "chemistry", "biology", "atom", "molecule", "cell", "energy",
    "force", "planet", "photosynthesis", "ecosystem", "gravity",
];

const ENGLISH_KEYWORDS: &[&str] = &[
    "english", "grammar", "writing", "reading", "vocabulary", "literature", "essay",
    "poem", "poetry", "spelling", "sentence", "noun", "verb",
];

pub const GENERAL: &str = "General";

/// Map a topic to `Math`, `Science`, `English`, or [`GENERAL`]. Lists are
/// checked in that order; the first hit wins.
pub fn infer_subject(topic: &str) -> &'static str {
    let topic = topic.to_lowercase();
    let hit = |words: &[&str]| words.iter().any(|w| topic.contains(w));

    if hit(MATH_KEYWORDS) {
        "Math"
    } else if hit(SCIENCE_KEYWORDS) {
        "Science"
    } else if hit(ENGLISH_KEYWORDS) {
        "English"
    } else {
        GENERAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_keywords() {
        assert_eq!(infer_subject("Adding Fractions"), "Math");
        assert_eq!(infer_subject("What is 7 times 8?"), "Math");
        assert_eq!(infer_subject("Photosynthesis in plants"), "Science");
        assert_eq!(infer_subject("Essay structure"), "English");
        assert_eq!(infer_subject("World War II"), GENERAL);
    }
}
