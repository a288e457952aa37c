//! System instruction text sent with every model request.

use crate::adaptive::types::LearningProfile;
use crate::settings::UserSettings;

const PERSONA: &str = "You are Gabu, a friendly and patient homework tutor. \
Explain step by step, check understanding, and never just hand over the final answer \
without showing how to get there.";

/// Build the system instruction from the learner's settings and, when
/// available, their adaptive profile.
pub fn build_system_instruction(
    settings: &UserSettings,
    profile: Option<&LearningProfile>,
) -> String {
    let mut lines = vec![PERSONA.to_string()];

    let name = settings.name.trim();
    if !name.is_empty() {
        lines.push(format!("The student's name is {name}."));
    }
    lines.push(format!(
        "Pitch explanations at a {} level.",
        settings.grade_level.trim()
    ));
    lines.push(format!("Always reply in {}.", settings.language.trim()));

    if let Some(profile) = profile {
        lines.push(format!(
            "The student learns best with a {} style at a {} pace.",
            profile.learning_style.as_str(),
            profile.preferred_pace.as_str()
        ));
        if !profile.weaknesses.is_empty() {
            lines.push(format!(
                "They find these subjects harder: {}. Go slower there.",
                profile.weaknesses.join(", ")
            ));
        }
        if !profile.strengths.is_empty() {
            lines.push(format!(
                "They are strong in: {}.",
                profile.strengths.join(", ")
            ));
        }
        if !profile.interests.is_empty() {
            lines.push(format!(
                "Use examples drawn from their interests when it helps: {}.",
                profile.interests.join(", ")
            ));
        }
    }

    lines.join("\n")
}

/// Instruction for quiz generation requests.
pub fn quiz_request(topic: &str, count: usize) -> String {
    format!(
        "Create a {count}-question multiple-choice quiz about \"{topic}\". \
Each question has exactly 4 options, one correct answer given by its zero-based index, \
and a one or two sentence explanation."
    )
}

/// Instruction for diagram generation requests.
pub fn illustration_request(description: &str) -> String {
    format!(
        "Draw a clear, labeled educational diagram for a student: {description}. \
After the image, list the labels you used on one line starting with \"Labels:\"."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_without_profile_uses_settings() {
        let settings = UserSettings {
            name: "Mia".into(),
            ..UserSettings::default()
        };
        let text = build_system_instruction(&settings, None);
        assert!(text.contains("Mia"));
        assert!(text.contains("middle school"));
        assert!(text.contains("English"));
        assert!(!text.contains("pace"));
    }

    #[test]
    fn instruction_mentions_weak_subjects() {
        let profile = LearningProfile {
            weaknesses: vec!["Math".into()],
            ..LearningProfile::default()
        };
        let text = build_system_instruction(&UserSettings::default(), Some(&profile));
        assert!(text.contains("harder: Math"));
        assert!(!text.contains("student's name"));
    }
}
