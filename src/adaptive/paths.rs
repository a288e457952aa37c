//! Built-in learning path catalog, seeded into the store on first use.

use super::types::{Difficulty, LearningPath};

struct PathSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    subject: &'static str,
    difficulty: Difficulty,
    topics: &'static [&'static str],
    estimated_hours: u32,
}

const CATALOG: &[PathSeed] = &[
    PathSeed {
        id: "math-foundations",
        title: "Math Foundations",
        description: "Number sense, multiplication tables, and fractions",
        subject: "Math",
        difficulty: Difficulty::Easy,
        topics: &["Multiplication", "Division", "Fractions"],
        estimated_hours: 10,
    },
    PathSeed {
        id: "algebra-basics",
        title: "Algebra Basics",
        description: "Variables, expressions, and solving linear equations",
        subject: "Math",
        difficulty: Difficulty::Medium,
        topics: &["Variables", "Linear equations", "Inequalities"],
        estimated_hours: 15,
    },
    PathSeed {
        id: "life-science",
        title: "Life Science Explorer",
        description: "Cells, plants, animals, and ecosystems",
        subject: "Science",
        difficulty: Difficulty::Easy,
        topics: &["Cells", "Photosynthesis", "Food chains"],
        estimated_hours: 12,
    },
    PathSeed {
        id: "physics-motion",
        title: "Forces and Motion",
        description: "Physics of speed, gravity, and energy",
        subject: "Science",
        difficulty: Difficulty::Hard,
        topics: &["Speed", "Gravity", "Energy"],
        estimated_hours: 14,
    },
    PathSeed {
        id: "writing-skills",
        title: "Writing Skills",
        description: "Grammar, sentence structure, and essay writing",
        subject: "English",
        difficulty: Difficulty::Medium,
        topics: &["Grammar", "Paragraphs", "Essays"],
        estimated_hours: 10,
    },
    PathSeed {
        id: "world-history",
        title: "World History Highlights",
        description: "Ancient civilizations through the modern era",
        subject: "General",
        difficulty: Difficulty::Medium,
        topics: &["Ancient Egypt", "Middle Ages", "Industrial Revolution"],
        estimated_hours: 12,
    },
];

pub fn default_paths() -> Vec<LearningPath> {
    CATALOG
        .iter()
        .map(|seed| LearningPath {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            subject: seed.subject.to_string(),
            difficulty: seed.difficulty,
            topics: seed.topics.iter().map(|t| t.to_string()).collect(),
            estimated_hours: seed.estimated_hours,
            progress: 0.0,
        })
        .collect()
}

/// Loose match between a stated interest and a path: either string contains
/// the other, case-insensitively, in the title or description.
pub fn path_matches_interest(path: &LearningPath, interest: &str) -> bool {
    let interest = interest.trim().to_lowercase();
    if interest.is_empty() {
        return false;
    }
    let title = path.title.to_lowercase();
    let description = path.description.to_lowercase();
    title.contains(&interest)
        || description.contains(&interest)
        || interest.contains(&title)
}
