use crate::models::{Difficulty, Question, QuestionKind};

const CURATED: usize = 8;
const BANK_SIZE: u64 = 60;

fn mcq(
    id: u64,
    subject: &str,
    text: &str,
    options: [&str; 4],
    correct_answer: usize,
    difficulty: Difficulty,
    explanation: &str,
) -> Question {
    Question {
        id,
        subject: subject.to_string(),
        text: text.to_string(),
        kind: QuestionKind::Mcq {
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer,
        },
        difficulty,
        explanation: explanation.to_string(),
    }
}

fn sample_subject(id: u64) -> &'static str {
    match id % 4 {
        0 => "Physics",
        1 => "Chemistry",
        2 => "Mathematics",
        _ => "Architectural Aptitude",
    }
}

/// Built-in static bank used when generation is unavailable.
pub fn builtin_questions() -> Vec<Question> {
    let mut questions = Vec::with_capacity(BANK_SIZE as usize);

    questions.push(mcq(
        1,
        "Architectural Aptitude",
        "Which architectural style is characterized by pointed arches, ribbed vaults, and flying buttresses?",
        ["Romanesque", "Gothic", "Renaissance", "Baroque"],
        1,
        Difficulty::Easy,
        "Gothic architecture is known for its verticality and light, achieved through pointed arches, ribbed vaults, and flying buttresses.",
    ));
    questions.push(mcq(
        2,
        "Architectural Aptitude",
        "Who designed the Fallingwater house in Pennsylvania?",
        ["Le Corbusier", "Frank Lloyd Wright", "Mies van der Rohe", "Zaha Hadid"],
        1,
        Difficulty::Easy,
        "Fallingwater was designed by Frank Lloyd Wright in 1935 and is a masterpiece of organic architecture.",
    ));
    questions.push(mcq(
        3,
        "Physics",
        "The characteristic distance at which quantum gravitational effects are significant, the Planck length, can be determined from combination of G, h, and c. Which is correct?",
        ["G h^2 c^3", "sqrt(Gh/c^3)", "G^2 h c", "h^2 c / G"],
        1,
        Difficulty::Hard,
        "The Planck length is defined as sqrt(Gh/c^3).",
    ));
    questions.push(mcq(
        4,
        "Physics",
        "A wire of length L and resistance R is stretched to twice its length. What is its new resistance?",
        ["R", "2R", "4R", "R/2"],
        2,
        Difficulty::Medium,
        "Resistance R = ρL/A. When length L is doubled, the cross-sectional area A is halved to keep volume constant, resulting in a resistance of 4R.",
    ));
    questions.push(mcq(
        5,
        "Mathematics",
        "Find the derivative of f(x) = sin(x^2).",
        ["cos(x^2)", "2x cos(x^2)", "2 sin(x) cos(x)", "-2x cos(x^2)"],
        1,
        Difficulty::Medium,
        "Using the chain rule, the derivative of sin(u) is cos(u) * u'. Here u = x^2, so u' = 2x, making the derivative 2x cos(x^2).",
    ));
    questions.push(mcq(
        6,
        "Mathematics",
        "The value of integral from 0 to pi/2 of sin(x) dx is:",
        ["0", "1", "pi", "1/2"],
        1,
        Difficulty::Easy,
        "The integral of sin(x) is -cos(x). Evaluating from 0 to pi/2 gives [-cos(pi/2)] - [-cos(0)] = 0 - (-1) = 1.",
    ));
    questions.push(mcq(
        7,
        "Chemistry",
        "Which of the following has the highest electronegativity?",
        ["Oxygen", "Fluorine", "Nitrogen", "Chlorine"],
        1,
        Difficulty::Easy,
        "Fluorine is the most electronegative element in the periodic table due to its small size and high effective nuclear charge.",
    ));
    questions.push(mcq(
        8,
        "Chemistry",
        "The oxidation state of Manganese in KMnO4 is:",
        ["+2", "+4", "+6", "+7"],
        3,
        Difficulty::Medium,
        "In KMnO4, Potassium (K) is +1 and Oxygen (O) is -2. Total charge 0 = 1 + Mn + 4(-2) => Mn = +7.",
    ));

    for id in (CURATED as u64 + 1)..=BANK_SIZE {
        questions.push(mcq(
            id,
            sample_subject(id),
            &format!(
                "Sample Question {} for competitive exam practice. What is the logic behind structural integrity in modern high-rise buildings?",
                id
            ),
            ["Option A", "Option B", "Option C", "Option D"],
            0,
            Difficulty::Medium,
            "Structural integrity in high-rise buildings depends on efficient load distribution and wind resistance strategies.",
        ));
    }

    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_is_valid() {
        let questions = builtin_questions();
        assert_eq!(questions.len(), 60);
        assert!(questions.iter().all(|q| q.validate().is_ok()));

        let ids: std::collections::HashSet<_> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), questions.len());
        assert_eq!(questions[8].subject, "Chemistry");
        assert_eq!(questions[59].subject, "Physics");
    }
}
