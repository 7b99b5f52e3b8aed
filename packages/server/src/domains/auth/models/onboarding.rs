//! Student onboarding: a six question V-A-K learning-style quiz followed by
//! personal details and group preferences.

use juniper::GraphQLInputObject;
use serde::{Deserialize, Serialize};

use crate::common::{LearningStyle, Mode, ValidationErrors};

/// Minimum number of interests a student must pick
pub const MIN_INTERESTS: usize = 3;

pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: [(&'static str, LearningStyle); 3],
}

pub static LEARNING_QUIZ: [QuizQuestion; 6] = [
    QuizQuestion {
        prompt: "You prefer an instructor who...",
        options: [
            ("Uses diagrams, charts and sketches on the board.", LearningStyle::Visual),
            ("Explains out loud, debates and tells stories.", LearningStyle::Auditory),
            ("Organizes activities, visits or hands-on projects.", LearningStyle::Kinesthetic),
        ],
    },
    QuizQuestion {
        prompt: "When you assemble furniture, you...",
        options: [
            ("Follow the diagrams and pictures in the manual.", LearningStyle::Visual),
            ("Ask someone to read the instructions aloud.", LearningStyle::Auditory),
            ("Just start putting the pieces together.", LearningStyle::Kinesthetic),
        ],
    },
    QuizQuestion {
        prompt: "What helps you remember something best?",
        options: [
            ("Seeing it (a photo, a mental image).", LearningStyle::Visual),
            ("Hearing it (a song, a rhyme, a voice).", LearningStyle::Auditory),
            ("Doing it (writing it, acting it out, moving).", LearningStyle::Kinesthetic),
        ],
    },
    QuizQuestion {
        prompt: "In your free time you prefer...",
        options: [
            ("Watching films, visiting museums or drawing.", LearningStyle::Visual),
            ("Listening to music, podcasts or chatting with friends.", LearningStyle::Auditory),
            ("Sports, dancing, cooking or building something.", LearningStyle::Kinesthetic),
        ],
    },
    QuizQuestion {
        prompt: "When learning a new skill you prefer to:",
        options: [
            ("Watch a video tutorial.", LearningStyle::Visual),
            ("Listen to an expert explain it.", LearningStyle::Auditory),
            ("Try it yourself right away.", LearningStyle::Kinesthetic),
        ],
    },
    QuizQuestion {
        prompt: "How do you best remember a person?",
        options: [
            ("By their face.", LearningStyle::Visual),
            ("By their name and the sound of their voice.", LearningStyle::Auditory),
            ("By what they did or how they made you feel.", LearningStyle::Kinesthetic),
        ],
    },
];

/// Pick the most frequent style among quiz answers.
///
/// Ties go to the style declared later in [`LearningStyle::ALL`], so with
/// no answers at all the result is `Kinesthetic`.
pub fn score_learning_style(answers: &[LearningStyle]) -> LearningStyle {
    let count = |style: LearningStyle| answers.iter().filter(|a| **a == style).count();

    LearningStyle::ALL
        .into_iter()
        .fold(LearningStyle::Visual, |best, next| {
            if count(best) > count(next) {
                best
            } else {
                next
            }
        })
}

/// Onboarding answers stored on the user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingProfile {
    pub learning_style: LearningStyle,
    pub test_answers: Vec<LearningStyle>,
    pub name: String,
    pub career: String,
    pub university: String,
    pub location: String,
    pub interests: Vec<String>,
    pub group_preference: Mode,
}

#[derive(Debug, Clone, GraphQLInputObject)]
pub struct CompleteOnboardingInput {
    /// One answer per quiz question, in order
    pub answers: Vec<LearningStyle>,
    pub name: String,
    pub career: String,
    pub university: String,
    pub location: String,
    pub interests: Vec<String>,
    pub group_preference: Option<Mode>,
}

impl CompleteOnboardingInput {
    pub fn validate(self) -> Result<OnboardingProfile, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.answers.len() != LEARNING_QUIZ.len() {
            errors.push(
                "answers",
                format!("all {} quiz questions must be answered", LEARNING_QUIZ.len()),
            );
        }

        errors.require("name", &self.name, "name is required");
        errors.require("career", &self.career, "career is required");
        errors.require("university", &self.university, "university is required");
        errors.require("location", &self.location, "location is required");

        let mut interests: Vec<String> = Vec::new();
        for interest in self.interests.iter().map(|i| i.trim()) {
            if !interest.is_empty() && !interests.iter().any(|i| i == interest) {
                interests.push(interest.to_string());
            }
        }
        if interests.len() < MIN_INTERESTS {
            errors.push(
                "interests",
                format!("select at least {} interests", MIN_INTERESTS),
            );
        }

        if self.group_preference.is_none() {
            errors.push("group_preference", "select a group preference");
        }

        errors.into_result()?;

        Ok(OnboardingProfile {
            learning_style: score_learning_style(&self.answers),
            test_answers: self.answers,
            name: self.name.trim().to_string(),
            career: self.career.trim().to_string(),
            university: self.university.trim().to_string(),
            location: self.location.trim().to_string(),
            interests,
            group_preference: self.group_preference.unwrap_or(Mode::Hybrid),
        })
    }
}
