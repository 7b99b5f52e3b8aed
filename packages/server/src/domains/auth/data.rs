use chrono::{DateTime, Utc};
use juniper::GraphQLObject;

use super::actions::Session;
use super::models::{NextView, QuizQuestion, UserProfile, UserRole};
use crate::common::{LearningStyle, Mode};

/// User GraphQL data type
#[derive(Debug, Clone, GraphQLObject)]
#[graphql(description = "A registered student, university or company account")]
pub struct UserData {
    pub email: String,
    pub name: String,
    /// Absent when the stored profile has no recognizable role
    pub role: Option<UserRole>,
    pub institution_name: Option<String>,
    pub onboarding_completed: bool,
    pub learning_style: Option<LearningStyle>,
    pub career: Option<String>,
    pub university: Option<String>,
    pub location: Option<String>,
    pub interests: Vec<String>,
    pub group_preference: Option<Mode>,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserData {
    fn from(profile: UserProfile) -> Self {
        let role = profile.role();
        let onboarding = profile.onboarding;
        Self {
            email: profile.email.to_string(),
            name: profile.name,
            role,
            institution_name: profile.institution_name,
            onboarding_completed: profile.onboarding_completed,
            learning_style: onboarding.as_ref().map(|o| o.learning_style),
            career: onboarding.as_ref().map(|o| o.career.clone()),
            university: onboarding.as_ref().map(|o| o.university.clone()),
            location: onboarding.as_ref().map(|o| o.location.clone()),
            interests: onboarding
                .as_ref()
                .map(|o| o.interests.clone())
                .unwrap_or_default(),
            group_preference: onboarding.as_ref().map(|o| o.group_preference),
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Clone, GraphQLObject)]
pub struct SessionData {
    /// Bearer token for the Authorization header
    pub token: String,
    pub user: UserData,
    pub next_view: NextView,
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: UserData::from(session.profile),
            next_view: session.next_view,
        }
    }
}

#[derive(Debug, Clone, GraphQLObject)]
pub struct QuizOptionData {
    pub text: String,
    pub style: LearningStyle,
}

#[derive(Debug, Clone, GraphQLObject)]
pub struct QuizQuestionData {
    /// 1-based position; answers are submitted in this order
    pub number: i32,
    pub prompt: String,
    pub options: Vec<QuizOptionData>,
}

impl QuizQuestionData {
    pub fn from_question(index: usize, question: &QuizQuestion) -> Self {
        Self {
            number: index as i32 + 1,
            prompt: question.prompt.to_string(),
            options: question
                .options
                .iter()
                .map(|(text, style)| QuizOptionData {
                    text: text.to_string(),
                    style: *style,
                })
                .collect(),
        }
    }
}
