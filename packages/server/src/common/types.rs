// Value types shared by several domains (events, jobs, groups, onboarding)

use anyhow::Result;
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a student learns best; also used to tag catalog entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
}

impl LearningStyle {
    /// Declaration order; ties in quiz scoring resolve toward the later entry.
    pub const ALL: [LearningStyle; 3] = [
        LearningStyle::Visual,
        LearningStyle::Auditory,
        LearningStyle::Kinesthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStyle::Visual => "visual",
            LearningStyle::Auditory => "auditory",
            LearningStyle::Kinesthetic => "kinesthetic",
        }
    }
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStyle {
    type Err = anyhow::Error;

    // Legacy documents carry the Spanish spellings.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" | "auditivo" => Ok(LearningStyle::Auditory),
            "kinesthetic" | "kinestesico" => Ok(LearningStyle::Kinesthetic),
            _ => Err(anyhow::anyhow!("Invalid learning style: {}", s)),
        }
    }
}

/// Where an activity takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    InPerson,
    Virtual,
    /// Groups only; as a student preference it means "either"
    Hybrid,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::InPerson => "in_person",
            Mode::Virtual => "virtual",
            Mode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "in_person" | "presencial" => Ok(Mode::InPerson),
            "virtual" => Ok(Mode::Virtual),
            "hybrid" | "ambos" => Ok(Mode::Hybrid),
            _ => Err(anyhow::anyhow!("Invalid mode: {}", s)),
        }
    }
}
