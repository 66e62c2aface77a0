use serde::{Deserialize, Serialize};

const BUILTIN_PROFILE: &str = include_str!("../assets/profile.json");

/// Everything the page and the assistant know about the portfolio subject.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub headline: String,
    #[serde(default)]
    pub location: Option<String>,
    pub summary: String,
    pub email: String,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Experience {
    pub role: String,
    pub organization: String,
    pub period: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Invalid profile: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Profile {
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The profile compiled into the binary.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_json(BUILTIN_PROFILE)
    }
}
