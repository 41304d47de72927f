//! Content store: the static, read-only portfolio data.
//!
//! Loaded once from TOML at startup and shared as `Arc<ContentStore>`.
//! Nothing mutates it afterwards; the page renderer, the API and the
//! assistant's grounding document all read from the same instance.

pub mod context_doc;
pub mod filter;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Account handle used by the external feeds.
    #[serde(default)]
    pub nickname: String,
    pub title: String,
    pub location: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: String,
    pub summary: String,
    #[serde(default)]
    pub resume_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyHighlight {
    pub metric: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub logo: String,
    /// Free-form range, e.g. `"Apr 2024 – Present"`.
    pub period: String,
    pub location: String,
    /// Achievement bullets.
    pub description: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    Backend,
    Frontend,
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Full-Stack")]
    FullStack,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 4] = [
        ProjectCategory::Backend,
        ProjectCategory::Frontend,
        ProjectCategory::Ai,
        ProjectCategory::FullStack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectCategory::Backend => "Backend",
            ProjectCategory::Frontend => "Frontend",
            ProjectCategory::Ai => "AI",
            ProjectCategory::FullStack => "Full-Stack",
        }
    }

    /// Case-insensitive parse of a category label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub category: ProjectCategory,
    pub tech: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    /// Source repository link.
    pub link: String,
    #[serde(default)]
    pub live_demo_url: Option<String>,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub skills: Vec<String>,
}

/// How strong one core technology is, on a `0..=100` scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proficiency {
    pub subject: String,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProficiencyLevel {
    Expert,
    Advanced,
    Proficient,
    Intermediate,
    Beginner,
}

impl ProficiencyLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => ProficiencyLevel::Expert,
            80..=89 => ProficiencyLevel::Advanced,
            60..=79 => ProficiencyLevel::Proficient,
            40..=59 => ProficiencyLevel::Intermediate,
            _ => ProficiencyLevel::Beginner,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProficiencyLevel::Expert => "Expert",
            ProficiencyLevel::Advanced => "Advanced",
            ProficiencyLevel::Proficient => "Proficient",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Beginner => "Beginner",
        }
    }
}

impl Proficiency {
    pub fn level(&self) -> ProficiencyLevel {
        ProficiencyLevel::from_score(self.score)
    }

    pub fn label(&self) -> &'static str {
        self.level().label()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub period: String,
    #[serde(default)]
    pub cgpa: String,
    #[serde(default)]
    pub coursework: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub link: String,
    #[serde(default)]
    pub credential_id: Option<String>,
    #[serde(default)]
    pub logo: String,
}

/// Everything the site knows about its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStore {
    pub profile: Profile,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub highlights: Vec<KeyHighlight>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Flat skill inventory used in the grounding document.
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
    /// Grouped skills rendered on the page and searched by visitors.
    #[serde(default)]
    pub skill_groups: Vec<SkillCategory>,
    /// Core strengths shown as the proficiency chart.
    #[serde(default)]
    pub proficiency: Vec<Proficiency>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub education: Education,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

impl ContentStore {
    /// Read and validate the content TOML at `path`.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Content(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&raw)
            .map_err(|e| AppError::Content(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(raw: &str) -> Result<Self, AppError> {
        let store: ContentStore =
            toml::from_str(raw).map_err(|e| AppError::Content(format!("parse error: {e}")))?;
        store.validate()?;
        Ok(store)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.profile.name.trim().is_empty() {
            return Err(AppError::Content("profile name must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for p in &self.projects {
            if !seen.insert(p.title.to_lowercase()) {
                return Err(AppError::Content(format!("duplicate project title: {}", p.title)));
            }
        }
        if let Some(p) = self.proficiency.iter().find(|p| p.score > 100) {
            return Err(AppError::Content(format!("proficiency score for {} exceeds 100", p.subject)));
        }
        Ok(())
    }
}
