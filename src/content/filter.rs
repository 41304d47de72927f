//! Visitor-side filtering of projects and skills.
//!
//! Pure and synchronous: recomputed on every query. An empty result is a
//! normal outcome.

use std::fmt;

use super::{Project, ProjectCategory, SkillCategory};

/// Category selector for the projects section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ProjectCategory),
}

impl CategoryFilter {
    /// Parse `"All"` or a category label, case-insensitively. Empty input
    /// means `All`.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        ProjectCategory::from_label(label).map(CategoryFilter::Only)
    }

    pub fn matches(self, category: ProjectCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    /// Every selector in display order, `All` first.
    pub fn choices() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(ProjectCategory::ALL.into_iter().map(CategoryFilter::Only))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => f.write_str(c.label()),
        }
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Does `project` satisfy the free-text `query`?
///
/// Matches title, description, any tag or any technology.
pub fn project_matches(project: &Project, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    contains_ci(&project.title, &q)
        || contains_ci(&project.description, &q)
        || project.tags.iter().any(|t| contains_ci(t, &q))
        || project.tech.iter().any(|t| contains_ci(t, &q))
}

/// Projects matching both the category selector and the query, in their
/// original order.
pub fn filter_projects<'a>(
    projects: &'a [Project],
    category: CategoryFilter,
    query: &str,
) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| category.matches(p.category) && project_matches(p, query))
        .collect()
}

/// Skill categories reduced to the labels containing `query`.
///
/// Relative order inside each category is kept; categories left empty are
/// dropped. An empty query returns everything.
pub fn filter_skills(categories: &[SkillCategory], query: &str) -> Vec<SkillCategory> {
    if query.is_empty() {
        return categories.to_vec();
    }
    let q = query.to_lowercase();
    categories
        .iter()
        .filter_map(|cat| {
            let skills: Vec<String> = cat
                .skills
                .iter()
                .filter(|s| contains_ci(s, &q))
                .cloned()
                .collect();
            (!skills.is_empty()).then(|| SkillCategory {
                name: cat.name.clone(),
                icon: cat.icon.clone(),
                skills,
            })
        })
        .collect()
}
