//! Checks on the shipped content and prompt files.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use folio::chat::prompt::system_instruction;
use folio::content::context_doc::context_document;
use folio::content::filter::{filter_projects, CategoryFilter};
use folio::content::{ContentStore, ProjectCategory};

fn shipped() -> ContentStore {
    ContentStore::load_from(Path::new("content/portfolio.toml")).unwrap()
}

#[test]
fn shipped_content_is_valid() {
    let store = shipped();
    assert!(!store.profile.name.is_empty());
    assert_eq!(store.projects.len(), 7);
    assert_eq!(store.skill_groups.len(), 5);
    assert_eq!(store.certifications.len(), 2);
    assert_eq!(store.proficiency.len(), 10);
    assert!(store.proficiency.iter().all(|p| p.score <= 100));
}

#[test]
fn every_category_has_projects() {
    let store = shipped();
    for category in ProjectCategory::ALL {
        let found = filter_projects(&store.projects, CategoryFilter::Only(category), "");
        assert!(!found.is_empty(), "{category}");
    }
}

#[test]
fn prompt_files_carry_placeholders() {
    let persona = fs::read_to_string("config/prompts/persona.md").unwrap();
    assert!(persona.contains("{{owner}}"));
    assert!(persona.contains("{{today}}"));
    let guidelines = fs::read_to_string("config/prompts/guidelines.md").unwrap();
    assert!(guidelines.contains("{{context}}"));
}

#[test]
fn system_instruction_from_shipped_prompts() {
    let store = shipped();
    let context = context_document(&store);
    let today = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
    let prompt = system_instruction(Path::new("config/prompts"), "Abhishek Tiwari", today, &context);

    assert!(prompt.starts_with("You are a helpful and friendly AI assistant representing Abhishek Tiwari."));
    assert!(prompt.contains("The current date is June 3, 2025."));
    assert!(prompt.contains("PeopleStrong"));
    assert!(!prompt.contains("{{"));
    // The context document is inserted exactly once, after the guidelines.
    assert_eq!(prompt.matches(&context).count(), 1);
    assert!(prompt.find("Response Guidelines").unwrap() < prompt.find(&context).unwrap());
}

#[test]
fn default_config_parses() {
    let cfg = folio::config::load_from(Path::new("config/default.toml"), Default::default()).unwrap();
    assert_eq!(cfg.chat.prompts_dir, Path::new("config/prompts"));
    assert_eq!(cfg.content_path, Path::new("content/portfolio.toml"));
    assert!(cfg.feeds.medium_endpoint().contains("medium.com/feed/@Abhishektiwari"));
    assert!(!cfg.activity.enabled);
}
