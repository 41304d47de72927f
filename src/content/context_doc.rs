//! Grounding document for the assistant.
//!
//! Serialises the whole [`ContentStore`] into an XML-like
//! `<portfolio_context>` block that is appended to the system prompt.
//! Every interpolated value is XML-escaped.

use std::fmt::Write;

use quick_xml::escape::escape;

use super::ContentStore;

/// Build the `<portfolio_context>` document.
pub fn context_document(store: &ContentStore) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, store);
    out
}

fn write_document(out: &mut String, store: &ContentStore) -> std::fmt::Result {
    let p = &store.profile;
    writeln!(out, "<portfolio_context>")?;

    writeln!(out, "  <personal_info>")?;
    element(out, 4, "name", &p.name)?;
    element(out, 4, "title", &p.title)?;
    element(out, 4, "location", &p.location)?;
    element(out, 4, "email", &p.email)?;
    element(out, 4, "phone", &p.phone)?;
    element(out, 4, "summary", &p.summary)?;
    element(out, 4, "resume_link", &p.resume_link)?;
    writeln!(out, "  </personal_info>")?;

    writeln!(out, "  <social_links>")?;
    for link in &store.social_links {
        writeln!(out, "    <link name=\"{}\" url=\"{}\" />", escape(link.name.as_str()), escape(link.url.as_str()))?;
    }
    writeln!(out, "  </social_links>")?;

    writeln!(out, "  <key_highlights>")?;
    for h in &store.highlights {
        writeln!(
            out,
            "    <highlight metric=\"{}\">{}</highlight>",
            escape(h.metric.as_str()),
            escape(h.description.as_str())
        )?;
    }
    writeln!(out, "  </key_highlights>")?;

    writeln!(out, "  <experience_history>")?;
    for exp in &store.experience {
        writeln!(out, "    <job>")?;
        element(out, 6, "role", &exp.role)?;
        element(out, 6, "company", &exp.company)?;
        element(out, 6, "period", &exp.period)?;
        element(out, 6, "location", &exp.location)?;
        element(out, 6, "summary", &exp.summary)?;
        writeln!(out, "      <details>")?;
        for point in &exp.description {
            element(out, 8, "point", point)?;
        }
        writeln!(out, "      </details>")?;
        writeln!(out, "    </job>")?;
    }
    writeln!(out, "  </experience_history>")?;

    writeln!(out, "  <projects>")?;
    for project in &store.projects {
        writeln!(out, "    <project>")?;
        element(out, 6, "title", &project.title)?;
        element(out, 6, "category", project.category.label())?;
        element(out, 6, "technologies", &project.tech.join(", "))?;
        element(out, 6, "tags", &project.tags.join(", "))?;
        element(out, 6, "description", &project.description)?;
        element(out, 6, "link", &project.link)?;
        if let Some(demo) = &project.live_demo_url {
            element(out, 6, "live_demo", demo)?;
        }
        writeln!(out, "    </project>")?;
    }
    writeln!(out, "  </projects>")?;

    writeln!(out, "  <skills>")?;
    for cat in &store.skills {
        writeln!(out, "    <category name=\"{}\">", escape(cat.name.as_str()))?;
        for skill in &cat.skills {
            element(out, 6, "skill", skill)?;
        }
        writeln!(out, "    </category>")?;
    }
    writeln!(out, "  </skills>")?;

    let edu = &store.education;
    writeln!(out, "  <education>")?;
    element(out, 4, "degree", &edu.degree)?;
    element(out, 4, "institution", &edu.institution)?;
    element(out, 4, "period", &edu.period)?;
    element(out, 4, "cgpa", &edu.cgpa)?;
    element(out, 4, "coursework", &edu.coursework.join(", "))?;
    writeln!(out, "  </education>")?;

    writeln!(out, "  <certifications>")?;
    for c in &store.certifications {
        writeln!(out, "    <certification>")?;
        element(out, 6, "name", &c.name)?;
        element(out, 6, "issuer", &c.issuer)?;
        element(out, 6, "date", &c.date)?;
        element(out, 6, "id", c.credential_id.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "    </certification>")?;
    }
    writeln!(out, "  </certifications>")?;

    writeln!(out, "  <interests>")?;
    for interest in &store.interests {
        element(out, 4, "interest", interest)?;
    }
    writeln!(out, "  </interests>")?;

    writeln!(out, "</portfolio_context>")
}

fn element(out: &mut String, indent: usize, tag: &str, value: &str) -> std::fmt::Result {
    writeln!(out, "{:indent$}<{tag}>{}</{tag}>", "", escape(value), indent = indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;

    #[test]
    fn document_wraps_all_sections_in_order() {
        let doc = context_document(&fixtures::sample());
        let order = [
            "<portfolio_context>",
            "<personal_info>",
            "<social_links>",
            "<key_highlights>",
            "<experience_history>",
            "<projects>",
            "<skills>",
            "<education>",
            "<certifications>",
            "<interests>",
            "</portfolio_context>",
        ];
        let mut last = 0;
        for tag in order {
            let pos = doc.find(tag).unwrap_or_else(|| panic!("missing {tag}"));
            assert!(pos >= last, "{tag} out of order");
            last = pos;
        }
    }

    #[test]
    fn live_demo_only_when_present() {
        let doc = context_document(&fixtures::sample());
        assert_eq!(doc.matches("<live_demo>").count(), 1);
        assert!(doc.contains("<live_demo>https://demo.example.com</live_demo>"));
    }

    #[test]
    fn missing_credential_reads_na() {
        let doc = context_document(&fixtures::sample());
        assert!(doc.contains("<id>N/A</id>"));
    }

    #[test]
    fn text_is_escaped() {
        let doc = context_document(&fixtures::sample());
        assert!(doc.contains("Built things &amp; shipped them."));
        assert!(!doc.contains("things & shipped"));
    }

    #[test]
    fn joins_tech_and_coursework() {
        let doc = context_document(&fixtures::sample());
        assert!(doc.contains("<technologies>Spring Boot, JWT, MySQL</technologies>"));
        assert!(doc.contains("<coursework>Algorithms, Databases</coursework>"));
    }
}
