//! Server-rendered single page.
//!
//! Every piece of content text passes through [`esc`]. The inline script
//! only talks to the JSON API; the page is fully readable without it.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::activity::ActivityState;
use crate::chat::GREETING;
use crate::content::filter::{filter_projects, filter_skills, CategoryFilter};
use crate::content::ContentStore;
use crate::feeds::{FeedState, Platform};
use crate::presentation::Theme;

/// Navigation entries: label and section id, in display order.
const NAV: [(&str, &str); 6] = [
    ("About", "about"),
    ("Experience", "experience"),
    ("Projects", "projects"),
    ("Activity", "github"),
    ("Skills", "skills"),
    ("Writing", "publications"),
];

pub struct PageContext<'a> {
    pub site_name: &'a str,
    pub content: &'a ContentStore,
    pub theme: Theme,
    pub active_section: Option<&'a str>,
    pub category: CategoryFilter,
    pub query: &'a str,
    pub skill_query: &'a str,
    pub publications: &'a FeedState,
    pub platform: Platform,
    pub visible: usize,
    /// `None` hides the activity section.
    pub activity: Option<&'a ActivityState>,
}

fn esc(s: &str) -> std::borrow::Cow<'_, str> {
    escape(s)
}

/// Render the full HTML document.
pub fn render(ctx: &PageContext<'_>) -> String {
    let mut out = String::with_capacity(16 * 1024);
    // Writing into a String cannot fail.
    let _ = write_page(&mut out, ctx);
    out
}

fn write_page(out: &mut String, ctx: &PageContext<'_>) -> std::fmt::Result {
    let p = &ctx.content.profile;
    writeln!(out, "<!doctype html>")?;
    writeln!(out, "<html lang=\"en\" class=\"{}\">", ctx.theme)?;
    writeln!(out, "<head>")?;
    writeln!(out, "  <meta charset=\"utf-8\" />")?;
    writeln!(out, "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />")?;
    writeln!(out, "  <title>{} | {}</title>", esc(ctx.site_name), esc(&p.title))?;
    writeln!(out, "  <link rel=\"stylesheet\" href=\"/site.css\" />")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    write_header(out, ctx)?;
    writeln!(out, "<main>")?;
    write_about(out, ctx.content)?;
    write_experience(out, ctx.content)?;
    write_projects(out, ctx)?;
    if let Some(activity) = ctx.activity {
        write_activity(out, activity)?;
    }
    write_skills(out, ctx)?;
    write_publications(out, ctx)?;
    write_education(out, ctx.content)?;
    writeln!(out, "</main>")?;

    writeln!(
        out,
        "<footer><p>&copy; {}. Built with Rust.</p></footer>",
        esc(&p.name)
    )?;
    write_chat_launcher(out)?;
    writeln!(out, "<script>{}</script>", PAGE_SCRIPT)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_header(out: &mut String, ctx: &PageContext<'_>) -> std::fmt::Result {
    let p = &ctx.content.profile;
    writeln!(out, "<header>")?;
    if !p.photo_url.is_empty() {
        writeln!(out, "  <img class=\"avatar\" src=\"{}\" alt=\"{}\" />", esc(&p.photo_url), esc(&p.name))?;
    }
    writeln!(out, "  <h1>{}</h1>", esc(&p.name))?;
    writeln!(out, "  <h2>{}</h2>", esc(&p.title))?;
    writeln!(out, "  <p class=\"location\">{}</p>", esc(&p.location))?;
    writeln!(out, "  <ul class=\"social\">")?;
    for link in &ctx.content.social_links {
        writeln!(
            out,
            "    <li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
            esc(&link.url),
            esc(&link.name)
        )?;
    }
    writeln!(out, "  </ul>")?;
    if !p.resume_link.is_empty() {
        writeln!(out, "  <a class=\"resume\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Resume</a>", esc(&p.resume_link))?;
    }
    writeln!(
        out,
        "  <button id=\"theme-toggle\" aria-label=\"Switch to {} mode\">{}</button>",
        ctx.theme.flipped(),
        ctx.theme.flipped()
    )?;
    writeln!(out, "  <nav><ul>")?;
    for (label, id) in NAV {
        let active = if ctx.active_section == Some(id) { " class=\"active\"" } else { "" };
        writeln!(out, "    <li><a href=\"#{id}\"{active}>{label}</a></li>")?;
    }
    writeln!(out, "  </ul></nav>")?;
    writeln!(out, "</header>")
}

fn write_about(out: &mut String, content: &ContentStore) -> std::fmt::Result {
    writeln!(out, "<section id=\"about\">")?;
    writeln!(out, "  <h2>About</h2>")?;
    writeln!(out, "  <p>{}</p>", esc(&content.profile.summary))?;
    if !content.highlights.is_empty() {
        writeln!(out, "  <ul class=\"highlights\">")?;
        for h in &content.highlights {
            writeln!(
                out,
                "    <li><strong>{}</strong> {}</li>",
                esc(&h.metric),
                esc(&h.description)
            )?;
        }
        writeln!(out, "  </ul>")?;
    }
    writeln!(out, "</section>")
}

fn write_experience(out: &mut String, content: &ContentStore) -> std::fmt::Result {
    writeln!(out, "<section id=\"experience\">")?;
    writeln!(out, "  <h2>Experience</h2>")?;
    for exp in &content.experience {
        writeln!(out, "  <article class=\"job\">")?;
        writeln!(out, "    <header><span class=\"period\">{}</span>", esc(&exp.period))?;
        writeln!(out, "      <h3>{} · {}</h3>", esc(&exp.role), esc(&exp.company))?;
        writeln!(out, "      <span class=\"location\">{}</span></header>", esc(&exp.location))?;
        writeln!(out, "    <ul>")?;
        for item in &exp.description {
            writeln!(out, "      <li>{}</li>", esc(item))?;
        }
        writeln!(out, "    </ul>")?;
        writeln!(out, "  </article>")?;
    }
    writeln!(out, "</section>")
}

fn write_projects(out: &mut String, ctx: &PageContext<'_>) -> std::fmt::Result {
    let projects = filter_projects(&ctx.content.projects, ctx.category, ctx.query);
    writeln!(out, "<section id=\"projects\">")?;
    writeln!(out, "  <h2>Projects</h2>")?;
    writeln!(out, "  <form class=\"filters\" method=\"get\" action=\"/#projects\">")?;
    writeln!(out, "    <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"Search projects\" />", esc(ctx.query))?;
    for choice in CategoryFilter::choices() {
        let pressed = if choice == ctx.category { " aria-pressed=\"true\"" } else { "" };
        writeln!(out, "    <button name=\"category\" value=\"{choice}\"{pressed}>{choice}</button>")?;
    }
    writeln!(out, "  </form>")?;

    if projects.is_empty() {
        writeln!(out, "  <div class=\"empty\">")?;
        writeln!(out, "    <p>No projects found.</p>")?;
        writeln!(out, "    <a href=\"/#projects\">Clear Filters</a>")?;
        writeln!(out, "  </div>")?;
    }
    for project in projects {
        writeln!(out, "  <article class=\"project\" data-category=\"{}\">", project.category)?;
        if !project.image_url.is_empty() {
            writeln!(out, "    <img src=\"{}\" alt=\"{}\" loading=\"lazy\" />", esc(&project.image_url), esc(&project.title))?;
        }
        writeln!(out, "    <h3><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></h3>", esc(&project.link), esc(&project.title))?;
        writeln!(out, "    <p>{}</p>", esc(&project.description))?;
        writeln!(out, "    <ul class=\"tech\">")?;
        for t in &project.tech {
            writeln!(out, "      <li>{}</li>", esc(t))?;
        }
        writeln!(out, "    </ul>")?;
        if let Some(demo) = &project.live_demo_url {
            writeln!(out, "    <a class=\"demo\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Live Demo</a>", esc(demo))?;
        }
        writeln!(out, "  </article>")?;
    }
    writeln!(out, "</section>")
}

fn write_activity(out: &mut String, activity: &ActivityState) -> std::fmt::Result {
    writeln!(out, "<section id=\"github\">")?;
    writeln!(out, "  <h2>GitHub Activity</h2>")?;
    match activity {
        ActivityState::Loading => writeln!(out, "  <p class=\"loading\">Loading activity…</p>")?,
        ActivityState::Failed => writeln!(out, "  <p class=\"failed\">Unable to load activity</p>")?,
        ActivityState::Succeeded(calendar) => {
            writeln!(out, "  <div class=\"calendar\">")?;
            for day in calendar.days() {
                writeln!(
                    out,
                    "    <span class=\"day level-{}\" title=\"{}: {}\"></span>",
                    day.level,
                    esc(&day.date),
                    day.count
                )?;
            }
            writeln!(out, "  </div>")?;
            writeln!(out, "  <p class=\"total\">{} contributions</p>", calendar.total_count())?;
        }
    }
    writeln!(out, "</section>")
}

fn write_skills(out: &mut String, ctx: &PageContext<'_>) -> std::fmt::Result {
    let groups = filter_skills(&ctx.content.skill_groups, ctx.skill_query);
    writeln!(out, "<section id=\"skills\">")?;
    writeln!(out, "  <h2>Skills</h2>")?;
    write_proficiency(out, ctx.content)?;
    writeln!(out, "  <form method=\"get\" action=\"/#skills\">")?;
    writeln!(out, "    <input type=\"search\" name=\"skill_q\" value=\"{}\" placeholder=\"Search skills\" />", esc(ctx.skill_query))?;
    writeln!(out, "  </form>")?;
    if groups.is_empty() {
        writeln!(out, "  <p class=\"empty\">No skills match \"{}\".</p>", esc(ctx.skill_query))?;
    }
    for group in groups {
        writeln!(out, "  <div class=\"skill-group\" data-icon=\"{}\">", esc(&group.icon))?;
        writeln!(out, "    <h3>{}</h3>", esc(&group.name))?;
        writeln!(out, "    <ul>")?;
        for s in &group.skills {
            writeln!(out, "      <li>{}</li>", esc(s))?;
        }
        writeln!(out, "    </ul>")?;
        writeln!(out, "  </div>")?;
    }
    writeln!(out, "</section>")
}

fn write_proficiency(out: &mut String, content: &ContentStore) -> std::fmt::Result {
    if content.proficiency.is_empty() {
        return Ok(());
    }
    writeln!(out, "  <div class=\"proficiency\">")?;
    writeln!(out, "    <h3>Technical Proficiency</h3>")?;
    writeln!(out, "    <ul>")?;
    for p in &content.proficiency {
        writeln!(
            out,
            "      <li><span class=\"subject\">{}</span><meter min=\"0\" max=\"100\" value=\"{}\"></meter><span class=\"level\">{}</span></li>",
            esc(&p.subject),
            p.score,
            p.label()
        )?;
    }
    writeln!(out, "    </ul>")?;
    writeln!(out, "  </div>")
}

fn write_publications(out: &mut String, ctx: &PageContext<'_>) -> std::fmt::Result {
    writeln!(out, "<section id=\"publications\">")?;
    writeln!(out, "  <h2>Writing</h2>")?;
    writeln!(out, "  <nav class=\"tabs\">")?;
    for platform in Platform::ALL {
        let current = if platform == ctx.platform { " aria-current=\"page\"" } else { "" };
        writeln!(
            out,
            "    <a href=\"/?platform={}#publications\"{current}>{}</a>",
            esc(platform.label()),
            platform.label()
        )?;
    }
    writeln!(out, "  </nav>")?;

    match ctx.publications {
        FeedState::Loading => writeln!(out, "  <div class=\"skeleton\">Loading articles…</div>")?,
        FeedState::Failed => {
            writeln!(out, "  <div class=\"failed\">")?;
            writeln!(out, "    <p>Unable to load articles</p>")?;
            writeln!(out, "    <p>Please check your connection or try again later.</p>")?;
            writeln!(out, "  </div>")?;
        }
        FeedState::Succeeded(_) => {
            let page = ctx.publications.page(ctx.platform, ctx.visible);
            if page.articles.is_empty() {
                writeln!(out, "  <p class=\"empty\">No articles found for {}</p>", page.platform.label())?;
            }
            for a in &page.articles {
                let thumb = if a.thumbnail.is_empty() {
                    format!("https://placehold.co/600x400/e2e8f0/64748b?text={}", a.platform.label())
                } else {
                    a.thumbnail.clone()
                };
                writeln!(out, "  <a class=\"article\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">", esc(&a.link))?;
                writeln!(out, "    <img src=\"{}\" alt=\"{}\" loading=\"lazy\" />", esc(&thumb), esc(&a.title))?;
                writeln!(out, "    <span class=\"meta\">{} · {}</span>", a.platform.label(), a.pub_date.format("%b %-d, %Y"))?;
                writeln!(out, "    <h3>{}</h3>", esc(&a.title))?;
                writeln!(out, "    <p>{}</p>", esc(&a.description))?;
                writeln!(out, "  </a>")?;
            }
            if page.has_more {
                writeln!(
                    out,
                    "  <a class=\"more\" href=\"/?platform={}&amp;visible={}#publications\">Show More</a>",
                    esc(page.platform.label()),
                    page.next_visible
                )?;
            }
        }
    }
    writeln!(out, "</section>")
}

fn write_education(out: &mut String, content: &ContentStore) -> std::fmt::Result {
    let edu = &content.education;
    writeln!(out, "<section id=\"education\">")?;
    writeln!(out, "  <h2>Education &amp; Certifications</h2>")?;
    writeln!(out, "  <article class=\"degree\">")?;
    writeln!(out, "    <h3>{}</h3>", esc(&edu.degree))?;
    writeln!(out, "    <p>{} · {}</p>", esc(&edu.institution), esc(&edu.period))?;
    if !edu.cgpa.is_empty() {
        writeln!(out, "    <p>CGPA: {}</p>", esc(&edu.cgpa))?;
    }
    writeln!(out, "  </article>")?;
    writeln!(out, "  <ul class=\"certifications\">")?;
    for c in &content.certifications {
        writeln!(
            out,
            "    <li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a> · {} · {}</li>",
            esc(&c.link),
            esc(&c.name),
            esc(&c.issuer),
            esc(&c.date)
        )?;
    }
    writeln!(out, "  </ul>")?;
    writeln!(out, "</section>")
}

fn write_chat_launcher(out: &mut String) -> std::fmt::Result {
    writeln!(out, "<button id=\"chat-launcher\" aria-label=\"Open AI assistant\">Ask AI</button>")?;
    writeln!(out, "<div id=\"chat-widget\" data-state=\"closed\" hidden>")?;
    writeln!(out, "  <div class=\"chat-toolbar\">")?;
    writeln!(out, "    <button data-event=\"maximize\">Maximize</button>")?;
    writeln!(out, "    <button data-event=\"minimize\">Minimize</button>")?;
    writeln!(out, "    <a id=\"chat-export\" href=\"#\">Download PDF</a>")?;
    writeln!(out, "    <button id=\"chat-clear\">Clear</button>")?;
    writeln!(out, "    <button data-event=\"close\">Close</button>")?;
    writeln!(out, "  </div>")?;
    writeln!(out, "  <div id=\"chat-log\"><div class=\"msg ai\">{}</div></div>", esc(GREETING))?;
    writeln!(out, "  <div id=\"chat-suggestions\"></div>")?;
    writeln!(out, "  <p id=\"chat-error\" role=\"alert\"></p>")?;
    writeln!(out, "  <form id=\"chat-form\"><input name=\"message\" autocomplete=\"off\" placeholder=\"Ask me anything...\" /><button>Send</button></form>")?;
    writeln!(out, "</div>")
}

const PAGE_SCRIPT: &str = r#"
(() => {
  const $ = (s) => document.querySelector(s);
  const post = (url, body) => fetch(url, { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body || {}) }).then((r) => r.json());
  const saved = (document.cookie.match(/(?:^|; )folio_session=([^;]+)/) || [])[1];
  let view = null;
  const paint = (v) => {
    view = v;
    const w = $('#chat-widget');
    w.hidden = v.widget === 'closed';
    w.dataset.state = v.widget;
    $('#chat-launcher').hidden = !v.launcher_visible;
    $('#chat-log').innerHTML = v.transcript.map((m) => m.sender === 'ai'
      ? `<div class="msg ai">${m.html}</div>`
      : `<div class="msg user"></div>`).join('') + (v.loading ? '<div class="typing">…</div>' : '');
    v.transcript.forEach((m, i) => { if (m.sender === 'user') $('#chat-log').children[i].textContent = m.text; });
    $('#chat-error').textContent = v.error || '';
    $('#chat-export').toggleAttribute('aria-disabled', !v.can_export);
    $('#chat-suggestions').replaceChildren(...v.suggestions.map((s) => {
      const b = document.createElement('button'); b.textContent = s; b.onclick = () => send(s); return b;
    }));
  };
  const send = (text) => post(`/api/chat/${view.id}/message`, { message: text }).then(paint);
  const widget = (event) => post(`/api/chat/${view.id}/widget`, { event }).then(paint);
  post('/api/chat/session', { session_id: saved }).then((v) => {
    document.cookie = `folio_session=${v.id}; path=/; SameSite=Lax`;
    paint(v);
    const spy = new IntersectionObserver((entries) => {
      post(`/api/sections/${v.id}/visibility`, { observations: entries.map((e) => ({ id: e.target.id, ratio: e.intersectionRatio })) })
        .then((r) => document.querySelectorAll('header nav a').forEach((a) => a.classList.toggle('active', a.hash === `#${r.active}`)));
    }, { threshold: [0, 0.25, 0.5, 0.75, 1] });
    document.querySelectorAll('main > section[id]').forEach((s) => spy.observe(s));
  });
  $('#chat-launcher').onclick = () => widget('toggle');
  document.querySelectorAll('#chat-widget [data-event]').forEach((b) => { b.onclick = () => widget(b.dataset.event); });
  document.addEventListener('keydown', (e) => { if (e.key === 'Escape' && view && view.widget !== 'closed') widget('escape'); });
  $('#chat-clear').onclick = () => post(`/api/chat/${view.id}/clear`).then(paint);
  $('#chat-export').onclick = (e) => { e.preventDefault(); if (view && view.can_export) window.location = `/api/chat/${view.id}/export`; };
  $('#chat-form').onsubmit = (e) => { e.preventDefault(); const i = e.target.message; const t = i.value; i.value = ''; send(t); };
  $('#theme-toggle').onclick = () => post('/api/theme').then((r) => { document.documentElement.className = r.theme; });
})();
"#;
