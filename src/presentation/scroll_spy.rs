//! Active-section tracking from reported visibility ratios.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Navigation sections in page order.
pub const SECTION_IDS: [&str; 6] = ["about", "experience", "skills", "projects", "github", "publications"];

#[derive(Debug, Clone)]
pub struct ScrollSpy {
    order: Vec<String>,
    ratios: HashMap<String, f32>,
}

impl ScrollSpy {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { order: ids.into_iter().map(Into::into).collect(), ratios: HashMap::new() }
    }

    /// Record the latest intersection ratio of `id`. Unknown ids and
    /// non-finite ratios are ignored; others are clamped to `0..=1`.
    pub fn observe(&mut self, id: &str, ratio: f32) {
        if !ratio.is_finite() || !self.order.iter().any(|s| s == id) {
            return;
        }
        self.ratios.insert(id.to_string(), ratio.clamp(0.0, 1.0));
    }

    /// Most visible section; ties go to the earlier one. `None` when nothing
    /// is on screen.
    pub fn active(&self) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;
        for id in &self.order {
            let ratio = self.ratios.get(id).copied().unwrap_or(0.0);
            if ratio <= 0.0 {
                continue;
            }
            if best.is_none_or(|(_, r)| ratio > r) {
                best = Some((id.as_str(), ratio));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl Default for ScrollSpy {
    fn default() -> Self {
        Self::new(SECTION_IDS)
    }
}

/// One [`ScrollSpy`] per visitor session, bounded in size and idle time.
#[derive(Debug)]
pub struct SpyRegistry {
    spies: HashMap<String, (ScrollSpy, Instant)>,
    max: usize,
}

impl SpyRegistry {
    pub fn new(max: usize) -> Self {
        Self { spies: HashMap::new(), max: max.max(1) }
    }

    /// Feed `observations` into the session's spy, creating it on first use,
    /// and return the active section.
    pub fn observe<'a, I>(&mut self, session: &str, observations: I) -> Option<&str>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        if !self.spies.contains_key(session) && self.spies.len() >= self.max {
            let oldest = self.spies.iter().min_by_key(|(_, (_, t))| *t).map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.spies.remove(&oldest);
            }
        }
        let (spy, touched) = self
            .spies
            .entry(session.to_string())
            .or_insert_with(|| (ScrollSpy::default(), Instant::now()));
        *touched = Instant::now();
        for (id, ratio) in observations {
            spy.observe(id, ratio);
        }
        spy.active()
    }

    pub fn active(&self, session: &str) -> Option<&str> {
        self.spies.get(session).and_then(|(spy, _)| spy.active())
    }

    /// Forget spies not updated for `idle` or longer.
    pub fn sweep(&mut self, idle: Duration) -> usize {
        let before = self.spies.len();
        self.spies.retain(|_, (_, touched)| touched.elapsed() < idle);
        before - self.spies.len()
    }

    pub fn len(&self) -> usize {
        self.spies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_visible() {
        let spy = ScrollSpy::default();
        assert_eq!(spy.active(), None);
    }

    #[test]
    fn most_visible_wins() {
        let mut spy = ScrollSpy::default();
        spy.observe("about", 0.2);
        spy.observe("experience", 0.7);
        assert_eq!(spy.active(), Some("experience"));
        spy.observe("experience", 0.0);
        assert_eq!(spy.active(), Some("about"));
    }

    #[test]
    fn ties_go_to_earlier_section() {
        let mut spy = ScrollSpy::default();
        spy.observe("projects", 0.5);
        spy.observe("skills", 0.5);
        assert_eq!(spy.active(), Some("skills"));
    }

    #[test]
    fn unknown_ids_and_bad_ratios_ignored() {
        let mut spy = ScrollSpy::default();
        spy.observe("footer", 1.0);
        spy.observe("github", f32::NAN);
        assert_eq!(spy.active(), None);
        spy.observe("github", 7.0);
        spy.observe("about", 0.99);
        assert_eq!(spy.active(), Some("github"));
    }

    #[tokio::test(start_paused = true)]
    async fn registry_is_bounded() {
        let mut spies = SpyRegistry::new(2);
        spies.observe("a", [("about", 0.5)]);
        tokio::time::advance(Duration::from_secs(1)).await;
        spies.observe("b", [("skills", 0.5)]);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(spies.observe("c", [("projects", 0.5)]), Some("projects"));
        assert_eq!(spies.len(), 2);
        assert_eq!(spies.active("a"), None);
        assert_eq!(spies.active("b"), Some("skills"));
    }

    #[tokio::test(start_paused = true)]
    async fn registry_sweeps_idle_spies() {
        let mut spies = SpyRegistry::new(10);
        spies.observe("old", [("about", 1.0)]);
        tokio::time::advance(Duration::from_secs(120)).await;
        spies.observe("new", [("github", 1.0)]);
        assert_eq!(spies.sweep(Duration::from_secs(60)), 1);
        assert_eq!(spies.active("old"), None);
        assert_eq!(spies.active("new"), Some("github"));
    }
}
