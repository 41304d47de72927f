//! Assistant widget visibility: closed, windowed or fullscreen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetState {
    #[default]
    Closed,
    Windowed,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetEvent {
    /// Launcher button.
    Toggle,
    Maximize,
    Minimize,
    Close,
    Escape,
}

impl WidgetState {
    /// Next state after `event`. Events that do not apply are ignored.
    pub fn apply(self, event: WidgetEvent) -> WidgetState {
        use WidgetEvent::*;
        use WidgetState::*;
        match (self, event) {
            (Closed, Toggle) => Windowed,
            (Windowed | Fullscreen, Toggle | Close | Escape) => Closed,
            (Windowed, Maximize) => Fullscreen,
            (Fullscreen, Minimize) => Windowed,
            (state, _) => state,
        }
    }

    pub fn is_open(self) -> bool {
        self != WidgetState::Closed
    }

    /// The floating launcher is hidden while the widget covers the page.
    pub fn launcher_visible(self) -> bool {
        self != WidgetState::Fullscreen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WidgetEvent::*;
    use WidgetState::*;

    #[test]
    fn starts_closed() {
        assert_eq!(WidgetState::default(), Closed);
        assert!(!Closed.is_open());
    }

    #[test]
    fn toggle_opens_windowed_and_closes() {
        assert_eq!(Closed.apply(Toggle), Windowed);
        assert_eq!(Windowed.apply(Toggle), Closed);
        assert_eq!(Fullscreen.apply(Toggle), Closed);
    }

    #[test]
    fn maximize_and_minimize() {
        assert_eq!(Windowed.apply(Maximize), Fullscreen);
        assert_eq!(Fullscreen.apply(Minimize), Windowed);
    }

    #[test]
    fn escape_closes_from_any_open_state() {
        assert_eq!(Windowed.apply(Escape), Closed);
        assert_eq!(Fullscreen.apply(Escape), Closed);
        assert_eq!(Closed.apply(Escape), Closed);
    }

    #[test]
    fn inapplicable_events_are_ignored() {
        assert_eq!(Closed.apply(Maximize), Closed);
        assert_eq!(Closed.apply(Minimize), Closed);
        assert_eq!(Closed.apply(Close), Closed);
        assert_eq!(Windowed.apply(Minimize), Windowed);
        assert_eq!(Fullscreen.apply(Maximize), Fullscreen);
    }

    #[test]
    fn reopening_after_fullscreen_close_is_windowed() {
        let s = Closed.apply(Toggle).apply(Maximize).apply(Close).apply(Toggle);
        assert_eq!(s, Windowed);
    }

    #[test]
    fn launcher_hidden_only_in_fullscreen() {
        assert!(Closed.launcher_visible());
        assert!(Windowed.launcher_visible());
        assert!(!Fullscreen.launcher_visible());
    }

    #[test]
    fn events_deserialize_lowercase() {
        let e: WidgetEvent = serde_json::from_str("\"maximize\"").unwrap();
        assert_eq!(e, Maximize);
    }
}
