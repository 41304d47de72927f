//! Per-visitor presentation state: theme and the active navigation section.

pub mod scroll_spy;
pub mod theme;

pub use scroll_spy::{ScrollSpy, SpyRegistry, SECTION_IDS};
pub use theme::{Theme, ThemeContext};
