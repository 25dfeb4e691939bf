#![forbid(unsafe_code)]

//! Page configuration: class names, element ids and timings.
//!
//! Every section is `#[serde(default)]`, so a host can override a single
//! value with a partial JSON document:
//!
//! ```
//! use pagefx_runtime::config::PageConfig;
//!
//! let config = PageConfig::from_json(r#"{"counter":{"duration_ms":1000}}"#).unwrap();
//! assert_eq!(config.counter.duration_ms, 1000);
//! assert_eq!(config.reveal.stagger_interval_ms, 100);
//! ```
//!
//! Durations are whole milliseconds on the wire; use the `*_after()`
//! accessors to get [`Duration`]s.

use std::time::Duration;

use pagefx_core::RootMargin;
use pagefx_core::format::{Locale, locale_for_tag};
use serde::{Deserialize, Serialize};

use crate::error::Result;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Scroll-reveal and stagger settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Class marking elements to observe (and stagger children).
    pub reveal_class: String,
    /// Class applied on activation.
    pub visible_class: String,
    /// Intersection ratio that activates an element.
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub stagger_interval_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            reveal_class: "fade-in-up".to_string(),
            visible_class: "is-visible".to_string(),
            threshold: 0.1,
            root_margin: RootMargin::bottom(-50.0),
            stagger_interval_ms: 100,
        }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn stagger_interval(&self) -> Duration {
        ms(self.stagger_interval_ms)
    }
}

/// Numeric counter settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub counter_class: String,
    pub target_attribute: String,
    pub duration_ms: u64,
    /// Language tag for digit grouping, e.g. `de-DE`. `None` means the host
    /// did not report one; counters then group as `en`.
    pub locale: Option<String>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            counter_class: "number-animate".to_string(),
            target_attribute: "data-target".to_string(),
            duration_ms: 2000,
            locale: None,
        }
    }
}

impl CounterConfig {
    #[must_use]
    pub fn duration(&self) -> Duration {
        ms(self.duration_ms)
    }

    /// Grouping locale resolved from [`Self::locale`].
    #[must_use]
    pub fn number_locale(&self) -> Locale {
        self.locale.as_deref().map_or(Locale::en, locale_for_tag)
    }
}

/// Notification banner settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Classes every banner starts with (includes the off-screen class).
    pub base_classes: String,
    /// Class that holds the banner off-screen.
    pub offscreen_class: String,
    pub info_classes: String,
    pub success_classes: String,
    pub error_classes: String,
    /// Settle delay before sliding in.
    pub enter_delay_ms: u64,
    /// Time from creation until the slide-out starts.
    pub display_ms: u64,
    /// Slide-out transition length; the banner is removed when it ends.
    pub exit_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            base_classes: "fixed top-4 right-4 z-50 p-4 rounded-lg shadow-lg transform \
                           translate-x-full transition-transform duration-300"
                .to_string(),
            offscreen_class: "translate-x-full".to_string(),
            info_classes: "bg-blue-500 text-white".to_string(),
            success_classes: "bg-green-500 text-white".to_string(),
            error_classes: "bg-red-500 text-white".to_string(),
            enter_delay_ms: 100,
            display_ms: 5000,
            exit_ms: 300,
        }
    }
}

impl NotificationConfig {
    #[must_use]
    pub fn enter_after(&self) -> Duration {
        ms(self.enter_delay_ms)
    }

    /// Delay from slide-in to slide-out.
    #[must_use]
    pub fn hold_after(&self) -> Duration {
        ms(self.display_ms.saturating_sub(self.enter_delay_ms))
    }

    #[must_use]
    pub fn exit_after(&self) -> Duration {
        ms(self.exit_ms)
    }
}

/// Theme toggle settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub toggle_id: String,
    pub icon_id: String,
    pub storage_key: String,
    /// Class on the root element in light mode.
    pub light_class: String,
    pub transition_class: String,
    pub transition_ms: u64,
    pub light_icon: String,
    pub dark_icon: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            toggle_id: "theme-toggle".to_string(),
            icon_id: "theme-icon".to_string(),
            storage_key: "theme".to_string(),
            light_class: "light".to_string(),
            transition_class: "theme-transitioning".to_string(),
            transition_ms: 300,
            light_icon: "\u{1F31E}".to_string(),
            dark_icon: "\u{1F319}".to_string(),
        }
    }
}

impl ThemeConfig {
    #[must_use]
    pub fn transition_after(&self) -> Duration {
        ms(self.transition_ms)
    }
}

/// Mobile navigation menu settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub button_id: String,
    pub menu_id: String,
    pub hidden_class: String,
    pub opening_class: String,
    pub closing_class: String,
    /// Class on the button's icon while the menu is open.
    pub icon_open_class: String,
    pub close_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            button_id: "mobile-menu-button".to_string(),
            menu_id: "mobile-menu".to_string(),
            hidden_class: "hidden".to_string(),
            opening_class: "mobile-menu-enter-active".to_string(),
            closing_class: "mobile-menu-enter".to_string(),
            icon_open_class: "rotate-90".to_string(),
            close_ms: 300,
        }
    }
}

impl MenuConfig {
    #[must_use]
    pub fn close_after(&self) -> Duration {
        ms(self.close_ms)
    }
}

/// Contact form settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Simulated submission latency.
    pub submit_delay_ms: u64,
    pub sending_label: String,
    pub success_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 2000,
            sending_label: "Sending...".to_string(),
            success_message: "Thank you! Your message has been sent successfully.".to_string(),
        }
    }
}

impl FormConfig {
    #[must_use]
    pub fn submit_after(&self) -> Duration {
        ms(self.submit_delay_ms)
    }
}

/// Scroll progress bar and back-to-top settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub progress_class: String,
    pub back_to_top_id: String,
    /// Scroll offset past which the back-to-top button shows.
    pub back_to_top_offset: f64,
    pub shown_classes: String,
    pub hidden_classes: String,
    pub debounce_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            progress_class: "scroll-progress".to_string(),
            back_to_top_id: "back-to-top".to_string(),
            back_to_top_offset: 300.0,
            shown_classes: "opacity-100 visible translate-y-0".to_string(),
            hidden_classes: "opacity-0 invisible translate-y-10".to_string(),
            debounce_ms: 10,
        }
    }
}

impl ScrollConfig {
    #[must_use]
    pub fn debounce_after(&self) -> Duration {
        ms(self.debounce_ms)
    }
}

/// Loading screen and hero intro settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    pub loading_screen_id: String,
    pub loaded_class: String,
    pub fade_delay_ms: u64,
    pub hide_delay_ms: u64,
    pub hero_id: String,
    pub hero_delay_ms: u64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            loading_screen_id: "loading-screen".to_string(),
            loaded_class: "loaded".to_string(),
            fade_delay_ms: 1000,
            hide_delay_ms: 500,
            hero_id: "hero-image-container".to_string(),
            hero_delay_ms: 300,
        }
    }
}

impl LoadingConfig {
    #[must_use]
    pub fn fade_after(&self) -> Duration {
        ms(self.fade_delay_ms)
    }

    #[must_use]
    pub fn hide_after(&self) -> Duration {
        ms(self.hide_delay_ms)
    }

    #[must_use]
    pub fn hero_after(&self) -> Duration {
        ms(self.hero_delay_ms)
    }
}

/// Focus ring settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub focusable_tags: Vec<String>,
    pub ring_classes: String,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focusable_tags: ["a", "button", "input", "textarea", "select"]
                .into_iter()
                .map(String::from)
                .collect(),
            ring_classes: "ring-2 ring-blue-500 ring-offset-2".to_string(),
        }
    }
}

/// Lazy image settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyImageConfig {
    pub source_attribute: String,
    pub lazy_class: String,
}

impl Default for LazyImageConfig {
    fn default() -> Self {
        Self {
            source_attribute: "data-src".to_string(),
            lazy_class: "lazy".to_string(),
        }
    }
}

/// Typewriter settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub text_attribute: String,
    pub char_interval_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            text_attribute: "data-typewriter".to_string(),
            char_interval_ms: 100,
        }
    }
}

impl TypewriterConfig {
    #[must_use]
    pub fn char_interval(&self) -> Duration {
        ms(self.char_interval_ms)
    }
}

/// Search shortcut settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Key that, with Ctrl/Cmd, triggers the search placeholder.
    pub search_key: String,
    pub search_message: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            search_key: "k".to_string(),
            search_message: "Search feature coming soon!".to_string(),
        }
    }
}

/// Complete page configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub reveal: RevealConfig,
    pub counter: CounterConfig,
    pub notification: NotificationConfig,
    pub theme: ThemeConfig,
    pub menu: MenuConfig,
    pub form: FormConfig,
    pub scroll: ScrollConfig,
    pub loading: LoadingConfig,
    pub focus: FocusConfig,
    pub lazy_images: LazyImageConfig,
    pub typewriter: TypewriterConfig,
    pub keyboard: KeyboardConfig,
}

impl PageConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
