//! Theme data model: built-in palettes and resolution from config.
//!
//! Two built-in palettes (dark and light) plus custom hex overrides from the
//! config file. Resolved once at startup and passed to rendering by reference.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};
use crate::fs::git::GitMark;

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Grid
    pub grid_fg: Color,
    pub cursor_bg: Color,
    pub cursor_fg: Color,
    pub dir_fg: Color,
    pub symlink_fg: Color,
    pub exec_fg: Color,
    pub selected_fg: Color,
    pub match_fg: Color,

    // Location bar
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub search_bg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & dialogs
    pub border_fg: Color,
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Git
    pub git_untracked_fg: Color,
    pub git_added_fg: Color,
    pub git_modified_fg: Color,

    // Semantic colors (not configurable)
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub dim_fg: Color,
}

impl ThemeColors {
    pub fn git_fg(&self, mark: GitMark) -> Color {
        match mark {
            GitMark::Untracked => self.git_untracked_fg,
            GitMark::Added => self.git_added_fg,
            GitMark::Modified => self.git_modified_fg,
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        dark_theme()
    }
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme on the Catppuccin Mocha palette with the violet cursor.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        grid_fg: Color::Rgb(205, 214, 244),      // #cdd6f4 (text)
        cursor_bg: Color::Rgb(130, 93, 242),     // #825df2
        cursor_fg: Color::Rgb(255, 255, 255),
        dir_fg: Color::Rgb(137, 180, 250),       // #89b4fa (blue)
        symlink_fg: Color::Rgb(148, 226, 213),   // #94e2d5 (teal)
        exec_fg: Color::Rgb(166, 227, 161),      // #a6e3a1 (green)
        selected_fg: Color::Rgb(249, 226, 175),  // #f9e2af (yellow)
        match_fg: Color::Rgb(250, 179, 135),     // #fab387 (peach)

        bar_bg: Color::Rgb(92, 92, 92),          // #5c5c5c
        bar_fg: Color::Rgb(255, 255, 255),
        search_bg: Color::Rgb(73, 159, 28),      // #499f1c

        status_bg: Color::Rgb(30, 30, 46),       // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(130, 93, 242),
        dialog_bg: Color::Rgb(49, 50, 68),       // #313244 (surface0)
        dialog_border_fg: Color::Rgb(137, 180, 250),

        git_untracked_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)
        git_added_fg: Color::Rgb(166, 227, 161),     // #a6e3a1 (green)
        git_modified_fg: Color::Rgb(249, 226, 175),  // #f9e2af (yellow)

        error_fg: Color::Rgb(243, 139, 168),
        warning_fg: Color::Rgb(249, 226, 175),
        success_fg: Color::Rgb(166, 227, 161),
        info_fg: Color::Rgb(137, 180, 250),
        dim_fg: Color::Rgb(108, 112, 134),       // #6c7086 (overlay0)
    }
}

/// Light theme on the Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        grid_fg: Color::Rgb(76, 79, 105),        // #4c4f69 (text)
        cursor_bg: Color::Rgb(136, 57, 239),     // #8839ef (mauve)
        cursor_fg: Color::Rgb(239, 241, 245),
        dir_fg: Color::Rgb(30, 102, 245),        // #1e66f5 (blue)
        symlink_fg: Color::Rgb(23, 146, 153),    // #179299 (teal)
        exec_fg: Color::Rgb(64, 160, 43),        // #40a02b (green)
        selected_fg: Color::Rgb(223, 142, 29),   // #df8e1d (yellow)
        match_fg: Color::Rgb(254, 100, 11),      // #fe640b (peach)

        bar_bg: Color::Rgb(204, 208, 218),       // #ccd0da (surface1)
        bar_fg: Color::Rgb(76, 79, 105),
        search_bg: Color::Rgb(64, 160, 43),

        status_bg: Color::Rgb(239, 241, 245),    // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190),    // #acb0be (surface2)
        dialog_bg: Color::Rgb(230, 233, 239),    // #e6e9ef (surface0)
        dialog_border_fg: Color::Rgb(30, 102, 245),

        git_untracked_fg: Color::Rgb(210, 15, 57),
        git_added_fg: Color::Rgb(64, 160, 43),
        git_modified_fg: Color::Rgb(223, 142, 29),

        error_fg: Color::Rgb(210, 15, 57),       // #d20f39 (red)
        warning_fg: Color::Rgb(223, 142, 29),
        success_fg: Color::Rgb(64, 160, 43),
        info_fg: Color::Rgb(30, 102, 245),
        dim_fg: Color::Rgb(156, 160, 176),       // #9ca0b0 (overlay0)
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn override_color(slot: &mut Color, hex: &Option<String>) {
    if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
        *slot = color;
    }
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default): dark palette
/// - `"light"`: light palette
/// - `"custom"`: dark palette with custom hex values on top
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    override_color(&mut theme.grid_fg, &custom.grid_fg);
    override_color(&mut theme.cursor_bg, &custom.cursor_bg);
    override_color(&mut theme.cursor_fg, &custom.cursor_fg);
    override_color(&mut theme.dir_fg, &custom.dir_fg);
    override_color(&mut theme.symlink_fg, &custom.symlink_fg);
    override_color(&mut theme.exec_fg, &custom.exec_fg);
    override_color(&mut theme.selected_fg, &custom.selected_fg);
    override_color(&mut theme.bar_bg, &custom.bar_bg);
    override_color(&mut theme.bar_fg, &custom.bar_fg);
    override_color(&mut theme.search_bg, &custom.search_bg);
    override_color(&mut theme.status_bg, &custom.status_bg);
    override_color(&mut theme.status_fg, &custom.status_fg);
    override_color(&mut theme.border_fg, &custom.border_fg);
    override_color(&mut theme.dialog_bg, &custom.dialog_bg);
    override_color(&mut theme.dialog_border_fg, &custom.dialog_border_fg);
    override_color(&mut theme.git_untracked_fg, &custom.git_untracked_fg);
    override_color(&mut theme.git_added_fg, &custom.git_added_fg);
    override_color(&mut theme.git_modified_fg, &custom.git_modified_fg);
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("#825DF2"), Some(Color::Rgb(130, 93, 242)));
        assert_eq!(parse_hex_color("1a1b26"), Some(Color::Rgb(26, 27, 38)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_resolve_schemes() {
        let dark = resolve_theme(&ThemeConfig::default());
        assert_eq!(dark.cursor_bg, Color::Rgb(130, 93, 242));

        let light = resolve_theme(&ThemeConfig {
            scheme: Some("light".into()),
            custom: None,
        });
        assert_eq!(light.dir_fg, Color::Rgb(30, 102, 245));

        let unknown = resolve_theme(&ThemeConfig {
            scheme: Some("neon".into()),
            custom: None,
        });
        assert_eq!(unknown.dir_fg, dark.dir_fg);
    }

    #[test]
    fn test_resolve_custom_overrides() {
        let config = ThemeConfig {
            scheme: Some("custom".into()),
            custom: Some(ThemeColorsConfig {
                cursor_bg: Some("#112233".into()),
                git_added_fg: Some("#00ff00".into()),
                dir_fg: Some("nonsense".into()),
                ..Default::default()
            }),
        };
        let theme = resolve_theme(&config);
        assert_eq!(theme.cursor_bg, Color::Rgb(17, 34, 51));
        assert_eq!(theme.git_fg(GitMark::Added), Color::Rgb(0, 255, 0));
        // Invalid hex keeps the dark default.
        assert_eq!(theme.dir_fg, Color::Rgb(137, 180, 250));
    }

    #[test]
    fn test_custom_ignored_without_custom_scheme() {
        let config = ThemeConfig {
            scheme: Some("light".into()),
            custom: Some(ThemeColorsConfig {
                cursor_bg: Some("#112233".into()),
                ..Default::default()
            }),
        };
        assert_eq!(resolve_theme(&config).cursor_bg, Color::Rgb(136, 57, 239));
    }

    #[test]
    fn test_git_colors_differ() {
        let theme = dark_theme();
        assert_ne!(theme.git_fg(GitMark::Untracked), theme.git_fg(GitMark::Modified));
        assert_ne!(theme.git_fg(GitMark::Added), theme.git_fg(GitMark::Modified));
    }
}
