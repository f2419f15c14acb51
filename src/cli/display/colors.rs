//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on export resolution
    pub fn get_export_color(&self, resolved: bool) -> TableColor {
        if resolved {
            self.success
        } else {
            self.warning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
    }

    #[test]
    fn test_get_export_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_export_color(true), TableColor::Green);
        assert_eq!(theme.get_export_color(false), TableColor::Yellow);
    }
}
