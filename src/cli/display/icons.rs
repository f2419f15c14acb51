//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Value is known
    pub const SUCCESS: &'static str = "✓";

    /// Value is still being assigned
    pub const PENDING: &'static str = "⏳";

    /// Get status icon based on whether an export has resolved
    pub fn get_export_icon(resolved: bool) -> &'static str {
        if resolved {
            Self::SUCCESS
        } else {
            Self::PENDING
        }
    }

    /// Get status text based on resolved/total exports
    pub fn get_status_text(resolved: usize, total: usize) -> &'static str {
        if total > 0 && resolved == total {
            "Ready"
        } else {
            "Pending"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_export_icon() {
        assert_eq!(StatusIcon::get_export_icon(true), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_export_icon(false), StatusIcon::PENDING);
    }

    #[test]
    fn test_get_status_text() {
        assert_eq!(StatusIcon::get_status_text(7, 7), "Ready");
        assert_eq!(StatusIcon::get_status_text(5, 7), "Pending");
        assert_eq!(StatusIcon::get_status_text(0, 0), "Pending");
    }
}
