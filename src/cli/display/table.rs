//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::cluster::StackExports;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render stack exports as a formatted table
    pub fn render_exports(&self, exports: &StackExports) -> String {
        let entries = exports.entries();
        let resolved = entries.iter().filter(|(_, v)| v.is_some()).count();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("EXPORT").set_alignment(CellAlignment::Left),
                Cell::new("VALUE").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
            ]);

        for (key, value) in &entries {
            let shown = match (*key, value) {
                // The document is long; show its size only
                ("kubeconfig", Some(doc)) => format!("<{} lines>", doc.lines().count()),
                (_, Some(v)) => v.to_string(),
                (_, None) => "<pending>".to_string(),
            };

            table.add_row(vec![
                Cell::new(key).fg(self.theme.info),
                Cell::new(shown),
                Cell::new(StatusIcon::get_export_icon(value.is_some()))
                    .fg(self.theme.get_export_color(value.is_some())),
            ]);
        }

        let status = StatusIcon::get_status_text(resolved, entries.len());
        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Stack {} {} ─╮\n",
            exports.cluster_name,
            format!("[{}/{} resolved, {}]", resolved, entries.len(), status).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Resolved  {} Pending\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.yellow()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pending_exports() {
        let exports = StackExports {
            cluster_name: "dreamin-k8s".to_string(),
            service_name: "dreamin-k8s".to_string(),
            ..Default::default()
        };

        let output = TableRenderer::new().render_exports(&exports);
        assert!(output.contains("servicePublicIP"));
        assert!(output.contains("<pending>"));
    }

    #[test]
    fn test_render_kubeconfig_summarised() {
        let exports = StackExports {
            kubeconfig: Some("apiVersion: v1\nkind: Config\n".to_string()),
            service_public_ip: Some("34.1.2.3".to_string()),
            ..Default::default()
        };

        let output = TableRenderer::new().render_exports(&exports);
        assert!(output.contains("<2 lines>"));
        assert!(output.contains("34.1.2.3"));
        assert!(!output.contains("kind: Config"));
    }
}
