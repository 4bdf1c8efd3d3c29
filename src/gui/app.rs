//! Chart Gallery Main Application
//! Main window with the chart selector and the chart page.

use crate::charts::{ChartDispatcher, ChartKind};
use crate::config::AppConfig;
use crate::data::{export_csv, SampleData};
use crate::gui::{ChartViewer, ChartViewerAction, ControlPanel, ControlPanelAction};
use egui::{FontData, FontDefinitions, FontFamily, SidePanel};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// System fonts tried, in order, when none is configured.
const CJK_FONT_CANDIDATES: [&str; 10] = [
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

const CJK_FONT_NAME: &str = "cjk";

/// Main application window.
pub struct GalleryApp {
    data: Arc<SampleData>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl GalleryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, data: Arc<SampleData>) -> Self {
        match install_cjk_font(&cc.egui_ctx, config.cjk_font.as_deref()) {
            Some(path) => tracing::info!(font = %path.display(), "installed CJK font"),
            None => tracing::warn!("no CJK font found; Chinese labels may not render"),
        }

        let mut app = Self {
            control_panel: ControlPanel::new(config.initial_chart, data.seed()),
            chart_viewer: ChartViewer::new(config.show_data),
            data,
        };
        app.select_chart(config.initial_chart);
        app
    }

    /// Rebuild the page for a new selection.
    fn select_chart(&mut self, kind: ChartKind) {
        match ChartDispatcher::dispatch(kind, &self.data) {
            Ok(page) => {
                tracing::info!(chart = %kind, figures = page.figures.len(), "selected chart");
                self.chart_viewer.set_page(page);
                self.control_panel.set_status("Ready");
            }
            Err(e) => {
                tracing::error!(chart = %kind, error = %e, "failed to build chart page");
                self.chart_viewer.set_error(format!("Error: {}", e));
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Save the preview table through a save dialog.
    fn handle_export_table(&mut self) {
        let Some(page) = self.chart_viewer.page() else {
            return;
        };
        let file_name = match page.kind.dataset() {
            Some(key) => format!("{}.csv", key.name()),
            None => "data.csv".to_string(),
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        match export_csv(&page.source, &path) {
            Ok(()) => {
                let status = format!("Exported {}", path.display());
                self.control_panel.set_status(status);
            }
            Err(e) => {
                tracing::error!(error = %e, "CSV export failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for GalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        SidePanel::left("control_panel")
            .min_width(220.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::ChartChanged(kind) => self.select_chart(kind),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.chart_viewer.show(ui) == ChartViewerAction::ExportTable {
                self.handle_export_table();
            }
        });
    }
}

/// Load the configured font, or the first system CJK font found, as the
/// first fallback of both font families. Returns the file used.
fn install_cjk_font(ctx: &egui::Context, configured: Option<&Path>) -> Option<PathBuf> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(CJK_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(font = %path.display(), error = %e, "font not usable");
                continue;
            }
        };

        let mut fonts = FontDefinitions::default();
        fonts
            .font_data
            .insert(CJK_FONT_NAME.to_owned(), Arc::new(FontData::from_owned(bytes)));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts
                .families
                .entry(family)
                .or_default()
                .push(CJK_FONT_NAME.to_owned());
        }
        ctx.set_fonts(fonts);
        return Some(path);
    }

    None
}
