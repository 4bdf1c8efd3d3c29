//! Chart Viewer Widget
//! Central scrollable page: heading, figures and the data preview.

use crate::charts::{ChartPage, ChartPlotter, TablePreview};
use crate::data::TableView;
use egui::{Color32, RichText, ScrollArea};

const FIGURE_HEIGHT: f32 = 420.0;
const FIGURE_SPACING: f32 = 15.0;
const TABLE_MAX_HEIGHT: f32 = 320.0;

/// Scrollable page for the current selection.
#[derive(Default)]
pub struct ChartViewer {
    page: Option<ChartPage>,
    table: TableView,
    error: Option<String>,
    pub show_data: bool,
}

impl ChartViewer {
    pub fn new(show_data: bool) -> Self {
        Self {
            show_data,
            ..Self::default()
        }
    }

    /// Replace the page; the preview table is formatted once here.
    pub fn set_page(&mut self, page: ChartPage) {
        self.table = match page.preview {
            TablePreview::Table => TableView::from_dataframe(&page.source),
            TablePreview::Note(_) | TablePreview::Hidden => TableView::default(),
        };
        self.error = None;
        self.page = Some(page);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.page = None;
        self.table = TableView::default();
        self.error = Some(message.into());
    }

    pub fn page(&self) -> Option<&ChartPage> {
        self.page.as_ref()
    }

    /// Draw the page
    pub fn show(&mut self, ui: &mut egui::Ui) -> ChartViewerAction {
        let mut action = ChartViewerAction::None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new("📊 Plotly图表类型示例大全").size(26.0).strong());
                ui.label(
                    RichText::new("使用Plotly和Streamlit创建的各种图表类型演示")
                        .size(13.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(10.0);

                if let Some(error) = &self.error {
                    ui.label(RichText::new(error).size(14.0).color(Color32::from_rgb(220, 53, 69)));
                    return;
                }
                let Some(page) = &self.page else {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                    });
                    return;
                };

                ui.label(RichText::new(&page.heading).size(22.0).strong());
                ui.add_space(6.0);
                ui.label(RichText::new(&page.subheading).size(18.0));
                ui.label(&page.description);
                ui.add_space(FIGURE_SPACING);

                for figure in &page.figures {
                    if let Some(heading) = &figure.heading {
                        ui.label(RichText::new(heading).size(18.0));
                        ui.add_space(4.0);
                    }
                    egui::Frame::none()
                        .rounding(8.0)
                        .fill(ui.visuals().widgets.noninteractive.bg_fill)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ChartPlotter::draw_figure(ui, figure, FIGURE_HEIGHT);
                        });
                    ui.add_space(FIGURE_SPACING);
                }

                let response = egui::CollapsingHeader::new("查看当前图表使用的数据")
                    .default_open(self.show_data)
                    .show(ui, |ui| match &page.preview {
                        TablePreview::Table => {
                            if Self::draw_table(ui, &self.table) {
                                action = ChartViewerAction::ExportTable;
                            }
                        }
                        TablePreview::Note(text) => {
                            ui.label(text);
                        }
                        TablePreview::Hidden => {}
                    });
                self.show_data = response.fully_open();
            });

        action
    }

    /// Striped grid of the preview rows; returns true when export is clicked.
    fn draw_table(ui: &mut egui::Ui, table: &TableView) -> bool {
        let mut export = false;
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{} rows × {} columns", table.row_count(), table.columns.len()))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
            if ui.small_button("💾 Export CSV").clicked() {
                export = true;
            }
        });
        ui.add_space(5.0);

        ScrollArea::both()
            .id_salt("data_preview")
            .max_height(TABLE_MAX_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new("data_preview_grid")
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for column in &table.columns {
                            ui.label(RichText::new(column).strong());
                        }
                        ui.end_row();

                        for (i, row) in table.rows.iter().enumerate() {
                            ui.label(RichText::new(i.to_string()).color(Color32::GRAY));
                            for cell in row {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });

        export
    }
}

/// Actions triggered by the chart page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartViewerAction {
    None,
    ExportTable,
}
