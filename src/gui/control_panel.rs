//! Control Panel Widget
//! Left side panel with the chart-type selector and usage notes.

use crate::charts::ChartKind;
use egui::{Color32, ComboBox, RichText};

const USAGE_NOTES: [&str; 4] = [
    "从左侧选择图表类型",
    "图表将显示在右侧主区域",
    "可以悬停在图表上查看详细信息",
    "拖动平移、滚轮缩放、双击复位",
];

/// Left side panel holding the current selection and a status line.
pub struct ControlPanel {
    pub selected: ChartKind,
    pub seed: u64,
    pub status: String,
}

impl ControlPanel {
    pub fn new(selected: ChartKind, seed: u64) -> Self {
        Self {
            selected,
            seed,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 图表示例")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new(format!("seed {}", self.seed))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        ui.label(RichText::new("选择图表类型").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("chart_kind")
            .width(ui.available_width() - 10.0)
            .selected_text(self.selected.label())
            .height(500.0)
            .show_ui(ui, |ui| {
                for kind in ChartKind::ALL {
                    if ui
                        .selectable_label(self.selected == kind, kind.label())
                        .clicked()
                        && self.selected != kind
                    {
                        self.selected = kind;
                        action = ControlPanelAction::ChartChanged(kind);
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new("使用说明").size(14.0).strong());
                ui.add_space(4.0);
                for (i, note) in USAGE_NOTES.iter().enumerate() {
                    ui.label(RichText::new(format!("{}. {}", i + 1, note)).size(12.0));
                }
            });

        ui.add_space(15.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPanelAction {
    None,
    ChartChanged(ChartKind),
}
