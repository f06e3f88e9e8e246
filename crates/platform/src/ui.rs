//! egui bottom bar: three buttons whose captions mirror the label state.

use corelib::bottom_bar::{BottomBarLabels, Direction, Label, Rgba8};

fn text_color(c: Rgba8) -> egui::Color32 {
    let [r, g, b, a] = c.0;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn label_button(ui: &mut egui::Ui, label: &Label) -> bool {
    let text = egui::RichText::new(label.text)
        .size(18.0)
        .color(text_color(label.color));
    ui.add(egui::Button::new(text).frame(false).min_size(egui::vec2(110.0, 32.0)))
        .clicked()
}

/// Draw the bar. Returns the direction clicked this frame, if any.
pub fn bottom_bar(ctx: &egui::Context, labels: &BottomBarLabels) -> Option<Direction> {
    let mut clicked = None;
    egui::TopBottomPanel::bottom("bottom_bar")
        .exact_height(48.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                let spare = ui.available_width() - 3.0 * 110.0 - 2.0 * ui.spacing().item_spacing.x;
                ui.add_space((spare * 0.5).max(0.0));
                for label in labels.iter() {
                    if label_button(ui, label) {
                        clicked = Some(label.direction);
                    }
                }
            });
        });
    clicked
}

/// Optional status line for maps still loading.
pub fn loading_hint(ctx: &egui::Context, pending: usize) {
    if pending == 0 {
        return;
    }
    egui::Area::new(egui::Id::new("loading_hint"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("Loading {pending} texture map(s)…"))
                    .color(text_color(Rgba8::GREY)),
            );
        });
}
