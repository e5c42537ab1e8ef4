use crate::catalog::Profile;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(251, 191, 36);

pub fn show(ui: &mut egui::Ui, profile: &Profile) {
    egui::ScrollArea::vertical()
        .id_salt("about_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(24.0);
                let name = if profile.name.is_empty() {
                    "About the Artist"
                } else {
                    profile.name.as_str()
                };
                ui.heading(egui::RichText::new(name).size(32.0).strong());
                if !profile.tagline.is_empty() {
                    ui.label(egui::RichText::new(&profile.tagline).color(ACCENT));
                }
                ui.add_space(16.0);
            });

            if profile.bio.is_empty() && profile.achievements.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("No profile details yet").weak());
                });
                return;
            }

            for paragraph in &profile.bio {
                ui.label(paragraph.as_str());
                ui.add_space(8.0);
            }

            if !profile.achievements.is_empty() {
                ui.add_space(12.0);
                ui.label(egui::RichText::new("Achievements").strong().size(18.0));
                ui.separator();
                egui::Grid::new("achievements_grid")
                    .num_columns(2)
                    .spacing([16.0, 8.0])
                    .show(ui, |ui| {
                        for item in &profile.achievements {
                            ui.label(
                                egui::RichText::new(item.year.as_deref().unwrap_or(""))
                                    .color(ACCENT)
                                    .monospace(),
                            );
                            ui.vertical(|ui| {
                                ui.label(egui::RichText::new(&item.title).strong());
                                if !item.detail.is_empty() {
                                    ui.label(egui::RichText::new(&item.detail).weak());
                                }
                            });
                            ui.end_row();
                        }
                    });
            }
        });
}
