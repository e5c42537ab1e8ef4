use std::sync::Arc;

use crate::{
    about,
    catalog::{Portfolio, Profile},
    config::AppConfig,
    contact::ContactPanel,
    filter::Category,
    gallery::Gallery,
    resume::ResumePanel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Gallery,
    About,
    Resume,
    Contact,
}

impl Section {
    const ALL: [Section; 4] = [
        Section::Gallery,
        Section::About,
        Section::Resume,
        Section::Contact,
    ];

    fn label(self) -> &'static str {
        match self {
            Section::Gallery => "Gallery",
            Section::About => "About",
            Section::Resume => "Resume",
            Section::Contact => "Contact",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Section::Gallery => "gallery",
            Section::About => "about",
            Section::Resume => "resume",
            Section::Contact => "contact",
        }
    }

    fn from_key(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.key() == key)
    }
}

pub struct FolioApp {
    section: Section,
    profile: Profile,
    gallery: Gallery,
    resume: ResumePanel,
    contact: ContactPanel,
    /// Shown in place of the gallery when the portfolio file could not be read.
    load_error: Option<String>,
    config: AppConfig,
}

impl FolioApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        portfolio: anyhow::Result<Portfolio>,
    ) -> Self {
        Self::from_parts(config, portfolio)
    }

    fn from_parts(config: AppConfig, portfolio: anyhow::Result<Portfolio>) -> Self {
        let (portfolio, load_error) = match portfolio {
            Ok(p) => (p, None),
            Err(err) => (Portfolio::default(), Some(format!("{err:#}"))),
        };
        let initial = config
            .last_category
            .as_deref()
            .map(Category::from_name)
            .unwrap_or_default();
        let section = config
            .last_section
            .as_deref()
            .and_then(Section::from_key)
            .unwrap_or_default();

        Self {
            section,
            profile: portfolio.profile,
            gallery: Gallery::new(Arc::new(portfolio.catalog), initial),
            resume: ResumePanel::new(portfolio.resume),
            contact: ContactPanel::new(config.contact_endpoint()),
            load_error,
            config,
        }
    }

    fn switch_to(&mut self, section: Section) {
        if section == self.section {
            return;
        }
        self.gallery.close_viewer();
        tracing::debug!(section = section.key(), "section changed");
        self.section = section;
    }

    fn show_nav(&mut self, ui: &mut egui::Ui) {
        let mut picked = None;
        ui.horizontal(|ui| {
            let title = if self.profile.name.is_empty() {
                "Folio"
            } else {
                self.profile.name.as_str()
            };
            ui.label(egui::RichText::new(title).strong().size(18.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                for section in Section::ALL.into_iter().rev() {
                    if ui
                        .selectable_label(section == self.section, section.label())
                        .clicked()
                    {
                        picked = Some(section);
                    }
                }
            });
        });
        if let Some(section) = picked {
            self.switch_to(section);
        }
    }

    fn show_load_error(&self, ui: &mut egui::Ui) {
        let Some(err) = &self.load_error else {
            return;
        };
        ui.colored_label(
            ui.visuals().warn_fg_color,
            format!("⚠ Portfolio not loaded: {err}"),
        );
        if let Some(path) = AppConfig::config_path() {
            ui.label(
                egui::RichText::new(format!(
                    "Set portfolio_path in {} or the FOLIO_PORTFOLIO variable.",
                    path.display()
                ))
                .weak(),
            );
        }
        ui.separator();
    }
}

impl eframe::App for FolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window size for saving on exit
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_width = Some(rect.width());
            self.config.window_height = Some(rect.height());
        }

        egui::TopBottomPanel::top("site_nav").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_nav(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.section {
            Section::Gallery => {
                self.show_load_error(ui);
                self.gallery.show(ui);
            }
            Section::About => about::show(ui, &self.profile),
            Section::Resume => self.resume.show(ui),
            Section::Contact => self.contact.show(ui),
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.last_category = Some(self.gallery.selected().name().to_string());
        self.config.last_section = Some(self.section.key().to_string());
        self.config.save();
    }
}
