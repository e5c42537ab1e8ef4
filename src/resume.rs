use std::{
    path::{Path, PathBuf},
    sync::mpsc,
};

use anyhow::Context;

use crate::{
    catalog::{ImageSource, Resume, ResumeItem},
    loader::read_source,
};

const ACCENT: egui::Color32 = egui::Color32::from_rgb(251, 191, 36);
const CARD_WIDTH: f32 = 300.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CvDownload {
    Idle,
    Pending,
    Saved(PathBuf),
    Failed(String),
}

/// Name the CV is saved under: the locator's last segment without any query.
fn cv_file_name(src: &ImageSource) -> String {
    let name = src.display_name();
    let name = name.split(['?', '#']).next().unwrap_or_default();
    if name.is_empty() {
        "cv.pdf".to_string()
    } else {
        name.to_string()
    }
}

/// `dir/name`, or `dir/stem-N.ext` for the first N that is not taken.
fn unused_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem}-{n}.{ext}")),
            None => dir.join(format!("{stem}-{n}")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Copies the CV into `dest_dir` without overwriting anything there.
fn save_cv<F>(src: &ImageSource, dest_dir: &Path, fetch: F) -> anyhow::Result<PathBuf>
where
    F: Fn(&ImageSource) -> anyhow::Result<Vec<u8>>,
{
    let bytes = fetch(src)?;
    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("creating {}", dest_dir.display()))?;
    let dest = unused_path(dest_dir, &cv_file_name(src));
    std::fs::write(&dest, bytes).with_context(|| format!("writing {}", dest.display()))?;
    Ok(dest)
}

/// Resume section: experience, education, skills and the CV download.
pub struct ResumePanel {
    resume: Resume,
    download: CvDownload,
    rx: Option<mpsc::Receiver<anyhow::Result<PathBuf>>>,
}

impl ResumePanel {
    pub fn new(resume: Resume) -> Self {
        Self {
            resume,
            download: CvDownload::Idle,
            rx: None,
        }
    }

    fn start_download(&mut self, ctx: &egui::Context) {
        let Some(src) = self.resume.cv.clone() else {
            return;
        };
        let Some(dest_dir) = dirs::download_dir().or_else(dirs::home_dir) else {
            self.download = CvDownload::Failed("no download folder available".to_string());
            return;
        };
        self.start_download_with(ctx, move || save_cv(&src, &dest_dir, read_source));
    }

    fn start_download_with<F>(&mut self, ctx: &egui::Context, job: F)
    where
        F: FnOnce() -> anyhow::Result<PathBuf> + Send + 'static,
    {
        if self.download == CvDownload::Pending {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let ctx2 = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(job());
            ctx2.request_repaint();
        });
        self.download = CvDownload::Pending;
        self.rx = Some(rx);
    }

    fn poll(&mut self) {
        let Some(rx) = self.rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(path)) => {
                tracing::info!(path = %path.display(), "cv saved");
                self.download = CvDownload::Saved(path);
            }
            Ok(Err(err)) => {
                tracing::warn!("cv download failed: {err:#}");
                self.download = CvDownload::Failed(format!("{err:#}"));
            }
            Err(mpsc::TryRecvError::Empty) => self.rx = Some(rx),
            Err(mpsc::TryRecvError::Disconnected) => {
                self.download = CvDownload::Failed("download worker stopped".to_string());
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.poll();

        egui::ScrollArea::vertical()
            .id_salt("resume_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.label(
                        egui::RichText::new("PROFESSIONAL JOURNEY")
                            .size(12.0)
                            .color(ACCENT),
                    );
                    ui.heading(egui::RichText::new("My Resume").size(32.0).strong());
                    ui.add_space(8.0);
                    self.show_download(ui);
                    ui.add_space(16.0);
                });

                if self.resume.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.label(egui::RichText::new("No resume details yet").weak());
                    });
                    return;
                }

                item_section(ui, "Professional Experience", &self.resume.experience);
                item_section(ui, "Education", &self.resume.education);

                if !self.resume.skills.is_empty() {
                    section_heading(ui, "Skills & Expertise");
                    for group in &self.resume.skills {
                        ui.label(egui::RichText::new(&group.category).strong());
                        ui.horizontal_wrapped(|ui| {
                            for skill in &group.skills {
                                ui.label(
                                    egui::RichText::new(skill)
                                        .color(ACCENT)
                                        .background_color(ACCENT.gamma_multiply(0.12)),
                                );
                            }
                        });
                        ui.add_space(8.0);
                    }
                }
            });
    }

    fn show_download(&mut self, ui: &mut egui::Ui) {
        if self.resume.cv.is_none() {
            return;
        }
        let pending = self.download == CvDownload::Pending;
        if ui
            .add_enabled(!pending, egui::Button::new("⬇ Download CV"))
            .on_hover_text("Save a copy to your downloads folder")
            .clicked()
        {
            let ctx = ui.ctx().clone();
            self.start_download(&ctx);
        }
        match &self.download {
            CvDownload::Idle => {}
            CvDownload::Pending => {
                ui.spinner();
            }
            CvDownload::Saved(path) => {
                ui.label(egui::RichText::new(format!("Saved to {}", path.display())).weak());
            }
            CvDownload::Failed(err) => {
                ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {err}"));
            }
        }
    }
}

fn section_heading(ui: &mut egui::Ui, title: &str) {
    ui.add_space(12.0);
    ui.label(egui::RichText::new(title).strong().size(20.0));
    ui.separator();
}

fn item_section(ui: &mut egui::Ui, title: &str, items: &[ResumeItem]) {
    if items.is_empty() {
        return;
    }
    section_heading(ui, title);
    ui.horizontal_wrapped(|ui| {
        for item in items {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.label(egui::RichText::new(&item.title).strong().size(16.0));
                let org = match (item.org.is_empty(), item.period.is_empty()) {
                    (false, false) => format!("{} | {}", item.org, item.period),
                    (false, true) => item.org.clone(),
                    (true, _) => item.period.clone(),
                };
                if !org.is_empty() {
                    ui.label(egui::RichText::new(org).color(ACCENT));
                }
                if !item.detail.is_empty() {
                    ui.label(egui::RichText::new(&item.detail).weak());
                }
            });
        }
    });
}
