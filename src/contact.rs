use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// How long the thank-you banner stays up after a successful send.
const SENT_BANNER: Duration = Duration::from_secs(5);
const MIN_MESSAGE_CHARS: usize = 20;

pub const PROJECT_TYPES: [&str; 7] = [
    "Commission Artwork",
    "Gallery Exhibition",
    "Speed Painting Live Performance",
    "Commercial Project",
    "Portrait Session",
    "Consultation",
    "Other",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(rename = "projectType")]
    pub project_type: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub project_type: Option<&'static str>,
    pub message: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.project_type.is_none()
            && self.message.is_none()
    }
}

impl ContactForm {
    pub fn validate(&self) -> FieldErrors {
        FieldErrors {
            name: (!is_valid_name(&self.name)).then_some("Enter a valid name"),
            email: (!is_valid_email(&self.email)).then_some("Enter a valid email"),
            project_type: self
                .project_type
                .is_none()
                .then_some("Select a project type"),
            message: (self.message.trim().chars().count() < MIN_MESSAGE_CHARS)
                .then_some("Minimum 20 characters required"),
        }
    }
}

/// 2 to 50 letters or spaces once trimmed.
fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    let len = name.chars().count();
    (2..=50).contains(&len)
        && name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let last = domain.len().saturating_sub(1);
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i < last)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitState {
    Idle,
    Pending,
    Sent(Instant),
    Failed(String),
}

#[derive(Debug, Default, Deserialize)]
struct SubmitReply {
    ok: Option<bool>,
    error: Option<String>,
}

/// Posts the form as JSON to a form-handling endpoint.
fn post_form(endpoint: &str, form: &ContactForm) -> anyhow::Result<()> {
    let body = serde_json::to_string(form).context("encoding contact form")?;
    let response = ureq::post(endpoint)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json")
        .send_string(&body)
        .with_context(|| format!("posting to {endpoint}"))?;
    let reply: SubmitReply =
        serde_json::from_reader(response.into_reader()).unwrap_or_default();
    if reply.ok == Some(false) {
        anyhow::bail!(reply.error.unwrap_or_else(|| "submission rejected".to_string()));
    }
    Ok(())
}

/// Contact section: field state, validation and background submission.
pub struct ContactPanel {
    form: ContactForm,
    errors: FieldErrors,
    state: SubmitState,
    endpoint: String,
    rx: Option<mpsc::Receiver<anyhow::Result<()>>>,
}

impl ContactPanel {
    pub fn new(endpoint: String) -> Self {
        Self {
            form: ContactForm::default(),
            errors: FieldErrors::default(),
            state: SubmitState::Idle,
            endpoint,
            rx: None,
        }
    }

    /// Validates and, when valid, sends on a background thread.
    pub fn submit(&mut self, ctx: &egui::Context) {
        let endpoint = self.endpoint.clone();
        self.submit_with(ctx, move |form| post_form(&endpoint, form));
    }

    fn submit_with<F>(&mut self, ctx: &egui::Context, post: F)
    where
        F: FnOnce(&ContactForm) -> anyhow::Result<()> + Send + 'static,
    {
        if self.state == SubmitState::Pending {
            return;
        }
        self.errors = self.form.validate();
        if !self.errors.is_empty() {
            return;
        }

        let form = self.form.clone();
        let (tx, rx) = mpsc::channel();
        let ctx2 = ctx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(post(&form));
            ctx2.request_repaint();
        });
        self.state = SubmitState::Pending;
        self.rx = Some(rx);
    }

    pub fn poll(&mut self) {
        let Some(rx) = self.rx.take() else {
            if let SubmitState::Sent(at) = self.state {
                if at.elapsed() >= SENT_BANNER {
                    self.state = SubmitState::Idle;
                }
            }
            return;
        };
        match rx.try_recv() {
            Ok(Ok(())) => {
                tracing::info!("contact form sent");
                self.form = ContactForm::default();
                self.state = SubmitState::Sent(Instant::now());
            }
            Ok(Err(err)) => {
                tracing::warn!("contact form failed: {err:#}");
                self.state = SubmitState::Failed(format!("{err:#}"));
            }
            Err(mpsc::TryRecvError::Empty) => self.rx = Some(rx),
            Err(mpsc::TryRecvError::Disconnected) => {
                self.state = SubmitState::Failed("submission worker stopped".to_string());
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.poll();
        if let SubmitState::Sent(at) = self.state {
            ui.ctx()
                .request_repaint_after(SENT_BANNER.saturating_sub(at.elapsed()));
        }

        egui::ScrollArea::vertical()
            .id_salt("contact_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(24.0);
                    ui.heading(egui::RichText::new("Share Your Vision").size(32.0).strong());
                    ui.label(
                        egui::RichText::new(
                            "Every creative journey starts with a message. Let's make yours count.",
                        )
                        .weak(),
                    );
                    ui.add_space(16.0);
                });

                match &self.state {
                    SubmitState::Sent(_) => {
                        ui.colored_label(
                            egui::Color32::from_rgb(251, 191, 36),
                            "Thank you! I'll be in touch shortly.",
                        );
                    }
                    SubmitState::Failed(err) => {
                        ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {err}"));
                    }
                    SubmitState::Idle | SubmitState::Pending => {}
                }
                ui.add_space(8.0);

                self.show_fields(ui);

                ui.add_space(12.0);
                let pending = self.state == SubmitState::Pending;
                let label = if pending { "Sending..." } else { "Send Message" };
                let clicked = ui
                    .add_enabled(!pending, egui::Button::new(label))
                    .clicked();
                if pending {
                    ui.spinner();
                }
                if clicked {
                    let ctx = ui.ctx().clone();
                    self.submit(&ctx);
                }
            });
    }

    fn show_fields(&mut self, ui: &mut egui::Ui) {
        let error = |ui: &mut egui::Ui, msg: Option<&str>| {
            if let Some(msg) = msg {
                ui.colored_label(ui.visuals().error_fg_color, msg);
            }
        };

        ui.label("Full Name *");
        if ui
            .add(egui::TextEdit::singleline(&mut self.form.name).hint_text("Your name"))
            .changed()
        {
            self.errors.name = None;
        }
        error(ui, self.errors.name);

        ui.label("Email *");
        if ui
            .add(egui::TextEdit::singleline(&mut self.form.email).hint_text("you@example.com"))
            .changed()
        {
            self.errors.email = None;
        }
        error(ui, self.errors.email);

        ui.label("Project Type *");
        let selected = self
            .form
            .project_type
            .clone()
            .unwrap_or_else(|| "Select a project type".to_string());
        egui::ComboBox::from_id_salt("project_type")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for kind in PROJECT_TYPES {
                    let is_sel = self.form.project_type.as_deref() == Some(kind);
                    if ui.selectable_label(is_sel, kind).clicked() {
                        self.form.project_type = Some(kind.to_string());
                        self.errors.project_type = None;
                    }
                }
            });
        error(ui, self.errors.project_type);

        ui.label("Message *");
        if ui
            .add(
                egui::TextEdit::multiline(&mut self.form.message)
                    .hint_text("Tell me about your project...")
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            )
            .changed()
        {
            self.errors.message = None;
        }
        error(ui, self.errors.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            project_type: Some(PROJECT_TYPES[0].into()),
            message: "I would love a portrait of my late cat.".into(),
        }
    }

    fn wait_for_result(panel: &mut ContactPanel) {
        for _ in 0..200 {
            panel.poll();
            if panel.state != SubmitState::Pending {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("submission never finished");
    }

    #[test]
    fn complete_form_validates() {
        assert!(filled().validate().is_empty());
    }

    #[test]
    fn each_field_has_its_own_error() {
        let errors = ContactForm::default().validate();
        assert_eq!(errors.name, Some("Enter a valid name"));
        assert_eq!(errors.email, Some("Enter a valid email"));
        assert_eq!(errors.project_type, Some("Select a project type"));
        assert_eq!(errors.message, Some("Minimum 20 characters required"));
    }

    #[test]
    fn name_rules() {
        assert!(is_valid_name("  Jo  "));
        assert!(!is_valid_name("J"));
        assert!(!is_valid_name("R2 D2"));
        assert!(!is_valid_name(&"a".repeat(51)));
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("@c.com"));
    }

    #[test]
    fn short_message_is_rejected_after_trimming() {
        let mut form = filled();
        form.message = format!("   {}   ", "x".repeat(19));
        assert!(form.validate().message.is_some());
    }

    #[test]
    fn payload_uses_camel_case_project_type() {
        let json = serde_json::to_value(filled()).unwrap();
        assert_eq!(json["projectType"], "Commission Artwork");
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn invalid_form_is_not_sent() {
        let mut panel = ContactPanel::new("http://unused".into());
        panel.submit_with(&egui::Context::default(), |_| panic!("must not post"));
        assert_eq!(panel.state, SubmitState::Idle);
        assert!(!panel.errors.is_empty());
    }

    #[test]
    fn successful_send_clears_the_form() {
        let mut panel = ContactPanel::new("http://unused".into());
        panel.form = filled();
        panel.submit_with(&egui::Context::default(), |_| Ok(()));
        assert_eq!(panel.state, SubmitState::Pending);
        wait_for_result(&mut panel);
        assert!(matches!(panel.state, SubmitState::Sent(_)));
        assert_eq!(panel.form, ContactForm::default());
    }

    #[test]
    fn failed_send_keeps_fields_and_reports() {
        let mut panel = ContactPanel::new("http://unused".into());
        panel.form = filled();
        panel.submit_with(&egui::Context::default(), |_| anyhow::bail!("503"));
        wait_for_result(&mut panel);
        assert_eq!(panel.state, SubmitState::Failed("503".into()));
        assert_eq!(panel.form, filled());
    }
}
