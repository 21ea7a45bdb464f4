// Modal dialogs: the controller files a request through DialogPresenter,
// the shell renders it here and feeds the answer back next frame.
use eframe::egui;

use crate::services::DialogPresenter;

#[derive(Debug, Clone, PartialEq)]
pub enum PendingDialog {
    Alert { title: String, message: String },
    Choice { title: String, options: Vec<String> },
    TextInput { title: String, buffer: String },
}

/// What the user did with the pending dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogAnswer {
    /// Index into the presented options; None is cancel.
    Choice(Option<usize>),
    /// Submitted text; None is cancel.
    Text(Option<String>),
    Dismissed,
}

#[derive(Default)]
pub struct Dialogs {
    pending: Option<PendingDialog>,
}

impl Dialogs {
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    fn set(&mut self, dialog: PendingDialog) {
        if self.pending.is_some() {
            log::debug!("replacing pending dialog");
        }
        self.pending = Some(dialog);
    }

    /// Renders the pending dialog, if any. Returns the answer once the user
    /// commits; the dialog closes with it.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<DialogAnswer> {
        let Some(pending) = &mut self.pending else {
            return None;
        };

        let mut answer = None;
        match pending {
            PendingDialog::Alert { title, message } => {
                egui::Window::new(title.as_str())
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.label(message.as_str());
                        ui.add_space(8.0);
                        if ui.button("OK").clicked() {
                            answer = Some(DialogAnswer::Dismissed);
                        }
                    });
            }
            PendingDialog::Choice { title, options } => {
                egui::Window::new(title.as_str())
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        for (index, option) in options.iter().enumerate() {
                            if ui.button(option).clicked() {
                                answer = Some(DialogAnswer::Choice(Some(index)));
                            }
                        }
                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            answer = Some(DialogAnswer::Choice(None));
                        }
                    });
            }
            PendingDialog::TextInput { title, buffer } => {
                egui::Window::new(title.as_str())
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        let edit = ui.text_edit_singleline(buffer);
                        edit.request_focus();
                        let submitted = edit.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            if ui.button("Go").clicked() || submitted {
                                answer = Some(DialogAnswer::Text(Some(buffer.clone())));
                            }
                            if ui.button("Cancel").clicked()
                                || ui.input(|i| i.key_pressed(egui::Key::Escape))
                            {
                                answer = Some(DialogAnswer::Text(None));
                            }
                        });
                    });
            }
        }

        if answer.is_some() {
            self.pending = None;
        }
        answer
    }
}

impl DialogPresenter for Dialogs {
    fn present_alert(&mut self, title: &str, message: &str) {
        self.set(PendingDialog::Alert { title: title.to_string(), message: message.to_string() });
    }

    fn present_choice(&mut self, title: &str, options: &[&str]) {
        self.set(PendingDialog::Choice {
            title: title.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
        });
    }

    fn present_text_input(&mut self, title: &str) {
        self.set(PendingDialog::TextInput { title: title.to_string(), buffer: String::new() });
    }
}
