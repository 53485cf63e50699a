use client_core::{AlertKind, AttachedForm, CalculatorForm, SubmitEvent};
use eframe::egui;
use shared::domain::{FormField, ResultColor};
use tokio::runtime::Runtime;

use crate::controller::events::{UiError, UiErrorCategory};

pub const OPERATORS: [&str; 4] = ["+", "-", "*", "/"];
const DEFAULT_OPERATOR: &str = "+";

/// Widget state of the calculator form.
#[derive(Debug, Clone)]
pub struct FormState {
    pub first_number: String,
    pub operator: String,
    pub second_number: String,
    pub result: String,
    pub result_color: Option<ResultColor>,
    pub alert: Option<UiError>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            first_number: String::new(),
            operator: DEFAULT_OPERATOR.to_string(),
            second_number: String::new(),
            result: String::new(),
            result_color: None,
            alert: None,
        }
    }
}

impl CalculatorForm for FormState {
    fn value(&self, field: FormField) -> String {
        match field {
            FormField::FirstNumber => self.first_number.clone(),
            FormField::Operator => self.operator.clone(),
            FormField::SecondNumber => self.second_number.clone(),
            FormField::Result => self.result.clone(),
        }
    }

    fn set_value(&mut self, field: FormField, value: &str) {
        let target = match field {
            FormField::FirstNumber => &mut self.first_number,
            FormField::Operator => &mut self.operator,
            FormField::SecondNumber => &mut self.second_number,
            FormField::Result => &mut self.result,
        };
        *target = value.to_string();
    }

    fn alert(&mut self, kind: AlertKind, message: &str) {
        self.alert = Some(UiError::new(kind, message));
    }

    /// Restores initial values; a pending alert stays up until dismissed.
    fn reset(&mut self) {
        let alert = self.alert.take();
        *self = Self {
            alert,
            ..Self::default()
        };
    }

    fn set_result_color(&mut self, color: Option<ResultColor>) {
        self.result_color = color;
    }
}

pub struct CalculatorApp {
    form: AttachedForm<FormState>,
    status: String,
    // Drives in-flight requests; dropped with the window.
    _runtime: Runtime,
}

impl CalculatorApp {
    pub fn new(runtime: Runtime, form: AttachedForm<FormState>) -> Self {
        let status = format!("Posting to {}", form.controller().endpoint());
        Self {
            form,
            status,
            _runtime: runtime,
        }
    }

    fn process_completions(&mut self) {
        for request_id in self.form.drain_completed() {
            tracing::debug!(request_id = request_id.0, "applied calculation completion");
            self.status = match &self.form.form().alert {
                Some(_) => "Calculation failed".to_string(),
                None => "Calculation complete".to_string(),
            };
        }
    }

    fn submit(&mut self) {
        let mut event = SubmitEvent::new();
        let request_id = self.form.submit(&mut event);
        self.status = format!("Calculating (request {})...", request_id.0);
    }

    fn show_form(&mut self, ctx: &egui::Context) {
        let modal_open = self.form.form().alert.is_some();
        let mut submit_requested = false;
        let mut request_color = self.form.request_color();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Calculator");
            ui.add_space(8.0);

            ui.add_enabled_ui(!modal_open, |ui| {
                let state = self.form.form_mut();
                egui::Grid::new("calculator-form")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("First number");
                        let first = ui.add(
                            egui::TextEdit::singleline(&mut state.first_number)
                                .id_salt(FormField::FirstNumber.id()),
                        );
                        ui.end_row();

                        ui.label("Operator");
                        egui::ComboBox::from_id_salt(FormField::Operator.id())
                            .selected_text(state.operator.as_str())
                            .show_ui(ui, |ui| {
                                for op in OPERATORS {
                                    ui.selectable_value(&mut state.operator, op.to_string(), op);
                                }
                            });
                        ui.end_row();

                        ui.label("Second number");
                        let second = ui.add(
                            egui::TextEdit::singleline(&mut state.second_number)
                                .id_salt(FormField::SecondNumber.id()),
                        );
                        ui.end_row();

                        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
                        if enter && (first.lost_focus() || second.lost_focus()) {
                            submit_requested = true;
                        }

                        ui.label("Result");
                        let mut shown = state.result.clone();
                        let mut result_edit = egui::TextEdit::singleline(&mut shown)
                            .id_salt(FormField::Result.id())
                            .interactive(false);
                        if let Some(color) = state.result_color {
                            result_edit = result_edit.text_color(result_tint(color));
                        }
                        ui.add(result_edit);
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Calculate").clicked() {
                        submit_requested = true;
                    }
                    ui.checkbox(&mut request_color, "Color by parity");
                });
            });

            ui.add_space(12.0);
            ui.separator();
            ui.small(self.status.as_str());
        });

        if request_color != self.form.request_color() {
            self.form.set_request_color(request_color);
        }
        if submit_requested {
            self.submit();
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.form.form().alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(alert.message());
                if let Some(hint) = alert.hint() {
                    ui.small(hint);
                }
                if alert.category() == UiErrorCategory::Transport {
                    ui.small(format!("Endpoint: {}", self.form.controller().endpoint()));
                }
                ui.add_space(6.0);
                if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    dismissed = true;
                }
            });

        if dismissed {
            self.form.form_mut().alert = None;
        }
    }
}

fn result_tint(color: ResultColor) -> egui::Color32 {
    match color {
        ResultColor::Red => egui::Color32::from_rgb(0xd9, 0x3f, 0x3f),
        ResultColor::Green => egui::Color32::from_rgb(0x3f, 0xa8, 0x5a),
    }
}

impl eframe::App for CalculatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_completions();
        self.show_form(ctx);
        self.show_alert(ctx);

        // Completions arrive off the UI thread; poll for them.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
