use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, AlertKind, CalculatorForm, FormController, SubmitEvent};
use shared::domain::{FormField, FormValues, ResultColor};
use tracing_subscriber::EnvFilter;

/// Fills the calculator form from the command line and submits it once.
#[derive(Parser, Debug)]
#[command(name = "calc-cli")]
struct Args {
    /// Page the `api/calculate` endpoint is resolved against.
    #[arg(long)]
    page_url: Option<String>,
    /// Ask the service for the parity color of the result.
    #[arg(long)]
    color: bool,
    #[arg(long)]
    timeout_secs: Option<u64>,
    first_number: String,
    operator: String,
    second_number: String,
}

/// Form backed by the process arguments; alerts go to stderr.
#[derive(Debug)]
struct TerminalForm {
    values: FormValues,
    result: String,
    color: Option<ResultColor>,
    alerted: bool,
    result_written: bool,
}

/// How a single submission ended, as seen from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Printed,
    Alerted,
    /// A 2xx response with no usable `result`; the form was left untouched.
    NoResult,
}

impl TerminalForm {
    fn new(values: FormValues) -> Self {
        Self {
            values,
            result: String::new(),
            color: None,
            alerted: false,
            result_written: false,
        }
    }

    fn status(&self) -> RunStatus {
        if self.alerted {
            RunStatus::Alerted
        } else if self.result_written {
            RunStatus::Printed
        } else {
            RunStatus::NoResult
        }
    }
}

impl CalculatorForm for TerminalForm {
    fn value(&self, field: FormField) -> String {
        match field {
            FormField::FirstNumber => self.values.first_number.clone(),
            FormField::Operator => self.values.operator.clone(),
            FormField::SecondNumber => self.values.second_number.clone(),
            FormField::Result => self.result.clone(),
        }
    }

    fn set_value(&mut self, field: FormField, value: &str) {
        match field {
            FormField::FirstNumber => self.values.first_number = value.to_string(),
            FormField::Operator => self.values.operator = value.to_string(),
            FormField::SecondNumber => self.values.second_number = value.to_string(),
            FormField::Result => {
                self.result = value.to_string();
                self.result_written = true;
            }
        }
    }

    fn alert(&mut self, kind: AlertKind, message: &str) {
        tracing::debug!(?kind, "calculation alert");
        eprintln!("{message}");
        self.alerted = true;
    }

    fn reset(&mut self) {
        self.values = FormValues::default();
        self.result.clear();
        self.result_written = false;
        self.color = None;
    }

    fn set_result_color(&mut self, color: Option<ResultColor>) {
        self.color = color;
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(page_url) = args.page_url {
        settings.page_url = page_url;
    }
    if args.color {
        settings.request_color = true;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }

    let controller = FormController::from_settings(&settings, tokio::runtime::Handle::current())
        .context("failed to set up calculator client")?;
    tracing::debug!(endpoint = %controller.endpoint(), "resolved calculation endpoint");

    let form = TerminalForm::new(FormValues::new(
        args.first_number,
        args.operator,
        args.second_number,
    ));
    let mut attached = controller.attach(form);
    attached.submit(&mut SubmitEvent::new());
    attached
        .next_completed()
        .await
        .context("calculation completion channel closed")?;

    let form = attached.detach();
    match form.status() {
        RunStatus::Alerted => Ok(ExitCode::FAILURE),
        RunStatus::NoResult => {
            eprintln!("Error: response carried no result");
            Ok(ExitCode::FAILURE)
        }
        RunStatus::Printed => {
            match form.color {
                Some(color) => println!("{} ({color:?})", form.result),
                None => println!("{}", form.result),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_fields_verbatim() {
        let args = Args::try_parse_from(["calc-cli", "3", "+", "4"]).expect("args");
        assert_eq!(args.first_number, "3");
        assert_eq!(args.operator, "+");
        assert_eq!(args.second_number, "4");
        assert!(!args.color);
        assert!(args.page_url.is_none());
    }

    #[test]
    fn accepts_page_url_and_color_flags() {
        let args = Args::try_parse_from([
            "calc-cli",
            "--page-url",
            "http://calc.local/app/",
            "--color",
            "--",
            "-2",
            "*",
            "5",
        ])
        .expect("args");
        assert_eq!(args.page_url.as_deref(), Some("http://calc.local/app/"));
        assert!(args.color);
        assert_eq!(args.first_number, "-2");
    }

    #[test]
    fn reset_clears_terminal_form() {
        let mut form = TerminalForm::new(FormValues::new("2", "/", "0"));
        form.set_value(FormField::Result, "1");
        form.alert(AlertKind::Rejected, "Error: Cannot divide by zero.");
        form.reset();
        assert!(form.alerted);
        assert_eq!(form.values(), FormValues::default());
        assert_eq!(form.value(FormField::Result), "");
        assert_eq!(form.status(), RunStatus::Alerted);
    }

    #[test]
    fn untouched_result_is_a_failed_run() {
        let form = TerminalForm::new(FormValues::new("3", "+", "4"));
        assert_eq!(form.status(), RunStatus::NoResult);
    }

    #[test]
    fn empty_written_result_still_prints() {
        let mut form = TerminalForm::new(FormValues::new("3", "+", "4"));
        form.set_value(FormField::Result, "");
        assert_eq!(form.status(), RunStatus::Printed);

        form.set_value(FormField::Result, "7");
        assert_eq!(form.status(), RunStatus::Printed);
    }
}
