//! Calculator form controller: submit interception, request dispatch, and
//! application of completions back onto the form.

use std::sync::Arc;

use shared::{
    domain::{FormField, FormValues, ResultColor},
    error::{ErrorResponse, WireError},
    protocol::{CalculationRequest, CalculationResponse},
};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    error::ClientError,
    transport::{HttpRequest, ReqwestTransport, Transport},
};

const ALERT_PREFIX: &str = "Error: ";

/// The view the controller drives. Implementations own the actual widgets.
pub trait CalculatorForm {
    fn value(&self, field: FormField) -> String;
    fn set_value(&mut self, field: FormField, value: &str);
    /// Shows a message the user has to acknowledge.
    fn alert(&mut self, kind: AlertKind, message: &str);
    /// Restores every field, inputs and result alike, to its initial state.
    fn reset(&mut self);
    fn set_result_color(&mut self, _color: Option<ResultColor>) {}

    fn values(&self) -> FormValues {
        FormValues {
            first_number: self.value(FormField::FirstNumber),
            operator: self.value(FormField::Operator),
            second_number: self.value(FormField::SecondNumber),
        }
    }
}

/// A submit about to trigger the form's native action.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Why an alert is raised, so views need not parse the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// The service answered with a `detail` message.
    Rejected,
    /// The service answered non-2xx without a usable `detail`.
    Unexpected,
    /// No answer: connect failure, timeout, broken response stream.
    Unreachable,
}

#[derive(Debug)]
pub enum CalculationOutcome {
    Success(CalculationResponse),
    /// Non-2xx answer. `message` is `detail[0].msg` when the body has one.
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// 2xx answer whose body has no usable `result`.
    MalformedResult {
        status: u16,
        error: WireError,
    },
    Failed(ClientError),
}

impl CalculationOutcome {
    fn from_response(status: u16, body: &[u8], success: bool) -> Self {
        if success {
            return match CalculationResponse::from_slice(body) {
                Ok(response) => Self::Success(response),
                Err(error) => Self::MalformedResult { status, error },
            };
        }

        let message = match ErrorResponse::from_slice(body) {
            Ok(parsed) => match parsed.first_message() {
                Some(msg) => Some(msg.to_string()),
                None => {
                    warn!(status, "{}", WireError::EmptyDetail);
                    None
                }
            },
            Err(err) => {
                warn!(status, "{err}");
                None
            }
        };
        Self::Rejected { status, message }
    }

    pub fn alert_kind(&self) -> Option<AlertKind> {
        match self {
            Self::Success(_) | Self::MalformedResult { .. } => None,
            Self::Rejected {
                message: Some(_), ..
            } => Some(AlertKind::Rejected),
            Self::Rejected { message: None, .. } => Some(AlertKind::Unexpected),
            Self::Failed(ClientError::Transport(_)) => Some(AlertKind::Unreachable),
            Self::Failed(_) => Some(AlertKind::Unexpected),
        }
    }

    /// Text for the alert dialog, or `None` when the outcome is not shown as one.
    pub fn alert_message(&self) -> Option<String> {
        match self {
            Self::Success(_) | Self::MalformedResult { .. } => None,
            Self::Rejected {
                message: Some(msg), ..
            } => Some(format!("{ALERT_PREFIX}{msg}")),
            Self::Rejected {
                status,
                message: None,
            } => Some(format!(
                "{ALERT_PREFIX}request failed with status {status}"
            )),
            Self::Failed(err) => Some(format!("{ALERT_PREFIX}{err}")),
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    pub request_id: RequestId,
    pub outcome: CalculationOutcome,
}

#[derive(Clone)]
pub struct FormController {
    transport: Arc<dyn Transport>,
    endpoint: Url,
    request_color: bool,
    runtime: Handle,
}

impl FormController {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Url, runtime: Handle) -> Self {
        Self {
            transport,
            endpoint,
            request_color: false,
            runtime,
        }
    }

    /// Builds a controller backed by [`ReqwestTransport`].
    pub fn from_settings(settings: &ClientSettings, runtime: Handle) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(settings.request_timeout())?;
        let endpoint = settings.endpoint_url()?;
        Ok(Self::new(Arc::new(transport), endpoint, runtime).with_color(settings.request_color))
    }

    pub fn with_color(mut self, request_color: bool) -> Self {
        self.request_color = request_color;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Takes ownership of the form and starts intercepting its submits.
    pub fn attach<F: CalculatorForm>(self, form: F) -> AttachedForm<F> {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        info!(endpoint = %self.endpoint, "calculator form attached");
        AttachedForm {
            form,
            controller: self,
            next_request_id: 0,
            completions_tx,
            completions_rx,
        }
    }

    /// One round trip, without touching any form.
    pub async fn request(&self, values: &FormValues) -> CalculationOutcome {
        let request =
            CalculationRequest::new(values.expression()).with_color(self.request_color);
        let body = match request.to_body() {
            Ok(body) => body,
            Err(err) => return CalculationOutcome::Failed(err.into()),
        };

        let http_request = HttpRequest::post_json(self.endpoint.clone(), body);
        match self.transport.send(http_request).await {
            Ok(response) => CalculationOutcome::from_response(
                response.status,
                &response.body,
                response.is_success(),
            ),
            Err(err) => CalculationOutcome::Failed(err.into()),
        }
    }
}

pub struct AttachedForm<F> {
    form: F,
    controller: FormController,
    next_request_id: u64,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<F: CalculatorForm> AttachedForm<F> {
    /// Suppresses the native submission and calculates instead.
    pub fn submit(&mut self, event: &mut SubmitEvent) -> RequestId {
        event.prevent_default();
        self.calculate()
    }

    /// Reads the fields and sends them off. Earlier requests are neither
    /// cancelled nor awaited; whichever completes last wins the result field.
    pub fn calculate(&mut self) -> RequestId {
        self.next_request_id += 1;
        let request_id = RequestId(self.next_request_id);
        let values = self.form.values();
        info!(
            request_id = request_id.0,
            expression = %values.expression(),
            "submitting calculation"
        );

        let controller = self.controller.clone();
        let completions_tx = self.completions_tx.clone();
        self.controller.runtime.spawn(async move {
            let outcome = controller.request(&values).await;
            // Receiver is gone once the form has been detached.
            let _ = completions_tx.send(Completion {
                request_id,
                outcome,
            });
        });

        request_id
    }

    /// Applies every completion that has already arrived, in arrival order.
    pub fn drain_completed(&mut self) -> Vec<RequestId> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            applied.push(completion.request_id);
            apply_completion(&mut self.form, completion);
        }
        applied
    }

    /// Waits for the next completion and applies it. A request that never
    /// resolves keeps this pending forever.
    pub async fn next_completed(&mut self) -> Option<RequestId> {
        let completion = self.completions_rx.recv().await?;
        let request_id = completion.request_id;
        apply_completion(&mut self.form, completion);
        Some(request_id)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    /// Applies to requests submitted from now on.
    pub fn set_request_color(&mut self, request_color: bool) {
        self.controller.request_color = request_color;
    }

    pub fn request_color(&self) -> bool {
        self.controller.request_color
    }

    pub fn detach(self) -> F {
        self.form
    }
}

fn apply_completion<F: CalculatorForm>(form: &mut F, completion: Completion) {
    let request_id = completion.request_id.0;
    match completion.outcome {
        CalculationOutcome::Success(response) => {
            let rendered = response.result.to_string();
            debug!(request_id, result = %rendered, "calculation succeeded");
            form.set_value(FormField::Result, &rendered);
            form.set_result_color(response.color);
        }
        CalculationOutcome::MalformedResult { status, error } => {
            warn!(request_id, status, "leaving result unchanged: {error}");
        }
        outcome => {
            let kind = outcome.alert_kind().unwrap_or(AlertKind::Unexpected);
            let message = outcome
                .alert_message()
                .unwrap_or_else(|| format!("{ALERT_PREFIX}unknown failure"));
            warn!(request_id, ?kind, %message, "calculation failed");
            form.alert(kind, &message);
            form.reset();
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
