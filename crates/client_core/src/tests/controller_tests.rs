use super::*;
use crate::{error::TransportError, transport::HttpResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

struct PendingRequest {
    request: HttpRequest,
    reply: oneshot::Sender<Result<HttpResponse, TransportError>>,
}

impl PendingRequest {
    fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.request.body).expect("request body json")
    }

    fn respond(self, status: u16, body: &str) {
        let _ = self.reply.send(Ok(HttpResponse::new(status, body.as_bytes())));
    }

    fn fail(self, err: TransportError) {
        let _ = self.reply.send(Err(err));
    }
}

/// Parks every request until the test answers it.
struct ScriptedTransport {
    pending: mpsc::UnboundedSender<PendingRequest>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.to_string();
        let (reply, rx) = oneshot::channel();
        self.pending
            .send(PendingRequest { request, reply })
            .map_err(|_| TransportError::Connect {
                url: url.clone(),
                message: "test harness closed".into(),
            })?;
        rx.await.unwrap_or_else(|_| {
            Err(TransportError::Request {
                url,
                message: "reply dropped".into(),
            })
        })
    }
}

#[derive(Debug, Default)]
struct TestForm {
    fields: HashMap<FormField, String>,
    alerts: Vec<String>,
    alert_kinds: Vec<AlertKind>,
    resets: usize,
    color: Option<ResultColor>,
    /// Snapshot of the inputs at the moment each alert was raised.
    values_at_alert: Vec<FormValues>,
}

impl TestForm {
    fn filled(first: &str, operator: &str, second: &str) -> Self {
        let mut form = Self::default();
        form.set_value(FormField::FirstNumber, first);
        form.set_value(FormField::Operator, operator);
        form.set_value(FormField::SecondNumber, second);
        form
    }

    fn result(&self) -> String {
        self.value(FormField::Result)
    }
}

impl CalculatorForm for TestForm {
    fn value(&self, field: FormField) -> String {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, field: FormField, value: &str) {
        self.fields.insert(field, value.to_string());
    }

    fn alert(&mut self, kind: AlertKind, message: &str) {
        self.values_at_alert.push(self.values());
        self.alert_kinds.push(kind);
        self.alerts.push(message.to_string());
    }

    fn reset(&mut self) {
        self.fields.clear();
        self.color = None;
        self.resets += 1;
    }

    fn set_result_color(&mut self, color: Option<ResultColor>) {
        self.color = color;
    }
}

fn endpoint() -> Url {
    Url::parse("http://calc.test/app/api/calculate").expect("url")
}

fn scripted_controller() -> (FormController, mpsc::UnboundedReceiver<PendingRequest>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = FormController::new(
        Arc::new(ScriptedTransport { pending: tx }),
        endpoint(),
        Handle::current(),
    );
    (controller, rx)
}

#[tokio::test]
async fn submit_prevents_default_and_posts_concatenated_expression() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("3", "+", "4"));

    let mut event = SubmitEvent::new();
    assert!(!event.is_default_prevented());
    attached.submit(&mut event);
    assert!(event.is_default_prevented());

    let request = pending.recv().await.expect("request sent");
    assert_eq!(request.request.method, reqwest::Method::POST);
    assert_eq!(request.request.url, endpoint());
    assert_eq!(request.request.content_type, "application/json");
    assert_eq!(request.request.body, br#"{"expression":"3+4"}"#);
}

#[tokio::test]
async fn expression_is_raw_concatenation_for_arbitrary_inputs() {
    let cases = [
        ("", "", ""),
        ("1", "", "2"),
        (" 12 ", "*", " 3"),
        ("abc", "%", "=="),
        ("", "/", "0"),
        ("2.5", "-", "-1"),
    ];

    for (first, operator, second) in cases {
        let (controller, mut pending) = scripted_controller();
        let mut attached = controller.attach(TestForm::filled(first, operator, second));
        attached.calculate();

        let request = pending.recv().await.expect("request sent");
        assert_eq!(
            request.body_json()["expression"],
            format!("{first}{operator}{second}")
        );
    }
}

#[tokio::test]
async fn success_writes_result_verbatim() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("3", "+", "4"));
    let id = attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .respond(200, r#"{"result":"7"}"#);

    assert_eq!(attached.next_completed().await, Some(id));
    let form = attached.form();
    assert_eq!(form.result(), "7");
    assert!(form.alerts.is_empty());
    assert_eq!(form.resets, 0);
    assert_eq!(form.value(FormField::FirstNumber), "3");
}

#[tokio::test]
async fn numeric_result_and_color_are_applied() {
    let (controller, mut pending) = scripted_controller();
    let controller = controller.with_color(true);
    let mut attached = controller.attach(TestForm::filled("3", "/", "7"));
    attached.calculate();

    let request = pending.recv().await.expect("request");
    assert_eq!(request.body_json()["color"], true);
    request.respond(200, r#"{"result":0.4286,"color":"red"}"#);

    attached.next_completed().await;
    assert_eq!(attached.form().result(), "0.4286");
    assert_eq!(attached.form().color, Some(ResultColor::Red));
}

#[tokio::test]
async fn rejection_alerts_first_detail_then_resets_everything() {
    let (controller, mut pending) = scripted_controller();
    let mut form = TestForm::filled("2", "/", "0");
    form.set_value(FormField::Result, "42");
    let mut attached = controller.attach(form);
    attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .respond(422, r#"{"detail":[{"msg":"bad input"},{"msg":"second"}]}"#);
    attached.next_completed().await;

    let form = attached.detach();
    assert_eq!(form.alerts, vec!["Error: bad input".to_string()]);
    assert_eq!(form.alert_kinds, vec![AlertKind::Rejected]);
    assert_eq!(form.values_at_alert, vec![FormValues::new("2", "/", "0")]);
    assert_eq!(form.resets, 1);
    for field in FormField::ALL {
        assert_eq!(form.value(field), "", "{field} should be cleared");
    }
}

#[tokio::test]
async fn rejection_without_detail_falls_back_to_generic_message() {
    for body in [r#"{"detail":[]}"#, r#"{"error":"boom"}"#, "<html>bad gateway</html>", ""] {
        let (controller, mut pending) = scripted_controller();
        let mut attached = controller.attach(TestForm::filled("1", "+", "1"));
        attached.calculate();

        pending.recv().await.expect("request").respond(502, body);
        attached.next_completed().await;

        let form = attached.form();
        assert_eq!(
            form.alerts,
            vec!["Error: request failed with status 502".to_string()],
            "body {body:?}"
        );
        assert_eq!(form.alert_kinds, vec![AlertKind::Unexpected]);
        assert_eq!(form.resets, 1);
    }
}

#[tokio::test]
async fn transport_failure_alerts_and_resets() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("1", "+", "1"));
    attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .fail(TransportError::Connect {
            url: endpoint().to_string(),
            message: "connection refused".into(),
        });
    attached.next_completed().await;

    let form = attached.form();
    assert_eq!(form.alerts.len(), 1);
    assert!(form.alerts[0].starts_with("Error: failed to connect to"));
    assert!(form.alerts[0].contains("connection refused"));
    assert_eq!(form.alert_kinds, vec![AlertKind::Unreachable]);
    assert_eq!(form.resets, 1);
}

#[tokio::test]
async fn rejection_mentioning_connection_is_still_a_rejection() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("1", "+", "1"));
    attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .respond(422, r#"{"detail":[{"msg":"connection quota exceeded"}]}"#);
    attached.next_completed().await;

    let form = attached.form();
    assert_eq!(form.alerts, vec!["Error: connection quota exceeded".to_string()]);
    assert_eq!(form.alert_kinds, vec![AlertKind::Rejected]);
}

#[tokio::test]
async fn null_and_boolean_results_are_written_not_skipped() {
    for (body, expected) in [(r#"{"result":null}"#, ""), (r#"{"result":true}"#, "true")] {
        let (controller, mut pending) = scripted_controller();
        let mut form = TestForm::filled("1", "+", "1");
        form.set_value(FormField::Result, "previous");
        let mut attached = controller.attach(form);
        attached.calculate();

        pending.recv().await.expect("request").respond(200, body);
        attached.next_completed().await;

        assert_eq!(attached.form().result(), expected, "body {body}");
        assert!(attached.form().alerts.is_empty());
    }
}

#[tokio::test]
async fn huge_result_keeps_exponent_form() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("99999999999", "*", "99999999999"));
    attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .respond(200, r#"{"result":9.9999999998e+21}"#);
    attached.next_completed().await;

    assert_eq!(attached.form().result(), "9.9999999998e+21");
}

#[tokio::test]
async fn malformed_success_leaves_result_untouched() {
    let (controller, mut pending) = scripted_controller();
    let mut form = TestForm::filled("1", "+", "1");
    form.set_value(FormField::Result, "previous");
    let mut attached = controller.attach(form);
    attached.calculate();

    pending
        .recv()
        .await
        .expect("request")
        .respond(200, r#"{"value":2}"#);
    attached.next_completed().await;

    let form = attached.form();
    assert_eq!(form.result(), "previous");
    assert!(form.alerts.is_empty());
    assert_eq!(form.resets, 0);
}

#[tokio::test]
async fn last_arriving_response_wins() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("1", "+", "1"));

    let first = attached.calculate();
    attached.form_mut().set_value(FormField::SecondNumber, "2");
    let second = attached.calculate();
    assert_ne!(first, second);

    let first_request = pending.recv().await.expect("first request");
    let second_request = pending.recv().await.expect("second request");
    assert_eq!(first_request.body_json()["expression"], "1+1");
    assert_eq!(second_request.body_json()["expression"], "1+2");

    second_request.respond(200, r#"{"result":"3"}"#);
    assert_eq!(attached.next_completed().await, Some(second));
    assert_eq!(attached.form().result(), "3");

    first_request.respond(200, r#"{"result":"2"}"#);
    assert_eq!(attached.next_completed().await, Some(first));
    assert_eq!(attached.form().result(), "2");
}

#[tokio::test]
async fn drain_applies_arrived_completions_without_blocking() {
    let (controller, mut pending) = scripted_controller();
    let mut attached = controller.attach(TestForm::filled("6", "*", "7"));
    assert!(attached.drain_completed().is_empty());

    let id = attached.calculate();
    let request = pending.recv().await.expect("request");
    assert!(attached.drain_completed().is_empty());
    request.respond(200, r#"{"result":42}"#);

    let mut applied = Vec::new();
    for _ in 0..100 {
        applied = attached.drain_completed();
        if !applied.is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(applied, vec![id]);
    assert_eq!(attached.form().result(), "42");
}

#[tokio::test]
async fn request_round_trip_without_a_form() {
    let (controller, mut pending) = scripted_controller();
    let values = FormValues::new("8", "-", "5");

    let (outcome, ()) = futures::join!(controller.request(&values), async {
        let request = pending.recv().await.expect("request");
        assert_eq!(request.body_json()["expression"], "8-5");
        request.respond(200, r#"{"result":3.0}"#);
    });

    match outcome {
        CalculationOutcome::Success(response) => assert_eq!(response.result.to_string(), "3"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn alert_messages_per_outcome() {
    let rejected = CalculationOutcome::from_response(
        422,
        br#"{"detail":[{"msg":"Cannot divide by zero."}]}"#,
        false,
    );
    assert_eq!(
        rejected.alert_message().as_deref(),
        Some("Error: Cannot divide by zero.")
    );
    assert_eq!(rejected.alert_kind(), Some(AlertKind::Rejected));

    let success = CalculationOutcome::from_response(200, br#"{"result":1}"#, true);
    assert!(success.alert_message().is_none());
    assert!(success.alert_kind().is_none());

    let malformed = CalculationOutcome::from_response(200, b"not json", true);
    assert!(matches!(
        malformed,
        CalculationOutcome::MalformedResult { status: 200, .. }
    ));
    assert!(malformed.alert_message().is_none());
}
