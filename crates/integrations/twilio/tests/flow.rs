//! End-to-end flows: YAML definition, registry, and a local stand-in for the
//! Twilio API.

use std::collections::HashMap;
use std::sync::Arc;

use twilink_component::{ComponentError, ComponentRegistry, Flow, FlowError};
use twilink_twilio::config::API_BASE_URL_VAR;
use twilink_twilio::register_all;
use twilink_twilio::test_support::MockTwilioServer;

fn registry(base_url: &str) -> ComponentRegistry {
    let env: HashMap<String, String> =
        HashMap::from([(API_BASE_URL_VAR.to_owned(), base_url.to_owned())]);
    let mut registry = ComponentRegistry::new();
    register_all(&mut registry, Arc::new(env));
    registry
}

fn parse(yaml: &str) -> Flow {
    serde_yaml_ng::from_str(yaml).expect("flow should parse")
}

#[tokio::test]
async fn auth_send_sms_then_check_status() {
    let server = MockTwilioServer::start().await;
    let base_url = server.base_url.clone();
    let requests = server.serve(vec![
        (201, r#"{"sid":"SM100","status":"queued"}"#),
        (200, r#"{"sid":"SM100","status":"delivered","error_code":null}"#),
    ]);

    let flow = parse(
        r#"
name: order-shipped
steps:
  - id: auth
    component: twilio_auth
    inputs:
      account_sid: ACflow
      auth_token: flowtoken
  - id: sms
    component: twilio_send_sms
    inputs:
      client: { from: auth.client }
      from_number: "+15551234567"
      to_number: "+15559876543"
      message: Your order has shipped
  - id: status
    component: twilio_get_message_status
    inputs:
      client: { from: auth.client }
      message_sid: { from: sms.message_sid }
"#,
    );

    let report = flow.run(&registry(&base_url)).await.unwrap();
    let requests = requests.await.unwrap();

    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/2010-04-01/Accounts/ACflow/Messages.json");
    assert!(requests[0].body.contains("Body=Your+order+has+shipped"));
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/2010-04-01/Accounts/ACflow/Messages/SM100.json");

    let status = report.outputs("status").unwrap();
    assert_eq!(status.string("status").unwrap().as_deref(), Some("delivered"));
    assert_eq!(status.bool("terminal").unwrap(), Some(true));
}

#[tokio::test]
async fn twiml_feeds_an_outbound_call() {
    let server = MockTwilioServer::start().await;
    let base_url = server.base_url.clone();
    let requests = server.serve(vec![(201, r#"{"sid":"CA7","status":"queued"}"#)]);

    let flow = parse(
        r#"
steps:
  - id: auth
    component: twilio_auth
    inputs:
      account_sid: ACflow
      auth_token: flowtoken
  - id: greeting
    component: twiml_say
    inputs:
      text: Hello from the flow
      voice: alice
  - id: call
    component: twilio_make_call
    inputs:
      client: { from: auth.client }
      from_number: "+15551234567"
      to_number: "+15559876543"
      twiml: { from: greeting.twiml }
"#,
    );

    let report = flow.run(&registry(&base_url)).await.unwrap();
    let requests = requests.await.unwrap();

    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.contains("Twiml=%3C%3Fxml"));
    assert!(requests[0].body.contains("Hello+from+the+flow"));
    assert_eq!(
        report.outputs("call").unwrap().string("call_sid").unwrap().as_deref(),
        Some("CA7")
    );
}

#[tokio::test]
async fn api_failure_names_the_failing_step() {
    let server = MockTwilioServer::start().await;
    let base_url = server.base_url.clone();
    let requests = server.serve(vec![(
        400,
        r#"{"code":21211,"message":"The 'To' number is not a valid phone number.","status":400}"#,
    )]);

    let flow = parse(
        r#"
steps:
  - id: auth
    component: twilio_auth
    inputs:
      account_sid: ACflow
      auth_token: flowtoken
  - id: sms
    component: twilio_send_sms
    inputs:
      client: { from: auth.client }
      from_number: "+15551234567"
      to_number: "not-a-number"
      message: hi
"#,
    );

    let err = flow.run(&registry(&base_url)).await.unwrap_err();
    requests.await.unwrap();

    match err {
        FlowError::Step {
            step,
            component,
            source,
        } => {
            assert_eq!(step, "sms");
            assert_eq!(component, "twilio_send_sms");
            assert!(matches!(source, ComponentError::ExecutionFailed(_)));
            assert!(source.to_string().contains("[21211]"));
        }
        other => panic!("expected a step failure, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let flow = parse(
        r"
steps:
  - id: auth
    component: twilio_auth
",
    );

    let err = flow.run(&registry("http://127.0.0.1:9")).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("step 'auth' (twilio_auth) failed"), "{message}");
    assert!(message.contains("TWILIO_ACCOUNT_SID"), "{message}");
}
