//! Wire format of the provider console requests

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use channel_reconciler::config::ProviderSettings;
use channel_reconciler::errors::AppError;
use channel_reconciler::models::{Action, Channel, TargetState};
use channel_reconciler::sources::{ChannelProvider, ProviderClient};

const FRAGMENT: &str = r#"<li><input type="checkbox" id="ch-101" checked><label>US MLB Network</label></li><li><input type="checkbox" id="ch-202"><label>Detroit Tigers</label></li>"#;

fn client(server: &MockServer) -> ProviderClient {
    ProviderClient::new(&ProviderSettings {
        url: format!("{}/console.php", server.uri()),
        uid: "1234".to_string(),
        pass: "abcd".to_string(),
        ..ProviderSettings::default()
    })
    .unwrap()
}

fn console_post() -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/console.php"))
        .and(header("cookie", "uid=1234; pass=abcd"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
}

#[tokio::test]
async fn test_list_query_is_form_post_with_session_cookie() {
    let server = MockServer::start().await;
    console_post()
        .and(body_string("jxt=4&jxw=sch&s=NO_EPG&c=MLB"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(json!({"Fs": [0, [0, [0, [0, FRAGMENT]]]]}).to_string()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let channels = client(&server).fetch_channels().await.unwrap();

    assert_eq!(
        channels,
        vec![
            Channel::new("US MLB Network", "ch-101", true),
            Channel::new("Detroit Tigers", "ch-202", false),
        ]
    );
}

#[tokio::test]
async fn test_toggle_sends_channel_id_and_flag() {
    let server = MockServer::start().await;
    console_post()
        .and(body_string("jxt=4&jxw=s&s=NO_EPG&c=ch-202&a=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    console_post()
        .and(body_string("jxt=4&jxw=s&s=NO_EPG&c=ch-404&a=0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .apply_action(&Action::for_channel(
            &Channel::new("Detroit Tigers", "ch-202", false),
            TargetState::Enabled,
        ))
        .await
        .unwrap();
    client
        .apply_action(&Action::for_channel(
            &Channel::new("US MLB New York Mets", "ch-404", true),
            TargetState::Disabled,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_login_page_is_malformed_upstream() {
    let server = MockServer::start().await;
    console_post()
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Please log in</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_channels().await.unwrap_err();

    assert!(matches!(err, AppError::MalformedUpstream { .. }));
}

#[tokio::test]
async fn test_error_status_fails_toggle() {
    let server = MockServer::start().await;
    console_post()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .apply_action(&Action::for_channel(
            &Channel::new("Detroit Tigers", "ch-202", false),
            TargetState::Enabled,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}
