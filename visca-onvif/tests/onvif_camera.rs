use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    routing::post,
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use visca_onvif::{CameraControl, OnvifAuth, OnvifCamera, OnvifTarget};

const PROFILES: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:trt="http://www.onvif.org/ver10/media/wsdl" xmlns:tt="http://www.onvif.org/ver10/schema"><s:Body><trt:GetProfilesResponse><trt:Profiles token="Profile_1"><tt:Name>main</tt:Name></trt:Profiles></trt:GetProfilesResponse></s:Body></s:Envelope>"#;
const EMPTY: &str = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body/></s:Envelope>"#;

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    action: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

struct FakeCamera {
    device_services_fail: bool,
    log: Log,
}

/// Serves the canned ONVIF answers on a local port and records every SOAP call.
async fn fake_camera(device_services_fail: bool) -> (u16, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let camera = Arc::new(FakeCamera {
        device_services_fail,
        log: log.clone(),
    });
    let app = Router::new()
        .route("/*path", post(soap))
        .with_state(camera);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (port, log)
}

async fn soap(
    State(camera): State<Arc<FakeCamera>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
    let action = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(soap_action)
        .unwrap_or_default();
    camera.log.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        action: action.clone(),
        body,
    });

    let (status, reply) = match action.as_str() {
        "GetServices" | "GetCapabilities" if camera.device_services_fail => {
            (StatusCode::INTERNAL_SERVER_ERROR, EMPTY)
        }
        "GetProfiles" => (StatusCode::OK, PROFILES),
        "GotoPreset" => (StatusCode::BAD_REQUEST, EMPTY),
        _ => (StatusCode::OK, EMPTY),
    };
    (status, [(header::CONTENT_TYPE, "application/soap+xml")], reply)
}

/// Operation name from the `action` parameter of a SOAP 1.2 content type.
fn soap_action(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("action="))
        .map(|action| action.trim_matches('"'))
        .find_map(|action| action.rsplit('/').next())
        .map(str::to_string)
}

fn actions(log: &Log) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .map(|recorded| recorded.action.clone())
        .collect()
}

#[tokio::test]
async fn connect_falls_back_to_device_endpoint() {
    let (port, log) = fake_camera(true).await;
    let target = OnvifTarget::new("127.0.0.1", port, "admin", "secret");

    let camera = OnvifCamera::connect(target).await.unwrap();

    assert_eq!(camera.profile_token(), "Profile_1");
    assert_eq!(
        camera.endpoints().ptz,
        format!("http://127.0.0.1:{port}/onvif/device_service")
    );
    assert_eq!(
        actions(&log),
        vec!["GetServices", "GetCapabilities", "GetProfiles"]
    );
    let recorded = log.lock().unwrap().clone();
    assert!(recorded.iter().all(|r| r.path == "/onvif/device_service"));
    assert!(recorded[0].body.contains("<Username>admin</Username>"));
}

#[tokio::test]
async fn ptz_operations_reach_the_camera() {
    let (port, log) = fake_camera(false).await;
    let target = OnvifTarget::new("127.0.0.1", port, "admin", "secret")
        .with_auth(OnvifAuth::Basic)
        .with_path("/onvif/device");
    let camera = OnvifCamera::connect(target).await.unwrap();
    log.lock().unwrap().clear();

    camera.set_preset(2).await.unwrap();
    camera.go_home().await.unwrap();
    camera.move_continuous(0.5, -2.0, 0.0).await.unwrap();
    camera.stop().await.unwrap();

    assert_eq!(
        actions(&log),
        vec!["SetPreset", "GotoHomePosition", "ContinuousMove", "Stop"]
    );
    let recorded = log.lock().unwrap().clone();
    assert!(recorded[0].body.contains("<PresetToken>2</PresetToken>"));
    assert!(recorded[2].body.contains(r#"x="0.500" y="-1.000""#));
    assert!(!recorded[0].body.contains("<Username>"));
}

#[tokio::test]
async fn http_error_surfaces_as_failure() {
    let (port, _log) = fake_camera(false).await;
    let target = OnvifTarget::new("127.0.0.1", port, "admin", "secret");
    let camera = OnvifCamera::connect(target).await.unwrap();

    let err = camera.goto_preset(5).await.unwrap_err();
    assert_eq!(err.to_string(), "GotoPreset failed with HTTP 400");
}
