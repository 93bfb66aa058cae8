use licenser_cli::license::gate::{require, GateError, Requirement};
use licenser_cli::license::FileStore;
use licenser_core::{
    LicenseError, LicenseReconciler, LicenserConfig, RawResponse, RemoteClient, RequestPayload,
};
use serde_json::json;

struct Fixed(&'static str);

impl RemoteClient for Fixed {
    fn send(&self, _payload: &RequestPayload, _route: &str) -> Result<RawResponse, LicenseError> {
        Ok(RawResponse::ok(self.0))
    }
}

const GRANTED: &str =
    r#"{"success":true,"remaining":"unlimited","activation_limit":"unlimited","expiry_days":false,"title":"Agency"}"#;

fn reconciler(dir: &std::path::Path, body: &'static str) -> LicenseReconciler<Fixed, FileStore> {
    let mut config = LicenserConfig::default();
    config.product.slug = "acme-forms".to_string();
    config.product.hash = "f3a9c1".to_string();
    config.site.url = "https://shop.example.com".to_string();
    LicenseReconciler::new(&config, Fixed(body), FileStore::new(dir))
}

#[test]
fn no_license_is_not_active() {
    let tmp = tempfile::tempdir().unwrap();
    let r = reconciler(tmp.path(), GRANTED);
    assert_eq!(require(&r, None), Err(GateError::NotActive));
}

#[test]
fn active_license_passes_without_requirement() {
    let tmp = tempfile::tempdir().unwrap();
    let r = reconciler(tmp.path(), GRANTED);
    r.activate("AGENCY-KEY-0001").unwrap();
    assert_eq!(require(&r, None), Ok(()));
}

#[test]
fn requirement_values_follow_command_line_parsing() {
    let tmp = tempfile::tempdir().unwrap();
    let r = reconciler(tmp.path(), GRANTED);
    r.activate("AGENCY-KEY-0001").unwrap();

    assert_eq!(require(&r, Some(&Requirement::new("title", "Agency"))), Ok(()));
    assert_eq!(
        require(&r, Some(&Requirement::new("remaining", "unlimited"))),
        Ok(())
    );
    assert_eq!(
        require(&r, Some(&Requirement::new("expiry_days", "false"))),
        Ok(())
    );
    assert_eq!(
        require(&r, Some(&Requirement::new("title", "Pro"))),
        Err(GateError::Mismatch {
            attribute: "title".to_string(),
            expected: json!("Pro"),
        })
    );
}

#[test]
fn rejected_activation_keeps_gate_closed() {
    let tmp = tempfile::tempdir().unwrap();
    let r = reconciler(
        tmp.path(),
        r#"{"success":false,"errors":{"license_key":["Invalid license key."]}}"#,
    );
    assert!(r.activate("BAD").is_err());
    assert_eq!(require(&r, None), Err(GateError::NotActive));
}
