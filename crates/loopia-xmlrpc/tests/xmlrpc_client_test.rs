//! HTTP-level tests for the XML-RPC client against a mock endpoint

use loopia_core::config::Credentials;
use loopia_core::traits::{LoopiaApi, ZoneRecord};
use loopia_core::Error;
use loopia_xmlrpc::LoopiaXmlRpcClient;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn response(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <methodResponse><params><param><value>{value}</value></param></params></methodResponse>"
    ))
}

fn status(code: &str) -> ResponseTemplate {
    response(&format!("<string>{code}</string>"))
}

async fn client(server: &MockServer) -> LoopiaXmlRpcClient {
    LoopiaXmlRpcClient::new(
        Credentials {
            username: "user@loopiaapi".to_string(),
            password: "secret".to_string(),
        },
        Some(format!("{}/RPCSERV", server.uri())),
    )
    .expect("client builds")
}

#[tokio::test]
async fn call_sends_credentials_first() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/RPCSERV"))
        .and(header("content-type", "text/xml"))
        .and(body_string_contains("<methodName>addSubdomain</methodName>"))
        .respond_with(status("OK"))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .await
        .add_subdomain("example.se", "www")
        .await
        .expect("add succeeds");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let user = body.find("user@loopiaapi").unwrap();
    let password = body.find("secret").unwrap();
    let domain = body.find("example.se").unwrap();
    let subdomain = body.find("<string>www</string>").unwrap();
    assert!(user < password && password < domain && domain < subdomain);
}

#[tokio::test]
async fn status_strings_map_to_errors() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("removeSubdomain"))
        .respond_with(status("AUTH_ERROR"))
        .mount(&server)
        .await;
    Mock::given(body_string_contains("addSubdomain"))
        .respond_with(status("DOMAIN_OCCUPIED"))
        .mount(&server)
        .await;
    Mock::given(body_string_contains("removeZoneRecord"))
        .respond_with(status("RATE_LIMITED"))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let err = client.remove_subdomain("example.se", "www").await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "{err}");

    let err = client.add_subdomain("example.se", "www").await.unwrap_err();
    assert!(matches!(err, Error::Status(ref s) if s == "DOMAIN_OCCUPIED"), "{err}");

    let err = client
        .remove_zone_record("example.se", "www", 7)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited(_)), "{err}");
}

#[tokio::test]
async fn zone_records_are_decoded_in_order() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("getZoneRecords"))
        .respond_with(response(
            "<array><data>\
               <value><struct>\
                 <member><name>type</name><value><string>A</string></value></member>\
                 <member><name>ttl</name><value><int>3600</int></value></member>\
                 <member><name>priority</name><value><int>0</int></value></member>\
                 <member><name>rdata</name><value><string>192.0.2.1</string></value></member>\
                 <member><name>record_id</name><value><int>3000000001</int></value></member>\
               </struct></value>\
               <value><struct>\
                 <member><name>type</name><value><string>MX</string></value></member>\
                 <member><name>ttl</name><value><int>300</int></value></member>\
                 <member><name>priority</name><value><int>10</int></value></member>\
                 <member><name>rdata</name><value><string>mail.example.se</string></value></member>\
                 <member><name>record_id</name><value><int>17</int></value></member>\
               </struct></value>\
             </data></array>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let records = client.get_zone_records("example.se", "@").await.unwrap();

    assert_eq!(
        records,
        vec![
            ZoneRecord {
                id: 3_000_000_001,
                record_type: "A".to_string(),
                ttl: 3600,
                priority: 0,
                value: "192.0.2.1".to_string(),
            },
            ZoneRecord {
                id: 17,
                record_type: "MX".to_string(),
                ttl: 300,
                priority: 10,
                value: "mail.example.se".to_string(),
            },
        ]
    );

    let mx = client.get_zone_record("example.se", "@", 17).await.unwrap();
    assert_eq!(mx.record_type, "MX");

    let missing = client.get_zone_record("example.se", "@", 99).await.unwrap_err();
    assert!(missing.is_not_found());
}

#[tokio::test]
async fn subdomains_and_domains_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("getSubdomains"))
        .respond_with(response(
            "<array><data><value><string>@</string></value><value>www</value></data></array>",
        ))
        .mount(&server)
        .await;
    Mock::given(body_string_contains("<methodName>getDomain</methodName>"))
        .respond_with(response(
            "<struct>\
               <member><name>domain</name><value><string>example.se</string></value></member>\
               <member><name>paid</name><value><int>1</int></value></member>\
               <member><name>registered</name><value><boolean>1</boolean></value></member>\
               <member><name>renewal_status</name><value><string>NORMAL</string></value></member>\
               <member><name>expiration_date</name><value><string>2027-01-15</string></value></member>\
               <member><name>reference_no</name><value><int>4711</int></value></member>\
             </struct>",
        ))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let names: Vec<String> = client
        .get_subdomains("example.se")
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["@", "www"]);

    let domain = client.get_domain("example.se").await.unwrap();
    assert_eq!(domain.name, "example.se");
    assert!(domain.paid && domain.registered);
    assert_eq!(domain.reference_number, 4711);
}

#[tokio::test]
async fn status_in_place_of_data_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("getDomains"))
        .respond_with(status("AUTH_ERROR"))
        .mount(&server)
        .await;

    let err = client(&server).await.get_domains().await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "{err}");
}

#[tokio::test]
async fn faults_carry_code_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<methodResponse><fault><value><struct>\
               <member><name>faultCode</name><value><int>623</int></value></member>\
               <member><name>faultString</name><value><string>Method not found</string></value></member>\
             </struct></value></fault></methodResponse>",
        ))
        .mount(&server)
        .await;

    let err = client(&server).await.get_domains().await.unwrap_err();
    match err {
        Error::Fault { code, message } => {
            assert_eq!(code, 623);
            assert_eq!(message, "Method not found");
        }
        other => panic!("expected fault, got {other}"),
    }
}

#[tokio::test]
async fn http_errors_and_garbage_are_reported() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("getDomains"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;
    Mock::given(body_string_contains("getSubdomains"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let err = client.get_domains().await.unwrap_err();
    assert!(matches!(err, Error::Http(ref m) if m.contains("502")), "{err}");

    let err = client.get_subdomains("example.se").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "{err}");
}

#[tokio::test]
async fn update_sends_record_id() {
    let server = MockServer::start().await;
    Mock::given(body_string_contains("updateZoneRecord"))
        .and(body_string_contains("<name>record_id</name><value><int>42</int></value>"))
        .respond_with(status("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let record = ZoneRecord {
        id: 42,
        record_type: "A".to_string(),
        ttl: 300,
        priority: 0,
        value: "192.0.2.20".to_string(),
    };
    client(&server)
        .await
        .update_zone_record("example.se", "www", &record)
        .await
        .expect("update succeeds");
}
