//! Authenticated SOAP transport
//!
//! [`SoapTransport`] implements the core [`RetrieveTransport`] port. The HTTP
//! connection is built lazily on first use and exactly once, even when the
//! first calls race each other.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mcreport_core::RetrieveTransport;
use mcreport_domain::{
    Config, Credentials, HttpConfig, McReportError, Result, RetrieveRequest, RetrieveResponse,
    SystemStatus,
};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use super::envelope::{self, SecurityHeader};
use super::errors::SoapFault;
use super::parser;
use crate::errors::InfraError;
use crate::http::HttpClient;

const RETRIEVE_ACTION: &str = "Retrieve";
const SYSTEM_STATUS_ACTION: &str = "GetSystemStatus";
const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// SOAP client for the Marketing Cloud partner API.
pub struct SoapTransport {
    endpoint: Url,
    credentials: Credentials,
    http: HttpConfig,
    connection: OnceCell<HttpClient>,
    connections_built: AtomicUsize,
}

impl std::fmt::Debug for SoapTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoapTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl SoapTransport {
    /// Create a transport. No network activity happens until the first call.
    ///
    /// # Errors
    ///
    /// Returns [`McReportError::Config`] if the endpoint is not an http(s) URL.
    pub fn new(credentials: Credentials, http: HttpConfig) -> Result<Self> {
        let endpoint = parse_endpoint(credentials.endpoint())?;
        Ok(Self {
            endpoint,
            credentials,
            http,
            connection: OnceCell::new(),
            connections_built: AtomicUsize::new(0),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.marketing_cloud.clone(), config.http.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Whether the underlying connection has been built.
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Number of times the underlying connection has been built.
    pub fn connections_built(&self) -> usize {
        self.connections_built.load(Ordering::SeqCst)
    }

    async fn connection(&self) -> Result<&HttpClient> {
        self.connection
            .get_or_try_init(|| async {
                let client = HttpClient::from_config(&self.http)
                    .user_agent(concat!("mcreport/", env!("CARGO_PKG_VERSION")))
                    .header(CONTENT_TYPE, HeaderValue::from_static(SOAP_CONTENT_TYPE))
                    .header(ACCEPT, HeaderValue::from_static("text/xml"))
                    .build()?;

                let built = self.connections_built.fetch_add(1, Ordering::SeqCst) + 1;
                info!(
                    endpoint = %self.endpoint,
                    username = self.credentials.username(),
                    connections_built = built,
                    "Marketing Cloud SOAP connection established"
                );
                Ok::<_, McReportError>(client)
            })
            .await
    }

    /// Send one SOAP action and return the raw response document.
    async fn call(&self, action: &str, body: &str) -> Result<String> {
        let client = self.connection().await?;
        let header = SecurityHeader::new(self.credentials.username(), self.credentials.password());
        let payload = envelope::envelope(&header, body);

        debug!(action, endpoint = %self.endpoint, bytes = payload.len(), "sending SOAP request");

        let builder = client.post(self.endpoint.clone()).header("SOAPAction", action).body(payload);
        let response = client.send(builder).await?;
        let status = response.status();
        let text = response.text().await.map_err(|err| McReportError::from(InfraError::from(err)))?;

        if !status.is_success() {
            let fault = parser::find_fault(&text).unwrap_or_else(|| SoapFault::from_status(status, &text));
            warn!(
                action,
                %status,
                category = %fault.category(),
                fault = fault.message(),
                "SOAP call failed"
            );
            return Err(fault.into_domain_error());
        }

        debug!(action, %status, bytes = text.len(), "received SOAP response");
        Ok(text)
    }
}

#[async_trait]
impl RetrieveTransport for SoapTransport {
    async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse> {
        let body = envelope::retrieve_body(request);
        let xml = self.call(RETRIEVE_ACTION, &body).await?;
        parser::parse_retrieve_response(&xml)
    }

    async fn system_status(&self) -> Result<SystemStatus> {
        let xml = self.call(SYSTEM_STATUS_ACTION, &envelope::system_status_body()).await?;
        parser::parse_system_status_response(&xml)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|err| McReportError::from(InfraError::from(err)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(McReportError::Config(format!(
            "endpoint must use http or https, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use mcreport_domain::{ContinuationToken, RetrieveStatus};
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const OK_RESPONSE: &str = "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
        <soap:Body><RetrieveResponseMsg xmlns=\"http://exacttarget.com/wsdl/partnerAPI\">\
        <OverallStatus>OK</OverallStatus><RequestID>req-1</RequestID>\
        <Results><ID>1</ID></Results></RetrieveResponseMsg></soap:Body></soap:Envelope>";

    fn transport_for(server: &MockServer) -> SoapTransport {
        let credentials = Credentials::new(server.uri(), "api-user", "secret");
        let http =
            HttpConfig { timeout_secs: 5, max_attempts: 1, base_backoff_ms: 0, use_system_proxy: false };
        SoapTransport::new(credentials, http).expect("transport")
    }

    #[test]
    fn rejects_non_http_endpoints() {
        let credentials = Credentials::new("ftp://example.com/Service.asmx", "u", "p");
        let err = SoapTransport::new(credentials, HttpConfig::default()).unwrap_err();
        assert!(matches!(err, McReportError::Config(msg) if msg.contains("ftp")));

        let credentials = Credentials::new("not a url", "u", "p");
        assert!(SoapTransport::new(credentials, HttpConfig::default()).is_err());
    }

    #[tokio::test]
    async fn connection_is_built_lazily() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        assert!(!transport.is_connected());
        assert_eq!(transport.connections_built(), 0);

        transport.retrieve(&RetrieveRequest::new("Send", ["ID"])).await.expect("retrieve");
        transport.retrieve(&RetrieveRequest::new("Send", ["ID"])).await.expect("retrieve");

        assert!(transport.is_connected());
        assert_eq!(transport.connections_built(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_use_builds_one_connection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(16)
            .mount(&server)
            .await;

        let transport = Arc::new(transport_for(&server));
        let calls = (0..16).map(|_| {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                transport.retrieve(&RetrieveRequest::new("Send", ["ID"])).await
            })
        });

        for result in join_all(calls).await {
            let response = result.expect("task").expect("retrieve");
            assert_eq!(response.status, RetrieveStatus::Ok);
        }

        assert_eq!(transport.connections_built(), 1);
    }

    #[tokio::test]
    async fn sends_soap_headers_and_security_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("SOAPAction", "Retrieve"))
            .and(header("content-type", SOAP_CONTENT_TYPE))
            .and(body_string_contains("<wsse:Username>api-user</wsse:Username>"))
            .and(body_string_contains("<ContinueRequest>req-0</ContinueRequest>"))
            .respond_with(ResponseTemplate::new(200).set_body_string(OK_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let request = RetrieveRequest::continuation(ContinuationToken::new("req-0"));
        let response = transport.retrieve(&request).await.expect("retrieve");

        assert_eq!(response.request_id, "req-1");
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn soap_fault_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string(
                "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>\
                 <soap:Fault><faultcode>q0:Security</faultcode><faultstring>Login Failed</faultstring></soap:Fault>\
                 </soap:Body></soap:Envelope>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport.retrieve(&RetrieveRequest::new("Send", ["ID"])).await.unwrap_err();
        assert_eq!(err, McReportError::Auth("Login Failed".into()));
    }

    #[tokio::test]
    async fn http_403_without_fault_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let err = transport.system_status().await.unwrap_err();
        assert!(matches!(err, McReportError::Auth(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn system_status_uses_its_own_action() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("SOAPAction", "GetSystemStatus"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>\
                 <GetSystemStatusResponseMsg><Results><Result><SystemStatus>InMaintenance</SystemStatus>\
                 </Result></Results><OverallStatus>OK</OverallStatus><RequestID>s-1</RequestID>\
                 </GetSystemStatusResponseMsg></soap:Body></soap:Envelope>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport_for(&server);
        let status = transport.system_status().await.expect("status");
        assert_eq!(status.system_status.as_deref(), Some("InMaintenance"));
        assert!(!status.is_available());
    }
}
