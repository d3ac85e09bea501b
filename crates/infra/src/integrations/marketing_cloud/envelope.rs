//! SOAP 1.1 request envelopes
//!
//! Every outgoing message carries a WS-Security `UsernameToken` header with a
//! plain-text password. Bodies are rendered by hand with all text content and
//! attribute values passed through [`quick_xml::escape::escape`].

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use mcreport_domain::constants::{
    PARTNER_API_NS, PASSWORD_TEXT_TYPE, SOAP_ENVELOPE_NS, WSSE_NS, WSU_NS, XSI_NS,
};
use mcreport_domain::{FilterPart, FilterValue, RetrieveQuery, RetrieveRequest};
use quick_xml::escape::escape;
use uuid::Uuid;

/// WS-Security `UsernameToken` credentials for one message.
#[derive(Clone)]
pub struct SecurityHeader<'a> {
    username: &'a str,
    password: &'a str,
    token_id: String,
}

impl std::fmt::Debug for SecurityHeader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityHeader")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token_id", &self.token_id)
            .finish()
    }
}

impl<'a> SecurityHeader<'a> {
    /// Header with a freshly generated `wsu:Id`.
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self::with_token_id(username, password, format!("SecurityToken-{}", Uuid::new_v4()))
    }

    pub fn with_token_id(username: &'a str, password: &'a str, token_id: impl Into<String>) -> Self {
        Self { username, password, token_id: token_id.into() }
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    fn render(&self, out: &mut String) {
        let _ = write!(
            out,
            "<wsse:Security xmlns:wsse=\"{WSSE_NS}\" xmlns:wsu=\"{WSU_NS}\">\
             <wsse:UsernameToken wsu:Id=\"{id}\">\
             <wsse:Username>{user}</wsse:Username>\
             <wsse:Password Type=\"{PASSWORD_TEXT_TYPE}\">{pass}</wsse:Password>\
             </wsse:UsernameToken>\
             </wsse:Security>",
            id = escape(self.token_id.as_str()),
            user = escape(self.username),
            pass = escape(self.password),
        );
    }
}

/// Wrap a body payload in a SOAP envelope with the security header.
pub fn envelope(header: &SecurityHeader<'_>, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1024);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = write!(out, "<s:Envelope xmlns:s=\"{SOAP_ENVELOPE_NS}\" xmlns:xsi=\"{XSI_NS}\">");
    out.push_str("<s:Header>");
    header.render(&mut out);
    out.push_str("</s:Header><s:Body>");
    out.push_str(body);
    out.push_str("</s:Body></s:Envelope>");
    out
}

/// Body of a `Retrieve` call.
pub fn retrieve_body(request: &RetrieveRequest) -> String {
    let mut out = String::new();
    let _ = write!(out, "<RetrieveRequestMsg xmlns=\"{PARTNER_API_NS}\"><RetrieveRequest>");

    if !request.client_ids.is_empty() {
        out.push_str("<ClientIDs>");
        for id in &request.client_ids {
            let _ = write!(out, "<ID>{id}</ID>");
        }
        out.push_str("</ClientIDs>");
    }

    match &request.query {
        RetrieveQuery::New { object_type, properties, filter } => {
            element(&mut out, "ObjectType", object_type);
            for property in properties {
                element(&mut out, "Properties", property);
            }
            if let Some(filter) = filter {
                render_filter(&mut out, "Filter", filter);
            }
        }
        RetrieveQuery::Continue(token) => {
            element(&mut out, "ContinueRequest", token.as_str());
        }
    }

    out.push_str("</RetrieveRequest></RetrieveRequestMsg>");
    out
}

/// Body of a `GetSystemStatus` call.
pub fn system_status_body() -> String {
    format!("<GetSystemStatusRequestMsg xmlns=\"{PARTNER_API_NS}\"><Options/></GetSystemStatusRequestMsg>")
}

fn render_filter(out: &mut String, tag: &str, filter: &FilterPart) {
    match filter {
        FilterPart::Simple { property, operator, value } => {
            let _ = write!(out, "<{tag} xsi:type=\"SimpleFilterPart\">");
            element(out, "Property", property);
            element(out, "SimpleOperator", operator.as_str());
            match value {
                FilterValue::Strings(values) => {
                    for value in values {
                        element(out, "Value", value);
                    }
                }
                FilterValue::Dates(dates) => {
                    for date in dates {
                        element(out, "DateValue", &format_datetime(date));
                    }
                }
            }
            let _ = write!(out, "</{tag}>");
        }
        FilterPart::Complex { left, logical, right } => {
            let _ = write!(out, "<{tag} xsi:type=\"ComplexFilterPart\">");
            render_filter(out, "LeftOperand", left);
            element(out, "LogicalOperator", logical.as_str());
            render_filter(out, "RightOperand", right);
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn element(out: &mut String, tag: &str, text: &str) {
    let _ = write!(out, "<{tag}>{}</{tag}>", escape(text));
}

/// `xsd:dateTime` in UTC with second precision.
pub fn format_datetime(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mcreport_domain::ContinuationToken;

    use super::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn security_header_carries_username_token() {
        let header = SecurityHeader::with_token_id("api-user", "s3cr&t", "SecurityToken-1");
        let xml = envelope(&header, "<Ping/>");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><s:Envelope"));
        assert!(xml.contains("<wsse:UsernameToken wsu:Id=\"SecurityToken-1\">"));
        assert!(xml.contains("<wsse:Username>api-user</wsse:Username>"));
        assert!(xml.contains(&format!(
            "<wsse:Password Type=\"{PASSWORD_TEXT_TYPE}\">s3cr&amp;t</wsse:Password>"
        )));
        assert!(xml.contains("<s:Body><Ping/></s:Body>"));
    }

    #[test]
    fn fresh_headers_get_distinct_token_ids() {
        let first = SecurityHeader::new("u", "p");
        let second = SecurityHeader::new("u", "p");
        assert_ne!(first.token_id(), second.token_id());
        assert!(!format!("{first:?}").contains("\"p\""));
    }

    #[test]
    fn renders_new_query_with_complex_filter() {
        let filter = FilterPart::equals("SendID", "4711")
            .and(FilterPart::date_between("EventDate", day(1), day(2)));
        let request = RetrieveRequest::new("OpenEvent", ["SendID", "EventDate"])
            .with_filter(filter)
            .with_client_id(Some(42));

        let body = retrieve_body(&request);

        assert!(body.starts_with(&format!("<RetrieveRequestMsg xmlns=\"{PARTNER_API_NS}\">")));
        assert!(body.contains("<ClientIDs><ID>42</ID></ClientIDs>"));
        assert!(body.contains("<ObjectType>OpenEvent</ObjectType>"));
        assert!(body.contains("<Properties>SendID</Properties><Properties>EventDate</Properties>"));
        assert!(body.contains(
            "<Filter xsi:type=\"ComplexFilterPart\">\
             <LeftOperand xsi:type=\"SimpleFilterPart\"><Property>SendID</Property>\
             <SimpleOperator>equals</SimpleOperator><Value>4711</Value></LeftOperand>\
             <LogicalOperator>AND</LogicalOperator>\
             <RightOperand xsi:type=\"SimpleFilterPart\"><Property>EventDate</Property>\
             <SimpleOperator>between</SimpleOperator>\
             <DateValue>2024-03-01T00:00:00Z</DateValue><DateValue>2024-03-02T00:00:00Z</DateValue>\
             </RightOperand></Filter>"
        ));
        assert!(!body.contains("ContinueRequest"));
    }

    #[test]
    fn continuation_carries_only_the_token() {
        let request = RetrieveRequest::continuation(ContinuationToken::new("abc<1>"));
        let body = retrieve_body(&request);

        assert!(body.contains("<ContinueRequest>abc&lt;1&gt;</ContinueRequest>"));
        assert!(!body.contains("ObjectType"));
        assert!(!body.contains("Filter"));
    }

    #[test]
    fn system_status_body_targets_partner_namespace() {
        assert!(system_status_body().contains("GetSystemStatusRequestMsg"));
        assert!(system_status_body().contains(PARTNER_API_NS));
    }
}
