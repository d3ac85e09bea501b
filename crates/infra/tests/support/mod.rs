//! SOAP response fixtures shared by the integration tests.

use wiremock::ResponseTemplate;

/// Wrap a body payload in a SOAP 1.1 envelope.
pub fn soap_envelope(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
         <soap:Body>{body}</soap:Body></soap:Envelope>"
    )
}

/// A `RetrieveResponseMsg` with the given status, request id and result
/// payloads (each the inner XML of one `Results` element).
pub fn retrieve_response(status: &str, request_id: &str, object_type: &str, results: &[String]) -> ResponseTemplate {
    let results: String = results
        .iter()
        .map(|inner| format!("<Results xsi:type=\"{object_type}\">{inner}</Results>"))
        .collect();

    ResponseTemplate::new(200).set_body_string(soap_envelope(&format!(
        "<RetrieveResponseMsg xmlns=\"http://exacttarget.com/wsdl/partnerAPI\">\
         <OverallStatus>{status}</OverallStatus><RequestID>{request_id}</RequestID>{results}\
         </RetrieveResponseMsg>"
    )))
}

pub fn send_result(id: u32, send_date: &str) -> String {
    format!(
        "<Client><ID>7012345</ID></Client><ID>{id}</ID><SendDate>{send_date}</SendDate>\
         <SentDate>{send_date}</SentDate><EmailName>Newsletter {id}</EmailName>"
    )
}

pub fn event_result(send_id: u32, event_date: &str, subscriber: &str) -> String {
    format!(
        "<SendID>{send_id}</SendID><EventDate>{event_date}</EventDate>\
         <EventType>Open</EventType><SubscriberKey>{subscriber}</SubscriberKey>"
    )
}

/// A SOAP fault returned with HTTP 500.
pub fn fault_response(code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_string(soap_envelope(&format!(
        "<soap:Fault><faultcode>{code}</faultcode><faultstring>{message}</faultstring></soap:Fault>"
    )))
}
