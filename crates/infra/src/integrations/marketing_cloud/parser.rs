//! SOAP response decoding
//!
//! Responses are read into a small element tree first, then the envelope body
//! is inspected. A `soap:Fault` anywhere a payload is expected is surfaced as
//! a [`SoapFault`].

use mcreport_domain::{
    ApiObject, McReportError, Result, RetrieveResponse, RetrieveStatus, SystemStatus,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::errors::SoapFault;
use crate::errors::InfraError;

/// Nesting limit for response documents.
const MAX_DEPTH: usize = 64;

/// Object type used when a `Results` element carries no `xsi:type`.
const UNTYPED_OBJECT: &str = "APIObject";

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> std::result::Result<Self, InfraError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self { name, attributes, ..Self::default() })
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|child| child.text.as_str())
    }
}

fn parse_document(xml: &str) -> std::result::Result<Node, InfraError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Node::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() > MAX_DEPTH {
                    return Err(protocol(format!("response nested deeper than {MAX_DEPTH} levels")));
                }
                stack.push(Node::from_start(&start)?);
            }
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                current(&mut stack)?.children.push(node);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                current(&mut stack)?.text.push_str(&text);
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                current(&mut stack)?.text.push_str(&text);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| protocol("unbalanced end tag"))?;
                current(&mut stack)?.children.push(node);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match stack.pop() {
        Some(root) if stack.is_empty() => Ok(root),
        _ => Err(protocol("response ended inside an open element")),
    }
}

fn current(stack: &mut [Node]) -> std::result::Result<&mut Node, InfraError> {
    stack.last_mut().ok_or_else(|| protocol("unbalanced end tag"))
}

fn protocol(message: impl Into<String>) -> InfraError {
    InfraError(McReportError::Protocol(message.into()))
}

/// First element inside `Envelope/Body`.
fn body_payload(root: &Node) -> Result<&Node> {
    root.child("Envelope")
        .and_then(|envelope| envelope.child("Body"))
        .and_then(|body| body.children.first())
        .ok_or_else(|| McReportError::Protocol("response has no SOAP body payload".into()))
}

fn fault_from(node: &Node) -> SoapFault {
    SoapFault::new(
        node.child_text("faultcode").unwrap_or_default().trim(),
        node.child_text("faultstring").unwrap_or_default().trim(),
    )
}

/// Payload element with the expected name, or the fault the body carries.
fn expect_payload<'a>(root: &'a Node, expected: &str) -> Result<&'a Node> {
    let payload = body_payload(root)?;
    if payload.name == "Fault" {
        return Err(fault_from(payload).into());
    }
    if payload.name != expected {
        return Err(McReportError::Protocol(format!(
            "expected {expected} in SOAP body, found {}",
            payload.name
        )));
    }
    Ok(payload)
}

/// Extract a SOAP fault from a response body, if it carries one.
pub fn find_fault(xml: &str) -> Option<SoapFault> {
    let root = parse_document(xml).ok()?;
    let payload = body_payload(&root).ok()?;
    (payload.name == "Fault").then(|| fault_from(payload))
}

/// Decode a `RetrieveResponseMsg`.
pub fn parse_retrieve_response(xml: &str) -> Result<RetrieveResponse> {
    let root = parse_document(xml)?;
    let message = expect_payload(&root, "RetrieveResponseMsg")?;

    let status = message
        .child_text("OverallStatus")
        .ok_or_else(|| McReportError::Protocol("RetrieveResponseMsg has no OverallStatus".into()))?;

    Ok(RetrieveResponse {
        status: RetrieveStatus::parse(status),
        status_message: message.child_text("OverallStatusMessage").unwrap_or_default().to_string(),
        request_id: message.child_text("RequestID").unwrap_or_default().trim().to_string(),
        results: message.children_named("Results").map(decode_object).collect(),
    })
}

/// Decode a `GetSystemStatusResponseMsg`.
pub fn parse_system_status_response(xml: &str) -> Result<SystemStatus> {
    let root = parse_document(xml)?;
    let message = expect_payload(&root, "GetSystemStatusResponseMsg")?;

    let status = message.child_text("OverallStatus").ok_or_else(|| {
        McReportError::Protocol("GetSystemStatusResponseMsg has no OverallStatus".into())
    })?;

    let system_status = message
        .child("Results")
        .and_then(|results| results.child("Result"))
        .and_then(|result| result.child_text("SystemStatus"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    Ok(SystemStatus {
        overall_status: RetrieveStatus::parse(status),
        status_message: message.child_text("OverallStatusMessage").unwrap_or_default().to_string(),
        request_id: message.child_text("RequestID").unwrap_or_default().trim().to_string(),
        system_status,
    })
}

fn decode_object(node: &Node) -> ApiObject {
    let object_type = node
        .attribute("type")
        .map(|value| value.rsplit(':').next().unwrap_or(value))
        .filter(|value| !value.is_empty())
        .unwrap_or(UNTYPED_OBJECT);

    let mut object = ApiObject::new(object_type);
    flatten(node, "", &mut object.properties);
    object
}

fn flatten(node: &Node, prefix: &str, out: &mut Vec<(String, String)>) {
    for child in &node.children {
        let path =
            if prefix.is_empty() { child.name.clone() } else { format!("{prefix}.{}", child.name) };
        if child.children.is_empty() {
            out.push((path, child.text.clone()));
        } else {
            flatten(child, &path, out);
        }
    }
}
