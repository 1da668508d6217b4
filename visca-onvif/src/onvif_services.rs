use crate::{onvif_requests, soap, target::OnvifTarget};
use reqwest::Client;
use roxmltree::{Document, Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub media: String,
    pub ptz: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Discovered {
    media: Option<String>,
    ptz: Option<String>,
}

impl Discovered {
    fn is_complete(&self) -> bool {
        self.media.is_some() && self.ptz.is_some()
    }

    fn fill_from(&mut self, other: Discovered) {
        if self.media.is_none() {
            self.media = other.media;
        }
        if self.ptz.is_none() {
            self.ptz = other.ptz;
        }
    }
}

/// Resolves the media and PTZ service addresses.
///
/// GetServices is tried first, GetCapabilities fills whatever is still missing,
/// and the device endpoint stands in for any address neither call reported.
pub async fn discover_endpoints(client: &Client, target: &OnvifTarget) -> ServiceEndpoints {
    let device = target.onvif_endpoint();
    let mut found = Discovered::default();

    let request = onvif_requests::get_services();
    match soap::send(client, target, &device, &request.action(), &request.body).await {
        Ok(response) if response.is_success() => found = parse_services(&response.body),
        Ok(response) => soap::log_response(request.operation, &device, &response),
        Err(err) => tracing::debug!("GetServices failed: {err:#}"),
    }

    if !found.is_complete() {
        let request = onvif_requests::get_capabilities();
        match soap::send(client, target, &device, &request.action(), &request.body).await {
            Ok(response) if response.is_success() => {
                found.fill_from(parse_capabilities(&response.body))
            }
            Ok(response) => soap::log_response(request.operation, &device, &response),
            Err(err) => tracing::debug!("GetCapabilities failed: {err:#}"),
        }
    }

    ServiceEndpoints {
        media: found.media.unwrap_or_else(|| device.clone()),
        ptz: found.ptz.unwrap_or(device),
    }
}

fn parse_services(body: &str) -> Discovered {
    let Ok(doc) = Document::parse(body) else {
        return Discovered::default();
    };
    let mut found = Discovered::default();
    for service in doc.descendants().filter(|node| node.has_tag_name("Service")) {
        let (Some(namespace), Some(xaddr)) =
            (child_text(service, "Namespace"), child_text(service, "XAddr"))
        else {
            continue;
        };
        if namespace.contains("media/wsdl") && found.media.is_none() {
            found.media = Some(xaddr);
        } else if namespace.contains("ptz/wsdl") {
            found.ptz = Some(xaddr);
        }
    }
    found
}

fn parse_capabilities(body: &str) -> Discovered {
    let Ok(doc) = Document::parse(body) else {
        return Discovered::default();
    };
    let xaddr_of = |section: &str| {
        doc.descendants()
            .find(|node| node.has_tag_name(section))
            .and_then(|node| child_text(node, "XAddr"))
    };
    Discovered {
        media: xaddr_of("Media"),
        ptz: xaddr_of("PTZ"),
    }
}

fn child_text(node: Node, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
