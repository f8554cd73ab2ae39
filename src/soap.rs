//! Navigation of the sample `GetNewDataResponse` SOAP envelope.

use crate::document::{Document, Node};
use crate::element::Element;
use crate::error::{Error, Result};

/// SOAP 1.1 response reporting a client's state and the data captured per device.
pub const SAMPLE_ENVELOPE: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<soap:Envelope
    xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema">
    <soap:Body>
        <GetNewDataResponse
            xmlns="sobey.com.LBControlService/">
            <GetNewDataResult>
                <RtnValue>
                    <ClientState IP="172.21.40.99" LASTTIME="2012-07-06 15:50:58" />
                    <GenaralInfo DeviceID="470" Status="0" DataCaptureIP="xw-netmanage-2" DataCaptureTime="2012-07-06 15:23:20" >
                        <key> 22 </key>
                        <key> 2 3 </key>
                    </GenaralInfo>
                    <GenaralInfo DeviceID="470" Status="0" DataCaptureIP="xw-netmanage-2" DataCaptureTime="2012-07-06 15:23:22" >
                        <key22> 24 </key22>
                    </GenaralInfo>
                    <GenaralInfo DeviceID="469" Status="0" DataCaptureIP="xw-netmanage-2" DataCaptureTime="2012-07-06 15:24:04" >
                        <key> 55 </key>
                    </GenaralInfo>
                </RtnValue>
            </GetNewDataResult>
        </GetNewDataResponse>
    </soap:Body>
</soap:Envelope>
"#;

/// Local names leading from the envelope to `RtnValue`.
pub const RTN_VALUE_PATH: [&str; 4] = ["Body", "GetNewDataResponse", "GetNewDataResult", "RtnValue"];

fn envelope(document: &Document) -> Result<Element> {
    document
        .root_element()
        .ok_or_else(|| Error::NotFound("Envelope".to_string()))
}

/// The `RtnValue` element of the response body.
pub fn rtn_value(document: &Document) -> Result<Element> {
    envelope(document)?.find_path(document, &RTN_VALUE_PATH)
}

/// `IP` attribute of `RtnValue/ClientState`.
pub fn client_state_ip(document: &Document) -> Result<&str> {
    let client_state = rtn_value(document)?
        .find(document, "ClientState")
        .ok_or_else(|| Error::NotFound(format!("{}/ClientState", RTN_VALUE_PATH.join("/"))))?;
    client_state
        .attribute(document, "IP")
        .ok_or_else(|| Error::NotFound(format!("{}/ClientState@IP", RTN_VALUE_PATH.join("/"))))
}

/// `(name, text)` of every child of every `GenaralInfo` element, in document order.
pub fn general_info_entries(document: &Document) -> Result<Vec<(String, String)>> {
    let rtn_value = rtn_value(document)?;
    let entries = rtn_value
        .find_all(document, "GenaralInfo")
        .flat_map(|info| info.child_elements(document))
        .map(|child| {
            (
                child.name(document).to_string(),
                child.text(document).into_owned(),
            )
        })
        .collect();
    Ok(entries)
}

/// Children of the envelope, where the full walk starts.
pub fn envelope_children(document: &Document) -> Result<&[Node]> {
    Ok(envelope(document)?.children(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ReadOptions;
    use crate::walker::TreeWalker;
    use std::str::FromStr;

    fn sample() -> Document {
        Document::from_str(SAMPLE_ENVELOPE).unwrap()
    }

    fn trimmed_sample() -> Document {
        let opts = ReadOptions {
            trim_text: true,
            ..ReadOptions::default()
        };
        Document::parse_str_with_opts(SAMPLE_ENVELOPE, opts).unwrap()
    }

    #[test]
    fn test_client_state_ip() {
        let doc = sample();
        assert_eq!(client_state_ip(&doc).unwrap(), "172.21.40.99");
    }

    #[test]
    fn test_general_info_entries() {
        let doc = sample();
        let entries = general_info_entries(&doc).unwrap();
        let entries: Vec<(&str, &str)> = entries
            .iter()
            .map(|(n, t)| (n.as_str(), t.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![("key", " 22 "), ("key", " 2 3 "), ("key22", " 24 "), ("key", " 55 ")]
        );
    }

    #[test]
    fn test_general_info_entries_trimmed() {
        let doc = trimmed_sample();
        let entries = general_info_entries(&doc).unwrap();
        let entries: Vec<(&str, &str)> = entries
            .iter()
            .map(|(n, t)| (n.as_str(), t.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![("key", "22"), ("key", "2 3"), ("key22", "24"), ("key", "55")]
        );
    }

    #[test]
    fn test_full_walk() {
        let doc = trimmed_sample();
        let nodes = envelope_children(&doc).unwrap();
        let names: Vec<String> = TreeWalker::new(&doc)
            .collect(nodes)
            .into_iter()
            .map(|(name, text)| format!("{}={}", name, text))
            .collect();
        assert_eq!(
            names,
            vec![
                "Body=",
                "GetNewDataResponse=",
                "GetNewDataResult=",
                "RtnValue=",
                "ClientState=",
                "GenaralInfo=",
                "key=22",
                "key=2 3",
                "GenaralInfo=",
                "key22=24",
                "GenaralInfo=",
                "key=55",
            ]
        );
    }

    #[test]
    fn test_full_walk_keeps_whitespace() {
        let doc = sample();
        let pairs = TreeWalker::new(&doc).collect(envelope_children(&doc).unwrap());
        assert_eq!(pairs.len(), 12);
        assert_eq!(pairs[0].0, "Body");
        assert!(!pairs[0].1.is_empty() && pairs[0].1.trim().is_empty());
        assert_eq!(pairs[6], ("key".to_string(), " 22 ".to_string()));
        assert_eq!(pairs[9], ("key22".to_string(), " 24 ".to_string()));
    }

    #[test]
    fn test_missing_path() {
        let doc = Document::from_str(r#"<?xml version="1.0"?><Envelope><Body/></Envelope>"#)
            .unwrap();
        match client_state_ip(&doc) {
            Err(Error::NotFound(path)) => assert_eq!(path, "Body/GetNewDataResponse"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(general_info_entries(&doc).is_err());
        assert_eq!(envelope_children(&doc).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_ip() {
        let doc = Document::from_str(
            r#"<?xml version="1.0"?><E><Body><GetNewDataResponse><GetNewDataResult><RtnValue><ClientState/></RtnValue></GetNewDataResult></GetNewDataResponse></Body></E>"#,
        )
        .unwrap();
        assert!(matches!(client_state_ip(&doc), Err(Error::NotFound(p)) if p.ends_with("@IP")));
        assert!(general_info_entries(&doc).unwrap().is_empty());
    }
}
