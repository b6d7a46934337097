use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

const SHIPMENT: &str = r#"{
    "shipper": {
        "contact": { "person_name": "Sender", "company_name": "Company" },
        "address": {
            "street_lines": ["1202 Chalet Ln"],
            "city": "Harrison",
            "state_or_province_code": "AR",
            "postal_code": "72601",
            "country_code": "US"
        }
    },
    "recipient": {
        "contact": { "person_name": "Recipient" },
        "address": {
            "street_lines": ["Main Street"],
            "city": "Franklin Park",
            "state_or_province_code": "IL",
            "postal_code": "60131",
            "country_code": "US",
            "residential": false
        }
    },
    "packages": [
        { "weight": { "units": "LB", "value": 2 }, "dimensions": { "length": 10, "width": 5, "height": 4, "units": "IN" } }
    ],
    "service_type": "FEDEX_GROUND"
}"#;

const SUCCESS_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RateReply xmlns="http://fedex.com/ws/rate/v13">
  <HighestSeverity>SUCCESS</HighestSeverity>
  <Notifications><Severity>SUCCESS</Severity><Message>Request was successfully processed.</Message></Notifications>
  <RateReplyDetails>
    <ServiceType>FEDEX_GROUND</ServiceType>
    <RatedShipmentDetails>
      <ShipmentRateDetail>
        <RateType>PAYOR_ACCOUNT_PACKAGE</RateType>
        <RateZone>5</RateZone>
        <TotalBillingWeight><Units>LB</Units><Value>2.0</Value></TotalBillingWeight>
        <TotalBaseCharge><Currency>USD</Currency><Amount>12.45</Amount></TotalBaseCharge>
        <TotalNetCharge><Currency>USD</Currency><Amount>15.00</Amount></TotalNetCharge>
      </ShipmentRateDetail>
    </RatedShipmentDetails>
  </RateReplyDetails>
</RateReply>"#;

fn write_shipment() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shipment.json");
    std::fs::write(&path, SHIPMENT).unwrap();
    (dir, path)
}

fn shiprate(endpoint: &str, shipment: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("shiprate"));
    cmd.env("FEDEX_KEY", "test-key")
        .env("FEDEX_PASSWORD", "test-password")
        .env("FEDEX_ACCOUNT_NUMBER", "510087000")
        .env("FEDEX_METER", "118000000")
        .env_remove("FEDEX_MODE")
        .env_remove("SHIPRATE_ENDPOINT")
        .arg("quote")
        .arg(shipment)
        .arg("--endpoint")
        .arg(endpoint);
    cmd
}

#[test]
fn test_quote_success() {
    let mut server = Server::new();
    let endpoint = format!("{}/xml", server.url());

    let mock = server
        .mock("POST", "/xml")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"^<RateRequest xmlns="http://fedex.com/ws/rate/v13">"#.to_string()),
            Matcher::Regex("<RateRequestTypes>ACCOUNT</RateRequestTypes>".to_string()),
            Matcher::Regex("<AccountNumber>510087000</AccountNumber>".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(SUCCESS_REPLY)
        .create();

    let (_dir, shipment) = write_shipment();

    shiprate(&endpoint, &shipment)
        .assert()
        .success()
        .stdout(predicates::str::contains("PAYOR_ACCOUNT_PACKAGE"))
        .stdout(predicates::str::contains("2.0 LB"))
        .stdout(predicates::str::contains("15.00 USD"));

    mock.assert();
}

#[test]
fn test_quote_saturday_requests_list_rates() {
    let mut server = Server::new();
    let endpoint = format!("{}/xml", server.url());

    let mock = server
        .mock("POST", "/xml")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<ReturnTransitAndCommit>true</ReturnTransitAndCommit>".to_string()),
            Matcher::Regex("<SpecialServiceTypes>SATURDAY_DELIVERY</SpecialServiceTypes>".to_string()),
            Matcher::Regex("<RateRequestTypes>LIST</RateRequestTypes>".to_string()),
        ]))
        .with_status(200)
        .with_body(SUCCESS_REPLY)
        .create();

    let (_dir, shipment) = write_shipment();

    shiprate(&endpoint, &shipment)
        .arg("--saturday")
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_quote_rejection_prints_notification() {
    let mut server = Server::new();
    let endpoint = format!("{}/xml", server.url());

    let _mock = server
        .mock("POST", "/xml")
        .with_status(200)
        .with_body(
            r#"<RateReply xmlns="http://fedex.com/ws/rate/v13">
                 <HighestSeverity>ERROR</HighestSeverity>
                 <Notifications><Severity>ERROR</Severity><Message>Invalid postal code</Message></Notifications>
               </RateReply>"#,
        )
        .create();

    let (_dir, shipment) = write_shipment();

    shiprate(&endpoint, &shipment)
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid postal code"));
}

#[test]
fn test_quote_fault_envelope() {
    let mut server = Server::new();
    let endpoint = format!("{}/xml", server.url());

    let _mock = server
        .mock("POST", "/xml")
        .with_status(500)
        .with_body(
            r#"<soapenv:Fault xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
                 <faultcode>soapenv:Server</faultcode>
                 <faultstring>Fault</faultstring>
                 <detail>
                   <con:fault xmlns:con="http://www.bea.com/wli/sb/context">
                     <con:reason>Client error</con:reason>
                     <con:details>
                       <con1:ValidationFailureDetail xmlns:con1="http://www.bea.com/wli/sb/stages/transform/config">
                         <con1:message>ZIP required</con1:message>
                       </con1:ValidationFailureDetail>
                     </con:details>
                   </con:fault>
                 </detail>
               </soapenv:Fault>"#,
        )
        .create();

    let (_dir, shipment) = write_shipment();

    shiprate(&endpoint, &shipment)
        .assert()
        .failure()
        .stderr(predicates::str::contains("Client error"))
        .stderr(predicates::str::contains("ZIP required"));
}

#[test]
fn test_quote_missing_credentials() {
    let (_dir, shipment) = write_shipment();

    Command::new(cargo::cargo_bin!("shiprate"))
        .env_remove("FEDEX_KEY")
        .env_remove("FEDEX_PASSWORD")
        .env_remove("FEDEX_ACCOUNT_NUMBER")
        .env_remove("FEDEX_METER")
        .arg("quote")
        .arg(&shipment)
        .assert()
        .failure()
        .stderr(predicates::str::contains("FEDEX_KEY"));
}

#[test]
fn test_request_prints_xml_without_sending() {
    let (_dir, shipment) = write_shipment();

    Command::new(cargo::cargo_bin!("shiprate"))
        .env("FEDEX_KEY", "test-key")
        .env("FEDEX_PASSWORD", "test-password")
        .env("FEDEX_ACCOUNT_NUMBER", "510087000")
        .env("FEDEX_METER", "118000000")
        .arg("request")
        .arg(&shipment)
        .arg("--future-day")
        .arg("1")
        .assert()
        .success()
        .stdout(predicates::str::starts_with(
            r#"<RateRequest xmlns="http://fedex.com/ws/rate/v13">"#,
        ))
        .stdout(predicates::str::contains("<ServiceType>FEDEX_GROUND</ServiceType>"))
        .stdout(predicates::str::contains("<PackageCount>1</PackageCount>"));
}
