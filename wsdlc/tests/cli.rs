use assert_cmd::Command;
use predicates::prelude::*;
use std::{fs, path::Path};
use tempfile::TempDir;

const CALCULATOR: &str = r#"<?xml version="1.0"?>
<definitions xmlns="http://schemas.xmlsoap.org/wsdl/"
             xmlns:soap="http://schemas.xmlsoap.org/wsdl/soap/"
             xmlns:xsd="http://www.w3.org/2001/XMLSchema"
             xmlns:tns="urn:calc"
             targetNamespace="urn:calc">
  <types>
    <xsd:schema targetNamespace="urn:calc">
      <xsd:import schemaLocation="operand.xsd"/>
    </xsd:schema>
  </types>
  <message name="AddRequest">
    <part name="left" type="tns:Operand"/>
    <part name="right" type="tns:Operand"/>
  </message>
  <message name="AddResponse">
    <part name="sum" type="xsd:double"/>
  </message>
  <portType name="CalculatorPortType">
    <operation name="add">
      <input message="tns:AddRequest"/>
      <output message="tns:AddResponse"/>
    </operation>
  </portType>
  <binding name="CalculatorBinding" type="tns:CalculatorPortType"/>
  <service name="Calculator">
    <port name="CalculatorPort" binding="tns:CalculatorBinding">
      <soap:address location="http://localhost/calc"/>
    </port>
  </service>
</definitions>"#;

const OPERAND: &str = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:complexType name="Operand">
    <xsd:sequence>
      <xsd:element name="value" type="xsd:double"/>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;

const CONFIG: &str = r#"
[environments.default.webservices.calculator]
wsdl = "calculator.wsdl"
output = "generated"
output_bases = "generated/base"
namespace = "Calc"
namespace_bases = "CalcBase"

[environments.broken.webservices.missing]
wsdl = "missing.wsdl"
output = "missing"
output_bases = "missing/base"
namespace = "Missing"
namespace_bases = "MissingBase"
"#;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("wsdlc").unwrap()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("calculator.wsdl"), CALCULATOR).unwrap();
    fs::write(dir.path().join("operand.xsd"), OPERAND).unwrap();
    fs::write(dir.path().join("wsdlc.toml"), CONFIG).unwrap();
    dir
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn help_lists_generate() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn generates_configured_environment() {
    let dir = project();

    cli().current_dir(dir.path()).assert().success();

    let generated = dir.path().join("generated");
    assert!(read(&generated.join("base/Operand.rs")).contains("pub value: f64,"));
    assert!(read(&generated.join("base/Calculator.rs")).contains("pub fn add("));
    assert!(read(&generated.join("Operand.rs")).contains("pub struct CalcOperand(pub CalcBaseOperand);"));
    assert!(generated.join("Calculator.rs").exists());
    assert!(generated.join("CalcWsObject.rs").exists());
}

#[test]
fn rerun_keeps_customized_classes() {
    let dir = project();
    cli().current_dir(dir.path()).assert().success();

    let derived = dir.path().join("generated/Operand.rs");
    fs::write(&derived, "// customized").unwrap();

    cli().current_dir(dir.path()).assert().success();

    assert_eq!(read(&derived), "// customized");
}

#[test]
fn generate_subcommand_runs_one_webservice() {
    let dir = project();
    let output = dir.path().join("single");

    cli()
        .arg("generate")
        .arg(dir.path().join("calculator.wsdl"))
        .arg("--namespace")
        .arg("Single")
        .arg("--namespace-bases")
        .arg("SingleBase")
        .arg("--output")
        .arg(&output)
        .arg("--output-bases")
        .arg(output.join("base"))
        .arg("--parent-soap-class")
        .arg("HttpTransport")
        .assert()
        .success();

    let service = read(&output.join("base/Calculator.rs"));
    assert!(service.contains("pub struct SingleBaseCalculator {"));
    assert!(service.contains("transport: HttpTransport,"));
}

#[test]
fn unknown_environment_fails() {
    let dir = project();

    cli()
        .current_dir(dir.path())
        .args(&["--env", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownEnvironment"));
}

#[test]
fn failing_webservice_fails_the_run() {
    let dir = project();

    cli()
        .current_dir(dir.path())
        .args(&["--env", "broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}
