// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::datamodel;
use crate::equation::EquationNormalizer;
use crate::export_err;
use crate::layout::Layout;

pub mod variables;
pub mod views;

pub use self::variables::{Aux, Flow, Stock, Var, Variables};
pub use self::views::view_element;
pub use self::views::{View, ViewObject, Views};

pub(crate) trait ToXml<W: Clone + Write> {
    fn write_xml(&self, writer: &mut Writer<W>) -> Result<()>;
}

pub(crate) type XmlWriter = Cursor<Vec<u8>>;

const XMILE_VERSION: &str = "1.0";
const XML_NS_HTTP: &str = "http://docs.oasis-open.org/xmile/ns/XMILE/v1.0";
const VENDOR: &str = "Stockflow";
const PRODUCT_NAME: &str = "stockflow";
const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_MODEL_NAME: &str = "Converted System Dynamics Model";

/// Caller-controlled parts of the emitted document.
#[derive(Clone, Debug, PartialEq)]
pub struct XmileOptions {
    /// Written to `<header><name>`.
    pub model_name: String,
    pub sim_specs: SimSpecs,
}

impl Default for XmileOptions {
    fn default() -> Self {
        XmileOptions {
            model_name: DEFAULT_MODEL_NAME.to_owned(),
            sim_specs: SimSpecs::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename = "xmile")]
pub struct File {
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "@xmlns", default)]
    pub namespace: String,
    pub header: Header,
    pub sim_specs: SimSpecs,
    pub model: Model,
}

impl File {
    /// Assemble the document for `model`, drawn according to `layout`.
    /// Flow and auxiliary equations are normalized here.
    pub fn new(model: &datamodel::Model, layout: &Layout, options: &XmileOptions) -> Self {
        let normalizer = EquationNormalizer::new(model.variable_names());

        File {
            version: XMILE_VERSION.to_owned(),
            namespace: XML_NS_HTTP.to_owned(),
            header: Header {
                name: if options.model_name.is_empty() {
                    None
                } else {
                    Some(options.model_name.clone())
                },
                vendor: VENDOR.to_owned(),
                product: Product {
                    name: Some(PRODUCT_NAME.to_owned()),
                    version: Some(PRODUCT_VERSION.to_owned()),
                },
            },
            sim_specs: options.sim_specs.clone(),
            model: Model {
                variables: Variables::new(model, &normalizer),
                views: Views::from(layout),
            },
        }
    }
}

impl ToXml<XmlWriter> for File {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        let attrs = &[
            ("version", self.version.as_str()),
            ("xmlns", self.namespace.as_str()),
        ];
        write_tag_start_with_attrs(writer, "xmile", attrs)?;

        self.header.write_xml(writer)?;
        self.sim_specs.write_xml(writer)?;
        self.model.write_xml(writer)?;

        write_tag_end(writer, "xmile")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Header {
    pub name: Option<String>,
    pub vendor: String,
    pub product: Product,
}

impl ToXml<XmlWriter> for Header {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "header")?;

        if let Some(ref name) = self.name {
            write_tag(writer, "name", name)?;
        }

        write_tag(writer, "vendor", self.vendor.as_str())?;

        let mut attrs = Vec::with_capacity(1);
        if let Some(ref version) = self.product.version {
            attrs.push(("version", version.as_str()));
        }
        let name: &str = self.product.name.as_deref().unwrap_or(PRODUCT_NAME);
        write_tag_with_attrs(writer, "product", name, &attrs)?;

        write_tag_end(writer, "header")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Product {
    #[serde(rename = "$value")]
    pub name: Option<String>,
    #[serde(rename = "@version")]
    pub version: Option<String>,
}

/// Simulation bounds.  Kept as text: `dt` is conventionally written as a
/// fraction such as `1/4`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SimSpecs {
    pub start: String,
    pub stop: String,
    pub dt: String,
}

impl Default for SimSpecs {
    fn default() -> Self {
        SimSpecs {
            start: "0".to_owned(),
            stop: "100".to_owned(),
            dt: "1/4".to_owned(),
        }
    }
}

impl ToXml<XmlWriter> for SimSpecs {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "sim_specs")?;
        write_tag(writer, "start", &self.start)?;
        write_tag(writer, "stop", &self.stop)?;
        write_tag(writer, "dt", &self.dt)?;
        write_tag_end(writer, "sim_specs")
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Model {
    #[serde(default)]
    pub variables: Variables,
    pub views: Views,
}

impl ToXml<XmlWriter> for Model {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "model")?;
        self.variables.write_xml(writer)?;
        self.views.write_xml(writer)?;
        write_tag_end(writer, "model")
    }
}

/// Shortest round-trip decimal form of `value`.  Integral values keep a
/// trailing `.0`; magnitudes outside [1e-4, 1e16) switch to exponent
/// notation with a signed exponent of at least two digits (`1e+16`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let s = format!("{value:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => s,
        };
    }

    let s = format!("{value}");
    if s.contains('.') { s } else { format!("{s}.0") }
}

pub(crate) fn xml_error(err: std::io::Error) -> crate::common::Error {
    use crate::common::{Error, ErrorCode, ErrorKind};

    Error::new(
        ErrorKind::Export,
        ErrorCode::XmlSerialization,
        Some(err.to_string()),
    )
}

pub(crate) fn write_tag_start(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<()> {
    write_tag_start_with_attrs(writer, tag_name, &[])
}

pub(crate) fn write_tag_start_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut elem = BytesStart::new(tag_name);
    for attr in attrs.iter() {
        elem.push_attribute(*attr);
    }
    writer.write_event(Event::Start(elem)).map_err(xml_error)
}

pub(crate) fn write_tag_end(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag_name)))
        .map_err(xml_error)
}

pub(crate) fn write_tag_text(writer: &mut Writer<XmlWriter>, content: &str) -> Result<()> {
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_error)
}

pub(crate) fn write_tag(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    content: &str,
) -> Result<()> {
    write_tag_with_attrs(writer, tag_name, content, &[])
}

pub(crate) fn write_tag_with_attrs(
    writer: &mut Writer<XmlWriter>,
    tag_name: &str,
    content: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    write_tag_start_with_attrs(writer, tag_name, attrs)?;

    write_tag_text(writer, content)?;

    write_tag_end(writer, tag_name)
}

/// Serialize `model` and its `layout` into an XMILE document.
pub fn model_to_xmile(
    model: &datamodel::Model,
    layout: &Layout,
    options: &XmileOptions,
) -> Result<String> {
    let file = File::new(model, layout, options);

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;
    file.write_xml(&mut writer)?;

    let result = writer.into_inner().into_inner();

    String::from_utf8(result)
        .or_else(|_err| export_err!(XmlSerialization, "problem converting to UTF-8".to_owned()))
}

#[cfg(test)]
fn write_to_string<T: ToXml<XmlWriter>>(value: &T) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    value.write_xml(&mut writer).unwrap();
    String::from_utf8(writer.into_inner().into_inner()).unwrap()
}

#[test]
fn test_format_float() {
    let cases: &[(f64, &str)] = &[
        (490.0, "490.0"),
        (610.0, "610.0"),
        (-60.0, "-60.0"),
        (0.0, "0.0"),
        (-0.0, "-0.0"),
        (190.5, "190.5"),
        (0.1 + 0.2, "0.30000000000000004"),
        (1e16, "1e+16"),
        (1.5e-5, "1.5e-05"),
        (-2.5e20, "-2.5e+20"),
        (0.0001, "0.0001"),
        (f64::NAN, "nan"),
        (f64::INFINITY, "inf"),
        (f64::NEG_INFINITY, "-inf"),
    ];
    for (value, expected) in cases {
        assert_eq!(*expected, format_float(*value), "formatting {value}");
    }
}

#[test]
fn test_sim_specs_roundtrip() {
    let sim_specs = SimSpecs::default();
    let xml = write_to_string(&sim_specs);
    assert_eq!(
        "<sim_specs><start>0</start><stop>100</stop><dt>1/4</dt></sim_specs>",
        xml
    );

    use quick_xml::de;
    let actual: SimSpecs = de::from_str(&xml).unwrap();
    assert_eq!(sim_specs, actual);
}

#[test]
fn test_header_writing() {
    let header = Header {
        name: Some("Population & Growth".to_owned()),
        vendor: VENDOR.to_owned(),
        product: Product {
            name: Some(PRODUCT_NAME.to_owned()),
            version: Some("1.2.3".to_owned()),
        },
    };
    let xml = write_to_string(&header);
    assert!(xml.contains("<name>Population &amp; Growth</name>"));
    assert!(xml.contains("<product version=\"1.2.3\">stockflow</product>"));

    use quick_xml::de;
    let actual: Header = de::from_str(&xml).unwrap();
    assert_eq!(header, actual);
}

#[test]
fn test_empty_model_name_omits_tag() {
    let options = XmileOptions {
        model_name: String::new(),
        ..XmileOptions::default()
    };
    let file = File::new(&datamodel::Model::default(), &Layout::default(), &options);
    assert_eq!(None, file.header.name);
    assert!(!write_to_string(&file.header).contains("<name>"));
}

#[test]
fn test_declaration_and_root() {
    let xml = model_to_xmile(
        &datamodel::Model::default(),
        &Layout::default(),
        &XmileOptions::default(),
    )
    .unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains(
        "<xmile version=\"1.0\" xmlns=\"http://docs.oasis-open.org/xmile/ns/XMILE/v1.0\">"
    ));
    assert!(xml.contains("<name>Converted System Dynamics Model</name>"));
    assert!(xml.trim_end().ends_with("</xmile>"));
}
