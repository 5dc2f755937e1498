// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Extraction of a model graph from a diagram image by a hosted
//! vision/LLM service.
//!
//! Each service is an [`ExtractionProvider`]: it knows how to phrase the
//! request and how to dig the model JSON back out of the service's
//! response envelope.  Sending the request is left to a [`Transport`], so
//! the library itself never opens a network connection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose};
use tracing::{debug, info};

use crate::common::{Error, ErrorCode, ErrorKind, Result, io_error};
use crate::json;
use crate::provider_err;

pub mod gemini;
pub mod openai;

pub use self::gemini::GeminiProvider;
pub use self::openai::OpenAiProvider;

/// Instructions sent alongside every diagram image.
pub const EXTRACTION_PROMPT: &str = concat!(
    "Analyze the following image of a stock and flow diagram in System Dynamics. ",
    "Extract the following information in JSON format: stocks, flows, auxiliaries, and connectors. ",
    "Return a JSON object with keys: 'stocks', 'flows', 'auxiliaries', 'connectors'. ",
    "Each of 'stocks', 'flows', and 'auxiliaries' should be an array of objects with a 'name' property, ",
    "a 'description' property for adding documentation and explanation for each variable suggested by you, ",
    "a 'unit' property for reasonable units that you suggest, and an 'eqn' property for sound equations ",
    "that you suggest. (Note: you should suggest numbers instead of formulas in 'string' type for all the stocks) ",
    "As well as their relative location information in the given image: 'x' and 'y' coordinates (in pixels). ",
    "For stocks, also extract 'inflows' and 'outflows' as lists of flow names. ",
    "List all the names as original. ",
    "Each connector should be an object with properties 'src' and 'tgt' and ONLY take the arrow links ",
    "between model variables into account. ",
    "You need to add the causal links from 'stock' to 'flow' in the 'connectors' part if the variable name ",
    "of 'stock' is used in the suggested 'flow' equation. ",
    "To avoid any omissions, make sure and check every object with properties 'src' and 'tgt' in ",
    "'connectors' has been classified as either 'stocks', or 'flows', or 'auxiliaries'. ",
    "Add their causal relationships in 'connectors' part if any variable is used as part of the equation ",
    "of another variable. ",
);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Environment variable conventionally holding this service's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ProviderKind::OpenAi => "OPENAI",
            ProviderKind::Gemini => "GEMINI",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            _ => provider_err!(
                UnknownProvider,
                format!("unknown provider '{s}' (expected 'openai' or 'gemini')")
            ),
        }
    }
}

/// Everything needed to talk to one provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    /// Only honored by providers that support top-k sampling.
    pub top_k: Option<u32>,
}

impl ProviderConfig {
    /// Sampling settings default to low-variance values for each provider.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        match kind {
            ProviderKind::OpenAi => ProviderConfig {
                kind,
                api_key,
                model: "gpt-4o".to_owned(),
                temperature: 1.0,
                top_p: 0.1,
                top_k: None,
            },
            ProviderKind::Gemini => ProviderConfig {
                kind,
                api_key,
                model: "gemini-2.0-flash".to_owned(),
                temperature: 0.2,
                top_p: 0.95,
                top_k: Some(20),
            },
        }
    }
}

/// A diagram image, base64-encoded for embedding in a request body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: String,
}

impl ImageInput {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return provider_err!(EmptyImage, "image contains no data".to_owned());
        }
        Ok(ImageInput {
            mime_type: mime_type.to_owned(),
            data: general_purpose::STANDARD.encode(bytes),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|err| io_error(ErrorCode::ReadFailed, path, err))?;
        debug!(path = %path.display(), len = bytes.len(), "read diagram image");
        Self::from_bytes(guess_mime_type(path), &bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// MIME type from the file extension; anything unrecognized is sent as JPEG.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// A fully-formed HTTP POST with a JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

pub trait ExtractionProvider {
    fn kind(&self) -> ProviderKind;
    fn config(&self) -> &ProviderConfig;
    fn build_request(&self, image: &ImageInput) -> Result<ProviderRequest>;

    /// Pull the model's JSON text out of the provider's response envelope.
    fn extract_text(&self, body: &str) -> Result<String>;

    fn parse_response(&self, body: &str) -> Result<json::Model> {
        let text = self.extract_text(body)?;
        text.parse::<json::Model>()
    }
}

/// Sends a request and returns the raw response body.  No HTTP client
/// ships with this crate; callers supply one by implementing this trait.
pub trait Transport {
    fn post_json(&self, request: &ProviderRequest) -> Result<String>;
}

pub fn provider_for(config: ProviderConfig) -> Box<dyn ExtractionProvider> {
    match config.kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(config)),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(config)),
    }
}

/// Build the request for `image`, send it, and parse the extracted model.
pub fn extract_model(
    provider: &dyn ExtractionProvider,
    transport: &dyn Transport,
    image: &ImageInput,
) -> Result<json::Model> {
    if provider.config().api_key.trim().is_empty() {
        return Err(Error::new(
            ErrorKind::Provider,
            ErrorCode::MissingApiKey,
            Some(format!(
                "no API key configured (set {})",
                provider.kind().api_key_env()
            )),
        ));
    }

    let request = provider.build_request(image)?;
    info!(provider = %provider.kind(), model = %provider.config().model, "requesting model extraction");

    let body = transport.post_json(&request)?;
    debug!(len = body.len(), "received extraction response");

    provider.parse_response(&body)
}
