// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::{
    EXTRACTION_PROMPT, ExtractionProvider, ImageInput, ProviderConfig, ProviderKind,
    ProviderRequest,
};
use crate::common::Result;
use crate::provider_err;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini `generateContent`.  Gemini tends to wrap its answer in a
/// Markdown code fence, so the JSON object is cut out of the reply text.
pub struct GeminiProvider {
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        GeminiProvider { config }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.config.model)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// The outermost `{...}` span of `text` once code fences are removed.
pub fn extract_json_object(text: &str) -> Option<String> {
    lazy_static! {
        static ref FENCE_RE: Regex = Regex::new(r"```(?:json)?").unwrap();
        static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }

    let stripped = FENCE_RE.replace_all(text, "");
    OBJECT_RE
        .find(stripped.trim())
        .map(|found| found.as_str().to_owned())
}

impl ExtractionProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, image: &ImageInput) -> Result<ProviderRequest> {
        let mut generation_config = json!({
            "temperature": self.config.temperature,
            "topP": self.config.top_p,
        });
        if let Some(top_k) = self.config.top_k {
            generation_config["topK"] = json!(top_k);
        }

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": EXTRACTION_PROMPT},
                    {"inline_data": {"mime_type": image.mime_type, "data": image.data}},
                ],
            }],
            "generationConfig": generation_config,
        });

        Ok(ProviderRequest {
            url: self.endpoint(),
            query: vec![("key".to_owned(), self.config.api_key.clone())],
            headers: vec![],
            body,
        })
    }

    fn extract_text(&self, body: &str) -> Result<String> {
        let response: GenerateContentResponse = match serde_json::from_str(body) {
            Ok(response) => response,
            Err(err) => {
                return provider_err!(
                    MalformedResponse,
                    format!("unexpected Gemini response: {err}")
                );
            }
        };

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text);
        let text = match text {
            Some(text) => text,
            None => {
                return provider_err!(
                    MalformedResponse,
                    "Gemini response has no candidate text".to_owned()
                );
            }
        };

        match extract_json_object(&text) {
            Some(json) => Ok(json),
            None => provider_err!(
                NoJsonInResponse,
                "No valid JSON found in API response".to_owned()
            ),
        }
    }
}
