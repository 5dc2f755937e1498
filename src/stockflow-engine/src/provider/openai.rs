// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::Deserialize;
use serde_json::json;

use super::{
    EXTRACTION_PROMPT, ExtractionProvider, ImageInput, ProviderConfig, ProviderKind,
    ProviderRequest,
};
use crate::common::Result;
use crate::provider_err;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

/// OpenAI Responses API, asked for a JSON object.
pub struct OpenAiProvider {
    config: ProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        OpenAiProvider { config }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponseEnvelope {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text {
            return text;
        }
        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text)
            .collect()
    }
}

impl ExtractionProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, image: &ImageInput) -> Result<ProviderRequest> {
        let body = json!({
            "model": self.config.model,
            "input": [{
                "role": "user",
                "content": [
                    {"type": "input_text", "text": EXTRACTION_PROMPT},
                    {"type": "input_image", "image_url": image.data_uri()},
                ],
            }],
            "text": {"format": {"type": "json_object"}},
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
        });

        Ok(ProviderRequest {
            url: RESPONSES_URL.to_owned(),
            query: vec![],
            headers: vec![(
                "Authorization".to_owned(),
                format!("Bearer {}", self.config.api_key),
            )],
            body,
        })
    }

    fn extract_text(&self, body: &str) -> Result<String> {
        let envelope: ResponseEnvelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(err) => {
                return provider_err!(
                    MalformedResponse,
                    format!("unexpected OpenAI response: {err}")
                );
            }
        };

        let text = envelope.into_text();
        if text.trim().is_empty() {
            return provider_err!(
                EmptyResponse,
                "API returned an empty response. Check your model access, prompt, and image input."
                    .to_owned()
            );
        }

        Ok(text)
    }
}
