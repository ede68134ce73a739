use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use recolor_contracts::config::effective_prompt;
use recolor_contracts::ColorizeError;
use serde::Serialize;

use crate::source::SourceImage;

/// Output modalities requested from the backend; `image` asks for the
/// `message.images` extension in the reply.
pub const MODALITIES: [&str; 2] = ["image", "text"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "image_url")]
pub struct ImagePart {
    pub image_url: ImageUrl,
}

/// The single user turn; serializes as a two-element `content` array,
/// text first, then the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub role: Role,
    pub content: (TextPart, ImagePart),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorizationRequest {
    pub model: String,
    pub messages: [UserMessage; 1],
    pub modalities: [&'static str; 2],
}

impl ColorizationRequest {
    pub fn new(model: &str, prompt: Option<&str>, source: &SourceImage) -> Self {
        Self {
            model: model.to_string(),
            messages: [UserMessage {
                role: Role::User,
                content: (
                    TextPart {
                        text: effective_prompt(prompt).to_string(),
                    },
                    ImagePart {
                        image_url: ImageUrl {
                            url: data_url(source.mime_type, &source.bytes),
                        },
                    },
                ),
            }],
            modalities: MODALITIES,
        }
    }

    pub fn message(&self) -> &UserMessage {
        let [message] = &self.messages;
        message
    }

    pub fn prompt(&self) -> &str {
        &self.message().content.0.text
    }

    pub fn image_data_url(&self) -> &str {
        &self.message().content.1.image_url.url
    }

    pub fn to_body(&self) -> Result<String, ColorizeError> {
        serde_json::to_string(self)
            .map_err(|err| ColorizeError::Protocol(format!("request encoding failed: {err}")))
    }
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use recolor_contracts::config::DEFAULT_PROMPT;
    use serde_json::{json, Value};

    use super::{data_url, ColorizationRequest};
    use crate::source::SourceImage;

    fn source() -> SourceImage {
        SourceImage {
            path: PathBuf::from("/photos/cat.png"),
            bytes: b"hello".to_vec(),
            mime_type: "image/png",
        }
    }

    #[test]
    fn data_url_has_mime_header_and_standard_base64() {
        assert_eq!(data_url("image/png", b"hello"), "data:image/png;base64,aGVsbG8=");
        assert_eq!(data_url("image/gif", b""), "data:image/gif;base64,");
    }

    #[test]
    fn body_matches_wire_shape() -> anyhow::Result<()> {
        let request = ColorizationRequest::new("google/gemini-2.5-flash-image-preview", Some("paint it"), &source());
        let body: Value = serde_json::from_str(&request.to_body()?)?;
        assert_eq!(
            body,
            json!({
                "model": "google/gemini-2.5-flash-image-preview",
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "paint it" },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,aGVsbG8=" } }
                    ]
                }],
                "modalities": ["image", "text"]
            })
        );
        Ok(())
    }

    #[test]
    fn text_part_precedes_image_part_in_serialized_text() -> anyhow::Result<()> {
        let body = ColorizationRequest::new("m", Some("p"), &source()).to_body()?;
        let text_at = body.find(r#""type":"text""#).unwrap_or(usize::MAX);
        let image_at = body.find(r#""type":"image_url""#).unwrap_or(0);
        assert!(text_at < image_at);
        Ok(())
    }

    #[test]
    fn accessors_read_the_named_parts() {
        let request = ColorizationRequest::new("m", Some("warm tones"), &source());
        assert_eq!(request.prompt(), "warm tones");
        assert_eq!(request.image_data_url(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(request.message().content.0.text, "warm tones");
    }

    #[test]
    fn blank_prompt_uses_default() {
        for prompt in [None, Some(""), Some("   ")] {
            let request = ColorizationRequest::new("m", prompt, &source());
            assert_eq!(request.prompt(), DEFAULT_PROMPT);
        }
    }

    #[test]
    fn model_is_sent_verbatim() -> anyhow::Result<()> {
        let request = ColorizationRequest::new(" Acme/Model:Beta ", None, &source());
        let body: Value = serde_json::from_str(&request.to_body()?)?;
        assert_eq!(body["model"], json!(" Acme/Model:Beta "));
        assert_eq!(request.image_data_url(), "data:image/png;base64,aGVsbG8=");
        Ok(())
    }
}
