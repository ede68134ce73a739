use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use recolor_contracts::ColorizeError;
use serde_json::Value;

const MAX_RESPONSE_EXCERPT_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Taken from the data URL header; informational only.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Outcome of looking for the output image in a chat-completion reply.
///
/// `message.images` is a provider extension, so every absence is reported
/// by name instead of collapsing into `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageExtraction {
    Found(DecodedImage),
    MissingField(&'static str),
    MalformedValue(String),
}

impl ImageExtraction {
    pub fn into_result(self, raw_body: &str) -> Result<DecodedImage, ColorizeError> {
        let excerpt = truncate_text(raw_body, MAX_RESPONSE_EXCERPT_CHARS);
        match self {
            ImageExtraction::Found(image) => Ok(image),
            ImageExtraction::MissingField(field) => {
                let what = match field {
                    "choices" => "no choices",
                    "message" => "no message",
                    "images" => "no images",
                    _ => "no image URL",
                };
                Err(ColorizeError::Protocol(format!(
                    "{what} in response: {excerpt}"
                )))
            }
            ImageExtraction::MalformedValue(detail) => Err(ColorizeError::Protocol(format!(
                "{detail} in response: {excerpt}"
            ))),
        }
    }
}

pub fn extract_image(body: &str) -> ImageExtraction {
    let payload: Value = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(err) => {
            return ImageExtraction::MalformedValue(format!("response is not valid JSON ({err})"))
        }
    };

    let Some(choice) = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    else {
        return ImageExtraction::MissingField("choices");
    };
    let Some(message) = choice.get("message").and_then(Value::as_object) else {
        return ImageExtraction::MissingField("message");
    };
    let Some(image) = message
        .get("images")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    else {
        return ImageExtraction::MissingField("images");
    };
    let url = match image.pointer("/image_url/url") {
        None | Some(Value::Null) => return ImageExtraction::MissingField("image_url.url"),
        Some(Value::String(url)) => url,
        Some(_) => {
            return ImageExtraction::MalformedValue("image_url.url is not a string".to_string())
        }
    };

    decode_data_url(url)
}

/// Decodes everything after the first comma of a `data:<mime>;base64,` URL.
pub fn decode_data_url(url: &str) -> ImageExtraction {
    let Some((meta, payload)) = url.split_once(',') else {
        return ImageExtraction::MalformedValue("image URL is not a data URL".to_string());
    };
    let mime_type = meta
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let bytes = match BASE64.decode(payload.trim().as_bytes()) {
        Ok(bytes) => bytes,
        Err(err) => {
            return ImageExtraction::MalformedValue(format!("image data is not base64 ({err})"))
        }
    };
    if bytes.is_empty() {
        return ImageExtraction::MalformedValue("image data is empty".to_string());
    }
    ImageExtraction::Found(DecodedImage { mime_type, bytes })
}

pub fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
