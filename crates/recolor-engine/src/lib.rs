use std::path::Path;
use std::sync::Arc;

use recolor_contracts::events::{new_invocation_id, EventKind, EventPayload, EventWriter};
use recolor_contracts::{ColorizeConfig, ColorizeError};
use serde_json::{json, Value};

pub mod extract;
pub mod output;
pub mod payload;
pub mod source;
pub mod transport;

pub use extract::{extract_image, DecodedImage, ImageExtraction};
pub use output::{output_path_for, write_output, OutputImage};
pub use payload::{data_url, ColorizationRequest};
pub use source::{load_source, mime_for_path, SourceImage};
pub use transport::{invoke, DryrunTransport, HttpReply, HttpTransport, Transport};

/// Runs the load → encode → invoke → extract → write pipeline.
///
/// Holds only the shared transport and an optional event log, so one
/// instance can serve concurrent invocations on different images.
#[derive(Clone)]
pub struct Colorizer {
    transport: Arc<dyn Transport>,
    events: Option<EventWriter>,
}

impl Colorizer {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            events: None,
        }
    }

    /// Builds the HTTP transport from the configured timeouts.
    pub fn from_config(config: &ColorizeConfig) -> Result<Self, ColorizeError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config.timeouts)?)))
    }

    pub fn with_events(mut self, events: EventWriter) -> Self {
        self.events = Some(events);
        self
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Configuration and input problems are reported before anything is
    /// written, the event log included.
    pub fn colorize(
        &self,
        config: &ColorizeConfig,
        input: &Path,
    ) -> Result<OutputImage, ColorizeError> {
        config.validate()?;
        let source = load_source(input)?;

        let invocation_id = new_invocation_id();
        self.emit(
            EventKind::ColorizeStarted,
            &invocation_id,
            json!({
                "input": input.to_string_lossy(),
                "model": config.model,
                "endpoint": config.endpoint,
                "transport": self.transport.name(),
            }),
        );
        let result = self.run(config, source, &invocation_id);
        match &result {
            Ok(output) => self.emit(
                EventKind::ColorizeFinished,
                &invocation_id,
                json!({
                    "output": output.path.to_string_lossy(),
                    "bytes_written": output.bytes_written,
                    "sha256": output.sha256,
                    "output_format": output.format,
                }),
            ),
            Err(err) => self.emit(
                EventKind::ColorizeFailed,
                &invocation_id,
                json!({
                    "error_kind": err.kind().as_str(),
                    "message": err.to_string(),
                }),
            ),
        }
        result
    }

    fn run(
        &self,
        config: &ColorizeConfig,
        source: SourceImage,
        invocation_id: &str,
    ) -> Result<OutputImage, ColorizeError> {
        let request = ColorizationRequest::new(&config.model, config.prompt.as_deref(), &source);
        let body = request.to_body()?;
        let SourceImage {
            path: source_path,
            bytes: source_bytes,
            mime_type,
        } = source;
        self.emit(
            EventKind::RequestEncoded,
            invocation_id,
            json!({
                "mime_type": mime_type,
                "input_bytes": source_bytes.len(),
                "body_bytes": body.len(),
            }),
        );
        drop(source_bytes);
        drop(request);

        let response = invoke(
            self.transport.as_ref(),
            &config.endpoint,
            &config.api_key,
            &body,
        )?;
        self.emit(
            EventKind::ResponseReceived,
            invocation_id,
            json!({ "response_bytes": response.len() }),
        );

        let image = extract_image(&response).into_result(&response)?;
        write_output(&image.bytes, &source_path)
    }

    fn emit(&self, kind: EventKind, invocation_id: &str, payload: Value) {
        let Some(events) = &self.events else {
            return;
        };
        let payload: EventPayload = payload.as_object().cloned().unwrap_or_default();
        // Event log failures never fail the invocation.
        let _ = events.emit(kind, invocation_id, payload);
    }
}
