use crate::error::TurnError;
use crate::partial::TurnSnapshot;
use crate::prompt::{TurnRequest, build_turn_prompt};
use crate::turn::TurnContent;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
};
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;

const TURN_SCHEMA: &str = include_str!("../schema/turn_content.json");

/// One item of the incrementally-delivered turn object.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// A repaired snapshot of the object as streamed so far.
    Partial(TurnSnapshot),
    /// The complete, strictly-validated object. Always the last event of a
    /// successful stream.
    Finish(TurnContent),
}

/// The seam between the session controller and the completion service.
///
/// A failed request is signalled by the channel closing without a
/// [`TurnEvent::Finish`]; no terminal object is ever synthesized.
pub trait TurnSource: Send + Sync {
    fn request_turn(&self, request: TurnRequest) -> mpsc::UnboundedReceiver<TurnEvent>;
}

/// Production turn source: a streamed, schema-constrained chat completion.
pub struct OpenAiTurnSource {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTurnSource {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(openai_config),
            model: model.into(),
        }
    }
}

impl TurnSource for OpenAiTurnSource {
    fn request_turn(&self, request: TurnRequest) -> mpsc::UnboundedReceiver<TurnEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        let model = self.model.clone();
        let prompt = build_turn_prompt(&request);

        tokio::spawn(async move {
            if let Err(e) = stream_turn(client, model, prompt, tx).await {
                // Dropping the sender ends the stream without a finish
                // event, which is the contract for a failed turn.
                log::error!("turn request failed: {e:#}");
            }
        });

        rx
    }
}

fn turn_response_format() -> Result<ResponseFormat, TurnError> {
    let json_schema: Value = serde_json::from_str(TURN_SCHEMA)?;
    let name = json_schema["name"].as_str().unwrap_or("turn_content");
    let schema = json_schema["schema"].clone();
    let strict = json_schema["strict"].as_bool().unwrap_or(true);
    Ok(ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name: name.into(),
            schema: Some(schema),
            strict: Some(strict),
        },
    })
}

async fn stream_turn(
    client: Client<OpenAIConfig>,
    model: String,
    prompt: String,
    tx: mpsc::UnboundedSender<TurnEvent>,
) -> Result<(), TurnError> {
    let request = CreateChatCompletionRequestArgs::default()
        .model(&model)
        .response_format(turn_response_format()?)
        .messages([ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?
            .into()])
        .stream(true)
        .build()?;

    let mut stream = client.chat().create_stream(request).await?;

    let mut buffer = String::new();
    while let Some(next) = stream.next().await {
        let chunk = next?;
        let Some(delta) = chunk
            .choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
        else {
            continue;
        };
        buffer.push_str(delta);
        if let Some(snapshot) = TurnSnapshot::from_partial(&buffer) {
            if tx.send(TurnEvent::Partial(snapshot)).is_err() {
                // Receiver gone, nobody is playing this turn anymore.
                return Ok(());
            }
        }
    }

    let content: TurnContent = serde_json::from_str(&buffer)
        .map_err(|e| TurnError::Parse(format!("final turn object did not validate: {e}")))?;
    let _ = tx.send(TurnEvent::Finish(content));
    Ok(())
}
