//! Task orchestration
//!
//! One entry point per capability. Every task runs the same algorithm:
//! validate input, walk the provider chain in order (skipping providers
//! whose circuit breaker is open), extract and coerce the model output,
//! and return a normalized result or a typed failure. Fallback order is
//! data: adding a provider or reordering priority is a constructor change.

use crate::models::*;
use crate::providers::{GenerationRequest, MediaPayload, Provider, ProviderError};
use crate::services::breaker::{CircuitBreaker, Clock};
use crate::utils::error::{AppError, AppResult};
use crate::utils::extract::{extract_json, extract_typed, ExtractError};
use crate::utils::logging::truncate_content;
use crate::utils::payload::{normalize_image, MAX_MEDIA_BASE64_BYTES};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shortest base64 payload accepted as a plausible image
const MIN_IMAGE_CHARS: usize = 100;
/// Chat/voice text input bound
pub const MAX_TEXT_LEN: usize = 2000;
/// Conversation history bound
pub const MAX_HISTORY_LEN: usize = 20;
/// History turns actually forwarded to the model
const HISTORY_WINDOW: usize = 10;
/// Recipe ingredient list bound
pub const MAX_INGREDIENTS: usize = 20;
/// Shopping guidance item bound
pub const MAX_SHOPPING_ITEMS: usize = 5;
/// Live detection result bound
pub const MAX_DETECTIONS: usize = 5;

const TRANSCRIBE_INSTRUCTION: &str =
    "Transcribe this audio exactly. Return only the transcription, nothing else.";

const VOICE_SYSTEM_PROMPT: &str = "You are Chris, a friendly and knowledgeable grocery shopping \
assistant. You help people pick the freshest produce, store food properly, and reduce food waste. \
Keep responses concise (under 150 words) and conversational — you're being read aloud via \
text-to-speech.";

const FRESHNESS_INSTRUCTION: &str = r#"You are a food freshness analyzer. Carefully examine this image.

CRITICAL RULES:
1. FIRST check if this image shows a BARCODE or PACKAGED/PROCESSED item (cans, boxes, bottles, bags with labels/barcodes)
2. If you see a BARCODE as the main subject or a PACKAGED item, respond: {"is_produce":false,"message":"This appears to be a packaged item with a barcode"}
3. If it's PERISHABLE food (fruits, vegetables, dairy, meat, bread, etc.), be extremely accurate with the item name
4. Be HARSH with freshness scoring - score on the 0-100 scale with strict standards:
   - 90-100: Perfect condition, just harvested/produced, no flaws
   - 75-89: Very good, minor imperfections, will last well
   - 55-74: Acceptable quality, some visible issues, use soon
   - 35-54: Poor quality, significant issues, use immediately
   - 0-34: Should not be consumed, spoiled
5. Calculate realistic shelf life in days based on current freshness
6. category must be exactly one of: fruit, vegetable, meat, seafood, dairy, grain, pantry, beverage, other

If this is a BARCODE or PACKAGED item, respond: {"is_produce":false,"message":"This appears to be a packaged item with a barcode"}
If this IS a perishable item, respond with ONLY this JSON (no markdown, no extra text):
{"is_produce":true,"item_name":"specific item name","category":"fruit","freshness_score":85,"freshness_description":"detailed freshness observations","estimated_days_remaining":5,"storage_tips":["specific storage advice","another tip"],"visual_indicators":["detailed observation 1","detailed observation 2"],"sustainable_alternative":{"name":"lower carbon alternative","reason":"why it saves carbon","carbon_savings_percent":40}}"#;

const PACKAGED_INSTRUCTION: &str = r#"You are a packaged food item analyzer. Carefully examine this image.

CRITICAL RULES:
1. First, check if this image contains a PACKAGED/PROCESSED item (canned goods, boxed items, bottles, bags, items with barcodes or product labels)
2. If this is NOT a packaged item (e.g., it's fresh produce, raw ingredients, or not food), respond with: {"is_packaged":false,"message":"This appears to be fresh produce or not a packaged item"}
3. If it IS a packaged item, extract the product name from packaging/label
4. Provide storage instructions based on packaging type
5. Suggest sustainable alternatives (less packaging, local options, etc.)
6. Provide nutrition information if visible on packaging
7. This is a PACKAGED item - it has NO freshness score and NO shelf life days (it's already preserved)

Respond with ONLY this JSON (no markdown, no extra text):
If NOT packaged: {"is_packaged":false,"message":"This appears to be fresh produce or not a packaged item"}
If IS packaged: {"is_packaged":true,"name":"specific product name","package_type":"can/bottle/box/bag/etc","storage_tip":"specific storage advice for this packaged item","nutrition_info":"brief nutrition summary if visible, or 'Check packaging for details'","sustainable_alternative":"lower carbon/less packaging alternative"}"#;

const LIVE_DETECTION_INSTRUCTION: &str = r#"You are a real-time grocery item detector. Find every distinct perishable food item visible in this image (at most 5 items).

For each item report a bounding box as [y_min, x_min, y_max, x_max] with every coordinate normalized to the 0-1000 range.
Score freshness on the 0-100 scale. category must be exactly one of: fruit, vegetable, meat, seafood, dairy, grain, pantry, beverage, other.

Respond with ONLY this JSON (no markdown, no extra text):
{"detections":[{"item_name":"specific item name","category":"fruit","freshness_score":85,"freshness_description":"short descriptor","estimated_days_remaining":5,"box_2d":[120,80,640,520]}]}
If no perishable food is visible, respond: {"detections":[]}"#;

fn recipes_instruction(ingredients: &[String]) -> String {
    format!(
        r#"Create simple, delicious recipes using these ingredients that are about to expire: {}.

Requirements:
- Keep each recipe simple and practical
- 30 minutes or less to prepare
- Include basic cooking instructions

Respond with ONLY a JSON array (no markdown, no extra text):
[{{"title":"Recipe name","description":"one sentence summary","ingredients":["ingredient 1","ingredient 2"],"steps":["step 1","step 2"],"carbon_savings":"estimated waste avoided","prep_time":"X minutes"}}]"#,
        ingredients.join(", ")
    )
}

fn shopping_instruction(items: &[String]) -> String {
    format!(
        r#"You are a produce freshness expert. For each item below, provide:
1. How to pick the freshest one (2-3 key tips)
2. What to avoid
3. Expected shelf life when stored properly

Items: {}

Respond in JSON format:
{{"items":[{{"name":"item name","tips":["tip1","tip2"],"avoid":"what to avoid","shelf_life":"X days"}}]}}"#,
        items.join(", ")
    )
}

fn chat_system_prompt(context: &ChatContext) -> String {
    let collection = if context.collection_names.is_empty() {
        "None yet"
    } else {
        &context.collection_names
    };
    let fridge = if context.fridge_items.is_empty() {
        "Empty"
    } else {
        &context.fridge_items
    };

    format!(
        r#"You are a helpful assistant for a produce freshness tracking app.

USER'S DATA:
- Collection (unique produce discovered): {}
- Fridge (current items): {}

Your role:
- Answer questions about their collection and fridge items
- Suggest recipes based on what they have
- Recommend new produce to try based on their collection
- Provide tips on produce selection, storage, and usage
- Be friendly, concise, and practical

Keep responses under 200 words unless asked for more detail."#,
        collection, fridge
    )
}

/// Voice/text chat input
#[derive(Debug, Clone, Default)]
pub struct VoiceChatInput {
    pub audio: Option<MediaPayload>,
    pub text: Option<String>,
    pub history: Vec<ChatMessage>,
    pub wake_word: Option<String>,
}

/// User data woven into the text assistant's system prompt
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub collection_names: String,
    pub fridge_items: String,
}

/// One provider plus its circuit breaker
pub struct ProviderSlot {
    pub provider: Arc<dyn Provider>,
    pub breaker: CircuitBreaker,
}

/// Task orchestrator over an ordered provider fallback chain
pub struct AnalysisService {
    chain: Vec<ProviderSlot>,
}

impl AnalysisService {
    /// Build the service; chain order is fallback order
    pub fn new(providers: Vec<Arc<dyn Provider>>, clock: Arc<dyn Clock>) -> Self {
        let chain = providers
            .into_iter()
            .map(|provider| ProviderSlot {
                provider,
                breaker: CircuitBreaker::new(clock.clone()),
            })
            .collect();
        Self { chain }
    }

    /// Provider names in fallback order, for health reporting
    pub fn provider_names(&self) -> Vec<String> {
        self.chain
            .iter()
            .map(|slot| slot.provider.name().to_string())
            .collect()
    }

    /// Walk the chain once: call each available provider in order and parse
    /// its output. Rate limits open that provider's breaker; transient and
    /// extraction failures simply move to the next provider. No provider is
    /// attempted twice within one request.
    async fn run_chain<T>(
        &self,
        request: &GenerationRequest,
        parse: impl Fn(&str) -> Result<T, ExtractError>,
    ) -> AppResult<T> {
        let mut saw_non_rate_limit = false;

        for slot in &self.chain {
            let name = slot.provider.name();

            if slot.breaker.should_skip() {
                debug!("Skipping {} (circuit breaker open)", name);
                continue;
            }

            match slot.provider.generate(request).await {
                Ok(raw) => {
                    debug!("{} responded with {} chars", name, raw.len());
                    match parse(&raw) {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            saw_non_rate_limit = true;
                            warn!(
                                "Extraction failed for {} output: {} - raw: {}",
                                name,
                                err,
                                truncate_content(&raw, 200)
                            );
                        }
                    }
                }
                Err(err) if err.is_rate_limit() => {
                    slot.breaker.record_rate_limit();
                    warn!("{} rate limited, cooling down", name);
                }
                Err(err) => {
                    saw_non_rate_limit = true;
                    warn!("{} call failed: {}", name, err);
                }
            }
        }

        if saw_non_rate_limit {
            Err(AppError::AnalysisFailed(
                "every provider in the chain failed".to_string(),
            ))
        } else {
            Err(AppError::RateLimit)
        }
    }

    /// Run the chain for a free-text task; the raw trimmed text is the result
    async fn generate_text(&self, request: &GenerationRequest) -> AppResult<String> {
        self.run_chain(request, |raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ExtractError::NoJson {
                    preview: String::new(),
                })
            } else {
                Ok(trimmed.to_string())
            }
        })
        .await
    }

    /// Validate and normalize an image payload
    fn validate_image(&self, image: &str) -> AppResult<(String, String)> {
        if image.len() > MAX_MEDIA_BASE64_BYTES {
            return Err(AppError::PayloadTooLarge);
        }
        if image.trim().is_empty() || image.len() < MIN_IMAGE_CHARS {
            return Err(AppError::Validation("Invalid or missing image data".to_string()));
        }
        Ok(normalize_image(image))
    }

    /// Analyze a produce image for freshness.
    ///
    /// A "not produce" verdict from the model is a valid classification
    /// outcome, returned as data so the caller can re-dispatch the image to
    /// the packaged-item task.
    pub async fn analyze_freshness(&self, image: &str) -> AppResult<FreshnessOutcome> {
        let (mime_type, data) = self.validate_image(image)?;
        debug!("Freshness analysis requested ({}, {} chars)", mime_type, data.len());

        let request = GenerationRequest::with_media(
            FRESHNESS_INSTRUCTION,
            MediaPayload { mime_type, data },
            400,
            0.1,
        );

        self.run_chain(&request, |raw| {
            let value = extract_json(raw)?;

            if value.get("is_produce").and_then(|v| v.as_bool()) == Some(false) {
                let message = value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("This doesn't appear to be fresh produce")
                    .to_string();
                return Ok(FreshnessOutcome::NotProduce { message });
            }

            let analysis: ItemAnalysis =
                serde_json::from_value(value).map_err(|source| ExtractError::Schema { source })?;
            Ok(FreshnessOutcome::Analysis(Box::new(analysis)))
        })
        .await
    }

    /// Analyze a packaged-item image
    pub async fn analyze_packaged(&self, image: &str) -> AppResult<PackagedOutcome> {
        let (mime_type, data) = self.validate_image(image)?;
        debug!("Packaged-item analysis requested ({}, {} chars)", mime_type, data.len());

        let request = GenerationRequest::with_media(
            PACKAGED_INSTRUCTION,
            MediaPayload { mime_type, data },
            300,
            0.1,
        );

        self.run_chain(&request, |raw| {
            let value = extract_json(raw)?;

            if value.get("is_packaged").and_then(|v| v.as_bool()) == Some(false) {
                let message = value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("This appears to be fresh produce or not a packaged item")
                    .to_string();
                return Ok(PackagedOutcome::NotPackaged { message });
            }

            let item: PackagedItem =
                serde_json::from_value(value).map_err(|source| ExtractError::Schema { source })?;
            Ok(PackagedOutcome::Packaged(Box::new(item)))
        })
        .await
    }

    /// Live multi-item detection with bounding boxes; at most 5 detections
    pub async fn detect_items(&self, image: &str) -> AppResult<LiveScanResult> {
        let (mime_type, data) = self.validate_image(image)?;
        debug!("Live detection requested ({}, {} chars)", mime_type, data.len());

        let request = GenerationRequest::with_media(
            LIVE_DETECTION_INSTRUCTION,
            MediaPayload { mime_type, data },
            512,
            0.1,
        );

        let mut result: LiveScanResult = self.run_chain(&request, extract_typed).await?;

        result.detections.truncate(MAX_DETECTIONS);
        Ok(result)
    }

    /// Generate recipes from a list of expiring ingredients
    pub async fn generate_recipes(&self, ingredients: &[String]) -> AppResult<Vec<RecipeSuggestion>> {
        if ingredients.is_empty() {
            return Err(AppError::Validation(
                "Please provide an array of ingredients".to_string(),
            ));
        }

        let limited: Vec<String> = ingredients.iter().take(MAX_INGREDIENTS).cloned().collect();
        let request = GenerationRequest::text(recipes_instruction(&limited), 2048, 0.7);

        self.run_chain(&request, extract_typed).await
    }

    /// Transcribe audio through the primary provider.
    ///
    /// The fallback aggregator has no audio input path, so transcription is
    /// primary-only; the caller decides whether a supplied text input can
    /// stand in when this fails.
    async fn transcribe(&self, audio: &MediaPayload) -> AppResult<String> {
        let slot = self
            .chain
            .first()
            .ok_or_else(|| AppError::Internal("no providers configured".to_string()))?;

        if slot.breaker.should_skip() {
            debug!("Skipping transcription ({} breaker open)", slot.provider.name());
            return Err(AppError::RateLimit);
        }

        let request = GenerationRequest::with_media(TRANSCRIBE_INSTRUCTION, audio.clone(), 300, 0.0);

        match slot.provider.generate(&request).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(err) if err.is_rate_limit() => {
                slot.breaker.record_rate_limit();
                Err(AppError::RateLimit)
            }
            Err(err) => Err(AppError::AnalysisFailed(format!("transcription failed: {}", err))),
        }
    }

    /// One conversational voice/text assistant turn.
    ///
    /// When a wake word is configured and the transcript does not contain
    /// it, the turn ends with an empty response; that is a valid outcome.
    pub async fn voice_chat(&self, input: VoiceChatInput) -> AppResult<ChatTurn> {
        if input.audio.is_none() && input.text.is_none() {
            return Err(AppError::Validation(
                "Please provide audio or text input".to_string(),
            ));
        }
        if let Some(audio) = &input.audio {
            if audio.data.len() > MAX_MEDIA_BASE64_BYTES {
                return Err(AppError::PayloadTooLarge);
            }
            if audio.data.is_empty() {
                return Err(AppError::Validation("Audio payload is empty".to_string()));
            }
        }
        if let Some(text) = &input.text {
            if text.len() > MAX_TEXT_LEN {
                return Err(AppError::Validation(format!(
                    "Text input must be under {} characters",
                    MAX_TEXT_LEN
                )));
            }
        }
        if input.history.len() > MAX_HISTORY_LEN {
            return Err(AppError::Validation(
                "Conversation history too long".to_string(),
            ));
        }

        let transcript = match (&input.audio, &input.text) {
            (Some(audio), text) => match self.transcribe(audio).await {
                Ok(transcript) => transcript,
                // Text-only fallback when transcription is unavailable
                Err(err) => match text {
                    Some(text) => text.clone(),
                    None => return Err(err),
                },
            },
            (None, Some(text)) => text.clone(),
            (None, None) => unreachable!("validated above"),
        };

        if transcript.is_empty() {
            return Ok(ChatTurn {
                transcript: String::new(),
                response: "I didn't catch that. Could you try again?".to_string(),
                wake_word_detected: Some(false),
            });
        }

        if let Some(wake_word) = &input.wake_word {
            if !transcript.to_lowercase().contains(&wake_word.to_lowercase()) {
                debug!("Wake word not detected in transcript");
                return Ok(ChatTurn {
                    transcript,
                    response: String::new(),
                    wake_word_detected: Some(false),
                });
            }
        }

        let mut request = GenerationRequest::text(transcript.clone(), 500, 0.7);
        request.system = Some(VOICE_SYSTEM_PROMPT.to_string());
        let skip = input.history.len().saturating_sub(HISTORY_WINDOW);
        request.history = input.history[skip..].to_vec();

        let response = self.generate_text(&request).await?;

        Ok(ChatTurn {
            transcript,
            response,
            wake_word_detected: input.wake_word.as_ref().map(|_| true),
        })
    }

    /// One text assistant turn with the user's collection/fridge context
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        context: &ChatContext,
    ) -> AppResult<String> {
        if message.is_empty() || message.len() > MAX_TEXT_LEN {
            return Err(AppError::Validation(format!(
                "Message must be a non-empty string under {} characters",
                MAX_TEXT_LEN
            )));
        }
        if history.len() > MAX_HISTORY_LEN {
            return Err(AppError::Validation(
                "Invalid or oversized conversation history".to_string(),
            ));
        }

        let mut request = GenerationRequest::text(message, 500, 0.7);
        request.system = Some(chat_system_prompt(context));
        request.history = history.to_vec();

        self.generate_text(&request).await
    }

    /// Batch produce picking tips.
    ///
    /// Degrades to a generic tips list when the whole chain fails; shoppers
    /// standing in a store aisle get an answer either way.
    pub async fn shopping_guidance(&self, items: &[String]) -> AppResult<ShoppingGuidance> {
        if items.is_empty() {
            return Err(AppError::Validation(
                "Please provide an array of items".to_string(),
            ));
        }
        if !items.iter().all(|item| !item.is_empty() && item.len() < 200) {
            return Err(AppError::Validation(
                "Each item must be a non-empty string under 200 characters".to_string(),
            ));
        }

        let limited: Vec<String> = items.iter().take(MAX_SHOPPING_ITEMS).cloned().collect();
        let request = GenerationRequest::text(shopping_instruction(&limited), 512, 0.7);

        let outcome: AppResult<ShoppingGuidance> = self.run_chain(&request, extract_typed).await;

        match outcome {
            Ok(guidance) => Ok(guidance),
            Err(AppError::Validation(msg)) => Err(AppError::Validation(msg)),
            Err(err) => {
                warn!("Shopping guidance degraded to defaults: {}", err);
                Ok(default_guidance(&limited))
            }
        }
    }
}

/// Generic picking tips used when no provider can answer
pub fn default_guidance(items: &[String]) -> ShoppingGuidance {
    ShoppingGuidance {
        items: items
            .iter()
            .map(|name| ShoppingTip {
                name: name.clone(),
                tips: vec!["Check for firmness and color".to_string()],
                avoid: "Bruises or soft spots".to_string(),
                shelf_life: "3-7 days".to_string(),
            })
            .collect(),
    }
}
