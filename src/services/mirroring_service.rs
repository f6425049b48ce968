//! Empathetic paraphrase ("predicate mirroring") of the participant's answer.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::models::script;
use crate::domain::models::{LlmConfig, Tone};
use crate::domain::ports::{GenerationRequest, TextGenerator};

const KEYWORD_PROMPT: &str = "다음 문장에서 중요한 핵심 단어(명사, 형용사, 동사 위주) 2~3개만 뽑아줘. \
쉼표로 구분하고, 다른 설명은 하지 마.";

/// Sampling parameters for the two generation calls.
#[derive(Debug, Clone, Copy)]
pub struct MirroringParams {
    pub keyword_temperature: f32,
    pub keyword_max_tokens: u32,
    pub mirror_temperature: f32,
    pub mirror_max_tokens: u32,
}

impl Default for MirroringParams {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for MirroringParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            keyword_temperature: config.keyword_temperature,
            keyword_max_tokens: config.keyword_max_tokens,
            mirror_temperature: config.mirror_temperature,
            mirror_max_tokens: config.mirror_max_tokens,
        }
    }
}

/// Builds mirrored replies. Generation failures never escape: they are
/// logged and replaced with a neutral acknowledgement.
pub struct MirroringService {
    generator: Arc<dyn TextGenerator>,
    params: MirroringParams,
}

impl MirroringService {
    pub fn new(generator: Arc<dyn TextGenerator>, params: MirroringParams) -> Self {
        Self { generator, params }
    }

    /// Two or three core words from the utterance. Empty on failure.
    #[instrument(skip(self, utterance), fields(generator = self.generator.name()))]
    pub async fn extract_keywords(&self, utterance: &str) -> Vec<String> {
        let request = GenerationRequest::new(KEYWORD_PROMPT, utterance)
            .with_temperature(self.params.keyword_temperature)
            .with_max_tokens(self.params.keyword_max_tokens);

        match self.generator.generate(&request).await {
            Ok(text) => {
                let keywords = split_keywords(&text);
                debug!(count = keywords.len(), "Extracted keywords");
                keywords
            }
            Err(e) => {
                warn!(error = %e, "Keyword extraction failed");
                Vec::new()
            }
        }
    }

    /// Mirrored sentence, connective and the next question in one reply.
    #[instrument(skip(self, utterance, keywords, question), fields(tone = tone.as_str()))]
    pub async fn mirror(&self, utterance: &str, tone: Tone, keywords: &[String], question: &str) -> String {
        let request = GenerationRequest::new(role_prompt(tone, keywords), utterance)
            .with_temperature(self.params.mirror_temperature)
            .with_max_tokens(self.params.mirror_max_tokens);

        let base = match self.generator.generate(&request).await {
            Ok(sentence) if script::is_consistent_tone(&sentence, tone) => sentence,
            Ok(sentence) => {
                warn!(sentence = %sentence, "Mirrored sentence broke the speech level, using fallback");
                fallback_sentence(tone)
            }
            Err(e) => {
                warn!(error = %e, "Mirroring generation failed, using fallback");
                fallback_sentence(tone)
            }
        };

        compose(&base, tone, question)
    }
}

/// `base + connective + question`.
pub fn compose(base: &str, tone: Tone, question: &str) -> String {
    format!("{}{}{}", base, script::connective(tone), question)
}

pub fn fallback_sentence(tone: Tone) -> String {
    format!("{}.", script::fallback_acknowledgement(tone))
}

fn split_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn role_prompt(tone: Tone, keywords: &[String]) -> String {
    let (persona, required, forbidden, endings) = match tone {
        Tone::Formal => (
            "정중한 상담자 (존댓말 사용)",
            "존댓말",
            "반말",
            "존댓말: ~군요 / ~네요, ~셨군요 / ~하셨네요, ~하시네요 / ~하셨네요, ~하신 건가요? / ~였나요?",
        ),
        Tone::Informal => (
            "친절한 친구 (반말 사용)",
            "반말",
            "존댓말",
            "반말: ~구나, ~았구나 / ~었구나, ~하네 / ~했네, ~였어? / ~한 거야?",
        ),
    };

    format!(
        "당신은 사용자와 대화를 이어가는 {persona}입니다.\n\
         사용자가 한 말에 담긴 핵심 단어를 포함하여 자연스럽게 문장을 변형하여 응답하고, \
         사용자의 감정에 공감하는 어미를 사용해야 합니다.\n\
         단, 다음 조건을 반드시 지켜야 합니다:\n\
         - 반드시 {required}만 사용하고, {forbidden}은 절대 사용하지 마세요.\n\
         - 사용할 수 있는 어미는 다음과 같습니다:\n\
         {endings}\n\
         - 응답은 핵심 의미를 자연스럽게 변형한 1문장으로 작성하고, 감정 공감을 표현하는 어미로 끝나야 합니다.\n\
         - 절대로 질문하지 마세요.\n\
         - 문장에는 다음 키워드 중 하나 이상을 반드시 포함해야 합니다: {}",
        keywords.join(", ")
    )
}
