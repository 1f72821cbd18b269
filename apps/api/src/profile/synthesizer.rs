//! Profile Synthesizer — two independent LLM calls over the same inputs.
//!
//! Flow: render inputs → (narrative ‖ structured) joined → per-call results.
//!
//! The calls share nothing but their inputs, so each result is reported on its
//! own: a structured parse failure leaves a successful narrative intact.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{GenerationStage, PipelineError};
use crate::linkedin::LinkedInData;
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{strip_json_fences, LanguageModel};
use crate::models::user::JobRecord;
use crate::profile::prompts::{
    NARRATIVE_PROMPT, NARRATIVE_SYSTEM, STRUCTURED_PROMPT, STRUCTURED_SYSTEM,
};
use crate::text::truncate_chars;

/// Longest resume prefix embedded in a prompt.
pub const MAX_RESUME_PROMPT_CHARS: usize = 12_000;

const NARRATIVE_TEMPERATURE: f32 = 0.3;
const NARRATIVE_MAX_TOKENS: u32 = 1200;
const STRUCTURED_TEMPERATURE: f32 = 0.2;
const STRUCTURED_MAX_TOKENS: u32 = 1500;
const REQUIRED_BULLET_POINTS: usize = 3;

/// Everything the synthesizer reads.
#[derive(Debug, Clone)]
pub struct ProfileInputs<'a> {
    pub linkedin: &'a LinkedInData,
    pub resume_text: Option<&'a str>,
    pub interests: &'a [String],
}

/// Validated output of the structured call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredProfile {
    pub short_description: String,
    pub bullet_points: Vec<String>,
    pub summary: String,
    pub jobs: Vec<JobRecord>,
}

/// Tagged result of parsing the structured call's raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredParse {
    Ok(StructuredProfile),
    ParseError { reason: String, raw_text: String },
}

impl StructuredParse {
    pub fn into_result(self) -> Result<StructuredProfile, PipelineError> {
        match self {
            StructuredParse::Ok(profile) => Ok(profile),
            StructuredParse::ParseError { reason, raw_text } => {
                Err(PipelineError::StructuredParseFailed { reason, raw_text })
            }
        }
    }
}

/// Both call results, reported independently.
#[derive(Debug)]
pub struct Synthesis {
    pub narrative: Result<String, PipelineError>,
    pub structured: Result<StructuredProfile, PipelineError>,
}

#[derive(Debug, Deserialize)]
struct RawStructuredProfile {
    short_description: String,
    bullet_points: Vec<String>,
    #[serde(default)]
    summary: String,
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawJob> for JobRecord {
    fn from(raw: RawJob) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let end_date = clean(raw.end_date);
        Self {
            title: clean(raw.title),
            company: clean(raw.company),
            start_date: clean(raw.start_date),
            end_date: if end_date.is_empty() {
                "Present".to_string()
            } else {
                end_date
            },
            description: clean(raw.description),
        }
    }
}

/// Issues the narrative and structured calls concurrently and awaits both.
pub async fn synthesize_profile(llm: &dyn LanguageModel, inputs: &ProfileInputs<'_>) -> Synthesis {
    let narrative_prompt = render_prompt(NARRATIVE_PROMPT, inputs);
    let structured_prompt = render_prompt(STRUCTURED_PROMPT, inputs);

    let (narrative, structured) = tokio::join!(
        generate_narrative(llm, &narrative_prompt),
        generate_structured(llm, &structured_prompt),
    );

    match (&narrative, &structured) {
        (Ok(n), Ok(s)) => info!(
            "Profile synthesized: narrative {} words, {} jobs",
            n.split_whitespace().count(),
            s.jobs.len()
        ),
        _ => warn!(
            "Profile synthesis incomplete: narrative_ok={}, structured_ok={}",
            narrative.is_ok(),
            structured.is_ok()
        ),
    }

    Synthesis {
        narrative,
        structured,
    }
}

async fn generate_narrative(llm: &dyn LanguageModel, prompt: &str) -> Result<String, PipelineError> {
    let text = llm
        .complete(
            NARRATIVE_SYSTEM,
            prompt,
            NARRATIVE_TEMPERATURE,
            NARRATIVE_MAX_TOKENS,
        )
        .await
        .map_err(|e| PipelineError::GenerationFailed {
            stage: GenerationStage::Narrative,
            message: e.to_string(),
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::GenerationFailed {
            stage: GenerationStage::Narrative,
            message: "model returned an empty summary".to_string(),
        });
    }
    Ok(text.to_string())
}

async fn generate_structured(
    llm: &dyn LanguageModel,
    prompt: &str,
) -> Result<StructuredProfile, PipelineError> {
    let raw = llm
        .complete(
            STRUCTURED_SYSTEM,
            prompt,
            STRUCTURED_TEMPERATURE,
            STRUCTURED_MAX_TOKENS,
        )
        .await
        .map_err(|e| PipelineError::GenerationFailed {
            stage: GenerationStage::Structured,
            message: e.to_string(),
        })?;

    parse_structured(&raw).into_result()
}

/// Strips code fences, parses, and validates the structured profile.
pub fn parse_structured(raw: &str) -> StructuredParse {
    let fail = |reason: String| StructuredParse::ParseError {
        reason,
        raw_text: raw.to_string(),
    };

    let parsed: RawStructuredProfile = match serde_json::from_str(strip_json_fences(raw)) {
        Ok(p) => p,
        Err(e) => return fail(format!("invalid JSON: {e}")),
    };

    let short_description = parsed.short_description.trim().to_string();
    if short_description.is_empty() {
        return fail("short_description is empty".to_string());
    }

    let bullet_points: Vec<String> = parsed
        .bullet_points
        .iter()
        .map(|b| b.trim().to_string())
        .collect();
    if bullet_points.len() != REQUIRED_BULLET_POINTS || bullet_points.iter().any(String::is_empty)
    {
        return fail(format!(
            "expected {REQUIRED_BULLET_POINTS} non-empty bullet_points, got {:?}",
            bullet_points
        ));
    }

    StructuredParse::Ok(StructuredProfile {
        short_description,
        bullet_points,
        summary: parsed.summary.trim().to_string(),
        jobs: parsed.jobs.into_iter().map(JobRecord::from).collect(),
    })
}

fn render_prompt(template: &str, inputs: &ProfileInputs<'_>) -> String {
    let linkedin = serde_json::to_string_pretty(&inputs.linkedin.prompt_value())
        .unwrap_or_else(|_| "{}".to_string());
    let resume = inputs
        .resume_text
        .map(|t| truncate_chars(t, MAX_RESUME_PROMPT_CHARS))
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("(no resume provided)");
    let interests = inputs.interests.join(", ");

    let template = template
        .replace("{grounding}", GROUNDING_INSTRUCTION)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);

    fill_slots(
        &template,
        &[
            ("{linkedin}", linkedin.as_str()),
            ("{resume}", resume),
            ("{interests}", interests.as_str()),
        ],
    )
}

/// Single left-to-right pass: inserted values are never rescanned for placeholders.
fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = slots
            .iter()
            .filter_map(|(placeholder, value)| {
                rest.find(*placeholder).map(|idx| (idx, *placeholder, *value))
            })
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, placeholder, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + placeholder.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
