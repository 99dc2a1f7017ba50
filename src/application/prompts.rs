//! Prompt builders for the generation service.
//!
//! Wording lives here and nowhere else. Profilers and the planner decide
//! *what* to ask; these functions decide how it reads.

use crate::domain::conversation::{ReplyPolicy, Window};
use crate::domain::foundation::SessionId;
use crate::domain::profile::{Profile, Stance};
use crate::domain::survey::{StanceBand, SurveyAnswers};
use crate::domain::topic::TopicContext;
use crate::ports::Prompt;

const PROFILER_SYSTEM: &str =
    "You are a careful conversation analyst. You answer with a single JSON object and nothing else.";

const PERSUADER_SYSTEM: &str = "You are a thoughtful, honest conversation partner discussing a \
     topic with someone who may disagree. You are respectful, you never invent facts, and you \
     never pressure, shame or manipulate.";

/// Fields every profile classification must return.
const PROFILE_SCHEMA: &str = r#"{
  "stance": "pro" | "anti" | "mixed" | "unknown",
  "confidence": number between 0.0 and 1.0,
  "style": short label for their communication register,
  "emotional_state": short label,
  "change_readiness": integer 0 to 10 (how open they seem to reconsidering),
  "key_values": list of short phrases naming what they care about,
  "guidance": {"effective": list of short moves likely to land, "avoid": list of moves to avoid}
}"#;

/// Elaborates a survey-derived stance into a full profile.
pub fn survey_profile(
    session_id: SessionId,
    topic: &TopicContext,
    answers: &SurveyAnswers,
    average: f64,
    band: StanceBand,
) -> Prompt {
    let ratings = if answers.is_empty() {
        "(no answers)".to_string()
    } else {
        answers
            .iter()
            .map(|(question, rating)| format!("- {}: {}", question, rating.value()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let user = format!(
        "Build an initial profile of a person from their pre-conversation survey.\n\n\
         Topic: {topic}\n\n\
         Survey answers (0 = strongly disagree, 10 = strongly agree):\n{ratings}\n\n\
         Average score: {average:.1} / 10\n\
         Derived stance: {stance} ({wording})\n\n\
         Keep the derived stance. Estimate confidence from how consistent the answers are.\n\
         Return JSON with exactly these fields:\n{schema}",
        topic = topic.prompt_description(),
        ratings = ratings,
        average = average,
        stance = band.stance().label(),
        wording = band.wording(),
        schema = PROFILE_SCHEMA,
    );

    Prompt::new(PROFILER_SYSTEM, user).for_session(session_id)
}

/// Re-profiles the counterpart from their latest message.
pub fn message_profile(
    session_id: SessionId,
    topic: &TopicContext,
    window: &Window<'_>,
    latest: &str,
) -> Prompt {
    let user = format!(
        "Analyse the person's latest message in the context of the conversation so far and \
         describe them.\n\n\
         Topic: {topic}\n\n\
         Conversation:\n{transcript}\n\n\
         Latest message from the person: \"{latest}\"\n\n\
         Stance is relative to the topic. Return JSON with exactly these fields:\n{schema}",
        topic = topic.prompt_description(),
        transcript = transcript_or_placeholder(window),
        latest = latest.trim(),
        schema = PROFILE_SCHEMA,
    );

    Prompt::new(PROFILER_SYSTEM, user).for_session(session_id)
}

/// The first utterance, before the person has said anything.
pub fn opening(
    session_id: SessionId,
    topic: &TopicContext,
    profile: &Profile,
    survey_average: f64,
    policy: &ReplyPolicy,
) -> Prompt {
    let user = format!(
        "Start a conversation about: {topic}\n\n\
         What we know about the person: {summary}\n\
         Their survey average was {average:.1} out of 10, which reads as {leaning}.\n\n\
         {instructions}\n\n\
         Acknowledge where they seem to stand in your own words. Do not mention any numbers, \
         percentages, studies, statistics or experts.\n\
         Write the opening message only.",
        topic = topic.prompt_description(),
        summary = profile.summary(),
        average = survey_average,
        leaning = profile.stance().description(),
        instructions = policy.render_instructions(),
    );

    Prompt::new(PERSUADER_SYSTEM, user).for_session(session_id)
}

/// A reply to the person's latest message under `policy`.
pub fn reply(
    session_id: SessionId,
    topic: &TopicContext,
    profile: &Profile,
    target: Stance,
    policy: &ReplyPolicy,
    window: &Window<'_>,
    latest: &str,
) -> Prompt {
    let mut guidance = String::new();
    if !profile.guidance().effective.is_empty() {
        guidance.push_str(&format!(
            "What tends to work with them: {}\n",
            profile.guidance().effective.join("; ")
        ));
    }
    if !profile.guidance().avoid.is_empty() {
        guidance.push_str(&format!(
            "What to avoid with them: {}\n",
            profile.guidance().avoid.join("; ")
        ));
    }

    let user = format!(
        "Topic: {topic}\n\n\
         What we know about the person: {summary}\n\
         {guidance}\
         The conversation aims to help them consider the {target} side.\n\n\
         Conversation:\n{transcript}\n\n\
         Their latest message: \"{latest}\"\n\n\
         {instructions}\n\n\
         Write your reply only.",
        topic = topic.prompt_description(),
        summary = profile.summary(),
        guidance = guidance,
        target = target.label(),
        transcript = transcript_or_placeholder(window),
        latest = latest.trim(),
        instructions = policy.render_instructions(),
    );

    Prompt::new(PERSUADER_SYSTEM, user).for_session(session_id)
}

fn transcript_or_placeholder(window: &Window<'_>) -> String {
    if window.messages.is_empty() {
        "(no messages yet)".to_string()
    } else {
        window.transcript()
    }
}
