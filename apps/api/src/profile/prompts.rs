// Profile Synthesizer LLM prompt templates.
// All prompts for the profile module are defined here.

pub const NARRATIVE_SYSTEM: &str = "\
You are a professional biographer writing objective profile summaries for a networking event. \
Write in the third person with a neutral, factual tone. \
Never use subjective or promotional adjectives (e.g. 'passionate', 'exceptional', 'visionary'). \
Respond with plain prose only: no headings, no lists, no markdown.";

pub const NARRATIVE_PROMPT: &str = r#"Write a profile summary of this person from the inputs below.

LINKEDIN DATA (JSON, may contain an "error" field if it could not be retrieved):
{linkedin}

RESUME TEXT (may be empty):
{resume}

STATED INTERESTS:
{interests}

RULES:
1. Exactly one paragraph of 350 to 500 words.
2. Order the career chronologically, earliest first.
3. Mention every concrete role, organization, and date range found in the inputs.
4. Close with the stated interests.
5. {grounding}"#;

pub const STRUCTURED_SYSTEM: &str = "\
You are a precise profile data extractor. \
Turn LinkedIn data and resume text into a compact structured profile. \
Include work experience only: never list education, projects, or volunteering as jobs.";

pub const STRUCTURED_PROMPT: &str = r#"Build a structured profile of this person from the inputs below.

LINKEDIN DATA (JSON, may contain an "error" field if it could not be retrieved):
{linkedin}

RESUME TEXT (may be empty):
{resume}

STATED INTERESTS:
{interests}

OUTPUT SCHEMA (return exactly this structure):
{
  "short_description": "2-3 word professional tag, e.g. 'Fintech Founder'",
  "bullet_points": ["string", "string", "string"],
  "summary": "about 40 words",
  "jobs": [
    {
      "title": "string",
      "company": "string",
      "start_date": "string",
      "end_date": "string, or \"Present\" if ongoing",
      "description": "string"
    }
  ]
}

RULES:
1. bullet_points must contain exactly 3 entries.
2. jobs lists work experience only, most recent first.
3. {grounding}
4. {json_only}"#;
