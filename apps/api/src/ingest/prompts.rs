// Ingestion LLM prompt templates.
// Placeholders in braces are substituted with `str::replace` before the call.

/// Resume text handed to the structuring prompt: the cleaned text and the sections detected in it.
pub const PARSE_REQUEST_TEMPLATE: &str = "\
RESUME PARSING REQUEST
============================================================

RAW RESUME TEXT:
{cleaned_text}

------------------------------
DETECTED SECTIONS:
{detected_sections}
------------------------------
";

pub const CV_PARSE_SYSTEM: &str = "\
You are a professional resume parser. \
Extract resume information into the requested JSON structure. \
Copy wording from the resume verbatim; never invent employers, dates, degrees or metrics. \
Leave a field null or an array empty when the resume does not state it.";

pub const CV_PARSE_PROMPT: &str = r#"Parse the following resume into a JSON object.

{resume_request}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "string",
  "email": "string" | null,
  "phone": "string" | null,
  "website": "string" | null,
  "linkedin": "full profile URL" | null,
  "github": "full profile URL" | null,
  "summary": ["paragraph"],
  "experience": [
    {
      "company": "string",
      "position": "string",
      "location": "string" | null,
      "start_date": "YYYY-MM" | null,
      "end_date": "YYYY-MM" | "present" | null,
      "highlights": ["string"]
    }
  ],
  "education": [
    {
      "institution": "string",
      "degree": "string" | null,
      "area": "string" | null,
      "location": "string" | null,
      "start_date": "YYYY-MM" | null,
      "end_date": "YYYY-MM" | null,
      "gpa": "string" | null,
      "highlights": ["string"]
    }
  ],
  "skills": { "Category label": ["technology", "technology"] },
  "projects": [
    { "name": "string", "date": "string" | null, "highlights": ["string"] }
  ],
  "certifications": ["string"]
}

Keep entries in the order they appear in the resume. Use "present" as end_date for current roles."#;

pub const ENHANCE_SYSTEM: &str = "\
You are a professional resume enhancement expert. \
Rewrite the section you are given and return only the rewritten section text, \
with no preamble, no commentary and no markdown fences. \
Keep every fact unchanged; do not add employers, dates or numbers that are not in the input.";

pub const ENHANCE_PROMPT: &str = "\
Section name: {section_name}

Section content:
{content}

Instructions: {instructions}";

/// Used when a caller sends no instructions of its own.
pub const DEFAULT_ENHANCE_INSTRUCTIONS: &str = "\
Make this more professional, impactful, and compelling. \
Use action verbs, quantify achievements where possible, and ensure clarity.";
