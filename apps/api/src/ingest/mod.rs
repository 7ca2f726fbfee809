// Resume ingestion: PDF text extraction, text cleanup and section detection, tolerant JSON
// decoding, and structuring of resume text into a CV record.
// LLM calls go through llm_client.

pub mod handlers;
pub mod json;
pub mod pdf;
pub mod prompts;
pub mod structurer;
pub mod text;
