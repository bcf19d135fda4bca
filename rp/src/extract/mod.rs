//! Narrative Extraction Parser
//!
//! Best-effort reconstruction of plan fields from an unstructured narrative
//! report. The parser is a pure function and never fails: each field
//! independently degrades to an empty value on malformed input. Its output is
//! a display-only approximation and is never written back into the canonical
//! plan owned by the session.

mod report;

pub use report::{extract_report, ExtractedReport, KpiRow};
