pub mod export;
pub mod submission;

pub use export::{
    render_csv, render_docx, sort_for_export, story_paragraphs, ExportError, CSV_FILENAME,
    DOCX_CONTENT_TYPE, DOCX_FILENAME,
};
pub use submission::{
    build_submission, new_submission_id, validate_submission, SubmitRequest, Submission,
    MAX_STORY_WORDS,
};
