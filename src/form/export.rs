use chrono::{DateTime, Utc};
use docx_rs::{
    AlignmentType, BreakType, Docx, LineSpacing, PageMargin, Paragraph, Run, RunFonts,
};
use thiserror::Error;

use crate::form::Submission;

/// Content type of the generated Word document.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Fixed attachment filename for the Word export.
pub const DOCX_FILENAME: &str = "Griva_Reads_Unchosen_Path_Submissions.docx";
/// Fixed attachment filename for the spreadsheet export.
pub const CSV_FILENAME: &str = "Griva_Reads_Unchosen_Path_Submissions.csv";

const BODY_FONT: &str = "Georgia";
const LABEL_FONT: &str = "Arial";

// A4 in twentieths of a point, with one-inch margins.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
const PAGE_MARGIN: i32 = 1440;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to assemble document: {0}")]
    Pack(String),
    #[error("failed to write spreadsheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write spreadsheet: {0}")]
    Io(#[from] std::io::Error),
}

/// Returns the collection sorted ascending by submission time. The sort is
/// stable, so same-instant entries keep their stored order.
pub fn sort_for_export(mut submissions: Vec<Submission>) -> Vec<Submission> {
    submissions.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
    submissions
}

/// Splits a story into display paragraphs on newline boundaries, dropping
/// fragments that are empty after trimming.
pub fn story_paragraphs(story: &str) -> Vec<String> {
    story
        .split('\n')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders the full collection into a Word document and returns the packed
/// bytes. Oldest submission first; an empty collection renders a single
/// placeholder paragraph.
pub fn render_docx(
    submissions: &[Submission],
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new().page_size(PAGE_WIDTH, PAGE_HEIGHT).page_margin(
        PageMargin::new()
            .top(PAGE_MARGIN)
            .bottom(PAGE_MARGIN)
            .left(PAGE_MARGIN)
            .right(PAGE_MARGIN),
    );

    for paragraph in document_paragraphs(submissions, generated_at) {
        docx = docx.add_paragraph(paragraph);
    }

    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Pack(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Renders the collection as a flat spreadsheet, oldest submission first.
pub fn render_csv(submissions: &[Submission]) -> Result<Vec<u8>, ExportError> {
    let sorted = sort_for_export(submissions.to_vec());
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(["id", "fullName", "formClass", "wordCount", "submittedAt", "story"])?;
    for submission in &sorted {
        let word_count = submission.word_count.to_string();
        let submitted_at = submission.submitted_at.to_rfc3339();
        writer.write_record([
            submission.id.as_str(),
            submission.full_name.as_str(),
            submission.form_class.as_str(),
            word_count.as_str(),
            submitted_at.as_str(),
            submission.story.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Builds the complete paragraph sequence: title block, then one section
/// per submission in ascending submission-time order, or the placeholder
/// when the collection is empty.
fn document_paragraphs(submissions: &[Submission], generated_at: DateTime<Utc>) -> Vec<Paragraph> {
    let sorted = sort_for_export(submissions.to_vec());
    let mut paragraphs = title_block(sorted.len(), generated_at);

    for (index, submission) in sorted.iter().enumerate() {
        paragraphs.extend(submission_section(submission, index));
    }

    if sorted.is_empty() {
        paragraphs.push(
            Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().before(600))
                .add_run(body_run("No submissions received yet.", 24, "999999").italic()),
        );
    }

    paragraphs
}

fn body_run(text: &str, size: usize, color: &str) -> Run {
    Run::new()
        .add_text(text)
        .size(size)
        .color(color)
        .fonts(RunFonts::new().ascii(BODY_FONT))
}

fn title_block(count: usize, generated_at: DateTime<Utc>) -> Vec<Paragraph> {
    let noun = if count == 1 { "submission" } else { "submissions" };
    let generated = generated_at.format("%A, %-d %B %Y");

    vec![
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().before(2400).after(200))
            .add_run(body_run("GRIVA READS", 48, "8B4513").bold()),
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(200))
            .add_run(body_run("The Unchosen Path Challenge", 36, "333333").bold()),
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(100))
            .add_run(body_run("Alternative Ending Submissions", 24, "666666").italic()),
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(400))
            .add_run(body_run(&format!("{count} {noun} received"), 22, "888888")),
        Paragraph::new()
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().after(600))
            .add_run(body_run(&format!("Generated: {generated}"), 20, "999999").italic()),
    ]
}

fn submission_section(submission: &Submission, index: usize) -> Vec<Paragraph> {
    let mut section = Vec::new();

    // Page break before each submission; the first follows the title page
    // directly and gets a divider instead.
    if index > 0 {
        section.push(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)));
    } else {
        section.push(
            Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().before(200).after(400))
                .add_run(body_run("— — — — — — — — — —", 20, "CCCCCC")),
        );
    }

    section.push(
        Paragraph::new()
            .line_spacing(LineSpacing::new().after(60))
            .add_run(
                Run::new()
                    .add_text(format!("SUBMISSION {}", index + 1))
                    .bold()
                    .size(14)
                    .color("999999")
                    .fonts(RunFonts::new().ascii(LABEL_FONT)),
            ),
    );
    section.push(
        Paragraph::new()
            .line_spacing(LineSpacing::new().after(40))
            .add_run(body_run(&submission.full_name, 28, "333333").bold()),
    );
    section.push(
        Paragraph::new()
            .line_spacing(LineSpacing::new().after(40))
            .add_run(body_run(&format!("Form: {}", submission.form_class), 22, "666666"))
            .add_run(body_run(
                &format!("    |    {} words", submission.word_count),
                22,
                "888888",
            )),
    );

    let submitted = submission.submitted_at.format("%a, %-d %b %Y, %H:%M");
    section.push(
        Paragraph::new()
            .line_spacing(LineSpacing::new().after(200))
            .add_run(body_run(&format!("Submitted: {submitted}"), 18, "999999").italic()),
    );

    // Divider rule between the header block and the story body.
    section.push(
        Paragraph::new()
            .line_spacing(LineSpacing::new().after(200))
            .add_run(body_run(&"─".repeat(40), 16, "DDDDDD")),
    );

    let paragraphs = story_paragraphs(&submission.story);
    let last = paragraphs.len().saturating_sub(1);
    for (position, text) in paragraphs.iter().enumerate() {
        let after = if position < last { 160 } else { 0 };
        section.push(
            Paragraph::new()
                .line_spacing(LineSpacing::new().after(after).line(360))
                .add_run(body_run(text, 24, "222222")),
        );
    }

    section
}
