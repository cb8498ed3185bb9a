//! System prompts for the two LLM calls.
//!
//! The transcription instruction is a pinned contract: output quality depends
//! on its exact wording, so it is a constant rather than a configuration knob.
//! Bump [`TRANSCRIPTION_PROMPT_VERSION`] whenever the text changes.

/// Revision of [`TRANSCRIPTION_PROMPT`]. Logged with every run.
pub const TRANSCRIPTION_PROMPT_VERSION: u32 = 1;

/// System instruction sent with every page image.
pub const TRANSCRIPTION_PROMPT: &str = "You convert an image of a page from a PDF document to markdown.
Please only provide markdown, no explanation or extraneous information about the work.
Please do your best to convert fields and tables. If you cannot, please just list the information.
Use markdown headings for titles and keep tables as GFM pipe tables.
Do not repeat content that appears more than once on the page, such as running headers.
If you are unable to convert the image, please respond with 'N/A'.";

/// Build the system instruction for field extraction.
///
/// `prompt` is the user's free-text guidance (may be empty) and `format` is
/// the raw filename template, shown to the model so it knows which keys to
/// return.
pub fn extraction_prompt(prompt: &str, format: &str) -> String {
    format!(
        "The following is a markdown document that will be used to extract information from.
The user would like you to ensure the following about the extraction: {prompt}
The information extracted will be used to evaluate the format of the filename \"{format}\",
which is a template where `.Name` or `Name` refers to a field and `| helper` applies a string helper.
No extraneous explanation or content is required.
Please provide JSON output of the elements from the expected filename.
For example if the format was {{{{.Title | snakecase}}}}, please return JSON of {{\"Title\": \"My Title\"}}.
Please keep it as string value key-pairs. Ensure the key names are the same case as the template."
    )
}
