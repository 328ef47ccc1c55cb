/*
 * Parsing and templating of frame-numbered file names such as
 * `shot_0101.exr`. A sequence member is split on its last underscore into a
 * base name and a `frame.ext` segment; the sequence as a whole is addressed by
 * a template path where the frame number is replaced by `#` placeholders.
 */
use std::fmt;

/*
 * Number of `#` placeholders written into a template. This is fixed and is not
 * inferred from the digit count of the member that produced the template.
 */
pub const FRAME_PLACEHOLDER_WIDTH: usize = 4;
pub const FRAME_PLACEHOLDER: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    NotASequence(String),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::NotASequence(name) => {
                write!(f, "'{name}' is not a member of a frame sequence")
            }
        }
    }
}

impl std::error::Error for SequenceError {}

pub type Result<T> = std::result::Result<T, SequenceError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDescriptor {
    pub base_name: String,
    /* Kept as text so leading zeros survive. */
    pub frame_number_text: String,
    pub frame_number: u64,
    pub extension: String,
}

fn parse_frame_number(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

pub fn split_sequence_name(file_name: &str) -> Result<SequenceDescriptor> {
    let not_a_sequence = || SequenceError::NotASequence(file_name.to_string());

    let (base_name, frame_and_extension) = file_name.rsplit_once('_').ok_or_else(not_a_sequence)?;
    let (frame_number_text, extension) = frame_and_extension
        .rsplit_once('.')
        .ok_or_else(not_a_sequence)?;

    let Some(frame_number) = parse_frame_number(frame_number_text) else {
        log::trace!("SequenceNameParser: '{file_name}' has a non-numeric frame segment.");
        return Err(not_a_sequence());
    };

    Ok(SequenceDescriptor {
        base_name: base_name.to_string(),
        frame_number_text: frame_number_text.to_string(),
        frame_number,
        extension: extension.to_string(),
    })
}

/*
 * Builds `directory/base_####.ext` with forward slashes only. A trailing
 * separator on `directory` is dropped; an empty directory yields a bare file
 * name.
 */
pub fn build_template_path(
    directory: &str,
    base_name: &str,
    digit_width: usize,
    extension: &str,
) -> String {
    let placeholders: String = std::iter::repeat_n(FRAME_PLACEHOLDER, digit_width).collect();
    let file_name = format!("{base_name}_{placeholders}.{extension}");

    let normalized = directory.replace('\\', "/");
    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() {
        if normalized.starts_with('/') {
            return format!("/{file_name}");
        }
        return file_name;
    }
    format!("{trimmed}/{file_name}")
}

/* True when the file name carries a `#` placeholder run. */
pub fn is_template_name(file_name: &str) -> bool {
    file_name.contains(FRAME_PLACEHOLDER)
}

/*
 * Checks whether `candidate` is a member of the sequence described by
 * `template_name` (`base_####.ext`). The placeholder width is not enforced so
 * that padded and unpadded members both count.
 */
pub fn template_matches(template_name: &str, candidate: &str) -> bool {
    let Ok(template) = split_template_name(template_name) else {
        return false;
    };
    let Ok(member) = split_sequence_name(candidate) else {
        return false;
    };
    member.base_name == template.0 && member.extension.eq_ignore_ascii_case(&template.1)
}

fn split_template_name(template_name: &str) -> Result<(String, String)> {
    let not_a_sequence = || SequenceError::NotASequence(template_name.to_string());
    let (base_name, rest) = template_name
        .rsplit_once('_')
        .ok_or_else(not_a_sequence)?;
    let (placeholders, extension) = rest.rsplit_once('.').ok_or_else(not_a_sequence)?;
    if placeholders.is_empty() || !placeholders.chars().all(|c| c == FRAME_PLACEHOLDER) {
        return Err(not_a_sequence());
    }
    Ok((base_name.to_string(), extension.to_string()))
}
