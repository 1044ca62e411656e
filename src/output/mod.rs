/// JSON and markdown rendering of reviews, and writing them to a file or stdout.
pub mod formatter;
/// Builds a Markdown review report from statement results.
pub mod report;
