//! HTML page rendering
//!
//! One page: a sidebar holding the submission form and a main panel
//! holding the board. Every piece of user data goes through [`escape`].

use qboard_core::{Board, BoardError, GroupView};

/// Page title
pub const TITLE: &str = "Group Question Board";

/// Sidebar header
pub const SIDEBAR_HEADER: &str = "Ask a question";

/// Shown under the form
pub const SHARING_HINT: &str = "Submitted questions are shared with everyone viewing this board.";

/// Message shown next to the form after a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Question stored
    Success(String),
    /// Input rejected, nothing stored
    Warning(String),
    /// Store rejected the write
    Error(String),
}

impl Notice {
    fn class(&self) -> &'static str {
        match self {
            Self::Success(_) => "notice success",
            Self::Warning(_) => "notice warning",
            Self::Error(_) => "notice error",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Warning(m) | Self::Error(m) => m,
        }
    }
}

/// Values pre-filled in the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    /// Group name field
    pub group: String,
    /// Question field
    pub text: String,
}

impl FormValues {
    /// Form with both fields filled
    pub fn new(group: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            text: text.into(),
        }
    }
}

/// Everything one page render needs
#[derive(Debug)]
pub struct Page<'a> {
    /// Board, or the read fault that replaced it for this render
    pub board: Result<&'a Board, &'a BoardError>,
    /// Outcome of the submission that produced this page
    pub notice: Option<Notice>,
    /// Form contents
    pub form: FormValues,
}

/// Escape text for HTML element and attribute content
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;display:flex;min-height:100vh}\
aside{width:20rem;padding:1.5rem;background:#f0f2f6}\
main{flex:1;padding:1.5rem 3rem}\
input,textarea{width:100%;box-sizing:border-box;margin-bottom:.75rem;padding:.5rem}\
textarea{height:150px}\
button{width:100%;padding:.6rem}\
.notice{padding:.75rem;border-radius:.4rem;margin:.75rem 0}\
.success{background:#dff5e3}.warning{background:#fff4d6}.error{background:#fde2e2}.info{background:#e1ecfb}\
details{border:1px solid #ddd;border-radius:.4rem;margin-bottom:.75rem;padding:.5rem 1rem}\
summary{cursor:pointer}.ts{color:#666;font-style:italic;font-size:.85rem}";

/// Render the full page
pub fn render_page(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(TITLE)));
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    render_sidebar(&mut html, page);

    html.push_str("<main>\n");
    html.push_str(&format!("<h1>{}</h1>\n<hr>\n", escape(TITLE)));
    match page.board {
        Ok(board) => render_board(&mut html, board),
        Err(err) => html.push_str(&format!(
            "<div class=\"notice error\" role=\"alert\">Could not load questions: {}</div>\n",
            escape(&err.to_string())
        )),
    }
    html.push_str("</main>\n</body>\n</html>\n");

    html
}

fn render_sidebar(html: &mut String, page: &Page<'_>) {
    html.push_str("<aside>\n");
    html.push_str(&format!("<h2>{}</h2>\n", escape(SIDEBAR_HEADER)));
    html.push_str("<form method=\"post\" action=\"/questions\">\n");
    html.push_str(&format!(
        "<label for=\"group\">Group name</label>\n\
         <input id=\"group\" name=\"group\" type=\"text\" placeholder=\"e.g. Group 1, Team Diamond\" value=\"{}\">\n",
        escape(&page.form.group)
    ));
    html.push_str(&format!(
        "<label for=\"text\">Question</label>\n\
         <textarea id=\"text\" name=\"text\" placeholder=\"Write your question in detail here.\">{}</textarea>\n",
        escape(&page.form.text)
    ));
    html.push_str("<button type=\"submit\">Submit question</button>\n</form>\n");

    if let Some(notice) = &page.notice {
        html.push_str(&format!(
            "<div class=\"{}\" role=\"status\">{}</div>\n",
            notice.class(),
            escape(notice.message())
        ));
    }

    html.push_str(&format!("<div class=\"notice info\">{}</div>\n", escape(SHARING_HINT)));
    html.push_str("</aside>\n");
}

fn render_board(html: &mut String, board: &Board) {
    if let Some(message) = board.empty_message() {
        html.push_str(&format!("<div class=\"notice info\">{}</div>\n", escape(message)));
        return;
    }

    for group in &board.groups {
        render_group(html, group);
    }
}

fn render_group(html: &mut String, group: &GroupView) {
    let count = group.count();
    let noun = if count == 1 { "question" } else { "questions" };

    html.push_str(&format!(
        "<details>\n<summary><strong>{}</strong> ({count} {noun})</summary>\n",
        escape(&group.name)
    ));
    for question in &group.questions {
        html.push_str(&format!(
            "<p><strong>Q.</strong> {}</p>\n<p class=\"ts\">{}</p>\n<hr>\n",
            escape(&question.text),
            escape(&question.timestamp_text())
        ));
    }
    html.push_str("</details>\n");
}
