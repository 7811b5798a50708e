// src/core/render.rs
//! Email subjects and bodies

use chrono::NaiveDate;

use crate::types::{JobListing, QuestionRecord};
use crate::utils::html_escape;

pub const QUESTIONS_SUBJECT: &str = "Daily Senior QA Interview Questions";

/// `Q:`/`A:` blocks separated by a blank line.
pub fn render_questions(records: &[QuestionRecord]) -> String {
    records
        .iter()
        .map(|r| format!("Q: {}\nA: {}", r.question.trim(), r.answer.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn jobs_subject(date: NaiveDate) -> String {
    format!("QA Job Listings – {}", date.format("%Y-%m-%d"))
}

pub fn render_job_table(listings: &[JobListing], date: NaiveDate) -> String {
    let mut html = format!(
        r#"<html><body>
<h2>QA Job Results – {}</h2>
<table border="1" cellpadding="5" cellspacing="0" style="border-collapse: collapse; width: 100%;">
<tr style="background-color:#f2f2f2;">
<th>Role</th><th>Company</th><th>Location</th><th>Apply Link</th>
</tr>
"#,
        date.format("%Y-%m-%d")
    );

    for listing in listings {
        html.push_str(&format!(
            "<tr>\n<td>{}</td>\n<td>{}</td>\n<td>{}</td>\n<td><a href=\"{}\">Apply Here</a></td>\n</tr>\n",
            html_escape(&listing.title),
            html_escape(&listing.company),
            html_escape(&listing.location),
            html_escape(&listing.apply_link),
        ));
    }

    html.push_str("</table></body></html>");
    html
}
