use chrono::{DateTime, Utc};

use super::domain::{AssessmentResult, Submission};
use super::levels::MAX_SCORE;

/// Renders the HTML body of the result email.
pub fn render_result_email(
    submission: &Submission,
    result: &AssessmentResult,
    evaluated_at: DateTime<Utc>,
) -> String {
    format!(
        "<h2>Resultado do Índice de Maturidade Cultural</h2>\n\
         <p><strong>Empresa:</strong> {company}</p>\n\
         <p><strong>Respondente:</strong> {respondent} ({role})</p>\n\
         <p><strong>Porte:</strong> {size}</p>\n\
         <p><strong>Pontuação:</strong> {total} de {max} pontos</p>\n\
         <p><strong>Nível:</strong> {level}</p>\n\
         <hr />\n\
         {description}\n\
         <p><small>Avaliação realizada em {date}.</small></p>\n",
        company = escape_html(&submission.company_name),
        respondent = escape_html(&submission.respondent_name),
        role = escape_html(&submission.role),
        size = escape_html(&submission.company_size),
        total = result.total_score,
        max = MAX_SCORE,
        level = result.level_key,
        description = result.description_html,
        date = evaluated_at.format("%d/%m/%Y"),
    )
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
