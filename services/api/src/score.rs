use clap::Args;
use culture_index::assessment::{
    assess, read_submissions_from_path, validate, AssessmentResult, ImportedSubmission,
    SubmissionError, MAX_SCORE,
};
use culture_index::error::AppError;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Comma-separated answers, e.g. 5,4,3,5,2,4,3,5,4,4
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with = "csv",
        required_unless_present = "csv"
    )]
    pub(crate) answers: Vec<String>,
    /// Survey export with companyName,respondentName,email,companySize,role columns
    /// followed by one column per answer
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    match args.csv {
        Some(path) => {
            let rows = read_submissions_from_path(path)?;
            println!("{}", render_batch(&rows));
            Ok(())
        }
        None => {
            let answers: Vec<Value> = args.answers.into_iter().map(Value::String).collect();
            let result = assess(&answers)?;
            println!("{}", render_result(&result));
            Ok(())
        }
    }
}

fn render_result(result: &AssessmentResult) -> String {
    format!(
        "Pontuação: {} de {} pontos\nNível: {}\n{}",
        result.total_score, MAX_SCORE, result.level_key, result.description_text
    )
}

fn render_batch(rows: &[ImportedSubmission]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut scored = 0;

    for row in rows {
        let outcome = validate(row.submission.clone())
            .map_err(SubmissionError::from)
            .and_then(|submission| {
                let result = assess(&submission.answers)?;
                Ok((submission, result))
            });

        match outcome {
            Ok((submission, result)) => {
                scored += 1;
                lines.push(format!(
                    "- line {} | {} | {} pts | {}",
                    row.line, submission.company_name, result.total_score, result.level_key
                ));
            }
            Err(err) => lines.push(format!("- line {} | rejected: {}", row.line, err)),
        }
    }

    lines.insert(0, format!("Scored {} of {} submissions", scored, rows.len()));
    lines.join("\n")
}
