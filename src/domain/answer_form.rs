use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::entry_sheet::Question;

pub const MAX_ANSWER_CHARS: usize = 4000;
const TOTAL_FORMS_FIELD: &str = "form-TOTAL_FORMS";
// Upper bound on forms accepted in one submission
const MAX_FORMS: usize = 1000;

/// One form of the submitted batch, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedAnswer {
    pub index: usize,
    pub question_id: Option<i64>,
    pub answer: String,
}

/// A validated answer ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerForm {
    pub question_id: i64,
    pub answer: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum AnswerFormError {
    #[error("The form count is missing or invalid")]
    ManagementForm,
    #[error("Form {0} does not reference a question")]
    MissingQuestionId(usize),
    #[error("Question {0} does not belong to this entry sheet")]
    ForeignQuestion(i64),
    #[error("Question {0} was submitted more than once")]
    DuplicateQuestion(i64),
    #[error("The answer to question {0} is longer than {} characters", MAX_ANSWER_CHARS)]
    AnswerTooLong(i64),
}

pub fn parse_answer_forms(
    fields: &HashMap<String, String>,
) -> Result<Vec<SubmittedAnswer>, AnswerFormError> {
    let total: usize = fields
        .get(TOTAL_FORMS_FIELD)
        .and_then(|total| total.trim().parse().ok())
        .filter(|total| *total <= MAX_FORMS)
        .ok_or(AnswerFormError::ManagementForm)?;

    Ok((0..total)
        .map(|index| SubmittedAnswer {
            index,
            question_id: fields
                .get(&format!("form-{}-id", index))
                .and_then(|id| id.trim().parse().ok()),
            answer: fields
                .get(&format!("form-{}-answer", index))
                .cloned()
                .unwrap_or_default(),
        })
        .collect())
}

/// Checks a submitted batch against the questions of its entry sheet.
/// Returns every problem found, not just the first.
pub fn validate_answer_forms(
    submitted: &[SubmittedAnswer],
    questions: &[Question],
) -> Result<Vec<AnswerForm>, Vec<AnswerFormError>> {
    let own_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    let mut seen = HashSet::new();
    let mut errors = vec![];
    let mut forms = vec![];

    for form in submitted {
        let Some(question_id) = form.question_id else {
            errors.push(AnswerFormError::MissingQuestionId(form.index));
            continue;
        };

        if !own_ids.contains(&question_id) {
            errors.push(AnswerFormError::ForeignQuestion(question_id));
            continue;
        }
        if !seen.insert(question_id) {
            errors.push(AnswerFormError::DuplicateQuestion(question_id));
            continue;
        }
        if form.answer.chars().count() > MAX_ANSWER_CHARS {
            errors.push(AnswerFormError::AnswerTooLong(question_id));
            continue;
        }

        forms.push(AnswerForm {
            question_id,
            answer: form.answer.clone(),
        });
    }

    match errors.is_empty() {
        true => Ok(forms),
        false => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn question(id: i64) -> Question {
        Question {
            id,
            entry_sheet_id: 1,
            question: format!("Question {}", id),
            answer: "".to_string(),
            char_num: 0,
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_reads_every_form() {
        let body = fields(&[
            ("form-TOTAL_FORMS", "2"),
            ("form-0-id", "10"),
            ("form-0-answer", "first"),
            ("form-1-id", " 11 "),
        ]);

        let submitted = parse_answer_forms(&body).unwrap();

        assert_eq!(
            submitted,
            vec![
                SubmittedAnswer {
                    index: 0,
                    question_id: Some(10),
                    answer: "first".to_string()
                },
                SubmittedAnswer {
                    index: 1,
                    question_id: Some(11),
                    answer: "".to_string()
                },
            ]
        );
    }

    #[test]
    fn parse_rejects_missing_or_huge_total() {
        assert_eq!(
            parse_answer_forms(&fields(&[("form-0-id", "1")])),
            Err(AnswerFormError::ManagementForm)
        );
        assert_eq!(
            parse_answer_forms(&fields(&[("form-TOTAL_FORMS", "abc")])),
            Err(AnswerFormError::ManagementForm)
        );
        assert_eq!(
            parse_answer_forms(&fields(&[("form-TOTAL_FORMS", "100000")])),
            Err(AnswerFormError::ManagementForm)
        );
    }

    #[test]
    fn validate_accepts_own_questions() {
        let body = fields(&[
            ("form-TOTAL_FORMS", "2"),
            ("form-0-id", "1"),
            ("form-0-answer", "I like rust"),
            ("form-1-id", "2"),
            ("form-1-answer", "志望動機"),
        ]);
        let submitted = parse_answer_forms(&body).unwrap();

        let forms = validate_answer_forms(&submitted, &[question(1), question(2)]).unwrap();

        assert_eq!(forms.len(), 2);
        assert_eq!(forms[1].question_id, 2);
        assert_eq!(forms[1].answer, "志望動機");
    }

    #[test]
    fn validate_collects_all_errors() {
        let long_answer = "a".repeat(MAX_ANSWER_CHARS + 1);
        let body = fields(&[
            ("form-TOTAL_FORMS", "5"),
            ("form-0-id", "1"),
            ("form-1-id", "1"),
            ("form-2-id", "99"),
            ("form-3-answer", "no id"),
            ("form-4-id", "2"),
            ("form-4-answer", long_answer.as_str()),
        ]);
        let submitted = parse_answer_forms(&body).unwrap();

        let errors = validate_answer_forms(&submitted, &[question(1), question(2)]).unwrap_err();

        assert_eq!(
            errors,
            vec![
                AnswerFormError::DuplicateQuestion(1),
                AnswerFormError::ForeignQuestion(99),
                AnswerFormError::MissingQuestionId(3),
                AnswerFormError::AnswerTooLong(2),
            ]
        );
    }

    #[test]
    fn answer_at_limit_is_accepted() {
        let submitted = vec![SubmittedAnswer {
            index: 0,
            question_id: Some(1),
            answer: "あ".repeat(MAX_ANSWER_CHARS),
        }];

        assert!(validate_answer_forms(&submitted, &[question(1)]).is_ok());
    }
}
