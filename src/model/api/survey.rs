use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{OptionId, Question, QuestionId, QuestionOption, QuestionType, SurveyId, SurveyState},
    db::survey::Survey,
};

pub const MAX_TITLE_LENGTH: usize = 100;

/// A new or renamed survey, received from a client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SurveySpec {
    pub title: String,
}

impl SurveySpec {
    /// Validate and extract the title.
    pub fn into_title(self) -> Result<String> {
        let title = self.title.trim().to_string();
        if title.is_empty() || title.len() > MAX_TITLE_LENGTH {
            return Err(Error::bad_request(format!(
                "Survey title must be between 1 and {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        Ok(title)
    }
}

/// A new or updated question, received from a client.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QuestionSpec {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl QuestionSpec {
    /// Validate this spec into a [`Question`] with the given ID.
    ///
    /// Option IDs are assigned from their position, starting at 1.
    pub fn into_question(self, id: QuestionId) -> Result<Question> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::bad_request("Question text must not be empty"));
        }

        let options = self
            .options
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .enumerate()
            .map(|(index, value)| QuestionOption {
                id: index as OptionId + 1,
                value: value.to_string(),
            })
            .collect::<Vec<_>>();
        if self.question_type.has_options() {
            if options.is_empty() {
                return Err(Error::bad_request(format!(
                    "{} questions need at least one option",
                    self.question_type
                )));
            }
        } else if !options.is_empty() {
            return Err(Error::bad_request(format!(
                "{} questions cannot have options",
                self.question_type
            )));
        }

        Ok(Question {
            id,
            question_type: self.question_type,
            text,
            options,
        })
    }
}

/// A survey as listed in the authoring dashboard.
#[derive(Debug, Serialize)]
pub struct SurveySummary {
    pub id: SurveyId,
    pub title: String,
    pub state: SurveyState,
    pub question_count: usize,
    pub participant_count: u64,
}

impl SurveySummary {
    pub fn new(survey: &Survey, participant_count: u64) -> Self {
        Self {
            id: survey.id,
            title: survey.title.clone(),
            state: survey.state,
            question_count: survey.questions.len(),
            participant_count,
        }
    }
}

/// A survey as seen by its owner.
#[derive(Debug, Serialize)]
pub struct SurveyDescription {
    pub id: SurveyId,
    pub title: String,
    pub state: SurveyState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    pub questions: Vec<Question>,
}

impl From<Survey> for SurveyDescription {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id,
            title: survey.survey.title,
            state: survey.survey.state,
            published_at: survey.survey.published_at,
            questions: survey.survey.questions,
        }
    }
}

/// A survey as seen by a participant.
#[derive(Debug, Serialize)]
pub struct PublishedSurvey {
    pub id: SurveyId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl From<Survey> for PublishedSurvey {
    fn from(survey: Survey) -> Self {
        Self {
            id: survey.id,
            title: survey.survey.title,
            questions: survey.survey.questions,
        }
    }
}

/// One answer within a submission.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnswerSpec {
    pub question: QuestionId,
    pub value: AnswerValue,
}

/// The value of one answer: free text for open questions, selected option IDs
/// otherwise.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Selection(Vec<OptionId>),
    Text(String),
}

/// Validate a full submission against the survey's questions and encode each
/// answer into its raw stored form.
///
/// Every question must be answered exactly once: closed questions by exactly
/// one existing option, nominal questions by at least one existing option,
/// open questions by non-empty text.
pub fn encode_submission(
    questions: &[Question],
    answers: &[AnswerSpec],
) -> Result<Vec<(QuestionId, String)>> {
    if answers.len() != questions.len() {
        return Err(Error::bad_request("Every question must be answered"));
    }

    questions
        .iter()
        .map(|question| {
            let mut values = answers.iter().filter_map(|answer| {
                (answer.question == question.id).then(|| &answer.value)
            });
            let value = values
                .next()
                .ok_or_else(|| Error::bad_request(format!("Question {} not answered", question.id)))?;
            if values.next().is_some() {
                return Err(Error::bad_request(format!(
                    "Question {} answered more than once",
                    question.id
                )));
            }
            Ok((question.id, encode_answer(question, value)?))
        })
        .collect()
}

fn encode_answer(question: &Question, value: &AnswerValue) -> Result<String> {
    match (question.question_type, value) {
        (QuestionType::Open, AnswerValue::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(Error::bad_request(format!(
                    "Question {} requires a non-empty answer",
                    question.id
                )));
            }
            Ok(text.to_string())
        }
        (QuestionType::Closed, AnswerValue::Selection(selected)) => match selected[..] {
            [option_id] if question.has_option(option_id) => Ok(option_id.to_string()),
            _ => Err(Error::bad_request(format!(
                "Question {} requires exactly one valid option",
                question.id
            ))),
        },
        (QuestionType::Nominal, AnswerValue::Selection(selected)) => {
            if selected.is_empty() || !selected.iter().all(|&id| question.has_option(id)) {
                return Err(Error::bad_request(format!(
                    "Question {} requires at least one valid option",
                    question.id
                )));
            }
            Ok(selected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "))
        }
        _ => Err(Error::bad_request(format!(
            "Wrong answer shape for question {}",
            question.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<Question> {
        vec![
            Question {
                id: 1,
                question_type: QuestionType::Closed,
                text: "Do you like it?".into(),
                options: vec![
                    QuestionOption {
                        id: 1,
                        value: "Yes".into(),
                    },
                    QuestionOption {
                        id: 2,
                        value: "No".into(),
                    },
                ],
            },
            Question {
                id: 2,
                question_type: QuestionType::Nominal,
                text: "Which colours?".into(),
                options: vec![
                    QuestionOption {
                        id: 1,
                        value: "Red".into(),
                    },
                    QuestionOption {
                        id: 2,
                        value: "Green".into(),
                    },
                    QuestionOption {
                        id: 3,
                        value: "Blue".into(),
                    },
                ],
            },
            Question {
                id: 3,
                question_type: QuestionType::Open,
                text: "Any comments?".into(),
                options: vec![],
            },
        ]
    }

    fn full_submission() -> Vec<AnswerSpec> {
        vec![
            AnswerSpec {
                question: 1,
                value: AnswerValue::Selection(vec![2]),
            },
            AnswerSpec {
                question: 2,
                value: AnswerValue::Selection(vec![1, 3]),
            },
            AnswerSpec {
                question: 3,
                value: AnswerValue::Text("Looks great".into()),
            },
        ]
    }

    #[test]
    fn valid_submission_encodes_per_question_type() {
        let encoded = encode_submission(&questions(), &full_submission()).unwrap();
        assert_eq!(
            encoded,
            vec![
                (1, "2".to_string()),
                (2, "1, 3".to_string()),
                (3, "Looks great".to_string()),
            ]
        );
    }

    #[test]
    fn missing_answer_is_rejected() {
        let mut answers = full_submission();
        answers.pop();
        assert!(encode_submission(&questions(), &answers).is_err());
    }

    #[test]
    fn duplicate_answer_is_rejected() {
        let mut answers = full_submission();
        answers[2] = AnswerSpec {
            question: 1,
            value: AnswerValue::Selection(vec![1]),
        };
        assert!(encode_submission(&questions(), &answers).is_err());
    }

    #[test]
    fn closed_answer_must_select_exactly_one_option() {
        let mut answers = full_submission();
        answers[0].value = AnswerValue::Selection(vec![1, 2]);
        assert!(encode_submission(&questions(), &answers).is_err());
        answers[0].value = AnswerValue::Selection(vec![]);
        assert!(encode_submission(&questions(), &answers).is_err());
        answers[0].value = AnswerValue::Selection(vec![9]);
        assert!(encode_submission(&questions(), &answers).is_err());
    }

    #[test]
    fn nominal_answer_must_select_existing_options() {
        let mut answers = full_submission();
        answers[1].value = AnswerValue::Selection(vec![1, 9]);
        assert!(encode_submission(&questions(), &answers).is_err());
        answers[1].value = AnswerValue::Selection(vec![]);
        assert!(encode_submission(&questions(), &answers).is_err());
    }

    #[test]
    fn open_answer_must_not_be_blank() {
        let mut answers = full_submission();
        answers[2].value = AnswerValue::Text("   ".into());
        assert!(encode_submission(&questions(), &answers).is_err());
    }

    #[test]
    fn question_spec_assigns_option_ids_in_order() {
        let spec = QuestionSpec {
            question_type: QuestionType::Closed,
            text: " Do you like it? ".into(),
            options: vec!["Yes".into(), "  ".into(), " No ".into()],
        };
        let question = spec.into_question(7).unwrap();
        assert_eq!(question.id, 7);
        assert_eq!(question.text, "Do you like it?");
        assert_eq!(
            question.options,
            vec![
                QuestionOption {
                    id: 1,
                    value: "Yes".into(),
                },
                QuestionOption {
                    id: 2,
                    value: "No".into(),
                },
            ]
        );
    }

    #[test]
    fn choice_question_spec_requires_options() {
        let spec = QuestionSpec {
            question_type: QuestionType::Closed,
            text: "Do you like it?".into(),
            options: vec!["  ".into()],
        };
        assert!(spec.into_question(1).is_err());
    }

    #[test]
    fn open_question_spec_rejects_options() {
        let spec = QuestionSpec {
            question_type: QuestionType::Open,
            text: "Comments?".into(),
            options: vec!["Yes".into()],
        };
        assert!(spec.into_question(1).is_err());
    }

    #[test]
    fn blank_question_text_is_rejected() {
        let spec = QuestionSpec {
            question_type: QuestionType::Open,
            text: "  ".into(),
            options: vec![],
        };
        assert!(spec.into_question(1).is_err());
    }

    #[test]
    fn survey_title_is_validated() {
        assert_eq!(
            SurveySpec {
                title: "  Feedback  ".into()
            }
            .into_title()
            .unwrap(),
            "Feedback"
        );
        assert!(SurveySpec { title: "  ".into() }.into_title().is_err());
        assert!(SurveySpec {
            title: "x".repeat(MAX_TITLE_LENGTH + 1)
        }
        .into_title()
        .is_err());
    }
}
