//! Survey results aggregation.
//!
//! Results are computed on demand from the raw answers: answers are decoded
//! per question type ([`normalize`]), counted per option ([`tally`]), and
//! formatted as percentages of all participants ([`percentage`]).

use serde::Serialize;

use crate::{
    error::{Error, Result},
    model::common::{QuestionId, QuestionType, SurveyId},
};

pub mod normalize;
pub mod percentage;
pub mod store;
pub mod tally;

pub use percentage::OptionPercentage;
pub use store::ResultsStore;

/// The aggregated results of a single question, ready for presentation.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuestionResults {
    /// An open question: the verbatim answers, in submission order.
    Open {
        #[serde(rename = "type")]
        question_type: QuestionType,
        text: String,
        answers: Vec<String>,
    },
    /// A choice question: per-option percentages, in declaration order.
    Choice {
        #[serde(rename = "type")]
        question_type: QuestionType,
        text: String,
        answers: Vec<OptionPercentage>,
    },
    /// A choice question whose options have all been removed.
    Unavailable {
        #[serde(rename = "type")]
        question_type: QuestionType,
        text: String,
    },
}

/// Compute the results of one question of a survey.
///
/// Percentages are relative to the total number of participants, not the
/// number of selections, so a multi-select question's percentages may sum to
/// more than 100 and a skipped option drags every percentage down.
pub async fn compute_question_results<S: ResultsStore + ?Sized>(
    store: &S,
    survey_id: SurveyId,
    question_id: QuestionId,
) -> Result<QuestionResults> {
    let question = store
        .load_question(survey_id, question_id)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!(
                "Question {} in survey {}",
                question_id, survey_id
            ))
        })?;

    if !question.question_type.has_options() {
        let answers = store
            .load_answers_for_question(survey_id, question_id)
            .await?;
        let raw = answers
            .into_iter()
            .map(|answer| answer.value.clone())
            .collect::<Vec<_>>();
        return Ok(match tally::tally(question.question_type, &[], &raw) {
            tally::Tally::Verbatim(texts) => QuestionResults::Open {
                question_type: question.question_type,
                text: question.text,
                answers: texts,
            },
            // Open questions always tally verbatim.
            tally::Tally::Counts(_) | tally::Tally::Unavailable => unreachable!(),
        });
    }

    let (options, answers, participants) = futures::try_join!(
        store.load_options(survey_id, question_id),
        store.load_answers_for_question(survey_id, question_id),
        store.participant_count(survey_id),
    )?;
    let raw = answers
        .into_iter()
        .map(|answer| answer.value.clone())
        .collect::<Vec<_>>();

    Ok(
        match tally::tally(question.question_type, &options, &raw) {
            tally::Tally::Counts(counts) => QuestionResults::Choice {
                question_type: question.question_type,
                text: question.text,
                answers: percentage::percentages(&options, &counts, participants),
            },
            tally::Tally::Unavailable => QuestionResults::Unavailable {
                question_type: question.question_type,
                text: question.text,
            },
            // Choice questions never tally verbatim.
            tally::Tally::Verbatim(_) => unreachable!(),
        },
    )
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;

    use super::*;
    use crate::model::{
        common::{Question, QuestionOption},
        db::answer::{Answer, AnswerCore},
        mongodb::Id,
    };

    /// An in-memory [`ResultsStore`] holding a single question.
    struct MemoryStore {
        survey_id: SurveyId,
        question: Question,
        answers: Vec<Answer>,
        participants: u64,
    }

    impl MemoryStore {
        fn new(question: Question, raw_answers: &[&str], participants: u64) -> Self {
            let survey_id = 1;
            let answers = raw_answers
                .iter()
                .map(|&raw| Answer {
                    id: Id::new(),
                    answer: AnswerCore {
                        survey_id,
                        question_id: question.id,
                        participant_id: Id::new(),
                        value: raw.to_string(),
                    },
                })
                .collect();
            Self {
                survey_id,
                question,
                answers,
                participants,
            }
        }
    }

    #[rocket::async_trait]
    impl ResultsStore for MemoryStore {
        async fn load_question(
            &self,
            survey_id: SurveyId,
            question_id: QuestionId,
        ) -> Result<Option<Question>> {
            Ok((survey_id == self.survey_id && question_id == self.question.id)
                .then(|| self.question.clone()))
        }

        async fn load_options(
            &self,
            survey_id: SurveyId,
            question_id: QuestionId,
        ) -> Result<Vec<QuestionOption>> {
            Ok(self
                .load_question(survey_id, question_id)
                .await?
                .map(|q| q.options)
                .unwrap_or_default())
        }

        async fn load_answers_for_question(
            &self,
            survey_id: SurveyId,
            question_id: QuestionId,
        ) -> Result<Vec<Answer>> {
            Ok(self
                .answers
                .iter()
                .filter(|a| a.survey_id == survey_id && a.question_id == question_id)
                .cloned()
                .collect())
        }

        async fn participant_count(&self, survey_id: SurveyId) -> Result<u64> {
            Ok(if survey_id == self.survey_id {
                self.participants
            } else {
                0
            })
        }
    }

    fn closed_question(options: &[&str]) -> Question {
        choice_question(QuestionType::Closed, options)
    }

    fn choice_question(question_type: QuestionType, options: &[&str]) -> Question {
        Question {
            id: 1,
            question_type,
            text: "Do you like it?".to_string(),
            options: options
                .iter()
                .enumerate()
                .map(|(index, &value)| QuestionOption {
                    id: index as u32 + 1,
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    fn open_question() -> Question {
        Question {
            id: 1,
            question_type: QuestionType::Open,
            text: "Any comments?".to_string(),
            options: Vec::new(),
        }
    }

    #[rocket::async_test]
    async fn even_split_yields_even_percentages() {
        let store = MemoryStore::new(closed_question(&["True", "False"]), &["1", "2"], 2);
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Choice {
                question_type: QuestionType::Closed,
                text: "Do you like it?".to_string(),
                answers: vec![
                    OptionPercentage {
                        option: "True".to_string(),
                        percentage: "50.00".to_string(),
                    },
                    OptionPercentage {
                        option: "False".to_string(),
                        percentage: "50.00".to_string(),
                    },
                ],
            }
        );
    }

    #[rocket::async_test]
    async fn zero_participants_yield_zero_percentages() {
        let store = MemoryStore::new(closed_question(&["True", "False"]), &[], 0);
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Choice {
                question_type: QuestionType::Closed,
                text: "Do you like it?".to_string(),
                answers: vec![
                    OptionPercentage {
                        option: "True".to_string(),
                        percentage: "0.00".to_string(),
                    },
                    OptionPercentage {
                        option: "False".to_string(),
                        percentage: "0.00".to_string(),
                    },
                ],
            }
        );
    }

    #[rocket::async_test]
    async fn open_answers_preserve_submission_order() {
        let store = MemoryStore::new(open_question(), &["first", "second", "third"], 3);
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Open {
                question_type: QuestionType::Open,
                text: "Any comments?".to_string(),
                answers: vec![
                    "first".to_string(),
                    "second".to_string(),
                    "third".to_string(),
                ],
            }
        );
    }

    #[rocket::async_test]
    async fn missing_question_is_not_found() {
        let store = MemoryStore::new(open_question(), &[], 0);
        let err = compute_question_results(&store, 1, 99).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Status(Status { code: 404 }, _)
        ));
    }

    #[rocket::async_test]
    async fn choice_question_without_options_is_unavailable() {
        let store = MemoryStore::new(closed_question(&[]), &["1"], 1);
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Unavailable {
                question_type: QuestionType::Closed,
                text: "Do you like it?".to_string(),
            }
        );
    }

    #[rocket::async_test]
    async fn multi_select_counts_each_selected_option_once() {
        let store = MemoryStore::new(
            choice_question(QuestionType::Nominal, &["Red", "Green", "Blue"]),
            &["1, 3"],
            1,
        );
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Choice {
                question_type: QuestionType::Nominal,
                text: "Do you like it?".to_string(),
                answers: vec![
                    OptionPercentage {
                        option: "Red".to_string(),
                        percentage: "100.00".to_string(),
                    },
                    OptionPercentage {
                        option: "Green".to_string(),
                        percentage: "0.00".to_string(),
                    },
                    OptionPercentage {
                        option: "Blue".to_string(),
                        percentage: "100.00".to_string(),
                    },
                ],
            }
        );
    }

    #[rocket::async_test]
    async fn recomputation_is_idempotent() {
        let store = MemoryStore::new(closed_question(&["True", "False"]), &["1", "1", "2"], 3);
        let first = compute_question_results(&store, 1, 1).await.unwrap();
        let second = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(first, second);
    }

    #[rocket::async_test]
    async fn answers_for_removed_options_are_ignored() {
        // An answer for option 7, which no longer exists.
        let store = MemoryStore::new(closed_question(&["Yes", "No"]), &["7", "1"], 2);
        let results = compute_question_results(&store, 1, 1).await.unwrap();
        assert_eq!(
            results,
            QuestionResults::Choice {
                question_type: QuestionType::Closed,
                text: "Do you like it?".to_string(),
                answers: vec![
                    OptionPercentage {
                        option: "Yes".to_string(),
                        percentage: "50.00".to_string(),
                    },
                    OptionPercentage {
                        option: "No".to_string(),
                        percentage: "0.00".to_string(),
                    },
                ],
            }
        );
    }
}
