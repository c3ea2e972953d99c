//! Types shared between the database and API representations.

mod survey;

pub use survey::{
    OptionId, Question, QuestionOption, QuestionType, SurveyId, SurveyState, QuestionId,
};
