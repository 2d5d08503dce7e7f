pub mod answer_key;
mod bank;
pub mod grading;
mod ids;
mod question;
mod review;
mod session;
mod settings;
pub mod view;

pub use ids::{ParseSessionNumberError, SessionNumber};
pub use question::{AnswerOption, Question, QuestionDraft, QuestionError};

pub use bank::{BankError, QuestionBank};
pub use grading::{ScoreBand, SessionGrade};
pub use review::{ReviewCursor, ReviewStep};
pub use session::{
    Advance, QuestionStatus, Selection, SessionBuildError, SessionState, TransitionError,
};
pub use settings::{QuizSettings, QuizSettingsError};
pub use view::{ForwardLabel, NavigationView, OptionMark, OptionView, QuestionView};
