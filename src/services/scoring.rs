use crate::config::Config;
use crate::models::domain::UserAnswer;

/// Quiz knobs shared by the attempt engine and the certificate service.
/// The passing threshold is defined once, here, and injected everywhere
/// it is compared against.
#[derive(Clone, Copy, Debug)]
pub struct QuizSettings {
    pub passing_score: f64,
    pub max_questions_per_attempt: i32,
}

impl From<&Config> for QuizSettings {
    fn from(config: &Config) -> Self {
        QuizSettings {
            passing_score: config.passing_score,
            max_questions_per_attempt: config.max_questions_per_attempt,
        }
    }
}

#[cfg(test)]
impl QuizSettings {
    pub fn test_default() -> Self {
        QuizSettings {
            passing_score: 80.0,
            max_questions_per_attempt: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreSummary {
    pub score: f64,
    pub correct: i32,
    pub incorrect: i32,
}

/// Computes the final score of an attempt from its recorded answers.
/// The score is `correct / total_questions * 100`, unrounded; callers
/// round for display only. An attempt with no questions or no answers
/// scores zero rather than dividing by zero.
pub fn score_attempt(total_questions: i32, answers: &[UserAnswer]) -> ScoreSummary {
    let correct = answers.iter().filter(|a| a.is_correct).count() as i32;
    let incorrect = answers.len() as i32 - correct;

    let score = if total_questions > 0 {
        f64::from(correct) / f64::from(total_questions) * 100.0
    } else {
        0.0
    };

    ScoreSummary {
        score,
        correct,
        incorrect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::UserAnswer;

    fn answers(outcomes: &[bool]) -> Vec<UserAnswer> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, correct)| {
                UserAnswer::record("attempt-1", &format!("q-{}", i), "opt-1", *correct, 10)
            })
            .collect()
    }

    #[test]
    fn eight_of_ten_scores_eighty() {
        let recorded = answers(&[true, true, true, true, true, true, true, true, false, false]);
        let summary = score_attempt(10, &recorded);

        assert_eq!(summary.correct, 8);
        assert_eq!(summary.incorrect, 2);
        assert!((summary.score - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_always_add_up_to_recorded_answers() {
        let recorded = answers(&[true, false, false, true, false]);
        let summary = score_attempt(10, &recorded);

        assert_eq!(
            (summary.correct + summary.incorrect) as usize,
            recorded.len()
        );
    }

    #[test]
    fn zero_questions_scores_zero_without_dividing() {
        let summary = score_attempt(0, &[]);
        assert_eq!(summary.score, 0.0);
        assert_eq!(summary.correct, 0);
        assert_eq!(summary.incorrect, 0);
    }

    #[test]
    fn no_answers_scores_zero() {
        let summary = score_attempt(10, &[]);
        assert_eq!(summary.score, 0.0);
    }

    #[test]
    fn unanswered_questions_count_against_the_score() {
        // 2 of 3 answered, both correct: 2/3 of the full bank.
        let recorded = answers(&[true, true]);
        let summary = score_attempt(3, &recorded);

        assert_eq!(summary.correct, 2);
        assert_eq!(summary.incorrect, 0);
        assert!((summary.score - 200.0 / 3.0).abs() < 1e-9);
    }
}
