//! Weekly challenge pool.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

use super::week::WeekId;

pub struct ChallengeTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// `(task id, description)` in display order.
    pub tasks: &'static [(&'static str, &'static str)],
}

pub const TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        id: "cardio-week",
        title: "Cardiology Week",
        description: "Sharpen your cardiovascular reasoning.",
        tasks: &[
            ("ecg-review", "Interpret three ECGs with the ECG prompt"),
            ("heart-failure-case", "Work through a heart failure case"),
            ("murmur-quiz", "Quiz yourself on heart murmurs"),
            ("focus-block", "Finish a focus pomodoro on cardiology"),
        ],
    },
    ChallengeTemplate {
        id: "pharm-sprint",
        title: "Pharmacology Sprint",
        description: "Drug classes, mechanisms and interactions.",
        tasks: &[
            ("mechanisms", "Summarize five drug mechanisms of action"),
            ("interactions", "Check a polypharmacy case for interactions"),
            ("flashcards", "Generate flashcards for antibiotics"),
        ],
    },
    ChallengeTemplate {
        id: "clinical-reasoning",
        title: "Clinical Reasoning",
        description: "From chief complaint to differential.",
        tasks: &[
            ("history", "Take a structured history with the anamnesis prompt"),
            ("differential", "Build a differential for chest pain"),
            ("plan", "Write an assessment and plan"),
            ("reflect", "Review one diagnostic error case"),
        ],
    },
    ChallengeTemplate {
        id: "anatomy-review",
        title: "Anatomy Review",
        description: "Revisit structures that show up on every exam.",
        tasks: &[
            ("brachial-plexus", "Draw the brachial plexus from memory"),
            ("cranial-nerves", "Quiz yourself on the cranial nerves"),
            ("imaging", "Correlate anatomy with a CT scan"),
        ],
    },
    ChallengeTemplate {
        id: "exam-prep",
        title: "Exam Prep Marathon",
        description: "Consistency beats cramming.",
        tasks: &[
            ("daily-questions", "Answer question sets on three different days"),
            ("weak-topic", "Pick your weakest topic and study it"),
            ("mock-exam", "Complete a timed mock block"),
            ("review-errors", "Review every wrong answer"),
        ],
    },
];

/// Template for `week`. Same week, same template.
pub fn template_for(week: WeekId) -> &'static ChallengeTemplate {
    let mut rng = Mcg128Xsl64::seed_from_u64(week.seed());
    TEMPLATES.choose(&mut rng).unwrap_or(&TEMPLATES[0])
}
