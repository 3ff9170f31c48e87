// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Threshold policy and verdict types

use serde::{Deserialize, Serialize};

/// Decision boundary on P(anemia), calibrated offline
pub const THRESHOLD: f64 = 0.1641;

/// Meaning of the classifier's raw sigmoid output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolarity {
    /// Raw score is P(non-anemia)
    NonAnemia,
    /// Raw score is P(anemia)
    Anemia,
}

/// Polarity of the deployed classifier.
///
/// The shipped model was trained with `non-anemia` as the positive class, so
/// its raw output must be inverted before comparing against [`THRESHOLD`].
pub const RAW_SCORE_POLARITY: ScorePolarity = ScorePolarity::NonAnemia;

impl ScorePolarity {
    /// P(anemia) for a raw classifier output
    pub fn anemia_probability(self, raw_score: f64) -> f64 {
        match self {
            ScorePolarity::NonAnemia => 1.0 - raw_score,
            ScorePolarity::Anemia => raw_score,
        }
    }

    /// P(non-anemia) for a raw classifier output
    pub fn non_anemia_probability(self, raw_score: f64) -> f64 {
        match self {
            ScorePolarity::NonAnemia => raw_score,
            ScorePolarity::Anemia => 1.0 - raw_score,
        }
    }
}

/// Disclaimer shown next to every rendered verdict
pub const DISCLAIMER: &str = "This is a research tool and cannot replace a professional medical diagnosis. \
Please consult a doctor for an accurate result.";

/// Screening outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    AnemiaSuspected,
    NoAnemiaSigns,
}

impl ScreeningStatus {
    /// Apply the threshold policy. Strictly greater-than: a score equal to
    /// [`THRESHOLD`] is not suspicious.
    pub fn from_anemia_score(anemia_score: f64) -> Self {
        if anemia_score > THRESHOLD {
            ScreeningStatus::AnemiaSuspected
        } else {
            ScreeningStatus::NoAnemiaSigns
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ScreeningStatus::AnemiaSuspected => "Anemia suspected",
            ScreeningStatus::NoAnemiaSigns => "No anemia signs",
        }
    }

    /// Advisory text with light HTML markup
    pub fn advice(&self) -> &'static str {
        match self {
            ScreeningStatus::AnemiaSuspected => concat!(
                "<p><b>Result: Signs of anemia detected</b></p>",
                "<p><b>Advice:</b> The analysis shows visual signs associated with anemia. ",
                "We recommend that you <b>consult a doctor soon</b> for an accurate diagnosis and advice.</p>"
            ),
            ScreeningStatus::NoAnemiaSigns => concat!(
                "<p><b>Result: No signs of anemia</b></p>",
                "<p><b>Advice:</b> Based on the image, the model did not detect signs of anemia. ",
                "Keep a healthy lifestyle and have <b>regular health check-ups</b>.</p>"
            ),
        }
    }

    /// Machine-readable name, also used as a metrics label
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningStatus::AnemiaSuspected => "anemia_suspected",
            ScreeningStatus::NoAnemiaSigns => "no_anemia_signs",
        }
    }
}

impl std::fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Confidence breakdown, both keys always present
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// P(anemia)
    pub anemia: f64,
    /// P(non-anemia)
    pub non_anemia: f64,
}

/// Structured decision returned by the screening engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: ScreeningStatus,
    pub advice: String,
    pub confidence: Confidence,
}

impl Verdict {
    /// Derive a verdict from the classifier's raw output
    pub fn from_raw_score(raw_score: f64) -> Self {
        let anemia = RAW_SCORE_POLARITY.anemia_probability(raw_score);
        let non_anemia = RAW_SCORE_POLARITY.non_anemia_probability(raw_score);
        let status = ScreeningStatus::from_anemia_score(anemia);

        Self {
            status,
            advice: status.advice().to_string(),
            confidence: Confidence { anemia, non_anemia },
        }
    }

    pub fn label(&self) -> &'static str {
        self.status.label()
    }

    pub fn is_anemia_suspected(&self) -> bool {
        self.status == ScreeningStatus::AnemiaSuspected
    }
}
