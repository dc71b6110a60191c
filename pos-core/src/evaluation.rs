//! # Avaliação de Acurácia
//!
//! Compara as tags preditas pelo Viterbi com as tags de referência (gold),
//! posição a posição, até o menor dos dois comprimentos em cada sentença.
//!
//! Métricas:
//! - **Acurácia por item**: tags corretas / tags comparadas (global e por sentença).
//! - **Acurácia por sequência**: sentenças com todas as tags corretas.
//! - **Por tag**: precisão, revocação e F1.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::AlignedSentence;
use crate::hmm::HmmModel;
use crate::viterbi::decode;

/// Contagem de acertos sobre um conjunto de tags comparadas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Fração de acertos; 0.0 quando nada foi comparado.
    #[inline]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }

    #[inline]
    pub fn percentage(&self) -> f64 {
        self.ratio() * 100.0
    }

    fn add(&mut self, other: Accuracy) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tags corretas de {} ({:.2}%)",
            self.correct,
            self.total,
            self.percentage()
        )
    }
}

/// Desempenho de uma tag individual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMeasure {
    /// Predições corretas desta tag.
    pub num_correct: usize,
    /// Ocorrências da tag na referência.
    pub num_observation: usize,
    /// Quantas vezes o modelo previu a tag.
    pub num_prediction: usize,
}

impl LabelMeasure {
    pub fn precision(&self) -> f64 {
        if self.num_prediction == 0 {
            return 0.0;
        }
        self.num_correct as f64 / self.num_prediction as f64
    }

    pub fn recall(&self) -> f64 {
        if self.num_observation == 0 {
            return 0.0;
        }
        self.num_correct as f64 / self.num_observation as f64
    }

    pub fn fmeasure(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            p * r * 2.0 / (p + r)
        } else {
            0.0
        }
    }
}

/// Resultado acumulado de uma avaliação.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub overall: Accuracy,
    pub per_sentence: Vec<Accuracy>,
    /// Sentenças em que todas as tags comparadas estavam corretas.
    pub sequences_correct: usize,
    /// Medidas por tag, em ordem alfabética.
    pub labels: BTreeMap<String, LabelMeasure>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compara uma sentença e acumula o resultado.
    pub fn accumulate<R, P>(&mut self, reference: &[R], prediction: &[P]) -> Accuracy
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        let mut acc = Accuracy::default();
        for (r, p) in reference.iter().zip(prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.labels.entry(r.to_string()).or_default().num_observation += 1;
            self.labels.entry(p.to_string()).or_default().num_prediction += 1;
            if r == p {
                self.labels.entry(r.to_string()).or_default().num_correct += 1;
                acc.correct += 1;
            }
            acc.total += 1;
        }

        if acc.correct == acc.total && reference.len() == prediction.len() {
            self.sequences_correct += 1;
        }
        self.overall.add(acc);
        self.per_sentence.push(acc);
        acc
    }

    pub fn sentences(&self) -> usize {
        self.per_sentence.len()
    }

    pub fn sequence_accuracy(&self) -> f64 {
        if self.per_sentence.is_empty() {
            return 0.0;
        }
        self.sequences_correct as f64 / self.per_sentence.len() as f64
    }

    /// Média simples do F1 das tags presentes na referência.
    pub fn macro_fmeasure(&self) -> f64 {
        let observed: Vec<&LabelMeasure> = self.labels.values().filter(|m| m.num_observation > 0).collect();
        if observed.is_empty() {
            return 0.0;
        }
        observed.iter().map(|m| m.fmeasure()).sum::<f64>() / observed.len() as f64
    }
}

/// Decodifica cada sentença com o modelo e compara com as tags de referência.
pub fn evaluate(model: &HmmModel, sentences: &[AlignedSentence]) -> Evaluation {
    let mut evaluation = Evaluation::new();
    for sentence in sentences {
        let predicted = decode(model, &sentence.words);
        evaluation.accumulate(&sentence.tags, &predicted);
    }
    info!(
        sentences = evaluation.sentences(),
        correct = evaluation.overall.correct,
        total = evaluation.overall.total,
        accuracy = evaluation.overall.ratio(),
        "avaliação concluída"
    );
    evaluation
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Desempenho por tag (#acertos, #modelo, #referência) (precisão, revocação, F1):")?;
        for (label, m) in &self.labels {
            if m.num_observation == 0 {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) (******, ******, ******)",
                    label, m.num_correct, m.num_prediction, m.num_observation
                )?;
            } else {
                writeln!(
                    f,
                    "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})",
                    label,
                    m.num_correct,
                    m.num_prediction,
                    m.num_observation,
                    m.precision(),
                    m.recall(),
                    m.fmeasure()
                )?;
            }
        }
        writeln!(f, "F1 macro: {:.4}", self.macro_fmeasure())?;
        writeln!(f, "Acurácia por item: {}", self.overall)?;
        write!(
            f,
            "Acurácia por sentença: {}/{} ({:.2}%)",
            self.sequences_correct,
            self.sentences(),
            self.sequence_accuracy() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;

    #[test]
    fn test_compares_up_to_shorter_length() {
        let mut eval = Evaluation::new();
        let acc = eval.accumulate(&["N", "V", "N"], &["N", "N"]);
        assert_eq!(acc, Accuracy { correct: 1, total: 2 });
        // comprimentos diferentes nunca contam como sequência correta
        assert_eq!(eval.sequences_correct, 0);
    }

    #[test]
    fn test_empty_accuracy_is_zero_not_nan() {
        let eval = Evaluation::new();
        assert_eq!(eval.overall.ratio(), 0.0);
        assert_eq!(eval.sequence_accuracy(), 0.0);
        assert_eq!(eval.macro_fmeasure(), 0.0);
    }

    #[test]
    fn test_label_measures() {
        let mut eval = Evaluation::new();
        eval.accumulate(&["N", "V"], &["N", "N"]);
        let n = eval.labels["N"];
        assert_eq!((n.num_correct, n.num_prediction, n.num_observation), (1, 2, 1));
        assert!((n.precision() - 0.5).abs() < 1e-12);
        assert!((n.recall() - 1.0).abs() < 1e-12);
        let v = eval.labels["V"];
        assert_eq!(v.fmeasure(), 0.0);
    }

    #[test]
    fn test_self_consistency_is_perfect() {
        let corpus = Corpus::from_pairs([
            ("the dog barks", "DET N V"),
            ("a cat sleeps", "DET N V"),
            ("dogs bark loudly", "N V ADV"),
        ]);
        let model = HmmModel::train(&corpus.sentences);
        let eval = evaluate(&model, &corpus.sentences);
        assert_eq!(eval.overall, Accuracy { correct: 9, total: 9 });
        assert_eq!(eval.sequences_correct, 3);
        assert!((eval.overall.percentage() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_mentions_totals() {
        let mut eval = Evaluation::new();
        eval.accumulate(&["N"], &["N"]);
        let report = eval.to_string();
        assert!(report.contains("1 tags corretas de 1"));
        assert!(report.contains("100.00%"));
    }
}
