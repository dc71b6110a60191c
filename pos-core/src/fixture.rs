//! # Modelo de Exercício (drill)
//!
//! Modelo pequeno, codificado à mão, com as tags `NP`, `CNJ`, `V` e `N`.
//! Os valores são logaritmos de pesos **não normalizados** (ex: `ln 10`), como no
//! exercício original em papel; o Viterbi só compara somas, então isso basta.
//!
//! ```text
//!           NP    CNJ    V     N
//!   #       3      -     -     7
//!   NP      -      2     8     -
//!   CNJ     2      -     4     4
//!   V       4      2     -     4
//!   N       -      2     8     -
//! ```

use crate::hmm::HmmModel;

type Row = &'static [(&'static str, f64)];

/// Sentenças de demonstração e a sequência que o decodificador produz para elas.
pub const DRILL_SENTENCES: &[(&[&str], &[&str])] = &[
    (&["dog", "and", "cat", "chase"], &["N", "CNJ", "N", "V"]),
    (&["chase", "watch", "cat"], &["NP", "V", "N"]),
    (&["watch", "get", "chase", "and", "dog"], &["N", "V", "NP", "CNJ", "N"]),
];

/// Constrói o modelo do exercício.
pub fn drill_model() -> HmmModel {
    let ln = f64::ln;

    let start = [("NP", ln(3.0)), ("N", ln(7.0))];

    let np: Row = &[("V", 8.0), ("CNJ", 2.0)];
    let cnj: Row = &[("NP", 2.0), ("V", 4.0), ("N", 4.0)];
    let v: Row = &[("NP", 4.0), ("CNJ", 2.0), ("N", 4.0)];
    let n: Row = &[("CNJ", 2.0), ("V", 8.0)];

    let emit_np: Row = &[("chase", 10.0)];
    let emit_cnj: Row = &[("and", 10.0)];
    let emit_v: Row = &[("chase", 3.0), ("get", 1.0), ("watch", 6.0)];
    let emit_n: Row = &[("cat", 4.0), ("dog", 4.0), ("watch", 2.0)];

    // Os pesos acima estão em escala linear; converte para log uma vez só
    let to_ln = |row: Row| -> Vec<(&'static str, f64)> { row.iter().map(|&(k, w)| (k, ln(w))).collect() };
    let transitions: Vec<(&str, Vec<(&str, f64)>)> =
        vec![("NP", to_ln(np)), ("CNJ", to_ln(cnj)), ("V", to_ln(v)), ("N", to_ln(n))];
    let emissions: Vec<(&str, Vec<(&str, f64)>)> = vec![
        ("NP", to_ln(emit_np)),
        ("CNJ", to_ln(emit_cnj)),
        ("V", to_ln(emit_v)),
        ("N", to_ln(emit_n)),
    ];

    let transitions: Vec<(&str, &[(&str, f64)])> =
        transitions.iter().map(|(t, row)| (*t, row.as_slice())).collect();
    let emissions: Vec<(&str, &[(&str, f64)])> = emissions.iter().map(|(t, row)| (*t, row.as_slice())).collect();

    HmmModel::from_log_probs(&start, &transitions, &emissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::State;
    use crate::viterbi::{decode, viterbi_decode};

    #[test]
    fn test_drill_model_shape() {
        let model = drill_model();
        assert_eq!(model.tag_count(), 4);
        let np = model.tags().id("NP").unwrap();
        let v = model.tags().id("V").unwrap();
        assert!((model.transition(State::Start, np).unwrap() - 3.0f64.ln()).abs() < 1e-12);
        assert_eq!(model.transition(State::Start, v), None);
        assert_eq!(model.emission(v, "get"), Some(0.0));
    }

    #[test]
    fn test_drill_golden_sentences() {
        let model = drill_model();
        for (words, expected) in DRILL_SENTENCES {
            assert_eq!(decode(&model, *words), *expected, "sentença {words:?}");
        }
    }

    #[test]
    fn test_drill_dog_and_cat_chase_score() {
        // # →7 N →2 CNJ →4 N →8 V ; emissões 4 · 10 · 4 · 3
        let model = drill_model();
        let result = viterbi_decode(&model, &["dog", "and", "cat", "chase"]);
        let expected = (7.0f64 * 4.0 * 2.0 * 10.0 * 4.0 * 4.0 * 8.0 * 3.0).ln();
        assert!((result.best_score - expected).abs() < 1e-9);
        assert!(result.fallback_positions.is_empty());
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let model = drill_model();
        let words = ["watch", "get", "chase", "and", "dog"];
        let first = viterbi_decode(&model, &words);
        for _ in 0..10 {
            assert_eq!(viterbi_decode(&model, &words), first);
        }
    }
}
