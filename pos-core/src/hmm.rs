//! # Hidden Markov Model (HMM) para POS Tagging
//!
//! Implementação clássica de HMM onde:
//! - **Estados Ocultos**: Tags POS (N, V, DET, etc.), mais o sentinela de início `#`
//! - **Observações**: Palavras (em minúsculas)
//!
//! O modelo aprende, por contagem de frequências relativas:
//! 1. Probabilidade de Transição: P(tag_atual | tag_anterior), com `#` como anterior da primeira tag
//! 2. Probabilidade de Emissão: P(palavra | tag)
//!
//! Não há suavização: uma palavra nunca vista sob uma tag simplesmente não tem
//! entrada na tabela, e o decodificador ([`crate::viterbi`]) aplica uma penalidade fixa.
//!
//! ## Fluxo do treino
//!
//! ```text
//! corpus → FrequencyAccumulator (contagens) → normalização ln(c / Σ linha) → HmmModel
//! ```

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::corpus::AlignedSentence;
use crate::tagger::{State, TagId, TagSet};

/// Contador de co-ocorrências usado durante um único treino.
///
/// É um valor local: criado pelo treino, consumido por [`FrequencyAccumulator::finish`]
/// e descartado. Nenhum estado global é tocado.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    /// Chave: `(tag, palavra)`.
    emission_counts: HashMap<(String, String), u32>,
    /// Chave: `(tag_anterior, tag)`.
    transition_counts: HashMap<(String, String), u32>,
    /// Transições saindo do sentinela `#`. Chave: `tag`.
    start_counts: HashMap<String, u32>,
    sentences: usize,
}

impl FrequencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conta uma sentença alinhada.
    pub fn observe(&mut self, sentence: &AlignedSentence) {
        self.observe_pairs(&sentence.words, &sentence.tags);
    }

    /// Conta uma sentença dada como sequências separadas.
    ///
    /// Apenas o prefixo comum é processado: tokens excedentes de qualquer lado
    /// são ignorados sem erro.
    pub fn observe_pairs<W, T>(&mut self, words: &[W], tags: &[T])
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        self.sentences += 1;
        let mut prev_tag: Option<&str> = None;

        for (word, tag) in words.iter().zip(tags.iter()) {
            let (word, tag) = (word.as_ref(), tag.as_ref());

            // Emissão: quantas vezes a tag T gerou a palavra W?
            *self
                .emission_counts
                .entry((tag.to_string(), word.to_string()))
                .or_insert(0) += 1;

            match prev_tag {
                // Início: toda sentença parte de `#`
                None => *self.start_counts.entry(tag.to_string()).or_insert(0) += 1,
                // Transição: quantas vezes PREV foi seguida por T?
                Some(prev) => {
                    *self
                        .transition_counts
                        .entry((prev.to_string(), tag.to_string()))
                        .or_insert(0) += 1
                }
            }

            prev_tag = Some(tag);
        }
    }

    /// Normaliza as contagens em log-probabilidades e produz o modelo final.
    pub fn finish(self) -> HmmModel {
        let tags = TagSet::from_labels(
            self.emission_counts
                .keys()
                .map(|(t, _)| t.as_str())
                .chain(self.start_counts.keys().map(String::as_str))
                .chain(self.transition_counts.keys().flat_map(|(a, b)| [a.as_str(), b.as_str()])),
        );
        let mut model = HmmModel::empty(tags);

        for ((tag, word), ln_p) in log_normalize(&self.emission_counts) {
            if let Some(id) = model.tags.id(tag) {
                model.emissions[id.index()].insert(word.to_string(), ln_p);
            }
        }

        for ((prev, tag), ln_p) in log_normalize(&self.transition_counts) {
            if let (Some(from), Some(to)) = (model.tags.id(prev), model.tags.id(tag)) {
                model.set_transition(State::Tag(from), to, ln_p);
            }
        }

        let start_total: u32 = self.start_counts.values().sum();
        for (tag, &count) in &self.start_counts {
            if let Some(to) = model.tags.id(tag) {
                model.set_transition(State::Start, to, (count as f64 / start_total as f64).ln());
            }
        }

        info!(
            sentences = self.sentences,
            tags = model.tag_count(),
            vocabulary = model.vocabulary_size(),
            "modelo HMM treinado"
        );
        model
    }
}

/// Converte contagens `(linha, coluna) → c` em `ln(c / Σ_linha)`.
fn log_normalize(counts: &HashMap<(String, String), u32>) -> Vec<((&str, &str), f64)> {
    let mut row_totals: HashMap<&str, u32> = HashMap::new();
    for ((row, _), &count) in counts {
        *row_totals.entry(row.as_str()).or_insert(0) += count;
    }

    counts
        .iter()
        .map(|((row, col), &count)| {
            let total = row_totals[row.as_str()] as f64;
            ((row.as_str(), col.as_str()), (count as f64 / total).ln())
        })
        .collect()
}

/// Modelo HMM treinado para etiquetagem POS.
///
/// # Armazenamento
/// - **Emissão**: uma linha por tag (`palavra → ln P(palavra | tag)`), indexada por [`TagId`].
/// - **Transição**: matriz densa `(tags + 1) × tags` de `Option<f64>`; a linha 0 é o
///   sentinela `#`. `None` significa "transição nunca observada".
///
/// As probabilidades ficam em **log-space** para evitar underflow:
/// $$ \log(A \cdot B) = \log(A) + \log(B) $$
///
/// O modelo é imutável depois de construído e pode ser compartilhado entre
/// quantas decodificações forem necessárias (é `Send + Sync`).
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    tags: TagSet,
    emissions: Vec<HashMap<String, f64>>,
    transitions: Vec<Option<f64>>,
}

impl Default for HmmModel {
    fn default() -> Self {
        Self::empty(TagSet::default())
    }
}

impl HmmModel {
    fn empty(tags: TagSet) -> Self {
        let n = tags.len();
        Self {
            tags,
            emissions: vec![HashMap::new(); n],
            transitions: vec![None; (n + 1) * n],
        }
    }

    fn set_transition(&mut self, from: State, to: TagId, ln_p: f64) {
        let n = self.tags.len();
        self.transitions[from.row() * n + to.index()] = Some(ln_p);
    }

    /// Treina o HMM com o corpus fornecido (Supervised Learning).
    ///
    /// # Processo de Treinamento
    /// 1. **Contagem**: quantas vezes cada tag gera cada palavra (emissão) e quantas
    ///    vezes uma tag segue outra dentro da mesma sentença (transição, começando em `#`).
    /// 2. **Log-Probabilidades**: cada linha é dividida pela sua soma e convertida para `ln`.
    ///
    /// Um corpus vazio produz um modelo vazio, sem erro.
    ///
    /// # Exemplo
    /// ```rust
    /// use pos_core::corpus::AlignedSentence;
    /// use pos_core::hmm::HmmModel;
    ///
    /// let corpus = vec![AlignedSentence::from_lines("the dog", "DET N")];
    /// let model = HmmModel::train(&corpus);
    /// let det = model.tags().id("DET").unwrap();
    /// assert_eq!(model.emission(det, "the"), Some(0.0)); // ln(1/1)
    /// ```
    pub fn train(corpus: &[AlignedSentence]) -> Self {
        let mut acc = FrequencyAccumulator::new();
        for sentence in corpus {
            acc.observe(sentence);
        }
        acc.finish()
    }

    /// Treina a partir de sequências paralelas de palavras e de tags.
    ///
    /// A sentença *i* de `word_sequences` é pareada com a sequência *i* de
    /// `tag_sequences`; sentenças ou tokens sem par são ignorados.
    pub fn build<W, T>(word_sequences: &[W], tag_sequences: &[T]) -> Self
    where
        W: AsRef<[String]>,
        T: AsRef<[String]>,
    {
        let mut acc = FrequencyAccumulator::new();
        for (words, tags) in word_sequences.iter().zip(tag_sequences) {
            acc.observe_pairs(words.as_ref(), tags.as_ref());
        }
        acc.finish()
    }

    /// Monta um modelo a partir de log-probabilidades explícitas, sem renormalizar.
    ///
    /// - `start`: transições saindo de `#` (`tag → ln p`).
    /// - `transitions`: `(tag_origem, [(tag_destino, ln p)])`.
    /// - `emissions`: `(tag, [(palavra, ln p)])`.
    ///
    /// As palavras não são normalizadas aqui; passe-as já em minúsculas.
    pub fn from_log_probs(
        start: &[(&str, f64)],
        transitions: &[(&str, &[(&str, f64)])],
        emissions: &[(&str, &[(&str, f64)])],
    ) -> Self {
        let tags = TagSet::from_labels(
            start
                .iter()
                .map(|(t, _)| *t)
                .chain(transitions.iter().flat_map(|(from, row)| {
                    std::iter::once(*from).chain(row.iter().map(|(to, _)| *to))
                }))
                .chain(emissions.iter().map(|(t, _)| *t)),
        );
        let mut model = Self::empty(tags);

        for &(to, ln_p) in start {
            if let Some(to) = model.tags.id(to) {
                model.set_transition(State::Start, to, ln_p);
            }
        }
        for &(from, row) in transitions {
            let Some(from) = model.tags.id(from) else { continue };
            for &(to, ln_p) in row {
                if let Some(to) = model.tags.id(to) {
                    model.set_transition(State::Tag(from), to, ln_p);
                }
            }
        }
        for &(tag, row) in emissions {
            let Some(id) = model.tags.id(tag) else { continue };
            for &(word, ln_p) in row {
                model.emissions[id.index()].insert(word.to_string(), ln_p);
            }
        }
        model
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// `true` se o modelo não conhece nenhuma tag (ex: treinado com corpus vazio).
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Número de palavras distintas vistas sob qualquer tag.
    pub fn vocabulary_size(&self) -> usize {
        self.emissions
            .iter()
            .flat_map(|row| row.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    /// `ln P(palavra | tag)`, ou `None` se a palavra nunca foi vista sob a tag.
    pub fn emission(&self, tag: TagId, word: &str) -> Option<f64> {
        self.emissions.get(tag.index())?.get(word).copied()
    }

    /// Linha de emissão completa de uma tag (vazia se a tag nunca emitiu).
    pub fn emission_row(&self, tag: TagId) -> &HashMap<String, f64> {
        &self.emissions[tag.index()]
    }

    /// `ln P(to | from)`, ou `None` se a transição nunca foi observada.
    pub fn transition(&self, from: State, to: TagId) -> Option<f64> {
        let n = self.tags.len();
        if to.index() >= n {
            return None;
        }
        self.transitions.get(from.row() * n + to.index()).copied().flatten()
    }

    /// Tags alcançáveis a partir de `from`, em ordem de [`TagId`], com a log-probabilidade.
    pub fn successors(&self, from: State) -> impl Iterator<Item = (TagId, f64)> + '_ {
        let n = self.tags.len();
        let start = from.row() * n;
        self.transitions
            .get(start..start + n)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|ln_p| (TagId(i), ln_p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(words: &str, tags: &str) -> AlignedSentence {
        AlignedSentence::from_lines(words, tags)
    }

    fn toy_corpus() -> Vec<AlignedSentence> {
        vec![
            sentence("the dog barks", "DET N V"),
            sentence("the cat sleeps", "DET N V"),
            sentence("dogs bark", "N V"),
        ]
    }

    fn assert_row_sums_to_one(values: impl Iterator<Item = f64>) {
        let sum: f64 = values.map(f64::exp).sum();
        assert!((sum - 1.0).abs() < 1e-9, "soma da linha = {sum}");
    }

    #[test]
    fn test_hmm_basic_training() {
        let model = HmmModel::train(&toy_corpus());
        let tags = model.tags();
        assert_eq!(model.tag_count(), 3);

        let det = tags.id("DET").unwrap();
        let n = tags.id("N").unwrap();
        let v = tags.id("V").unwrap();

        // DET emitiu "the" duas vezes, nada mais
        assert_eq!(model.emission(det, "the"), Some(0.0));
        // N emitiu dog, cat, dogs uma vez cada
        assert!((model.emission(n, "cat").unwrap() - (1.0f64 / 3.0).ln()).abs() < 1e-12);
        assert_eq!(model.emission(v, "dog"), None);

        // # → DET (2/3), # → N (1/3)
        assert!((model.transition(State::Start, det).unwrap() - (2.0f64 / 3.0).ln()).abs() < 1e-12);
        assert!((model.transition(State::Start, n).unwrap() - (1.0f64 / 3.0).ln()).abs() < 1e-12);
        assert_eq!(model.transition(State::Start, v), None);
        assert_eq!(model.transition(State::Tag(n), v), Some(0.0));
    }

    #[test]
    fn test_rows_are_normalized() {
        let model = HmmModel::train(&toy_corpus());
        for (id, _) in model.tags().iter() {
            let row = model.emission_row(id);
            if !row.is_empty() {
                assert_row_sums_to_one(row.values().copied());
            }
            let succ: Vec<f64> = model.successors(State::Tag(id)).map(|(_, p)| p).collect();
            if !succ.is_empty() {
                assert_row_sums_to_one(succ.into_iter());
            }
        }
        assert_row_sums_to_one(model.successors(State::Start).map(|(_, p)| p));
    }

    #[test]
    fn test_transitions_do_not_cross_sentences() {
        // Se cruzasse fronteiras, existiria V → N
        let model = HmmModel::train(&toy_corpus());
        let n = model.tags().id("N").unwrap();
        let v = model.tags().id("V").unwrap();
        assert_eq!(model.transition(State::Tag(v), n), None);
        assert_eq!(model.successors(State::Tag(v)).count(), 0);
    }

    #[test]
    fn test_empty_corpus_gives_empty_model() {
        let model = HmmModel::train(&[]);
        assert!(model.is_empty());
        assert_eq!(model.successors(State::Start).count(), 0);
        assert_eq!(model.vocabulary_size(), 0);
    }

    #[test]
    fn test_build_ignores_unpaired_tokens() {
        let words = vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
        let tags = vec![vec!["X".to_string(), "Y".to_string()]];
        let model = HmmModel::build(&words, &tags);
        assert_eq!(model.tag_count(), 2);
        assert_eq!(model.vocabulary_size(), 2);
        let y = model.tags().id("Y").unwrap();
        assert_eq!(model.emission(y, "c"), None);
    }

    #[test]
    fn test_from_log_probs_keeps_raw_scores() {
        let model = HmmModel::from_log_probs(
            &[("A", 1.5)],
            &[("A", &[("B", 2.0)])],
            &[("B", &[("x", 0.25)])],
        );
        let a = model.tags().id("A").unwrap();
        let b = model.tags().id("B").unwrap();
        assert_eq!(model.transition(State::Start, a), Some(1.5));
        assert_eq!(model.transition(State::Tag(a), b), Some(2.0));
        assert_eq!(model.emission(b, "x"), Some(0.25));
        // A aparece só em transições, sem linha de emissão
        assert!(model.emission_row(a).is_empty());
    }

    #[test]
    fn test_successors_in_tag_order() {
        let model = HmmModel::train(&[sentence("x", "Z"), sentence("y", "A"), sentence("w", "M")]);
        let order: Vec<&str> = model
            .successors(State::Start)
            .map(|(id, _)| model.tags().label(id))
            .collect();
        assert_eq!(order, vec!["A", "M", "Z"]);
    }
}
