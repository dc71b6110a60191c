//! # Algoritmo de Viterbi — Decodificação de Sequências HMM
//!
//! O algoritmo de Viterbi é um método de **programação dinâmica** que encontra
//! a sequência de tags mais provável de forma eficiente.
//!
//! ## Intuição
//!
//! Uma busca exaustiva sobre T tags teria complexidade `O(T^N)` para N palavras.
//! O Viterbi explora que a **melhor sequência até a palavra i com tag t** depende
//! apenas da **melhor sequência até a palavra i-1 com alguma tag anterior** → `O(N × T²)`.
//!
//! ## Algoritmo
//!
//! ```text
//! Inicialização: fronteira = { #: 0.0 }
//!
//! Recursão: score[i][t] = max_{s ∈ fronteira} [score[i-1][s] + trans(s, t)] + emis(t, w_i)
//!           back[i][t]  = argmax da expressão acima
//!
//! Backtracking: reconstrói o caminho ótimo de trás pra frente, sem emitir `#`
//! ```
//!
//! Só são expandidas as transições que existem no modelo, então a fronteira pode
//! crescer ou encolher de uma posição para outra.
//!
//! ## Políticas
//!
//! - **Palavra desconhecida**: emissão = [`UNSEEN_WORD_PENALTY`] (improvável, não impossível).
//! - **Empates**: comparação estrita `>`, visitando estados em ordem (`#` e depois as tags
//!   em ordem lexicográfica); vence o menor predecessor, e no final a menor tag.
//! - **Fronteira colapsada**: se nenhum estado da fronteira tem transição de saída, usa-se
//!   uma transição uniforme `ln(1/T)` do melhor estado atual para todas as tags conhecidas.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::corpus::tokenize;
use crate::hmm::HmmModel;
use crate::tagger::{State, TagId};

/// Log-score de emissão para uma palavra nunca vista sob a tag.
pub const UNSEEN_WORD_PENALTY: f64 = -100.0;

/// Estado do Viterbi em uma posição (para visualização passo a passo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiStep {
    /// Índice da palavra sendo processada
    pub token_index: usize,
    /// A palavra em si
    pub word: String,
    /// Scores acumulados de cada tag alcançada neste passo
    pub scores: Vec<TagScore>,
    /// A tag com maior score neste passo
    pub best_tag: String,
    /// Score do melhor caminho até aqui
    pub best_score: f64,
    /// Se a transição uniforme de fallback foi usada nesta posição
    pub fallback: bool,
}

/// Score de uma tag individual no Viterbi
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagScore {
    /// Rótulo da tag (ex: "N")
    pub tag: String,
    /// Score acumulado até este passo com esta tag
    pub score: f64,
    /// Estado anterior que gerou este score ótimo (pode ser `#`)
    pub best_prev: String,
    /// Score de emissão neste passo
    pub emission: f64,
    /// Score de transição do estado anterior para esta tag
    pub transition: f64,
}

/// Resultado completo do Viterbi
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Sequência de tags mais provável (uma por palavra)
    pub best_sequence: Vec<String>,
    /// Mesma sequência, como ids do modelo
    pub path: Vec<TagId>,
    /// Log-score da melhor sequência
    pub best_score: f64,
    /// Tabela completa de scores (para visualização)
    pub steps: Vec<ViterbiStep>,
    /// Posições em que a fronteira colapsou e o fallback uniforme foi usado
    pub fallback_positions: Vec<usize>,
}

/// Melhor candidato para uma tag numa posição.
#[derive(Debug, Clone, Copy)]
struct Cell {
    score: f64,
    prev: State,
    emission: f64,
    transition: f64,
}

/// Executa o algoritmo de Viterbi sobre uma sentença já tokenizada.
///
/// # Parâmetros
/// - `model`: HMM treinado (somente leitura)
/// - `words`: palavras em minúsculas
///
/// # Retorno
/// [`ViterbiResult`] com a sequência ótima e a tabela de scores. Sentença vazia,
/// ou modelo sem nenhuma tag, produz um resultado vazio.
pub fn viterbi_decode<S: AsRef<str>>(model: &HmmModel, words: &[S]) -> ViterbiResult {
    if words.is_empty() {
        return ViterbiResult::default();
    }
    if model.is_empty() {
        warn!(words = words.len(), "modelo sem tags; nada a decodificar");
        return ViterbiResult::default();
    }

    let n_tags = model.tag_count();
    let uniform = -(n_tags as f64).ln();

    let mut frontier: Vec<(State, f64)> = vec![(State::Start, 0.0)];
    // backptr[i][t] = estado anterior que maximiza score[i][t]
    let mut backptr: Vec<Vec<Option<State>>> = Vec::with_capacity(words.len());
    let mut steps: Vec<ViterbiStep> = Vec::with_capacity(words.len());
    let mut fallback_positions = Vec::new();

    for (i, word) in words.iter().enumerate() {
        let word = word.as_ref();
        let mut cells: Vec<Option<Cell>> = vec![None; n_tags];

        for &(state, score) in &frontier {
            for (next, transition) in model.successors(state) {
                relax(&mut cells, model, word, state, score, next, transition);
            }
        }

        let fallback = cells.iter().all(Option::is_none);
        if fallback {
            if let Some((state, score)) = best_state(&frontier) {
                debug!(position = i, word, "fronteira vazia; usando transição uniforme");
                for (next, _) in model.tags().iter() {
                    relax(&mut cells, model, word, state, score, next, uniform);
                }
                fallback_positions.push(i);
            }
        }

        frontier = cells
            .iter()
            .enumerate()
            .filter_map(|(t, c)| c.map(|c| (State::Tag(TagId(t)), c.score)))
            .collect();
        backptr.push(cells.iter().map(|c| c.map(|c| c.prev)).collect());
        steps.push(make_step(model, i, word, &cells, fallback));
    }

    // === Terminação: melhor estado final ===
    let Some((State::Tag(last), best_score)) = best_state(&frontier) else {
        return ViterbiResult::default();
    };

    // === Backtracking ===
    let mut path = vec![last];
    let mut cursor = last;
    for layer in backptr.iter().skip(1).rev() {
        match layer[cursor.index()] {
            Some(State::Tag(prev)) => {
                path.push(prev);
                cursor = prev;
            }
            // `#` só é predecessor na posição 0, que não é percorrida aqui
            Some(State::Start) | None => break,
        }
    }
    path.reverse();
    debug_assert_eq!(path.len(), words.len());

    ViterbiResult {
        best_sequence: path.iter().map(|&t| model.tags().label(t).to_string()).collect(),
        path,
        best_score,
        steps,
        fallback_positions,
    }
}

/// Decodifica uma sentença tokenizada e devolve apenas as tags.
pub fn decode<S: AsRef<str>>(model: &HmmModel, words: &[S]) -> Vec<String> {
    viterbi_decode(model, words).best_sequence
}

/// Tokeniza uma linha de texto (minúsculas + espaços) e decodifica.
pub fn decode_line(model: &HmmModel, line: &str) -> ViterbiResult {
    viterbi_decode(model, &tokenize(line))
}

/// Atualiza a célula de `next` se o candidato vindo de `state` for estritamente melhor.
fn relax(
    cells: &mut [Option<Cell>],
    model: &HmmModel,
    word: &str,
    state: State,
    score: f64,
    next: TagId,
    transition: f64,
) {
    let emission = model.emission(next, word).unwrap_or(UNSEEN_WORD_PENALTY);
    let candidate = score + transition + emission;
    let slot = &mut cells[next.index()];
    if slot.map_or(true, |c| candidate > c.score) {
        *slot = Some(Cell {
            score: candidate,
            prev: state,
            emission,
            transition,
        });
    }
}

/// Primeiro estado de maior score (a fronteira já está em ordem de estado).
fn best_state(frontier: &[(State, f64)]) -> Option<(State, f64)> {
    frontier.iter().fold(None, |best, &(s, score)| match best {
        Some((_, b)) if score <= b => best,
        _ => Some((s, score)),
    })
}

fn make_step(model: &HmmModel, index: usize, word: &str, cells: &[Option<Cell>], fallback: bool) -> ViterbiStep {
    let tags = model.tags();
    let scores: Vec<TagScore> = cells
        .iter()
        .enumerate()
        .filter_map(|(t, c)| {
            c.map(|c| TagScore {
                tag: tags.label(TagId(t)).to_string(),
                score: c.score,
                best_prev: tags.state_label(c.prev).to_string(),
                emission: c.emission,
                transition: c.transition,
            })
        })
        .collect();

    let (best_tag, best_score) = scores
        .iter()
        .fold(None::<&TagScore>, |best, s| match best {
            Some(b) if s.score <= b.score => best,
            _ => Some(s),
        })
        .map(|s| (s.tag.clone(), s.score))
        .unwrap_or_else(|| (String::new(), f64::NEG_INFINITY));

    ViterbiStep {
        token_index: index,
        word: word.to_string(),
        scores,
        best_tag,
        best_score,
        fallback,
    }
}
