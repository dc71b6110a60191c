//! # pos-core — Etiquetador Morfossintático (POS) com HMM + Viterbi
//!
//! Este crate atribui uma tag de classe gramatical (substantivo, verbo, conjunção...)
//! a cada palavra de uma sentença. O modelo é um **Hidden Markov Model** treinado
//! por contagem sobre um corpus alinhado de palavras e tags, e a decodificação usa
//! o **algoritmo de Viterbi**.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em um único sentido:
//!
//! 1.  **Corpus** ([`corpus`]): pares de linhas (palavras, tags) lidos de arquivos.
//! 2.  **Treino** ([`hmm`]): contagem de emissões e transições → log-probabilidades.
//! 3.  **Decodificação** ([`viterbi`]): sequência de tags mais provável para uma sentença.
//! 4.  **Avaliação** ([`evaluation`]): acurácia das tags preditas contra a referência.
//!
//! O modelo é imutável depois do treino; qualquer número de decodificações pode
//! compartilhá-lo.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use pos_core::{decode, AlignedSentence, HmmModel};
//!
//! let corpus = vec![
//!     AlignedSentence::from_lines("the dog barks", "DET N V"),
//!     AlignedSentence::from_lines("a cat sleeps", "DET N V"),
//! ];
//! let model = HmmModel::train(&corpus);
//!
//! let tags = decode(&model, &["the", "cat", "barks"]);
//! assert_eq!(tags, vec!["DET", "N", "V"]);
//! ```

pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod fixture;
pub mod hmm;
pub mod tagger;
pub mod viterbi;

pub use corpus::{AlignedSentence, Alignment, Corpus};
pub use error::{PosError, Result};
pub use evaluation::{evaluate, Accuracy, Evaluation};
pub use hmm::HmmModel;
pub use tagger::{State, TagId, TagSet};
pub use viterbi::{decode, viterbi_decode, ViterbiResult, ViterbiStep};
