//! # Erros do Etiquetador
//!
//! O núcleo (treino + Viterbi) não falha por problemas de qualidade dos dados:
//! palavras desconhecidas recebem penalidade, frases vazias viram saídas vazias.
//! Os erros abaixo aparecem apenas nas bordas do sistema (leitura de corpus,
//! validação estrita de alinhamento e configuração das interfaces).

use thiserror::Error;

pub type Result<T, E = PosError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PosError {
    /// Falha de leitura dos arquivos de corpus.
    #[error("falha de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// Linha de palavras e linha de tags com quantidades diferentes de tokens
    /// (somente no modo [`Alignment::Strict`](crate::corpus::Alignment::Strict)).
    #[error("linha {line}: {words} palavras mas {tags} tags")]
    Misaligned { line: usize, words: usize, tags: usize },

    /// O corpus de treino não produziu nenhuma sentença.
    #[error("corpus de treino vazio")]
    EmptyCorpus,
}
