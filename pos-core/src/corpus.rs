//! # Corpus Alinhado (palavras + tags)
//!
//! O treino usa dois arquivos de texto com o mesmo número de linhas:
//!
//! ```text
//! sentences.txt:  the dog saw the cat .
//! tags.txt:       DET N VD DET N .
//! ```
//!
//! A linha *i* de palavras corresponde à linha *i* de tags, token a token,
//! separados por espaço em branco. As palavras são normalizadas para minúsculas;
//! as tags são mantidas como estão.
//!
//! ## Alinhamento
//!
//! Por padrão ([`Alignment::Lenient`]) linhas com quantidades diferentes de tokens
//! são truncadas ao prefixo comum, sem erro. Com [`Alignment::Strict`] a leitura
//! falha com [`PosError::Misaligned`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PosError, Result};

/// Uma sentença com palavras e tags já alinhadas (mesmo comprimento).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignedSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl AlignedSentence {
    /// Alinha palavras e tags pelo índice, descartando o excedente de qualquer lado.
    pub fn new(mut words: Vec<String>, mut tags: Vec<String>) -> Self {
        let n = words.len().min(tags.len());
        words.truncate(n);
        tags.truncate(n);
        Self { words, tags }
    }

    /// Constrói a partir de uma linha de palavras e uma linha de tags.
    pub fn from_lines(words: &str, tags: &str) -> Self {
        Self::new(tokenize(words), split_tags(tags))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Pares `(palavra, tag)` na ordem da sentença.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .zip(self.tags.iter())
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }
}

/// Política para linhas com contagens de tokens diferentes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Processa só o prefixo comum e registra um aviso.
    #[default]
    Lenient,
    /// Rejeita a linha com [`PosError::Misaligned`].
    Strict,
}

/// Normaliza uma linha de texto em palavras: minúsculas, separadas por espaço.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_lowercase).collect()
}

/// Separa uma linha de tags por espaço em branco.
pub fn split_tags(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Coleção de sentenças alinhadas, pronta para treino ou avaliação.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    pub sentences: Vec<AlignedSentence>,
}

impl Corpus {
    /// Abre o par de arquivos (palavras, tags).
    pub fn open(words: impl AsRef<Path>, tags: impl AsRef<Path>, alignment: Alignment) -> Result<Self> {
        let words = BufReader::new(File::open(words)?);
        let tags = BufReader::new(File::open(tags)?);
        Self::from_readers(words, tags, alignment)
    }

    /// Lê as duas fontes em paralelo, linha a linha, até que uma delas termine.
    pub fn from_readers<W: BufRead, T: BufRead>(words: W, tags: T, alignment: Alignment) -> Result<Self> {
        let mut word_lines = words.lines();
        let mut tag_lines = tags.lines();
        let mut sentences = Vec::new();
        let mut line_no = 0;

        loop {
            let (w, t) = match (word_lines.next(), tag_lines.next()) {
                (Some(w), Some(t)) => (w?, t?),
                (None, None) => break,
                (Some(_), None) | (None, Some(_)) => {
                    warn!(line = line_no + 1, "arquivos de palavras e tags com número de linhas diferente");
                    break;
                }
            };
            line_no += 1;

            let word_tokens = tokenize(&w);
            let tag_tokens = split_tags(&t);
            if word_tokens.len() != tag_tokens.len() {
                match alignment {
                    Alignment::Strict => {
                        return Err(PosError::Misaligned {
                            line: line_no,
                            words: word_tokens.len(),
                            tags: tag_tokens.len(),
                        })
                    }
                    Alignment::Lenient => warn!(
                        line = line_no,
                        words = word_tokens.len(),
                        tags = tag_tokens.len(),
                        "linha desalinhada, usando o prefixo comum"
                    ),
                }
            }
            sentences.push(AlignedSentence::new(word_tokens, tag_tokens));
        }

        Ok(Self { sentences })
    }

    /// Constrói diretamente de pares de linhas em memória.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            sentences: pairs
                .into_iter()
                .map(|(w, t)| AlignedSentence::from_lines(w, t))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total de pares (palavra, tag).
    pub fn total_tokens(&self) -> usize {
        self.sentences.iter().map(AlignedSentence::len).sum()
    }
}
