//! # Tags POS e Estados do HMM
//!
//! As tags (ex: `N`, `V`, `CNJ`, `NP`) são os **estados ocultos** do modelo.
//! Internamente cada tag recebe um identificador denso ([`TagId`]) para que as
//! tabelas de transição possam ser matrizes indexadas em vez de mapas aninhados.
//!
//! ## Estado inicial
//!
//! Toda sentença começa no estado sentinela `#`, que **não** é uma tag:
//! ele nunca emite palavras e nunca aparece na saída. Por isso ele é representado
//! pela variante [`State::Start`], distinta de qualquer [`State::Tag`].
//!
//! | Estado            | Índice na matriz | Emite palavras? |
//! |-------------------|------------------|-----------------|
//! | `State::Start`    | 0                | não             |
//! | `State::Tag(id)`  | `id + 1`         | sim             |

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Rótulo textual do estado sentinela (apenas para exibição).
pub const START_LABEL: &str = "#";

/// Identificador denso de uma tag dentro de um [`TagSet`].
///
/// A ordem dos ids segue a ordem lexicográfica dos rótulos, o que torna
/// o desempate do Viterbi determinístico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(pub(crate) usize);

impl TagId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Um estado da cadeia de Markov: o sentinela de início ou uma tag real.
///
/// A ordem derivada coloca `Start` antes de todas as tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum State {
    /// Sentinela `#` ("antes da primeira palavra").
    Start,
    /// Uma tag emitível.
    Tag(TagId),
}

impl State {
    /// Linha correspondente na matriz de transição.
    pub fn row(self) -> usize {
        match self {
            State::Start => 0,
            State::Tag(id) => id.0 + 1,
        }
    }

    pub fn tag(self) -> Option<TagId> {
        match self {
            State::Start => None,
            State::Tag(id) => Some(id),
        }
    }
}

impl From<TagId> for State {
    fn from(id: TagId) -> Self {
        State::Tag(id)
    }
}

/// Conjunto imutável de tags conhecidas, com mapeamento rótulo ↔ id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    labels: Vec<String>,
    ids: HashMap<String, TagId>,
}

impl TagSet {
    /// Constrói o conjunto a partir de rótulos quaisquer (duplicatas são ignoradas).
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // BTreeSet garante ids em ordem lexicográfica
        let sorted: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        let labels: Vec<String> = sorted.into_iter().collect();
        let ids = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), TagId(i)))
            .collect();
        Self { labels, ids }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Busca o id de um rótulo; `None` se a tag nunca foi vista.
    pub fn id(&self, label: &str) -> Option<TagId> {
        self.ids.get(label).copied()
    }

    pub fn label(&self, id: TagId) -> &str {
        &self.labels[id.0]
    }

    /// Rótulo de um estado, incluindo o sentinela `#`.
    pub fn state_label(&self, state: State) -> &str {
        match state {
            State::Start => START_LABEL,
            State::Tag(id) => self.label(id),
        }
    }

    /// Itera sobre todas as tags em ordem de id.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &str)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (TagId(i), l.as_str()))
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_lexicographic_order() {
        let tags = TagSet::from_labels(["V", "CNJ", "N", "NP", "V"]);
        assert_eq!(tags.len(), 4);
        let labels: Vec<&str> = tags.iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec!["CNJ", "N", "NP", "V"]);
        assert!(tags.id("CNJ").unwrap() < tags.id("V").unwrap());
    }

    #[test]
    fn test_unknown_label() {
        let tags = TagSet::from_labels(["N"]);
        assert_eq!(tags.id("ADJ"), None);
    }

    #[test]
    fn test_start_is_distinct_from_hash_tag() {
        // Uma tag literal "#" é uma tag comum, não o sentinela
        let tags = TagSet::from_labels(["#", "N"]);
        let hash = tags.id("#").unwrap();
        assert_ne!(State::Tag(hash), State::Start);
        assert_eq!(tags.state_label(State::Start), START_LABEL);
        assert_eq!(State::Start.row(), 0);
        assert_eq!(State::Tag(hash).row(), hash.index() + 1);
    }

    #[test]
    fn test_start_sorts_first() {
        assert!(State::Start < State::Tag(TagId(0)));
        assert!(State::Tag(TagId(0)) < State::Tag(TagId(1)));
    }
}
