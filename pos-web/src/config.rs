//! Configuração por linha de comando / variáveis de ambiente.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser};
use pos_core::{fixture, Alignment, Corpus, HmmModel, PosError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Origem do modelo: corpus de treino ou o modelo de exercício embutido.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Arquivo de sentenças de treino (uma por linha)
    #[arg(long, env = "POS_TRAIN_WORDS")]
    pub train_words: Option<PathBuf>,

    /// Arquivo de tags de treino, alinhado linha a linha com `--train-words`
    #[arg(long, env = "POS_TRAIN_TAGS")]
    pub train_tags: Option<PathBuf>,

    /// Arquivo de sentenças de teste para o relatório de acurácia
    #[arg(long, env = "POS_TEST_WORDS")]
    pub test_words: Option<PathBuf>,

    /// Arquivo de tags de teste
    #[arg(long, env = "POS_TEST_TAGS")]
    pub test_tags: Option<PathBuf>,

    /// Rejeita linhas com quantidades diferentes de palavras e tags
    #[arg(long, env = "POS_STRICT")]
    pub strict: bool,

    /// Usa o modelo de exercício embutido em vez de treinar
    #[arg(long)]
    pub fixture: bool,
}

impl ModelArgs {
    pub fn alignment(&self) -> Alignment {
        if self.strict {
            Alignment::Strict
        } else {
            Alignment::Lenient
        }
    }

    /// Treina o modelo a partir do corpus configurado.
    ///
    /// Sem corpus configurado (ou com `--fixture`) devolve o modelo de exercício.
    pub fn load_model(&self) -> pos_core::Result<HmmModel> {
        let (words, tags) = match (&self.train_words, &self.train_tags, self.fixture) {
            (Some(w), Some(t), false) => (w, t),
            (_, _, true) => {
                info!("usando o modelo de exercício embutido");
                return Ok(fixture::drill_model());
            }
            _ => {
                warn!("corpus de treino não configurado; usando o modelo de exercício");
                return Ok(fixture::drill_model());
            }
        };

        info!(words = %words.display(), tags = %tags.display(), "carregando corpus de treino");
        let corpus = Corpus::open(words, tags, self.alignment())?;
        if corpus.is_empty() {
            return Err(PosError::EmptyCorpus);
        }
        Ok(HmmModel::train(&corpus.sentences))
    }

    /// Corpus de teste, se ambos os arquivos foram configurados.
    pub fn load_test_corpus(&self) -> pos_core::Result<Option<Corpus>> {
        match (&self.test_words, &self.test_tags) {
            (Some(w), Some(t)) => Ok(Some(Corpus::open(w, t, self.alignment())?)),
            _ => Ok(None),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pos-web", about = "Servidor web do etiquetador POS (HMM + Viterbi)")]
pub struct ServerArgs {
    /// Endereço de escuta
    #[arg(long, env = "POS_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Parser, Debug)]
#[command(name = "pos-console", about = "Etiquetador POS interativo no terminal")]
pub struct ConsoleArgs {
    /// Mostra a acurácia de cada linha no relatório de teste
    #[arg(long)]
    pub by_line: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Inicializa o `tracing` respeitando `RUST_LOG` (padrão: `info`), escrevendo em stderr.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_fixture() {
        let args = ServerArgs::try_parse_from(["pos-web"]).unwrap();
        assert_eq!(args.addr.port(), 3000);
        assert_eq!(args.model.alignment(), Alignment::Lenient);
        let model = args.model.load_model().unwrap();
        assert_eq!(model.tag_count(), 4);
    }

    #[test]
    fn test_console_flags() {
        let args = ConsoleArgs::try_parse_from(["pos-console", "--by-line", "--strict", "--fixture"]).unwrap();
        assert!(args.by_line);
        assert_eq!(args.model.alignment(), Alignment::Strict);
        assert!(args.model.load_test_corpus().unwrap().is_none());
    }

    #[test]
    fn test_missing_corpus_file_is_io_error() {
        let args = ModelArgs {
            train_words: Some(PathBuf::from("/nonexistent/words.txt")),
            train_tags: Some(PathBuf::from("/nonexistent/tags.txt")),
            ..Default::default()
        };
        assert!(matches!(args.load_model(), Err(PosError::Io(_))));
    }
}
