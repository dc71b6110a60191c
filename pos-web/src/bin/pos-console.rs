//! Console interativo: lê sentenças do stdin e imprime as tags, até `q` ou EOF.

use std::io::{self, BufRead, Write};

use clap::Parser;
use pos_core::{corpus::tokenize, decode, evaluate};
use pos_web::config::{init_tracing, ConsoleArgs};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = ConsoleArgs::parse();

    let model = args.model.load_model()?;
    info!(tags = %model.tags(), vocabulary = model.vocabulary_size(), "modelo pronto");

    if let Some(test) = args.model.load_test_corpus()? {
        let evaluation = evaluate(&model, &test.sentences);
        if args.by_line {
            for (i, acc) in evaluation.per_sentence.iter().enumerate() {
                println!("linha {}: {}", i + 1, acc);
            }
        }
        println!("{evaluation}\n");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Digite uma sentença. 'q' encerra.");
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == "q" {
            break;
        }
        let words = tokenize(&line);
        if words.is_empty() {
            continue;
        }
        let tags = decode(&model, &words);
        writeln!(stdout, "{}", tags.join(" "))?;
        stdout.flush()?;
    }
    Ok(())
}
