use lossy_surprisal::{
    load_language, save_language, symbols, DistortionPolicy, LossyContextModel, Pcfg,
};
use std::env;
use std::path::Path;

/// Recency-weighted parameter sweep over a Russian relative clause grammar.
///
/// Usage: cargo run --example sweep [language-file]
///
/// With a file argument the enumerated language is saved there and reloaded
/// before sweeping, exercising the flat text format.
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [language-file]", args[0]);
        std::process::exit(1);
    }

    let grammar: Pcfg = match "
        RC -> SRC [0.58] | ORC [0.42]
        SRC -> SRCRP 'V' 'DO' [0.99] | SRCRP 'DO' 'V' [0.01]
        SRCRP -> 'RPNom' [0.9] | 'chto' [0.1]
        ORC -> ORCRP 'V' 'Subj' [0.36] | ORCRP 'Subj' 'V' [0.64]
        ORCRP -> 'RPAcc' [0.83] | 'chto' [0.17]
    "
    .parse()
    {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Invalid grammar: {e}");
            std::process::exit(1);
        }
    };

    let mut model = LossyContextModel::new(&grammar, DistortionPolicy::recency_weighted(1.0, 1.0), None);

    if let Some(path) = args.get(1) {
        let path = Path::new(path);
        let reloaded = save_language(model.language(), path).and_then(|()| load_language(path));
        match reloaded {
            Ok(language) => {
                println!("Reloaded {} records from {}", language.len(), path.display());
                model = LossyContextModel::from_language(language, *model.policy());
            }
            Err(e) => {
                eprintln!("Language file error: {e}");
                std::process::exit(1);
            }
        }
    }

    let sentences = [
        ("SRC non-local", symbols(["RPNom", "DO", "V"])),
        ("ORC non-local", symbols(["RPAcc", "Subj", "V"])),
        ("ambiguous ORC", symbols(["chto", "Subj", "V"])),
    ];

    println!("{:>10} {:>8}  difficulty at the verb", "retention", "falloff");
    for retention in [1.0, 0.95, 0.9, 0.8] {
        for falloff in [1.0, 0.8, 0.6, 0.4] {
            model.policy_mut().set_max_retention_probability(retention);
            model.policy_mut().set_rate_falloff(falloff);

            let cells: Vec<String> = sentences
                .iter()
                .map(|(label, sentence)| match model.processing_difficulty(sentence) {
                    Ok(d) => format!("{label}={d:.3}"),
                    Err(e) => format!("{label}=error({e})"),
                })
                .collect();
            println!("{retention:>10.2} {falloff:>8.2}  {}", cells.join("  "));
        }
    }
}
