use lossy_surprisal::{symbols, DistortionPolicy, LossyContextModel, Pcfg};
use tracing_subscriber::EnvFilter;

/// Hindi relative clause grammar (Husain et al., experiment 1).
fn hindi_grammar(
    p_src: f64,
    p_src_local: f64,
    p_obj_elision: f64,
    p_orc_local: f64,
    p_subj_elision: f64,
) -> String {
    format!(
        "
        RC -> SRC [{p_src}] | ORC [{}]
        SRC -> 'RPErg' InnerSRC [{}] | 'RPErg' 'V' [{p_obj_elision}]
        InnerSRC -> 'DO' 'V' [{}] | 'V' 'DO' [{p_src_local}]
        ORC -> 'RPAcc' InnerORC [{}] | 'RPAcc' 'V' [{p_subj_elision}]
        InnerORC -> 'Subj' 'V' [{}] | 'V' 'Subj' [{p_orc_local}]
        ",
        1.0 - p_src,
        1.0 - p_obj_elision,
        1.0 - p_src_local,
        1.0 - p_subj_elision,
        1.0 - p_orc_local,
    )
}

/// Per-word difficulty of Hindi relative clauses under several memory models.
///
/// Usage: cargo run --example hindi
///
/// Set `RUST_LOG=lossy_surprisal=trace` to see every distortion and
/// reconstruction considered.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let grammar: Pcfg = match hindi_grammar(0.6, 0.3, 0.2, 0.1, 0.4).parse() {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Invalid grammar: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = grammar.validate() {
        eprintln!("Invalid grammar: {e}");
        std::process::exit(1);
    }

    let sentences = [
        ("SRC local", symbols(["RPErg", "V", "DO"])),
        ("SRC non-local", symbols(["RPErg", "DO", "V"])),
        ("ORC local", symbols(["RPAcc", "V", "Subj"])),
        ("ORC non-local", symbols(["RPAcc", "Subj", "V"])),
    ];

    let policies = [
        ("surprisal", DistortionPolicy::Identity),
        ("uniform deletion 0.2", DistortionPolicy::uniform_deletion(0.2)),
        ("recency 0.95 / 0.6", DistortionPolicy::recency_weighted(0.95, 0.6)),
    ];

    let mut model = LossyContextModel::new(&grammar, DistortionPolicy::Identity, None);
    println!("Language has {} records", model.language().len());

    for (policy_name, policy) in policies {
        model.set_policy(policy);
        println!("\n=== {policy_name} ===");

        for (label, sentence) in &sentences {
            match model.sequence_processing_difficulty(sentence) {
                Ok(values) => {
                    let cells: Vec<String> = sentence
                        .iter()
                        .zip(&values)
                        .map(|(word, d)| format!("{word}={d:.3}"))
                        .collect();
                    println!("{label:>14}: {}", cells.join("  "));
                }
                Err(e) => eprintln!("{label}: {e}"),
            }
        }
    }
}
