use nucsim::{
    DoubleStrandSequence, NucError, SingleStrandSequence,
    engine::{Engine, EngineParameters, Reaction, ReactionEngine, Template},
    nucleic_acid::{complement, reverse, reverse_complement, validate_sequence},
    nucsim_protocol::{NucleicAcidKind, ReactionRequest, StrandSpec},
    restriction_enzyme::CutSite,
};
use serde::Serialize;
use std::{env, fs};

#[derive(Serialize)]
struct ComplementSummary {
    kind: NucleicAcidKind,
    sequence: String,
    complement: String,
    reverse: String,
    reverse_complement: String,
}

#[derive(Serialize)]
struct ScanSummary<'a> {
    length: usize,
    circular: bool,
    cut_sites: Vec<&'a CutSite>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  nucsim_cli --version\n  \
  nucsim_cli [--parameters PATH] capabilities\n  \
  nucsim_cli complement SEQUENCE [DNA|RNA]\n  \
  nucsim_cli scan SEQUENCE|'<strand-json>'\n  \
  nucsim_cli map SEQUENCE|'<strand-json>'\n  \
  nucsim_cli [--parameters PATH] pcr TEMPLATE FORWARD_PRIMER REVERSE_PRIMER\n  \
  nucsim_cli [--parameters PATH] reaction '<reaction-json>'\n\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

/// Domain errors leave the CLI as `{ "code": ..., "message": ... }`.
fn report(e: NucError) -> String {
    serde_json::to_string_pretty(&e.report()).unwrap_or_else(|_| e.to_string())
}

fn parse_global_parameters_arg(args: &[String]) -> Result<(EngineParameters, usize), String> {
    if args.len() >= 3 && args[1] == "--parameters" {
        let parameters = EngineParameters::load_from_path(&args[2]).map_err(|e| e.to_string())?;
        return Ok((parameters, 3));
    }
    Ok((EngineParameters::default(), 1))
}

/// A bare sequence, or a strand record given inline or as @file.
fn load_strand_arg(value: &str) -> Result<SingleStrandSequence, String> {
    if value.starts_with('{') || value.starts_with('@') {
        let json = load_json_arg(value)?;
        let spec: StrandSpec = serde_json::from_str(&json).map_err(|e| report(e.into()))?;
        SingleStrandSequence::from_spec(spec).map_err(report)
    } else {
        SingleStrandSequence::from_sequence(value).map_err(report)
    }
}

fn require_args(args: &[String], count: usize, message: &str) -> Result<(), String> {
    if args.len() < count {
        usage();
        return Err(message.to_string());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("nucsim {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let (parameters, cmd_idx) = parse_global_parameters_arg(&args)?;
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }
    let command = &args[cmd_idx];
    let rest = &args[cmd_idx + 1..];

    match command.as_str() {
        "capabilities" => print_json(&ReactionEngine::capabilities()),
        "complement" => {
            require_args(rest, 1, "complement requires a SEQUENCE")?;
            let kind = match rest.get(1) {
                Some(kind) => kind
                    .parse::<NucleicAcidKind>()
                    .map_err(|e| report(e.into()))?,
                None => NucleicAcidKind::Dna,
            };
            let sequence = validate_sequence(&rest[0], kind).map_err(report)?;
            print_json(&ComplementSummary {
                kind,
                complement: complement(&sequence, kind).map_err(report)?,
                reverse: reverse(&sequence),
                reverse_complement: reverse_complement(&sequence, kind).map_err(report)?,
                sequence,
            })
        }
        "scan" => {
            require_args(rest, 1, "scan requires a SEQUENCE or strand JSON")?;
            let strand = load_strand_arg(&rest[0])?;
            print_json(&ScanSummary {
                length: strand.len(),
                circular: strand.is_circular(),
                cut_sites: strand.cut_sites().values().collect(),
            })
        }
        "map" => {
            require_args(rest, 1, "map requires a SEQUENCE or strand JSON")?;
            print_json(&load_strand_arg(&rest[0])?.sequence_map())
        }
        "pcr" => {
            require_args(
                rest,
                3,
                "pcr requires: TEMPLATE FORWARD_PRIMER REVERSE_PRIMER",
            )?;
            let template = DoubleStrandSequence::from_sequence(&rest[0]).map_err(report)?;
            let reaction = Reaction::Pcr {
                template: Template::Double(template),
                forward_primer: load_strand_arg(&rest[1])?,
                reverse_primer: load_strand_arg(&rest[2])?,
                keep_primer_annotations: true,
            };
            let mut engine = ReactionEngine::with_parameters(parameters);
            print_json(&engine.run(reaction).map_err(report)?)
        }
        "reaction" => {
            require_args(rest, 1, "Missing reaction JSON")?;
            let json = load_json_arg(&rest[0])?;
            let request: ReactionRequest =
                serde_json::from_str(&json).map_err(|e| report(e.into()))?;
            let reaction = Reaction::from_request(request).map_err(report)?;
            let mut engine = ReactionEngine::with_parameters(parameters);
            print_json(&engine.run(reaction).map_err(report)?)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
