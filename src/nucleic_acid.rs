//! Stateless sequence primitives.

use crate::{
    error::{NucError, Result},
    iupac_code::IupacCode,
};
use nucsim_protocol::NucleicAcidKind;

pub fn reverse(sequence: &str) -> String {
    sequence.chars().rev().collect()
}

/// Per-symbol IUPAC complement; the `T` bit is written as `U` for RNA.
pub fn complement(sequence: &str, kind: NucleicAcidKind) -> Result<String> {
    sequence
        .bytes()
        .map(|letter| {
            IupacCode::letter_complement(letter, kind)
                .map(char::from)
                .ok_or_else(|| {
                    NucError::Validation(format!(
                        "Cannot complement '{}', not an IUPAC nucleotide code",
                        char::from(letter)
                    ))
                })
        })
        .collect()
}

pub fn reverse_complement(sequence: &str, kind: NucleicAcidKind) -> Result<String> {
    complement(&reverse(sequence), kind)
}

/// Uppercases `sequence` and checks it against the IUPAC alphabet and `kind`.
pub fn validate_sequence(sequence: &str, kind: NucleicAcidKind) -> Result<String> {
    let sequence = sequence.to_ascii_uppercase();
    if sequence.is_empty() {
        return Err(NucError::Validation(
            "Cannot make sequence from an empty string".to_string(),
        ));
    }
    if let Some(bad) = sequence.bytes().find(|b| !IupacCode::is_valid_letter(*b)) {
        return Err(NucError::Validation(format!(
            "Cannot make sequence, invalid nucleotide '{}' found in sequence: {sequence}",
            char::from(bad)
        )));
    }
    match kind {
        NucleicAcidKind::Dna if sequence.contains('U') => Err(NucError::Validation(
            "Cannot be nucleic acid kind DNA when U in sequence".to_string(),
        )),
        NucleicAcidKind::Rna if sequence.contains('T') => Err(NucError::Validation(
            "Cannot be nucleic acid kind RNA when T in sequence".to_string(),
        )),
        _ => Ok(sequence),
    }
}
