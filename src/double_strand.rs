use crate::{
    annotation::AnnotationEdit,
    base_modification::BaseModificationEdit,
    error::{NucError, Result},
    new_id,
    nucleic_acid::complement,
    single_strand::{SingleStrandSequence, StrandOwnership},
};
use nucsim_protocol::{
    AnnotationSpec, BaseModificationSpec, DuplexSpec, NucleicAcidKind, StrandDirection,
    StrandInputSpec,
};
use serde::Serialize;
use std::ops::{Deref, DerefMut};

/// A strand handed to a double strand: either a bare sequence or a built strand.
#[derive(Clone, Debug)]
pub enum StrandInput {
    Raw(String),
    Strand(SingleStrandSequence),
}

impl From<&str> for StrandInput {
    fn from(sequence: &str) -> Self {
        Self::Raw(sequence.to_string())
    }
}

impl From<String> for StrandInput {
    fn from(sequence: String) -> Self {
        Self::Raw(sequence)
    }
}

impl From<SingleStrandSequence> for StrandInput {
    fn from(strand: SingleStrandSequence) -> Self {
        Self::Strand(strand)
    }
}

impl StrandInput {
    fn from_spec(spec: StrandInputSpec) -> Result<Self> {
        Ok(match spec {
            StrandInputSpec::Raw(sequence) => Self::Raw(sequence),
            StrandInputSpec::Strand(spec) => Self::Strand(SingleStrandSequence::from_spec(spec)?),
        })
    }

    fn len(&self) -> usize {
        match self {
            Self::Raw(sequence) => sequence.len(),
            Self::Strand(strand) => strand.len(),
        }
    }

    fn into_strand(
        self,
        direction: StrandDirection,
        kind: NucleicAcidKind,
        circular: bool,
    ) -> Result<SingleStrandSequence> {
        match self {
            Self::Raw(sequence) => SingleStrandSequence::new(&sequence, kind, circular, direction, ""),
            Self::Strand(strand) if strand.direction() != direction => {
                Err(NucError::Validation(format!(
                    "Cannot use a strand with incorrect direction, expected {direction}"
                )))
            }
            Self::Strand(strand) => Ok(strand),
        }
    }
}

/// Marks a child strand `Independent` for as long as it lives and restores
/// the previous ownership on drop, including on early returns.
struct Unlocked<'a> {
    strand: &'a mut SingleStrandSequence,
    previous: StrandOwnership,
}

impl<'a> Unlocked<'a> {
    fn new(strand: &'a mut SingleStrandSequence) -> Self {
        let previous = strand.ownership();
        strand.set_ownership(StrandOwnership::Independent);
        Self { strand, previous }
    }
}

impl Deref for Unlocked<'_> {
    type Target = SingleStrandSequence;

    fn deref(&self) -> &Self::Target {
        &*self.strand
    }
}

impl DerefMut for Unlocked<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.strand
    }
}

impl Drop for Unlocked<'_> {
    fn drop(&mut self) {
        self.strand.set_ownership(self.previous);
    }
}

fn with_unlocked<T>(
    forward: &mut SingleStrandSequence,
    reverse: &mut SingleStrandSequence,
    f: impl FnOnce(&mut SingleStrandSequence, &mut SingleStrandSequence) -> Result<T>,
) -> Result<T> {
    let mut forward = Unlocked::new(forward);
    let mut reverse = Unlocked::new(reverse);
    f(&mut *forward, &mut *reverse)
}

/// Two strands and the offset of the reverse strand's first base relative to
/// the forward strand's 5' end. A negative offset is a 5' overhang of the
/// reverse strand.
#[derive(Clone, Debug, Serialize)]
pub struct DoubleStrandSequence {
    id: String,
    forward: SingleStrandSequence,
    reverse: SingleStrandSequence,
    reverse_offset: i64,
    kind: NucleicAcidKind,
    circular: bool,
    note: String,
}

impl DoubleStrandSequence {
    /// Without `reverse`, the reverse strand is the exact complement of
    /// `forward` at offset 0.
    pub fn new(
        forward: impl Into<StrandInput>,
        kind: NucleicAcidKind,
        circular: bool,
        note: &str,
        reverse: Option<StrandInput>,
        reverse_offset: Option<i64>,
    ) -> Result<Self> {
        let forward = forward.into();
        Self::validate_kind(&forward, reverse.as_ref(), kind)?;
        Self::validate_circular(&forward, reverse.as_ref(), reverse_offset, circular)?;
        if reverse.is_none() && reverse_offset.is_some() {
            return Err(NucError::State(
                "Cannot set a reverse offset if no reverse sequence is provided".to_string(),
            ));
        }

        let mut forward = forward.into_strand(StrandDirection::Forward, kind, circular)?;
        let (mut reverse, reverse_offset) = match reverse {
            Some(reverse) => {
                let reverse = reverse.into_strand(StrandDirection::Reverse, kind, circular)?;
                let offset = Self::validate_offset(reverse_offset.unwrap_or(0), &forward, &reverse)?;
                (reverse, offset)
            }
            None => {
                let mut reverse = SingleStrandSequence::new(
                    &complement(forward.sequence(), kind)?,
                    kind,
                    circular,
                    StrandDirection::Reverse,
                    "",
                )?;
                if !forward.tracks_cut_sites() {
                    reverse.clear_cut_sites();
                }
                (reverse, 0)
            }
        };
        forward.set_ownership(StrandOwnership::OwnedByPair);
        reverse.set_ownership(StrandOwnership::OwnedByPair);
        Ok(Self {
            id: new_id(),
            forward,
            reverse,
            reverse_offset,
            kind,
            circular,
            note: note.to_string(),
        })
    }

    pub fn from_sequence(forward: &str) -> Result<Self> {
        Self::new(forward, NucleicAcidKind::Dna, false, "", None, None)
    }

    pub fn from_spec(spec: DuplexSpec) -> Result<Self> {
        let reverse = spec.reverse.map(StrandInput::from_spec).transpose()?;
        Self::new(
            StrandInput::from_spec(spec.forward)?,
            spec.kind,
            spec.circular,
            &spec.note,
            reverse,
            spec.reverse_offset,
        )
    }

    fn validate_kind(
        forward: &StrandInput,
        reverse: Option<&StrandInput>,
        kind: NucleicAcidKind,
    ) -> Result<()> {
        let mismatched = [("forward", Some(forward)), ("reverse", reverse)]
            .into_iter()
            .filter_map(|(label, input)| match input {
                Some(StrandInput::Strand(strand)) if strand.kind() != kind => Some(label),
                _ => None,
            })
            .collect::<Vec<_>>();
        if !mismatched.is_empty() {
            return Err(NucError::Validation(format!(
                "{} sequence nucleic acid kind(s) don't equal the double strand kind {kind}",
                mismatched.join(" and ")
            )));
        }
        Ok(())
    }

    fn validate_circular(
        forward: &StrandInput,
        reverse: Option<&StrandInput>,
        reverse_offset: Option<i64>,
        circular: bool,
    ) -> Result<()> {
        let mismatched = [("forward", Some(forward)), ("reverse", reverse)]
            .into_iter()
            .filter_map(|(label, input)| match input {
                Some(StrandInput::Strand(strand)) if strand.is_circular() != circular => {
                    Some(label)
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        if !mismatched.is_empty() {
            return Err(NucError::Validation(format!(
                "{} sequence circular value(s) don't equal the double strand circular value",
                mismatched.join(" and ")
            )));
        }
        if circular {
            let reverse_len = reverse.map_or(forward.len(), StrandInput::len);
            Self::validate_circular_shape(forward.len(), reverse_len, reverse_offset.unwrap_or(0))?;
        }
        Ok(())
    }

    fn validate_circular_shape(forward_len: usize, reverse_len: usize, offset: i64) -> Result<()> {
        if forward_len != reverse_len {
            return Err(NucError::Validation(
                "Cannot be circular when the reverse sequence length differs from the forward sequence length"
                    .to_string(),
            ));
        }
        if offset != 0 {
            return Err(NucError::Validation(
                "Cannot be circular when the reverse offset is not 0".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_offset(
        offset: i64,
        forward: &SingleStrandSequence,
        reverse: &SingleStrandSequence,
    ) -> Result<i64> {
        if offset >= forward.len() as i64 {
            return Err(NucError::Validation(format!(
                "Reverse offset {offset} must be less than the forward sequence length {}",
                forward.len()
            )));
        }
        if offset <= -(reverse.len() as i64) {
            return Err(NucError::Validation(format!(
                "Reverse offset {offset} must be greater than the negative reverse sequence length {}",
                reverse.len()
            )));
        }
        Ok(offset)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn forward_strand(&self) -> &SingleStrandSequence {
        &self.forward
    }

    pub fn reverse_strand(&self) -> &SingleStrandSequence {
        &self.reverse
    }

    pub fn strand(&self, direction: StrandDirection) -> &SingleStrandSequence {
        match direction {
            StrandDirection::Forward => &self.forward,
            StrandDirection::Reverse => &self.reverse,
        }
    }

    // Children are never handed out mutably, so a strand can not be swapped
    // for one of another kind, shape or length.
    fn strand_mut(&mut self, direction: StrandDirection) -> &mut SingleStrandSequence {
        match direction {
            StrandDirection::Forward => &mut self.forward,
            StrandDirection::Reverse => &mut self.reverse,
        }
    }

    pub fn add_annotations(
        &mut self,
        direction: StrandDirection,
        specs: &[AnnotationSpec],
    ) -> Result<()> {
        self.strand_mut(direction).add_annotations(specs)
    }

    pub fn edit_annotation(
        &mut self,
        direction: StrandDirection,
        name: &str,
        edit: &AnnotationEdit,
    ) -> Result<()> {
        self.strand_mut(direction).edit_annotation(name, edit)
    }

    pub fn remove_annotations<S: AsRef<str>>(
        &mut self,
        direction: StrandDirection,
        names: &[S],
    ) -> Result<()> {
        self.strand_mut(direction).remove_annotations(names)
    }

    pub fn add_base_modifications(
        &mut self,
        direction: StrandDirection,
        specs: &[BaseModificationSpec],
    ) -> Result<()> {
        self.strand_mut(direction).add_base_modifications(specs)
    }

    pub fn edit_base_modification(
        &mut self,
        direction: StrandDirection,
        position: usize,
        edit: &BaseModificationEdit,
    ) -> Result<()> {
        self.strand_mut(direction)
            .edit_base_modification(position, edit)
    }

    pub fn remove_base_modifications(
        &mut self,
        direction: StrandDirection,
        positions: &[usize],
    ) -> Result<()> {
        self.strand_mut(direction)
            .remove_base_modifications(positions)
    }

    pub fn scan_cut_sites(&mut self) {
        self.forward.scan_cut_sites();
        self.reverse.scan_cut_sites();
    }

    pub fn clear_cut_sites(&mut self) {
        self.forward.clear_cut_sites();
        self.reverse.clear_cut_sites();
    }

    pub fn forward_sequence(&self) -> &str {
        self.forward.sequence()
    }

    pub fn reverse_sequence(&self) -> &str {
        self.reverse.sequence()
    }

    pub fn reverse_offset(&self) -> i64 {
        self.reverse_offset
    }

    pub fn kind(&self) -> NucleicAcidKind {
        self.kind
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
    }

    /// Length of the longer strand.
    pub fn len(&self) -> usize {
        self.forward.len().max(self.reverse.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flipped_offset(&self) -> i64 {
        -(self.reverse_offset - (self.forward.len() as i64 - self.reverse.len() as i64))
    }

    pub fn reverse(&mut self) -> Result<()> {
        with_unlocked(&mut self.forward, &mut self.reverse, |forward, reverse| {
            forward.reverse(false)?;
            reverse.reverse(false)
        })?;
        self.reverse_offset = self.flipped_offset();
        Ok(())
    }

    pub fn complement(&mut self) -> Result<()> {
        with_unlocked(&mut self.forward, &mut self.reverse, |forward, reverse| {
            forward.complement(false)?;
            reverse.complement(false)
        })
    }

    pub fn reverse_complement(&mut self) -> Result<()> {
        with_unlocked(&mut self.forward, &mut self.reverse, |forward, reverse| {
            forward.reverse_complement(false)?;
            reverse.reverse_complement(false)
        })?;
        self.reverse_offset = self.flipped_offset();
        Ok(())
    }

    pub fn set_circular(&mut self) -> Result<()> {
        if self.circular {
            return Err(NucError::State("circular is already true".to_string()));
        }
        Self::validate_circular_shape(self.forward.len(), self.reverse.len(), self.reverse_offset)?;
        with_unlocked(&mut self.forward, &mut self.reverse, |forward, reverse| {
            forward.set_circular()?;
            reverse.set_circular()
        })?;
        self.circular = true;
        Ok(())
    }

    pub fn remove_circular(&mut self) -> Result<()> {
        if !self.circular {
            return Err(NucError::State("circular is already false".to_string()));
        }
        with_unlocked(&mut self.forward, &mut self.reverse, |forward, reverse| {
            forward.remove_circular()?;
            reverse.remove_circular()
        })?;
        self.circular = false;
        Ok(())
    }

    /// Copies both strands with their annotations under fresh identifiers.
    pub fn copy(&self) -> Self {
        let mut forward = self.forward.copy();
        let mut reverse = self.reverse.copy();
        forward.set_ownership(StrandOwnership::OwnedByPair);
        reverse.set_ownership(StrandOwnership::OwnedByPair);
        Self {
            id: new_id(),
            forward,
            reverse,
            reverse_offset: self.reverse_offset,
            kind: self.kind,
            circular: self.circular,
            note: self.note.clone(),
        }
    }
}
