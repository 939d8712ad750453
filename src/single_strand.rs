use crate::{
    ENZYMES,
    annotation::{Annotation, AnnotationEdit},
    base_modification::{BaseModification, BaseModificationEdit},
    error::{NucError, Result},
    methylation_sites::{MethylationMode, MethylationSites},
    new_id,
    nucleic_acid::{complement, reverse, validate_sequence},
    restriction_enzyme::{CutSite, RestrictionEnzyme},
};
use itertools::Itertools;
use log::debug;
use nucsim_protocol::{
    AnnotationSpec, BaseModificationSpec, NucleicAcidKind, StrandDirection, StrandSpec,
};
use serde::Serialize;
use serde_with::serde_as;
use std::{
    collections::{BTreeMap, HashSet},
    ops::{Range, RangeInclusive},
};

type DNAstring = Vec<u8>;

/// Whether a strand may be mutated on its own, or only through its double strand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum StrandOwnership {
    #[default]
    Independent,
    OwnedByPair,
}

#[serde_as]
#[derive(Clone, Debug, Serialize)]
pub struct SingleStrandSequence {
    id: String,
    sequence: String,
    kind: NucleicAcidKind,
    circular: bool,
    direction: StrandDirection,
    note: String,
    ownership: StrandOwnership,
    annotations: BTreeMap<String, Annotation>,
    base_modifications: BTreeMap<usize, BaseModification>,
    #[serde_as(as = "Vec<(_, _)>")]
    cut_sites: BTreeMap<(usize, String), CutSite>,
    track_cut_sites: bool,
}

impl SingleStrandSequence {
    /// A strand without annotations or modifications. Cut sites are scanned
    /// and kept up to date.
    pub fn new(
        sequence: &str,
        kind: NucleicAcidKind,
        circular: bool,
        direction: StrandDirection,
        note: &str,
    ) -> Result<Self> {
        let mut ret = Self::bare(sequence, kind, circular, direction, note)?;
        ret.scan_cut_sites();
        Ok(ret)
    }

    pub fn from_sequence(sequence: &str) -> Result<Self> {
        Self::new(
            sequence,
            NucleicAcidKind::Dna,
            false,
            StrandDirection::Forward,
            "",
        )
    }

    /// Creates a strand with its annotations and modifications. Any invalid
    /// entry aborts construction.
    pub fn from_spec(spec: StrandSpec) -> Result<Self> {
        let mut ret = Self::bare(
            &spec.sequence,
            spec.kind,
            spec.circular,
            spec.direction,
            &spec.note,
        )?;
        ret.add_annotations(&spec.annotations)?;
        ret.add_base_modifications(&spec.base_modifications)?;
        if spec.scan_cut_sites {
            ret.scan_cut_sites();
        }
        Ok(ret)
    }

    fn bare(
        sequence: &str,
        kind: NucleicAcidKind,
        circular: bool,
        direction: StrandDirection,
        note: &str,
    ) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            sequence: validate_sequence(sequence, kind)?,
            kind,
            circular,
            direction,
            note: note.to_string(),
            ownership: StrandOwnership::Independent,
            annotations: BTreeMap::new(),
            base_modifications: BTreeMap::new(),
            cut_sites: BTreeMap::new(),
            track_cut_sites: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn kind(&self) -> NucleicAcidKind {
        self.kind
    }

    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn direction(&self) -> StrandDirection {
        self.direction
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
    }

    pub fn ownership(&self) -> StrandOwnership {
        self.ownership
    }

    pub fn is_owned_by_pair(&self) -> bool {
        self.ownership == StrandOwnership::OwnedByPair
    }

    pub(crate) fn set_ownership(&mut self, ownership: StrandOwnership) {
        self.ownership = ownership;
    }

    pub fn annotations(&self) -> &BTreeMap<String, Annotation> {
        &self.annotations
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.get(name)
    }

    pub fn base_modifications(&self) -> &BTreeMap<usize, BaseModification> {
        &self.base_modifications
    }

    pub fn base_modification(&self, position: usize) -> Option<&BaseModification> {
        self.base_modifications.get(&position)
    }

    pub fn cut_sites(&self) -> &BTreeMap<(usize, String), CutSite> {
        &self.cut_sites
    }

    pub fn cut_site(&self, start: usize, enzyme: &str) -> Option<&CutSite> {
        self.cut_sites.get(&(start, enzyme.to_string()))
    }

    pub fn cut_sites_at(&self, start: usize) -> Vec<&CutSite> {
        self.cut_sites
            .range((start, String::new())..)
            .take_while(|((s, _), _)| *s == start)
            .map(|(_, site)| site)
            .collect()
    }

    pub fn tracks_cut_sites(&self) -> bool {
        self.track_cut_sites
    }

    fn ensure_independent(&self, action: &str) -> Result<()> {
        if self.is_owned_by_pair() {
            return Err(NucError::State(format!(
                "Cannot {action} a strand owned by a double strand, use the double strand methods"
            )));
        }
        Ok(())
    }

    fn validate_annotation_batch(&self, specs: &[AnnotationSpec]) -> Result<Vec<Annotation>> {
        let mut names = HashSet::new();
        specs
            .iter()
            .map(|spec| {
                if !names.insert(spec.name.as_str()) {
                    return Err(NucError::Conflict(format!(
                        "Cannot add annotation, multiple annotations share the name {} in the provided list",
                        spec.name
                    )));
                }
                if self.annotations.contains_key(&spec.name) {
                    return Err(NucError::Conflict(format!(
                        "Cannot add annotation {}, an annotation with the same name already exists",
                        spec.name
                    )));
                }
                Annotation::validated(&self.id, self.len(), self.circular, spec.clone())
            })
            .collect()
    }

    pub fn add_annotations(&mut self, specs: &[AnnotationSpec]) -> Result<()> {
        let batch = self.validate_annotation_batch(specs)?;
        for annotation in batch {
            self.annotations
                .insert(annotation.name().to_string(), annotation);
        }
        Ok(())
    }

    /// Replaces annotation `name` with an edited copy, re-validating it.
    pub fn edit_annotation(&mut self, name: &str, edit: &AnnotationEdit) -> Result<()> {
        let current = self.annotations.get(name).ok_or_else(|| {
            NucError::NotFound(format!("Annotation with name {name} does not exist"))
        })?;
        let spec = edit.apply_to(current);
        if spec.name != name && self.annotations.contains_key(&spec.name) {
            return Err(NucError::Conflict(format!(
                "Cannot change annotation name to {} as it already exists",
                spec.name
            )));
        }
        let updated = Annotation::validated(&self.id, self.len(), self.circular, spec)?;
        self.annotations.remove(name);
        self.annotations
            .insert(updated.name().to_string(), updated);
        Ok(())
    }

    pub fn remove_annotations<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if let Some(missing) = names
            .iter()
            .find(|name| !self.annotations.contains_key(name.as_ref()))
        {
            return Err(NucError::NotFound(format!(
                "Annotation with name {} does not exist",
                missing.as_ref()
            )));
        }
        for name in names {
            self.annotations.remove(name.as_ref());
        }
        Ok(())
    }

    pub fn remove_all_annotations(&mut self) {
        self.annotations.clear();
    }

    fn validate_modification_batch(
        &self,
        specs: &[BaseModificationSpec],
    ) -> Result<Vec<BaseModification>> {
        let mut positions = HashSet::new();
        specs
            .iter()
            .map(|spec| {
                if !positions.insert(spec.position) {
                    return Err(NucError::Conflict(format!(
                        "Cannot add base modification, multiple base modifications share position {} in the provided list",
                        spec.position
                    )));
                }
                if self.base_modifications.contains_key(&spec.position) {
                    return Err(NucError::Conflict(format!(
                        "Cannot add base modification, one already exists at position {}",
                        spec.position
                    )));
                }
                BaseModification::validated(&self.id, &self.sequence, spec.clone())
            })
            .collect()
    }

    pub fn add_base_modifications(&mut self, specs: &[BaseModificationSpec]) -> Result<()> {
        let batch = self.validate_modification_batch(specs)?;
        for modification in batch {
            self.base_modifications
                .insert(modification.position(), modification);
        }
        self.refresh_cut_sites();
        Ok(())
    }

    pub fn edit_base_modification(
        &mut self,
        position: usize,
        edit: &BaseModificationEdit,
    ) -> Result<()> {
        let current = self.base_modifications.get(&position).ok_or_else(|| {
            NucError::NotFound(format!(
                "Base modification with position {position} does not exist"
            ))
        })?;
        let spec = edit.apply_to(current);
        if spec.position != position && self.base_modifications.contains_key(&spec.position) {
            return Err(NucError::Conflict(format!(
                "Cannot change base modification position to {} as it already exists",
                spec.position
            )));
        }
        let updated = BaseModification::validated(&self.id, &self.sequence, spec)?;
        self.base_modifications.remove(&position);
        self.base_modifications
            .insert(updated.position(), updated);
        self.refresh_cut_sites();
        Ok(())
    }

    pub fn remove_base_modifications(&mut self, positions: &[usize]) -> Result<()> {
        if let Some(missing) = positions
            .iter()
            .find(|pos| !self.base_modifications.contains_key(pos))
        {
            return Err(NucError::NotFound(format!(
                "Base modification with position {missing} does not exist"
            )));
        }
        for pos in positions {
            self.base_modifications.remove(pos);
        }
        self.refresh_cut_sites();
        Ok(())
    }

    pub fn remove_all_base_modifications(&mut self) {
        self.base_modifications.clear();
        self.refresh_cut_sites();
    }

    /// Adds Dam/Dcm methylation marks, skipping already modified positions.
    /// Returns the number of modifications added.
    pub fn methylate(&mut self, mode: MethylationMode) -> Result<usize> {
        if self.kind != NucleicAcidKind::Dna {
            return Err(NucError::Validation(
                "Dam/Dcm methylation applies to DNA only".to_string(),
            ));
        }
        let sites = MethylationSites::new_from_sequence(self.sequence.as_bytes(), self.circular, mode);
        let specs = sites
            .sites()
            .iter()
            .filter(|site| !self.base_modifications.contains_key(&site.position))
            .map(|site| BaseModificationSpec::new(site.position, site.modification_type))
            .unique_by(|spec| spec.position)
            .collect_vec();
        self.add_base_modifications(&specs)?;
        Ok(specs.len())
    }

    /// Scans the active enzyme table and keeps cut sites up to date from now on.
    pub fn scan_cut_sites(&mut self) {
        self.track_cut_sites = true;
        self.refresh_cut_sites();
    }

    /// Replaces the cut sites with a one-shot scan of `enzymes`. Automatic
    /// updates stop, so the result is not overwritten by the active table.
    pub fn scan_cut_sites_with(&mut self, enzymes: &[RestrictionEnzyme]) {
        self.track_cut_sites = false;
        self.cut_sites = self.find_cut_sites(enzymes);
    }

    pub fn clear_cut_sites(&mut self) {
        self.track_cut_sites = false;
        self.cut_sites.clear();
    }

    /// Records a single cut site of a known enzyme, checking the motif at `start`.
    pub fn add_cut_site(&mut self, start: usize, enzyme: &str) -> Result<()> {
        let re = ENZYMES.by_name(enzyme).ok_or_else(|| {
            NucError::Validation(format!(
                "{enzyme} is not a recognized restriction enzyme, options are {}",
                ENZYMES.names().join(", ")
            ))
        })?;
        let site = re.site_at(self, start)?;
        self.cut_sites.insert((start, re.name.clone()), site);
        Ok(())
    }

    fn refresh_cut_sites(&mut self) {
        if self.track_cut_sites {
            self.cut_sites = self.find_cut_sites(ENZYMES.restriction_enzymes());
        }
    }

    /// Motif occurrences with no base modification in `[start, start + motif length]`.
    fn find_cut_sites(&self, enzymes: &[RestrictionEnzyme]) -> BTreeMap<(usize, String), CutSite> {
        let ret: BTreeMap<_, _> = enzymes
            .iter()
            .flat_map(|re| re.get_sites(self))
            .filter(|site| {
                !self
                    .base_modifications
                    .keys()
                    .any(|pos| site.window_contains(*pos, self.len()))
            })
            .map(|site| ((site.start(), site.enzyme().to_string()), site))
            .collect();
        debug!(
            "Strand {}: {} cut sites from {} enzymes",
            self.id,
            ret.len(),
            enzymes.len()
        );
        ret
    }

    pub fn change_strand_direction(&mut self) -> Result<()> {
        self.ensure_independent("change the direction of")?;
        self.direction = self.direction.flipped();
        Ok(())
    }

    fn replace_sequence(&mut self, sequence: String, flip_direction: bool) {
        if flip_direction {
            self.direction = self.direction.flipped();
        }
        self.remove_all_annotations();
        self.base_modifications.clear();
        self.sequence = sequence;
        self.refresh_cut_sites();
    }

    /// Reverses the sequence. Annotations and base modifications are dropped.
    pub fn reverse(&mut self, flip_direction: bool) -> Result<()> {
        self.ensure_independent("reverse")?;
        let sequence = reverse(&self.sequence);
        self.replace_sequence(sequence, flip_direction);
        Ok(())
    }

    /// Complements the sequence. Annotations and base modifications are dropped.
    pub fn complement(&mut self, flip_direction: bool) -> Result<()> {
        self.ensure_independent("complement")?;
        let sequence = complement(&self.sequence, self.kind)?;
        self.replace_sequence(sequence, flip_direction);
        Ok(())
    }

    pub fn reverse_complement(&mut self, flip_direction: bool) -> Result<()> {
        self.ensure_independent("reverse complement")?;
        let sequence = complement(&reverse(&self.sequence), self.kind)?;
        self.replace_sequence(sequence, flip_direction);
        Ok(())
    }

    pub fn set_circular(&mut self) -> Result<()> {
        self.ensure_independent("set circular")?;
        if self.circular {
            return Err(NucError::State("circular is already true".to_string()));
        }
        self.circular = true;
        self.refresh_cut_sites();
        Ok(())
    }

    /// Linearizes the strand, dropping annotations that wrap the origin.
    pub fn remove_circular(&mut self) -> Result<()> {
        self.ensure_independent("remove circular from")?;
        if !self.circular {
            return Err(NucError::State("circular is already false".to_string()));
        }
        self.circular = false;
        self.annotations.retain(|_, annotation| !annotation.wraps_origin());
        self.refresh_cut_sites();
        Ok(())
    }

    /// A value copy with a fresh identifier, independent of any double strand.
    pub fn copy(&self) -> Self {
        let id = new_id();
        Self {
            annotations: self
                .annotations
                .iter()
                .map(|(name, a)| (name.clone(), a.reparented(&id)))
                .collect(),
            base_modifications: self
                .base_modifications
                .iter()
                .map(|(pos, m)| (*pos, m.reparented(&id)))
                .collect(),
            cut_sites: self
                .cut_sites
                .iter()
                .map(|(key, site)| (key.clone(), site.reparented(&id)))
                .collect(),
            ownership: StrandOwnership::Independent,
            id,
            ..self.clone()
        }
    }

    /// Base at `i`; positions wrap modulo the length on circular strands.
    #[inline(always)]
    pub fn get_base_safe(&self, i: usize) -> Option<u8> {
        let i = if self.is_circular() {
            i.checked_rem(self.len())?
        } else {
            i
        };
        self.sequence.as_bytes().get(i).copied()
    }

    pub fn get_inclusive_range_safe(&self, range: RangeInclusive<usize>) -> Option<DNAstring> {
        let end = range.end().checked_add(1)?;
        self.get_range_safe(*range.start()..end)
    }

    /// Bases in `range`, at most one full turn. Circular strands read across
    /// the origin, linear strands give `None` past the last base.
    pub fn get_range_safe(&self, range: Range<usize>) -> Option<DNAstring> {
        if range.is_empty() || range.len() > self.len() {
            return None;
        }
        range.map(|i| self.get_base_safe(i)).collect()
    }
}

/// Copies every annotation of `source` lying inside `[lower, upper]` onto
/// `target`, shifted by `shift`. `upper` defaults to the target length.
/// Annotations wrapping the origin are skipped. All copies are validated
/// before any is added.
pub fn transfer_annotations<'a>(
    source: impl IntoIterator<Item = &'a Annotation>,
    target: &mut SingleStrandSequence,
    lower: usize,
    upper: Option<usize>,
    shift: isize,
) -> Result<()> {
    let upper = upper.unwrap_or(target.len());
    let moved = |pos: usize, name: &str| {
        pos.checked_add_signed(shift).ok_or_else(|| {
            NucError::Validation(format!(
                "Cannot transfer annotation {name}, shifted position is negative"
            ))
        })
    };
    let specs = source
        .into_iter()
        .filter(|a| !a.wraps_origin() && lower <= a.start() && a.end() <= upper)
        .map(|a| {
            Ok(AnnotationSpec::new(
                a.name(),
                moved(a.start(), a.name())?,
                moved(a.end(), a.name())?,
            )
            .with_note(a.note()))
        })
        .collect::<Result<Vec<_>>>()?;
    target.add_annotations(&specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nucsim_protocol::BaseModificationType;

    const CUT_SEQUENCE: &str = "ATGCGGAATTCTAGCATGCAAATT";

    fn strand(sequence: &str, kind: NucleicAcidKind, circular: bool) -> SingleStrandSequence {
        SingleStrandSequence::new(sequence, kind, circular, StrandDirection::Forward, "").unwrap()
    }

    fn annotated() -> SingleStrandSequence {
        let mut spec = StrandSpec::new("ATGCGNNNNNTAA");
        spec.annotations = vec![
            AnnotationSpec::new("Gene1", 0, 3).with_note("This is Gene1"),
            AnnotationSpec::new("random_barcode", 5, 9).with_note("This is a random barcode"),
        ];
        SingleStrandSequence::from_spec(spec).unwrap()
    }

    #[test]
    fn test_make_ss_dna() {
        let dna = strand("atgcgtaa", NucleicAcidKind::Dna, false);
        assert_eq!(dna.sequence(), "ATGCGTAA");
        assert_eq!(dna.kind(), NucleicAcidKind::Dna);
        assert!(!dna.is_circular());
        assert_eq!(dna.direction(), StrandDirection::Forward);
        assert_eq!(dna.ownership(), StrandOwnership::Independent);
        assert_eq!(dna.id().len(), 32);

        let rna = strand("AUGCGUAA", NucleicAcidKind::Rna, true);
        assert!(rna.is_circular());
    }

    #[test]
    fn test_invalid_sequences() {
        for (sequence, kind) in [
            ("", NucleicAcidKind::Dna),
            ("ATBZ", NucleicAcidKind::Dna),
            ("ATGCUA", NucleicAcidKind::Dna),
            ("AUGCTA", NucleicAcidKind::Rna),
        ] {
            assert!(matches!(
                SingleStrandSequence::new(sequence, kind, false, StrandDirection::Forward, ""),
                Err(NucError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_annotations() {
        let dna = annotated();
        let gene = dna.annotation("Gene1").unwrap();
        assert_eq!((gene.start(), gene.end()), (0, 3));
        assert_eq!(gene.note(), "This is Gene1");
        assert_eq!(gene.parent_id(), dna.id());
        assert_eq!(dna.annotation("random_barcode").unwrap().end(), 9);
    }

    #[test]
    fn test_add_annotations_is_atomic() {
        let mut dna = annotated();
        let err = dna
            .add_annotations(&[
                AnnotationSpec::new("new", 1, 2),
                AnnotationSpec::new("Gene1", 1, 2),
            ])
            .unwrap_err();
        assert!(matches!(err, NucError::Conflict(_)));
        assert!(dna.annotation("new").is_none());

        let err = dna
            .add_annotations(&[AnnotationSpec::new("a", 1, 2), AnnotationSpec::new("a", 3, 4)])
            .unwrap_err();
        assert!(matches!(err, NucError::Conflict(_)));

        let err = dna
            .add_annotations(&[AnnotationSpec::new("b", 1, 2), AnnotationSpec::new("c", 4, 2)])
            .unwrap_err();
        assert!(matches!(err, NucError::Validation(_)));
        assert_eq!(dna.annotations().len(), 2);
    }

    #[test]
    fn test_edit_and_remove_annotations() {
        let mut dna = annotated();
        dna.edit_annotation("Gene1", &AnnotationEdit::default().start(1).end(4))
            .unwrap();
        assert_eq!(dna.annotation("Gene1").unwrap().start(), 1);
        assert_eq!(dna.annotation("Gene1").unwrap().note(), "This is Gene1");

        dna.edit_annotation("Gene1", &AnnotationEdit::default().name("Gene2"))
            .unwrap();
        assert!(dna.annotation("Gene1").is_none());
        assert_eq!(dna.annotation("Gene2").unwrap().end(), 4);

        assert!(matches!(
            dna.edit_annotation("Gene2", &AnnotationEdit::default().name("random_barcode")),
            Err(NucError::Conflict(_))
        ));
        assert!(matches!(
            dna.edit_annotation("missing", &AnnotationEdit::default()),
            Err(NucError::NotFound(_))
        ));
        assert!(matches!(
            dna.edit_annotation("Gene2", &AnnotationEdit::default().end(40)),
            Err(NucError::Validation(_))
        ));
        assert_eq!(dna.annotation("Gene2").unwrap().end(), 4);

        assert!(matches!(
            dna.remove_annotations(&["Gene2", "missing"]),
            Err(NucError::NotFound(_))
        ));
        assert_eq!(dna.annotations().len(), 2);
        dna.remove_annotations(&["Gene2"]).unwrap();
        assert_eq!(dna.annotations().len(), 1);
        dna.remove_all_annotations();
        assert!(dna.annotations().is_empty());
    }

    #[test]
    fn test_base_modifications() {
        let mut spec = StrandSpec::new("ATGCGNNNNNTAA");
        spec.base_modifications = vec![
            BaseModificationSpec::new(3, BaseModificationType::C5Methyl),
            BaseModificationSpec::new(0, BaseModificationType::A6Methyl),
        ];
        let mut dna = SingleStrandSequence::from_spec(spec).unwrap();
        assert_eq!(
            dna.base_modification(3).unwrap().modification_type(),
            BaseModificationType::C5Methyl
        );
        assert_eq!(dna.base_modification(0).unwrap().base(), 'A');

        dna.edit_base_modification(
            3,
            &BaseModificationEdit::default().modification_type(BaseModificationType::C5Hydroxymethyl),
        )
        .unwrap();
        assert_eq!(
            dna.base_modification(3).unwrap().modification_type(),
            BaseModificationType::C5Hydroxymethyl
        );
        assert!(matches!(
            dna.edit_base_modification(3, &BaseModificationEdit::default().position(0)),
            Err(NucError::Conflict(_))
        ));
        assert!(matches!(
            dna.edit_base_modification(3, &BaseModificationEdit::default().position(1)),
            Err(NucError::Validation(_))
        ));
        assert!(matches!(
            dna.add_base_modifications(&[BaseModificationSpec::new(
                0,
                BaseModificationType::A6Methyl
            )]),
            Err(NucError::Conflict(_))
        ));
        assert!(matches!(
            dna.remove_base_modifications(&[7]),
            Err(NucError::NotFound(_))
        ));
        dna.remove_all_base_modifications();
        assert!(dna.base_modifications().is_empty());
    }

    #[test]
    fn test_cut_sites() {
        let dna = SingleStrandSequence::from_sequence(CUT_SEQUENCE).unwrap();
        let eco_ri = dna.cut_site(5, "EcoRI").unwrap();
        assert_eq!(eco_ri.end(), 10);
        assert_eq!(eco_ri.cut_position(), 6);
        assert_eq!(eco_ri.recognition_sequence(), "GAATTC");
        let sph_i = dna.cut_sites_at(13);
        assert_eq!(sph_i.len(), 1);
        assert_eq!(sph_i[0].enzyme(), "SphI");
        assert_eq!(sph_i[0].end(), 18);
        assert_eq!(sph_i[0].cut_position(), 18);
        assert_eq!(dna.cut_sites().len(), 2);
    }

    #[test]
    fn test_cut_sites_with_base_modifications() {
        let mut spec = StrandSpec::new(CUT_SEQUENCE);
        spec.base_modifications = vec![
            BaseModificationSpec::new(10, BaseModificationType::C5Methyl),
            BaseModificationSpec::new(0, BaseModificationType::A6Methyl),
        ];
        let dna = SingleStrandSequence::from_spec(spec).unwrap();
        assert!(dna.cut_site(5, "EcoRI").is_none());
        assert_eq!(dna.cut_site(13, "SphI").unwrap().cut_position(), 18);
    }

    #[test]
    fn test_cut_sites_follow_base_modification_edits() {
        let mut dna = SingleStrandSequence::from_sequence(CUT_SEQUENCE).unwrap();
        dna.add_base_modifications(&[
            BaseModificationSpec::new(10, BaseModificationType::C5Methyl),
            BaseModificationSpec::new(0, BaseModificationType::A6Methyl),
        ])
        .unwrap();
        dna.edit_base_modification(0, &BaseModificationEdit::default().position(15))
            .unwrap();
        dna.remove_base_modifications(&[10]).unwrap();

        let eco_ri = dna.cut_site(5, "EcoRI").unwrap();
        assert_eq!((eco_ri.start(), eco_ri.end()), (5, 10));
        assert_eq!(eco_ri.cut_position(), 6);
        assert!(dna.cut_site(13, "SphI").is_none());
    }

    #[test]
    fn test_cut_site_tracking() {
        let mut dna = SingleStrandSequence::from_sequence(CUT_SEQUENCE).unwrap();
        dna.clear_cut_sites();
        assert!(dna.cut_sites().is_empty());
        dna.add_cut_site(5, "EcoRI").unwrap();
        assert!(matches!(
            dna.add_cut_site(6, "EcoRI"),
            Err(NucError::Validation(_))
        ));
        assert!(matches!(
            dna.add_cut_site(5, "FooI"),
            Err(NucError::Validation(_))
        ));
        dna.scan_cut_sites_with(&[RestrictionEnzyme::new("SphI", "GCATGC", 5)]);
        assert_eq!(dna.cut_sites().len(), 1);
        dna.scan_cut_sites();
        assert_eq!(dna.cut_sites().len(), 2);

        let mut spec = StrandSpec::new(CUT_SEQUENCE);
        spec.scan_cut_sites = false;
        let dna = SingleStrandSequence::from_spec(spec).unwrap();
        assert!(!dna.tracks_cut_sites());
        assert!(dna.cut_sites().is_empty());
    }

    #[test]
    fn test_strand_operations_clear_annotations() {
        let mut dna = annotated();
        dna.add_base_modifications(&[BaseModificationSpec::new(
            3,
            BaseModificationType::C5Methyl,
        )])
        .unwrap();
        dna.reverse(false).unwrap();
        assert_eq!(dna.sequence(), "AATNNNNNGCGTA");
        assert!(dna.annotations().is_empty());
        assert!(dna.base_modifications().is_empty());
        assert_eq!(dna.direction(), StrandDirection::Forward);

        dna.complement(true).unwrap();
        assert_eq!(dna.sequence(), "TTANNNNNCGCAT");
        assert_eq!(dna.direction(), StrandDirection::Reverse);

        dna.reverse_complement(true).unwrap();
        assert_eq!(dna.sequence(), "ATGCGNNNNNTAA");
        assert_eq!(dna.direction(), StrandDirection::Forward);
    }

    #[test]
    fn test_rna_complement() {
        let mut rna = strand("AUGC", NucleicAcidKind::Rna, false);
        rna.complement(false).unwrap();
        assert_eq!(rna.sequence(), "UACG");
    }

    #[test]
    fn test_owned_strand_is_locked() {
        let mut dna = annotated();
        dna.set_ownership(StrandOwnership::OwnedByPair);
        assert!(matches!(dna.reverse(false), Err(NucError::State(_))));
        assert!(matches!(dna.complement(false), Err(NucError::State(_))));
        assert!(matches!(dna.reverse_complement(false), Err(NucError::State(_))));
        assert!(matches!(dna.set_circular(), Err(NucError::State(_))));
        assert!(matches!(dna.change_strand_direction(), Err(NucError::State(_))));
        assert_eq!(dna.sequence(), "ATGCGNNNNNTAA");
        assert_eq!(dna.annotations().len(), 2);
        // Annotation edits stay allowed.
        dna.remove_annotations(&["Gene1"]).unwrap();
    }

    #[test]
    fn test_circularity() {
        let mut dna = strand("ATGCGTAATAAGC", NucleicAcidKind::Dna, false);
        dna.set_circular().unwrap();
        assert!(matches!(dna.set_circular(), Err(NucError::State(_))));
        dna.add_annotations(&[
            AnnotationSpec::new("wrap", 10, 2),
            AnnotationSpec::new("plain", 2, 10),
        ])
        .unwrap();
        dna.remove_circular().unwrap();
        assert!(dna.annotation("wrap").is_none());
        assert!(dna.annotation("plain").is_some());
        assert!(matches!(dna.remove_circular(), Err(NucError::State(_))));
    }

    #[test]
    fn test_copy() {
        let mut dna = annotated();
        dna.set_ownership(StrandOwnership::OwnedByPair);
        let copy = dna.copy();
        assert_ne!(copy.id(), dna.id());
        assert_eq!(copy.sequence(), dna.sequence());
        assert_eq!(copy.annotations().len(), 2);
        assert_eq!(copy.annotation("Gene1").unwrap().parent_id(), copy.id());
        assert!(!copy.is_owned_by_pair());
    }

    #[test]
    fn test_methylate() {
        let mut dna = SingleStrandSequence::from_sequence("AAGGATCCAA").unwrap();
        assert!(dna.cut_site(2, "BamHI").is_some());
        assert_eq!(dna.methylate(MethylationMode::default()).unwrap(), 1);
        assert_eq!(
            dna.base_modification(4).unwrap().modification_type(),
            BaseModificationType::A6Methyl
        );
        assert!(dna.cut_site(2, "BamHI").is_none());
        assert_eq!(dna.methylate(MethylationMode::default()).unwrap(), 0);

        let mut rna = strand("CCAGG", NucleicAcidKind::Rna, false);
        assert!(matches!(
            rna.methylate(MethylationMode::default()),
            Err(NucError::Validation(_))
        ));
    }

    #[test]
    fn test_transfer_annotations() {
        let source = annotated();
        let mut target = strand("GGATGCGNNNNNTAA", NucleicAcidKind::Dna, false);
        transfer_annotations(source.annotations().values(), &mut target, 0, Some(5), 2).unwrap();
        assert_eq!(target.annotations().len(), 1);
        let gene = target.annotation("Gene1").unwrap();
        assert_eq!((gene.start(), gene.end()), (2, 5));
        assert_eq!(gene.parent_id(), target.id());

        assert!(matches!(
            transfer_annotations(source.annotations().values(), &mut target, 5, None, -6),
            Err(NucError::Validation(_))
        ));
    }

    #[test]
    fn test_transfer_skips_wrapping_annotations() {
        let mut source = strand("ATGCGTAATAAGC", NucleicAcidKind::Dna, true);
        source
            .add_annotations(&[AnnotationSpec::new("ori", 10, 2), AnnotationSpec::new("gene", 1, 5)])
            .unwrap();
        let mut target = strand("ATGCGTAATAAGC", NucleicAcidKind::Dna, false);
        transfer_annotations(source.annotations().values(), &mut target, 0, None, 0).unwrap();
        assert!(target.annotation("ori").is_none());
        assert!(target.annotation("gene").is_some());
    }

    #[test]
    fn test_get_base_safe() {
        let mut dna = SingleStrandSequence::from_sequence("ATGC").unwrap();
        assert_eq!(dna.get_base_safe(0), Some(b'A'));
        assert_eq!(dna.get_base_safe(3), Some(b'C'));
        assert_eq!(dna.get_base_safe(4), None);

        dna.set_circular().unwrap();
        assert_eq!(dna.get_base_safe(4), Some(b'A'));
    }

    #[test]
    fn test_range_access() {
        let mut dna = SingleStrandSequence::from_sequence("ATGCGT").unwrap();
        assert_eq!(dna.get_range_safe(0..6), Some(b"ATGCGT".to_vec()));
        assert_eq!(dna.get_range_safe(2..4), Some(b"GC".to_vec()));
        assert_eq!(dna.get_range_safe(4..7), None);
        assert_eq!(dna.get_range_safe(3..3), None);
        assert_eq!(dna.get_inclusive_range_safe(1..=2), Some(b"TG".to_vec()));
        assert_eq!(dna.get_inclusive_range_safe(5..=6), None);

        dna.set_circular().unwrap();
        assert_eq!(dna.get_range_safe(6..12), Some(b"ATGCGT".to_vec()));
        assert_eq!(dna.get_range_safe(4..8), Some(b"GTAT".to_vec()));
        assert_eq!(dna.get_inclusive_range_safe(5..=6), Some(b"TA".to_vec()));
        // Longer than one turn.
        assert_eq!(dna.get_range_safe(0..7), None);
    }

    #[test]
    fn test_range_access_bounds() {
        let mut dna = SingleStrandSequence::from_sequence("ATGC").unwrap();
        assert_eq!(dna.get_base_safe(usize::MAX), None);
        assert_eq!(dna.get_inclusive_range_safe(0..=usize::MAX), None);
        assert_eq!(dna.get_inclusive_range_safe(usize::MAX..=usize::MAX), None);
        assert_eq!(dna.get_range_safe(usize::MAX - 1..usize::MAX), None);

        dna.set_circular().unwrap();
        assert_eq!(dna.get_base_safe(usize::MAX), Some(b'C'));
        assert_eq!(dna.get_inclusive_range_safe(0..=usize::MAX), None);
        assert_eq!(dna.get_inclusive_range_safe(usize::MAX..=usize::MAX), None);
        assert_eq!(
            dna.get_range_safe(usize::MAX - 2..usize::MAX),
            Some(b"TG".to_vec())
        );
    }
}
