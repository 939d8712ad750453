use crate::{
    annotation::Annotation, double_strand::DoubleStrandSequence,
    single_strand::SingleStrandSequence,
};
use nucsim_protocol::{MapFeature, SequenceMap};

const PALETTE: [&str; 16] = [
    "#7fdbff", "#0074d9", "#2ecc40", "#ffdc00", "#ff851b", "#01ff70", "#f012be", "#b10dc9",
    "#ff4136", "#85144b", "#39cccc", "#3d9970", "#001f3f", "#aaaaaa", "#ffffff", "#dddddd",
];

fn feature(annotation: &Annotation, strand: i8, index: usize) -> MapFeature {
    let label = match annotation.note() {
        "" => annotation.name().to_string(),
        note => format!("{}, {note}", annotation.name()),
    };
    MapFeature {
        label,
        start: annotation.start(),
        end: annotation.end(),
        strand,
        color: PALETTE[index % PALETTE.len()].to_string(),
    }
}

impl SingleStrandSequence {
    /// One feature per annotation, in name order.
    pub fn sequence_map(&self) -> SequenceMap {
        let strand = self.direction().sign();
        SequenceMap {
            length: self.len(),
            circular: self.is_circular(),
            features: self
                .annotations()
                .values()
                .enumerate()
                .map(|(index, annotation)| feature(annotation, strand, index))
                .collect(),
        }
    }
}

impl DoubleStrandSequence {
    /// Forward strand features (+1) followed by reverse strand features (-1),
    /// colored as one sequence.
    pub fn sequence_map(&self) -> SequenceMap {
        let features = self
            .forward_strand()
            .annotations()
            .values()
            .map(|annotation| (annotation, 1))
            .chain(
                self.reverse_strand()
                    .annotations()
                    .values()
                    .map(|annotation| (annotation, -1)),
            )
            .enumerate()
            .map(|(index, (annotation, strand))| feature(annotation, strand, index))
            .collect();
        SequenceMap {
            length: self.len(),
            circular: self.is_circular(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nucsim_protocol::{AnnotationSpec, NucleicAcidKind, StrandDirection};

    #[test]
    fn test_single_strand_map() {
        let mut strand = SingleStrandSequence::new(
            "ATGCGTAATAAGC",
            NucleicAcidKind::Dna,
            true,
            StrandDirection::Reverse,
            "",
        )
        .unwrap();
        strand
            .add_annotations(&[
                AnnotationSpec::new("promoter", 0, 5).with_note("strong"),
                AnnotationSpec::new("site", 6, 9),
            ])
            .unwrap();
        let map = strand.sequence_map();
        assert_eq!(map.length, 13);
        assert!(map.circular);
        assert_eq!(map.features.len(), 2);
        assert_eq!(map.features[0].label, "promoter, strong");
        assert_eq!(map.features[0].strand, -1);
        assert_eq!(map.features[0].color, "#7fdbff");
        assert_eq!(map.features[1].label, "site");
        assert_eq!((map.features[1].start, map.features[1].end), (6, 9));
        assert_eq!(map.features[1].color, "#0074d9");
    }

    #[test]
    fn test_double_strand_map() {
        let mut ds = DoubleStrandSequence::new(
            "ATGCGTAA",
            NucleicAcidKind::Dna,
            false,
            "",
            Some("TACGCATTAAAAA".into()),
            None,
        )
        .unwrap();
        ds.add_annotations(StrandDirection::Forward, &[AnnotationSpec::new("fwd", 0, 3)])
            .unwrap();
        ds.add_annotations(StrandDirection::Reverse, &[AnnotationSpec::new("rev", 8, 11)])
            .unwrap();
        let map = ds.sequence_map();
        assert_eq!(map.length, 13);
        assert!(!map.circular);
        let strands: Vec<i8> = map.features.iter().map(|f| f.strand).collect();
        assert_eq!(strands, vec![1, -1]);
        assert_eq!(map.features[1].color, "#0074d9");
    }
}
