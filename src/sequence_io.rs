use crate::{
    annotation::Annotation, error::Result, single_strand::SingleStrandSequence,
};
use bio::io::fasta;
use gb_io::seq::{Feature, Location, Seq, Topology};
use nucsim_protocol::{NucleicAcidKind, StrandDirection};
use std::fs::File;

impl SingleStrandSequence {
    /// Reads every record of a FASTA file as a linear forward strand.
    pub fn from_fasta_file(filename: &str) -> anyhow::Result<Vec<Self>> {
        let file = File::open(filename)?;
        let mut ret = vec![];
        for record in fasta::Reader::new(file).records() {
            ret.push(Self::from_fasta_record(&record?)?);
        }
        Ok(ret)
    }

    /// The record id (and description, if any) become the note. A sequence
    /// containing `U` is read as RNA.
    pub fn from_fasta_record(record: &fasta::Record) -> Result<Self> {
        let sequence = String::from_utf8_lossy(record.seq()).to_string();
        let kind = if sequence.bytes().any(|b| b.eq_ignore_ascii_case(&b'U')) {
            NucleicAcidKind::Rna
        } else {
            NucleicAcidKind::Dna
        };
        let note = match record.desc() {
            Some(desc) => format!("{} {desc}", record.id()),
            None => record.id().to_string(),
        };
        Self::new(&sequence, kind, false, StrandDirection::Forward, &note)
    }

    pub fn write_fasta_file(&self, filename: &str) -> anyhow::Result<()> {
        let mut writer = fasta::Writer::to_file(filename)?;
        let desc = (!self.note().is_empty()).then_some(self.note());
        writer.write(self.id(), desc, self.sequence().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn annotation_location(&self, annotation: &Annotation) -> Location {
        let location = if annotation.wraps_origin() {
            Location::Join(vec![
                Location::simple_range(annotation.start() as i64, self.len() as i64),
                Location::simple_range(0, annotation.end() as i64 + 1),
            ])
        } else {
            Location::simple_range(annotation.start() as i64, annotation.end() as i64 + 1)
        };
        match self.direction() {
            StrandDirection::Forward => location,
            StrandDirection::Reverse => Location::Complement(Box::new(location)),
        }
    }

    /// GenBank record of this strand; each annotation becomes a labelled
    /// `misc_feature`.
    pub fn to_genbank_seq(&self) -> Seq {
        let features = self
            .annotations()
            .values()
            .map(|annotation| {
                let mut qualifiers = vec![("label".into(), Some(annotation.name().to_string()))];
                if !annotation.note().is_empty() {
                    qualifiers.push(("note".into(), Some(annotation.note().to_string())));
                }
                Feature {
                    kind: "misc_feature".into(),
                    location: self.annotation_location(annotation),
                    qualifiers,
                }
            })
            .collect();
        Seq {
            name: Some(self.id().to_string()),
            topology: if self.is_circular() {
                Topology::Circular
            } else {
                Topology::Linear
            },
            date: None,
            len: Some(self.len()),
            molecule_type: Some(self.kind().to_string()),
            division: String::new(),
            definition: (!self.note().is_empty()).then(|| self.note().to_string()),
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: vec![],
            comments: vec![],
            seq: self.sequence().as_bytes().to_vec(),
            contig: None,
            features,
        }
    }

    pub fn write_genbank_file(&self, filename: &str) -> anyhow::Result<()> {
        let file = File::create(filename)?;
        gb_io::writer::write(file, &self.to_genbank_seq())?;
        Ok(())
    }
}
