use crate::{
    error::{NucError, Result},
    nucleic_acid::reverse_complement,
    single_strand::SingleStrandSequence,
};
use nucsim_protocol::NucleicAcidKind;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    pub name: String,
    pub sequence: String,
    pub note: Option<String>,
    /// Cleavage point, relative to the first base of the recognition motif.
    pub cut: usize,
    #[serde(skip_serializing, default)]
    is_palindromic: bool,
}

/// One occurrence of a recognition motif on a strand. `end` is inclusive;
/// on circular strands `end` and `cut_position` wrap modulo the length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CutSite {
    parent_id: String,
    start: usize,
    end: usize,
    cut_position: usize,
    recognition_sequence: String,
    enzyme: String,
}

impl CutSite {
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn cut_position(&self) -> usize {
        self.cut_position
    }

    pub fn recognition_sequence(&self) -> &str {
        &self.recognition_sequence
    }

    pub fn enzyme(&self) -> &str {
        &self.enzyme
    }

    pub(crate) fn reparented(&self, parent_id: &str) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            ..self.clone()
        }
    }

    /// True if `position` lies in `[start, start + motif length]`.
    pub fn window_contains(&self, position: usize, strand_len: usize) -> bool {
        let span = self.recognition_sequence.len();
        if position >= self.start {
            position - self.start <= span
        } else {
            // Only reachable on circular strands where the window wraps.
            self.start + span >= strand_len && position <= self.start + span - strand_len
        }
    }
}

impl RestrictionEnzyme {
    pub fn new(name: &str, sequence: &str, cut: usize) -> Self {
        let mut ret = Self {
            name: name.to_string(),
            sequence: sequence.to_ascii_uppercase(),
            note: None,
            cut,
            is_palindromic: false,
        };
        ret.check_palindromic();
        ret
    }

    pub fn check_palindromic(&mut self) {
        self.is_palindromic = reverse_complement(&self.sequence, NucleicAcidKind::Dna)
            .is_ok_and(|rc| rc == self.sequence);
    }

    pub fn is_palindromic(&self) -> bool {
        self.is_palindromic
    }

    fn site(&self, strand: &SingleStrandSequence, start: usize) -> CutSite {
        let len = strand.len();
        let wrap = |pos: usize| if strand.is_circular() { pos % len } else { pos };
        CutSite {
            parent_id: strand.id().to_string(),
            start,
            end: wrap(start + self.sequence.len() - 1),
            cut_position: wrap(start + self.cut),
            recognition_sequence: self.sequence.clone(),
            enzyme: self.name.clone(),
        }
    }

    fn matches_at(&self, strand: &SingleStrandSequence, start: usize) -> bool {
        strand
            .get_range_safe(start..start.saturating_add(self.sequence.len()))
            .is_some_and(|found| found == self.sequence.as_bytes())
    }

    /// Builds the cut site at `start`, failing if the motif is not found there.
    pub fn site_at(&self, strand: &SingleStrandSequence, start: usize) -> Result<CutSite> {
        if start >= strand.len() || !self.matches_at(strand, start) {
            let found = strand
                .get_range_safe(start..start.saturating_add(self.sequence.len()))
                .map(|s| String::from_utf8_lossy(&s).to_string())
                .unwrap_or_default();
            return Err(NucError::Validation(format!(
                "Cannot add restriction site, sequence for {} is {}, found '{found}' at {start}",
                self.name, self.sequence
            )));
        }
        Ok(self.site(strand, start))
    }

    /// All exact occurrences of the recognition motif, in ascending start order.
    /// Circular strands also report occurrences spanning the origin.
    pub fn get_sites(&self, strand: &SingleStrandSequence) -> Vec<CutSite> {
        let recognition_len = self.sequence.len();
        if recognition_len == 0 || recognition_len > strand.len() {
            return vec![];
        }
        let last_start = if strand.is_circular() {
            strand.len()
        } else {
            strand.len() - recognition_len + 1
        };
        (0..last_start)
            .filter(|start| self.matches_at(strand, *start))
            .map(|start| self.site(strand, start))
            .collect()
    }
}
