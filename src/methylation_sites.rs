use nucsim_protocol::BaseModificationType;

/// Which methyltransferases are active: Dam (`GATC`) and Dcm (`CCWGG`).
#[derive(Clone, Debug, PartialEq)]
pub struct MethylationMode {
    dcm: bool,
    dam: bool,
}

impl MethylationMode {
    pub fn new(dam: bool, dcm: bool) -> Self {
        Self { dcm, dam }
    }

    pub fn dcm(&self) -> bool {
        self.dcm
    }

    pub fn dam(&self) -> bool {
        self.dam
    }

}

impl Default for MethylationMode {
    fn default() -> Self {
        Self {
            dcm: true,
            dam: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethylationSite {
    pub position: usize,
    pub modification_type: BaseModificationType,
}

#[derive(Clone, Debug, Default)]
pub struct MethylationSites {
    sites: Vec<MethylationSite>,
}

impl MethylationSites {
    /// Dam methylates the A of `GATC` (6-mA), Dcm the inner C of `CCWGG` (5-mC).
    pub fn new_from_sequence(sequence: &[u8], circular: bool, mode: MethylationMode) -> Self {
        let mut ret = Self::default();
        let get = |pos: usize| Self::get_nucleotide(sequence, pos, circular);
        for pos in 0..sequence.len() {
            if mode.dam() {
                let bases = [get(pos), get(pos + 1), get(pos + 2), get(pos + 3)];
                if bases == ['G', 'A', 'T', 'C'] {
                    ret.push(pos + 1, sequence.len(), BaseModificationType::A6Methyl);
                    continue; // No need to check DCM, site is already added
                }
            }

            if mode.dcm() {
                let bases = [
                    get(pos),
                    get(pos + 1),
                    get(pos + 2), // W=A|T
                    get(pos + 3),
                    get(pos + 4),
                ];
                if bases == ['C', 'C', 'A', 'G', 'G'] || bases == ['C', 'C', 'T', 'G', 'G'] {
                    ret.push(pos + 1, sequence.len(), BaseModificationType::C5Methyl);
                }
            }
        }
        ret
    }

    fn push(&mut self, position: usize, len: usize, modification_type: BaseModificationType) {
        self.sites.push(MethylationSite {
            position: position % len,
            modification_type,
        });
    }

    #[inline(always)]
    fn get_nucleotide(sequence: &[u8], pos: usize, circular: bool) -> char {
        let pos = if circular && !sequence.is_empty() {
            pos % sequence.len()
        } else {
            pos
        };
        sequence.get(pos).map_or('N', |c| *c as char)
    }

    #[inline(always)]
    pub fn sites(&self) -> &[MethylationSite] {
        &self.sites
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(sites: &MethylationSites) -> Vec<usize> {
        sites.sites().iter().map(|site| site.position).collect()
    }

    #[test]
    fn test_methylation_sites() {
        let sequence = b"CCAGGATCCAGG";
        let mode = MethylationMode {
            dcm: true,
            dam: true,
        };
        let sites = MethylationSites::new_from_sequence(sequence, false, mode);
        assert_eq!(positions(&sites), vec![1, 5, 8]);
        assert_eq!(
            sites.sites()[1].modification_type,
            BaseModificationType::A6Methyl
        );
        assert_eq!(
            sites.sites()[0].modification_type,
            BaseModificationType::C5Methyl
        );
    }

    #[test]
    fn test_methylation_modes() {
        let sequence = b"CCAGGATCCAGG";
        let dam_only = MethylationSites::new_from_sequence(
            sequence,
            false,
            MethylationMode::new(true, false),
        );
        assert_eq!(positions(&dam_only), vec![5]);
        let dcm_only = MethylationSites::new_from_sequence(
            sequence,
            false,
            MethylationMode::new(false, true),
        );
        assert_eq!(positions(&dcm_only), vec![1, 8]);
    }

    #[test]
    fn test_circular_sites() {
        // GATC spans the origin: G at 6, A at 7, T at 0, C at 1.
        let sequence = b"TCAAAAGA";
        let linear = MethylationSites::new_from_sequence(sequence, false, MethylationMode::default());
        assert!(linear.sites().is_empty());
        let circular = MethylationSites::new_from_sequence(sequence, true, MethylationMode::default());
        assert_eq!(positions(&circular), vec![7]);
    }
}
