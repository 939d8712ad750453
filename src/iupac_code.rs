use nucsim_protocol::NucleicAcidKind;

const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// A bitmasked IUPAC code for nucleotides, eg DNA_BITMASK_A|DNA_BITMASK_C.
/// `U` shares the `T` bit; the nucleic acid kind decides which letter is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        match letter.to_ascii_uppercase() {
            b'A' => Self(DNA_BITMASK_A),
            b'C' => Self(DNA_BITMASK_C),
            b'G' => Self(DNA_BITMASK_G),
            b'T' => Self(DNA_BITMASK_T),
            b'U' => Self(DNA_BITMASK_T),
            b'W' => Self(DNA_BITMASK_A | DNA_BITMASK_T),
            b'S' => Self(DNA_BITMASK_C | DNA_BITMASK_G),
            b'M' => Self(DNA_BITMASK_A | DNA_BITMASK_C),
            b'K' => Self(DNA_BITMASK_G | DNA_BITMASK_T),
            b'R' => Self(DNA_BITMASK_A | DNA_BITMASK_G),
            b'Y' => Self(DNA_BITMASK_C | DNA_BITMASK_T),
            b'B' => Self(DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T),
            b'D' => Self(DNA_BITMASK_A | DNA_BITMASK_G | DNA_BITMASK_T),
            b'H' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_T),
            b'V' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G),
            b'N' => Self(DNA_BITMASK_N),
            _ => Self(0),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        !Self::from_letter(letter).is_empty()
    }

    /// Swaps the A/T and C/G bits, so ambiguity codes complement as a set.
    #[inline(always)]
    pub fn complement(self) -> Self {
        let b = self.0;
        Self(
            ((b & DNA_BITMASK_A) << 3)
                | ((b & DNA_BITMASK_T) >> 3)
                | ((b & DNA_BITMASK_C) << 1)
                | ((b & DNA_BITMASK_G) >> 1),
        )
    }

    pub fn to_letter(self, kind: NucleicAcidKind) -> Option<u8> {
        let letter = match self.0 {
            1 => b'A',
            2 => b'C',
            3 => b'M',
            4 => b'G',
            5 => b'R',
            6 => b'S',
            7 => b'V',
            8 => match kind {
                NucleicAcidKind::Dna => b'T',
                NucleicAcidKind::Rna => b'U',
            },
            9 => b'W',
            10 => b'Y',
            11 => b'H',
            12 => b'K',
            13 => b'D',
            14 => b'B',
            15 => b'N',
            _ => return None,
        };
        Some(letter)
    }

    #[inline(always)]
    pub fn letter_complement(letter: u8, kind: NucleicAcidKind) -> Option<u8> {
        Self::from_letter(letter).complement().to_letter(kind)
    }
}
