//! Machine-readable contracts shared by the nucsim library and its front ends.
//!
//! Everything here is plain data: enumerations with their canonical string
//! forms, request records accepted as JSON, and the feature tuples handed to
//! rendering collaborators.

use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, str::FromStr};

pub const PROTOCOL_VERSION: &str = "v1";

/// Raised when a string does not name a member of one of the enumerations below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
    pub options: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}', options are {}",
            self.field,
            self.value,
            self.options.join(", ")
        )
    }
}

impl Error for UnknownVariant {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NucleicAcidKind {
    #[default]
    #[serde(rename = "DNA")]
    Dna,
    #[serde(rename = "RNA")]
    Rna,
}

impl NucleicAcidKind {
    const NAMES: &'static [&'static str] = &["DNA", "RNA"];
}

impl fmt::Display for NucleicAcidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dna => write!(f, "DNA"),
            Self::Rna => write!(f, "RNA"),
        }
    }
}

impl FromStr for NucleicAcidKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DNA" => Ok(Self::Dna),
            "RNA" => Ok(Self::Rna),
            other => Err(UnknownVariant {
                field: "nucleic acid kind",
                value: other.to_string(),
                options: Self::NAMES,
            }),
        }
    }
}

/// Orientation of a single strand: 5'->3' as given, or the opposite strand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrandDirection {
    #[default]
    Forward,
    Reverse,
}

impl StrandDirection {
    const NAMES: &'static [&'static str] = &["forward", "reverse"];

    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// Strand sign used by sequence maps.
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

impl fmt::Display for StrandDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

impl FromStr for StrandDirection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "reverse" => Ok(Self::Reverse),
            other => Err(UnknownVariant {
                field: "strand direction",
                value: other.to_string(),
                options: Self::NAMES,
            }),
        }
    }
}

/// The base modification table. Each kind may only sit on its required base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseModificationType {
    #[serde(rename = "5-mC")]
    C5Methyl,
    #[serde(rename = "5-hmC")]
    C5Hydroxymethyl,
    #[serde(rename = "5-fC")]
    C5Formyl,
    #[serde(rename = "5-caC")]
    C5Carboxyl,
    #[serde(rename = "6-mA")]
    A6Methyl,
}

impl BaseModificationType {
    pub const ALL: [BaseModificationType; 5] = [
        Self::C5Methyl,
        Self::C5Hydroxymethyl,
        Self::C5Formyl,
        Self::C5Carboxyl,
        Self::A6Methyl,
    ];
    const NAMES: &'static [&'static str] = &["5-mC", "5-hmC", "5-fC", "5-caC", "6-mA"];

    pub fn required_base(self) -> char {
        match self {
            Self::C5Methyl | Self::C5Hydroxymethyl | Self::C5Formyl | Self::C5Carboxyl => 'C',
            Self::A6Methyl => 'A',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::C5Methyl => "5-mC",
            Self::C5Hydroxymethyl => "5-hmC",
            Self::C5Formyl => "5-fC",
            Self::C5Carboxyl => "5-caC",
            Self::A6Methyl => "6-mA",
        }
    }
}

impl fmt::Display for BaseModificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BaseModificationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                field: "base modification type",
                value: s.to_string(),
                options: Self::NAMES,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationSpec {
    pub name: String,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub note: String,
}

impl AnnotationSpec {
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseModificationSpec {
    pub position: usize,
    pub modification_type: BaseModificationType,
}

impl BaseModificationSpec {
    pub fn new(position: usize, modification_type: BaseModificationType) -> Self {
        Self {
            position,
            modification_type,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Everything needed to create a single strand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandSpec {
    pub sequence: String,
    #[serde(default)]
    pub kind: NucleicAcidKind,
    #[serde(default)]
    pub circular: bool,
    #[serde(default)]
    pub direction: StrandDirection,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
    #[serde(default)]
    pub base_modifications: Vec<BaseModificationSpec>,
    #[serde(default = "default_true")]
    pub scan_cut_sites: bool,
}

impl StrandSpec {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            kind: NucleicAcidKind::default(),
            circular: false,
            direction: StrandDirection::default(),
            note: String::new(),
            annotations: vec![],
            base_modifications: vec![],
            scan_cut_sites: true,
        }
    }
}

/// A strand of a duplex, given either as a bare sequence or as a full strand record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrandInputSpec {
    Raw(String),
    Strand(StrandSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplexSpec {
    pub forward: StrandInputSpec,
    #[serde(default)]
    pub kind: NucleicAcidKind,
    #[serde(default)]
    pub circular: bool,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub reverse: Option<StrandInputSpec>,
    #[serde(default)]
    pub reverse_offset: Option<i64>,
}

impl DuplexSpec {
    pub fn new(forward: impl Into<String>) -> Self {
        Self {
            forward: StrandInputSpec::Raw(forward.into()),
            kind: NucleicAcidKind::default(),
            circular: false,
            note: String::new(),
            reverse: None,
            reverse_offset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSpec {
    Single(StrandSpec),
    Double(DuplexSpec),
}

/// A reaction as submitted by a front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionRequest {
    Pcr {
        template: TemplateSpec,
        forward_primer: StrandSpec,
        reverse_primer: StrandSpec,
        #[serde(default)]
        keep_primer_annotations: bool,
    },
    SmrtbellLibraryPrep {
        template: DuplexSpec,
        front_adapter: StrandSpec,
        back_adapter: StrandSpec,
    },
}

/// One feature of a sequence map: `(label, start, end, strand, color)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFeature {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub strand: i8,
    pub color: String,
}

/// Input of a rendering collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMap {
    pub length: usize,
    pub circular: bool,
    pub features: Vec<MapFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    TypeConstraint,
    Validation,
    Conflict,
    NotFound,
    State,
    BindingNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_reactions: Vec<String>,
    pub restriction_enzymes: Vec<String>,
    pub base_modification_types: Vec<String>,
}
