use crate::{
    ENZYMES,
    double_strand::{DoubleStrandSequence, StrandInput},
    error::{NucError, Result},
    nucleic_acid::{complement, reverse},
    primer_search::{TrimEnd, kmer_trimming_search_min},
    single_strand::{SingleStrandSequence, transfer_annotations},
};
use anyhow::anyhow;
use log::{debug, info};
use nucsim_protocol::{
    BaseModificationType, Capabilities, NucleicAcidKind, PROTOCOL_VERSION, ReactionRequest,
    StrandDirection, StrandSpec, TemplateSpec,
};
use serde::{Deserialize, Serialize};
use std::fs;

pub type ReactionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    pub min_primer_binding_length: usize,
    pub scan_cut_sites_on_products: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            min_primer_binding_length: 1,
            scan_cut_sites_on_products: true,
        }
    }
}

impl EngineParameters {
    pub fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read parameter file '{path}': {e}"))?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Could not parse parameter JSON '{path}': {e}"))
    }
}

#[derive(Debug, Clone)]
pub enum Template {
    Single(SingleStrandSequence),
    Double(DoubleStrandSequence),
}

impl Template {
    pub fn from_spec(spec: TemplateSpec) -> Result<Self> {
        Ok(match spec {
            TemplateSpec::Single(spec) => Self::Single(SingleStrandSequence::from_spec(spec)?),
            TemplateSpec::Double(spec) => Self::Double(DoubleStrandSequence::from_spec(spec)?),
        })
    }

    pub fn kind(&self) -> NucleicAcidKind {
        match self {
            Self::Single(strand) => strand.kind(),
            Self::Double(ds) => ds.kind(),
        }
    }

    pub fn forward_strand(&self) -> &SingleStrandSequence {
        match self {
            Self::Single(strand) => strand,
            Self::Double(ds) => ds.forward_strand(),
        }
    }
}

impl From<SingleStrandSequence> for Template {
    fn from(strand: SingleStrandSequence) -> Self {
        Self::Single(strand)
    }
}

impl From<DoubleStrandSequence> for Template {
    fn from(ds: DoubleStrandSequence) -> Self {
        Self::Double(ds)
    }
}

#[derive(Debug, Clone)]
pub enum Reaction {
    Pcr {
        template: Template,
        forward_primer: SingleStrandSequence,
        reverse_primer: SingleStrandSequence,
        keep_primer_annotations: bool,
    },
    SmrtbellLibraryPrep {
        template: DoubleStrandSequence,
        front_adapter: SingleStrandSequence,
        back_adapter: SingleStrandSequence,
    },
}

impl Reaction {
    pub fn from_request(request: ReactionRequest) -> Result<Self> {
        Ok(match request {
            ReactionRequest::Pcr {
                template,
                forward_primer,
                reverse_primer,
                keep_primer_annotations,
            } => Self::Pcr {
                template: Template::from_spec(template)?,
                forward_primer: SingleStrandSequence::from_spec(forward_primer)?,
                reverse_primer: SingleStrandSequence::from_spec(reverse_primer)?,
                keep_primer_annotations,
            },
            ReactionRequest::SmrtbellLibraryPrep {
                template,
                front_adapter,
                back_adapter,
            } => Self::SmrtbellLibraryPrep {
                template: DoubleStrandSequence::from_spec(template)?,
                front_adapter: SingleStrandSequence::from_spec(front_adapter)?,
                back_adapter: SingleStrandSequence::from_spec(back_adapter)?,
            },
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pcr { .. } => "Pcr",
            Self::SmrtbellLibraryPrep { .. } => "SmrtbellLibraryPrep",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum ReactionProduct {
    PcrConstruct(DoubleStrandSequence),
    SmrtbellLibraryConstruct(SingleStrandSequence),
}

impl ReactionProduct {
    pub fn id(&self) -> &str {
        match self {
            Self::PcrConstruct(ds) => ds.id(),
            Self::SmrtbellLibraryConstruct(strand) => strand.id(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionOutcome {
    pub reaction_id: ReactionId,
    pub product: ReactionProduct,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub reaction_id: ReactionId,
    pub reaction: String,
    pub product_id: String,
    pub messages: Vec<String>,
}

pub trait Engine {
    fn run(&mut self, reaction: Reaction) -> Result<ReactionOutcome>;
    fn run_all(&mut self, reactions: Vec<Reaction>) -> Result<Vec<ReactionOutcome>>;
    fn journal(&self) -> &[ReactionRecord];
}

#[derive(Debug, Clone, Default)]
pub struct ReactionEngine {
    parameters: EngineParameters,
    journal: Vec<ReactionRecord>,
    reaction_counter: u64,
}

impl ReactionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: EngineParameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    pub fn parameters(&self) -> &EngineParameters {
        &self.parameters
    }

    pub fn set_parameter(&mut self, name: &str, value: &serde_json::Value) -> Result<()> {
        match name {
            "min_primer_binding_length" => {
                let raw = value.as_u64().filter(|raw| *raw > 0).ok_or_else(|| {
                    NucError::Validation(
                        "min_primer_binding_length requires a positive integer".to_string(),
                    )
                })?;
                self.parameters.min_primer_binding_length = raw as usize;
            }
            "scan_cut_sites_on_products" => {
                self.parameters.scan_cut_sites_on_products = value.as_bool().ok_or_else(|| {
                    NucError::Validation(
                        "scan_cut_sites_on_products requires a boolean".to_string(),
                    )
                })?;
            }
            _ => {
                return Err(NucError::Validation(format!("Unknown parameter '{name}'")));
            }
        }
        debug!("Set parameter '{name}' to {value}");
        Ok(())
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: PROTOCOL_VERSION.to_string(),
            supported_reactions: vec!["Pcr".to_string(), "SmrtbellLibraryPrep".to_string()],
            restriction_enzymes: ENZYMES.names(),
            base_modification_types: BaseModificationType::ALL
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }

    fn next_reaction_id(&mut self) -> ReactionId {
        self.reaction_counter += 1;
        format!("rxn-{}", self.reaction_counter)
    }

    fn run_internal(&self, reaction: &Reaction) -> Result<(ReactionProduct, Vec<String>)> {
        debug!("Running {} reaction", reaction.name());
        match reaction {
            Reaction::Pcr {
                template,
                forward_primer,
                reverse_primer,
                keep_primer_annotations,
            } => {
                let construct = pcr(
                    template,
                    forward_primer,
                    reverse_primer,
                    *keep_primer_annotations,
                    &self.parameters,
                )?;
                let messages = vec![format!(
                    "PCR construct of {} bp with {} forward and {} reverse annotations",
                    construct.forward_strand().len(),
                    construct.forward_strand().annotations().len(),
                    construct.reverse_strand().annotations().len()
                )];
                Ok((ReactionProduct::PcrConstruct(construct), messages))
            }
            Reaction::SmrtbellLibraryPrep {
                template,
                front_adapter,
                back_adapter,
            } => {
                let construct =
                    smrtbell_library_prep(template, front_adapter, back_adapter, &self.parameters)?;
                let messages = vec![format!(
                    "Circular SMRTbell construct of {} bases",
                    construct.len()
                )];
                Ok((ReactionProduct::SmrtbellLibraryConstruct(construct), messages))
            }
        }
    }
}

impl Engine for ReactionEngine {
    fn run(&mut self, reaction: Reaction) -> Result<ReactionOutcome> {
        let (product, messages) = self.run_internal(&reaction)?;
        let reaction_id = self.next_reaction_id();
        info!(
            "{reaction_id}: {} produced {}",
            reaction.name(),
            product.id()
        );
        self.journal.push(ReactionRecord {
            reaction_id: reaction_id.clone(),
            reaction: reaction.name().to_string(),
            product_id: product.id().to_string(),
            messages: messages.clone(),
        });
        Ok(ReactionOutcome {
            reaction_id,
            product,
            messages,
        })
    }

    /// Stops at the first failing reaction; earlier reactions stay journaled.
    fn run_all(&mut self, reactions: Vec<Reaction>) -> Result<Vec<ReactionOutcome>> {
        reactions
            .into_iter()
            .map(|reaction| self.run(reaction))
            .collect()
    }

    fn journal(&self) -> &[ReactionRecord] {
        &self.journal
    }
}

fn validate_linear_dna(strand: &SingleStrandSequence, role: &str) -> Result<()> {
    if strand.is_circular() {
        return Err(NucError::Validation(format!(
            "The {role} must be linear, not circular"
        )));
    }
    if strand.kind() != NucleicAcidKind::Dna {
        return Err(NucError::Validation(format!(
            "The {role} cannot be RNA, it must be DNA"
        )));
    }
    Ok(())
}

fn validate_pcr(
    template: &Template,
    forward_primer: &SingleStrandSequence,
    reverse_primer: &SingleStrandSequence,
) -> Result<()> {
    if template.kind() != NucleicAcidKind::Dna {
        return Err(NucError::Validation(
            "The template cannot be RNA, it must be DNA".to_string(),
        ));
    }
    if let Template::Single(strand) = template {
        if strand.direction() != StrandDirection::Forward {
            return Err(NucError::Validation(
                "A single-stranded template must have forward (5'->3') direction".to_string(),
            ));
        }
    }
    validate_linear_dna(forward_primer, "forward primer")?;
    validate_linear_dna(reverse_primer, "reverse primer")
}

fn product_strand(
    sequence: &str,
    direction: StrandDirection,
    circular: bool,
    parameters: &EngineParameters,
) -> Result<SingleStrandSequence> {
    SingleStrandSequence::from_spec(StrandSpec {
        direction,
        circular,
        scan_cut_sites: parameters.scan_cut_sites_on_products,
        ..StrandSpec::new(sequence)
    })
}

/// Amplifies the region between the two primer binding sites.
///
/// The forward primer is searched on the template forward strand with its 5'
/// end trimmed, the reverse primer on the template reverse strand with its 3'
/// end trimmed, so overhanging primer bases end up in the product. Template
/// annotations inside the amplified region move onto the product, shifted by
/// the forward primer's overhang.
pub fn pcr(
    template: &Template,
    forward_primer: &SingleStrandSequence,
    reverse_primer: &SingleStrandSequence,
    keep_primer_annotations: bool,
    parameters: &EngineParameters,
) -> Result<DoubleStrandSequence> {
    validate_pcr(template, forward_primer, reverse_primer)?;
    let (template_fwd, template_rev, offset) = match template {
        Template::Single(strand) => (
            strand.sequence().to_string(),
            complement(strand.sequence(), strand.kind())?,
            0,
        ),
        Template::Double(ds) => (
            ds.forward_sequence().to_string(),
            ds.reverse_sequence().to_string(),
            ds.reverse_offset(),
        ),
    };
    let min_len = parameters.min_primer_binding_length;

    let (fwd_start, fwd_end) = kmer_trimming_search_min(
        &template_fwd,
        forward_primer.sequence(),
        TrimEnd::Front,
        min_len,
    )
    .ok_or_else(|| {
        NucError::BindingNotFound(format!(
            "Forward primer {} does not bind the template forward strand",
            forward_primer.sequence()
        ))
    })?;
    let (rev_start_r, rev_end_r) = kmer_trimming_search_min(
        &template_rev,
        reverse_primer.sequence(),
        TrimEnd::Back,
        min_len,
    )
    .ok_or_else(|| {
        NucError::BindingNotFound(format!(
            "Reverse primer {} does not bind the template reverse strand",
            reverse_primer.sequence()
        ))
    })?;
    debug!(
        "Primers bind forward {fwd_start}..={fwd_end}, reverse {rev_start_r}..={rev_end_r} (offset {offset})"
    );

    // Reverse strand index i pairs with forward strand index i + offset.
    let rev_start = rev_start_r as i64 + offset;
    let rev_end = rev_end_r as i64 + offset;
    let inner_rev_start = fwd_end as i64 + 1 - offset;
    if rev_start < fwd_end as i64 + 1 {
        return Err(NucError::Validation(format!(
            "Reverse primer binds at {rev_start}, upstream of the forward primer's 3' end at {fwd_end}"
        )));
    }
    if rev_start > template_fwd.len() as i64 || inner_rev_start < 0 {
        return Err(NucError::Validation(
            "The amplified region is not covered by both template strands".to_string(),
        ));
    }
    let (rev_start, rev_end, inner_rev_start) =
        (rev_start as usize, rev_end as usize, inner_rev_start as usize);

    let forward_sequence = format!(
        "{}{}{}",
        forward_primer.sequence(),
        &template_fwd[fwd_end + 1..rev_start],
        complement(reverse_primer.sequence(), NucleicAcidKind::Dna)?
    );
    let reverse_sequence = format!(
        "{}{}{}",
        complement(forward_primer.sequence(), NucleicAcidKind::Dna)?,
        &template_rev[inner_rev_start..rev_start_r],
        reverse_primer.sequence()
    );
    let mut forward =
        product_strand(&forward_sequence, StrandDirection::Forward, false, parameters)?;
    let mut reverse =
        product_strand(&reverse_sequence, StrandDirection::Reverse, false, parameters)?;

    let overhang = forward_primer.len() - (fwd_end - fwd_start + 1);
    let shift = overhang as isize - fwd_start as isize;
    transfer_annotations(
        template.forward_strand().annotations().values(),
        &mut forward,
        fwd_start,
        Some(rev_end),
        shift,
    )?;
    if let Template::Double(ds) = template {
        transfer_annotations(
            ds.reverse_strand().annotations().values(),
            &mut reverse,
            (fwd_start as i64 - offset).max(0) as usize,
            Some(rev_end_r),
            shift + offset as isize,
        )?;
    }
    if keep_primer_annotations {
        transfer_annotations(
            forward_primer.annotations().values(),
            &mut forward,
            0,
            None,
            0,
        )?;
        transfer_annotations(
            reverse_primer.annotations().values(),
            &mut reverse,
            0,
            None,
            rev_start as isize + shift,
        )?;
    }

    DoubleStrandSequence::new(
        forward,
        NucleicAcidKind::Dna,
        false,
        "",
        Some(StrandInput::Strand(reverse)),
        None,
    )
}

/// Joins front adapter, template forward strand, back adapter and template
/// reverse strand into one circular strand.
pub fn smrtbell_library_prep(
    template: &DoubleStrandSequence,
    front_adapter: &SingleStrandSequence,
    back_adapter: &SingleStrandSequence,
    parameters: &EngineParameters,
) -> Result<SingleStrandSequence> {
    if template.kind() != NucleicAcidKind::Dna {
        return Err(NucError::Validation(
            "The template cannot be RNA, it must be DNA".to_string(),
        ));
    }
    validate_linear_dna(front_adapter, "front adapter")?;
    validate_linear_dna(back_adapter, "back adapter")?;
    let sequence = format!(
        "{}{}{}{}",
        front_adapter.sequence(),
        template.forward_sequence(),
        reverse(back_adapter.sequence()),
        reverse(template.reverse_sequence())
    );
    product_strand(&sequence, StrandDirection::Forward, true, parameters)
}
