use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::llm::RiskExtraction;
use crate::workflows::grading::{Level, Rating};

/// The ten clause aspects every policy is graded on. Order matches the report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseField {
    WaitingPeriod,
    PreExistingDisease,
    RoomRentSublimit,
    DiseaseSpecificCaps,
    CoPayment,
    ExclusionsClarity,
    ClaimProcedureComplexity,
    SublimitsAndCaps,
    RestorationBenefit,
    TransparencyOfTerms,
}

impl ClauseField {
    pub const ALL: [ClauseField; 10] = [
        ClauseField::WaitingPeriod,
        ClauseField::PreExistingDisease,
        ClauseField::RoomRentSublimit,
        ClauseField::DiseaseSpecificCaps,
        ClauseField::CoPayment,
        ClauseField::ExclusionsClarity,
        ClauseField::ClaimProcedureComplexity,
        ClauseField::SublimitsAndCaps,
        ClauseField::RestorationBenefit,
        ClauseField::TransparencyOfTerms,
    ];

    /// Wire key, identical to the serde name.
    pub fn key(&self) -> &'static str {
        match self {
            ClauseField::WaitingPeriod => "waiting_period",
            ClauseField::PreExistingDisease => "pre_existing_disease",
            ClauseField::RoomRentSublimit => "room_rent_sublimit",
            ClauseField::DiseaseSpecificCaps => "disease_specific_caps",
            ClauseField::CoPayment => "co_payment",
            ClauseField::ExclusionsClarity => "exclusions_clarity",
            ClauseField::ClaimProcedureComplexity => "claim_procedure_complexity",
            ClauseField::SublimitsAndCaps => "sublimits_and_caps",
            ClauseField::RestorationBenefit => "restoration_benefit",
            ClauseField::TransparencyOfTerms => "transparency_of_terms",
        }
    }

    /// Human label used in comparison reports.
    pub fn label(&self) -> &'static str {
        match self {
            ClauseField::WaitingPeriod => "Waiting Period",
            ClauseField::PreExistingDisease => "Pre-existing Disease",
            ClauseField::RoomRentSublimit => "Room Rent Sublimit",
            ClauseField::DiseaseSpecificCaps => "Disease-Specific Caps",
            ClauseField::CoPayment => "Co-payment",
            ClauseField::ExclusionsClarity => "Exclusions Clarity",
            ClauseField::ClaimProcedureComplexity => "Claim Procedure",
            ClauseField::SublimitsAndCaps => "Sublimits & Caps",
            ClauseField::RestorationBenefit => "Restoration Benefit",
            ClauseField::TransparencyOfTerms => "Term Transparency",
        }
    }

    pub fn keys() -> [&'static str; 10] {
        Self::ALL.map(|field| field.key())
    }
}

impl fmt::Display for ClauseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-clause risk grade. Deserialization never fails: unknown text becomes `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum RiskLevel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Not Found")]
    #[default]
    NotFound,
}

impl RiskLevel {
    /// Canonical value map for generator text, matched on the leading word.
    pub fn normalize(raw: &str) -> Self {
        let value = raw.trim().trim_matches('"').to_ascii_lowercase();
        if value.starts_with("high") {
            RiskLevel::High
        } else if value.starts_with("moderate") || value.starts_with("medium") {
            RiskLevel::Moderate
        } else if value.starts_with("low") {
            RiskLevel::Low
        } else {
            RiskLevel::NotFound
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::Low => "Low Risk",
            RiskLevel::NotFound => "Not Found",
        }
    }

    /// Comparison rank; higher is better for the policyholder.
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::High => 0,
            RiskLevel::Moderate => 1,
            RiskLevel::Low => 2,
            RiskLevel::NotFound => 3,
        }
    }

    /// Contribution to the broker risk density index.
    pub fn density_weight(&self) -> f32 {
        match self {
            RiskLevel::High => 1.0,
            RiskLevel::Moderate => 0.5,
            RiskLevel::Low | RiskLevel::NotFound => 0.0,
        }
    }

    /// Raise to at least `floor` on the High > Moderate > Low scale. `NotFound` is
    /// treated as below Low.
    pub fn at_least(self, floor: RiskLevel) -> Self {
        fn severity(level: RiskLevel) -> u8 {
            match level {
                RiskLevel::NotFound => 0,
                RiskLevel::Low => 1,
                RiskLevel::Moderate => 2,
                RiskLevel::High => 3,
            }
        }
        if severity(self) >= severity(floor) {
            self
        } else {
            floor
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(RiskLevel::normalize).unwrap_or_default())
    }
}

/// Risk grade for each of the ten clauses. Always complete; missing keys default to
/// `Not Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseRiskAssessment {
    pub waiting_period: RiskLevel,
    pub pre_existing_disease: RiskLevel,
    pub room_rent_sublimit: RiskLevel,
    pub disease_specific_caps: RiskLevel,
    pub co_payment: RiskLevel,
    pub exclusions_clarity: RiskLevel,
    pub claim_procedure_complexity: RiskLevel,
    pub sublimits_and_caps: RiskLevel,
    pub restoration_benefit: RiskLevel,
    pub transparency_of_terms: RiskLevel,
}

impl ClauseRiskAssessment {
    pub fn from_extraction(extraction: &RiskExtraction) -> Self {
        ClauseField::ALL
            .into_iter()
            .fold(Self::default(), |assessment, field| {
                assessment.with(field, extraction.get(field.key()))
            })
    }

    pub fn get(&self, field: ClauseField) -> RiskLevel {
        match field {
            ClauseField::WaitingPeriod => self.waiting_period,
            ClauseField::PreExistingDisease => self.pre_existing_disease,
            ClauseField::RoomRentSublimit => self.room_rent_sublimit,
            ClauseField::DiseaseSpecificCaps => self.disease_specific_caps,
            ClauseField::CoPayment => self.co_payment,
            ClauseField::ExclusionsClarity => self.exclusions_clarity,
            ClauseField::ClaimProcedureComplexity => self.claim_procedure_complexity,
            ClauseField::SublimitsAndCaps => self.sublimits_and_caps,
            ClauseField::RestorationBenefit => self.restoration_benefit,
            ClauseField::TransparencyOfTerms => self.transparency_of_terms,
        }
    }

    /// Copy with one clause replaced.
    pub fn with(mut self, field: ClauseField, level: RiskLevel) -> Self {
        let slot = match field {
            ClauseField::WaitingPeriod => &mut self.waiting_period,
            ClauseField::PreExistingDisease => &mut self.pre_existing_disease,
            ClauseField::RoomRentSublimit => &mut self.room_rent_sublimit,
            ClauseField::DiseaseSpecificCaps => &mut self.disease_specific_caps,
            ClauseField::CoPayment => &mut self.co_payment,
            ClauseField::ExclusionsClarity => &mut self.exclusions_clarity,
            ClauseField::ClaimProcedureComplexity => &mut self.claim_procedure_complexity,
            ClauseField::SublimitsAndCaps => &mut self.sublimits_and_caps,
            ClauseField::RestorationBenefit => &mut self.restoration_benefit,
            ClauseField::TransparencyOfTerms => &mut self.transparency_of_terms,
        };
        *slot = level;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClauseField, RiskLevel)> + '_ {
        ClauseField::ALL.into_iter().map(|field| (field, self.get(field)))
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        self.iter().filter(|(_, value)| *value == level).count()
    }

    /// Clauses that resolved to anything but `Not Found`.
    pub fn detected(&self) -> usize {
        ClauseField::ALL.len() - self.count(RiskLevel::NotFound)
    }

    pub fn fields_at(&self, level: RiskLevel) -> Vec<ClauseField> {
        self.iter()
            .filter(|(_, value)| *value == level)
            .map(|(field, _)| field)
            .collect()
    }
}

/// One IRDAI signal: either a presence flag or the list of missing protections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComplianceFlag {
    Present(bool),
    Violations(Vec<String>),
}

impl ComplianceFlag {
    pub fn is_present(&self) -> bool {
        matches!(self, ComplianceFlag::Present(true))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceRating {
    #[serde(rename = "High Compliance")]
    High,
    #[serde(rename = "Moderate Compliance")]
    Moderate,
    #[serde(rename = "Low Compliance")]
    Low,
}

impl ComplianceRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceRating::High => "High Compliance",
            ComplianceRating::Moderate => "Moderate Compliance",
            ComplianceRating::Low => "Low Compliance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrdaiCompliance {
    pub compliance_flags: BTreeMap<String, ComplianceFlag>,
    pub compliance_score: u8,
    pub compliance_rating: ComplianceRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralRisk {
    High,
    Elevated,
    Moderate,
    Balanced,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl StructuralRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructuralRisk::High => "High",
            StructuralRisk::Elevated => "Elevated",
            StructuralRisk::Moderate => "Moderate",
            StructuralRisk::Balanced => "Balanced",
            StructuralRisk::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerRiskAnalysis {
    pub risk_density_index: f32,
    pub transparency_score: u8,
    pub structural_risk_level: StructuralRisk,
    pub recommendation: String,
    pub high_risk_count: usize,
    pub not_found_count: usize,
    pub data_sufficient: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyScoreBreakdown {
    pub base_score: f32,
    pub adjusted_score: u8,
    pub rating: Rating,
    pub risk_index: f32,
}

/// Final pre-purchase report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrePurchaseReport {
    pub clause_risk: ClauseRiskAssessment,
    pub score_breakdown: PolicyScoreBreakdown,
    pub overall_policy_rating: Rating,
    pub summary: String,
    pub checklist_for_buyer: Vec<String>,
    pub confidence: Level,
    pub red_flags: Vec<String>,
    pub positive_flags: Vec<String>,
    pub irdai_compliance: IrdaiCompliance,
    pub broker_risk_analysis: BrokerRiskAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrePurchaseRequest {
    pub policy_text: String,
}
