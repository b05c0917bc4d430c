//! Prompt builders. Every builder is a pure function of its inputs.

const NOT_PROVIDED: &str = "Not provided";

fn or_not_provided(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_PROVIDED
    } else {
        value
    }
}

pub fn clause_matching(policy_text: &str, rejection_text: &str, user_context: &str) -> String {
    format!(
        r#"You are a structured insurance claim audit AI specialising in Indian health insurance policies.

TASK: Identify which policy clause category is being applied in the claim rejection.

ALLOWED CLAUSE CATEGORIES (use exactly as written):
- "Pre-existing disease"
- "Waiting period"
- "Policy exclusion"
- "Room rent limit"
- "Co-payment"
- "Insufficient documentation"
- "Authorization requirement"
- "Not Detected"
- "Other / unclear"

ALIGNMENT GUIDE:
- "Strong"       = rejection directly supported by a specific policy clause
- "Partial"      = loosely or indirectly supported
- "Weak"         = poorly supported or contradicted by policy text
- "Not Detected" = no identifiable clause found

CONFIDENCE GUIDE:
- "High"   = clear match, unambiguous
- "Medium" = reasonable match with some uncertainty
- "Low"    = uncertain, insufficient information

STRICT RULES:
- Use ONLY the provided policy and rejection text.
- Do NOT invent clauses or facts.
- For clause_detected: quote the most relevant sentence from policy text, or write "Not found in policy text".
- Output ONLY the JSON object. No text before or after.

EXAMPLE OUTPUT:
{{
  "clause_category": "Waiting period",
  "clause_detected": "Claims for any illness within the first 30 days of policy inception shall not be admissible.",
  "clause_clarity": "High",
  "rejection_alignment": "Strong",
  "explanation": "The rejection cites a 30-day waiting period. Policy clearly states claims within first 30 days are inadmissible.",
  "confidence": "High"
}}

POLICY TEXT:
{policy_text}

REJECTION TEXT:
{rejection_text}

USER CONTEXT:
{user_context}

JSON OUTPUT:"#,
        user_context = or_not_provided(user_context),
    )
}

pub fn documentation_analysis(
    policy_text: &str,
    rejection_text: &str,
    medical_text: &str,
    user_context: &str,
) -> String {
    format!(
        r#"You are a structured insurance documentation audit AI specialising in Indian health insurance claims.

TASK: Analyse whether the claim rejection is procedural, substantive, or mixed based on the provided documents.

DEFINITIONS:
- "Procedural"    = rejection due to missing paperwork, incomplete forms, or process errors (fixable by resubmission)
- "Substantive"   = rejection due to policy exclusion, clause limitation, or non-coverage (requires appeal or clause challenge)
- "Mixed"         = both procedural and substantive elements present
- "Not Detected"  = cannot determine from provided text

SEVERITY GUIDE (documentation_gap_severity):
- "High"   = critical documents missing or completely absent
- "Medium" = some documents incomplete or partially missing
- "Low"    = documentation appears adequate

STRICT RULES:
- Use ONLY the provided texts. Do NOT invent medical facts.
- missing_documents: list specific document names that are absent or incomplete. Empty list if none.
- medical_ambiguity_detected: true only if medical records contain vague, contradictory, or unclear diagnosis language.
- Output ONLY the JSON object. No text before or after.

EXAMPLE OUTPUT:
{{
  "missing_documents": ["Discharge summary", "Doctor's certificate"],
  "documentation_gap_severity": "High",
  "rejection_nature": "Procedural",
  "medical_ambiguity_detected": false,
  "explanation": "Rejection cites missing discharge summary and doctor's certificate. No substantive policy clause cited.",
  "confidence": "High"
}}

POLICY TEXT:
{policy_text}

REJECTION TEXT:
{rejection_text}

MEDICAL DOCUMENTS:
{medical_text}

USER CONTEXT:
{user_context}

JSON OUTPUT:"#,
        medical_text = or_not_provided(medical_text),
        user_context = or_not_provided(user_context),
    )
}

pub fn prepurchase_risk(policy_text: &str) -> String {
    format!(
        r#"Classify 10 health insurance policy clauses by risk level.

ALLOWED VALUES (use EXACT wording only):
"Low Risk" | "Moderate Risk" | "High Risk" | "Not Found"

Use "Not Found" ONLY if the clause is genuinely absent from the text.
Infer from synonyms and indirect language; do not default to Not Found.

CLASSIFICATION RULES:
waiting_period: >3yr=High, 1-3yr=Moderate, <1yr=Low (look for months/years)
pre_existing_disease: excluded=High, partial/conditional=Moderate, covered=Low
room_rent_sublimit: cap<=1%SI=High, 1-2%=Moderate, no cap=Low
disease_specific_caps: significant caps=High, minor caps=Moderate, none=Low
co_payment: >=20%=High, 10-19%=Moderate, <10%=Low (look for co-pay/cost sharing)
exclusions_clarity: vague/hidden=High, partial=Moderate, clear=Low
claim_procedure_complexity: strict deadlines/many steps=High, moderate=Moderate, simple=Low
sublimits_and_caps: multiple=High, few=Moderate, none=Low
restoration_benefit: absent=High, partial=Moderate, full reinstatement=Low
transparency_of_terms: complex/hidden=High, mixed=Moderate, clearly defined=Low

SEMANTIC HINTS:
- "capped", "limit", "maximum payable" -> disease caps or sublimits
- "intimation within", "inform within" -> claim complexity
- "non-medical expenses excluded" -> exclusions clarity
- "restored after exhaustion", "reinstated" -> restoration benefit
- "co-pay", "cost sharing" -> co-payment
- "room rent limited to X% of sum insured" -> room rent sublimit
- "free look", "grievance", "ombudsman" -> transparency signals

OUTPUT: JSON object with exactly these 10 keys. No text before or after.

EXAMPLE (use real values from the policy, not these):
{{
  "waiting_period": "Moderate Risk",
  "pre_existing_disease": "High Risk",
  "room_rent_sublimit": "High Risk",
  "disease_specific_caps": "Moderate Risk",
  "co_payment": "Low Risk",
  "exclusions_clarity": "Moderate Risk",
  "claim_procedure_complexity": "Moderate Risk",
  "sublimits_and_caps": "Moderate Risk",
  "restoration_benefit": "High Risk",
  "transparency_of_terms": "Low Risk"
}}

POLICY TEXT:
{policy_text}

JSON OUTPUT:"#
    )
}

/// Conversational turn for report chat. `context` is the rendered report block and
/// `history` the already formatted prior turns.
pub fn report_chat(instruction: &str, context: &str, history: &str, question: &str) -> String {
    format!(
        "{instruction}\n\n{context}\n\nCONVERSATION HISTORY:\n{history}\n\nUSER QUESTION: {question}\n\n\
         ANSWER (3-5 sentences, plain English, grounded in the report data above):"
    )
}
