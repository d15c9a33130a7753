//! Validation of an invocation against the instantiated stages.
//!
//! Two views over the same rule set:
//!
//! - [`validate`] mirrors what the analyzer enforces: error predicates are
//!   checked in a fixed order and the first match wins; if none matches, the
//!   first matching warning is reported; otherwise the status is OK.
//! - [`ValidationEngine`] runs every registered [`ValidationRule`] and
//!   collects all diagnostics into a [`ValidationReport`], so tooling can show
//!   every problem at once.
//!
//! # Quick start
//!
//! ```rust
//! use rapid_analyzer::pipeline::config::{CreationConfig, InvokeConfig};
//! use rapid_analyzer::pipeline::validation::{validate, Status};
//!
//! let creation = CreationConfig::builtin("en");
//! let status = validate(&creation, &InvokeConfig::default());
//! assert_eq!(status.status, Status::Ok);
//! ```

use std::collections::HashMap;

use serde::Serialize;

use super::config::{
    AnalyzerConfig, DependencyChoice, InvokeConfig, SrlChoice, StageKind, StagePresence,
    TaggerChoice, WsdMode,
};
use super::error_code::ErrorCode;
use super::errors::ConfigDiagnostic;
use crate::types::AnalysisLevel as L;

// ─── Status ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Warning,
    Error,
}

/// Outcome of [`validate`]: a status and the description of the first
/// matching problem (empty when OK).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationStatus {
    pub status: Status,
    pub description: String,
}

impl ValidationStatus {
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            description: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn is_warning(&self) -> bool {
        self.status == Status::Warning
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

// ─── Severity / diagnostics / report ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: ConfigDiagnostic,
}

impl ValidationDiagnostic {
    pub fn error(err: ConfigDiagnostic) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: ConfigDiagnostic) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

/// Collected diagnostics from running all validation rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| &d.error)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns `true` if there are no errors (warnings are acceptable).
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Ladder checks ──────────────────────────────────────────────────────────

type Predicate = fn(&dyn StagePresence, &InvokeConfig) -> bool;

/// One ordered predicate over (stages, invocation).
struct Check {
    code: ErrorCode,
    path: &'static str,
    message: &'static str,
    applies: Predicate,
}

impl Check {
    fn diagnostic(&self) -> ConfigDiagnostic {
        ConfigDiagnostic::new(self.code, self.path, self.message)
    }
}

fn between(inv: &InvokeConfig, level: L) -> bool {
    inv.input_level < level && level <= inv.output_level
}

/// Error predicates, in evaluation order.
const ERROR_CHECKS: &[Check] = &[
    Check {
        code: ErrorCode::MissingStage,
        path: "/tokenizer_file",
        message: "Tokenizer requested, but it was not instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::Tokenizer) && i.input_level == L::Text && i.output_level >= L::Token
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/splitter_file",
        message: "Splitter requested, but it was not instantiated in config options.",
        applies: |s, i| !s.has(StageKind::Splitter) && between(i, L::Splitted),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/morpho",
        message: "Morphological analysis requested, but it was not instantiated in config options.",
        applies: |s, i| !s.has(StageKind::Morpho) && between(i, L::Morpho),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/tagger/hmm_file",
        message: "HMM tagger requested, but it was not instantiated in config options.",
        applies: |s, i| {
            i.tagger == TaggerChoice::Hmm && !s.has(StageKind::HmmTagger) && between(i, L::Tagged)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/tagger/relax_file",
        message: "Relax tagger requested, but it was not instantiated in config options.",
        applies: |s, i| {
            i.tagger == TaggerChoice::Relax
                && !s.has(StageKind::RelaxTagger)
                && between(i, L::Tagged)
        },
    },
    Check {
        code: ErrorCode::StageDeactivated,
        path: "/tagger",
        message: "Tagger deactivated, but it is needed for required output analysis level.",
        applies: |_, i| i.tagger == TaggerChoice::None && between(i, L::Tagged),
    },
    Check {
        code: ErrorCode::StageDeactivated,
        path: "/dependency",
        message: "Dependency parser deactivated, but it is needed for required output analysis level.",
        applies: |_, i| i.dependency == DependencyChoice::None && between(i, L::Dep),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/txala_file",
        message: "depTxala parser deactivated, but it is needed for required output analysis level.",
        applies: |s, i| !s.has(StageKind::Txala) && i.output_level == L::Parsed,
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/nec_file",
        message: "NE classification requested, but it was not instantiated in config options.",
        applies: |s, i| i.nec && !s.has(StageKind::Nec),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/phonetics_file",
        message: "Phonetic transcription requested, but it was not instantiated in config options.",
        applies: |s, i| i.phonetics && !s.has(StageKind::Phonetics),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/sense_file",
        message: "Sense annotation requested, but it was not instantiated in config options.",
        applies: |s, i| i.wsd != WsdMode::None && !s.has(StageKind::Senses),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/ukb_file",
        message: "UKB word sense disambiguation requested, but it was not instantiated in config options.",
        applies: |s, i| i.wsd == WsdMode::Ukb && !s.has(StageKind::Ukb),
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/grammar_file",
        message: "Required analysis level requires chart parser, but it was not instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::ChartParser)
                && i.input_level < L::Shallow
                && matches!(i.output_level, L::Shallow | L::Parsed)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/grammar_file",
        message: "Txala dependency parser requires chart parser, but it was not instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::ChartParser)
                && i.dependency == DependencyChoice::Txala
                && i.input_level < L::Shallow
                && i.output_level >= L::Dep
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/txala_file",
        message: "Required analysis level requires depTxala parser, but it was not instantiated in config options.",
        applies: |s, i| {
            i.dependency == DependencyChoice::Txala && !s.has(StageKind::Txala) && between(i, L::Dep)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/treeler_file",
        message: "Required analysis level requires depTreeler parser, but it was not instantiated in config options.",
        applies: |s, i| {
            i.dependency == DependencyChoice::Treeler
                && !s.has(StageKind::Treeler)
                && between(i, L::Dep)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/lstm_file",
        message: "Required analysis level requires depLSTM parser, but it was not instantiated in config options.",
        applies: |s, i| {
            i.dependency == DependencyChoice::Lstm && !s.has(StageKind::Lstm) && between(i, L::Dep)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/dependency",
        message: "Required analysis level requires a dependency parser, but none was instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::Txala)
                && !s.has(StageKind::Treeler)
                && !s.has(StageKind::Lstm)
                && between(i, L::Dep)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/srl_file",
        message: "Required analysis level requires SRL labeler, but it was not instantiated in config options.",
        applies: |s, i| {
            i.srl == SrlChoice::Treeler && !s.has(StageKind::SrlTreeler) && between(i, L::Srl)
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/coref_file",
        message: "Required analysis level requires Coreference solver, but it was not instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::Coref) && i.output_level == L::Coref && i.input_level < L::Coref
        },
    },
    Check {
        code: ErrorCode::MissingStage,
        path: "/semgraph_file",
        message: "Required analysis level requires semantic graph extractor, but it was not instantiated in config options.",
        applies: |s, i| {
            !s.has(StageKind::SemGraph)
                && i.output_level == L::SemGraph
                && i.input_level < L::SemGraph
        },
    },
];

/// Warning predicates, in evaluation order.
const WARNING_CHECKS: &[Check] = &[
    Check {
        code: ErrorCode::NoProgress,
        path: "/input_level",
        message: "Input and output analysis levels are the same. No analysis will be performed.",
        applies: |_, i| i.input_level >= i.output_level,
    },
    Check {
        code: ErrorCode::LevelTooLow,
        path: "/phonetics",
        message: "Phonetics requires at least 'splitted' output analysis level.",
        applies: |_, i| i.phonetics && i.output_level < L::Splitted,
    },
    Check {
        code: ErrorCode::LevelTooLow,
        path: "/wsd",
        message: "Sense annotation requires at least 'morfo' output analysis level.",
        applies: |_, i| i.wsd != WsdMode::None && i.output_level < L::Morpho,
    },
    Check {
        code: ErrorCode::LevelTooLow,
        path: "/wsd",
        message: "UKB word sense disambiguation requires at least 'tagged' output analysis level.",
        applies: |_, i| i.wsd == WsdMode::Ukb && i.output_level < L::Tagged,
    },
    Check {
        code: ErrorCode::LevelTooLow,
        path: "/nec",
        message: "NE classification requires at least 'tagged' output analysis level.",
        applies: |_, i| i.nec && i.output_level < L::Tagged,
    },
    Check {
        code: ErrorCode::MissingPrerequisite,
        path: "/nec",
        message: "NE classification requires NE recognition.",
        applies: |_, i| i.nec && !i.morpho.ne_recognition,
    },
];

/// Check `invoke` against the stages `presence` reports. Pure; first error
/// wins, then first warning, otherwise OK.
pub fn validate(presence: &dyn StagePresence, invoke: &InvokeConfig) -> ValidationStatus {
    let first = |checks: &[Check]| {
        checks
            .iter()
            .find(|c| (c.applies)(presence, invoke))
            .map(|c| c.message.to_string())
    };
    if let Some(description) = first(ERROR_CHECKS) {
        return ValidationStatus {
            status: Status::Error,
            description,
        };
    }
    if let Some(description) = first(WARNING_CHECKS) {
        return ValidationStatus {
            status: Status::Warning,
            description,
        };
    }
    ValidationStatus::ok()
}

// ─── Rule trait & engine ────────────────────────────────────────────────────

/// Everything a rule may inspect.
pub struct ValidationContext<'a> {
    pub presence: &'a dyn StagePresence,
    pub invoke: &'a InvokeConfig,
    pub strict: bool,
    /// `(json pointer prefix, captured unknown fields)`
    pub unknown_fields: Vec<(&'a str, &'a HashMap<String, serde_json::Value>)>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(presence: &'a dyn StagePresence, invoke: &'a InvokeConfig) -> Self {
        Self {
            presence,
            invoke,
            strict: false,
            unknown_fields: vec![("/invoke", &invoke.unknown_fields)],
        }
    }
}

/// A stateless validation rule that returns zero or more diagnostics.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationDiagnostic>;
}

/// Runs a set of [`ValidationRule`]s and collects all diagnostics.
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Stage requirements, level consistency and unknown fields.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(StageRequirementsRule));
        engine.add_rule(Box::new(LevelConsistencyRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn report(&self, ctx: &ValidationContext<'_>) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(ctx));
        }
        report
    }

    /// Validate a full configuration document against its own creation
    /// section.
    pub fn validate_config(&self, cfg: &AnalyzerConfig) -> ValidationReport {
        let ctx = ValidationContext {
            presence: &cfg.creation,
            invoke: &cfg.invoke,
            strict: cfg.strict,
            unknown_fields: vec![
                ("", &cfg.unknown_fields),
                ("/creation", &cfg.creation.unknown_fields),
                ("/invoke", &cfg.invoke.unknown_fields),
            ],
        };
        self.report(&ctx)
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

struct StageRequirementsRule;

impl ValidationRule for StageRequirementsRule {
    fn name(&self) -> &str {
        "stage_requirements"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationDiagnostic> {
        ERROR_CHECKS
            .iter()
            .filter(|c| (c.applies)(ctx.presence, ctx.invoke))
            .map(|c| {
                ValidationDiagnostic::error(
                    c.diagnostic()
                        .with_hint("Configure the stage resource or lower output_level"),
                )
            })
            .collect()
    }
}

struct LevelConsistencyRule;

impl ValidationRule for LevelConsistencyRule {
    fn name(&self) -> &str {
        "level_consistency"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationDiagnostic> {
        WARNING_CHECKS
            .iter()
            .filter(|c| (c.applies)(ctx.presence, ctx.invoke))
            .map(|c| ValidationDiagnostic::warning(c.diagnostic()))
            .collect()
    }
}

/// Unknown fields are errors in strict mode, warnings otherwise.
struct UnknownFieldsRule;

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Vec<ValidationDiagnostic> {
        let mut out = Vec::new();
        for (prefix, fields) in &ctx.unknown_fields {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            for key in keys {
                let err = ConfigDiagnostic::new(
                    ErrorCode::UnknownField,
                    format!("{prefix}/{key}"),
                    format!("Unknown field '{key}'"),
                );
                out.push(if ctx.strict {
                    ValidationDiagnostic::error(
                        err.with_hint("Remove the field or disable strict mode"),
                    )
                } else {
                    ValidationDiagnostic::warning(err)
                });
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::CreationConfig;

    /// Presence from an explicit list of stage kinds.
    struct Present(Vec<StageKind>);

    impl StagePresence for Present {
        fn has(&self, kind: StageKind) -> bool {
            self.0.contains(&kind)
        }
    }

    fn full_stack() -> Present {
        Present(StageKind::ALL.to_vec())
    }

    fn without(kind: StageKind) -> Present {
        Present(StageKind::ALL.into_iter().filter(|k| *k != kind).collect())
    }

    fn inv(input: L, output: L) -> InvokeConfig {
        InvokeConfig::default().with_levels(input, output)
    }

    #[test]
    fn test_default_against_builtin_is_ok() {
        let status = validate(&CreationConfig::builtin("en"), &InvokeConfig::default());
        assert_eq!(status, ValidationStatus::ok());
        assert!(status.description.is_empty());
    }

    #[test]
    fn test_missing_tokenizer_is_error() {
        let status = validate(&without(StageKind::Tokenizer), &inv(L::Text, L::Token));
        assert!(status.is_error());
        assert!(status.description.contains("Tokenizer"));

        // Starting after tokenization does not need it.
        let status = validate(&without(StageKind::Tokenizer), &inv(L::Token, L::Splitted));
        assert!(status.is_ok());
    }

    #[test]
    fn test_missing_splitter_and_morpho() {
        let status = validate(&without(StageKind::Splitter), &inv(L::Text, L::Splitted));
        assert!(status.description.contains("Splitter"));
        let status = validate(&without(StageKind::Morpho), &inv(L::Splitted, L::Morpho));
        assert!(status.description.contains("Morphological"));
        let status = validate(&without(StageKind::Morpho), &inv(L::Morpho, L::Tagged));
        assert!(status.is_ok());
    }

    #[test]
    fn test_tagger_checks() {
        let status = validate(&without(StageKind::HmmTagger), &InvokeConfig::default());
        assert!(status.description.contains("HMM tagger"));

        let relax = InvokeConfig::default().with_tagger(TaggerChoice::Relax);
        let status = validate(&without(StageKind::RelaxTagger), &relax);
        assert!(status.description.contains("Relax tagger"));

        let none = InvokeConfig::default().with_tagger(TaggerChoice::None);
        let status = validate(&full_stack(), &none);
        assert!(status.description.contains("Tagger deactivated"));
    }

    #[test]
    fn test_error_order_first_match_wins() {
        // Both tokenizer and splitter missing: tokenizer reported.
        let presence = Present(vec![StageKind::Morpho, StageKind::HmmTagger]);
        let status = validate(&presence, &InvokeConfig::default());
        assert!(status.description.starts_with("Tokenizer"));
    }

    #[test]
    fn test_dependency_checks() {
        let dep = inv(L::Text, L::Dep);
        let status = validate(&full_stack(), &dep);
        assert!(status.description.contains("Dependency parser deactivated"));

        let treeler = dep.clone().with_dependency(DependencyChoice::Treeler);
        assert!(validate(&full_stack(), &treeler).is_ok());
        let status = validate(&without(StageKind::Treeler), &treeler);
        assert!(status.description.contains("depTreeler"));

        let lstm = dep.clone().with_dependency(DependencyChoice::Lstm);
        let status = validate(&without(StageKind::Lstm), &lstm);
        assert!(status.description.contains("depLSTM"));

        let txala = dep.with_dependency(DependencyChoice::Txala);
        let status = validate(&without(StageKind::ChartParser), &txala);
        assert!(status.description.contains("chart parser"));
        let status = validate(&without(StageKind::Txala), &txala);
        assert!(status.description.contains("depTxala"));
    }

    #[test]
    fn test_parsed_needs_txala_and_grammar() {
        let status = validate(&without(StageKind::Txala), &inv(L::Text, L::Parsed));
        assert!(status.description.contains("depTxala"));
        let status = validate(&without(StageKind::ChartParser), &inv(L::Text, L::Shallow));
        assert!(status.description.contains("chart parser"));
        assert!(validate(&full_stack(), &inv(L::Text, L::Parsed)).is_ok());
    }

    #[test]
    fn test_optional_module_checks() {
        let nec = InvokeConfig::default().with_nec(true);
        assert!(validate(&without(StageKind::Nec), &nec)
            .description
            .contains("NE classification requested"));

        let phon = InvokeConfig::default().with_phonetics(true);
        assert!(validate(&without(StageKind::Phonetics), &phon)
            .description
            .contains("Phonetic"));

        let senses = InvokeConfig::default().with_wsd(WsdMode::Mfs);
        assert!(validate(&without(StageKind::Senses), &senses)
            .description
            .contains("Sense annotation requested"));

        let ukb = InvokeConfig::default().with_wsd(WsdMode::Ukb);
        assert!(validate(&without(StageKind::Ukb), &ukb)
            .description
            .contains("UKB"));
    }

    #[test]
    fn test_srl_coref_semgraph() {
        let srl = inv(L::Text, L::Srl)
            .with_dependency(DependencyChoice::Treeler)
            .with_srl(SrlChoice::Treeler);
        assert!(validate(&without(StageKind::SrlTreeler), &srl)
            .description
            .contains("SRL"));

        let coref = inv(L::Text, L::Coref).with_dependency(DependencyChoice::Treeler);
        assert!(validate(&without(StageKind::Coref), &coref)
            .description
            .contains("Coreference"));

        let sg = inv(L::Text, L::SemGraph).with_dependency(DependencyChoice::Treeler);
        assert!(validate(&without(StageKind::SemGraph), &sg)
            .description
            .contains("semantic graph"));
        assert!(validate(&full_stack(), &sg).is_ok());
    }

    #[test]
    fn test_warnings() {
        let same = inv(L::Tagged, L::Tagged);
        let status = validate(&full_stack(), &same);
        assert!(status.is_warning());
        assert!(status.description.contains("same"));

        let phon = inv(L::Text, L::Token).with_phonetics(true);
        assert!(validate(&full_stack(), &phon)
            .description
            .contains("Phonetics requires"));

        let wsd = inv(L::Text, L::Splitted).with_wsd(WsdMode::All);
        assert!(validate(&full_stack(), &wsd)
            .description
            .contains("'morfo'"));

        let ukb = inv(L::Text, L::Morpho).with_wsd(WsdMode::Ukb);
        assert!(validate(&full_stack(), &ukb)
            .description
            .contains("UKB word sense disambiguation requires"));

        let nec = inv(L::Text, L::Morpho).with_nec(true);
        assert!(validate(&full_stack(), &nec)
            .description
            .contains("'tagged'"));

        let mut nec = InvokeConfig::default().with_nec(true);
        nec.morpho.ne_recognition = false;
        assert!(validate(&full_stack(), &nec)
            .description
            .contains("NE recognition"));
    }

    #[test]
    fn test_errors_take_precedence_over_warnings() {
        // input > output is a warning, but a missing NEC model is an error.
        let cfg = inv(L::Tagged, L::Token).with_nec(true);
        let status = validate(&without(StageKind::Nec), &cfg);
        assert!(status.is_error());
    }

    #[test]
    fn test_engine_collects_everything() {
        let presence = Present(vec![]);
        let mut cfg = InvokeConfig::default().with_nec(true);
        cfg.unknown_fields
            .insert("taggr".into(), serde_json::Value::Bool(true));
        let ctx = ValidationContext::new(&presence, &cfg);
        let report = ValidationEngine::with_defaults().report(&ctx);
        assert!(report.has_errors());
        // tokenizer, splitter, morpho, hmm, nec
        assert_eq!(report.errors().count(), 5);
        assert_eq!(report.warnings().count(), 1);
        let unknown: Vec<_> = report.warnings().collect();
        assert_eq!(unknown[0].code, ErrorCode::UnknownField);
        assert_eq!(unknown[0].path, "/invoke/taggr");
    }

    #[test]
    fn test_engine_strict_unknown_fields() {
        let mut cfg = AnalyzerConfig {
            creation: CreationConfig::builtin("en"),
            strict: true,
            ..Default::default()
        };
        cfg.unknown_fields
            .insert("colour".into(), serde_json::Value::Null);
        let report = ValidationEngine::default().validate_config(&cfg);
        let errors: Vec<_> = report.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/colour");
        assert!(errors[0].hint.is_some());

        cfg.strict = false;
        let report = ValidationEngine::default().validate_config(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.len(), 1);
    }
}
